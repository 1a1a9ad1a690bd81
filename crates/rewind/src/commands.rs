/// Shell commands and their execution against a text tracker.
use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use rewind_history::HistoryTracker;

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the tracked text.
    Set(String),
    Undo,
    Redo,
    Jump(usize),
    Reset,
    /// Commit a pending debounced change now.
    Flush,
    /// Print the history log.
    History,
    /// Print the current value.
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  set <text>    replace the tracked text
  undo          step back one entry
  redo          step forward one entry
  jump <index>  jump to a history entry
  reset         clear history (keeps the current text)
  flush         commit a pending debounced change now
  history       list history entries
  show          print the current text
  help          show this message
  quit          exit";

impl Command {
    /// Parses a trimmed input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (line, ""),
        };

        let cmd = match word.to_ascii_lowercase().as_str() {
            "set" => Command::Set(rest.to_string()),
            "undo" | "u" => Command::Undo,
            "redo" | "r" => Command::Redo,
            "jump" | "j" => {
                let index = rest
                    .parse::<usize>()
                    .with_context(|| format!("Invalid history index: {rest:?}"))?;
                Command::Jump(index)
            }
            "reset" => Command::Reset,
            "flush" => Command::Flush,
            "history" | "h" => Command::History,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("Unknown command: {other} (try `help`)"),
        };
        Ok(Some(cmd))
    }
}

/// Applies `cmd` to the tracker and returns the text to print.
///
/// # Errors
///
/// Returns an error if a jump targets an entry that doesn't exist.
pub fn execute(tracker: &mut HistoryTracker<String>, cmd: Command) -> Result<String> {
    let out = match cmd {
        Command::Set(text) => {
            tracker.set(text);
            String::new()
        }
        Command::Undo => nav_message(tracker.undo(), "Nothing to undo"),
        Command::Redo => nav_message(tracker.redo(), "Nothing to redo"),
        Command::Jump(index) => {
            tracker.jump_to(index)?;
            String::new()
        }
        Command::Reset => {
            tracker.reset();
            "History cleared".to_string()
        }
        Command::Flush => {
            if tracker.flush() {
                "Committed pending change".to_string()
            } else {
                "Nothing pending".to_string()
            }
        }
        Command::History => render_history(tracker),
        Command::Show => tracker.state().get().clone(),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    tracker.pump();
    Ok(out)
}

fn nav_message(moved: bool, refusal: &str) -> String {
    if moved {
        String::new()
    } else {
        refusal.to_string()
    }
}

/// One line per entry, the active entry marked with `>`.
pub fn render_history(tracker: &HistoryTracker<String>) -> String {
    if tracker.is_empty() {
        return "(empty history)".to_string();
    }
    let mut out = String::new();
    for (i, entry) in tracker.history().iter().enumerate() {
        let marker = if i == tracker.pointer() { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {i:>3}  {}  {:?}",
            entry.timestamp().format("%H:%M:%S%.3f"),
            entry.value()
        );
    }
    if tracker.has_pending() {
        out.push_str("  (change pending)\n");
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_history::TrackerConfig;

    fn tracker() -> HistoryTracker<String> {
        HistoryTracker::with_value(String::from("start"), TrackerConfig::default())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("set hello world").unwrap(),
            Some(Command::Set("hello world".to_string()))
        );
        assert_eq!(Command::parse("  UNDO ").unwrap(), Some(Command::Undo));
        assert_eq!(Command::parse("j 3").unwrap(), Some(Command::Jump(3)));
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Quit));
        assert_eq!(Command::parse("").unwrap(), None);
    }

    #[test]
    fn test_parse_set_without_text_is_empty_value() {
        assert_eq!(
            Command::parse("set").unwrap(),
            Some(Command::Set(String::new()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("jump x").is_err());
        assert!(Command::parse("jump").is_err());
        let err = Command::parse("frobnicate").unwrap_err();
        assert!(err.to_string().contains("Unknown command"));
    }

    #[test]
    fn test_execute_edit_undo_redo() {
        let mut t = tracker();
        execute(&mut t, Command::Set("next".to_string())).unwrap();
        assert_eq!(t.len(), 2);

        execute(&mut t, Command::Undo).unwrap();
        assert_eq!(execute(&mut t, Command::Show).unwrap(), "start");
        assert_eq!(execute(&mut t, Command::Undo).unwrap(), "Nothing to undo");

        execute(&mut t, Command::Redo).unwrap();
        assert_eq!(t.state().get(), "next");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_execute_jump_out_of_range() {
        let mut t = tracker();
        assert!(execute(&mut t, Command::Jump(5)).is_err());
    }

    #[test]
    fn test_render_history_marks_pointer() {
        let mut t = tracker();
        execute(&mut t, Command::Set("b".to_string())).unwrap();
        execute(&mut t, Command::Undo).unwrap();

        let out = render_history(&t);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('>'));
        assert!(lines[0].ends_with("\"start\""));
        assert!(lines[1].starts_with(' '));
    }

    #[test]
    fn test_render_empty_history() {
        let mut t = tracker();
        execute(&mut t, Command::Reset).unwrap();
        assert_eq!(render_history(&t), "(empty history)");
    }
}
