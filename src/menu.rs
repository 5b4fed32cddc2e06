//! The single-keystroke command menu.

use std::fmt;
use std::io::Write;

use crossterm::style::Stylize;

use crate::error::Result;
use crate::keys::{read_key, ControlKey, LogicalKey, RawInput};

/// What the user asked the runner to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RunAll,
    RunSubset,
    RunChanged,
    RunFailed,
    RepeatLast,
    Quit,
}

impl Action {
    /// Command keys of the menu. `q` and Enter are handled before this table.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Self::RunAll),
            's' => Some(Self::RunSubset),
            'c' => Some(Self::RunChanged),
            'f' => Some(Self::RunFailed),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RunAll => "run_all",
            Self::RunSubset => "run_subset",
            Self::RunChanged => "run_changed",
            Self::RunFailed => "run_failed",
            Self::RepeatLast => "repeat_last",
            Self::Quit => "quit",
        };
        f.write_str(name)
    }
}

/// Block until the user presses a key that maps to an [`Action`].
///
/// Unrecognized keys are ignored. On `q` or Ctrl+C an "Exiting..." notice is
/// written to `out` and flushed before [`Action::Quit`] is returned; exiting
/// the process is left to the caller.
pub fn action_prompt<I, W>(input: &mut I, out: &mut W) -> Result<Action>
where
    I: RawInput + ?Sized,
    W: Write + ?Sized,
{
    loop {
        let action = match LogicalKey::from(read_key(input)?) {
            LogicalKey::Control(ControlKey::Enter) => Some(Action::RepeatLast),
            LogicalKey::Control(ControlKey::CtrlC) | LogicalKey::Char('q') => Some(Action::Quit),
            LogicalKey::Char(c) => Action::from_char(c),
            LogicalKey::Control(key) => {
                tracing::trace!(?key, "ignored control key");
                None
            }
            LogicalKey::Other(token) => {
                if token.is_escape_sequence() {
                    tracing::trace!(?token, "ignored escape sequence");
                }
                None
            }
        };

        if let Some(action) = action {
            tracing::debug!(%action, "menu action");
            if action == Action::Quit {
                writeln!(out, "Exiting...")?;
                out.flush()?;
            }
            return Ok(action);
        }
    }
}

pub fn print_welcome<W: Write + ?Sized>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Welcome to {}, interactive test runner", "atr".green())
}

pub fn print_usage<W: Write + ?Sized>(out: &mut W) -> std::io::Result<()> {
    const ENTRIES: [(&str, &str); 6] = [
        ("a", "run all tests"),
        ("s", "run subset of tests"),
        ("c", "run changed tests"),
        ("f", "run failed tests"),
        ("q", "quit"),
        ("Enter", "run the last command"),
    ];

    writeln!(out)?;
    for (key, description) in ENTRIES {
        writeln!(out, " \u{203a} Press {} to {description}", key.cyan())?;
    }
    writeln!(out)?;
    out.flush()
}
