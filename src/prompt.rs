//! The incremental filter prompt.
//!
//! Runs in the alternate screen while it is open and redraws after every
//! byte typed. Only Enter leaves with a selection.

use std::io::{self, Stdout};

use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::app::{Action, App, PromptKey};
use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::keys::RawInput;
use crate::ui;

/// Switches the display into and out of full-screen mode.
pub trait Screen {
    type Backend: Backend;

    fn enter(&mut self) -> io::Result<Terminal<Self::Backend>>;
    fn leave(&mut self) -> io::Result<()>;
}

/// The alternate screen on stdout, in raw mode.
#[derive(Debug, Default)]
pub struct AlternateScreen;

impl Screen for AlternateScreen {
    type Backend = CrosstermBackend<Stdout>;

    fn enter(&mut self) -> io::Result<Terminal<Self::Backend>> {
        crossterm::terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Terminal::new(CrosstermBackend::new(io::stdout()))
    }

    fn leave(&mut self) -> io::Result<()> {
        restore_terminal()
    }
}

/// Leave the alternate screen and raw mode. Safe to call when neither is on.
pub fn restore_terminal() -> io::Result<()> {
    let raw = crossterm::terminal::disable_raw_mode();
    let screen = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
    raw.and(screen)
}

/// Full-screen mode for the lifetime of the guard.
struct FullScreen<'s, S: Screen + ?Sized> {
    screen: &'s mut S,
    terminal: Terminal<S::Backend>,
}

impl<'s, S: Screen + ?Sized> FullScreen<'s, S> {
    fn enter(screen: &'s mut S) -> Result<Self> {
        match screen.enter() {
            Ok(terminal) => Ok(Self { screen, terminal }),
            Err(err) => {
                let _ = screen.leave();
                Err(Error::TerminalUnavailable(err))
            }
        }
    }
}

impl<S: Screen + ?Sized> Drop for FullScreen<'_, S> {
    fn drop(&mut self) {
        let _ = self.screen.leave();
    }
}

/// Let the user narrow `candidates` down by typing a pattern.
///
/// Returns the matches at the time Enter was pressed, or `None` when the
/// prompt was aborted with Ctrl+C. The screen is left on every path.
pub fn prompt<'a, S, I>(
    screen: &mut S,
    input: &mut I,
    candidates: &'a [Candidate],
) -> Result<Option<Vec<&'a Candidate>>>
where
    S: Screen + ?Sized,
    I: RawInput + ?Sized,
{
    let mut full_screen = FullScreen::enter(screen)?;
    let mut app = App::new(candidates);
    let result = run_event_loop(&mut full_screen.terminal, input, &mut app);
    drop(full_screen);

    match &result {
        Ok(Some(selection)) => tracing::debug!(
            query = %app.query,
            selected = selection.len(),
            total = candidates.len(),
            "prompt accepted"
        ),
        Ok(None) => tracing::debug!("prompt aborted"),
        Err(err) => tracing::debug!(%err, "prompt failed"),
    }
    result
}

/// Draw, read one byte, update; until Enter or Ctrl+C.
pub fn run_event_loop<'a, B, I>(
    terminal: &mut Terminal<B>,
    input: &mut I,
    app: &mut App<'a>,
) -> Result<Option<Vec<&'a Candidate>>>
where
    B: Backend,
    I: RawInput + ?Sized,
{
    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|err| Error::Render(err.to_string()))?;

        let key = PromptKey::from_byte(input.read_byte()?);
        if key == PromptKey::Escape {
            // Drop the rest of an arrow/function key sequence so it does not
            // end up in the query.
            let mut discarded = 0usize;
            while input.poll_byte()?.is_some() {
                discarded += 1;
            }
            tracing::trace!(discarded, "ignored escape sequence");
        }

        match app.handle_key(key) {
            Action::None => {}
            Action::Accept => return Ok(Some(app.filtered.clone())),
            Action::Abort => return Ok(None),
        }
    }
}
