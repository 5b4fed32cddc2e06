use regex::Regex;

use crate::candidate::Candidate;
use crate::error::PatternError;
use crate::keys::ESC;

/// Actions that the prompt loop should take after handling a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Enter: return the current matches.
    Accept,
    /// Ctrl+C: leave without a selection.
    Abort,
}

/// One input byte as the filter prompt sees it.
///
/// Unlike the command menu, the prompt works byte by byte and does not
/// assemble escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKey {
    Backspace,
    Escape,
    Enter,
    Interrupt,
    Byte(u8),
}

impl PromptKey {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x7f => Self::Backspace,
            ESC => Self::Escape,
            // Raw mode does not translate CR into NL
            b'\n' | b'\r' => Self::Enter,
            0x03 => Self::Interrupt,
            other => Self::Byte(other),
        }
    }
}

/// State of one filter prompt session.
pub struct App<'a> {
    /// Everything the user can pick from, in the caller's order.
    pub candidates: &'a [Candidate],

    /// Filter text typed so far, interpreted as a regular expression.
    pub query: String,

    /// Candidates whose name matches `query`, in input order.
    pub filtered: Vec<&'a Candidate>,

    /// Set while `query` does not compile; `filtered` then holds the
    /// matches of the last valid query.
    pub pattern_error: Option<PatternError>,

    /// Leading bytes of a UTF-8 character that is not complete yet.
    pending: Vec<u8>,
}

impl<'a> App<'a> {
    pub fn new(candidates: &'a [Candidate]) -> Self {
        Self {
            candidates,
            query: String::new(),
            filtered: candidates.iter().collect(),
            pattern_error: None,
            pending: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.candidates.len()
    }

    pub fn handle_key(&mut self, key: PromptKey) -> Action {
        match key {
            PromptKey::Backspace => {
                // A half-typed character is discarded on its own
                if !self.pending.is_empty() {
                    self.pending.clear();
                    return Action::None;
                }
                self.query.pop();
                self.refresh();
                Action::None
            }
            PromptKey::Escape => Action::None,
            PromptKey::Enter => Action::Accept,
            PromptKey::Interrupt => Action::Abort,
            PromptKey::Byte(byte) => {
                if self.push_byte(byte) {
                    self.refresh();
                }
                Action::None
            }
        }
    }

    /// Append a byte to the query. Returns whether the query changed.
    fn push_byte(&mut self, byte: u8) -> bool {
        if self.pending.is_empty() && byte.is_ascii() {
            if byte.is_ascii_control() {
                tracing::trace!(byte, "ignored control byte");
                return false;
            }
            self.query.push(char::from(byte));
            return true;
        }

        self.pending.push(byte);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                if text.chars().any(char::is_control) {
                    return false;
                }
                self.query.push_str(&text);
                true
            }
            // Incomplete character, wait for the rest
            Err(err) if err.error_len().is_none() => false,
            // The earlier bytes were a broken sequence; start over with this one
            Err(_) => {
                let retry = self.pending.len() > 1;
                self.pending.clear();
                retry && self.push_byte(byte)
            }
        }
    }

    /// Recompute `filtered` from `query`.
    ///
    /// On an invalid pattern `filtered` is left untouched.
    pub fn apply_filter(&mut self) -> Result<(), PatternError> {
        if self.query.is_empty() {
            self.filtered = self.candidates.iter().collect();
            return Ok(());
        }
        let pattern =
            Regex::new(&self.query).map_err(|err| PatternError::new(&self.query, &err))?;
        self.filtered = filter_candidates(self.candidates, &pattern);
        Ok(())
    }

    fn refresh(&mut self) {
        match self.apply_filter() {
            Ok(()) => self.pattern_error = None,
            Err(err) => {
                tracing::debug!(%err, "keeping previous matches");
                self.pattern_error = Some(err);
            }
        }
    }
}

/// Candidates whose name contains a match for `pattern` anywhere.
pub fn filter_candidates<'a>(candidates: &'a [Candidate], pattern: &Regex) -> Vec<&'a Candidate> {
    candidates
        .iter()
        .filter(|candidate| pattern.is_match(&candidate.name))
        .collect()
}
