//! Raw keystroke acquisition.
//!
//! Every read switches the terminal into raw mode for exactly one logical key
//! and back to cooked mode before returning, so the shell around the menu
//! keeps behaving normally between keystrokes.

use std::fmt;
#[cfg(unix)]
use std::fs::File;
use std::io;
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use std::os::fd::AsRawFd;

use crate::error::{Error, Result};

pub const ESC: u8 = 0x1b;

/// Byte-level access to the controlling terminal.
///
/// `read_byte` blocks until a byte is available; `poll_byte` never blocks and
/// returns `None` when nothing is pending.
pub trait RawInput {
    fn enable_raw_mode(&mut self) -> io::Result<()>;
    fn disable_raw_mode(&mut self) -> io::Result<()>;
    fn read_byte(&mut self) -> io::Result<u8>;
    fn poll_byte(&mut self) -> io::Result<Option<u8>>;
    /// Hand back one byte so the next read returns it first.
    fn unread_byte(&mut self, byte: u8);
}

/// The controlling terminal, with raw mode toggled through crossterm.
///
/// Reads go straight to the device without std's stdin buffer so that
/// `poll_byte` sees every pending byte.
#[cfg(unix)]
#[derive(Debug)]
pub struct Tty<R = File> {
    reader: R,
    pushed_back: Option<u8>,
}

#[cfg(unix)]
impl Tty {
    pub fn open() -> io::Result<Self> {
        let tty = File::options().read(true).open("/dev/tty")?;
        Ok(Self::from_reader(tty))
    }
}

#[cfg(unix)]
impl<R> Tty<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            pushed_back: None,
        }
    }
}

#[cfg(unix)]
impl<R: Read + AsRawFd> RawInput for Tty<R> {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        if let Some(byte) = self.pushed_back.take() {
            return Ok(byte);
        }
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "terminal closed",
                    ))
                }
                Ok(_) => return Ok(buf[0]),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    fn poll_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pushed_back.take() {
            return Ok(Some(byte));
        }
        let mut fds = libc::pollfd {
            fd: self.reader.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: one valid pollfd and a zero timeout.
        let ready = unsafe { libc::poll(&mut fds, 1, 0) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(None);
            }
            return Err(err);
        }
        if ready == 0 || fds.revents & libc::POLLIN == 0 {
            return Ok(None);
        }
        self.read_byte().map(Some)
    }

    fn unread_byte(&mut self, byte: u8) {
        self.pushed_back = Some(byte);
    }
}

/// Raw mode lifetime guard so cooked mode is restored on any return path.
struct RawModeGuard<'a, I: RawInput + ?Sized> {
    input: &'a mut I,
}

impl<'a, I: RawInput + ?Sized> RawModeGuard<'a, I> {
    fn acquire(input: &'a mut I) -> Result<Self> {
        if let Err(err) = input.enable_raw_mode() {
            let _ = input.disable_raw_mode();
            return Err(Error::TerminalUnavailable(err));
        }
        Ok(Self { input })
    }
}

impl<I: RawInput + ?Sized> Drop for RawModeGuard<'_, I> {
    fn drop(&mut self) {
        let _ = self.input.disable_raw_mode();
    }
}

/// The bytes making up one keypress, exactly as the terminal sent them.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyToken(Vec<u8>);

impl KeyToken {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_escape_sequence(&self) -> bool {
        self.0.first() == Some(&ESC)
    }
}

impl fmt::Debug for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyToken(\"{}\")", self.0.escape_ascii())
    }
}

/// Read one logical key.
///
/// An ESC byte pulls in whatever bytes of the same sequence are already
/// pending (arrow keys, function keys); a UTF-8 lead byte pulls in the
/// continuation bytes that arrived with it.
pub fn read_key<I: RawInput + ?Sized>(input: &mut I) -> Result<KeyToken> {
    let guard = RawModeGuard::acquire(input)?;
    let first = guard.input.read_byte()?;
    let mut bytes = vec![first];

    if first == ESC {
        while let Some(byte) = guard.input.poll_byte()? {
            bytes.push(byte);
        }
    } else {
        while bytes.len() < utf8_len(first) {
            match guard.input.poll_byte()? {
                Some(byte) if byte & 0xc0 == 0x80 => bytes.push(byte),
                Some(byte) => {
                    guard.input.unread_byte(byte);
                    break;
                }
                None => break,
            }
        }
    }

    let token = KeyToken::new(bytes);
    tracing::trace!(?token, "read key");
    Ok(token)
}

/// Expected length of a UTF-8 sequence starting with `lead`.
pub fn utf8_len(lead: u8) -> usize {
    match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

/// Named control events for single control bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    CtrlA,
    CtrlB,
    CtrlC,
    CtrlD,
    CtrlE,
    CtrlF,
    CtrlG,
    CtrlH,
    /// Ctrl+I
    Tab,
    CtrlJ,
    CtrlK,
    CtrlL,
    /// Ctrl+M
    Enter,
    CtrlN,
    CtrlO,
    CtrlP,
    CtrlQ,
    CtrlR,
    CtrlS,
    CtrlT,
    CtrlU,
    CtrlV,
    CtrlW,
    CtrlX,
    CtrlY,
    CtrlZ,
    Escape,
    Backspace,
}

impl ControlKey {
    pub fn from_byte(byte: u8) -> Option<Self> {
        let key = match byte {
            0x01 => Self::CtrlA,
            0x02 => Self::CtrlB,
            0x03 => Self::CtrlC,
            0x04 => Self::CtrlD,
            0x05 => Self::CtrlE,
            0x06 => Self::CtrlF,
            0x07 => Self::CtrlG,
            0x08 => Self::CtrlH,
            0x09 => Self::Tab,
            0x0a => Self::CtrlJ,
            0x0b => Self::CtrlK,
            0x0c => Self::CtrlL,
            0x0d => Self::Enter,
            0x0e => Self::CtrlN,
            0x0f => Self::CtrlO,
            0x10 => Self::CtrlP,
            0x11 => Self::CtrlQ,
            0x12 => Self::CtrlR,
            0x13 => Self::CtrlS,
            0x14 => Self::CtrlT,
            0x15 => Self::CtrlU,
            0x16 => Self::CtrlV,
            0x17 => Self::CtrlW,
            0x18 => Self::CtrlX,
            0x19 => Self::CtrlY,
            0x1a => Self::CtrlZ,
            ESC => Self::Escape,
            0x7f => Self::Backspace,
            _ => return None,
        };
        Some(key)
    }
}

/// A key token interpreted against the control table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalKey {
    Control(ControlKey),
    Char(char),
    /// Anything else: escape sequences, undecodable bytes.
    Other(KeyToken),
}

impl From<KeyToken> for LogicalKey {
    fn from(token: KeyToken) -> Self {
        if let [byte] = token.as_bytes() {
            if let Some(control) = ControlKey::from_byte(*byte) {
                return Self::Control(control);
            }
        }
        if let Ok(text) = std::str::from_utf8(token.as_bytes()) {
            let mut chars = text.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if !c.is_control() {
                    return Self::Char(c);
                }
            }
        }
        Self::Other(token)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::io;

    use super::RawInput;

    /// Terminal stand-in fed with bursts of bytes.
    ///
    /// Bytes in one burst arrive together: `poll_byte` sees the rest of the
    /// current burst but never the next one. Mode switches are recorded.
    #[derive(Debug, Default)]
    pub struct ScriptedTerminal {
        bursts: VecDeque<VecDeque<u8>>,
        pub transitions: Vec<&'static str>,
        pub fail_raw_mode: bool,
        raw: bool,
    }

    impl ScriptedTerminal {
        pub fn new<I, B>(bursts: I) -> Self
        where
            I: IntoIterator<Item = B>,
            B: AsRef<[u8]>,
        {
            Self {
                bursts: bursts
                    .into_iter()
                    .map(|burst| burst.as_ref().iter().copied().collect())
                    .collect(),
                ..Self::default()
            }
        }

        /// One burst per byte of `keys`.
        pub fn typing(keys: &[u8]) -> Self {
            Self::new(keys.iter().map(|b| [*b]))
        }

        pub fn is_raw(&self) -> bool {
            self.raw
        }

        pub fn pending(&self) -> usize {
            self.bursts.iter().map(VecDeque::len).sum()
        }
    }

    impl RawInput for ScriptedTerminal {
        fn enable_raw_mode(&mut self) -> io::Result<()> {
            if self.fail_raw_mode {
                self.transitions.push("raw-failed");
                return Err(io::Error::other("not a terminal"));
            }
            self.raw = true;
            self.transitions.push("raw");
            Ok(())
        }

        fn disable_raw_mode(&mut self) -> io::Result<()> {
            self.raw = false;
            self.transitions.push("cooked");
            Ok(())
        }

        fn read_byte(&mut self) -> io::Result<u8> {
            while let Some(burst) = self.bursts.front_mut() {
                if let Some(byte) = burst.pop_front() {
                    return Ok(byte);
                }
                self.bursts.pop_front();
            }
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "script exhausted",
            ))
        }

        fn poll_byte(&mut self) -> io::Result<Option<u8>> {
            Ok(self.bursts.front_mut().and_then(VecDeque::pop_front))
        }

        fn unread_byte(&mut self, byte: u8) {
            match self.bursts.front_mut() {
                Some(burst) => burst.push_front(byte),
                None => self.bursts.push_back(VecDeque::from([byte])),
            }
        }
    }
}
