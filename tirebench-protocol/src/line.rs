//! Line framing for the serial port
//!
//! Incoming bytes are assembled into lines terminated by `\n` (an optional
//! preceding `\r` is dropped). Lines that do not fit the buffer are
//! reported once and discarded up to the next terminator. An unterminated
//! line can be flushed with [`LineBuffer::take_pending`] when the port goes
//! idle.

use heapless::{String, Vec};

/// Maximum incoming line length in bytes
pub const MAX_LINE_LEN: usize = 64;

/// Maximum outgoing line length in bytes
pub const MAX_OUTPUT_LEN: usize = 192;

/// One outgoing line, without terminator
pub type OutputLine = String<MAX_OUTPUT_LEN>;

/// Errors that can occur while assembling a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded the buffer; the rest of it is discarded
    Overflow,
    /// Line is not valid UTF-8
    InvalidUtf8,
}

impl LineError {
    /// Diagnostic sent back to the host
    pub fn diagnostic(&self) -> &'static str {
        match self {
            LineError::Overflow => "Invalid command: line too long",
            LineError::InvalidUtf8 => "Invalid command: not valid UTF-8",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    /// Collecting bytes
    Collecting,
    /// Dropping bytes until the next terminator
    Discarding,
}

/// Byte-fed line assembler
#[derive(Debug, Clone)]
pub struct LineBuffer<const N: usize = MAX_LINE_LEN> {
    state: LineState,
    buffer: Vec<u8, N>,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    /// Create an empty line buffer
    pub fn new() -> Self {
        Self {
            state: LineState::Collecting,
            buffer: Vec::new(),
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.state = LineState::Collecting;
        self.buffer.clear();
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a non-empty line is complete (trimmed),
    /// `Ok(None)` when more bytes are needed, or `Err` when the current line
    /// is rejected.
    pub fn feed(&mut self, byte: u8) -> Result<Option<String<N>>, LineError> {
        match (self.state, byte) {
            (LineState::Discarding, b'\n') => {
                self.reset();
                Ok(None)
            }
            (LineState::Discarding, _) => Ok(None),
            (LineState::Collecting, b'\n') => {
                let result = self.take_line();
                self.reset();
                result
            }
            (LineState::Collecting, _) => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = LineState::Discarding;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
        }
    }

    /// Complete the partial line after the sender went quiet
    ///
    /// Hosts may send a bare command such as `t` without a terminator.
    /// The caller flushes it once the port has been idle long enough.
    /// A line already being discarded stays dropped.
    pub fn take_pending(&mut self) -> Result<Option<String<N>>, LineError> {
        let result = match self.state {
            LineState::Collecting => self.take_line(),
            LineState::Discarding => Ok(None),
        };
        self.reset();
        result
    }

    /// Check if a partial line is buffered
    pub fn has_pending(&self) -> bool {
        self.state == LineState::Discarding || !self.buffer.is_empty()
    }

    fn take_line(&self) -> Result<Option<String<N>>, LineError> {
        let text = core::str::from_utf8(&self.buffer).map_err(|_| LineError::InvalidUtf8)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let mut line = String::new();
        // Cannot overflow: the text came from an N-byte buffer
        let _ = line.push_str(text);
        Ok(Some(line))
    }
}
