//! Line-oriented text output

/// Sink for newline-terminated text
///
/// Implementations append the line terminator themselves.
pub trait LineSink {
    /// Write one line of text
    fn write_line(&mut self, line: &str);
}
