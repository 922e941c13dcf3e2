//! Console line formatting
//!
//! Lines for the print queue are fixed-capacity strings. Formatting never
//! fails: output that does not fit is cut at the last whole character
//! that does, leaving room for the terminator the UART side expects.

use core::fmt::{self, Write};

use heapless::String;

/// Bytes per queued line, terminator included
pub const LINE_CAPACITY: usize = 128;

/// Longest text a queued line carries
pub const MAX_LINE_LEN: usize = LINE_CAPACITY - 1;

/// A queued console line
pub type PrintLine = String<LINE_CAPACITY>;

/// Line ending sent after every printed line
pub const LINE_END: &str = "\r\n";

/// Writer that keeps whatever fits and drops the rest
struct Truncating<'a> {
    line: &'a mut PrintLine,
    limit: usize,
}

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.line.len() + c.len_utf8() > self.limit {
                return Err(fmt::Error);
            }
            // Cannot fail: limit is at most MAX_LINE_LEN
            let _ = self.line.push(c);
        }
        Ok(())
    }
}

fn format_limited(args: fmt::Arguments<'_>, limit: usize) -> PrintLine {
    let mut line = PrintLine::new();
    // A truncation error just means the line is full
    let _ = Truncating {
        line: &mut line,
        limit,
    }
    .write_fmt(args);
    line
}

/// Format arguments into a line, truncating at [`MAX_LINE_LEN`] bytes
pub fn format_line(args: fmt::Arguments<'_>) -> PrintLine {
    format_limited(args, MAX_LINE_LEN)
}

/// Format arguments into a line that always ends in [`LINE_END`]
///
/// The text is cut short enough that the line ending still fits.
pub fn format_line_crlf(args: fmt::Arguments<'_>) -> PrintLine {
    let mut line = format_limited(args, MAX_LINE_LEN - LINE_END.len());
    // Cannot fail: room was left above
    let _ = line.push_str(LINE_END);
    line
}
