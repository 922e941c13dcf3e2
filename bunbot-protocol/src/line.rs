//! Serial line assembly.
//!
//! Bytes arrive one at a time from the UART. A line ends at `\n`; `\r` is
//! dropped so both `\n` and `\r\n` terminals work. Completed lines are
//! trimmed, and a line that overflows the buffer is discarded whole.

use heapless::String;

/// Accumulates console bytes into trimmed lines
#[derive(Debug, Clone)]
pub struct LineBuffer<const N: usize> {
    buffer: String<N>,
    overflowed: bool,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
            overflowed: false,
        }
    }

    /// Drop any partial line
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Feed a single byte
    ///
    /// Returns the completed line when `byte` is a newline. Empty lines
    /// and lines that did not fit are swallowed.
    pub fn feed(&mut self, byte: u8) -> Option<String<N>> {
        match byte {
            b'\n' => {
                let overflowed = self.overflowed;
                let line = core::mem::take(&mut self.buffer);
                self.overflowed = false;

                if overflowed {
                    return None;
                }

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let mut out = String::new();
                // A trimmed slice is never longer than the original
                let _ = out.push_str(trimmed);
                Some(out)
            }
            b'\r' => None,
            _ => {
                if !self.overflowed && self.buffer.push(char::from(byte)).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }
}

/// Outcome of feeding a line to a [`StartGate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateOutcome {
    /// Keyword received, the main loop may start
    Open,
    /// Some other line; the board should prompt again
    Waiting,
}

/// Blocks a demo until the operator types a keyword
#[derive(Debug, Clone, Copy)]
pub struct StartGate {
    keyword: &'static str,
    open: bool,
}

impl StartGate {
    /// Gate used by the heater and Chef boards
    pub const GO: Self = Self::new("GO");

    /// Gate used by the servo bench
    pub const YES: Self = Self::new("y");

    /// Create a gate that opens on `keyword` (case-insensitive)
    pub const fn new(keyword: &'static str) -> Self {
        Self {
            keyword,
            open: false,
        }
    }

    /// Keyword this gate waits for
    pub fn keyword(&self) -> &'static str {
        self.keyword
    }

    /// Whether the keyword has been seen
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Check a completed line
    pub fn check(&mut self, line: &str) -> GateOutcome {
        if self.open || line.trim().eq_ignore_ascii_case(self.keyword) {
            self.open = true;
            GateOutcome::Open
        } else {
            GateOutcome::Waiting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all<const N: usize>(buf: &mut LineBuffer<N>, bytes: &[u8]) -> Option<String<N>> {
        let mut last = None;
        for &b in bytes {
            if let Some(line) = buf.feed(b) {
                last = Some(line);
            }
        }
        last
    }

    #[test]
    fn test_line_on_newline() {
        let mut buf = LineBuffer::<16>::new();
        assert_eq!(buf.feed(b'O'), None);
        assert_eq!(buf.feed(b'N'), None);
        assert_eq!(buf.feed(b'\n').unwrap().as_str(), "ON");
    }

    #[test]
    fn test_crlf_and_trim() {
        let mut buf = LineBuffer::<16>::new();
        let line = feed_all(&mut buf, b"  go \r\n").unwrap();
        assert_eq!(line.as_str(), "go");
    }

    #[test]
    fn test_empty_lines_swallowed() {
        let mut buf = LineBuffer::<16>::new();
        assert_eq!(feed_all(&mut buf, b"\r\n\n   \n"), None);
    }

    #[test]
    fn test_overflow_discards_line() {
        let mut buf = LineBuffer::<4>::new();
        assert_eq!(feed_all(&mut buf, b"toolong\n"), None);
        // Next line is unaffected
        assert_eq!(feed_all(&mut buf, b"OFF\n").unwrap().as_str(), "OFF");
    }

    #[test]
    fn test_start_gate() {
        let mut gate = StartGate::GO;
        assert_eq!(gate.check("hello"), GateOutcome::Waiting);
        assert!(!gate.is_open());
        assert_eq!(gate.check("Go"), GateOutcome::Open);
        assert!(gate.is_open());
        // Stays open
        assert_eq!(gate.check("anything"), GateOutcome::Open);
    }

    #[test]
    fn test_servo_bench_gate() {
        let mut gate = StartGate::YES;
        assert_eq!(gate.keyword(), "y");
        assert_eq!(gate.check("n"), GateOutcome::Waiting);
        assert_eq!(gate.check("Y"), GateOutcome::Open);
    }
}
