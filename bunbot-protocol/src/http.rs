//! HTTP trigger request.
//!
//! The proximity board sends one plain HTTP/1.1 `GET` per detection and
//! only looks at the status line of the reply.

use core::fmt::Write;

use heapless::String;

/// Largest request the proximity board builds
pub const MAX_REQUEST_LEN: usize = 256;

/// Default endpoint on the trigger server
pub const DEFAULT_PATH: &str = "/trigger";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// User agent sent with every request
pub const USER_AGENT: &str = "bunbot-proximity";

/// Errors from request building and response parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Request does not fit in [`MAX_REQUEST_LEN`] bytes
    RequestTooLong,
    /// Response does not start with a valid status line
    MalformedStatus,
}

/// A `GET` request against the trigger server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRequest<'a> {
    /// Host header value (the server address as configured)
    pub host: &'a str,
    /// Request path
    pub path: &'a str,
}

impl<'a> TriggerRequest<'a> {
    /// Request for the default path on `host`
    pub fn new(host: &'a str) -> Self {
        Self {
            host,
            path: DEFAULT_PATH,
        }
    }

    /// Render the request, headers and blank line included
    pub fn render(&self) -> Result<String<MAX_REQUEST_LEN>, HttpError> {
        let mut out = String::new();
        write!(
            out,
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nUser-Agent: {}\r\n\r\n",
            self.path, self.host, USER_AGENT
        )
        .map_err(|_| HttpError::RequestTooLong)?;
        Ok(out)
    }
}

/// Parsed HTTP status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusLine {
    /// Numeric status code
    pub code: u16,
}

impl StatusLine {
    /// Parse the first line of a response
    ///
    /// Only the first line is examined, so a partial response buffer works
    /// as long as it holds the status line.
    pub fn parse(response: &[u8]) -> Result<Self, HttpError> {
        let end = response
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .unwrap_or(response.len());
        let line = core::str::from_utf8(&response[..end]).map_err(|_| HttpError::MalformedStatus)?;

        let mut parts = line.split(' ');
        let version = parts.next().ok_or(HttpError::MalformedStatus)?;
        if !version.starts_with("HTTP/") {
            return Err(HttpError::MalformedStatus);
        }

        let code = parts.next().ok_or(HttpError::MalformedStatus)?;
        if code.len() != 3 {
            return Err(HttpError::MalformedStatus);
        }
        let code = code.parse().map_err(|_| HttpError::MalformedStatus)?;

        Ok(Self { code })
    }

    /// Whether the server accepted the trigger (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_request() {
        let request = TriggerRequest::new("10.11.1.33").render().unwrap();
        assert_eq!(
            request.as_str(),
            "GET /trigger HTTP/1.1\r\nHost: 10.11.1.33\r\nConnection: close\r\nUser-Agent: bunbot-proximity\r\n\r\n"
        );
    }

    #[test]
    fn test_render_too_long() {
        let host = [b'h'; MAX_REQUEST_LEN];
        let host = core::str::from_utf8(&host).unwrap();
        assert_eq!(TriggerRequest::new(host).render(), Err(HttpError::RequestTooLong));
    }

    #[test]
    fn test_parse_status_line() {
        let status = StatusLine::parse(b"HTTP/1.0 200 OK\r\nServer: x\r\n\r\n{}").unwrap();
        assert_eq!(status.code, 200);
        assert!(status.is_success());

        let status = StatusLine::parse(b"HTTP/1.1 404 Not Found\r\n").unwrap();
        assert!(!status.is_success());
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(StatusLine::parse(b""), Err(HttpError::MalformedStatus));
        assert_eq!(StatusLine::parse(b"hello world"), Err(HttpError::MalformedStatus));
        assert_eq!(StatusLine::parse(b"HTTP/1.1 2000 OK"), Err(HttpError::MalformedStatus));
        assert_eq!(StatusLine::parse(b"HTTP/1.1"), Err(HttpError::MalformedStatus));
    }
}
