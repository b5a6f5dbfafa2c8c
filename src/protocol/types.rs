//! Protocol Data Types
//!
//! This module defines the request and response types of the wire protocol.
//! The protocol is line-oriented ASCII text: a client sends a single
//! request line and receives a single response, after which the server
//! closes the connection.
//!
//! ## Protocol Format
//!
//! Request: `<VERB> <KEY> [<VALUE>]`
//!
//! Responses:
//! - `OK\n` - operation succeeded
//! - `OK\n<value>\n` - successful GET, followed by the stored value
//! - `NOTFOUND\n` - GET for a key that does not exist
//! - `ERROR\n` - storage fault or unknown verb
//! - `ERROR: Incorrect number of arguments\n` - malformed request

use bytes::Bytes;
use std::fmt;

/// Line terminator for responses.
pub const LF: &[u8] = b"\n";

/// The verbs a client can request.
///
/// Verb matching is exact and case-sensitive: `set` is not `SET` and is
/// reported as [`Verb::Unknown`], which the executor rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Create or overwrite an entry.
    Set,
    /// Read an entry's value.
    Get,
    /// Remove an entry (idempotent).
    Del,
    /// Anything else. Not a parse error; rejected at execution time.
    Unknown,
}

impl Verb {
    /// Maps a verb token to its [`Verb`].
    pub fn from_token(token: &str) -> Self {
        match token {
            "SET" => Verb::Set,
            "GET" => Verb::Get,
            "DEL" => Verb::Del,
            _ => Verb::Unknown,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Set => write!(f, "SET"),
            Verb::Get => write!(f, "GET"),
            Verb::Del => write!(f, "DEL"),
            Verb::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One parsed request.
///
/// Constructed by the parser, consumed once by the executor, then
/// discarded. Nothing in a `Command` outlives its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The requested operation.
    pub verb: Verb,
    /// The entry identifier. Validated by the storage layer, not here.
    pub key: String,
    /// The payload for SET. Empty for two-token requests.
    pub value: Bytes,
}

impl Command {
    /// Creates a new command.
    pub fn new(verb: Verb, key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            verb,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One response, serialized once and written to the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Success. Carries the value payload for a successful GET.
    Ok(Option<Bytes>),
    /// GET addressed a key with no entry.
    NotFound,
    /// Storage fault, invalid key, or unknown verb.
    Error,
    /// Request had fewer than two tokens.
    BadRequest,
}

impl Response {
    /// Plain `OK` response.
    pub fn ok() -> Self {
        Response::Ok(None)
    }

    /// `OK` response carrying a value payload.
    pub fn ok_with(value: impl Into<Bytes>) -> Self {
        Response::Ok(Some(value.into()))
    }

    /// `NOTFOUND` response.
    pub fn not_found() -> Self {
        Response::NotFound
    }

    /// `ERROR` response.
    pub fn error() -> Self {
        Response::Error
    }

    /// The fixed incorrect-arguments response.
    pub fn bad_request() -> Self {
        Response::BadRequest
    }

    /// Returns true if this response reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error | Response::BadRequest)
    }

    /// Serializes the response to its wire bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the response into an existing buffer.
    ///
    /// More efficient than [`serialize`](Self::serialize) when a buffer
    /// is reused.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Response::Ok(None) => buf.extend_from_slice(b"OK\n"),
            Response::Ok(Some(value)) => {
                buf.extend_from_slice(b"OK\n");
                buf.extend_from_slice(value);
                buf.extend_from_slice(LF);
            }
            Response::NotFound => buf.extend_from_slice(b"NOTFOUND\n"),
            Response::Error => buf.extend_from_slice(b"ERROR\n"),
            Response::BadRequest => {
                buf.extend_from_slice(b"ERROR: Incorrect number of arguments\n")
            }
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok(None) => write!(f, "OK"),
            Response::Ok(Some(value)) => write!(f, "OK ({} byte payload)", value.len()),
            Response::NotFound => write!(f, "NOTFOUND"),
            Response::Error => write!(f, "ERROR"),
            Response::BadRequest => write!(f, "ERROR (bad request)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_from_token() {
        assert_eq!(Verb::from_token("SET"), Verb::Set);
        assert_eq!(Verb::from_token("GET"), Verb::Get);
        assert_eq!(Verb::from_token("DEL"), Verb::Del);
        assert_eq!(Verb::from_token("PUT"), Verb::Unknown);
        // Matching is case-sensitive
        assert_eq!(Verb::from_token("set"), Verb::Unknown);
        assert_eq!(Verb::from_token(""), Verb::Unknown);
    }

    #[test]
    fn test_ok_serialize() {
        assert_eq!(Response::ok().serialize(), b"OK\n");
    }

    #[test]
    fn test_ok_with_payload_serialize() {
        let response = Response::ok_with(Bytes::from("hello"));
        assert_eq!(response.serialize(), b"OK\nhello\n");
    }

    #[test]
    fn test_ok_with_empty_payload_serialize() {
        let response = Response::ok_with(Bytes::new());
        assert_eq!(response.serialize(), b"OK\n\n");
    }

    #[test]
    fn test_not_found_serialize() {
        assert_eq!(Response::not_found().serialize(), b"NOTFOUND\n");
    }

    #[test]
    fn test_error_serialize() {
        assert_eq!(Response::error().serialize(), b"ERROR\n");
    }

    #[test]
    fn test_bad_request_serialize() {
        assert_eq!(
            Response::bad_request().serialize(),
            b"ERROR: Incorrect number of arguments\n"
        );
    }

    #[test]
    fn test_binary_payload_serialize() {
        let response = Response::ok_with(Bytes::from(&b"a\x00b"[..]));
        assert_eq!(response.serialize(), b"OK\na\x00b\n");
    }

    #[test]
    fn test_is_error() {
        assert!(Response::error().is_error());
        assert!(Response::bad_request().is_error());
        assert!(!Response::ok().is_error());
        assert!(!Response::not_found().is_error());
    }
}
