//! Request Line Parser
//!
//! Turns one raw request buffer into a [`Command`] or a parse error.
//!
//! ## Grammar
//!
//! ```text
//! <VERB> <KEY> [<VALUE>]
//! ```
//!
//! VERB and KEY are whitespace-delimited tokens; VALUE is the remainder
//! of the line, terminated by a newline or the end of the buffer, and may
//! contain interior whitespace.
//!
//! ## Bounded-field scanning
//!
//! Every field has a hard byte limit (verb 15, key 255, value 767). A
//! token longer than its field limit is NOT rejected: the scan stops at
//! the limit and the remaining bytes are picked up by the next field.
//! An over-long value is cut at 767 bytes. This lossy truncation policy
//! is deliberate and part of the protocol contract; callers that need a
//! hard rejection must check lengths before submitting a request.
//!
//! ## Token count
//!
//! - 2 tokens: command with an empty value
//! - 3 tokens: command with a value
//! - fewer than 2 tokens: parse error
//!
//! An unrecognized verb is not a parse error. It produces a command with
//! [`Verb::Unknown`], which the executor answers with `ERROR`.
//!
//! The parser never reads past the supplied buffer.

use crate::protocol::types::{Command, Verb};
use crate::{MAX_KEY_LEN, MAX_VALUE_LEN, MAX_VERB_LEN};
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur while parsing a request line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The request had fewer than two tokens.
    #[error("incorrect number of arguments")]
    IncorrectArgumentCount,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses one raw request buffer into a [`Command`].
///
/// # Returns
///
/// - `Ok(command)` - the buffer held at least a verb and a key
/// - `Err(ParseError::IncorrectArgumentCount)` - fewer than two tokens
///
/// # Example
///
/// ```
/// use filekv::protocol::{parse_request, Verb};
///
/// let command = parse_request(b"SET greeting hello world").unwrap();
/// assert_eq!(command.verb, Verb::Set);
/// assert_eq!(command.key, "greeting");
/// assert_eq!(&command.value[..], b"hello world");
/// ```
pub fn parse_request(buf: &[u8]) -> ParseResult<Command> {
    let mut pos = skip_whitespace(buf, 0);

    // Verb: up to 15 bytes of the first token
    let verb_end = token_end(buf, pos, MAX_VERB_LEN);
    if verb_end == pos {
        return Err(ParseError::IncorrectArgumentCount);
    }
    let verb = match std::str::from_utf8(&buf[pos..verb_end]) {
        Ok(token) => Verb::from_token(token),
        Err(_) => Verb::Unknown,
    };

    // Key: up to 255 bytes of the next token. If the verb token was cut
    // at its limit, the key scan resumes mid-token with no whitespace in
    // between.
    pos = skip_whitespace(buf, verb_end);
    let key_end = token_end(buf, pos, MAX_KEY_LEN);
    if key_end == pos {
        return Err(ParseError::IncorrectArgumentCount);
    }
    let key = String::from_utf8_lossy(&buf[pos..key_end]).into_owned();

    // Value: the rest of the line, up to 767 bytes
    pos = skip_whitespace(buf, key_end);
    let value_end = line_end(buf, pos, MAX_VALUE_LEN);
    let value = Bytes::copy_from_slice(&buf[pos..value_end]);

    Ok(Command::new(verb, key, value))
}

/// Advances past ASCII whitespace, returning the first non-whitespace
/// position (or the buffer length).
#[inline]
fn skip_whitespace(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() && buf[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Returns the end of a whitespace-delimited token starting at `pos`,
/// capped at `max` bytes.
#[inline]
fn token_end(buf: &[u8], pos: usize, max: usize) -> usize {
    let mut end = pos;
    while end < buf.len() && end - pos < max && !buf[end].is_ascii_whitespace() {
        end += 1;
    }
    end
}

/// Returns the end of a line-terminated field starting at `pos`, capped
/// at `max` bytes. Stops only at a newline, never at interior spaces.
#[inline]
fn line_end(buf: &[u8], pos: usize, max: usize) -> usize {
    let mut end = pos;
    while end < buf.len() && end - pos < max && buf[end] != b'\n' {
        end += 1;
    }
    end
}
