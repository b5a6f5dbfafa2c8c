//! Wire Protocol Implementation
//!
//! This module implements the line-oriented text protocol spoken between
//! clients and the server: one request line in, one response out.
//!
//! ## Modules
//!
//! - `types`: request and response types with wire serialization
//! - `parser`: bounded-field parser for incoming request lines
//!
//! ## Example
//!
//! ```
//! use filekv::protocol::{parse_request, Response, Verb};
//!
//! let command = parse_request(b"GET name").unwrap();
//! assert_eq!(command.verb, Verb::Get);
//!
//! let response = Response::not_found();
//! assert_eq!(response.serialize(), b"NOTFOUND\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_request, ParseError, ParseResult};
pub use types::{Command, Response, Verb};
