//! Connection Handling Module
//!
//! This module manages individual client connections: one bounded read,
//! one parsed and executed command, one response, then the connection
//! closes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              TCP Listener                   │
//! │               (main.rs)                     │
//! └────────────────────┬────────────────────────┘
//!                      │ accept, one at a time
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │            ConnectionHandler                │
//! │                                             │
//! │  read once ──> parse ──> execute ──> write  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Faults are contained here: a bad or silent client costs the server
//! one connection, never the accept loop.

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, DEFAULT_IO_TIMEOUT};
