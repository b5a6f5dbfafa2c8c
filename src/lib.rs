//! # filekv - A Minimal Networked Key-Value Store
//!
//! filekv is a small TCP key-value server whose persistence layer is the
//! filesystem itself: every key is a file in a flat namespace directory,
//! and the value is that file's content. A client connects, sends one
//! line, gets one response, and the connection closes.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                            filekv                              │
//! │                                                                │
//! │  ┌────────────┐    ┌─────────────┐    ┌────────────────┐       │
//! │  │  Listener  │───>│ Connection  │───>│  Line Parser   │       │
//! │  │ (main.rs)  │    │  Handler    │    │  (protocol)    │       │
//! │  └────────────┘    └─────────────┘    └───────┬────────┘       │
//! │                                               │                │
//! │                                               ▼                │
//! │                    ┌─────────────┐    ┌────────────────┐       │
//! │                    │  Storage    │<───│ CommandHandler │       │
//! │                    │ (files on   │    │  (commands)    │       │
//! │                    │   disk)     │    └────────────────┘       │
//! │                    └─────────────┘                             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Connections are accepted and served strictly one at a time, in
//! acceptance order; the response flows back through the same path and
//! the connection closes after a single request.
//!
//! ## Wire Protocol
//!
//! One ASCII request line, at most 1023 bytes:
//!
//! ```text
//! SET <key> [<value>]      -> OK | ERROR
//! GET <key>                -> OK + value | NOTFOUND | ERROR
//! DEL <key>                -> OK
//! ```
//!
//! Anything else answers `ERROR`, and a request with fewer than two
//! tokens answers `ERROR: Incorrect number of arguments`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use filekv::commands::CommandHandler;
//! use filekv::connection::{handle_connection, DEFAULT_IO_TIMEOUT};
//! use filekv::storage::FsStorage;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = Arc::new(FsStorage::open("data")?);
//!     let executor = CommandHandler::new(storage);
//!     let listener = TcpListener::bind("127.0.0.1:5000").await?;
//!
//!     loop {
//!         let (stream, addr) = listener.accept().await?;
//!         // Await, not spawn: one connection in flight at a time
//!         handle_connection(stream, addr, executor.clone(), DEFAULT_IO_TIMEOUT).await;
//!     }
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: request/response types and the bounded-field parser
//! - [`storage`]: the [`Storage`](storage::Storage) trait, key
//!   validation, and the file-backed engine
//! - [`commands`]: command execution against the storage engine
//! - [`connection`]: one-request-per-connection handling with timeouts

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionError, ConnectionHandler};
pub use protocol::{parse_request, Command, ParseError, Response, Verb};
pub use storage::{FsStorage, KeyError, Storage, StorageError};

/// The default host filekv binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default port filekv listens on.
pub const DEFAULT_PORT: u16 = 5000;

/// The default directory entries are stored under.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Listen backlog: pending connections queue up to this depth.
pub const BACKLOG: u32 = 10;

/// Maximum bytes read from a connection for one request.
pub const MAX_REQUEST_LEN: usize = 1023;

/// Maximum bytes of a verb token; longer tokens are cut here.
pub const MAX_VERB_LEN: usize = 15;

/// Maximum bytes of a key.
pub const MAX_KEY_LEN: usize = 255;

/// Maximum bytes of a value, on write and on read-back.
pub const MAX_VALUE_LEN: usize = 767;

/// Version of filekv.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
