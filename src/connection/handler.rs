//! Connection Handler
//!
//! This module serves exactly one request per connection. The lifecycle
//! is a straight line, not a loop:
//!
//! ```text
//! accepted ──> read (bounded, once) ──> parse ──> execute ──> respond ──> closed
//!                   │                      │
//!                   │ zero bytes           │ fewer than 2 tokens
//!                   ▼                      ▼
//!             closed, no response    fixed error response
//! ```
//!
//! There is no keep-alive: after one response (or a read fault with no
//! response) the connection is released, on every exit path. A fault in
//! one connection never reaches the accept loop; the server always moves
//! on to the next client.
//!
//! Reads and writes are guarded by a timeout so a slow or silent client
//! cannot stall the server indefinitely.

use crate::commands::CommandHandler;
use crate::protocol::{parse_request, Response};
use crate::storage::Storage;
use crate::MAX_REQUEST_LEN;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default bound on each read and write against a client socket.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur while handling a connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection before sending any bytes.
    #[error("peer closed before sending a request")]
    PeerClosed,

    /// The peer was too slow to send or to receive.
    #[error("connection timed out while {0}")]
    TimedOut(&'static str),
}

/// Handles a single client connection.
///
/// Owns the stream for the connection's whole lifetime; dropping the
/// handler releases the connection on every exit path.
pub struct ConnectionHandler<S: Storage> {
    /// The TCP stream for this connection
    stream: TcpStream,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// The command executor (shared across connections)
    executor: CommandHandler<S>,

    /// Bound on each socket read and write
    io_timeout: Duration,
}

impl<S: Storage> ConnectionHandler<S> {
    /// Creates a new connection handler.
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        executor: CommandHandler<S>,
        io_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            addr,
            executor,
            io_timeout,
        }
    }

    /// Serves the single request on this connection.
    ///
    /// Reads one bounded request, parses and executes it, writes one
    /// response, and returns. The connection closes when the handler is
    /// dropped, whichever path was taken.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        debug!(client = %self.addr, "Client connected");

        let mut buf = [0u8; MAX_REQUEST_LEN];
        let n = timeout(self.io_timeout, self.stream.read(&mut buf))
            .await
            .map_err(|_| ConnectionError::TimedOut("reading the request"))??;

        // Zero bytes: the peer closed without a request. Terminal for
        // this connection only; no response is owed.
        if n == 0 {
            return Err(ConnectionError::PeerClosed);
        }

        let preview = String::from_utf8_lossy(&buf[..n]);
        debug!(client = %self.addr, request = %preview.trim_end(), "Received command");

        let response = match parse_request(&buf[..n]) {
            Ok(command) => self.executor.execute(command),
            Err(e) => {
                debug!(client = %self.addr, error = %e, "Malformed request");
                Response::bad_request()
            }
        };

        // write_all retries short writes until the whole response is out
        let bytes = response.serialize();
        timeout(self.io_timeout, self.stream.write_all(&bytes))
            .await
            .map_err(|_| ConnectionError::TimedOut("writing the response"))??;

        debug!(client = %self.addr, response = %response, "Responded");
        Ok(())
    }
}

/// Handles a client connection, containing every fault.
///
/// This is the seam between the accept loop and a connection: whatever
/// goes wrong in here is logged and swallowed, so the listener keeps
/// accepting.
pub async fn handle_connection<S: Storage>(
    stream: TcpStream,
    addr: SocketAddr,
    executor: CommandHandler<S>,
    io_timeout: Duration,
) {
    let handler = ConnectionHandler::new(stream, addr, executor, io_timeout);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::PeerClosed => {
                debug!(client = %addr, "Peer closed without sending a request")
            }
            ConnectionError::TimedOut(stage) => {
                warn!(client = %addr, stage, "Connection timed out")
            }
            ConnectionError::Io(err) => {
                warn!(client = %addr, error = %err, "Connection error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsStorage;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    /// Starts a server with the production accept behavior: connections
    /// are served sequentially, each to completion before the next.
    async fn start_test_server(io_timeout: Duration) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FsStorage::open(dir.path()).unwrap());
        let executor = CommandHandler::new(storage);

        tokio::spawn(async move {
            // The tempdir lives as long as the server task
            let _dir = dir;
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        handle_connection(stream, peer, executor.clone(), io_timeout).await;
                    }
                    Err(_) => break,
                }
            }
        });

        addr
    }

    /// One request over one fresh connection, like a real client.
    async fn request(addr: SocketAddr, line: &[u8]) -> Vec<u8> {
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(line).await.unwrap();

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_set_then_get_across_connections() {
        let addr = start_test_server(DEFAULT_IO_TIMEOUT).await;

        assert_eq!(request(addr, b"SET name Ariz\n").await, b"OK\n");
        assert_eq!(request(addr, b"GET name\n").await, b"OK\nAriz\n");
    }

    #[tokio::test]
    async fn test_value_with_spaces_roundtrip() {
        let addr = start_test_server(DEFAULT_IO_TIMEOUT).await;

        assert_eq!(request(addr, b"SET motd hello brave world\n").await, b"OK\n");
        assert_eq!(
            request(addr, b"GET motd\n").await,
            b"OK\nhello brave world\n"
        );
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let addr = start_test_server(DEFAULT_IO_TIMEOUT).await;
        assert_eq!(request(addr, b"GET nothing\n").await, b"NOTFOUND\n");
    }

    #[tokio::test]
    async fn test_overwrite_then_get() {
        let addr = start_test_server(DEFAULT_IO_TIMEOUT).await;

        request(addr, b"SET k v1\n").await;
        request(addr, b"SET k v2\n").await;
        assert_eq!(request(addr, b"GET k\n").await, b"OK\nv2\n");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let addr = start_test_server(DEFAULT_IO_TIMEOUT).await;

        request(addr, b"SET gone soon\n").await;
        assert_eq!(request(addr, b"DEL gone\n").await, b"OK\n");
        assert_eq!(request(addr, b"DEL gone\n").await, b"OK\n");
        assert_eq!(request(addr, b"GET gone\n").await, b"NOTFOUND\n");
    }

    #[tokio::test]
    async fn test_unknown_verb() {
        let addr = start_test_server(DEFAULT_IO_TIMEOUT).await;
        assert_eq!(request(addr, b"PUT name Ariz\n").await, b"ERROR\n");
    }

    #[tokio::test]
    async fn test_malformed_request() {
        let addr = start_test_server(DEFAULT_IO_TIMEOUT).await;
        assert_eq!(
            request(addr, b"SET\n").await,
            b"ERROR: Incorrect number of arguments\n"
        );
    }

    #[tokio::test]
    async fn test_traversal_key_rejected() {
        let addr = start_test_server(DEFAULT_IO_TIMEOUT).await;
        assert_eq!(request(addr, b"SET ../escape v\n").await, b"ERROR\n");
    }

    #[tokio::test]
    async fn test_silent_peer_does_not_stop_the_server() {
        let addr = start_test_server(DEFAULT_IO_TIMEOUT).await;

        // Connect and close without sending a single byte
        let silent = TcpStream::connect(addr).await.unwrap();
        drop(silent);

        // The next connection is served normally
        assert_eq!(request(addr, b"SET alive yes\n").await, b"OK\n");
        assert_eq!(request(addr, b"GET alive\n").await, b"OK\nyes\n");
    }

    #[tokio::test]
    async fn test_idle_peer_times_out_and_server_continues() {
        let addr = start_test_server(Duration::from_millis(100)).await;

        // Connect and send nothing; the server should give up on us
        // without a response, then keep serving others
        let mut idle = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 16];
        let n = idle.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);

        assert_eq!(request(addr, b"SET next one\n").await, b"OK\n");
    }
}
