//! filekv - A File-Backed Networked Key-Value Store
//!
//! This is the main entry point for the filekv server. It parses the
//! configuration, opens the storage directory, binds the TCP listener,
//! and serves connections one at a time.

use anyhow::{anyhow, Context};
use filekv::commands::CommandHandler;
use filekv::connection::{handle_connection, DEFAULT_IO_TIMEOUT};
use filekv::storage::{FsStorage, Storage};
use filekv::BACKLOG;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Directory entries are stored under
    dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: filekv::DEFAULT_HOST.to_string(),
            port: filekv::DEFAULT_PORT,
            dir: filekv::DEFAULT_DATA_DIR.to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--dir" | "-d" => {
                    if i + 1 < args.len() {
                        config.dir = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --dir requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("filekv version {}", filekv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Resolves the configured host and port to a socket address.
    ///
    /// The host must be an IP address literal, not a name.
    fn server_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| anyhow!("invalid server IP address: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn print_help() {
    println!(
        r#"
filekv - A File-Backed Networked Key-Value Store

USAGE:
    filekv [OPTIONS]

OPTIONS:
    -h, --host <HOST>    IP address to bind to (default: 127.0.0.1)
    -p, --port <PORT>    Port to listen on (default: 5000)
    -d, --dir <DIR>      Storage directory (default: data)
    -v, --version        Print version information
        --help           Print this help message

EXAMPLES:
    filekv                         # Serve 127.0.0.1:5000 out of ./data
    filekv --port 5001             # Serve on port 5001
    filekv --dir /var/lib/filekv   # Store entries elsewhere

CONNECTING:
    One command per connection, plain text:
    $ printf 'SET name Ariz\n' | nc 127.0.0.1 5000
    OK
    $ printf 'GET name\n' | nc 127.0.0.1 5000
    OK
    Ariz
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
filekv v{} - File-Backed Key-Value Store
────────────────────────────────────────
Serving {}:{}, entries stored in "{}"

Use Ctrl+C to shut down.
"#,
        filekv::VERSION,
        config.host,
        config.port,
        config.dir,
    );
}

/// Binds the listener with the fixed backlog depth.
fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.bind(addr)?;
    socket.listen(BACKLOG)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Print the banner
    print_banner(&config);

    // Open the storage namespace
    let storage = Arc::new(
        FsStorage::open(&config.dir)
            .with_context(|| format!("failed to open storage directory {:?}", config.dir))?,
    );
    info!("Storage ready in {:?}", storage.root());

    let executor = CommandHandler::new(storage);

    // Bind the TCP listener. Any failure here is fatal: the server
    // never starts serving on a half-working socket.
    let addr = config.server_addr()?;
    let listener =
        bind_listener(addr).with_context(|| format!("failed to listen on {}", addr))?;
    info!("Server is listening on {}", addr);

    // Set up graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop
    tokio::select! {
        _ = accept_loop(listener, executor) => {}
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Accepts connections and serves them strictly one at a time.
///
/// Each accepted connection is handled to completion before the next
/// `accept`, so requests are served in acceptance order and storage is
/// never touched by two requests at once. A failed accept is logged and
/// the loop keeps going.
async fn accept_loop<S: Storage>(listener: TcpListener, executor: CommandHandler<S>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!(client = %addr, "Connection established");
                handle_connection(stream, addr, executor.clone(), DEFAULT_IO_TIMEOUT).await;
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
