//! IPC (Inter-Process Communication) module for daemon control
//!
//! Provides platform-specific implementations:
//! - Unix (Linux/macOS): Unix Domain Sockets
//! - Windows: Named Pipes
//!
//! The protocol is one command line per connection answered by one line:
//! `ok`, the JSON status snapshot, or `error: <reason>`.

#[cfg(windows)]
mod named_pipe;
#[cfg(unix)]
mod unix_socket;

#[cfg(windows)]
pub use named_pipe::{NamedPipeClient, NamedPipeServer, PipePath};
#[cfg(unix)]
pub use unix_socket::{SocketPath, UnixSocketClient, UnixSocketServer};

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use super::signals::DaemonSignal;

/// Produces the status line (a JSON session snapshot)
pub type StatusFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Trait for IPC servers that listen for daemon commands
#[async_trait::async_trait]
pub trait IpcServer: Send + Sync {
    /// Bind to the IPC endpoint
    fn bind(&mut self) -> io::Result<()>;

    /// Get the path/name of the IPC endpoint
    fn path(&self) -> String;

    /// Accept and handle connections
    ///
    /// Each control command is forwarded to `tx`; `status` is answered
    /// directly from `status_fn`.
    async fn run(&self, tx: mpsc::Sender<DaemonSignal>, status_fn: StatusFn) -> io::Result<()>;

    /// Cleanup IPC resources
    fn cleanup(&self);
}

/// Trait for IPC clients that send commands to the daemon
#[async_trait::async_trait]
pub trait IpcClient: Send + Sync {
    /// Check if daemon appears to be running (endpoint exists)
    fn is_daemon_running(&self) -> bool;

    /// Send a command and receive response
    async fn send_command(&self, cmd: &str) -> io::Result<String>;
}

/// Serve a single client connection
pub(crate) async fn handle_connection<T>(
    stream: T,
    tx: mpsc::Sender<DaemonSignal>,
    status_fn: StatusFn,
) -> io::Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        // Liveness check: connected and hung up
        return Ok(());
    }

    let cmd = line.trim();
    debug!(command = cmd, "IPC command received");
    let response = match cmd {
        "status" => format!("{}\n", status_fn()),
        _ => match DaemonSignal::from_command(cmd) {
            Some(signal) => match tx.send(signal).await {
                Ok(()) => "ok\n".to_string(),
                Err(_) => "error: daemon is shutting down\n".to_string(),
            },
            None => "error: unknown command\n".to_string(),
        },
    };

    writer.write_all(response.as_bytes()).await?;
    writer.flush().await?;
    writer.shutdown().await?;
    Ok(())
}

/// Client side of the protocol: send `cmd`, read the single reply line
pub(crate) async fn request<T>(stream: T, cmd: &str) -> io::Result<String>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    writer.write_all(format!("{}\n", cmd).as_bytes()).await?;
    writer.flush().await?;

    let mut response = String::new();
    BufReader::new(reader).read_line(&mut response).await?;
    Ok(response)
}

/// Create the appropriate IPC server for the current platform
#[cfg(unix)]
pub fn create_ipc_server() -> Box<dyn IpcServer> {
    Box::new(UnixSocketServer::new(SocketPath::new()))
}

#[cfg(windows)]
pub fn create_ipc_server() -> Box<dyn IpcServer> {
    Box::new(NamedPipeServer::new(PipePath::new()))
}

/// Create the appropriate IPC client for the current platform
#[cfg(unix)]
pub fn create_ipc_client() -> Box<dyn IpcClient> {
    Box::new(UnixSocketClient::new(SocketPath::new()))
}

#[cfg(windows)]
pub fn create_ipc_client() -> Box<dyn IpcClient> {
    Box::new(NamedPipeClient::new(PipePath::new()))
}
