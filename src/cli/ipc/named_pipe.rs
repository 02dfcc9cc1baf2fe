//! Windows named pipe endpoint for daemon control

use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::net::windows::named_pipe::{ClientOptions, NamedPipeServer as PipeInstance, ServerOptions};
use tokio::sync::mpsc;
use tracing::warn;

use super::{handle_connection, request, IpcClient, IpcServer, StatusFn};
use crate::cli::signals::DaemonSignal;

/// `ERROR_PIPE_BUSY`: every instance is serving another client
const PIPE_BUSY: i32 = 231;

#[derive(Debug, Clone)]
pub struct PipePath {
    name: String,
}

impl PipePath {
    pub fn new() -> Self {
        Self {
            name: r"\\.\pipe\vibecam".to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for PipePath {
    fn default() -> Self {
        Self::new()
    }
}

/// Serves daemon commands on a named pipe.
///
/// `bind` claims the first instance, which also fails if another daemon
/// already owns the name. A fresh instance is created before each accepted
/// client is handed off so callers never find the pipe missing.
pub struct NamedPipeServer {
    pipe: PipePath,
    first: Mutex<Option<PipeInstance>>,
}

impl NamedPipeServer {
    pub fn new(pipe: PipePath) -> Self {
        Self {
            pipe,
            first: Mutex::new(None),
        }
    }
}

#[async_trait]
impl IpcServer for NamedPipeServer {
    fn bind(&mut self) -> io::Result<()> {
        let instance = ServerOptions::new()
            .first_pipe_instance(true)
            .create(self.pipe.name())?;
        *self.first.get_mut().unwrap_or_else(|e| e.into_inner()) = Some(instance);
        Ok(())
    }

    fn path(&self) -> String {
        self.pipe.name().to_string()
    }

    async fn run(&self, tx: mpsc::Sender<DaemonSignal>, status_fn: StatusFn) -> io::Result<()> {
        let mut waiting = self
            .first
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Pipe not bound"))?;

        loop {
            waiting.connect().await?;
            let connected = waiting;
            waiting = ServerOptions::new().create(self.pipe.name())?;

            let tx = tx.clone();
            let status_fn = status_fn.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(connected, tx, status_fn).await {
                    warn!(error = %e, "Pipe connection error");
                }
            });
        }
    }

    // Instances close with their handles
    fn cleanup(&self) {}
}

pub struct NamedPipeClient {
    pipe: PipePath,
}

impl NamedPipeClient {
    pub fn new(pipe: PipePath) -> Self {
        Self { pipe }
    }
}

#[async_trait]
impl IpcClient for NamedPipeClient {
    fn is_daemon_running(&self) -> bool {
        match ClientOptions::new().open(self.pipe.name()) {
            Ok(_) => true,
            Err(e) => e.raw_os_error() == Some(PIPE_BUSY),
        }
    }

    async fn send_command(&self, cmd: &str) -> io::Result<String> {
        let pipe = ClientOptions::new().open(self.pipe.name())?;
        request(pipe, cmd).await
    }
}
