//! Signal handlers for record and daemon modes

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;
use tokio::sync::{mpsc, Notify};

/// Shutdown signal for interactive record mode
pub struct ShutdownSignal {
    shutdown: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Get a clone of the shutdown flag
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Mark shutdown and wake any waiter
    pub fn trigger(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Wait until shutdown is requested
    pub async fn wait(&self) {
        if self.is_shutdown() {
            return;
        }
        self.notify.notified().await;
    }

    /// Setup signal handlers (SIGINT and SIGTERM on Unix, Ctrl+C elsewhere)
    pub async fn setup(&self) -> Result<(), std::io::Error> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            for kind in [SignalKind::interrupt(), SignalKind::terminate()] {
                let mut stream = signal(kind)?;
                let shutdown = Arc::clone(&self.shutdown);
                let notify = Arc::clone(&self.notify);
                tokio::spawn(async move {
                    stream.recv().await;
                    shutdown.store(true, Ordering::SeqCst);
                    notify.notify_one();
                });
            }
        }

        #[cfg(not(unix))]
        {
            let shutdown = Arc::clone(&self.shutdown);
            let notify = Arc::clone(&self.notify);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    shutdown.store(true, Ordering::SeqCst);
                    notify.notify_one();
                }
            });
        }

        Ok(())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Daemon signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonSignal {
    /// Start recording
    Start,
    /// Stop recording and save
    Stop,
    /// Start if idle, stop if recording
    Toggle,
    /// Flip camera intent
    Camera,
    /// Flip microphone intent
    Mic,
    /// Shutdown daemon (SIGINT/SIGTERM)
    Shutdown,
}

impl DaemonSignal {
    /// Parse a socket command
    pub fn from_command(cmd: &str) -> Option<Self> {
        match cmd {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "toggle" => Some(Self::Toggle),
            "camera" => Some(Self::Camera),
            "mic" => Some(Self::Mic),
            _ => None,
        }
    }
}

/// Daemon signal handler
///
/// Handles OS shutdown signals and provides a channel for receiving daemon
/// commands from other sources (e.g., the IPC server).
pub struct DaemonSignalHandler {
    receiver: mpsc::Receiver<DaemonSignal>,
}

impl DaemonSignalHandler {
    /// Create a new daemon signal handler and start listening for shutdown signals.
    ///
    /// Returns the handler and a sender that other sources use to send
    /// commands to the daemon loop.
    pub async fn new() -> Result<(Self, mpsc::Sender<DaemonSignal>), std::io::Error> {
        let (handler, tx) = Self::channel();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            for (kind, name) in [
                (SignalKind::interrupt(), "SIGINT"),
                (SignalKind::terminate(), "SIGTERM"),
            ] {
                let tx = tx.clone();
                let mut stream = signal(kind)?;
                tokio::spawn(async move {
                    stream.recv().await;
                    eprintln!("{} Received {} (shutdown)", "↓".cyan(), name);
                    let _ = tx.send(DaemonSignal::Shutdown).await;
                });
            }
        }

        #[cfg(not(unix))]
        {
            let tx = tx.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("{} Received Ctrl+C (shutdown)", "↓".cyan());
                    let _ = tx.send(DaemonSignal::Shutdown).await;
                }
            });
        }

        Ok((handler, tx))
    }

    /// Command channel only, without OS signal listeners
    pub fn channel() -> (Self, mpsc::Sender<DaemonSignal>) {
        let (tx, rx) = mpsc::channel(10);
        (Self { receiver: rx }, tx)
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<DaemonSignal> {
        self.receiver.recv().await
    }
}
