//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::recording::{ContainerFormat, Duration};

/// vibecam - screen recorder with camera picture-in-picture
#[derive(Parser, Debug)]
#[command(name = "vibecam")]
#[command(version)]
#[command(about = "Record the screen, optionally with microphone and a camera preview")]
#[command(long_about = None)]
pub struct Cli {
    /// Show a camera picture-in-picture preview while recording
    #[arg(long)]
    pub camera: bool,

    /// Record microphone audio with the screen
    #[arg(long, overrides_with = "no_mic")]
    pub mic: bool,

    /// Record without microphone audio
    #[arg(long, overrides_with = "mic")]
    pub no_mic: bool,

    /// Directory the recording is saved to
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Stop automatically after this long (e.g. 30s, 5m, 1h30m)
    #[arg(long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Output container
    #[arg(long, value_name = "FORMAT")]
    pub container: Option<ContainerArg>,

    /// Show desktop notifications
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Play a chime when recording starts and stops
    #[arg(long)]
    pub audio_cues: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Run as daemon (control via: vibecam daemon start/stop/toggle/status)
    #[arg(long)]
    pub daemon: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Microphone intent given on the command line, if any
    pub fn mic_override(&self) -> Option<bool> {
        if self.no_mic {
            Some(false)
        } else if self.mic {
            Some(true)
        } else {
            None
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Send commands to running daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// List cameras and microphones
    Devices,
}

/// Daemon control actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonAction {
    /// Start recording
    Start,
    /// Stop recording and save
    Stop,
    /// Start if idle, stop if recording
    Toggle,
    /// Toggle the camera for the next recording
    Camera,
    /// Toggle the microphone for the next recording
    Mic,
    /// Show daemon status as JSON
    Status,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Container argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ContainerArg {
    Webm,
    Mkv,
}

impl From<ContainerArg> for ContainerFormat {
    fn from(arg: ContainerArg) -> Self {
        match arg {
            ContainerArg::Webm => ContainerFormat::Webm,
            ContainerArg::Mkv => ContainerFormat::Matroska,
        }
    }
}

/// Fully resolved options for a recording run
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub camera: bool,
    pub microphone: bool,
    pub output_dir: Option<String>,
    pub file_prefix: String,
    pub container: ContainerFormat,
    pub max_duration: Option<Duration>,
    pub notify: bool,
    pub audio_cues: bool,
    pub display: Option<String>,
    pub audio_source: Option<String>,
    pub camera_device: Option<String>,
    pub framerate: u32,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "camera",
    "microphone",
    "output_dir",
    "file_prefix",
    "container",
    "max_duration",
    "notify",
    "audio_cues",
    "capture.display",
    "capture.audio_source",
    "capture.camera_device",
    "capture.framerate",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
