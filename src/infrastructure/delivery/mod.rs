//! Artifact delivery adapters

mod download_dir;

pub use download_dir::DownloadDirSink;
