//! Saves artifacts into the user's download directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::{ArtifactSink, DeliveryError, DeliveryReceipt};
use crate::domain::recording::Artifact;

/// Writes each artifact as `{dir}/{file_name}`
pub struct DownloadDirSink {
    dir: Option<PathBuf>,
}

impl DownloadDirSink {
    /// Use `dir`, falling back to the platform download directory
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.or_else(default_download_dir),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

impl Default for DownloadDirSink {
    fn default() -> Self {
        Self::new(None)
    }
}

fn default_download_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
}

#[async_trait]
impl ArtifactSink for DownloadDirSink {
    async fn deliver(&self, artifact: &Artifact) -> Result<DeliveryReceipt, DeliveryError> {
        let dir = self.dir.as_ref().ok_or(DeliveryError::NoOutputDirectory)?;
        let path = dir.join(artifact.file_name());
        let write_failed = |message: String| DeliveryError::WriteFailed {
            path: path.to_string_lossy().to_string(),
            message,
        };

        fs::create_dir_all(dir)
            .await
            .map_err(|e| write_failed(e.to_string()))?;
        fs::write(&path, artifact.data())
            .await
            .map_err(|e| write_failed(e.to_string()))?;

        Ok(DeliveryReceipt {
            size: artifact.size_bytes(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::ContainerFormat;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn artifact(data: &[u8]) -> Artifact {
        let created = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        Artifact::new(data.to_vec(), ContainerFormat::Webm, "vibecam-recording", created)
    }

    #[tokio::test]
    async fn writes_named_file() {
        let dir = TempDir::new().unwrap();
        let sink = DownloadDirSink::new(Some(dir.path().join("videos")));

        let receipt = sink.deliver(&artifact(b"webm-bytes")).await.unwrap();

        assert_eq!(
            receipt.path,
            dir.path().join("videos/vibecam-recording-1700000000000.webm")
        );
        assert_eq!(receipt.size, 10);
        assert_eq!(std::fs::read(&receipt.path).unwrap(), b"webm-bytes");
    }

    #[tokio::test]
    async fn empty_artifact_is_still_written() {
        let dir = TempDir::new().unwrap();
        let sink = DownloadDirSink::new(Some(dir.path().to_path_buf()));

        let receipt = sink.deliver(&artifact(b"")).await.unwrap();
        assert_eq!(receipt.size, 0);
        assert!(receipt.path.exists());
    }

    #[tokio::test]
    async fn unwritable_target_reports_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let sink = DownloadDirSink::new(Some(blocker.join("sub")));

        let err = sink.deliver(&artifact(b"x")).await.unwrap_err();
        assert!(matches!(err, DeliveryError::WriteFailed { .. }));
    }
}
