//! Artifact delivery port interface

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::Artifact;

/// Delivery errors
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("No output directory available")]
    NoOutputDirectory,

    #[error("Failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },
}

/// Where and how much was delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub path: PathBuf,
    pub size: usize,
}

/// Port for handing a finished artifact to the user
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn deliver(&self, artifact: &Artifact) -> Result<DeliveryReceipt, DeliveryError>;
}
