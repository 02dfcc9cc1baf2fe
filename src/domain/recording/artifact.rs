//! Encoder output buffering and the final downloadable artifact

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::error::InvalidContainerError;

/// Default file name prefix for saved recordings
pub const DEFAULT_FILE_PREFIX: &str = "vibecam-recording";

/// Supported output container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerFormat {
    #[default]
    Webm,
    Matroska,
}

impl ContainerFormat {
    /// Get the MIME type string
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Webm => "video/webm",
            Self::Matroska => "video/x-matroska",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Matroska => "mkv",
        }
    }

    /// Name of the ffmpeg muxer producing this container
    pub const fn muxer(&self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Matroska => "matroska",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ContainerFormat {
    type Err = InvalidContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webm" => Ok(Self::Webm),
            "mkv" | "matroska" => Ok(Self::Matroska),
            _ => Err(InvalidContainerError {
                input: s.to_string(),
            }),
        }
    }
}

/// Ordered chunks emitted by the encoder during one session
#[derive(Debug, Default)]
pub struct OutputBuffer {
    chunks: Vec<Vec<u8>>,
    total_bytes: usize,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk in receipt order. Empty chunks are ignored.
    pub fn push(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenate all chunks into one artifact, consuming the buffer
    pub fn assemble(
        self,
        format: ContainerFormat,
        file_prefix: &str,
        created_at: DateTime<Utc>,
    ) -> Artifact {
        let mut data = Vec::with_capacity(self.total_bytes);
        for chunk in self.chunks {
            data.extend_from_slice(&chunk);
        }
        Artifact::new(data, format, file_prefix, created_at)
    }
}

/// The concatenated output of one recording session
#[derive(Debug, Clone)]
pub struct Artifact {
    data: Vec<u8>,
    format: ContainerFormat,
    created_at: DateTime<Utc>,
    file_name: String,
}

impl Artifact {
    pub fn new(
        data: Vec<u8>,
        format: ContainerFormat,
        file_prefix: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        let file_name = format!(
            "{}-{}.{}",
            file_prefix,
            created_at.timestamp_millis(),
            format.extension()
        );
        Self {
            data,
            format,
            created_at,
            file_name,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// `{prefix}-{unix_millis}.{ext}`
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        format_size(self.size_bytes())
    }
}

/// Format a byte count as B, KB or MB
pub fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_millis(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn container_mime_and_extension() {
        assert_eq!(ContainerFormat::Webm.mime_type(), "video/webm");
        assert_eq!(ContainerFormat::Webm.extension(), "webm");
        assert_eq!(ContainerFormat::Matroska.extension(), "mkv");
        assert_eq!(ContainerFormat::Matroska.muxer(), "matroska");
    }

    #[test]
    fn container_parses() {
        assert_eq!("webm".parse::<ContainerFormat>().unwrap(), ContainerFormat::Webm);
        assert_eq!("MKV".parse::<ContainerFormat>().unwrap(), ContainerFormat::Matroska);
        assert!("avi".parse::<ContainerFormat>().is_err());
    }

    #[test]
    fn buffer_ignores_empty_chunks() {
        let mut buffer = OutputBuffer::new();
        assert!(!buffer.push(Vec::new()));
        assert!(buffer.push(vec![1, 2]));
        assert_eq!(buffer.chunk_count(), 1);
        assert_eq!(buffer.total_bytes(), 2);
    }

    #[test]
    fn assemble_preserves_order() {
        let mut buffer = OutputBuffer::new();
        buffer.push(b"ab".to_vec());
        buffer.push(b"cd".to_vec());
        buffer.push(b"e".to_vec());

        let artifact = buffer.assemble(ContainerFormat::Webm, "rec", at_millis(1));
        assert_eq!(artifact.data(), b"abcde");
    }

    #[test]
    fn assemble_empty_buffer_yields_empty_artifact() {
        let artifact = OutputBuffer::new().assemble(ContainerFormat::Webm, "rec", at_millis(1));
        assert_eq!(artifact.size_bytes(), 0);
    }

    #[test]
    fn file_name_embeds_timestamp() {
        let artifact = Artifact::new(
            vec![],
            ContainerFormat::Webm,
            DEFAULT_FILE_PREFIX,
            at_millis(1_700_000_000_123),
        );
        assert_eq!(artifact.file_name(), "vibecam-recording-1700000000123.webm");
    }

    #[test]
    fn human_readable_size() {
        let small = Artifact::new(vec![0; 512], ContainerFormat::Webm, "r", at_millis(0));
        assert_eq!(small.human_readable_size(), "512 B");

        let kb = Artifact::new(vec![0; 2048], ContainerFormat::Webm, "r", at_millis(0));
        assert_eq!(kb.human_readable_size(), "2.0 KB");

        let mb = Artifact::new(vec![0; 3 * 1024 * 1024], ContainerFormat::Webm, "r", at_millis(0));
        assert_eq!(mb.human_readable_size(), "3.0 MB");
    }
}
