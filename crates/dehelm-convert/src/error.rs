//! Error types for the converter
//!
//! Errors fall into three families: an incomplete lookup table
//! (configuration), a document that cannot be turned into an object
//! (malformed input), and filesystem failures.

use std::path::PathBuf;
use thiserror::Error;

/// Converter error
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document {index} has no source annotation on its first line")]
    MissingSourceAnnotation { index: usize },

    #[error("No matching destination path found in path map for {source_path}")]
    UnmappedSource { source_path: String },

    #[error("No matching registry prefix found in image map for {image} (prefix: '{prefix}')")]
    UnmappedImage { image: String, prefix: String },

    #[error("Container image at {path} is not a string")]
    InvalidImage { path: String },

    #[error("YAML error in document {index}: {source}")]
    Yaml {
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid document {index}: {message}")]
    InvalidDocument { index: usize, message: String },
}

/// Broad classification of an error, used to pick an exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A lookup table is missing an entry
    Configuration,
    /// The manifest contains a document that cannot be processed
    Malformed,
    /// Reading the manifest or writing output failed
    Io,
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::UnmappedSource { .. } | Self::UnmappedImage { .. } => ErrorKind::Configuration,
            Self::MissingSourceAnnotation { .. }
            | Self::InvalidImage { .. }
            | Self::Yaml { .. }
            | Self::InvalidDocument { .. } => ErrorKind::Malformed,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            index,
            message: message.into(),
        }
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
