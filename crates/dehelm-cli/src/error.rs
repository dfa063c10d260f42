//! CLI error types with exit code handling
//!
//! Converter errors are mapped onto diagnostics with a help line and the
//! exit code for their family.

use dehelm_convert::{ConvertError, ErrorKind};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// A lookup table is missing an entry
    #[error("Configuration incomplete: {message}")]
    #[diagnostic(code(dehelm::cli::configuration))]
    Configuration {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The manifest contains a document that cannot be processed
    #[error("Malformed manifest: {message}")]
    #[diagnostic(code(dehelm::cli::malformed))]
    Malformed {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(dehelm::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Configuration { .. } => exit_codes::CONFIG_ERROR,
            CliError::Malformed { .. } => exit_codes::MALFORMED_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }
}

impl From<ConvertError> for CliError {
    fn from(err: ConvertError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Configuration => {
                let help = match err {
                    ConvertError::UnmappedImage { .. } => {
                        "Add the registry prefix to the profile's image map"
                    }
                    _ => "Add the chart directory to the profile's path map",
                };
                CliError::Configuration {
                    message,
                    help: Some(help.to_string()),
                }
            }
            ErrorKind::Malformed => CliError::Malformed {
                message,
                help: Some(
                    "Each document needs a '# Source:' line, a kind and a metadata.name"
                        .to_string(),
                ),
            },
            ErrorKind::Io => CliError::Io { message },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
