use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Failures in the host around the core: configuration, recordings, CLI input
#[derive(Error, Debug, Diagnostic)]
pub enum HostError {
    #[error("No valid home directory path could be retrieved from the operating system")]
    NoHomeDirectory,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid hex frame: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Frame rejected: {0}")]
    Decode(#[from] flarmlink_core::DecodeError),

    #[error("Cannot read settings from {path}: {source}")]
    #[diagnostic(help("The settings file is JSON with camelCase keys; omitted keys take their defaults"))]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {line} of the recording: {message}")]
    Recording { line: usize, message: String },

    #[error("Frame must be {expected} bytes, got {actual}")]
    FrameLength { expected: usize, actual: usize },

    #[error("Replay speed must be positive, got {0}")]
    #[diagnostic(help("Use --speed 1 for real time, larger values replay faster"))]
    InvalidSpeed(f64),
}
