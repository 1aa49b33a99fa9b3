//! Error types for the Darkroom photo loading pipeline.
//!
//! Errors are organized by stage so a failed load names the step that broke
//! (probe, allocation, conversion) together with the paths involved.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Top-level error type for Darkroom operations.
#[derive(Error, Debug)]
pub enum DarkroomError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, one variant per failing stage.
///
/// Cleanup never produces one of these: per-file deletion errors are
/// absorbed inside [`Cleaner::clean`](crate::pipeline::Cleaner::clean).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The inspection process could not run, exited non-zero, or printed
    /// something that does not match the frame template
    #[error("Probe failed for {path}: {message}")]
    Probe { path: PathBuf, message: String },

    /// A temporary artifact could not be reserved in the working directory
    #[error("Cannot allocate temporary file in {dir}: {message}")]
    Allocation { dir: PathBuf, message: String },

    /// The transform process could not run or exited non-zero
    #[error("Conversion {src} -> {dest} failed: {message}")]
    Conversion {
        src: PathBuf,
        dest: PathBuf,
        message: String,
    },

    /// Probed metadata or caller options cannot be turned into parameters
    #[error("Invalid input for {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },
}

/// Failures at the external engine boundary.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine binary could not be started
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but reported failure
    #[error("`{program}` exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// A scripted or misconfigured engine refused the request
    #[error("{0}")]
    Rejected(String),
}

/// Convenience type alias for Darkroom results.
pub type Result<T> = std::result::Result<T, DarkroomError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
