//! Unified error types for the layerbox workspace.
//!
//! Every fallible step returns [`Result`]; only the two top-level
//! handlers (the CLI on the host side, the clone callback inside the
//! isolated context) print diagnostics and terminate.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A field of the container spec is malformed.
    #[error("invalid {field}: {message}")]
    InvalidSpec {
        /// Spec field that failed validation.
        field: &'static str,
        /// Description of the violation.
        message: String,
    },

    /// The container identifier is longer than the runtime accepts.
    #[error("identifier exceeds maximum length ({len} > {max} bytes)")]
    IdTooLong {
        /// Length of the rejected identifier.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// A derived path would not fit in `PATH_MAX`.
    #[error("path exceeds maximum length ({max} bytes): {path}")]
    PathTooLong {
        /// The offending path.
        path: PathBuf,
        /// Maximum accepted length.
        max: usize,
    },

    /// The base image directory does not exist.
    #[error("image not found: {path}")]
    ImageNotFound {
        /// Expected location of the image.
        path: PathBuf,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A `mount(2)` or `umount2(2)` call failed.
    #[error("{operation} failed at {target}: {source}")]
    Mount {
        /// Short name of the mount operation.
        operation: &'static str,
        /// Mount target.
        target: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Creating or waiting on the isolated execution context failed.
    #[error("{message}: {source}")]
    Namespace {
        /// Description of the failed step.
        message: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Making the composed filesystem the process root failed.
    #[error("root switch to {path} failed during {step}: {source}")]
    RootSwitch {
        /// Requested new root.
        path: PathBuf,
        /// Step of the switch that failed.
        step: &'static str,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The target command could not replace the process image.
    #[error("exec of {command:?} failed: {source}")]
    Exec {
        /// Executable name as given.
        command: String,
        /// Underlying OS error.
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ContainerError>;
