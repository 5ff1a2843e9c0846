//! Error types for the trusted-package builder.
//!
//! Only failures that indicate a broken environment are surfaced as
//! [`BuilderError`]. Per-package data problems (missing or malformed
//! manifests) and trust-resolution failures have their own error types so the
//! tolerant call sites can log them and carry on.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a build run.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// The shell could not be spawned for a package script.
    #[error("cannot execute `{command}` in {working_dir}")]
    Launch {
        /// The script that was being launched.
        command: String,
        /// Directory the script was meant to run in.
        working_dir: Utf8PathBuf,
        /// The spawn failure reported by the operating system.
        #[source]
        source: std::io::Error,
    },

    /// The location of the running executable could not be determined.
    #[error("cannot determine install location: {reason}")]
    InstallLocation {
        /// Description of why the location is unavailable.
        reason: String,
    },

    /// A scripted runner received an invocation it did not expect.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`BuilderError`].
pub type Result<T> = std::result::Result<T, BuilderError>;

/// Reasons a package manifest could not be consulted.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest exists but could not be read.
    #[error("cannot read manifest {path}")]
    Read {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not a valid JSON object.
    #[error("malformed manifest {path}")]
    Parse {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Reasons the trusted directory could not be established.
#[derive(Debug, Error)]
pub enum TrustError {
    /// The derived vendor directory is not named `vendor`.
    #[error("derived vendor directory {path} is not named `vendor`")]
    UnexpectedLayout {
        /// The directory two levels above the install location.
        path: Utf8PathBuf,
    },

    /// No install location is known and no vendor directory was given.
    #[error("no vendor directory given and no install location known")]
    NoInstallLocation,

    /// The install location has fewer than two ancestors.
    #[error("install location {path} has no vendor ancestor")]
    NoInstallParent {
        /// The install location.
        path: Utf8PathBuf,
    },

    /// The trusted path does not exist.
    #[error("trusted directory {path} does not exist")]
    Missing {
        /// The candidate trusted path.
        path: Utf8PathBuf,
        /// The canonicalization failure.
        #[source]
        source: std::io::Error,
    },

    /// The trusted path exists but is not a directory.
    #[error("trusted path {path} is not a directory")]
    NotADirectory {
        /// The canonical trusted path.
        path: Utf8PathBuf,
    },

    /// The canonical trusted path is not valid UTF-8.
    #[error("trusted path {path} is not valid UTF-8")]
    NonUtf8 {
        /// Lossy rendering of the offending path.
        path: String,
    },
}
