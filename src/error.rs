//! Error types for the docconv-client library.
//!
//! Every failure is terminal for the submission that produced it: nothing is
//! retried and no distinction is made between transient and permanent
//! failures. The variants fall into four groups:
//!
//! * **Validation**: caught locally before any network traffic
//!   ([`DocConvError::NoFileSelected`], [`DocConvError::UnsupportedFile`]).
//! * **Input**: the local file could not be read.
//! * **Remote**: the service answered with a non-success status
//!   ([`DocConvError::Api`]) or could not be reached at all
//!   ([`DocConvError::Request`]).
//! * **Output**: the downloaded payload could not be written.

use std::path::PathBuf;
use thiserror::Error;

/// Message shown when a conversion fails without a usable description.
pub const GENERIC_FAILURE: &str = "Conversion failed";

/// All errors returned by the docconv-client library.
#[derive(Debug, Error)]
pub enum DocConvError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Submit was pressed before a file was chosen.
    #[error("Please select a file")]
    NoFileSelected,

    /// The chosen file does not match the converter's accept list.
    #[error("'{name}' is not an accepted file type (expected {accept})")]
    UnsupportedFile { name: String, accept: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed part-way.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The service returned a non-success status.
    ///
    /// `message` is the `detail` field of the JSON error body when present,
    /// otherwise the endpoint's generic failure message. It is displayed
    /// verbatim.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connection refused, DNS, TLS,
    /// or the body could not be read).
    #[error("Request to '{url}' failed: {reason}")]
    Request { url: String, reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the downloaded file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocConvError {
    /// True for errors raised before any request was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DocConvError::NoFileSelected | DocConvError::UnsupportedFile { .. }
        )
    }

    /// HTTP status of a remote failure, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            DocConvError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The text a front-end should show for this error.
    ///
    /// Falls back to [`GENERIC_FAILURE`] when the display form is blank.
    pub fn user_message(&self) -> String {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            msg
        }
    }
}
