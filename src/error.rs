//! Error types shared by the prober, the unlock step and sessions.

use std::path::PathBuf;

use thiserror::Error;

/// Why a document could not be opened with a given password.
///
/// The prober collapses every variant into "try the next candidate"; the
/// distinction is kept for logging and for session start-up checks.
#[derive(Error, Debug)]
pub enum OpenError {
    /// The document is encrypted and the password was not accepted.
    #[error("incorrect password")]
    WrongPassword,

    /// The file was read but is not a usable PDF document.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OpenError {
    /// `true` when the failure says nothing about the password itself.
    pub fn is_document_fault(&self) -> bool {
        !matches!(self, OpenError::WrongPassword)
    }
}

/// Failures of the unlock/resave step.
#[derive(Error, Debug)]
pub enum UnlockError {
    /// The password was rejected when reopening the source.
    ///
    /// After a successful probe this means the source changed in between.
    #[error("password rejected by {}", path.display())]
    PasswordRejected { path: PathBuf },

    /// The source could not be read or parsed at unlock time.
    #[error("cannot read {}: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The derived artifact path points at the source document.
    #[error("refusing to overwrite source document {}", path.display())]
    WouldOverwriteSource { path: PathBuf },

    /// The unlocked copy could not be written.
    #[error("failed to write {}: {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },

    /// The copy was written but does not reopen as an unencrypted document
    /// with the expected content.
    #[error("verification of {} failed: {reason}", path.display())]
    VerificationFailed { path: PathBuf, reason: String },
}

/// Errors that end a crack session before or between its steps.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The source file is missing or unreadable.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file is not a parseable PDF.
    #[error("{} is not a readable PDF: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    /// The requested step is not allowed from the current state.
    #[error("cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}
