//! A single crack session: inspect, probe, unlock.
//!
//! ```text
//! Idle -> Probing -> Found -> Unlocking -> Unlocked | UnlockFailed
//!                 -> Exhausted | Cancelled
//! ```
//!
//! `Probing` and `Unlocking` only exist while [`CrackSession::crack`] and
//! [`CrackSession::unlock`] run. Each step consumes the session and returns
//! it in its next state.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::info;

use crate::candidates::CandidateList;
use crate::document::{DocumentBackend, DocumentHandle};
use crate::error::{OpenError, SessionError, UnlockError};
use crate::probe::{self, CancelFlag, CrackOutcome, FoundPassword, ProgressEvent};
use crate::unlock::{self, UnlockedArtifact};

/// Whether a document needs a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encryption {
    Encrypted,
    Unencrypted,
}

/// Open `path` without a password to find out whether it is protected.
///
/// Missing and unparseable files are reported as errors rather than as
/// "encrypted".
pub fn check_encryption<B: DocumentBackend>(
    backend: &B,
    path: &Path,
) -> Result<Encryption, SessionError> {
    match backend.open(path, None) {
        Ok(handle) if handle.is_encrypted() => Ok(Encryption::Encrypted),
        Ok(_) => Ok(Encryption::Unencrypted),
        Err(OpenError::WrongPassword) => Ok(Encryption::Encrypted),
        Err(OpenError::Io(source)) => Err(SessionError::Io {
            path: path.to_path_buf(),
            source,
        }),
        Err(OpenError::MalformedDocument(reason)) => Err(SessionError::Malformed {
            path: path.to_path_buf(),
            reason,
        }),
    }
}

/// Where a [`CrackSession`] stands. `Idle` and `Found` accept further
/// actions; every other state is final.
#[derive(Debug)]
pub enum SessionState {
    Idle,
    Found(FoundPassword),
    Exhausted {
        attempts: usize,
        elapsed: Duration,
    },
    Cancelled {
        attempts: usize,
        elapsed: Duration,
    },
    Unlocked {
        found: FoundPassword,
        artifact: UnlockedArtifact,
    },
    UnlockFailed {
        found: FoundPassword,
        error: UnlockError,
    },
}

impl SessionState {
    /// Short lowercase label for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Found(_) => "found",
            SessionState::Exhausted { .. } => "exhausted",
            SessionState::Cancelled { .. } => "cancelled",
            SessionState::Unlocked { .. } => "unlocked",
            SessionState::UnlockFailed { .. } => "unlock-failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Idle | SessionState::Found(_))
    }

    /// The password, once one is known.
    pub fn password(&self) -> Option<&FoundPassword> {
        match self {
            SessionState::Found(found)
            | SessionState::Unlocked { found, .. }
            | SessionState::UnlockFailed { found, .. } => Some(found),
            _ => None,
        }
    }
}

/// One document moving through the crack pipeline.
#[derive(Debug)]
pub struct CrackSession {
    source: PathBuf,
    encryption: Encryption,
    state: SessionState,
}

impl CrackSession {
    /// Start a session after checking that `source` is a readable PDF.
    pub fn start<B: DocumentBackend>(
        backend: &B,
        source: impl Into<PathBuf>,
    ) -> Result<Self, SessionError> {
        let source = source.into();
        let encryption = check_encryption(backend, &source)?;
        info!(source = %source.display(), ?encryption, "session started");
        Ok(Self {
            source,
            encryption,
            state: SessionState::Idle,
        })
    }

    /// The document this session works on.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Encryption status recorded when the session started.
    pub fn encryption(&self) -> Encryption {
        self.encryption
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Consume the session and keep only its state.
    pub fn into_state(self) -> SessionState {
        self.state
    }

    /// Run the dictionary against the source.
    pub fn crack<B, F>(
        self,
        backend: &B,
        candidates: &CandidateList,
        cancel: &CancelFlag,
        observer: F,
    ) -> Result<Self, SessionError>
    where
        B: DocumentBackend,
        F: FnMut(ProgressEvent),
    {
        self.require_idle("crack")?;
        let state =
            match probe::try_all_candidates(backend, &self.source, candidates, cancel, observer) {
                CrackOutcome::Found(found) => SessionState::Found(found),
                CrackOutcome::NotFound { attempts, elapsed } => {
                    SessionState::Exhausted { attempts, elapsed }
                }
                CrackOutcome::Cancelled { attempts, elapsed } => {
                    SessionState::Cancelled { attempts, elapsed }
                }
            };
        Ok(self.with_state(state))
    }

    /// Check a single, user-supplied password.
    ///
    /// On success the session moves to `Found`; otherwise it stays `Idle`.
    pub fn try_password<B: DocumentBackend>(
        self,
        backend: &B,
        password: &str,
    ) -> Result<Self, SessionError> {
        self.require_idle("try a password")?;
        let start = Instant::now();
        if !probe::probe(backend, &self.source, password) {
            info!(source = %self.source.display(), "password rejected");
            return Ok(self);
        }
        let found = FoundPassword {
            password: password.to_string(),
            attempt_index: 0,
            elapsed: start.elapsed(),
        };
        info!(source = %self.source.display(), elapsed = ?found.elapsed, "password verified");
        Ok(self.with_state(SessionState::Found(found)))
    }

    /// Write an unencrypted copy using the found password.
    ///
    /// `out_dir` defaults to the source's directory.
    pub fn unlock<B: DocumentBackend>(
        self,
        backend: &B,
        out_dir: Option<&Path>,
    ) -> Result<Self, SessionError> {
        let found = match self.state {
            SessionState::Found(ref found) => found.clone(),
            ref other => {
                return Err(SessionError::InvalidTransition {
                    action: "unlock",
                    state: other.name(),
                });
            }
        };

        let out_dir = out_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| unlock::default_out_dir(&self.source));
        let state = match unlock::unlock(backend, &self.source, &found.password, &out_dir) {
            Ok(artifact) => SessionState::Unlocked { found, artifact },
            Err(error) => {
                info!(source = %self.source.display(), %error, "unlock failed");
                SessionState::UnlockFailed { found, error }
            }
        };
        Ok(self.with_state(state))
    }

    fn require_idle(&self, action: &'static str) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => Ok(()),
            ref other => Err(SessionError::InvalidTransition {
                action,
                state: other.name(),
            }),
        }
    }

    fn with_state(self, state: SessionState) -> Self {
        Self { state, ..self }
    }
}
