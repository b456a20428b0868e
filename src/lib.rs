//! Recover and remove PDF passwords with a small dictionary attack.
//!
//! The pipeline is [`generate_candidates`] → [`try_all_candidates`] →
//! [`unlock`], usually driven through a [`CrackSession`]. All PDF parsing
//! and decryption is done by the [`DocumentBackend`] passed in; the
//! default is [`LopdfBackend`].

pub mod batch;
pub mod candidates;
pub mod document;
pub mod error;
pub mod probe;
pub mod session;
pub mod unlock;

pub use batch::{BatchOptions, BatchReport, run_batch};
pub use candidates::{CandidateList, MAX_CANDIDATES, generate_candidates};
pub use document::{DocumentBackend, DocumentHandle, LopdfBackend};
pub use error::{OpenError, SessionError, UnlockError};
pub use probe::{
    CancelFlag, CrackOutcome, FoundPassword, ProgressEvent, probe, probe_detailed,
    try_all_candidates,
};
pub use session::{CrackSession, Encryption, SessionState, check_encryption};
pub use unlock::{UnlockedArtifact, artifact_path, save_artifact, unlock};
