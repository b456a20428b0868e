//! Dictionary attack against a single document.

use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::candidates::CandidateList;
use crate::document::{DocumentBackend, DocumentHandle};
use crate::error::OpenError;

/// Emitted after every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Zero-based index of the candidate just tried.
    pub attempt_index: usize,
    pub total: usize,
    pub elapsed: Duration,
}

/// A password that opened the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundPassword {
    pub password: String,
    /// Zero-based position of the password in trial order.
    pub attempt_index: usize,
    pub elapsed: Duration,
}

/// Result of running the whole dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrackOutcome {
    Found(FoundPassword),
    NotFound { attempts: usize, elapsed: Duration },
    Cancelled { attempts: usize, elapsed: Duration },
}

/// Shared flag used to stop a dictionary run between candidates.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Open `path` with `candidate` and read its page tree.
///
/// Returns the page count on success. The handle is dropped before
/// returning on every path.
pub fn probe_detailed<B: DocumentBackend>(
    backend: &B,
    path: &Path,
    candidate: &str,
) -> Result<usize, OpenError> {
    let handle = backend.open(path, Some(candidate))?;
    handle.page_count()
}

/// Whether `candidate` opens `path`. Every failure counts as "no".
pub fn probe<B: DocumentBackend>(backend: &B, path: &Path, candidate: &str) -> bool {
    probe_detailed(backend, path, candidate).is_ok()
}

/// Try each candidate in order and stop at the first one that opens `path`.
///
/// `observer` receives a [`ProgressEvent`] after each attempt. `cancel` is
/// checked before each attempt, never during one.
pub fn try_all_candidates<B, F>(
    backend: &B,
    path: &Path,
    candidates: &CandidateList,
    cancel: &CancelFlag,
    mut observer: F,
) -> CrackOutcome
where
    B: DocumentBackend,
    F: FnMut(ProgressEvent),
{
    let start = Instant::now();
    let total = candidates.len();
    info!(path = %path.display(), total, "starting dictionary attack");

    for (index, candidate) in candidates.iter().enumerate() {
        if cancel.is_cancelled() {
            let elapsed = start.elapsed();
            info!(path = %path.display(), attempts = index, "dictionary attack cancelled");
            return CrackOutcome::Cancelled {
                attempts: index,
                elapsed,
            };
        }

        let attempt = probe_detailed(backend, path, candidate);
        let elapsed = start.elapsed();
        observer(ProgressEvent {
            attempt_index: index,
            total,
            elapsed,
        });

        match attempt {
            Ok(pages) => {
                info!(
                    path = %path.display(),
                    attempt = index + 1,
                    pages,
                    ?elapsed,
                    "password found"
                );
                return CrackOutcome::Found(FoundPassword {
                    password: candidate.to_string(),
                    attempt_index: index,
                    elapsed,
                });
            }
            Err(err) if err.is_document_fault() => {
                debug!(attempt = index + 1, error = %err, "document unreadable, trying next candidate")
            }
            Err(err) => debug!(attempt = index + 1, error = %err, "candidate rejected"),
        }
    }

    let elapsed = start.elapsed();
    info!(path = %path.display(), attempts = total, ?elapsed, "dictionary exhausted");
    CrackOutcome::NotFound {
        attempts: total,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::generate_candidates;
    use crate::document::fake::{FakeBackend, FakeDoc};

    const DOC: &str = "/docs/report.pdf";

    #[test]
    fn accepts_only_the_right_password() {
        let backend = FakeBackend::default().with_file(DOC, FakeDoc::encrypted("letmein", 2));
        assert!(probe(&backend, Path::new(DOC), "letmein"));
        assert!(!probe(&backend, Path::new(DOC), "LETMEIN"));
        assert!(!probe(&backend, Path::new(DOC), ""));
    }

    #[test]
    fn document_faults_count_as_rejection() {
        let backend = FakeBackend::default().with_file(DOC, FakeDoc::malformed());
        assert!(!probe(&backend, Path::new(DOC), "anything"));
        assert!(!probe(&backend, Path::new("/docs/missing.pdf"), "anything"));

        let detailed = probe_detailed(&backend, Path::new(DOC), "anything");
        assert!(matches!(detailed, Err(OpenError::MalformedDocument(_))));
    }

    #[test]
    fn stops_at_first_hit_and_reports_index() {
        let backend = FakeBackend::default().with_file(DOC, FakeDoc::encrypted("1234", 1));
        let list = generate_candidates();
        let mut events = Vec::new();

        let outcome = try_all_candidates(&backend, Path::new(DOC), &list, &CancelFlag::new(), |e| {
            events.push(e)
        });

        let expected = list.position("1234").unwrap();
        match outcome {
            CrackOutcome::Found(found) => {
                assert_eq!(found.password, "1234");
                assert_eq!(found.attempt_index, expected);
            }
            other => panic!("expected a hit, got {other:?}"),
        }
        assert_eq!(events.len(), expected + 1);
        assert!(events.iter().all(|e| e.total == list.len()));
        assert_eq!(events.last().map(|e| e.attempt_index), Some(expected));
    }

    #[test]
    fn exhausts_when_password_is_not_in_dictionary() {
        let backend = FakeBackend::default().with_file(DOC, FakeDoc::encrypted("Zx9#Qw", 1));
        let list = generate_candidates();
        let mut seen = 0;

        let outcome =
            try_all_candidates(&backend, Path::new(DOC), &list, &CancelFlag::new(), |_| seen += 1);

        assert!(matches!(outcome, CrackOutcome::NotFound { attempts, .. } if attempts == list.len()));
        assert_eq!(seen, list.len());
    }

    #[test]
    fn document_faults_do_not_stop_the_run() {
        let backend = FakeBackend::default().with_file(DOC, FakeDoc::malformed());
        let list = generate_candidates();
        let mut seen = 0;

        let outcome =
            try_all_candidates(&backend, Path::new(DOC), &list, &CancelFlag::new(), |_| seen += 1);

        assert!(matches!(outcome, CrackOutcome::NotFound { attempts, .. } if attempts == list.len()));
        assert_eq!(seen, list.len());
    }

    #[test]
    fn unencrypted_document_opens_on_first_attempt() {
        let backend = FakeBackend::default().with_file(DOC, FakeDoc::plain(4));
        let outcome = try_all_candidates(
            &backend,
            Path::new(DOC),
            &generate_candidates(),
            &CancelFlag::new(),
            |_| {},
        );
        match outcome {
            CrackOutcome::Found(found) => {
                assert_eq!(found.password, "");
                assert_eq!(found.attempt_index, 0);
            }
            other => panic!("expected a hit, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_is_checked_between_attempts() {
        let backend = FakeBackend::default().with_file(DOC, FakeDoc::encrypted("Zx9#Qw", 1));
        let cancel = CancelFlag::new();
        let trigger = cancel.clone();

        let outcome = try_all_candidates(
            &backend,
            Path::new(DOC),
            &generate_candidates(),
            &cancel,
            |event| {
                if event.attempt_index == 4 {
                    trigger.cancel();
                }
            },
        );

        assert!(matches!(outcome, CrackOutcome::Cancelled { attempts: 5, .. }));
    }

    #[test]
    fn cancelled_before_start_tries_nothing() {
        let backend = FakeBackend::default().with_file(DOC, FakeDoc::encrypted("1234", 1));
        let cancel = CancelFlag::new();
        cancel.cancel();

        let outcome =
            try_all_candidates(&backend, Path::new(DOC), &generate_candidates(), &cancel, |_| {});

        assert!(matches!(outcome, CrackOutcome::Cancelled { attempts: 0, .. }));
        assert_eq!(backend.opened(), 0);
    }

    #[test]
    fn every_opened_handle_is_released() {
        let backend = FakeBackend::default().with_file(DOC, FakeDoc::encrypted("welcome", 1));
        try_all_candidates(
            &backend,
            Path::new(DOC),
            &generate_candidates(),
            &CancelFlag::new(),
            |_| {},
        );
        assert_eq!(backend.opened(), 1);
        assert_eq!(backend.released(), 1);
    }
}
