//! Cracking several documents at once.
//!
//! Each document gets its own [`CrackSession`] and is probed strictly
//! sequentially; only whole sessions run in parallel.

use std::path::{Path, PathBuf};

use rayon::{ThreadPoolBuildError, ThreadPoolBuilder, prelude::*};

use crate::candidates::CandidateList;
use crate::document::DocumentBackend;
use crate::error::SessionError;
use crate::probe::{CancelFlag, ProgressEvent};
use crate::session::{CrackSession, SessionState};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker threads; one session per thread at a time.
    pub threads: usize,
    /// Unlock every document whose password is found.
    pub unlock: bool,
    /// Where artifacts go. `None` writes next to each source.
    pub out_dir: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            unlock: false,
            out_dir: None,
        }
    }
}

/// Final session for one input, or why it never got going.
#[derive(Debug)]
pub struct BatchReport {
    pub source: PathBuf,
    pub result: Result<CrackSession, SessionError>,
}

/// Run a session per source on a pool of `options.threads` workers.
///
/// Reports come back in input order. `observer` is called from worker
/// threads with the position in `sources` and the path each event belongs
/// to; the position tells repeated paths apart.
pub fn run_batch<B, F>(
    backend: &B,
    sources: &[PathBuf],
    candidates: &CandidateList,
    options: &BatchOptions,
    cancel: &CancelFlag,
    observer: F,
) -> Result<Vec<BatchReport>, ThreadPoolBuildError>
where
    B: DocumentBackend + Sync,
    F: Fn(usize, &Path, ProgressEvent) + Sync,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .build()?;

    let reports: Vec<BatchReport> = pool.install(|| {
        sources
            .par_iter()
            .enumerate()
            .map(|(index, source)| BatchReport {
                source: source.clone(),
                result: run_one(backend, source, candidates, options, cancel, |event| {
                    observer(index, source, event)
                }),
            })
            .collect()
    });
    Ok(reports)
}

fn run_one<B, F>(
    backend: &B,
    source: &Path,
    candidates: &CandidateList,
    options: &BatchOptions,
    cancel: &CancelFlag,
    observer: F,
) -> Result<CrackSession, SessionError>
where
    B: DocumentBackend,
    F: FnMut(ProgressEvent),
{
    let session = CrackSession::start(backend, source)?.crack(backend, candidates, cancel, observer)?;

    if options.unlock && matches!(session.state(), SessionState::Found(_)) {
        session.unlock(backend, options.out_dir.as_deref())
    } else {
        Ok(session)
    }
}
