//! Re-saving a document without encryption.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::document::{DocumentBackend, DocumentHandle};
use crate::error::{OpenError, UnlockError};

/// Appended to the source file stem to name the unlocked copy.
pub const UNLOCKED_SUFFIX: &str = "_unlocked";

/// An unencrypted copy produced by [`unlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockedArtifact {
    pub path: PathBuf,
    pub page_count: usize,
    pub size_bytes: u64,
}

/// `<out_dir>/<stem>_unlocked.pdf`, keeping a `.pdf` extension's original
/// case.
pub fn artifact_path(source: &Path, out_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let ext = match source.extension().and_then(OsStr::to_str) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => ext,
        _ => "pdf",
    };
    out_dir.join(format!("{stem}{UNLOCKED_SUFFIX}.{ext}"))
}

/// Directory holding `source`, or `.` for a bare file name.
pub fn default_out_dir(source: &Path) -> PathBuf {
    source
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Open `source` with `password` and write an unencrypted copy into
/// `out_dir`, then check that the copy opens without a password and has
/// the same number of pages.
///
/// `source` is only ever read.
pub fn unlock<B: DocumentBackend>(
    backend: &B,
    source: &Path,
    password: &str,
    out_dir: &Path,
) -> Result<UnlockedArtifact, UnlockError> {
    let target = artifact_path(source, out_dir);
    if same_file(source, &target) {
        return Err(UnlockError::WouldOverwriteSource {
            path: source.to_path_buf(),
        });
    }

    let mut handle = backend
        .open(source, Some(password))
        .map_err(|err| match err {
            OpenError::WrongPassword => UnlockError::PasswordRejected {
                path: source.to_path_buf(),
            },
            other => UnlockError::SourceUnreadable {
                path: source.to_path_buf(),
                reason: other.to_string(),
            },
        })?;
    let page_count = handle
        .page_count()
        .map_err(|err| UnlockError::SourceUnreadable {
            path: source.to_path_buf(),
            reason: err.to_string(),
        })?;

    let size_bytes = handle
        .save(&target)
        .map_err(|err| UnlockError::WriteFailed {
            path: target.clone(),
            reason: err.to_string(),
        })?;
    drop(handle);

    verify_artifact(backend, &target, page_count)?;
    info!(
        source = %source.display(),
        artifact = %target.display(),
        page_count,
        size_bytes,
        "document unlocked"
    );

    Ok(UnlockedArtifact {
        path: target,
        page_count,
        size_bytes,
    })
}

fn verify_artifact<B: DocumentBackend>(
    backend: &B,
    path: &Path,
    expected_pages: usize,
) -> Result<(), UnlockError> {
    let failed = |reason: String| {
        warn!(artifact = %path.display(), %reason, "artifact verification failed");
        UnlockError::VerificationFailed {
            path: path.to_path_buf(),
            reason,
        }
    };

    let handle = backend
        .open(path, None)
        .map_err(|err| failed(format!("cannot reopen without password: {err}")))?;
    if handle.is_encrypted() {
        return Err(failed("artifact is still encrypted".to_string()));
    }
    let pages = handle
        .page_count()
        .map_err(|err| failed(format!("cannot read pages: {err}")))?;
    if pages != expected_pages {
        return Err(failed(format!(
            "artifact has {pages} pages, source has {expected_pages}"
        )));
    }
    Ok(())
}

/// Copy an artifact to its final location, creating parent directories.
///
/// Copying a file onto itself is a no-op.
pub fn save_artifact(artifact: &Path, dest: &Path) -> io::Result<u64> {
    if same_file(artifact, dest) {
        return Ok(fs::metadata(artifact)?.len());
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let bytes = fs::copy(artifact, dest)?;
    info!(from = %artifact.display(), to = %dest.display(), bytes, "artifact saved");
    Ok(bytes)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
