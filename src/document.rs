//! Access to encrypted documents.
//!
//! The prober and the unlock step only see the [`DocumentBackend`] and
//! [`DocumentHandle`] traits; [`LopdfBackend`] is the production
//! implementation backed by `lopdf`, which performs all of the PDF parsing
//! and decryption.

use std::fs;
use std::io;
use std::path::Path;

use lopdf::Document;
use lopdf::Error as LopdfError;
use lopdf::encryption::DecryptionError;

use crate::error::OpenError;

/// An opened, decrypted document. Dropping the handle releases it.
pub trait DocumentHandle {
    /// Whether the source carries encryption, even when its user password
    /// is empty.
    fn is_encrypted(&self) -> bool;

    /// Number of pages, read from the decrypted page tree.
    fn page_count(&self) -> Result<usize, OpenError>;

    /// Write the document to `path` without any encryption and return the
    /// number of bytes written.
    fn save(&mut self, path: &Path) -> Result<u64, OpenError>;
}

/// Opens documents by path.
pub trait DocumentBackend {
    type Handle: DocumentHandle;

    /// Open `path`, decrypting with `password` when the document is
    /// encrypted. `None` only opens documents that need no password.
    fn open(&self, path: &Path, password: Option<&str>) -> Result<Self::Handle, OpenError>;
}

/// [`DocumentBackend`] over `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfBackend;

/// A document loaded by [`LopdfBackend`].
pub struct PdfHandle {
    doc: Document,
    encrypted: bool,
}

impl DocumentBackend for LopdfBackend {
    type Handle = PdfHandle;

    fn open(&self, path: &Path, password: Option<&str>) -> Result<PdfHandle, OpenError> {
        let bytes = fs::read(path)?;
        let mut doc = Document::load_mem(&bytes).map_err(classify)?;

        // Documents whose user password is empty come back from the loader
        // already decrypted, with `/Encrypt` gone and the key kept in
        // `encryption_state`. Decrypting them again would garble every string.
        let encrypted = doc.is_encrypted() || doc.encryption_state.is_some();
        if doc.is_encrypted() {
            let password = password.ok_or(OpenError::WrongPassword)?;
            doc.authenticate_password(password).map_err(classify)?;
            doc.decrypt(password).map_err(classify)?;
        }

        Ok(PdfHandle { doc, encrypted })
    }
}

impl DocumentHandle for PdfHandle {
    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn page_count(&self) -> Result<usize, OpenError> {
        self.doc.catalog().map_err(classify)?;
        Ok(self.doc.get_pages().len())
    }

    fn save(&mut self, path: &Path) -> Result<u64, OpenError> {
        self.doc.trailer.remove(b"Encrypt");
        self.doc.encryption_state = None;
        self.doc
            .save(path)
            .map_err(|err| OpenError::Io(io::Error::other(err.to_string())))?;
        Ok(fs::metadata(path)?.len())
    }
}

fn classify(err: LopdfError) -> OpenError {
    match err {
        LopdfError::Decryption(DecryptionError::IncorrectPassword) => OpenError::WrongPassword,
        other => OpenError::MalformedDocument(other.to_string()),
    }
}
