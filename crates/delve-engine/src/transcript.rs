//! Transcript recording handles and their handoff across resets.
//!
//! The engine appends an opaque byte stream to the recording it was given.
//! A new recording is opened before the engine reset that switches to it,
//! and the old one is closed only after that reset succeeds, because the
//! engine may still flush the finished episode into the old file.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use delve_core::settings::{transcript_display_name, PATH_FIELD_LEN};
use delve_core::{FixedStr, SessionError};

/// Open `path` for appending, creating it if needed.
fn open_append(path: &Path) -> Result<File, SessionError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SessionError::io(path, e))
}

/// A recording opened ahead of the engine call that will switch to it.
#[derive(Debug)]
pub struct PendingTranscript {
    file: File,
    path: PathBuf,
    name: FixedStr<PATH_FIELD_LEN>,
}

impl PendingTranscript {
    /// Validate the display name for `path`, then open it.
    ///
    /// The name is checked first, so an oversized name never creates a file.
    ///
    /// # Errors
    ///
    /// [`SessionError::PathTooLong`], [`SessionError::NonUtf8Name`] or
    /// [`SessionError::Io`].
    pub fn open(path: &Path) -> Result<Self, SessionError> {
        let name = transcript_display_name(path)?;
        let file = open_append(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            name,
        })
    }

    /// The open handle.
    pub fn file(&self) -> &File {
        &self.file
    }

    /// The engine display name.
    pub fn name(&self) -> &FixedStr<PATH_FIELD_LEN> {
        &self.name
    }
}

/// The session's current recording, if any.
#[derive(Debug, Default)]
pub struct Transcript {
    active: Option<(File, PathBuf)>,
}

impl Transcript {
    /// No recording.
    pub fn none() -> Self {
        Self::default()
    }

    /// Open `path` as the current recording.
    ///
    /// # Errors
    ///
    /// [`SessionError::Io`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, SessionError> {
        let file = open_append(path)?;
        tracing::debug!(path = %path.display(), "transcript opened");
        Ok(Self {
            active: Some((file, path.to_path_buf())),
        })
    }

    /// Make `pending` the current recording, closing the previous one.
    pub fn install(&mut self, pending: PendingTranscript) {
        let old = self.active.replace((pending.file, pending.path));
        if let Some((_, old_path)) = &old {
            tracing::debug!(
                old = %old_path.display(),
                new = ?self.path().map(Path::display),
                "transcript swapped"
            );
        }
        drop(old);
    }

    /// The current recording handle.
    pub fn file(&self) -> Option<&File> {
        self.active.as_ref().map(|(f, _)| f)
    }

    /// Path of the current recording.
    pub fn path(&self) -> Option<&Path> {
        self.active.as_ref().map(|(_, p)| p.as_path())
    }

    /// Size of the current recording on disk.
    ///
    /// # Errors
    ///
    /// The underlying metadata error.
    pub fn bytes_on_disk(&self) -> io::Result<Option<u64>> {
        self.file()
            .map(|f| f.metadata().map(|m| m.len()))
            .transpose()
    }

    /// Close the current recording. Idempotent.
    pub fn close(&mut self) {
        if let Some((_, path)) = self.active.take() {
            tracing::debug!(path = %path.display(), "transcript closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ttyrec");
        std::fs::write(&path, b"old").unwrap();

        let t = Transcript::open(&path).unwrap();
        t.file().unwrap().write_all(b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"oldnew");
        assert_eq!(t.bytes_on_disk().unwrap(), Some(6));
    }

    #[test]
    fn oversized_name_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("n".repeat(PATH_FIELD_LEN));
        let err = PendingTranscript::open(&path).unwrap_err();
        assert!(matches!(err, SessionError::PathTooLong { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.ttyrec");
        let err = PendingTranscript::open(&path).unwrap_err();
        assert!(matches!(err, SessionError::Io { .. }));
    }

    #[test]
    fn install_keeps_old_bytes_and_switches_handle() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.ttyrec");
        let second = dir.path().join("second.ttyrec");

        let mut t = Transcript::open(&first).unwrap();
        t.file().unwrap().write_all(b"episode one").unwrap();

        let pending = PendingTranscript::open(&second).unwrap();
        assert_eq!(pending.name().as_str(), "second.ttyrec");
        t.install(pending);
        t.file().unwrap().write_all(b"episode two").unwrap();

        assert_eq!(t.path(), Some(second.as_path()));
        assert_eq!(std::fs::read(&first).unwrap(), b"episode one");
        assert_eq!(std::fs::read(&second).unwrap(), b"episode two");
    }

    #[test]
    fn close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = Transcript::open(&dir.path().join("x")).unwrap();
        t.close();
        t.close();
        assert!(t.file().is_none());
        assert_eq!(t.bytes_on_disk().unwrap(), None);
    }
}
