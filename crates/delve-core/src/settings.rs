//! Session configuration and validated engine settings.
//!
//! [`SessionConfig`] is the builder hosts fill in. [`SessionConfig::validate`]
//! checks every fixed-capacity field in one pass and produces the
//! [`Settings`] block handed to the engine on `start` and `reset`.

use std::path::{Path, PathBuf};

use crate::error::SessionError;
use crate::fixed::FixedStr;

/// Size of the engine's path-like setting fields, including the NUL.
pub const PATH_FIELD_LEN: usize = 4096;

/// Size of the engine's options field, including the NUL.
pub const OPTIONS_FIELD_LEN: usize = 32768;

// ── SessionConfig ──────────────────────────────────────────────────

/// Builder input for a session.
///
/// Nothing is checked until [`validate`](Self::validate).
#[derive(Clone, Debug)]
pub struct SessionConfig {
    engine_path: PathBuf,
    work_dir: String,
    options: String,
    transcript: Option<PathBuf>,
    spawn_monsters: bool,
    score_prefix: String,
    wizkit: String,
}

impl SessionConfig {
    /// Start a config for the engine library at `engine_path`.
    ///
    /// Monsters spawn by default; every string setting starts empty.
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
            work_dir: String::new(),
            options: String::new(),
            transcript: None,
            spawn_monsters: true,
            score_prefix: String::new(),
            wizkit: String::new(),
        }
    }

    /// Engine working directory (save files, scores, level files).
    pub fn work_dir(mut self, dir: impl Into<String>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Engine options string.
    pub fn options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    /// Record the first episode into `path`.
    pub fn transcript(mut self, path: impl Into<PathBuf>) -> Self {
        self.transcript = Some(path.into());
        self
    }

    /// Whether the engine spawns random monsters.
    pub fn spawn_monsters(mut self, spawn: bool) -> Self {
        self.spawn_monsters = spawn;
        self
    }

    /// Prefix for score-file entries.
    pub fn score_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.score_prefix = prefix.into();
        self
    }

    /// Starting-kit specification.
    pub fn wizkit(mut self, wizkit: impl Into<String>) -> Self {
        self.wizkit = wizkit.into();
        self
    }

    /// The configured engine library path.
    pub fn engine_path(&self) -> &Path {
        &self.engine_path
    }

    /// The configured transcript path, if any.
    pub fn transcript_path(&self) -> Option<&Path> {
        self.transcript.as_deref()
    }

    /// Check every field and build the engine settings block.
    ///
    /// # Errors
    ///
    /// [`SessionError::Length`] or [`SessionError::NulByte`] for an
    /// oversized or NUL-bearing string, [`SessionError::PathTooLong`] when
    /// the transcript file name does not fit.
    pub fn validate(&self) -> Result<Settings, SessionError> {
        let transcript_name = match &self.transcript {
            Some(path) => transcript_display_name(path)?,
            None => FixedStr::empty(),
        };
        Ok(Settings {
            engine_path: self.engine_path.clone(),
            work_dir: FixedStr::new("work_dir", &self.work_dir)?,
            options: FixedStr::new("options", &self.options)?,
            spawn_monsters: self.spawn_monsters,
            score_prefix: FixedStr::new("score_prefix", &self.score_prefix)?,
            transcript_name,
            wizkit: FixedStr::new("wizkit", &self.wizkit)?,
        })
    }
}

// ── Settings ───────────────────────────────────────────────────────

/// Validated settings, laid out the way the engine reads them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Engine library path.
    pub engine_path: PathBuf,
    /// Engine working directory.
    pub work_dir: FixedStr<PATH_FIELD_LEN>,
    /// Engine options string.
    pub options: FixedStr<OPTIONS_FIELD_LEN>,
    /// Whether random monsters spawn.
    pub spawn_monsters: bool,
    /// Score-file prefix.
    pub score_prefix: FixedStr<PATH_FIELD_LEN>,
    /// File name of the active transcript, empty when none is named.
    pub transcript_name: FixedStr<PATH_FIELD_LEN>,
    /// Starting-kit specification.
    pub wizkit: FixedStr<PATH_FIELD_LEN>,
}

impl Settings {
    /// Replace the starting-kit specification.
    ///
    /// # Errors
    ///
    /// [`SessionError::Length`] or [`SessionError::NulByte`]; the previous
    /// value is kept on failure.
    pub fn set_wizkit(&mut self, wizkit: &str) -> Result<(), SessionError> {
        self.wizkit = FixedStr::new("wizkit", wizkit)?;
        Ok(())
    }
}

/// Display name for a transcript at `path`: everything after the last
/// `/`, or the whole path when it has none.
///
/// The split runs over the raw path bytes, so only the name itself has to
/// be UTF-8; directories may hold any bytes.
///
/// # Errors
///
/// [`SessionError::PathTooLong`] when the name exceeds the engine field,
/// [`SessionError::NonUtf8Name`] when the name is not valid UTF-8.
pub fn transcript_display_name(path: &Path) -> Result<FixedStr<PATH_FIELD_LEN>, SessionError> {
    let full = path.as_os_str().as_encoded_bytes();
    let name = match full.iter().rposition(|&b| b == b'/') {
        Some(i) => &full[i + 1..],
        None => full,
    };
    if name.len() > FixedStr::<PATH_FIELD_LEN>::CAPACITY {
        return Err(SessionError::PathTooLong {
            path: path.to_path_buf(),
            capacity: FixedStr::<PATH_FIELD_LEN>::CAPACITY,
        });
    }
    let name = std::str::from_utf8(name).map_err(|_| SessionError::NonUtf8Name {
        path: path.to_path_buf(),
    })?;
    FixedStr::new("transcript_name", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_spawn_monsters_and_empty_strings() {
        let s = SessionConfig::new("libdelve.so").validate().unwrap();
        assert!(s.spawn_monsters);
        assert!(s.options.is_empty());
        assert!(s.transcript_name.is_empty());
        assert_eq!(s.engine_path, PathBuf::from("libdelve.so"));
    }

    #[test]
    fn transcript_name_is_last_component() {
        let s = SessionConfig::new("e")
            .transcript("/tmp/runs/ep0.ttyrec.bz2")
            .validate()
            .unwrap();
        assert_eq!(s.transcript_name.as_str(), "ep0.ttyrec.bz2");

        let bare = transcript_display_name(Path::new("plain.ttyrec")).unwrap();
        assert_eq!(bare.as_str(), "plain.ttyrec");
    }

    #[test]
    fn oversized_transcript_name_is_path_too_long() {
        let long = format!("/tmp/{}", "a".repeat(PATH_FIELD_LEN));
        let err = SessionConfig::new("e").transcript(long).validate().unwrap_err();
        assert!(matches!(
            err,
            SessionError::PathTooLong { capacity: 4095, .. }
        ));
    }

    #[test]
    fn long_directory_with_short_name_is_fine() {
        let path = format!("/{}/x.ttyrec", "d".repeat(PATH_FIELD_LEN * 2));
        let name = transcript_display_name(Path::new(&path)).unwrap();
        assert_eq!(name.as_str(), "x.ttyrec");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_is_rejected_not_replaced() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let bad = Path::new(OsStr::from_bytes(b"/tmp/ep\xff.ttyrec"));
        let err = transcript_display_name(bad).unwrap_err();
        assert!(matches!(err, SessionError::NonUtf8Name { ref path } if path == bad));

        let bad_dir = Path::new(OsStr::from_bytes(b"/tmp/\xfe\xff/ep1.ttyrec"));
        assert_eq!(transcript_display_name(bad_dir).unwrap().as_str(), "ep1.ttyrec");
    }

    #[test]
    fn options_capacity_is_32767() {
        let ok = "o".repeat(OPTIONS_FIELD_LEN - 1);
        assert!(SessionConfig::new("e").options(ok).validate().is_ok());

        let err = SessionConfig::new("e")
            .options("o".repeat(OPTIONS_FIELD_LEN))
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Length {
                field: "options",
                capacity: 32767,
                ..
            }
        ));
    }

    #[test]
    fn failed_set_wizkit_keeps_previous_value() {
        let mut s = SessionConfig::new("e").wizkit("wand of wishing").validate().unwrap();
        let err = s.set_wizkit(&"w".repeat(PATH_FIELD_LEN)).unwrap_err();
        assert!(matches!(err, SessionError::Length { field: "wizkit", .. }));
        assert_eq!(s.wizkit.as_str(), "wand of wishing");
        s.set_wizkit("blessed +2 gray dragon scale mail").unwrap();
        assert_eq!(s.wizkit.as_str(), "blessed +2 gray dragon scale mail");
    }
}
