//! Error types for the Delve engine bridge.
//!
//! Organised by where the failure is detected: buffer binding
//! ([`BindError`]), the native engine ([`EngineError`]), and the session
//! surface that wraps both ([`SessionError`]).

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::channel::{Channel, DType, Shape};
use crate::state::SessionState;

/// Why a region's memory layout was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutIssue {
    /// The region is not row-major contiguous.
    NotContiguous,
    /// The region is flagged read-only.
    ReadOnly,
    /// The data pointer is not aligned for the element type.
    Misaligned,
}

impl fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotContiguous => write!(f, "array isn't C contiguous"),
            Self::ReadOnly => write!(f, "array is read-only"),
            Self::Misaligned => write!(f, "array data is misaligned for its dtype"),
        }
    }
}

/// A region offered for a channel does not match the channel table.
///
/// Detected at bind time, before any engine call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindError {
    /// Element type differs. No widening or narrowing is performed.
    TypeMismatch {
        /// Channel being bound.
        channel: Channel,
        /// Element type the engine writes.
        expected: DType,
        /// Element type of the offered region.
        actual: DType,
    },
    /// Dimension count or an extent differs.
    ShapeMismatch {
        /// Channel being bound.
        channel: Channel,
        /// Shape the engine writes.
        expected: Shape,
        /// Shape of the offered region.
        actual: Shape,
    },
    /// Region is not writable row-major contiguous memory.
    LayoutMismatch {
        /// Channel being bound.
        channel: Channel,
        /// What is wrong with the layout.
        issue: LayoutIssue,
    },
}

impl BindError {
    /// The channel whose binding failed.
    pub fn channel(&self) -> Channel {
        match self {
            Self::TypeMismatch { channel, .. }
            | Self::ShapeMismatch { channel, .. }
            | Self::LayoutMismatch { channel, .. } => *channel,
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch {
                channel,
                expected,
                actual,
            } => write!(
                f,
                "{channel}: buffer dtype mismatch (expected {expected}, got {actual})"
            ),
            Self::ShapeMismatch {
                channel,
                expected,
                actual,
            } if expected.len() != actual.len() => write!(
                f,
                "{channel}: array has wrong number of dimensions (expected {}, got {})",
                expected.len(),
                actual.len()
            ),
            Self::ShapeMismatch {
                channel,
                expected,
                actual,
            } => write!(
                f,
                "{channel}: array has wrong shape (expected {:?}, got {:?})",
                expected.as_slice(),
                actual.as_slice()
            ),
            Self::LayoutMismatch { channel, issue } => write!(f, "{channel}: {issue}"),
        }
    }
}

impl Error for BindError {}

/// Failures reported by, or while reaching, the native engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The engine library could not be loaded.
    Load {
        /// Engine-location path.
        path: PathBuf,
        /// Loader message.
        reason: String,
    },
    /// A required entry point is missing from the engine library.
    MissingSymbol {
        /// Symbol name.
        symbol: &'static str,
        /// Loader message.
        reason: String,
    },
    /// The engine refused to start a context.
    StartFailed {
        /// Description of the failure.
        reason: String,
    },
    /// An engine call on a live context failed.
    Failed {
        /// The engine operation (`reset`, `step`, ...).
        operation: &'static str,
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { path, reason } => {
                write!(f, "failed to load engine '{}': {reason}", path.display())
            }
            Self::MissingSymbol { symbol, reason } => {
                write!(f, "engine entry point '{symbol}' missing: {reason}")
            }
            Self::StartFailed { reason } => write!(f, "engine failed to start: {reason}"),
            Self::Failed { operation, reason } => {
                write!(f, "engine {operation} failed: {reason}")
            }
        }
    }
}

impl Error for EngineError {}

/// Errors surfaced by session operations.
#[derive(Debug)]
pub enum SessionError {
    /// A buffer failed validation.
    Bind(BindError),
    /// A fixed-capacity setting is too long. Never truncated.
    Length {
        /// Setting name.
        field: &'static str,
        /// Offered length in bytes.
        len: usize,
        /// Maximum length in bytes.
        capacity: usize,
    },
    /// A setting contains an interior NUL byte.
    NulByte {
        /// Setting name.
        field: &'static str,
        /// Byte offset of the NUL.
        position: usize,
    },
    /// A transcript file name does not fit the engine's name field.
    PathTooLong {
        /// The offered transcript path.
        path: PathBuf,
        /// Maximum file-name length in bytes.
        capacity: usize,
    },
    /// A transcript file name is not valid UTF-8. Never coerced.
    NonUtf8Name {
        /// The offered transcript path.
        path: PathBuf,
    },
    /// The operation needs a live engine context; call `reset` first.
    NotReady {
        /// The rejected operation.
        operation: &'static str,
    },
    /// `step` was called after the episode finished; call `reset`.
    AlreadyDone,
    /// The operation is invalid in the session's current state.
    Lifecycle {
        /// The rejected operation.
        operation: &'static str,
        /// State at the time of the call.
        state: SessionState,
    },
    /// Opening a transcript file failed.
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },
    /// The engine violated its contract (e.g. `done` straight after a
    /// reset). Fatal; distinct from a normal end of episode.
    InternalInconsistency {
        /// What was observed.
        reason: String,
    },
    /// The engine itself failed.
    Engine(EngineError),
}

impl SessionError {
    /// Wrap an I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(e) => write!(f, "{e}"),
            Self::Length {
                field,
                len,
                capacity,
            } => write!(f, "{field} too long ({len} bytes, capacity {capacity})"),
            Self::NulByte { field, position } => {
                write!(f, "{field} contains a NUL byte at offset {position}")
            }
            Self::PathTooLong { path, capacity } => write!(
                f,
                "transcript file name in '{}' exceeds {capacity} bytes",
                path.display()
            ),
            Self::NonUtf8Name { path } => write!(
                f,
                "transcript file name in '{}' is not valid UTF-8",
                path.display()
            ),
            Self::NotReady { operation } => write!(f, "{operation} called without reset()"),
            Self::AlreadyDone => write!(f, "step called on a finished episode"),
            Self::Lifecycle { operation, state } => {
                write!(f, "{operation} is not allowed in state '{state}'")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::InternalInconsistency { reason } => {
                write!(f, "engine internal inconsistency: {reason}")
            }
            Self::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Bind(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BindError> for SessionError {
    fn from(e: BindError) -> Self {
        Self::Bind(e)
    }
}

impl From<EngineError> for SessionError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}
