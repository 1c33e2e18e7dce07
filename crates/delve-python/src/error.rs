//! Session and engine errors -> Python exceptions.
//!
//! | Error                                              | Exception      |
//! |----------------------------------------------------|----------------|
//! | `Bind(TypeMismatch)`                               | `TypeError`    |
//! | `Bind(..)`, `Length`, `NulByte`, `PathTooLong`,    | `ValueError`   |
//! | `NonUtf8Name`                                      |                |
//! | `Io`, `Engine(Load)`                               | `OSError`      |
//! | `IndexOutOfRange`                                  | `IndexError`   |
//! | `InvalidTables`, `BadField`                        | `ValueError`   |
//! | everything else                                    | `RuntimeError` |

use delve_core::{BindError, EngineError, SessionError};
use delve_meta::MetaError;
use delve_native::TablesError;
use pyo3::exceptions::{PyIndexError, PyOSError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::PyErr;

/// Convert a session error into the matching Python exception.
pub(crate) fn session_error(err: SessionError) -> PyErr {
    let msg = err.to_string();
    match err {
        SessionError::Bind(BindError::TypeMismatch { .. }) => PyTypeError::new_err(msg),
        SessionError::Bind(_)
        | SessionError::Length { .. }
        | SessionError::NulByte { .. }
        | SessionError::PathTooLong { .. }
        | SessionError::NonUtf8Name { .. } => PyValueError::new_err(msg),
        SessionError::Io { .. } => PyOSError::new_err(msg),
        SessionError::Engine(e) => engine_error(e),
        SessionError::NotReady { .. }
        | SessionError::AlreadyDone
        | SessionError::Lifecycle { .. }
        | SessionError::InternalInconsistency { .. } => PyRuntimeError::new_err(msg),
    }
}

/// Convert an engine error into the matching Python exception.
pub(crate) fn engine_error(err: EngineError) -> PyErr {
    let msg = err.to_string();
    match err {
        EngineError::Load { .. } => PyOSError::new_err(msg),
        _ => PyRuntimeError::new_err(msg),
    }
}

/// Convert a metadata lookup error into the matching Python exception.
pub(crate) fn meta_error(err: MetaError) -> PyErr {
    let msg = err.to_string();
    match err {
        MetaError::IndexOutOfRange { .. } => PyIndexError::new_err(msg),
        MetaError::InvalidTables { .. } => PyValueError::new_err(msg),
    }
}

/// Convert a table loading error into the matching Python exception.
pub(crate) fn tables_error(err: TablesError) -> PyErr {
    match err {
        TablesError::Engine(e) => engine_error(e),
        TablesError::Invalid(e) => meta_error(e),
        e @ TablesError::BadField { .. } => PyValueError::new_err(e.to_string()),
    }
}

/// Raised when a previous call panicked while holding the session.
pub(crate) fn poisoned() -> PyErr {
    PyRuntimeError::new_err("session is unusable after a panic in an earlier call")
}
