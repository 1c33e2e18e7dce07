//! `Session`: the Python face of a Delve session.
//!
//! Engine calls release the GIL via `py.detach()`. The session mutex is
//! only ever taken inside the detached closure or for calls that never
//! wait on the GIL, so a thread blocked on the mutex while holding the GIL
//! cannot deadlock the thread running the engine.

use std::path::PathBuf;
use std::sync::Mutex;

use delve_core::{Channel, Seeds, SessionConfig, SessionError};
use delve_engine::Session as Inner;
use delve_native::NativeBackend;
use delve_obs::BufferSet;
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::error::{engine_error, poisoned, session_error};
use crate::region::NumpyRegion;
use crate::termination::TerminationReason;

/// A session with the native engine.
///
/// Loads the engine library at `dlpath`. The first `reset()` starts the
/// engine; every later `reset()` begins a new episode.
#[pyclass(module = "_delve")]
pub(crate) struct Session {
    inner: Mutex<Inner>,
}

impl Session {
    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> Result<R, SessionError>) -> PyResult<R> {
        let mut guard = self.inner.lock().map_err(|_| poisoned())?;
        f(&mut guard).map_err(session_error)
    }
}

fn seeds(core: u64, disp: u64, reseed: bool, lgen: Option<u64>) -> Seeds {
    let s = Seeds::new(core, disp, reseed);
    match lgen {
        Some(l) => s.with_lgen(l),
        None => s,
    }
}

#[pymethods]
impl Session {
    #[new]
    #[pyo3(signature = (
        dlpath,
        ttyrec=None,
        hackdir=String::new(),
        options=String::new(),
        spawn_monsters=true,
        scoreprefix=String::new(),
        wizkit=String::new(),
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        py: Python<'_>,
        dlpath: PathBuf,
        ttyrec: Option<PathBuf>,
        hackdir: String,
        options: String,
        spawn_monsters: bool,
        scoreprefix: String,
        wizkit: String,
    ) -> PyResult<Self> {
        let backend = py
            .detach(|| NativeBackend::load(&dlpath))
            .map_err(engine_error)?;
        let mut config = SessionConfig::new(dlpath)
            .work_dir(hackdir)
            .options(options)
            .spawn_monsters(spawn_monsters)
            .score_prefix(scoreprefix)
            .wizkit(wizkit);
        if let Some(path) = ttyrec {
            config = config.transcript(path);
        }
        let inner = Inner::new(backend, config).map_err(session_error)?;
        tracing::info!(
            engine = %inner.settings().engine_path.display(),
            "python session created"
        );
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    /// Apply `action` and advance one turn.
    fn step(&self, py: Python<'_>, action: i32) -> PyResult<()> {
        py.detach(|| self.with(|s| s.step(action)))
    }

    /// Whether the current episode has finished.
    fn done(&self) -> PyResult<bool> {
        self.with(|s| Ok(s.done()))
    }

    /// Begin a new episode, optionally recording into a new transcript.
    #[pyo3(signature = (ttyrec=None))]
    fn reset(&self, py: Python<'_>, ttyrec: Option<PathBuf>) -> PyResult<()> {
        py.detach(|| {
            self.with(|s| match &ttyrec {
                Some(path) => s.reset_with_transcript(path),
                None => s.reset(),
            })
        })
    }

    /// Bind NumPy arrays as observation buffers, by channel name.
    ///
    /// Channels not passed (or passed as `None`) are left unbound.
    #[pyo3(signature = (**buffers))]
    fn set_buffers(&self, buffers: Option<&Bound<'_, PyDict>>) -> PyResult<()> {
        let mut set = BufferSet::new();
        if let Some(buffers) = buffers {
            for (key, value) in buffers.iter() {
                let name: String = key.extract()?;
                let channel = Channel::from_name(&name).ok_or_else(|| {
                    PyTypeError::new_err(format!(
                        "set_buffers() got an unexpected keyword argument '{name}'"
                    ))
                })?;
                if value.is_none() {
                    continue;
                }
                set.insert(channel, Box::new(NumpyRegion::new(channel, &value)?));
            }
        }
        tracing::debug!(channels = set.len(), "binding numpy buffers");
        self.with(|s| s.set_buffers(set))
    }

    /// End the engine context and close the transcript. Idempotent.
    fn close(&self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| {
            self.with(|s| {
                s.close();
                Ok(())
            })
        })
    }

    /// Seeds for the next reset only.
    #[pyo3(signature = (core, disp, reseed, lgen=None))]
    fn set_initial_seeds(&self, core: u64, disp: u64, reseed: bool, lgen: Option<u64>) -> PyResult<()> {
        self.with(|s| {
            s.set_initial_seeds(seeds(core, disp, reseed, lgen));
            Ok(())
        })
    }

    /// Replace the live engine's seeds.
    #[pyo3(signature = (core, disp, reseed, lgen=None))]
    fn set_seeds(
        &self,
        py: Python<'_>,
        core: u64,
        disp: u64,
        reseed: bool,
        lgen: Option<u64>,
    ) -> PyResult<()> {
        py.detach(|| self.with(|s| s.set_seeds(seeds(core, disp, reseed, lgen))))
    }

    /// The live engine's seeds as `(core, disp, reseed, lgen)`; `lgen` is
    /// `None` when no level-generation seed is in use.
    fn get_seeds(&self, py: Python<'_>) -> PyResult<(u64, u64, bool, Option<u64>)> {
        let s = py.detach(|| self.with(|s| s.get_seeds()))?;
        Ok((s.core, s.display, s.reseed, s.lgen))
    }

    /// Whether the engine is in normal play (not in a menu or prompt).
    fn in_normal_game(&self) -> PyResult<bool> {
        self.with(|s| Ok(s.in_normal_game()))
    }

    /// Why the episode ended, or `None` while it is live.
    fn how_done(&self) -> PyResult<Option<TerminationReason>> {
        self.with(|s| Ok(s.how_done().map(TerminationReason::from)))
    }

    /// Replace the starting-kit specification used by later resets.
    fn set_wizkit(&self, wizkit: &str) -> PyResult<()> {
        self.with(|s| s.set_wizkit(wizkit))
    }

    /// Lifecycle state name.
    #[getter]
    fn state(&self) -> PyResult<String> {
        self.with(|s| Ok(s.state().to_string()))
    }

    /// Steps taken in the current episode.
    #[getter]
    fn steps(&self) -> PyResult<u64> {
        self.with(|s| Ok(s.steps()))
    }

    /// Episodes begun since construction.
    #[getter]
    fn episodes(&self) -> PyResult<u64> {
        self.with(|s| Ok(s.episodes()))
    }

    fn __enter__(slf: Py<Self>) -> Py<Self> {
        slf
    }

    #[pyo3(signature = (_exc_type=None, _exc_val=None, _exc_tb=None))]
    fn __exit__(
        &self,
        py: Python<'_>,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc_val: Option<&Bound<'_, PyAny>>,
        _exc_tb: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<bool> {
        self.close(py)?;
        Ok(false)
    }

    fn __repr__(&self) -> PyResult<String> {
        self.with(|s| {
            Ok(format!(
                "Session(engine='{}', state={}, episodes={})",
                s.settings().engine_path.display(),
                s.state(),
                s.episodes()
            ))
        })
    }
}
