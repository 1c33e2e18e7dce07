//! [`NativeBackend`]: the engine shared library behind the engine seam.

use std::ffi::c_void;
use std::fs::File;
use std::os::fd::AsRawFd;
use std::os::raw::c_int;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};
use std::sync::Arc;

use delve_core::{EngineError, Seeds};
use delve_engine::{EngineBackend, EngineContext, ResetArgs};
use delve_obs::Observation;
use libloading::Library;

use crate::abi::{
    EndFn, GetSeedFn, RawSeeds, RawSettings, ResetFn, SetSeedFn, StartFn, StepFn, NO_FD,
};

/// Entry points resolved from the library.
#[derive(Clone, Copy, Debug)]
struct Api {
    start: StartFn,
    reset: ResetFn,
    step: StepFn,
    end: EndFn,
    set_seed: SetSeedFn,
    get_seed: GetSeedFn,
}

#[allow(unsafe_code)]
pub(crate) fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T, EngineError> {
    // SAFETY: every `T` requested from this crate is the declared C
    // signature of `name`. The copied function pointer is only called
    // while an `Arc<Library>` or a borrow of the library keeps it mapped.
    unsafe { library.get::<T>(name.as_bytes()) }
        .map(|sym| *sym)
        .map_err(|e| EngineError::MissingSymbol {
            symbol: name,
            reason: e.to_string(),
        })
}

impl Api {
    fn resolve(library: &Library) -> Result<Self, EngineError> {
        Ok(Self {
            start: symbol(library, "delve_start")?,
            reset: symbol(library, "delve_reset")?,
            step: symbol(library, "delve_step")?,
            end: symbol(library, "delve_end")?,
            set_seed: symbol(library, "delve_set_seed")?,
            get_seed: symbol(library, "delve_get_seed")?,
        })
    }
}

/// Open the engine library at `path`.
pub(crate) fn open(path: &Path) -> Result<Library, EngineError> {
    // SAFETY: opening the library runs its initializers. The engine
    // library is trusted code supplied by the host.
    #[allow(unsafe_code)]
    let library = unsafe { Library::new(path) };
    library.map_err(|e| EngineError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub(crate) fn check(operation: &'static str, status: c_int) -> Result<(), EngineError> {
    if status == 0 {
        Ok(())
    } else {
        Err(EngineError::Failed {
            operation,
            reason: format!("engine returned status {status}"),
        })
    }
}

fn seeds_ptr(seeds: &Option<RawSeeds>) -> *const RawSeeds {
    seeds.as_ref().map_or(ptr::null(), |s| s as *const RawSeeds)
}

fn transcript_fd(file: Option<&File>) -> c_int {
    file.map_or(NO_FD, |f| f.as_raw_fd())
}

/// Engine backend backed by a dynamically loaded library.
#[derive(Debug)]
pub struct NativeBackend {
    path: PathBuf,
    library: Arc<Library>,
    api: Api,
}

impl NativeBackend {
    /// Load the engine library at `path` and resolve its entry points.
    ///
    /// # Errors
    ///
    /// [`EngineError::Load`] if the library can't be opened,
    /// [`EngineError::MissingSymbol`] if an entry point is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let library = open(path)?;
        let api = Api::resolve(&library)?;
        tracing::info!(path = %path.display(), "engine library loaded");
        Ok(Self {
            path: path.to_path_buf(),
            library: Arc::new(library),
            api,
        })
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn library(&self) -> &Library {
        &self.library
    }
}

impl EngineBackend for NativeBackend {
    fn start(
        &mut self,
        obs: &mut Observation,
        args: ResetArgs<'_>,
    ) -> Result<Box<dyn EngineContext>, EngineError> {
        let settings = RawSettings::from_settings(args.settings);
        let seeds = args.initial_seeds.map(RawSeeds::from);
        // SAFETY: `obs` points at a live RawObservation whose channel
        // pointers are either null or validated host buffers owned by the
        // observation. `settings` and `seeds` outlive the call. The
        // descriptor, if any, stays open until the next successful reset
        // or `end`.
        #[allow(unsafe_code)]
        let ctx = unsafe {
            (self.api.start)(
                obs.as_mut_ptr(),
                transcript_fd(args.transcript),
                &*settings,
                seeds_ptr(&seeds),
            )
        };
        let ctx = NonNull::new(ctx).ok_or_else(|| EngineError::StartFailed {
            reason: format!("{} returned no context", self.path.display()),
        })?;
        tracing::debug!(path = %self.path.display(), "native context started");
        Ok(Box::new(NativeContext {
            ctx,
            api: self.api,
            _library: Arc::clone(&self.library),
        }))
    }
}

/// A live context inside the engine library.
#[derive(Debug)]
struct NativeContext {
    ctx: NonNull<c_void>,
    api: Api,
    _library: Arc<Library>,
}

// SAFETY: the context pointer is only used through `&mut self` or by
// value, so calls never overlap, and the engine does not tie a context to
// the thread that created it.
#[allow(unsafe_code)]
unsafe impl Send for NativeContext {}

impl EngineContext for NativeContext {
    #[allow(unsafe_code)]
    fn reset(&mut self, obs: &mut Observation, args: ResetArgs<'_>) -> Result<(), EngineError> {
        let settings = RawSettings::from_settings(args.settings);
        let seeds = args.initial_seeds.map(RawSeeds::from);
        // SAFETY: `ctx` came from `delve_start` and has not been ended.
        // Pointer arguments are valid as in `start`.
        let status = unsafe {
            (self.api.reset)(
                self.ctx.as_ptr(),
                obs.as_mut_ptr(),
                transcript_fd(args.transcript),
                &*settings,
                seeds_ptr(&seeds),
            )
        };
        check("reset", status)
    }

    #[allow(unsafe_code)]
    fn step(&mut self, obs: &mut Observation) -> Result<(), EngineError> {
        // SAFETY: live context; `obs` as in `start`.
        let status = unsafe { (self.api.step)(self.ctx.as_ptr(), obs.as_mut_ptr()) };
        check("step", status)
    }

    #[allow(unsafe_code)]
    fn set_seed(&mut self, seeds: Seeds) -> Result<(), EngineError> {
        let raw = RawSeeds::from(seeds);
        // SAFETY: live context; `raw` outlives the call.
        let status = unsafe { (self.api.set_seed)(self.ctx.as_ptr(), &raw) };
        check("set_seed", status)
    }

    #[allow(unsafe_code)]
    fn get_seed(&mut self) -> Result<Seeds, EngineError> {
        let mut raw = RawSeeds::default();
        // SAFETY: live context; `raw` is a valid out-parameter.
        let status = unsafe { (self.api.get_seed)(self.ctx.as_ptr(), &mut raw) };
        check("get_seed", status)?;
        Ok(raw.into())
    }

    fn end(self: Box<Self>) {
        drop(self);
    }
}

impl Drop for NativeContext {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        // SAFETY: `ctx` is live and is never used again after this call.
        unsafe { (self.api.end)(self.ctx.as_ptr()) };
        tracing::debug!("native context ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_library_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libdelve-missing.so");
        match NativeBackend::load(&path) {
            Err(EngineError::Load { path: p, reason }) => {
                assert_eq!(p, path);
                assert!(!reason.is_empty());
            }
            other => panic!("expected Load, got {other:?}"),
        }
    }

    #[test]
    fn non_library_file_is_a_load_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not an ELF object").unwrap();
        assert!(matches!(
            NativeBackend::load(file.path()),
            Err(EngineError::Load { .. })
        ));
    }

    #[test]
    fn no_recording_passes_no_descriptor() {
        assert_eq!(transcript_fd(None), NO_FD);
        let file = tempfile::tempfile().unwrap();
        assert!(transcript_fd(Some(&file)) >= 0);
    }

    #[test]
    fn status_codes() {
        assert!(check("step", 0).is_ok());
        assert_eq!(
            check("step", 3),
            Err(EngineError::Failed {
                operation: "step",
                reason: "engine returned status 3".into()
            })
        );
    }

    #[test]
    fn absent_seeds_are_null() {
        assert!(seeds_ptr(&None).is_null());
        assert!(!seeds_ptr(&Some(RawSeeds::default())).is_null());
    }
}
