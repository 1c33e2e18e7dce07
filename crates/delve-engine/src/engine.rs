//! The seam between a session and the simulation engine.
//!
//! The engine is single-threaded and globally stateful. A backend creates at
//! most one live [`EngineContext`] per session; the session owns it and
//! serializes every call through `&mut self`.

use std::fs::File;

use delve_core::{EngineError, Seeds, Settings};
use delve_obs::Observation;

/// Everything the engine reads on `start` and `reset`.
#[derive(Clone, Copy, Debug)]
pub struct ResetArgs<'a> {
    /// Validated engine settings.
    pub settings: &'a Settings,
    /// Recording to write into from now on.
    ///
    /// `None` on `reset` means keep writing to the current recording; on
    /// `start` it means do not record.
    pub transcript: Option<&'a File>,
    /// Initial seeds to apply to the new episode, consumed by this call.
    pub initial_seeds: Option<Seeds>,
}

/// Creates engine contexts.
pub trait EngineBackend: Send {
    /// Start the engine and run it to the first observation.
    ///
    /// # Errors
    ///
    /// [`EngineError::StartFailed`] if the engine refuses to start.
    fn start(
        &mut self,
        obs: &mut Observation,
        args: ResetArgs<'_>,
    ) -> Result<Box<dyn EngineContext>, EngineError>;
}

/// A live engine context.
pub trait EngineContext: Send {
    /// Begin a new episode and write its first observation.
    ///
    /// The engine may still flush the previous recording during this call.
    fn reset(&mut self, obs: &mut Observation, args: ResetArgs<'_>) -> Result<(), EngineError>;

    /// Apply `obs.action()` and write the resulting observation.
    fn step(&mut self, obs: &mut Observation) -> Result<(), EngineError>;

    /// Replace the engine's live seeds.
    fn set_seed(&mut self, seeds: Seeds) -> Result<(), EngineError>;

    /// Read the engine's live seeds.
    fn get_seed(&mut self) -> Result<Seeds, EngineError>;

    /// Tear the context down. Never fails.
    fn end(self: Box<Self>);
}
