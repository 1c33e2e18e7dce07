//! Initial and live seeding.
//!
//! Initial seeds are held until the next `start` or `reset` takes them. The
//! take happens before the engine call, so a seed is never applied twice
//! even when that call fails.

use delve_core::{Seeds, SessionError};

use crate::engine::EngineContext;

/// Holds the pending initial seed record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedController {
    pending: Option<Seeds>,
}

impl SeedController {
    /// A controller with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds to use for the next episode. The last call before a reset wins.
    pub fn set_initial(&mut self, seeds: Seeds) {
        if let Some(prev) = self.pending.replace(seeds) {
            tracing::debug!(?prev, ?seeds, "pending initial seeds replaced");
        }
    }

    /// The pending record, if any.
    pub fn pending(&self) -> Option<&Seeds> {
        self.pending.as_ref()
    }

    /// Remove and return the pending record.
    pub fn take(&mut self) -> Option<Seeds> {
        let taken = self.pending.take();
        if let Some(seeds) = &taken {
            tracing::debug!(
                core = seeds.core,
                display = seeds.display,
                reseed = seeds.reseed,
                lgen = ?seeds.lgen,
                "initial seeds consumed"
            );
        }
        taken
    }
}

/// Forward `seeds` to a live context.
///
/// # Errors
///
/// [`SessionError::NotReady`] without a context, or the engine's error.
pub fn set_live(ctx: Option<&mut Box<dyn EngineContext>>, seeds: Seeds) -> Result<(), SessionError> {
    let ctx = ctx.ok_or(SessionError::NotReady {
        operation: "set_seeds",
    })?;
    ctx.set_seed(seeds)?;
    Ok(())
}

/// Read the live seeds of a context.
///
/// # Errors
///
/// [`SessionError::NotReady`] without a context, or the engine's error.
pub fn get_live(ctx: Option<&mut Box<dyn EngineContext>>) -> Result<Seeds, SessionError> {
    let ctx = ctx.ok_or(SessionError::NotReady {
        operation: "get_seeds",
    })?;
    Ok(ctx.get_seed()?)
}
