//! Delve: a zero-copy bridge between a roguelike simulation engine and
//! reinforcement-learning hosts.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Delve sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use delve::prelude::*;
//! use delve_test_utils::ScriptedBackend;
//!
//! let mut session = Session::new(ScriptedBackend::default(), SessionConfig::new("scripted")).unwrap();
//! session
//!     .set_buffers(BufferSet::new().with(
//!         Channel::Glyphs,
//!         HostArray::<i16>::for_channel(Channel::Glyphs),
//!     ))
//!     .unwrap();
//! session.reset().unwrap();
//! while !session.done() {
//!     session.step(0).unwrap();
//! }
//! assert!(session.how_done().is_some());
//!
//! let layout = GlyphLayout::NETHACK_3_6;
//! let grid = session.observation().glyphs().unwrap();
//! assert!(grid.iter().any(|&g| layout.classify(i32::from(g)) == Some(GlyphKind::Monster)));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `delve-core` | Channels, seeds, settings, termination reasons, errors |
//! | [`obs`] | `delve-obs` | Regions, buffer registry, observation block |
//! | [`engine`] | `delve-engine` | Engine seam, session lifecycle, transcripts |
//! | [`meta`] | `delve-meta` | Glyph layout and metadata tables |
//! | `native` | `delve-native` | Dynamically loaded engine backend (unix) |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`delve-core`).
pub use delve_core as types;

/// Observation buffers (`delve-obs`).
///
/// Implement [`obs::Region`] to bind foreign memory; [`obs::HostArray`] is
/// the Rust-owned implementation.
pub use delve_obs as obs;

/// Session lifecycle (`delve-engine`).
pub use delve_engine as engine;

/// Glyph layout and metadata tables (`delve-meta`).
pub use delve_meta as meta;

/// Native engine backend (`delve-native`).
#[cfg(unix)]
pub use delve_native as native;

/// Load the engine library named by `config` and open a session on it.
///
/// # Errors
///
/// [`SessionError::Engine`](types::SessionError::Engine) if the library
/// can't be loaded, otherwise whatever [`engine::Session::new`] returns.
#[cfg(unix)]
pub fn open_native(
    config: types::SessionConfig,
) -> Result<engine::Session, types::SessionError> {
    let backend = native::NativeBackend::load(config.engine_path())?;
    engine::Session::new(backend, config)
}

/// Common imports for typical Delve usage.
///
/// ```rust
/// use delve::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use delve_core::{
        Channel, DType, Seeds, SessionConfig, SessionState, Settings, TerminationReason,
    };

    // Errors
    pub use delve_core::{BindError, EngineError, SessionError};

    // Buffers
    pub use delve_obs::{BufferSet, HostArray, Observation, Region};

    // Engine
    pub use delve_engine::{EngineBackend, EngineContext, ResetArgs, Session};

    // Metadata
    pub use delve_meta::{GlyphKind, GlyphLayout, MetaTables};
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use types::{EngineError, SessionConfig, SessionError};

    #[test]
    fn missing_engine_library_fails_before_any_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig::new(dir.path().join("libdelve.so"))
            .transcript(dir.path().join("ep1.ttyrec"));
        let err = open_native(config).unwrap_err();
        assert!(matches!(err, SessionError::Engine(EngineError::Load { .. })));
        assert!(!dir.path().join("ep1.ttyrec").exists());
    }
}
