//! Benchmark profiles for the Delve engine bridge.
//!
//! - [`episode_profile`]: a scripted session with every channel bound
//! - [`glyph_profile`]: a scripted session with only the glyph grid bound

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use delve_core::{Channel, Seeds, SessionConfig, SessionError};
use delve_engine::Session;
use delve_test_utils::fixtures::{full_set, set_of};
use delve_test_utils::{Script, ScriptedBackend};

/// Seeds every profile starts from, so runs are comparable.
pub const BENCH_SEEDS: Seeds = Seeds {
    core: 0xbe_ac4,
    display: 0xd15,
    reseed: false,
    lgen: None,
};

fn session(episode_length: u32, channels: Option<&[Channel]>) -> Result<Session, SessionError> {
    let backend = ScriptedBackend::new(Script::default().episode_length(episode_length));
    let mut session = Session::new(backend, SessionConfig::new("scripted"))?;
    session.set_buffers(match channels {
        Some(c) => set_of(c),
        None => full_set(),
    })?;
    session.set_initial_seeds(BENCH_SEEDS);
    Ok(session)
}

/// A scripted session with all 17 channels bound, not yet reset.
pub fn episode_profile(episode_length: u32) -> Result<Session, SessionError> {
    session(episode_length, None)
}

/// A scripted session with only the glyph grid bound, not yet reset.
pub fn glyph_profile(episode_length: u32) -> Result<Session, SessionError> {
    session(episode_length, Some(&[Channel::Glyphs]))
}
