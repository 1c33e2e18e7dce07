//! Session lifecycle for the Delve engine bridge.
//!
//! A [`Session`] drives one engine context through
//! `New → Ready → Running ⇄ Done`, with `Closed` reachable from any state.
//! Engines plug in through the [`EngineBackend`] and [`EngineContext`]
//! traits.
//!
//! - [`seeds`]: pending initial seeds, consumed by exactly one reset.
//! - [`transcript`]: recording handles and their handoff across resets.
//! - [`session`]: the state machine itself.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod seeds;
pub mod session;
pub mod transcript;

pub use engine::{EngineBackend, EngineContext, ResetArgs};
pub use seeds::SeedController;
pub use session::Session;
pub use transcript::{PendingTranscript, Transcript};
