//! Caller-owned observation buffers for the Delve engine bridge.
//!
//! The engine writes each turn's observation straight into host memory.
//! This crate validates that memory against the channel table, keeps it
//! alive while bound, and exposes the `#[repr(C)]` block the engine fills.
//!
//! ```text
//! BufferSet ──bind──▶ Observation
//!                     ├── RawObservation  (C layout, one pointer per channel)
//!                     └── BufferRegistry  (one Target per channel, owns the Region)
//! ```
//!
//! This crate may contain `unsafe` code; every block carries a
//! `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod observation;
pub mod region;
pub mod registry;

pub use observation::{Observation, RawObservation};
pub use region::{HostArray, Region};
pub use registry::{register, validate, BufferRegistry, BufferSet, Target};
