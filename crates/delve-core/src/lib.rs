//! Core types for the Delve engine bridge.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the rest of the workspace: the observation channel
//! table, element types, seeds, termination reasons, fixed-capacity strings,
//! session settings, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod dims;
pub mod error;
pub mod fixed;
pub mod seeds;
pub mod settings;
pub mod state;
pub mod termination;

pub use channel::{Channel, DType, Element, Shape};
pub use error::{BindError, EngineError, LayoutIssue, SessionError};
pub use fixed::FixedStr;
pub use seeds::Seeds;
pub use settings::{SessionConfig, Settings};
pub use state::SessionState;
pub use termination::TerminationReason;
