//! Native engine backend for the Delve engine bridge.
//!
//! [`NativeBackend`] loads the engine shared library named by the session's
//! engine-location path and implements the engine seam over its C entry
//! points (see [`abi`]). [`load_tables`] and [`NativeBackend::tables`] read
//! the monster, object and symbol tables through the optional
//! `delve_meta_*` entry points.
//!
//! This crate may contain `unsafe` code; every block carries a
//! `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![cfg(unix)]

pub mod abi;
pub mod backend;
pub mod tables;

pub use backend::NativeBackend;
pub use tables::{load_tables, TablesError};
