//! Python bindings for the Delve engine bridge.
//!
//! The native extension is named `_delve`. It wraps [`delve_engine::Session`]
//! over the native engine backend, binds NumPy arrays through the buffer
//! registry, reads the engine's metadata tables, and exposes vectorized
//! glyph helpers from `delve-meta`. Everything that loads the engine
//! library is unix only.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
mod error;
mod glyphs;
#[cfg(unix)]
mod metadata;
#[cfg(unix)]
mod region;
#[cfg(unix)]
mod session;
mod termination;

/// The native `_delve` extension module.
#[pymodule]
fn _delve(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // A subscriber may already be installed by an embedding process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    m.add_class::<termination::TerminationReason>()?;
    #[cfg(unix)]
    {
        m.add_class::<session::Session>()?;
        metadata::register(m)?;
    }
    glyphs::register(m)?;
    Ok(())
}
