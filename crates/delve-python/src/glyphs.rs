//! Glyph helpers over the stock glyph layout.
//!
//! Each helper takes a glyph or any array-like of glyphs. A scalar comes
//! back as a scalar, an array as a NumPy array of the same shape.

use delve_meta::{GlyphKind, GlyphLayout};
use numpy::{AllowTypeChange, Element, IntoPyArray, PyArrayLikeDyn};
use pyo3::prelude::*;
use pyo3::IntoPyObjectExt;

const LAYOUT: GlyphLayout = GlyphLayout::NETHACK_3_6;

/// Glyph argument: a Python int or any array-like cast to `int32`.
pub(crate) type Glyphs<'py> = PyArrayLikeDyn<'py, i32, AllowTypeChange>;

/// Apply `f` to a scalar glyph, or elementwise to an array of glyphs.
pub(crate) fn vectorize<'py, T>(
    py: Python<'py>,
    glyphs: &Glyphs<'py>,
    f: impl Fn(i32) -> T,
) -> PyResult<Bound<'py, PyAny>>
where
    T: Element + IntoPyObject<'py>,
{
    let view = glyphs.as_array();
    if view.ndim() == 0 {
        if let Some(&glyph) = view.iter().next() {
            return f(glyph).into_bound_py_any(py);
        }
    }
    Ok(view.map(|&glyph| f(glyph)).into_pyarray(py).into_any())
}

macro_rules! predicates {
    ($($py:ident => $method:ident),* $(,)?) => {
        $(
            #[pyfunction]
            pub(crate) fn $py<'py>(
                py: Python<'py>,
                glyph: Glyphs<'py>,
            ) -> PyResult<Bound<'py, PyAny>> {
                vectorize(py, &glyph, |g| LAYOUT.$method(g))
            }
        )*

        pub(crate) fn add_predicates(m: &Bound<'_, PyModule>) -> PyResult<()> {
            $(m.add_function(wrap_pyfunction!($py, m)?)?;)*
            Ok(())
        }
    };
}

predicates! {
    glyph_is_monster => is_monster,
    glyph_is_normal_monster => is_normal_monster,
    glyph_is_pet => is_pet,
    glyph_is_body => is_body,
    glyph_is_statue => is_statue,
    glyph_is_ridden_monster => is_ridden_monster,
    glyph_is_detected_monster => is_detected_monster,
    glyph_is_invisible => is_invisible,
    glyph_is_normal_object => is_normal_object,
    glyph_is_object => is_object,
    glyph_is_trap => is_trap,
    glyph_is_cmap => is_cmap,
    glyph_is_swallow => is_swallow,
    glyph_is_warning => is_warning,
}

/// Monster index of a monster-like glyph, `NO_GLYPH` otherwise.
#[pyfunction]
pub(crate) fn glyph_to_mon<'py>(
    py: Python<'py>,
    glyph: Glyphs<'py>,
) -> PyResult<Bound<'py, PyAny>> {
    vectorize(py, &glyph, |g| LAYOUT.glyph_to_mon(g))
}

/// Trap number of a trap glyph, `NO_GLYPH` otherwise.
#[pyfunction]
pub(crate) fn glyph_to_trap<'py>(
    py: Python<'py>,
    glyph: Glyphs<'py>,
) -> PyResult<Bound<'py, PyAny>> {
    vectorize(py, &glyph, |g| LAYOUT.glyph_to_trap(g))
}

/// Map-symbol index of a map glyph, `NO_GLYPH` otherwise.
#[pyfunction]
pub(crate) fn glyph_to_cmap<'py>(
    py: Python<'py>,
    glyph: Glyphs<'py>,
) -> PyResult<Bound<'py, PyAny>> {
    vectorize(py, &glyph, |g| LAYOUT.glyph_to_cmap(g))
}

/// Border position of a swallow glyph, 0 otherwise.
#[pyfunction]
pub(crate) fn glyph_to_swallow<'py>(
    py: Python<'py>,
    glyph: Glyphs<'py>,
) -> PyResult<Bound<'py, PyAny>> {
    vectorize(py, &glyph, |g| LAYOUT.glyph_to_swallow(g))
}

/// Warning level of a warning glyph, `NO_GLYPH` otherwise.
#[pyfunction]
pub(crate) fn glyph_to_warning<'py>(
    py: Python<'py>,
    glyph: Glyphs<'py>,
) -> PyResult<Bound<'py, PyAny>> {
    vectorize(py, &glyph, |g| LAYOUT.glyph_to_warning(g))
}

/// Category name of a single `glyph`, or `None` outside the glyph range.
#[pyfunction]
pub(crate) fn classify_glyph(glyph: i32) -> Option<&'static str> {
    LAYOUT.classify(glyph).map(|kind| match kind {
        GlyphKind::Monster => "monster",
        GlyphKind::Pet => "pet",
        GlyphKind::Invisible => "invisible",
        GlyphKind::Detected => "detected",
        GlyphKind::Object => "object",
        GlyphKind::Body => "body",
        GlyphKind::Statue => "statue",
        GlyphKind::Trap => "trap",
        GlyphKind::TerrainFeature => "terrain",
        GlyphKind::Swallow => "swallow",
        GlyphKind::Warning => "warning",
    })
}

pub(crate) fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    add_predicates(m)?;
    m.add_function(wrap_pyfunction!(glyph_to_mon, m)?)?;
    m.add_function(wrap_pyfunction!(glyph_to_trap, m)?)?;
    m.add_function(wrap_pyfunction!(glyph_to_cmap, m)?)?;
    m.add_function(wrap_pyfunction!(glyph_to_swallow, m)?)?;
    m.add_function(wrap_pyfunction!(glyph_to_warning, m)?)?;
    m.add_function(wrap_pyfunction!(classify_glyph, m)?)?;
    Ok(())
}
