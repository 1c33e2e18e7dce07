//! `Metadata`: monster, object and symbol tables read from the engine
//! library.
//!
//! Row lookups raise `IndexError` outside their table. The row classes
//! keep the engine's field names.

use std::path::PathBuf;

use delve_meta::{ClassSymbol, MetaTables, MonsterInfo, ObjectDescr, ObjectInfo, SymbolDef};
use delve_native::load_tables;
use pyo3::prelude::*;

use crate::error::{meta_error, tables_error};
use crate::glyphs::{vectorize, Glyphs};

/// One monster species.
#[pyclass(module = "_delve", name = "permonst", frozen, get_all)]
pub(crate) struct PerMonst {
    mname: String,
    mlet: u8,
    mlevel: i8,
    mmove: i8,
    ac: i8,
    mr: i8,
    geno: u16,
    cwt: u16,
    cnutrit: u16,
    msound: u8,
    msize: u8,
    mresists: u8,
    mconveys: u8,
    mflags1: u32,
    mflags2: u32,
    mflags3: u16,
    difficulty: u8,
    mcolor: u8,
}

impl From<&MonsterInfo> for PerMonst {
    fn from(m: &MonsterInfo) -> Self {
        Self {
            mname: m.name.clone(),
            mlet: m.mlet,
            mlevel: m.level,
            mmove: m.mmove,
            ac: m.ac,
            mr: m.mr,
            geno: m.geno,
            cwt: m.cwt,
            cnutrit: m.cnutrit,
            msound: m.msound,
            msize: m.msize,
            mresists: m.mresists,
            mconveys: m.mconveys,
            mflags1: m.mflags1,
            mflags2: m.mflags2,
            mflags3: m.mflags3,
            difficulty: m.difficulty,
            mcolor: m.color,
        }
    }
}

/// One object kind.
#[pyclass(module = "_delve", name = "objclass", frozen, get_all)]
pub(crate) struct ObjClass {
    oc_name_idx: usize,
    oc_descr_idx: usize,
    oc_oprop: u8,
    oc_class: u8,
    oc_delay: i8,
    oc_color: u8,
    oc_prob: i16,
    oc_weight: u16,
    oc_cost: i16,
}

impl From<&ObjectInfo> for ObjClass {
    fn from(o: &ObjectInfo) -> Self {
        Self {
            oc_name_idx: o.name_idx,
            oc_descr_idx: o.descr_idx,
            oc_oprop: o.oprop,
            oc_class: o.class,
            oc_delay: o.delay,
            oc_color: o.color,
            oc_prob: o.prob,
            oc_weight: o.weight,
            oc_cost: o.cost,
        }
    }
}

/// Actual name and unidentified description of an object kind.
#[pyclass(module = "_delve", name = "objdescr", frozen, get_all)]
pub(crate) struct ObjDescr {
    oc_name: Option<String>,
    oc_descr: Option<String>,
}

impl From<&ObjectDescr> for ObjDescr {
    fn from(d: &ObjectDescr) -> Self {
        Self {
            oc_name: d.name.clone(),
            oc_descr: d.descr.clone(),
        }
    }
}

/// Symbol, name and explanation of a monster or object class.
#[pyclass(module = "_delve", name = "class_sym", frozen, get_all)]
pub(crate) struct ClassSym {
    sym: char,
    name: String,
    explain: String,
}

impl From<&ClassSymbol> for ClassSym {
    fn from(c: &ClassSymbol) -> Self {
        Self {
            sym: char::from(c.sym),
            name: c.name.clone(),
            explain: c.explain.clone(),
        }
    }
}

/// One map symbol.
#[pyclass(module = "_delve", name = "symdef", frozen, get_all)]
pub(crate) struct SymDef {
    sym: u8,
    explanation: String,
    color: u8,
}

impl From<&SymbolDef> for SymDef {
    fn from(s: &SymbolDef) -> Self {
        Self {
            sym: s.sym,
            explanation: s.explanation.clone(),
            color: s.color,
        }
    }
}

/// Metadata tables of the engine library at `dlpath`.
///
/// Needs the library's `delve_meta_*` entry points, not a running
/// session. The tables are copied out when constructed.
#[pyclass(module = "_delve", frozen)]
pub(crate) struct Metadata {
    tables: MetaTables,
}

#[pymethods]
impl Metadata {
    #[new]
    fn new(py: Python<'_>, dlpath: PathBuf) -> PyResult<Self> {
        let tables = py
            .detach(|| load_tables(&dlpath))
            .map_err(tables_error)?;
        Ok(Self { tables })
    }

    /// Number of monster species.
    #[getter]
    fn nummons(&self) -> i32 {
        self.tables.counts().nummons
    }

    /// Number of object kinds.
    #[getter]
    fn num_objects(&self) -> i32 {
        self.tables.counts().num_objects
    }

    /// Number of map symbols.
    #[getter]
    fn maxpchars(&self) -> i32 {
        self.tables.counts().maxpchars
    }

    /// Monster species `index`.
    fn permonst(&self, index: i64) -> PyResult<PerMonst> {
        self.tables
            .monster(index)
            .map(PerMonst::from)
            .map_err(meta_error)
    }

    /// Object kind `index`.
    fn objclass(&self, index: i64) -> PyResult<ObjClass> {
        self.tables
            .object(index)
            .map(ObjClass::from)
            .map_err(meta_error)
    }

    /// Name/description row `index`.
    fn objdescr(&self, index: i64) -> PyResult<ObjDescr> {
        self.tables
            .description(index)
            .map(ObjDescr::from)
            .map_err(meta_error)
    }

    /// Map symbol `index`.
    fn symdef(&self, index: i64) -> PyResult<SymDef> {
        self.tables
            .symbol(index)
            .map(SymDef::from)
            .map_err(meta_error)
    }

    /// Class symbol of monster class `mlet`.
    fn class_sym_from_mlet(&self, mlet: i64) -> PyResult<ClassSym> {
        self.tables
            .monster_class(mlet)
            .map(ClassSym::from)
            .map_err(meta_error)
    }

    /// Class symbol of object class `oc_class`.
    fn class_sym_from_oc_class(&self, oc_class: i64) -> PyResult<ClassSym> {
        self.tables
            .object_class(oc_class)
            .map(ClassSym::from)
            .map_err(meta_error)
    }

    /// Actual name of object kind `index`, if it has one.
    fn obj_name(&self, index: i64) -> PyResult<Option<String>> {
        self.tables
            .object_name(index)
            .map(|name| name.map(str::to_owned))
            .map_err(meta_error)
    }

    /// Unidentified description of object kind `index`, if it has one.
    fn obj_descr(&self, index: i64) -> PyResult<Option<String>> {
        self.tables
            .object_description(index)
            .map(|descr| descr.map(str::to_owned))
            .map_err(meta_error)
    }

    /// Object index of object, corpse and statue glyphs, `NO_GLYPH`
    /// otherwise.
    fn glyph_to_obj<'py>(
        &self,
        py: Python<'py>,
        glyph: Glyphs<'py>,
    ) -> PyResult<Bound<'py, PyAny>> {
        vectorize(py, &glyph, |g| self.tables.glyph_to_obj(g))
    }

    /// Display character code of each glyph.
    fn glyph_to_char<'py>(
        &self,
        py: Python<'py>,
        glyph: Glyphs<'py>,
    ) -> PyResult<Bound<'py, PyAny>> {
        vectorize(py, &glyph, |g| self.tables.glyph_to_char(g))
    }

    /// Display color of each glyph.
    fn glyph_to_color<'py>(
        &self,
        py: Python<'py>,
        glyph: Glyphs<'py>,
    ) -> PyResult<Bound<'py, PyAny>> {
        vectorize(py, &glyph, |g| self.tables.glyph_to_color(g))
    }

    fn __repr__(&self) -> String {
        let c = self.tables.counts();
        format!(
            "Metadata(nummons={}, num_objects={}, maxpchars={})",
            c.nummons, c.num_objects, c.maxpchars
        )
    }
}

pub(crate) fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Metadata>()?;
    m.add_class::<PerMonst>()?;
    m.add_class::<ObjClass>()?;
    m.add_class::<ObjDescr>()?;
    m.add_class::<ClassSym>()?;
    m.add_class::<SymDef>()?;
    Ok(())
}
