//! Metadata tables read out of the engine library.
//!
//! The `delve_meta_*` entry points are optional: [`NativeBackend::load`]
//! does not resolve them, so an engine built without them still runs
//! sessions. Every string is copied out, so the returned [`MetaTables`]
//! doesn't keep the library loaded.

use std::error::Error;
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int};
use std::path::Path;

use delve_core::EngineError;
use delve_meta::{
    ClassSymbol, GlyphCounts, MetaError, MetaTables, MiscSymbols, MonsterInfo, ObjectDescr,
    ObjectInfo, SymbolDef, TableRows,
};
use libloading::Library;

use crate::abi::{
    ClassSymFn, MetaCountsFn, MonsterFn, ObjDescrFn, ObjectFn, RawClassSym, RawMetaCounts,
    RawMonster, RawObjDescr, RawObject, RawSymDef, SymDefFn,
};
use crate::backend::{check, open, symbol, NativeBackend};

/// Errors from reading the metadata tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TablesError {
    /// The library could not be loaded, lacks a table entry point, or an
    /// entry point returned a failure status.
    Engine(EngineError),
    /// A row field holds a value the tables cannot represent.
    BadField {
        /// Table being read.
        table: &'static str,
        /// Row index.
        index: c_int,
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// The rows disagree with each other or with the counts.
    Invalid(MetaError),
}

impl fmt::Display for TablesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "{e}"),
            Self::BadField {
                table,
                index,
                field,
                reason,
            } => write!(f, "{table} row {index}: {field} {reason}"),
            Self::Invalid(e) => write!(f, "{e}"),
        }
    }
}

impl Error for TablesError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            Self::Invalid(e) => Some(e),
            Self::BadField { .. } => None,
        }
    }
}

impl From<EngineError> for TablesError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<MetaError> for TablesError {
    fn from(e: MetaError) -> Self {
        Self::Invalid(e)
    }
}

/// Read the metadata tables from the engine library at `path`.
///
/// Only the `delve_meta_*` entry points are needed; the session entry
/// points may be absent.
///
/// # Errors
///
/// [`TablesError::Engine`] if the library can't be loaded, lacks an entry
/// point or reports a failure, [`TablesError::BadField`] for a row value
/// out of range or a string that isn't UTF-8, [`TablesError::Invalid`] if
/// the rows don't hang together.
pub fn load_tables(path: impl AsRef<Path>) -> Result<MetaTables, TablesError> {
    let path = path.as_ref();
    let library = open(path)?;
    let tables = MetaApi::resolve(&library)?.read()?;
    tracing::info!(path = %path.display(), "metadata tables loaded");
    Ok(tables)
}

impl NativeBackend {
    /// Read the metadata tables from this backend's library.
    ///
    /// # Errors
    ///
    /// As [`load_tables`].
    pub fn tables(&self) -> Result<MetaTables, TablesError> {
        MetaApi::resolve(self.library())?.read()
    }
}

/// Table entry points, valid while the borrowed library stays loaded.
#[derive(Clone, Copy, Debug)]
struct MetaApi<'lib> {
    counts: MetaCountsFn,
    monster: MonsterFn,
    object: ObjectFn,
    objdescr: ObjDescrFn,
    monster_class: ClassSymFn,
    object_class: ClassSymFn,
    symbol: SymDefFn,
    _library: PhantomData<&'lib Library>,
}

/// Call a row entry point for row `index`.
///
/// `f` must come from a [`MetaApi`], so the library is still loaded.
#[allow(unsafe_code)]
fn fetch<R: Default>(
    operation: &'static str,
    f: unsafe extern "C" fn(c_int, *mut R) -> c_int,
    index: c_int,
) -> Result<R, EngineError> {
    let mut row = R::default();
    // SAFETY: `f` is the entry point for `operation`, resolved from a
    // library that outlives the `MetaApi` it was copied from. `row` is a
    // valid out-parameter for the duration of the call.
    let status = unsafe { f(index, &mut row) };
    check(operation, status)?;
    Ok(row)
}

/// Field conversions for one row.
struct Row {
    table: &'static str,
    index: c_int,
}

impl Row {
    fn bad(&self, field: &'static str, reason: impl Into<String>) -> TablesError {
        TablesError::BadField {
            table: self.table,
            index: self.index,
            field,
            reason: reason.into(),
        }
    }

    fn num<T, V>(&self, field: &'static str, value: V) -> Result<T, TablesError>
    where
        T: TryFrom<V>,
        V: Copy + fmt::Display,
    {
        T::try_from(value).map_err(|_| self.bad(field, format!("{value} is out of range")))
    }

    /// Copy a string out of the library. Null reads as `None`.
    #[allow(unsafe_code)]
    fn text(&self, field: &'static str, ptr: *const c_char) -> Result<Option<String>, TablesError> {
        if ptr.is_null() {
            return Ok(None);
        }
        // SAFETY: non-null strings from the table entry points are
        // NUL-terminated and live as long as the library, which is loaded
        // for the whole read.
        let text = unsafe { CStr::from_ptr(ptr) };
        text.to_str()
            .map(|s| Some(s.to_owned()))
            .map_err(|e| self.bad(field, format!("is not valid UTF-8 ({e})")))
    }

    fn required(&self, field: &'static str, ptr: *const c_char) -> Result<String, TablesError> {
        self.text(field, ptr)?.ok_or_else(|| self.bad(field, "is null"))
    }
}

fn collect_rows<T>(
    count: c_int,
    read: impl FnMut(c_int) -> Result<T, TablesError>,
) -> Result<Vec<T>, TablesError> {
    (0..count).map(read).collect()
}

impl<'lib> MetaApi<'lib> {
    fn resolve(library: &'lib Library) -> Result<Self, EngineError> {
        Ok(Self {
            counts: symbol(library, "delve_meta_counts")?,
            monster: symbol(library, "delve_meta_monster")?,
            object: symbol(library, "delve_meta_object")?,
            objdescr: symbol(library, "delve_meta_objdescr")?,
            monster_class: symbol(library, "delve_meta_monster_class")?,
            object_class: symbol(library, "delve_meta_object_class")?,
            symbol: symbol(library, "delve_meta_symbol")?,
            _library: PhantomData,
        })
    }

    fn read(&self) -> Result<MetaTables, TablesError> {
        let mut raw = RawMetaCounts::default();
        // SAFETY: `counts` was resolved from a library that outlives
        // `self`; `raw` is a valid out-parameter.
        #[allow(unsafe_code)]
        let status = unsafe { (self.counts)(&mut raw) };
        check("meta_counts", status)?;

        let counts = GlyphCounts {
            nummons: raw.nummons,
            num_objects: raw.num_objects,
            maxpchars: raw.maxpchars,
            maxexpchars: raw.maxexpchars,
            expl_max: raw.expl_max,
            num_zap: raw.num_zap,
            warncount: raw.warncount,
            first_trap: raw.first_trap,
            trapnum: raw.trapnum,
        };
        let defaults = MiscSymbols::default();
        let rows = TableRows {
            monsters: collect_rows(raw.nummons, |i| self.monster(i))?,
            objects: collect_rows(raw.num_objects, |i| self.object(i))?,
            descriptions: collect_rows(raw.num_descriptions, |i| self.objdescr(i))?,
            monster_classes: collect_rows(raw.monster_classes, |i| {
                class_sym("monster_classes", "meta_monster_class", self.monster_class, i)
            })?,
            object_classes: collect_rows(raw.object_classes, |i| {
                class_sym("object_classes", "meta_object_class", self.object_class, i)
            })?,
            symbols: collect_rows(raw.maxpchars, |i| self.symbol(i))?,
            misc: MiscSymbols {
                boulder: match raw.boulder_sym {
                    0 => defaults.boulder,
                    sym => sym,
                },
                invisible: match raw.invisible_sym {
                    0 => defaults.invisible,
                    sym => sym,
                },
            },
        };

        let tables = MetaTables::new(counts, rows)?;
        tracing::debug!(
            monsters = raw.nummons,
            objects = raw.num_objects,
            symbols = raw.maxpchars,
            "metadata tables read"
        );
        Ok(tables)
    }

    fn monster(&self, index: c_int) -> Result<MonsterInfo, TablesError> {
        let raw: RawMonster = fetch("meta_monster", self.monster, index)?;
        let row = Row {
            table: "monsters",
            index,
        };
        Ok(MonsterInfo {
            name: row.required("name", raw.name)?,
            mlet: row.num("mlet", raw.mlet)?,
            level: row.num("mlevel", raw.mlevel)?,
            mmove: row.num("mmove", raw.mmove)?,
            ac: row.num("ac", raw.ac)?,
            mr: row.num("mr", raw.mr)?,
            geno: row.num("geno", raw.geno)?,
            cwt: row.num("cwt", raw.cwt)?,
            cnutrit: row.num("cnutrit", raw.cnutrit)?,
            msound: row.num("msound", raw.msound)?,
            msize: row.num("msize", raw.msize)?,
            mresists: row.num("mresists", raw.mresists)?,
            mconveys: row.num("mconveys", raw.mconveys)?,
            mflags1: raw.mflags1,
            mflags2: raw.mflags2,
            mflags3: row.num("mflags3", raw.mflags3)?,
            difficulty: row.num("difficulty", raw.difficulty)?,
            color: row.num("color", raw.color)?,
        })
    }

    fn object(&self, index: c_int) -> Result<ObjectInfo, TablesError> {
        let raw: RawObject = fetch("meta_object", self.object, index)?;
        let row = Row {
            table: "objects",
            index,
        };
        Ok(ObjectInfo {
            name_idx: row.num("name_idx", raw.name_idx)?,
            descr_idx: row.num("descr_idx", raw.descr_idx)?,
            oprop: row.num("oprop", raw.oprop)?,
            class: row.num("oc_class", raw.oc_class)?,
            delay: row.num("delay", raw.delay)?,
            color: row.num("color", raw.color)?,
            prob: row.num("prob", raw.prob)?,
            weight: row.num("weight", raw.weight)?,
            cost: row.num("cost", raw.cost)?,
        })
    }

    fn objdescr(&self, index: c_int) -> Result<ObjectDescr, TablesError> {
        let raw: RawObjDescr = fetch("meta_objdescr", self.objdescr, index)?;
        let row = Row {
            table: "descriptions",
            index,
        };
        Ok(ObjectDescr {
            name: row.text("name", raw.name)?,
            descr: row.text("descr", raw.descr)?,
        })
    }

    fn symbol(&self, index: c_int) -> Result<SymbolDef, TablesError> {
        let raw: RawSymDef = fetch("meta_symbol", self.symbol, index)?;
        let row = Row {
            table: "symbols",
            index,
        };
        Ok(SymbolDef {
            sym: raw.sym,
            explanation: row.text("explanation", raw.explanation)?.unwrap_or_default(),
            color: row.num("color", raw.color)?,
        })
    }
}

fn class_sym(
    table: &'static str,
    operation: &'static str,
    f: ClassSymFn,
    index: c_int,
) -> Result<ClassSymbol, TablesError> {
    let raw: RawClassSym = fetch(operation, f, index)?;
    let row = Row { table, index };
    Ok(ClassSymbol {
        sym: raw.sym,
        name: row.text("name", raw.name)?.unwrap_or_default(),
        explain: row.text("explain", raw.explain)?.unwrap_or_default(),
    })
}
