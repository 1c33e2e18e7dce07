//! Bounds-checked metadata tables.
//!
//! [`MetaTables`] owns one row per monster species, object kind, object
//! name/description pair, monster class, object class and map symbol. Rows
//! are checked against [`GlyphCounts`] once at construction; every lookup
//! afterwards is bounds-checked and fails with
//! [`MetaError::IndexOutOfRange`].

use indexmap::IndexMap;

use crate::error::MetaError;
use crate::layout::{GlyphCounts, GlyphLayout};

/// Object class numbers.
pub mod object_class {
    #![allow(missing_docs)]
    pub const RANDOM: u8 = 0;
    pub const ILLOBJ: u8 = 1;
    pub const WEAPON: u8 = 2;
    pub const ARMOR: u8 = 3;
    pub const RING: u8 = 4;
    pub const AMULET: u8 = 5;
    pub const TOOL: u8 = 6;
    pub const FOOD: u8 = 7;
    pub const POTION: u8 = 8;
    pub const SCROLL: u8 = 9;
    pub const SPBOOK: u8 = 10;
    pub const WAND: u8 = 11;
    pub const COIN: u8 = 12;
    pub const GEM: u8 = 13;
    pub const ROCK: u8 = 14;
    pub const BALL: u8 = 15;
    pub const CHAIN: u8 = 16;
    pub const VENOM: u8 = 17;
    /// Number of object classes.
    pub const MAXOCLASSES: usize = 18;
}

/// Number of monster classes in the stock tables.
pub const MAXMCLASSES: usize = 61;

/// One monster species.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonsterInfo {
    /// Full name.
    pub name: String,
    /// Monster class (index into the monster-class table).
    pub mlet: u8,
    /// Base level.
    pub level: i8,
    /// Move speed.
    pub mmove: i8,
    /// Armor class.
    pub ac: i8,
    /// Magic resistance.
    pub mr: i8,
    /// Generation flags.
    pub geno: u16,
    /// Corpse weight.
    pub cwt: u16,
    /// Corpse nutrition.
    pub cnutrit: u16,
    /// Sound made.
    pub msound: u8,
    /// Physical size.
    pub msize: u8,
    /// Resistances held.
    pub mresists: u8,
    /// Resistances conveyed by eating.
    pub mconveys: u8,
    /// Body and ability flags.
    pub mflags1: u32,
    /// Race and behavior flags.
    pub mflags2: u32,
    /// Extra behavior flags.
    pub mflags3: u16,
    /// Generation difficulty.
    pub difficulty: u8,
    /// Display color.
    pub color: u8,
}

/// One object kind. Names live in the description table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Row in the description table holding the actual name.
    pub name_idx: usize,
    /// Row in the description table holding the unidentified description.
    pub descr_idx: usize,
    /// Property conveyed.
    pub oprop: u8,
    /// Object class (see [`object_class`]).
    pub class: u8,
    /// Delay when using.
    pub delay: i8,
    /// Display color.
    pub color: u8,
    /// Generation probability.
    pub prob: i16,
    /// Weight.
    pub weight: u16,
    /// Base price.
    pub cost: i16,
}

impl ObjectInfo {
    /// The actual name, read from `descriptions`.
    pub fn name<'a>(&self, descriptions: &'a [ObjectDescr]) -> Option<&'a str> {
        descriptions.get(self.name_idx)?.name.as_deref()
    }

    /// The unidentified description, read from `descriptions`.
    pub fn description<'a>(&self, descriptions: &'a [ObjectDescr]) -> Option<&'a str> {
        descriptions.get(self.descr_idx)?.descr.as_deref()
    }
}

/// A name/description pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectDescr {
    /// Actual name.
    pub name: Option<String>,
    /// Unidentified appearance.
    pub descr: Option<String>,
}

/// Symbol and naming of a monster or object class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassSymbol {
    /// Display character.
    pub sym: u8,
    /// Short class name.
    pub name: String,
    /// Text shown when the symbol is looked at.
    pub explain: String,
}

/// One map symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolDef {
    /// Display character.
    pub sym: u8,
    /// Text shown when the symbol is looked at.
    pub explanation: String,
    /// Display color.
    pub color: u8,
}

/// Symbols that don't come from a class or map-symbol row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MiscSymbols {
    /// Drawn for boulders instead of the rock-class symbol.
    pub boulder: u8,
    /// Drawn for the remembered-unseen-monster glyph.
    pub invisible: u8,
}

impl Default for MiscSymbols {
    fn default() -> Self {
        Self {
            boulder: b'`',
            invisible: b'I',
        }
    }
}

/// Raw rows handed to [`MetaTables::new`].
#[derive(Clone, Debug, Default)]
pub struct TableRows {
    /// One row per monster species.
    pub monsters: Vec<MonsterInfo>,
    /// One row per object kind.
    pub objects: Vec<ObjectInfo>,
    /// Name/description pairs indexed by [`ObjectInfo`].
    pub descriptions: Vec<ObjectDescr>,
    /// Indexed by [`MonsterInfo::mlet`].
    pub monster_classes: Vec<ClassSymbol>,
    /// Indexed by [`ObjectInfo::class`].
    pub object_classes: Vec<ClassSymbol>,
    /// One row per map symbol.
    pub symbols: Vec<SymbolDef>,
    /// Boulder and invisible-marker symbols.
    pub misc: MiscSymbols,
}

/// Validated, read-only metadata tables.
#[derive(Clone, Debug)]
pub struct MetaTables {
    layout: GlyphLayout,
    rows: TableRows,
    monster_names: IndexMap<String, usize>,
    object_names: IndexMap<String, usize>,
    corpse: usize,
    statue: usize,
    boulder: usize,
}

fn invalid(reason: impl Into<String>) -> MetaError {
    MetaError::InvalidTables {
        reason: reason.into(),
    }
}

fn check_len(table: &str, len: usize, expected: i32) -> Result<(), MetaError> {
    if usize::try_from(expected).ok() == Some(len) {
        Ok(())
    } else {
        Err(invalid(format!("{table} has {len} rows, expected {expected}")))
    }
}

fn row<'a, T>(table: &'static str, rows: &'a [T], index: i64) -> Result<&'a T, MetaError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| rows.get(i))
        .ok_or(MetaError::IndexOutOfRange {
            table,
            index,
            bound: rows.len(),
        })
}

impl MetaTables {
    /// Validate `rows` against `counts` and index names.
    ///
    /// Fails with [`MetaError::InvalidTables`] if a table's length disagrees
    /// with `counts`, if a row points outside another table, or if the
    /// corpse, statue or boulder object is missing.
    pub fn new(counts: GlyphCounts, rows: TableRows) -> Result<Self, MetaError> {
        check_len("monsters", rows.monsters.len(), counts.nummons)?;
        check_len("objects", rows.objects.len(), counts.num_objects)?;
        check_len("symbols", rows.symbols.len(), counts.maxpchars)?;
        if counts.zap_symbol_base() > counts.swallow_symbol_base()
            || counts.first_trap < 0
            || counts.trapnum < 1
            || counts.swallow_symbol_base() < 0
        {
            return Err(invalid("trap symbols overlap the swallow and explosion symbols"));
        }

        for (i, m) in rows.monsters.iter().enumerate() {
            if usize::from(m.mlet) >= rows.monster_classes.len() {
                return Err(invalid(format!(
                    "monster {i} ({}) has class {} of {}",
                    m.name,
                    m.mlet,
                    rows.monster_classes.len()
                )));
            }
        }
        for (i, o) in rows.objects.iter().enumerate() {
            if usize::from(o.class) >= rows.object_classes.len() {
                return Err(invalid(format!(
                    "object {i} has class {} of {}",
                    o.class,
                    rows.object_classes.len()
                )));
            }
            if o.name_idx >= rows.descriptions.len() || o.descr_idx >= rows.descriptions.len() {
                return Err(invalid(format!(
                    "object {i} points past {} descriptions",
                    rows.descriptions.len()
                )));
            }
        }

        let mut monster_names = IndexMap::with_capacity(rows.monsters.len());
        for (i, m) in rows.monsters.iter().enumerate() {
            monster_names.entry(m.name.clone()).or_insert(i);
        }
        // Some objects share a name (the paper scroll and the blank
        // spellbook); the first one wins.
        let mut object_names = IndexMap::with_capacity(rows.objects.len());
        for (i, o) in rows.objects.iter().enumerate() {
            if let Some(name) = o.name(&rows.descriptions) {
                object_names.entry(name.to_owned()).or_insert(i);
            }
        }
        let named = |name: &str| {
            object_names
                .get(name)
                .copied()
                .ok_or_else(|| invalid(format!("no object named {name:?}")))
        };
        let corpse = named("corpse")?;
        let statue = named("statue")?;
        let boulder = named("boulder")?;

        Ok(Self {
            layout: GlyphLayout::new(counts),
            rows,
            monster_names,
            object_names,
            corpse,
            statue,
            boulder,
        })
    }

    /// Glyph layout for these tables.
    pub fn layout(&self) -> &GlyphLayout {
        &self.layout
    }

    /// Counts the layout was computed from.
    pub fn counts(&self) -> &GlyphCounts {
        self.layout.counts()
    }

    /// Symbols outside the class and map-symbol tables.
    pub fn misc(&self) -> &MiscSymbols {
        &self.rows.misc
    }

    // ── Rows ───────────────────────────────────────────────────────

    /// Monster species `index`.
    pub fn monster(&self, index: i64) -> Result<&MonsterInfo, MetaError> {
        row("monsters", &self.rows.monsters, index)
    }

    /// Object kind `index`.
    pub fn object(&self, index: i64) -> Result<&ObjectInfo, MetaError> {
        row("objects", &self.rows.objects, index)
    }

    /// Name/description row `index`.
    pub fn description(&self, index: i64) -> Result<&ObjectDescr, MetaError> {
        row("descriptions", &self.rows.descriptions, index)
    }

    /// Map symbol `index`.
    pub fn symbol(&self, index: i64) -> Result<&SymbolDef, MetaError> {
        row("symbols", &self.rows.symbols, index)
    }

    /// Class symbol for monster letter (class number) `mlet`.
    pub fn monster_class(&self, mlet: i64) -> Result<&ClassSymbol, MetaError> {
        row("monster classes", &self.rows.monster_classes, mlet)
    }

    /// Class symbol for object class `class`.
    pub fn object_class(&self, class: i64) -> Result<&ClassSymbol, MetaError> {
        row("object classes", &self.rows.object_classes, class)
    }

    /// All name/description rows.
    pub fn descriptions(&self) -> &[ObjectDescr] {
        &self.rows.descriptions
    }

    /// Actual name of object `index`.
    pub fn object_name(&self, index: i64) -> Result<Option<&str>, MetaError> {
        Ok(self.object(index)?.name(&self.rows.descriptions))
    }

    /// Unidentified description of object `index`.
    pub fn object_description(&self, index: i64) -> Result<Option<&str>, MetaError> {
        Ok(self.object(index)?.description(&self.rows.descriptions))
    }

    // ── Name lookup ────────────────────────────────────────────────

    /// Index of the monster named `name`.
    pub fn monster_index(&self, name: &str) -> Option<usize> {
        self.monster_names.get(name).copied()
    }

    /// Index of the first object named `name`.
    pub fn object_index(&self, name: &str) -> Option<usize> {
        self.object_names.get(name).copied()
    }

    /// Index of the corpse object.
    pub fn corpse(&self) -> usize {
        self.corpse
    }

    /// Index of the statue object.
    pub fn statue(&self) -> usize {
        self.statue
    }

    /// Index of the boulder object.
    pub fn boulder(&self) -> usize {
        self.boulder
    }

    /// Object index of an object, corpse or statue glyph; `NO_GLYPH`
    /// otherwise.
    pub fn glyph_to_obj(&self, glyph: i32) -> i32 {
        let l = &self.layout;
        if l.is_body(glyph) {
            self.corpse as i32
        } else if l.is_statue(glyph) {
            self.statue as i32
        } else if l.is_normal_object(glyph) {
            glyph - l.obj_off
        } else {
            l.no_glyph()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testdata::{rows, tables, COUNTS};
    use super::*;

    #[test]
    fn lookups_are_bounds_checked() {
        let t = tables();
        assert_eq!(t.monster(1).unwrap().name, "newt");
        assert_eq!(
            t.monster(4),
            Err(MetaError::IndexOutOfRange {
                table: "monsters",
                index: 4,
                bound: 4
            })
        );
        assert!(matches!(
            t.object(-1),
            Err(MetaError::IndexOutOfRange { index: -1, .. })
        ));
        assert!(t.symbol(19).is_ok());
        assert!(t.symbol(20).is_err());
        assert_eq!(t.monster_class(2).unwrap().sym, b'f');
        assert!(t.monster_class(3).is_err());
        assert_eq!(t.object_class(i64::from(object_class::FOOD)).unwrap().sym, b'%');
        assert!(t.object_class(object_class::MAXOCLASSES as i64).is_err());
    }

    #[test]
    fn names_and_descriptions() {
        let t = tables();
        assert_eq!(t.object_name(0).unwrap(), Some("dagger"));
        assert_eq!(t.object_description(0).unwrap(), None);
        assert_eq!(t.object_description(4).unwrap(), Some("unlabeled"));
        assert_eq!(t.object_index("boulder"), Some(3));
        assert_eq!(t.monster_index("kitten"), Some(2));
        assert_eq!(t.monster_index("dragon"), None);
        assert_eq!((t.corpse(), t.statue(), t.boulder()), (1, 2, 3));
    }

    #[test]
    fn glyph_to_obj_prefers_body_and_statue() {
        let t = tables();
        let l = *t.layout();
        assert_eq!(t.glyph_to_obj(l.body_off + 3), 1);
        assert_eq!(t.glyph_to_obj(l.statue_off), 2);
        assert_eq!(t.glyph_to_obj(l.obj_off + 4), 4);
        assert_eq!(t.glyph_to_obj(l.mon_off), l.no_glyph());
        assert_eq!(t.glyph_to_obj(l.max_glyph), l.no_glyph());
    }

    #[test]
    fn mismatched_counts_are_rejected() {
        let mut r = rows();
        r.monsters.pop();
        assert!(matches!(
            MetaTables::new(COUNTS, r),
            Err(MetaError::InvalidTables { .. })
        ));
    }

    #[test]
    fn dangling_class_is_rejected() {
        let mut r = rows();
        r.monsters[0].mlet = 9;
        let err = MetaTables::new(COUNTS, r).unwrap_err();
        assert!(err.to_string().contains("jackal"));
    }

    #[test]
    fn missing_corpse_is_rejected() {
        let mut r = rows();
        r.descriptions[1].name = Some("food ration".into());
        let err = MetaTables::new(COUNTS, r).unwrap_err();
        assert_eq!(
            err,
            MetaError::InvalidTables {
                reason: "no object named \"corpse\"".into()
            }
        );
    }

    #[test]
    fn first_duplicate_name_wins() {
        let mut r = rows();
        r.descriptions[4].name = Some("dagger".into());
        let t = MetaTables::new(COUNTS, r).unwrap();
        assert_eq!(t.object_index("dagger"), Some(0));
    }
}
