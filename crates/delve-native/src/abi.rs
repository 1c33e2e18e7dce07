//! C layouts and entry-point signatures of the engine library.

use std::ffi::c_void;
use std::os::raw::{c_char, c_int, c_uchar, c_uint};
use std::ptr;

use delve_core::settings::{OPTIONS_FIELD_LEN, PATH_FIELD_LEN};
use delve_core::{Seeds, Settings};
use delve_obs::RawObservation;

/// Descriptor passed when there is no recording to hand over.
pub const NO_FD: c_int = -1;

/// `delve_settings`: every string NUL-terminated in a fixed array.
#[repr(C)]
pub struct RawSettings {
    /// Working directory.
    pub work_dir: [u8; PATH_FIELD_LEN],
    /// Options string.
    pub options: [u8; OPTIONS_FIELD_LEN],
    /// Score-file prefix.
    pub score_prefix: [u8; PATH_FIELD_LEN],
    /// Transcript file name, empty when none is named.
    pub transcript_name: [u8; PATH_FIELD_LEN],
    /// Starting-kit specification.
    pub wizkit: [u8; PATH_FIELD_LEN],
    /// Non-zero when random monsters spawn.
    pub spawn_monsters: c_int,
}

impl RawSettings {
    /// Lay `settings` out for the engine.
    pub fn from_settings(settings: &Settings) -> Box<Self> {
        let mut raw = Box::new(Self {
            work_dir: [0; PATH_FIELD_LEN],
            options: [0; OPTIONS_FIELD_LEN],
            score_prefix: [0; PATH_FIELD_LEN],
            transcript_name: [0; PATH_FIELD_LEN],
            wizkit: [0; PATH_FIELD_LEN],
            spawn_monsters: c_int::from(settings.spawn_monsters),
        });
        settings.work_dir.write_c(&mut raw.work_dir);
        settings.options.write_c(&mut raw.options);
        settings.score_prefix.write_c(&mut raw.score_prefix);
        settings.transcript_name.write_c(&mut raw.transcript_name);
        settings.wizkit.write_c(&mut raw.wizkit);
        raw
    }
}

/// `delve_seeds`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSeeds {
    /// Core gameplay seed.
    pub core: u64,
    /// Display seed.
    pub display: u64,
    /// Non-zero when the engine may reseed.
    pub reseed: c_int,
    /// Non-zero when `lgen` is set.
    pub use_lgen: c_int,
    /// Level-generation seed, meaningful only with `use_lgen`.
    pub lgen: u64,
}

impl From<Seeds> for RawSeeds {
    fn from(s: Seeds) -> Self {
        Self {
            core: s.core,
            display: s.display,
            reseed: c_int::from(s.reseed),
            use_lgen: c_int::from(s.lgen.is_some()),
            lgen: s.lgen.unwrap_or(0),
        }
    }
}

impl From<RawSeeds> for Seeds {
    fn from(r: RawSeeds) -> Self {
        Self {
            core: r.core,
            display: r.display,
            reseed: r.reseed != 0,
            lgen: (r.use_lgen != 0).then_some(r.lgen),
        }
    }
}

/// `delve_start`: returns the new context, or null on failure.
pub type StartFn = unsafe extern "C" fn(
    obs: *mut RawObservation,
    transcript_fd: c_int,
    settings: *const RawSettings,
    seeds: *const RawSeeds,
) -> *mut c_void;

/// `delve_reset`.
pub type ResetFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    obs: *mut RawObservation,
    transcript_fd: c_int,
    settings: *const RawSettings,
    seeds: *const RawSeeds,
) -> c_int;

/// `delve_step`.
pub type StepFn = unsafe extern "C" fn(ctx: *mut c_void, obs: *mut RawObservation) -> c_int;

/// `delve_end`.
pub type EndFn = unsafe extern "C" fn(ctx: *mut c_void);

/// `delve_set_seed`.
pub type SetSeedFn = unsafe extern "C" fn(ctx: *mut c_void, seeds: *const RawSeeds) -> c_int;

/// `delve_get_seed`.
pub type GetSeedFn = unsafe extern "C" fn(ctx: *mut c_void, seeds: *mut RawSeeds) -> c_int;

// ── Metadata tables ────────────────────────────────────────────────
//
// Optional entry points. An engine built without them still runs
// sessions; only table loading fails. Strings are NUL-terminated and
// live as long as the library stays loaded.

/// `delve_meta_counts`: table sizes and the symbols no table row carries.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawMetaCounts {
    /// Monster species (`NUMMONS`).
    pub nummons: c_int,
    /// Object kinds (`NUM_OBJECTS`).
    pub num_objects: c_int,
    /// Name/description rows.
    pub num_descriptions: c_int,
    /// Monster class rows (`MAXMCLASSES`).
    pub monster_classes: c_int,
    /// Object class rows (`MAXOCLASSES`).
    pub object_classes: c_int,
    /// Map symbols (`MAXPCHARS`).
    pub maxpchars: c_int,
    /// Explosion symbols per explosion type.
    pub maxexpchars: c_int,
    /// Explosion types.
    pub expl_max: c_int,
    /// Zap beam types.
    pub num_zap: c_int,
    /// Warning levels.
    pub warncount: c_int,
    /// Map-symbol index of the first trap symbol.
    pub first_trap: c_int,
    /// Trap types, the empty one included (`TRAPNUM`).
    pub trapnum: c_int,
    /// Boulder symbol.
    pub boulder_sym: c_uchar,
    /// Remembered-unseen-monster symbol.
    pub invisible_sym: c_uchar,
}

/// `delve_meta_monster`: one monster species.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RawMonster {
    /// Species name.
    pub name: *const c_char,
    /// Monster class.
    pub mlet: c_int,
    /// Base level.
    pub mlevel: c_int,
    /// Movement speed.
    pub mmove: c_int,
    /// Armor class.
    pub ac: c_int,
    /// Magic resistance.
    pub mr: c_int,
    /// Generation flags.
    pub geno: c_uint,
    /// Corpse weight.
    pub cwt: c_uint,
    /// Corpse nutrition.
    pub cnutrit: c_uint,
    /// Sound type.
    pub msound: c_uint,
    /// Size category.
    pub msize: c_uint,
    /// Resistances.
    pub mresists: c_uint,
    /// Resistances conveyed by eating.
    pub mconveys: c_uint,
    /// First flag word.
    pub mflags1: c_uint,
    /// Second flag word.
    pub mflags2: c_uint,
    /// Third flag word.
    pub mflags3: c_uint,
    /// Difficulty rating.
    pub difficulty: c_uint,
    /// Display color.
    pub color: c_uint,
}

/// `delve_meta_object`: one object kind.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawObject {
    /// Description row holding the actual name.
    pub name_idx: c_int,
    /// Description row holding the unidentified description.
    pub descr_idx: c_int,
    /// Property conveyed when worn or wielded.
    pub oprop: c_uint,
    /// Object class.
    pub oc_class: c_int,
    /// Delay when used.
    pub delay: c_int,
    /// Display color.
    pub color: c_uint,
    /// Generation probability.
    pub prob: c_int,
    /// Weight.
    pub weight: c_uint,
    /// Base cost.
    pub cost: c_int,
}

/// `delve_meta_objdescr`: one name/description pair. Either may be null.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RawObjDescr {
    /// Actual name.
    pub name: *const c_char,
    /// Unidentified description.
    pub descr: *const c_char,
}

/// `delve_meta_monster_class` and `delve_meta_object_class`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RawClassSym {
    /// Display character.
    pub sym: c_uchar,
    /// Class name.
    pub name: *const c_char,
    /// Text shown when the class symbol is looked at.
    pub explain: *const c_char,
}

/// `delve_meta_symbol`: one map symbol.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RawSymDef {
    /// Display character.
    pub sym: c_uchar,
    /// Text shown when the symbol is looked at.
    pub explanation: *const c_char,
    /// Display color.
    pub color: c_uint,
}

impl Default for RawMonster {
    fn default() -> Self {
        Self {
            name: ptr::null(),
            mlet: 0,
            mlevel: 0,
            mmove: 0,
            ac: 0,
            mr: 0,
            geno: 0,
            cwt: 0,
            cnutrit: 0,
            msound: 0,
            msize: 0,
            mresists: 0,
            mconveys: 0,
            mflags1: 0,
            mflags2: 0,
            mflags3: 0,
            difficulty: 0,
            color: 0,
        }
    }
}

impl Default for RawObjDescr {
    fn default() -> Self {
        Self {
            name: ptr::null(),
            descr: ptr::null(),
        }
    }
}

impl Default for RawClassSym {
    fn default() -> Self {
        Self {
            sym: 0,
            name: ptr::null(),
            explain: ptr::null(),
        }
    }
}

impl Default for RawSymDef {
    fn default() -> Self {
        Self {
            sym: 0,
            explanation: ptr::null(),
            color: 0,
        }
    }
}

/// `delve_meta_counts`.
pub type MetaCountsFn = unsafe extern "C" fn(counts: *mut RawMetaCounts) -> c_int;

/// `delve_meta_monster`.
pub type MonsterFn = unsafe extern "C" fn(index: c_int, row: *mut RawMonster) -> c_int;

/// `delve_meta_object`.
pub type ObjectFn = unsafe extern "C" fn(index: c_int, row: *mut RawObject) -> c_int;

/// `delve_meta_objdescr`.
pub type ObjDescrFn = unsafe extern "C" fn(index: c_int, row: *mut RawObjDescr) -> c_int;

/// `delve_meta_monster_class` and `delve_meta_object_class`.
pub type ClassSymFn = unsafe extern "C" fn(index: c_int, row: *mut RawClassSym) -> c_int;

/// `delve_meta_symbol`.
pub type SymDefFn = unsafe extern "C" fn(index: c_int, row: *mut RawSymDef) -> c_int;

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::SessionConfig;

    fn c_str(bytes: &[u8]) -> &str {
        let end = bytes.iter().position(|&b| b == 0).unwrap();
        std::str::from_utf8(&bytes[..end]).unwrap()
    }

    #[test]
    fn settings_block_carries_every_field() {
        let settings = SessionConfig::new("libdelve.so")
            .work_dir("/var/delve")
            .options("autopickup,pickup_types:$")
            .score_prefix("agent")
            .wizkit("wand of wishing")
            .spawn_monsters(false)
            .transcript("/tmp/runs/ep1.ttyrec")
            .validate()
            .unwrap();
        let raw = RawSettings::from_settings(&settings);
        assert_eq!(c_str(&raw.work_dir), "/var/delve");
        assert_eq!(c_str(&raw.options), "autopickup,pickup_types:$");
        assert_eq!(c_str(&raw.score_prefix), "agent");
        assert_eq!(c_str(&raw.transcript_name), "ep1.ttyrec");
        assert_eq!(c_str(&raw.wizkit), "wand of wishing");
        assert_eq!(raw.spawn_monsters, 0);
    }

    #[test]
    fn unset_lgen_stays_distinct_from_zero() {
        let none: RawSeeds = Seeds::new(1, 2, true).into();
        let zero: RawSeeds = Seeds::new(1, 2, true).with_lgen(0).into();
        assert_ne!(none, zero);
        assert_eq!(Seeds::from(none).lgen, None);
        assert_eq!(Seeds::from(zero).lgen, Some(0));
        assert!(Seeds::from(zero).reseed);
    }
}
