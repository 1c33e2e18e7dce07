//! Glyph numbering.
//!
//! A glyph is one integer naming what is drawn in a map cell. The integer
//! space is cut into consecutive ranges whose sizes follow from the sizes
//! of the metadata tables:
//!
//! ```text
//! MON  PET  INVIS  DETECT  BODY  RIDDEN  OBJ  CMAP  EXPLODE  ZAP  SWALLOW  WARNING  STATUE | MAX
//! n    n    1      n       n     n       o    p-e   e*x      z*4  n*8      w        n
//! ```
//!
//! `n` monsters, `o` objects, `p` map symbols (the last `e` of which are
//! explosion symbols), `x` explosion types, `z` zap types, `w` warning
//! levels. `NO_GLYPH` equals `MAX_GLYPH`.

/// Table sizes and symbol positions the layout is computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphCounts {
    /// Monster species.
    pub nummons: i32,
    /// Object kinds.
    pub num_objects: i32,
    /// Map symbols, explosion symbols included.
    pub maxpchars: i32,
    /// Symbols per explosion type (the tail of the map-symbol table).
    pub maxexpchars: i32,
    /// Explosion types.
    pub expl_max: i32,
    /// Zap beam types.
    pub num_zap: i32,
    /// Warning levels.
    pub warncount: i32,
    /// Map-symbol index of the first trap.
    pub first_trap: i32,
    /// Trap types, the empty "no trap" type included (`TRAPNUM`). There
    /// are `trapnum - 1` trap symbols, but the trap glyph range spans
    /// `trapnum` map symbols and so takes in the first beam symbol.
    pub trapnum: i32,
}

impl GlyphCounts {
    /// The stock 3.6 tables.
    pub const NETHACK_3_6: GlyphCounts = GlyphCounts {
        nummons: 381,
        num_objects: 453,
        maxpchars: 96,
        maxexpchars: 9,
        expl_max: 7,
        num_zap: 8,
        warncount: 6,
        first_trap: 42,
        trapnum: 24,
    };

    /// Map-symbol index of the first zap beam symbol (right after the traps).
    pub const fn zap_symbol_base(&self) -> i32 {
        self.first_trap + self.trapnum - 1
    }

    /// Map-symbol index of the first swallow border symbol.
    pub const fn swallow_symbol_base(&self) -> i32 {
        self.maxpchars - self.maxexpchars - 8
    }

    /// Map-symbol index of the first explosion symbol.
    pub const fn explode_symbol_base(&self) -> i32 {
        self.maxpchars - self.maxexpchars
    }
}

/// What a glyph depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlyphKind {
    /// A monster, ridden monsters included.
    Monster,
    /// A tame monster.
    Pet,
    /// An unseen monster the player remembers.
    Invisible,
    /// A monster sensed by detection.
    Detected,
    /// An object.
    Object,
    /// A corpse.
    Body,
    /// A statue.
    Statue,
    /// A trap.
    Trap,
    /// Dungeon features, explosions and zap beams.
    TerrainFeature,
    /// The inside of an engulfing monster.
    Swallow,
    /// A warning level.
    Warning,
}

/// Glyph range offsets derived from [`GlyphCounts`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphLayout {
    counts: GlyphCounts,
    /// First monster glyph.
    pub mon_off: i32,
    /// First pet glyph.
    pub pet_off: i32,
    /// The single "remembered, unseen monster" glyph.
    pub invis_off: i32,
    /// First detected-monster glyph.
    pub detect_off: i32,
    /// First corpse glyph.
    pub body_off: i32,
    /// First ridden-monster glyph.
    pub ridden_off: i32,
    /// First object glyph.
    pub obj_off: i32,
    /// First map-symbol glyph.
    pub cmap_off: i32,
    /// First explosion glyph.
    pub explode_off: i32,
    /// First zap-beam glyph.
    pub zap_off: i32,
    /// First swallow glyph.
    pub swallow_off: i32,
    /// First warning glyph.
    pub warning_off: i32,
    /// First statue glyph.
    pub statue_off: i32,
    /// One past the last glyph.
    pub max_glyph: i32,
}

impl GlyphLayout {
    /// The stock 3.6 layout (`MAX_GLYPH == 5976`).
    pub const NETHACK_3_6: GlyphLayout = GlyphLayout::new(GlyphCounts::NETHACK_3_6);

    /// Compute offsets from `counts`.
    pub const fn new(counts: GlyphCounts) -> Self {
        let n = counts.nummons;
        let mon_off = 0;
        let pet_off = mon_off + n;
        let invis_off = pet_off + n;
        let detect_off = invis_off + 1;
        let body_off = detect_off + n;
        let ridden_off = body_off + n;
        let obj_off = ridden_off + n;
        let cmap_off = obj_off + counts.num_objects;
        let explode_off = cmap_off + (counts.maxpchars - counts.maxexpchars);
        let zap_off = explode_off + counts.maxexpchars * counts.expl_max;
        let swallow_off = zap_off + (counts.num_zap << 2);
        let warning_off = swallow_off + (n << 3);
        let statue_off = warning_off + counts.warncount;
        let max_glyph = statue_off + n;
        Self {
            counts,
            mon_off,
            pet_off,
            invis_off,
            detect_off,
            body_off,
            ridden_off,
            obj_off,
            cmap_off,
            explode_off,
            zap_off,
            swallow_off,
            warning_off,
            statue_off,
            max_glyph,
        }
    }

    /// The counts this layout was computed from.
    pub fn counts(&self) -> &GlyphCounts {
        &self.counts
    }

    /// Sentinel for "no glyph"; equal to `max_glyph`.
    pub fn no_glyph(&self) -> i32 {
        self.max_glyph
    }

    fn in_range(glyph: i32, start: i32, len: i32) -> bool {
        glyph >= start && glyph < start + len
    }

    // ── Predicates ─────────────────────────────────────────────────

    /// An ordinary visible monster.
    pub fn is_normal_monster(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.mon_off, self.counts.nummons)
    }

    /// A tame monster.
    pub fn is_pet(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.pet_off, self.counts.nummons)
    }

    /// A corpse.
    pub fn is_body(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.body_off, self.counts.nummons)
    }

    /// A statue.
    pub fn is_statue(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.statue_off, self.counts.nummons)
    }

    /// A monster the player is riding.
    pub fn is_ridden_monster(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.ridden_off, self.counts.nummons)
    }

    /// A monster sensed by detection.
    pub fn is_detected_monster(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.detect_off, self.counts.nummons)
    }

    /// The remembered-unseen-monster marker.
    pub fn is_invisible(&self, glyph: i32) -> bool {
        glyph == self.invis_off
    }

    /// Any monster glyph: normal, pet, ridden, or detected.
    pub fn is_monster(&self, glyph: i32) -> bool {
        self.is_normal_monster(glyph)
            || self.is_pet(glyph)
            || self.is_ridden_monster(glyph)
            || self.is_detected_monster(glyph)
    }

    /// An object that is not a corpse or statue.
    pub fn is_normal_object(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.obj_off, self.counts.num_objects)
    }

    /// Any object glyph, corpses and statues included.
    pub fn is_object(&self, glyph: i32) -> bool {
        self.is_normal_object(glyph) || self.is_statue(glyph) || self.is_body(glyph)
    }

    /// A trap. Covers `trapnum` map symbols from the first trap, the
    /// vertical beam symbol included.
    pub fn is_trap(&self, glyph: i32) -> bool {
        Self::in_range(
            glyph,
            self.cmap_off + self.counts.first_trap,
            self.counts.trapnum,
        )
    }

    /// A map symbol. The range spans the whole symbol table, so it also
    /// covers the first explosion glyphs.
    pub fn is_cmap(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.cmap_off, self.counts.maxpchars)
    }

    /// An explosion.
    pub fn is_explode(&self, glyph: i32) -> bool {
        Self::in_range(
            glyph,
            self.explode_off,
            self.counts.maxexpchars * self.counts.expl_max,
        )
    }

    /// A zap beam.
    pub fn is_zap(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.zap_off, self.counts.num_zap << 2)
    }

    /// The inside of an engulfing monster.
    pub fn is_swallow(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.swallow_off, self.counts.nummons << 3)
    }

    /// A warning level.
    pub fn is_warning(&self, glyph: i32) -> bool {
        Self::in_range(glyph, self.warning_off, self.counts.warncount)
    }

    /// Sort `glyph` into exactly one [`GlyphKind`]; `None` outside
    /// `0..max_glyph`.
    pub fn classify(&self, glyph: i32) -> Option<GlyphKind> {
        if !(0..self.max_glyph).contains(&glyph) {
            return None;
        }
        let kind = if self.is_normal_monster(glyph) || self.is_ridden_monster(glyph) {
            GlyphKind::Monster
        } else if self.is_pet(glyph) {
            GlyphKind::Pet
        } else if self.is_invisible(glyph) {
            GlyphKind::Invisible
        } else if self.is_detected_monster(glyph) {
            GlyphKind::Detected
        } else if self.is_body(glyph) {
            GlyphKind::Body
        } else if self.is_normal_object(glyph) {
            GlyphKind::Object
        } else if self.is_trap(glyph) {
            GlyphKind::Trap
        } else if self.is_cmap(glyph) || self.is_explode(glyph) || self.is_zap(glyph) {
            GlyphKind::TerrainFeature
        } else if self.is_swallow(glyph) {
            GlyphKind::Swallow
        } else if self.is_warning(glyph) {
            GlyphKind::Warning
        } else {
            GlyphKind::Statue
        };
        Some(kind)
    }

    // ── Inverses ───────────────────────────────────────────────────

    /// Monster index of a monster, pet, detected, ridden or statue glyph;
    /// `no_glyph()` otherwise.
    pub fn glyph_to_mon(&self, glyph: i32) -> i32 {
        if self.is_normal_monster(glyph) {
            glyph - self.mon_off
        } else if self.is_pet(glyph) {
            glyph - self.pet_off
        } else if self.is_detected_monster(glyph) {
            glyph - self.detect_off
        } else if self.is_ridden_monster(glyph) {
            glyph - self.ridden_off
        } else if self.is_statue(glyph) {
            glyph - self.statue_off
        } else {
            self.no_glyph()
        }
    }

    /// Trap number (1-based) of a trap glyph; `no_glyph()` otherwise.
    pub fn glyph_to_trap(&self, glyph: i32) -> i32 {
        if self.is_trap(glyph) {
            glyph - self.cmap_off - self.counts.first_trap + 1
        } else {
            self.no_glyph()
        }
    }

    /// Map-symbol index of a map-symbol glyph; `no_glyph()` otherwise.
    pub fn glyph_to_cmap(&self, glyph: i32) -> i32 {
        if self.is_cmap(glyph) {
            glyph - self.cmap_off
        } else {
            self.no_glyph()
        }
    }

    /// Border position (0..8) of a swallow glyph; 0 otherwise.
    pub fn glyph_to_swallow(&self, glyph: i32) -> i32 {
        if self.is_swallow(glyph) {
            (glyph - self.swallow_off) & 7
        } else {
            0
        }
    }

    /// Warning level of a warning glyph; `no_glyph()` otherwise.
    pub fn glyph_to_warning(&self, glyph: i32) -> i32 {
        if self.is_warning(glyph) {
            glyph - self.warning_off
        } else {
            self.no_glyph()
        }
    }
}

impl Default for GlyphLayout {
    fn default() -> Self {
        Self::NETHACK_3_6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const L: GlyphLayout = GlyphLayout::NETHACK_3_6;

    #[test]
    fn stock_offsets() {
        assert_eq!(L.pet_off, 381);
        assert_eq!(L.invis_off, 762);
        assert_eq!(L.detect_off, 763);
        assert_eq!(L.body_off, 1144);
        assert_eq!(L.ridden_off, 1525);
        assert_eq!(L.obj_off, 1906);
        assert_eq!(L.cmap_off, 2359);
        assert_eq!(L.explode_off, 2446);
        assert_eq!(L.zap_off, 2509);
        assert_eq!(L.swallow_off, 2541);
        assert_eq!(L.warning_off, 5589);
        assert_eq!(L.statue_off, 5595);
        assert_eq!(L.max_glyph, 5976);
        assert_eq!(L.no_glyph(), 5976);
    }

    #[test]
    fn ridden_classifies_as_monster() {
        assert_eq!(L.classify(L.ridden_off + 5), Some(GlyphKind::Monster));
        assert_eq!(L.glyph_to_mon(L.ridden_off + 5), 5);
    }

    #[test]
    fn explosion_and_zap_are_terrain() {
        assert_eq!(L.classify(L.explode_off), Some(GlyphKind::TerrainFeature));
        assert_eq!(L.classify(L.explode_off + 62), Some(GlyphKind::TerrainFeature));
        assert_eq!(L.classify(L.zap_off + 31), Some(GlyphKind::TerrainFeature));
        assert!(!L.is_cmap(L.zap_off));
    }

    #[test]
    fn traps_are_a_subset_of_cmap() {
        let first = L.cmap_off + 42;
        assert!(L.is_trap(first) && L.is_cmap(first));
        assert_eq!(L.glyph_to_trap(first), 1);
        assert_eq!(L.glyph_to_trap(first + 22), 23);
        assert!(!L.is_trap(first + 24));
        assert_eq!(L.classify(first), Some(GlyphKind::Trap));
        assert_eq!(L.glyph_to_trap(L.cmap_off), L.no_glyph());
    }

    #[test]
    fn vertical_beam_symbol_counts_as_a_trap() {
        let vbeam = L.cmap_off + GlyphCounts::NETHACK_3_6.zap_symbol_base();
        assert_eq!(vbeam, 2424);
        assert!(L.is_trap(vbeam));
        assert_eq!(L.glyph_to_trap(vbeam), 24);
        assert_eq!(L.classify(vbeam), Some(GlyphKind::Trap));
        assert_eq!(L.classify(vbeam + 1), Some(GlyphKind::TerrainFeature));
    }

    #[test]
    fn swallow_inverse_wraps_every_eight() {
        assert_eq!(L.glyph_to_swallow(L.swallow_off), 0);
        assert_eq!(L.glyph_to_swallow(L.swallow_off + 8 * 10 + 3), 3);
        assert_eq!(L.glyph_to_swallow(L.cmap_off), 0);
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(L.classify(-1), None);
        assert_eq!(L.classify(L.max_glyph), None);
        assert_eq!(L.glyph_to_mon(-1), L.no_glyph());
        assert_eq!(L.glyph_to_cmap(L.max_glyph), L.no_glyph());
        assert_eq!(L.glyph_to_warning(L.warning_off + 6), L.no_glyph());
    }

    #[test]
    fn statue_maps_back_to_monster() {
        assert_eq!(L.classify(L.statue_off + 7), Some(GlyphKind::Statue));
        assert_eq!(L.glyph_to_mon(L.statue_off + 7), 7);
        assert!(L.is_object(L.statue_off + 7));
    }

    fn family_count(l: &GlyphLayout, g: i32) -> usize {
        [
            l.is_normal_monster(g),
            l.is_pet(g),
            l.is_invisible(g),
            l.is_detected_monster(g),
            l.is_body(g),
            l.is_ridden_monster(g),
            l.is_normal_object(g),
            l.is_cmap(g) || l.is_explode(g) || l.is_zap(g),
            l.is_swallow(g),
            l.is_warning(g),
            l.is_statue(g),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    #[test]
    fn ranges_tile_the_glyph_space() {
        for g in 0..L.max_glyph {
            assert_eq!(family_count(&L, g), 1, "glyph {g}");
        }
    }

    proptest! {
        #[test]
        fn any_layout_is_tiled(
            nummons in 1i32..50,
            num_objects in 1i32..50,
            maxexpchars in 1i32..10,
            extra in 9i32..40,
            expl_max in 1i32..8,
            num_zap in 1i32..9,
            warncount in 1i32..7,
        ) {
            let counts = GlyphCounts {
                nummons,
                num_objects,
                maxpchars: maxexpchars + extra,
                maxexpchars,
                expl_max,
                num_zap,
                warncount,
                first_trap: 0,
                trapnum: 2,
            };
            let l = GlyphLayout::new(counts);
            for g in 0..l.max_glyph {
                prop_assert_eq!(family_count(&l, g), 1);
                prop_assert!(l.classify(g).is_some());
            }
            prop_assert_eq!(l.classify(l.max_glyph), None);
        }

        #[test]
        fn monster_inverse_is_in_range(g in 0i32..5976) {
            let m = L.glyph_to_mon(g);
            if L.is_monster(g) || L.is_statue(g) {
                prop_assert!((0..381).contains(&m));
            } else {
                prop_assert_eq!(m, L.no_glyph());
            }
        }
    }
}
