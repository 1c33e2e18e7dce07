//! Glyph to character/color rendering from the tables alone.
//!
//! This is a parallel rendering of the engine's own lookup, without any
//! game state: explosion and zap colors come from the map-symbol rows rather
//! than from the explosion or beam type, and user symbol sets are ignored.
//! Outputs have not been checked cell by cell against a live engine.

use crate::tables::MetaTables;

/// Terminal color numbers.
pub mod color {
    #![allow(missing_docs)]
    pub const CLR_BLACK: u8 = 0;
    pub const CLR_RED: u8 = 1;
    pub const CLR_GREEN: u8 = 2;
    pub const CLR_BROWN: u8 = 3;
    pub const CLR_BLUE: u8 = 4;
    pub const CLR_MAGENTA: u8 = 5;
    pub const CLR_CYAN: u8 = 6;
    pub const CLR_GRAY: u8 = 7;
    pub const NO_COLOR: u8 = 8;
    pub const CLR_ORANGE: u8 = 9;
    pub const CLR_BRIGHT_GREEN: u8 = 10;
    pub const CLR_YELLOW: u8 = 11;
    pub const CLR_BRIGHT_BLUE: u8 = 12;
    pub const CLR_BRIGHT_MAGENTA: u8 = 13;
    pub const CLR_BRIGHT_CYAN: u8 = 14;
    pub const CLR_WHITE: u8 = 15;
}

use color::*;

const WARNING_COLORS: [u8; 6] = [
    CLR_WHITE,
    CLR_RED,
    CLR_RED,
    CLR_RED,
    CLR_MAGENTA,
    CLR_BRIGHT_MAGENTA,
];

/// Character used for glyphs outside every range.
pub const DEFAULT_CHAR: u8 = b' ';

impl MetaTables {
    /// Map-symbol row drawn for a cmap, explosion, zap or swallow glyph.
    fn symbol_row(&self, glyph: i32) -> Option<i64> {
        let l = self.layout();
        let c = self.counts();
        let index = if l.is_cmap(glyph) && !l.is_explode(glyph) {
            l.glyph_to_cmap(glyph)
        } else if l.is_explode(glyph) {
            c.explode_symbol_base() + (glyph - l.explode_off) % c.maxexpchars
        } else if l.is_zap(glyph) {
            c.zap_symbol_base() + ((glyph - l.zap_off) & 3)
        } else if l.is_swallow(glyph) {
            c.swallow_symbol_base() + l.glyph_to_swallow(glyph)
        } else {
            return None;
        };
        Some(i64::from(index))
    }

    fn monster_sym(&self, mon: i32) -> Option<u8> {
        let m = self.monster(i64::from(mon)).ok()?;
        self.monster_class(i64::from(m.mlet)).ok().map(|c| c.sym)
    }

    fn object_sym(&self, obj: i32) -> Option<u8> {
        if obj as usize == self.boulder() {
            return Some(self.misc().boulder);
        }
        let o = self.object(i64::from(obj)).ok()?;
        self.object_class(i64::from(o.class)).ok().map(|c| c.sym)
    }

    /// Display character for `glyph`.
    ///
    /// Monster-like glyphs (including statues) draw their monster class
    /// symbol, corpses and objects their object class symbol, and map
    /// glyphs their map-symbol row. Anything else draws [`DEFAULT_CHAR`].
    pub fn glyph_to_char(&self, glyph: i32) -> u8 {
        let l = self.layout();
        let sym = if l.is_invisible(glyph) {
            Some(self.misc().invisible)
        } else if l.is_monster(glyph) || l.is_statue(glyph) {
            self.monster_sym(l.glyph_to_mon(glyph))
        } else if l.is_body(glyph) || l.is_normal_object(glyph) {
            self.object_sym(self.glyph_to_obj(glyph))
        } else if l.is_warning(glyph) {
            u8::try_from(l.glyph_to_warning(glyph))
                .ok()
                .and_then(|level| b'0'.checked_add(level))
        } else {
            self.symbol_row(glyph)
                .and_then(|i| self.symbol(i).ok())
                .map(|s| s.sym)
        };
        sym.unwrap_or(DEFAULT_CHAR)
    }

    /// Display color for `glyph`.
    ///
    /// Monsters and corpses use the monster's color, statues and objects the
    /// object's, map glyphs the map-symbol row's. The invisible marker has
    /// [`NO_COLOR`](color::NO_COLOR); anything else is
    /// [`CLR_WHITE`](color::CLR_WHITE).
    pub fn glyph_to_color(&self, glyph: i32) -> u8 {
        let l = self.layout();
        let color = if l.is_invisible(glyph) {
            Some(NO_COLOR)
        } else if l.is_monster(glyph) {
            self.monster(i64::from(l.glyph_to_mon(glyph))).ok().map(|m| m.color)
        } else if l.is_body(glyph) {
            self.monster(i64::from(glyph - l.body_off)).ok().map(|m| m.color)
        } else if l.is_statue(glyph) || l.is_normal_object(glyph) {
            self.object(i64::from(self.glyph_to_obj(glyph))).ok().map(|o| o.color)
        } else if l.is_warning(glyph) {
            WARNING_COLORS.get(l.glyph_to_warning(glyph) as usize).copied()
        } else {
            self.symbol_row(glyph)
                .and_then(|i| self.symbol(i).ok())
                .map(|s| s.color)
        };
        color.unwrap_or(CLR_WHITE)
    }
}
