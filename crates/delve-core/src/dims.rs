//! Fixed observation dimensions.
//!
//! These match the layout the engine writes into. Every bound buffer must
//! have exactly these extents.

/// Map rows.
pub const ROWNO: usize = 21;
/// Map columns as defined by the engine. Column 0 is never displayed, so
/// map-shaped channels are `COLNO - 1` wide.
pub const COLNO: usize = 80;
/// Width of every map-shaped channel.
pub const MAP_COLS: usize = COLNO - 1;

/// Length of the bottom-line status vector.
pub const BLSTATS_SIZE: usize = 27;
/// Length of the message buffer in bytes.
pub const MESSAGE_SIZE: usize = 256;
/// Length of the program-state vector.
pub const PROGRAM_STATE_SIZE: usize = 6;
/// Length of the internal-state vector.
pub const INTERNAL_SIZE: usize = 9;
/// Length of the miscellaneous-flags vector.
pub const MISC_SIZE: usize = 3;
/// Number of inventory slots.
pub const INVENTORY_SIZE: usize = 55;
/// Bytes per inventory description string.
pub const INVENTORY_STR_LENGTH: usize = 80;
/// Bytes per screen-description string.
pub const SCREEN_DESCRIPTION_LENGTH: usize = 80;
/// Terminal rows.
pub const TERM_LI: usize = 24;
/// Terminal columns.
pub const TERM_CO: usize = 80;

/// Indices into the `blstats` vector.
pub mod blstats {
    /// Hero column.
    pub const X: usize = 0;
    /// Hero row.
    pub const Y: usize = 1;
    /// Strength as 3..25.
    pub const STR25: usize = 2;
    /// Strength as 3..125.
    pub const STR125: usize = 3;
    /// Dexterity.
    pub const DEX: usize = 4;
    /// Constitution.
    pub const CON: usize = 5;
    /// Intelligence.
    pub const INT: usize = 6;
    /// Wisdom.
    pub const WIS: usize = 7;
    /// Charisma.
    pub const CHA: usize = 8;
    /// Score.
    pub const SCORE: usize = 9;
    /// Hit points.
    pub const HP: usize = 10;
    /// Maximum hit points.
    pub const HPMAX: usize = 11;
    /// Dungeon depth.
    pub const DEPTH: usize = 12;
    /// Gold carried.
    pub const GOLD: usize = 13;
    /// Energy.
    pub const ENE: usize = 14;
    /// Maximum energy.
    pub const ENEMAX: usize = 15;
    /// Armor class.
    pub const AC: usize = 16;
    /// Hit dice when polymorphed.
    pub const HD: usize = 17;
    /// Experience level.
    pub const XP: usize = 18;
    /// Experience points.
    pub const EXP: usize = 19;
    /// Turn counter.
    pub const TIME: usize = 20;
    /// Hunger state.
    pub const HUNGER: usize = 21;
    /// Carrying capacity.
    pub const CAP: usize = 22;
    /// Dungeon number.
    pub const DNUM: usize = 23;
    /// Level within the dungeon.
    pub const DLEVEL: usize = 24;
    /// Condition bitmask.
    pub const CONDITION: usize = 25;
    /// Alignment.
    pub const ALIGN: usize = 26;
}
