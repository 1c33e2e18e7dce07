//! Observation channels, element types, and expected shapes.
//!
//! Every buffer the engine writes into is one [`Channel`]. The channel
//! table fixes the element type and the row-major shape each bound buffer
//! must have; the buffer registry checks regions against it exactly.

use std::fmt;

use smallvec::SmallVec;

use crate::dims::*;

/// A buffer shape. Observation channels have at most three dimensions.
pub type Shape = SmallVec<[usize; 4]>;

/// Element type of an observation buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 => 2,
            Self::I32 => 4,
            Self::I64 => 8,
        }
    }

    /// Required alignment of one element in bytes.
    pub fn align(self) -> usize {
        match self {
            Self::I8 => std::mem::align_of::<i8>(),
            Self::U8 => std::mem::align_of::<u8>(),
            Self::I16 => std::mem::align_of::<i16>(),
            Self::I32 => std::mem::align_of::<i32>(),
            Self::I64 => std::mem::align_of::<i64>(),
        }
    }

    /// NumPy-style type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::I8 => "int8",
            Self::U8 => "uint8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Rust scalar type that can back an observation buffer.
pub trait Element: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The matching [`DType`].
    const DTYPE: DType;
}

impl Element for i8 {
    const DTYPE: DType = DType::I8;
}
impl Element for u8 {
    const DTYPE: DType = DType::U8;
}
impl Element for i16 {
    const DTYPE: DType = DType::I16;
}
impl Element for i32 {
    const DTYPE: DType = DType::I32;
}
impl Element for i64 {
    const DTYPE: DType = DType::I64;
}

/// One observation channel the engine can write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// Glyph code per map cell.
    Glyphs,
    /// Display character per map cell.
    Chars,
    /// Display color per map cell.
    Colors,
    /// Special rendering flags per map cell.
    Specials,
    /// Bottom-line status vector.
    Blstats,
    /// Current top-line message bytes.
    Message,
    /// Engine program-state vector.
    ProgramState,
    /// Engine internal-state vector.
    Internal,
    /// Glyph per inventory slot.
    InvGlyphs,
    /// Letter per inventory slot.
    InvLetters,
    /// Object class per inventory slot.
    InvOclasses,
    /// Description string per inventory slot.
    InvStrs,
    /// Description string per map cell.
    ScreenDescriptions,
    /// Terminal characters.
    TtyChars,
    /// Terminal colors.
    TtyColors,
    /// Terminal cursor `(row, col)`.
    TtyCursor,
    /// Miscellaneous input-state flags.
    Misc,
}

impl Channel {
    /// Number of channels.
    pub const COUNT: usize = 17;

    /// All channels in binding order.
    pub const ALL: [Channel; Self::COUNT] = [
        Self::Glyphs,
        Self::Chars,
        Self::Colors,
        Self::Specials,
        Self::Blstats,
        Self::Message,
        Self::ProgramState,
        Self::Internal,
        Self::InvGlyphs,
        Self::InvLetters,
        Self::InvOclasses,
        Self::InvStrs,
        Self::ScreenDescriptions,
        Self::TtyChars,
        Self::TtyColors,
        Self::TtyCursor,
        Self::Misc,
    ];

    /// Position of this channel in [`Channel::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The keyword name hosts use for this channel.
    pub fn name(self) -> &'static str {
        match self {
            Self::Glyphs => "glyphs",
            Self::Chars => "chars",
            Self::Colors => "colors",
            Self::Specials => "specials",
            Self::Blstats => "blstats",
            Self::Message => "message",
            Self::ProgramState => "program_state",
            Self::Internal => "internal",
            Self::InvGlyphs => "inv_glyphs",
            Self::InvLetters => "inv_letters",
            Self::InvOclasses => "inv_oclasses",
            Self::InvStrs => "inv_strs",
            Self::ScreenDescriptions => "screen_descriptions",
            Self::TtyChars => "tty_chars",
            Self::TtyColors => "tty_colors",
            Self::TtyCursor => "tty_cursor",
            Self::Misc => "misc",
        }
    }

    /// Look a channel up by its keyword name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Element type the engine writes for this channel.
    pub fn dtype(self) -> DType {
        match self {
            Self::Glyphs | Self::InvGlyphs => DType::I16,
            Self::Blstats => DType::I64,
            Self::ProgramState | Self::Internal | Self::Misc => DType::I32,
            Self::TtyColors => DType::I8,
            Self::Chars
            | Self::Colors
            | Self::Specials
            | Self::Message
            | Self::InvLetters
            | Self::InvOclasses
            | Self::InvStrs
            | Self::ScreenDescriptions
            | Self::TtyChars
            | Self::TtyCursor => DType::U8,
        }
    }

    /// Exact row-major shape a bound buffer must have.
    pub fn shape(self) -> &'static [usize] {
        match self {
            Self::Glyphs | Self::Chars | Self::Colors | Self::Specials => &[ROWNO, MAP_COLS],
            Self::Blstats => &[BLSTATS_SIZE],
            Self::Message => &[MESSAGE_SIZE],
            Self::ProgramState => &[PROGRAM_STATE_SIZE],
            Self::Internal => &[INTERNAL_SIZE],
            Self::InvGlyphs | Self::InvLetters | Self::InvOclasses => &[INVENTORY_SIZE],
            Self::InvStrs => &[INVENTORY_SIZE, INVENTORY_STR_LENGTH],
            Self::ScreenDescriptions => &[ROWNO, MAP_COLS, SCREEN_DESCRIPTION_LENGTH],
            Self::TtyChars | Self::TtyColors => &[TERM_LI, TERM_CO],
            Self::TtyCursor => &[2],
            Self::Misc => &[MISC_SIZE],
        }
    }

    /// Total number of elements in a buffer of this channel's shape.
    pub fn element_count(self) -> usize {
        self.shape().iter().product()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, c) in Channel::ALL.iter().enumerate() {
            assert_eq!(c.index(), i, "{c} out of order");
        }
    }

    #[test]
    fn names_round_trip() {
        for c in Channel::ALL {
            assert_eq!(Channel::from_name(c.name()), Some(c));
        }
        assert_eq!(Channel::from_name("glyph"), None);
    }

    #[test]
    fn map_channels_are_21_by_79() {
        assert_eq!(Channel::Glyphs.shape(), &[21, 79]);
        assert_eq!(Channel::Glyphs.element_count(), 21 * 79);
        assert_eq!(Channel::ScreenDescriptions.shape(), &[21, 79, 80]);
    }

    #[test]
    fn element_dtypes_match_channel_table() {
        assert_eq!(<i16 as Element>::DTYPE, Channel::Glyphs.dtype());
        assert_eq!(<i64 as Element>::DTYPE, Channel::Blstats.dtype());
        assert_eq!(<i8 as Element>::DTYPE, Channel::TtyColors.dtype());
        assert_eq!(<i32 as Element>::DTYPE, Channel::Misc.dtype());
        assert_eq!(DType::I64.size(), 8);
    }
}
