//! Read-only metadata for Delve observations.
//!
//! - [`GlyphLayout`] cuts the glyph integer space into category ranges
//!   computed from [`GlyphCounts`], with predicates, [`GlyphLayout::classify`]
//!   and the `glyph_to_*` inverses.
//! - [`MetaTables`] holds the monster, object, class-symbol and map-symbol
//!   rows behind bounds-checked accessors, and renders glyphs to characters
//!   and colors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod layout;
pub mod render;
pub mod tables;

pub use error::MetaError;
pub use layout::{GlyphCounts, GlyphKind, GlyphLayout};
pub use tables::{
    ClassSymbol, MetaTables, MiscSymbols, MonsterInfo, ObjectDescr, ObjectInfo, SymbolDef,
    TableRows,
};
