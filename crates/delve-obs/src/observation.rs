//! The observation block the engine fills every turn.
//!
//! [`RawObservation`] is the `#[repr(C)]` layout handed across the engine
//! boundary: four scalars followed by one pointer per [`Channel`] in
//! channel order. [`Observation`] owns it together with the
//! [`BufferRegistry`] that keeps every pointed-to region alive.

use std::ffi::{c_char, c_int};
use std::fmt;
use std::ptr;

use delve_core::{BindError, Channel, Element, TerminationReason};

use crate::registry::{BufferRegistry, BufferSet};

/// C layout of an observation. Null pointers mark unbound channels.
#[repr(C)]
#[derive(Debug)]
pub struct RawObservation {
    /// Action for the next step.
    pub action: c_int,
    /// Nonzero once the episode has ended.
    pub done: c_int,
    /// Nonzero while the engine is in normal play (not a menu or prompt).
    pub in_normal_game: c_char,
    /// Termination code, meaningful once `done` is set.
    pub how_done: c_int,
    /// [`Channel::Glyphs`].
    pub glyphs: *mut i16,
    /// [`Channel::Chars`].
    pub chars: *mut u8,
    /// [`Channel::Colors`].
    pub colors: *mut u8,
    /// [`Channel::Specials`].
    pub specials: *mut u8,
    /// [`Channel::Blstats`].
    pub blstats: *mut i64,
    /// [`Channel::Message`].
    pub message: *mut u8,
    /// [`Channel::ProgramState`].
    pub program_state: *mut i32,
    /// [`Channel::Internal`].
    pub internal: *mut i32,
    /// [`Channel::InvGlyphs`].
    pub inv_glyphs: *mut i16,
    /// [`Channel::InvLetters`].
    pub inv_letters: *mut u8,
    /// [`Channel::InvOclasses`].
    pub inv_oclasses: *mut u8,
    /// [`Channel::InvStrs`].
    pub inv_strs: *mut u8,
    /// [`Channel::ScreenDescriptions`].
    pub screen_descriptions: *mut u8,
    /// [`Channel::TtyChars`].
    pub tty_chars: *mut u8,
    /// [`Channel::TtyColors`].
    pub tty_colors: *mut i8,
    /// [`Channel::TtyCursor`].
    pub tty_cursor: *mut u8,
    /// [`Channel::Misc`].
    pub misc: *mut i32,
}

impl RawObservation {
    /// All scalars zero, all channels unbound.
    pub const fn empty() -> Self {
        Self {
            action: 0,
            done: 0,
            in_normal_game: 0,
            how_done: 0,
            glyphs: ptr::null_mut(),
            chars: ptr::null_mut(),
            colors: ptr::null_mut(),
            specials: ptr::null_mut(),
            blstats: ptr::null_mut(),
            message: ptr::null_mut(),
            program_state: ptr::null_mut(),
            internal: ptr::null_mut(),
            inv_glyphs: ptr::null_mut(),
            inv_letters: ptr::null_mut(),
            inv_oclasses: ptr::null_mut(),
            inv_strs: ptr::null_mut(),
            screen_descriptions: ptr::null_mut(),
            tty_chars: ptr::null_mut(),
            tty_colors: ptr::null_mut(),
            tty_cursor: ptr::null_mut(),
            misc: ptr::null_mut(),
        }
    }

    /// The pointer field for `channel`.
    pub fn ptr(&self, channel: Channel) -> *mut u8 {
        match channel {
            Channel::Glyphs => self.glyphs.cast(),
            Channel::Chars => self.chars,
            Channel::Colors => self.colors,
            Channel::Specials => self.specials,
            Channel::Blstats => self.blstats.cast(),
            Channel::Message => self.message,
            Channel::ProgramState => self.program_state.cast(),
            Channel::Internal => self.internal.cast(),
            Channel::InvGlyphs => self.inv_glyphs.cast(),
            Channel::InvLetters => self.inv_letters,
            Channel::InvOclasses => self.inv_oclasses,
            Channel::InvStrs => self.inv_strs,
            Channel::ScreenDescriptions => self.screen_descriptions,
            Channel::TtyChars => self.tty_chars,
            Channel::TtyColors => self.tty_colors.cast(),
            Channel::TtyCursor => self.tty_cursor,
            Channel::Misc => self.misc.cast(),
        }
    }

    fn set_ptr(&mut self, channel: Channel, p: *mut u8) {
        match channel {
            Channel::Glyphs => self.glyphs = p.cast(),
            Channel::Chars => self.chars = p,
            Channel::Colors => self.colors = p,
            Channel::Specials => self.specials = p,
            Channel::Blstats => self.blstats = p.cast(),
            Channel::Message => self.message = p,
            Channel::ProgramState => self.program_state = p.cast(),
            Channel::Internal => self.internal = p.cast(),
            Channel::InvGlyphs => self.inv_glyphs = p.cast(),
            Channel::InvLetters => self.inv_letters = p,
            Channel::InvOclasses => self.inv_oclasses = p,
            Channel::InvStrs => self.inv_strs = p,
            Channel::ScreenDescriptions => self.screen_descriptions = p,
            Channel::TtyChars => self.tty_chars = p,
            Channel::TtyColors => self.tty_colors = p.cast(),
            Channel::TtyCursor => self.tty_cursor = p,
            Channel::Misc => self.misc = p.cast(),
        }
    }
}

impl Default for RawObservation {
    fn default() -> Self {
        Self::empty()
    }
}

/// The live observation of a session and the buffers it writes into.
///
/// Channel contents are reachable only through this type, so reads and
/// engine writes are serialized by Rust's borrow rules.
pub struct Observation {
    raw: RawObservation,
    registry: BufferRegistry,
}

// SAFETY: every non-null pointer in `raw` points into a region owned by
// `registry`, and `BufferRegistry` is `Send`. Nothing is shared with
// another owner.
#[allow(unsafe_code)]
unsafe impl Send for Observation {}

impl Observation {
    /// An observation with nothing bound.
    pub fn new() -> Self {
        Self {
            raw: RawObservation::empty(),
            registry: BufferRegistry::new(),
        }
    }

    /// Replace every channel binding with `set`.
    ///
    /// # Errors
    ///
    /// The first [`BindError`]; existing bindings are untouched on error.
    pub fn bind(&mut self, set: BufferSet) -> Result<(), BindError> {
        self.registry.bind(set)?;
        for channel in Channel::ALL {
            let p = self.registry.ptr(channel);
            self.raw.set_ptr(channel, p);
        }
        Ok(())
    }

    /// Whether `channel` has a buffer.
    pub fn is_bound(&self, channel: Channel) -> bool {
        self.registry.get(channel).is_some()
    }

    /// Channels with a buffer, in channel order.
    pub fn bound_channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.registry.bound()
    }

    /// Read-only view of the C block.
    pub fn raw(&self) -> &RawObservation {
        &self.raw
    }

    /// Pointer to the C block for an engine call.
    ///
    /// The engine may write the scalars and the bound channel memory; it
    /// must not change the pointer fields.
    pub fn as_mut_ptr(&mut self) -> *mut RawObservation {
        &mut self.raw
    }

    /// The action written before the last step.
    pub fn action(&self) -> i32 {
        self.raw.action
    }

    /// Set the action for the next step.
    pub fn set_action(&mut self, action: i32) {
        self.raw.action = action;
    }

    /// Whether the episode has ended.
    pub fn done(&self) -> bool {
        self.raw.done != 0
    }

    /// Set the episode-ended flag.
    pub fn set_done(&mut self, done: bool) {
        self.raw.done = c_int::from(done);
    }

    /// Whether the engine is in normal play.
    pub fn in_normal_game(&self) -> bool {
        self.raw.in_normal_game != 0
    }

    /// Set the normal-play flag.
    pub fn set_in_normal_game(&mut self, normal: bool) {
        self.raw.in_normal_game = c_char::from(normal);
    }

    /// Raw termination code.
    pub fn how_done_code(&self) -> i32 {
        self.raw.how_done
    }

    /// Set the raw termination code.
    pub fn set_how_done(&mut self, reason: TerminationReason) {
        self.raw.how_done = reason.code();
    }

    /// Termination reason, once the episode has ended with a known code.
    pub fn how_done(&self) -> Option<TerminationReason> {
        if !self.done() {
            return None;
        }
        TerminationReason::from_code(self.raw.how_done)
    }

    /// Contents of `channel` as `T`; `None` when unbound or `T` is not the
    /// channel's element type.
    pub fn channel<T: Element>(&self, channel: Channel) -> Option<&[T]> {
        self.registry.get(channel)?.as_slice()
    }

    /// Mutable contents of `channel` as `T`.
    pub fn channel_mut<T: Element>(&mut self, channel: Channel) -> Option<&mut [T]> {
        self.registry.get_mut(channel)?.as_mut_slice()
    }

    /// Glyph grid, row-major `[21, 79]`.
    pub fn glyphs(&self) -> Option<&[i16]> {
        self.channel(Channel::Glyphs)
    }

    /// Bottom-line status vector.
    pub fn blstats(&self) -> Option<&[i64]> {
        self.channel(Channel::Blstats)
    }

    /// Current message bytes, NUL-padded.
    pub fn message(&self) -> Option<&[u8]> {
        self.channel(Channel::Message)
    }

    /// Terminal characters, row-major `[24, 80]`.
    pub fn tty_chars(&self) -> Option<&[u8]> {
        self.channel(Channel::TtyChars)
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observation")
            .field("action", &self.raw.action)
            .field("done", &self.done())
            .field("in_normal_game", &self.in_normal_game())
            .field("how_done", &self.raw.how_done)
            .field("bound", &self.registry)
            .finish()
    }
}
