//! Buffer validation and the keep-alive set.
//!
//! [`register`] checks one region against the channel table and turns it
//! into a [`Target`]. [`BufferRegistry`] holds one optional target per
//! channel and replaces the whole set atomically: every region is checked
//! before any existing binding is touched.

use std::fmt;
use std::ptr::NonNull;

use delve_core::{BindError, Channel, Element, LayoutIssue, Shape};
use smallvec::SmallVec;

use crate::region::Region;

// ── BufferSet ──────────────────────────────────────────────────────

/// Regions offered for binding, at most one per channel.
///
/// Channels left empty are bound to nothing, and the engine skips them.
#[derive(Default)]
pub struct BufferSet {
    slots: [Option<Box<dyn Region>>; Channel::COUNT],
}

impl BufferSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer `region` for `channel`, replacing any earlier offer.
    pub fn insert(&mut self, channel: Channel, region: Box<dyn Region>) {
        self.slots[channel.index()] = Some(region);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, channel: Channel, region: impl Region + 'static) -> Self {
        self.insert(channel, Box::new(region));
        self
    }

    /// Whether a region is offered for `channel`.
    pub fn contains(&self, channel: Channel) -> bool {
        self.slots[channel.index()].is_some()
    }

    /// Number of channels with a region.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no region is offered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for BufferSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Channel::ALL.iter().filter(|c| self.contains(**c)))
            .finish()
    }
}

// ── Target ─────────────────────────────────────────────────────────

/// A validated region bound to one channel.
///
/// Owns the region, so the memory behind the pointer lives exactly as long
/// as the binding.
pub struct Target {
    channel: Channel,
    ptr: NonNull<u8>,
    region: Box<dyn Region>,
}

impl Target {
    /// The channel this target is bound to.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Number of elements the engine may write.
    pub fn len(&self) -> usize {
        self.channel.element_count()
    }

    /// Always false; every channel has at least one element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start of the bound memory.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// View the memory as `T`. `None` unless `T` is the channel's type.
    #[allow(unsafe_code)]
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        if T::DTYPE != self.region.dtype() {
            return None;
        }
        // SAFETY: `register` checked dtype, shape, contiguity and alignment,
        // and `Region` guarantees the pointer stays valid for `len()`
        // elements while `self.region` is alive.
        Some(unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().cast::<T>(), self.len()) })
    }

    /// Mutable view of the memory as `T`. `None` unless `T` is the
    /// channel's type.
    #[allow(unsafe_code)]
    pub fn as_mut_slice<T: Element>(&mut self) -> Option<&mut [T]> {
        if T::DTYPE != self.region.dtype() {
            return None;
        }
        // SAFETY: as in `as_slice`; `&mut self` makes the view exclusive
        // within this process.
        Some(unsafe {
            std::slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<T>(), self.len())
        })
    }
}

// SAFETY: `ptr` points into memory owned by `region`, which is `Send`;
// the pointer moves with its owner.
#[allow(unsafe_code)]
unsafe impl Send for Target {}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("channel", &self.channel)
            .field("dtype", &self.region.dtype())
            .field("shape", &self.region.shape())
            .finish()
    }
}

// ── register ───────────────────────────────────────────────────────

/// Check `region` against `channel`'s type, shape, and layout.
///
/// Checks run in a fixed order: element type, dimension count, each
/// extent, contiguity, writability, alignment. The first failure wins.
///
/// # Errors
///
/// [`BindError`] naming the channel and what differs.
pub fn validate(channel: Channel, region: &dyn Region) -> Result<(), BindError> {
    let expected_dtype = channel.dtype();
    if region.dtype() != expected_dtype {
        return Err(BindError::TypeMismatch {
            channel,
            expected: expected_dtype,
            actual: region.dtype(),
        });
    }
    let expected = channel.shape();
    let actual = region.shape();
    if expected != actual {
        return Err(BindError::ShapeMismatch {
            channel,
            expected: SmallVec::from_slice(expected),
            actual: Shape::from_slice(actual),
        });
    }
    if !region.is_c_contiguous() {
        return Err(BindError::LayoutMismatch {
            channel,
            issue: LayoutIssue::NotContiguous,
        });
    }
    if !region.is_writable() {
        return Err(BindError::LayoutMismatch {
            channel,
            issue: LayoutIssue::ReadOnly,
        });
    }
    Ok(())
}

/// Validate `region` and bind it to `channel`.
///
/// `None` is a valid "not bound" request and yields `Ok(None)`.
///
/// # Errors
///
/// Any [`validate`] failure, or [`LayoutIssue::Misaligned`] when the data
/// pointer is null or unaligned for the element type.
pub fn register(
    channel: Channel,
    region: Option<Box<dyn Region>>,
) -> Result<Option<Target>, BindError> {
    let Some(mut region) = region else {
        return Ok(None);
    };
    validate(channel, region.as_ref())?;
    let misaligned = BindError::LayoutMismatch {
        channel,
        issue: LayoutIssue::Misaligned,
    };
    let raw = region.data_ptr();
    if (raw as usize) % channel.dtype().align() != 0 {
        return Err(misaligned);
    }
    let ptr = NonNull::new(raw).ok_or(misaligned)?;
    Ok(Some(Target {
        channel,
        ptr,
        region,
    }))
}

// ── BufferRegistry ─────────────────────────────────────────────────

/// One optional [`Target`] per channel; the session's keep-alive set.
#[derive(Default)]
pub struct BufferRegistry {
    targets: [Option<Target>; Channel::COUNT],
}

impl BufferRegistry {
    /// A registry with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every binding with the regions in `set`.
    ///
    /// All regions are validated first; on error the current bindings are
    /// left exactly as they were.
    ///
    /// # Errors
    ///
    /// The first [`BindError`] in channel order.
    pub fn bind(&mut self, set: BufferSet) -> Result<(), BindError> {
        let mut staged: [Option<Target>; Channel::COUNT] = Default::default();
        for (channel, region) in Channel::ALL.into_iter().zip(set.slots) {
            staged[channel.index()] = register(channel, region)?;
        }
        self.targets = staged;
        Ok(())
    }

    /// The target bound to `channel`, if any.
    pub fn get(&self, channel: Channel) -> Option<&Target> {
        self.targets[channel.index()].as_ref()
    }

    /// Mutable access to the target bound to `channel`.
    pub fn get_mut(&mut self, channel: Channel) -> Option<&mut Target> {
        self.targets[channel.index()].as_mut()
    }

    /// Data pointer for `channel`, null when unbound.
    pub fn ptr(&self, channel: Channel) -> *mut u8 {
        self.get(channel)
            .map_or(std::ptr::null_mut(), Target::as_ptr)
    }

    /// Channels that currently have a target.
    pub fn bound(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL
            .into_iter()
            .filter(move |c| self.targets[c.index()].is_some())
    }
}

impl fmt::Debug for BufferRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.bound()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::HostArray;
    use delve_core::DType;
    use proptest::prelude::*;

    fn boxed<T: Element>(a: HostArray<T>) -> Option<Box<dyn Region>> {
        Some(Box::new(a))
    }

    #[test]
    fn none_is_not_bound() {
        assert!(register(Channel::Glyphs, None).unwrap().is_none());
    }

    #[test]
    fn exact_region_binds() {
        let t = register(Channel::Glyphs, boxed(HostArray::<i16>::for_channel(Channel::Glyphs)))
            .unwrap()
            .unwrap();
        assert_eq!(t.channel(), Channel::Glyphs);
        assert_eq!(t.len(), 21 * 79);
        assert_eq!(t.as_slice::<i16>().unwrap().len(), 21 * 79);
        assert!(t.as_slice::<u8>().is_none());
    }

    #[test]
    fn wrong_dtype_is_type_mismatch() {
        let err = register(Channel::Glyphs, boxed(HostArray::<i32>::zeros(&[21, 79]))).unwrap_err();
        assert_eq!(
            err,
            BindError::TypeMismatch {
                channel: Channel::Glyphs,
                expected: DType::I16,
                actual: DType::I32,
            }
        );
    }

    #[test]
    fn type_is_checked_before_shape() {
        let err = register(Channel::Blstats, boxed(HostArray::<i32>::zeros(&[3]))).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    #[test]
    fn flattened_map_is_dimension_mismatch() {
        let err = register(Channel::Chars, boxed(HostArray::<u8>::zeros(&[21 * 79]))).unwrap_err();
        match err {
            BindError::ShapeMismatch { expected, actual, .. } => {
                assert_eq!(expected.as_slice(), &[21, 79]);
                assert_eq!(actual.as_slice(), &[21 * 79]);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn non_contiguous_is_layout_mismatch() {
        let err = register(
            Channel::TtyChars,
            boxed(HostArray::<u8>::with_strides(&[24, 80], &[1, 24])),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindError::LayoutMismatch {
                channel: Channel::TtyChars,
                issue: LayoutIssue::NotContiguous,
            }
        );
    }

    #[test]
    fn read_only_is_layout_mismatch() {
        let err = register(
            Channel::Misc,
            boxed(HostArray::<i32>::for_channel(Channel::Misc).read_only()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindError::LayoutMismatch {
                channel: Channel::Misc,
                issue: LayoutIssue::ReadOnly,
            }
        );
    }

    #[test]
    fn failed_bind_keeps_previous_bindings() {
        let mut reg = BufferRegistry::new();
        reg.bind(BufferSet::new().with(Channel::Glyphs, HostArray::<i16>::for_channel(Channel::Glyphs)))
            .unwrap();
        let before = reg.ptr(Channel::Glyphs);

        let bad = BufferSet::new()
            .with(Channel::Chars, HostArray::<u8>::for_channel(Channel::Chars))
            .with(Channel::Misc, HostArray::<i64>::zeros(&[3]));
        assert!(reg.bind(bad).is_err());

        assert_eq!(reg.ptr(Channel::Glyphs), before);
        assert!(reg.get(Channel::Chars).is_none());
        assert_eq!(reg.bound().collect::<Vec<_>>(), vec![Channel::Glyphs]);
    }

    #[test]
    fn bind_replaces_the_whole_set() {
        let mut reg = BufferRegistry::new();
        reg.bind(BufferSet::new().with(Channel::Glyphs, HostArray::<i16>::for_channel(Channel::Glyphs)))
            .unwrap();
        reg.bind(BufferSet::new().with(Channel::Blstats, HostArray::<i64>::for_channel(Channel::Blstats)))
            .unwrap();
        assert!(reg.ptr(Channel::Glyphs).is_null());
        assert!(!reg.ptr(Channel::Blstats).is_null());
    }

    fn channel_strategy() -> impl Strategy<Value = Channel> {
        (0..Channel::COUNT).prop_map(|i| Channel::ALL[i])
    }

    proptest! {
        #[test]
        fn any_off_by_one_extent_is_shape_mismatch(
            channel in channel_strategy(),
            dim in 0usize..3,
            grow in any::<bool>(),
        ) {
            let mut shape = channel.shape().to_vec();
            let dim = dim % shape.len();
            shape[dim] = if grow { shape[dim] + 1 } else { shape[dim] - 1 };
            let region: Box<dyn Region> = match channel.dtype() {
                DType::I8 => Box::new(HostArray::<i8>::zeros(&shape)),
                DType::U8 => Box::new(HostArray::<u8>::zeros(&shape)),
                DType::I16 => Box::new(HostArray::<i16>::zeros(&shape)),
                DType::I32 => Box::new(HostArray::<i32>::zeros(&shape)),
                DType::I64 => Box::new(HostArray::<i64>::zeros(&shape)),
            };
            let err = register(channel, Some(region)).unwrap_err();
            let is_shape_mismatch = matches!(err, BindError::ShapeMismatch { .. });
            prop_assert!(is_shape_mismatch);
            prop_assert_eq!(err.channel(), channel);
        }

        #[test]
        fn any_wrong_dtype_is_type_mismatch(channel in channel_strategy(), pick in 0usize..5) {
            let shape = channel.shape();
            let region: Box<dyn Region> = match pick {
                0 => Box::new(HostArray::<i8>::zeros(shape)),
                1 => Box::new(HostArray::<u8>::zeros(shape)),
                2 => Box::new(HostArray::<i16>::zeros(shape)),
                3 => Box::new(HostArray::<i32>::zeros(shape)),
                _ => Box::new(HostArray::<i64>::zeros(shape)),
            };
            let offered = region.dtype();
            let result = register(channel, Some(region));
            if offered == channel.dtype() {
                prop_assert!(result.unwrap().is_some());
            } else {
                let is_type_mismatch = matches!(result, Err(BindError::TypeMismatch { .. }));
                prop_assert!(is_type_mismatch);
            }
        }
    }
}
