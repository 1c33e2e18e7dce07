//! Host memory regions that the engine writes observations into.
//!
//! A [`Region`] describes caller-owned memory: element type, shape, layout
//! flags, and a data pointer. [`HostArray`] is the Rust-owned
//! implementation; other hosts (NumPy) implement the trait over their own
//! arrays.

use delve_core::{Channel, DType, Element, Shape};
use smallvec::SmallVec;

/// Caller-owned memory the engine may write into.
///
/// # Safety
///
/// Implementors guarantee that, while `self` is alive, [`data_ptr`]
/// returns the same address every time, and that this address is valid
/// for writes of `shape().iter().product()` elements of `dtype()` laid out
/// as described by [`is_c_contiguous`]. Moving `self` must not move the
/// memory (heap or foreign storage, not inline arrays).
///
/// [`data_ptr`]: Region::data_ptr
/// [`is_c_contiguous`]: Region::is_c_contiguous
#[allow(unsafe_code)]
pub unsafe trait Region: Send {
    /// Element type of the region.
    fn dtype(&self) -> DType;

    /// Extent of each dimension, outermost first.
    fn shape(&self) -> &[usize];

    /// Whether the elements are laid out row-major with no gaps.
    fn is_c_contiguous(&self) -> bool;

    /// Whether the host permits writes.
    fn is_writable(&self) -> bool;

    /// Start of the region's storage.
    fn data_ptr(&mut self) -> *mut u8;
}

/// Row-major element strides for `shape`.
pub fn c_strides(shape: &[usize]) -> Shape {
    let mut strides: Shape = SmallVec::from_elem(1, shape.len());
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// A zero-initialised, Rust-owned array usable as a [`Region`].
///
/// Custom strides and the read-only flag exist so hosts and tests can
/// exercise every layout check without a foreign array library.
#[derive(Clone, Debug)]
pub struct HostArray<T: Element> {
    data: Box<[T]>,
    shape: Shape,
    strides: Shape,
    writable: bool,
}

impl<T: Element> HostArray<T> {
    /// A contiguous array of `shape`.
    pub fn zeros(shape: &[usize]) -> Self {
        let len = shape.iter().product();
        Self {
            data: vec![T::default(); len].into_boxed_slice(),
            shape: SmallVec::from_slice(shape),
            strides: c_strides(shape),
            writable: true,
        }
    }

    /// A contiguous array shaped for `channel`.
    pub fn for_channel(channel: Channel) -> Self {
        Self::zeros(channel.shape())
    }

    /// An array of `shape` with explicit element `strides`.
    ///
    /// Storage is sized to cover the furthest addressed element.
    ///
    /// # Panics
    ///
    /// If `shape` and `strides` differ in length.
    pub fn with_strides(shape: &[usize], strides: &[usize]) -> Self {
        assert_eq!(shape.len(), strides.len(), "one stride per dimension");
        let len = if shape.contains(&0) {
            0
        } else {
            shape
                .iter()
                .zip(strides)
                .map(|(d, s)| (d - 1) * s)
                .sum::<usize>()
                + 1
        };
        Self {
            data: vec![T::default(); len].into_boxed_slice(),
            shape: SmallVec::from_slice(shape),
            strides: SmallVec::from_slice(strides),
            writable: true,
        }
    }

    /// Mark the array read-only.
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Element strides.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Underlying storage in memory order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

// SAFETY: `data` is a boxed slice, so its address is stable across moves
// and for the life of the array. Its length covers every element the
// shape and strides address.
#[allow(unsafe_code)]
unsafe impl<T: Element> Region for HostArray<T> {
    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn is_c_contiguous(&self) -> bool {
        let expected = c_strides(&self.shape);
        self.shape
            .iter()
            .zip(self.strides.iter().zip(expected.iter()))
            .all(|(&d, (s, e))| d <= 1 || s == e)
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn data_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr().cast()
    }
}
