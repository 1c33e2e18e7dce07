//! Fixed-capacity strings for engine settings.
//!
//! The engine reads settings out of fixed-size NUL-terminated byte arrays.
//! [`FixedStr<N>`] holds a string guaranteed to fit in `N` bytes including
//! the terminator. Oversized input is an error, never truncated.

use std::fmt;

use crate::error::SessionError;

/// A string that fits, NUL-terminated, in a `[u8; N]`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct FixedStr<const N: usize> {
    value: String,
}

impl<const N: usize> FixedStr<N> {
    /// Maximum content length in bytes (one byte is reserved for the NUL).
    pub const CAPACITY: usize = N - 1;

    /// Validate `value` for the setting called `field`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Length`] if `value` is longer than [`Self::CAPACITY`],
    /// [`SessionError::NulByte`] if it contains an interior NUL.
    pub fn new(field: &'static str, value: &str) -> Result<Self, SessionError> {
        if value.len() > Self::CAPACITY {
            return Err(SessionError::Length {
                field,
                len: value.len(),
                capacity: Self::CAPACITY,
            });
        }
        if let Some(position) = value.bytes().position(|b| b == 0) {
            return Err(SessionError::NulByte { field, position });
        }
        Ok(Self {
            value: value.to_owned(),
        })
    }

    /// The empty string.
    pub fn empty() -> Self {
        Self {
            value: String::new(),
        }
    }

    /// Borrow the contents.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Length of the contents in bytes.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether the string is empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Copy the contents into `dst` as a NUL-terminated C string, zeroing
    /// the remainder.
    pub fn write_c(&self, dst: &mut [u8; N]) {
        dst.fill(0);
        dst[..self.value.len()].copy_from_slice(self.value.as_bytes());
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.value, f)
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_up_to_capacity() {
        let s = FixedStr::<8>::new("x", "1234567").unwrap();
        assert_eq!(s.as_str(), "1234567");
        assert_eq!(FixedStr::<8>::CAPACITY, 7);
    }

    #[test]
    fn rejects_one_past_capacity() {
        let err = FixedStr::<8>::new("wizkit", "12345678").unwrap_err();
        match err {
            SessionError::Length {
                field,
                len,
                capacity,
            } => {
                assert_eq!(field, "wizkit");
                assert_eq!(len, 8);
                assert_eq!(capacity, 7);
            }
            other => panic!("expected Length, got {other:?}"),
        }
    }

    #[test]
    fn rejects_interior_nul() {
        let err = FixedStr::<8>::new("options", "ab\0c").unwrap_err();
        assert!(matches!(err, SessionError::NulByte { position: 2, .. }));
    }

    #[test]
    fn write_c_terminates_and_clears() {
        let mut buf = [0xffu8; 6];
        FixedStr::<6>::new("x", "abc").unwrap().write_c(&mut buf);
        assert_eq!(&buf, b"abc\0\0\0");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn length_check_matches_capacity(value in "[a-z]{0,24}") {
                let result = FixedStr::<16>::new("x", &value);
                if value.len() <= 15 {
                    let s = result.unwrap();
                    let mut buf = [0xffu8; 16];
                    s.write_c(&mut buf);
                    prop_assert_eq!(&buf[..value.len()], value.as_bytes());
                    prop_assert!(buf[value.len()..].iter().all(|&b| b == 0));
                } else {
                    let is_length = matches!(result, Err(SessionError::Length { .. }));
                    prop_assert!(is_length);
                }
            }
        }
    }
}
