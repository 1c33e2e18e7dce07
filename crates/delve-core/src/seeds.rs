//! Engine RNG seeds.

/// The engine's seed record.
///
/// `core` drives game mechanics, `display` drives cosmetic randomness.
/// `lgen` is the optional level-generation seed; `None` means the engine
/// derives level layouts from `core` and is never conflated with `Some(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Seeds {
    /// Core gameplay seed.
    pub core: u64,
    /// Display (cosmetic) seed.
    pub display: u64,
    /// Whether the engine may reseed itself during play.
    pub reseed: bool,
    /// Optional level-generation seed.
    pub lgen: Option<u64>,
}

impl Seeds {
    /// Seeds without a level-generation override.
    pub fn new(core: u64, display: u64, reseed: bool) -> Self {
        Self {
            core,
            display,
            reseed,
            lgen: None,
        }
    }

    /// Set the level-generation seed.
    pub fn with_lgen(mut self, lgen: u64) -> Self {
        self.lgen = Some(lgen);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lgen_zero_is_not_unset() {
        let unset = Seeds::new(1, 2, false);
        let zero = Seeds::new(1, 2, false).with_lgen(0);
        assert_eq!(unset.lgen, None);
        assert_eq!(zero.lgen, Some(0));
        assert_ne!(unset, zero);
    }
}
