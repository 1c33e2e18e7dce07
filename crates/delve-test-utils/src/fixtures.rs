//! Buffer-set fixtures.
//!
//! - [`host_region`]: a correctly shaped, zeroed region for any channel.
//! - [`full_set`]: every channel bound.
//! - [`set_of`]: only the listed channels bound.

use delve_core::{Channel, DType};
use delve_obs::{BufferSet, HostArray, Region};

/// A zeroed, contiguous, writable region matching `channel` exactly.
pub fn host_region(channel: Channel) -> Box<dyn Region> {
    match channel.dtype() {
        DType::I8 => Box::new(HostArray::<i8>::for_channel(channel)),
        DType::U8 => Box::new(HostArray::<u8>::for_channel(channel)),
        DType::I16 => Box::new(HostArray::<i16>::for_channel(channel)),
        DType::I32 => Box::new(HostArray::<i32>::for_channel(channel)),
        DType::I64 => Box::new(HostArray::<i64>::for_channel(channel)),
    }
}

/// A buffer set binding `channels`.
pub fn set_of(channels: &[Channel]) -> BufferSet {
    let mut set = BufferSet::new();
    for &c in channels {
        set.insert(c, host_region(c));
    }
    set
}

/// A buffer set binding all channels.
pub fn full_set() -> BufferSet {
    set_of(&Channel::ALL)
}
