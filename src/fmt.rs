//! Logging shims
//!
//! Forward to `defmt` on firmware builds and expand to nothing on host
//! builds, so driver code can log without sprinkling `cfg` attributes.

#![macro_use]
#![allow(unused_macros)]

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "embedded")]
        ::defmt::trace!($($arg)*);
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "embedded")]
        ::defmt::debug!($($arg)*);
    };
}

macro_rules! warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "embedded")]
        ::defmt::warn!($($arg)*);
    };
}
