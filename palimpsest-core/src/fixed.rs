//! Q16.16 fixed-point arithmetic for the line rasterizer
//!
//! Slope tracking needs sub-pixel resolution without the rounding drift of
//! repeated integer division; hardware floating point is not available on
//! Cortex-M0 targets.

use core::ops::{Add, AddAssign};

/// Q16.16 fixed-point number
///
/// Range: approximately -32768.0 to +32767.99998
/// Resolution: approximately 0.000015
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fixed32(i32);

impl Fixed32 {
    /// Zero value
    pub const ZERO: Self = Self(0);

    /// Fractional bits (16)
    pub const FRAC_BITS: u32 = 16;

    /// Create from a whole integer
    #[inline]
    pub const fn from_int(n: i32) -> Self {
        Self(n << Self::FRAC_BITS)
    }

    /// Convert to a whole integer
    ///
    /// Arithmetic shift, so this floors toward negative infinity.
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> Self::FRAC_BITS
    }

    /// The ratio `num / den` as a fixed-point value
    ///
    /// Returns ZERO if the denominator is zero.
    #[inline]
    pub const fn ratio(num: i32, den: i32) -> Self {
        if den == 0 {
            return Self::ZERO;
        }
        Self((num << Self::FRAC_BITS) / den)
    }

    /// Get the raw i32 representation
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Create from the raw i32 representation
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

impl Add for Fixed32 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self(self.0.wrapping_add(other.0))
    }
}

impl AddAssign for Fixed32 {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.wrapping_add(other.0);
    }
}
