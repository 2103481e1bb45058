//! The 24-bit float format used by float constant lanes.
//!
//! A lane keeps `s1.e7.m16` in the low 24 bits of a 32-bit word: sign at bit 23,
//! a 7-bit exponent biased by 63 at bits 16..23 and a 16-bit mantissa at bits
//! 0..16. Conversion is pure bit manipulation.

use core::fmt;

use crate::bitfield::{BitField, BitFlag};

type Mantissa = BitField<0, 16, u32>;
type Exponent = BitField<16, 7, u32>;
type Sign = BitFlag<23, u32>;

const MAGNITUDE_MASK: u32 = 0x007F_FFFF;
const EXPONENT_MAX: u32 = 0x7F;
/// Difference between the `f32` exponent bias (127) and the float24 bias (63).
const BIAS_DELTA: u32 = 64;
const F32_MANTISSA_SHIFT: u32 = 23 - 16;

/// A raw float24 lane.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Float24(u32);

impl Float24 {
    /// Positive zero.
    pub const ZERO: Float24 = Float24(0);
    /// `1.0`.
    pub const ONE: Float24 = Float24(0x003F_0000);

    /// Wraps a raw word; bits above 24 are ignored.
    pub const fn from_raw(raw: u32) -> Self {
        Float24(raw & 0x00FF_FFFF)
    }

    /// Returns the raw 24-bit encoding.
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// Widens to `f32`. Every float24 value is exactly representable.
    pub fn to_f32(self) -> f32 {
        let sign = u32::from(Sign::get(self.0)) << 31;
        if self.0 & MAGNITUDE_MASK == 0 {
            return f32::from_bits(sign);
        }
        let exponent = Exponent::get(self.0);
        let mantissa = Mantissa::get(self.0) << F32_MANTISSA_SHIFT;
        let exponent = if exponent == EXPONENT_MAX {
            0xFF
        } else {
            exponent + BIAS_DELTA
        };
        f32::from_bits(sign | (exponent << 23) | mantissa)
    }

    /// Narrows an `f32`, truncating the mantissa.
    ///
    /// Values too small for the format flush to a signed zero, values too large
    /// become infinity. NaN payloads keep their top mantissa bits (a NaN whose
    /// surviving bits are all zero becomes the quiet pattern `0x7F8000`).
    pub fn from_f32(value: f32) -> Self {
        let bits = value.to_bits();
        let sign = bits >> 31;
        let exponent = (bits >> 23) & 0xFF;
        let mantissa = (bits & 0x007F_FFFF) >> F32_MANTISSA_SHIFT;

        let mut raw = 0u32;
        Sign::set(&mut raw, sign != 0);
        if exponent == 0xFF {
            Exponent::set(&mut raw, EXPONENT_MAX);
            let payload = if value.is_nan() && mantissa == 0 {
                0x8000
            } else {
                mantissa
            };
            Mantissa::set(&mut raw, payload);
        } else if exponent < BIAS_DELTA {
            // Underflow, including f32 zeros and subnormals.
        } else if exponent - BIAS_DELTA >= EXPONENT_MAX {
            Exponent::set(&mut raw, EXPONENT_MAX);
        } else {
            Exponent::set(&mut raw, exponent - BIAS_DELTA);
            Mantissa::set(&mut raw, mantissa);
        }
        Float24(raw)
    }
}

impl From<f32> for Float24 {
    fn from(value: f32) -> Self {
        Float24::from_f32(value)
    }
}

impl From<Float24> for f32 {
    fn from(value: Float24) -> Self {
        value.to_f32()
    }
}

impl fmt::Debug for Float24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Float24({:#08x} = {})", self.0, self.to_f32())
    }
}

impl fmt::Display for Float24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f32(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widens_known_values() {
        assert_eq!(Float24::ONE.to_f32(), 1.0);
        assert_eq!(Float24::from_raw(0x00C0_0000).to_f32(), -2.0);
        assert_eq!(Float24::from_raw(0x003E_0000).to_f32(), 0.5);
        assert_eq!(Float24::from_raw(0x003F_8000).to_f32(), 1.5);
        assert_eq!(Float24::ZERO.to_f32().to_bits(), 0);
        assert_eq!(Float24::from_raw(0x0080_0000).to_f32().to_bits(), 0x8000_0000);
        assert_eq!(Float24::from_raw(0x007F_0000).to_f32(), f32::INFINITY);
        assert!(Float24::from_raw(0x007F_0001).to_f32().is_nan());
    }

    #[test]
    fn narrows_f32() {
        assert_eq!(Float24::from_f32(1.0), Float24::ONE);
        assert_eq!(Float24::from_f32(-2.0).to_raw(), 0x00C0_0000);
        assert_eq!(Float24::from_f32(0.25).to_f32(), 0.25);
        assert_eq!(Float24::from_f32(1e-30).to_raw(), 0);
        assert_eq!(Float24::from_f32(-1e-30).to_raw(), 0x0080_0000);
        assert_eq!(Float24::from_f32(1e30).to_f32(), f32::INFINITY);
        assert_eq!(Float24::from_f32(f32::NEG_INFINITY).to_f32(), f32::NEG_INFINITY);
        assert!(Float24::from_f32(f32::NAN).to_f32().is_nan());
    }

    #[test]
    fn raw_ignores_upper_byte() {
        assert_eq!(Float24::from_raw(0xFF3F_0000), Float24::ONE);
    }
}
