//! Explicit mask/shift views over packed integer cells.
//!
//! Shader binary records pack several logically independent fields into one
//! little-endian word. Instead of relying on a compiler's bit-field layout, a
//! record keeps the raw cell (`u32`, `u64`, ...) and exposes each field through a
//! zero-sized [`BitField`] view type. Several views may alias the same cell; each
//! one only ever touches its own bit range.
//!
//! ```
//! use aero_shbin::bitfield::BitField;
//!
//! type Low = BitField<0, 7, u32>;
//! type High = BitField<7, 8, u32>;
//! type Signed = BitField<3, 15, i32>;
//!
//! let mut cell = 0u32;
//! Low::set(&mut cell, 0x55);
//! High::set(&mut cell, 0xAA);
//! assert_eq!(Low::get(cell), 0x55);
//! assert_eq!(High::get(cell), 0xAA);
//!
//! Signed::set(&mut cell, -2);
//! assert_eq!(Signed::get(cell), -2);
//! ```
//!
//! Layouts that do not fit the storage cell are rejected at compile time:
//!
//! ```compile_fail
//! use aero_shbin::bitfield::BitField;
//!
//! type TooWide = BitField<30, 4, u32>;
//! const _: u64 = TooWide::MASK;
//! ```
//!
//! The same holds for the layout queries:
//!
//! ```compile_fail
//! use aero_shbin::bitfield::BitField;
//!
//! type Empty = BitField<40, 0, u32>;
//! const _: u32 = Empty::num_bits();
//! ```
//!
//! ```compile_fail
//! use aero_shbin::bitfield::BitField;
//!
//! type Outside = BitField<40, 1, u32>;
//! const _: u32 = Outside::position();
//! ```

use core::fmt;
use core::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// A raw integer cell that bit-field views can be laid over.
///
/// Implemented for the unsigned integer types `u8`, `u16`, `u32` and `u64`.
pub trait BitStorage: sealed::Sealed + Copy + Eq + fmt::Debug {
    /// Width of the cell in bits.
    const BITS: u32;

    /// Widens the cell to 64 bits (zero-extended).
    fn to_bits(self) -> u64;

    /// Narrows 64 bits to the cell width, discarding the upper bits.
    fn from_bits_truncate(bits: u64) -> Self;
}

/// A value type that can be read from / written to a bit range.
///
/// `Storage` must have the same width as the value type, mirroring the rule that
/// an enumeration viewed through a bit field has an underlying representation of
/// the cell's width. Enumerations implementing this trait must accept every raw
/// value (`from_storage` is total).
pub trait BitValue: Copy {
    /// The unsigned cell type this value is stored in.
    type Storage: BitStorage;

    /// Whether extracted values are sign-extended from the field's top bit.
    const SIGNED: bool;

    /// Reinterprets raw cell bits as a value.
    fn from_storage(raw: Self::Storage) -> Self;

    /// Reinterprets a value as raw cell bits.
    fn into_storage(self) -> Self::Storage;
}

macro_rules! impl_storage {
    ($($ty:ty),*) => {$(
        impl sealed::Sealed for $ty {}

        impl BitStorage for $ty {
            const BITS: u32 = <$ty>::BITS;

            #[inline]
            fn to_bits(self) -> u64 {
                self as u64
            }

            #[inline]
            fn from_bits_truncate(bits: u64) -> Self {
                bits as $ty
            }
        }

        impl BitValue for $ty {
            type Storage = $ty;
            const SIGNED: bool = false;

            #[inline]
            fn from_storage(raw: $ty) -> Self {
                raw
            }

            #[inline]
            fn into_storage(self) -> $ty {
                self
            }
        }
    )*};
}

macro_rules! impl_signed_value {
    ($($ty:ty => $storage:ty),*) => {$(
        impl BitValue for $ty {
            type Storage = $storage;
            const SIGNED: bool = true;

            #[inline]
            fn from_storage(raw: $storage) -> Self {
                raw as $ty
            }

            #[inline]
            fn into_storage(self) -> $storage {
                self as $storage
            }
        }
    )*};
}

impl_storage!(u8, u16, u32, u64);
impl_signed_value!(i8 => u8, i16 => u16, i32 => u32, i64 => u64);

/// A view of bits `[POSITION, POSITION + BITS)` of a `T::Storage` cell, read and
/// written as a `T`.
///
/// `POSITION` counts from the least significant bit. Reads zero-extend unsigned
/// value types and sign-extend signed ones; writes truncate the value to `BITS`
/// bits and leave every other bit of the cell untouched.
///
/// The type is never instantiated; it only carries the layout.
pub struct BitField<const POSITION: u32, const BITS: u32, T>(PhantomData<fn() -> T>);

impl<const POSITION: u32, const BITS: u32, T: BitValue> BitField<POSITION, BITS, T> {
    const LAYOUT_OK: () = {
        let width = <T::Storage as BitStorage>::BITS;
        assert!(BITS > 0, "bit field must be at least one bit wide");
        assert!(POSITION < width, "bit field position lies outside its storage cell");
        assert!(BITS <= width - POSITION, "bit field extends past its storage cell");
    };

    /// Mask of the field's bits, in cell coordinates.
    pub const MASK: u64 = {
        let () = Self::LAYOUT_OK;
        (u64::MAX >> (64 - BITS)) << POSITION
    };

    /// Number of bits in the field.
    #[inline]
    pub const fn num_bits() -> u32 {
        let () = Self::LAYOUT_OK;
        BITS
    }

    /// Offset of the field's least significant bit within the cell.
    #[inline]
    pub const fn position() -> u32 {
        let () = Self::LAYOUT_OK;
        POSITION
    }

    /// Returns the field's mask as a cell value.
    #[inline]
    pub fn mask() -> T::Storage {
        T::Storage::from_bits_truncate(Self::MASK)
    }

    /// Extracts the field from `cell`.
    #[inline]
    pub fn get(cell: T::Storage) -> T {
        let raw = (cell.to_bits() & Self::MASK) >> POSITION;
        let value = if T::SIGNED {
            let shift = 64 - BITS;
            (((raw << shift) as i64) >> shift) as u64
        } else {
            raw
        };
        T::from_storage(T::Storage::from_bits_truncate(value))
    }

    /// Stores `value` into the field's bits of `cell`.
    #[inline]
    pub fn set(cell: &mut T::Storage, value: T) {
        let bits = value.into_storage().to_bits();
        let merged = (cell.to_bits() & !Self::MASK) | ((bits << POSITION) & Self::MASK);
        *cell = T::Storage::from_bits_truncate(merged);
    }

    /// Returns a copy of `cell` with the field replaced by `value`.
    #[inline]
    #[must_use]
    pub fn with(mut cell: T::Storage, value: T) -> T::Storage {
        Self::set(&mut cell, value);
        cell
    }
}

/// A single-bit [`BitField`] read and written as a `bool`.
pub struct BitFlag<const POSITION: u32, S>(PhantomData<fn() -> S>);

impl<const POSITION: u32, S> BitFlag<POSITION, S>
where
    S: BitStorage + BitValue<Storage = S>,
{
    /// Returns `true` if the bit is set in `cell`.
    #[inline]
    pub fn get(cell: S) -> bool {
        BitField::<POSITION, 1, S>::get(cell).to_bits() != 0
    }

    /// Sets or clears the bit in `cell`.
    #[inline]
    pub fn set(cell: &mut S, value: bool) {
        BitField::<POSITION, 1, S>::set(cell, S::from_bits_truncate(u64::from(value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Off,
        On,
        Other(u16),
    }

    impl BitValue for Mode {
        type Storage = u16;
        const SIGNED: bool = false;

        fn from_storage(raw: u16) -> Self {
            match raw {
                0 => Mode::Off,
                1 => Mode::On,
                other => Mode::Other(other),
            }
        }

        fn into_storage(self) -> u16 {
            match self {
                Mode::Off => 0,
                Mode::On => 1,
                Mode::Other(raw) => raw,
            }
        }
    }

    #[test]
    fn unsigned_fields_zero_extend() {
        type F = BitField<4, 4, u32>;
        assert_eq!(F::get(0xFFFF_FFFF), 0xF);
        assert_eq!(F::get(0x0000_00A0), 0xA);
        assert_eq!(F::num_bits(), 4);
        assert_eq!(F::position(), 4);
        assert_eq!(F::mask(), 0xF0);
    }

    #[test]
    fn layout_queries_are_const() {
        const WIDTH: u32 = BitField::<16, 8, u32>::num_bits();
        const SHIFT: u32 = BitField::<16, 8, u32>::position();
        const TOP: u32 = BitField::<63, 1, u64>::position();
        assert_eq!((WIDTH, SHIFT, TOP), (8, 16, 63));
    }

    #[test]
    fn signed_fields_sign_extend() {
        type F = BitField<3, 15, i32>;
        let mut cell = 0u32;
        F::set(&mut cell, -1);
        assert_eq!(cell, 0x7FFF << 3);
        assert_eq!(F::get(cell), -1);

        F::set(&mut cell, -16384);
        assert_eq!(F::get(cell), -16384);
        F::set(&mut cell, 16383);
        assert_eq!(F::get(cell), 16383);
    }

    #[test]
    fn writes_truncate_to_field_width() {
        type F = BitField<8, 4, u32>;
        let mut cell = 0u32;
        F::set(&mut cell, 0x1F);
        assert_eq!(cell, 0x0000_0F00);
        assert_eq!(F::get(cell), 0xF);
    }

    #[test]
    fn writes_preserve_neighbouring_bits() {
        type F = BitField<16, 8, u32>;
        let mut cell = 0xDEAD_BEEFu32;
        F::set(&mut cell, 0x12);
        assert_eq!(cell, 0xDE12_BEEF);
        F::set(&mut cell, 0);
        assert_eq!(cell, 0xDE00_BEEF);
    }

    #[test]
    fn aliased_views_share_one_cell() {
        type Low = BitField<0, 16, u64>;
        type Mask = BitField<32, 4, u64>;
        type Descriptor = BitField<32, 32, u64>;

        let mut cell = 0u64;
        Descriptor::set(&mut cell, 0xAAAA_AAA5);
        assert_eq!(Mask::get(cell), 0x5);
        Mask::set(&mut cell, 0xF);
        assert_eq!(Descriptor::get(cell), 0xAAAA_AAAF);
        assert_eq!(Low::get(cell), 0);
    }

    #[test]
    fn full_width_fields() {
        type U = BitField<0, 64, u64>;
        type S = BitField<0, 8, i8>;
        assert_eq!(U::get(u64::MAX), u64::MAX);
        assert_eq!(S::get(0x80), i8::MIN);
        assert_eq!(S::with(0, -1), 0xFF);
    }

    #[test]
    fn open_enum_round_trips_unknown_values() {
        type F = BitField<2, 10, Mode>;
        let mut cell = 0u16;
        F::set(&mut cell, Mode::On);
        assert_eq!(F::get(cell), Mode::On);
        F::set(&mut cell, Mode::Other(0x3FF));
        assert_eq!(F::get(cell), Mode::Other(0x3FF));
        assert_eq!(cell, 0x3FF << 2);
    }

    #[test]
    fn flags() {
        type Flag = BitFlag<7, u8>;
        let mut cell = 0x7Fu8;
        assert!(!Flag::get(cell));
        Flag::set(&mut cell, true);
        assert_eq!(cell, 0xFF);
        assert!(Flag::get(cell));
        Flag::set(&mut cell, false);
        assert_eq!(cell, 0x7F);
    }
}
