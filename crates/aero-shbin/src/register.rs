//! Classification of raw register numbers found in uniform and label records.
//!
//! The register file is addressed through a single flat number space:
//!
//! | range          | class           | index          |
//! |----------------|-----------------|----------------|
//! | `0x00..0x10`   | input `v`       | `reg`          |
//! | `0x10..0x70`   | float uniform `c` | `reg - 0x10` |
//! | `0x70..0x74`   | int uniform `i` | `reg - 0x70`   |
//! | `0x78..0x88`   | bool uniform `b`| `reg - 0x78`   |
//!
//! Everything else, including the gap at `0x74..0x78`, is [`RegisterType::Unknown`].

use core::fmt;

const INPUT_END: u32 = 0x10;
const FLOAT_UNIFORM_END: u32 = 0x70;
const INT_UNIFORM_END: u32 = 0x74;
const BOOL_UNIFORM_START: u32 = 0x78;
const BOOL_UNIFORM_END: u32 = 0x88;

/// Register class of a raw register number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterType {
    /// Vertex/geometry input register (`v0`..`v15`).
    Input,
    /// Float vector uniform (`c0`..`c95`).
    FloatUniform,
    /// Integer vector uniform (`i0`..`i3`).
    IntUniform,
    /// Boolean uniform (`b0`..`b15`).
    BoolUniform,
    /// Not a register that uniform/label tables can refer to.
    Unknown,
}

impl RegisterType {
    /// Classifies a raw register number.
    pub const fn of(reg: u32) -> Self {
        if reg < INPUT_END {
            RegisterType::Input
        } else if reg < FLOAT_UNIFORM_END {
            RegisterType::FloatUniform
        } else if reg < INT_UNIFORM_END {
            RegisterType::IntUniform
        } else if reg >= BOOL_UNIFORM_START && reg < BOOL_UNIFORM_END {
            RegisterType::BoolUniform
        } else {
            RegisterType::Unknown
        }
    }

    /// First raw register number of this class, if it has one.
    pub const fn base(self) -> Option<u32> {
        match self {
            RegisterType::Input => Some(0),
            RegisterType::FloatUniform => Some(INPUT_END),
            RegisterType::IntUniform => Some(FLOAT_UNIFORM_END),
            RegisterType::BoolUniform => Some(BOOL_UNIFORM_START),
            RegisterType::Unknown => None,
        }
    }

    /// Assembler prefix used for registers of this class.
    pub const fn prefix(self) -> &'static str {
        match self {
            RegisterType::Input => "v",
            RegisterType::FloatUniform => "c",
            RegisterType::IntUniform => "i",
            RegisterType::BoolUniform => "b",
            RegisterType::Unknown => "?",
        }
    }
}

/// A raw register number split into its class and the index within that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassifiedRegister {
    /// The raw register number this was computed from.
    pub raw: u32,
    /// The register class.
    pub ty: RegisterType,
    /// Index within the class, or `-1` for [`RegisterType::Unknown`].
    pub index: i32,
}

impl ClassifiedRegister {
    /// Returns `true` if the register belongs to a known class.
    pub const fn is_known(&self) -> bool {
        !matches!(self.ty, RegisterType::Unknown)
    }
}

impl fmt::Display for ClassifiedRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            RegisterType::Unknown => write!(f, "?{:#x}", self.raw),
            ty => write!(f, "{}{}", ty.prefix(), self.index),
        }
    }
}

/// Classifies `reg` and computes its index within its class.
///
/// This is total: unrecognized numbers yield [`RegisterType::Unknown`] with an
/// index of `-1`.
pub const fn classify(reg: u32) -> ClassifiedRegister {
    let ty = RegisterType::of(reg);
    let index = match ty.base() {
        // Every known class lies below 0x88, so the index always fits.
        Some(base) => (reg - base) as i32,
        None => -1,
    };
    ClassifiedRegister {
        raw: reg,
        ty,
        index,
    }
}

/// Index of `reg` within its class, or `-1` if it is unclassified.
pub const fn register_index(reg: u32) -> i32 {
    classify(reg).index
}
