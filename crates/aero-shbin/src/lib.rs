//! A safe, zero-copy reader for `DVLB` shader binaries (`.shbin`).
//!
//! A shader binary bundles one compiled instruction stream (`DVLP`) with one
//! or more entry points (`DVLE`), each carrying constant, label, output
//! register, uniform and symbol tables. This crate decodes that container
//! without panicking or reading out of bounds, and leaves the instruction words
//! themselves to the instruction-set decoder.
//!
//! In addition to container parsing, this crate also provides:
//!
//! - [`bitfield`]: portable mask/shift views over packed integer cells, used by
//!   every packed record in the format.
//! - [`register`]: classification of raw register numbers into input / float /
//!   int / bool register banks.
//! - [`float24`]: the 24-bit float format of float constants.
//! - [`validate`]: semantic cross-checks that decoding does not enforce.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Bit-field views over raw integer cells.
pub mod bitfield;
mod container;
mod error;
/// The 24-bit float lane format.
pub mod float24;
/// `DVLB`/`DVLP`/`DVLE` header decoders.
pub mod header;
mod reader;
/// Register-number classification.
pub mod register;
/// Descriptor table entries and the fixed-stride table view.
pub mod table;
/// Semantic validation of decoded binaries.
pub mod validate;

/// Helpers for building synthetic shader binaries in tests.
///
/// This module is only available when compiling this crate's own tests, or when
/// the `test-utils` feature is enabled. It is **not** considered part of the
/// stable parsing API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use crate::container::{EntryPoint, NamedUniform, ShaderBinary, ShaderProgram};
pub use crate::error::{FormatError, Result};
pub use crate::float24::Float24;
pub use crate::header::{
    EntryPointHeader, ProgramIndex, ShaderBlobHeader, ShaderType, TableRange, DVLB_MAGIC,
    DVLE_MAGIC, DVLP_MAGIC, MAX_PROGRAM_COUNT,
};
pub use crate::register::{classify, register_index, ClassifiedRegister, RegisterType};
pub use crate::table::{
    ComponentMask, ConstantInfo, ConstantType, ConstantValue, LabelInfo, OutputRegisterInfo,
    OutputRegisterType, SwizzleInfo, SwizzlePattern, Table, TableEntry, TableIter, UniformInfo,
    MAX_TABLE_ENTRIES,
};
pub use crate::validate::{validate, SymbolOwner, ValidationIssue};
