use thiserror::Error;

/// Convenience alias for results produced while decoding shader binaries.
pub type Result<T> = core::result::Result<T, FormatError>;

/// Errors produced while decoding a `DVLB`/`DVLP`/`DVLE` shader binary.
///
/// Unknown enumeration values (shader kinds, output semantics, register
/// classes) are *not* errors; they decode to an `Unknown(raw)` variant instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A header's magic word does not match the value expected for it.
    #[error("bad {structure} magic at offset {offset:#x}: found {found:#010x}, expected {expected:#010x}")]
    BadMagic {
        /// Name of the structure being decoded (e.g. `"DVLB"`).
        structure: &'static str,
        /// Byte offset of the structure within the buffer.
        offset: usize,
        /// Expected magic word (little-endian `u32`).
        expected: u32,
        /// Magic word actually present.
        found: u32,
    },

    /// A header or table reaches past the end of the available bytes.
    #[error("{what} at {offset:#x}..+{len:#x} is outside buffer length {available:#x}")]
    Truncated {
        /// Description of the region being read.
        what: &'static str,
        /// Absolute byte offset of the region.
        offset: usize,
        /// Length of the region in bytes.
        len: usize,
        /// Number of bytes available in the buffer.
        available: usize,
    },

    /// Offset arithmetic overflowed `usize` while resolving a region.
    #[error("integer overflow while computing the location of {what}")]
    OffsetOverflow {
        /// Description of the region being resolved.
        what: &'static str,
    },

    /// A declared entry count exceeds the hard cap for that table.
    #[error("{what} declares {count} entries (maximum {max})")]
    TooManyEntries {
        /// Description of the table.
        what: &'static str,
        /// Declared entry count.
        count: u32,
        /// Maximum accepted count.
        max: u32,
    },

    /// A symbol name could not be resolved from the symbol table.
    #[error("invalid symbol at symbol table offset {offset:#x}: {reason}")]
    InvalidSymbol {
        /// Offset of the name within the symbol table.
        offset: u32,
        /// Why the name could not be read.
        reason: &'static str,
    },

    /// An entry point index is not present in the program index.
    #[error("entry point {index} does not exist (program declares {count})")]
    EntryPointOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of entry points in the program.
        count: usize,
    },
}
