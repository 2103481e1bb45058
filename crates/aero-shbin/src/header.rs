//! Fixed-layout headers of the `DVLB` / `DVLP` / `DVLE` container.
//!
//! Each decoder takes the whole buffer plus the absolute offset (`base`) at which
//! the header starts. The magic word is checked before anything else is trusted.
//! Offsets stored inside a header stay relative to that header; use
//! [`TableRange::absolute`] with the header's `base` to locate a region.

use crate::error::{FormatError, Result};
use crate::reader::{read_array, read_u32_le, resolve};

/// Builds the little-endian magic word of a four-character tag.
pub const fn magic(tag: [u8; 4]) -> u32 {
    u32::from_le_bytes(tag)
}

/// `"DVLB"` as a little-endian word.
pub const DVLB_MAGIC: u32 = magic(*b"DVLB");
/// `"DVLP"` as a little-endian word.
pub const DVLP_MAGIC: u32 = magic(*b"DVLP");
/// `"DVLE"` as a little-endian word.
pub const DVLE_MAGIC: u32 = magic(*b"DVLE");

/// Hard cap on the number of entry points a program index may declare.
pub const MAX_PROGRAM_COUNT: u32 = 4096;

/// An `(offset, count)` pair locating a table relative to its containing header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TableRange {
    /// Byte offset relative to the start of the containing structure.
    pub offset: u32,
    /// Number of entries (a byte count for the symbol table).
    pub count: u32,
}

impl TableRange {
    /// Creates a range.
    pub const fn new(offset: u32, count: u32) -> Self {
        TableRange { offset, count }
    }

    /// Returns the absolute byte offset of the table for a structure at `base`.
    pub fn absolute(&self, base: usize) -> Result<usize> {
        resolve(base, self.offset, "table offset")
    }

    /// Returns `true` if the range declares no entries.
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

fn check_magic(
    bytes: &[u8],
    base: usize,
    expected: u32,
    structure: &'static str,
) -> Result<()> {
    let found = read_u32_le(bytes, base, structure)?;
    if found != expected {
        return Err(FormatError::BadMagic {
            structure,
            offset: base,
            expected,
            found,
        });
    }
    Ok(())
}

/// Reads `N` consecutive words of a header whose magic has been verified.
fn read_words<const N: usize>(
    bytes: &[u8],
    base: usize,
    structure: &'static str,
) -> Result<[u32; N]> {
    let mut words = [0u32; N];
    for (i, word) in words.iter_mut().enumerate() {
        let offset = base
            .checked_add(i * 4)
            .ok_or(FormatError::OffsetOverflow { what: structure })?;
        *word = read_u32_le(bytes, offset, structure)?;
    }
    Ok(words)
}

/// The top-level program index (`DVLB`).
///
/// It is followed by `program_count` little-endian `u32` offsets, relative to
/// the `DVLB` start, of the entry-point headers. The shader blob header (`DVLP`)
/// follows the offset array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIndex {
    /// Must be [`DVLB_MAGIC`].
    pub magic: u32,
    /// Number of entry points (and entries in the offset array).
    pub program_count: u32,
}

impl ProgramIndex {
    /// Encoded size in bytes.
    pub const SIZE: usize = 8;

    /// Decodes the program index at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_at(bytes, 0)
    }

    /// Decodes the program index located at `base`.
    pub fn parse_at(bytes: &[u8], base: usize) -> Result<Self> {
        check_magic(bytes, base, DVLB_MAGIC, "DVLB")?;
        let [magic, program_count] = read_words::<2>(bytes, base, "DVLB header")?;
        Ok(ProgramIndex {
            magic,
            program_count,
        })
    }

    /// Byte length of the header plus its offset array.
    pub fn len_with_offsets(&self) -> Result<usize> {
        (self.program_count as usize)
            .checked_mul(4)
            .and_then(|n| n.checked_add(Self::SIZE))
            .ok_or(FormatError::OffsetOverflow {
                what: "DVLB offset array",
            })
    }

    /// Encodes the header.
    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.magic.to_le_bytes());
        out[4..8].copy_from_slice(&self.program_count.to_le_bytes());
        out
    }
}

/// The shader blob header (`DVLP`). All offsets are relative to its own start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderBlobHeader {
    /// Must be [`DVLP_MAGIC`].
    pub magic: u32,
    /// Format version.
    pub version: u32,
    /// Location of the instruction-word stream; `count` is a size in 32-bit words.
    pub binary: TableRange,
    /// Location of the swizzle pattern table.
    pub swizzles: TableRange,
    /// Offset of the filename symbol.
    pub filename_symbol_offset: u32,
}

impl ShaderBlobHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 28;

    /// Decodes the shader blob header located at `base`.
    pub fn parse_at(bytes: &[u8], base: usize) -> Result<Self> {
        check_magic(bytes, base, DVLP_MAGIC, "DVLP")?;
        let [magic, version, binary_offset, binary_size_words, swizzle_offset, swizzle_count, filename_symbol_offset] =
            read_words::<7>(bytes, base, "DVLP header")?;
        Ok(ShaderBlobHeader {
            magic,
            version,
            binary: TableRange::new(binary_offset, binary_size_words),
            swizzles: TableRange::new(swizzle_offset, swizzle_count),
            filename_symbol_offset,
        })
    }

    /// Encodes the header.
    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let words = [
            self.magic,
            self.version,
            self.binary.offset,
            self.binary.count,
            self.swizzles.offset,
            self.swizzles.count,
            self.filename_symbol_offset,
        ];
        let mut out = [0u8; Self::SIZE];
        for (dst, word) in out.chunks_exact_mut(4).zip(words) {
            dst.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

/// Kind of shader an entry point runs as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShaderType {
    /// Vertex shader.
    #[default]
    Vertex,
    /// Geometry shader.
    Geometry,
    /// A kind this crate does not know about.
    Unknown(u8),
}

impl ShaderType {
    /// Decodes the raw kind byte.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => ShaderType::Vertex,
            1 => ShaderType::Geometry,
            other => ShaderType::Unknown(other),
        }
    }

    /// Returns the raw kind byte.
    pub const fn to_raw(self) -> u8 {
        match self {
            ShaderType::Vertex => 0,
            ShaderType::Geometry => 1,
            ShaderType::Unknown(raw) => raw,
        }
    }
}

/// The entry-point header (`DVLE`). All offsets are relative to its own start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPointHeader {
    /// Must be [`DVLE_MAGIC`].
    pub magic: u32,
    /// Vertex or geometry.
    pub shader_type: ShaderType,
    /// Entry instruction, in words from the start of the instruction stream.
    pub main_offset_words: u32,
    /// End-of-main instruction, in words from the start of the instruction stream.
    pub endmain_offset_words: u32,
    /// Constant table (20-byte entries).
    pub constants: TableRange,
    /// Label table (16-byte entries).
    pub labels: TableRange,
    /// Output register table (8-byte entries).
    pub output_registers: TableRange,
    /// Uniform table (8-byte entries).
    pub uniforms: TableRange,
    /// Symbol table; `count` is its size in bytes.
    pub symbols: TableRange,
}

impl EntryPointHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 64;

    /// Decodes the entry-point header located at `base`.
    pub fn parse_at(bytes: &[u8], base: usize) -> Result<Self> {
        check_magic(bytes, base, DVLE_MAGIC, "DVLE")?;
        let kind_offset = base
            .checked_add(4)
            .ok_or(FormatError::OffsetOverflow { what: "DVLE header" })?;
        let [_, _, kind, _] = read_array::<4>(bytes, kind_offset, "DVLE header")?;
        let w = read_words::<16>(bytes, base, "DVLE header")?;
        Ok(EntryPointHeader {
            magic: w[0],
            shader_type: ShaderType::from_raw(kind),
            main_offset_words: w[2],
            endmain_offset_words: w[3],
            constants: TableRange::new(w[6], w[7]),
            labels: TableRange::new(w[8], w[9]),
            output_registers: TableRange::new(w[10], w[11]),
            uniforms: TableRange::new(w[12], w[13]),
            symbols: TableRange::new(w[14], w[15]),
        })
    }

    /// Encodes the header. Reserved fields are written as zero.
    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.magic.to_le_bytes());
        out[6] = self.shader_type.to_raw();
        out[8..12].copy_from_slice(&self.main_offset_words.to_le_bytes());
        out[12..16].copy_from_slice(&self.endmain_offset_words.to_le_bytes());
        let ranges = [
            self.constants,
            self.labels,
            self.output_registers,
            self.uniforms,
            self.symbols,
        ];
        for (dst, range) in out[24..].chunks_exact_mut(8).zip(ranges) {
            dst[0..4].copy_from_slice(&range.offset.to_le_bytes());
            dst[4..8].copy_from_slice(&range.count.to_le_bytes());
        }
        out
    }
}
