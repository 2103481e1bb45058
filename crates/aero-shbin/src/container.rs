use core::fmt;

use tracing::{debug, trace};

use crate::error::{FormatError, Result};
use crate::header::{
    EntryPointHeader, ProgramIndex, ShaderBlobHeader, TableRange, MAX_PROGRAM_COUNT,
};
use crate::reader::{read_cstring, read_u32_le, region, table_len};
use crate::table::{
    ConstantInfo, LabelInfo, OutputRegisterInfo, SwizzleInfo, Table, UniformInfo,
};

/// A parsed shader binary (`DVLB` program index, `DVLP` blob, `DVLE` entry points).
///
/// Parsing validates every header and every table range up front, so the
/// accessors on [`ShaderBinary`], [`ShaderProgram`] and [`EntryPoint`] cannot
/// fail afterwards except when resolving symbol names.
#[derive(Debug, Clone)]
pub struct ShaderBinary<'a> {
    bytes: &'a [u8],
    header: ProgramIndex,
    program: ShaderProgram<'a>,
    entry_points: Vec<EntryPoint<'a>>,
}

impl<'a> ShaderBinary<'a> {
    /// Parses a shader binary from `bytes`.
    ///
    /// The input is treated as untrusted: all offsets and counts are checked
    /// and malformed data is reported as a [`FormatError`], never a panic.
    pub fn parse(bytes: &'a [u8]) -> Result<ShaderBinary<'a>> {
        let header = ProgramIndex::parse(bytes)?;
        if header.program_count > MAX_PROGRAM_COUNT {
            return Err(FormatError::TooManyEntries {
                what: "DVLB program index",
                count: header.program_count,
                max: MAX_PROGRAM_COUNT,
            });
        }

        let blob_base = header.len_with_offsets()?;
        let offsets = region(
            bytes,
            ProgramIndex::SIZE,
            blob_base - ProgramIndex::SIZE,
            "DVLB offset array",
        )?;

        let program = ShaderProgram::parse_at(bytes, blob_base)?;

        let mut entry_points = Vec::new();
        entry_points
            .try_reserve_exact(header.program_count as usize)
            .map_err(|_| FormatError::TooManyEntries {
                what: "DVLB program index",
                count: header.program_count,
                max: MAX_PROGRAM_COUNT,
            })?;
        for (index, raw) in offsets.chunks_exact(4).enumerate() {
            let base = read_u32_le(raw, 0, "DVLB offset array")? as usize;
            let entry = EntryPoint::parse_at(bytes, base)?;
            debug!(
                index,
                base,
                shader_type = ?entry.header.shader_type,
                main = entry.header.main_offset_words,
                "decoded DVLE entry point"
            );
            entry_points.push(entry);
        }

        debug!(
            programs = header.program_count,
            instructions = program.header.binary.count,
            swizzles = program.header.swizzles.count,
            "decoded DVLB shader binary"
        );

        Ok(ShaderBinary {
            bytes,
            header,
            program,
            entry_points,
        })
    }

    /// Returns the program index header.
    pub fn header(&self) -> &ProgramIndex {
        &self.header
    }

    /// Returns the buffer this binary was parsed from.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the shader blob (`DVLP`) shared by all entry points.
    pub fn program(&self) -> &ShaderProgram<'a> {
        &self.program
    }

    /// Returns all entry points in program-index order.
    pub fn entry_points(&self) -> &[EntryPoint<'a>] {
        &self.entry_points
    }

    /// Returns entry point `index`.
    pub fn entry_point(&self, index: usize) -> Result<&EntryPoint<'a>> {
        self.entry_points
            .get(index)
            .ok_or(FormatError::EntryPointOutOfRange {
                index,
                count: self.entry_points.len(),
            })
    }

    /// Returns a human-readable summary of the binary and its tables.
    pub fn debug_summary(&self) -> String {
        let mut out = String::new();
        use core::fmt::Write as _;

        let blob = &self.program.header;
        let _ = write!(
            &mut out,
            "DVLB programs={} DVLP version={} instructions={} swizzles={}",
            self.header.program_count, blob.version, blob.binary.count, blob.swizzles.count
        );

        for (idx, entry) in self.entry_points.iter().enumerate() {
            let h = &entry.header;
            let _ = write!(
                &mut out,
                "\n  [{idx:02}] DVLE @{:#x} {:?} main={} end={} constants={} labels={} outputs={} uniforms={} symbols={}B",
                entry.base,
                h.shader_type,
                h.main_offset_words,
                h.endmain_offset_words,
                h.constants.count,
                h.labels.count,
                h.output_registers.count,
                h.uniforms.count,
                h.symbols.count
            );
        }

        out
    }
}

/// The shader blob (`DVLP`): instruction words plus swizzle metadata.
#[derive(Clone, Copy)]
pub struct ShaderProgram<'a> {
    base: usize,
    header: ShaderBlobHeader,
    code: &'a [u8],
    swizzles: Table<'a, SwizzleInfo>,
}

impl fmt::Debug for ShaderProgram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("base", &self.base)
            .field("header", &self.header)
            .field("code_len", &self.code.len())
            .field("swizzles", &self.swizzles.len())
            .finish()
    }
}

impl<'a> ShaderProgram<'a> {
    /// Decodes the `DVLP` header at `base` and validates the regions it points to.
    pub fn parse_at(bytes: &'a [u8], base: usize) -> Result<Self> {
        let header = ShaderBlobHeader::parse_at(bytes, base)?;
        let code_start = header.binary.absolute(base)?;
        let code_len = table_len(header.binary.count, 4, "DVLP instruction stream")?;
        let code = region(bytes, code_start, code_len, "DVLP instruction stream")?;
        let swizzles = Table::parse(bytes, base, header.swizzles)?;
        trace!(base, code_start, code_len, "decoded DVLP header");
        Ok(ShaderProgram {
            base,
            header,
            code,
            swizzles,
        })
    }

    /// Absolute offset of the `DVLP` header.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Returns the `DVLP` header.
    pub fn header(&self) -> &ShaderBlobHeader {
        &self.header
    }

    /// Number of instruction words.
    pub fn instruction_count(&self) -> usize {
        self.code.len() / 4
    }

    /// Raw little-endian instruction stream.
    pub fn code_bytes(&self) -> &'a [u8] {
        self.code
    }

    /// Iterates over the instruction words.
    pub fn instructions(&self) -> impl ExactSizeIterator<Item = u32> + 'a {
        self.code
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
    }

    /// Returns instruction word `index`.
    pub fn instruction(&self, index: usize) -> Option<u32> {
        let start = index.checked_mul(4)?;
        let w = self.code.get(start..start.checked_add(4)?)?;
        Some(u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
    }

    /// The swizzle pattern table.
    pub fn swizzles(&self) -> Table<'a, SwizzleInfo> {
        self.swizzles
    }
}

/// One entry point (`DVLE`) and its tables.
#[derive(Clone, Copy)]
pub struct EntryPoint<'a> {
    base: usize,
    header: EntryPointHeader,
    constants: Table<'a, ConstantInfo>,
    labels: Table<'a, LabelInfo>,
    output_registers: Table<'a, OutputRegisterInfo>,
    uniforms: Table<'a, UniformInfo>,
    symbols: &'a [u8],
}

impl fmt::Debug for EntryPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("base", &self.base)
            .field("header", &self.header)
            .field("symbols_len", &self.symbols.len())
            .finish()
    }
}

/// A uniform together with its resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedUniform<'a> {
    /// The uniform table entry.
    pub info: UniformInfo,
    /// Name read from the symbol table.
    pub name: &'a str,
}

impl<'a> EntryPoint<'a> {
    /// Decodes the `DVLE` header at `base` and validates its five tables.
    pub fn parse_at(bytes: &'a [u8], base: usize) -> Result<Self> {
        let header = EntryPointHeader::parse_at(bytes, base)?;
        let constants = Table::parse(bytes, base, header.constants)?;
        let labels = Table::parse(bytes, base, header.labels)?;
        let output_registers = Table::parse(bytes, base, header.output_registers)?;
        let uniforms = Table::parse(bytes, base, header.uniforms)?;
        let symbols = symbol_table(bytes, base, header.symbols)?;
        Ok(EntryPoint {
            base,
            header,
            constants,
            labels,
            output_registers,
            uniforms,
            symbols,
        })
    }

    /// Absolute offset of the `DVLE` header.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Returns the `DVLE` header.
    pub fn header(&self) -> &EntryPointHeader {
        &self.header
    }

    /// The constant table.
    pub fn constants(&self) -> Table<'a, ConstantInfo> {
        self.constants
    }

    /// The label table.
    pub fn labels(&self) -> Table<'a, LabelInfo> {
        self.labels
    }

    /// The output register table.
    pub fn output_registers(&self) -> Table<'a, OutputRegisterInfo> {
        self.output_registers
    }

    /// The uniform table.
    pub fn uniforms(&self) -> Table<'a, UniformInfo> {
        self.uniforms
    }

    /// Raw bytes of the symbol table.
    pub fn symbol_table(&self) -> &'a [u8] {
        self.symbols
    }

    /// Reads the NUL-terminated name at `offset` within the symbol table.
    pub fn symbol(&self, offset: u32) -> Result<&'a str> {
        read_cstring(self.symbols, offset)
    }

    /// Resolves the name of a label.
    pub fn label_name(&self, label: &LabelInfo) -> Result<&'a str> {
        self.symbol(label.name_offset)
    }

    /// Resolves the name of a uniform.
    pub fn uniform_name(&self, uniform: &UniformInfo) -> Result<&'a str> {
        self.symbol(uniform.symbol_offset)
    }

    /// Pairs every uniform with its name, in table order.
    pub fn named_uniforms(&self) -> Result<Vec<NamedUniform<'a>>> {
        self.uniforms
            .iter()
            .map(|info| {
                Ok(NamedUniform {
                    info,
                    name: self.uniform_name(&info)?,
                })
            })
            .collect()
    }
}

fn symbol_table(bytes: &[u8], base: usize, range: TableRange) -> Result<&[u8]> {
    if range.is_empty() {
        return Ok(&[]);
    }
    let start = range.absolute(base)?;
    region(bytes, start, range.count as usize, "DVLE symbol table")
}
