use crate::header::{
    EntryPointHeader, ProgramIndex, ShaderBlobHeader, ShaderType, TableRange, DVLB_MAGIC,
    DVLE_MAGIC, DVLP_MAGIC,
};
use crate::table::{
    ConstantInfo, LabelInfo, OutputRegisterInfo, SwizzleInfo, TableEntry, UniformInfo,
};

/// Builds a structurally valid shader binary.
///
/// Layout:
/// - `DVLB` header and one offset per entry point,
/// - `DVLP` header, instruction words, swizzle table, filename symbol,
/// - one `DVLE` per entry point: header, constant / label / output / uniform
///   tables, symbol table.
///
/// Every region is 4-byte aligned and every offset is relative to the header
/// that stores it.
#[derive(Debug, Clone, Default)]
pub struct ShbinBuilder {
    version: u32,
    code: Vec<u32>,
    swizzles: Vec<SwizzleInfo>,
    filename: String,
    entry_points: Vec<EntryPointBuilder>,
}

/// Builder for one `DVLE` entry point; see [`ShbinBuilder::entry_point`].
#[derive(Debug, Clone, Default)]
pub struct EntryPointBuilder {
    shader_type: ShaderType,
    main_offset_words: u32,
    endmain_offset_words: u32,
    constants: Vec<ConstantInfo>,
    labels: Vec<LabelInfo>,
    outputs: Vec<OutputRegisterInfo>,
    uniforms: Vec<UniformInfo>,
    symbols: Vec<u8>,
}

impl EntryPointBuilder {
    /// Starts an entry point of the given kind.
    pub fn new(shader_type: ShaderType) -> Self {
        EntryPointBuilder {
            shader_type,
            ..Default::default()
        }
    }

    /// Sets the main / end-of-main instruction offsets (in words).
    pub fn main(mut self, main_offset_words: u32, endmain_offset_words: u32) -> Self {
        self.main_offset_words = main_offset_words;
        self.endmain_offset_words = endmain_offset_words;
        self
    }

    /// Appends `name` to the symbol table and returns its offset.
    pub fn push_symbol(&mut self, name: &str) -> u32 {
        let offset = u32::try_from(self.symbols.len()).expect("symbol table too large");
        self.symbols.extend_from_slice(name.as_bytes());
        self.symbols.push(0);
        offset
    }

    /// Appends a constant table entry.
    pub fn constant(mut self, constant: ConstantInfo) -> Self {
        self.constants.push(constant);
        self
    }

    /// Appends a named label.
    pub fn label(mut self, id: u32, program_offset: u32, name: &str) -> Self {
        let name_offset = self.push_symbol(name);
        self.labels.push(LabelInfo::new(id, program_offset, name_offset));
        self
    }

    /// Appends a label entry as-is (its name offset is not checked).
    pub fn raw_label(mut self, label: LabelInfo) -> Self {
        self.labels.push(label);
        self
    }

    /// Appends an output register entry.
    pub fn output(mut self, output: OutputRegisterInfo) -> Self {
        self.outputs.push(output);
        self
    }

    /// Appends a named uniform spanning raw registers `start..=end`.
    pub fn uniform(mut self, name: &str, start: u16, end: u16) -> Self {
        let symbol_offset = self.push_symbol(name);
        self.uniforms.push(UniformInfo::new(symbol_offset, start, end));
        self
    }

    /// Appends a uniform entry as-is (its symbol offset is not checked).
    pub fn raw_uniform(mut self, uniform: UniformInfo) -> Self {
        self.uniforms.push(uniform);
        self
    }

    fn encode(&self, base: usize, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + EntryPointHeader::SIZE, 0);

        let constants = append_table(out, base, &self.constants);
        let labels = append_table(out, base, &self.labels);
        let output_registers = append_table(out, base, &self.outputs);
        let uniforms = append_table(out, base, &self.uniforms);
        let symbols = TableRange::new(
            relative(out.len(), base),
            u32::try_from(self.symbols.len()).expect("symbol table too large"),
        );
        out.extend_from_slice(&self.symbols);
        pad_to_word(out);

        let header = EntryPointHeader {
            magic: DVLE_MAGIC,
            shader_type: self.shader_type,
            main_offset_words: self.main_offset_words,
            endmain_offset_words: self.endmain_offset_words,
            constants,
            labels,
            output_registers,
            uniforms,
            symbols,
        };
        out[start..start + EntryPointHeader::SIZE].copy_from_slice(&header.to_le_bytes());
    }
}

impl ShbinBuilder {
    /// Starts an empty binary.
    pub fn new() -> Self {
        ShbinBuilder::default()
    }

    /// Sets the `DVLP` version field.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Sets the instruction words.
    pub fn code(mut self, words: &[u32]) -> Self {
        self.code = words.to_vec();
        self
    }

    /// Appends a swizzle table entry.
    pub fn swizzle(mut self, swizzle: SwizzleInfo) -> Self {
        self.swizzles.push(swizzle);
        self
    }

    /// Sets the filename symbol stored after the swizzle table.
    pub fn filename(mut self, name: &str) -> Self {
        self.filename = name.to_owned();
        self
    }

    /// Appends an entry point.
    pub fn entry_point(mut self, entry_point: EntryPointBuilder) -> Self {
        self.entry_points.push(entry_point);
        self
    }

    /// Serializes the binary.
    pub fn build(&self) -> Vec<u8> {
        let program_count =
            u32::try_from(self.entry_points.len()).expect("too many entry points");
        let index = ProgramIndex {
            magic: DVLB_MAGIC,
            program_count,
        };

        let mut out = Vec::new();
        out.extend_from_slice(&index.to_le_bytes());
        let offsets_pos = out.len();
        out.resize(offsets_pos + 4 * self.entry_points.len(), 0);

        let dvlp = out.len();
        out.resize(dvlp + ShaderBlobHeader::SIZE, 0);
        let binary = TableRange::new(
            relative(out.len(), dvlp),
            u32::try_from(self.code.len()).expect("instruction stream too large"),
        );
        for word in &self.code {
            out.extend_from_slice(&word.to_le_bytes());
        }
        let swizzles = append_table(&mut out, dvlp, &self.swizzles);
        let filename_symbol_offset = relative(out.len(), dvlp);
        out.extend_from_slice(self.filename.as_bytes());
        out.push(0);
        pad_to_word(&mut out);

        let blob = ShaderBlobHeader {
            magic: DVLP_MAGIC,
            version: self.version,
            binary,
            swizzles,
            filename_symbol_offset,
        };
        out[dvlp..dvlp + ShaderBlobHeader::SIZE].copy_from_slice(&blob.to_le_bytes());

        for (i, entry) in self.entry_points.iter().enumerate() {
            let base = out.len();
            let pos = offsets_pos + 4 * i;
            out[pos..pos + 4].copy_from_slice(&relative(base, 0).to_le_bytes());
            entry.encode(base, &mut out);
        }

        out
    }
}

fn relative(pos: usize, base: usize) -> u32 {
    u32::try_from(pos - base).expect("offset does not fit in u32")
}

fn pad_to_word(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

fn append_table<T: TableEntry>(out: &mut Vec<u8>, base: usize, entries: &[T]) -> TableRange {
    let range = TableRange::new(
        relative(out.len(), base),
        u32::try_from(entries.len()).expect("table too large"),
    );
    for entry in entries {
        entry.encode(out);
    }
    range
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShaderBinary;

    #[test]
    fn build_roundtrips_through_parser() {
        let bytes = ShbinBuilder::new()
            .code(&[0x1111_1111, 0x2222_2222])
            .entry_point(EntryPointBuilder::new(ShaderType::Vertex).main(0, 1))
            .build();

        let binary = ShaderBinary::parse(&bytes).expect("built binary should parse");
        assert_eq!(binary.header().program_count, 1);
        assert_eq!(binary.program().base(), 12);
        assert_eq!(
            binary.program().instructions().collect::<Vec<_>>(),
            [0x1111_1111, 0x2222_2222]
        );
        assert_eq!(binary.entry_points().len(), 1);
        assert_eq!(binary.entry_points()[0].header().endmain_offset_words, 1);
    }
}
