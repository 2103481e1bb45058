//! Descriptor tables referenced by the `DVLP` and `DVLE` headers.
//!
//! Every table is a flat array of fixed-stride records. [`Table`] validates the
//! array's byte range once and then decodes entries lazily, in file order.

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::slice::ChunksExact;

use bitflags::bitflags;
use tracing::trace;

use crate::bitfield::{BitField, BitFlag, BitValue};
use crate::error::{FormatError, Result};
use crate::float24::Float24;
use crate::header::TableRange;
use crate::reader::{region, table_len};
use crate::register::{classify, ClassifiedRegister, RegisterType};

/// Hard cap on the number of entries any single table may declare.
pub const MAX_TABLE_ENTRIES: u32 = 1 << 16;

/// A fixed-stride record stored in a descriptor table.
pub trait TableEntry: Sized + Copy {
    /// Size of one encoded entry in bytes.
    const STRIDE: usize;
    /// Table name used in errors and logs.
    const NAME: &'static str;

    /// Decodes one entry from exactly [`Self::STRIDE`] bytes.
    fn decode(bytes: &[u8]) -> Self;

    /// Appends the encoded entry to `out`.
    fn encode(&self, out: &mut Vec<u8>);
}

/// Reads little-endian word `index` of an entry. Missing bytes read as zero.
fn word(bytes: &[u8], index: usize) -> u32 {
    let mut w = [0u8; 4];
    let start = index * 4;
    if let Some(src) = bytes.get(start..start + 4) {
        w.copy_from_slice(src);
    }
    u32::from_le_bytes(w)
}

fn push_words(out: &mut Vec<u8>, words: &[u32]) {
    for w in words {
        out.extend_from_slice(&w.to_le_bytes());
    }
}

/// A validated, zero-copy view of a descriptor table.
pub struct Table<'a, T> {
    data: &'a [u8],
    offset: usize,
    _entry: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Table<'_, T> {}

impl<T: TableEntry + fmt::Debug> fmt::Debug for Table<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: TableEntry> Table<'a, T> {
    /// Validates the table described by `range`, relative to the structure
    /// starting at `base` in `bytes`.
    ///
    /// A zero count yields an empty table regardless of the offset.
    pub fn parse(bytes: &'a [u8], base: usize, range: TableRange) -> Result<Self> {
        if range.count > MAX_TABLE_ENTRIES {
            return Err(FormatError::TooManyEntries {
                what: T::NAME,
                count: range.count,
                max: MAX_TABLE_ENTRIES,
            });
        }
        if range.is_empty() {
            return Ok(Self::empty());
        }
        let offset = range.absolute(base)?;
        let len = table_len(range.count, T::STRIDE, T::NAME)?;
        let data = region(bytes, offset, len, T::NAME)?;
        trace!(
            table = T::NAME,
            offset,
            count = range.count,
            stride = T::STRIDE,
            "decoded table range"
        );
        Ok(Table {
            data,
            offset,
            _entry: PhantomData,
        })
    }

    /// A table with no entries.
    pub fn empty() -> Self {
        Table {
            data: &[],
            offset: 0,
            _entry: PhantomData,
        }
    }

    /// Absolute byte offset of the first entry (zero for an empty table).
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Raw bytes covered by the table.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len() / T::STRIDE
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decodes entry `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(T::STRIDE)?;
        let end = start.checked_add(T::STRIDE)?;
        self.data.get(start..end).map(T::decode)
    }

    /// Iterates over all entries in file order.
    pub fn iter(&self) -> TableIter<'a, T> {
        TableIter {
            chunks: self.data.chunks_exact(T::STRIDE),
            _entry: PhantomData,
        }
    }

    /// Decodes every entry into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<'a, T: TableEntry> IntoIterator for Table<'a, T> {
    type Item = T;
    type IntoIter = TableIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: TableEntry> IntoIterator for &Table<'a, T> {
    type Item = T;
    type IntoIter = TableIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`Table`].
pub struct TableIter<'a, T> {
    chunks: ChunksExact<'a, u8>,
    _entry: PhantomData<fn() -> T>,
}

impl<T: TableEntry> Iterator for TableIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.chunks.next().map(T::decode)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<T: TableEntry> DoubleEndedIterator for TableIter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        self.chunks.next_back().map(T::decode)
    }
}

impl<T: TableEntry> ExactSizeIterator for TableIter<'_, T> {}
impl<T: TableEntry> FusedIterator for TableIter<'_, T> {}

/// An operand swizzle/mask descriptor.
///
/// Its bit layout belongs to the instruction set; the container only stores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SwizzlePattern(pub u32);

/// An entry of the `DVLP` swizzle table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SwizzleInfo {
    /// The operand descriptor.
    pub pattern: SwizzlePattern,
    /// Reserved; usually zero.
    pub unknown: u32,
}

impl TableEntry for SwizzleInfo {
    const STRIDE: usize = 8;
    const NAME: &'static str = "swizzle table";

    fn decode(bytes: &[u8]) -> Self {
        SwizzleInfo {
            pattern: SwizzlePattern(word(bytes, 0)),
            unknown: word(bytes, 1),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        push_words(out, &[self.pattern.0, self.unknown]);
    }
}

/// Type tag of a constant table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConstantType {
    /// Boolean uniform constant.
    #[default]
    Bool,
    /// Integer vector constant (four 8-bit lanes).
    Int,
    /// Float vector constant (four float24 lanes).
    Float,
    /// A tag this crate does not know about.
    Unknown(u32),
}

impl BitValue for ConstantType {
    type Storage = u32;
    const SIGNED: bool = false;

    fn from_storage(raw: u32) -> Self {
        match raw {
            0 => ConstantType::Bool,
            1 => ConstantType::Int,
            2 => ConstantType::Float,
            other => ConstantType::Unknown(other),
        }
    }

    fn into_storage(self) -> u32 {
        match self {
            ConstantType::Bool => 0,
            ConstantType::Int => 1,
            ConstantType::Float => 2,
            ConstantType::Unknown(raw) => raw,
        }
    }
}

/// The value of a constant, interpreted according to its type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantValue {
    /// Boolean constant.
    Bool(bool),
    /// Integer lanes `x, y, z, w`.
    Int([u8; 4]),
    /// Float lanes `x, y, z, w`.
    Float([Float24; 4]),
    /// Unknown type tag; the raw payload words.
    Unknown([u32; 4]),
}

type ConstantTypeField = BitField<0, 2, ConstantType>;
type ConstantRegister = BitField<16, 8, u32>;
type ConstantBool = BitFlag<0, u32>;

/// An entry of the `DVLE` constant table.
///
/// The four payload words are one storage area read in one of three ways
/// (boolean, integer lanes, float lanes); which one is meaningful depends on
/// [`ConstantInfo::constant_type`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConstantInfo {
    control: u32,
    value: [u32; 4],
}

impl ConstantInfo {
    /// Builds an entry from its raw words.
    pub const fn from_raw(control: u32, value: [u32; 4]) -> Self {
        ConstantInfo { control, value }
    }

    /// A float constant for register `c{register}`.
    pub fn float(register: u32, lanes: [Float24; 4]) -> Self {
        let mut c = ConstantInfo::default();
        c.set_constant_type(ConstantType::Float);
        c.set_register_id(register);
        c.set_float(lanes);
        c
    }

    /// An integer constant for register `i{register}`.
    pub fn int(register: u32, lanes: [u8; 4]) -> Self {
        let mut c = ConstantInfo::default();
        c.set_constant_type(ConstantType::Int);
        c.set_register_id(register);
        c.set_int(lanes);
        c
    }

    /// A boolean constant for register `b{register}`.
    pub fn bool(register: u32, value: bool) -> Self {
        let mut c = ConstantInfo::default();
        c.set_constant_type(ConstantType::Bool);
        c.set_register_id(register);
        c.set_bool(value);
        c
    }

    /// Raw control word (type tag and register id).
    pub const fn raw_control(&self) -> u32 {
        self.control
    }

    /// Raw payload words.
    pub const fn raw_value(&self) -> [u32; 4] {
        self.value
    }

    /// Replaces the raw payload words.
    pub fn set_raw_value(&mut self, value: [u32; 4]) {
        self.value = value;
    }

    /// Type tag (bits 0..2 of the control word).
    pub fn constant_type(&self) -> ConstantType {
        ConstantTypeField::get(self.control)
    }

    /// Sets the type tag.
    pub fn set_constant_type(&mut self, ty: ConstantType) {
        ConstantTypeField::set(&mut self.control, ty);
    }

    /// Target register index within the class selected by the type tag
    /// (bits 16..24 of the control word).
    pub fn register_id(&self) -> u32 {
        ConstantRegister::get(self.control)
    }

    /// Sets the target register index.
    pub fn set_register_id(&mut self, id: u32) {
        ConstantRegister::set(&mut self.control, id);
    }

    /// The payload read as a boolean (bit 0 of the first word).
    pub fn as_bool(&self) -> bool {
        ConstantBool::get(self.value[0])
    }

    /// Stores a boolean payload.
    pub fn set_bool(&mut self, value: bool) {
        ConstantBool::set(&mut self.value[0], value);
    }

    /// The payload read as four 8-bit lanes (the first four payload bytes).
    pub fn as_int(&self) -> [u8; 4] {
        self.value[0].to_le_bytes()
    }

    /// Stores four 8-bit lanes.
    pub fn set_int(&mut self, lanes: [u8; 4]) {
        self.value[0] = u32::from_le_bytes(lanes);
    }

    /// The payload read as four float24 lanes.
    pub fn as_float(&self) -> [Float24; 4] {
        self.value.map(Float24::from_raw)
    }

    /// Stores four float24 lanes.
    pub fn set_float(&mut self, lanes: [Float24; 4]) {
        self.value = lanes.map(Float24::to_raw);
    }

    /// The payload interpreted according to the type tag.
    pub fn value(&self) -> ConstantValue {
        match self.constant_type() {
            ConstantType::Bool => ConstantValue::Bool(self.as_bool()),
            ConstantType::Int => ConstantValue::Int(self.as_int()),
            ConstantType::Float => ConstantValue::Float(self.as_float()),
            ConstantType::Unknown(_) => ConstantValue::Unknown(self.value),
        }
    }
}

impl TableEntry for ConstantInfo {
    const STRIDE: usize = 20;
    const NAME: &'static str = "constant table";

    fn decode(bytes: &[u8]) -> Self {
        ConstantInfo {
            control: word(bytes, 0),
            value: [word(bytes, 1), word(bytes, 2), word(bytes, 3), word(bytes, 4)],
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        push_words(out, &[self.control]);
        push_words(out, &self.value);
    }
}

type LabelId = BitField<0, 8, u32>;

/// An entry of the `DVLE` label table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LabelInfo {
    id_word: u32,
    /// Offset of the labelled instruction, in words.
    pub program_offset: u32,
    /// Reserved.
    pub unknown: u32,
    /// Offset of the label's name within the symbol table.
    pub name_offset: u32,
}

impl LabelInfo {
    /// Creates a label entry.
    pub fn new(id: u32, program_offset: u32, name_offset: u32) -> Self {
        let mut label = LabelInfo {
            id_word: 0,
            program_offset,
            unknown: 0,
            name_offset,
        };
        label.set_id(id);
        label
    }

    /// Label id (low 8 bits of the first word).
    pub fn id(&self) -> u32 {
        LabelId::get(self.id_word)
    }

    /// Sets the label id.
    pub fn set_id(&mut self, id: u32) {
        LabelId::set(&mut self.id_word, id);
    }

    /// The full first word, including the bits above the id.
    pub const fn raw_id_word(&self) -> u32 {
        self.id_word
    }
}

impl TableEntry for LabelInfo {
    const STRIDE: usize = 16;
    const NAME: &'static str = "label table";

    fn decode(bytes: &[u8]) -> Self {
        LabelInfo {
            id_word: word(bytes, 0),
            program_offset: word(bytes, 1),
            unknown: word(bytes, 2),
            name_offset: word(bytes, 3),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        push_words(
            out,
            &[self.id_word, self.program_offset, self.unknown, self.name_offset],
        );
    }
}

/// Semantic of an output register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputRegisterType {
    /// Clip-space position.
    #[default]
    Position,
    /// Normal quaternion.
    Quaternion,
    /// Vertex color.
    Color,
    /// Texture coordinate 0.
    TexCoord0,
    /// Texture coordinate 0, `w` component.
    TexCoord0W,
    /// Texture coordinate 1.
    TexCoord1,
    /// Texture coordinate 2.
    TexCoord2,
    /// View vector.
    View,
    /// A semantic this crate does not know about (including the reserved `7`).
    Unknown(u64),
}

impl OutputRegisterType {
    /// Assembler name of the semantic; unknown semantics map to `"out.unk"`.
    pub const fn semantic_name(self) -> &'static str {
        match self {
            OutputRegisterType::Position => "out.pos",
            OutputRegisterType::Quaternion => "out.quat",
            OutputRegisterType::Color => "out.col",
            OutputRegisterType::TexCoord0 => "out.tex0",
            OutputRegisterType::TexCoord0W => "out.texw",
            OutputRegisterType::TexCoord1 => "out.tex1",
            OutputRegisterType::TexCoord2 => "out.tex2",
            OutputRegisterType::View => "out.view",
            OutputRegisterType::Unknown(_) => "out.unk",
        }
    }
}

impl BitValue for OutputRegisterType {
    type Storage = u64;
    const SIGNED: bool = false;

    fn from_storage(raw: u64) -> Self {
        match raw {
            0 => OutputRegisterType::Position,
            1 => OutputRegisterType::Quaternion,
            2 => OutputRegisterType::Color,
            3 => OutputRegisterType::TexCoord0,
            4 => OutputRegisterType::TexCoord0W,
            5 => OutputRegisterType::TexCoord1,
            6 => OutputRegisterType::TexCoord2,
            8 => OutputRegisterType::View,
            other => OutputRegisterType::Unknown(other),
        }
    }

    fn into_storage(self) -> u64 {
        match self {
            OutputRegisterType::Position => 0,
            OutputRegisterType::Quaternion => 1,
            OutputRegisterType::Color => 2,
            OutputRegisterType::TexCoord0 => 3,
            OutputRegisterType::TexCoord0W => 4,
            OutputRegisterType::TexCoord1 => 5,
            OutputRegisterType::TexCoord2 => 6,
            OutputRegisterType::View => 8,
            OutputRegisterType::Unknown(raw) => raw,
        }
    }
}

bitflags! {
    /// Components written to an output register.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct ComponentMask: u8 {
        /// The `x` component.
        const X = 1 << 0;
        /// The `y` component.
        const Y = 1 << 1;
        /// The `z` component.
        const Z = 1 << 2;
        /// The `w` component.
        const W = 1 << 3;
    }
}

impl ComponentMask {
    /// Letters of the set components, in `xyzw` order.
    pub fn letters(self) -> String {
        [
            (ComponentMask::X, 'x'),
            (ComponentMask::Y, 'y'),
            (ComponentMask::Z, 'z'),
            (ComponentMask::W, 'w'),
        ]
        .into_iter()
        .filter(|(bit, _)| self.contains(*bit))
        .map(|(_, letter)| letter)
        .collect()
    }
}

type OutputType = BitField<0, 16, OutputRegisterType>;
type OutputId = BitField<16, 16, u64>;
type OutputMask = BitField<32, 4, u64>;
type OutputDescriptor = BitField<32, 32, u64>;

/// An entry of the `DVLE` output register table: one packed 64-bit word.
///
/// The component mask occupies the low nibble of the descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OutputRegisterInfo(u64);

impl OutputRegisterInfo {
    /// Wraps a raw packed word.
    pub const fn from_raw(raw: u64) -> Self {
        OutputRegisterInfo(raw)
    }

    /// Creates an entry for output register `o{id}`.
    pub fn new(ty: OutputRegisterType, id: u16, mask: ComponentMask) -> Self {
        let mut out = OutputRegisterInfo::default();
        out.set_output_type(ty);
        out.set_id(id);
        out.set_component_mask(mask);
        out
    }

    /// The packed word.
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Semantic type (bits 0..16).
    pub fn output_type(&self) -> OutputRegisterType {
        OutputType::get(self.0)
    }

    /// Sets the semantic type.
    pub fn set_output_type(&mut self, ty: OutputRegisterType) {
        OutputType::set(&mut self.0, ty);
    }

    /// Output register number (bits 16..32).
    pub fn id(&self) -> u16 {
        OutputId::get(self.0) as u16
    }

    /// Sets the output register number.
    pub fn set_id(&mut self, id: u16) {
        OutputId::set(&mut self.0, u64::from(id));
    }

    /// Component mask (bits 32..36).
    pub fn component_mask(&self) -> ComponentMask {
        ComponentMask::from_bits_truncate(OutputMask::get(self.0) as u8)
    }

    /// Sets the component mask without touching the rest of the descriptor.
    pub fn set_component_mask(&mut self, mask: ComponentMask) {
        OutputMask::set(&mut self.0, u64::from(mask.bits()));
    }

    /// Descriptor payload (bits 32..64, aliasing the component mask).
    pub fn descriptor(&self) -> u32 {
        OutputDescriptor::get(self.0) as u32
    }

    /// Replaces the descriptor payload, including the component mask.
    pub fn set_descriptor(&mut self, descriptor: u32) {
        OutputDescriptor::set(&mut self.0, u64::from(descriptor));
    }

    /// Assembler name of the semantic (`"out.pos"`, ..., `"out.unk"`).
    pub fn semantic_name(&self) -> &'static str {
        self.output_type().semantic_name()
    }

    /// Component mask as letters, e.g. `"xyw"`.
    pub fn mask_letters(&self) -> String {
        self.component_mask().letters()
    }
}

impl TableEntry for OutputRegisterInfo {
    const STRIDE: usize = 8;
    const NAME: &'static str = "output register table";

    fn decode(bytes: &[u8]) -> Self {
        let low = u64::from(word(bytes, 0));
        let high = u64::from(word(bytes, 1));
        OutputRegisterInfo(low | (high << 32))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0.to_le_bytes());
    }
}

type RegStart = BitField<0, 16, u32>;
type RegEnd = BitField<16, 16, u32>;

/// An entry of the `DVLE` uniform table.
///
/// The uniform occupies the inclusive register range `[reg_start, reg_end]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UniformInfo {
    /// Offset of the uniform's name within the symbol table.
    pub symbol_offset: u32,
    regs: u32,
}

impl UniformInfo {
    /// Creates a uniform entry spanning raw registers `start..=end`.
    pub fn new(symbol_offset: u32, start: u16, end: u16) -> Self {
        let mut uniform = UniformInfo {
            symbol_offset,
            regs: 0,
        };
        uniform.set_range(start, end);
        uniform
    }

    /// The packed register range word.
    pub const fn raw_regs(&self) -> u32 {
        self.regs
    }

    /// First raw register number.
    pub fn reg_start(&self) -> u32 {
        RegStart::get(self.regs)
    }

    /// Last raw register number (inclusive).
    pub fn reg_end(&self) -> u32 {
        RegEnd::get(self.regs)
    }

    /// Sets both ends of the register range.
    pub fn set_range(&mut self, start: u16, end: u16) {
        RegStart::set(&mut self.regs, u32::from(start));
        RegEnd::set(&mut self.regs, u32::from(end));
    }

    /// Classification of the first register.
    pub fn start(&self) -> ClassifiedRegister {
        classify(self.reg_start())
    }

    /// Classification of the last register.
    pub fn end(&self) -> ClassifiedRegister {
        classify(self.reg_end())
    }

    /// Register class of the first register.
    pub fn start_type(&self) -> RegisterType {
        self.start().ty
    }

    /// Register class of the last register.
    pub fn end_type(&self) -> RegisterType {
        self.end().ty
    }

    /// Index of the first register within its class, or `-1`.
    pub fn start_index(&self) -> i32 {
        self.start().index
    }

    /// Index of the last register within its class, or `-1`.
    pub fn end_index(&self) -> i32 {
        self.end().index
    }
}

impl TableEntry for UniformInfo {
    const STRIDE: usize = 8;
    const NAME: &'static str = "uniform table";

    fn decode(bytes: &[u8]) -> Self {
        UniformInfo {
            symbol_offset: word(bytes, 0),
            regs: word(bytes, 1),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        push_words(out, &[self.symbol_offset, self.regs]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode_all<T: TableEntry>(entries: &[T]) -> Vec<u8> {
        let mut out = Vec::new();
        for e in entries {
            e.encode(&mut out);
        }
        out
    }

    #[test]
    fn strides_match_encoded_sizes() {
        assert_eq!(encode_all(&[SwizzleInfo::default()]).len(), SwizzleInfo::STRIDE);
        assert_eq!(encode_all(&[ConstantInfo::default()]).len(), ConstantInfo::STRIDE);
        assert_eq!(encode_all(&[LabelInfo::default()]).len(), LabelInfo::STRIDE);
        assert_eq!(
            encode_all(&[OutputRegisterInfo::default()]).len(),
            OutputRegisterInfo::STRIDE
        );
        assert_eq!(encode_all(&[UniformInfo::default()]).len(), UniformInfo::STRIDE);
    }

    #[test]
    fn table_entries_come_from_their_own_stride() {
        let uniforms = [
            UniformInfo::new(0, 0x10, 0x13),
            UniformInfo::new(5, 0x70, 0x70),
            UniformInfo::new(9, 0x78, 0x7F),
        ];
        let mut bytes = vec![0xAAu8; 6];
        bytes.extend(encode_all(&uniforms));
        bytes.extend_from_slice(&[0xBB; 3]);

        let table = Table::<UniformInfo>::parse(&bytes, 2, TableRange::new(4, 3)).unwrap();
        assert_eq!(table.offset(), 6);
        assert_eq!(table.len(), 3);
        assert_eq!(table.to_vec(), uniforms.to_vec());
        assert_eq!(table.get(1), Some(uniforms[1]));
        assert_eq!(table.get(3), None);
        assert_eq!(table.iter().rev().next(), Some(uniforms[2]));
    }

    #[test]
    fn zero_count_is_an_empty_table() {
        let table = Table::<LabelInfo>::parse(&[], 0, TableRange::new(0xFFFF_FFF0, 0)).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
        assert_eq!(table.to_vec(), Vec::new());
    }

    #[test]
    fn tables_past_the_buffer_are_truncated() {
        let bytes = [0u8; 20];
        assert_eq!(
            Table::<OutputRegisterInfo>::parse(&bytes, 4, TableRange::new(8, 2)).unwrap_err(),
            FormatError::Truncated {
                what: "output register table",
                offset: 12,
                len: 16,
                available: 20,
            }
        );
        assert!(matches!(
            Table::<ConstantInfo>::parse(&bytes, 0, TableRange::new(0, MAX_TABLE_ENTRIES + 1)),
            Err(FormatError::TooManyEntries { .. })
        ));
    }

    #[test]
    fn constant_views_alias_the_payload() {
        let mut c = ConstantInfo::float(
            5,
            [Float24::ONE, Float24::ZERO, Float24::from_f32(-2.0), Float24::from_f32(0.5)],
        );
        assert_eq!(c.constant_type(), ConstantType::Float);
        assert_eq!(c.register_id(), 5);
        assert_eq!(c.raw_control(), 0x0005_0002);
        match c.value() {
            ConstantValue::Float(lanes) => {
                let lanes = lanes.map(Float24::to_f32);
                assert_eq!(lanes, [1.0, 0.0, -2.0, 0.5]);
            }
            other => panic!("unexpected value {other:?}"),
        }

        c.set_constant_type(ConstantType::Int);
        assert_eq!(c.as_int(), [0x00, 0x00, 0x3F, 0x00]);
        assert_eq!(c.register_id(), 5);

        let b = ConstantInfo::bool(3, true);
        assert_eq!(b.value(), ConstantValue::Bool(true));
        assert_eq!(b.raw_value(), [1, 0, 0, 0]);

        let i = ConstantInfo::int(1, [1, 2, 3, 4]);
        assert_eq!(i.value(), ConstantValue::Int([1, 2, 3, 4]));
        assert_eq!(i.raw_value()[0], 0x0403_0201);

        let unknown = ConstantInfo::from_raw(3, [7, 8, 9, 10]);
        assert_eq!(unknown.constant_type(), ConstantType::Unknown(3));
        assert_eq!(unknown.value(), ConstantValue::Unknown([7, 8, 9, 10]));
    }

    #[test]
    fn constant_decodes_from_le_bytes() {
        let mut bytes = Vec::new();
        push_words(&mut bytes, &[0x0012_0001, 0x0403_0201, 0, 0, 0]);
        let c = ConstantInfo::decode(&bytes);
        assert_eq!(c.constant_type(), ConstantType::Int);
        assert_eq!(c.register_id(), 0x12);
        assert_eq!(c.as_int(), [1, 2, 3, 4]);
    }

    #[test]
    fn label_id_is_the_low_byte() {
        let mut bytes = Vec::new();
        push_words(&mut bytes, &[0xABCD_EF07, 0x20, 0xDEAD, 0x4]);
        let label = LabelInfo::decode(&bytes);
        assert_eq!(label.id(), 7);
        assert_eq!(label.program_offset, 0x20);
        assert_eq!(label.unknown, 0xDEAD);
        assert_eq!(label.name_offset, 4);
        assert_eq!(label.raw_id_word(), 0xABCD_EF07);

        let built = LabelInfo::new(0x1FF, 3, 0);
        assert_eq!(built.id(), 0xFF);
    }

    #[test]
    fn output_register_fields() {
        let raw = 0x1234_5679_0003_0002u64;
        let out = OutputRegisterInfo::decode(&raw.to_le_bytes());
        assert_eq!(out.output_type(), OutputRegisterType::Color);
        assert_eq!(out.semantic_name(), "out.col");
        assert_eq!(out.id(), 3);
        assert_eq!(out.component_mask(), ComponentMask::X | ComponentMask::W);
        assert_eq!(out.mask_letters(), "xw");
        assert_eq!(out.descriptor(), 0x1234_5679);

        let mut out = out;
        out.set_component_mask(ComponentMask::all());
        assert_eq!(out.descriptor(), 0x1234_567F);
        assert_eq!(out.id(), 3);
        assert_eq!(out.output_type(), OutputRegisterType::Color);
    }

    #[test]
    fn unknown_output_semantics_fall_back() {
        for raw_type in [7u64, 9, 0xFFFF] {
            let raw = raw_type | (1 << 16) | (0b0110 << 32);
            let out = OutputRegisterInfo::from_raw(raw);
            assert_eq!(out.output_type(), OutputRegisterType::Unknown(raw_type));
            assert_eq!(out.semantic_name(), "out.unk");
            assert_eq!(out.mask_letters(), "yz");
            assert_eq!(out.id(), 1);
        }

        let names: Vec<_> = [0u64, 1, 2, 3, 4, 5, 6, 8]
            .into_iter()
            .map(|t| OutputRegisterInfo::from_raw(t).semantic_name())
            .collect();
        assert_eq!(
            names,
            [
                "out.pos", "out.quat", "out.col", "out.tex0", "out.texw", "out.tex1", "out.tex2",
                "out.view"
            ]
        );
    }

    #[test]
    fn uniform_range_classification() {
        let u = UniformInfo::new(0, 0x10, 0x13);
        assert_eq!(u.raw_regs(), 0x0013_0010);
        assert_eq!(u.start_type(), RegisterType::FloatUniform);
        assert_eq!(u.end_type(), RegisterType::FloatUniform);
        assert_eq!((u.start_index(), u.end_index()), (0, 3));

        let odd = UniformInfo::new(0, 0x73, 0x75);
        assert_eq!(odd.start_type(), RegisterType::IntUniform);
        assert_eq!(odd.end_type(), RegisterType::Unknown);
        assert_eq!(odd.end_index(), -1);
    }

    #[test]
    fn default_records_are_zeroed() {
        assert_eq!(encode_all(&[ConstantInfo::default()]), vec![0u8; 20]);
        assert_eq!(encode_all(&[UniformInfo::default()]), vec![0u8; 8]);
        assert_eq!(OutputRegisterInfo::default().output_type(), OutputRegisterType::Position);
    }
}
