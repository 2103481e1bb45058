//! Semantic cross-checks that decoding deliberately does not enforce.
//!
//! A binary that decodes successfully can still be inconsistent, e.g. a uniform
//! whose register range starts in the float bank and ends in the integer bank.
//! These checks report such problems without rejecting the binary.

use core::fmt;

use tracing::debug;

use crate::container::ShaderBinary;
use crate::error::FormatError;
use crate::register::RegisterType;

/// Which table a symbol reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolOwner {
    /// A label table entry.
    Label,
    /// A uniform table entry.
    Uniform,
}

/// A semantic problem found in a decoded shader binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The two ends of a uniform's register range fall in different classes.
    UniformRangeSpansClasses {
        /// Entry point index.
        entry_point: usize,
        /// Uniform table index.
        uniform: usize,
        /// Class of `reg_start`.
        start: RegisterType,
        /// Class of `reg_end`.
        end: RegisterType,
    },
    /// A uniform's register range ends before it starts.
    UniformRangeReversed {
        /// Entry point index.
        entry_point: usize,
        /// Uniform table index.
        uniform: usize,
        /// Raw `reg_start`.
        reg_start: u32,
        /// Raw `reg_end`.
        reg_end: u32,
    },
    /// A label points past the end of the instruction stream.
    LabelOutOfProgram {
        /// Entry point index.
        entry_point: usize,
        /// Label table index.
        label: usize,
        /// Offset in words.
        program_offset: u32,
        /// Instruction stream length in words.
        instruction_count: usize,
    },
    /// The main or end-of-main offset does not name an instruction of the stream.
    EntryOutOfProgram {
        /// Entry point index.
        entry_point: usize,
        /// Offset in words.
        offset_words: u32,
        /// Instruction stream length in words.
        instruction_count: usize,
    },
    /// A label or uniform name cannot be read from the symbol table.
    UnresolvedSymbol {
        /// Entry point index.
        entry_point: usize,
        /// Owning table.
        owner: SymbolOwner,
        /// Index within the owning table.
        index: usize,
        /// The resolution failure.
        error: FormatError,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::UniformRangeSpansClasses {
                entry_point,
                uniform,
                start,
                end,
            } => write!(
                f,
                "entry point {entry_point} uniform {uniform}: range starts in {start:?} but ends in {end:?}"
            ),
            ValidationIssue::UniformRangeReversed {
                entry_point,
                uniform,
                reg_start,
                reg_end,
            } => write!(
                f,
                "entry point {entry_point} uniform {uniform}: range end {reg_end:#x} precedes start {reg_start:#x}"
            ),
            ValidationIssue::LabelOutOfProgram {
                entry_point,
                label,
                program_offset,
                instruction_count,
            } => write!(
                f,
                "entry point {entry_point} label {label}: offset {program_offset} is past {instruction_count} instructions"
            ),
            ValidationIssue::EntryOutOfProgram {
                entry_point,
                offset_words,
                instruction_count,
            } => write!(
                f,
                "entry point {entry_point}: offset {offset_words} is past {instruction_count} instructions"
            ),
            ValidationIssue::UnresolvedSymbol {
                entry_point,
                owner,
                index,
                error,
            } => write!(f, "entry point {entry_point} {owner:?} {index}: {error}"),
        }
    }
}

/// Cross-checks every entry point of `binary` and returns the problems found.
pub fn validate(binary: &ShaderBinary<'_>) -> Vec<ValidationIssue> {
    let instruction_count = binary.program().instruction_count();
    let mut issues = Vec::new();

    for (entry_point, entry) in binary.entry_points().iter().enumerate() {
        let header = entry.header();
        // Both offsets index an instruction, so they must be below the count.
        for offset_words in [header.main_offset_words, header.endmain_offset_words] {
            if offset_words as usize >= instruction_count {
                issues.push(ValidationIssue::EntryOutOfProgram {
                    entry_point,
                    offset_words,
                    instruction_count,
                });
            }
        }

        for (index, label) in entry.labels().iter().enumerate() {
            // A label may sit at `instruction_count` to mark the end of the code.
            if label.program_offset as usize > instruction_count {
                issues.push(ValidationIssue::LabelOutOfProgram {
                    entry_point,
                    label: index,
                    program_offset: label.program_offset,
                    instruction_count,
                });
            }
            if let Err(error) = entry.label_name(&label) {
                issues.push(ValidationIssue::UnresolvedSymbol {
                    entry_point,
                    owner: SymbolOwner::Label,
                    index,
                    error,
                });
            }
        }

        for (index, uniform) in entry.uniforms().iter().enumerate() {
            let (start, end) = (uniform.start_type(), uniform.end_type());
            if start != end {
                issues.push(ValidationIssue::UniformRangeSpansClasses {
                    entry_point,
                    uniform: index,
                    start,
                    end,
                });
            }
            if uniform.reg_end() < uniform.reg_start() {
                issues.push(ValidationIssue::UniformRangeReversed {
                    entry_point,
                    uniform: index,
                    reg_start: uniform.reg_start(),
                    reg_end: uniform.reg_end(),
                });
            }
            if let Err(error) = entry.uniform_name(&uniform) {
                issues.push(ValidationIssue::UnresolvedSymbol {
                    entry_point,
                    owner: SymbolOwner::Uniform,
                    index,
                    error,
                });
            }
        }
    }

    for issue in &issues {
        debug!(%issue, "shader binary validation issue");
    }
    issues
}
