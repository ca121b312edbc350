//! Top-level assembler pipeline.
//!
//! Wires the phases together:
//!
//! 1. **Pass 1**: parse every line and assign addresses and labels
//! 2. **Pass 2**: encode instructions with labels resolved
//!
//! [`assemble_source`] works on text in memory; [`assemble`] reads a file
//! first.

use std::fmt;
use std::fs;
use std::path::Path;

use ebpf_core::INSTRUCTION_WIDTH;

use crate::encoder::encode_line;
use crate::errors::{AssembleError, AssembleFileError};
use crate::parser::{parse_line, ParsedLine};
use crate::symbols::{assign_addresses_with_lines, Assignment};

/// Result of assembly: the program image and its listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleResult {
    /// Assembled program, ready for `Machine::load`.
    pub binary: Vec<u8>,
    /// One entry per emitted instruction, in address order.
    pub listing: Vec<ListingEntry>,
}

impl AssembleResult {
    /// Iterates the program one instruction word at a time.
    pub fn words(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.binary.chunks_exact(INSTRUCTION_WIDTH)
    }
}

/// An entry in the address-to-source listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Byte address of the instruction.
    pub address: u64,
    /// Encoded instruction word.
    pub bytes: [u8; INSTRUCTION_WIDTH],
    /// Source line text, trimmed.
    pub source: String,
    /// 1-based source line number.
    pub line: usize,
}

impl fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:", self.address)?;
        for byte in self.bytes {
            write!(f, " {byte:02x}")?;
        }
        write!(f, "  {}", self.source)
    }
}

/// Assembles source text into a program image.
///
/// # Errors
///
/// Returns the first [`AssembleError`] raised by parsing, label assignment,
/// or encoding.
pub fn assemble_source(source: &str) -> Result<AssembleResult, AssembleError> {
    let texts: Vec<&str> = source.lines().collect();

    let parsed = texts
        .iter()
        .enumerate()
        .map(|(i, text)| parse_line(text, i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    let source_lines: Vec<usize> = (1..=parsed.len()).collect();
    let assignment = assign_addresses_with_lines(&parsed, &source_lines)?;

    encode_pass2(&assignment, &texts)
}

/// Reads and assembles the source file at `path`.
///
/// # Errors
///
/// Returns [`AssembleFileError::Read`] when the file cannot be read and
/// [`AssembleFileError::Assemble`] when its contents do not assemble.
pub fn assemble(path: &Path) -> Result<AssembleResult, AssembleFileError> {
    let source = fs::read_to_string(path).map_err(|source| AssembleFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(assemble_source(&source)?)
}

fn encode_pass2(assignment: &Assignment, texts: &[&str]) -> Result<AssembleResult, AssembleError> {
    let mut binary = Vec::with_capacity(assignment.lines.len() * INSTRUCTION_WIDTH);
    let mut listing = Vec::new();

    for addressed in &assignment.lines {
        let Some(bytes) = encode_line(
            &addressed.parsed,
            &assignment.symbols,
            addressed.address,
            addressed.source_line,
        )?
        else {
            continue;
        };

        let source = match &addressed.parsed {
            ParsedLine::Instruction { .. } => texts
                .get(addressed.source_line - 1)
                .map_or_else(String::new, |text| text.trim().to_string()),
            ParsedLine::Blank | ParsedLine::Label { .. } => String::new(),
        };

        listing.push(ListingEntry {
            address: addressed.address,
            bytes,
            source,
            line: addressed.source_line,
        });
        binary.extend_from_slice(&bytes);
    }

    Ok(AssembleResult { binary, listing })
}
