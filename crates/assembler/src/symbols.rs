//! Symbol table and pass-1 address assignment.
//!
//! Walks parsed lines, assigns every instruction its byte address, and
//! records label definitions. Each instruction occupies one 8-byte word.

use std::collections::HashMap;

use ebpf_core::INSTRUCTION_WIDTH;

use crate::errors::{AssembleError, AssembleErrorKind};
use crate::parser::ParsedLine;

/// A label with its assigned address and definition location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Byte address of the instruction the label names.
    pub address: u64,
    /// Source line number where the label was defined.
    pub defined_at: usize,
}

/// Symbol table mapping label names to their definitions.
pub type SymbolTable = HashMap<String, Symbol>;

/// A line with its assigned address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedLine {
    /// Address where this line's instruction begins.
    pub address: u64,
    /// Size in bytes: one word for instructions, zero otherwise.
    pub size: u64,
    /// The parsed line content.
    pub parsed: ParsedLine,
    /// Original source line number.
    pub source_line: usize,
}

/// Result of pass-1 address assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// All lines with their assigned addresses.
    pub lines: Vec<AddressedLine>,
    /// Label definitions.
    pub symbols: SymbolTable,
    /// One past the last instruction byte.
    pub end_address: u64,
}

const WORD: u64 = INSTRUCTION_WIDTH as u64;

/// Computes the byte size of a parsed line.
#[must_use]
pub const fn line_size(parsed: &ParsedLine) -> u64 {
    match parsed {
        ParsedLine::Blank | ParsedLine::Label { .. } => 0,
        ParsedLine::Instruction { .. } => WORD,
    }
}

/// Performs pass-1 address assignment with source lines numbered from 1.
///
/// # Errors
///
/// Returns [`AssembleErrorKind::DuplicateLabel`] when a label is defined
/// twice.
pub fn assign_addresses(lines: &[ParsedLine]) -> Result<Assignment, AssembleError> {
    assign_addresses_with_lines(lines, &(1..=lines.len()).collect::<Vec<_>>())
}

/// Performs pass-1 address assignment with explicit source line numbers.
///
/// # Errors
///
/// Same as [`assign_addresses`].
pub fn assign_addresses_with_lines(
    lines: &[ParsedLine],
    source_lines: &[usize],
) -> Result<Assignment, AssembleError> {
    let mut symbols = SymbolTable::new();
    let mut addressed = Vec::with_capacity(lines.len());
    let mut pc: u64 = 0;

    for (i, parsed) in lines.iter().enumerate() {
        let source_line = source_lines.get(i).copied().unwrap_or(i + 1);
        let size = line_size(parsed);

        let label = match parsed {
            ParsedLine::Label { name } => Some(name),
            ParsedLine::Instruction { label, .. } => label.as_ref(),
            ParsedLine::Blank => None,
        };

        if let Some(name) = label {
            if let Some(existing) = symbols.get(name) {
                return Err(AssembleError::new(
                    source_line,
                    AssembleErrorKind::DuplicateLabel {
                        name: name.clone(),
                        first_line: existing.defined_at,
                    },
                ));
            }
            symbols.insert(
                name.clone(),
                Symbol {
                    address: pc,
                    defined_at: source_line,
                },
            );
        }

        addressed.push(AddressedLine {
            address: pc,
            size,
            parsed: parsed.clone(),
            source_line,
        });

        pc += size;
    }

    Ok(Assignment {
        lines: addressed,
        symbols,
        end_address: pc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn parse_lines(source: &[&str]) -> Vec<ParsedLine> {
        source
            .iter()
            .enumerate()
            .map(|(i, s)| parse_line(s, i + 1).unwrap())
            .collect()
    }

    #[test]
    fn empty_source() {
        let result = assign_addresses(&[]).unwrap();
        assert!(result.lines.is_empty());
        assert!(result.symbols.is_empty());
        assert_eq!(result.end_address, 0);
    }

    #[test]
    fn label_names_next_instruction() {
        let lines = parse_lines(&["init:", "MOV r1, 1"]);
        let result = assign_addresses(&lines).unwrap();
        assert_eq!(result.symbols["init"].address, 0);
        assert_eq!(result.symbols["init"].defined_at, 1);
        assert_eq!(result.lines[0].size, 0);
        assert_eq!(result.lines[1].address, 0);
        assert_eq!(result.lines[1].size, 8);
        assert_eq!(result.end_address, 8);
    }

    #[test]
    fn instructions_advance_one_word_each() {
        let lines = parse_lines(&[
            "MOV r1, 1",
            "; comment",
            "",
            "loop: SUB r1, 1",
            "JNE r1, 0, loop",
            "end:",
        ]);
        let result = assign_addresses(&lines).unwrap();
        let addresses: Vec<_> = result.lines.iter().map(|l| l.address).collect();
        assert_eq!(addresses, vec![0, 8, 8, 8, 16, 24]);
        assert_eq!(result.symbols["loop"].address, 8);
        assert_eq!(result.symbols["end"].address, 24);
        assert_eq!(result.end_address, 24);
    }

    #[test]
    fn multiple_labels_same_address() {
        let lines = parse_lines(&["entry:", "start:", "NEG r0"]);
        let result = assign_addresses(&lines).unwrap();
        assert_eq!(result.symbols["entry"].address, 0);
        assert_eq!(result.symbols["start"].address, 0);
    }

    #[test]
    fn duplicate_label_error() {
        let lines = parse_lines(&["dup:", "NEG r0", "dup: NEG r1"]);
        let err = assign_addresses(&lines).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(
            err.kind,
            AssembleErrorKind::DuplicateLabel {
                name: "dup".into(),
                first_line: 1,
            }
        );
    }

    #[test]
    fn with_source_lines() {
        let lines = parse_lines(&["start:", "NEG r0"]);
        let result = assign_addresses_with_lines(&lines, &[10, 12]).unwrap();
        assert_eq!(result.symbols["start"].defined_at, 10);
        assert_eq!(result.lines[1].source_line, 12);
    }
}
