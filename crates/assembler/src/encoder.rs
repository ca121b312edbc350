//! Instruction encoding (Pass 2).
//!
//! Converts parsed instructions into 8-byte words through
//! [`ebpf_core::Instruction::encode`], resolving branch targets against the
//! pass-1 symbol table.

use ebpf_core::{GeneralRegister, Instruction, OperandMode, INSTRUCTION_WIDTH};

use crate::errors::{AssembleError, AssembleErrorKind};
use crate::mnemonic::InstructionForm;
use crate::parser::{BranchTarget, Operand, ParsedInstruction, ParsedLine};
use crate::symbols::SymbolTable;

const WORD: u64 = INSTRUCTION_WIDTH as u64;

/// Encodes an instruction located at byte address `pc`.
///
/// # Errors
///
/// Returns [`AssembleErrorKind::UndefinedLabel`] when a branch names an
/// unknown label and [`AssembleErrorKind::BranchOutOfRange`] when the
/// displacement does not fit the 16-bit offset field.
pub fn encode_instruction(
    instr: &ParsedInstruction,
    symbols: &SymbolTable,
    pc: u64,
    source_line: usize,
) -> Result<[u8; INSTRUCTION_WIDTH], AssembleError> {
    let mode = match instr.source {
        Some(Operand::Register(_)) => OperandMode::Register,
        Some(Operand::Immediate(_)) | None => OperandMode::Immediate,
    };

    let immediate = match (instr.form, instr.source) {
        (InstructionForm::ByteSwap { width, .. }, _) => width,
        (_, Some(Operand::Immediate(value))) => value,
        _ => 0,
    };

    let src = match instr.source {
        Some(Operand::Register(reg)) => reg,
        _ => GeneralRegister::R0,
    };

    let offset = instr.target.as_ref().map_or(Ok(0), |target| {
        let address = resolve_target(target, symbols, source_line)?;
        branch_offset(address, pc).map_err(|kind| AssembleError::new(source_line, kind))
    })?;

    Ok(Instruction {
        immediate,
        offset,
        src,
        dst: instr.dst.unwrap_or(GeneralRegister::R0),
        opcode: instr.form.opcode(mode),
    }
    .encode())
}

/// Encodes a parsed line; labels and blank lines produce no bytes.
///
/// # Errors
///
/// Same as [`encode_instruction`].
pub fn encode_line(
    parsed: &ParsedLine,
    symbols: &SymbolTable,
    pc: u64,
    source_line: usize,
) -> Result<Option<[u8; INSTRUCTION_WIDTH]>, AssembleError> {
    match parsed {
        ParsedLine::Blank | ParsedLine::Label { .. } => Ok(None),
        ParsedLine::Instruction { instruction, .. } => {
            encode_instruction(instruction, symbols, pc, source_line).map(Some)
        }
    }
}

fn resolve_target(
    target: &BranchTarget,
    symbols: &SymbolTable,
    source_line: usize,
) -> Result<u64, AssembleError> {
    match target {
        BranchTarget::Address(address) => Ok(u64::from(*address)),
        BranchTarget::Label(name) => symbols
            .get(name)
            .map(|symbol| symbol.address)
            .ok_or_else(|| {
                AssembleError::new(source_line, AssembleErrorKind::UndefinedLabel(name.clone()))
            }),
    }
}

/// Displacement that makes a branch at `pc` land on `target`.
///
/// The machine adds the offset and then advances past the branch, so the
/// encoded value is `target - (pc + 8)`.
#[allow(clippy::cast_possible_wrap)]
fn branch_offset(target: u64, pc: u64) -> Result<i16, AssembleErrorKind> {
    let offset = target.wrapping_sub(pc.wrapping_add(WORD)) as i64;
    i16::try_from(offset).map_err(|_| AssembleErrorKind::BranchOutOfRange { target, offset })
}
