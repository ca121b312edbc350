//! Operand selection shared by the execution units.

#![allow(clippy::pedantic, clippy::nursery, unknown_lints, missing_docs)]

use crate::decoder::Instruction;
use crate::encoding::OperandMode;
use crate::Machine;

/// Right-hand operand: `registers[src]` in register mode, otherwise the
/// zero-extended immediate.
#[must_use]
pub fn right_operand(machine: &Machine, instr: Instruction) -> u64 {
    match instr.operand_mode() {
        OperandMode::Register => machine.register(instr.src),
        OperandMode::Immediate => u64::from(instr.immediate),
    }
}

/// Test-only instruction word builder.
#[cfg(test)]
pub fn word(opcode: u8, dst: u8, src: u8, offset: i16, immediate: u32) -> [u8; 8] {
    use crate::state::GeneralRegister;

    Instruction {
        immediate,
        offset,
        src: GeneralRegister::from_nibble(src),
        dst: GeneralRegister::from_nibble(dst),
        opcode,
    }
    .encode()
}
