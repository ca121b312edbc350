//! 32-bit ALU and byte-swap unit (instruction class 4).
//!
//! Operands are truncated to their low 32 bits and every arithmetic result
//! is written back zero-extended. Operation `0xd` is the byte swap, which
//! reads its width from the immediate and its target order from bit 3.

#![allow(clippy::pedantic, clippy::nursery, unknown_lints, missing_docs)]

use super::helpers::right_operand;
use crate::decoder::Instruction;
use crate::encoding::{AluOperation, ByteOrder, BYTE_SWAP_OPERATION};
use crate::{FaultCode, Machine};

const SHIFT_MASK: u32 = 31;
const SIGN_BIT: u32 = 1 << 31;

/// Executes one 32-bit ALU or byte-swap instruction against `registers[dst]`.
///
/// On a fault the destination register is left untouched.
pub fn execute(machine: &mut Machine, instr: Instruction) -> Result<(), FaultCode> {
    if instr.operation() == BYTE_SWAP_OPERATION {
        return byte_swap(machine, instr);
    }

    let op = AluOperation::from_nibble(instr.operation()).ok_or(FaultCode::IllegalInstruction)?;
    let lhs = machine.register(instr.dst) as u32;
    let rhs = right_operand(machine, instr) as u32;

    let result = match op {
        AluOperation::Add => lhs.wrapping_add(rhs),
        AluOperation::Sub => lhs.wrapping_sub(rhs),
        AluOperation::Mul => lhs.wrapping_mul(rhs),
        AluOperation::Div => lhs.checked_div(rhs).ok_or(FaultCode::DivideByZero)?,
        AluOperation::Or => lhs | rhs,
        AluOperation::And => lhs & rhs,
        AluOperation::Lsh => lhs << (rhs & SHIFT_MASK),
        AluOperation::Rsh => lhs >> (rhs & SHIFT_MASK),
        AluOperation::Neg => !lhs,
        AluOperation::Mod => lhs.checked_rem(rhs).ok_or(FaultCode::DivideByZero)?,
        AluOperation::Xor => lhs ^ rhs,
        AluOperation::Mov => rhs,
        AluOperation::Arsh => (lhs >> (rhs & SHIFT_MASK)) | (lhs & SIGN_BIT),
    };

    machine.registers_mut().set(instr.dst, u64::from(result));
    Ok(())
}

/// Converts the low 16, 32, or 64 bits of `registers[dst]` to the target
/// byte order. Narrow widths are written back zero-extended.
fn byte_swap(machine: &mut Machine, instr: Instruction) -> Result<(), FaultCode> {
    let value = machine.register(instr.dst);

    let converted = match (instr.immediate, ByteOrder::from_opcode(instr.opcode)) {
        (16, ByteOrder::Big) => u64::from((value as u16).to_be()),
        (16, ByteOrder::Little) => u64::from((value as u16).to_le()),
        (32, ByteOrder::Big) => u64::from((value as u32).to_be()),
        (32, ByteOrder::Little) => u64::from((value as u32).to_le()),
        (64, ByteOrder::Big) => value.to_be(),
        (64, ByteOrder::Little) => value.to_le(),
        _ => return Err(FaultCode::IllegalInstruction),
    };

    machine.registers_mut().set(instr.dst, converted);
    Ok(())
}
