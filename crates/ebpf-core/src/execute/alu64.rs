//! 64-bit ALU unit (instruction class 7).

#![allow(clippy::pedantic, clippy::nursery, unknown_lints, missing_docs)]

use super::helpers::right_operand;
use crate::decoder::Instruction;
use crate::encoding::AluOperation;
use crate::{FaultCode, Machine};

const SHIFT_MASK: u64 = 63;
const SIGN_BIT: u64 = 1 << 63;

/// Executes one 64-bit ALU instruction against `registers[dst]`.
///
/// On a fault the destination register is left untouched.
pub fn execute(machine: &mut Machine, instr: Instruction) -> Result<(), FaultCode> {
    let op = AluOperation::from_nibble(instr.operation()).ok_or(FaultCode::IllegalInstruction)?;
    let lhs = machine.register(instr.dst);
    let rhs = right_operand(machine, instr);

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
        AluOperation::Arsh => arithmetic_shift_right(lhs, rhs),
    };

    machine.registers_mut().set(instr.dst, result);
    Ok(())
}

/// Logical shift, then reinstate bit 63 if it was set.
const fn arithmetic_shift_right(value: u64, shift: u64) -> u64 {
    (value >> (shift & SHIFT_MASK)) | (value & SIGN_BIT)
}
