//! Branch unit (instruction class 5).

#![allow(clippy::pedantic, clippy::nursery, unknown_lints, missing_docs)]

use super::helpers::right_operand;
use crate::decoder::Instruction;
use crate::encoding::BranchCondition;
use crate::{FaultCode, Machine};

/// Evaluates one branch and, when taken, adds the raw byte `offset` to the
/// instruction pointer.
///
/// The engine's fixed advance still follows, so a taken branch lands at
/// `ip + offset + 8`.
pub fn execute(machine: &mut Machine, instr: Instruction) -> Result<(), FaultCode> {
    let condition =
        BranchCondition::from_nibble(instr.operation()).ok_or(FaultCode::IllegalInstruction)?;
    let lhs = machine.register(instr.dst);
    let rhs = right_operand(machine, instr);

    if condition.holds(lhs, rhs) {
        let target = machine
            .instruction_pointer()
            .wrapping_add_signed(isize::from(instr.offset));
        machine.set_instruction_pointer(target);
    }

    Ok(())
}
