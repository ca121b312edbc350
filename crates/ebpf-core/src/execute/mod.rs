//! Single-step execution engine.
//!
//! One step performs:
//! 1. Refuse to run a halted machine
//! 2. Fetch and decode the word at the instruction pointer
//! 3. Dispatch on the instruction class
//! 4. Advance the pointer by one word and count the cycle
//! 5. Halt or rewind when the pointer reaches the end of the program
//!
//! Unit faults do not stop steps 4 and 5. They latch a status bit so the
//! next step is refused.

#![allow(
    clippy::pedantic,
    clippy::nursery,
    clippy::similar_names,
    unknown_lints,
    missing_docs
)]

mod alu32;
mod alu64;
mod branch;
mod helpers;

pub use helpers::right_operand;

use crate::decoder::{Decoder, INSTRUCTION_WIDTH};
use crate::encoding::InstructionClass;
use crate::{
    FaultCode, Machine, NoopTrace, RunBoundary, RunOutcome, StepError, StepOutcome, TraceEvent,
    TraceSink,
};

/// Executes one instruction.
///
/// # Errors
///
/// Returns [`StepError::MachineHalted`] on a halted machine,
/// [`StepError::FetchFailed`] when no complete word sits at the pointer, and
/// [`StepError::IllegalInstruction`] for an unassigned class. The last one
/// also halts the machine without advancing the pointer or the cycle count.
pub fn step(machine: &mut Machine) -> Result<StepOutcome, StepError> {
    step_traced(machine, &mut NoopTrace)
}

/// Executes one instruction, reporting each stage to `trace`.
///
/// # Errors
///
/// Same as [`step`].
pub fn step_traced(
    machine: &mut Machine,
    trace: &mut dyn TraceSink,
) -> Result<StepOutcome, StepError> {
    if machine.status().is_halted() {
        return Err(StepError::MachineHalted);
    }

    let ip = machine.instruction_pointer();
    let window = machine.instruction_memory().get(ip..).unwrap_or_default();
    let instruction =
        Decoder::decode(window).map_err(|source| StepError::FetchFailed { ip, source })?;
    trace.on_event(TraceEvent::InstructionStart { ip, instruction });

    let executed = match instruction.class() {
        Some(InstructionClass::Alu64) => alu64::execute(machine, instruction),
        Some(InstructionClass::Alu32) => alu32::execute(machine, instruction),
        Some(InstructionClass::Branch) => branch::execute(machine, instruction),
        None => {
            let cause = FaultCode::IllegalInstruction;
            machine.latch_fault(cause);
            trace.on_event(TraceEvent::FaultRaised { ip, cause });
            return Err(StepError::IllegalInstruction {
                ip,
                opcode: instruction.opcode,
            });
        }
    };

    let fault = executed.err();
    if let Some(cause) = fault {
        machine.latch_fault(cause);
        trace.on_event(TraceEvent::FaultRaised { ip, cause });
    }

    let next = machine
        .instruction_pointer()
        .wrapping_add(INSTRUCTION_WIDTH);
    machine.set_instruction_pointer(next);
    machine.increment_cycle_count();
    let cycle_count = machine.cycle_count();
    trace.on_event(TraceEvent::InstructionRetired { ip, cycle_count });

    let mut outcome = StepOutcome::Retired;
    if next == machine.instruction_memory().len() {
        if machine.continuous_mode() {
            machine.set_instruction_pointer(0);
            trace.on_event(TraceEvent::Rewound { cycle_count });
            outcome = StepOutcome::Rewound;
        } else {
            machine.halt();
            trace.on_event(TraceEvent::ProgramEnd { cycle_count });
            outcome = StepOutcome::ProgramEnd;
        }
    }

    Ok(fault.map_or(outcome, |cause| StepOutcome::Fault { cause }))
}

/// Steps until `boundary` is reached.
#[must_use]
pub fn run(machine: &mut Machine, boundary: RunBoundary) -> RunOutcome {
    run_traced(machine, boundary, &mut NoopTrace)
}

/// [`run`] with every step reported to `trace`.
#[must_use]
pub fn run_traced(
    machine: &mut Machine,
    boundary: RunBoundary,
    trace: &mut dyn TraceSink,
) -> RunOutcome {
    let limit = match boundary {
        RunBoundary::Halted => None,
        RunBoundary::StepLimit(limit) => Some(limit),
    };

    let mut steps = 0_u64;
    let mut final_step = None;

    while limit.map_or(true, |limit| steps < limit) {
        let result = step_traced(machine, trace);
        final_step = Some(result);

        match result {
            Ok(outcome) => {
                steps += 1;
                if outcome.is_terminal() {
                    break;
                }
            }
            Err(_) => break,
        }
    }

    RunOutcome { steps, final_step }
}
