//! Core virtual machine for a fixed-width, eBPF-style bytecode.
//!
//! Programs are sequences of 8-byte little-endian instruction words executed
//! against sixteen 64-bit registers. A [`Machine`] is built by the lifecycle
//! constructors and advanced one instruction at a time with [`step`].

/// Memory region allocation.
pub mod memory;
pub use memory::{allocate_copy, allocate_zeroed, MemoryRegion};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    LoadError, MachineConfig, NoopTrace, RunBoundary, RunOutcome, StepError, StepOutcome,
    TraceEvent, TraceSink, DEFAULT_DATA_SIZE,
};

/// Machine state: registers, status flags, and the machine itself.
pub mod state;
pub use state::{
    GeneralRegister, Machine, RegisterFile, RunState, StatusFlags, CALLEE_SAVED_REGISTERS,
    GENERAL_REGISTER_COUNT,
};

/// Opcode field classification and the named opcode table.
pub mod encoding;
pub use encoding::{
    mnemonic, opcode_for, AluOperation, BranchCondition, ByteOrder, InstructionClass,
    OperandMode, BYTE_SWAP_OPERATION, OPCODE_TABLE,
};

/// Instruction word decoding.
pub mod decoder;
pub use decoder::{DecodeError, Decoder, Instruction, INSTRUCTION_WIDTH};

/// Execution fault taxonomy.
pub mod fault;
pub use fault::FaultCode;

/// Machine construction and teardown.
pub mod lifecycle;
pub use lifecycle::{ByteSource, FileSource};

/// Single-step execution engine and run loop.
pub mod execute;
pub use execute::{right_operand, run, run_traced, step, step_traced};

/// Disassembly rows for stepping front-ends.
pub mod disasm;
pub use disasm::{disassemble_one, disassemble_program, disassemble_window, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
