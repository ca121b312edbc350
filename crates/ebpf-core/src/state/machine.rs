use crate::decoder::{Decoder, Instruction};
use crate::state::{GeneralRegister, RegisterFile, RunState, StatusFlags};
use crate::FaultCode;

/// Complete mutable execution state of one virtual machine.
///
/// A machine exclusively owns its instruction and data memory. It is
/// created through the lifecycle constructors (`initialize`, `load`,
/// `load_from_source`) and mutated only by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Machine {
    registers: RegisterFile,
    instruction_pointer: usize,
    instruction_memory: Box<[u8]>,
    data_memory: Box<[u8]>,
    cycle_count: u64,
    continuous_mode: bool,
    status: StatusFlags,
}

impl Machine {
    pub(crate) fn from_parts(instruction_memory: Box<[u8]>, data_memory: Box<[u8]>) -> Self {
        Self {
            registers: RegisterFile::default(),
            instruction_pointer: 0,
            instruction_memory,
            data_memory,
            cycle_count: 0,
            continuous_mode: false,
            status: StatusFlags::EMPTY,
        }
    }

    /// Returns the register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Reads one register.
    #[must_use]
    pub const fn register(&self, reg: GeneralRegister) -> u64 {
        self.registers.get(reg)
    }

    /// Reads the conventional frame pointer (`R10`).
    #[must_use]
    pub const fn frame_pointer(&self) -> u64 {
        self.registers.get(GeneralRegister::FRAME_POINTER)
    }

    /// Seeds a register before execution starts.
    pub const fn set_register(&mut self, reg: GeneralRegister, value: u64) {
        self.registers.set(reg, value);
    }

    /// Byte offset of the next instruction in instruction memory.
    #[must_use]
    pub const fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    /// The loaded program bytes.
    #[must_use]
    pub fn instruction_memory(&self) -> &[u8] {
        &self.instruction_memory
    }

    /// Data memory; reserved for load/store opcodes and not addressed by
    /// any current instruction.
    #[must_use]
    pub fn data_memory(&self) -> &[u8] {
        &self.data_memory
    }

    /// Number of completed steps.
    #[must_use]
    pub const fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Returns `true` when reaching the end of the program rewinds to zero.
    #[must_use]
    pub const fn continuous_mode(&self) -> bool {
        self.continuous_mode
    }

    /// Enables or disables rewinding at the end of the program.
    pub const fn set_continuous_mode(&mut self, enabled: bool) {
        self.continuous_mode = enabled;
    }

    /// Current status flags.
    #[must_use]
    pub const fn status(&self) -> StatusFlags {
        self.status
    }

    /// Execution state derived from the status flags.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        RunState::from(self.status)
    }

    /// Decodes the instruction at the instruction pointer without executing it.
    #[must_use]
    pub fn current_instruction(&self) -> Option<Instruction> {
        let window = self.instruction_memory.get(self.instruction_pointer..)?;
        Decoder::decode(window).ok()
    }

    pub(crate) const fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub(crate) const fn set_instruction_pointer(&mut self, ip: usize) {
        self.instruction_pointer = ip;
    }

    pub(crate) const fn increment_cycle_count(&mut self) {
        self.cycle_count = self.cycle_count.wrapping_add(1);
    }

    pub(crate) const fn halt(&mut self) {
        self.status.insert(StatusFlags::HALTED);
    }

    pub(crate) const fn latch_fault(&mut self, cause: FaultCode) {
        self.status.insert(cause.latched_status());
    }
}
