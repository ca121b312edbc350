//! Public host-facing API contracts for embedding the machine core.
//!
//! Front-ends drive a [`Machine`](crate::Machine) one step at a time and
//! read its state between steps; these types describe what a step, a run,
//! and a load can report.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::decoder::{DecodeError, Instruction};
use crate::memory::MemoryRegion;
use crate::FaultCode;

/// Data memory size used when the host does not choose one.
pub const DEFAULT_DATA_SIZE: usize = 512;

/// Construction-time machine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Size in bytes of the zeroed data memory.
    pub data_size: usize,
    /// Rewind to the first instruction instead of halting at the end.
    pub continuous_mode: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            data_size: DEFAULT_DATA_SIZE,
            continuous_mode: false,
        }
    }
}

/// Result of one successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired; the machine can keep running.
    Retired,
    /// Instruction retired at the end of the program and continuous mode
    /// rewound the pointer to zero.
    Rewound,
    /// Instruction retired at the end of the program and the machine halted
    /// cleanly.
    ProgramEnd,
    /// Instruction retired but its unit raised a fault; the machine is now
    /// halted with the matching status bit.
    Fault {
        /// Fault latched by this step.
        cause: FaultCode,
    },
}

impl StepOutcome {
    /// Returns `true` when the machine cannot take another step.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ProgramEnd | Self::Fault { .. })
    }
}

/// Reasons a step did not execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum StepError {
    /// The machine was already halted.
    #[error("machine is halted")]
    MachineHalted,
    /// No complete instruction word at the instruction pointer.
    #[error("instruction fetch at {ip:#x} failed")]
    FetchFailed {
        /// Instruction pointer of the failed fetch.
        ip: usize,
        /// Decoder rejection.
        #[source]
        source: DecodeError,
    },
    /// The opcode's class bits name no execution unit.
    #[error("illegal instruction class in opcode {opcode:#04x} at {ip:#x}")]
    IllegalInstruction {
        /// Instruction pointer of the rejected instruction.
        ip: usize,
        /// Raw opcode byte.
        opcode: u8,
    },
}

/// Machine construction failures.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A memory region could not be reserved.
    #[error("cannot allocate {len} bytes of {region}")]
    AllocationFailed {
        /// Region that failed.
        region: MemoryRegion,
        /// Requested length in bytes.
        len: usize,
    },
    /// The program source could not be read.
    #[error("cannot read program source {}", .path.display())]
    SourceUnavailable {
        /// Requested source path.
        path: PathBuf,
        /// Underlying read failure.
        #[source]
        source: io::Error,
    },
    /// The program source holds no bytes.
    #[error("program source {} is empty", .path.display())]
    EmptySource {
        /// Requested source path.
        path: PathBuf,
    },
}

/// Run loop boundary modes for batched execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunBoundary {
    /// Step until a step reports a terminal outcome or an error.
    Halted,
    /// As [`RunBoundary::Halted`], but stop after at most this many steps.
    StepLimit(u64),
}

/// Aggregated outcome from running until a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of steps that retired an instruction during this call.
    pub steps: u64,
    /// Last step result observed before returning; `None` when the
    /// boundary allowed no step.
    pub final_step: Option<Result<StepOutcome, StepError>>,
}

/// Trace events emitted at step boundaries, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// An instruction was fetched and decoded.
    InstructionStart {
        /// Instruction pointer used for the fetch.
        ip: usize,
        /// Decoded instruction word.
        instruction: Instruction,
    },
    /// An instruction retired.
    InstructionRetired {
        /// Address of the retired instruction.
        ip: usize,
        /// Cycle count after retirement.
        cycle_count: u64,
    },
    /// A unit or the class decoder raised a fault.
    FaultRaised {
        /// Address of the faulting instruction.
        ip: usize,
        /// Latched fault.
        cause: FaultCode,
    },
    /// The program ran off its end and the machine halted.
    ProgramEnd {
        /// Cycle count at halt.
        cycle_count: u64,
    },
    /// The program ran off its end and continuous mode rewound it.
    Rewound {
        /// Cycle count at the rewind.
        cycle_count: u64,
    },
}

/// Sink trait for trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTrace;

impl TraceSink for NoopTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::{
        LoadError, MachineConfig, StepError, StepOutcome, TraceEvent, TraceSink,
        DEFAULT_DATA_SIZE,
    };
    use crate::decoder::DecodeError;
    use crate::memory::MemoryRegion;
    use crate::FaultCode;

    #[test]
    fn default_config_uses_historical_data_size() {
        let config = MachineConfig::default();
        assert_eq!(config.data_size, DEFAULT_DATA_SIZE);
        assert_eq!(config.data_size, 512);
        assert!(!config.continuous_mode);
    }

    #[test]
    fn terminal_outcomes_are_program_end_and_faults() {
        assert!(!StepOutcome::Retired.is_terminal());
        assert!(!StepOutcome::Rewound.is_terminal());
        assert!(StepOutcome::ProgramEnd.is_terminal());
        assert!(StepOutcome::Fault {
            cause: FaultCode::DivideByZero
        }
        .is_terminal());
    }

    #[test]
    fn fetch_failure_exposes_decode_source() {
        let err = StepError::FetchFailed {
            ip: 8,
            source: DecodeError::MalformedBuffer { len: 4 },
        };
        assert_eq!(err.to_string(), "instruction fetch at 0x8 failed");
        assert!(err.source().is_some());
    }

    #[test]
    fn load_errors_render_region_and_path() {
        let err = LoadError::AllocationFailed {
            region: MemoryRegion::Data,
            len: 64,
        };
        assert_eq!(err.to_string(), "cannot allocate 64 bytes of data memory");

        let err = LoadError::EmptySource {
            path: "prog.bin".into(),
        };
        assert_eq!(err.to_string(), "program source prog.bin is empty");
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink = Vec::new();
        sink.on_event(TraceEvent::Rewound { cycle_count: 1 });
        sink.on_event(TraceEvent::ProgramEnd { cycle_count: 2 });
        assert_eq!(
            sink,
            vec![
                TraceEvent::Rewound { cycle_count: 1 },
                TraceEvent::ProgramEnd { cycle_count: 2 },
            ]
        );
    }
}
