use thiserror::Error;

use crate::state::StatusFlags;

/// Execution faults raised by the ALU and branch units.
///
/// A fault never unwinds the step that raised it: the engine latches the
/// matching status bit together with `HALTED`, still retires the step, and
/// refuses to execute on the following call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Unrecognized ALU operation, branch condition, or byte-swap width.
    #[error("illegal instruction")]
    IllegalInstruction = 0x80,
    /// Divide or modulo with a zero right-hand operand.
    #[error("divide by zero")]
    DivideByZero = 0x40,
}

impl FaultCode {
    /// Converts a fault code to its stable status-register bit value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable status-register bit value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x80 => Some(Self::IllegalInstruction),
            0x40 => Some(Self::DivideByZero),
            _ => None,
        }
    }

    /// Status flags latched on the machine when this fault is raised.
    #[must_use]
    pub const fn latched_status(self) -> StatusFlags {
        StatusFlags::from_bits(self.as_u8() | StatusFlags::HALTED.bits())
    }
}
