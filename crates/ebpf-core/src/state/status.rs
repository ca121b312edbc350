use crate::FaultCode;

/// Sticky machine status bits.
///
/// Bits are only ever added while a machine runs; they are cleared by
/// reinitializing the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StatusFlags(u8);

impl StatusFlags {
    /// No flags set.
    pub const EMPTY: Self = Self(0);
    /// The machine executes no further instructions.
    pub const HALTED: Self = Self(0x01);
    /// A divide or modulo by zero was attempted.
    pub const DIVIDE_BY_ZERO: Self = Self(0x40);
    /// An unrecognized instruction class, operation, or condition was seen.
    pub const ILLEGAL_INSTRUCTION: Self = Self(0x80);

    /// Builds flags from a raw status byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw status byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when every bit in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Sets every bit in `other`.
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Returns `true` when no bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` when `HALTED` is set.
    #[must_use]
    pub const fn is_halted(self) -> bool {
        self.contains(Self::HALTED)
    }

    /// Returns the fault recorded in these flags, if any.
    ///
    /// `ILLEGAL_INSTRUCTION` wins when both fault bits are present.
    #[must_use]
    pub const fn fault(self) -> Option<FaultCode> {
        if self.contains(Self::ILLEGAL_INSTRUCTION) {
            Some(FaultCode::IllegalInstruction)
        } else if self.contains(Self::DIVIDE_BY_ZERO) {
            Some(FaultCode::DivideByZero)
        } else {
            None
        }
    }
}

/// Execution state derived from the status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the instruction at the instruction pointer.
    #[default]
    Running,
    /// Terminal until the machine is reinitialized.
    Halted,
}

impl From<StatusFlags> for RunState {
    fn from(status: StatusFlags) -> Self {
        if status.is_halted() {
            Self::Halted
        } else {
            Self::Running
        }
    }
}
