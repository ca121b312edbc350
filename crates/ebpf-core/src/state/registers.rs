/// Number of general-purpose 64-bit registers (`R0..R15`).
pub const GENERAL_REGISTER_COUNT: usize = 16;

/// Registers the calling convention treats as callee-saved.
///
/// Convention only: the engine gives them no special behavior.
pub const CALLEE_SAVED_REGISTERS: [GeneralRegister; 4] = [
    GeneralRegister::R6,
    GeneralRegister::R7,
    GeneralRegister::R8,
    GeneralRegister::R9,
];

/// General-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum GeneralRegister {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
}

impl GeneralRegister {
    /// Ordered list of all general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
        Self::R9,
        Self::R10,
        Self::R11,
        Self::R12,
        Self::R13,
        Self::R14,
        Self::R15,
    ];

    /// Conventional frame-pointer register.
    pub const FRAME_POINTER: Self = Self::R10;

    /// Returns the array index for this register (`0..=15`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Selects a register from the low nibble of `bits`.
    ///
    /// The high nibble is ignored, so every input maps to a register.
    #[must_use]
    pub const fn from_nibble(bits: u8) -> Self {
        Self::ALL[(bits & 0x0F) as usize]
    }

    /// Decodes a register number, rejecting values above 15.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        if value < 16 {
            Some(Self::from_nibble(value))
        } else {
            None
        }
    }

    /// Returns the register number (`0..=15`).
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The sixteen 64-bit general-purpose registers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    gpr: [u64; GENERAL_REGISTER_COUNT],
}

impl RegisterFile {
    /// Reads a register.
    #[must_use]
    pub const fn get(&self, reg: GeneralRegister) -> u64 {
        self.gpr[reg.index()]
    }

    /// Writes a register.
    pub const fn set(&mut self, reg: GeneralRegister, value: u64) {
        self.gpr[reg.index()] = value;
    }

    /// Returns all register values in index order.
    #[must_use]
    pub const fn as_array(&self) -> &[u64; GENERAL_REGISTER_COUNT] {
        &self.gpr
    }
}
