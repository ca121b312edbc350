//! Instruction decoder for the fixed 8-byte instruction word.
//!
//! Word layout (byte offsets, multi-byte fields little-endian):
//!
//! | bytes | field                                   |
//! |-------|-----------------------------------------|
//! | 0..4  | `immediate` (u32)                       |
//! | 4..6  | `offset` (i16)                          |
//! | 6     | `src` (high nibble), `dst` (low nibble) |
//! | 7     | `opcode`                                |

use thiserror::Error;

use crate::encoding::{InstructionClass, OperandMode};
use crate::state::GeneralRegister;

/// Width in bytes of every instruction word.
pub const INSTRUCTION_WIDTH: usize = 8;

/// Decode-time failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DecodeError {
    /// The buffer is empty or its length is not a multiple of the
    /// instruction width.
    #[error("instruction buffer of {len} bytes is not a positive multiple of {INSTRUCTION_WIDTH}")]
    MalformedBuffer {
        /// Length of the rejected buffer.
        len: usize,
    },
}

/// One decoded instruction word.
///
/// Produced fresh on every fetch and never stored in the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Instruction {
    /// Literal operand, or payload such as the byte-swap width.
    pub immediate: u32,
    /// Signed branch displacement in bytes.
    pub offset: i16,
    /// Source register (high nibble of byte 6).
    pub src: GeneralRegister,
    /// Destination register (low nibble of byte 6).
    pub dst: GeneralRegister,
    /// Raw opcode byte.
    pub opcode: u8,
}

impl Instruction {
    /// Instruction class selected by the low three opcode bits, if assigned.
    #[must_use]
    pub const fn class(self) -> Option<InstructionClass> {
        InstructionClass::from_opcode(self.opcode)
    }

    /// Operand mode selected by opcode bit 3.
    #[must_use]
    pub const fn operand_mode(self) -> OperandMode {
        OperandMode::from_opcode(self.opcode)
    }

    /// Operation code held in the opcode's high nibble.
    #[must_use]
    pub const fn operation(self) -> u8 {
        self.opcode >> 4
    }

    /// Re-encodes this instruction into its 8-byte word.
    #[must_use]
    pub const fn encode(self) -> [u8; INSTRUCTION_WIDTH] {
        let [i0, i1, i2, i3] = self.immediate.to_le_bytes();
        let [o0, o1] = self.offset.to_le_bytes();
        let registers = (self.src.as_u8() << 4) | self.dst.as_u8();
        [i0, i1, i2, i3, o0, o1, registers, self.opcode]
    }
}

/// Instruction decoder.
pub struct Decoder;

impl Decoder {
    /// Decodes the first instruction word of `bytes`.
    ///
    /// `bytes` is the remaining instruction memory from the fetch position,
    /// so a truncated or misaligned tail is rejected here.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedBuffer`] when `bytes` is empty or its
    /// length is not a multiple of [`INSTRUCTION_WIDTH`].
    pub fn decode(bytes: &[u8]) -> Result<Instruction, DecodeError> {
        let malformed = DecodeError::MalformedBuffer { len: bytes.len() };
        if bytes.is_empty() || bytes.len() % INSTRUCTION_WIDTH != 0 {
            return Err(malformed);
        }

        let Some(word) = bytes.first_chunk::<INSTRUCTION_WIDTH>() else {
            return Err(malformed);
        };

        Ok(Self::decode_word(*word))
    }

    /// Decodes one complete instruction word.
    #[must_use]
    pub const fn decode_word(word: [u8; INSTRUCTION_WIDTH]) -> Instruction {
        let [i0, i1, i2, i3, o0, o1, registers, opcode] = word;

        Instruction {
            immediate: u32::from_le_bytes([i0, i1, i2, i3]),
            offset: i16::from_le_bytes([o0, o1]),
            src: GeneralRegister::from_nibble(registers >> 4),
            dst: GeneralRegister::from_nibble(registers),
            opcode,
        }
    }
}
