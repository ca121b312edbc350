//! Instruction disassembly for stepping front-ends.
//!
//! Every row covers one 8-byte word. Named opcodes use their code-table
//! mnemonic; anything else renders as `.word`.

use crate::decoder::{Decoder, Instruction, INSTRUCTION_WIDTH};
use crate::encoding::{
    mnemonic, AluOperation, BranchCondition, InstructionClass, BYTE_SWAP_OPERATION,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Byte address of this instruction.
    pub addr_start: usize,
    /// Raw instruction word.
    pub raw: [u8; INSTRUCTION_WIDTH],
    /// Code-table mnemonic (e.g. `"MOVI"`, `"JEQ"`), or `".word"`.
    pub mnemonic: String,
    /// Field summary: `src->dst @ offset #immediate`.
    pub operands: String,
    /// Whether executing this word would raise an illegal-instruction fault.
    pub is_illegal: bool,
}

/// Disassembles the word at `ip`, if a complete word is present.
#[must_use]
pub fn disassemble_one(ip: usize, memory: &[u8]) -> Option<DisassemblyRow> {
    let raw = *memory.get(ip..)?.first_chunk::<INSTRUCTION_WIDTH>()?;
    let instr = Decoder::decode_word(raw);

    Some(DisassemblyRow {
        addr_start: ip,
        raw,
        mnemonic: mnemonic(instr.opcode).unwrap_or(".word").to_string(),
        operands: format_operands(instr),
        is_illegal: !is_executable(instr),
    })
}

/// Disassembles every complete word of `memory`. A trailing partial word
/// is ignored.
#[must_use]
pub fn disassemble_program(memory: &[u8]) -> Vec<DisassemblyRow> {
    (0..memory.len() / INSTRUCTION_WIDTH)
        .filter_map(|index| disassemble_one(index * INSTRUCTION_WIDTH, memory))
        .collect()
}

/// Disassembles up to `before` words preceding `center_ip`, the word at
/// `center_ip`, and up to `after` words following it.
///
/// Rows that fall outside `memory` are omitted, so a window near either
/// end of the program is shorter than requested.
#[must_use]
pub fn disassemble_window(
    center_ip: usize,
    before: usize,
    after: usize,
    memory: &[u8],
) -> Vec<DisassemblyRow> {
    let first = center_ip.saturating_sub(before.saturating_mul(INSTRUCTION_WIDTH));
    let first = center_ip - (center_ip - first) / INSTRUCTION_WIDTH * INSTRUCTION_WIDTH;
    let count = ((center_ip - first) / INSTRUCTION_WIDTH)
        .saturating_add(1)
        .saturating_add(after);

    (0..count)
        .map_while(|index| {
            index
                .checked_mul(INSTRUCTION_WIDTH)
                .and_then(|delta| first.checked_add(delta))
        })
        .map_while(|ip| disassemble_one(ip, memory))
        .collect()
}

fn format_operands(instr: Instruction) -> String {
    format!(
        "{:x}->{:x} @ {} #{:08x}",
        instr.src.as_u8(),
        instr.dst.as_u8(),
        instr.offset,
        instr.immediate
    )
}

fn is_executable(instr: Instruction) -> bool {
    let operation = instr.operation();
    match instr.class() {
        Some(InstructionClass::Alu64) => AluOperation::from_nibble(operation).is_some(),
        Some(InstructionClass::Alu32) if operation == BYTE_SWAP_OPERATION => {
            matches!(instr.immediate, 16 | 32 | 64)
        }
        Some(InstructionClass::Alu32) => AluOperation::from_nibble(operation).is_some(),
        Some(InstructionClass::Branch) => BranchCondition::from_nibble(operation).is_some(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; 32] = [
        0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0xb7, // MOVI r6, 0x14
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x76, 0x2f, // MUL r6, r7
        0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x07, 0xdc, // BE r7, 64
        0x00, 0x00, 0x00, 0x00, 0xF8, 0xFF, 0x00, 0x05, // JA -8
    ];

    #[test]
    fn disassemble_named_immediate_form() {
        let row = disassemble_one(0, &SAMPLE).expect("complete word");
        assert_eq!(row.addr_start, 0);
        assert_eq!(row.mnemonic, "MOVI");
        assert_eq!(row.operands, "0->6 @ 0 #00000014");
        assert!(!row.is_illegal);
    }

    #[test]
    fn disassemble_register_form_shows_both_nibbles() {
        let row = disassemble_one(8, &SAMPLE).expect("complete word");
        assert_eq!(row.mnemonic, "MUL");
        assert_eq!(row.operands, "7->6 @ 0 #00000000");
    }

    #[test]
    fn disassemble_byte_swap_and_negative_offset() {
        let rows = disassemble_program(&SAMPLE);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].mnemonic, "BE");
        assert_eq!(rows[2].operands, "0->7 @ 0 #00000040");
        assert_eq!(rows[3].mnemonic, "JA");
        assert_eq!(rows[3].operands, "0->0 @ -8 #00000000");
        assert_eq!(rows[3].raw, [0, 0, 0, 0, 0xF8, 0xFF, 0, 0x05]);
    }

    #[test]
    fn unnamed_and_illegal_words() {
        let memory = [
            0, 0, 0, 0, 0, 0, 0, 0x06, // class 6
            0, 0, 0, 0, 0, 0, 0x21, 0x8f, // NEG in register mode, unnamed
            0x30, 0, 0, 0, 0, 0, 0, 0xd4, // LE with width 48
        ];
        let rows = disassemble_program(&memory);

        assert_eq!(rows[0].mnemonic, ".word");
        assert!(rows[0].is_illegal);
        assert_eq!(rows[1].mnemonic, ".word");
        assert!(!rows[1].is_illegal);
        assert_eq!(rows[2].mnemonic, "LE");
        assert!(rows[2].is_illegal);
    }

    #[test]
    fn partial_trailing_word_is_skipped() {
        let rows = disassemble_program(&SAMPLE[..28]);
        assert_eq!(rows.len(), 3);
        assert!(disassemble_one(24, &SAMPLE[..28]).is_none());
        assert!(disassemble_one(usize::MAX, &SAMPLE).is_none());
    }

    #[test]
    fn window_centers_on_pointer() {
        let rows = disassemble_window(16, 1, 1, &SAMPLE);
        assert_eq!(
            rows.iter().map(|row| row.addr_start).collect::<Vec<_>>(),
            vec![8, 16, 24]
        );
    }

    #[test]
    fn window_is_clipped_at_both_ends() {
        let rows = disassemble_window(0, 3, 10, &SAMPLE);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].addr_start, 0);

        let rows = disassemble_window(24, 2, 5, &SAMPLE);
        assert_eq!(
            rows.iter().map(|row| row.addr_start).collect::<Vec<_>>(),
            vec![8, 16, 24]
        );
    }

    #[test]
    fn window_with_unbounded_lookahead_stops_at_end() {
        let rows = disassemble_window(0, 0, usize::MAX, &[0u8; 16]);
        assert_eq!(
            rows.iter().map(|row| row.addr_start).collect::<Vec<_>>(),
            vec![0, 8]
        );

        assert!(disassemble_window(64, 0, usize::MAX, &SAMPLE).is_empty());
        assert!(disassemble_window(usize::MAX, 2, usize::MAX, &SAMPLE).is_empty());
    }
}
