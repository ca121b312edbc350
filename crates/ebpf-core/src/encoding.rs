//! Opcode field classification and the named opcode table.
//!
//! The opcode byte splits into three fields:
//!
//! - bits 0..=2: instruction class
//! - bit 3: operand mode (immediate or register source)
//! - bits 4..=7: operation (ALU) or condition (branch)

/// Instruction classes with assigned values in the low three opcode bits.
///
/// Classes `0..=3` and `6` are unassigned and raise an illegal-instruction
/// fault at execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum InstructionClass {
    /// 32-bit arithmetic and byte swap.
    Alu32 = 0x4,
    /// Conditional and unconditional jumps.
    Branch = 0x5,
    /// 64-bit arithmetic.
    Alu64 = 0x7,
}

impl InstructionClass {
    /// Mask selecting the class bits of an opcode.
    pub const MASK: u8 = 0x07;

    /// Classifies an opcode byte.
    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode & Self::MASK {
            0x4 => Some(Self::Alu32),
            0x5 => Some(Self::Branch),
            0x7 => Some(Self::Alu64),
            _ => None,
        }
    }
}

/// Source of an instruction's right-hand operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandMode {
    /// The immediate field.
    Immediate,
    /// The register selected by `src`.
    Register,
}

impl OperandMode {
    /// Opcode bit selecting register mode.
    pub const REGISTER_BIT: u8 = 0x08;

    /// Reads the operand mode from opcode bit 3.
    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Self {
        if opcode & Self::REGISTER_BIT == 0 {
            Self::Immediate
        } else {
            Self::Register
        }
    }
}

/// ALU operations shared by the 32- and 64-bit classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum AluOperation {
    Add = 0x0,
    Sub = 0x1,
    Mul = 0x2,
    Div = 0x3,
    Or = 0x4,
    And = 0x5,
    Lsh = 0x6,
    Rsh = 0x7,
    /// Bitwise complement of the destination.
    Neg = 0x8,
    Mod = 0x9,
    Xor = 0xa,
    Mov = 0xb,
    Arsh = 0xc,
}

impl AluOperation {
    /// Decodes the operation nibble; `None` for `0xd..=0xf`.
    #[must_use]
    pub const fn from_nibble(operation: u8) -> Option<Self> {
        match operation {
            0x0 => Some(Self::Add),
            0x1 => Some(Self::Sub),
            0x2 => Some(Self::Mul),
            0x3 => Some(Self::Div),
            0x4 => Some(Self::Or),
            0x5 => Some(Self::And),
            0x6 => Some(Self::Lsh),
            0x7 => Some(Self::Rsh),
            0x8 => Some(Self::Neg),
            0x9 => Some(Self::Mod),
            0xa => Some(Self::Xor),
            0xb => Some(Self::Mov),
            0xc => Some(Self::Arsh),
            _ => None,
        }
    }
}

/// Operation nibble of the byte-swap instruction (32-bit class only).
pub const BYTE_SWAP_OPERATION: u8 = 0xd;

/// Target byte order of a byte-swap instruction, chosen by opcode bit 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// `LE`: convert to little-endian.
    Little,
    /// `BE`: convert to big-endian.
    Big,
}

impl ByteOrder {
    /// Reads the target byte order from the operand-mode bit.
    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Self {
        match OperandMode::from_opcode(opcode) {
            OperandMode::Immediate => Self::Little,
            OperandMode::Register => Self::Big,
        }
    }
}

/// Branch conditions. Every comparison is unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BranchCondition {
    /// `JA`: always taken.
    Always = 0x0,
    /// `JEQ`: `dst == rhs`.
    Eq = 0x1,
    /// `JGT`: `dst > rhs`.
    Gt = 0x2,
    /// `JGE`: `dst >= rhs`.
    Ge = 0x3,
    /// `JSET`: `dst & rhs != 0`.
    Set = 0x4,
    /// `JNE`: `dst != rhs`.
    Ne = 0x5,
    /// `JLT`: `dst < rhs`.
    Lt = 0xa,
    /// `JLE`: `dst <= rhs`.
    Le = 0xb,
}

impl BranchCondition {
    /// Decodes the condition nibble.
    #[must_use]
    pub const fn from_nibble(condition: u8) -> Option<Self> {
        match condition {
            0x0 => Some(Self::Always),
            0x1 => Some(Self::Eq),
            0x2 => Some(Self::Gt),
            0x3 => Some(Self::Ge),
            0x4 => Some(Self::Set),
            0x5 => Some(Self::Ne),
            0xa => Some(Self::Lt),
            0xb => Some(Self::Le),
            _ => None,
        }
    }

    /// Evaluates the condition on two unsigned operands.
    #[must_use]
    pub const fn holds(self, dst: u64, rhs: u64) -> bool {
        match self {
            Self::Always => true,
            Self::Eq => dst == rhs,
            Self::Gt => dst > rhs,
            Self::Ge => dst >= rhs,
            Self::Set => dst & rhs != 0,
            Self::Ne => dst != rhs,
            Self::Lt => dst < rhs,
            Self::Le => dst <= rhs,
        }
    }
}

/// Named opcodes as `(opcode, mnemonic)`.
///
/// Immediate forms carry an `I` before any `32` suffix. Opcodes absent
/// from this table still execute by field decoding; they are only unnamed.
pub const OPCODE_TABLE: &[(u8, &str)] = &[
    (0x05, "JA"),
    (0x15, "JEQI"),
    (0x1d, "JEQ"),
    (0x25, "JGTI"),
    (0x2d, "JGT"),
    (0x35, "JGEI"),
    (0x3d, "JGE"),
    (0xa5, "JLTI"),
    (0xad, "JLT"),
    (0xb5, "JLEI"),
    (0xbd, "JLE"),
    (0x45, "JSETI"),
    (0x4d, "JSET"),
    (0x55, "JNEI"),
    (0x5d, "JNE"),
    (0x07, "ADDI"),
    (0x0f, "ADD"),
    (0x17, "SUBI"),
    (0x1f, "SUB"),
    (0x27, "MULI"),
    (0x2f, "MUL"),
    (0x37, "DIVI"),
    (0x3f, "DIV"),
    (0x47, "ORI"),
    (0x4f, "OR"),
    (0x57, "ANDI"),
    (0x5f, "AND"),
    (0x67, "LSHI"),
    (0x6f, "LSH"),
    (0x77, "RSHI"),
    (0x7f, "RSH"),
    (0x87, "NEG"),
    (0x97, "MODI"),
    (0x9f, "MOD"),
    (0xa7, "XORI"),
    (0xaf, "XOR"),
    (0xb7, "MOVI"),
    (0xbf, "MOV"),
    (0xc7, "ARSHI"),
    (0xcf, "ARSH"),
    (0x04, "ADDI32"),
    (0x0c, "ADD32"),
    (0x14, "SUBI32"),
    (0x1c, "SUB32"),
    (0x24, "MULI32"),
    (0x2c, "MUL32"),
    (0x34, "DIVI32"),
    (0x3c, "DIV32"),
    (0x44, "ORI32"),
    (0x4c, "OR32"),
    (0x54, "ANDI32"),
    (0x5c, "AND32"),
    (0x64, "LSHI32"),
    (0x6c, "LSH32"),
    (0x74, "RSHI32"),
    (0x7c, "RSH32"),
    (0x84, "NEG32"),
    (0x94, "MODI32"),
    (0x9c, "MOD32"),
    (0xa4, "XORI32"),
    (0xac, "XOR32"),
    (0xb4, "MOVI32"),
    (0xbc, "MOV32"),
    (0xc4, "ARSHI32"),
    (0xcc, "ARSH32"),
    (0xd4, "LE"),
    (0xdc, "BE"),
];

/// Returns the mnemonic for `opcode`, if it is named.
#[must_use]
pub fn mnemonic(opcode: u8) -> Option<&'static str> {
    OPCODE_TABLE
        .iter()
        .find_map(|(entry, name)| (*entry == opcode).then_some(*name))
}

/// Returns the opcode named `name` (case-insensitive).
#[must_use]
pub fn opcode_for(name: &str) -> Option<u8> {
    OPCODE_TABLE
        .iter()
        .find_map(|(opcode, entry)| entry.eq_ignore_ascii_case(name).then_some(*opcode))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::{
        mnemonic, opcode_for, AluOperation, BranchCondition, ByteOrder, InstructionClass,
        OperandMode, BYTE_SWAP_OPERATION, OPCODE_TABLE,
    };

    #[test]
    fn table_has_unique_opcodes_and_names() {
        let opcodes: HashSet<_> = OPCODE_TABLE.iter().map(|(op, _)| *op).collect();
        let names: HashSet<_> = OPCODE_TABLE.iter().map(|(_, name)| *name).collect();
        assert_eq!(OPCODE_TABLE.len(), 67);
        assert_eq!(opcodes.len(), OPCODE_TABLE.len());
        assert_eq!(names.len(), OPCODE_TABLE.len());
    }

    #[test]
    fn every_named_opcode_has_an_assigned_class() {
        for (opcode, name) in OPCODE_TABLE {
            assert!(
                InstructionClass::from_opcode(*opcode).is_some(),
                "{name} ({opcode:#04x}) has no class"
            );
        }
    }

    #[rstest]
    #[case(0x05, "JA")]
    #[case(0x1d, "JEQ")]
    #[case(0xb7, "MOVI")]
    #[case(0x2f, "MUL")]
    #[case(0x3c, "DIV32")]
    #[case(0xd4, "LE")]
    #[case(0xdc, "BE")]
    fn lookup_works_both_directions(#[case] opcode: u8, #[case] name: &str) {
        assert_eq!(mnemonic(opcode), Some(name));
        assert_eq!(opcode_for(name), Some(opcode));
        assert_eq!(opcode_for(&name.to_ascii_lowercase()), Some(opcode));
    }

    #[test]
    fn unnamed_opcodes_have_no_mnemonic() {
        assert_eq!(mnemonic(0x00), None);
        assert_eq!(mnemonic(0x8f), None);
        assert_eq!(opcode_for("NOP"), None);
    }

    #[rstest]
    #[case(0x07, Some(InstructionClass::Alu64))]
    #[case(0x0c, Some(InstructionClass::Alu32))]
    #[case(0x1d, Some(InstructionClass::Branch))]
    #[case(0x00, None)]
    #[case(0x01, None)]
    #[case(0x03, None)]
    #[case(0x06, None)]
    fn class_comes_from_low_three_bits(
        #[case] opcode: u8,
        #[case] expected: Option<InstructionClass>,
    ) {
        assert_eq!(InstructionClass::from_opcode(opcode), expected);
    }

    #[test]
    fn operand_mode_and_byte_order_share_bit_three() {
        assert_eq!(OperandMode::from_opcode(0x07), OperandMode::Immediate);
        assert_eq!(OperandMode::from_opcode(0x0f), OperandMode::Register);
        assert_eq!(ByteOrder::from_opcode(0xd4), ByteOrder::Little);
        assert_eq!(ByteOrder::from_opcode(0xdc), ByteOrder::Big);
        assert_eq!(0xdc >> 4, BYTE_SWAP_OPERATION);
    }

    #[test]
    fn alu_nibbles_beyond_arsh_are_unassigned() {
        assert_eq!(AluOperation::from_nibble(0xc), Some(AluOperation::Arsh));
        for nibble in 0xd..=0xf {
            assert_eq!(AluOperation::from_nibble(nibble), None);
        }
    }

    #[rstest]
    #[case(BranchCondition::Eq, 5, 5, true)]
    #[case(BranchCondition::Gt, u64::MAX, 1, true)]
    #[case(BranchCondition::Ge, 3, 4, false)]
    #[case(BranchCondition::Set, 0b1010, 0b0100, false)]
    #[case(BranchCondition::Set, 0b1010, 0b0010, true)]
    #[case(BranchCondition::Ne, 1, 1, false)]
    #[case(BranchCondition::Lt, 1, u64::MAX, true)]
    #[case(BranchCondition::Le, 7, 7, true)]
    fn conditions_compare_unsigned(
        #[case] condition: BranchCondition,
        #[case] dst: u64,
        #[case] rhs: u64,
        #[case] taken: bool,
    ) {
        assert_eq!(condition.holds(dst, rhs), taken);
    }

    #[test]
    fn unassigned_condition_nibbles_are_rejected() {
        for nibble in [0x6, 0x7, 0x8, 0x9, 0xc, 0xd, 0xe, 0xf] {
            assert_eq!(BranchCondition::from_nibble(nibble), None);
        }
    }
}
