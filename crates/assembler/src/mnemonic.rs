//! Mnemonic resolution onto the core's opcode fields.
//!
//! Assembly mnemonics name an operation; whether the immediate or register
//! form is emitted is decided by the operand, so `ADD r1, 2` assembles to
//! the core's `ADDI` and `ADD r1, r2` to `ADD`.

use ebpf_core::{AluOperation, BranchCondition, ByteOrder, InstructionClass, OperandMode};

/// Operand shape and opcode fields selected by a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionForm {
    /// `OP rD, rS|IMM`.
    Alu {
        /// 32- or 64-bit class.
        class: InstructionClass,
        /// Operation nibble.
        operation: AluOperation,
    },
    /// `NEG rD`: bitwise complement, no source operand.
    Negate {
        /// 32- or 64-bit class.
        class: InstructionClass,
    },
    /// `LEnn rD` / `BEnn rD`.
    ByteSwap {
        /// Target byte order.
        order: ByteOrder,
        /// Width in bits, stored in the immediate.
        width: u32,
    },
    /// `JA target`.
    Jump,
    /// `Jcc rD, rS|IMM, target`.
    Branch {
        /// Condition nibble.
        condition: BranchCondition,
    },
}

impl InstructionForm {
    /// Number of comma-separated operands the form takes.
    #[must_use]
    pub const fn operand_count(self) -> usize {
        match self {
            Self::Negate { .. } | Self::ByteSwap { .. } | Self::Jump => 1,
            Self::Alu { .. } => 2,
            Self::Branch { .. } => 3,
        }
    }

    /// Opcode byte for this form with the given source operand mode.
    ///
    /// Forms without a source operand ignore `mode`.
    #[must_use]
    pub const fn opcode(self, mode: OperandMode) -> u8 {
        let register_bit = match mode {
            OperandMode::Register => OperandMode::REGISTER_BIT,
            OperandMode::Immediate => 0,
        };

        match self {
            Self::Alu { class, operation } => ((operation as u8) << 4) | class as u8 | register_bit,
            Self::Negate { class } => ((AluOperation::Neg as u8) << 4) | class as u8,
            Self::ByteSwap { order, .. } => {
                let order_bit = match order {
                    ByteOrder::Big => OperandMode::REGISTER_BIT,
                    ByteOrder::Little => 0,
                };
                (ebpf_core::BYTE_SWAP_OPERATION << 4) | InstructionClass::Alu32 as u8 | order_bit
            }
            Self::Jump => ((BranchCondition::Always as u8) << 4) | InstructionClass::Branch as u8,
            Self::Branch { condition } => {
                ((condition as u8) << 4) | InstructionClass::Branch as u8 | register_bit
            }
        }
    }
}

const ALU_MNEMONICS: &[(&str, AluOperation)] = &[
    ("ADD", AluOperation::Add),
    ("SUB", AluOperation::Sub),
    ("MUL", AluOperation::Mul),
    ("DIV", AluOperation::Div),
    ("OR", AluOperation::Or),
    ("AND", AluOperation::And),
    ("LSH", AluOperation::Lsh),
    ("RSH", AluOperation::Rsh),
    ("MOD", AluOperation::Mod),
    ("XOR", AluOperation::Xor),
    ("MOV", AluOperation::Mov),
    ("ARSH", AluOperation::Arsh),
];

const BRANCH_MNEMONICS: &[(&str, BranchCondition)] = &[
    ("JEQ", BranchCondition::Eq),
    ("JGT", BranchCondition::Gt),
    ("JGE", BranchCondition::Ge),
    ("JLT", BranchCondition::Lt),
    ("JLE", BranchCondition::Le),
    ("JSET", BranchCondition::Set),
    ("JNE", BranchCondition::Ne),
];

const BYTE_SWAP_MNEMONICS: &[(&str, ByteOrder, u32)] = &[
    ("LE16", ByteOrder::Little, 16),
    ("LE32", ByteOrder::Little, 32),
    ("LE64", ByteOrder::Little, 64),
    ("BE16", ByteOrder::Big, 16),
    ("BE32", ByteOrder::Big, 32),
    ("BE64", ByteOrder::Big, 64),
];

/// Resolves a mnemonic (case-insensitive) to its instruction form.
#[must_use]
pub fn resolve_mnemonic(name: &str) -> Option<InstructionForm> {
    let upper = name.to_ascii_uppercase();

    if let Some((_, order, width)) = BYTE_SWAP_MNEMONICS
        .iter()
        .find(|(entry, _, _)| *entry == upper)
    {
        return Some(InstructionForm::ByteSwap {
            order: *order,
            width: *width,
        });
    }

    if upper == "JA" {
        return Some(InstructionForm::Jump);
    }

    if let Some((_, condition)) = BRANCH_MNEMONICS.iter().find(|(entry, _)| *entry == upper) {
        return Some(InstructionForm::Branch {
            condition: *condition,
        });
    }

    let (base, class) = upper.strip_suffix("32").map_or(
        (upper.as_str(), InstructionClass::Alu64),
        |base| (base, InstructionClass::Alu32),
    );

    if base == "NEG" {
        return Some(InstructionForm::Negate { class });
    }

    ALU_MNEMONICS
        .iter()
        .find(|(entry, _)| *entry == base)
        .map(|(_, operation)| InstructionForm::Alu {
            class,
            operation: *operation,
        })
}
