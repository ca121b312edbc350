//! Assembly source line parser for labels and instructions.
//!
//! Pass 1 frontend: converts raw source lines into structured [`ParsedLine`]
//! items ready for symbol table construction and encoding. Operands are
//! typed here, so the encoder only has to resolve labels.
//!
//! Operands may be separated by commas, whitespace, or both, so
//! `ADD r1, 2` and `ADD r1 2` are the same instruction.

use ebpf_core::GeneralRegister;

use crate::errors::{AssembleError, AssembleErrorKind};
use crate::mnemonic::{resolve_mnemonic, InstructionForm};

/// Second operand of ALU and conditional branch instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Register source; selects the register-mode opcode.
    Register(GeneralRegister),
    /// 32-bit immediate, already in two's complement for negative input.
    Immediate(u32),
}

/// Branch destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchTarget {
    /// Absolute byte address.
    Address(u32),
    /// Label reference, resolved in pass 2.
    Label(String),
}

/// A parsed instruction with typed operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    /// The mnemonic as written.
    pub mnemonic: String,
    /// Resolved form from the mnemonic table.
    pub form: InstructionForm,
    /// Destination register, for every form except `JA`.
    pub dst: Option<GeneralRegister>,
    /// Source operand of ALU and conditional branch forms.
    pub source: Option<Operand>,
    /// Destination of branch forms.
    pub target: Option<BranchTarget>,
}

/// A single parsed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Empty or comment-only line.
    Blank,
    /// Label definition on a line of its own.
    Label {
        /// Label name.
        name: String,
    },
    /// Instruction line, optionally preceded by a label.
    Instruction {
        /// Label defined at this instruction's address.
        label: Option<String>,
        /// The parsed instruction.
        instruction: ParsedInstruction,
    },
}

/// Result of parsing a single line.
pub type ParseResult = Result<ParsedLine, AssembleError>;

/// Parses a source line into a [`ParsedLine`].
///
/// # Errors
///
/// Returns an [`AssembleError`] on `line_number` for a malformed label, an
/// unknown mnemonic, a wrong operand count, or a malformed operand.
pub fn parse_line(line: &str, line_number: usize) -> ParseResult {
    let trimmed = strip_comment(line).trim();

    if trimmed.is_empty() {
        return Ok(ParsedLine::Blank);
    }

    let (label, rest) = split_label(trimmed, line_number)?;
    let rest = rest.trim();

    match label {
        Some(name) if rest.is_empty() => Ok(ParsedLine::Label { name }),
        label => Ok(ParsedLine::Instruction {
            label,
            instruction: parse_instruction(rest, line_number)?,
        }),
    }
}

/// Returns `true` for names made of an ASCII letter or `_` followed by
/// alphanumerics or `_`.
#[must_use]
pub fn is_valid_label(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn strip_comment(line: &str) -> &str {
    line.find(';').map_or(line, |pos| &line[..pos])
}

fn split_label(text: &str, line_number: usize) -> Result<(Option<String>, &str), AssembleError> {
    let Some((label, rest)) = text.split_once(':') else {
        return Ok((None, text));
    };
    let label = label.trim();
    if !is_valid_label(label) {
        return Err(AssembleError::new(
            line_number,
            AssembleErrorKind::InvalidLabel(label.to_string()),
        ));
    }
    Ok((Some(label.to_string()), rest))
}

fn parse_instruction(text: &str, line_number: usize) -> Result<ParsedInstruction, AssembleError> {
    let (mnemonic, operand_text) = text
        .find(char::is_whitespace)
        .map_or((text, ""), |pos| (&text[..pos], text[pos..].trim()));

    let form = resolve_mnemonic(mnemonic).ok_or_else(|| {
        AssembleError::new(
            line_number,
            AssembleErrorKind::UnknownMnemonic(mnemonic.to_string()),
        )
    })?;

    let operands = split_operands(operand_text);
    let mut instruction = ParsedInstruction {
        mnemonic: mnemonic.to_string(),
        form,
        dst: None,
        source: None,
        target: None,
    };

    match (form, operands.as_slice()) {
        (InstructionForm::Alu { .. }, [dst, source]) => {
            instruction.dst = Some(parse_register(dst, line_number)?);
            instruction.source = Some(parse_operand(source, line_number)?);
        }
        (InstructionForm::Negate { .. } | InstructionForm::ByteSwap { .. }, [dst]) => {
            instruction.dst = Some(parse_register(dst, line_number)?);
        }
        (InstructionForm::Jump, [target]) => {
            instruction.target = Some(parse_target(target, line_number)?);
        }
        (InstructionForm::Branch { .. }, [dst, source, target]) => {
            instruction.dst = Some(parse_register(dst, line_number)?);
            instruction.source = Some(parse_operand(source, line_number)?);
            instruction.target = Some(parse_target(target, line_number)?);
        }
        _ => {
            return Err(AssembleError::new(
                line_number,
                AssembleErrorKind::OperandCount {
                    mnemonic: mnemonic.to_ascii_uppercase(),
                    expected: form.operand_count(),
                    found: operands.len(),
                },
            ));
        }
    }

    Ok(instruction)
}

fn split_operands(text: &str) -> Vec<&str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|operand| !operand.is_empty())
        .collect()
}

fn parse_register(s: &str, line_number: usize) -> Result<GeneralRegister, AssembleError> {
    let invalid =
        || AssembleError::new(line_number, AssembleErrorKind::InvalidRegister(s.to_string()));

    let digits = s
        .strip_prefix('r')
        .or_else(|| s.strip_prefix('R'))
        .ok_or_else(invalid)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits
        .parse::<u8>()
        .ok()
        .and_then(GeneralRegister::from_u8)
        .ok_or_else(invalid)
}

fn parse_operand(s: &str, line_number: usize) -> Result<Operand, AssembleError> {
    if looks_like_register(s) {
        parse_register(s, line_number).map(Operand::Register)
    } else {
        parse_immediate(s, line_number).map(Operand::Immediate)
    }
}

fn parse_target(s: &str, line_number: usize) -> Result<BranchTarget, AssembleError> {
    if s.starts_with(|c: char| c.is_ascii_digit() || c == '#' || c == '-') {
        let address = parse_immediate(s, line_number)?;
        if s.starts_with('-') {
            return Err(AssembleError::new(
                line_number,
                AssembleErrorKind::InvalidImmediate(s.to_string()),
            ));
        }
        return Ok(BranchTarget::Address(address));
    }
    if is_valid_label(s) {
        return Ok(BranchTarget::Label(s.to_string()));
    }
    Err(AssembleError::new(
        line_number,
        AssembleErrorKind::InvalidLabel(s.to_string()),
    ))
}

fn looks_like_register(s: &str) -> bool {
    s.strip_prefix('r')
        .or_else(|| s.strip_prefix('R'))
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

/// Parses a decimal, `0x` hex, or `#` hex immediate into the 32-bit field.
///
/// Negative decimals down to `i32::MIN` are stored in two's complement.
///
/// # Errors
///
/// Returns [`AssembleErrorKind::InvalidImmediate`] for malformed text and
/// [`AssembleErrorKind::ImmediateTooLarge`] for values outside
/// `i32::MIN..=u32::MAX`.
pub fn parse_immediate(s: &str, line_number: usize) -> Result<u32, AssembleError> {
    let error = |kind: fn(String) -> AssembleErrorKind| {
        AssembleError::new(line_number, kind(s.to_string()))
    };

    let hex_digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('#'));

    if let Some(digits) = hex_digits {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error(AssembleErrorKind::InvalidImmediate));
        }
        let digits = digits.trim_start_matches('0');
        if digits.len() > 8 {
            return Err(error(AssembleErrorKind::ImmediateTooLarge));
        }
        return u32::from_str_radix(if digits.is_empty() { "0" } else { digits }, 16)
            .map_err(|_| error(AssembleErrorKind::InvalidImmediate));
    }

    let (negative, digits) = s.strip_prefix('-').map_or((false, s), |rest| (true, rest));
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(error(AssembleErrorKind::InvalidImmediate));
    }
    let magnitude = digits
        .parse::<u64>()
        .map_err(|_| error(AssembleErrorKind::ImmediateTooLarge))?;

    if negative {
        let value = i64::try_from(magnitude)
            .ok()
            .and_then(|m| i32::try_from(-m).ok())
            .ok_or_else(|| error(AssembleErrorKind::ImmediateTooLarge))?;
        Ok(u32::from_le_bytes(value.to_le_bytes()))
    } else {
        u32::try_from(magnitude).map_err(|_| error(AssembleErrorKind::ImmediateTooLarge))
    }
}

#[cfg(test)]
mod tests {
    use ebpf_core::{AluOperation, BranchCondition, GeneralRegister, InstructionClass};

    use super::*;

    fn instruction(line: &str) -> ParsedInstruction {
        match parse_line(line, 1) {
            Ok(ParsedLine::Instruction { instruction, .. }) => instruction,
            other => panic!("expected instruction, got {other:?}"),
        }
    }

    fn error_kind(line: &str) -> AssembleErrorKind {
        parse_line(line, 7).expect_err("line should be rejected").kind
    }

    #[test]
    fn parse_blank_line() {
        assert_eq!(parse_line("", 1), Ok(ParsedLine::Blank));
        assert_eq!(parse_line("   ", 1), Ok(ParsedLine::Blank));
        assert_eq!(parse_line("; comment", 1), Ok(ParsedLine::Blank));
        assert_eq!(parse_line("  ; comment only  ", 1), Ok(ParsedLine::Blank));
    }

    #[test]
    fn parse_label_only() {
        assert_eq!(
            parse_line("start:", 1),
            Ok(ParsedLine::Label {
                name: "start".into()
            })
        );
        assert_eq!(
            parse_line("  _loop2:  ; body", 1),
            Ok(ParsedLine::Label {
                name: "_loop2".into()
            })
        );
    }

    #[test]
    fn parse_label_with_instruction() {
        match parse_line("init: MOV r0, 1", 1) {
            Ok(ParsedLine::Instruction { label, instruction }) => {
                assert_eq!(label.as_deref(), Some("init"));
                assert_eq!(instruction.dst, Some(GeneralRegister::R0));
            }
            other => panic!("expected instruction, got {other:?}"),
        }
    }

    #[test]
    fn parse_alu_immediate_and_register_forms() {
        let imm = instruction("ADD r1, 0x14");
        assert_eq!(
            imm.form,
            InstructionForm::Alu {
                class: InstructionClass::Alu64,
                operation: AluOperation::Add,
            }
        );
        assert_eq!(imm.dst, Some(GeneralRegister::R1));
        assert_eq!(imm.source, Some(Operand::Immediate(0x14)));

        let reg = instruction("mul32 R6,r15");
        assert_eq!(reg.source, Some(Operand::Register(GeneralRegister::R15)));
        assert_eq!(reg.target, None);
    }

    #[test]
    fn parse_single_register_forms() {
        let neg = instruction("NEG r3");
        assert_eq!(neg.dst, Some(GeneralRegister::R3));
        assert_eq!(neg.source, None);

        let swap = instruction("be64 r7");
        assert!(matches!(swap.form, InstructionForm::ByteSwap { width: 64, .. }));
    }

    #[test]
    fn parse_branch_forms() {
        let ja = instruction("JA done");
        assert_eq!(ja.form, InstructionForm::Jump);
        assert_eq!(ja.dst, None);
        assert_eq!(ja.target, Some(BranchTarget::Label("done".into())));

        let jeq = instruction("JEQ r1, r2, 0x28");
        assert_eq!(
            jeq.form,
            InstructionForm::Branch {
                condition: BranchCondition::Eq
            }
        );
        assert_eq!(jeq.source, Some(Operand::Register(GeneralRegister::R2)));
        assert_eq!(jeq.target, Some(BranchTarget::Address(0x28)));
    }

    #[test]
    fn immediate_syntaxes() {
        assert_eq!(parse_immediate("20", 1), Ok(20));
        assert_eq!(parse_immediate("0x14", 1), Ok(0x14));
        assert_eq!(parse_immediate("#ff", 1), Ok(0xff));
        assert_eq!(parse_immediate("-1", 1), Ok(0xffff_ffff));
        assert_eq!(parse_immediate("-2147483648", 1), Ok(0x8000_0000));
        assert_eq!(parse_immediate("4294967295", 1), Ok(u32::MAX));
        assert_eq!(parse_immediate("0x0000000000ff", 1), Ok(0xff));
    }

    #[test]
    fn immediate_range_errors() {
        for text in ["4294967296", "0x100000000", "-2147483649", "99999999999999999999999"] {
            assert!(
                matches!(
                    parse_immediate(text, 1).map_err(|e| e.kind),
                    Err(AssembleErrorKind::ImmediateTooLarge(_))
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn malformed_immediates() {
        for text in ["", "0x", "#xyz", "12ab", "--1", "+4", "-0x10"] {
            assert!(
                matches!(
                    parse_immediate(text, 1).map_err(|e| e.kind),
                    Err(AssembleErrorKind::InvalidImmediate(_))
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn case_insensitive_mnemonic_keeps_spelling() {
        let instr = instruction("mov r0, R1");
        assert_eq!(instr.mnemonic, "mov");
        assert_eq!(instr.source, Some(Operand::Register(GeneralRegister::R1)));
    }

    #[test]
    fn error_unknown_mnemonic() {
        assert_eq!(
            error_kind("NOTREAL r0"),
            AssembleErrorKind::UnknownMnemonic("NOTREAL".into())
        );
    }

    #[test]
    fn error_invalid_register() {
        assert_eq!(
            error_kind("MOV r16, 1"),
            AssembleErrorKind::InvalidRegister("r16".into())
        );
        assert_eq!(
            error_kind("NEG 5"),
            AssembleErrorKind::InvalidRegister("5".into())
        );
    }

    #[test]
    fn error_operand_count() {
        assert_eq!(
            error_kind("ADD r1"),
            AssembleErrorKind::OperandCount {
                mnemonic: "ADD".into(),
                expected: 2,
                found: 1,
            }
        );
        assert_eq!(
            error_kind("jne r1, 2"),
            AssembleErrorKind::OperandCount {
                mnemonic: "JNE".into(),
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn error_malformed_labels() {
        assert_eq!(
            error_kind("1st: NEG r1"),
            AssembleErrorKind::InvalidLabel("1st".into())
        );
        assert_eq!(
            error_kind("JA bad-name"),
            AssembleErrorKind::InvalidLabel("bad-name".into())
        );
        assert_eq!(
            error_kind("JA -8"),
            AssembleErrorKind::InvalidImmediate("-8".into())
        );
    }

    #[test]
    fn errors_carry_line_number() {
        let err = parse_line("BOGUS", 42).expect_err("unknown mnemonic");
        assert_eq!(err.line, 42);
    }

    #[test]
    fn whitespace_separates_operands() {
        assert_eq!(instruction("ADD r1 2"), instruction("ADD r1, 2"));
        assert_eq!(instruction("JEQ r1 r2 done"), instruction("JEQ r1, r2, done"));
        assert_eq!(
            instruction("mov\tr3 ,  0x10").source,
            Some(Operand::Immediate(0x10))
        );
        assert_eq!(
            error_kind("ADD r1 2 3"),
            AssembleErrorKind::OperandCount {
                mnemonic: "ADD".into(),
                expected: 2,
                found: 3,
            }
        );
    }
}
