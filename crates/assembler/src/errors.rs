//! Structured error reporting for assembler phases.
//!
//! Every error carries the 1-based source line it was raised on, and the
//! CLI renders it in the standard style:
//!
//! ```text
//! program.s:10: error: unknown mnemonic 'ADDX'
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// An assembler error tied to a source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct AssembleError {
    /// 1-based source line.
    pub line: usize,
    /// What went wrong.
    pub kind: AssembleErrorKind,
}

impl AssembleError {
    /// Creates an error on `line`.
    #[must_use]
    pub const fn new(line: usize, kind: AssembleErrorKind) -> Self {
        Self { line, kind }
    }

    /// Formats the error for stderr output as `file:line: error: message`.
    #[must_use]
    pub fn format_for_stderr(&self, file: &str) -> String {
        format!("{file}:{}: error: {}", self.line, self.kind)
    }
}

/// Classification of assembler errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleErrorKind {
    /// The mnemonic names no instruction.
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),
    /// A register operand was expected but not valid.
    #[error("invalid register '{0}' (expected r0-r15)")]
    InvalidRegister(String),
    /// A numeric operand could not be parsed.
    #[error("invalid immediate '{0}'")]
    InvalidImmediate(String),
    /// A numeric operand does not fit the 32-bit immediate field.
    #[error("immediate '{0}' does not fit in 32 bits")]
    ImmediateTooLarge(String),
    /// A label name is malformed.
    #[error("invalid label name '{0}'")]
    InvalidLabel(String),
    /// Wrong number of operands for the mnemonic.
    #[error("{mnemonic} expects {expected} operand(s), found {found}")]
    OperandCount {
        /// Mnemonic as resolved.
        mnemonic: String,
        /// Number of operands the form takes.
        expected: usize,
        /// Number of operands supplied.
        found: usize,
    },
    /// A label was defined twice.
    #[error("duplicate label '{name}' (first defined at line {first_line})")]
    DuplicateLabel {
        /// Label name.
        name: String,
        /// Line of the first definition.
        first_line: usize,
    },
    /// A branch target names no label.
    #[error("undefined label '{0}'")]
    UndefinedLabel(String),
    /// The branch displacement does not fit the signed 16-bit offset field.
    #[error("branch to {target:#x} needs offset {offset}, outside the 16-bit range")]
    BranchOutOfRange {
        /// Absolute target address.
        target: u64,
        /// Required displacement in bytes.
        offset: i64,
    },
}

/// Failure assembling a source file.
#[derive(Debug, Error)]
pub enum AssembleFileError {
    /// The source file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// Requested source path.
        path: PathBuf,
        /// Underlying read failure.
        #[source]
        source: io::Error,
    },
    /// The source was read but did not assemble.
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}
