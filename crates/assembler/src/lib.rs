//! Two-pass assembler for the eBPF-style bytecode virtual machine.
//!
//! Source text is parsed line by line, labels are assigned byte addresses,
//! and every instruction is encoded into one 8-byte word through
//! [`ebpf_core::Instruction::encode`].

/// Top-level two-pass assembler pipeline.
pub mod assembler;
/// Instruction encoding.
pub mod encoder;
/// Structured assembly error types.
pub mod errors;
/// Mnemonic resolution onto the core's opcode fields.
pub mod mnemonic;
/// Assembly parser for instructions and labels.
pub mod parser;
/// Symbol table and pass-1 address assignment.
pub mod symbols;
