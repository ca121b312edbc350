//! Architectural machine state model primitives.

/// Register file types and storage model.
pub mod registers;
/// Sticky status flags and the derived run state.
pub mod status;

mod machine;

pub use machine::Machine;
pub use registers::{GeneralRegister, RegisterFile, CALLEE_SAVED_REGISTERS, GENERAL_REGISTER_COUNT};
pub use status::{RunState, StatusFlags};
