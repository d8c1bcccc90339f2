//! The closed set of ways a core operation can fail. See the module docs on
//! [`crate::Core`] for how these propagate out of `step()`.

use thiserror::Error;

/// Every way a fallible core operation can fail. Nothing outside of this set
/// is reachable through the public API.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown opcode {0:#04X}")]
    UnknownOpcode(u8),

    #[error("unknown CB opcode {0:#04X}")]
    UnknownCBOpcode(u8),

    #[error("invalid address range {start:#06X}..{end:#06X}")]
    InvalidRange { start: u16, end: u32 },

    #[error("write to read-only address {0:#06X}")]
    ReadOnly(u16),

    #[error("no register mapped at address {0:#06X}")]
    MissingRegister(u16),
}

pub type Result<T> = std::result::Result<T, CoreError>;
