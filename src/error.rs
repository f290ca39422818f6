//! Error taxonomy for every core and driver operation.
//!
//! Mirrors spec section 7 one variant at a time rather than wrapping a
//! single opaque `anyhow::Error`: callers that need to branch on *why* an
//! operation failed (the driver's dlopen-failure path, for one) match on
//! the variant instead of sniffing a message string.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ptrace/debugger operation failed: {0}")]
    Debugger(String),

    #[error("short transfer: expected {expected} bytes, moved {actual}")]
    ShortTransfer { expected: usize, actual: usize },

    #[error("target process exited or was killed during a remote call")]
    TargetGone,

    /// Reserved for diagnostics. Intervening non-fatal signals observed in
    /// the remote-call wait loop are absorbed and resumed, never surfaced
    /// as this variant, per spec section 4.5 step 8.
    #[error("unexpected stop: {0}")]
    UnexpectedStop(String),
}

impl From<nix::Error> for InjectError {
    fn from(e: nix::Error) -> Self {
        InjectError::Debugger(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InjectError>;
