//! Error types for the alang compiler

use thiserror::Error;

/// Errors surfaced by the driver layer.
///
/// Translation problems never take this path: statement handlers accumulate
/// [`crate::diagnostics::Diagnostic`] records and keep going, so a single pass
/// reports everything it found.
#[derive(Debug, Error)]
pub enum AlangError {
    #[error("C compilation failed with status {status}")]
    ToolchainFailed { status: i32 },

    #[error("unknown compile mode '{0}'")]
    UnknownMode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AlangError>;
