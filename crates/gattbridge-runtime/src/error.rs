//! Error types for the runtime bridge

use thiserror::Error;

use gattbridge_core::{ConvertError, StackError};

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors surfaced by the peripheral-manager adapter.
///
/// `Convert` aborts an operation before the stack is touched. `Stack`
/// carries a platform-reported failure through unchanged; callers project
/// it with `error_to_value` when the dynamic side needs it.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid argument: {0}")]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error("delegate stream already taken")]
    DelegateAlreadyTaken,
}

pub type Result<T> = core::result::Result<T, BridgeError>;
