//! Error types for dynamic-value conversion

use std::fmt;

use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Which flag vocabulary a rejected element belonged to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Property,
    Permission,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::Property => write!(f, "property"),
            FlagKind::Permission => write!(f, "permission"),
        }
    }
}

/// Failure while decoding a dynamic value into its typed counterpart.
///
/// `TypeMismatch` means the value had the wrong shape for the field;
/// the remaining variants mean a well-typed value could not be parsed.
/// Both abort the enclosing operation at the point of conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{field} must be {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{field} is not valid base64: {source}")]
    InvalidBase64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{field} is not a valid UUID: {value:?}")]
    InvalidUuid { field: &'static str, value: String },

    #[error("unrecognized {kind} flag value: {value}")]
    UnknownFlag { kind: FlagKind, value: u64 },

    /// Wraps a nested failure with the index of the characteristic that
    /// produced it, so a malformed entry inside a service decode stays
    /// localizable for the caller.
    #[error("characteristics[{index}]: {source}")]
    InCharacteristic {
        index: usize,
        #[source]
        source: Box<ConvertError>,
    },
}
