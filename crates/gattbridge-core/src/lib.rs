//! Typed GATT value model and dynamic-value conversion
//!
//! This crate is the pure half of the gattbridge layer: the typed
//! counterparts of the platform peripheral stack's object model, and the
//! stateless converter that maps them to and from the application runtime's
//! dynamic (JSON-shaped) values. Nothing here performs I/O, holds state, or
//! needs synchronization; the event-forwarding half lives in
//! `gattbridge-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod convert;
pub mod error;
pub mod gatt;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use error::{ConvertError, FlagKind};
pub use gatt::{
    uuid_from_short, AttRequest, AttResult, AttributePermissions, Central,
    CharacteristicProperties, ManagerState, MutableCharacteristic, MutableService, StackError,
};

pub type Result<T> = core::result::Result<T, ConvertError>;
