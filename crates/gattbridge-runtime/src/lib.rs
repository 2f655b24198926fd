//! Event forwarding and peripheral-manager adapter for gattbridge
//!
//! This crate is the stateful half of the bridge. It owns the outbound
//! event channel ([`EventBridge`]), the typed rendition of the platform
//! delegate callbacks ([`DelegateEvent`]), and the application-facing
//! [`PeripheralManager`] adapter, which decodes dynamic arguments through
//! `gattbridge-core` before driving the consumed [`PeripheralStack`]
//! surface.
//!
//! ## Architecture
//!
//! - [`config`] - Manager options and advertising payload
//! - [`events`] - Delegate callbacks and their named event projections
//! - [`emitter`] - Broadcast channel toward the application layer
//! - [`stack`] - Consumed surface of the platform peripheral stack
//! - [`manager`] - Application-facing peripheral manager adapter
//! - [`error`] - Error types for the runtime bridge

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod emitter;
pub mod error;
pub mod events;
pub mod manager;
pub mod stack;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::{AdvertisingData, ManagerOptions};
pub use emitter::EventBridge;
pub use error::BridgeError;
pub use events::{
    DelegateEvent, EmittedEvent, EVENT_DID_ADD_SERVICE, EVENT_DID_RECEIVE_READ_REQUEST,
    EVENT_DID_RECEIVE_WRITE_REQUESTS, EVENT_DID_START_ADVERTISING, EVENT_DID_SUBSCRIBE,
    EVENT_DID_UNSUBSCRIBE, EVENT_DID_UPDATE_STATE, EVENT_NAMES,
    EVENT_READY_TO_UPDATE_SUBSCRIBERS,
};
pub use manager::PeripheralManager;
pub use stack::{delegate_channel, DelegateReceiver, DelegateSender, PeripheralStack};

// Re-export the typed value model for downstream convenience
pub use gattbridge_core::{
    uuid_from_short, AttRequest, AttResult, AttributePermissions, Central,
    CharacteristicProperties, ConvertError, ManagerState, MutableCharacteristic, MutableService,
    StackError,
};
