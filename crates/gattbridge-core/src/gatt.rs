//! GATT domain types shared across the bridge
//!
//! These are the typed counterparts of the dynamic dictionaries the
//! application runtime sends and receives. They mirror the platform
//! peripheral stack's object model: mutable services own mutable
//! characteristics, centrals are opaque read-only handles, and ATT
//! requests are consumed per-request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ----------------------------------------------------------------------------
// Well-Known UUIDs
// ----------------------------------------------------------------------------

/// Bluetooth Base UUID with the short-alias field zeroed
/// (`00000000-0000-1000-8000-00805F9B34FB`).
pub const BLUETOOTH_BASE_UUID: Uuid = Uuid::from_u128(0x00000000_0000_1000_8000_00805F9B34FB);

/// Characteristic User Description descriptor (0x2901)
pub const CHARACTERISTIC_USER_DESCRIPTION_UUID: Uuid = uuid_from_short(0x2901);

/// Client Characteristic Configuration descriptor (0x2902)
pub const CLIENT_CHARACTERISTIC_CONFIGURATION_UUID: Uuid = uuid_from_short(0x2902);

/// Expand a 16- or 32-bit short alias over the Bluetooth Base UUID.
pub const fn uuid_from_short(short: u32) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE_UUID.as_u128() | (short as u128) << 96)
}

// ----------------------------------------------------------------------------
// Property and Permission Sets
// ----------------------------------------------------------------------------

bitflags::bitflags! {
    /// Allowed operations on a characteristic value.
    ///
    /// Raw values match the platform characteristic property mask, which is
    /// also how they cross the bridge: the dynamic side carries an array of
    /// single-bit integers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CharacteristicProperties: u32 {
        const BROADCAST = 0x0001;
        const READ = 0x0002;
        const WRITE_WITHOUT_RESPONSE = 0x0004;
        const WRITE = 0x0008;
        const NOTIFY = 0x0010;
        const INDICATE = 0x0020;
        const AUTHENTICATED_SIGNED_WRITES = 0x0040;
        const EXTENDED_PROPERTIES = 0x0080;
        const NOTIFY_ENCRYPTION_REQUIRED = 0x0100;
        const INDICATE_ENCRYPTION_REQUIRED = 0x0200;
    }
}

bitflags::bitflags! {
    /// Read/write access control on a characteristic value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AttributePermissions: u32 {
        const READABLE = 0x01;
        const WRITEABLE = 0x02;
        const READ_ENCRYPTION_REQUIRED = 0x04;
        const WRITE_ENCRYPTION_REQUIRED = 0x08;
    }
}

// ----------------------------------------------------------------------------
// Manager State
// ----------------------------------------------------------------------------

/// Power/authorization state of the peripheral manager.
///
/// Raw values match the platform manager-state constants and are what the
/// dynamic side sees in state events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Unknown,
    Resetting,
    Unsupported,
    Unauthorized,
    PoweredOff,
    PoweredOn,
}

impl ManagerState {
    /// Numeric form used in event payloads
    pub fn as_raw(self) -> u8 {
        match self {
            ManagerState::Unknown => 0,
            ManagerState::Resetting => 1,
            ManagerState::Unsupported => 2,
            ManagerState::Unauthorized => 3,
            ManagerState::PoweredOff => 4,
            ManagerState::PoweredOn => 5,
        }
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(ManagerState::Unknown),
            1 => Some(ManagerState::Resetting),
            2 => Some(ManagerState::Unsupported),
            3 => Some(ManagerState::Unauthorized),
            4 => Some(ManagerState::PoweredOff),
            5 => Some(ManagerState::PoweredOn),
            _ => None,
        }
    }

    /// Whether stack operations other than state queries are usable
    pub fn is_powered_on(self) -> bool {
        self == ManagerState::PoweredOn
    }
}

// ----------------------------------------------------------------------------
// ATT Response Codes
// ----------------------------------------------------------------------------

/// Result code handed back to the stack when answering an ATT request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttResult {
    Success,
    InvalidHandle,
    ReadNotPermitted,
    WriteNotPermitted,
    InvalidPdu,
    InsufficientAuthentication,
    RequestNotSupported,
    InvalidOffset,
    InsufficientAuthorization,
    PrepareQueueFull,
    AttributeNotFound,
    AttributeNotLong,
    InsufficientEncryptionKeySize,
    InvalidAttributeValueLength,
    UnlikelyError,
    InsufficientEncryption,
    UnsupportedGroupType,
    InsufficientResources,
}

impl AttResult {
    /// ATT protocol error code (0 on success)
    pub fn as_raw(self) -> u8 {
        match self {
            AttResult::Success => 0x00,
            AttResult::InvalidHandle => 0x01,
            AttResult::ReadNotPermitted => 0x02,
            AttResult::WriteNotPermitted => 0x03,
            AttResult::InvalidPdu => 0x04,
            AttResult::InsufficientAuthentication => 0x05,
            AttResult::RequestNotSupported => 0x06,
            AttResult::InvalidOffset => 0x07,
            AttResult::InsufficientAuthorization => 0x08,
            AttResult::PrepareQueueFull => 0x09,
            AttResult::AttributeNotFound => 0x0A,
            AttResult::AttributeNotLong => 0x0B,
            AttResult::InsufficientEncryptionKeySize => 0x0C,
            AttResult::InvalidAttributeValueLength => 0x0D,
            AttResult::UnlikelyError => 0x0E,
            AttResult::InsufficientEncryption => 0x0F,
            AttResult::UnsupportedGroupType => 0x10,
            AttResult::InsufficientResources => 0x11,
        }
    }
}

// ----------------------------------------------------------------------------
// Services and Characteristics
// ----------------------------------------------------------------------------

/// A characteristic under construction or projection.
///
/// `value: None` marks a dynamic characteristic: the payload is produced
/// per-request by the application's read/write handling instead of being
/// cached in the attribute database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableCharacteristic {
    pub uuid: Uuid,
    pub properties: CharacteristicProperties,
    pub permissions: AttributePermissions,
    pub value: Option<Vec<u8>>,
}

impl MutableCharacteristic {
    pub fn new(
        uuid: Uuid,
        properties: CharacteristicProperties,
        permissions: AttributePermissions,
        value: Option<Vec<u8>>,
    ) -> Self {
        Self {
            uuid,
            properties,
            permissions,
            value,
        }
    }

    /// Whether the attribute database holds a cached value
    pub fn is_dynamic(&self) -> bool {
        self.value.is_none()
    }
}

/// A service owning its characteristics. Ownership keeps the
/// service/characteristic tree acyclic by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableService {
    pub uuid: Uuid,
    pub primary: bool,
    pub characteristics: Vec<MutableCharacteristic>,
}

impl MutableService {
    pub fn new(uuid: Uuid, primary: bool, characteristics: Vec<MutableCharacteristic>) -> Self {
        Self {
            uuid,
            primary,
            characteristics,
        }
    }
}

// ----------------------------------------------------------------------------
// Centrals and ATT Requests
// ----------------------------------------------------------------------------

/// Read-only handle for a remote central. The bridge never owns the
/// central's lifecycle; it only projects the handle into event payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Central {
    /// Stack-assigned identifier for this central
    pub identifier: Uuid,
    /// Largest update payload this central accepts, in bytes
    pub maximum_update_length: usize,
}

impl Central {
    pub fn new(identifier: Uuid, maximum_update_length: usize) -> Self {
        Self {
            identifier,
            maximum_update_length,
        }
    }
}

/// An ATT read or write request delivered by the stack, consumed
/// per-request. Reads carry no value; writes carry the bytes to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttRequest {
    pub central: Central,
    pub characteristic: MutableCharacteristic,
    pub value: Option<Vec<u8>>,
    pub offset: usize,
}

// ----------------------------------------------------------------------------
// Stack Errors
// ----------------------------------------------------------------------------

/// Failure reported by the platform stack.
///
/// These are expected operational outcomes (write not permitted, advertising
/// refused), not programming errors; the bridge projects them into the
/// dynamic error shape and hands them onward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{domain} error {code}: {message}")]
pub struct StackError {
    pub code: i64,
    pub message: String,
    pub domain: String,
}

impl StackError {
    pub fn new(code: i64, message: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            domain: domain.into(),
        }
    }
}
