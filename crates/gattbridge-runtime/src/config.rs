//! Peripheral manager configuration

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use gattbridge_core::convert::{null_safe, uuid_from_value};
use gattbridge_core::ConvertError;

// ----------------------------------------------------------------------------
// Manager Options
// ----------------------------------------------------------------------------

/// Options handed to the platform stack when the peripheral manager is
/// created. Mirrors the platform's manager initialization dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerOptions {
    /// Ask the platform to alert the user if Bluetooth is powered off
    pub show_power_alert: bool,
    /// Opaque key under which the platform restores manager state across
    /// process relaunches
    pub restore_identifier: Option<String>,
    /// Capacity of the outbound event channel
    pub event_capacity: usize,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            show_power_alert: false,
            restore_identifier: None,
            event_capacity: 32,
        }
    }
}

impl ManagerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the platform power alert
    pub fn with_show_power_alert(mut self, enabled: bool) -> Self {
        self.show_power_alert = enabled;
        self
    }

    /// Set the state-restoration identifier
    pub fn with_restore_identifier(mut self, identifier: String) -> Self {
        self.restore_identifier = Some(identifier);
        self
    }

    /// Set the outbound event channel capacity
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

// ----------------------------------------------------------------------------
// Advertising Data
// ----------------------------------------------------------------------------

/// Typed advertising payload handed to the stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisingData {
    /// Service UUIDs announced in the advertisement
    pub service_uuids: Vec<Uuid>,
    /// Local device name, when the advertisement carries one
    pub local_name: Option<String>,
}

impl AdvertisingData {
    /// Decode the dynamic advertising arguments: an array of UUID text and
    /// an optional (possibly null) local name.
    pub fn from_values(
        service_uuids: &Value,
        local_name: Option<&Value>,
    ) -> Result<Self, ConvertError> {
        let items = service_uuids
            .as_array()
            .ok_or(ConvertError::TypeMismatch {
                field: "serviceUUIDs",
                expected: "array",
            })?;
        let mut uuids = Vec::with_capacity(items.len());
        for item in items {
            uuids.push(uuid_from_value("serviceUUIDs", item)?);
        }

        let local_name = match null_safe(local_name) {
            Some(value) => Some(
                value
                    .as_str()
                    .ok_or(ConvertError::TypeMismatch {
                        field: "localName",
                        expected: "string",
                    })?
                    .to_owned(),
            ),
            None => None,
        };

        Ok(Self {
            service_uuids: uuids,
            local_name,
        })
    }
}
