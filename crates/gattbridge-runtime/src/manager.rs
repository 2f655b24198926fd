//! Application-facing peripheral manager adapter
//!
//! Every operation takes its arguments in the dynamic shape the runtime
//! sends, decodes them through the converter, and only then touches the
//! stack — a malformed argument aborts the call before any platform state
//! changes. Delegate callbacks flow the other way: a pump task drains the
//! stack's delegate stream into the event bridge for the lifetime of the
//! manager.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use gattbridge_core::convert::{data_from_value, null_safe, service_from_value, uuid_from_value};
use gattbridge_core::{AttRequest, AttResult, ConvertError, ManagerState};

use crate::config::{AdvertisingData, ManagerOptions};
use crate::emitter::{pump_delegate_events, EventBridge};
use crate::error::{BridgeError, Result};
use crate::stack::PeripheralStack;

// ----------------------------------------------------------------------------
// Peripheral Manager
// ----------------------------------------------------------------------------

/// Bridge-side handle for the platform peripheral manager.
pub struct PeripheralManager {
    stack: Arc<dyn PeripheralStack>,
    events: EventBridge,
    pump: JoinHandle<()>,
}

impl PeripheralManager {
    /// Create the platform manager and start forwarding its delegate
    /// callbacks as named events.
    pub async fn create(stack: Arc<dyn PeripheralStack>, options: ManagerOptions) -> Result<Self> {
        let events = EventBridge::new(options.event_capacity);
        stack.create_manager(&options).await?;
        let delegate = stack
            .take_delegate()
            .ok_or(BridgeError::DelegateAlreadyTaken)?;
        let pump = tokio::spawn(pump_delegate_events(delegate, events.clone()));
        info!(
            show_power_alert = options.show_power_alert,
            restore_identifier = options.restore_identifier.as_deref(),
            "peripheral manager created"
        );
        Ok(Self {
            stack,
            events,
            pump,
        })
    }

    /// Handle for subscribing to the named event stream
    pub fn events(&self) -> &EventBridge {
        &self.events
    }

    /// Current manager state
    pub async fn state(&self) -> ManagerState {
        self.stack.state().await
    }

    /// Start advertising. `service_uuids` is a dynamic array of UUID text;
    /// `local_name` may be text, null, or absent.
    pub async fn start_advertising(
        &self,
        service_uuids: &Value,
        local_name: Option<&Value>,
    ) -> Result<()> {
        let data = AdvertisingData::from_values(service_uuids, local_name)?;
        self.stack.start_advertising(&data).await?;
        info!(services = data.service_uuids.len(), "advertising started");
        Ok(())
    }

    /// Stop advertising
    pub async fn stop_advertising(&self) -> Result<()> {
        self.stack.stop_advertising().await?;
        info!("advertising stopped");
        Ok(())
    }

    /// Whether an advertisement is currently on air
    pub fn is_advertising(&self) -> bool {
        self.stack.is_advertising()
    }

    /// Decode and publish a service descriptor. The whole call aborts on the
    /// first malformed field; no partial service ever reaches the stack.
    pub async fn add_service(&self, service: &Value) -> Result<()> {
        let service = service_from_value(service)?;
        debug!(
            uuid = %service.uuid,
            characteristics = service.characteristics.len(),
            "adding service"
        );
        self.stack.add_service(&service).await?;
        Ok(())
    }

    /// Remove a previously published service by UUID text
    pub async fn remove_service(&self, uuid: &Value) -> Result<()> {
        let uuid = uuid_from_value("serviceUUID", uuid)?;
        self.stack.remove_service(&uuid).await?;
        debug!(%uuid, "service removed");
        Ok(())
    }

    /// Remove every published service
    pub async fn remove_all_services(&self) -> Result<()> {
        self.stack.remove_all_services().await?;
        debug!("all services removed");
        Ok(())
    }

    /// Push an updated characteristic value to subscribed centrals.
    ///
    /// `characteristic` is UUID text, `value` base64 text, `centrals` an
    /// optional array of central identifier text (all subscribers when
    /// absent or null). Returns the stack's ready flag: `false` means the
    /// update queue was full and the caller should retry after the
    /// ready-to-update event.
    pub async fn update_value(
        &self,
        characteristic: &Value,
        value: &Value,
        centrals: Option<&Value>,
    ) -> Result<bool> {
        let characteristic = uuid_from_value("characteristicUUID", characteristic)?;
        let value = data_from_value("value", value)?;
        let centrals = decode_central_ids(centrals)?;
        let sent = self
            .stack
            .update_value(&characteristic, &value, centrals.as_deref())
            .await?;
        Ok(sent)
    }

    /// Answer an ATT request. Responses go straight to the stack; they never
    /// travel through the event bridge.
    pub async fn respond(&self, request: &AttRequest, result: AttResult) -> Result<()> {
        self.stack.respond(request, result).await?;
        Ok(())
    }
}

impl Drop for PeripheralManager {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

fn decode_central_ids(centrals: Option<&Value>) -> Result<Option<Vec<Uuid>>> {
    let list = match null_safe(centrals) {
        Some(value) => value.as_array().ok_or(ConvertError::TypeMismatch {
            field: "centralUUIDs",
            expected: "array",
        })?,
        None => return Ok(None),
    };
    let mut ids = Vec::with_capacity(list.len());
    for item in list {
        ids.push(uuid_from_value("centralUUIDs", item)?);
    }
    Ok(Some(ids))
}
