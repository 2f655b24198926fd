//! Consumed surface of the platform peripheral stack
//!
//! The bridge drives the platform's peripheral manager through this trait
//! and never implements it: the embedding supplies the real stack, tests
//! supply a scripted double. Platform failures cross the boundary as
//! `StackError` values; the bridge projects them without interpreting them.

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use gattbridge_core::{AttRequest, AttResult, ManagerState, MutableService, StackError};

use crate::config::{AdvertisingData, ManagerOptions};
use crate::events::DelegateEvent;

// ----------------------------------------------------------------------------
// Delegate Channel
// ----------------------------------------------------------------------------

/// Sender half the stack uses to deliver delegate callbacks.
///
/// Unbounded on purpose: a delegate callback must hand its event over and
/// return without ever blocking on the application side.
pub type DelegateSender = mpsc::UnboundedSender<DelegateEvent>;

/// Receiver half the bridge pumps into the event channel.
pub type DelegateReceiver = mpsc::UnboundedReceiver<DelegateEvent>;

/// Create the delegate channel pair.
pub fn delegate_channel() -> (DelegateSender, DelegateReceiver) {
    mpsc::unbounded_channel()
}

// ----------------------------------------------------------------------------
// Peripheral Stack Trait
// ----------------------------------------------------------------------------

/// The platform peripheral stack, as consumed by the bridge.
#[async_trait]
pub trait PeripheralStack: Send + Sync {
    /// Initialize the platform manager with the given options. Called once,
    /// when the bridge-side manager is created.
    async fn create_manager(&self, options: &ManagerOptions) -> Result<(), StackError>;

    /// Hand over the delegate callback stream. Yields the receiver exactly
    /// once; later calls return `None`.
    fn take_delegate(&self) -> Option<DelegateReceiver>;

    /// Current power/authorization state
    async fn state(&self) -> ManagerState;

    /// Publish a service and its characteristics to the attribute database
    async fn add_service(&self, service: &MutableService) -> Result<(), StackError>;

    /// Remove a previously published service
    async fn remove_service(&self, uuid: &Uuid) -> Result<(), StackError>;

    /// Remove every published service
    async fn remove_all_services(&self) -> Result<(), StackError>;

    /// Start advertising with the given payload
    async fn start_advertising(&self, data: &AdvertisingData) -> Result<(), StackError>;

    /// Stop advertising
    async fn stop_advertising(&self) -> Result<(), StackError>;

    /// Whether an advertisement is currently on air
    fn is_advertising(&self) -> bool;

    /// Push an updated characteristic value to subscribed centrals
    /// (all of them when `centrals` is `None`). Returns `false` when the
    /// update queue is full; retry after the ready-to-update callback.
    async fn update_value(
        &self,
        characteristic: &Uuid,
        value: &[u8],
        centrals: Option<&[Uuid]>,
    ) -> Result<bool, StackError>;

    /// Answer an ATT request with a result code
    async fn respond(&self, request: &AttRequest, result: AttResult) -> Result<(), StackError>;
}
