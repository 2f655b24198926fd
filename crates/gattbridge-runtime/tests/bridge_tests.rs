//! End-to-end bridge tests over a scripted stack double
//!
//! Drives the peripheral-manager adapter the way an embedding would: dynamic
//! arguments in, typed stack calls out, scripted delegate callbacks back in,
//! named events out. The double records every stack call so the tests can
//! assert that malformed arguments never reach the platform side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use gattbridge_runtime::{
    delegate_channel, uuid_from_short, AdvertisingData, AttRequest, AttResult,
    AttributePermissions, BridgeError, Central, CharacteristicProperties, DelegateEvent,
    DelegateReceiver, DelegateSender, ManagerOptions, ManagerState, MutableCharacteristic,
    MutableService, PeripheralManager, PeripheralStack, StackError, EVENT_DID_RECEIVE_READ_REQUEST,
    EVENT_DID_SUBSCRIBE, EVENT_DID_UPDATE_STATE, EVENT_READY_TO_UPDATE_SUBSCRIBERS,
};

// ----------------------------------------------------------------------------
// Scripted Stack Double
// ----------------------------------------------------------------------------

#[derive(Default)]
struct Recorded {
    options: Option<ManagerOptions>,
    added_services: Vec<MutableService>,
    removed_services: Vec<Uuid>,
    advertising_data: Vec<AdvertisingData>,
    updates: Vec<(Uuid, Vec<u8>, Option<Vec<Uuid>>)>,
    responses: Vec<(AttRequest, AttResult)>,
}

struct ScriptedStack {
    delegate: Mutex<Option<DelegateReceiver>>,
    recorded: Mutex<Recorded>,
    advertising: AtomicBool,
    refuse_advertising: AtomicBool,
    update_ready: AtomicBool,
}

impl ScriptedStack {
    /// Returns the double plus the sender the test script uses to play
    /// delegate callbacks.
    fn new() -> (Arc<Self>, DelegateSender) {
        let (sender, receiver) = delegate_channel();
        let stack = Arc::new(Self {
            delegate: Mutex::new(Some(receiver)),
            recorded: Mutex::new(Recorded::default()),
            advertising: AtomicBool::new(false),
            refuse_advertising: AtomicBool::new(false),
            update_ready: AtomicBool::new(true),
        });
        (stack, sender)
    }

    fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

#[async_trait]
impl PeripheralStack for ScriptedStack {
    async fn create_manager(&self, options: &ManagerOptions) -> Result<(), StackError> {
        self.recorded().options = Some(options.clone());
        Ok(())
    }

    fn take_delegate(&self) -> Option<DelegateReceiver> {
        self.delegate.lock().unwrap().take()
    }

    async fn state(&self) -> ManagerState {
        ManagerState::PoweredOn
    }

    async fn add_service(&self, service: &MutableService) -> Result<(), StackError> {
        self.recorded().added_services.push(service.clone());
        Ok(())
    }

    async fn remove_service(&self, uuid: &Uuid) -> Result<(), StackError> {
        self.recorded().removed_services.push(*uuid);
        Ok(())
    }

    async fn remove_all_services(&self) -> Result<(), StackError> {
        self.recorded().added_services.clear();
        Ok(())
    }

    async fn start_advertising(&self, data: &AdvertisingData) -> Result<(), StackError> {
        if self.refuse_advertising.load(Ordering::SeqCst) {
            return Err(StackError::new(9, "Advertising is refused.", "CoreBLE"));
        }
        self.recorded().advertising_data.push(data.clone());
        self.advertising.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_advertising(&self) -> Result<(), StackError> {
        self.advertising.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        self.advertising.load(Ordering::SeqCst)
    }

    async fn update_value(
        &self,
        characteristic: &Uuid,
        value: &[u8],
        centrals: Option<&[Uuid]>,
    ) -> Result<bool, StackError> {
        self.recorded().updates.push((
            *characteristic,
            value.to_vec(),
            centrals.map(<[Uuid]>::to_vec),
        ));
        Ok(self.update_ready.load(Ordering::SeqCst))
    }

    async fn respond(&self, request: &AttRequest, result: AttResult) -> Result<(), StackError> {
        self.recorded().responses.push((request.clone(), result));
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Test Utilities
// ----------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn heart_rate_service() -> Value {
    json!({
        "uuid": "180D",
        "primary": true,
        "characteristics": [
            { "uuid": "2A37", "properties": [16], "permissions": [1] },
        ],
    })
}

fn measurement_characteristic() -> MutableCharacteristic {
    MutableCharacteristic::new(
        uuid_from_short(0x2A37),
        CharacteristicProperties::NOTIFY,
        AttributePermissions::READABLE,
        None,
    )
}

fn read_request() -> AttRequest {
    AttRequest {
        central: Central::new(Uuid::from_u128(0x42), 182),
        characteristic: measurement_characteristic(),
        value: None,
        offset: 0,
    }
}

async fn created_manager() -> (Arc<ScriptedStack>, DelegateSender, PeripheralManager) {
    init_tracing();
    let (stack, script) = ScriptedStack::new();
    let manager = PeripheralManager::create(stack.clone(), ManagerOptions::default())
        .await
        .unwrap();
    (stack, script, manager)
}

// ----------------------------------------------------------------------------
// Manager Operations
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_create_passes_options_and_reports_state() {
    init_tracing();
    let (stack, _script) = ScriptedStack::new();
    let options = ManagerOptions::new()
        .with_show_power_alert(true)
        .with_restore_identifier("bridge-tests".to_string());
    let manager = PeripheralManager::create(stack.clone(), options).await.unwrap();

    let recorded = stack.recorded().options.clone().unwrap();
    assert!(recorded.show_power_alert);
    assert_eq!(recorded.restore_identifier.as_deref(), Some("bridge-tests"));
    assert_eq!(manager.state().await, ManagerState::PoweredOn);
}

#[tokio::test]
async fn test_create_twice_fails_without_a_delegate() {
    init_tracing();
    let (stack, _script) = ScriptedStack::new();
    let _manager = PeripheralManager::create(stack.clone(), ManagerOptions::default())
        .await
        .unwrap();

    let err = PeripheralManager::create(stack, ManagerOptions::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, BridgeError::DelegateAlreadyTaken));
}

#[tokio::test]
async fn test_add_service_decodes_then_publishes() {
    let (stack, _script, manager) = created_manager().await;

    manager.add_service(&heart_rate_service()).await.unwrap();

    let recorded = stack.recorded();
    assert_eq!(recorded.added_services.len(), 1);
    let service = &recorded.added_services[0];
    assert_eq!(service.uuid, uuid_from_short(0x180D));
    assert!(service.primary);
    assert_eq!(service.characteristics, vec![measurement_characteristic()]);
}

#[tokio::test]
async fn test_malformed_service_never_reaches_the_stack() {
    let (stack, _script, manager) = created_manager().await;

    let mut service = heart_rate_service();
    service["characteristics"][0]["properties"] = json!([16, 1024]);

    let err = manager.add_service(&service).await.err().unwrap();
    assert!(err.to_string().contains("characteristics[0]"), "got: {err}");
    assert!(matches!(err, BridgeError::Convert(_)));
    assert!(stack.recorded().added_services.is_empty());
}

#[tokio::test]
async fn test_advertising_round_trip() {
    let (stack, _script, manager) = created_manager().await;

    manager
        .start_advertising(&json!(["180D"]), Some(&json!("HRM")))
        .await
        .unwrap();
    assert!(manager.is_advertising());
    {
        let recorded = stack.recorded();
        assert_eq!(
            recorded.advertising_data[0],
            AdvertisingData {
                service_uuids: vec![uuid_from_short(0x180D)],
                local_name: Some("HRM".to_string()),
            }
        );
    }

    manager.stop_advertising().await.unwrap();
    assert!(!manager.is_advertising());
}

#[tokio::test]
async fn test_invalid_advertising_arguments_abort_before_the_stack() {
    let (stack, _script, manager) = created_manager().await;

    let err = manager
        .start_advertising(&json!(["not-a-uuid"]), None)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, BridgeError::Convert(_)));
    assert!(stack.recorded().advertising_data.is_empty());
    assert!(!manager.is_advertising());
}

#[tokio::test]
async fn test_stack_refusal_surfaces_as_stack_error() {
    let (stack, _script, manager) = created_manager().await;
    stack.refuse_advertising.store(true, Ordering::SeqCst);

    let err = manager
        .start_advertising(&json!([]), None)
        .await
        .err()
        .unwrap();
    match err {
        BridgeError::Stack(stack_error) => {
            assert_eq!(stack_error.code, 9);
            assert_eq!(stack_error.domain, "CoreBLE");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_update_value_decodes_and_returns_ready_flag() {
    let (stack, _script, manager) = created_manager().await;
    stack.update_ready.store(false, Ordering::SeqCst);

    let sent = manager
        .update_value(&json!("2A37"), &json!("QUJD"), Some(&json!(null)))
        .await
        .unwrap();
    assert!(!sent);

    let recorded = stack.recorded();
    let (characteristic, value, centrals) = &recorded.updates[0];
    assert_eq!(*characteristic, uuid_from_short(0x2A37));
    assert_eq!(value, b"ABC");
    assert_eq!(*centrals, None);
}

#[tokio::test]
async fn test_respond_passes_the_request_back_unchanged() {
    let (stack, _script, manager) = created_manager().await;

    let request = read_request();
    manager
        .respond(&request, AttResult::ReadNotPermitted)
        .await
        .unwrap();

    let recorded = stack.recorded();
    assert_eq!(recorded.responses.len(), 1);
    assert_eq!(recorded.responses[0].0, request);
    assert_eq!(recorded.responses[0].1, AttResult::ReadNotPermitted);
}

// ----------------------------------------------------------------------------
// Delegate Event Flow
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_delegate_callbacks_arrive_as_named_events_in_order() {
    let (_stack, script, manager) = created_manager().await;
    let mut events = manager.events().subscribe();

    script
        .send(DelegateEvent::StateUpdated {
            state: ManagerState::PoweredOn,
        })
        .unwrap();
    script
        .send(DelegateEvent::CentralSubscribed {
            central: Central::new(Uuid::from_u128(0x42), 182),
            characteristic: measurement_characteristic(),
        })
        .unwrap();
    script
        .send(DelegateEvent::ReadRequestReceived {
            request: read_request(),
        })
        .unwrap();

    let state = events.recv().await.unwrap();
    assert_eq!(state.name, EVENT_DID_UPDATE_STATE);
    assert_eq!(state.payload, json!({ "state": 5 }));

    let subscribed = events.recv().await.unwrap();
    assert_eq!(subscribed.name, EVENT_DID_SUBSCRIBE);
    assert_eq!(
        subscribed.payload["characteristic"]["uuid"],
        json!("00002A37-0000-1000-8000-00805F9B34FB")
    );

    let read = events.recv().await.unwrap();
    assert_eq!(read.name, EVENT_DID_RECEIVE_READ_REQUEST);
    assert_eq!(read.payload["offset"], json!(0));
    assert!(read.payload.get("value").is_none());
}

#[tokio::test]
async fn test_ready_to_update_event_signals_retry() {
    let (stack, script, manager) = created_manager().await;
    let mut events = manager.events().subscribe();
    stack.update_ready.store(false, Ordering::SeqCst);

    let sent = manager
        .update_value(&json!("2A37"), &json!("QUJD"), None)
        .await
        .unwrap();
    assert!(!sent);

    // The stack drains its queue and signals readiness; the retry succeeds.
    script.send(DelegateEvent::ReadyToUpdateSubscribers).unwrap();
    let ready = events.recv().await.unwrap();
    assert_eq!(ready.name, EVENT_READY_TO_UPDATE_SUBSCRIBERS);

    stack.update_ready.store(true, Ordering::SeqCst);
    let sent = manager
        .update_value(&json!("2A37"), &json!("QUJD"), None)
        .await
        .unwrap();
    assert!(sent);
}

#[tokio::test]
async fn test_dropping_the_manager_stops_the_pump() {
    let (_stack, script, manager) = created_manager().await;
    drop(manager);

    // The pump is gone; the scripted sender eventually observes the closed
    // channel once the abort lands.
    for _ in 0..100 {
        if script
            .send(DelegateEvent::ReadyToUpdateSubscribers)
            .is_err()
        {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("delegate channel still open after manager drop");
}
