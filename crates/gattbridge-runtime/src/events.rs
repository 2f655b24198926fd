//! Delegate callbacks and their named event projections
//!
//! Each platform delegate callback becomes exactly one named event whose
//! payload is built from the converter projections. The application layer
//! matches on the name constants; payload shapes follow the projection
//! contracts of `gattbridge_core::convert`.

use serde_json::{Map, Value};

use gattbridge_core::convert::{
    central_to_value, characteristic_to_value, error_to_value, request_to_value, service_to_value,
};
use gattbridge_core::{
    AttRequest, Central, ManagerState, MutableCharacteristic, MutableService, StackError,
};

// ----------------------------------------------------------------------------
// Event Names
// ----------------------------------------------------------------------------

pub const EVENT_DID_UPDATE_STATE: &str = "peripheralManagerDidUpdateState";
pub const EVENT_DID_START_ADVERTISING: &str = "peripheralManagerDidStartAdvertising";
pub const EVENT_DID_ADD_SERVICE: &str = "peripheralManagerDidAddService";
pub const EVENT_DID_SUBSCRIBE: &str = "peripheralManagerCentralDidSubscribe";
pub const EVENT_DID_UNSUBSCRIBE: &str = "peripheralManagerCentralDidUnsubscribe";
pub const EVENT_DID_RECEIVE_READ_REQUEST: &str = "peripheralManagerDidReceiveReadRequest";
pub const EVENT_DID_RECEIVE_WRITE_REQUESTS: &str = "peripheralManagerDidReceiveWriteRequests";
pub const EVENT_READY_TO_UPDATE_SUBSCRIBERS: &str = "peripheralManagerIsReadyToUpdateSubscribers";

/// All event names the bridge can emit, in delegate-callback order.
pub const EVENT_NAMES: [&str; 8] = [
    EVENT_DID_UPDATE_STATE,
    EVENT_DID_START_ADVERTISING,
    EVENT_DID_ADD_SERVICE,
    EVENT_DID_SUBSCRIBE,
    EVENT_DID_UNSUBSCRIBE,
    EVENT_DID_RECEIVE_READ_REQUEST,
    EVENT_DID_RECEIVE_WRITE_REQUESTS,
    EVENT_READY_TO_UPDATE_SUBSCRIBERS,
];

// ----------------------------------------------------------------------------
// Delegate Events
// ----------------------------------------------------------------------------

/// One platform delegate callback, as delivered by the stack's event stream.
#[derive(Debug, Clone)]
pub enum DelegateEvent {
    /// Manager power/authorization state changed
    StateUpdated { state: ManagerState },
    /// Advertising started, or failed to
    AdvertisingStarted { error: Option<StackError> },
    /// A service was published, or rejected
    ServiceAdded {
        service: MutableService,
        error: Option<StackError>,
    },
    /// A central subscribed to a characteristic's notifications
    CentralSubscribed {
        central: Central,
        characteristic: MutableCharacteristic,
    },
    /// A central dropped its subscription
    CentralUnsubscribed {
        central: Central,
        characteristic: MutableCharacteristic,
    },
    /// An ATT read request arrived
    ReadRequestReceived { request: AttRequest },
    /// One or more ATT write requests arrived. The stack batches these;
    /// answering the first request answers the batch.
    WriteRequestsReceived { requests: Vec<AttRequest> },
    /// The update queue drained; a failed `update_value` may be retried
    ReadyToUpdateSubscribers,
}

/// A named event plus its dynamic payload, ready for the application layer.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub name: &'static str,
    pub payload: Value,
}

impl DelegateEvent {
    /// Name this callback is published under
    pub fn name(&self) -> &'static str {
        match self {
            DelegateEvent::StateUpdated { .. } => EVENT_DID_UPDATE_STATE,
            DelegateEvent::AdvertisingStarted { .. } => EVENT_DID_START_ADVERTISING,
            DelegateEvent::ServiceAdded { .. } => EVENT_DID_ADD_SERVICE,
            DelegateEvent::CentralSubscribed { .. } => EVENT_DID_SUBSCRIBE,
            DelegateEvent::CentralUnsubscribed { .. } => EVENT_DID_UNSUBSCRIBE,
            DelegateEvent::ReadRequestReceived { .. } => EVENT_DID_RECEIVE_READ_REQUEST,
            DelegateEvent::WriteRequestsReceived { .. } => EVENT_DID_RECEIVE_WRITE_REQUESTS,
            DelegateEvent::ReadyToUpdateSubscribers => EVENT_READY_TO_UPDATE_SUBSCRIBERS,
        }
    }

    /// Build the outbound event. One callback, one event; the payload is a
    /// fresh value owning none of the typed input.
    pub fn into_emitted(self) -> EmittedEvent {
        let name = self.name();
        let payload = match self {
            DelegateEvent::StateUpdated { state } => {
                let mut dict = Map::new();
                dict.insert("state".into(), state.as_raw().into());
                Value::Object(dict)
            }
            DelegateEvent::AdvertisingStarted { error } => error_payload(Map::new(), error),
            DelegateEvent::ServiceAdded { service, error } => {
                let mut dict = Map::new();
                dict.insert("service".into(), service_to_value(&service));
                error_payload(dict, error)
            }
            DelegateEvent::CentralSubscribed {
                central,
                characteristic,
            }
            | DelegateEvent::CentralUnsubscribed {
                central,
                characteristic,
            } => {
                let mut dict = Map::new();
                dict.insert("central".into(), central_to_value(&central));
                dict.insert(
                    "characteristic".into(),
                    characteristic_to_value(&characteristic),
                );
                Value::Object(dict)
            }
            DelegateEvent::ReadRequestReceived { request } => request_to_value(&request),
            DelegateEvent::WriteRequestsReceived { requests } => {
                let mut dict = Map::new();
                dict.insert(
                    "requests".into(),
                    Value::Array(requests.iter().map(request_to_value).collect()),
                );
                Value::Object(dict)
            }
            DelegateEvent::ReadyToUpdateSubscribers => Value::Object(Map::new()),
        };
        EmittedEvent { name, payload }
    }
}

/// The `error` key is present only when the stack reported a failure.
fn error_payload(mut dict: Map<String, Value>, error: Option<StackError>) -> Value {
    if let Some(error) = &error {
        dict.insert("error".into(), error_to_value(error));
    }
    Value::Object(dict)
}
