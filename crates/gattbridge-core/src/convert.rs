//! Bidirectional conversion between dynamic runtime values and GATT types
//!
//! Dynamic values are `serde_json::Value`, the shape the application runtime
//! speaks. Every decode either returns a fully populated typed object or
//! fails at the offending field; every projection is a pure function of its
//! input and retains nothing. All functions here are stateless and safe to
//! call from any thread.

use base64::{engine::general_purpose, Engine as _};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{ConvertError, FlagKind};
use crate::gatt::{
    uuid_from_short, AttRequest, AttributePermissions, Central, CharacteristicProperties,
    MutableCharacteristic, MutableService, StackError,
};

// ----------------------------------------------------------------------------
// Dynamic → Typed
// ----------------------------------------------------------------------------

/// Truthy coercion of any dynamic value. Never fails.
///
/// Absence, null, `false`, numeric zero, and the empty string are falsy;
/// everything else (including empty arrays and objects) is truthy, matching
/// the runtime's own coercion rules.
pub fn bool_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Normalize the two dynamic absence representations (missing key and the
/// null sentinel) to one, so downstream decodes never branch on which form
/// the runtime delivered.
pub fn null_safe(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        some => some,
    }
}

/// Decode a base64 text value into raw bytes.
pub fn data_from_value(field: &'static str, value: &Value) -> Result<Vec<u8>, ConvertError> {
    let text = value.as_str().ok_or(ConvertError::TypeMismatch {
        field,
        expected: "string",
    })?;
    general_purpose::STANDARD
        .decode(text)
        .map_err(|source| ConvertError::InvalidBase64 { field, source })
}

/// Decode an array of single-bit integers into a property set.
///
/// Elements carrying unknown bit positions are rejected, never masked.
pub fn properties_from_value(
    field: &'static str,
    value: &Value,
) -> Result<CharacteristicProperties, ConvertError> {
    decode_flags(field, value, FlagKind::Property, CharacteristicProperties::from_bits)
}

/// Decode an array of single-bit integers into a permission set.
pub fn permissions_from_value(
    field: &'static str,
    value: &Value,
) -> Result<AttributePermissions, ConvertError> {
    decode_flags(field, value, FlagKind::Permission, AttributePermissions::from_bits)
}

fn decode_flags<F>(
    field: &'static str,
    value: &Value,
    kind: FlagKind,
    from_bits: impl Fn(u32) -> Option<F>,
) -> Result<F, ConvertError>
where
    F: std::ops::BitOrAssign + Default,
{
    let items = value.as_array().ok_or(ConvertError::TypeMismatch {
        field,
        expected: "array",
    })?;
    let mut flags = F::default();
    for item in items {
        let raw = item.as_u64().ok_or(ConvertError::TypeMismatch {
            field,
            expected: "array of numbers",
        })?;
        let flag = u32::try_from(raw)
            .ok()
            .and_then(&from_bits)
            .ok_or(ConvertError::UnknownFlag { kind, value: raw })?;
        flags |= flag;
    }
    Ok(flags)
}

/// Decode a UUID text value.
///
/// Accepts the canonical dashed 128-bit form (case-insensitive) and the
/// platform's 4- or 8-digit hex short aliases, which expand over the
/// Bluetooth Base UUID.
pub fn uuid_from_value(field: &'static str, value: &Value) -> Result<Uuid, ConvertError> {
    let text = value.as_str().ok_or(ConvertError::TypeMismatch {
        field,
        expected: "string",
    })?;
    parse_uuid_text(text).ok_or_else(|| ConvertError::InvalidUuid {
        field,
        value: text.to_owned(),
    })
}

fn parse_uuid_text(text: &str) -> Option<Uuid> {
    match text.len() {
        4 | 8 if text.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u32::from_str_radix(text, 16).ok().map(uuid_from_short)
        }
        36 => Uuid::try_parse(text).ok(),
        _ => None,
    }
}

/// Decode a characteristic dictionary.
///
/// Required keys: `uuid` (text), `properties` (integer array), `permissions`
/// (integer array). Optional `value` (base64 text); when absent the
/// characteristic is dynamic and its payload comes from read/write handling.
pub fn characteristic_from_value(value: &Value) -> Result<MutableCharacteristic, ConvertError> {
    let dict = value.as_object().ok_or(ConvertError::TypeMismatch {
        field: "characteristic",
        expected: "object",
    })?;

    let uuid = uuid_from_value("uuid", required(dict, "uuid", "string")?)?;
    let properties = properties_from_value("properties", required(dict, "properties", "array")?)?;
    let permissions = permissions_from_value("permissions", required(dict, "permissions", "array")?)?;
    let payload = match null_safe(dict.get("value")) {
        Some(value) => Some(data_from_value("value", value)?),
        None => None,
    };

    Ok(MutableCharacteristic::new(uuid, properties, permissions, payload))
}

/// Decode a service dictionary.
///
/// Required keys: `uuid` (text), `primary` (boolean coercion), and
/// `characteristics` (array of characteristic dictionaries). The first
/// nested characteristic failure aborts the whole decode, wrapped with the
/// offending index; no partially populated service is ever returned.
pub fn service_from_value(value: &Value) -> Result<MutableService, ConvertError> {
    let dict = value.as_object().ok_or(ConvertError::TypeMismatch {
        field: "service",
        expected: "object",
    })?;

    let uuid = uuid_from_value("uuid", required(dict, "uuid", "string")?)?;
    let primary = bool_value(dict.get("primary").unwrap_or(&Value::Null));

    let list = required(dict, "characteristics", "array")?
        .as_array()
        .ok_or(ConvertError::TypeMismatch {
            field: "characteristics",
            expected: "array",
        })?;

    let mut characteristics = Vec::with_capacity(list.len());
    for (index, item) in list.iter().enumerate() {
        let characteristic =
            characteristic_from_value(item).map_err(|source| ConvertError::InCharacteristic {
                index,
                source: Box::new(source),
            })?;
        characteristics.push(characteristic);
    }

    Ok(MutableService::new(uuid, primary, characteristics))
}

fn required<'a>(
    dict: &'a Map<String, Value>,
    field: &'static str,
    expected: &'static str,
) -> Result<&'a Value, ConvertError> {
    null_safe(dict.get(field)).ok_or(ConvertError::TypeMismatch { field, expected })
}

// ----------------------------------------------------------------------------
// Typed → Dynamic
// ----------------------------------------------------------------------------

/// Project a UUID into its canonical dashed uppercase text form.
pub fn uuid_to_value(uuid: &Uuid) -> Value {
    Value::String(uuid.hyphenated().to_string().to_uppercase())
}

/// Project raw bytes into base64 text. An empty buffer encodes to empty text.
pub fn data_to_value(data: &[u8]) -> Value {
    Value::String(general_purpose::STANDARD.encode(data))
}

/// Project a property set into its single-bit integer array.
pub fn properties_to_value(properties: CharacteristicProperties) -> Value {
    Value::Array(properties.iter().map(|flag| flag.bits().into()).collect())
}

/// Project a permission set into its single-bit integer array.
pub fn permissions_to_value(permissions: AttributePermissions) -> Value {
    Value::Array(permissions.iter().map(|flag| flag.bits().into()).collect())
}

/// Project a central handle. Carries the identifier and the central's
/// maximum update payload length.
pub fn central_to_value(central: &Central) -> Value {
    let mut dict = Map::new();
    dict.insert("identifier".into(), uuid_to_value(&central.identifier));
    dict.insert(
        "maximumUpdateLength".into(),
        central.maximum_update_length.into(),
    );
    Value::Object(dict)
}

/// Project a characteristic. The `value` key is present only when the
/// attribute database holds a cached payload.
pub fn characteristic_to_value(characteristic: &MutableCharacteristic) -> Value {
    let mut dict = Map::new();
    dict.insert("uuid".into(), uuid_to_value(&characteristic.uuid));
    dict.insert(
        "properties".into(),
        properties_to_value(characteristic.properties),
    );
    dict.insert(
        "permissions".into(),
        permissions_to_value(characteristic.permissions),
    );
    if let Some(value) = &characteristic.value {
        dict.insert("value".into(), data_to_value(value));
    }
    Value::Object(dict)
}

/// Project a service with its owned characteristics.
pub fn service_to_value(service: &MutableService) -> Value {
    let mut dict = Map::new();
    dict.insert("uuid".into(), uuid_to_value(&service.uuid));
    dict.insert("primary".into(), Value::Bool(service.primary));
    dict.insert(
        "characteristics".into(),
        Value::Array(
            service
                .characteristics
                .iter()
                .map(characteristic_to_value)
                .collect(),
        ),
    );
    Value::Object(dict)
}

/// Project an ATT request. Reads carry no `value` key.
pub fn request_to_value(request: &AttRequest) -> Value {
    let mut dict = Map::new();
    dict.insert("central".into(), central_to_value(&request.central));
    dict.insert(
        "characteristic".into(),
        characteristic_to_value(&request.characteristic),
    );
    if let Some(value) = &request.value {
        dict.insert("value".into(), data_to_value(value));
    }
    dict.insert("offset".into(), request.offset.into());
    Value::Object(dict)
}

/// Project a stack-reported failure.
pub fn error_to_value(error: &StackError) -> Value {
    let mut dict = Map::new();
    dict.insert("code".into(), error.code.into());
    dict.insert("message".into(), Value::String(error.message.clone()));
    dict.insert("domain".into(), Value::String(error.domain.clone()));
    Value::Object(dict)
}
