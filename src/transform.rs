//! Validation, PII masking and flattening of a decoded login event.

use {
    crate::source::LoginEventRecord,
    serde_json::{Map, Value},
    tracing::{debug, instrument},
};

/// Field whose presence with [`INVALID_MESSAGE_TYPE`] marks a message to drop.
pub const MESSAGE_TYPE_FIELD: &str = "foo";
pub const INVALID_MESSAGE_TYPE: &str = "invalid_message_type";

/// Top-level fields replaced by their SHA-256 digest.
pub const PII_FIELDS: [&str; 2] = ["device_id", "ip"];

pub const KEY_SEPARATOR: char = '.';

/// Single-level record keyed by dot-joined paths.
pub type FlattenedRecord = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Invalid message type received")]
    InvalidMessageType,

    #[error("Sensitive field {0} is not a string")]
    NonStringSensitiveField(&'static str),

    #[error("Flattened key {0} is produced more than once")]
    KeyCollision(String),
}

#[instrument(skip_all)]
pub fn transform(record: &LoginEventRecord) -> Result<FlattenedRecord, TransformError> {
    validate_message_type(record)?;
    let masked = mask_pii_fields(record)?;
    let flattened = flatten(&masked)?;
    debug!(fields = flattened.len(), "Transformed record");
    Ok(flattened)
}

pub fn validate_message_type(record: &LoginEventRecord) -> Result<(), TransformError> {
    match record.get(MESSAGE_TYPE_FIELD).and_then(Value::as_str) {
        Some(INVALID_MESSAGE_TYPE) => Err(TransformError::InvalidMessageType),
        _ => Ok(()),
    }
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `value`.
pub fn mask_value(value: &str) -> String {
    sha256::digest(value)
}

/// Returns a copy of `record` with every present PII field masked.
pub fn mask_pii_fields(record: &LoginEventRecord) -> Result<LoginEventRecord, TransformError> {
    let mut masked = record.clone();
    for field in PII_FIELDS {
        if let Some(value) = masked.get_mut(field) {
            let original = value
                .as_str()
                .ok_or(TransformError::NonStringSensitiveField(field))?;
            *value = Value::String(mask_value(original));
        }
    }
    Ok(masked)
}

/// Recursively joins nested object keys. Arrays and scalars are leaves.
pub fn flatten(record: &Map<String, Value>) -> Result<FlattenedRecord, TransformError> {
    let mut flattened = Map::new();
    flatten_into(&mut flattened, None, record)?;
    Ok(flattened)
}

fn flatten_into(
    flattened: &mut FlattenedRecord,
    prefix: Option<&str>,
    object: &Map<String, Value>,
) -> Result<(), TransformError> {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(flattened, Some(&path), nested)?,
            leaf => {
                if flattened.contains_key(&path) {
                    return Err(TransformError::KeyCollision(path));
                }
                flattened.insert(path, leaf.clone());
            }
        }
    }
    Ok(())
}
