use {
    async_trait::async_trait,
    serde_json::{Map, Value},
    std::collections::HashMap,
};

pub mod sqs;

pub use sqs::SqsMessageSource;

/// A login event as decoded from a message body, before any masking.
pub type LoginEventRecord = Map<String, Value>;

/// Envelope delivered by the queue. The body is expected to be JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMessage {
    pub message_id: Option<String>,
    /// Needed to acknowledge (delete) the message
    pub receipt_handle: Option<String>,
    pub body: Option<String>,
    pub attributes: HashMap<String, String>,
    pub message_attributes: HashMap<String, String>,
}

impl RawMessage {
    pub fn from_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }

    pub fn decode(&self) -> Result<LoginEventRecord, DecodeError> {
        let body = self.body.as_deref().ok_or(DecodeError::MissingBody)?;
        match serde_json::from_str(body)? {
            Value::Object(record) => Ok(record),
            _ => Err(DecodeError::NotAnObject),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Queue credentials not available")]
    MissingCredentials,

    #[error("Incomplete queue credentials provided")]
    PartialCredentials,

    #[error("The queue {0} does not exist")]
    QueueNotFound(String),

    #[error("Queue transport error: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Message has no body")]
    MissingBody,

    #[error("Message body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message body is not a JSON object")]
    NotAnObject,
}

#[async_trait]
pub trait MessageSource {
    /// Receives up to one batch of pending messages. An empty queue yields an
    /// empty vector.
    async fn fetch_batch(&self) -> Result<Vec<RawMessage>, FetchError>;

    /// Removes a processed message from the queue.
    async fn acknowledge(&self, message: &RawMessage) -> Result<(), FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_object_body() {
        let message = RawMessage::from_body(r#"{"user_id": "u1", "device": {"os": "ios"}}"#);
        let record = message.decode().unwrap();
        assert_eq!(record["user_id"], "u1");
        assert_eq!(record["device"]["os"], "ios");
    }

    #[test]
    fn decode_invalid_json() {
        let message = RawMessage::from_body("{not json");
        assert!(matches!(message.decode(), Err(DecodeError::Json(_))));
    }

    #[test]
    fn decode_non_object() {
        let message = RawMessage::from_body("[1, 2, 3]");
        assert!(matches!(message.decode(), Err(DecodeError::NotAnObject)));
    }

    #[test]
    fn decode_missing_body() {
        let message = RawMessage::default();
        assert!(matches!(message.decode(), Err(DecodeError::MissingBody)));
    }
}
