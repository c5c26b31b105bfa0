//! Alarm notification decoding
//!
//! Notifications arrive as SNS-style JSON envelopes. The alarm state lives
//! in the message body, either as a structured alarm document (JSON object
//! carrying `NewStateValue`) or as plain text led by the `ALARM` token.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Invalid notification envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("Notification contains no records")]
    NoRecords,
}

/// Alarm state decoded from a notification message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Active,
    Cleared,
    Malformed,
}

/// SNS-style notification envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnsEnvelope {
    #[serde(rename = "Records")]
    pub records: Vec<SnsRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnsRecord {
    #[serde(rename = "Sns")]
    pub sns: SnsMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnsMessage {
    /// Alarm name as published by the monitoring system.
    #[serde(rename = "Subject", default)]
    pub subject: String,

    #[serde(rename = "Message")]
    pub message: String,
}

impl SnsEnvelope {
    pub fn from_slice(payload: &[u8]) -> Result<Self, EventError> {
        let envelope: SnsEnvelope = serde_json::from_slice(payload)?;
        if envelope.records.is_empty() {
            return Err(EventError::NoRecords);
        }
        Ok(envelope)
    }

    /// Subject of the first record.
    pub fn subject(&self) -> &str {
        &self.records[0].sns.subject
    }

    /// Alarm state decoded from the first record's message body.
    pub fn alarm_state(&self) -> AlarmState {
        decode_state(&self.records[0].sns.message)
    }
}

/// Classify a message body.
///
/// Structured documents are classified strictly by `NewStateValue`. Plain
/// text counts as active only when a line starts with the `ALARM` token,
/// so a description that merely mentions the word does not trigger
/// scaling.
fn decode_state(body: &str) -> AlarmState {
    if let Ok(Value::Object(doc)) = serde_json::from_str::<Value>(body) {
        return match doc.get("NewStateValue").and_then(Value::as_str) {
            Some("ALARM") => AlarmState::Active,
            Some("OK") | Some("INSUFFICIENT_DATA") => AlarmState::Cleared,
            _ => AlarmState::Malformed,
        };
    }

    if body
        .lines()
        .any(|line| line.trim_start().starts_with("ALARM"))
    {
        AlarmState::Active
    } else {
        AlarmState::Cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope_with_message(message: &str) -> SnsEnvelope {
        let payload = json!({
            "Records": [{
                "Sns": {
                    "Subject": "high-cpu-alarm",
                    "Message": message
                }
            }]
        });
        SnsEnvelope::from_slice(payload.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn plain_text_alarm_token_is_active() {
        let envelope = envelope_with_message("ALARM: High CPU");
        assert_eq!(envelope.alarm_state(), AlarmState::Active);
    }

    #[test]
    fn plain_text_without_token_is_cleared() {
        let envelope = envelope_with_message("Threshold crossed back to normal");
        assert_eq!(envelope.alarm_state(), AlarmState::Cleared);
    }

    #[test]
    fn mid_sentence_mention_does_not_activate() {
        let envelope =
            envelope_with_message("The ALARM word appears here but no state token leads a line");
        assert_eq!(envelope.alarm_state(), AlarmState::Cleared);
    }

    #[test]
    fn structured_alarm_state_is_active() {
        let body = json!({"NewStateValue": "ALARM", "AlarmDescription": "cpu"}).to_string();
        let envelope = envelope_with_message(&body);
        assert_eq!(envelope.alarm_state(), AlarmState::Active);
    }

    #[test]
    fn structured_ok_state_mentioning_alarm_is_cleared() {
        let body = json!({
            "NewStateValue": "OK",
            "AlarmDescription": "ALARM recovered, everything fine"
        })
        .to_string();
        let envelope = envelope_with_message(&body);
        assert_eq!(envelope.alarm_state(), AlarmState::Cleared);
    }

    #[test]
    fn structured_unknown_state_is_malformed() {
        let body = json!({"NewStateValue": "PANIC"}).to_string();
        let envelope = envelope_with_message(&body);
        assert_eq!(envelope.alarm_state(), AlarmState::Malformed);

        let body = json!({"SomethingElse": true}).to_string();
        let envelope = envelope_with_message(&body);
        assert_eq!(envelope.alarm_state(), AlarmState::Malformed);
    }

    #[test]
    fn empty_records_is_an_error() {
        let payload = json!({"Records": []}).to_string();
        let err = SnsEnvelope::from_slice(payload.as_bytes()).unwrap_err();
        assert!(matches!(err, EventError::NoRecords));
    }

    #[test]
    fn garbage_payload_is_an_error() {
        let err = SnsEnvelope::from_slice(b"not json").unwrap_err();
        assert!(matches!(err, EventError::Envelope(_)));
    }
}
