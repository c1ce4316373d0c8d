//! JSON shapes exchanged with the chat backend.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{conversation::ServerRecord, message::SenderKind},
    usecases::{assistant_status::ConversationStatus, send_message::OutgoingMessage},
};

#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    sender_type: Option<String>,
    #[serde(default)]
    data_sender_type: Option<String>,
    timestamp: String,
    #[serde(default)]
    ai_enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    client_id: String,
    #[serde(default)]
    ai_enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub restaurant_id: &'a str,
    pub client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<&'a str>,
    pub message: &'a str,
    pub sender_type: &'static str,
}

impl<'a> SendRequest<'a> {
    pub fn from_outgoing(message: &'a OutgoingMessage<'a>) -> Self {
        Self {
            restaurant_id: message.restaurant_id,
            client_id: message.client_id,
            table_id: message.table_id,
            message: message.text,
            sender_type: message.author.as_wire(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleRequest<'a> {
    pub restaurant_id: &'a str,
    pub client_id: &'a str,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Decodes the read endpoint body. A non-array body is an empty conversation;
/// malformed entries are skipped.
pub fn parse_records(body: Value) -> Vec<ServerRecord> {
    let Value::Array(items) = body else {
        tracing::warn!(
            code = "CONVERSATION_BODY_NOT_ARRAY",
            "conversation body is not an array; treating as empty"
        );
        return Vec::new();
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<WireRecord>(item) {
            Ok(record) => into_record(index, record),
            Err(error) => {
                tracing::warn!(code = "RECORD_SKIPPED", index, %error, "skipping malformed record");
                None
            }
        })
        .collect()
}

/// Decodes the latest-per-client endpoint body. Entries without a flag are skipped.
pub fn parse_statuses(body: Value) -> Vec<ConversationStatus> {
    let Value::Array(items) = body else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<WireStatus>(item).ok())
        .filter_map(|status| {
            status.ai_enabled.map(|ai_enabled| ConversationStatus {
                client_id: status.client_id,
                ai_enabled,
            })
        })
        .collect()
}

/// Accepts RFC 3339 and naive ISO-8601 timestamps; naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn into_record(index: usize, record: WireRecord) -> Option<ServerRecord> {
    let Some(timestamp) = parse_timestamp(&record.timestamp) else {
        tracing::warn!(
            code = "RECORD_TIMESTAMP_INVALID",
            index,
            timestamp = %record.timestamp,
            "skipping record with unparseable timestamp"
        );
        return None;
    };

    if !SenderKind::is_recognized(
        record.sender_type.as_deref(),
        record.data_sender_type.as_deref(),
    ) {
        tracing::warn!(
            code = "RECORD_SENDER_UNKNOWN",
            index,
            sender_type = ?record.sender_type,
            "unrecognized sender_type; treating record as a staff message"
        );
    }

    Some(ServerRecord {
        message: record.message.unwrap_or_default(),
        sender_type: record.sender_type,
        data_sender_type: record.data_sender_type,
        timestamp,
        ai_enabled: record.ai_enabled,
    })
}
