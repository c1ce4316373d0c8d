use chrono::{DateTime, Utc};

use super::message::SenderKind;

/// One record of the read endpoint, already decoded and timestamp-parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRecord {
    pub message: String,
    pub sender_type: Option<String>,
    pub data_sender_type: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub ai_enabled: Option<bool>,
}

impl ServerRecord {
    pub fn sender(&self) -> SenderKind {
        SenderKind::from_wire(
            self.sender_type.as_deref(),
            self.data_sender_type.as_deref(),
        )
    }
}

/// Result of one successful fetch of the read endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationSnapshot {
    pub records: Vec<ServerRecord>,
    /// Per-conversation assistant flag, taken from the most recent record carrying one.
    pub assistant_enabled: Option<bool>,
}

impl ConversationSnapshot {
    pub fn from_records(records: Vec<ServerRecord>) -> Self {
        let assistant_enabled = records.iter().rev().find_map(|record| record.ai_enabled);

        Self {
            records,
            assistant_enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingContext {
    pub field: &'static str,
}

impl std::fmt::Display for MissingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing chat context: {} is required", self.field)
    }
}

impl std::error::Error for MissingContext {}

/// Identifies the (restaurant, client) conversation a view is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    restaurant_id: String,
    client_id: String,
    table_id: Option<String>,
}

impl ConversationContext {
    pub fn new(
        restaurant_id: Option<&str>,
        client_id: Option<&str>,
        table_id: Option<&str>,
    ) -> Result<Self, MissingContext> {
        Ok(Self {
            restaurant_id: required(restaurant_id, "restaurant_id")?,
            client_id: required(client_id, "client_id")?,
            table_id: table_id
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
        })
    }

    /// Customer links always carry a table; staff views do not need one.
    pub fn for_perspective(
        perspective: Perspective,
        restaurant_id: Option<&str>,
        client_id: Option<&str>,
        table_id: Option<&str>,
    ) -> Result<Self, MissingContext> {
        let context = Self::new(restaurant_id, client_id, table_id)?;
        if perspective == Perspective::Customer && context.table_id.is_none() {
            return Err(MissingContext { field: "table_id" });
        }

        Ok(context)
    }

    pub fn restaurant_id(&self) -> &str {
        &self.restaurant_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn table_id(&self) -> Option<&str> {
        self.table_id.as_deref()
    }
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, MissingContext> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or(MissingContext { field })
}

/// Which console a chat view serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    /// Public widget reached through a table QR code.
    Customer,
    /// Owner/staff panel watching one customer conversation.
    Staff,
}

impl Perspective {
    pub fn author(self) -> SenderKind {
        match self {
            Self::Customer => SenderKind::Client,
            Self::Staff => SenderKind::Restaurant,
        }
    }

    pub fn shows_greeting(self) -> bool {
        self == Self::Customer
    }

    pub fn expects_reply(self) -> bool {
        self == Self::Customer
    }
}

/// Identity of one mounted chat view. Responses addressed to another view are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

impl ViewId {
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Whether a refresh was requested by the user (visible) or by a timer (silent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    Silent,
    Visible,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: i64, ai_enabled: Option<bool>) -> ServerRecord {
        ServerRecord {
            message: "hi".to_owned(),
            sender_type: Some("client".to_owned()),
            data_sender_type: None,
            timestamp: DateTime::<Utc>::from_timestamp(ts, 0).expect("valid timestamp"),
            ai_enabled,
        }
    }

    #[test]
    fn context_rejects_blank_restaurant_id() {
        let error = ConversationContext::new(Some("  "), Some("c1"), Some("4"))
            .expect_err("blank restaurant must be rejected");

        assert_eq!(error.field, "restaurant_id");
    }

    #[test]
    fn context_rejects_missing_client_id() {
        let error = ConversationContext::new(Some("r1"), None, None)
            .expect_err("missing client must be rejected");

        assert_eq!(error.field, "client_id");
    }

    #[test]
    fn customer_context_requires_table() {
        let error =
            ConversationContext::for_perspective(Perspective::Customer, Some("r1"), Some("c1"), None)
                .expect_err("customer view needs a table");

        assert_eq!(error.field, "table_id");
        assert!(ConversationContext::for_perspective(
            Perspective::Staff,
            Some("r1"),
            Some("c1"),
            None
        )
        .is_ok());
    }

    #[test]
    fn context_trims_identifiers() {
        let context = ConversationContext::new(Some(" r1 "), Some("c1"), Some(" 7 "))
            .expect("context should build");

        assert_eq!(context.restaurant_id(), "r1");
        assert_eq!(context.table_id(), Some("7"));
    }

    #[test]
    fn snapshot_takes_assistant_flag_from_latest_record() {
        let snapshot = ConversationSnapshot::from_records(vec![
            record(1, Some(true)),
            record(2, Some(false)),
            record(3, None),
        ]);

        assert_eq!(snapshot.assistant_enabled, Some(false));
    }

    #[test]
    fn snapshot_without_flags_leaves_assistant_unknown() {
        let snapshot = ConversationSnapshot::from_records(vec![record(1, None)]);

        assert_eq!(snapshot.assistant_enabled, None);
    }
}
