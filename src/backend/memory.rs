//! Process-local backend used by `--offline` and by tests.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    domain::{conversation::ServerRecord, message::SenderKind},
    usecases::{
        assistant_status::{AssistantStatusSource, ConversationStatus, HealthProbe},
        contracts::SourceError,
        load_conversation::ConversationSource,
        send_message::{MessageSender, OutgoingMessage},
    },
};

const CANNED_REPLIES: [&str; 7] = [
    "Thank you for your question! I'd be happy to help you with our menu.",
    "Our chef recommends the daily special today. Would you like to hear about it?",
    "I can help you with reservations, menu questions, or dietary restrictions.",
    "That's a great choice! Would you like to add any sides or drinks?",
    "Our restaurant is known for fresh ingredients and authentic flavors.",
    "We have excellent vegetarian and vegan options available.",
    "Our opening hours are Monday-Friday 11 AM to 10 PM, weekends 10 AM to 11 PM.",
];

type ConversationKey = (String, String);

#[derive(Debug, Default)]
struct Conversation {
    records: Vec<ServerRecord>,
    assistant_enabled: Option<bool>,
}

impl Conversation {
    fn assistant_enabled(&self) -> bool {
        self.assistant_enabled.unwrap_or(true)
    }
}

#[derive(Debug)]
struct MemoryState {
    conversations: BTreeMap<ConversationKey, Conversation>,
    available: bool,
    next_reply: usize,
}

#[derive(Debug)]
pub struct InMemoryChatBackend {
    state: Mutex<MemoryState>,
    clock: fn() -> DateTime<Utc>,
}

impl Default for InMemoryChatBackend {
    fn default() -> Self {
        Self::with_clock(Utc::now)
    }
}

impl InMemoryChatBackend {
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                conversations: BTreeMap::new(),
                available: true,
                next_reply: 0,
            }),
            clock,
        }
    }

    /// Makes every later request fail as if the service were down.
    #[cfg(test)]
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    #[cfg(test)]
    pub fn insert_record(&self, restaurant_id: &str, client_id: &str, record: ServerRecord) {
        self.lock()
            .conversations
            .entry(key(restaurant_id, client_id))
            .or_default()
            .records
            .push(record);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn available(&self) -> Result<MutexGuard<'_, MemoryState>, SourceError> {
        let state = self.lock();
        if state.available {
            Ok(state)
        } else {
            Err(SourceError::Unavailable)
        }
    }
}

fn key(restaurant_id: &str, client_id: &str) -> ConversationKey {
    (restaurant_id.to_owned(), client_id.to_owned())
}

fn record(text: &str, sender: SenderKind, at: DateTime<Utc>, ai_enabled: bool) -> ServerRecord {
    ServerRecord {
        message: text.to_owned(),
        sender_type: Some(sender.as_wire().to_owned()),
        data_sender_type: None,
        timestamp: at,
        ai_enabled: Some(ai_enabled),
    }
}

#[async_trait]
impl ConversationSource for InMemoryChatBackend {
    async fn conversation_records(
        &self,
        restaurant_id: &str,
        client_id: &str,
    ) -> Result<Vec<ServerRecord>, SourceError> {
        let state = self.available()?;

        Ok(state
            .conversations
            .get(&key(restaurant_id, client_id))
            .map(|conversation| conversation.records.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl MessageSender for InMemoryChatBackend {
    async fn send_message(
        &self,
        message: &OutgoingMessage<'_>,
    ) -> Result<Option<String>, SourceError> {
        let mut state = self.available()?;
        let now = (self.clock)();

        let reply_index = state.next_reply;
        let conversation = state
            .conversations
            .entry(key(message.restaurant_id, message.client_id))
            .or_default();
        let enabled = conversation.assistant_enabled();
        conversation
            .records
            .push(record(message.text, message.author, now, enabled));

        if !(enabled && message.author.is_client_aligned()) {
            return Ok(None);
        }

        let reply = CANNED_REPLIES[reply_index % CANNED_REPLIES.len()];
        conversation
            .records
            .push(record(reply, SenderKind::Ai, now, enabled));
        state.next_reply = reply_index + 1;

        Ok(Some(reply.to_owned()))
    }
}

#[async_trait]
impl AssistantStatusSource for InMemoryChatBackend {
    async fn latest_statuses(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<ConversationStatus>, SourceError> {
        let state = self.available()?;

        Ok(state
            .conversations
            .iter()
            .filter(|((restaurant, _), _)| restaurant == restaurant_id)
            .map(|((_, client_id), conversation)| ConversationStatus {
                client_id: client_id.clone(),
                ai_enabled: conversation.assistant_enabled(),
            })
            .collect())
    }

    async fn set_assistant_enabled(
        &self,
        restaurant_id: &str,
        client_id: &str,
        enabled: bool,
    ) -> Result<(), SourceError> {
        let mut state = self.available()?;
        state
            .conversations
            .entry(key(restaurant_id, client_id))
            .or_default()
            .assistant_enabled = Some(enabled);

        Ok(())
    }
}

#[async_trait]
impl HealthProbe for InMemoryChatBackend {
    async fn check_health(&self) -> Result<(), SourceError> {
        self.available().map(|_| ())
    }
}
