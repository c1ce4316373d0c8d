//! Optimistic overlay: locally originated messages not yet observed in a fetch.

use chrono::{DateTime, Utc};

use super::message::{Message, MessageId, Provenance, SenderKind};

/// A local message plus the server horizon observed when it was created.
///
/// Only server messages strictly newer than `base_horizon` can confirm the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayEntry {
    pub message: Message,
    pub base_horizon: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Overlay {
    entries: Vec<OverlayEntry>,
    horizon: Option<DateTime<Utc>>,
    next_seq: u64,
}

impl Overlay {
    pub fn entries(&self) -> &[OverlayEntry] {
        &self.entries
    }

    /// Latest server timestamp seen so far. Never moves backwards.
    pub fn horizon(&self) -> Option<DateTime<Utc>> {
        self.horizon
    }

    pub fn observe_horizon(&mut self, horizon: Option<DateTime<Utc>>) {
        self.horizon = self.horizon.max(horizon);
    }

    /// Timestamp of the newest local entry.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.entries.iter().map(|entry| entry.message.timestamp).max()
    }

    /// Adds a message sent by the local user or a reply received in the send response.
    /// Blank text is never materialized.
    pub fn push_pending(
        &mut self,
        sender: SenderKind,
        text: &str,
        at: DateTime<Utc>,
    ) -> Option<MessageId> {
        self.push(sender, text, at, Provenance::LocalPending)
    }

    /// Adds a failure notice shown in the assistant's place.
    pub fn push_failure(&mut self, text: &str, at: DateTime<Utc>) -> Option<MessageId> {
        self.push(SenderKind::Ai, text, at, Provenance::LocalFailed)
    }

    /// Keeps only the entries the reconciler still considers pending.
    pub fn retain_ids(&mut self, keep: &[MessageId]) {
        self.entries.retain(|entry| keep.contains(&entry.message.id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.horizon = None;
    }

    fn push(
        &mut self,
        sender: SenderKind,
        text: &str,
        at: DateTime<Utc>,
        provenance: Provenance,
    ) -> Option<MessageId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.next_seq += 1;
        let id = MessageId::new(format!("local-{}", self.next_seq));
        self.entries.push(OverlayEntry {
            message: Message {
                id: id.clone(),
                text: text.to_owned(),
                sender,
                timestamp: at,
                provenance,
            },
            base_horizon: self.horizon,
        });

        Some(id)
    }
}
