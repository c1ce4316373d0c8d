//! Merges the latest fetch with the optimistic overlay into the list a chat view renders.
//!
//! Server data always wins for the same logical message. An overlay entry survives a merge
//! only while the server horizon (latest fetched timestamp) has not reached it and no
//! equivalent server message newer than the entry's base horizon confirms it. Failure notices are the exception while the
//! assistant is disabled: no reply will ever arrive to move the horizon past them.

use chrono::{DateTime, Duration, Utc};

use super::{
    conversation::{RefreshMode, ServerRecord},
    message::{Message, MessageId, Provenance},
    overlay::OverlayEntry,
};

/// Tolerated backwards clock skew between a local send and the server's copy of it.
const CONFIRMATION_SKEW_MS: i64 = 2_000;

pub struct ReconcileInput<'a> {
    pub fetched: &'a [ServerRecord],
    pub overlay: &'a [OverlayEntry],
    pub assistant_enabled: bool,
    pub greeting: Option<&'a Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub messages: Vec<Message>,
    /// Overlay entries still pending after this merge.
    pub retained: Vec<MessageId>,
    pub horizon: Option<DateTime<Utc>>,
}

impl Reconciled {
    pub fn pending_count(&self) -> usize {
        self.retained.len()
    }
}

pub fn reconcile(input: ReconcileInput<'_>) -> Reconciled {
    let mut server: Vec<Message> = input
        .fetched
        .iter()
        .enumerate()
        .filter_map(|(index, record)| materialize(index, record))
        .collect();
    server.sort_by_key(|message| message.timestamp);

    let horizon = latest_timestamp(&server);

    let mut claimed = vec![false; server.len()];
    let mut pending = Vec::new();
    for OverlayEntry {
        message: entry,
        base_horizon,
    } in input.overlay
    {
        if !entry.has_text() || entry.provenance == Provenance::Greeting {
            continue;
        }

        if confirm(entry, *base_horizon, &server, &mut claimed) {
            continue;
        }

        let keep = pinned_past_horizon(entry, input.assistant_enabled)
            || horizon.map_or(true, |horizon| entry.timestamp > horizon);
        if keep {
            pending.push(entry.clone());
        }
    }

    let retained = pending.iter().map(|entry| entry.id.clone()).collect();

    // Stable: server copies precede overlay entries on equal timestamps.
    let mut merged = server;
    merged.extend(pending);
    merged.sort_by_key(|message| message.timestamp);

    let mut messages = Vec::with_capacity(merged.len() + 1);
    if let Some(greeting) = input.greeting {
        let mut greeting = greeting.clone();
        if let Some(first) = merged.first() {
            greeting.timestamp = greeting.timestamp.min(first.timestamp);
        }
        messages.push(greeting);
    }
    messages.extend(merged);

    Reconciled {
        messages,
        retained,
        horizon,
    }
}

/// Decides whether a merge result replaces what is currently on screen.
///
/// Silent polls that produce a structurally identical list are dropped to avoid flicker.
pub fn should_replace(current: &[Message], next: &Reconciled, mode: RefreshMode) -> bool {
    match mode {
        RefreshMode::Visible => true,
        RefreshMode::Silent => current != next.messages.as_slice(),
    }
}

/// Timestamp for a new local entry: never at or behind the last observed server horizon.
pub fn local_stamp(now: DateTime<Utc>, horizon: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match horizon {
        Some(horizon) if now <= horizon => horizon + Duration::milliseconds(1),
        _ => now,
    }
}

fn materialize(index: usize, record: &ServerRecord) -> Option<Message> {
    if record.message.trim().is_empty() {
        return None;
    }

    let sender = record.sender();
    Some(Message {
        id: MessageId::new(format!("{index}-{}", sender.as_wire())),
        text: record.message.clone(),
        sender,
        timestamp: record.timestamp,
        provenance: Provenance::Server,
    })
}

fn latest_timestamp(messages: &[Message]) -> Option<DateTime<Utc>> {
    messages.iter().map(|message| message.timestamp).max()
}

fn pinned_past_horizon(entry: &Message, assistant_enabled: bool) -> bool {
    entry.is_error() && !assistant_enabled
}

/// Claims the first unclaimed server message equivalent to `entry`, if any.
///
/// Server messages at or behind `base_horizon` existed before the entry was created.
fn confirm(
    entry: &Message,
    base_horizon: Option<DateTime<Utc>>,
    server: &[Message],
    claimed: &mut [bool],
) -> bool {
    if entry.is_error() {
        return false;
    }

    let candidate = server.iter().enumerate().position(|(index, message)| {
        !claimed[index]
            && base_horizon.map_or(true, |base| message.timestamp > base)
            && message.sender.same_author(entry.sender)
            && message.text.trim() == entry.text.trim()
            && message.timestamp >= entry.timestamp - Duration::milliseconds(CONFIRMATION_SKEW_MS)
    });

    match candidate {
        Some(index) => {
            claimed[index] = true;
            true
        }
        None => false,
    }
}
