use chrono::{DateTime, Utc};

/// Who authored a conversation turn, as normalized from the backend `sender_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenderKind {
    /// Typed by the customer.
    Client,
    /// Transcript of a spoken customer message. Aligned like `Client`, badged differently.
    ClientAudio,
    /// Written by restaurant staff.
    Restaurant,
    /// Produced by the assistant.
    Ai,
}

impl SenderKind {
    /// Normalizes the backend sender fields.
    ///
    /// `data_sender_type` only ever refines a client message into an audio transcript.
    /// Missing or unrecognized senders fall back to `Restaurant`.
    pub fn from_wire(sender_type: Option<&str>, data_sender_type: Option<&str>) -> Self {
        if sender_type == Some("client_audio") || data_sender_type == Some("client_audio") {
            return Self::ClientAudio;
        }

        sender_type
            .and_then(Self::parse_known)
            .unwrap_or(Self::Restaurant)
    }

    /// Whether `from_wire` maps these fields without falling back.
    pub fn is_recognized(sender_type: Option<&str>, data_sender_type: Option<&str>) -> bool {
        data_sender_type == Some("client_audio")
            || sender_type.and_then(Self::parse_known).is_some()
    }

    fn parse_known(sender_type: &str) -> Option<Self> {
        match sender_type {
            "client" => Some(Self::Client),
            "client_audio" => Some(Self::ClientAudio),
            "ai" => Some(Self::Ai),
            "restaurant" => Some(Self::Restaurant),
            _ => None,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::ClientAudio => "client_audio",
            Self::Restaurant => "restaurant",
            Self::Ai => "ai",
        }
    }

    /// Client-aligned bubbles (right side) belong to the customer, audio included.
    pub fn is_client_aligned(self) -> bool {
        matches!(self, Self::Client | Self::ClientAudio)
    }

    /// Equivalence class used when matching local entries against server records.
    fn author_group(self) -> u8 {
        match self {
            Self::Client | Self::ClientAudio => 0,
            Self::Restaurant => 1,
            Self::Ai => 2,
        }
    }

    pub fn same_author(self, other: SenderKind) -> bool {
        self.author_group() == other.author_group()
    }
}

/// Where a rendered message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Synthetic welcome line pinned to the top of the customer view.
    Greeting,
    /// Materialized from the latest fetch.
    Server,
    /// Sent or received locally, not yet observed in a fetch.
    LocalPending,
    /// Locally synthesized failure notice. Never sent to the backend.
    LocalFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: SenderKind,
    pub timestamp: DateTime<Utc>,
    pub provenance: Provenance,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.sender.is_client_aligned()
    }

    pub fn is_error(&self) -> bool {
        self.provenance == Provenance::LocalFailed
    }

    pub fn is_pending(&self) -> bool {
        self.provenance == Provenance::LocalPending
    }

    pub fn is_audio_transcript(&self) -> bool {
        self.sender == SenderKind::ClientAudio
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
