//! Message list rendering logic.
//!
//! Handles visual formatting of messages including:
//! - Author grouping (consecutive messages from the same author show the label once)
//! - Date separators between messages from different days
//! - Right-aligned customer bubbles, badges, pending markers and failure bubbles

use chrono::{DateTime, Local, NaiveDate, Utc};
use ratatui::{
    layout::Alignment,
    style::Style,
    text::{Line, Span},
    widgets::ListItem,
};

use crate::domain::{
    conversation::Perspective,
    message::{Message, SenderKind},
};

use super::styles;

const PENDING_MARKER: &str = "sending…";
const INDENT: &str = "      ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTone {
    Normal,
    Pending,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub time: String,
    /// Author label, present on the first message of a group.
    pub sender: Option<&'static str>,
    pub badges: Vec<&'static str>,
    pub content: String,
    pub side: BubbleSide,
    pub tone: MessageTone,
}

/// Represents a visual element in the messages list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageListElement {
    /// Date separator line (e.g., "——— 14 Feb 2026 ———").
    DateSeparator(String),
    Message(MessageRow),
}

/// Builds a list of visual elements from messages.
pub fn build_message_list_elements(
    messages: &[Message],
    perspective: Perspective,
) -> Vec<MessageListElement> {
    let mut elements = Vec::new();
    let mut prev_date: Option<NaiveDate> = None;
    let mut prev_sender: Option<&'static str> = None;

    for message in messages {
        let local = message.timestamp.with_timezone(&Local);
        let msg_date = local.date_naive();

        if prev_date != Some(msg_date) {
            elements.push(MessageListElement::DateSeparator(format_date(msg_date)));
            prev_sender = None;
        }

        let label = sender_label(message.sender, perspective);

        elements.push(MessageListElement::Message(MessageRow {
            time: format_time(message.timestamp),
            sender: (prev_sender != Some(label)).then_some(label),
            badges: badges(message),
            content: message.text.clone(),
            side: if message.is_user() {
                BubbleSide::Right
            } else {
                BubbleSide::Left
            },
            tone: tone(message),
        }));

        prev_date = Some(msg_date);
        prev_sender = Some(label);
    }

    elements
}

/// Converts a message index to the corresponding element index in the list.
///
/// Returns `None` if the message index is out of range.
pub fn message_index_to_element_index(
    elements: &[MessageListElement],
    message_index: usize,
) -> Option<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, element)| matches!(element, MessageListElement::Message(_)))
        .nth(message_index)
        .map(|(element_index, _)| element_index)
}

/// Converts a list element to a ListItem for ratatui rendering.
pub fn element_to_list_item(element: &MessageListElement) -> ListItem<'static> {
    match element {
        MessageListElement::DateSeparator(date) => date_separator_item(date),
        MessageListElement::Message(row) => message_item(row),
    }
}

fn date_separator_item(date: &str) -> ListItem<'static> {
    let line = Line::from(Span::styled(
        format!("——— {date} ———"),
        styles::date_separator_style(),
    ))
    .alignment(Alignment::Center);
    ListItem::new(vec![Line::default(), line])
}

fn message_item(row: &MessageRow) -> ListItem<'static> {
    let alignment = match row.side {
        BubbleSide::Left => Alignment::Left,
        BubbleSide::Right => Alignment::Right,
    };
    let text_style = match row.tone {
        MessageTone::Error => styles::message_error_style(),
        MessageTone::Normal | MessageTone::Pending => styles::message_text_style(),
    };

    let mut lines = Vec::new();
    let mut content_lines = row.content.lines();

    if row.sender.is_some() {
        lines.push(header_line(row));
    } else if let Some(first) = content_lines.next() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>5} ", row.time), styles::message_time_style()),
            Span::styled(first.to_owned(), text_style),
        ]));
    }

    for text_line in content_lines {
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(text_line.to_owned(), text_style),
        ]));
    }

    if row.tone == MessageTone::Pending {
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(PENDING_MARKER, styles::message_pending_style()),
        ]));
    }

    ListItem::new(
        lines
            .into_iter()
            .map(|line| line.alignment(alignment))
            .collect::<Vec<_>>(),
    )
}

fn header_line(row: &MessageRow) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{:>5} ", row.time),
        styles::message_time_style(),
    )];

    if let Some(name) = row.sender {
        spans.push(Span::styled(name, sender_style(row.side)));
    }

    for badge in &row.badges {
        spans.push(Span::styled(format!(" [{badge}]"), styles::message_badge_style()));
    }

    Line::from(spans)
}

fn sender_style(side: BubbleSide) -> Style {
    match side {
        BubbleSide::Left => styles::message_sender_style(),
        BubbleSide::Right => styles::client_sender_style(),
    }
}

fn sender_label(sender: SenderKind, perspective: Perspective) -> &'static str {
    match (sender, perspective) {
        (SenderKind::Client | SenderKind::ClientAudio, Perspective::Customer) => "You",
        (SenderKind::Client | SenderKind::ClientAudio, Perspective::Staff) => "Customer",
        (SenderKind::Restaurant, _) => "Restaurant",
        (SenderKind::Ai, _) => "Assistant",
    }
}

fn badges(message: &Message) -> Vec<&'static str> {
    let mut badges = Vec::new();
    if message.sender == SenderKind::Restaurant {
        badges.push("Staff");
    }
    if message.is_audio_transcript() {
        badges.push("Audio");
    }
    if message.is_error() {
        badges.push("Error");
    }
    badges
}

fn tone(message: &Message) -> MessageTone {
    if message.is_error() {
        MessageTone::Error
    } else if message.is_pending() {
        MessageTone::Pending
    } else {
        MessageTone::Normal
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::{MessageId, Provenance};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn msg(text: &str, sender: SenderKind, timestamp: &str, provenance: Provenance) -> Message {
        Message {
            id: MessageId::new(format!("{text}-{timestamp}")),
            text: text.to_owned(),
            sender,
            timestamp: at(timestamp),
            provenance,
        }
    }

    fn server(text: &str, sender: SenderKind, timestamp: &str) -> Message {
        msg(text, sender, timestamp, Provenance::Server)
    }

    fn row(element: &MessageListElement) -> &MessageRow {
        match element {
            MessageListElement::Message(row) => row,
            MessageListElement::DateSeparator(_) => panic!("expected a message row"),
        }
    }

    // Midday UTC keeps both timestamps on their own calendar day in every timezone.
    const FEB_14_NOON: &str = "2026-02-14T12:00:00Z";
    const FEB_14_NOON_PLUS_MINUTE: &str = "2026-02-14T12:01:00Z";
    const FEB_15_NOON: &str = "2026-02-15T12:00:00Z";

    #[test]
    fn builds_date_separator_for_first_message() {
        let messages = vec![server("Hello", SenderKind::Ai, FEB_14_NOON)];

        let elements = build_message_list_elements(&messages, Perspective::Customer);

        assert_eq!(elements.len(), 2);
        assert!(matches!(&elements[0], MessageListElement::DateSeparator(_)));
    }

    #[test]
    fn groups_consecutive_messages_from_same_author() {
        let messages = vec![
            server("First", SenderKind::Ai, FEB_14_NOON),
            server("Second", SenderKind::Ai, FEB_14_NOON_PLUS_MINUTE),
            server("Question", SenderKind::Client, FEB_14_NOON_PLUS_MINUTE),
        ];

        let elements = build_message_list_elements(&messages, Perspective::Customer);

        assert_eq!(elements.len(), 4);
        assert_eq!(row(&elements[1]).sender, Some("Assistant"));
        assert_eq!(row(&elements[2]).sender, None);
        assert_eq!(row(&elements[3]).sender, Some("You"));
    }

    #[test]
    fn inserts_separator_and_resets_grouping_on_date_change() {
        let messages = vec![
            server("Day 1", SenderKind::Ai, FEB_14_NOON),
            server("Day 2", SenderKind::Ai, FEB_15_NOON),
        ];

        let elements = build_message_list_elements(&messages, Perspective::Customer);

        assert_eq!(elements.len(), 4);
        assert!(matches!(&elements[2], MessageListElement::DateSeparator(_)));
        assert!(row(&elements[3]).sender.is_some());
    }

    #[test]
    fn customer_messages_sit_on_the_right() {
        let messages = vec![
            server("Hi", SenderKind::Client, FEB_14_NOON),
            server("Spoken", SenderKind::ClientAudio, FEB_14_NOON),
            server("Hello", SenderKind::Restaurant, FEB_14_NOON),
        ];

        let elements = build_message_list_elements(&messages, Perspective::Staff);

        assert_eq!(row(&elements[1]).side, BubbleSide::Right);
        assert_eq!(row(&elements[1]).sender, Some("Customer"));
        assert_eq!(row(&elements[2]).side, BubbleSide::Right);
        assert_eq!(row(&elements[3]).side, BubbleSide::Left);
    }

    #[test]
    fn staff_and_audio_messages_carry_badges() {
        let messages = vec![
            server("We open at 11", SenderKind::Restaurant, FEB_14_NOON),
            server("Table for two", SenderKind::ClientAudio, FEB_14_NOON),
        ];

        let elements = build_message_list_elements(&messages, Perspective::Customer);

        assert_eq!(row(&elements[1]).badges, vec!["Staff"]);
        assert_eq!(row(&elements[2]).badges, vec!["Audio"]);
    }

    #[test]
    fn local_entries_have_pending_and_error_tones() {
        let messages = vec![
            msg("On its way", SenderKind::Client, FEB_14_NOON, Provenance::LocalPending),
            msg("Failed", SenderKind::Ai, FEB_14_NOON, Provenance::LocalFailed),
        ];

        let elements = build_message_list_elements(&messages, Perspective::Customer);

        assert_eq!(row(&elements[1]).tone, MessageTone::Pending);
        assert_eq!(row(&elements[2]).tone, MessageTone::Error);
        assert_eq!(row(&elements[2]).badges, vec!["Error"]);
    }

    #[test]
    fn pending_item_shows_sending_marker() {
        let messages = vec![msg(
            "Menu?",
            SenderKind::Client,
            FEB_14_NOON,
            Provenance::LocalPending,
        )];
        let elements = build_message_list_elements(&messages, Perspective::Customer);

        let MessageListElement::Message(pending) = &elements[1] else {
            panic!("expected a message row");
        };
        let header = header_line(pending);
        let text: String = header.spans.iter().map(|s| s.content.as_ref()).collect();

        assert!(text.ends_with("You"));
        assert_eq!(element_to_list_item(&elements[1]).height(), 3);
    }

    #[test]
    fn format_date_produces_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 14).expect("valid date");

        assert_eq!(format_date(date), "14 Feb 2026");
    }

    #[test]
    fn format_time_produces_hh_mm() {
        let time = format_time(at(FEB_14_NOON));

        assert_eq!(time.len(), 5);
        assert!(time.contains(':'));
    }

    #[test]
    fn message_index_to_element_index_accounts_for_date_separators() {
        let messages = vec![
            server("Day 1", SenderKind::Ai, FEB_14_NOON),
            server("Day 2", SenderKind::Ai, FEB_15_NOON),
        ];
        let elements = build_message_list_elements(&messages, Perspective::Customer);

        assert_eq!(message_index_to_element_index(&elements, 0), Some(1));
        assert_eq!(message_index_to_element_index(&elements, 1), Some(3));
        assert_eq!(message_index_to_element_index(&elements, 2), None);
    }
}
