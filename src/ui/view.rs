use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::domain::{
    chat_view_state::{ChatUiState, ChatViewState, ConnectionStatus},
    conversation::Perspective,
    shell_state::ShellState,
};

use super::message_input::{placeholder, render_message_input};
use super::message_rendering::{
    build_message_list_elements, element_to_list_item, message_index_to_element_index,
};
use super::styles;

const CLIENT_ID_PREFIX_CHARS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BannerKind {
    Info,
    Error,
}

pub fn render(frame: &mut Frame<'_>, state: &ShellState) {
    let chat = state.chat();
    let banners = banners(chat);
    let typing = typing_line(chat);

    let [banner_area, messages_area, typing_area, input_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banners.len() as u16),
            Constraint::Min(1),
            Constraint::Length(u16::from(typing.is_some())),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    let banner_lines: Vec<Line<'static>> = banners
        .into_iter()
        .map(|(kind, text)| {
            let style = match kind {
                BannerKind::Info => styles::info_banner_style(),
                BannerKind::Error => styles::error_banner_style(),
            };
            Line::from(Span::styled(text, style))
        })
        .collect();
    frame.render_widget(Paragraph::new(banner_lines), banner_area);

    render_messages_panel(frame, messages_area, chat);

    if let Some(typing) = typing {
        frame.render_widget(
            Paragraph::new(Span::styled(typing, styles::typing_indicator_style())),
            typing_area,
        );
    }

    render_message_input(
        frame,
        input_area,
        state.input(),
        placeholder(chat.perspective(), chat.assistant_enabled()),
    );

    frame.render_widget(Paragraph::new(status_line(chat)), status_area);
}

fn render_messages_panel(frame: &mut Frame<'_>, area: Rect, chat: &ChatViewState) {
    let block = Block::default()
        .title(panel_title(chat))
        .borders(Borders::ALL)
        .border_style(styles::panel_border_style());

    let messages = chat.messages();
    if messages.is_empty() {
        let text = match chat.ui_state() {
            ChatUiState::Unmounted => "Chat is closed.",
            ChatUiState::Loading => "Loading conversation...",
            ChatUiState::Error => "Conversation unavailable.",
            ChatUiState::Ready => "No messages yet. Say hello!",
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let elements = build_message_list_elements(messages, chat.perspective());
    let items: Vec<ListItem<'static>> = elements.iter().map(element_to_list_item).collect();
    let element_index = chat
        .selected_index()
        .and_then(|index| message_index_to_element_index(&elements, index));

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_message_style());

    let mut list_state = ListState::default();
    list_state.select(element_index);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn panel_title(chat: &ChatViewState) -> String {
    let base = match chat.perspective() {
        Perspective::Customer => "Restaurant chat".to_owned(),
        Perspective::Staff => match chat.context() {
            Some(context) => format!("Customer {}", short_id(context.client_id())),
            None => "Customer".to_owned(),
        },
    };

    if chat.ui_state() == ChatUiState::Loading {
        format!("{base} (refreshing…)")
    } else {
        base
    }
}

fn banners(chat: &ChatViewState) -> Vec<(BannerKind, String)> {
    let mut banners = Vec::new();

    match chat.connection() {
        ConnectionStatus::Checking => {
            banners.push((BannerKind::Info, "Connecting to restaurant...".to_owned()))
        }
        ConnectionStatus::Unreachable => banners.push((
            BannerKind::Error,
            "Connection issue - some features may not work".to_owned(),
        )),
        ConnectionStatus::Connected => {}
    }

    if !chat.assistant_enabled() {
        let text = match chat.perspective() {
            Perspective::Customer => {
                "AI assistant is currently paused - messages will be seen by restaurant staff"
            }
            Perspective::Staff => "AI assistant is paused for this conversation",
        };
        banners.push((BannerKind::Info, text.to_owned()));
    }

    if let Some(notice) = chat.notice() {
        banners.push((BannerKind::Error, notice.to_owned()));
    }

    banners
}

fn typing_line(chat: &ChatViewState) -> Option<String> {
    chat.awaiting_reply()
        .then(|| "Assistant is typing…".to_owned())
}

fn status_line(chat: &ChatViewState) -> Line<'static> {
    let mut spans = Vec::new();

    if let Some(context) = chat.context() {
        spans.push(Span::raw(format!(
            "client {} | restaurant {} | table {} | ",
            short_id(context.client_id()),
            context.restaurant_id(),
            context.table_id().unwrap_or("-"),
        )));
    }

    if chat.assistant_enabled() {
        spans.push(Span::styled("AI ON", styles::assistant_on_style()));
    } else {
        spans.push(Span::styled("AI OFF", styles::assistant_off_style()));
    }

    if chat.pending_count() > 0 {
        spans.push(Span::styled(
            format!(" | {} unconfirmed", chat.pending_count()),
            styles::status_hint_style(),
        ));
    }

    let hint = match chat.perspective() {
        Perspective::Customer => " | Enter: send | Ctrl+R: refresh | Esc: quit",
        Perspective::Staff => " | Enter: send | Ctrl+A: toggle AI | Ctrl+R: refresh | Esc: quit",
    };
    spans.push(Span::styled(hint, styles::status_hint_style()));

    Line::from(spans)
}

fn short_id(client_id: &str) -> &str {
    client_id
        .char_indices()
        .nth(CLIENT_ID_PREFIX_CHARS)
        .map_or(client_id, |(end, _)| &client_id[..end])
}
