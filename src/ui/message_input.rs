//! Message input field rendering.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::domain::{conversation::Perspective, message_input_state::MessageInputState};

use super::styles;

/// Prompt symbol shown before the input text.
const PROMPT_SYMBOL: &str = "> ";

/// Placeholder for an empty composer; tells the user who will read the message.
pub fn placeholder(perspective: Perspective, assistant_enabled: bool) -> &'static str {
    match (perspective, assistant_enabled) {
        (Perspective::Customer, true) => "Ask me about the menu...",
        (Perspective::Customer, false) => "Send a message to the restaurant...",
        (Perspective::Staff, _) => "Send a message to the customer...",
    }
}

/// Renders the message input field and places the terminal cursor in it.
pub fn render_message_input(
    frame: &mut Frame<'_>,
    area: Rect,
    input_state: &MessageInputState,
    placeholder: &str,
) {
    let inner_width = usize::from(area.width.saturating_sub(2));
    let text_width = inner_width.saturating_sub(PROMPT_SYMBOL.len());
    let (line, cursor_column) = build_input_line(input_state, placeholder, text_width);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::panel_border_style()),
    );
    frame.render_widget(paragraph, area);

    let offset = (PROMPT_SYMBOL.len() + cursor_column).min(usize::from(u16::MAX));
    let cursor_x = area.x.saturating_add(1).saturating_add(offset as u16);
    let cursor_y = area.y.saturating_add(1);
    frame.set_cursor_position((cursor_x, cursor_y));
}

/// Builds the visible line and the cursor column relative to the end of the prompt.
fn build_input_line(
    input_state: &MessageInputState,
    placeholder: &str,
    width: usize,
) -> (Line<'static>, usize) {
    let prompt = Span::styled(PROMPT_SYMBOL, styles::input_prompt_style());

    if input_state.is_empty() {
        let line = Line::from(vec![
            prompt,
            Span::styled(placeholder.to_owned(), styles::input_placeholder_style()),
        ]);
        return (line, 0);
    }

    let (visible, cursor_column) =
        visible_window(input_state.text(), input_state.cursor_position(), width);
    let line = Line::from(vec![
        prompt,
        Span::styled(visible, styles::input_text_style()),
    ]);

    (line, cursor_column)
}

/// Slice of `text` that fits in `width` cells while keeping the cursor visible.
fn visible_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let cell = |ch: char| ch.width().unwrap_or(0);

    // One cell stays free for the cursor itself.
    let mut start = cursor;
    let mut before = 0;
    while start > 0 && before + cell(chars[start - 1]) < width {
        before += cell(chars[start - 1]);
        start -= 1;
    }

    let mut end = cursor;
    let mut used = before;
    while end < chars.len() && used + cell(chars[end]) <= width {
        used += cell(chars[end]);
        end += 1;
    }

    (chars[start..end].iter().collect(), before)
}
