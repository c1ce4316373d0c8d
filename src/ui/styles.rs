//! Style definitions for the UI components.

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// Message list styles
// =============================================================================

/// Style for the author label of a message group.
pub fn message_sender_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Style for the customer's own label, shown on the right.
pub fn client_sender_style() -> Style {
    Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::BOLD)
}

pub fn message_time_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn message_text_style() -> Style {
    Style::default().fg(Color::White)
}

/// Style for badges like [Staff] and [Audio].
pub fn message_badge_style() -> Style {
    Style::default().fg(Color::Cyan)
}

/// Style for locally synthesized failure bubbles.
pub fn message_error_style() -> Style {
    Style::default().fg(Color::Red)
}

/// Style for the "sending…" marker of entries the server has not confirmed yet.
pub fn message_pending_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

pub fn date_separator_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn typing_indicator_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

// =============================================================================
// Banners and panels
// =============================================================================

pub fn info_banner_style() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn error_banner_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

pub fn panel_border_style() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn selected_message_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
}

pub fn assistant_on_style() -> Style {
    Style::default().fg(Color::Green)
}

pub fn assistant_off_style() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn status_hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

// =============================================================================
// Input styles
// =============================================================================

pub fn input_prompt_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub fn input_text_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn input_placeholder_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_sender_style_is_bold_white() {
        let style = message_sender_style();
        assert_eq!(style.fg, Some(Color::White));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn error_styles_are_red() {
        assert_eq!(message_error_style().fg, Some(Color::Red));
        assert_eq!(error_banner_style().fg, Some(Color::Red));
    }

    #[test]
    fn badge_style_is_cyan() {
        assert_eq!(message_badge_style().fg, Some(Color::Cyan));
    }

    #[test]
    fn pending_marker_is_dimmed_italic() {
        let style = message_pending_style();
        assert_eq!(style.fg, Some(Color::DarkGray));
        assert!(style.add_modifier.contains(Modifier::ITALIC));
    }
}
