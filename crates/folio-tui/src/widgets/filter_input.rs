//! FilterInput: wraps tui-input for use as the search bar of a listing.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED, C_SECONDARY};

#[derive(Debug, PartialEq)]
pub enum FilterAction {
    Changed(String),
    Confirmed,
    Cancelled,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl FilterInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle a key event while active.
    ///
    /// Esc behaviour:
    ///   - If the input has text: clear it and emit `Changed("")`, staying open
    ///   - If the input is already empty: deactivate and emit `Cancelled`
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc => {
                if !self.input.value().is_empty() {
                    self.input = Input::default();
                    FilterAction::Changed(String::new())
                } else {
                    self.deactivate();
                    FilterAction::Cancelled
                }
            }
            KeyCode::Enter => {
                self.deactivate();
                FilterAction::Confirmed
            }
            _ => {
                self.input
                    .handle_event(&ratatui::crossterm::event::Event::Key(key));
                FilterAction::Changed(self.input.value().to_string())
            }
        }
    }

    /// Render the search bar into `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(4) as usize);
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(
                format!("/ {}", self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            let fg = if self.active { C_FILTER_FG } else { C_SECONDARY };
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", visible), Style::default().fg(fg))
        };

        let paragraph =
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(C_FILTER_BG));
        frame.render_widget(paragraph, area);

        if self.active && area.width > 0 {
            let cursor_x = area.x + 2 + (self.input.visual_cursor() - scroll) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_reports_full_text() {
        let mut f = FilterInput::new("search");
        f.activate();
        assert_eq!(
            f.handle_key(key(KeyCode::Char('a'))),
            FilterAction::Changed("a".to_string())
        );
        assert_eq!(
            f.handle_key(key(KeyCode::Char('d'))),
            FilterAction::Changed("ad".to_string())
        );
        assert_eq!(
            f.handle_key(key(KeyCode::Backspace)),
            FilterAction::Changed("a".to_string())
        );
        assert_eq!(f.input.value(), "a");
    }

    #[test]
    fn test_esc_clears_then_closes() {
        let mut f = FilterInput::new("search");
        f.activate();
        f.handle_key(key(KeyCode::Char('x')));
        assert_eq!(
            f.handle_key(key(KeyCode::Esc)),
            FilterAction::Changed(String::new())
        );
        assert!(f.is_active());
        assert_eq!(f.handle_key(key(KeyCode::Esc)), FilterAction::Cancelled);
        assert!(!f.is_active());
    }

    #[test]
    fn test_enter_keeps_text() {
        let mut f = FilterInput::new("search");
        f.activate();
        f.handle_key(key(KeyCode::Char('z')));
        assert_eq!(f.handle_key(key(KeyCode::Enter)), FilterAction::Confirmed);
        assert!(!f.is_active());
        assert_eq!(f.input.value(), "z");
    }
}
