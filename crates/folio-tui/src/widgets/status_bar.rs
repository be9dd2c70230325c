//! Status bar: bottom line with the input mode and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Workspace;
use crate::theme::{C_MODE_NORMAL, C_MODE_SEARCH, C_MUTED, C_SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Keys go to the search bar of the active listing.
    Search,
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, workspace: Workspace) {
    let (label, label_color) = match mode {
        InputMode::Search => ("SEARCH", C_MODE_SEARCH),
        InputMode::Normal => match workspace {
            Workspace::Books => ("BOOKS", C_MODE_NORMAL),
            Workspace::Quotes => ("QUOTES", C_MODE_NORMAL),
        },
    };

    let keys = match mode {
        InputMode::Normal => match workspace {
            Workspace::Books => {
                " ←↓↑→/hjkl move  / search  r refresh  v copy view  b copy buy  i copy cover  Tab/1-2 switch  K keys  ? help  q quit"
            }
            Workspace::Quotes => {
                " ←↓↑→/hjkl move  / search  r refresh  y copy quote  Tab/1-2 switch  K keys  ? help  q quit"
            }
        },
        InputMode::Search => " type to search  Up/Down move  Enter keep  Esc clear+close  Tab switch",
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(label_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
