//! HelpOverlay component: centered popup with keyboard shortcut reference.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PANEL_BORDER, C_PRIMARY, C_SECONDARY},
};

/// Visibility lives in `WorkspaceManager::show_help`; this only tracks scroll.
pub struct HelpOverlay {
    scroll: u16,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { scroll: 0 }
    }
}

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    /// j/k scroll the reference; any other key closes it.
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![Action::Noop];
        }
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                vec![Action::Noop]
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                vec![Action::Noop]
            }
            _ => vec![Action::ToggleHelp],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleHelp = action {
            self.scroll = 0;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        let popup = centered_rect(64, 30, area);

        let help_lines: Vec<Line> = vec![
            Line::from(Span::styled(
                " keyboard shortcuts",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            section(" listings"),
            help_row("← ↓ ↑ →  or  h j k l", "move between cards"),
            help_row("pg up / pg dn", "jump one screen"),
            help_row("home / end  or  g / G", "jump first / last"),
            help_row("r", "refresh (keeps current cards)"),
            help_row("tab  or  1 / 2", "switch Books ↔ Quotes"),
            Line::from(""),
            section(" search"),
            help_row("/", "search the current listing"),
            help_row("enter", "keep query, back to cards"),
            help_row("esc", "clear query, then close"),
            help_row("up / down", "move while searching"),
            Line::from(""),
            section(" cards"),
            help_row("v", "copy book detail link"),
            help_row("b", "copy book buy link"),
            help_row("i", "copy book cover image link"),
            help_row("y", "copy quote with author"),
            Line::from(""),
            section(" ui"),
            help_row("K", "toggle keys bar"),
            help_row("?", "toggle this help overlay"),
            help_row("q / Ctrl+C", "quit"),
            Line::from(""),
            Line::from(Span::styled(
                " j / k scroll, any other key closes",
                Style::default().fg(C_MUTED),
            )),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(help_lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(C_PANEL_BORDER))
                        .style(Style::default().bg(ratatui::style::Color::Rgb(18, 18, 26))),
                )
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            popup,
        );
    }
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
    ))
}

fn help_row<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:<22}", key),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(C_SECONDARY)),
    ])
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}
