//! Header component: 2-row top bar.
//!
//! Row 1: listing title and tagline, fetch indicator on the right.
//! Row 2: workspace tabs, match count and the active query.
//!
//! Not focusable; draws to a 2-row area.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId, Workspace},
    app_state::{AppState, ListingSummary},
    component::Component,
    components::cards::texts,
    theme::{C_BADGE_PENDING, C_FILTER_FG, C_MUTED, C_NUMBER_HINT, C_PRIMARY, C_SECONDARY},
};

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

/// Right-hand status text for the fetch indicator.
fn fetch_status(summary: &ListingSummary, spinner_frame: usize) -> (String, Style) {
    if summary.fetching {
        let icon = SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()];
        let what = if summary.view.show_refresh_indicator {
            "refreshing"
        } else {
            "loading"
        };
        (
            format!("{} {}… ", icon, what),
            Style::default().fg(C_BADGE_PENDING).add_modifier(Modifier::BOLD),
        )
    } else if let Some(ts) = summary.last_updated {
        (
            format!("updated {} ", ts.format("%H:%M:%S")),
            Style::default().fg(C_MUTED),
        )
    } else {
        (String::new(), Style::default())
    }
}

fn build_tabs(state: &AppState, summary: &ListingSummary) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for ws in [Workspace::Books, Workspace::Quotes] {
        let active = ws == state.workspace;
        let label_style = if active {
            Style::default()
                .fg(C_PRIMARY)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(C_MUTED)
        };
        spans.push(Span::styled(
            format!("[{}] ", ws.number_key()),
            Style::default().fg(C_NUMBER_HINT),
        ));
        spans.push(Span::styled(ws.listing().label(), label_style));
        spans.push(Span::raw("  "));
    }

    spans.push(Span::styled("· ", Style::default().fg(C_MUTED)));
    spans.push(Span::styled(
        format!("{} of {} shown", summary.shown, summary.total),
        Style::default().fg(C_SECONDARY),
    ));

    let query = state.query(state.workspace.listing());
    if !query.is_empty() {
        spans.push(Span::styled("  search ", Style::default().fg(C_MUTED)));
        spans.push(Span::styled(
            format!("\"{}\"", query),
            Style::default().fg(C_FILTER_FG),
        ));
    }
    Line::from(spans)
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        let kind = state.workspace.listing();
        let summary = state.summary(kind);
        let texts = texts(kind);

        let (status, status_style) = fetch_status(&summary, state.spinner_frame);
        let row1 = Rect { height: 1, ..area };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(status.chars().count() as u16),
            ])
            .split(row1);

        let title = Line::from(vec![
            Span::styled(
                format!(" {}", texts.title),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", texts.tagline), Style::default().fg(C_SECONDARY)),
        ]);
        frame.render_widget(Paragraph::new(title), cols[0]);
        frame.render_widget(Paragraph::new(Span::styled(status, status_style)), cols[1]);

        if area.height >= 2 {
            let row2 = Rect {
                y: area.y + 1,
                height: 1,
                ..area
            };
            frame.render_widget(Paragraph::new(build_tabs(state, &summary)), row2);
        }
    }
}
