//! ListingPane component: the body of a workspace.
//!
//! Draws one listing as a search bar above a grid of cards, or the skeleton
//! while the first batch loads, or the empty state when nothing matches.

use std::marker::PhantomData;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use folio_proto::listing::{ItemId, ListController};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::cards::{texts, CardView, ListingTexts},
    theme::{
        style_focused_border, style_muted, style_secondary, style_title, style_unfocused_border,
        C_ACCENT, C_BADGE_PENDING, C_SELECTION_BG, C_SKELETON, C_SKELETON_PULSE,
    },
    widgets::{
        filter_input::{FilterAction, FilterInput},
        grid_cursor::GridCursor,
        pane_chrome::{pane_chrome, Badge},
    },
};

/// Cards narrower than this do not get their own column.
const MIN_CARD_WIDTH: u16 = 36;
const MAX_COLUMNS: usize = 3;
const SKELETON_CARDS: usize = 6;

/// Number of card columns that fit in `width`.
pub fn grid_columns(width: u16) -> usize {
    ((width / MIN_CARD_WIDTH) as usize).clamp(1, MAX_COLUMNS)
}

pub struct ListingPane<T: CardView> {
    cursor: GridCursor,
    /// Item under the cursor, so the selection follows it across filtering.
    selected_id: Option<ItemId>,
    filter_input: FilterInput,
    columns: usize,
    visible_rows: usize,
    /// Grid area from the last draw, for mouse hit-testing.
    grid_area: Rect,
    _item: PhantomData<T>,
}

impl<T: CardView> ListingPane<T> {
    pub fn new() -> Self {
        Self {
            cursor: GridCursor::new(),
            selected_id: None,
            filter_input: FilterInput::new(texts(T::KIND).search_placeholder),
            columns: 1,
            visible_rows: 1,
            grid_area: Rect::default(),
            _item: PhantomData,
        }
    }

    /// Re-anchor the cursor on the remembered item, or clamp it.
    fn sync_selection(&mut self, ctl: &ListController<T>) {
        let pos = self
            .selected_id
            .and_then(|id| ctl.filtered().position(|e| e.id == id));
        match pos {
            Some(p) => self.cursor.selected = p,
            None => self.cursor.clamp(ctl.filtered_len()),
        }
        self.remember(ctl);
    }

    fn remember(&mut self, ctl: &ListController<T>) {
        self.selected_id = ctl.filtered_get(self.cursor.selected).map(|e| e.id);
    }

    fn draw_grid(&mut self, frame: &mut Frame, area: Rect, focused: bool, ctl: &ListController<T>) {
        let columns = self.columns;
        let card_h = T::CARD_HEIGHT;
        let card_w = area.width / columns as u16;
        self.visible_rows = ((area.height / card_h) as usize).max(1);
        self.cursor.ensure_visible(columns, self.visible_rows);
        self.grid_area = area;

        let range = self
            .cursor
            .visible_range(columns, self.visible_rows, ctl.filtered_len());
        let first = range.start;
        for pos in range {
            let Some(entry) = ctl.filtered_get(pos) else {
                continue;
            };
            let slot = pos - first;
            let rect = Rect {
                x: area.x + (slot % columns) as u16 * card_w,
                y: area.y + (slot / columns) as u16 * card_h,
                width: card_w,
                height: card_h,
            };
            if rect.bottom() > area.bottom() {
                break;
            }

            let selected = pos == self.cursor.selected;
            let border = if selected && focused {
                style_focused_border()
            } else {
                style_unfocused_border()
            };
            let mut block = Block::default().borders(Borders::ALL).border_style(border);
            if selected {
                block = block.style(Style::default().bg(C_SELECTION_BG));
            }
            let inner = block.inner(rect);
            frame.render_widget(block, rect);
            frame.render_widget(
                Paragraph::new(entry.item.card_lines(inner.width as usize)),
                inner,
            );
        }
    }
}

impl<T: CardView> Default for ListingPane<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_skeleton(frame: &mut Frame, area: Rect, texts: &ListingTexts, columns: usize, pulse: bool) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(texts.loading_heading, style_title())),
            Line::from(Span::styled(texts.loading_detail, style_secondary())),
        ])
        .alignment(Alignment::Center),
        rows[0],
    );

    let color = if pulse { C_SKELETON_PULSE } else { C_SKELETON };
    let grid = rows[1];
    let card_w = grid.width / columns as u16;
    let card_h = 5u16;
    for i in 0..SKELETON_CARDS {
        let rect = Rect {
            x: grid.x + (i % columns) as u16 * card_w,
            y: grid.y + (i / columns) as u16 * card_h,
            width: card_w,
            height: card_h,
        };
        if rect.bottom() > grid.bottom() {
            break;
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let w = inner.width as usize;
        let bar = |num: usize, den: usize| {
            Line::from(Span::styled(
                "▆".repeat(w * num / den),
                Style::default().fg(color),
            ))
        };
        frame.render_widget(
            Paragraph::new(vec![bar(3, 4), bar(5, 6), bar(1, 3)]),
            inner,
        );
    }
}

fn draw_empty_state(frame: &mut Frame, area: Rect, texts: &ListingTexts) {
    let lines = vec![
        Line::from(Span::styled(texts.empty_heading, style_title())),
        Line::from(Span::styled(texts.empty_detail, style_secondary())),
        Line::from(""),
        Line::from(vec![
            Span::styled("press ", style_muted()),
            Span::styled(
                "r",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to refresh", style_muted()),
        ]),
    ];
    let h = (lines.len() as u16).min(area.height);
    let rect = Rect {
        y: area.y + area.height.saturating_sub(h) / 2,
        height: h,
        ..area
    };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
}

impl<T: CardView> Component for ListingPane<T> {
    fn id(&self) -> ComponentId {
        T::COMPONENT
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let ctl = T::controller(state);
        self.sync_selection(ctl);
        let len = ctl.filtered_len();
        let cols = self.columns;

        // Search bar input
        if self.filter_input.is_active() {
            match key.code {
                KeyCode::Up => {
                    self.cursor.up(cols, 1);
                    self.remember(ctl);
                    return vec![];
                }
                KeyCode::Down => {
                    self.cursor.down(cols, 1, len);
                    self.remember(ctl);
                    return vec![];
                }
                _ => {}
            }
            return match self.filter_input.handle_key(key) {
                FilterAction::Changed(q) => vec![Action::QueryChanged(T::KIND, q)],
                FilterAction::Confirmed | FilterAction::Cancelled => vec![Action::CloseSearch],
            };
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.cursor.left(),
            KeyCode::Right | KeyCode::Char('l') => self.cursor.right(len),
            KeyCode::Up | KeyCode::Char('k') => self.cursor.up(cols, 1),
            KeyCode::Down | KeyCode::Char('j') => self.cursor.down(cols, 1, len),
            KeyCode::PageUp => self.cursor.up(cols, self.visible_rows),
            KeyCode::PageDown => self.cursor.down(cols, self.visible_rows, len),
            KeyCode::Home | KeyCode::Char('g') => self.cursor.first(),
            KeyCode::End | KeyCode::Char('G') => self.cursor.last(len),

            KeyCode::Char('/') => {
                self.filter_input.activate();
                return vec![Action::OpenSearch];
            }
            KeyCode::Char('r') => return vec![Action::Refresh(T::KIND)],

            KeyCode::Char(c) => {
                if let Some(action) = ctl
                    .filtered_get(self.cursor.selected)
                    .and_then(|e| e.item.key_action(c))
                {
                    return vec![action];
                }
            }
            _ => {}
        }
        self.remember(ctl);
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        let ctl = T::controller(state);
        self.sync_selection(ctl);
        let len = ctl.filtered_len();
        match event.kind {
            MouseEventKind::ScrollUp => self.cursor.up(self.columns, 1),
            MouseEventKind::ScrollDown => self.cursor.down(self.columns, 1, len),
            MouseEventKind::Down(MouseButton::Left) => {
                let grid = self.grid_area;
                let inside = event.column >= grid.x
                    && event.column < grid.right()
                    && event.row >= grid.y
                    && event.row < grid.bottom();
                if inside {
                    let card_w = (grid.width / self.columns as u16).max(1);
                    let col = ((event.column - grid.x) / card_w) as usize;
                    let row = ((event.row - grid.y) / T::CARD_HEIGHT) as usize;
                    self.cursor.handle_click(row, col, self.columns, len);
                }
            }
            _ => {}
        }
        self.remember(ctl);
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::CloseSearch = action {
            self.filter_input.deactivate();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let ctl = T::controller(state);
        let view = ctl.view();
        let texts = texts(T::KIND);

        let title = format!(
            "{} · {} of {}",
            texts.title,
            ctl.filtered_len(),
            ctl.entries().len()
        );
        let badge = view.show_refresh_indicator.then_some(Badge {
            text: "refreshing",
            color: C_BADGE_PENDING,
        });
        let number_key = state.workspace.number_key();
        let block = pane_chrome(&title, Some(number_key), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height < 3 {
            return;
        }

        self.filter_input.draw(frame, Rect { height: 1, ..inner });
        let body = Rect {
            y: inner.y + 2,
            height: inner.height - 2,
            ..inner
        };
        self.columns = grid_columns(body.width);

        if view.show_skeleton {
            let pulse = (state.spinner_frame / 5) % 2 == 1;
            draw_skeleton(frame, body, texts, self.columns, pulse);
            return;
        }
        if view.show_empty_state {
            draw_empty_state(frame, body, texts);
            return;
        }

        self.sync_selection(ctl);
        self.draw_grid(frame, body, focused, ctl);
    }
}
