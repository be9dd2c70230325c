//! Card rendering for the two listing variants.
//!
//! A card is a fixed-height bordered cell in the listing grid. The border is
//! drawn by `ListingPane`; this module produces the inner lines and the
//! per-variant wording.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use folio_proto::listing::ListController;
use folio_proto::protocol::{Book, Listing, ListingKind, Quote};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    theme::{C_AUTHOR, C_BG, C_LINK, C_MUTED, C_PRICE, C_PRIMARY, C_SECONDARY, C_STARS},
};

/// Fixed wording shown around a listing.
pub struct ListingTexts {
    pub title: &'static str,
    pub tagline: &'static str,
    pub search_placeholder: &'static str,
    pub loading_heading: &'static str,
    pub loading_detail: &'static str,
    pub empty_heading: &'static str,
    pub empty_detail: &'static str,
}

const BOOK_TEXTS: ListingTexts = ListingTexts {
    title: "Book Store",
    tagline: "Curated picks & bestsellers, refreshed on demand",
    search_placeholder: "Search books by title...",
    loading_heading: "Loading the latest books",
    loading_detail: "Hang tight, gathering recommendations and cover images.",
    empty_heading: "No matching books",
    empty_detail: "Try a different search or refresh to load new recommendations.",
};

const QUOTE_TEXTS: ListingTexts = ListingTexts {
    title: "Quote Garden",
    tagline: "Daily inspiration, one batch at a time",
    search_placeholder: "Search quotes or authors...",
    loading_heading: "Loading fresh quotes",
    loading_detail: "Fetching thoughtful and inspiring quotes for you…",
    empty_heading: "No matching quotes",
    empty_detail: "Try a different search or refresh to load new quotes.",
};

pub fn texts(kind: ListingKind) -> &'static ListingTexts {
    match kind {
        ListingKind::Books => &BOOK_TEXTS,
        ListingKind::Quotes => &QUOTE_TEXTS,
    }
}

/// A listing item that can be drawn as a card in `ListingPane`.
pub trait CardView: Listing {
    const COMPONENT: ComponentId;

    /// Total card height including the border.
    const CARD_HEIGHT: u16;

    fn controller(state: &AppState) -> &ListController<Self>;

    /// Inner lines of the card, fitted to `width` columns.
    fn card_lines(&self, width: usize) -> Vec<Line<'static>>;

    /// Action for a card-level key (`v`, `b`, `i`, `y`), if the variant binds it.
    fn key_action(&self, key: char) -> Option<Action>;
}

// ── Books ─────────────────────────────────────────────────────────────────────

const STAR_SCALE: u8 = 5;

impl CardView for Book {
    const COMPONENT: ComponentId = ComponentId::BookGrid;
    const CARD_HEIGHT: u16 = 6;

    fn controller(state: &AppState) -> &ListController<Self> {
        &state.books
    }

    fn card_lines(&self, width: usize) -> Vec<Line<'static>> {
        let price = format!(" {} ", self.price_label());
        let price_w = price.width();
        let title = truncate(&self.title, width.saturating_sub(price_w + 1));
        let pad = width.saturating_sub(title.width() + price_w);

        let title_line = Line::from(vec![
            Span::styled(
                title,
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" ".repeat(pad)),
            Span::styled(
                price,
                Style::default()
                    .fg(C_BG)
                    .bg(C_PRICE)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);

        let author_line = Line::from(Span::styled(
            truncate(self.author_label(), width),
            Style::default().fg(C_SECONDARY),
        ));

        let stars = self.star_count().min(STAR_SCALE);
        let stars_line = Line::from(vec![
            Span::styled("★".repeat(stars as usize), Style::default().fg(C_STARS)),
            Span::styled(
                "★".repeat((STAR_SCALE - stars) as usize),
                Style::default().fg(C_MUTED),
            ),
            Span::styled(
                format!(" ({})", star_label(stars)),
                Style::default().fg(C_SECONDARY),
            ),
        ]);

        let mut links = Vec::new();
        if self.view_link().is_some() {
            links.push(link_span('v', "view"));
        }
        if self.buy_link().is_some() {
            if !links.is_empty() {
                links.push(Span::raw("  "));
            }
            links.push(link_span('b', "buy"));
        }
        if self.image_link().is_some() {
            if !links.is_empty() {
                links.push(Span::raw("  "));
            }
            links.push(link_span('i', "cover"));
        }
        if links.is_empty() {
            links.push(Span::styled("no links", Style::default().fg(C_MUTED)));
        }

        vec![title_line, author_line, stars_line, Line::from(links)]
    }

    fn key_action(&self, key: char) -> Option<Action> {
        let (link, what) = match key {
            'v' => (self.view_link(), "view"),
            'b' => (self.buy_link(), "buy"),
            'i' => (self.image_link(), "cover"),
            _ => return None,
        };
        Some(match link {
            Some(url) => Action::CopyToClipboard(url.to_string()),
            None => Action::Notify(format!("no {} link for this book", what)),
        })
    }
}

/// `(n)` for rated books, `(—)` otherwise.
fn star_label(stars: u8) -> String {
    if stars == 0 {
        "—".to_string()
    } else {
        stars.to_string()
    }
}

fn link_span(key: char, label: &str) -> Span<'static> {
    Span::styled(format!("[{}] {} ↗", key, label), Style::default().fg(C_LINK))
}

// ── Quotes ────────────────────────────────────────────────────────────────────

/// Width of the avatar column: `(A) `.
const AVATAR_W: usize = 4;
const QUOTE_TEXT_LINES: usize = 3;

impl CardView for Quote {
    const COMPONENT: ComponentId = ComponentId::QuoteGrid;
    const CARD_HEIGHT: u16 = 6;

    fn controller(state: &AppState) -> &ListController<Self> {
        &state.quotes
    }

    fn card_lines(&self, width: usize) -> Vec<Line<'static>> {
        let quoted = format!("“{}”", self.text.trim());
        let body = wrap(&quoted, width.saturating_sub(AVATAR_W), QUOTE_TEXT_LINES);

        let mut lines: Vec<Line<'static>> = body
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let lead = if i == 0 {
                    Span::styled(
                        format!("({}) ", self.initial()),
                        Style::default().fg(C_AUTHOR).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw(" ".repeat(AVATAR_W))
                };
                Line::from(vec![lead, Span::styled(text, Style::default().fg(C_PRIMARY))])
            })
            .collect();
        while lines.len() < QUOTE_TEXT_LINES {
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            truncate(&format!("— {}", self.author_label()), width),
            Style::default().fg(C_SECONDARY).add_modifier(Modifier::BOLD),
        )));
        lines
    }

    fn key_action(&self, key: char) -> Option<Action> {
        match key {
            'y' => Some(Action::CopyToClipboard(format!(
                "“{}” — {}",
                self.text.trim(),
                self.author_label()
            ))),
            _ => None,
        }
    }
}

// ── Text fitting ──────────────────────────────────────────────────────────────

/// Cut `text` to at most `width` display columns, ending in `…` when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Greedy word wrap into at most `max_lines` lines of `width` columns.
/// Overflow is marked with `…` on the last line.
pub fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 || max_lines == 0 {
        return Vec::new();
    }
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut overflow = false;

    for word in text.split_whitespace() {
        let candidate_w = if current.is_empty() {
            word.width()
        } else {
            current.width() + 1 + word.width()
        };
        if candidate_w <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if lines.len() == max_lines {
            overflow = true;
            break;
        }
        current = if word.width() > width {
            truncate(word, width)
        } else {
            word.to_string()
        };
    }

    if !overflow && !current.is_empty() {
        if lines.len() < max_lines {
            lines.push(current);
        } else {
            overflow = true;
        }
    }

    if overflow {
        if let Some(last) = lines.last_mut() {
            let trimmed = truncate(last, width.saturating_sub(1));
            *last = format!("{}…", trimmed.trim_end_matches('…'));
        }
    }
    lines
}
