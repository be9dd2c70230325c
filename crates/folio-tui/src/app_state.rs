//! AppState: shared read-only data passed to all components during render/event.
//!
//! Components read the listing controllers here but never mutate them.
//! The App event loop is the only writer.

use folio_proto::config::Config;
use folio_proto::listing::{ListController, ListView};
use folio_proto::protocol::{Book, ListingKind, Quote};

use chrono::{DateTime, Local};

use crate::action::Workspace;
use crate::widgets::status_bar::InputMode;

pub struct AppState {
    pub books: ListController<Book>,
    pub quotes: ListController<Quote>,
    pub workspace: Workspace,
    pub input_mode: InputMode,
    /// Advances on every UI tick while a fetch is in flight.
    pub spinner_frame: usize,
}

/// Per-listing facts the header and status line need, independent of the
/// item type.
#[derive(Debug, Clone, Copy)]
pub struct ListingSummary {
    pub view: ListView,
    pub fetching: bool,
    pub shown: usize,
    pub total: usize,
    pub last_updated: Option<DateTime<Local>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            books: ListController::new(config.listing(ListingKind::Books)),
            quotes: ListController::new(config.listing(ListingKind::Quotes)),
            workspace: Workspace::default(),
            input_mode: InputMode::Normal,
            spinner_frame: 0,
        }
    }

    pub fn summary(&self, kind: ListingKind) -> ListingSummary {
        match kind {
            ListingKind::Books => ListingSummary {
                view: self.books.view(),
                fetching: self.books.is_fetching(),
                shown: self.books.filtered_len(),
                total: self.books.entries().len(),
                last_updated: self.books.last_updated(),
            },
            ListingKind::Quotes => ListingSummary {
                view: self.quotes.view(),
                fetching: self.quotes.is_fetching(),
                shown: self.quotes.filtered_len(),
                total: self.quotes.entries().len(),
                last_updated: self.quotes.last_updated(),
            },
        }
    }

    pub fn any_fetching(&self) -> bool {
        self.books.is_fetching() || self.quotes.is_fetching()
    }

    pub fn query(&self, kind: ListingKind) -> &str {
        match kind {
            ListingKind::Books => self.books.query(),
            ListingKind::Quotes => self.quotes.query(),
        }
    }

    /// Apply a search query to the listing it belongs to.
    pub fn set_query(&mut self, kind: ListingKind, text: String) {
        match kind {
            ListingKind::Books => self.books.set_query(text),
            ListingKind::Quotes => self.quotes.set_query(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_proto::listing::LoadState;

    #[test]
    fn test_controllers_use_resolved_endpoints() {
        let mut config = Config::default();
        config.api.quotes_url = Some("http://quotes.test".to_string());
        let state = AppState::new(&config);
        assert_eq!(
            state.books.config().endpoint(),
            "http://localhost:8000/api/books?count=10"
        );
        assert_eq!(
            state.quotes.config().endpoint(),
            "http://quotes.test/api/quotes?count=10"
        );
        assert_eq!(state.workspace, Workspace::Books);
    }

    #[test]
    fn test_summary_tracks_each_listing() {
        let mut state = AppState::new(&Config::default());
        let ticket = state.quotes.begin_load(true);
        let quotes = vec![
            Quote {
                text: "a".to_string(),
                author: "Ada".to_string(),
            },
            Quote {
                text: "b".to_string(),
                author: "Grace".to_string(),
            },
        ];

        let s = state.summary(ListingKind::Quotes);
        assert!(s.fetching && s.view.show_refresh_indicator);
        assert!(!state.summary(ListingKind::Books).fetching);
        assert!(state.any_fetching());

        state.quotes.complete_load(ticket, Ok(quotes));
        state.set_query(ListingKind::Quotes, "grace".to_string());
        let s = state.summary(ListingKind::Quotes);
        assert_eq!((s.shown, s.total), (1, 2));
        assert!(s.last_updated.is_some());
        assert_eq!(state.quotes.state(), LoadState::Idle);
        assert_eq!(state.books.query(), "");
    }
}
