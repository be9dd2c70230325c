//! ListController: fetch lifecycle, search query and the filtered view for
//! one listing variant.
//!
//! The controller is a plain state machine. A fetch is split in two halves so
//! the network call can run anywhere (a spawned task, a test) while every
//! state change happens on the owner's thread:
//!
//! ```text
//!  begin_load(refresh) ─► LoadTicket ─► fetch ─► complete_load(ticket, result)
//!        Idle → Loading | Refreshing                   → Idle
//! ```
//!
//! Overlapping fetches are resolved per [`ResponseOrdering`].

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::client::{FetchError, ListClient};
use crate::config::{ListingConfig, ResponseOrdering};
use crate::protocol::Listing;

/// Display key assigned to an item when its batch is ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One ingested item.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub id: ItemId,
    pub item: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    /// Initial fetch; content is replaced by a skeleton while empty.
    Loading,
    /// Fetch while the previous batch stays on screen.
    Refreshing,
}

/// Handle for one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    refresh: bool,
}

impl LoadTicket {
    pub fn seq(self) -> u64 {
        self.seq
    }

    pub fn is_refresh(self) -> bool {
        self.refresh
    }
}

/// What `complete_load` did with a resolved fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The batch replaced the collection.
    Applied { count: usize },
    /// The fetch failed; the collection is untouched.
    Failed,
    /// A newer fetch was issued after this one; the response was dropped.
    Stale,
}

/// Which parts of the listing the presentation layer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListView {
    pub show_skeleton: bool,
    pub show_refresh_indicator: bool,
    pub show_empty_state: bool,
}

pub struct ListController<T: Listing> {
    config: ListingConfig,
    entries: Vec<Entry<T>>,
    /// Indices into `entries`, in collection order.
    filtered: Vec<usize>,
    query: String,
    state: LoadState,
    /// Sequence number of the most recently issued fetch.
    issued: u64,
    /// Fetches issued but not yet completed. Only tracked under
    /// `LastResolved`; superseded fetches may never complete otherwise.
    outstanding: usize,
    next_id: u64,
    last_updated: Option<DateTime<Local>>,
}

impl<T: Listing> ListController<T> {
    pub fn new(config: ListingConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            state: LoadState::Idle,
            issued: 0,
            outstanding: 0,
            next_id: 1,
            last_updated: None,
        }
    }

    pub fn config(&self) -> &ListingConfig {
        &self.config
    }

    // ── Fetch lifecycle ───────────────────────────────────────────────────────

    /// Fetch a batch and apply it. `refresh` only changes the load state
    /// shown while the request is in flight.
    pub async fn load(&mut self, client: &ListClient, refresh: bool) -> LoadOutcome {
        let ticket = self.begin_load(refresh);
        let result = client.fetch_batch::<T>(&self.config).await;
        self.complete_load(ticket, result)
    }

    /// Enter `Loading`/`Refreshing` and issue a ticket for the new fetch.
    /// Fetches already in flight are not cancelled here.
    pub fn begin_load(&mut self, refresh: bool) -> LoadTicket {
        self.issued += 1;
        if self.config.ordering == ResponseOrdering::LastResolved {
            self.outstanding += 1;
        }
        self.state = if refresh {
            LoadState::Refreshing
        } else {
            LoadState::Loading
        };
        debug!(
            "[{}] fetch #{} issued (refresh={}, outstanding={})",
            T::KIND.path(),
            self.issued,
            refresh,
            self.outstanding
        );
        LoadTicket {
            seq: self.issued,
            refresh,
        }
    }

    /// Apply a resolved fetch.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<T>, FetchError>,
    ) -> LoadOutcome {
        match self.config.ordering {
            ResponseOrdering::LatestIssued => {
                if ticket.seq != self.issued {
                    debug!(
                        "[{}] dropping stale response #{} (latest #{})",
                        T::KIND.path(),
                        ticket.seq,
                        self.issued
                    );
                    return LoadOutcome::Stale;
                }
                let outcome = self.ingest(ticket, result);
                self.state = LoadState::Idle;
                outcome
            }
            ResponseOrdering::LastResolved => {
                self.outstanding = self.outstanding.saturating_sub(1);
                let outcome = self.ingest(ticket, result);
                if self.outstanding == 0 {
                    self.state = LoadState::Idle;
                }
                outcome
            }
        }
    }

    fn ingest(&mut self, ticket: LoadTicket, result: Result<Vec<T>, FetchError>) -> LoadOutcome {
        match result {
            Ok(items) => {
                let entries: Vec<Entry<T>> = items
                    .into_iter()
                    .map(|item| Entry {
                        id: self.alloc_id(),
                        item,
                    })
                    .collect();
                let count = entries.len();
                self.entries = entries;
                self.refilter();
                self.last_updated = Some(Local::now());
                info!(
                    "[{}] fetch #{} loaded {} items",
                    T::KIND.path(),
                    ticket.seq,
                    count
                );
                LoadOutcome::Applied { count }
            }
            Err(e) => {
                warn!("[{}] fetch #{} failed: {}", T::KIND.path(), ticket.seq, e);
                LoadOutcome::Failed
            }
        }
    }

    fn alloc_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    // ── Search ────────────────────────────────────────────────────────────────

    /// Store the query verbatim and recompute the filtered view.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.refilter();
    }

    fn refilter(&mut self) {
        let needle = self.query.to_lowercase();
        self.filtered = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| matches_query(&e.item, &needle))
            .map(|(i, _)| i)
            .collect();
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.state != LoadState::Idle
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The full collection from the last applied fetch.
    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    /// Entries matching the current query, in collection order.
    pub fn filtered(&self) -> impl Iterator<Item = &Entry<T>> + '_ {
        self.filtered.iter().map(|&i| &self.entries[i])
    }

    /// The `n`th entry of the filtered view.
    pub fn filtered_get(&self, n: usize) -> Option<&Entry<T>> {
        self.filtered.get(n).map(|&i| &self.entries[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn view(&self) -> ListView {
        ListView {
            show_skeleton: self.state == LoadState::Loading && self.entries.is_empty(),
            show_refresh_indicator: self.state == LoadState::Refreshing,
            show_empty_state: self.filtered.is_empty() && self.state != LoadState::Loading,
        }
    }
}

/// Case-insensitive substring match over the item's search fields.
/// `needle` must already be lowercased.
fn matches_query<T: Listing>(item: &T, needle: &str) -> bool {
    needle.is_empty()
        || item
            .search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Book, ListingKind, Quote, Rating};
    use reqwest::StatusCode;
    use std::collections::HashSet;

    fn quote(text: &str, author: &str) -> Quote {
        Quote {
            text: text.to_string(),
            author: author.to_string(),
        }
    }

    fn book(title: &str) -> Book {
        Book {
            title: title.to_string(),
            author: None,
            price: Some("£10.00".to_string()),
            rating: Some(Rating::Two),
            image_url: None,
            detail_url: None,
            buy_url: None,
        }
    }

    fn quotes_ctl(ordering: ResponseOrdering) -> ListController<Quote> {
        let mut cfg = ListingConfig::new(ListingKind::Quotes, "http://127.0.0.1:1");
        cfg.ordering = ordering;
        ListController::new(cfg)
    }

    fn books_ctl() -> ListController<Book> {
        ListController::new(ListingConfig::new(ListingKind::Books, "http://127.0.0.1:1"))
    }

    fn failure() -> FetchError {
        FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn load_quotes(ctl: &mut ListController<Quote>, items: Vec<Quote>) {
        let t = ctl.begin_load(false);
        ctl.complete_load(t, Ok(items));
    }

    fn authors(ctl: &ListController<Quote>) -> Vec<String> {
        ctl.filtered().map(|e| e.item.author.clone()).collect()
    }

    #[test]
    fn test_initial_state() {
        let ctl = books_ctl();
        assert_eq!(ctl.state(), LoadState::Idle);
        assert!(ctl.entries().is_empty());
        assert_eq!(ctl.query(), "");
        assert!(ctl.view().show_empty_state);
        assert!(!ctl.view().show_skeleton);
        assert!(ctl.last_updated().is_none());
    }

    #[test]
    fn test_scenario_a_author_search() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        load_quotes(
            &mut ctl,
            vec![
                quote("The world as we have created it.", "Ada"),
                quote("It is our choices.", "Grace"),
                quote("Imperfection is beauty.", "Ada"),
            ],
        );
        ctl.set_query("ada");
        assert_eq!(authors(&ctl), vec!["Ada", "Ada"]);
        let texts: Vec<&str> = ctl.filtered().map(|e| e.item.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["The world as we have created it.", "Imperfection is beauty."]
        );
        // Query stored verbatim.
        ctl.set_query("ADA");
        assert_eq!(ctl.query(), "ADA");
        assert_eq!(ctl.filtered_len(), 2);
    }

    #[test]
    fn test_quote_text_is_searchable() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        load_quotes(
            &mut ctl,
            vec![quote("A day without sunshine", "Steve Martin"), quote("Be yourself", "Oscar Wilde")],
        );
        ctl.set_query("SUNSHINE");
        assert_eq!(authors(&ctl), vec!["Steve Martin"]);
    }

    #[test]
    fn test_book_search_uses_title_only() {
        let mut ctl = books_ctl();
        let mut with_author = book("Sharp Objects");
        with_author.author = Some("Gillian Flynn".to_string());
        let t = ctl.begin_load(false);
        ctl.complete_load(t, Ok(vec![with_author, book("Soumission"), book("Sapiens")]));

        ctl.set_query("flynn");
        assert_eq!(ctl.filtered_len(), 0);

        ctl.set_query("s");
        assert_eq!(ctl.filtered_len(), 3);

        ctl.set_query("SAP");
        let titles: Vec<&str> = ctl.filtered().map(|e| e.item.title.as_str()).collect();
        assert_eq!(titles, vec!["Sapiens"]);
    }

    #[test]
    fn test_query_is_not_trimmed() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        load_quotes(&mut ctl, vec![quote("hello", "Ann"), quote("say hello there", "Bo")]);
        ctl.set_query(" hello");
        assert_eq!(authors(&ctl), vec!["Bo"]);
    }

    #[test]
    fn test_filtered_view_is_ordered_subsequence() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        load_quotes(
            &mut ctl,
            vec![
                quote("Alpha beta", "Xena"),
                quote("gamma", "Alan"),
                quote("delta", "Bea"),
                quote("ALPHABET", "Cy"),
                quote("epsilon", "al"),
            ],
        );

        for q in ["", "al", "AL", "beta", "zzz", "a", "eps", "Ph"] {
            ctl.set_query(q);
            let needle = q.to_lowercase();
            let pred = |e: &Entry<Quote>| {
                e.item.text.to_lowercase().contains(&needle)
                    || e.item.author.to_lowercase().contains(&needle)
            };

            let view: Vec<ItemId> = ctl.filtered().map(|e| e.id).collect();
            let expected: Vec<ItemId> = ctl
                .entries()
                .iter()
                .filter(|e| pred(*e))
                .map(|e| e.id)
                .collect();
            assert_eq!(view, expected, "query {q:?}");
            assert!(ctl.filtered().all(|e| pred(e)));
        }
    }

    #[test]
    fn test_set_query_idempotent() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        load_quotes(&mut ctl, vec![quote("a", "Ada"), quote("b", "Grace")]);
        ctl.set_query("gr");
        let first: Vec<ItemId> = ctl.filtered().map(|e| e.id).collect();
        ctl.set_query("gr");
        let second: Vec<ItemId> = ctl.filtered().map(|e| e.id).collect();
        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_query_survives_reload() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        ctl.set_query("grace");
        load_quotes(&mut ctl, vec![quote("a", "Ada"), quote("b", "Grace")]);
        assert_eq!(ctl.query(), "grace");
        assert_eq!(authors(&ctl), vec!["Grace"]);
    }

    #[test]
    fn test_load_state_transitions() {
        for ordering in [ResponseOrdering::LatestIssued, ResponseOrdering::LastResolved] {
            let mut ctl = quotes_ctl(ordering);

            let t = ctl.begin_load(false);
            assert_eq!(ctl.state(), LoadState::Loading);
            assert!(ctl.view().show_skeleton);
            assert!(!ctl.view().show_empty_state);
            assert_eq!(ctl.complete_load(t, Err(failure())), LoadOutcome::Failed);
            assert_eq!(ctl.state(), LoadState::Idle);

            let t = ctl.begin_load(true);
            assert_eq!(ctl.state(), LoadState::Refreshing);
            assert!(ctl.view().show_refresh_indicator);
            assert!(!ctl.view().show_skeleton);
            assert_eq!(
                ctl.complete_load(t, Ok(vec![quote("a", "Ada")])),
                LoadOutcome::Applied { count: 1 }
            );
            assert_eq!(ctl.state(), LoadState::Idle);
            assert!(!ctl.view().show_refresh_indicator);
            assert!(!ctl.is_fetching());
        }
    }

    #[test]
    fn test_failure_keeps_collection() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        load_quotes(&mut ctl, vec![quote("a", "Ada"), quote("b", "Grace")]);
        let before = ctl.entries().to_vec();
        let stamp = ctl.last_updated();

        let t = ctl.begin_load(true);
        assert_eq!(ctl.complete_load(t, Err(failure())), LoadOutcome::Failed);
        assert_eq!(ctl.entries(), before.as_slice());
        assert_eq!(ctl.last_updated(), stamp);
        assert_eq!(ctl.filtered_len(), 2);
    }

    #[test]
    fn test_failure_on_empty_shows_empty_state() {
        let mut ctl = books_ctl();
        let t = ctl.begin_load(false);
        ctl.complete_load(t, Err(failure()));
        let view = ctl.view();
        assert!(view.show_empty_state);
        assert!(!view.show_skeleton);
    }

    #[test]
    fn test_ids_distinct_per_batch() {
        let mut ctl = books_ctl();
        let batch: Vec<Book> = (0..10).map(|i| book(&format!("Book {i}"))).collect();
        let t = ctl.begin_load(false);
        ctl.complete_load(t, Ok(batch.clone()));
        let first: HashSet<ItemId> = ctl.entries().iter().map(|e| e.id).collect();
        assert_eq!(first.len(), 10);

        // Filtering never reassigns ids.
        ctl.set_query("book 3");
        assert_eq!(ctl.filtered().next().map(|e| e.id), Some(ctl.entries()[3].id));

        // A new batch gets fresh ids.
        let t = ctl.begin_load(true);
        ctl.complete_load(t, Ok(batch));
        let second: HashSet<ItemId> = ctl.entries().iter().map(|e| e.id).collect();
        assert_eq!(second.len(), 10);
        assert!(first.is_disjoint(&second));
    }

    #[test]
    fn test_scenario_b_empty_batch() {
        let mut ctl = books_ctl();
        let t = ctl.begin_load(false);
        assert_eq!(ctl.complete_load(t, Ok(Vec::new())), LoadOutcome::Applied { count: 0 });
        assert!(ctl.entries().is_empty());
        assert_eq!(ctl.filtered_len(), 0);
        assert!(ctl.view().show_empty_state);
    }

    #[test]
    fn test_scenario_d_last_resolved_wins() {
        let mut ctl = quotes_ctl(ResponseOrdering::LastResolved);
        load_quotes(&mut ctl, vec![quote("seed", "Seed")]);

        let slow = ctl.begin_load(false);
        let fast = ctl.begin_load(true);

        ctl.complete_load(fast, Ok(vec![quote("fast", "Fast")]));
        assert_eq!(authors(&ctl), vec!["Fast"]);
        assert!(ctl.is_fetching(), "slow request still outstanding");

        ctl.complete_load(slow, Ok(vec![quote("slow", "Slow")]));
        assert_eq!(authors(&ctl), vec!["Slow"]);
        assert_eq!(ctl.state(), LoadState::Idle);
    }

    #[test]
    fn test_latest_issued_discards_stale_response() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        load_quotes(&mut ctl, vec![quote("seed", "Seed")]);

        let slow = ctl.begin_load(false);
        let fast = ctl.begin_load(true);
        assert!(fast.seq() > slow.seq());
        assert!(fast.is_refresh());

        assert_eq!(
            ctl.complete_load(fast, Ok(vec![quote("fast", "Fast")])),
            LoadOutcome::Applied { count: 1 }
        );
        assert_eq!(ctl.state(), LoadState::Idle);

        assert_eq!(
            ctl.complete_load(slow, Ok(vec![quote("slow", "Slow")])),
            LoadOutcome::Stale
        );
        assert_eq!(authors(&ctl), vec!["Fast"]);
        assert_eq!(ctl.state(), LoadState::Idle);
    }

    #[test]
    fn test_stale_response_does_not_end_newer_fetch() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        let old = ctl.begin_load(false);
        let _new = ctl.begin_load(true);
        assert_eq!(ctl.complete_load(old, Err(failure())), LoadOutcome::Stale);
        assert_eq!(ctl.state(), LoadState::Refreshing);
    }

    #[test]
    fn test_abandoned_fetches_are_not_counted() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        // Superseded tickets are dropped without ever completing.
        for _ in 0..5 {
            let _ = ctl.begin_load(true);
        }
        let last = ctl.begin_load(true);
        assert_eq!(ctl.outstanding, 0);
        ctl.complete_load(last, Ok(vec![quote("a", "Ada")]));
        assert_eq!(ctl.outstanding, 0);
        assert_eq!(ctl.state(), LoadState::Idle);

        let mut ctl = quotes_ctl(ResponseOrdering::LastResolved);
        let a = ctl.begin_load(false);
        let b = ctl.begin_load(true);
        assert_eq!(ctl.outstanding, 2);
        ctl.complete_load(a, Err(failure()));
        ctl.complete_load(b, Err(failure()));
        assert_eq!(ctl.outstanding, 0);
        assert_eq!(ctl.state(), LoadState::Idle);
    }

    #[test]
    fn test_loading_with_content_renders_cards() {
        let mut ctl = quotes_ctl(ResponseOrdering::LatestIssued);
        load_quotes(&mut ctl, vec![quote("a", "Ada")]);
        let _t = ctl.begin_load(false);
        let view = ctl.view();
        assert!(!view.show_skeleton);
        assert!(!view.show_empty_state);
        assert!(!view.show_refresh_indicator);
    }

    #[tokio::test]
    async fn test_load_unreachable_endpoint_fails_quietly() {
        let mut ctl = books_ctl();
        let client = ListClient::default();
        let outcome = ctl.load(&client, false).await;
        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(ctl.state(), LoadState::Idle);
        assert!(ctl.entries().is_empty());
    }
}
