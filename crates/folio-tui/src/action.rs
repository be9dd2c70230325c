//! Action enum: all user-initiated intents and internal events.

use folio_proto::protocol::ListingKind;

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Header,
    BookGrid,
    QuoteGrid,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Fetching ─────────────────────────────────────────────────────────────
    /// Re-fetch a listing, keeping the current batch on screen.
    Refresh(ListingKind),

    // ── Search ───────────────────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    QueryChanged(ListingKind, String),

    // ── Workspace ────────────────────────────────────────────────────────────
    SwitchWorkspace(Workspace),
    NextWorkspace,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleHelp,
    ToggleKeys,
    CopyToClipboard(String),
    /// Show a warning toast.
    Notify(String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Resize(u16, u16),
    Noop,
}

/// Which workspace (tab) is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Workspace {
    #[default]
    Books,
    Quotes,
}

impl Workspace {
    pub fn listing(self) -> ListingKind {
        match self {
            Self::Books => ListingKind::Books,
            Self::Quotes => ListingKind::Quotes,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Books => Self::Quotes,
            Self::Quotes => Self::Books,
        }
    }

    pub fn number_key(self) -> char {
        match self {
            Self::Books => '1',
            Self::Quotes => '2',
        }
    }
}
