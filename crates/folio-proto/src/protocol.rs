//! Wire shapes served by the listing API and the presentation helpers the
//! cards are built from.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder shown in the price badge when a book carries no price.
pub const PRICE_PLACEHOLDER: &str = "—";

/// Which listing an endpoint serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Books,
    Quotes,
}

impl ListingKind {
    /// Path segment under `/api/`, also the envelope key of the response.
    pub fn path(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Quotes => "quotes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Books => "Books",
            Self::Quotes => "Quotes",
        }
    }
}

/// An item variant that can be fetched in batches and searched.
pub trait Listing: DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ListingKind;

    /// Response body of the batch endpoint, e.g. `{ "books": [...] }`.
    type Envelope: DeserializeOwned + Into<Vec<Self>>;

    /// Fields compared against the search query.
    fn search_fields(&self) -> Vec<&str>;
}

// ── Books ─────────────────────────────────────────────────────────────────────

/// Star rating label as scraped from the store (`star-rating Three`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Five,
    Four,
    Three,
    Two,
    One,
    None,
    /// Any label outside the known set.
    #[serde(other)]
    Unrecognized,
}

impl Rating {
    /// Number of filled stars on the 5-unit scale.
    pub fn stars(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Four => 4,
            Self::Three => 3,
            Self::Two => 2,
            Self::One => 1,
            Self::None | Self::Unrecognized => 0,
        }
    }
}

/// Non-string or unknown ratings become `Unrecognized` instead of failing
/// the whole batch. `null` stays `None`.
fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<Rating>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        Value::String(_) => serde_json::from_value(v).unwrap_or(Rating::Unrecognized),
        _ => Rating::Unrecognized,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub detail_url: Option<String>,
    #[serde(default)]
    pub buy_url: Option<String>,
}

impl Book {
    pub fn star_count(&self) -> u8 {
        self.rating.map_or(0, Rating::stars)
    }

    pub fn author_label(&self) -> &str {
        non_blank(self.author.as_deref()).unwrap_or("Unknown author")
    }

    pub fn price_label(&self) -> &str {
        non_blank(self.price.as_deref()).unwrap_or(PRICE_PLACEHOLDER)
    }

    pub fn view_link(&self) -> Option<&str> {
        non_blank(self.detail_url.as_deref())
    }

    pub fn image_link(&self) -> Option<&str> {
        non_blank(self.image_url.as_deref())
    }

    /// The purchase link, falling back to the detail page.
    pub fn buy_link(&self) -> Option<&str> {
        non_blank(self.buy_url.as_deref()).or_else(|| self.view_link())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BooksEnvelope {
    pub books: Vec<Book>,
}

impl From<BooksEnvelope> for Vec<Book> {
    fn from(env: BooksEnvelope) -> Self {
        env.books
    }
}

impl Listing for Book {
    const KIND: ListingKind = ListingKind::Books;
    type Envelope = BooksEnvelope;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str()]
    }
}

// ── Quotes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    /// Avatar letter: first character of the author, or `Q`.
    pub fn initial(&self) -> char {
        self.author
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('Q')
    }

    pub fn author_label(&self) -> &str {
        non_blank(Some(self.author.as_str())).unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotesEnvelope {
    pub quotes: Vec<Quote>,
}

impl From<QuotesEnvelope> for Vec<Quote> {
    fn from(env: QuotesEnvelope) -> Self {
        env.quotes
    }
}

impl Listing for Quote {
    const KIND: ListingKind = ListingKind::Quotes;
    type Envelope = QuotesEnvelope;

    fn search_fields(&self) -> Vec<&str> {
        vec![self.text.as_str(), self.author.as_str()]
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}
