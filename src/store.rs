//! The quote store: an ordered in-memory list mirrored to a single slot.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    constants::quotes::{DEFAULT_QUOTES, QUOTES_STORAGE_KEY},
    error::{QuoteError, StorageError},
    models::quotes::Quote,
    storage::{Slot, SqliteSlot},
    transfer,
};

/// The store shared between commands and the sync task. Holding the lock is
/// what serializes writes to the slot.
pub type SharedStore = Arc<Mutex<QuoteStore<SqliteSlot>>>;

pub struct QuoteStore<S> {
    slot: S,
    quotes: Vec<Quote>,
}

impl<S: Slot> QuoteStore<S> {
    /// reads the persisted list, falling back to the default quotes when the slot
    /// is empty, unreadable or holds something that isn't a valid quote list.
    #[tracing::instrument(skip_all)]
    pub async fn load(slot: S) -> Self {
        let quotes = match slot.read(QUOTES_STORAGE_KEY).await {
            Ok(Some(raw)) => match transfer::parse_document(&raw) {
                Ok(quotes) => {
                    tracing::info!(count = quotes.len(), "loaded quotes from storage");
                    quotes
                }
                Err(e) => {
                    tracing::warn!(err = %e, "stored quotes are unparsable, using defaults");
                    default_quotes()
                }
            },
            Ok(None) => {
                tracing::info!("no stored quotes found, using defaults");
                default_quotes()
            }
            Err(e) => {
                tracing::warn!(err = %e, "couldn't read stored quotes, using defaults");
                default_quotes()
            }
        };

        Self { slot, quotes }
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// distinct categories in first-seen order, with how many quotes each has.
    pub fn categories(&self) -> Vec<(String, usize)> {
        let mut categories: Vec<(String, usize)> = vec![];

        for quote in &self.quotes {
            match categories
                .iter_mut()
                .find(|(category, _)| *category == quote.category)
            {
                Some((_, count)) => *count += 1,
                None => categories.push((quote.category.clone(), 1)),
            }
        }

        categories
    }

    /// appends a local-only quote and persists.
    ///
    /// on a storage error the quote stays in memory and the error is returned;
    /// the next successful persist writes it out.
    #[tracing::instrument(skip(self))]
    pub async fn add(&mut self, text: &str, category: &str) -> Result<Quote, QuoteError> {
        let quote = Quote::new(text, category)?;

        self.quotes.push(quote.clone());
        self.persist().await?;

        tracing::info!(count = self.quotes.len(), "added quote");

        Ok(quote)
    }

    /// parses `document` and appends every quote in it, without deduplication.
    #[tracing::instrument(skip_all, fields(len = document.len()))]
    pub async fn import_append(&mut self, document: &str) -> Result<usize, QuoteError> {
        let imported = transfer::parse_document(document)?;
        let count = imported.len();

        self.quotes.extend(imported);
        self.persist().await?;

        tracing::info!(count, total = self.quotes.len(), "imported quotes");

        Ok(count)
    }

    pub fn export_all(&self) -> Result<String, QuoteError> {
        transfer::export_document(&self.quotes)
            .map_err(|e| QuoteError::Storage(StorageError::Serialize(e)))
    }

    /// swaps in a whole new list, e.g. the result of a reconciliation, and persists.
    pub async fn replace(&mut self, quotes: Vec<Quote>) -> Result<(), QuoteError> {
        self.quotes = quotes;
        self.persist().await
    }

    pub async fn persist(&self) -> Result<(), QuoteError> {
        let raw = serde_json::to_string(&self.quotes).map_err(StorageError::Serialize)?;

        self.slot.write(QUOTES_STORAGE_KEY, &raw).await?;

        Ok(())
    }
}

pub fn default_quotes() -> Vec<Quote> {
    DEFAULT_QUOTES
        .iter()
        .map(|(text, category)| Quote {
            text: text.to_string(),
            category: category.to_string(),
            id: None,
        })
        .collect()
}
