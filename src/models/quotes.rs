use serde::{Deserialize, Serialize};

use crate::{constants::quotes::SERVER_CATEGORY, error::QuoteError};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Quote {
    /// builds a local-only quote from the given fields, rejecting blank text or category.
    pub fn new(text: &str, category: &str) -> Result<Self, QuoteError> {
        let quote = Quote {
            text: text.to_string(),
            category: category.to_string(),
            id: None,
        };

        quote.validate()?;

        Ok(quote)
    }

    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.text.trim().is_empty() || self.category.trim().is_empty() {
            return Err(QuoteError::Validation(
                "please enter both a quote and a category.".to_string(),
            ));
        }

        Ok(())
    }
}

/// a single entry of the placeholder posts collection. only the fields we map are kept.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemotePost {
    pub id: i64,
    pub title: String,
}

impl From<RemotePost> for Quote {
    fn from(post: RemotePost) -> Self {
        Quote {
            text: post.title,
            category: SERVER_CATEGORY.to_string(),
            id: Some(post.id),
        }
    }
}
