//! JSON documents for exporting, importing and persisting quote lists.

use serde_json::Value;

use crate::{error::QuoteError, models::quotes::Quote};

/// renders every quote, in order, as a pretty-printed JSON array.
pub fn export_document(quotes: &[Quote]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(quotes)
}

/// parses a JSON array of quote objects.
///
/// structural problems are `Format` errors, blank `text` or `category` is a
/// `Validation` error. either way nothing is returned for a partially valid document.
pub fn parse_document(document: &str) -> Result<Vec<Quote>, QuoteError> {
    let value: Value = serde_json::from_str(document)
        .map_err(|e| QuoteError::Format(format!("document is not valid JSON: {e}")))?;

    let Value::Array(entries) = value else {
        return Err(QuoteError::Format(
            "document must be a JSON array of quotes.".to_string(),
        ));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| parse_entry(idx, entry))
        .collect()
}

fn parse_entry(idx: usize, entry: Value) -> Result<Quote, QuoteError> {
    if !entry.is_object() {
        return Err(QuoteError::Format(format!("entry {idx} is not an object.")));
    }

    let quote: Quote = serde_json::from_value(entry)
        .map_err(|e| QuoteError::Format(format!("entry {idx} is not a quote: {e}")))?;

    quote.validate().map_err(|_| {
        QuoteError::Validation(format!("entry {idx} has an empty text or category."))
    })?;

    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(text: &str, category: &str, id: Option<i64>) -> Quote {
        Quote {
            text: text.to_string(),
            category: category.to_string(),
            id,
        }
    }

    #[test]
    fn parses_array_of_quotes() {
        let quotes = parse_document(
            r#"[
                {"text": "A", "category": "Life"},
                {"text": "B", "category": "Server", "id": 3, "extra": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            quotes,
            vec![quote("A", "Life", None), quote("B", "Server", Some(3))]
        );
    }

    #[test]
    fn empty_array_is_fine() {
        assert_eq!(parse_document("[]").unwrap(), vec![]);
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_document("quotes!"),
            Err(QuoteError::Format(_))
        ));
    }

    #[test]
    fn rejects_non_array() {
        assert!(matches!(
            parse_document(r#"{"text": "A", "category": "B"}"#),
            Err(QuoteError::Format(_))
        ));
    }

    #[test]
    fn rejects_non_object_entry() {
        let err = parse_document(r#"[{"text": "A", "category": "B"}, "C"]"#).unwrap_err();

        assert!(matches!(err, QuoteError::Format(ref msg) if msg.contains("entry 1")));
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(matches!(
            parse_document(r#"[{"text": "A"}]"#),
            Err(QuoteError::Format(_))
        ));
        assert!(matches!(
            parse_document(r#"[{"category": "A"}]"#),
            Err(QuoteError::Format(_))
        ));
        assert!(matches!(
            parse_document(r#"[{"text": 1, "category": "A"}]"#),
            Err(QuoteError::Format(_))
        ));
    }

    #[test]
    fn blank_fields_are_validation_errors() {
        assert!(matches!(
            parse_document(r#"[{"text": "", "category": "A"}]"#),
            Err(QuoteError::Validation(_))
        ));
    }

    #[test]
    fn export_then_parse_preserves_order() {
        let quotes = vec![
            quote("first", "Life", None),
            quote("second", "Server", Some(2)),
            quote("third", "Happiness", None),
        ];

        let document = export_document(&quotes).unwrap();

        assert_eq!(parse_document(&document).unwrap(), quotes);
    }
}
