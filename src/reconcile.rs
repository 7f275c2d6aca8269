//! Merging the local quote list with a list fetched from the remote mirror.
//!
//! The remote copy always wins. Every remote quote is kept, in fetch order,
//! followed by the local quotes whose id the remote list doesn't carry. Local
//! quotes without an id can never collide and always survive.

use std::collections::HashSet;

use crate::models::quotes::Quote;

#[derive(Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub quotes: Vec<Quote>,
    /// ids present on both sides, in local order. the local copies were dropped.
    pub overwritten: Vec<i64>,
    /// how many of the overwritten local copies differed from the remote one.
    pub changed: usize,
    pub remote: usize,
    pub kept_local: usize,
}

pub fn reconcile(local: &[Quote], remote: Vec<Quote>) -> Reconciliation {
    let remote_ids: HashSet<i64> = remote.iter().filter_map(|quote| quote.id).collect();

    let mut overwritten = vec![];
    let mut changed = 0;
    let mut survivors = vec![];

    for quote in local {
        match quote.id {
            Some(id) if remote_ids.contains(&id) => {
                if !remote.iter().any(|r| r == quote) {
                    changed += 1;
                }

                overwritten.push(id);
            }
            _ => survivors.push(quote.clone()),
        }
    }

    let remote_count = remote.len();
    let kept_local = survivors.len();

    let mut quotes = remote;
    quotes.extend(survivors);

    Reconciliation {
        quotes,
        overwritten,
        changed,
        remote: remote_count,
        kept_local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(id: Option<i64>, text: &str) -> Quote {
        Quote {
            text: text.to_string(),
            category: "Server".to_string(),
            id,
        }
    }

    #[test]
    fn remote_wins_and_non_colliding_local_survives() {
        let local = vec![quote(Some(1), "A"), quote(Some(2), "B")];
        let remote = vec![quote(Some(1), "A2")];

        let merged = reconcile(&local, remote);

        assert_eq!(merged.quotes, vec![quote(Some(1), "A2"), quote(Some(2), "B")]);
        assert_eq!(merged.overwritten, vec![1]);
        assert_eq!(merged.changed, 1);
        assert_eq!(merged.remote, 1);
        assert_eq!(merged.kept_local, 1);
    }

    #[test]
    fn id_less_local_survives_empty_remote() {
        let local = vec![quote(None, "local-only")];

        let merged = reconcile(&local, vec![]);

        assert_eq!(merged.quotes, local);
        assert!(merged.overwritten.is_empty());
    }

    #[test]
    fn id_less_local_is_never_evicted() {
        let local = vec![quote(None, "mine"), quote(Some(5), "old")];
        let remote = vec![quote(Some(5), "new"), quote(Some(6), "other")];

        let merged = reconcile(&local, remote);

        assert_eq!(
            merged.quotes,
            vec![
                quote(Some(5), "new"),
                quote(Some(6), "other"),
                quote(None, "mine"),
            ]
        );
    }

    #[test]
    fn identical_collision_is_reported_but_not_changed() {
        let local = vec![quote(Some(3), "same")];
        let remote = vec![quote(Some(3), "same")];

        let merged = reconcile(&local, remote);

        assert_eq!(merged.quotes, vec![quote(Some(3), "same")]);
        assert_eq!(merged.overwritten, vec![3]);
        assert_eq!(merged.changed, 0);
    }

    #[test]
    fn remote_order_then_local_order() {
        let local = vec![quote(None, "x"), quote(Some(9), "y"), quote(None, "z")];
        let remote = vec![quote(Some(2), "b"), quote(Some(1), "a")];

        let merged = reconcile(&local, remote);

        let texts: Vec<_> = merged.quotes.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "a", "x", "y", "z"]);
    }
}
