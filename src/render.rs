use rand::{seq::SliceRandom, Rng};

use crate::models::quotes::Quote;

#[derive(Debug, PartialEq, Eq)]
pub enum Pick<'a> {
    Quote(&'a Quote),
    /// nothing to show, either the store or the requested category is empty.
    Empty,
}

/// picks one quote uniformly at random, optionally only among quotes whose
/// category matches `category` (case-insensitive).
pub fn pick_random<'a, R: Rng + ?Sized>(
    quotes: &'a [Quote],
    category: Option<&str>,
    rng: &mut R,
) -> Pick<'a> {
    let picked = match category {
        Some(category) => quotes
            .iter()
            .filter(|quote| quote.category.eq_ignore_ascii_case(category.trim()))
            .collect::<Vec<_>>()
            .choose(rng)
            .copied(),
        None => quotes.choose(rng),
    };

    match picked {
        Some(quote) => Pick::Quote(quote),
        None => Pick::Empty,
    }
}
