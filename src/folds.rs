//! Simple case folding.
//!
//! A char folds to the lowercase of its uppercase form, so that chars sharing
//! an uppercase (like 'µ' and 'μ', or 'ς' and 'σ') fold together.
//! Multi-char expansions (like 'ß' uppercasing to "SS") are left alone.
//!
//! Two chars match case-insensitively when they have the same fold. The set of
//! chars sharing a fold is its orbit; orbits may hold more than two chars (the
//! Kelvin sign, 'K' and 'k') and may contain chars that are not simple case
//! pairs of each other ('ẞ' and 'ß').

use crate::util::SliceHelp;
use std::sync::OnceLock;

/// Cased chars all lie below this bound.
const LAST_CASED: u32 = 0x1_FFFF;

/// \return the folded form of \p c.
#[inline]
pub fn fold(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    single(upper(c).to_lowercase())
        .or_else(|| single(c.to_lowercase()))
        .unwrap_or(c)
}

/// \return the uppercase form of \p c, if it is a single char.
#[inline]
fn upper(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_uppercase();
    }
    single(c.to_uppercase()).unwrap_or(c)
}

fn single<I: Iterator<Item = char>>(mut it: I) -> Option<char> {
    match (it.next(), it.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Pairs of (fold, char) for every char which is not its own fold, sorted by
/// fold.
fn unfold_table() -> &'static [(char, char)] {
    static TABLE: OnceLock<Vec<(char, char)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table: Vec<(char, char)> = (0..=LAST_CASED)
            .filter_map(char::from_u32)
            .filter_map(|c| {
                let f = fold(c);
                (f != c).then_some((f, c))
            })
            .collect();
        table.sort_unstable();
        table
    })
}

/// \return every char whose fold equals the fold of \p c, including \p c.
pub fn case_orbit(c: char) -> impl Iterator<Item = char> {
    let f = fold(c);
    let table = unfold_table();
    let range = table.equal_range_by(|&(k, _)| k.cmp(&f));
    let root = (fold(f) == f).then_some(f);
    root.into_iter().chain(table[range].iter().map(|&(_, v)| v))
}

/// \return whether \p c has a case-insensitive equivalent other than itself.
pub fn has_case_variants(c: char) -> bool {
    case_orbit(c).any(|v| v != c)
}
