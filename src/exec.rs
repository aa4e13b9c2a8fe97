//! Iteration over successive matches.

use crate::api::{Captures, Match, Regex};
use crate::pikevm::Cache;
use crate::util::next_boundary;
use core::fmt;

/// The ways a search can fail, as opposed to finding no match.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The deadline passed before the search completed.
    Timeout,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchError::Timeout => f.write_str("Search deadline exceeded"),
        }
    }
}

impl std::error::Error for MatchError {}

/// The search position shared by the match and capture iterators.
///
/// After an empty match the next search starts one char later, and an empty
/// match ending where the previous match ended is skipped. So `a*` over "ab"
/// produces "a" at 0..1 and then "" at 2..2.
#[derive(Debug)]
struct MatchCursor<'r, 't> {
    re: &'r Regex,
    text: &'t str,
    cache: Cache,

    // Number of capture slots to track.
    nslots: usize,

    // Where to search next, or None once exhausted.
    next_start: Option<usize>,

    // End of the last match produced.
    last_end: Option<usize>,
}

impl<'r, 't> MatchCursor<'r, 't> {
    fn new(re: &'r Regex, text: &'t str, start: usize, nslots: usize) -> Self {
        MatchCursor {
            re,
            text,
            cache: re.create_cache(),
            nslots,
            next_start: Some(start),
            last_end: None,
        }
    }

    /// Find the next match, leaving its slots in the cache.
    /// \return the bounds of the match.
    fn advance(&mut self) -> Option<(usize, usize)> {
        loop {
            let start = self.next_start?;
            if !self
                .re
                .search_slots(&mut self.cache, self.text, start, self.nslots)
            {
                self.next_start = None;
                return None;
            }
            let (start, end) = match self.cache.slots() {
                [Some(start), Some(end), ..] => (*start, *end),
                _ => unreachable!("Matches always set the whole-match slots"),
            };
            if start == end {
                self.next_start = next_boundary(self.text, end);
                if self.last_end == Some(end) {
                    continue;
                }
            } else {
                self.next_start = Some(end);
            }
            self.last_end = Some(end);
            return Some((start, end));
        }
    }
}

/// An iterator over successive non-overlapping matches.
/// Produced by `Regex::find_iter`.
#[derive(Debug)]
pub struct Matches<'r, 't> {
    cursor: MatchCursor<'r, 't>,
}

impl<'r, 't> Matches<'r, 't> {
    pub(crate) fn new(re: &'r Regex, text: &'t str, start: usize) -> Self {
        Matches {
            cursor: MatchCursor::new(re, text, start, 2),
        }
    }

    /// \return the text being searched.
    pub fn text(&self) -> &'t str {
        self.cursor.text
    }

    /// \return the regex being matched.
    pub fn regex(&self) -> &'r Regex {
        self.cursor.re
    }
}

impl<'t> Iterator for Matches<'_, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        let (start, end) = self.cursor.advance()?;
        Some(Match::new(self.cursor.text, start, end))
    }
}

impl core::iter::FusedIterator for Matches<'_, '_> {}

/// An iterator over the capture groups of successive non-overlapping matches.
/// Produced by `Regex::captures_iter`.
#[derive(Debug)]
pub struct CaptureMatches<'r, 't> {
    cursor: MatchCursor<'r, 't>,
}

impl<'r, 't> CaptureMatches<'r, 't> {
    pub(crate) fn new(re: &'r Regex, text: &'t str, start: usize) -> Self {
        CaptureMatches {
            cursor: MatchCursor::new(re, text, start, re.captures_len() * 2),
        }
    }
}

impl<'t> Iterator for CaptureMatches<'_, 't> {
    type Item = Captures<'t>;

    fn next(&mut self) -> Option<Captures<'t>> {
        self.cursor.advance()?;
        let cursor = &self.cursor;
        Some(cursor.re.make_captures(cursor.text, cursor.cache.slots()))
    }
}

impl core::iter::FusedIterator for CaptureMatches<'_, '_> {}

/// An iterator over the text between matches.
/// The text after the last match is always produced, even if empty.
/// Produced by `Regex::split`.
#[derive(Debug)]
pub struct Split<'r, 't> {
    finder: Matches<'r, 't>,

    // Start of the next segment. Past the end once the remainder was produced.
    last: usize,
}

impl<'r, 't> Split<'r, 't> {
    pub(crate) fn new(re: &'r Regex, text: &'t str) -> Self {
        Split {
            finder: Matches::new(re, text, 0),
            last: 0,
        }
    }

    /// \return everything not yet produced, and mark the iterator finished.
    fn remainder(&mut self) -> Option<&'t str> {
        let text = self.finder.text();
        if self.last > text.len() {
            return None;
        }
        let s = &text[self.last..];
        self.last = text.len() + 1;
        Some(s)
    }
}

impl<'t> Iterator for Split<'_, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        let text = self.finder.text();
        if self.last > text.len() {
            return None;
        }
        match self.finder.next() {
            None => self.remainder(),
            Some(m) => {
                let s = &text[self.last..m.start()];
                self.last = m.end();
                Some(s)
            }
        }
    }
}

impl core::iter::FusedIterator for Split<'_, '_> {}

/// An iterator over at most `n` segments of text between matches; the last
/// segment holds the rest of the text.
/// Produced by `Regex::splitn`.
#[derive(Debug)]
pub struct SplitN<'r, 't> {
    splits: Split<'r, 't>,
    n: usize,
}

impl<'r, 't> SplitN<'r, 't> {
    pub(crate) fn new(re: &'r Regex, text: &'t str, n: usize) -> Self {
        SplitN {
            splits: Split::new(re, text),
            n,
        }
    }
}

impl<'t> Iterator for SplitN<'_, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        if self.n == 0 {
            return None;
        }
        self.n -= 1;
        if self.n > 0 {
            self.splits.next()
        } else {
            self.splits.remainder()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.n))
    }
}

impl core::iter::FusedIterator for SplitN<'_, '_> {}
