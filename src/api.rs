use crate::emit;
use crate::exec::{CaptureMatches, MatchError, Matches, Split, SplitN};
use crate::insn::CompiledRegex;
use crate::parse;
use crate::pikevm::{self, Cache, Slot};
use crate::replace::{self, GroupRef, Piece, Replacer};
use crate::types::DEFAULT_SIZE_LIMIT;
use core::{fmt, ops::Index, str::FromStr};
use log::{debug, trace};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

pub use parse::{Error, ErrorKind};

/// Flags used to control regex parsing.
/// The default flags are case-sensitive, not-multiline, and ASCII-only for
/// the shorthand classes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// If set, make the regex case-insensitive.
    pub icase: bool,

    /// If set, ^ and $ match at line separators, not just the input boundaries.
    pub multiline: bool,

    /// If set, . matches at line separators as well as any other character.
    pub dot_all: bool,

    /// If set, \d, \s, \w and \b follow Unicode rather than ASCII.
    pub unicode: bool,
}

impl Flags {
    /// Construct a Flags from flag letters.
    /// 'i' means to ignore case, 'm' means multiline, 's' means dot-all and
    /// 'u' means unicode.
    /// Other letters are ignored.
    #[inline]
    pub fn new<T: Iterator<Item = char>>(chars: T) -> Self {
        let mut result = Self::default();
        for c in chars {
            match c {
                'm' => {
                    result.multiline = true;
                }
                'i' => {
                    result.icase = true;
                }
                's' => {
                    result.dot_all = true;
                }
                'u' => {
                    result.unicode = true;
                }
                _ => {
                    // Silently skip unsupported flags.
                }
            }
        }
        result
    }
}

impl From<&str> for Flags {
    /// Construct a Flags from a string of flag letters.
    ///
    /// See also: [`Flags::new`].
    #[inline]
    fn from(s: &str) -> Self {
        Self::new(s.chars())
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.multiline {
            f.write_str("m")?;
        }
        if self.icase {
            f.write_str("i")?;
        }
        if self.dot_all {
            f.write_str("s")?;
        }
        if self.unicode {
            f.write_str("u")?;
        }
        Ok(())
    }
}

/// Range is used to express the extent of a match, as byte offsets into the
/// input string.
pub type Range = core::ops::Range<usize>;

/// The parameters of a single search: the text, where to begin, whether the
/// match must begin exactly there, and an optional deadline.
#[derive(Debug, Clone)]
pub struct Input<'t> {
    pub(crate) text: &'t str,
    pub(crate) start: usize,
    pub(crate) anchored: bool,
    pub(crate) deadline: Option<Instant>,
}

impl<'t> Input<'t> {
    /// Search all of \p text, unanchored, with no deadline.
    #[inline]
    pub fn new(text: &'t str) -> Self {
        Input {
            text,
            start: 0,
            anchored: false,
            deadline: None,
        }
    }

    /// Begin searching at byte offset \p start, which must lie on a char
    /// boundary. Assertions still see the text before it.
    #[inline]
    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// If set, a match must begin at the start offset.
    #[inline]
    pub fn anchored(mut self, anchored: bool) -> Self {
        self.anchored = anchored;
        self
    }

    /// Give up with [`MatchError::Timeout`] once \p deadline has passed.
    #[inline]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// \return the text being searched.
    #[inline]
    pub fn text(&self) -> &'t str {
        self.text
    }
}

/// A Match represents a portion of a string which was found to match a Regex.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t str,
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    #[inline]
    pub(crate) fn new(text: &'t str, start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= text.len());
        Match { text, start, end }
    }

    /// Returns the matched text.
    #[inline]
    pub fn as_str(&self) -> &'t str {
        &self.text[self.start..self.end]
    }

    /// Returns the range over the starting and ending byte offsets of the
    /// match in the haystack.
    #[inline]
    pub fn range(&self) -> Range {
        self.start..self.end
    }

    /// Returns the starting byte offset of the match in the haystack.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the ending byte offset of the match in the haystack.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns true if the match is empty. Empty matches are still matches.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the length of the match in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

impl<'t> From<Match<'t>> for &'t str {
    fn from(m: Match<'t>) -> &'t str {
        m.as_str()
    }
}

/// The capture groups of a single match.
///
/// Each group is in one of three states: it did not participate (`None`), it
/// matched the empty string, or it matched some text. Group 0 is the whole
/// match and is always present.
#[derive(Clone)]
pub struct Captures<'t> {
    text: &'t str,
    slots: Vec<Slot>,

    // Shared with the Regex which produced us.
    group_names: Arc<[Option<Box<str>>]>,
}

impl<'t> Captures<'t> {
    /// Access a group by index. Index 0 is the total match, index 1 is the
    /// first capture group.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Match<'t>> {
        let start = (*self.slots.get(idx * 2)?)?;
        let end = (*self.slots.get(idx * 2 + 1)?)?;
        Some(Match::new(self.text, start, end))
    }

    /// Access a named group by name.
    #[inline]
    pub fn name(&self, name: &str) -> Option<Match<'t>> {
        self.get(self.index_of(name)?)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.group_names
            .iter()
            .position(|n| n.as_deref() == Some(name))
    }

    /// \return the number of groups, including group 0. This does not depend
    /// on how many groups participated in the match.
    #[inline]
    pub fn len(&self) -> usize {
        self.group_names.len()
    }

    /// Captures always hold group 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Return an iterator over the groups in index order, starting with the
    /// total match.
    #[inline]
    pub fn iter<'c>(&'c self) -> SubCaptures<'c, 't> {
        SubCaptures { caps: self, idx: 0 }
    }

    /// Return an iterator over the byte ranges of the groups in index order.
    #[inline]
    pub fn iter_pos(&self) -> SubCapturesPos<'_> {
        SubCapturesPos {
            slots: self.slots.chunks_exact(2),
        }
    }

    /// Return an iterator over the named groups, as (name, group) pairs.
    #[inline]
    pub fn iter_named<'c>(&'c self) -> SubCapturesNamed<'c, 't> {
        SubCapturesNamed { caps: self, idx: 0 }
    }

    /// Expand \p template, appending the result to \p dst.
    /// `$name`, `$index` and `${name}` are replaced by the corresponding group,
    /// or by nothing if the group does not exist or did not participate.
    /// `$$` is a literal `$`.
    pub fn expand(&self, template: &str, dst: &mut String) {
        replace::expand(self, template, dst)
    }
}

impl fmt::Debug for Captures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut map = f.debug_map();
        for (idx, m) in self.iter().enumerate() {
            let m = m.map(|m| m.as_str());
            match self.group_names.get(idx).and_then(|n| n.as_deref()) {
                Some(name) => map.entry(&format_args!("{}/{}", idx, name), &m),
                None => map.entry(&idx, &m),
            };
        }
        map.finish()
    }
}

impl Index<usize> for Captures<'_> {
    type Output = str;

    /// Panics if there is no group at \p idx, or if it did not participate.
    fn index(&self, idx: usize) -> &str {
        match self.get(idx) {
            Some(m) => m.as_str(),
            None => panic!("no group at index '{}'", idx),
        }
    }
}

impl Index<&str> for Captures<'_> {
    type Output = str;

    /// Panics if there is no group named \p name, or if it did not participate.
    fn index(&self, name: &str) -> &str {
        match self.name(name) {
            Some(m) => m.as_str(),
            None => panic!("no group named '{}'", name),
        }
    }
}

/// An iterator over the groups of a [`Captures`].
#[derive(Debug, Clone)]
pub struct SubCaptures<'c, 't> {
    caps: &'c Captures<'t>,
    idx: usize,
}

impl<'t> Iterator for SubCaptures<'_, 't> {
    type Item = Option<Match<'t>>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx < self.caps.len() {
            self.idx += 1;
            Some(self.caps.get(self.idx - 1))
        } else {
            None
        }
    }
}

/// An iterator over the group ranges of a [`Captures`].
#[derive(Debug, Clone)]
pub struct SubCapturesPos<'c> {
    slots: core::slice::ChunksExact<'c, Slot>,
}

impl Iterator for SubCapturesPos<'_> {
    type Item = Option<Range>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        Some(match *self.slots.next()? {
            [Some(start), Some(end)] => Some(start..end),
            _ => None,
        })
    }
}

/// An iterator over the named groups of a [`Captures`].
#[derive(Debug, Clone)]
pub struct SubCapturesNamed<'c, 't> {
    caps: &'c Captures<'t>,
    idx: usize,
}

impl<'c, 't> Iterator for SubCapturesNamed<'c, 't> {
    type Item = (&'c str, Option<Match<'t>>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        // Skip past unnamed groups.
        let names = &self.caps.group_names;
        while self.idx < names.len() {
            let idx = self.idx;
            self.idx += 1;
            if let Some(name) = names[idx].as_deref() {
                return Some((name, self.caps.get(idx)));
            }
        }
        None
    }
}

/// An iterator over the capture group names of a [`Regex`], in index order.
/// Unnamed groups, including group 0, yield None.
#[derive(Debug, Clone)]
pub struct CaptureNames<'r>(core::slice::Iter<'r, Option<Box<str>>>);

impl<'r> Iterator for CaptureNames<'r> {
    type Item = Option<&'r str>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|n| n.as_deref())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for CaptureNames<'_> {}

/// A Regex is the compiled version of a pattern.
/// It is immutable and may be shared between threads; each search uses its
/// own [`Cache`].
#[derive(Debug, Clone)]
pub struct Regex {
    source: Arc<str>,
    cr: Arc<CompiledRegex>,
}

impl Regex {
    /// Construct a regex by parsing `pattern` using the default flags.
    /// An Error may be returned if the syntax is invalid.
    /// Note that this is rather expensive; prefer to cache a Regex which is
    /// intended to be used more than once.
    #[inline]
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        Self::with_flags(pattern, Flags::default())
    }

    /// Construct a regex by parsing `pattern` with `flags`.
    /// An Error may be returned if the syntax is invalid.
    #[inline]
    pub fn with_flags<F>(pattern: &str, flags: F) -> Result<Regex, Error>
    where
        F: Into<Flags>,
    {
        Self::compile(pattern, flags.into(), DEFAULT_SIZE_LIMIT)
    }

    fn compile(pattern: &str, flags: Flags, size_limit: usize) -> Result<Regex, Error> {
        let ire = parse::try_parse(pattern, flags)?;
        trace!("IR for /{}/{}:\n{}", pattern, flags, ire);
        let cr = emit::emit(&ire, size_limit)?;
        trace!("Program for /{}/{}:\n{}", pattern, flags, cr);
        debug!(
            "compiled /{}/{}: {} instructions, {} groups, start predicate {:?}",
            pattern,
            flags,
            cr.insns.len(),
            cr.groups(),
            cr.start_pred
        );
        Ok(Regex {
            source: Arc::from(pattern),
            cr: Arc::new(cr),
        })
    }

    /// \return the pattern this regex was compiled from.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// \return the flags given at construction. Inline flag groups do not
    /// change these.
    #[inline]
    pub fn flags(&self) -> Flags {
        self.cr.flags
    }

    /// \return the number of capture groups, including group 0.
    #[inline]
    pub fn captures_len(&self) -> usize {
        self.cr.groups()
    }

    /// \return an iterator over the group names, in index order.
    #[inline]
    pub fn capture_names(&self) -> CaptureNames<'_> {
        CaptureNames(self.cr.group_names.iter())
    }

    /// \return the index of the group named \p name.
    pub fn capture_index(&self, name: &str) -> Option<usize> {
        self.cr
            .group_names
            .iter()
            .position(|n| n.as_deref() == Some(name))
    }

    /// Create scratch space for use with [`Regex::search`].
    #[inline]
    pub fn create_cache(&self) -> Cache {
        Cache::new(&self.cr)
    }

    /// Returns true if the regex matches anywhere in `text`.
    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        let mut cache = self.create_cache();
        self.search_slots(&mut cache, text, 0, 0)
    }

    /// Searches `text` to find the first match.
    #[inline]
    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.find_at(text, 0)
    }

    /// Searches `text` to find the first match at or after byte offset
    /// `start`. Unlike searching `&text[start..]`, assertions such as `\b`
    /// and `^` see the text before `start`.
    pub fn find_at<'t>(&self, text: &'t str, start: usize) -> Option<Match<'t>> {
        let mut cache = self.create_cache();
        if !self.search_slots(&mut cache, text, start, 2) {
            return None;
        }
        match *cache.slots() {
            [Some(start), Some(end)] => Some(Match::new(text, start, end)),
            _ => None,
        }
    }

    /// Searches `text`, returning an iterator over non-overlapping matches.
    /// Note that the resulting Iterator borrows both the regex `'r` and the
    /// input string as `'t`.
    #[inline]
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        Matches::new(self, text, 0)
    }

    /// Searches `text` to find the first match and its capture groups.
    #[inline]
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.captures_at(text, 0)
    }

    /// Like [`Regex::captures`], beginning at byte offset `start`.
    pub fn captures_at<'t>(&self, text: &'t str, start: usize) -> Option<Captures<'t>> {
        let mut cache = self.create_cache();
        if self.search_slots(&mut cache, text, start, self.cr.slot_count()) {
            Some(self.make_captures(text, cache.slots()))
        } else {
            None
        }
    }

    /// Searches `text`, returning an iterator over the capture groups of
    /// non-overlapping matches.
    #[inline]
    pub fn captures_iter<'r, 't>(&'r self, text: &'t str) -> CaptureMatches<'r, 't> {
        CaptureMatches::new(self, text, 0)
    }

    /// Returns an iterator over the substrings of `text` separated by
    /// matches. The text after the last match is always produced.
    #[inline]
    pub fn split<'r, 't>(&'r self, text: &'t str) -> Split<'r, 't> {
        Split::new(self, text)
    }

    /// Like [`Regex::split`], producing at most `limit` substrings. The last
    /// substring holds the unsplit remainder.
    #[inline]
    pub fn splitn<'r, 't>(&'r self, text: &'t str, limit: usize) -> SplitN<'r, 't> {
        SplitN::new(self, text, limit)
    }

    /// Replace the first match in `text` with `rep`.
    /// The text is borrowed unchanged if there is no match.
    #[inline]
    pub fn replace<'t, R: Replacer>(&self, text: &'t str, rep: R) -> Cow<'t, str> {
        self.replacen(text, 1, rep)
    }

    /// Replace every non-overlapping match in `text` with `rep`.
    #[inline]
    pub fn replace_all<'t, R: Replacer>(&self, text: &'t str, rep: R) -> Cow<'t, str> {
        self.replacen(text, 0, rep)
    }

    /// Replace at most `limit` non-overlapping matches in `text` with `rep`.
    /// A `limit` of 0 replaces every match.
    pub fn replacen<'t, R: Replacer>(
        &self,
        text: &'t str,
        limit: usize,
        mut rep: R,
    ) -> Cow<'t, str> {
        let limit = if limit == 0 { usize::MAX } else { limit };

        // Fixed replacements need only the match bounds.
        if let Some(fixed) = rep.no_expansion() {
            let mut matches = self.find_iter(text).take(limit).peekable();
            if matches.peek().is_none() {
                return Cow::Borrowed(text);
            }
            let mut result = String::with_capacity(text.len());
            let mut last = 0;
            for m in matches {
                result.push_str(&text[last..m.start()]);
                result.push_str(&fixed);
                last = m.end();
            }
            result.push_str(&text[last..]);
            return Cow::Owned(result);
        }

        let mut captures = self.captures_iter(text).take(limit).peekable();
        if captures.peek().is_none() {
            return Cow::Borrowed(text);
        }
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for caps in captures {
            let m = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            result.push_str(&text[last..m.start()]);
            rep.replace_append(&caps, &mut result);
            last = m.end();
        }
        result.push_str(&text[last..]);
        Cow::Owned(result)
    }

    /// Check that every group reference in the replacement \p template names
    /// a group of this regex.
    /// Expansion treats unknown references as empty; this catches them early.
    pub fn check_template(&self, template: &str) -> Result<(), Error> {
        let mut result = Ok(());
        replace::visit_template(template, |piece| {
            if result.is_err() {
                return;
            }
            if let Piece::Ref(offset, group) = piece {
                let known = match group {
                    GroupRef::Number(idx) => idx < self.captures_len(),
                    GroupRef::Named(name) => self.capture_index(name).is_some(),
                };
                if !known {
                    let text = match group {
                        GroupRef::Number(idx) => format!("Unknown group reference ${}", idx),
                        GroupRef::Named(name) => format!("Unknown group reference ${{{}}}", name),
                    };
                    result = Err(Error::new(ErrorKind::Template, text, Some(offset)));
                }
            }
        });
        result
    }

    /// Run a search described by \p input, using \p cache for scratch space.
    /// \return the captures of the match, None if there is no match, or an
    /// error if the deadline passed.
    ///
    /// Panics if the start offset is not a char boundary of the text.
    pub fn search<'t>(
        &self,
        input: &Input<'t>,
        cache: &mut Cache,
    ) -> Result<Option<Captures<'t>>, MatchError> {
        if input.start > input.text.len() {
            return Ok(None);
        }
        check_boundary(input.text, input.start);
        match pikevm::search(&self.cr, cache, input, self.cr.slot_count()) {
            Ok(true) => Ok(Some(self.make_captures(input.text, cache.slots()))),
            Ok(false) => Ok(None),
            Err(err) => {
                debug!("search for /{}/ failed: {}", self.source, err);
                Err(err)
            }
        }
    }

    /// Search \p text from \p start without a deadline, tracking \p nslots
    /// slots. On a match the slots are left in \p cache.
    pub(crate) fn search_slots(
        &self,
        cache: &mut Cache,
        text: &str,
        start: usize,
        nslots: usize,
    ) -> bool {
        if start > text.len() {
            return false;
        }
        check_boundary(text, start);
        let input = Input::new(text).start(start);
        match pikevm::search(&self.cr, cache, &input, nslots) {
            Ok(matched) => matched,
            Err(_) => unreachable!("Searches without a deadline cannot time out"),
        }
    }

    /// Wrap the slots of a successful search.
    pub(crate) fn make_captures<'t>(&self, text: &'t str, slots: &[Slot]) -> Captures<'t> {
        let mut slots = slots.to_vec();
        slots.resize(self.cr.slot_count(), None);
        Captures {
            text,
            slots,
            group_names: Arc::clone(&self.cr.group_names),
        }
    }
}

#[track_caller]
fn check_boundary(text: &str, start: usize) {
    assert!(
        text.is_char_boundary(start),
        "Start offset {} is not a char boundary",
        start
    );
}

impl fmt::Display for Regex {
    /// Shows the original pattern.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Regex {
    type Err = Error;

    /// Attempts to parse a string into a regular expression
    #[inline]
    fn from_str(s: &str) -> Result<Self, Error> {
        Self::new(s)
    }
}

/// A configurable way to construct a [`Regex`].
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: String,
    flags: Flags,
    size_limit: usize,
}

impl RegexBuilder {
    /// Start building a regex for \p pattern, with default flags.
    pub fn new(pattern: &str) -> Self {
        RegexBuilder {
            pattern: pattern.to_string(),
            flags: Flags::default(),
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }

    /// Set the `i` flag.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut Self {
        self.flags.icase = yes;
        self
    }

    /// Set the `m` flag.
    pub fn multi_line(&mut self, yes: bool) -> &mut Self {
        self.flags.multiline = yes;
        self
    }

    /// Set the `s` flag.
    pub fn dot_matches_new_line(&mut self, yes: bool) -> &mut Self {
        self.flags.dot_all = yes;
        self
    }

    /// Set the `u` flag.
    pub fn unicode(&mut self, yes: bool) -> &mut Self {
        self.flags.unicode = yes;
        self
    }

    /// Limit the compiled program to \p limit instructions. Patterns which
    /// need more fail to build with [`ErrorKind::Compile`].
    /// The limit also bounds the capture table a search keeps for each
    /// instruction, so patterns with very many groups may need a larger one.
    pub fn size_limit(&mut self, limit: usize) -> &mut Self {
        self.size_limit = limit;
        self
    }

    /// Compile the pattern.
    pub fn build(&self) -> Result<Regex, Error> {
        Regex::compile(&self.pattern, self.flags, self.size_limit)
    }
}

/// \return whether \p c has a special meaning in a pattern.
fn is_meta_character(c: char) -> bool {
    matches!(
        c,
        '\\' | '.'
            | '+'
            | '*'
            | '?'
            | '('
            | ')'
            | '|'
            | '['
            | ']'
            | '{'
            | '}'
            | '^'
            | '$'
            | '#'
            | '&'
            | '-'
            | '~'
    )
}

/// Escape every metacharacter in \p text, so that the result parsed as a
/// pattern matches \p text literally.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len());
    for c in text.chars() {
        if is_meta_character(c) {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted
}

/// Compile \p pattern and test whether it matches anywhere in \p text.
/// Prefer [`Regex::is_match`] when testing more than one text.
pub fn is_match(pattern: &str, text: &str) -> Result<bool, Error> {
    Regex::new(pattern).map(|re| re.is_match(text))
}
