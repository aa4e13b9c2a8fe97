#![allow(clippy::uninlined_format_args)]

use pikere::{Captures, Input};

/// Test that \p pattern fails to parse with default flags.
#[track_caller]
pub fn test_parse_fails(pattern: &str) {
    let res = pikere::Regex::new(pattern);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);
}

/// Test that \p pattern fails to parse with flags.
#[track_caller]
pub fn test_parse_fails_flags(pattern: &str, flags: &str) {
    let res = pikere::Regex::with_flags(pattern, flags);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);
}

/// Format a match by inserting commas between all capture groups.
/// Groups which did not participate are empty.
fn format_match(caps: &Captures) -> String {
    caps.iter()
        .map(|m| m.map_or("", |m| m.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

pub trait StringTestHelpers {
    /// "Fluent" style helper for testing that a String is equal to a str.
    fn test_eq(&self, s: &str);
}

impl StringTestHelpers for String {
    #[track_caller]
    fn test_eq(&self, rhs: &str) {
        assert_eq!(self.as_str(), rhs)
    }
}

pub trait VecTestHelpers {
    /// "Fluent" style helper for testing that a Vec<&str> is equal to a
    /// Vec<&str>.
    fn test_eq(&self, rhs: Vec<&str>);
}

impl VecTestHelpers for Vec<&str> {
    #[track_caller]
    fn test_eq(&self, rhs: Vec<&str>) {
        assert_eq!(*self, rhs)
    }
}

/// A compiled regex which remembers a TestConfig.
#[derive(Debug, Clone)]
pub struct TestCompiledRegex {
    re: pikere::Regex,
    tc: TestConfig,
}

impl TestCompiledRegex {
    /// \return the underlying regex.
    pub fn regex(&self) -> &pikere::Regex {
        &self.re
    }

    /// Search for self in \p input, returning the captures of all matches.
    pub fn matches<'t>(&self, input: &'t str) -> Vec<Captures<'t>> {
        match self.tc.api {
            Api::Iterators => self.re.captures_iter(input).collect(),
            Api::Search => self.search_all(input),
        }
    }

    /// Find every match by driving `Regex::search` directly with one cache,
    /// stepping past empty matches the way the iterators do.
    fn search_all<'t>(&self, input: &'t str) -> Vec<Captures<'t>> {
        let mut cache = self.re.create_cache();
        let mut result = Vec::new();
        let mut pos = 0;
        let mut last_end = None;
        while pos <= input.len() {
            let caps = match self.re.search(&Input::new(input).start(pos), &mut cache) {
                Ok(Some(caps)) => caps,
                Ok(None) => break,
                Err(e) => panic!("Search without a deadline failed: {}", e),
            };
            let m = caps.get(0).expect("Group 0 should always be present");
            if m.is_empty() {
                pos = m.end() + input[m.end()..].chars().next().map_or(1, char::len_utf8);
                if last_end == Some(m.end()) {
                    continue;
                }
            } else {
                pos = m.end();
            }
            last_end = Some(m.end());
            result.push(caps);
        }
        result
    }

    /// Search for self in \p input, returning the first match's captures.
    pub fn find<'t>(&self, input: &'t str) -> Option<Captures<'t>> {
        match self.tc.api {
            Api::Iterators => self.re.captures(input),
            Api::Search => self
                .re
                .search(&Input::new(input), &mut self.re.create_cache())
                .expect("Search without a deadline failed"),
        }
    }

    /// Match against a string, returning the first formatted match.
    #[track_caller]
    pub fn match1f(&self, input: &str) -> String {
        match self.find(input) {
            Some(caps) => format_match(&caps),
            None => panic!("Failed to match {}", input),
        }
    }

    /// Match against a string, returning the string of the named capture group given.
    #[track_caller]
    pub fn match1_named_group(&self, input: &str, group: &str) -> String {
        match self.find(input) {
            Some(caps) => match caps.name(group) {
                Some(m) => m.as_str().to_string(),
                None => panic!("Named capture group did not match {}", group),
            },
            None => panic!("Failed to match {}", input),
        }
    }

    /// Match against a string, returning the match as a Vec containing None
    /// for unmatched groups, or the matched strings.
    #[track_caller]
    pub fn match1_vec<'b>(&self, input: &'b str) -> Vec<Option<&'b str>> {
        let caps = self.find(input).expect("Failed to match");
        caps.iter().map(|m| m.map(|m| m.as_str())).collect()
    }

    /// Test that matching against \p input fails.
    #[track_caller]
    pub fn test_fails(&self, input: &str) {
        assert!(self.find(input).is_none(), "Should not have matched");
        assert!(!self.re.is_match(input), "is_match disagrees with find");
    }

    /// Test that matching against \p input succeeds.
    #[track_caller]
    pub fn test_succeeds(&self, input: &str) {
        assert!(self.find(input).is_some(), "Should have matched");
        assert!(self.re.is_match(input), "is_match disagrees with find");
    }

    /// Return a list of all non-overlapping total match ranges.
    pub fn match_all_ranges(&self, input: &str) -> Vec<pikere::Range> {
        self.matches(input)
            .iter()
            .filter_map(|caps| caps.get(0))
            .map(|m| m.range())
            .collect()
    }

    /// Return a list of all non-overlapping matches.
    pub fn match_all<'b>(&self, input: &'b str) -> Vec<&'b str> {
        self.matches(input)
            .iter()
            .filter_map(|caps| caps.get(0))
            .map(|m| m.as_str())
            .collect()
    }

    /// Collect all matches into a String, separated by commas.
    pub fn run_global_match(&self, input: &str) -> String {
        self.matches(input)
            .iter()
            .map(format_match)
            .collect::<Vec<String>>()
            .join(",")
    }
}

/// The ways of driving a search.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Api {
    /// `captures` and `captures_iter`, with a fresh cache per call.
    Iterators,

    /// `Regex::search` with an explicit Input and a reused cache.
    Search,
}

/// Description of how to test a regex.
#[derive(Debug, Copy, Clone)]
pub struct TestConfig {
    api: Api,
}

impl TestConfig {
    /// Compile a pattern to a regex, with default flags.
    #[track_caller]
    pub fn compile(&self, pattern: &str) -> TestCompiledRegex {
        self.compilef(pattern, "")
    }

    /// Compile a pattern to a regex, with given flags.
    #[track_caller]
    pub fn compilef(&self, pattern: &str, flags_str: &str) -> TestCompiledRegex {
        let re = pikere::Regex::with_flags(pattern, flags_str);
        match re {
            Ok(re) => TestCompiledRegex { re, tc: *self },
            Err(e) => panic!(
                "Failed to parse! flags: {} pattern: {}, error: {}",
                flags_str, pattern, e
            ),
        }
    }

    /// Test that \p pattern and \p flags successfully parses, and matches
    /// \p input.
    #[track_caller]
    pub fn test_match_succeeds(&self, pattern: &str, flags_str: &str, input: &str) {
        let cr = self.compilef(pattern, flags_str);
        cr.test_succeeds(input)
    }

    /// Test that \p pattern and \p flags successfully parses, and does not
    /// match \p input.
    #[track_caller]
    pub fn test_match_fails(&self, pattern: &str, flags_str: &str, input: &str) {
        let cr = self.compilef(pattern, flags_str);
        cr.test_fails(input)
    }
}

/// Invoke \p F with each test config, in turn.
pub fn test_with_configs<F>(func: F)
where
    F: Fn(TestConfig),
{
    func(TestConfig { api: Api::Iterators });
    func(TestConfig { api: Api::Search });
}
