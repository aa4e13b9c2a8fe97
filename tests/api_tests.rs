use pikere::{ErrorKind, Flags, Input, MatchError, Regex, RegexBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn split<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    re.split(text).collect()
}

#[test]
fn test_split() {
    let re = Regex::new(",").unwrap();
    assert_eq!(split(&re, "a,b,,c"), vec!["a", "b", "", "c"]);
    assert_eq!(split(&re, ",a,"), vec!["", "a", ""]);
    assert_eq!(split(&re, "abc"), vec!["abc"]);
    assert_eq!(split(&re, ""), vec![""]);

    let re = Regex::new(r"\s*;\s*").unwrap();
    assert_eq!(split(&re, "x ; y;z  ;"), vec!["x", "y", "z", ""]);
}

#[test]
fn test_split_empty_matches() {
    let re = Regex::new("x*").unwrap();
    assert_eq!(split(&re, "ab"), vec!["", "a", "b", ""]);
    let re = Regex::new("").unwrap();
    assert_eq!(split(&re, "\u{e9}a"), vec!["", "\u{e9}", "a", ""]);
}

#[test]
fn test_split_reconstructs_text() {
    let cases: &[(&str, &str)] = &[
        (",", "a,b,,c"),
        (r"\s+", "  hello   big world "),
        ("x*", "axxbx"),
        (r"\b", "one two"),
        ("[\u{e9}\u{4e00}]", "a\u{e9}b\u{4e00}c"),
    ];
    for &(pattern, text) in cases {
        let re = Regex::new(pattern).unwrap();
        let pieces: Vec<&str> = re.split(text).collect();
        let seps: Vec<&str> = re.find_iter(text).map(|m| m.as_str()).collect();
        assert_eq!(pieces.len(), seps.len() + 1, "{}", pattern);
        let mut rebuilt = String::new();
        for (i, piece) in pieces.iter().enumerate() {
            rebuilt.push_str(piece);
            if let Some(sep) = seps.get(i) {
                rebuilt.push_str(sep);
            }
        }
        assert_eq!(rebuilt, text, "{}", pattern);
    }
}

#[test]
fn test_splitn() {
    let re = Regex::new(",").unwrap();
    let text = "a,b,,c";
    assert_eq!(re.splitn(text, 0).count(), 0);
    assert_eq!(re.splitn(text, 1).collect::<Vec<_>>(), vec!["a,b,,c"]);
    assert_eq!(re.splitn(text, 2).collect::<Vec<_>>(), vec!["a", "b,,c"]);
    assert_eq!(re.splitn(text, 3).collect::<Vec<_>>(), vec!["a", "b", ",c"]);
    assert_eq!(
        re.splitn(text, 10).collect::<Vec<_>>(),
        vec!["a", "b", "", "c"]
    );
    assert_eq!(re.splitn("", 3).collect::<Vec<_>>(), vec![""]);
}

#[test]
fn test_find_iter_non_overlapping() {
    let re = Regex::new("aa").unwrap();
    let ranges: Vec<_> = re.find_iter("aaaaa").map(|m| m.range()).collect();
    assert_eq!(ranges, vec![0..2, 2..4]);

    let re = Regex::new(r"\w+").unwrap();
    let mut last_end = 0;
    for m in re.find_iter("the quick  brown fox") {
        assert!(m.start() >= last_end);
        assert!(!m.is_empty());
        last_end = m.end();
    }
    assert_eq!(re.find_iter("the quick  brown fox").count(), 4);
}

#[test]
fn test_iterators_are_fused() {
    let re = Regex::new("a").unwrap();
    let mut it = re.find_iter("a");
    assert!(it.next().is_some());
    assert!(it.next().is_none());
    assert!(it.next().is_none());

    let mut it = re.split("a");
    assert_eq!(it.next(), Some(""));
    assert_eq!(it.next(), Some(""));
    assert_eq!(it.next(), None);
    assert_eq!(it.next(), None);
}

#[test]
fn test_find_at_sees_prior_text() {
    let re = Regex::new(r"\bb").unwrap();
    assert!(re.find_at("ab", 1).is_none());
    assert_eq!(re.find_at("a b", 1).map(|m| m.range()), Some(2..3));

    let re = Regex::new(r"\Ba").unwrap();
    assert_eq!(re.find_at("ba", 1).map(|m| m.start()), Some(1));

    let caps = Regex::new(r"(\d)").unwrap().captures_at("1x2", 1).unwrap();
    assert_eq!(&caps[1], "2");
}

#[test]
#[should_panic]
fn test_find_at_requires_char_boundary() {
    let re = Regex::new("a").unwrap();
    re.find_at("\u{e9}a", 1);
}

#[test]
fn test_is_match_agrees_with_find() {
    let patterns = ["a+b", r"^\d+$", r"\bfoo", "(?i)STRASSE", "x*", "[^a]"];
    let texts = ["aab", "123", "a foo", "strasse", "", "aaa", "\u{e9}"];
    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        for text in texts {
            assert_eq!(
                re.is_match(text),
                re.find(text).is_some(),
                "{} on {:?}",
                pattern,
                text
            );
            assert_eq!(pikere::is_match(pattern, text), Ok(re.is_match(text)));
        }
    }
    assert!(pikere::is_match("(", "x").is_err());
}

#[test]
fn test_many_groups() {
    let re = Regex::new(&"(a)".repeat(500)).unwrap();
    assert_eq!(re.captures_len(), 501);
    let text = "a".repeat(500);
    for _ in 0..20 {
        assert!(!re.is_match("b"));
        assert!(re.find("b").is_none());
    }
    assert!(re.is_match(&text));
    assert_eq!(re.find(&format!("x{}", text)).map(|m| m.range()), Some(1..501));
    let caps = re.captures(&text).unwrap();
    assert_eq!(caps.get(500).map(|m| m.range()), Some(499..500));

    // Programs whose full capture tables would be huge are rejected.
    let err = Regex::new(&"(a)".repeat(2000)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Compile);
    let re = RegexBuilder::new(&"(a)".repeat(2000))
        .size_limit(1 << 23)
        .build()
        .unwrap();
    assert!(!re.is_match("b"));
    assert_eq!(re.captures_len(), 2001);
}

#[test]
fn test_deadline() {
    let re = Regex::new(r"(a|b)*c").unwrap();
    let text = "ab".repeat(1000);
    let mut cache = re.create_cache();

    let input = Input::new(&text).deadline(Instant::now());
    assert_eq!(re.search(&input, &mut cache).err(), Some(MatchError::Timeout));
    assert_eq!(MatchError::Timeout.to_string(), "Search deadline exceeded");

    // The cache is still usable after a timeout.
    let input = Input::new(&text).deadline(Instant::now() + Duration::from_secs(60));
    assert_eq!(re.search(&input, &mut cache).map(|c| c.is_some()), Ok(false));
    let caps = re
        .search(&Input::new("abc"), &mut cache)
        .unwrap()
        .unwrap();
    assert_eq!(&caps[0], "abc");
    assert_eq!(&caps[1], "b");
}

#[test]
fn test_cache_reuse() {
    let re = Regex::new(r"(?P<k>\w+)=(?P<v>\w*)").unwrap();
    let mut cache = re.create_cache();
    let texts = ["a=1", "nothing", "key=", "x=y z=w"];
    let found: Vec<Option<(String, String)>> = texts
        .iter()
        .map(|text| {
            re.search(&Input::new(text), &mut cache)
                .unwrap()
                .map(|caps| (caps["k"].to_string(), caps["v"].to_string()))
        })
        .collect();
    assert_eq!(
        found,
        vec![
            Some(("a".to_string(), "1".to_string())),
            None,
            Some(("key".to_string(), "".to_string())),
            Some(("x".to_string(), "y".to_string())),
        ]
    );
}

#[test]
fn test_search_input() {
    let re = Regex::new(r"\d+").unwrap();
    let mut cache = re.create_cache();
    let input = Input::new("a1b22");
    assert_eq!(input.text(), "a1b22");
    let caps = re.search(&input.start(2), &mut cache).unwrap().unwrap();
    assert_eq!(caps.get(0).map(|m| m.range()), Some(3..5));
    assert!(re
        .search(&Input::new("a1").start(3), &mut cache)
        .unwrap()
        .is_none());
}

#[test]
fn test_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Regex>();
    assert_send_sync::<pikere::Cache>();

    let re = Arc::new(Regex::new(r"(\d+)-(\d+)").unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let re = Arc::clone(&re);
            std::thread::spawn(move || {
                let text = format!("{}-{}", i, i * 10);
                let caps = re.captures(&text).unwrap();
                caps[1].parse::<u32>().unwrap() + caps[2].parse::<u32>().unwrap()
            })
        })
        .collect();
    let sums: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(sums, vec![0, 11, 22, 33]);
}

#[test]
fn test_regex_metadata() {
    let re = Regex::with_flags(r"(?P<year>\d{4})-(\d{2})(?<day>-\d{2})?", "im").unwrap();
    assert_eq!(re.as_str(), r"(?P<year>\d{4})-(\d{2})(?<day>-\d{2})?");
    assert_eq!(re.to_string(), re.as_str());
    assert_eq!(re.captures_len(), 4);
    assert_eq!(
        re.capture_names().collect::<Vec<_>>(),
        vec![None, Some("year"), None, Some("day")]
    );
    assert_eq!(re.capture_names().len(), 4);
    assert_eq!(re.capture_index("day"), Some(3));
    assert_eq!(re.capture_index("month"), None);
    let flags = re.flags();
    assert!(flags.icase && flags.multiline && !flags.dot_all && !flags.unicode);
    assert_eq!(flags.to_string(), "mi");

    let parsed: Regex = "a+".parse().unwrap();
    assert_eq!(parsed.as_str(), "a+");
    assert!("(".parse::<Regex>().is_err());
}

#[test]
fn test_builder() {
    let re = RegexBuilder::new("^a.b$")
        .case_insensitive(true)
        .multi_line(true)
        .dot_matches_new_line(true)
        .build()
        .unwrap();
    assert_eq!(
        re.flags(),
        Flags {
            icase: true,
            multiline: true,
            dot_all: true,
            unicode: false,
        }
    );
    assert!(re.is_match("x\nA\nB"));

    let re = RegexBuilder::new(r"\w").unicode(true).build().unwrap();
    assert!(re.is_match("\u{3b1}"));
}

#[test]
fn test_captures_api() {
    let re = Regex::new(r"(?P<a>x)?(?P<b>y)").unwrap();
    let caps = re.captures("zy").unwrap();
    assert_eq!(caps.len(), 3);
    assert!(caps.name("a").is_none());
    assert_eq!(caps.name("b").map(|m| m.range()), Some(1..2));
    assert!(caps.name("c").is_none());
    assert!(caps.get(7).is_none());
    assert_eq!(
        caps.iter_named()
            .map(|(name, m)| (name, m.map(|m| m.as_str())))
            .collect::<Vec<_>>(),
        vec![("a", None), ("b", Some("y"))]
    );

    let mut dst = String::from(">");
    caps.expand("[$a|$b|${0}]", &mut dst);
    assert_eq!(dst, ">[|y|y]");
}

#[test]
fn test_captures_iter() {
    let re = Regex::new(r"(\w)=(\d)").unwrap();
    let pairs: Vec<(String, String)> = re
        .captures_iter("a=1, b=2, c=x, d=4")
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("d".to_string(), "4".to_string()),
        ]
    );
}

#[test]
#[should_panic(expected = "no group at index '2'")]
fn test_index_missing_group() {
    let re = Regex::new("(a)|(b)").unwrap();
    let caps = re.captures("a").unwrap();
    let _ = &caps[2];
}

#[test]
#[should_panic(expected = "no group named 'nope'")]
fn test_index_missing_name() {
    let re = Regex::new("(?P<yes>a)").unwrap();
    let caps = re.captures("a").unwrap();
    let _ = &caps["nope"];
}
