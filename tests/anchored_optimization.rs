use pikere::{Input, Regex};

#[test]
fn test_anchored_optimization() {
    let re = Regex::new(r"^abc").unwrap();
    assert!(re.find("abc").is_some());
    assert!(re.find("abcdef").is_some());
    assert!(re.find("xabc").is_none());

    let re = Regex::new(r"^hello\s+world").unwrap();
    assert!(re.find("hello world").is_some());
    assert!(re.find("hello   world").is_some());
    assert!(re.find("  hello world").is_none());

    let re = Regex::new(r"^(\w+)=(\d+)").unwrap();
    let caps = re.captures("key=123 other=456").unwrap();
    assert_eq!(caps.get(1).map(|m| m.as_str()), Some("key"));
    assert_eq!(caps.get(2).map(|m| m.as_str()), Some("123"));
    assert!(re.find(" key=123").is_none());
}

#[test]
fn test_anchored_alternation() {
    let re = Regex::new(r"^abc|^def").unwrap();
    assert!(re.find("abc").is_some());
    assert!(re.find("def").is_some());
    assert!(re.find("xabc").is_none());
    assert!(re.find("xdef").is_none());

    // Only one branch is anchored.
    let re = Regex::new(r"^abc|def").unwrap();
    assert!(re.find("abc").is_some());
    assert_eq!(re.find("xdef").map(|m| m.range()), Some(1..4));
    assert!(re.find("xabc").is_none());
}

#[test]
fn test_anchored_iteration() {
    // An anchored pattern matches at most once.
    let re = Regex::new(r"^a").unwrap();
    assert_eq!(re.find_iter("aaa").count(), 1);
    let re = Regex::new(r"\Aa*").unwrap();
    assert_eq!(re.find_iter("aab").map(|m| m.as_str()).collect::<Vec<_>>(), vec!["aa"]);
}

#[test]
fn test_anchored_start_offset() {
    // Offsets do not move the start of the text.
    let re = Regex::new(r"^b").unwrap();
    assert!(re.find_at("ab", 1).is_none());
    let re = Regex::with_flags(r"^b", "m").unwrap();
    assert!(re.find_at("ab", 1).is_none());
    assert_eq!(re.find_at("a\nb", 1).map(|m| m.start()), Some(2));
}

#[test]
fn test_anchored_input() {
    let re = Regex::new(r"\d+").unwrap();
    let mut cache = re.create_cache();
    let input = Input::new("ab12").anchored(true);
    assert!(re.search(&input, &mut cache).unwrap().is_none());
    let input = Input::new("ab12").anchored(true).start(2);
    let caps = re.search(&input, &mut cache).unwrap().unwrap();
    assert_eq!(&caps[0], "12");
}

#[test]
fn test_multiline_not_anchored() {
    let re = Regex::with_flags(r"^abc", "m").unwrap();
    assert!(re.find("abc").is_some());
    assert!(re.find("xyz\nabc").is_some());
    assert!(re.find("xabc").is_none());
}
