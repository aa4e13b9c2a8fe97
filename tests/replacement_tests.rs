use pikere::{Captures, ErrorKind, NoExpand, Regex};
use std::borrow::Cow;

#[test]
fn test_replace_basic() {
    let re = Regex::new(r"world").unwrap();
    let result = re.replace("hello world", "universe");
    assert_eq!(result, "hello universe");
}

#[test]
fn test_replace_no_match() {
    let re = Regex::new(r"xyz").unwrap();
    let result = re.replace("hello world", "universe");
    assert_eq!(result, "hello world");
    assert!(matches!(result, Cow::Borrowed(_)));
}

#[test]
fn test_replace_with_capture_groups() {
    let re = Regex::new(r"(\w+)\s+(\w+)").unwrap();
    let result = re.replace("hello world", "$2 $1");
    assert_eq!(result, "world hello");
}

#[test]
fn test_replace_with_group_zero() {
    let re = Regex::new(r"\d+").unwrap();
    let result = re.replace("Price: $123", "[$0]");
    assert_eq!(result, "Price: $[123]");
}

#[test]
fn test_replace_with_literal_dollar() {
    let re = Regex::new(r"\d+").unwrap();
    let result = re.replace("Price: 123", "$$0");
    assert_eq!(result, "Price: $0");
}

#[test]
fn test_replace_date_format() {
    let re = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();
    let result = re.replace("2023-12-25", "$2/$3/$1");
    assert_eq!(result, "12/25/2023");
}

#[test]
fn test_replace_all_basic() {
    let re = Regex::new(r"\d+").unwrap();
    let result = re.replace_all("a1b2c3", "X");
    assert_eq!(result, "aXbXcX");
}

#[test]
fn test_replace_all_with_groups() {
    let re = Regex::new(r"(\w+)\s+(\w+)").unwrap();
    let result = re.replace_all("hello world foo bar", "$2-$1");
    assert_eq!(result, "world-hello bar-foo");
}

#[test]
fn test_replace_all_word_boundaries() {
    let re = Regex::new(r"\b(\w)(\w+)").unwrap();
    let result = re.replace_all("hello world", "$1.$2");
    assert_eq!(result, "h.ello w.orld");
}

#[test]
fn test_replace_all_empty_matches() {
    let re = Regex::new(r"x*").unwrap();
    assert_eq!(re.replace_all("ab", "-"), "-a-b-");
    let re = Regex::new(r"a*").unwrap();
    assert_eq!(re.replace_all("baaac", "-"), "-b-c-");
    assert_eq!(re.replace_all("", "-"), "-");
}

#[test]
fn test_replacen() {
    let re = Regex::new(r"\d").unwrap();
    assert_eq!(re.replacen("1 2 3 4", 2, "#"), "# # 3 4");
    assert_eq!(re.replacen("1 2 3 4", 0, "#"), "# # # #");
    assert_eq!(re.replacen("1 2 3 4", 10, "<$0>"), "<1> <2> <3> <4>");
}

#[test]
fn test_replace_with_closure() {
    let re = Regex::new(r"\d+").unwrap();
    let result = re.replace("Price: $123", |caps: &Captures| {
        let num: i32 = caps[0].parse().unwrap();
        format!("{}", num * 2)
    });
    assert_eq!(result, "Price: $246");
}

#[test]
fn test_replace_all_with_closure() {
    let re = Regex::new(r"\d+").unwrap();
    let result = re.replace_all("Items: 5, 10, 15", |caps: &Captures| {
        let num: i32 = caps[0].parse().unwrap();
        format!("[{}]", num * 10)
    });
    assert_eq!(result, "Items: [50], [100], [150]");
}

#[test]
fn test_replace_closure_sees_missing_groups() {
    let re = Regex::new(r"(\d+)|(\w+)").unwrap();
    let result = re.replace_all("ab 12", |caps: &Captures| match caps.get(1) {
        Some(_) => "num",
        None => "word",
    });
    assert_eq!(result, "word num");
}

#[test]
fn test_replace_named_groups() {
    let re = Regex::new(r"(?<first>\w+)\s+(?<second>\w+)").unwrap();
    let result = re.replace("hello world", "${second} ${first}");
    assert_eq!(result, "world hello");
    let result = re.replace("hello world", "$second $first");
    assert_eq!(result, "world hello");
}

#[test]
fn test_replace_named_groups_malformed() {
    let re = Regex::new(r"(?<first>\w+)").unwrap();
    let result = re.replace("hello", "${first");
    assert_eq!(result, "${first");
}

#[test]
fn test_replace_name_is_longest_run() {
    let re = Regex::new(r"(\w)").unwrap();
    // $1x names the group "1x", which does not exist.
    assert_eq!(re.replace("a", "$1x"), "");
    assert_eq!(re.replace("a", "${1}x"), "ax");
    assert_eq!(re.replace("a", "$1-x"), "a-x");
}

#[test]
fn test_replace_nonexistent_group() {
    let re = Regex::new(r"(\w+)").unwrap();
    let result = re.replace("hello", "$1 $2 $3");
    assert_eq!(result, "hello  ");
}

#[test]
fn test_replace_high_group_numbers() {
    let re = Regex::new(r"(\w)(\w)(\w)").unwrap();
    let result = re.replace("abc", "$3$2$1$0");
    assert_eq!(result, "cbaabc");
}

#[test]
fn test_replace_large_group_number() {
    let re = Regex::new(r"(\w+)").unwrap();
    let result = re.replace("hello", "$999");
    assert_eq!(result, "");
}

#[test]
fn test_replace_dollar_at_end() {
    let re = Regex::new(r"\w+").unwrap();
    let result = re.replace("hello", "test$");
    assert_eq!(result, "test$");
}

#[test]
fn test_replace_email() {
    let re = Regex::new(r"(\w+)@(\w+)\.(\w+)").unwrap();
    let result = re.replace("Contact: user@example.com", "$1 at $2 dot $3");
    assert_eq!(result, "Contact: user at example dot com");
}

#[test]
fn test_replace_case_insensitive() {
    let re = Regex::with_flags(r"(hello)", "i").unwrap();
    let result = re.replace("Hello WORLD", "[$1]");
    assert_eq!(result, "[Hello] WORLD");
}

#[test]
fn test_replace_empty_match() {
    let re = Regex::new(r"\b").unwrap();
    let result = re.replace("a1 b2", "X");
    assert_eq!(result, "Xa1 b2");
}

#[test]
fn test_replace_no_expand() {
    let re = Regex::new(r"(\w+)").unwrap();
    assert_eq!(re.replace_all("a b", NoExpand("$1$$")), "$1$$ $1$$");
}

#[test]
fn test_replace_owned_templates() {
    let re = Regex::new(r"(\w+)@(\w+)").unwrap();
    let template = String::from("$2@$1");
    assert_eq!(re.replace("a@b", &template), "b@a");
    assert_eq!(re.replace("a@b", template), "b@a");
}

#[test]
fn test_replace_multibyte() {
    let re = Regex::with_flags(r"(\w+)", "u").unwrap();
    assert_eq!(re.replace_all("caf\u{e9} \u{4f60}", "<$1>"), "<caf\u{e9}> <\u{4f60}>");
}

#[test]
fn test_check_template() {
    let re = Regex::new(r"(?P<y>\d{4})-(\d{2})").unwrap();
    assert!(re.check_template("$y/$2 costs $$5").is_ok());
    assert!(re.check_template("${y}${1}${2}").is_ok());

    let err = re.check_template("$y/$3").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Template);
    assert_eq!(err.offset, Some(3));

    let err = re.check_template("${d}").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Template);
    assert_eq!(err.offset, Some(0));

    // Unclosed braces are literal text, not references.
    assert!(re.check_template("${y").is_ok());
}

#[test]
fn test_complex_replacement() {
    let re = Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap();
    let result = re.replace_all(
        "Born on 12/25/1990 and graduated on 5/15/2012",
        "$3-$1-$2",
    );
    assert_eq!(result, "Born on 1990-12-25 and graduated on 2012-5-15");
}
