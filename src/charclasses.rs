use crate::codepointset::Interval;

// Character classes like \d or \S, and the ASCII classes usable as [[:name:]].

/// Construct an interval from an inclusive range of char.
const fn r(first: char, last: char) -> Interval {
    Interval {
        first: first as u32,
        last: last as u32,
    }
}

/// Construct an interval from a single char.
const fn r1(c: char) -> Interval {
    Interval {
        first: c as u32,
        last: c as u32,
    }
}

// Note all of these are sorted.

/// `\w` outside Unicode mode.
pub const WORD_CHARS: [Interval; 4] = [r('0', '9'), r('A', 'Z'), r1('_'), r('a', 'z')];

/// `\d` outside Unicode mode.
pub const DIGITS: [Interval; 1] = [r('0', '9')];

/// `\s` outside Unicode mode: tab, newline, vertical tab, form feed, carriage
/// return and space.
pub const WHITESPACE: [Interval; 2] = [r('\u{0009}', '\u{000D}'), r1(' ')];

const ALNUM: [Interval; 3] = [r('0', '9'), r('A', 'Z'), r('a', 'z')];
const ALPHA: [Interval; 2] = [r('A', 'Z'), r('a', 'z')];
const ASCII: [Interval; 1] = [r('\u{0}', '\u{7F}')];
const BLANK: [Interval; 2] = [r1('\t'), r1(' ')];
const CNTRL: [Interval; 2] = [r('\u{0}', '\u{1F}'), r1('\u{7F}')];
const GRAPH: [Interval; 1] = [r('!', '~')];
const LOWER: [Interval; 1] = [r('a', 'z')];
const PRINT: [Interval; 1] = [r(' ', '~')];
const PUNCT: [Interval; 4] = [r('!', '/'), r(':', '@'), r('[', '`'), r('{', '~')];
const UPPER: [Interval; 1] = [r('A', 'Z')];
const XDIGIT: [Interval; 3] = [r('0', '9'), r('A', 'F'), r('a', 'f')];

/// \return the intervals for an ASCII class name as written in `[[:name:]]`.
pub fn posix_class(name: &str) -> Option<&'static [Interval]> {
    Some(match name {
        "alnum" => &ALNUM,
        "alpha" => &ALPHA,
        "ascii" => &ASCII,
        "blank" => &BLANK,
        "cntrl" => &CNTRL,
        "digit" => &DIGITS,
        "graph" => &GRAPH,
        "lower" => &LOWER,
        "print" => &PRINT,
        "punct" => &PUNCT,
        "space" => &WHITESPACE,
        "upper" => &UPPER,
        "word" => &WORD_CHARS,
        "xdigit" => &XDIGIT,
        _ => return None,
    })
}
