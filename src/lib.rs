/*!

# pikere - a linear-time regex engine

This crate compiles Perl-style regular expressions into a small program and
runs it with a Pike VM: every search takes time proportional to the program
size times the text length, whatever the pattern.

# Example: test if a string contains a match

```rust
use pikere::Regex;
let re = Regex::new(r"\d{4}").unwrap();
assert!(re.is_match("2020-20-05"));
```

# Example: iterating over matches

```rust
use pikere::Regex;
let re = Regex::new(r"o+").unwrap();
let found: Vec<&str> = re.find_iter("foo boo o").map(|m| m.as_str()).collect();
assert_eq!(found, vec!["oo", "oo", "o"]);
```

# Example: using capture groups

Capture groups are available through `Captures`, by index or by name. A
group which did not participate in the match is `None`.

```rust
use pikere::Regex;
let re = Regex::new(r"(?P<y>\d{4})-(?P<m>\d{2})(-\d{2})?").unwrap();
let caps = re.captures("Today is 2024-01").unwrap();
assert_eq!(&caps["y"], "2024");
assert_eq!(&caps[2], "01");
assert!(caps.get(3).is_none());
```

# Example: replacement

Templates refer to groups with `$name`, `$1` or `${name}`; `$$` is a literal
dollar sign. Closures and [`NoExpand`] are also accepted.

```rust
use pikere::{Captures, NoExpand, Regex};
let re = Regex::new(r"(\w+)@(\w+)").unwrap();
assert_eq!(re.replace_all("a@b c@d", "$2@$1"), "b@a d@c");
assert_eq!(re.replace("a@b", NoExpand("$0")), "$0");
let upper = re.replace("a@b", |caps: &Captures| caps[1].to_uppercase());
assert_eq!(upper, "A");
```

# Supported Syntax

- Literals, `.`, classes `[a-z]` and `[^...]` with `[[:alpha:]]` POSIX names,
  and the shorthand classes `\d \w \s` and their negations.
- Repetition `* + ? {m} {m,} {m,n}`, each lazy with a trailing `?`.
- Groups `(...)`, `(?:...)`, `(?P<name>...)` and `(?<name>...)`.
- Anchors `^ $ \A \z` and word boundaries `\b \B`.
- Flags `i m s u`, given to [`Regex::with_flags`] or inline as `(?i)` and
  `(?i:...)`.

Backreferences and lookaround are not supported, since they cannot be matched
in linear time. Matching is leftmost-first: among matches starting at the same
position, the one preferred by the pattern's alternation order and greediness
wins.

# Unicode remarks

Text is UTF-8 and matched one code point at a time. By default `\d`, `\w`,
`\s` and `\b` are ASCII-only; the `u` flag widens them to Unicode.
Case-insensitive matching uses simple case folding:

```rust
use pikere::Regex;
let re = Regex::with_flags("\u{00B5}", "i").unwrap();
assert!(re.find("\u{03BC}").is_some());
```

# Searching with a deadline

[`Regex::search`] takes an [`Input`] which may carry a deadline, and a
[`Cache`] which may be reused between searches.

```rust
use pikere::{Input, Regex};
use std::time::{Duration, Instant};
let re = Regex::new(r"\w+").unwrap();
let mut cache = re.create_cache();
let input = Input::new("hello").deadline(Instant::now() + Duration::from_secs(1));
let caps = re.search(&input, &mut cache).unwrap().unwrap();
assert_eq!(&caps[0], "hello");
```

# Crate features

- **prohibit-unsafe**. Uses bounds-checked indexing in the matching engine.

*/

#![warn(clippy::all)]
// Clippy's manual_range_contains suggestion produces worse codegen.
#![allow(clippy::manual_range_contains)]

pub use crate::api::*;
pub use crate::exec::{CaptureMatches, MatchError, Matches, Split, SplitN};
pub use crate::pikevm::Cache;
pub use crate::replace::{NoExpand, Replacer};

mod util;

mod api;
mod bytesearch;
mod charclasses;
mod codepointset;
mod emit;
mod exec;
mod folds;
mod insn;
mod ir;
mod parse;
mod pikevm;
mod replace;
mod sparse_set;
mod startpredicate;
mod types;
