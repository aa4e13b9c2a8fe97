//! Replacement strings and template expansion.

use crate::api::Captures;
use std::borrow::Cow;

/// A reference to a capture group inside a replacement template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupRef<'a> {
    Number(usize),
    Named(&'a str),
}

/// A parsed `$` reference: the group it names, and the length of the
/// reference text including the `$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TemplateRef<'a> {
    pub group: GroupRef<'a>,
    pub len: usize,
}

fn is_name_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

/// Parse a group reference at the start of \p s, which begins with `$`.
/// \return None if the `$` is not followed by a reference, in which case it is
/// literal text.
///
/// The unbraced form takes the longest run of name characters, so `$1a` names
/// the group "1a" rather than group 1 followed by "a". Use `${1}a` for that.
pub(crate) fn parse_ref(s: &str) -> Option<TemplateRef<'_>> {
    let bytes = s.as_bytes();
    debug_assert!(bytes.first() == Some(&b'$'), "References start with $");
    let (name, len) = if bytes.get(1) == Some(&b'{') {
        let close = s[2..].find('}')?;
        (&s[2..2 + close], close + 3)
    } else {
        let run = bytes[1..].iter().take_while(|&&b| is_name_byte(b)).count();
        (&s[1..1 + run], run + 1)
    };
    if name.is_empty() {
        return None;
    }
    let group = match name.parse::<usize>() {
        Ok(idx) => GroupRef::Number(idx),
        Err(_) => GroupRef::Named(name),
    };
    Some(TemplateRef { group, len })
}

/// A piece of a replacement template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    /// Text copied as is.
    Literal(&'a str),

    /// A group reference, with its byte offset in the template.
    Ref(usize, GroupRef<'a>),
}

/// Walk \p template, passing its pieces to \p visit in order.
/// `$$` is a literal `$`, as is any `$` which does not start a reference.
pub(crate) fn visit_template<'a, F>(template: &'a str, mut visit: F)
where
    F: FnMut(Piece<'a>),
{
    let mut rest = template;
    let mut offset = 0;
    while let Some(dollar) = rest.find('$') {
        if dollar > 0 {
            visit(Piece::Literal(&rest[..dollar]));
        }
        offset += dollar;
        rest = &rest[dollar..];
        if rest.as_bytes().get(1) == Some(&b'$') {
            visit(Piece::Literal("$"));
            rest = &rest[2..];
            offset += 2;
            continue;
        }
        match parse_ref(rest) {
            Some(r) => {
                visit(Piece::Ref(offset, r.group));
                rest = &rest[r.len..];
                offset += r.len;
            }
            None => {
                visit(Piece::Literal("$"));
                rest = &rest[1..];
                offset += 1;
            }
        }
    }
    if !rest.is_empty() {
        visit(Piece::Literal(rest));
    }
}

/// Append \p template to \p dst, replacing group references with the text of
/// the corresponding group in \p caps. References to groups which do not exist
/// or did not participate expand to nothing.
pub(crate) fn expand(caps: &Captures<'_>, template: &str, dst: &mut String) {
    visit_template(template, |piece| match piece {
        Piece::Literal(text) => dst.push_str(text),
        Piece::Ref(_, group) => {
            let m = match group {
                GroupRef::Number(idx) => caps.get(idx),
                GroupRef::Named(name) => caps.name(name),
            };
            if let Some(m) = m {
                dst.push_str(m.as_str());
            }
        }
    });
}

/// Something which can produce the replacement text for a match.
///
/// Implemented for `&str`, `String` and `&String` (templates), for
/// [`NoExpand`] (literal text), and for closures taking a [`Captures`].
pub trait Replacer {
    /// Append the replacement for the match in \p caps to \p dst.
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String);

    /// \return a fixed replacement string, if this replacer does not depend
    /// on the match. This lets substitution skip capture tracking.
    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        None
    }
}

impl Replacer for &str {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(self, dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl Replacer for String {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(self, dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl Replacer for &String {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(self, dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl<F, T> Replacer for F
where
    F: FnMut(&Captures<'_>) -> T,
    T: AsRef<str>,
{
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        dst.push_str((*self)(caps).as_ref());
    }
}

/// A replacement string used verbatim, with no `$` expansion.
#[derive(Debug, Clone, Copy)]
pub struct NoExpand<'t>(pub &'t str);

impl Replacer for NoExpand<'_> {
    fn replace_append(&mut self, _: &Captures<'_>, dst: &mut String) {
        dst.push_str(self.0);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.0))
    }
}

/// A template without any `$` is its own expansion.
fn no_expansion(template: &str) -> Option<Cow<'_, str>> {
    if template.contains('$') {
        None
    } else {
        Some(Cow::Borrowed(template))
    }
}
