use crate::charclasses;
use crate::codepointset::CodePointSet;
use crate::folds;

/// A group index is u32.
/// CaptureGroupID 0 is the implicit group covering the whole match; explicit
/// groups are numbered from 1 in order of their opening parenthesis.
pub type CaptureGroupID = u32;

/// The name of a named capture group.
pub type CaptureGroupName = String;

/// The maximum number of capture groups supported.
pub const MAX_CAPTURE_GROUPS: usize = 65535;

/// The largest bound accepted in a counted repetition like `x{3,5}`.
pub const MAX_REPEAT: usize = 1000;

/// The deepest group nesting accepted by the parser.
pub const MAX_NESTING: usize = 250;

/// The default ceiling on the number of instructions in a compiled program.
pub const DEFAULT_SIZE_LIMIT: usize = 1 << 20;

/// A search reporting every group keeps a table of (instructions × slots)
/// capture offsets per thread list. The table may hold this many entries per
/// instruction permitted by the size limit.
pub const SLOT_TABLE_FACTOR: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CharacterClassType {
    Digits,
    Spaces,
    Words,
}

impl CharacterClassType {
    /// \return whether \p c is a member of this class.
    /// In Unicode mode the standard library's character properties are the
    /// oracle; otherwise only the ASCII members count.
    #[inline]
    pub fn contains(self, c: char, unicode: bool) -> bool {
        if unicode {
            match self {
                CharacterClassType::Digits => c.is_numeric(),
                CharacterClassType::Spaces => c.is_whitespace(),
                CharacterClassType::Words => is_word_char(c, true),
            }
        } else {
            let cp = c as u32;
            let table: &[_] = match self {
                CharacterClassType::Digits => &charclasses::DIGITS,
                CharacterClassType::Spaces => &charclasses::WHITESPACE,
                CharacterClassType::Words => &charclasses::WORD_CHARS,
            };
            table.iter().any(|iv| iv.contains(cp))
        }
    }
}

/// \return whether \p c counts as a word character for `\w` and `\b`.
#[inline]
pub fn is_word_char(c: char, unicode: bool) -> bool {
    if unicode {
        c.is_alphanumeric() || c == '_'
    } else {
        c.is_ascii_alphanumeric() || c == '_'
    }
}

/// A shorthand class that is answered at match time rather than expanded into
/// code points, e.g. `\w` in Unicode mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClassEscape {
    pub class_type: CharacterClassType,
    pub positive: bool,
}

/// The stuff in a bracket.
#[derive(Debug, Clone, Default)]
pub struct BracketContents {
    pub invert: bool,
    pub icase: bool,
    pub unicode: bool,
    pub cps: CodePointSet,
    pub classes: Vec<ClassEscape>,
}

impl BracketContents {
    /// \return whether the bracket matches the given character \p c,
    /// respecting case. Respects 'invert'.
    /// Under icase, \p c matches if any char of its case orbit is contained.
    #[inline]
    pub fn matches(&self, c: char) -> bool {
        let contained = if self.icase {
            self.contains_exact(c) || folds::case_orbit(c).any(|v| self.contains_exact(v))
        } else {
            self.contains_exact(c)
        };
        contained != self.invert
    }

    fn contains_exact(&self, c: char) -> bool {
        self.cps.contains(c as u32)
            || self
                .classes
                .iter()
                .any(|ce| ce.class_type.contains(c, self.unicode) == ce.positive)
    }

    /// \return whether the set of characters is defined purely by code
    /// point intervals.
    pub fn is_plain(&self) -> bool {
        self.classes.is_empty() && !self.icase
    }
}
