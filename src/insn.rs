//! Program instructions for a compiled regex

use crate::api;
use crate::bytesearch::{ByteBitmap, LiteralPrefix};
use crate::types::BracketContents;
use core::fmt;
use std::sync::Arc;

/// An index into the instruction list.
pub type JumpTarget = usize;

/// An index into the capture slot array. Group `i` owns slots `2i` and `2i+1`.
pub type SlotIndex = usize;

/// The list of program instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insn {
    /// The match was successful.
    Goal,

    /// Match a single char.
    Char(char),

    /// Match a single char, case-insensitive. The char is folded.
    CharICase(char),

    /// Match the next character against the bracket contents, stored at the
    /// given index in the CompiledRegex.
    Bracket(usize),

    /// Match any character; emitted by '.' when the dot_all flag is set.
    MatchAny,

    /// Match any character except a line terminator; emitted by '.'
    MatchAnyExceptLineTerminator,

    /// Match at the start of the text or just after a newline.
    StartOfLine,

    /// Match at the end of the text or just before a newline.
    EndOfLine,

    /// Match at the start of the text.
    StartOfText,

    /// Match at the end of the text.
    EndOfText,

    /// \b or \B word boundaries.
    WordBoundary { invert: bool, unicode: bool },

    /// Continue at both targets. Threads at `primary` have priority.
    Split {
        primary: JumpTarget,
        secondary: JumpTarget,
    },

    /// Set the IP to a new value.
    Jump { target: JumpTarget },

    /// Record the current position in a capture slot.
    Save(SlotIndex),
}

/// The peeled prefix start predicate.
/// This is a fast way of locating the first potential match.
#[derive(Debug, Clone)]
pub enum StartPredicate {
    /// May match an arbitrary sequence.
    Arbitrary,

    /// Look for a byte sequence.
    ByteSeq(LiteralPrefix),

    /// Look for a byte which matches the bitmap.
    ByteBracket(ByteBitmap),

    /// The regex is anchored to the start of the text.
    /// This avoids string searching entirely and only tries matching at the beginning.
    StartAnchored,
}

#[derive(Debug, Clone)]
pub struct CompiledRegex {
    // Sequence of instructions.
    pub insns: Vec<Insn>,

    // The bracket contents, indexed by the value of the `Bracket` instruction.
    pub brackets: Vec<BracketContents>,

    // Predicate to rapidly find the first potential match.
    pub start_pred: StartPredicate,

    // Capture group names indexed by group, including the unnamed group 0.
    // Shared with every Captures produced by this regex.
    pub group_names: Arc<[Option<Box<str>>]>,

    // Flags controlling matching.
    pub flags: api::Flags,
}

impl CompiledRegex {
    /// \return the number of capture groups, including group 0.
    pub fn groups(&self) -> usize {
        self.group_names.len()
    }

    /// \return the number of capture slots.
    pub fn slot_count(&self) -> usize {
        self.groups() * 2
    }
}

impl fmt::Display for CompiledRegex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (ip, insn) in self.insns.iter().enumerate() {
            write!(f, "{:>4}: ", ip)?;
            match insn {
                Insn::Bracket(idx) => writeln!(f, "Bracket {:?}", self.brackets[*idx])?,
                Insn::Char(c) => writeln!(f, "Char '{}'", c.escape_debug())?,
                Insn::CharICase(c) => writeln!(f, "CharICase '{}'", c.escape_debug())?,
                insn => writeln!(f, "{:?}", insn)?,
            }
        }
        Ok(())
    }
}
