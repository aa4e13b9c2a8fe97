//! Parser from regex patterns to IR

use crate::api;
use crate::charclasses;
use crate::codepointset::{CodePointSet, Interval};
use crate::folds;
use crate::ir;
use crate::types::{
    BracketContents, CaptureGroupID, CharacterClassType, ClassEscape, MAX_CAPTURE_GROUPS,
    MAX_NESTING, MAX_REPEAT,
};
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// The stage at which an error was detected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The pattern is malformed.
    Parse,

    /// The pattern is well formed but could not be compiled, e.g. because the
    /// program would be too large.
    Compile,

    /// A replacement template refers to a group that does not exist.
    Template,
}

/// Represents an error encountered during regex compilation.
/// The text contains a human-readable error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub text: String,

    /// Byte offset into the pattern (or template) where the error was found.
    /// Always present for parse errors.
    pub offset: Option<usize>,
}

impl Error {
    pub(crate) fn new<S: ToString>(kind: ErrorKind, text: S, offset: Option<usize>) -> Error {
        Error {
            kind,
            text: text.to_string(),
            offset,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)?;
        if let Some(offset) = self.offset {
            write!(f, " at offset {}", offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

enum ClassAtom {
    CodePoint(char),
    CharacterClass {
        class_type: CharacterClassType,
        positive: bool,
    },
}

fn error<T>(offset: usize, text: &str) -> Result<T, Error> {
    Err(Error::new(ErrorKind::Parse, text, Some(offset)))
}

fn make_cat(mut nodes: Vec<ir::Node>) -> ir::Node {
    if nodes.len() > 1 {
        return ir::Node::Cat(nodes);
    }
    nodes.pop().unwrap_or(ir::Node::Empty)
}

fn make_alt(mut nodes: Vec<ir::Node>) -> ir::Node {
    if nodes.len() > 1 {
        return ir::Node::Alt(nodes);
    }
    nodes.pop().unwrap_or(ir::Node::Empty)
}

/// \return the ASCII table for a shorthand class.
fn class_table(ct: CharacterClassType) -> &'static [Interval] {
    match ct {
        CharacterClassType::Digits => &charclasses::DIGITS,
        CharacterClassType::Spaces => &charclasses::WHITESPACE,
        CharacterClassType::Words => &charclasses::WORD_CHARS,
    }
}

/// \return a CodePointSet for a given character escape (positive or negative),
/// outside Unicode mode.
fn codepoints_from_class(ct: CharacterClassType, positive: bool) -> CodePointSet {
    let mut cps = CodePointSet::new();
    cps.add_all(class_table(ct));
    if !positive {
        cps = cps.inverted()
    }
    cps
}

fn add_class_atom(bc: &mut BracketContents, atom: ClassAtom) {
    match atom {
        ClassAtom::CodePoint(c) => bc.cps.add_one(c as u32),
        ClassAtom::CharacterClass {
            class_type,
            positive,
        } => {
            if bc.unicode {
                bc.classes.push(ClassEscape {
                    class_type,
                    positive,
                })
            } else {
                for &iv in codepoints_from_class(class_type, positive).intervals() {
                    bc.cps.add(iv)
                }
            }
        }
    }
}

/// Represents the state used to parse a regex.
struct Parser<'a> {
    /// The full pattern, for offsets.
    pattern: &'a str,

    /// The remaining input.
    input: Peekable<CharIndices<'a>>,

    /// Flags in effect at the current position.
    flags: api::Flags,

    /// Names of the capturing groups seen so far, indexed by group ID.
    group_names: Vec<Option<String>>,

    /// Current group nesting depth.
    depth: usize,
}

impl<'a> Parser<'a> {
    /// \return the byte offset of the next character.
    fn offset(&mut self) -> usize {
        match self.input.peek() {
            Some(&(idx, _)) => idx,
            None => self.pattern.len(),
        }
    }

    /// Consume a character, returning it.
    fn consume(&mut self, c: char) -> char {
        let nc = self.next();
        debug_assert!(nc == Some(c), "char was not next");
        c
    }

    /// If our contents begin with the char c, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.next();
            true
        } else {
            false
        }
    }

    /// If our contents begin with the string \p s, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume_str(&mut self, s: &str) -> bool {
        let mut cursor = self.input.clone();
        for c1 in s.chars() {
            if cursor.next().map(|(_, c)| c) != Some(c1) {
                return false;
            }
        }
        self.input = cursor;
        true
    }

    /// Peek at the next character.
    fn peek(&mut self) -> Option<char> {
        self.input.peek().map(|&(_, c)| c)
    }

    /// \return the next character.
    fn next(&mut self) -> Option<char> {
        self.input.next().map(|(_, c)| c)
    }

    fn try_parse(&mut self) -> Result<ir::Regex, Error> {
        // Parse a disjunction. If we consume everything, it's success. If there's
        // something left, it must be an excess closing paren.
        let node = self.consume_disjunction()?;
        let offset = self.offset();
        match self.peek() {
            None => Ok(ir::Regex {
                node,
                flags: self.flags,
                group_names: std::mem::take(&mut self.group_names),
            }),
            Some(')') => error(offset, "Unbalanced parenthesis"),
            Some(_) => error(offset, "Unexpected character"),
        }
    }

    /// Alternatives separated by `|`.
    fn consume_disjunction(&mut self) -> Result<ir::Node, Error> {
        let mut branches = Vec::new();
        let mut empty_branch = None;
        let mut pipes = Vec::new();
        loop {
            let start = self.offset();
            branches.push(self.consume_term()?);
            if empty_branch.is_none() && self.offset() == start {
                empty_branch = Some(branches.len() - 1);
            }
            let pipe = self.offset();
            if !self.try_consume('|') {
                break;
            }
            pipes.push(pipe);
        }
        if let (Some(idx), false) = (empty_branch, pipes.is_empty()) {
            // Blame the pipe before the empty branch, or after it if it is first.
            return error(pipes[idx.saturating_sub(1)], "Empty alternation branch");
        }
        Ok(make_alt(branches))
    }

    /// A sequence of quantified atoms.
    fn consume_term(&mut self) -> Result<ir::Node, Error> {
        let mut result: Vec<ir::Node> = Vec::new();
        loop {
            let offset = self.offset();
            let c = match self.peek() {
                None => break,
                Some(c) => c,
            };
            match c {
                // A concatenation is terminated by closing parens or vertical bar (alternations).
                ')' | '|' => break,
                '^' => {
                    self.consume('^');
                    result.push(ir::Node::Anchor(if self.flags.multiline {
                        ir::AnchorType::StartOfLine
                    } else {
                        ir::AnchorType::StartOfText
                    }));
                }

                '$' => {
                    self.consume('$');
                    result.push(ir::Node::Anchor(if self.flags.multiline {
                        ir::AnchorType::EndOfLine
                    } else {
                        ir::AnchorType::EndOfText
                    }));
                }

                '\\' => {
                    self.consume('\\');
                    result.push(self.consume_atom_escape(offset)?);
                }

                '.' => {
                    self.consume('.');
                    result.push(if self.flags.dot_all {
                        ir::Node::MatchAny
                    } else {
                        ir::Node::MatchAnyExceptLineTerminator
                    });
                }

                '(' => {
                    match self.consume_group()? {
                        Some(node) => result.push(node),
                        // A bare flag group like (?i) has nothing to quantify.
                        None => continue,
                    }
                }

                '[' => {
                    result.push(self.consume_bracket()?);
                }

                ']' => {
                    return error(offset, "Unbalanced bracket");
                }

                '*' | '+' | '?' | '{' => {
                    // Either a quantifier with nothing before it, or a malformed one.
                    self.try_consume_quantifier()?;
                    return error(offset, "Nothing to repeat");
                }

                c => {
                    self.consume(c);
                    result.push(self.make_char(c));
                }
            }

            // We just parsed an atom; try parsing a quantifier.
            if let Some(quant) = self.try_consume_quantifier()? {
                if let Some(quantifee) = result.pop() {
                    result.push(ir::Node::Loop {
                        loopee: Box::new(quantifee),
                        quant,
                    });
                }
            }
        }
        Ok(make_cat(result))
    }

    /// \return a literal node for \p c under the current flags.
    fn make_char(&self, c: char) -> ir::Node {
        let icase = self.flags.icase && folds::has_case_variants(c);
        ir::Node::Char {
            c: if icase { folds::fold(c) } else { c },
            icase,
        }
    }

    /// Parse a parenthesized group, starting at the open paren.
    /// \return None for a flag group like (?i) which only changes flags.
    fn consume_group(&mut self) -> Result<Option<ir::Node>, Error> {
        let open = self.offset();
        self.consume('(');
        if self.depth >= MAX_NESTING {
            return error(open, "Nesting too deep");
        }

        let saved_flags = self.flags;
        let mut group = None;
        if self.try_consume('?') {
            if self.try_consume_str("P<") || self.try_consume('<') {
                group = Some(self.consume_group_name()?);
            } else if !self.try_consume(':') {
                let scoped = self.consume_flags()?;
                if !scoped {
                    // (?flags) applies to the rest of the enclosing group.
                    return Ok(None);
                }
            }
        } else {
            group = Some(None);
        }

        // Reserve the group index before parsing the contents, so indexes
        // follow the order of opening parens.
        let group_id = match group {
            None => None,
            Some(name) => {
                if self.group_names.len() > MAX_CAPTURE_GROUPS {
                    return error(open, "Capture group count limit exceeded");
                }
                let id = self.group_names.len() as CaptureGroupID;
                self.group_names.push(name);
                Some(id)
            }
        };

        self.depth += 1;
        let contents = self.consume_disjunction()?;
        self.depth -= 1;
        self.flags = saved_flags;
        if !self.try_consume(')') {
            return error(open, "Unbalanced parenthesis");
        }

        Ok(Some(match group_id {
            None => contents,
            Some(id) => {
                let name = self.group_names[id as usize].clone();
                ir::Node::CaptureGroup(Box::new(contents), id, name)
            }
        }))
    }

    /// Parse the name of a named group up to and including the closing `>`.
    fn consume_group_name(&mut self) -> Result<Option<String>, Error> {
        let start = self.offset();
        let mut name = String::new();
        loop {
            match self.next() {
                Some('>') => break,
                Some(c) if c == '_' || c.is_ascii_alphabetic() => name.push(c),
                Some(c) if c.is_ascii_digit() && !name.is_empty() => name.push(c),
                _ => return error(start, "Invalid capture group name"),
            }
        }
        if name.is_empty() {
            return error(start, "Invalid capture group name");
        }
        if self.group_names.iter().flatten().any(|n| *n == name) {
            return error(start, "Duplicate capture group name");
        }
        Ok(Some(name))
    }

    /// Parse flag letters after `(?`, through the `:` or `)`.
    /// Updates the current flags.
    /// \return true if the flags are scoped to a group body (`(?i:...)`).
    fn consume_flags(&mut self) -> Result<bool, Error> {
        let mut enable = true;
        loop {
            let offset = self.offset();
            match self.next() {
                Some(':') => return Ok(true),
                Some(')') => return Ok(false),
                Some('-') if enable => enable = false,
                Some('i') => self.flags.icase = enable,
                Some('m') => self.flags.multiline = enable,
                Some('s') => self.flags.dot_all = enable,
                Some('u') => self.flags.unicode = enable,
                Some(_) => return error(offset, "Invalid group modifier"),
                None => return error(offset, "Unbalanced parenthesis"),
            }
        }
    }

    /// Parse a bracket like [a-z] starting at the `[`.
    fn consume_bracket(&mut self) -> Result<ir::Node, Error> {
        let open = self.offset();
        self.consume('[');
        let mut result = BracketContents {
            invert: self.try_consume('^'),
            icase: self.flags.icase,
            unicode: self.flags.unicode,
            ..Default::default()
        };

        // A ] in the first position is a literal.
        if self.try_consume(']') {
            result.cps.add_one(']' as u32);
        }

        loop {
            match self.peek() {
                None => return error(open, "Unbalanced bracket"),
                Some(']') => {
                    self.consume(']');
                    return Ok(ir::Node::Bracket(result));
                }
                _ => {}
            }

            if self.try_consume_posix_class(&mut result)? {
                continue;
            }

            // Parse a code point or character class.
            let range_start = self.offset();
            let first = match self.try_consume_bracket_class_atom()? {
                Some(atom) => atom,
                None => continue,
            };

            // Check for a dash; we may have a range.
            if self.peek() != Some('-') {
                add_class_atom(&mut result, first);
                continue;
            }
            self.consume('-');

            let second = match self.try_consume_bracket_class_atom()? {
                Some(atom) => atom,
                None => {
                    // No second atom. For example: [a-].
                    add_class_atom(&mut result, first);
                    add_class_atom(&mut result, ClassAtom::CodePoint('-'));
                    continue;
                }
            };

            // Ranges can't contain character classes: [\d-z] is invalid.
            // Ranges must also be in order: z-a is invalid.
            match (first, second) {
                (ClassAtom::CodePoint(c1), ClassAtom::CodePoint(c2)) if c1 <= c2 => {
                    result.cps.add(Interval::new(c1 as u32, c2 as u32))
                }
                _ => return error(range_start, "Invalid character range"),
            }
        }
    }

    /// Try parsing a class like [:alpha:] or [:^digit:] inside a bracket.
    fn try_consume_posix_class(&mut self, bc: &mut BracketContents) -> Result<bool, Error> {
        let start = self.offset();
        if !self.try_consume_str("[:") {
            return Ok(false);
        }
        let negated = self.try_consume('^');
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_lowercase() {
                break;
            }
            name.push(self.consume(c));
        }
        if !self.try_consume_str(":]") {
            return error(start, "Invalid POSIX class");
        }
        let ivs = match charclasses::posix_class(&name) {
            Some(ivs) => ivs,
            None => return error(start, "Invalid POSIX class"),
        };
        let mut cps = CodePointSet::new();
        cps.add_all(ivs);
        if negated {
            cps = cps.inverted();
        }
        for &iv in cps.intervals() {
            bc.cps.add(iv);
        }
        Ok(true)
    }

    fn try_consume_bracket_class_atom(&mut self) -> Result<Option<ClassAtom>, Error> {
        let offset = self.offset();
        match self.peek() {
            // End of bracket, or end of input which the caller reports.
            None | Some(']') => Ok(None),

            // Escape sequence.
            Some('\\') => {
                self.consume('\\');
                match self.peek() {
                    None => error(offset, "Incomplete escape"),
                    Some(ec @ ('d' | 'D' | 's' | 'S' | 'w' | 'W')) => {
                        self.consume(ec);
                        Ok(Some(ClassAtom::CharacterClass {
                            class_type: class_type_for_escape(ec),
                            positive: ec.is_ascii_lowercase(),
                        }))
                    }
                    Some('b') => {
                        // Backspace inside brackets.
                        self.consume('b');
                        Ok(Some(ClassAtom::CodePoint('\x08')))
                    }
                    Some(_) => Ok(Some(ClassAtom::CodePoint(
                        self.consume_character_escape(offset)?,
                    ))),
                }
            }

            Some(c) => Ok(Some(ClassAtom::CodePoint(self.consume(c)))),
        }
    }

    fn try_consume_quantifier(&mut self) -> Result<Option<ir::Quantifier>, Error> {
        if let Some(mut quant) = self.try_consume_quantifier_prefix()? {
            quant.greedy = !self.try_consume('?');
            Ok(Some(quant))
        } else {
            Ok(None)
        }
    }

    fn try_consume_quantifier_prefix(&mut self) -> Result<Option<ir::Quantifier>, Error> {
        let offset = self.offset();
        let (min, max) = match self.peek() {
            Some('+') => (1, usize::MAX),
            Some('*') => (0, usize::MAX),
            Some('?') => (0, 1),
            Some('{') => {
                self.consume('{');
                let min = match self.try_consume_decimal_integer_literal() {
                    Some(min) => min,
                    None => return error(offset, "Invalid quantifier"),
                };
                let max = if self.try_consume(',') {
                    // Like {3,} or {3,4}.
                    self.try_consume_decimal_integer_literal()
                        .unwrap_or(usize::MAX)
                } else {
                    // Like {3}.
                    min
                };
                if !self.try_consume('}') || min > max {
                    return error(offset, "Invalid quantifier");
                }
                if min > MAX_REPEAT || (max != usize::MAX && max > MAX_REPEAT) {
                    return error(offset, "Repetition bound too large");
                }
                return Ok(Some(ir::Quantifier {
                    min,
                    max,
                    greedy: true,
                }));
            }
            _ => return Ok(None),
        };
        self.next();
        Ok(Some(ir::Quantifier {
            min,
            max,
            greedy: true,
        }))
    }

    /// Consume a run of decimal digits.
    /// If the value would overflow, a value larger than any bound is returned.
    /// All decimal digits are consumed regardless.
    fn try_consume_decimal_integer_literal(&mut self) -> Option<usize> {
        let mut result: usize = 0;
        let mut char_count = 0;
        while let Some(c) = self.peek() {
            if let Some(digit) = char::to_digit(c, 10) {
                self.consume(c);
                char_count += 1;
                // Saturate below usize::MAX, which means "unbounded".
                result = result
                    .saturating_mul(10)
                    .saturating_add(digit as usize)
                    .min(usize::MAX - 1);
            } else {
                break;
            }
        }
        if char_count > 0 {
            Some(result)
        } else {
            None
        }
    }

    /// Parse hex digits for \x and \u escapes.
    /// Accepts either {H...} or exactly \p fixed_len digits.
    fn consume_hex_escape(
        &mut self,
        backslash: usize,
        fixed_len: Option<usize>,
    ) -> Result<char, Error> {
        let mut value: u32 = 0;
        let braced = self.try_consume('{');
        let mut count = 0;
        loop {
            if !braced && Some(count) == fixed_len {
                break;
            }
            match self.peek() {
                Some('}') if braced && count > 0 => {
                    self.consume('}');
                    break;
                }
                Some(c) if c.is_ascii_hexdigit() && count < 8 => {
                    self.consume(c);
                    value = value * 16 + c.to_digit(16).unwrap_or(0);
                    count += 1;
                }
                _ => return error(backslash, "Invalid escape"),
            }
        }
        match char::from_u32(value) {
            Some(c) => Ok(c),
            None => error(backslash, "Invalid escape"),
        }
    }

    /// Parse the character escape following a backslash at offset \p backslash.
    fn consume_character_escape(&mut self, backslash: usize) -> Result<char, Error> {
        let c = match self.next() {
            Some(c) => c,
            None => return error(backslash, "Incomplete escape"),
        };
        match c {
            'a' => Ok('\x07'),
            'f' => Ok('\x0C'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'v' => Ok('\x0B'),
            '0' => Ok('\0'),
            'x' => self.consume_hex_escape(backslash, Some(2)),
            'u' => self.consume_hex_escape(backslash, Some(4)),

            // Escaped metacharacters stand for themselves.
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
            | '#' | '&' | '-' | '~' | ' ' => Ok(c),

            _ => error(backslash, "Invalid escape"),
        }
    }

    fn consume_atom_escape(&mut self, backslash: usize) -> Result<ir::Node, Error> {
        let c = match self.peek() {
            Some(c) => c,
            None => return error(backslash, "Incomplete escape"),
        };
        match c {
            'b' | 'B' => {
                self.consume(c);
                Ok(ir::Node::WordBoundary {
                    invert: c == 'B',
                    unicode: self.flags.unicode,
                })
            }

            'A' => {
                self.consume(c);
                Ok(ir::Node::Anchor(ir::AnchorType::StartOfText))
            }

            'z' => {
                self.consume(c);
                Ok(ir::Node::Anchor(ir::AnchorType::EndOfText))
            }

            'd' | 'D' | 's' | 'S' | 'w' | 'W' => {
                self.consume(c);
                let mut bc = BracketContents {
                    unicode: self.flags.unicode,
                    ..Default::default()
                };
                add_class_atom(
                    &mut bc,
                    ClassAtom::CharacterClass {
                        class_type: class_type_for_escape(c),
                        positive: c.is_ascii_lowercase(),
                    },
                );
                Ok(ir::Node::Bracket(bc))
            }

            _ => {
                let c = self.consume_character_escape(backslash)?;
                Ok(self.make_char(c))
            }
        }
    }
}

fn class_type_for_escape(c: char) -> CharacterClassType {
    match c {
        'd' | 'D' => CharacterClassType::Digits,
        's' | 'S' => CharacterClassType::Spaces,
        _ => CharacterClassType::Words,
    }
}

/// Try parsing a given pattern.
/// Return the resulting IR regex, or an error.
pub fn try_parse(pattern: &str, flags: api::Flags) -> Result<ir::Regex, Error> {
    let mut p = Parser {
        pattern,
        input: pattern.char_indices().peekable(),
        flags,
        // Group 0 is the whole match.
        group_names: vec![None],
        depth: 0,
    };
    p.try_parse()
}
