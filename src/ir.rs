//! Intermediate representation for a regex

use crate::api;
use crate::types::{BracketContents, CaptureGroupID, CaptureGroupName};
use core::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnchorType {
    StartOfLine, // ^ in multiline mode
    EndOfLine,   // $ in multiline mode
    StartOfText, // ^ or \A
    EndOfText,   // $ or \z
}

/// A Quantifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Quantifier {
    /// Minimum number of iterations of the loop, inclusive.
    pub min: usize,

    /// Maximum number of iterations of the loop, inclusive.
    /// usize::MAX means unbounded.
    pub max: usize,

    /// Whether the loop is greedy.
    pub greedy: bool,
}

impl Quantifier {
    /// \return whether the loop has no upper bound.
    pub fn is_unbounded(&self) -> bool {
        self.max == usize::MAX
    }
}

/// The node types of our IR.
#[derive(Debug, Clone)]
pub enum Node {
    /// Matches the empty string.
    Empty,

    /// Match a literal character.
    /// If icase is true, then `c` MUST be already folded.
    Char { c: char, icase: bool },

    /// Match the catenation of multiple nodes.
    Cat(Vec<Node>),

    /// Match an alternation like a|b|c. Earlier branches have priority.
    Alt(Vec<Node>),

    /// Match anything including newlines.
    MatchAny,

    /// Match anything except a newline.
    MatchAnyExceptLineTerminator,

    /// Match an anchor like ^ or $
    Anchor(AnchorType),

    /// Word boundary (\b or \B).
    WordBoundary { invert: bool, unicode: bool },

    /// A capturing group, perhaps named.
    CaptureGroup(Box<Node>, CaptureGroupID, Option<CaptureGroupName>),

    /// A bracket.
    Bracket(BracketContents),

    /// A loop like /.*/ or /x{3, 5}?/
    Loop { loopee: Box<Node>, quant: Quantifier },
}

impl Node {
    /// \return whether this node matches without consuming input.
    /// This is best-effort: a false return is always safe.
    pub fn is_zero_width(&self) -> bool {
        match self {
            Node::Empty | Node::Anchor(..) | Node::WordBoundary { .. } => true,
            Node::Cat(nodes) => nodes.iter().all(Node::is_zero_width),
            Node::CaptureGroup(contents, ..) => contents.is_zero_width(),
            _ => false,
        }
    }

    /// \return whether this node can match the empty string.
    /// This is conservative: a true return is always safe.
    pub fn can_match_empty(&self) -> bool {
        match self {
            Node::Empty | Node::Anchor(..) | Node::WordBoundary { .. } => true,
            Node::Char { .. }
            | Node::MatchAny
            | Node::MatchAnyExceptLineTerminator
            | Node::Bracket(..) => false,
            Node::Cat(nodes) => nodes.iter().all(Node::can_match_empty),
            Node::Alt(nodes) => nodes.iter().any(Node::can_match_empty),
            Node::CaptureGroup(contents, ..) => contents.can_match_empty(),
            Node::Loop { loopee, quant } => quant.min == 0 || loopee.can_match_empty(),
        }
    }
}

/// A helper type for walking.
#[derive(Debug, Clone)]
pub struct Walk {
    // It set to true, skip the children of this node.
    pub skip_children: bool,

    // The current depth of the walk.
    pub depth: usize,
}

struct Walker<'a, F>
where
    F: FnMut(&Node, &mut Walk),
{
    func: &'a mut F,
    postorder: bool,
    walk: Walk,
}

impl<F> Walker<'_, F>
where
    F: FnMut(&Node, &mut Walk),
{
    fn process_children(&mut self, n: &Node) {
        match n {
            Node::Empty
            | Node::Char { .. }
            | Node::WordBoundary { .. }
            | Node::Bracket { .. }
            | Node::MatchAny
            | Node::MatchAnyExceptLineTerminator
            | Node::Anchor { .. } => {}
            Node::Cat(nodes) | Node::Alt(nodes) => {
                for node in nodes {
                    self.process(node);
                }
            }
            Node::Loop { loopee, .. } => self.process(loopee),
            Node::CaptureGroup(contents, ..) => self.process(contents.as_ref()),
        }
    }

    fn process(&mut self, n: &Node) {
        self.walk.skip_children = false;
        if !self.postorder {
            (self.func)(n, &mut self.walk);
        }
        if !self.walk.skip_children {
            self.walk.depth += 1;
            self.process_children(n);
            self.walk.depth -= 1;
        }
        if self.postorder {
            (self.func)(n, &mut self.walk)
        }
    }
}

/// Call a function on every Node.
/// If \p postorder is true, then process children before the node;
/// otherwise process children after the node.
pub fn walk<F>(postorder: bool, n: &Node, func: &mut F)
where
    F: FnMut(&Node, &mut Walk),
{
    let mut walker = Walker {
        func,
        postorder,
        walk: Walk {
            skip_children: false,
            depth: 0,
        },
    };
    walker.process(n);
}

/// A regex in IR form.
#[derive(Debug)]
pub struct Regex {
    pub node: Node,
    pub flags: api::Flags,

    /// Names of the capture groups, indexed by group ID.
    /// Entry 0 is the implicit whole-match group and is always None.
    pub group_names: Vec<Option<CaptureGroupName>>,
}

fn display_node(node: &Node, depth: usize, f: &mut fmt::Formatter) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "..")?;
    }
    match node {
        Node::Empty => writeln!(f, "Empty"),
        Node::Char { c, icase } => {
            if *icase {
                writeln!(f, "'{}' (icase)", c.escape_debug())
            } else {
                writeln!(f, "'{}'", c.escape_debug())
            }
        }
        Node::Cat(..) => writeln!(f, "Cat"),
        Node::Alt(nodes) => writeln!(f, "Alt{}", nodes.len()),
        Node::MatchAny => writeln!(f, "MatchAny"),
        Node::MatchAnyExceptLineTerminator => writeln!(f, "MatchAnyExceptLineTerminator"),
        Node::Anchor(anchor_type) => writeln!(f, "Anchor {:?}", anchor_type),
        Node::Loop { quant, .. } => writeln!(f, "Loop {:?}", quant),
        Node::CaptureGroup(_node, idx, None) => writeln!(f, "CaptureGroup {:?}", idx),
        Node::CaptureGroup(_node, idx, Some(name)) => {
            writeln!(f, "CaptureGroup {:?} {:?}", idx, name)
        }
        &Node::WordBoundary { invert, .. } => {
            let kind = if invert { "\\B" } else { "\\b" };
            writeln!(f, "WordBoundary {:?}", kind)
        }
        Node::Bracket(contents) => writeln!(f, "Bracket {:?}", contents),
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = Ok(());
        walk(false, &self.node, &mut |node: &Node, walk: &mut Walk| {
            if result.is_ok() {
                result = display_node(node, walk.depth, f)
            }
        });
        result
    }
}
