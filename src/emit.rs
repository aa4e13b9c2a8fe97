//! Regex compiler back-end: transforms IR into a CompiledRegex

use crate::insn::{CompiledRegex, Insn, JumpTarget};
use crate::ir;
use crate::ir::Node;
use crate::parse::{Error, ErrorKind};
use crate::startpredicate;
use crate::types::SLOT_TABLE_FACTOR;
use std::sync::Arc;

/// \return an anchor instruction for a given IR anchor.
fn make_anchor(anchor_type: ir::AnchorType) -> Insn {
    match anchor_type {
        ir::AnchorType::StartOfLine => Insn::StartOfLine,
        ir::AnchorType::EndOfLine => Insn::EndOfLine,
        ir::AnchorType::StartOfText => Insn::StartOfText,
        ir::AnchorType::EndOfText => Insn::EndOfText,
    }
}

/// \return a split preferring \p body when greedy, else preferring \p exit.
fn make_split(greedy: bool, body: JumpTarget, exit: JumpTarget) -> Insn {
    if greedy {
        Insn::Split {
            primary: body,
            secondary: exit,
        }
    } else {
        Insn::Split {
            primary: exit,
            secondary: body,
        }
    }
}

/// Type which wraps up the context needed to emit a CompiledRegex.
struct Emitter {
    insns: Vec<Insn>,
    brackets: Vec<crate::types::BracketContents>,

    // The program may not grow beyond this many instructions.
    size_limit: usize,
}

impl Emitter {
    /// Emit an instruction.
    /// Return the instruction's index.
    fn emit_insn(&mut self, insn: Insn) -> Result<JumpTarget, Error> {
        let ret = self.next_offset();
        if ret >= self.size_limit {
            return Err(Error::new(
                ErrorKind::Compile,
                format!(
                    "Compiled program too large (limit is {} instructions)",
                    self.size_limit
                ),
                None,
            ));
        }
        self.insns.push(insn);
        Ok(ret)
    }

    /// \return the offset of the next instruction emitted.
    fn next_offset(&self) -> JumpTarget {
        self.insns.len()
    }

    /// Replace a placeholder instruction.
    fn patch(&mut self, idx: JumpTarget, insn: Insn) {
        debug_assert!(
            matches!(self.insns[idx], Insn::Split { .. } | Insn::Jump { .. }),
            "Should be patching a branch"
        );
        self.insns[idx] = insn;
    }

    /// Emit instructions corresponding to a given node.
    /// Recursion depth is bounded by the parser's nesting limit.
    fn emit_node(&mut self, node: &Node) -> Result<(), Error> {
        match node {
            Node::Empty => {}
            &Node::Char { c, icase } => {
                if !icase {
                    self.emit_insn(Insn::Char(c))?;
                } else {
                    self.emit_insn(Insn::CharICase(c))?;
                }
            }
            Node::Cat(children) => {
                for nn in children {
                    self.emit_node(nn)?;
                }
            }
            Node::Alt(branches) => {
                // Each branch but the last is preceded by a split whose
                // secondary target is the next branch, and followed by a jump
                // to the exit.
                let mut jumps = Vec::with_capacity(branches.len());
                let (last, init) = match branches.split_last() {
                    Some(pair) => pair,
                    None => return Ok(()),
                };
                for branch in init {
                    let split = self.emit_insn(Insn::Split {
                        primary: 0,
                        secondary: 0,
                    })?;
                    self.emit_node(branch)?;
                    jumps.push(self.emit_insn(Insn::Jump { target: 0 })?);
                    let next_branch = self.next_offset();
                    self.patch(
                        split,
                        Insn::Split {
                            primary: split + 1,
                            secondary: next_branch,
                        },
                    );
                }
                self.emit_node(last)?;
                let exit = self.next_offset();
                for jump in jumps {
                    self.patch(jump, Insn::Jump { target: exit });
                }
            }
            Node::Bracket(contents) => {
                let idx = self.brackets.len();
                self.brackets.push(contents.clone());
                self.emit_insn(Insn::Bracket(idx))?;
            }
            Node::MatchAny => {
                self.emit_insn(Insn::MatchAny)?;
            }
            Node::MatchAnyExceptLineTerminator => {
                self.emit_insn(Insn::MatchAnyExceptLineTerminator)?;
            }
            Node::Anchor(anchor_type) => {
                self.emit_insn(make_anchor(*anchor_type))?;
            }
            Node::WordBoundary { invert, unicode } => {
                self.emit_insn(Insn::WordBoundary {
                    invert: *invert,
                    unicode: *unicode,
                })?;
            }
            Node::Loop { loopee, quant } => {
                // Mandatory iterations.
                for _ in 0..quant.min {
                    self.emit_node(loopee)?;
                }
                if quant.is_unbounded() {
                    // L: split(body, exit); body; jump L
                    let split = self.emit_insn(Insn::Jump { target: 0 })?;
                    self.emit_node(loopee)?;
                    self.emit_insn(Insn::Jump { target: split })?;
                    let exit = self.next_offset();
                    self.patch(split, make_split(quant.greedy, split + 1, exit));
                } else {
                    // Optional iterations, each nested in the one before:
                    // split(body, exit); body; split(body, exit); body; ...
                    let mut splits = Vec::new();
                    for _ in quant.min..quant.max {
                        splits.push(self.emit_insn(Insn::Jump { target: 0 })?);
                        self.emit_node(loopee)?;
                    }
                    let exit = self.next_offset();
                    for split in splits {
                        self.patch(split, make_split(quant.greedy, split + 1, exit));
                    }
                }
            }
            Node::CaptureGroup(contents, group, ..) => {
                let group = *group as usize;
                self.emit_insn(Insn::Save(group * 2))?;
                self.emit_node(contents)?;
                self.emit_insn(Insn::Save(group * 2 + 1))?;
            }
        }
        Ok(())
    }
}

/// Check that a search tracking every group of \p cr stays within the memory
/// implied by \p size_limit.
fn check_slot_table(cr: &CompiledRegex, size_limit: usize) -> Result<(), Error> {
    let limit = size_limit.saturating_mul(SLOT_TABLE_FACTOR);
    let entries = cr.insns.len().saturating_mul(cr.slot_count());
    if entries > limit {
        return Err(Error::new(
            ErrorKind::Compile,
            format!(
                "Too many capture groups for program size ({} slot entries, limit is {})",
                entries, limit
            ),
            None,
        ));
    }
    Ok(())
}

/// Compile the given IR to a CompiledRegex.
/// The program has the shape `Save(0) body Save(1) Goal`.
pub fn emit(re: &ir::Regex, size_limit: usize) -> Result<CompiledRegex, Error> {
    let mut emitter = Emitter {
        insns: Vec::new(),
        brackets: Vec::new(),
        size_limit,
    };
    emitter.emit_insn(Insn::Save(0))?;
    emitter.emit_node(&re.node)?;
    emitter.emit_insn(Insn::Save(1))?;
    emitter.emit_insn(Insn::Goal)?;

    let group_names: Arc<[Option<Box<str>>]> = re
        .group_names
        .iter()
        .map(|name| name.as_deref().map(Box::from))
        .collect();
    let cr = CompiledRegex {
        insns: emitter.insns,
        brackets: emitter.brackets,
        start_pred: startpredicate::predicate_for_re(re),
        group_names,
        flags: re.flags,
    };
    check_slot_table(&cr, size_limit)?;
    Ok(cr)
}
