//! Support for quickly finding potential match locations.
use crate::bytesearch::{ByteBitmap, LiteralPrefix};
use crate::codepointset::CodePointSet;
use crate::insn::StartPredicate;
use crate::ir;
use crate::ir::Node;
use crate::util::add_utf8_first_bytes_to_bitmap;

/// Check if a node is anchored to the start of the text.
/// Returns true if the node begins with a StartOfText anchor.
fn is_start_anchored(n: &Node) -> bool {
    match n {
        Node::Anchor(ir::AnchorType::StartOfText) => true,
        Node::Cat(nodes) => {
            // For concatenation, check if the first node is start-anchored
            nodes.first().is_some_and(is_start_anchored)
        }
        Node::CaptureGroup(child, ..) => is_start_anchored(child),
        Node::Alt(branches) => branches.iter().all(is_start_anchored),
        // Other nodes are not anchored
        _ => false,
    }
}

/// Convert the code point set to a first-byte bitmap.
/// That is, make a list of all of the possible first bytes of every contained
/// code point, and store that in a bitmap.
fn cps_to_first_byte_bitmap(input: &CodePointSet) -> ByteBitmap {
    let mut bitmap = ByteBitmap::default();
    for iv in input.intervals() {
        add_utf8_first_bytes_to_bitmap(*iv, &mut bitmap);
    }
    bitmap
}

/// The "IR" for a start predicate.
#[derive(Debug)]
enum AbstractStartPredicate {
    /// No predicate.
    Arbitrary,

    /// Sequence of non-empty bytes.
    Sequence(Vec<u8>),

    /// Set of bytes.
    Set(ByteBitmap),
}

impl AbstractStartPredicate {
    /// \return the disjunction of two predicates.
    /// That is, a predicate that matches x OR y.
    fn disjunction(x: Self, y: Self) -> Self {
        match (x, y) {
            (Self::Arbitrary, _) => Self::Arbitrary,
            (_, Self::Arbitrary) => Self::Arbitrary,

            (Self::Sequence(mut s1), Self::Sequence(s2)) => {
                // Compute the length of the shared prefix.
                let shared_len = s1.iter().zip(s2.iter()).take_while(|(a, b)| a == b).count();
                if shared_len > 0 {
                    // Use the shared prefix.
                    s1.truncate(shared_len);
                    Self::Sequence(s1)
                } else {
                    // Use a set of their first byte.
                    Self::Set(ByteBitmap::new(&[s1[0], s2[0]]))
                }
            }

            (Self::Set(mut s1), Self::Set(s2)) => {
                s1.bitor(&s2);
                Self::Set(s1)
            }

            (Self::Set(mut s), Self::Sequence(seq)) | (Self::Sequence(seq), Self::Set(mut s)) => {
                // Add first byte to set.
                s.set(seq[0]);
                Self::Set(s)
            }
        }
    }

    /// Resolve ourselves to a concrete start predicate.
    fn resolve(self) -> StartPredicate {
        match self {
            Self::Arbitrary => StartPredicate::Arbitrary,
            Self::Sequence(vals) if vals.is_empty() => StartPredicate::Arbitrary,
            Self::Sequence(vals) => StartPredicate::ByteSeq(LiteralPrefix::new(&vals)),
            Self::Set(bm) => match bm.count_bits() {
                // An empty set means nothing matches; a full one filters nothing.
                0 | 256 => StartPredicate::Arbitrary,
                _ => StartPredicate::ByteBracket(bm),
            },
        }
    }
}

/// Compute any start-predicate for a node.
/// If this returns None, then the node is zero-width (e.g. an anchor) and
/// does not contribute to the predicate.
/// If this returns Arbitrary, then there is no predicate.
fn compute_start_predicate(n: &Node) -> Option<AbstractStartPredicate> {
    let arbitrary = Some(AbstractStartPredicate::Arbitrary);
    match n {
        Node::Empty => arbitrary,

        Node::Char { c, icase: false } => {
            let mut buf = [0; 4];
            Some(AbstractStartPredicate::Sequence(
                c.encode_utf8(&mut buf).as_bytes().to_vec(),
            ))
        }

        // Case-insensitive chars can be matched by chars which fold to them,
        // which we do not enumerate.
        Node::Char { icase: true, .. } => arbitrary,

        // Cats extend a literal run as far as it goes, else return the first
        // non-None value, if any.
        Node::Cat(nodes) => {
            let mut run: Vec<u8> = Vec::new();
            for node in nodes {
                if let Node::Char { c, icase: false } = node {
                    let mut buf = [0; 4];
                    run.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    continue;
                }
                if node.is_zero_width() {
                    // Anchors between literal chars do not consume input.
                    continue;
                }
                if !run.is_empty() {
                    return Some(AbstractStartPredicate::Sequence(run));
                }
                return compute_start_predicate(node);
            }
            if run.is_empty() {
                None
            } else {
                Some(AbstractStartPredicate::Sequence(run))
            }
        }

        // MatchAny (aka .) is too common to do a fast prefix search for.
        Node::MatchAny | Node::MatchAnyExceptLineTerminator => arbitrary,

        // Zero-width assertions impose no start predicate.
        Node::Anchor(..) | Node::WordBoundary { .. } => None,

        // Capture groups delegate to their contents.
        Node::CaptureGroup(child, ..) => compute_start_predicate(child),

        Node::Loop { loopee, quant } => {
            if quant.min > 0 {
                compute_start_predicate(loopee)
            } else {
                arbitrary
            }
        }

        // Compute the disjunction of the predicates of our branches.
        Node::Alt(branches) => {
            let mut result: Option<AbstractStartPredicate> = None;
            for branch in branches {
                match compute_start_predicate(branch) {
                    // This indicates that one of our branches could match the
                    // empty string.
                    None => return arbitrary,
                    Some(pred) => {
                        result = Some(match result {
                            None => pred,
                            Some(prev) => AbstractStartPredicate::disjunction(prev, pred),
                        })
                    }
                }
            }
            result.or(arbitrary)
        }

        // Plain brackets get a bitmap. Brackets that consult the Unicode
        // oracle or case variants are not enumerated.
        Node::Bracket(bc) => {
            if !bc.is_plain() {
                return arbitrary;
            }
            let bitmap = if bc.invert {
                cps_to_first_byte_bitmap(&bc.cps.inverted())
            } else {
                cps_to_first_byte_bitmap(&bc.cps)
            };
            Some(AbstractStartPredicate::Set(bitmap))
        }
    }
}

/// \return the start predicate for a Regex.
pub fn predicate_for_re(re: &ir::Regex) -> StartPredicate {
    // If the regex is anchored to the start of the text we avoid string
    // searching entirely. Multiline ^ is a StartOfLine anchor and so does
    // not count.
    if is_start_anchored(&re.node) {
        return StartPredicate::StartAnchored;
    }
    if re.node.can_match_empty() {
        return StartPredicate::Arbitrary;
    }
    compute_start_predicate(&re.node)
        .unwrap_or(AbstractStartPredicate::Arbitrary)
        .resolve()
}
