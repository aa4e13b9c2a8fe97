//! PikeVM regex execution engine

use crate::api::Input;
use crate::bytesearch::ByteSearcher;
use crate::exec::MatchError;
use crate::folds;
use crate::insn::{CompiledRegex, Insn, StartPredicate};
use crate::sparse_set::SparseSet;
use crate::types::is_word_char;
use crate::util::{char_at, char_before, DebugCheckIndex};
use log::trace;

/// A capture slot: a byte offset, or None if the slot was not reached.
pub type Slot = Option<usize>;

/// A list of threads, at most one per instruction.
/// Iteration order of the set is thread priority.
#[derive(Debug, Clone)]
struct Threads {
    set: SparseSet,

    /// Capture slots for each thread, `slots_per_thread` per instruction.
    slots: Vec<Slot>,
    slots_per_thread: usize,
}

impl Threads {
    fn new() -> Threads {
        Threads {
            set: SparseSet::new(0),
            slots: Vec::new(),
            slots_per_thread: 0,
        }
    }

    fn resize(&mut self, ninsns: usize, nslots: usize) {
        if self.set.capacity() != ninsns {
            self.set.resize(ninsns);
        }
        self.slots_per_thread = nslots;
        self.slots.resize(ninsns * nslots, None);
    }

    #[inline(always)]
    fn slots_for(&self, ip: usize) -> &[Slot] {
        let start = ip * self.slots_per_thread;
        self.slots.iat(start..start + self.slots_per_thread)
    }

    #[inline(always)]
    fn slots_for_mut(&mut self, ip: usize) -> &mut [Slot] {
        let start = ip * self.slots_per_thread;
        self.slots.mat(start..start + self.slots_per_thread)
    }
}

/// A frame on the epsilon-closure stack.
#[derive(Debug, Copy, Clone)]
enum FollowEpsilon {
    /// Follow epsilon transitions starting at an instruction.
    Explore(usize),

    /// Put a capture slot back the way it was before a Save.
    RestoreCapture { slot: usize, offset: Slot },
}

/// Scratch space for a search.
/// A Cache may be reused across searches with the regex that created it,
/// but must not be shared between concurrent searches.
#[derive(Debug, Clone)]
pub struct Cache {
    clist: Threads,
    nlist: Threads,
    stack: Vec<FollowEpsilon>,

    /// Slots of the thread that most recently reached Goal.
    slots: Vec<Slot>,

    /// Slots of the thread currently being explored.
    scratch: Vec<Slot>,
}

impl Cache {
    /// Create a cache for \p re.
    /// Capture slot tables are allocated by the first search which tracks
    /// slots, and only for as many slots as it tracks.
    pub fn new(re: &CompiledRegex) -> Cache {
        let mut cache = Cache {
            clist: Threads::new(),
            nlist: Threads::new(),
            stack: Vec::new(),
            slots: Vec::new(),
            scratch: Vec::new(),
        };
        cache.prepare(re.insns.len(), 0);
        cache
    }

    /// Size ourselves for a program of \p ninsns instructions, tracking
    /// \p nslots capture slots per thread.
    fn prepare(&mut self, ninsns: usize, nslots: usize) {
        self.clist.resize(ninsns, nslots);
        self.nlist.resize(ninsns, nslots);
        self.slots.clear();
        self.slots.resize(nslots, None);
        self.scratch.resize(nslots, None);
        self.stack.clear();
    }

    /// \return the slots of the last successful search.
    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

/// The immutable parts of a single search.
struct Searcher<'r, 't> {
    re: &'r CompiledRegex,
    text: &'t str,
}

impl Searcher<'_, '_> {
    /// Follow epsilon transitions from \p ip at position \p at, adding every
    /// reached instruction to \p list. \p thread_slots holds the slots of the
    /// thread being added; it is restored to its original contents on return.
    fn add_thread(
        &self,
        list: &mut Threads,
        stack: &mut Vec<FollowEpsilon>,
        ip: usize,
        at: usize,
        thread_slots: &mut [Slot],
    ) {
        stack.push(FollowEpsilon::Explore(ip));
        while let Some(frame) = stack.pop() {
            match frame {
                FollowEpsilon::Explore(ip) => self.explore(list, stack, ip, at, thread_slots),
                FollowEpsilon::RestoreCapture { slot, offset } => {
                    *thread_slots.mat(slot) = offset;
                }
            }
        }
    }

    fn explore(
        &self,
        list: &mut Threads,
        stack: &mut Vec<FollowEpsilon>,
        mut ip: usize,
        at: usize,
        thread_slots: &mut [Slot],
    ) {
        macro_rules! next_or_stop {
            ($e:expr) => {
                if $e {
                    ip += 1;
                    continue;
                } else {
                    return;
                }
            };
        }
        let text = self.text;
        loop {
            // A thread already at this instruction has priority over us.
            if !list.set.insert(ip) {
                return;
            }
            match *self.re.insns.iat(ip) {
                Insn::Jump { target } => ip = target,
                Insn::Split { primary, secondary } => {
                    stack.push(FollowEpsilon::Explore(secondary));
                    ip = primary;
                }
                Insn::Save(slot) => {
                    // Slots beyond what the caller asked for are not tracked.
                    if slot < thread_slots.len() {
                        stack.push(FollowEpsilon::RestoreCapture {
                            slot,
                            offset: thread_slots[slot],
                        });
                        thread_slots[slot] = Some(at);
                    }
                    ip += 1;
                }
                Insn::StartOfText => next_or_stop!(at == 0),
                Insn::EndOfText => next_or_stop!(at == text.len()),
                Insn::StartOfLine => next_or_stop!(at == 0 || text.as_bytes()[at - 1] == b'\n'),
                Insn::EndOfLine => {
                    next_or_stop!(at == text.len() || text.as_bytes()[at] == b'\n')
                }
                Insn::WordBoundary { invert, unicode } => {
                    let before = char_before(text, at).is_some_and(|c| is_word_char(c, unicode));
                    let after = char_at(text, at).is_some_and(|c| is_word_char(c, unicode));
                    next_or_stop!((before != after) != invert)
                }
                Insn::Goal
                | Insn::Char(..)
                | Insn::CharICase(..)
                | Insn::Bracket(..)
                | Insn::MatchAny
                | Insn::MatchAnyExceptLineTerminator => {
                    // A thread waiting to consume input, or to finish.
                    list.slots_for_mut(ip).copy_from_slice(thread_slots);
                    return;
                }
            }
        }
    }

    /// \return whether the instruction at \p ip accepts the char \p c.
    #[inline(always)]
    fn step(&self, ip: usize, c: char) -> bool {
        match *self.re.insns.iat(ip) {
            Insn::Char(ch) => c == ch,
            Insn::CharICase(ch) => folds::fold(c) == ch,
            Insn::Bracket(idx) => self.re.brackets.iat(idx).matches(c),
            Insn::MatchAny => true,
            Insn::MatchAnyExceptLineTerminator => c != '\n',
            _ => false,
        }
    }

    /// \return the next position at or after \p at where a match could
    /// begin, or None if there is none.
    #[inline]
    fn next_candidate(&self, at: usize) -> Option<usize> {
        let rest = &self.text.as_bytes()[at..];
        match &self.re.start_pred {
            StartPredicate::Arbitrary => Some(at),
            StartPredicate::StartAnchored => (at == 0).then_some(0),
            StartPredicate::ByteSeq(seq) => seq.find_in(rest).map(|idx| at + idx),
            StartPredicate::ByteBracket(bm) => bm.find_in(rest).map(|idx| at + idx),
        }
    }
}

/// Run the program over \p input, tracking the first \p nslots capture slots.
/// On success the winning thread's slots are left in the cache.
/// With \p nslots of 0 the search stops at the first thread to reach Goal,
/// which is enough to answer whether there is a match.
pub fn search(
    re: &CompiledRegex,
    cache: &mut Cache,
    input: &Input,
    nslots: usize,
) -> Result<bool, MatchError> {
    debug_assert!(nslots <= re.slot_count());
    debug_assert!(input.text.is_char_boundary(input.start));
    cache.prepare(re.insns.len(), nslots);
    let Cache {
        clist,
        nlist,
        stack,
        slots,
        scratch,
    } = cache;
    clist.set.clear();
    nlist.set.clear();

    let searcher = Searcher {
        re,
        text: input.text,
    };
    let text = input.text;
    let anchored = input.anchored;
    let mut matched = false;
    let mut at = input.start;
    loop {
        if let Some(deadline) = input.deadline {
            if std::time::Instant::now() >= deadline {
                trace!("search timed out at offset {}", at);
                return Err(MatchError::Timeout);
            }
        }

        if clist.set.is_empty() {
            // No thread can continue. Stop if a match was found, or if no
            // new thread may start.
            if matched || (anchored && at > input.start) {
                break;
            }
            if !anchored {
                match searcher.next_candidate(at) {
                    Some(candidate) => at = candidate,
                    None => break,
                }
            }
        }

        // Start a new thread with the lowest priority.
        if !matched && (!anchored || at == input.start) {
            scratch.fill(None);
            searcher.add_thread(clist, stack, 0, at, scratch);
        }

        let c = char_at(text, at);
        let next_at = at + c.map_or(0, char::len_utf8);
        for i in 0..clist.set.len() {
            let ip = clist.set.get(i);
            if let Insn::Goal = re.insns.iat(ip) {
                if nslots == 0 {
                    return Ok(true);
                }
                // Lower priority threads are cut off.
                slots.copy_from_slice(clist.slots_for(ip));
                matched = true;
                break;
            }
            if let Some(c) = c {
                if searcher.step(ip, c) {
                    scratch.copy_from_slice(clist.slots_for(ip));
                    searcher.add_thread(nlist, stack, ip + 1, next_at, scratch);
                }
            }
        }
        if c.is_none() {
            break;
        }
        std::mem::swap(clist, nlist);
        nlist.set.clear();
        at = next_at;
    }
    if matched {
        trace!("match {:?}..{:?}", slots[0], slots[1]);
    }
    Ok(matched)
}
