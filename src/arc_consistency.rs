//! This module contains an implementation of the AC-3 algorithm for crossword slots. For our
//! purposes, the domains are arc-consistent when every word left for a slot has, for each crossing
//! slot, at least one remaining word that puts the same letter in the shared cell.
//!
//! We keep a FIFO queue of arcs `(x, y)`. Revising an arc removes the words of `x` that no word of
//! `y` supports; whenever that removes something, the arcs pointing *into* `x` from its other
//! neighbors have to be checked again, since their support may have just disappeared.

use bit_set::BitSet;
use log::{debug, trace};
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::puzzle::{Puzzle, SlotId};

/// An ordered pair of crossing slots `(x, y)`: "make `x` consistent with `y`".
pub type ConstraintArc = (SlotId, SlotId);

/// Data structure tracking which arcs we still need to revise. An arc that's already waiting isn't
/// added a second time; when it comes up it will be revised against the latest domains anyway.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<ConstraintArc>,
    queued: BitSet,
    slot_count: usize,
}

impl ConsistencyQueue {
    fn new(slot_count: usize) -> ConsistencyQueue {
        ConsistencyQueue {
            queue: VecDeque::new(),
            queued: BitSet::with_capacity(slot_count * slot_count),
            slot_count,
        }
    }

    fn with_initial_arcs<Arcs>(slot_count: usize, arcs: Arcs) -> ConsistencyQueue
    where
        Arcs: IntoIterator<Item = ConstraintArc>,
    {
        let mut queue = ConsistencyQueue::new(slot_count);
        for arc in arcs {
            queue.enqueue(arc);
        }
        queue
    }

    fn key(&self, (x, y): ConstraintArc) -> usize {
        x * self.slot_count + y
    }

    fn pop_front(&mut self) -> Option<ConstraintArc> {
        let arc = self.queue.pop_front()?;
        let key = self.key(arc);
        self.queued.remove(key);
        Some(arc)
    }

    fn enqueue(&mut self, arc: ConstraintArc) {
        let key = self.key(arc);
        if self.queued.insert(key) {
            self.queue.push_back(arc);
        }
    }
}

/// Every arc in the puzzle: `(x, y)` for each slot `x` and each slot `y` crossing it.
pub fn all_arcs(puzzle: &Puzzle) -> Vec<ConstraintArc> {
    (0..puzzle.slot_count())
        .flat_map(|x| puzzle.neighbors(x).map(move |y| (x, y)))
        .collect()
}

/// Results from a successful call to `enforce_arc_consistency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many revisions actually removed something.
    pub revisions: usize,
    /// How many words were removed across all slots.
    pub eliminations: usize,
}

/// Results from a failed call to `enforce_arc_consistency`: the slot whose domain was wiped out,
/// plus the work done up to that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
    pub revisions: usize,
    pub eliminations: usize,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Make `x` arc consistent with `y`: remove every word of `x` whose letter at the shared cell
/// doesn't appear at the matching cell of any word left for `y`. Returns true if anything was
/// removed. Slots that don't cross are trivially consistent.
pub fn revise(puzzle: &Puzzle, domains: &mut Domains, x: SlotId, y: SlotId) -> bool {
    let Some(overlap) = puzzle.overlap(x, y) else {
        return false;
    };

    // The letters `y` can still supply at the crossing.
    let supported: HashSet<char> = domains
        .options(y)
        .iter()
        .filter_map(|&word_id| puzzle.word(word_id).glyphs.get(overlap.other_cell).copied())
        .collect();

    let removed = domains.retain(x, |word_id| {
        puzzle
            .word(word_id)
            .glyphs
            .get(overlap.cell)
            .is_some_and(|glyph| supported.contains(glyph))
    });

    removed > 0
}

/// Prune `domains` until every arc is consistent. If `initial_arcs` is `None`, start from every
/// arc in the puzzle; otherwise start from just those arcs (which must name slots of this
/// puzzle).
///
/// Returns a failure as soon as any slot's domain becomes empty, since no fill is possible from
/// there. Running this again on already-consistent domains changes nothing.
pub fn enforce_arc_consistency(
    puzzle: &Puzzle,
    domains: &mut Domains,
    initial_arcs: Option<&[ConstraintArc]>,
) -> ArcConsistencyResult {
    let slot_count = puzzle.slot_count();
    let mut queue = match initial_arcs {
        Some(arcs) => ConsistencyQueue::with_initial_arcs(slot_count, arcs.iter().copied()),
        None => ConsistencyQueue::with_initial_arcs(slot_count, all_arcs(puzzle)),
    };

    let mut revisions = 0;
    let mut eliminations = 0;

    while let Some((x, y)) = queue.pop_front() {
        let before = domains.len(x);
        if !revise(puzzle, domains, x, y) {
            continue;
        }

        revisions += 1;
        eliminations += before - domains.len(x);
        trace!("Revised {} against {}: {} -> {} options", x, y, before, domains.len(x));

        if domains.is_empty(x) {
            debug!("Arc consistency wiped out slot {}", puzzle.variable(x));
            return Err(ArcConsistencyFailure { slot_id: x, revisions, eliminations });
        }

        for z in puzzle.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    debug!("Arc consistency reached after {} revisions ({} eliminations)", revisions, eliminations);
    Ok(ArcConsistencySuccess { revisions, eliminations })
}
