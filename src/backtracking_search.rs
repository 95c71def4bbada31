//! This module implements grid-filling as a depth-first backtracking search over assignments.
//!
//! At each step we pick the unassigned slot with the fewest remaining options (breaking ties by
//! how many slots cross it, then by position), rank its options by how few options they would
//! rule out in the unassigned crossing slots, and try them in that order. The first complete
//! assignment wins.
//!
//! The search doesn't re-run arc consistency after each choice; instead each candidate is checked
//! against the partial assignment before we descend. The domains are only read here, never
//! modified, so backing out of a choice only has to undo the assignment itself.

use bit_set::BitSet;
use instant::Duration;
use log::{debug, trace};
use std::cmp::Reverse;
use std::collections::HashSet;

use crate::domains::Domains;
use crate::puzzle::{Puzzle, SlotId, Variable, WordId};

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// How many times we chose a slot to fill.
    pub states: u64,
    /// How many times we took back a choice.
    pub backtracks: u64,
    /// How many arc revisions removed something before the search started.
    pub revisions: usize,
    /// How many words arc consistency removed before the search started.
    pub eliminations: usize,
    pub duration: Duration,
}

/// A (possibly partial) mapping from slots to words.
///
/// Entries are added and removed in stack order as the search advances and backs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    choices: Vec<Option<WordId>>,
    assigned_count: usize,
    /// Every word held by at least one slot.
    used_words: BitSet,
}

impl Assignment {
    /// An empty assignment sized for `puzzle`.
    pub fn new(puzzle: &Puzzle) -> Assignment {
        Assignment {
            choices: vec![None; puzzle.slot_count()],
            assigned_count: 0,
            used_words: BitSet::with_capacity(puzzle.words.len()),
        }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.choices[slot_id]
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.choices[slot_id].is_some()
    }

    pub fn len(&self) -> usize {
        self.assigned_count
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    /// Does every slot have a word?
    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.choices.len()
    }

    /// Put `word_id` in `slot_id`, replacing whatever was there.
    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) {
        match self.choices[slot_id].replace(word_id) {
            Some(previous) => self.release(previous),
            None => self.assigned_count += 1,
        }
        self.used_words.insert(word_id);
    }

    /// Clear `slot_id`, returning the word it held.
    pub fn unassign(&mut self, slot_id: SlotId) -> Option<WordId> {
        let removed = self.choices[slot_id].take();
        if let Some(word_id) = removed {
            self.assigned_count -= 1;
            self.release(word_id);
        }
        removed
    }

    /// Drop `word_id` from the used set once no slot holds it.
    fn release(&mut self, word_id: WordId) {
        if !self.choices.contains(&Some(word_id)) {
            self.used_words.remove(word_id);
        }
    }

    /// Does some slot other than `slot_id` hold `word_id`?
    fn is_used_elsewhere(&self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.used_words.contains(word_id) {
            return false;
        }
        if self.choices[slot_id] != Some(word_id) {
            return true;
        }
        self.iter()
            .any(|(other_slot_id, other_word_id)| other_slot_id != slot_id && other_word_id == word_id)
    }

    /// The assigned `(slot, word)` pairs, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.choices
            .iter()
            .enumerate()
            .filter_map(|(slot_id, choice)| choice.map(|word_id| (slot_id, word_id)))
    }

    /// The assigned slots and their words, resolved against `puzzle`.
    pub fn entries<'p>(
        &'p self,
        puzzle: &'p Puzzle,
    ) -> impl Iterator<Item = (&'p Variable, &'p str)> + 'p {
        self.iter()
            .map(|(slot_id, word_id)| (puzzle.variable(slot_id), puzzle.word(word_id).string.as_str()))
    }

    /// The word assigned to `variable`, if it's a slot of `puzzle` and has a word.
    pub fn word<'p>(&self, puzzle: &'p Puzzle, variable: &Variable) -> Option<&'p str> {
        let slot_id = puzzle.slot_id(variable)?;
        self.get(slot_id).map(|word_id| puzzle.word(word_id).string.as_str())
    }

    /// Would putting `word_id` in `slot_id` be consistent with the rest of the assignment? That
    /// requires that no *other* slot already holds the word, that the word has the slot's length,
    /// and that every assigned crossing slot has the same letter in the shared cell.
    pub fn is_consistent_choice(&self, puzzle: &Puzzle, slot_id: SlotId, word_id: WordId) -> bool {
        let word = puzzle.word(word_id);

        if word.length() != puzzle.variable(slot_id).length {
            return false;
        }

        if self.is_used_elsewhere(slot_id, word_id) {
            return false;
        }

        puzzle.slot_configs[slot_id].crossings.iter().all(|crossing| {
            match self.choices[crossing.other_slot_id] {
                Some(other_word_id) => {
                    word.glyphs.get(crossing.cell)
                        == puzzle.word(other_word_id).glyphs.get(crossing.other_slot_cell)
                }
                None => true,
            }
        })
    }

    /// Is the whole assignment consistent: distinct words, right lengths, and agreeing crossings?
    pub fn is_consistent(&self, puzzle: &Puzzle) -> bool {
        let mut seen: HashSet<WordId> = HashSet::with_capacity(self.len());

        self.iter().all(|(slot_id, word_id)| {
            seen.insert(word_id) && self.is_consistent_choice(puzzle, slot_id, word_id)
        })
    }
}

/// Choose the next slot to fill: the unassigned slot with the fewest remaining options, then the
/// most crossings, then the earliest position.
pub fn select_unassigned_variable(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..puzzle.slot_count())
        .filter(|&slot_id| !assignment.is_assigned(slot_id))
        .min_by_key(|&slot_id| {
            (domains.len(slot_id), Reverse(puzzle.degree(slot_id)), *puzzle.variable(slot_id))
        })
}

/// How many options would choosing `word_id` for `slot_id` rule out among the unassigned slots
/// crossing it?
pub fn count_eliminations(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
    word_id: WordId,
) -> usize {
    let word = puzzle.word(word_id);

    puzzle.slot_configs[slot_id]
        .crossings
        .iter()
        .filter(|crossing| !assignment.is_assigned(crossing.other_slot_id))
        .map(|crossing| {
            let glyph = word.glyphs.get(crossing.cell);

            domains
                .options(crossing.other_slot_id)
                .iter()
                .filter(|&&other_word_id| {
                    puzzle.word(other_word_id).glyphs.get(crossing.other_slot_cell) != glyph
                })
                .count()
        })
        .sum()
}

/// The options for `slot_id`, least constraining first. Ties keep word order, since `WordId`s
/// follow the sorted word list.
pub fn order_domain_values(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<WordId> {
    let mut scored: Vec<(usize, WordId)> = domains
        .options(slot_id)
        .iter()
        .map(|&word_id| (count_eliminations(puzzle, domains, assignment, slot_id, word_id), word_id))
        .collect();
    scored.sort_unstable();

    scored.into_iter().map(|(_, word_id)| word_id).collect()
}

/// One level of the search: the slot being filled, its ranked options, and how far through them
/// we are.
#[derive(Debug)]
struct Frame {
    slot_id: SlotId,
    candidates: Vec<WordId>,
    next_candidate: usize,
}

/// Extend `assignment` to a complete, consistent assignment using the options in `domains`, or
/// return `None` if that's impossible.
///
/// This is the usual recursive backtracking search, run on an explicit stack of frames so that
/// large puzzles don't depend on the native call stack. Each frame assigns a candidate, descends,
/// and unassigns it again if everything below it fails.
pub fn backtrack(
    puzzle: &Puzzle,
    domains: &Domains,
    mut assignment: Assignment,
    statistics: &mut Statistics,
) -> Option<Assignment> {
    let mut frames: Vec<Frame> = Vec::with_capacity(puzzle.slot_count());

    'descend: loop {
        let Some(slot_id) = select_unassigned_variable(puzzle, domains, &assignment) else {
            // Nothing left to fill.
            debug!("Found a fill after {} states and {} backtracks", statistics.states, statistics.backtracks);
            return Some(assignment);
        };

        statistics.states += 1;
        let candidates = order_domain_values(puzzle, domains, &assignment, slot_id);
        trace!("Filling {} with {} candidates", puzzle.variable(slot_id), candidates.len());
        frames.push(Frame { slot_id, candidates, next_candidate: 0 });

        while let Some(frame) = frames.last_mut() {
            // If this frame's slot is still assigned, everything below that choice failed.
            if assignment.unassign(frame.slot_id).is_some() {
                statistics.backtracks += 1;
            }

            while let Some(&word_id) = frame.candidates.get(frame.next_candidate) {
                frame.next_candidate += 1;

                if assignment.is_consistent_choice(puzzle, frame.slot_id, word_id) {
                    assignment.assign(frame.slot_id, word_id);
                    continue 'descend;
                }
            }

            // Out of options at this level; back out to the previous one.
            frames.pop();
        }

        debug!("Search exhausted after {} states and {} backtracks", statistics.states, statistics.backtracks);
        return None;
    }
}
