//! The domain store: for each slot, the words that are still possible.
//!
//! Domains only ever shrink. Node consistency cuts them down to words of the right length, and
//! arc consistency removes words that can't agree with any word in a crossing slot. Each domain is
//! kept in ascending `WordId` order, which is also lexicographic word order.

use crate::puzzle::{Puzzle, SlotId, WordId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    options: Vec<Vec<WordId>>,
}

impl Domains {
    /// Every slot starts with the full word list.
    pub fn new(puzzle: &Puzzle) -> Domains {
        Domains {
            options: (0..puzzle.slot_count()).map(|_| (0..puzzle.words.len()).collect()).collect(),
        }
    }

    /// Build domains from explicit per-slot option lists, e.g. to replay a known state.
    pub fn from_options(options: Vec<Vec<WordId>>) -> Domains {
        let options = options
            .into_iter()
            .map(|mut slot_options| {
                slot_options.sort_unstable();
                slot_options.dedup();
                slot_options
            })
            .collect();

        Domains { options }
    }

    /// Remove every word whose length doesn't match its slot's length.
    pub fn enforce_node_consistency(&mut self, puzzle: &Puzzle) {
        for (slot_id, slot_options) in self.options.iter_mut().enumerate() {
            let length = puzzle.variable(slot_id).length;
            slot_options.retain(|&word_id| puzzle.word(word_id).length() == length);
        }
    }

    pub fn slot_count(&self) -> usize {
        self.options.len()
    }

    pub fn options(&self, slot_id: SlotId) -> &[WordId] {
        &self.options[slot_id]
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.options[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.options[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options[slot_id].binary_search(&word_id).is_ok()
    }

    /// The first slot (by id) with nothing left in its domain.
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.options.iter().position(Vec::is_empty)
    }

    /// The number of options summed over all slots.
    pub fn total_options(&self) -> usize {
        self.options.iter().map(Vec::len).sum()
    }

    /// Is every slot's domain a subset of the corresponding domain in `other`?
    pub fn is_subset_of(&self, other: &Domains) -> bool {
        self.options.len() == other.options.len()
            && self.options.iter().enumerate().all(|(slot_id, slot_options)| {
                slot_options.iter().all(|&word_id| other.contains(slot_id, word_id))
            })
    }

    /// The remaining words for a slot, as strings.
    pub fn words<'p>(&self, puzzle: &'p Puzzle, slot_id: SlotId) -> Vec<&'p str> {
        self.options[slot_id].iter().map(|&word_id| puzzle.word(word_id).string.as_str()).collect()
    }

    /// Keep only the options of `slot_id` for which `keep` returns true, returning how many were
    /// removed.
    pub(crate) fn retain<F>(&mut self, slot_id: SlotId, mut keep: F) -> usize
    where
        F: FnMut(WordId) -> bool,
    {
        let slot_options = &mut self.options[slot_id];
        let before = slot_options.len();
        slot_options.retain(|&word_id| keep(word_id));
        before - slot_options.len()
    }
}

/// Seed every slot with the word list and enforce node consistency.
pub fn initialize_domains(puzzle: &Puzzle) -> Domains {
    let mut domains = Domains::new(puzzle);
    domains.enforce_node_consistency(puzzle);
    domains
}
