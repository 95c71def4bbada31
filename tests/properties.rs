//! Property tests on small random puzzles: the filler against exhaustive enumeration, and the
//! invariants of arc consistency.

use proptest::prelude::*;

use crossfill::arc_consistency::enforce_arc_consistency;
use crossfill::domains::initialize_domains;
use crossfill::{solve, Puzzle, SlotId, WordId};

/// A random 3x3 structure.
fn arb_structure() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), 9).prop_map(|cells| {
        cells
            .chunks(3)
            .map(|row| row.iter().map(|&open| if open { '_' } else { '#' }).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn arb_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[AB]{2,3}", 0..6)
}

/// Does `choices` (slots `0..choices.len()`) fill the puzzle legally so far?
fn fits(puzzle: &Puzzle, choices: &[WordId], slot_id: SlotId, word_id: WordId) -> bool {
    if puzzle.word(word_id).length() != puzzle.variable(slot_id).length {
        return false;
    }
    if choices.contains(&word_id) {
        return false;
    }

    choices.iter().enumerate().all(|(other_slot_id, &other_word_id)| {
        match puzzle.overlap(slot_id, other_slot_id) {
            Some(overlap) => {
                puzzle.word(word_id).glyphs[overlap.cell]
                    == puzzle.word(other_word_id).glyphs[overlap.other_cell]
            }
            None => true,
        }
    })
}

/// Try every way of filling the slots in order.
fn brute_force(puzzle: &Puzzle, choices: &mut Vec<WordId>) -> bool {
    let slot_id = choices.len();
    if slot_id == puzzle.slot_count() {
        return true;
    }

    for word_id in 0..puzzle.words.len() {
        if fits(puzzle, choices, slot_id, word_id) {
            choices.push(word_id);
            if brute_force(puzzle, choices) {
                return true;
            }
            choices.pop();
        }
    }

    false
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// A fill exists exactly when `solve` finds one, and what it finds is legal.
    #[test]
    fn prop_solve_matches_brute_force(structure in arb_structure(), words in arb_words()) {
        let puzzle = Puzzle::from_structure(&structure, &words).unwrap();

        let expected = brute_force(&puzzle, &mut vec![]);
        let found = solve(&puzzle);

        prop_assert_eq!(found.is_some(), expected);

        if let Some(assignment) = found {
            prop_assert!(assignment.is_complete());

            let mut choices = vec![];
            for (slot_id, word_id) in assignment.iter() {
                prop_assert!(fits(&puzzle, &choices, slot_id, word_id));
                choices.push(word_id);
            }
        }
    }

    /// Arc consistency only shrinks domains, and a second pass changes nothing.
    #[test]
    fn prop_arc_consistency_shrinks_and_settles(structure in arb_structure(), words in arb_words()) {
        let puzzle = Puzzle::from_structure(&structure, &words).unwrap();
        let node_consistent = initialize_domains(&puzzle);
        let mut domains = node_consistent.clone();

        if enforce_arc_consistency(&puzzle, &mut domains, None).is_ok() {
            prop_assert!(domains.is_subset_of(&node_consistent));

            let settled = domains.clone();
            let second = enforce_arc_consistency(&puzzle, &mut domains, None);
            prop_assert!(second.is_ok());
            prop_assert_eq!(domains, settled);
        } else {
            prop_assert!(solve(&puzzle).is_none());
        }
    }
}
