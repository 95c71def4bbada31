//! The entry point for filling a puzzle: node consistency, then arc consistency, then
//! backtracking search.

use instant::Instant;
use log::{debug, info};

use crate::arc_consistency::enforce_arc_consistency;
use crate::backtracking_search::{backtrack, Assignment, Statistics};
use crate::domains::initialize_domains;
use crate::puzzle::{Puzzle, Variable};

/// A complete, consistent assignment plus statistics about how we found it.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Why a puzzle couldn't be filled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FillFailure {
    /// Some slot had no possible words left before the search even started.
    #[error("no word can fill slot {variable}")]
    UnsatisfiableDomain { variable: Variable },

    /// The search tried everything consistent with the domains and found no fill.
    #[error("no consistent fill exists")]
    SearchExhausted,
}

impl FillFailure {
    /// Returns the error code for this failure
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            FillFailure::UnsatisfiableDomain { .. } => "F001",
            FillFailure::SearchExhausted => "F002",
        }
    }

    /// Returns a helpful suggestion for this failure
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            FillFailure::UnsatisfiableDomain { .. } => {
                Some("Add words of this slot's length, or words that fit its crossings")
            }
            FillFailure::SearchExhausted => None,
        }
    }
}

/// Search for a valid fill for the given puzzle.
pub fn find_fill(puzzle: &Puzzle) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = initialize_domains(puzzle);
    if let Some(slot_id) = domains.first_empty_slot() {
        debug!("No word has the length of slot {}", puzzle.variable(slot_id));
        return Err(FillFailure::UnsatisfiableDomain { variable: *puzzle.variable(slot_id) });
    }

    match enforce_arc_consistency(puzzle, &mut domains, None) {
        Ok(success) => {
            statistics.revisions = success.revisions;
            statistics.eliminations = success.eliminations;
        }
        Err(failure) => {
            return Err(FillFailure::UnsatisfiableDomain {
                variable: *puzzle.variable(failure.slot_id),
            });
        }
    }
    debug!("{} options left after arc consistency", domains.total_options());

    let assignment = backtrack(puzzle, &domains, Assignment::new(puzzle), &mut statistics)
        .ok_or(FillFailure::SearchExhausted)?;

    statistics.duration = start.elapsed();
    info!(
        "Filled {} slots in {:?} ({} states, {} backtracks)",
        puzzle.slot_count(),
        statistics.duration,
        statistics.states,
        statistics.backtracks
    );

    Ok(FillSuccess { statistics, assignment })
}

/// Fill the puzzle, returning the complete assignment or `None` if no fill exists.
pub fn solve(puzzle: &Puzzle) -> Option<Assignment> {
    find_fill(puzzle).ok().map(|success| success.assignment)
}
