//! Fill-in crossword solving as a constraint satisfaction problem.
//!
//! A [`Puzzle`](puzzle::Puzzle) describes the slots of a grid, how they cross, and the words that
//! may be placed in them. Solving happens in three stages:
//!
//! - **Node consistency** ([`domains`]): each slot starts with the words of its length.
//! - **Arc consistency** ([`arc_consistency`]): AC-3 removes words that can't agree with any word
//!   in a crossing slot.
//! - **Backtracking search** ([`backtracking_search`]): depth-first assignment using the
//!   minimum-remaining-values and degree heuristics to pick slots and least-constraining-value to
//!   order words.
//!
//! [`solver::solve`] runs all three and returns the first complete assignment it finds, or `None`.

pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod errors;
pub mod logging;
pub mod puzzle;
pub mod render;
pub mod solver;

/// The expected maximum length for a single slot. Longer slots work fine, they just spill their
/// per-cell data onto the heap.
pub const MAX_SLOT_LENGTH: usize = 21;

pub use backtracking_search::{Assignment, Statistics};
pub use domains::Domains;
pub use errors::PuzzleError;
pub use puzzle::{Direction, Puzzle, SlotId, Variable, WordId};
pub use solver::{find_fill, solve, FillFailure, FillSuccess};
