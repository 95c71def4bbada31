//! Errors raised while loading or validating a puzzle description, or saving a filled grid.
//!
//! # Error Codes
//!
//! - P001: `Io` (A structure or word file couldn't be read)
//! - P002: `DuplicateVariable` (The same slot was listed twice)
//! - P003: `UnknownVariable` (An overlap names a slot that isn't in the puzzle)
//! - P004: `SelfOverlap` (An overlap pairs a slot with itself)
//! - P005: `OverlapOutOfBounds` (An overlap index is past the end of its slot)
//! - P006: `ContradictoryOverlap` (The two directions of an overlap disagree)
//! - P007: `SlotOutOfRange` (A slot's cells run past the largest grid coordinate)
//! - P008: `Image` (The PNG encoder failed while writing an image)
//! - P009: `ImageSize` (The grid is empty, or too big to draw as an image)
//!
//! Solving never produces a `PuzzleError`: once a [`Puzzle`](crate::puzzle::Puzzle) exists, an
//! unsolvable one is reported through [`FillFailure`](crate::solver::FillFailure).

use std::io;
use std::path::PathBuf;

use crate::puzzle::Variable;

#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("slot {variable} is listed more than once")]
    DuplicateVariable { variable: Variable },

    #[error("overlap refers to unknown slot {variable}")]
    UnknownVariable { variable: Variable },

    #[error("slot {variable} can't overlap itself")]
    SelfOverlap { variable: Variable },

    #[error("overlap index {index} is outside slot {variable}")]
    OverlapOutOfBounds { variable: Variable, index: usize },

    #[error("overlap between {first} and {second} is recorded inconsistently")]
    ContradictoryOverlap { first: Variable, second: Variable },

    #[error("slot {variable} runs past the largest grid coordinate")]
    SlotOutOfRange { variable: Variable },

    #[error("failed to write image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },

    #[error("can't draw a {rows}x{cols} grid as an image")]
    ImageSize { rows: usize, cols: usize },
}

impl PuzzleError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            PuzzleError::Io { .. } => "P001",
            PuzzleError::DuplicateVariable { .. } => "P002",
            PuzzleError::UnknownVariable { .. } => "P003",
            PuzzleError::SelfOverlap { .. } => "P004",
            PuzzleError::OverlapOutOfBounds { .. } => "P005",
            PuzzleError::ContradictoryOverlap { .. } => "P006",
            PuzzleError::SlotOutOfRange { .. } => "P007",
            PuzzleError::Image { .. } => "P008",
            PuzzleError::ImageSize { .. } => "P009",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            PuzzleError::Io { .. } => Some("Check that the path exists and is readable"),
            PuzzleError::DuplicateVariable { .. } => None,
            PuzzleError::UnknownVariable { .. } => {
                Some("Every slot named in the overlap table must also be in the slot list")
            }
            PuzzleError::SelfOverlap { .. } => None,
            PuzzleError::OverlapOutOfBounds { .. } => {
                Some("Overlap indices are zero-based positions within each slot")
            }
            PuzzleError::ContradictoryOverlap { .. } => Some(
                "If both (x, y) and (y, x) are given, their index pairs must be each other's swap",
            ),
            PuzzleError::SlotOutOfRange { .. } => None,
            PuzzleError::Image { .. } => None,
            PuzzleError::ImageSize { .. } => {
                Some("Images need at least one cell and at most u32::MAX pixels per side")
            }
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self.help() {
            Some(help) => format!("{} [{}]\n  help: {}", self, self.code(), help),
            None => format!("{} [{}]", self, self.code()),
        }
    }
}
