//! The static description of a puzzle: its slots, where they cross, and the words that can fill
//! them. A `Puzzle` is built once, either from an explicit slot list and overlap table or from a
//! text structure, and is read-only for the rest of the solving process.

use log::{debug, info};
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Debug, Formatter};
use std::fs;
use std::path::Path;

use crate::errors::PuzzleError;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the puzzle's `slot_configs` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the puzzle's `words` field.
pub type WordId = usize;

/// Zero-indexed (row, col) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// The character marking an open cell in a text structure. Anything else is a block.
pub const OPEN_CELL: char = '_';

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A slot variable: a run of cells that holds one word. Two variables are the same slot exactly
/// when all four fields match.
///
/// The derived ordering (row, then column, then direction, then length) is the tie-break the
/// search uses when two slots are otherwise equally attractive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Variable {
        Variable { row, col, direction, length }
    }

    /// Generate the coords for each cell of this slot. Cells whose coordinates wouldn't fit in a
    /// `usize` are cut off.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> {
        let Variable { row, col, direction, length } = *self;
        (0..length).map_while(move |cell_idx| match direction {
            Direction::Across => Some((row, col.checked_add(cell_idx)?)),
            Direction::Down => Some((row.checked_add(cell_idx)?, col)),
        })
    }

    /// The number of rows and columns a grid needs to hold this slot, or `None` if that doesn't
    /// fit in a `usize`.
    pub fn extent(&self) -> Option<GridCoord> {
        let last = self.length.saturating_sub(1);
        let (row, col) = match self.direction {
            Direction::Across => (self.row, self.col.checked_add(last)?),
            Direction::Down => (self.row.checked_add(last)?, self.col),
        };
        Some((row.checked_add(1)?, col.checked_add(1)?))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {} : {}", self.row, self.col, self.direction, self.length)
    }
}

/// A word from the word list, with its characters split out so that crossings can be checked by
/// index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    pub fn new(string: String) -> Word {
        let glyphs = string.chars().collect();
        Word { string, glyphs }
    }

    /// The number of characters (not bytes) in the word.
    pub fn length(&self) -> usize {
        self.glyphs.len()
    }
}

/// The cell pair at which two slots cross: character `cell` of the first slot must equal
/// character `other_cell` of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Overlap {
    pub cell: usize,
    pub other_cell: usize,
}

impl Overlap {
    /// The same overlap seen from the other slot.
    pub fn reversed(self) -> Overlap {
        Overlap { cell: self.other_cell, other_cell: self.cell }
    }
}

/// A crossing between one slot and another, referencing the other slot's id and the location of
/// the intersection within both slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub cell: usize,
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A slot together with its crossings, sorted by `other_slot_id`.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub variable: Variable,
    pub crossings: SmallVec<[Crossing; MAX_SLOT_LENGTH]>,
}

/// Overlaps keyed by ordered slot pair. Both directions are always present.
type OverlapTable = HashMap<(SlotId, SlotId), Overlap>;

/// A fully-built puzzle description.
pub struct Puzzle {
    pub height: usize,
    pub width: usize,

    /// `structure[row][col]` is true for open cells. Only puzzles drawn from a text structure
    /// have one; a puzzle built from a slot list is just its slots.
    pub structure: Option<Vec<Vec<bool>>>,

    /// One entry per slot, sorted by `Variable` so that `SlotId` order matches slot position.
    pub slot_configs: Vec<SlotConfig>,

    /// The distinct words, sorted, so that `WordId` order matches lexicographic word order.
    pub words: Vec<Word>,
}

impl Debug for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("slot_configs", &self.slot_configs)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

/// Record an overlap in both directions, refusing to overwrite an entry that says something else.
fn insert_overlap(
    table: &mut OverlapTable,
    variables: &[Variable],
    slot_id: SlotId,
    other_slot_id: SlotId,
    overlap: Overlap,
) -> Result<(), PuzzleError> {
    for (key, value) in [
        ((slot_id, other_slot_id), overlap),
        ((other_slot_id, slot_id), overlap.reversed()),
    ] {
        match table.get(&key) {
            Some(existing) if *existing != value => {
                return Err(PuzzleError::ContradictoryOverlap {
                    first: variables[key.0],
                    second: variables[key.1],
                });
            }
            Some(_) => {}
            None => {
                table.insert(key, value);
            }
        }
    }
    Ok(())
}

impl Puzzle {
    /// Build a puzzle from an explicit slot list and overlap table.
    ///
    /// Each overlap entry `((x, y), (i, j))` says that character `i` of `x` equals character `j`
    /// of `y`. Either direction of a pair may be given (or both, as long as they agree); pairs
    /// that aren't listed don't overlap. Words are used exactly as given, minus duplicates.
    ///
    /// `height` and `width` cover every slot. Slots whose cells run past `usize::MAX` are
    /// rejected.
    pub fn new<Overlaps, Words>(
        variables: Vec<Variable>,
        overlaps: Overlaps,
        words: Words,
    ) -> Result<Puzzle, PuzzleError>
    where
        Overlaps: IntoIterator<Item = ((Variable, Variable), (usize, usize))>,
        Words: IntoIterator,
        Words::Item: Into<String>,
    {
        let mut variables = variables;
        variables.sort();
        if let Some(pair) = variables.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(PuzzleError::DuplicateVariable { variable: pair[0] });
        }

        let (mut height, mut width) = (0, 0);
        for variable in &variables {
            let (rows, cols) =
                variable.extent().ok_or(PuzzleError::SlotOutOfRange { variable: *variable })?;
            height = height.max(rows);
            width = width.max(cols);
        }

        let slot_id_of = |variable: &Variable| {
            variables
                .binary_search(variable)
                .map_err(|_| PuzzleError::UnknownVariable { variable: *variable })
        };

        let mut table = OverlapTable::new();
        for ((first, second), (cell, other_cell)) in overlaps {
            let slot_id = slot_id_of(&first)?;
            let other_slot_id = slot_id_of(&second)?;

            if slot_id == other_slot_id {
                return Err(PuzzleError::SelfOverlap { variable: first });
            }
            if cell >= first.length {
                return Err(PuzzleError::OverlapOutOfBounds { variable: first, index: cell });
            }
            if other_cell >= second.length {
                return Err(PuzzleError::OverlapOutOfBounds { variable: second, index: other_cell });
            }

            insert_overlap(&mut table, &variables, slot_id, other_slot_id, Overlap { cell, other_cell })?;
        }

        let words = words.into_iter().map(Into::into);
        Ok(Puzzle::assemble(height, width, None, variables, table, words))
    }

    /// Build a puzzle from a text structure, with `_` representing open cells and any other
    /// character representing a block, plus a word list. Words are upper-cased.
    ///
    /// Lines shorter than the longest one are padded with blocks. Every maximal run of two or more
    /// open cells becomes a slot.
    pub fn from_structure<Words>(structure: &str, words: Words) -> Result<Puzzle, PuzzleError>
    where
        Words: IntoIterator,
        Words::Item: AsRef<str>,
    {
        let lines: Vec<Vec<char>> = structure.lines().map(|line| line.chars().collect()).collect();
        let height = lines.len();
        let width = lines.iter().map(Vec::len).max().unwrap_or(0);

        let structure: Vec<Vec<bool>> = lines
            .iter()
            .map(|line| (0..width).map(|col| line.get(col) == Some(&OPEN_CELL)).collect())
            .collect();

        let mut variables: Vec<Variable> = vec![];
        for row in 0..height {
            for col in 0..width {
                if !structure[row][col] {
                    continue;
                }

                let starts_down = row == 0 || !structure[row - 1][col];
                if starts_down {
                    let length = (row..height).take_while(|&r| structure[r][col]).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Down, length));
                    }
                }

                let starts_across = col == 0 || !structure[row][col - 1];
                if starts_across {
                    let length = (col..width).take_while(|&c| structure[row][c]).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Across, length));
                    }
                }
            }
        }
        variables.sort();

        // Build a map from cell location to the slots passing through it, which we can then use
        // to calculate crossings.
        let mut entries_by_cell: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();
        for (slot_id, variable) in variables.iter().enumerate() {
            for (cell_idx, loc) in variable.cells().enumerate() {
                entries_by_cell.entry(loc).or_default().push((slot_id, cell_idx));
            }
        }

        let mut table = OverlapTable::new();
        for entries in entries_by_cell.values() {
            for (idx, &(slot_id, cell)) in entries.iter().enumerate() {
                for &(other_slot_id, other_cell) in &entries[idx + 1..] {
                    insert_overlap(&mut table, &variables, slot_id, other_slot_id, Overlap { cell, other_cell })?;
                }
            }
        }

        let words = words.into_iter().map(|word| word.as_ref().trim().to_uppercase());

        Ok(Puzzle::assemble(height, width, Some(structure), variables, table, words))
    }

    /// Read a structure file and a word file (one word per line) and build a puzzle from them.
    pub fn from_files(
        structure_path: impl AsRef<Path>,
        words_path: impl AsRef<Path>,
    ) -> Result<Puzzle, PuzzleError> {
        let read = |path: &Path| {
            fs::read_to_string(path)
                .map_err(|source| PuzzleError::Io { path: path.to_path_buf(), source })
        };

        let structure = read(structure_path.as_ref())?;
        let words = read(words_path.as_ref())?;

        let puzzle = Puzzle::from_structure(&structure, words.lines())?;
        info!(
            "Loaded {}x{} puzzle with {} slots and {} words",
            puzzle.height,
            puzzle.width,
            puzzle.slot_count(),
            puzzle.words.len()
        );
        Ok(puzzle)
    }

    /// Final construction step shared by the public constructors. `variables` must already be
    /// sorted and `table` must hold both directions of every overlap.
    fn assemble<Words>(
        height: usize,
        width: usize,
        structure: Option<Vec<Vec<bool>>>,
        variables: Vec<Variable>,
        table: OverlapTable,
        words: Words,
    ) -> Puzzle
    where
        Words: Iterator<Item = String>,
    {
        let words: Vec<Word> = words
            .filter(|word| !word.is_empty())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .map(Word::new)
            .collect();

        let slot_configs: Vec<SlotConfig> = variables
            .iter()
            .enumerate()
            .map(|(id, &variable)| {
                let mut crossings: SmallVec<[Crossing; MAX_SLOT_LENGTH]> = table
                    .iter()
                    .filter(|((slot_id, _), _)| *slot_id == id)
                    .map(|(&(_, other_slot_id), overlap)| Crossing {
                        cell: overlap.cell,
                        other_slot_id,
                        other_slot_cell: overlap.other_cell,
                    })
                    .collect();
                crossings.sort_by_key(|crossing| crossing.other_slot_id);

                SlotConfig { id, variable, crossings }
            })
            .collect();

        debug!(
            "Assembled puzzle: {} slots, {} crossings, {} distinct words",
            slot_configs.len(),
            table.len() / 2,
            words.len()
        );

        Puzzle {
            height,
            width,
            structure,
            slot_configs,
            words,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    pub fn variable(&self, slot_id: SlotId) -> &Variable {
        &self.slot_configs[slot_id].variable
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.slot_configs.iter().map(|slot_config| &slot_config.variable)
    }

    /// Look up the id of a slot by its position, length and direction.
    pub fn slot_id(&self, variable: &Variable) -> Option<SlotId> {
        self.slot_configs
            .binary_search_by(|slot_config| slot_config.variable.cmp(variable))
            .ok()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// Look up the id of a word, if it's in the word list.
    pub fn word_id(&self, word: &str) -> Option<WordId> {
        self.words.binary_search_by(|candidate| candidate.string.as_str().cmp(word)).ok()
    }

    /// The overlap between two slots, from the point of view of `slot_id`, or `None` if they
    /// don't cross.
    pub fn overlap(&self, slot_id: SlotId, other_slot_id: SlotId) -> Option<Overlap> {
        self.slot_configs[slot_id]
            .crossings
            .iter()
            .find(|crossing| crossing.other_slot_id == other_slot_id)
            .map(|crossing| Overlap { cell: crossing.cell, other_cell: crossing.other_slot_cell })
    }

    /// The slots crossing `slot_id`, in ascending order.
    pub fn neighbors(&self, slot_id: SlotId) -> impl Iterator<Item = SlotId> + '_ {
        self.slot_configs[slot_id].crossings.iter().map(|crossing| crossing.other_slot_id)
    }

    /// The number of slots crossing `slot_id`.
    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.slot_configs[slot_id].crossings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Direction::{Across, Down};

    /// #___#
    /// #_##_
    /// #_##_
    /// #_##_
    /// #____
    const STRUCTURE: &str = "#___#\n#_##_\n#_##_\n#_##_\n#____\n";

    #[test]
    fn test_from_structure_finds_slots() {
        let puzzle = Puzzle::from_structure(STRUCTURE, ["one"]).unwrap();

        let variables: Vec<Variable> = puzzle.variables().cloned().collect();
        assert_eq!(
            variables,
            vec![
                Variable::new(0, 1, Across, 3),
                Variable::new(0, 1, Down, 5),
                Variable::new(1, 4, Down, 4),
                Variable::new(4, 1, Across, 4),
            ]
        );
        assert_eq!(puzzle.height, 5);
        assert_eq!(puzzle.width, 5);
    }

    #[test]
    fn test_from_structure_computes_overlaps_both_ways() {
        let puzzle = Puzzle::from_structure(STRUCTURE, ["one"]).unwrap();

        let top = puzzle.slot_id(&Variable::new(0, 1, Across, 3)).unwrap();
        let left = puzzle.slot_id(&Variable::new(0, 1, Down, 5)).unwrap();
        let right = puzzle.slot_id(&Variable::new(1, 4, Down, 4)).unwrap();
        let bottom = puzzle.slot_id(&Variable::new(4, 1, Across, 4)).unwrap();

        assert_eq!(puzzle.overlap(top, left), Some(Overlap { cell: 0, other_cell: 0 }));
        assert_eq!(puzzle.overlap(left, bottom), Some(Overlap { cell: 4, other_cell: 0 }));
        assert_eq!(puzzle.overlap(bottom, left), Some(Overlap { cell: 0, other_cell: 4 }));
        assert_eq!(puzzle.overlap(right, bottom), Some(Overlap { cell: 3, other_cell: 3 }));
        assert_eq!(puzzle.overlap(top, right), None);
        assert_eq!(puzzle.overlap(top, bottom), None);

        assert_eq!(puzzle.neighbors(left).collect::<Vec<_>>(), vec![top, bottom]);
        assert_eq!(puzzle.degree(bottom), 2);
        assert_eq!(puzzle.degree(top), 1);
    }

    #[test]
    fn test_from_structure_pads_short_lines_and_normalizes_words() {
        let puzzle = Puzzle::from_structure("___\n_", ["cat", "CAT", " dog\r", ""]).unwrap();

        assert_eq!(puzzle.width, 3);
        assert_eq!(puzzle.structure, Some(vec![vec![true, true, true], vec![true, false, false]]));
        assert_eq!(
            puzzle.words.iter().map(|w| w.string.as_str()).collect::<Vec<_>>(),
            vec!["CAT", "DOG"]
        );
        assert_eq!(puzzle.word_id("DOG"), Some(1));
        assert_eq!(puzzle.word_id("cat"), None);
    }

    #[test]
    fn test_single_cells_are_not_slots() {
        let puzzle = Puzzle::from_structure("_#_\n###\n_#_", Vec::<String>::new()).unwrap();
        assert_eq!(puzzle.slot_count(), 0);
    }

    #[test]
    fn test_new_accepts_one_direction_of_an_overlap() {
        let a = Variable::new(0, 0, Across, 3);
        let b = Variable::new(0, 1, Down, 3);

        let puzzle = Puzzle::new(vec![b, a], [((a, b), (1, 0))], ["CAT", "AGE"]).unwrap();

        let a_id = puzzle.slot_id(&a).unwrap();
        let b_id = puzzle.slot_id(&b).unwrap();
        assert_eq!(puzzle.overlap(a_id, b_id), Some(Overlap { cell: 1, other_cell: 0 }));
        assert_eq!(puzzle.overlap(b_id, a_id), Some(Overlap { cell: 0, other_cell: 1 }));
        assert_eq!((puzzle.height, puzzle.width), (3, 3));
        assert!(puzzle.structure.is_none());
    }

    #[test]
    fn test_new_rejects_slots_past_the_largest_coordinate() {
        let no_overlaps: [((Variable, Variable), (usize, usize)); 0] = [];

        let at_the_edge = Variable::new(usize::MAX, 0, Across, 2);
        assert!(matches!(
            Puzzle::new(vec![at_the_edge], no_overlaps, ["AB"]),
            Err(PuzzleError::SlotOutOfRange { variable }) if variable == at_the_edge
        ));

        let running_off = Variable::new(0, usize::MAX - 1, Across, 3);
        assert!(matches!(
            Puzzle::new(vec![running_off], no_overlaps, ["ABC"]),
            Err(PuzzleError::SlotOutOfRange { .. })
        ));
    }

    #[test]
    fn test_new_with_distant_slots_stays_sparse() {
        let no_overlaps: [((Variable, Variable), (usize, usize)); 0] = [];
        let far = Variable::new(1_000_000, 1_000_000, Down, 2);

        let puzzle = Puzzle::new(vec![far], no_overlaps, ["AB"]).unwrap();

        assert_eq!((puzzle.height, puzzle.width), (1_000_002, 1_000_001));
        assert!(puzzle.structure.is_none());
    }

    #[test]
    fn test_cells_and_extent_stop_at_the_largest_coordinate() {
        let variable = Variable::new(0, usize::MAX - 1, Across, 3);

        assert_eq!(variable.cells().count(), 2);
        assert_eq!(variable.extent(), None);
        assert_eq!(Variable::new(2, 3, Down, 4).extent(), Some((6, 4)));
    }

    #[test]
    fn test_new_rejects_malformed_tables() {
        let a = Variable::new(0, 0, Across, 3);
        let b = Variable::new(0, 1, Down, 3);
        let stray = Variable::new(5, 5, Down, 2);
        let no_words: [&str; 0] = [];
        let no_overlaps: [((Variable, Variable), (usize, usize)); 0] = [];

        assert!(matches!(
            Puzzle::new(vec![a, a], no_overlaps, no_words),
            Err(PuzzleError::DuplicateVariable { .. })
        ));
        assert!(matches!(
            Puzzle::new(vec![a, b], [((a, stray), (0, 0))], no_words),
            Err(PuzzleError::UnknownVariable { .. })
        ));
        assert!(matches!(
            Puzzle::new(vec![a, b], [((a, a), (0, 0))], no_words),
            Err(PuzzleError::SelfOverlap { .. })
        ));
        assert!(matches!(
            Puzzle::new(vec![a, b], [((a, b), (3, 0))], no_words),
            Err(PuzzleError::OverlapOutOfBounds { index: 3, .. })
        ));
        assert!(matches!(
            Puzzle::new(vec![a, b], [((a, b), (1, 0)), ((b, a), (0, 2))], no_words),
            Err(PuzzleError::ContradictoryOverlap { .. })
        ));
        assert!(Puzzle::new(vec![a, b], [((a, b), (1, 0)), ((b, a), (0, 1))], no_words).is_ok());
    }

    #[test]
    fn test_variable_equality_is_structural() {
        assert_eq!(Variable::new(1, 2, Down, 3), Variable::new(1, 2, Down, 3));
        assert_ne!(Variable::new(1, 2, Down, 3), Variable::new(1, 2, Across, 3));
        assert_ne!(Variable::new(1, 2, Down, 3), Variable::new(1, 2, Down, 4));
        assert!(Variable::new(0, 5, Down, 2) < Variable::new(1, 0, Across, 2));
        assert_eq!(Variable::new(1, 2, Down, 3).to_string(), "(1, 2) down : 3");
    }

    #[test]
    fn test_word_length_counts_chars() {
        assert_eq!(Word::new("ÉTÉ".to_string()).length(), 3);
    }
}
