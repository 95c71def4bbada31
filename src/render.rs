//! Turning a (possibly partial) assignment into a printable grid or a PNG image.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::backtracking_search::Assignment;
use crate::errors::PuzzleError;
use crate::puzzle::Puzzle;

/// The character used for blocked cells.
pub const BLOCK: char = '█';

/// Side length of one grid cell in an image, in pixels.
pub const CELL_SIZE: usize = 100;

/// Width of the black frame drawn around each open cell, in pixels.
pub const CELL_BORDER: usize = 2;

const INTERIOR_SIZE: usize = CELL_SIZE - 2 * CELL_BORDER;

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;
const GLYPH_SCALE: usize = 10;
const GLYPH_LEFT: usize = (INTERIOR_SIZE - GLYPH_WIDTH * GLYPH_SCALE) / 2;
const GLYPH_TOP: usize = (INTERIOR_SIZE - GLYPH_HEIGHT * GLYPH_SCALE) / 2;

pub type Rgb = [u8; 3];
const BLACK: Rgb = [0, 0, 0];
const WHITE: Rgb = [255, 255, 255];

/// A 5x7 bitmap, one byte per row with the leftmost pixel in bit 4.
type Glyph = [u8; GLYPH_HEIGHT];

/// Bitmaps for `A`-`Z` followed by `0`-`9`.
#[rustfmt::skip]
const GLYPHS: [Glyph; 36] = [
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
    [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

/// The bitmap for a letter or digit. Anything else has none and is left blank.
fn glyph(letter: char) -> Option<&'static Glyph> {
    match letter.to_ascii_uppercase() {
        c @ 'A'..='Z' => GLYPHS.get(c as usize - 'A' as usize),
        c @ '0'..='9' => GLYPHS.get(26 + c as usize - '0' as usize),
        _ => None,
    }
}

/// Lay the assigned words out on the puzzle's grid. Blocked cells are `None`; open cells hold
/// their letter, or a space if no assigned slot covers them.
///
/// A puzzle drawn from a text structure uses that structure. Otherwise the grid spans the slots'
/// cells, starting from the topmost row and leftmost column any slot uses.
pub fn letter_grid(puzzle: &Puzzle, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let (top, left, mut grid) = match &puzzle.structure {
        Some(structure) => {
            let grid: Vec<Vec<Option<char>>> = structure
                .iter()
                .map(|row| row.iter().map(|&open| open.then_some(' ')).collect())
                .collect();
            (0, 0, grid)
        }
        None => slot_grid(puzzle),
    };

    for (slot_id, word_id) in assignment.iter() {
        let word = puzzle.word(word_id);

        for ((row, col), &glyph) in puzzle.variable(slot_id).cells().zip(word.glyphs.iter()) {
            let cell = grid
                .get_mut(row.saturating_sub(top))
                .and_then(|cells| cells.get_mut(col.saturating_sub(left)));
            if let Some(cell) = cell {
                *cell = Some(glyph);
            }
        }
    }

    grid
}

/// A blank grid covering just the slots' bounding box, for puzzles without a drawn structure.
fn slot_grid(puzzle: &Puzzle) -> (usize, usize, Vec<Vec<Option<char>>>) {
    let top = puzzle.variables().map(|variable| variable.row).min().unwrap_or(0);
    let left = puzzle.variables().map(|variable| variable.col).min().unwrap_or(0);

    let mut grid = vec![vec![None; puzzle.width - left]; puzzle.height - top];
    for variable in puzzle.variables() {
        for (row, col) in variable.cells() {
            if let Some(cell) = grid.get_mut(row - top).and_then(|cells| cells.get_mut(col - left)) {
                *cell = Some(' ');
            }
        }
    }

    (top, left, grid)
}

/// Turn the given puzzle and assignment into a rendered string, one line per row.
pub fn render_grid(puzzle: &Puzzle, assignment: &Assignment) -> String {
    letter_grid(puzzle, assignment)
        .into_iter()
        .map(|row| row.into_iter().map(|cell| cell.unwrap_or(BLOCK)).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// An 8-bit RGB raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridImage {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl GridImage {
    /// The color at `(x, y)`, where `(0, 0)` is the top-left pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let start = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[start], self.pixels[start + 1], self.pixels[start + 2]]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, color: Rgb) {
        let stride = self.width as usize * 3;
        for row in y..y + height {
            let start = row * stride + x * 3;
            for pixel in self.pixels[start..start + width * 3].chunks_exact_mut(3) {
                pixel.copy_from_slice(&color);
            }
        }
    }

    fn draw_glyph(&mut self, x: usize, y: usize, glyph: &Glyph) {
        for (glyph_row, &bits) in glyph.iter().enumerate() {
            for glyph_col in 0..GLYPH_WIDTH {
                if bits & (1u8 << (GLYPH_WIDTH - 1 - glyph_col)) != 0 {
                    self.fill_rect(
                        x + GLYPH_LEFT + glyph_col * GLYPH_SCALE,
                        y + GLYPH_TOP + glyph_row * GLYPH_SCALE,
                        GLYPH_SCALE,
                        GLYPH_SCALE,
                        BLACK,
                    );
                }
            }
        }
    }
}

/// Draw the grid: black background and blocks, a white square inside each open cell, and each
/// assigned letter centered in its square.
pub fn render_image(puzzle: &Puzzle, assignment: &Assignment) -> Result<GridImage, PuzzleError> {
    let letters = letter_grid(puzzle, assignment);
    let rows = letters.len();
    let cols = letters.first().map_or(0, Vec::len);

    let side = |cells: usize| {
        cells
            .checked_mul(CELL_SIZE)
            .filter(|&pixels| pixels > 0)
            .and_then(|pixels| u32::try_from(pixels).ok())
    };
    let (Some(width), Some(height)) = (side(cols), side(rows)) else {
        return Err(PuzzleError::ImageSize { rows, cols });
    };
    let byte_count = (width as usize)
        .checked_mul(height as usize)
        .and_then(|count| count.checked_mul(3))
        .ok_or(PuzzleError::ImageSize { rows, cols })?;

    let mut image = GridImage { width, height, pixels: vec![0; byte_count] };

    for (row, cells) in letters.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            let Some(letter) = cell else {
                continue;
            };

            let x = col * CELL_SIZE + CELL_BORDER;
            let y = row * CELL_SIZE + CELL_BORDER;
            image.fill_rect(x, y, INTERIOR_SIZE, INTERIOR_SIZE, WHITE);
            if let Some(glyph) = glyph(*letter) {
                image.draw_glyph(x, y, glyph);
            }
        }
    }

    Ok(image)
}

/// Render the grid with `render_image` and write it to `path` as a PNG.
pub fn save_image(
    puzzle: &Puzzle,
    assignment: &Assignment,
    path: impl AsRef<Path>,
) -> Result<(), PuzzleError> {
    let path = path.as_ref();
    let image = render_image(puzzle, assignment)?;

    let file = File::create(path)
        .map_err(|source| PuzzleError::Io { path: path.to_path_buf(), source })?;
    let encoding_error = |source| PuzzleError::Image { path: path.to_path_buf(), source };

    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width, image.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().map_err(encoding_error)?;
    writer.write_image_data(image.pixels()).map_err(encoding_error)?;
    writer.finish().map_err(encoding_error)?;

    log::info!("Wrote {}x{} image to {}", image.width, image.height, path.display());
    Ok(())
}
