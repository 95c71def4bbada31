use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crossfill::render::{render_grid, save_image};
use crossfill::{find_fill, Puzzle, PuzzleError};

/// Fill a crossword structure with words from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the structure file (`_` for open cells, anything else for blocks)
    structure: PathBuf,

    /// Path to the word list (one word per line)
    words: PathBuf,

    /// Also draw the filled grid to this PNG file
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let debug_enabled = std::env::var("CROSSFILL_DEBUG").is_ok();
    crossfill::logging::init_logger(debug_enabled);

    if let Err(e) = try_main() {
        if let Some(puzzle_err) = e.downcast_ref::<PuzzleError>() {
            eprintln!("Error: {}", puzzle_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Load the puzzle, fill it, and print the grid (or `No solution.`). An unsolvable puzzle is a
/// normal outcome; only load and write failures are errors.
fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let puzzle = Puzzle::from_files(&cli.structure, &cli.words)?;

    match find_fill(&puzzle) {
        Ok(result) => {
            let grid = render_grid(&puzzle, &result.assignment);
            println!("{grid}");

            log::info!("{:?}", result.statistics);

            if let Some(output) = &cli.output {
                save_image(&puzzle, &result.assignment, output)?;
            }
        }
        Err(failure) => {
            println!("No solution.");

            log::info!("{} [{}]", failure, failure.code());
            if let Some(help) = failure.help() {
                log::info!("help: {help}");
            }
        }
    }

    Ok(())
}
