use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::board::Puzzle;
use crate::error::PuzzleError;

/// Error type for level loading.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid level {number}: {source}")]
    InvalidLevel {
        number: usize,
        #[source]
        source: PuzzleError,
    },
}

/// A collection of puzzles read from a level file.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<Puzzle>,
}

impl Levels {
    /// Parse levels from a string.
    ///
    /// Levels are separated by blank lines or by lines starting with `;`
    /// (which also serve as titles and comments). Each level is a matrix of
    /// tile symbols, optionally space-separated.
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut current_level = String::new();

        for line in contents.lines() {
            let separator = line.trim().is_empty() || line.trim_start().starts_with(';');
            if !separator {
                current_level.push_str(line);
                current_level.push('\n');
                continue;
            }
            if !current_level.is_empty() {
                Self::finish_level(&mut levels, &current_level)?;
                current_level.clear();
            }
        }

        // Last level, if the file doesn't end with a separator
        if !current_level.is_empty() {
            Self::finish_level(&mut levels, &current_level)?;
        }

        Ok(Levels { levels })
    }

    fn finish_level(levels: &mut Vec<Puzzle>, text: &str) -> Result<(), LevelError> {
        let puzzle = Puzzle::from_text(text).map_err(|source| LevelError::InvalidLevel {
            number: levels.len() + 1,
            source,
        })?;
        levels.push(puzzle);
        Ok(())
    }

    /// Parse levels from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Puzzle> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
