use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::PuzzleError;
use crate::zobrist::Zobrist;

pub const MAX_SIZE: usize = 64;
pub const TILE_KINDS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Wall,
    Floor,
    Box,
    Goal,
    BoxOnGoal,
    Player,
    PlayerOnGoal,
}

impl Tile {
    pub fn from_symbol(symbol: char) -> Option<Tile> {
        match symbol {
            '+' => Some(Tile::Wall),
            '-' => Some(Tile::Floor),
            '@' => Some(Tile::Box),
            'X' => Some(Tile::Goal),
            '$' => Some(Tile::BoxOnGoal),
            '*' => Some(Tile::Player),
            '%' => Some(Tile::PlayerOnGoal),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Tile::Wall => '+',
            Tile::Floor => '-',
            Tile::Box => '@',
            Tile::Goal => 'X',
            Tile::BoxOnGoal => '$',
            Tile::Player => '*',
            Tile::PlayerOnGoal => '%',
        }
    }

    pub(crate) fn kind(self) -> usize {
        self as usize
    }

    pub fn is_box(self) -> bool {
        matches!(self, Tile::Box | Tile::BoxOnGoal)
    }

    pub fn is_player(self) -> bool {
        matches!(self, Tile::Player | Tile::PlayerOnGoal)
    }

    pub fn is_goal(self) -> bool {
        matches!(self, Tile::Goal | Tile::BoxOnGoal | Tile::PlayerOnGoal)
    }

    /// A goal nobody is standing on and no box covers. The player standing on
    /// a goal still leaves it open for a box.
    pub fn is_open_goal(self) -> bool {
        matches!(self, Tile::Goal | Tile::PlayerOnGoal)
    }

    /// Floor or goal: something may move onto it.
    pub fn is_free(self) -> bool {
        matches!(self, Tile::Floor | Tile::Goal)
    }

    /// The tile once the player stands on it.
    pub fn with_player(self) -> Tile {
        if self.is_goal() {
            Tile::PlayerOnGoal
        } else {
            Tile::Player
        }
    }

    /// The tile once a box rests on it.
    pub fn with_box(self) -> Tile {
        if self.is_goal() {
            Tile::BoxOnGoal
        } else {
            Tile::Box
        }
    }

    /// The tile once whatever stood on it has left.
    pub fn vacated(self) -> Tile {
        if self.is_goal() { Tile::Goal } else { Tile::Floor }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    pub fn manhattan(&self, other: &Position) -> u32 {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as u32
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub height: usize,
    pub width: usize,
}

impl Shape {
    pub fn cells(&self) -> usize {
        self.height * self.width
    }
}

/// Immutable input matrix of tile symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    tiles: Vec<Tile>,
    shape: Shape,
}

impl Puzzle {
    /// Parse a puzzle matrix from text.
    ///
    /// Symbols:
    /// - `+` = Wall
    /// - `-` = Floor
    /// - `@` = Box
    /// - `X` = Goal
    /// - `$` = Box on goal
    /// - `*` = Player
    /// - `%` = Player on goal
    ///
    /// Whitespace within a row is ignored, so `+ - @ X +` and `+-@X+` read the
    /// same. Blank lines are skipped.
    pub fn from_text(text: &str) -> Result<Self, PuzzleError> {
        let mut tiles = Vec::new();
        let mut width = None;
        let mut height = 0;

        for line in text.lines() {
            let start = tiles.len();
            for (col, symbol) in line.chars().filter(|c| !c.is_whitespace()).enumerate() {
                let tile = Tile::from_symbol(symbol).ok_or(PuzzleError::UnknownSymbol {
                    symbol,
                    row: height,
                    col,
                })?;
                tiles.push(tile);
            }

            let found = tiles.len() - start;
            if found == 0 {
                continue;
            }
            match width {
                None => width = Some(found),
                Some(expected) if expected != found => {
                    return Err(PuzzleError::RaggedRow {
                        row: height,
                        found,
                        expected,
                    });
                }
                Some(_) => {}
            }
            height += 1;
        }

        let width = width.ok_or(PuzzleError::InvalidPuzzle("puzzle is empty"))?;
        if width > MAX_SIZE || height > MAX_SIZE {
            return Err(PuzzleError::TooLarge {
                height,
                width,
                max: MAX_SIZE,
            });
        }

        Ok(Puzzle {
            tiles,
            shape: Shape { height, width },
        })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn tile(&self, pos: Position) -> Tile {
        self.tiles[pos.row * self.shape.width + pos.col]
    }
}

impl FromStr for Puzzle {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Puzzle::from_text(s)
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.shape.width) {
            let line: String = row.iter().map(|t| t.symbol()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// One configuration of boxes and player: the full row-major tile sequence.
///
/// States are values. Equality compares the whole sequence; the Zobrist hash
/// carried alongside is only a fast path and the `Hash` impl.
#[derive(Debug, Clone)]
pub struct State {
    tiles: Box<[Tile]>,
    hash: u64,
}

impl State {
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Tile {
        self.tiles[index]
    }

    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Boxes on or off goals
    pub fn box_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_box()).count()
    }

    /// Solved once no box is left off a goal
    pub fn is_solved(&self) -> bool {
        !self.tiles.contains(&Tile::Box)
    }

    pub fn symbols(&self) -> String {
        self.tiles.iter().map(|t| t.symbol()).collect()
    }

    /// Derive a new state by replacing a few cells, keeping the hash current.
    pub(crate) fn with_changes(&self, zobrist: &Zobrist, changes: &[(usize, Tile)]) -> State {
        let mut tiles = self.tiles.clone();
        let mut hash = self.hash;
        for &(index, tile) in changes {
            hash = zobrist.update(hash, index, tiles[index], tile);
            tiles[index] = tile;
        }
        State { tiles, hash }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.tiles == other.tiles
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Per-solve context: the matrix shape and the hash table for its cells.
pub struct Board {
    shape: Shape,
    zobrist: Zobrist,
}

impl Board {
    pub fn new(shape: Shape) -> Self {
        Board {
            shape,
            zobrist: Zobrist::new(shape.cells()),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn height(&self) -> usize {
        self.shape.height
    }

    pub fn width(&self) -> usize {
        self.shape.width
    }

    pub(crate) fn zobrist(&self) -> &Zobrist {
        &self.zobrist
    }

    pub fn index(&self, pos: Position) -> usize {
        pos.row * self.shape.width + pos.col
    }

    pub fn position(&self, index: usize) -> Position {
        Position::new(index / self.shape.width, index % self.shape.width)
    }

    /// Inside the outer ring of the matrix.
    pub fn is_interior(&self, pos: Position) -> bool {
        pos.row >= 1
            && pos.col >= 1
            && pos.row + 1 < self.shape.height
            && pos.col + 1 < self.shape.width
    }

    /// Tile at a signed offset from `pos`; anything outside the matrix reads
    /// as wall.
    pub fn tile_at(&self, state: &State, pos: Position, d_row: isize, d_col: isize) -> Tile {
        let row = pos.row as isize + d_row;
        let col = pos.col as isize + d_col;
        if row < 0
            || col < 0
            || row >= self.shape.height as isize
            || col >= self.shape.width as isize
        {
            Tile::Wall
        } else {
            state.tile(row as usize * self.shape.width + col as usize)
        }
    }

    /// Flatten a puzzle matrix into its state and locate the player.
    pub fn extract_state(&self, puzzle: &Puzzle) -> Result<(State, Position), PuzzleError> {
        if puzzle.shape() != self.shape {
            return Err(PuzzleError::InvalidPuzzle(
                "puzzle shape does not match the board",
            ));
        }

        let mut player = None;
        for (index, tile) in puzzle.tiles.iter().enumerate() {
            if tile.is_player() {
                if player.is_some() {
                    return Err(PuzzleError::InvalidPuzzle(
                        "more than one player symbol ('*' or '%') found",
                    ));
                }
                player = Some(self.position(index));
            }
        }
        let player = player.ok_or(PuzzleError::InvalidPuzzle(
            "no player symbol ('*' or '%') found",
        ))?;

        let tiles: Box<[Tile]> = puzzle.tiles.clone().into_boxed_slice();
        let hash = self.zobrist.compute_hash(&tiles);
        Ok((State { tiles, hash }, player))
    }

    /// Boxes still off a goal, and goals still open for a box.
    pub fn boxes_and_goals(&self, state: &State) -> (Vec<Position>, Vec<Position>) {
        let mut boxes = Vec::new();
        let mut goals = Vec::new();
        for (index, &tile) in state.tiles().iter().enumerate() {
            if tile == Tile::Box {
                boxes.push(self.position(index));
            } else if tile.is_open_goal() {
                goals.push(self.position(index));
            }
        }
        (boxes, goals)
    }

    /// Render a state back to matrix text, one row per line.
    pub fn render(&self, state: &State) -> String {
        let mut out = String::with_capacity(self.shape.cells() + self.shape.height);
        for row in state.tiles().chunks(self.shape.width) {
            out.extend(row.iter().map(|t| t.symbol()));
            out.push('\n');
        }
        out
    }
}

/// Convenience wrapper: build a board for the puzzle and extract its state.
pub fn extract_state(puzzle: &Puzzle) -> Result<(Board, State, Position), PuzzleError> {
    let board = Board::new(puzzle.shape());
    let (state, player) = board.extract_state(puzzle)?;
    Ok((board, state, player))
}
