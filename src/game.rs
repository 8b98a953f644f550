use std::fmt;

use arrayvec::ArrayVec;

use crate::board::{Board, Position, State, Tile};

/// Player steps onto an empty floor or goal tile.
pub const STEP_COST: u32 = 3;
/// Player pushes a box onto a non-goal tile.
pub const PUSH_COST: u32 = 2;
/// Player pushes a box onto a goal.
pub const GOAL_PUSH_COST: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Order in which successors are generated.
pub const SEARCH_ORDER: [Direction; 4] = [
    Direction::Down,
    Direction::Up,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// (row, col) offset of one step
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Direction> {
        match symbol {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Result of a legal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Successor {
    pub state: State,
    pub player: Position,
    pub cost: u32,
}

impl Board {
    /// Move from `pos` one step in the given direction.
    /// Returns None if the new position would leave the matrix.
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (d_row, d_col) = dir.delta();
        let row = pos.row.checked_add_signed(d_row)?;
        let col = pos.col.checked_add_signed(d_col)?;
        if row < self.height() && col < self.width() {
            Some(Position::new(row, col))
        } else {
            None
        }
    }

    /// Apply one player move.
    ///
    /// Returns None when the move is illegal: the player would walk into a
    /// wall, or push a box into a wall or another box. Stepping onto floor
    /// or goal costs `STEP_COST`; a push costs `PUSH_COST`, or
    /// `GOAL_PUSH_COST` when the box lands on a goal.
    pub fn apply_move(
        &self,
        state: &State,
        player: Position,
        direction: Direction,
    ) -> Option<Successor> {
        let target = self.step(player, direction)?;
        let from = self.index(player);
        let to = self.index(target);
        let target_tile = state.tile(to);

        let mut changes: ArrayVec<(usize, Tile), 3> = ArrayVec::new();
        let cost = if target_tile.is_free() {
            changes.push((to, target_tile.with_player()));
            STEP_COST
        } else if target_tile.is_box() {
            let beyond = self.step(target, direction)?;
            let beyond_index = self.index(beyond);
            let beyond_tile = state.tile(beyond_index);
            if !beyond_tile.is_free() {
                return None;
            }
            let landed = beyond_tile.with_box();
            changes.push((beyond_index, landed));
            changes.push((to, target_tile.with_player()));
            if landed == Tile::BoxOnGoal {
                GOAL_PUSH_COST
            } else {
                PUSH_COST
            }
        } else {
            // Wall. A second player tile would be out of contract.
            return None;
        };
        changes.push((from, state.tile(from).vacated()));

        Some(Successor {
            state: state.with_changes(self.zobrist(), &changes),
            player: target,
            cost,
        })
    }

    /// All legal successors, in search order.
    pub fn successors(
        &self,
        state: &State,
        player: Position,
    ) -> ArrayVec<(Direction, Successor), 4> {
        SEARCH_ORDER
            .iter()
            .filter_map(|&dir| {
                self.apply_move(state, player, dir)
                    .map(|successor| (dir, successor))
            })
            .collect()
    }

    /// Apply a move sequence in order. The returned cost is the summed move
    /// cost. None if any move along the way is illegal.
    pub fn replay(&self, state: &State, player: Position, moves: &[Direction]) -> Option<Successor> {
        let mut current = Successor {
            state: state.clone(),
            player,
            cost: 0,
        };
        for &dir in moves {
            let next = self.apply_move(&current.state, current.player, dir)?;
            current = Successor {
                cost: current.cost + next.cost,
                ..next
            };
        }
        Some(current)
    }
}
