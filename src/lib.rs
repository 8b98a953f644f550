//! Sokoban solver core: board model, move engine, deadlock detection,
//! heuristics and the breadth-first and A* searches built on them.

pub mod board;
pub mod deadlocks;
pub mod error;
pub mod game;
pub mod heuristic;
pub mod levels;
pub mod pqueue;
pub mod solver;
pub mod zobrist;

pub use board::{Board, Position, Puzzle, State, Tile};
pub use error::PuzzleError;
pub use game::Direction;
pub use heuristic::{Cost, HeuristicKind};
pub use solver::{SolveResult, Solution, Solver, Strategy, Tracer, solve_astar, solve_bfs};
