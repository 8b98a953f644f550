use std::collections::{HashSet, VecDeque};
use std::fmt;

use log::{debug, trace};

use crate::board::{Board, Position, Puzzle, State, extract_state};
use crate::error::PuzzleError;
use crate::game::Direction;
use crate::heuristic::{Cost, DijkstraHeuristic, Heuristic, HeuristicKind, ManhattanHeuristic};
use crate::pqueue::{Priority, PriorityQueue};

/// Progress hook called after each enqueued successor with its path and
/// depth. It only observes; the search runs the same without it.
pub trait Tracer {
    fn trace(&mut self, path: &[Direction], depth: usize);
}

impl<F: FnMut(&[Direction], usize)> Tracer for F {
    fn trace(&mut self, path: &[Direction], depth: usize) {
        (*self)(path, depth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    BreadthFirst,
    AStar(HeuristicKind),
}

/// A move sequence from the initial state to a solved state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    moves: Vec<Direction>,
}

impl Solution {
    pub fn new(moves: Vec<Direction>) -> Self {
        Solution { moves }
    }

    pub fn moves(&self) -> &[Direction] {
        &self.moves
    }

    /// Search depth at which the solution was found: its move count.
    pub fn depth(&self) -> usize {
        self.moves.len()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dir in &self.moves {
            write!(f, "{}", dir)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Solved(Solution),
    /// Stopped at the node limit with nodes still unexpanded; carries the
    /// depth the search had reached.
    Cutoff(usize),
    /// The frontier ran dry, or the initial state is already a deadlock.
    Impossible,
}

impl SolveResult {
    /// Depth of the solution, the depth reached on cutoff, or -1 when the
    /// search space was exhausted.
    pub fn depth(&self) -> i64 {
        match self {
            SolveResult::Solved(solution) => solution.depth() as i64,
            SolveResult::Cutoff(depth) => *depth as i64,
            SolveResult::Impossible => -1,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveResult::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

struct Node {
    state: State,
    player: Position,
    depth: usize,
    cost: u32,
    path: Vec<Direction>,
}

impl Node {
    fn root(state: State, player: Position) -> Self {
        Node {
            state,
            player,
            depth: 0,
            cost: 0,
            path: Vec::new(),
        }
    }

    fn extend(&self, direction: Direction) -> Vec<Direction> {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(direction);
        path
    }
}

pub struct Solver {
    board: Board,
    initial_state: State,
    initial_player: Position,
    max_nodes_explored: Option<usize>,
    nodes_explored: usize,
}

impl Solver {
    pub fn new(puzzle: &Puzzle) -> Result<Self, PuzzleError> {
        let (board, initial_state, initial_player) = extract_state(puzzle)?;
        Ok(Solver {
            board,
            initial_state,
            initial_player,
            max_nodes_explored: None,
            nodes_explored: 0,
        })
    }

    /// Give up with `SolveResult::Cutoff` after expanding this many nodes.
    pub fn with_max_nodes_explored(mut self, max_nodes_explored: usize) -> Self {
        self.max_nodes_explored = Some(max_nodes_explored);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn initial_state(&self) -> (&State, Position) {
        (&self.initial_state, self.initial_player)
    }

    /// Nodes expanded by the last search.
    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    pub fn solve(&mut self, strategy: Strategy, tracer: Option<&mut dyn Tracer>) -> SolveResult {
        match strategy {
            Strategy::BreadthFirst => self.bfs(tracer),
            Strategy::AStar(HeuristicKind::Manhattan) => {
                self.astar(ManhattanHeuristic::new(), tracer)
            }
            Strategy::AStar(HeuristicKind::Dijkstra) => {
                self.astar(DijkstraHeuristic::new(), tracer)
            }
        }
    }

    fn limit_reached(&self) -> bool {
        self.max_nodes_explored
            .is_some_and(|max| self.nodes_explored >= max)
    }

    /// Shared checks on the initial state. Returns a result if the search
    /// does not need to run at all.
    fn trivial_result(&self) -> Option<SolveResult> {
        if self.initial_state.is_solved() {
            Some(SolveResult::Solved(Solution::default()))
        } else if self.board.is_deadlock(&self.initial_state) {
            debug!("initial state is a deadlock");
            Some(SolveResult::Impossible)
        } else {
            None
        }
    }

    /// Breadth-first search. The first solution found has the fewest moves.
    pub fn bfs(&mut self, mut tracer: Option<&mut dyn Tracer>) -> SolveResult {
        self.nodes_explored = 0;
        if let Some(result) = self.trivial_result() {
            return result;
        }
        debug!("starting breadth-first search");

        let mut visited = HashSet::new();
        let mut frontier = VecDeque::new();
        visited.insert(self.initial_state.clone());
        frontier.push_back(Node::root(self.initial_state.clone(), self.initial_player));
        let mut reached = 0;

        while let Some(node) = frontier.pop_front() {
            if self.limit_reached() {
                debug!("node limit hit after {} nodes", self.nodes_explored);
                return SolveResult::Cutoff(reached);
            }
            self.nodes_explored += 1;
            reached = node.depth + 1;
            trace!("expanding depth {} ({} queued)", node.depth, frontier.len());

            for (direction, successor) in self.board.successors(&node.state, node.player) {
                if visited.contains(&successor.state) || self.board.is_deadlock(&successor.state) {
                    continue;
                }

                let path = node.extend(direction);
                if successor.state.is_solved() {
                    debug!(
                        "solved at depth {} after {} nodes",
                        path.len(),
                        self.nodes_explored
                    );
                    return SolveResult::Solved(Solution::new(path));
                }

                if let Some(tracer) = tracer.as_mut() {
                    tracer.trace(&path, node.depth + 1);
                }
                visited.insert(successor.state.clone());
                frontier.push_back(Node {
                    state: successor.state,
                    player: successor.player,
                    depth: node.depth + 1,
                    cost: node.cost + successor.cost,
                    path,
                });
            }
        }

        debug!("search space exhausted after {} nodes", self.nodes_explored);
        SolveResult::Impossible
    }

    /// Best-first search ordered by (accumulated move cost + estimate,
    /// estimate), insertion order breaking remaining ties.
    pub fn astar<H: Heuristic>(
        &mut self,
        mut heuristic: H,
        mut tracer: Option<&mut dyn Tracer>,
    ) -> SolveResult {
        self.nodes_explored = 0;
        if let Some(result) = self.trivial_result() {
            return result;
        }
        // The root is the only queue entry, so it is expanded even when its
        // boxes are hemmed in and the estimate is impossible.
        let estimate = match heuristic.estimate(&self.board, &self.initial_state, self.initial_player)
        {
            Cost::Solvable(estimate) => estimate,
            Cost::Impossible => 0,
        };
        debug!("starting priority search, initial estimate {}", estimate);

        let mut visited = HashSet::new();
        let mut frontier = PriorityQueue::new();
        frontier.push(
            Priority::new(estimate, estimate),
            Node::root(self.initial_state.clone(), self.initial_player),
        );
        let mut reached = 0;

        while let Some(node) = frontier.pop_min() {
            // A state can sit in the queue more than once; only the first
            // pop expands it.
            if !visited.insert(node.state.clone()) {
                continue;
            }
            if self.limit_reached() {
                debug!("node limit hit after {} nodes", self.nodes_explored);
                return SolveResult::Cutoff(reached);
            }
            self.nodes_explored += 1;
            reached = node.depth + 1;
            trace!(
                "expanding depth {} cost {} ({} queued)",
                node.depth,
                node.cost,
                frontier.len()
            );

            for (direction, successor) in self.board.successors(&node.state, node.player) {
                if visited.contains(&successor.state) || self.board.is_deadlock(&successor.state) {
                    continue;
                }

                let path = node.extend(direction);
                if successor.state.is_solved() {
                    debug!(
                        "solved at depth {} after {} nodes",
                        path.len(),
                        self.nodes_explored
                    );
                    return SolveResult::Solved(Solution::new(path));
                }

                let Cost::Solvable(estimate) =
                    heuristic.estimate(&self.board, &successor.state, successor.player)
                else {
                    continue;
                };

                if let Some(tracer) = tracer.as_mut() {
                    tracer.trace(&path, node.depth + 1);
                }
                let cost = node.cost + successor.cost;
                frontier.push(
                    Priority::new(cost + estimate, estimate),
                    Node {
                        state: successor.state,
                        player: successor.player,
                        depth: node.depth + 1,
                        cost,
                        path,
                    },
                );
            }
        }

        debug!("search space exhausted after {} nodes", self.nodes_explored);
        SolveResult::Impossible
    }
}

/// Solve with breadth-first search.
pub fn solve_bfs(
    puzzle: &Puzzle,
    tracer: Option<&mut dyn Tracer>,
) -> Result<SolveResult, PuzzleError> {
    Ok(Solver::new(puzzle)?.bfs(tracer))
}

/// Solve with priority search guided by the given heuristic.
pub fn solve_astar(
    puzzle: &Puzzle,
    heuristic: HeuristicKind,
    tracer: Option<&mut dyn Tracer>,
) -> Result<SolveResult, PuzzleError> {
    Ok(Solver::new(puzzle)?.solve(Strategy::AStar(heuristic), tracer))
}
