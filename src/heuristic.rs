use std::collections::{HashMap, VecDeque};

use crate::board::{Board, Position, State, Tile};
use crate::game::SEARCH_ORDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cost {
    Solvable(u32),
    Impossible,
}

/// Estimates the remaining move cost from a state to a solved state.
pub trait Heuristic {
    fn estimate(&mut self, board: &Board, state: &State, player: Position) -> Cost;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicKind {
    Manhattan,
    Dijkstra,
}

/// Offset added per loose box so that states with fewer loose boxes always
/// order before states with more.
fn box_offset(board: &Board, loose_boxes: usize) -> u32 {
    (loose_boxes * board.height() * board.width()) as u32
}

/// Sum of each loose box's Manhattan distance to its nearest open goal, plus
/// the player's distance to the nearest loose box.
pub struct ManhattanHeuristic;

impl ManhattanHeuristic {
    pub fn new() -> Self {
        ManhattanHeuristic
    }
}

impl Default for ManhattanHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for ManhattanHeuristic {
    fn estimate(&mut self, board: &Board, state: &State, player: Position) -> Cost {
        let (boxes, goals) = board.boxes_and_goals(state);
        if boxes.is_empty() {
            return Cost::Solvable(0);
        }

        let mut total = box_offset(board, boxes.len());
        for pos in &boxes {
            match goals.iter().map(|goal| pos.manhattan(goal)).min() {
                Some(distance) => total += distance,
                None => return Cost::Impossible,
            }
        }

        let player_cost = boxes
            .iter()
            .map(|pos| player.manhattan(pos))
            .min()
            .unwrap_or(0);
        Cost::Solvable(total + player_cost)
    }
}

/// Shortest walking distances from one origin to every cell of the interior.
#[derive(Debug, Clone)]
pub struct DistanceField {
    width: usize,
    distances: Vec<u32>,
}

impl DistanceField {
    const UNREACHABLE: u32 = u32::MAX;

    /// Single-source shortest paths on the unit-weight grid, restricted to
    /// the interior. `blocked` decides which tiles cannot be entered; the
    /// origin itself is always allowed.
    pub fn compute(
        board: &Board,
        state: &State,
        origin: Position,
        blocked: impl Fn(Tile) -> bool,
    ) -> Self {
        let mut distances = vec![Self::UNREACHABLE; board.shape().cells()];
        let mut queue = VecDeque::new();
        distances[board.index(origin)] = 0;
        queue.push_back(origin);

        // Every edge weighs one, so a FIFO queue settles cells in the same
        // order a Dijkstra heap would.
        while let Some(pos) = queue.pop_front() {
            let distance = distances[board.index(pos)];
            for &dir in &SEARCH_ORDER {
                let Some(next) = board.step(pos, dir) else {
                    continue;
                };
                let index = board.index(next);
                if board.is_interior(next)
                    && !blocked(state.tile(index))
                    && distances[index] == Self::UNREACHABLE
                {
                    distances[index] = distance + 1;
                    queue.push_back(next);
                }
            }
        }

        DistanceField {
            width: board.width(),
            distances,
        }
    }

    pub fn get(&self, pos: Position) -> Option<u32> {
        match self.distances[pos.row * self.width + pos.col] {
            Self::UNREACHABLE => None,
            distance => Some(distance),
        }
    }

    /// Distance to the closest of `targets`, if any is reachable.
    pub fn nearest<'a>(&self, targets: impl IntoIterator<Item = &'a Position>) -> Option<u32> {
        targets.into_iter().filter_map(|&pos| self.get(pos)).min()
    }
}

/// Distance fields for one search.
///
/// Player fields only treat walls as obstacles and walls never move, so they
/// are kept for the whole search. Box fields also treat every box as an
/// obstacle, so they hold only for one box layout; the cache keeps the fields
/// of the most recent layout and drops them when a state with a different
/// layout comes in. Player-only moves leave the layout alone, which is what
/// makes the fields reusable across one state's neighbours.
#[derive(Debug, Default)]
pub struct DistanceCache {
    layout: Vec<usize>,
    box_fields: HashMap<Position, DistanceField>,
    player_fields: HashMap<Position, DistanceField>,
    hits: usize,
    misses: usize,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn box_field(&mut self, board: &Board, state: &State, origin: Position) -> &DistanceField {
        let same_layout = self.layout.iter().copied().eq(Self::layout_of(state));
        if !same_layout {
            self.layout.clear();
            self.layout.extend(Self::layout_of(state));
            self.box_fields.clear();
        }

        if self.box_fields.contains_key(&origin) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.box_fields
            .entry(origin)
            .or_insert_with(|| DistanceField::compute(board, state, origin, blocks_box))
    }

    fn player_field(&mut self, board: &Board, state: &State, origin: Position) -> &DistanceField {
        if self.player_fields.contains_key(&origin) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.player_fields
            .entry(origin)
            .or_insert_with(|| DistanceField::compute(board, state, origin, blocks_player))
    }

    fn layout_of(state: &State) -> impl Iterator<Item = usize> + '_ {
        state
            .tiles()
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_box())
            .map(|(index, _)| index)
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}

fn blocks_box(tile: Tile) -> bool {
    tile == Tile::Wall || tile.is_box()
}

fn blocks_player(tile: Tile) -> bool {
    tile == Tile::Wall
}

/// Like `ManhattanHeuristic`, but with true shortest-path distances: boxes
/// route around walls and other boxes, the player around walls.
#[derive(Debug, Default)]
pub struct DijkstraHeuristic {
    cache: DistanceCache,
}

impl DijkstraHeuristic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }
}

impl Heuristic for DijkstraHeuristic {
    fn estimate(&mut self, board: &Board, state: &State, player: Position) -> Cost {
        let (boxes, goals) = board.boxes_and_goals(state);
        if boxes.is_empty() {
            return Cost::Solvable(0);
        }

        let mut total = box_offset(board, boxes.len());
        for &pos in &boxes {
            match self.cache.box_field(board, state, pos).nearest(&goals) {
                Some(distance) => total += distance,
                None => return Cost::Impossible,
            }
        }

        match self.cache.player_field(board, state, player).nearest(&boxes) {
            Some(distance) => Cost::Solvable(total + distance),
            None => Cost::Impossible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::extract_state;
    use crate::game::Direction;

    fn load(input: &str) -> (Board, State, Position) {
        extract_state(&input.parse().unwrap()).unwrap()
    }

    const SIMPLE: &str = "+++++\n\
                          +*--+\n\
                          +---+\n\
                          +-@X+\n\
                          +++++";

    #[test]
    fn test_manhattan_simple() {
        let (board, state, player) = load(SIMPLE);
        // 1 box * 5 * 5 offset, box one step from the goal, player three
        // steps from the box.
        assert_eq!(
            ManhattanHeuristic::new().estimate(&board, &state, player),
            Cost::Solvable(25 + 1 + 3)
        );
    }

    #[test]
    fn test_dijkstra_simple() {
        let (board, state, player) = load(SIMPLE);
        assert_eq!(
            DijkstraHeuristic::new().estimate(&board, &state, player),
            Cost::Solvable(25 + 1 + 3)
        );
    }

    #[test]
    fn test_solved_state_costs_nothing() {
        let (board, state, player) = load(
            "+++++\n\
             +*-$+\n\
             +++++",
        );
        assert_eq!(
            ManhattanHeuristic::new().estimate(&board, &state, player),
            Cost::Solvable(0)
        );
        assert_eq!(
            DijkstraHeuristic::new().estimate(&board, &state, player),
            Cost::Solvable(0)
        );
    }

    #[test]
    fn test_dijkstra_routes_around_walls() {
        let (board, state, player) = load(
            "+++++++\n\
             +-----+\n\
             +-+++-+\n\
             +@+X+*+\n\
             +++++++",
        );
        // The goal at (3,3) is walled in on all four sides.
        assert_eq!(
            DijkstraHeuristic::new().estimate(&board, &state, player),
            Cost::Impossible
        );
        // Manhattan ignores walls.
        assert_eq!(
            ManhattanHeuristic::new().estimate(&board, &state, player),
            Cost::Solvable(35 + 2 + 4)
        );
    }

    #[test]
    fn test_dijkstra_detour_distance() {
        let (board, state, player) = load(
            "++++++\n\
             +----+\n\
             +-++-+\n\
             +@+X*+\n\
             ++++++",
        );
        // Box (3,1) walks up to (1,1), across to (1,4), down to (3,4) and
        // left to (3,3): 2 + 3 + 2 + 1. The player at (3,4) walks the same
        // corridor back to the box: 2 + 3 + 2.
        assert_eq!(
            DijkstraHeuristic::new().estimate(&board, &state, player),
            Cost::Solvable(30 + 8 + 7)
        );
    }

    #[test]
    fn test_unreachable_goal() {
        let (board, state, player) = load(
            "+++++++\n\
             +*@-+X+\n\
             +---+++\n\
             +++++++",
        );
        assert_eq!(
            DijkstraHeuristic::new().estimate(&board, &state, player),
            Cost::Impossible
        );
        assert_eq!(
            ManhattanHeuristic::new().estimate(&board, &state, player),
            Cost::Solvable(28 + 3 + 1)
        );
    }

    #[test]
    fn test_no_open_goal() {
        let (board, state, player) = load(
            "++++++\n\
             +*@$-+\n\
             +----+\n\
             ++++++",
        );
        assert_eq!(
            ManhattanHeuristic::new().estimate(&board, &state, player),
            Cost::Impossible
        );
        assert_eq!(
            DijkstraHeuristic::new().estimate(&board, &state, player),
            Cost::Impossible
        );
    }

    #[test]
    fn test_player_cannot_reach_box() {
        let (board, state, player) = load(
            "++++++\n\
             +*+@X+\n\
             ++++++",
        );
        assert_eq!(
            DijkstraHeuristic::new().estimate(&board, &state, player),
            Cost::Impossible
        );
    }

    #[test]
    fn test_boxes_block_each_other() {
        let (board, state, player) = load(
            "+++++++\n\
             +*@@-X+\n\
             +++++X+\n\
             +++++++",
        );
        // The second box stands between the first box and both goals.
        assert_eq!(
            DijkstraHeuristic::new().estimate(&board, &state, player),
            Cost::Impossible
        );

        let (board, state, player) = load(
            "+++++++\n\
             +*-@-X+\n\
             +-@--X+\n\
             +++++++",
        );
        // Two boxes at 4 * 7 each; box (1,3) is 2 from (1,5), box (2,2) is 3
        // from (2,5), and the player is 2 from either box.
        assert_eq!(
            DijkstraHeuristic::new().estimate(&board, &state, player),
            Cost::Solvable(56 + 2 + 3 + 2)
        );
    }

    #[test]
    fn test_cache_reuses_fields_for_same_layout() {
        let (board, state, player) = load(SIMPLE);
        let mut heuristic = DijkstraHeuristic::new();
        heuristic.estimate(&board, &state, player);
        assert_eq!(heuristic.cache().misses(), 2);

        // A player-only move keeps the box layout.
        let next = board.apply_move(&state, player, Direction::Right).unwrap();
        heuristic.estimate(&board, &next.state, next.player);
        assert_eq!(heuristic.cache().hits(), 1);
        assert_eq!(heuristic.cache().misses(), 3);

        // Back to the first player position: both fields are cached.
        heuristic.estimate(&board, &state, player);
        assert_eq!(heuristic.cache().hits(), 3);
    }

    #[test]
    fn test_cache_drops_box_fields_on_new_layout() {
        let (board, state, player) = load(
            "++++++\n\
             +----+\n\
             +-@-X+\n\
             +*---+\n\
             ++++++",
        );
        let mut heuristic = DijkstraHeuristic::new();
        let before = heuristic.estimate(&board, &state, player);

        let pushed = board
            .replay(&state, player, &[Direction::Up, Direction::Right])
            .unwrap();
        assert_ne!(pushed.state.box_count(), 0);
        let after = heuristic.estimate(&board, &pushed.state, pushed.player);
        assert_ne!(before, after);
        assert_eq!(heuristic.cache().misses(), 4);
    }
}
