use crate::board::{Board, Position, State, Tile};

/// The three neighbours that close a 2x2 square around a box: one horizontal,
/// one vertical, and the diagonal between them.
const SQUARES: [[(isize, isize); 3]; 4] = [
    [(0, -1), (-1, 0), (-1, -1)],
    [(0, 1), (-1, 0), (-1, 1)],
    [(0, -1), (1, -1), (1, 0)],
    [(0, 1), (1, 1), (1, 0)],
];

impl Board {
    /// Returns true if the state provably cannot be solved.
    ///
    /// False does not mean the state is solvable; it only means none of the
    /// checks below fired.
    pub fn is_deadlock(&self, state: &State) -> bool {
        self.has_cornered_box(state)
            || self.has_frozen_square(state)
            || self.has_line_surplus(state)
    }

    fn loose_boxes<'a>(&'a self, state: &'a State) -> impl Iterator<Item = Position> + 'a {
        state
            .tiles()
            .iter()
            .enumerate()
            .filter(|&(_, &tile)| tile == Tile::Box)
            .map(|(index, _)| self.position(index))
    }

    /// A box off goal with walls on two perpendicular sides can never move
    /// again.
    fn has_cornered_box(&self, state: &State) -> bool {
        self.loose_boxes(state).any(|pos| {
            let wall = |d_row, d_col| self.tile_at(state, pos, d_row, d_col) == Tile::Wall;
            (wall(0, -1) && wall(-1, 0))
                || (wall(0, 1) && wall(1, 0))
                || (wall(0, 1) && wall(-1, 0))
                || (wall(0, -1) && wall(1, 0))
        })
    }

    /// A box off goal that closes a 2x2 square made only of boxes and walls.
    /// None of the boxes in such a square can be pushed out of it.
    fn has_frozen_square(&self, state: &State) -> bool {
        self.loose_boxes(state).any(|pos| {
            SQUARES.iter().any(|square| {
                square.iter().all(|&(d_row, d_col)| {
                    let tile = self.tile_at(state, pos, d_row, d_col);
                    tile.is_box() || tile == Tile::Wall
                })
            })
        })
    }

    /// Along the rows and columns next to the outer wall a box can only slide
    /// sideways, so each such line needs at least as many open goals as it
    /// has loose boxes.
    fn has_line_surplus(&self, state: &State) -> bool {
        let (height, width) = (self.height(), self.width());
        if height < 3 || width < 3 {
            return false;
        }

        let surplus = |cells: &mut dyn Iterator<Item = Position>| {
            let mut boxes = 0;
            let mut goals = 0;
            for pos in cells {
                let tile = state.tile(self.index(pos));
                if tile == Tile::Box {
                    boxes += 1;
                } else if tile.is_open_goal() {
                    goals += 1;
                }
            }
            boxes > goals
        };

        surplus(&mut (1..width - 1).map(|col| Position::new(1, col)))
            || surplus(&mut (1..width - 1).map(|col| Position::new(height - 2, col)))
            || surplus(&mut (1..height - 1).map(|row| Position::new(row, 1)))
            || surplus(&mut (1..height - 1).map(|row| Position::new(row, width - 2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::extract_state;
    use crate::game::Direction;
    use std::collections::{HashSet, VecDeque};

    fn load(input: &str) -> (Board, State, Position) {
        extract_state(&input.parse().unwrap()).unwrap()
    }

    /// Explore every state reachable from the start without pruning and
    /// report whether any of them is solved.
    fn can_reach_solved(board: &Board, state: &State, player: Position) -> bool {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(state.clone());
        queue.push_back((state.clone(), player));
        while let Some((state, player)) = queue.pop_front() {
            if state.is_solved() {
                return true;
            }
            for (_, successor) in board.successors(&state, player) {
                if seen.insert(successor.state.clone()) {
                    queue.push_back((successor.state, successor.player));
                }
            }
        }
        false
    }

    const OPEN: &str = "+++++++\n\
                        +-----+\n\
                        +-+---+\n\
                        ++-@*-+\n\
                        +-----+\n\
                        +---X-+\n\
                        +++++++";

    const CORNERED: &str = "+++++++\n\
                            +-----+\n\
                            +-+---+\n\
                            ++@*--+\n\
                            +-----+\n\
                            +---X-+\n\
                            +++++++";

    const FROZEN: &str = "+++++++\n\
                          +-----+\n\
                          +-++--+\n\
                          +-@@--+\n\
                          +--*XX+\n\
                          +-----+\n\
                          +++++++";

    const TOP_ROW: &str = "+++++++\n\
                           +--@--+\n\
                           +-----+\n\
                           +-*-X-+\n\
                           +++++++";

    #[test]
    fn test_open_board_is_not_deadlocked() {
        let (board, state, _) = load(OPEN);
        assert!(!board.is_deadlock(&state));
    }

    #[test]
    fn test_corner_deadlock() {
        let (board, state, _) = load(CORNERED);
        assert!(board.has_cornered_box(&state));
        assert!(board.is_deadlock(&state));
    }

    #[test]
    fn test_push_into_corner() {
        let (board, state, player) = load(OPEN);
        let next = board.apply_move(&state, player, Direction::Left).unwrap();
        assert_eq!(next.state, load(CORNERED).1);
        assert!(board.is_deadlock(&next.state));
    }

    #[test]
    fn test_box_on_goal_in_corner_is_fine() {
        let (board, state, _) = load(
            "++++++\n\
             +$---+\n\
             +--*-+\n\
             +--@X+\n\
             +----+\n\
             ++++++",
        );
        assert!(!board.has_cornered_box(&state));
        assert!(!board.is_deadlock(&state));
    }

    #[test]
    fn test_frozen_square() {
        let (board, state, _) = load(FROZEN);
        assert!(!board.has_cornered_box(&state));
        assert!(board.has_frozen_square(&state));
        assert!(board.is_deadlock(&state));
    }

    /// A 7x7 room with a loose box at (3,3) and the three cells of one of its
    /// squares filled with `fill`.
    fn square_board(square: &[(isize, isize); 3], fill: [char; 3]) -> String {
        let mut grid = vec![vec!['-'; 7]; 7];
        for (row, line) in grid.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                if row == 0 || row == 6 || col == 0 || col == 6 {
                    *cell = '+';
                }
            }
        }
        grid[3][3] = '@';
        for (&(d_row, d_col), symbol) in square.iter().zip(fill) {
            grid[(3 + d_row) as usize][(3 + d_col) as usize] = symbol;
        }
        if !fill.contains(&'*') {
            grid[5][5] = '*';
        }
        grid.iter()
            .map(|line| line.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_frozen_square_every_rotation() {
        let frozen = [
            ['@', '+', '@'],
            ['@', '@', '@'],
            ['$', '@', '$'],
            ['+', '$', '@'],
        ];
        let open = [['@', '-', '@'], ['@', '*', '@'], ['+', 'X', '+']];

        for square in &SQUARES {
            for fill in frozen {
                let input = square_board(square, fill);
                let (board, state, _) = load(&input);
                assert!(board.has_frozen_square(&state), "\n{}", input);
            }
            for fill in open {
                let input = square_board(square, fill);
                let (board, state, _) = load(&input);
                assert!(!board.has_frozen_square(&state), "\n{}", input);
            }
        }
    }

    #[test]
    fn test_square_with_player_is_not_frozen() {
        let (board, state, _) = load(
            "+++++++\n\
             +-----+\n\
             +-@*--+\n\
             +-@@--+\n\
             +--XXX+\n\
             +-----+\n\
             +++++++",
        );
        assert!(!board.has_frozen_square(&state));
    }

    #[test]
    fn test_square_of_boxes_on_goals_is_fine() {
        let (board, state, _) = load(
            "+++++++\n\
             +-----+\n\
             +-$$--+\n\
             +-$$*-+\n\
             +-----+\n\
             +++++++",
        );
        assert!(!board.is_deadlock(&state));
    }

    #[test]
    fn test_line_surplus() {
        let (board, state, _) = load(TOP_ROW);
        assert!(!board.has_cornered_box(&state));
        assert!(!board.has_frozen_square(&state));
        assert!(board.has_line_surplus(&state));
        assert!(board.is_deadlock(&state));

        let (board, state, _) = load(
            "+++++++\n\
             +--@X-+\n\
             +-----+\n\
             +-*---+\n\
             +++++++",
        );
        assert!(!board.is_deadlock(&state));
    }

    #[test]
    fn test_line_surplus_on_columns() {
        let (board, state, _) = load(
            "++++++\n\
             +----+\n\
             +---@+\n\
             +-*--+\n\
             +-X--+\n\
             ++++++",
        );
        assert!(board.has_line_surplus(&state));

        let (board, state, _) = load(
            "++++++\n\
             +----+\n\
             +@---+\n\
             +-*--+\n\
             +---X+\n\
             ++++++",
        );
        assert!(board.has_line_surplus(&state));
    }

    #[test]
    fn test_tiny_board_skips_line_check() {
        let (board, state, _) = load("*@X");
        assert!(!board.has_line_surplus(&state));
    }

    #[test]
    fn test_deadlocks_never_reach_solved() {
        for input in [CORNERED, FROZEN, TOP_ROW] {
            let (board, state, player) = load(input);
            assert!(board.is_deadlock(&state));
            assert!(!can_reach_solved(&board, &state, player), "{}", input);
        }

        let (board, state, player) = load(OPEN);
        assert!(can_reach_solved(&board, &state, player));
    }
}
