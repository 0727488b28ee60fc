use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use super::grid::{CellValue, Grid};
use super::variables::FRIGHTENED_LENGTH;
use super::{neighbor, Direction, Pos};

/// Where a ghost reappears after being eaten.
pub const GHOST_HOME_POS: Pos = (12, 15);

/// Intersections where ghosts may not turn up (toward the house approaches).
const NO_UP_TILES: [Pos; 4] = [(12, 19), (15, 19), (12, 7), (15, 7)];

/// Ghosts leave the house through this column, crossing the door at
/// `(13, 18)` and emerging at `(13, 19)`.
const EXIT_COLUMN: usize = 13;
const EXIT_TOP: usize = 19;
/// Vertical extent of the house interior.
const HOUSE_LOW: usize = 15;
const HOUSE_HIGH: usize = 17;

const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostColor {
    Red,
    Pink,
    Orange,
    Blue,
}

struct InitState {
    pos: Pos,
    next: Pos,
    direction: Direction,
    /// Moves spent bouncing inside the house before heading for the door.
    home_moves: u32,
}

impl GhostColor {
    fn init(self) -> InitState {
        match self {
            GhostColor::Red => InitState {
                pos: (13, 19),
                next: (12, 19),
                direction: Direction::Left,
                home_moves: 0,
            },
            GhostColor::Pink => InitState {
                pos: (14, 15),
                next: (14, 16),
                direction: Direction::Up,
                home_moves: 3,
            },
            GhostColor::Blue => InitState {
                pos: (12, 15),
                next: (12, 16),
                direction: Direction::Up,
                home_moves: 19,
            },
            GhostColor::Orange => InitState {
                pos: (15, 15),
                next: (15, 16),
                direction: Direction::Up,
                home_moves: 35,
            },
        }
    }

    /// Corner aimed for in scatter phase. Deliberately off-board.
    pub fn scatter_target(self) -> (isize, isize) {
        match self {
            GhostColor::Red => (25, 32),
            GhostColor::Pink => (2, 32),
            GhostColor::Orange => (0, -1),
            GhostColor::Blue => (27, -1),
        }
    }
}

/// One ghost. Holds the two-slot position (where it is, where it will be
/// after its next move) that the observation builders read.
#[derive(Debug, Clone)]
pub struct Ghost {
    pub color: GhostColor,
    pub current_pos: Pos,
    pub next_pos: Pos,
    pub direction: Direction,
    fright: u32,
    home_moves: u32,
    exit_path: VecDeque<(Pos, Direction)>,
    scripted_start: bool,
}

impl Ghost {
    pub fn new(color: GhostColor) -> Self {
        let init = color.init();
        Self {
            color,
            current_pos: init.pos,
            next_pos: init.next,
            direction: init.direction,
            fright: 0,
            home_moves: init.home_moves,
            exit_path: VecDeque::new(),
            scripted_start: true,
        }
    }

    /// Put the ghost back in its round-start state.
    pub fn reset(&mut self) {
        let init = self.color.init();
        self.current_pos = init.pos;
        self.next_pos = init.next;
        self.direction = init.direction;
        self.fright = 0;
        self.home_moves = if self.scripted_start {
            init.home_moves
        } else {
            0
        };
        self.exit_path.clear();
    }

    /// Disable the scripted house-exit behavior. Used by randomized starts,
    /// where the wrapper teleports the ghost somewhere else anyway.
    pub fn clear_start_path(&mut self) {
        self.scripted_start = false;
        self.home_moves = 0;
        self.exit_path.clear();
    }

    /// Teleport to `pos`. Only the environment wrappers call this, and only
    /// while setting up a randomized start.
    pub fn set_position(&mut self, pos: Pos) {
        self.current_pos = pos;
        self.next_pos = pos;
    }

    pub fn is_frightened(&self) -> bool {
        self.fright > 0
    }

    /// Ghost moves left on this ghost's fright timer.
    pub fn frightened_remaining(&self) -> u32 {
        self.fright
    }

    /// Enter the frightened phase and turn around.
    pub fn set_frightened(&mut self) {
        self.fright = FRIGHTENED_LENGTH;
        self.direction = self.direction.opposite();
    }

    pub fn reverse(&mut self) {
        self.direction = self.direction.opposite();
    }

    /// Eaten: reappear inside the house and queue the walk back out.
    pub fn send_home(&mut self) {
        self.fright = 0;
        self.home_moves = 0;
        self.current_pos = GHOST_HOME_POS;
        self.next_pos = GHOST_HOME_POS;
        self.exit_path = Self::exit_path_from(GHOST_HOME_POS);
    }

    /// Commit the pending move, then pick the next one. `target` is the cell
    /// being chased (scatter corner or chase target); `None` means
    /// frightened, i.e. a uniformly random legal move.
    pub fn advance(&mut self, grid: &Grid, target: Option<(isize, isize)>, rng: &mut impl Rng) {
        self.current_pos = self.next_pos;
        if self.fright > 0 {
            self.fright -= 1;
        }

        if let Some((pos, direction)) = self.exit_path.pop_front() {
            self.next_pos = pos;
            self.direction = direction;
            return;
        }

        if self.home_moves > 0 {
            self.home_moves -= 1;
            self.bounce();
            return;
        }

        // Done waiting but still inside the house: queue the walk out.
        let (x, y) = self.current_pos;
        if grid[x][y] == CellValue::GhostDoor {
            self.exit_path = Self::exit_path_from(self.current_pos);
            if let Some((pos, direction)) = self.exit_path.pop_front() {
                self.next_pos = pos;
                self.direction = direction;
            }
            return;
        }

        let candidates = self.legal_moves(grid);
        let chosen = if self.fright > 0 {
            candidates.choose(rng).copied()
        } else {
            let target = target.unwrap_or_else(|| self.color.scatter_target());
            candidates.iter().copied().min_by_key(|(pos, _)| {
                let dx = pos.0 as isize - target.0;
                let dy = pos.1 as isize - target.1;
                dx * dx + dy * dy
            })
        };

        if let Some((pos, direction)) = chosen {
            self.next_pos = pos;
            self.direction = direction;
        } else {
            // Dead end: turn around.
            self.direction = self.direction.opposite();
            if let Some(pos) = neighbor(self.current_pos, self.direction) {
                self.next_pos = pos;
            }
        }
    }

    /// Moves available from the current cell: on the board, not into walls
    /// or the house, no reversing, and no turning up on the restricted
    /// tiles.
    fn legal_moves(&self, grid: &Grid) -> Vec<(Pos, Direction)> {
        let reverse = self.direction.opposite();
        ALL_DIRECTIONS
            .iter()
            .filter(|&&dir| dir != reverse)
            .filter(|&&dir| !(dir == Direction::Up && NO_UP_TILES.contains(&self.current_pos)))
            .filter_map(|&dir| neighbor(self.current_pos, dir).map(|pos| (pos, dir)))
            .filter(|&(pos, _)| {
                !matches!(grid[pos.0][pos.1], CellValue::Wall | CellValue::GhostDoor)
            })
            .collect()
    }

    /// Idle up/down shuffle inside the house.
    fn bounce(&mut self) {
        let mut direction = match self.direction {
            Direction::Up | Direction::Down => self.direction,
            _ => Direction::Up,
        };
        let y = self.current_pos.1;
        if direction == Direction::Up && y >= HOUSE_HIGH {
            direction = Direction::Down;
        } else if direction == Direction::Down && y <= HOUSE_LOW {
            direction = Direction::Up;
        }
        if let Some(pos) = neighbor(self.current_pos, direction) {
            self.next_pos = pos;
            self.direction = direction;
        }
    }

    /// The walk from a cell inside the house out through the door: down to
    /// the house floor, across to the exit column, then straight up past
    /// the door.
    fn exit_path_from(from: Pos) -> VecDeque<(Pos, Direction)> {
        let mut path = VecDeque::new();
        let (mut x, mut y) = from;
        while y > HOUSE_LOW {
            y -= 1;
            path.push_back(((x, y), Direction::Down));
        }
        while x < EXIT_COLUMN {
            x += 1;
            path.push_back(((x, y), Direction::Right));
        }
        while x > EXIT_COLUMN {
            x -= 1;
            path.push_back(((x, y), Direction::Left));
        }
        while y < EXIT_TOP {
            y += 1;
            path.push_back(((x, y), Direction::Up));
        }
        path
    }
}
