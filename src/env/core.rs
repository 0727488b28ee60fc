use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;

use crate::game::variables::{GRID_HEIGHT, GRID_WIDTH};
use crate::game::{walkable_cells, CellValue, GameState, Pos};

use super::{Action, ActionMask, ACTION_SPACE};

/// Squared-distance band ghosts are placed in around Pacman on a randomized
/// start, to keep the agent from spawning already trapped.
const RANDOM_START_MIN_DIST: usize = 6;
const RANDOM_START_MAX_DIST: usize = 12;

/// State and primitives shared by every environment variant: ownership of
/// the simulation, score bookkeeping, movement, the action mask and reset.
pub struct EnvCore {
    pub game_state: GameState,
    pub random_start: bool,
    last_score: u32,
    rng: ThreadRng,
}

impl EnvCore {
    pub fn new(random_start: bool) -> Self {
        let mut game_state = GameState::new();
        if random_start {
            for ghost in game_state.ghosts_mut() {
                ghost.clear_start_path();
            }
        }
        Self {
            game_state,
            random_start,
            last_score: 0,
            rng: rand::thread_rng(),
        }
    }

    /// Restart the game and unpause it. With randomized starts, Pacman goes
    /// to a uniformly random walkable cell and each ghost to a random cell
    /// whose squared distance from Pacman lies in the configured band
    /// (rejection-sampled).
    pub fn reset_game(&mut self) {
        self.last_score = 0;
        self.game_state.restart();
        if self.random_start {
            let cells = walkable_cells(&self.game_state.grid);
            let pac_pos = *cells.choose(&mut self.rng).unwrap();
            self.game_state.pacman.update(pac_pos);
            let ghost_cells: Vec<Pos> = (0..4)
                .map(|_| Self::pos_with_dist(&cells, pac_pos, &mut self.rng))
                .collect();
            for (ghost, pos) in self.game_state.ghosts_mut().into_iter().zip(ghost_cells) {
                ghost.set_position(pos);
            }
        }
        self.game_state.unpause();
    }

    fn pos_with_dist(cells: &[Pos], pac_pos: Pos, rng: &mut ThreadRng) -> Pos {
        let min_sq = (RANDOM_START_MIN_DIST * RANDOM_START_MIN_DIST) as isize;
        let max_sq = (RANDOM_START_MAX_DIST * RANDOM_START_MAX_DIST) as isize;
        loop {
            let pos = *cells.choose(rng).unwrap();
            let dx = pos.0 as isize - pac_pos.0 as isize;
            let dy = pos.1 as isize - pac_pos.1 as isize;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq >= min_sq && dist_sq <= max_sq {
                return pos;
            }
        }
    }

    /// Move Pacman one cell. The move clamps at the board edge and is
    /// silently dropped when the destination is a wall or the ghost door.
    pub fn move_one_cell(&mut self, action: Action) {
        let (x, y) = self.game_state.pacman.pos;
        let new_pos = match action {
            Action::Stay => (x, y),
            Action::Down => (x, (y + 1).min(GRID_HEIGHT - 1)),
            Action::Up => (x, y.saturating_sub(1)),
            Action::Left => (x.saturating_sub(1), y),
            Action::Right => ((x + 1).min(GRID_WIDTH - 1), y),
        };
        if self.game_state.is_walkable(new_pos) {
            self.game_state.pacman.update(new_pos);
        }
    }

    /// Blocked-direction indicators for Pacman's current cell; stay (index
    /// 0) is never blocked.
    pub fn action_mask(&self) -> ActionMask {
        let mut mask = [0u8; ACTION_SPACE];
        let (x, y) = self.game_state.pacman.pos;
        let grid = &self.game_state.grid;
        let blocked =
            |cell: CellValue| matches!(cell, CellValue::Wall | CellValue::GhostDoor);
        if y == GRID_HEIGHT - 1 || blocked(grid[x][y + 1]) {
            mask[Action::Down.index()] = 1;
        }
        if y == 0 || blocked(grid[x][y - 1]) {
            mask[Action::Up.index()] = 1;
        }
        if x == 0 || blocked(grid[x - 1][y]) {
            mask[Action::Left.index()] = 1;
        }
        if x == GRID_WIDTH - 1 || blocked(grid[x + 1][y]) {
            mask[Action::Right.index()] = 1;
        }
        mask
    }

    /// Advance the simulation `ticks` times.
    pub fn run_ticks(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.game_state.next_step();
        }
    }

    pub fn score(&self) -> u32 {
        self.game_state.score
    }

    /// Score gained since the previous call (or since reset). Signed, so a
    /// crafted or rolled-back score cannot underflow.
    pub fn consume_score_delta(&mut self) -> i64 {
        let delta = self.game_state.score as i64 - self.last_score as i64;
        self.last_score = self.game_state.score;
        delta
    }

    /// Ghost cells in red, pink, orange, blue order.
    pub fn ghost_positions(&self) -> [Pos; 4] {
        let ghosts = self.game_state.ghosts();
        [
            ghosts[0].current_pos,
            ghosts[1].current_pos,
            ghosts[2].current_pos,
            ghosts[3].current_pos,
        ]
    }
}
