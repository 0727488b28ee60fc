use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::rngs::ThreadRng;

use super::ghost::{Ghost, GhostColor};
use super::grid::{count_cells, CellValue, Grid};
use super::maze::MAZE;
use super::pacman::Pacman;
use super::variables::{
    CHERRY_PELLET_THRESHOLDS, CHERRY_POS, CHERRY_SCORE, GHOST_SCORE, PELLET_SCORE,
    PHASE_SWAP_TIMES, POWER_PELLET_SCORE, STARTING_LIVES, TICKS_PER_UPDATE,
};
use super::Pos;

/// Ghost behavior phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Phase {
    Scatter = 1,
    Chase = 2,
    Frightened = 3,
}

/// The full game simulation: board, entities, score and lifecycle.
///
/// A fresh or restarted game is paused; call [`GameState::unpause`] before
/// driving it with [`GameState::next_step`].
pub struct GameState {
    pub grid: Grid,
    pub pacman: Pacman,

    pub red: Ghost,
    pub pink: Ghost,
    pub orange: Ghost,
    pub blue: Ghost,

    pub score: u32,
    pub lives: u32,
    pub play: bool,

    /// Scatter/chase alternation; fright overlays this, see [`Self::phase`].
    base_phase: Phase,
    phase_moves: u32,
    swap_index: usize,
    ticks: u32,
    pellets: u32,
    cherries_spawned: usize,
    rng: ThreadRng,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            grid: MAZE,
            pacman: Pacman::new(),
            red: Ghost::new(GhostColor::Red),
            pink: Ghost::new(GhostColor::Pink),
            orange: Ghost::new(GhostColor::Orange),
            blue: Ghost::new(GhostColor::Blue),
            score: 0,
            lives: STARTING_LIVES,
            play: false,
            base_phase: Phase::Scatter,
            phase_moves: 0,
            swap_index: 0,
            ticks: 0,
            pellets: count_cells(&MAZE, CellValue::Pellet),
            cherries_spawned: 0,
            rng: rand::thread_rng(),
        }
    }

    /// Start a fresh round: full board, entities at their starting cells,
    /// score and lives reset, game paused.
    pub fn restart(&mut self) {
        self.grid = MAZE;
        self.pacman.reset();
        self.red.reset();
        self.pink.reset();
        self.orange.reset();
        self.blue.reset();
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.play = false;
        self.base_phase = Phase::Scatter;
        self.phase_moves = 0;
        self.swap_index = 0;
        self.ticks = 0;
        self.pellets = count_cells(&MAZE, CellValue::Pellet);
        self.cherries_spawned = 0;
    }

    pub fn pause(&mut self) {
        self.play = false;
    }

    pub fn unpause(&mut self) {
        self.play = true;
    }

    /// The ghosts in red, pink, orange, blue order.
    pub fn ghosts(&self) -> [&Ghost; 4] {
        [&self.red, &self.pink, &self.orange, &self.blue]
    }

    pub fn ghosts_mut(&mut self) -> [&mut Ghost; 4] {
        [
            &mut self.red,
            &mut self.pink,
            &mut self.orange,
            &mut self.blue,
        ]
    }

    pub fn is_frightened(&self) -> bool {
        self.ghosts().iter().any(|ghost| ghost.is_frightened())
    }

    /// Ghost moves left on the longest-running fright timer.
    pub fn frightened_remaining(&self) -> u32 {
        self.ghosts()
            .iter()
            .map(|ghost| ghost.frightened_remaining())
            .max()
            .unwrap_or(0)
    }

    /// The phase the ghosts are acting under right now.
    pub fn phase(&self) -> Phase {
        if self.is_frightened() {
            Phase::Frightened
        } else {
            self.base_phase
        }
    }

    pub fn pellets_remaining(&self) -> u32 {
        self.pellets
    }

    /// Advance the simulation by one tick. Ghosts (and the phase clock)
    /// move once every [`TICKS_PER_UPDATE`] ticks; item pickup and contact
    /// resolution happen every tick. Does nothing while paused.
    pub fn next_step(&mut self) {
        if !self.play {
            return;
        }
        self.ticks += 1;
        if self.ticks % TICKS_PER_UPDATE == 0 {
            self.step_ghosts();
            self.update_phase();
            self.update_cherry();
        }
        self.collect_items();
        self.resolve_collisions();
    }

    fn step_ghosts(&mut self) {
        let targets = [
            self.chase_target(GhostColor::Red),
            self.chase_target(GhostColor::Pink),
            self.chase_target(GhostColor::Orange),
            self.chase_target(GhostColor::Blue),
        ];
        let chase = self.base_phase == Phase::Chase;
        for (ghost, chase_target) in [
            &mut self.red,
            &mut self.pink,
            &mut self.orange,
            &mut self.blue,
        ]
        .into_iter()
        .zip(targets)
        {
            let target = if ghost.is_frightened() {
                None
            } else if chase {
                Some(chase_target)
            } else {
                Some(ghost.color.scatter_target())
            };
            ghost.advance(&self.grid, target, &mut self.rng);
        }
    }

    /// Classic per-color chase targeting.
    fn chase_target(&self, color: GhostColor) -> (isize, isize) {
        let (px, py) = self.pacman.pos;
        let pac = (px as isize, py as isize);
        let (dx, dy) = self.pacman.direction.delta();
        match color {
            GhostColor::Red => pac,
            GhostColor::Pink => (pac.0 + 4 * dx, pac.1 + 4 * dy),
            GhostColor::Blue => {
                let pivot = (pac.0 + 2 * dx, pac.1 + 2 * dy);
                let (rx, ry) = self.red.current_pos;
                (2 * pivot.0 - rx as isize, 2 * pivot.1 - ry as isize)
            }
            GhostColor::Orange => {
                let (ox, oy) = self.orange.current_pos;
                let dist = (ox as isize - pac.0).abs() + (oy as isize - pac.1).abs();
                if dist > 8 {
                    pac
                } else {
                    color.scatter_target()
                }
            }
        }
    }

    fn update_phase(&mut self) {
        self.phase_moves += 1;
        if self.swap_index < PHASE_SWAP_TIMES.len()
            && self.phase_moves == PHASE_SWAP_TIMES[self.swap_index]
        {
            self.swap_index += 1;
            self.base_phase = match self.base_phase {
                Phase::Chase => Phase::Scatter,
                _ => Phase::Chase,
            };
            for ghost in self.ghosts_mut() {
                ghost.reverse();
            }
        }
    }

    fn update_cherry(&mut self) {
        if self.cherries_spawned < CHERRY_PELLET_THRESHOLDS.len()
            && self.pellets <= CHERRY_PELLET_THRESHOLDS[self.cherries_spawned]
            && self.grid[CHERRY_POS.0][CHERRY_POS.1] == CellValue::Empty
        {
            self.grid[CHERRY_POS.0][CHERRY_POS.1] = CellValue::Cherry;
            self.cherries_spawned += 1;
        }
    }

    /// Pick up whatever Pacman is standing on.
    fn collect_items(&mut self) {
        let (x, y) = self.pacman.pos;
        match self.grid[x][y] {
            CellValue::Pellet => {
                self.grid[x][y] = CellValue::Empty;
                self.score += PELLET_SCORE;
                self.pellets -= 1;
                if self.pellets == 0 {
                    // Board cleared: round over.
                    self.play = false;
                }
            }
            CellValue::PowerPellet => {
                self.grid[x][y] = CellValue::Empty;
                self.score += POWER_PELLET_SCORE;
                for ghost in self.ghosts_mut() {
                    ghost.set_frightened();
                }
            }
            CellValue::Cherry => {
                self.grid[x][y] = CellValue::Empty;
                self.score += CHERRY_SCORE;
            }
            _ => {}
        }
    }

    /// Ghost contact: eat frightened ghosts, otherwise lose a life. A ghost
    /// counts as touching Pacman from its current cell or the cell it is
    /// about to enter.
    fn resolve_collisions(&mut self) {
        let pac = self.pacman.pos;
        let mut eaten = 0u32;
        let mut died = false;
        for ghost in [
            &mut self.red,
            &mut self.pink,
            &mut self.orange,
            &mut self.blue,
        ] {
            if ghost.current_pos != pac && ghost.next_pos != pac {
                continue;
            }
            if ghost.is_frightened() {
                eaten += 1;
                ghost.send_home();
            } else {
                died = true;
            }
        }
        self.score += eaten * GHOST_SCORE;
        if died {
            self.die();
        }
    }

    fn die(&mut self) {
        self.lives -= 1;
        if self.lives == 0 {
            self.play = false;
            return;
        }
        self.pacman.reset();
        self.red.reset();
        self.pink.reset();
        self.orange.reset();
        self.blue.reset();
    }

    /// True if Pacman may occupy `pos`.
    pub fn is_walkable(&self, pos: Pos) -> bool {
        super::grid::is_walkable(&self.grid, pos)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::variables::{FRIGHTENED_LENGTH, GRID_HEIGHT, GRID_WIDTH};
    use super::*;

    #[test]
    fn test_new_game_is_paused() {
        let mut state = GameState::new();
        assert!(!state.play);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, STARTING_LIVES);
        let before = state.red.current_pos;
        state.next_step();
        assert_eq!(state.red.current_pos, before);
    }

    #[test]
    fn test_pellet_scoring() {
        let mut state = GameState::new();
        state.unpause();
        let pellets = state.pellets_remaining();
        state.pacman.update((1, 1));
        assert_eq!(state.grid[1][1], CellValue::Pellet);
        state.next_step();
        assert_eq!(state.score, PELLET_SCORE);
        assert_eq!(state.grid[1][1], CellValue::Empty);
        assert_eq!(state.pellets_remaining(), pellets - 1);
        // Standing still must not collect twice.
        state.next_step();
        assert_eq!(state.score, PELLET_SCORE);
    }

    #[test]
    fn test_power_pellet_frightens_ghosts() {
        let mut state = GameState::new();
        state.unpause();
        state.pacman.update((1, 7));
        state.next_step();
        assert_eq!(state.score, POWER_PELLET_SCORE);
        assert!(state.is_frightened());
        assert_eq!(state.phase(), Phase::Frightened);
        assert_eq!(state.frightened_remaining(), FRIGHTENED_LENGTH);
    }

    #[test]
    fn test_eating_a_frightened_ghost() {
        let mut state = GameState::new();
        state.unpause();
        state.pacman.update((1, 7));
        state.next_step();
        let base = state.score;
        state.red.set_position(state.pacman.pos);
        state.next_step();
        assert_eq!(state.score, base + GHOST_SCORE);
        assert_ne!(state.red.current_pos, state.pacman.pos);
        assert!(!state.red.is_frightened());
    }

    #[test]
    fn test_ghost_contact_costs_a_life() {
        let mut state = GameState::new();
        state.unpause();
        let pac = state.pacman.pos;
        state.red.set_position(pac);
        state.next_step();
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert!(state.play);
        // Entities respawned apart from each other.
        assert_ne!(state.red.current_pos, state.pacman.pos);
    }

    #[test]
    fn test_last_life_ends_the_game() {
        let mut state = GameState::new();
        state.unpause();
        state.lives = 1;
        state.red.set_position(state.pacman.pos);
        state.next_step();
        assert_eq!(state.lives, 0);
        assert!(!state.play);
    }

    #[test]
    fn test_phase_swap_schedule() {
        let mut state = GameState::new();
        assert_eq!(state.phase(), Phase::Scatter);
        for _ in 0..PHASE_SWAP_TIMES[0] {
            state.update_phase();
        }
        assert_eq!(state.phase(), Phase::Chase);
        for _ in PHASE_SWAP_TIMES[0]..PHASE_SWAP_TIMES[1] {
            state.update_phase();
        }
        assert_eq!(state.phase(), Phase::Scatter);
    }

    #[test]
    fn test_ghosts_stay_on_legal_cells() {
        let mut state = GameState::new();
        state.unpause();
        for _ in 0..500 {
            state.next_step();
            if !state.play {
                break;
            }
            for ghost in state.ghosts() {
                let (x, y) = ghost.current_pos;
                assert!(x < GRID_WIDTH && y < GRID_HEIGHT);
                assert_ne!(state.grid[x][y], CellValue::Wall);
            }
        }
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = GameState::new();
        state.unpause();
        state.pacman.update((1, 1));
        for _ in 0..50 {
            state.next_step();
        }
        state.restart();
        assert!(!state.play);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.pellets_remaining(), 240);
        assert_eq!(
            state.pacman.pos,
            super::super::variables::PACMAN_STARTING_POS
        );
    }

    #[test]
    fn test_cherry_spawns_at_threshold() {
        let mut state = GameState::new();
        state.pellets = CHERRY_PELLET_THRESHOLDS[0];
        state.update_cherry();
        assert_eq!(state.grid[CHERRY_POS.0][CHERRY_POS.1], CellValue::Cherry);
    }
}
