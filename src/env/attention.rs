use burn::tensor::{backend::Backend, Tensor};

use crate::game::variables::{
    CHERRY_SCORE, GHOST_SCORE, GRID_HEIGHT, GRID_WIDTH, PELLET_SCORE, POWER_PELLET_SCORE,
};
use crate::game::{CellValue, GameState};

use super::core::EnvCore;
use super::{
    cell_index, finite_or_zero, plane_tensor, Action, ActionMask, EnvConfig, Observation,
    PacmanEnv, StepInfo, StepResult,
};

const DEFAULT_TICKS_PER_STEP: u32 = 12;

/// Per-step decay of the entity trail planes.
const TRAIL_DECAY: f32 = 0.5;

/// The self-attention layout, kept for comparison with older experiments:
/// fading trail planes per entity, a log-compressed item map, a distance
/// field and ghost phase planes.
pub struct AttentionEnv<B: Backend> {
    core: EnvCore,
    ticks_per_step: u32,
    device: B::Device,
    pacman_trail: Vec<f32>,
    /// Trails in red, blue, pink, orange order.
    ghost_trails: [Vec<f32>; 4],
    last_lives: u32,
}

impl<B: Backend> AttentionEnv<B> {
    pub fn new(config: EnvConfig, device: B::Device) -> Self {
        let core = EnvCore::new(config.random_start);
        let plane = GRID_WIDTH * GRID_HEIGHT;
        let last_lives = core.game_state.lives;
        Self {
            core,
            ticks_per_step: config.ticks_per_step.unwrap_or(DEFAULT_TICKS_PER_STEP),
            device,
            pacman_trail: vec![0.0; plane],
            ghost_trails: std::array::from_fn(|_| vec![0.0; plane]),
            last_lives,
        }
    }

    fn trailed_ghosts(state: &GameState) -> [(usize, usize); 4] {
        [
            state.red.current_pos,
            state.blue.current_pos,
            state.pink.current_pos,
            state.orange.current_pos,
        ]
    }

    /// Halve every trail, then mark the entities' current cells.
    fn update_trails(&mut self) {
        let state = &self.core.game_state;
        for value in self.pacman_trail.iter_mut() {
            *value *= TRAIL_DECAY;
        }
        let (px, py) = state.pacman.pos;
        self.pacman_trail[cell_index(px, py)] = 1.0;

        for (trail, (x, y)) in self.ghost_trails.iter_mut().zip(Self::trailed_ghosts(state)) {
            for value in trail.iter_mut() {
                *value *= TRAIL_DECAY;
            }
            trail[cell_index(x, y)] = 1.0;
        }
    }

    fn clear_trails(&mut self) {
        for value in self.pacman_trail.iter_mut() {
            *value = 0.0;
        }
        for trail in self.ghost_trails.iter_mut() {
            for value in trail.iter_mut() {
                *value = 0.0;
            }
        }
    }

    fn build_obs(&self) -> Observation<B> {
        let state = &self.core.game_state;
        let plane = GRID_WIDTH * GRID_HEIGHT;
        let frightened = state.is_frightened();
        let log_scale = (GHOST_SCORE as f32).ln();

        let mut items = vec![0.0f32; plane];
        for x in 0..GRID_WIDTH {
            for y in 0..GRID_HEIGHT {
                items[cell_index(x, y)] = match state.grid[x][y] {
                    CellValue::Pellet => PELLET_SCORE as f32,
                    CellValue::PowerPellet => POWER_PELLET_SCORE as f32,
                    CellValue::Cherry => CHERRY_SCORE as f32,
                    _ => 0.0,
                };
            }
        }
        if frightened {
            for ghost in state.ghosts() {
                let (x, y) = ghost.current_pos;
                items[cell_index(x, y)] += GHOST_SCORE as f32;
            }
        }
        for value in items.iter_mut() {
            *value = (1.0 + *value).ln() / log_scale;
        }

        // Inverted, squared Manhattan distance from Pacman; sharpest near
        // Pacman, fading toward the far corners.
        let (px, py) = state.pacman.pos;
        let span = (GRID_WIDTH + GRID_HEIGHT) as f32;
        let mut distance = vec![0.0f32; plane];
        for x in 0..GRID_WIDTH {
            for y in 0..GRID_HEIGHT {
                let manhattan = (x as isize - px as isize).abs() + (y as isize - py as isize).abs();
                let inverted = 1.0 - manhattan as f32 / span;
                distance[cell_index(x, y)] = inverted * inverted;
            }
        }

        let mut phase_planes = vec![vec![0.0f32; plane]; 3];
        let phase_slot = u8::from(state.phase()) as usize - 1;
        for ghost in state.ghosts() {
            let (x, y) = ghost.current_pos;
            phase_planes[phase_slot][cell_index(x, y)] = 1.0;
        }

        let mut planes = vec![self.pacman_trail.clone(), items, distance];
        planes.extend(self.ghost_trails.iter().cloned());
        planes.extend(phase_planes);

        Observation::Grid(Tensor::stack(
            planes
                .into_iter()
                .map(|data| plane_tensor::<B>(data, &self.device))
                .collect(),
            0,
        ))
    }
}

impl<B: Backend> PacmanEnv<B> for AttentionEnv<B> {
    fn reset(&mut self) -> (Observation<B>, StepInfo) {
        self.core.reset_game();
        self.clear_trails();
        self.update_trails();
        self.last_lives = self.core.game_state.lives;
        (
            self.build_obs(),
            StepInfo {
                action_mask: Some(self.core.action_mask()),
            },
        )
    }

    fn step(&mut self, action: Action) -> StepResult<B> {
        self.core.move_one_cell(action);
        self.core.run_ticks(self.ticks_per_step);
        self.update_trails();

        let done = !self.core.game_state.play;
        let delta = self.core.consume_score_delta();
        let mut reward = (1.0 + delta as f32).ln() / (GHOST_SCORE as f32).ln();
        let lives = self.core.game_state.lives;
        if lives < self.last_lives {
            reward = -1.0;
        }
        self.last_lives = lives;
        let reward = finite_or_zero(reward);

        StepResult {
            observation: self.build_obs(),
            reward,
            done,
            truncated: false,
            info: StepInfo {
                action_mask: Some(self.core.action_mask()),
            },
        }
    }

    fn observation_shape(&self) -> Vec<usize> {
        vec![10, GRID_WIDTH, GRID_HEIGHT]
    }

    fn action_mask(&self) -> ActionMask {
        self.core.action_mask()
    }

    fn score(&self) -> u32 {
        self.core.score()
    }

    fn game_state(&self) -> &GameState {
        &self.core.game_state
    }
}
