use burn::tensor::{backend::Backend, Tensor};

use crate::game::variables::{GHOST_SCORE, GRID_HEIGHT, GRID_WIDTH};
use crate::game::{CellValue, GameState};

use super::core::EnvCore;
use super::{
    cell_index, finite_or_zero, plane_tensor, Action, ActionMask, EnvConfig, Observation,
    PacmanEnv, StepInfo, StepResult,
};

const DEFAULT_TICKS_PER_STEP: u32 = 12;

/// Divisor bringing raw cell codes into `[0, 1]`.
const CELL_CODE_SCALE: f32 = CellValue::Cherry as u8 as f32;

/// The grid-stack variant: two planes, raw cell codes and entity codes,
/// with rewards as raw score deltas scaled by the ghost score.
pub struct NaiveEnv<B: Backend> {
    core: EnvCore,
    ticks_per_step: u32,
    device: B::Device,
}

impl<B: Backend> NaiveEnv<B> {
    pub fn new(config: EnvConfig, device: B::Device) -> Self {
        Self {
            core: EnvCore::new(config.random_start),
            ticks_per_step: config.ticks_per_step.unwrap_or(DEFAULT_TICKS_PER_STEP),
            device,
        }
    }

    fn build_obs(&self) -> Observation<B> {
        let state = &self.core.game_state;

        let mut codes = vec![0.0f32; GRID_WIDTH * GRID_HEIGHT];
        for x in 0..GRID_WIDTH {
            for y in 0..GRID_HEIGHT {
                codes[cell_index(x, y)] = u8::from(state.grid[x][y]) as f32 / CELL_CODE_SCALE;
            }
        }

        // Ghosts carry codes 2..=5 (or -1 while frightened); Pacman is
        // written last so its cell always reads 1.
        let mut entities = vec![0.0f32; GRID_WIDTH * GRID_HEIGHT];
        let frightened = state.is_frightened();
        for (ghost, code) in [
            (&state.red, 2.0),
            (&state.blue, 3.0),
            (&state.pink, 4.0),
            (&state.orange, 5.0),
        ] {
            let (x, y) = ghost.current_pos;
            entities[cell_index(x, y)] = if frightened { -1.0 } else { code };
        }
        let (px, py) = state.pacman.pos;
        entities[cell_index(px, py)] = 1.0;

        Observation::Grid(Tensor::stack(
            vec![
                plane_tensor::<B>(codes, &self.device),
                plane_tensor::<B>(entities, &self.device),
            ],
            0,
        ))
    }
}

impl<B: Backend> PacmanEnv<B> for NaiveEnv<B> {
    fn reset(&mut self) -> (Observation<B>, StepInfo) {
        self.core.reset_game();
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

        let done = !self.core.game_state.play;
        let delta = self.core.consume_score_delta();
        let mut reward = delta as f32 / GHOST_SCORE as f32;
        if done {
            reward = 0.0;
        }
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
        vec![2, GRID_WIDTH, GRID_HEIGHT]
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
