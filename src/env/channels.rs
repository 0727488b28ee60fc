use burn::tensor::{backend::Backend, Tensor};

use crate::game::variables::{
    CHERRY_SCORE, FRIGHTENED_LENGTH, GHOST_SCORE, GRID_HEIGHT, GRID_WIDTH, PELLET_SCORE,
    POWER_PELLET_SCORE, STARTING_LIVES,
};
use crate::game::{CellValue, GameState, Phase, Pos};

use super::core::EnvCore;
use super::{
    cell_index, finite_or_zero, plane_tensor, Action, ActionMask, EnvConfig, Observation,
    PacmanEnv, StepInfo, StepResult,
};

const DEFAULT_TICKS_PER_STEP: u32 = 8;

/// Penalty applied when a direction change doubles the tick burst.
const TURN_PENALTY: f32 = 0.05;

/// The semantic-channel variant: 15 planes separating walls, item rewards,
/// Pacman (previous and current), ghosts (current and last-changed) and the
/// ghost phase. Changing direction doubles the simulated ticks, nudging the
/// agent toward momentum.
pub struct ChannelsEnv<B: Backend> {
    core: EnvCore,
    ticks_per_step: u32,
    device: B::Device,
    /// Ghost cells from just before their most recent actual move; stable
    /// between ghost moves so the planes do not flicker with tick phase.
    last_ghost_pos: [Pos; 4],
    last_action: Action,
    last_pacman_pos: Pos,
}

impl<B: Backend> ChannelsEnv<B> {
    pub fn new(config: EnvConfig, device: B::Device) -> Self {
        let core = EnvCore::new(config.random_start);
        let last_ghost_pos = core.ghost_positions();
        let last_pacman_pos = core.game_state.pacman.pos;
        Self {
            core,
            ticks_per_step: config.ticks_per_step.unwrap_or(DEFAULT_TICKS_PER_STEP),
            device,
            last_ghost_pos,
            last_action: Action::Stay,
            last_pacman_pos,
        }
    }

    fn build_obs(&self) -> Observation<B> {
        let state = &self.core.game_state;
        let plane = GRID_WIDTH * GRID_HEIGHT;
        let frightened = state.is_frightened();

        let mut walls = vec![0.0f32; plane];
        let mut items = vec![0.0f32; plane];
        for x in 0..GRID_WIDTH {
            for y in 0..GRID_HEIGHT {
                let index = cell_index(x, y);
                match state.grid[x][y] {
                    CellValue::Wall | CellValue::GhostDoor => walls[index] = 1.0,
                    CellValue::Pellet => items[index] = PELLET_SCORE as f32,
                    CellValue::PowerPellet => items[index] = POWER_PELLET_SCORE as f32,
                    CellValue::Cherry => items[index] = CHERRY_SCORE as f32,
                    _ => {}
                }
            }
        }
        if frightened {
            for ghost in state.ghosts() {
                let (x, y) = ghost.current_pos;
                items[cell_index(x, y)] += GHOST_SCORE as f32;
            }
        }
        for value in items.iter_mut() {
            *value /= GHOST_SCORE as f32;
        }

        let mut pacman_prev = vec![0.0f32; plane];
        let mut pacman_now = vec![0.0f32; plane];
        pacman_prev[cell_index(self.last_pacman_pos.0, self.last_pacman_pos.1)] = 1.0;
        let (px, py) = state.pacman.pos;
        pacman_now[cell_index(px, py)] = 1.0;

        let mut ghost_planes = vec![vec![0.0f32; plane]; 4];
        let mut last_ghost_planes = vec![vec![0.0f32; plane]; 4];
        let mut phase_planes = vec![vec![0.0f32; plane]; 3];
        let phase = state.phase();
        let phase_slot = u8::from(phase) as usize - 1;
        let phase_value = if phase == Phase::Frightened {
            state.frightened_remaining() as f32 / FRIGHTENED_LENGTH as f32
        } else {
            1.0
        };
        for (slot, ghost) in state.ghosts().into_iter().enumerate() {
            let (x, y) = ghost.current_pos;
            ghost_planes[slot][cell_index(x, y)] = 1.0;
            phase_planes[phase_slot][cell_index(x, y)] = phase_value;
            let (lx, ly) = self.last_ghost_pos[slot];
            last_ghost_planes[slot][cell_index(lx, ly)] = 1.0;
        }

        let mut planes = vec![walls, items, pacman_prev, pacman_now];
        planes.extend(ghost_planes);
        planes.extend(last_ghost_planes);
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

impl<B: Backend> PacmanEnv<B> for ChannelsEnv<B> {
    fn reset(&mut self) -> (Observation<B>, StepInfo) {
        self.core.reset_game();
        self.last_ghost_pos = self.core.ghost_positions();
        self.last_action = Action::Stay;
        self.last_pacman_pos = self.core.game_state.pacman.pos;
        (
            self.build_obs(),
            StepInfo {
                action_mask: Some(self.core.action_mask()),
            },
        )
    }

    fn step(&mut self, action: Action) -> StepResult<B> {
        self.last_pacman_pos = self.core.game_state.pacman.pos;
        self.core.move_one_cell(action);

        let before = self.core.ghost_positions();

        // Changing direction costs double the ticks.
        let tick_mult = if self.last_action == action || self.last_action == Action::Stay {
            1
        } else {
            2
        };
        for _ in 0..self.ticks_per_step * tick_mult {
            self.core.game_state.next_step();
            if !self.core.game_state.play {
                break;
            }
        }
        self.last_action = action;

        if before != self.core.ghost_positions() {
            self.last_ghost_pos = before;
        }

        let done = !self.core.game_state.play;
        let delta = self.core.consume_score_delta();
        let mut reward = delta as f32 / GHOST_SCORE as f32;
        if tick_mult == 2 {
            reward -= TURN_PENALTY;
        }
        if done && self.core.game_state.lives < STARTING_LIVES {
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
        vec![15, GRID_WIDTH, GRID_HEIGHT]
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

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};

    type TestBackend = NdArray<f32>;

    fn make_env() -> ChannelsEnv<TestBackend> {
        ChannelsEnv::new(EnvConfig::default(), NdArrayDevice::default())
    }

    fn ghost_history_planes(obs: &Observation<TestBackend>) -> Vec<f32> {
        let plane = GRID_WIDTH * GRID_HEIGHT;
        obs.to_values()[8 * plane..12 * plane].to_vec()
    }

    #[test]
    fn test_observation_shape() {
        let mut env = make_env();
        let (obs, info) = env.reset();
        assert_eq!(obs.shape(), vec![15, GRID_WIDTH, GRID_HEIGHT]);
        assert!(info.action_mask.is_some());
    }

    #[test]
    fn test_wall_plane_matches_grid() {
        let mut env = make_env();
        let (obs, _) = env.reset();
        let values = obs.to_values();
        assert_eq!(values[cell_index(0, 0)], 1.0);
        let (px, py) = env.game_state().pacman.pos;
        assert_eq!(values[cell_index(px, py)], 0.0);
    }

    #[test]
    fn test_last_ghost_planes_hold_until_a_move() {
        let mut env = make_env();
        let (obs, _) = env.reset();
        let initial = ghost_history_planes(&obs);

        // 8 ticks: ghosts (which move every 12) have not moved yet, so the
        // history planes must be unchanged.
        let first = env.step(Action::Stay);
        let before_first_move = env.core.ghost_positions();
        assert_eq!(before_first_move, env.ghost_start_positions());
        assert_eq!(ghost_history_planes(&first.observation), initial);

        // 16 ticks in: the ghosts moved, and the history planes must now
        // show where they stood before that move.
        let second = env.step(Action::Stay);
        assert_ne!(env.core.ghost_positions(), before_first_move);
        let plane = GRID_WIDTH * GRID_HEIGHT;
        let history = ghost_history_planes(&second.observation);
        for (slot, pos) in before_first_move.into_iter().enumerate() {
            assert_eq!(history[slot * plane + cell_index(pos.0, pos.1)], 1.0);
        }
    }

    #[test]
    fn test_direction_change_costs_penalty() {
        let mut env = make_env();
        env.reset();
        // Establish a direction, then turn. Both cells on Pacman's path are
        // empty, so the only reward contribution is the turn penalty.
        env.step(Action::Left);
        let result = env.step(Action::Right);
        assert_eq!(result.reward, -TURN_PENALTY);
    }

    #[test]
    fn test_terminal_with_lost_life_zeroes_reward() {
        let mut env = make_env();
        env.reset();
        env.core.game_state.score = 3 * GHOST_SCORE;
        env.core.game_state.lives = 1;
        let pac = env.core.game_state.pacman.pos;
        env.core.game_state.red.set_position(pac);
        let result = env.step(Action::Stay);
        assert!(result.done);
        assert!(env.core.game_state.lives < STARTING_LIVES);
        assert_eq!(result.reward, 0.0);
    }

    #[test]
    fn test_rewards_stay_finite() {
        let mut env = make_env();
        env.reset();
        for action in [Action::Left, Action::Right, Action::Up, Action::Down] {
            let result = env.step(action);
            assert!(result.reward.is_finite());
            if result.done {
                break;
            }
        }
    }

    impl ChannelsEnv<TestBackend> {
        fn ghost_start_positions(&self) -> [Pos; 4] {
            self.last_ghost_pos
        }
    }
}
