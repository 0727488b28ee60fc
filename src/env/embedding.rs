use std::sync::Arc;

use burn::tensor::{backend::Backend, Tensor, TensorData};

use crate::game::variables::GHOST_SCORE;
use crate::game::{CellValue, GameState, Pos};
use crate::nav::{NavTables, NUM_ACTIONS};

use super::core::EnvCore;
use super::{
    finite_or_zero, Action, ActionMask, EnvConfig, Observation, PacmanEnv, StepInfo, StepResult,
};

const DEFAULT_TICKS_PER_STEP: u32 = 12;

/// Reward applied when the episode ends, before normalization.
const TERMINAL_PENALTY: f32 = -100.0;

/// The four cells that can hold a power pellet.
const POWER_PELLET_CELLS: [Pos; 4] = [(1, 7), (1, 27), (26, 7), (26, 27)];

/// The embedding variant: a flat feature vector built from precomputed
/// graph embeddings and direction tables instead of grid planes.
pub struct EmbeddingEnv<B: Backend> {
    core: EnvCore,
    ticks_per_step: u32,
    nav: Arc<NavTables>,
    device: B::Device,
}

impl<B: Backend> EmbeddingEnv<B> {
    pub fn new(config: EnvConfig, nav: Arc<NavTables>, device: B::Device) -> Self {
        Self {
            core: EnvCore::new(config.random_start),
            ticks_per_step: config.ticks_per_step.unwrap_or(DEFAULT_TICKS_PER_STEP),
            nav,
            device,
        }
    }

    fn obs_len(&self) -> usize {
        self.nav.embed_dim() * 3 + NUM_ACTIONS * 2 + 2
    }

    fn build_obs(&self) -> Observation<B> {
        let state = &self.core.game_state;
        let nav = &self.nav;
        let embed_dim = nav.embed_dim();

        let pacman_node = nav
            .node_index(state.pacman.pos)
            .expect("Pacman is always on a navigable cell");

        let mut features = Vec::with_capacity(self.obs_len());
        features.extend_from_slice(nav.embedding(pacman_node));

        // Ghosts only contribute while standing on the graph (they leave it
        // inside the ghost house).
        let mut ghost_embed = vec![0.0f32; embed_dim];
        let mut ghost_nodes: Vec<(Pos, usize)> = Vec::with_capacity(4);
        for ghost in state.ghosts() {
            if let Some(node) = nav.node_index(ghost.current_pos) {
                for (sum, value) in ghost_embed.iter_mut().zip(nav.embedding(node)) {
                    *sum += value;
                }
                ghost_nodes.push((ghost.current_pos, node));
            }
        }
        features.extend_from_slice(&ghost_embed);

        let mut pellet_embed = vec![0.0f32; embed_dim];
        for pos in POWER_PELLET_CELLS {
            if state.grid[pos.0][pos.1] == CellValue::PowerPellet {
                let node = nav
                    .node_index(pos)
                    .expect("power pellet cells are navigable");
                for (sum, value) in pellet_embed.iter_mut().zip(nav.embedding(node)) {
                    *sum += value;
                }
            }
        }
        features.extend_from_slice(&pellet_embed);

        let (px, py) = state.pacman.pos;
        let closest_ghost_dir = ghost_nodes
            .into_iter()
            .min_by_key(|((gx, gy), _)| {
                (*gx as isize - px as isize).abs() + (*gy as isize - py as isize).abs()
            })
            .map(|(_, node)| nav.distribution(pacman_node, node))
            .unwrap_or([0.0; NUM_ACTIONS]);
        features.extend_from_slice(&closest_ghost_dir);

        features.extend_from_slice(&nav.valid_actions(pacman_node));
        features.push(state.is_frightened() as u8 as f32);
        features.push(pacman_node as f32);

        let len = features.len();
        Observation::Flat(Tensor::from_data(
            TensorData::new(features, [len]),
            &self.device,
        ))
    }
}

impl<B: Backend> PacmanEnv<B> for EmbeddingEnv<B> {
    fn reset(&mut self) -> (Observation<B>, StepInfo) {
        self.core.reset_game();
        (self.build_obs(), StepInfo::default())
    }

    fn step(&mut self, action: Action) -> StepResult<B> {
        self.core.move_one_cell(action);
        self.core.run_ticks(self.ticks_per_step);

        let done = !self.core.game_state.play;
        let delta = self.core.consume_score_delta();
        let mut reward = delta as f32;
        if done {
            reward = TERMINAL_PENALTY;
        }
        let reward = finite_or_zero(reward) / GHOST_SCORE as f32;

        StepResult {
            observation: self.build_obs(),
            reward,
            done,
            truncated: false,
            info: StepInfo::default(),
        }
    }

    fn observation_shape(&self) -> Vec<usize> {
        vec![self.obs_len()]
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
    use crate::nav::synthetic_tables;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};

    type TestBackend = NdArray<f32>;

    fn make_env() -> EmbeddingEnv<TestBackend> {
        EmbeddingEnv::new(
            EnvConfig::default(),
            Arc::new(synthetic_tables()),
            NdArrayDevice::default(),
        )
    }

    #[test]
    fn test_observation_length() {
        let mut env = make_env();
        let (obs, info) = env.reset();
        let expected = env.nav.embed_dim() * 3 + 12;
        assert_eq!(obs.shape(), vec![expected]);
        assert_eq!(env.observation_shape(), vec![expected]);
        // This variant does not publish a mask.
        assert_eq!(info.action_mask, None);
    }

    #[test]
    fn test_features_start_with_pacman_embedding() {
        let mut env = make_env();
        let (obs, _) = env.reset();
        let values = obs.to_values();
        let node = env
            .nav
            .node_index(env.game_state().pacman.pos)
            .unwrap();
        let embed_dim = env.nav.embed_dim();
        assert_eq!(&values[..embed_dim], env.nav.embedding(node));
        // Trailing scalars: fright flag and the cell index.
        assert_eq!(values[values.len() - 2], 0.0);
        assert_eq!(values[values.len() - 1], node as f32);
    }

    #[test]
    fn test_pellet_embedding_shrinks_when_eaten() {
        let mut env = make_env();
        env.reset();
        let embed_dim = env.nav.embed_dim();
        let before = env.build_obs().to_values()[embed_dim * 2..embed_dim * 3].to_vec();
        // Remove one power pellet by hand.
        env.core.game_state.grid[1][7] = CellValue::Empty;
        let after = env.build_obs().to_values()[embed_dim * 2..embed_dim * 3].to_vec();
        assert_ne!(before, after);
    }

    #[test]
    fn test_terminal_reward_is_normalized_penalty() {
        let mut env = make_env();
        env.reset();
        env.core.game_state.lives = 1;
        let pac = env.core.game_state.pacman.pos;
        env.core.game_state.red.set_position(pac);
        let result = env.step(Action::Stay);
        assert!(result.done);
        assert_eq!(result.reward, TERMINAL_PENALTY / GHOST_SCORE as f32);
    }

    #[test]
    fn test_rewards_stay_finite() {
        let mut env = make_env();
        env.reset();
        env.core.game_state.score = 70;
        let result = env.step(Action::Stay);
        assert!(result.reward.is_finite());
        assert_eq!(result.reward, 70.0 / GHOST_SCORE as f32);
    }

    #[test]
    fn test_build_env_requires_tables() {
        use super::super::{build_env, EnvVariant};
        let result = build_env::<TestBackend>(
            EnvVariant::Embedding,
            EnvConfig::default(),
            None,
            NdArrayDevice::default(),
        );
        assert!(result.is_err());
    }
}
