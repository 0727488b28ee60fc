//! Reinforcement learning environments over the Pacman simulation.
//!
//! One shared [`core::EnvCore`] owns the game and the movement/mask/reset
//! primitives; four observation/reward variants implement [`PacmanEnv`] on
//! top of it and are selected at construction through [`EnvVariant`] and
//! [`build_env`].

pub mod attention;
pub mod channels;
pub mod core;
pub mod embedding;
pub mod naive;

use std::sync::Arc;

use anyhow::{Context, Result};
use burn::tensor::{backend::Backend, Tensor, TensorData};
use serde::{Deserialize, Serialize};

use crate::game::variables::{GRID_HEIGHT, GRID_WIDTH};
use crate::game::GameState;
use crate::nav::NavTables;

pub use attention::AttentionEnv;
pub use channels::ChannelsEnv;
pub use embedding::EmbeddingEnv;
pub use naive::NaiveEnv;
pub use self::core::EnvCore;

/// The discrete action space: stay plus the four single-cell moves.
///
/// `Down` increases `y` and `Up` decreases it, mirroring how the wrappers
/// have always numbered the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Stay = 0,
    Down = 1,
    Up = 2,
    Left = 3,
    Right = 4,
}

/// Number of discrete actions.
pub const ACTION_SPACE: usize = 5;

impl Action {
    /// Decode an action index. Codes outside `0..=4` are treated as `Stay`;
    /// they are not an error.
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Action::Down,
            2 => Action::Up,
            3 => Action::Left,
            4 => Action::Right,
            _ => Action::Stay,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Blocked-direction indicators: 1 marks an action whose destination is a
/// wall, the ghost door, or off the board. Index 0 (stay) is never set.
pub type ActionMask = [u8; ACTION_SPACE];

/// An observation: either stacked channels over the grid or a flat feature
/// vector, depending on the variant.
#[derive(Debug, Clone)]
pub enum Observation<B: Backend> {
    Grid(Tensor<B, 3>),
    Flat(Tensor<B, 1>),
}

impl<B: Backend> Observation<B> {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Observation::Grid(tensor) => tensor.shape().dims.to_vec(),
            Observation::Flat(tensor) => tensor.shape().dims.to_vec(),
        }
    }

    /// The observation values, flattened in row-major order.
    pub fn to_values(&self) -> Vec<f32> {
        let data = match self {
            Observation::Grid(tensor) => tensor.to_data(),
            Observation::Flat(tensor) => tensor.to_data(),
        };
        data.as_slice::<f32>().unwrap().to_vec()
    }
}

/// Side data returned with observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// Present for the variants that publish a mask.
    pub action_mask: Option<ActionMask>,
}

/// Result of one environment step.
#[derive(Debug, Clone)]
pub struct StepResult<B: Backend> {
    pub observation: Observation<B>,
    pub reward: f32,
    pub done: bool,
    pub truncated: bool,
    pub info: StepInfo,
}

/// The common environment contract all variants implement.
pub trait PacmanEnv<B: Backend> {
    /// Restart the episode and return the first observation.
    fn reset(&mut self) -> (Observation<B>, StepInfo);

    /// Apply an action, advance the simulation, and report the outcome.
    fn step(&mut self, action: Action) -> StepResult<B>;

    /// Shape of the observations this variant produces.
    fn observation_shape(&self) -> Vec<usize>;

    /// Blocked-direction indicators for Pacman's current cell.
    fn action_mask(&self) -> ActionMask;

    /// The simulation's cumulative score, independent of reward scaling.
    fn score(&self) -> u32;

    /// Read access to the underlying simulation (rendering, tooling).
    fn game_state(&self) -> &GameState;
}

/// Which observation/reward scheme to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvVariant {
    Naive,
    Channels,
    Embedding,
    Attention,
}

/// Construction options shared by every variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Scatter Pacman and the ghosts over random cells at reset.
    pub random_start: bool,
    /// Simulation ticks per environment step; `None` uses the variant's
    /// default.
    pub ticks_per_step: Option<u32>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            random_start: false,
            ticks_per_step: None,
        }
    }
}

/// Build the chosen variant. The embedding variant needs the navigation
/// tables and fails without them; the others ignore `nav`.
pub fn build_env<B: Backend>(
    variant: EnvVariant,
    config: EnvConfig,
    nav: Option<Arc<NavTables>>,
    device: B::Device,
) -> Result<Box<dyn PacmanEnv<B>>> {
    Ok(match variant {
        EnvVariant::Naive => Box::new(NaiveEnv::new(config, device)),
        EnvVariant::Channels => Box::new(ChannelsEnv::new(config, device)),
        EnvVariant::Embedding => {
            let nav = nav.context("the embedding variant requires navigation tables")?;
            Box::new(EmbeddingEnv::new(config, nav, device))
        }
        EnvVariant::Attention => Box::new(AttentionEnv::new(config, device)),
    })
}

/// Index of cell `(x, y)` in a flattened `[GRID_WIDTH, GRID_HEIGHT]` plane.
pub(crate) fn cell_index(x: usize, y: usize) -> usize {
    x * GRID_HEIGHT + y
}

/// One `[GRID_WIDTH, GRID_HEIGHT]` observation plane.
pub(crate) fn plane_tensor<B: Backend>(data: Vec<f32>, device: &B::Device) -> Tensor<B, 2> {
    Tensor::from_data(TensorData::new(data, [GRID_WIDTH, GRID_HEIGHT]), device)
}

/// Rewards leave this function finite: divide/log edge cases at episode
/// boundaries collapse to zero.
pub(crate) fn finite_or_zero(reward: f32) -> f32 {
    if reward.is_finite() {
        reward
    } else {
        0.0
    }
}
