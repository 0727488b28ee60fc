use anyhow::{Context, Result};
use burn::backend::NdArray;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use std::time::Duration;
use tokio::time::interval;

use crate::env::{Action, PacmanEnv, ACTION_SPACE};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::EpisodeStats;
use crate::render::Renderer;

use super::{restore_terminal, setup_terminal, Tui};

const STEP_INTERVAL_MS: u64 = 200;

/// Hands-off session: each step takes a uniformly random direction among
/// the ones the action mask leaves open, restarting after every episode.
pub struct WatchMode {
    env: Box<dyn PacmanEnv<NdArray<f32>>>,
    stats: EpisodeStats,
    renderer: Renderer,
    input_handler: InputHandler,
    rng: ThreadRng,
    should_quit: bool,
}

impl WatchMode {
    pub fn new(env: Box<dyn PacmanEnv<NdArray<f32>>>) -> Self {
        Self {
            env,
            stats: EpisodeStats::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            rng: rand::thread_rng(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.run_loop(&mut terminal).await;
        restore_terminal(&mut terminal)?;
        result
    }

    async fn run_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        self.env.reset();
        self.stats.on_episode_start();

        let mut event_stream = EventStream::new();
        let mut step_timer = interval(Duration::from_millis(STEP_INTERVAL_MS));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                _ = step_timer.tick() => {
                    let action = self.pick_action();
                    let result = self.env.step(action);
                    if result.done {
                        self.stats.on_episode_end(self.env.score());
                        self.env.reset();
                        self.stats.on_episode_start();
                    }
                    self.stats.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.env.game_state(), &self.stats);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// A random direction whose destination is not blocked; stays put only
    /// when everything is.
    fn pick_action(&mut self) -> Action {
        let mask = self.env.action_mask();
        let open: Vec<usize> = (1..ACTION_SPACE).filter(|&index| mask[index] == 0).collect();
        open.choose(&mut self.rng)
            .map(|&index| Action::from_index(index))
            .unwrap_or(Action::Stay)
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return;
            }
            if self.input_handler.handle_key_event(key) == KeyAction::Quit {
                self.should_quit = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{build_env, EnvConfig, EnvVariant};
    use burn::backend::ndarray::NdArrayDevice;

    #[test]
    fn test_picked_actions_are_unmasked() {
        let env = build_env(
            EnvVariant::Naive,
            EnvConfig::default(),
            None,
            NdArrayDevice::default(),
        )
        .unwrap();
        let mut mode = WatchMode::new(env);
        mode.env.reset();
        for _ in 0..20 {
            let action = mode.pick_action();
            let mask = mode.env.action_mask();
            assert_eq!(mask[action.index()], 0);
            mode.env.step(action);
        }
    }
}
