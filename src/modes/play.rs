use anyhow::{Context, Result};
use burn::backend::NdArray;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::interval;

use crate::env::{Action, PacmanEnv};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::EpisodeStats;
use crate::render::Renderer;

use super::{restore_terminal, setup_terminal, Tui};

/// Milliseconds between environment steps; caps rendering at 5 frames per
/// second.
const STEP_INTERVAL_MS: u64 = 200;

/// Keyboard-driven session: the chosen direction sticks until changed, the
/// environment steps (and the screen repaints) at 5 Hz.
pub struct PlayMode {
    env: Box<dyn PacmanEnv<NdArray<f32>>>,
    stats: EpisodeStats,
    renderer: Renderer,
    input_handler: InputHandler,
    current_action: Action,
    episode_over: bool,
    should_quit: bool,
}

impl PlayMode {
    pub fn new(env: Box<dyn PacmanEnv<NdArray<f32>>>) -> Self {
        Self {
            env,
            stats: EpisodeStats::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            current_action: Action::Stay,
            episode_over: false,
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
        self.reset_episode();

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
                    if !self.episode_over {
                        let result = self.env.step(self.current_action);
                        if result.done {
                            self.episode_over = true;
                            self.stats.on_episode_end(self.env.score());
                        }
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

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::EnvAction(action) => {
                    self.current_action = action;
                }
                KeyAction::Restart => {
                    self.reset_episode();
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }
    }

    fn reset_episode(&mut self) {
        self.env.reset();
        self.current_action = Action::Stay;
        self.episode_over = false;
        self.stats.on_episode_start();
    }
}
