use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::game::variables::{GRID_HEIGHT, GRID_WIDTH};
use crate::game::{CellValue, GameState, GhostColor, Phase};
use crate::metrics::EpisodeStats;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, stats: &EpisodeStats) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Maze
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let header = self.render_stats(chunks[0], state, stats);
        frame.render_widget(header, chunks[0]);

        // Center the maze horizontally
        let maze_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        if state.play {
            let maze = self.render_maze(maze_area, state);
            frame.render_widget(maze, maze_area);
        } else {
            let game_over = self.render_game_over(maze_area, state);
            frame.render_widget(game_over, maze_area);
        }

        let controls = self.render_controls(chunks[2]);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_maze(&self, _area: Rect, state: &GameState) -> Paragraph<'_> {
        let frightened = state.is_frightened();
        let mut lines = Vec::new();

        for y in 0..GRID_HEIGHT {
            let mut spans = Vec::new();
            for x in 0..GRID_WIDTH {
                spans.push(self.cell_span(state, (x, y), frightened));
            }
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Pacman "),
            )
            .alignment(Alignment::Center)
    }

    fn cell_span(&self, state: &GameState, pos: (usize, usize), frightened: bool) -> Span<'_> {
        if pos == state.pacman.pos {
            return Span::styled(
                "● ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        }
        for ghost in state.ghosts() {
            if ghost.current_pos != pos {
                continue;
            }
            // Frightened ghosts dim to all look alike.
            let color = if frightened {
                Color::DarkGray
            } else {
                match ghost.color {
                    GhostColor::Red => Color::Red,
                    GhostColor::Pink => Color::Magenta,
                    GhostColor::Orange => Color::LightRed,
                    GhostColor::Blue => Color::Blue,
                }
            };
            return Span::styled("ᗣ ", Style::default().fg(color));
        }
        match state.grid[pos.0][pos.1] {
            CellValue::Wall => Span::styled("██", Style::default().fg(Color::Blue)),
            CellValue::Pellet => Span::styled("· ", Style::default().fg(Color::Gray)),
            CellValue::PowerPellet => Span::styled(
                "○ ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            CellValue::GhostDoor => Span::styled("──", Style::default().fg(Color::DarkGray)),
            CellValue::Cherry => Span::styled(
                "♦ ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            _ => Span::raw("  "),
        }
    }

    fn render_stats(&self, _area: Rect, state: &GameState, stats: &EpisodeStats) -> Paragraph<'_> {
        let phase = match state.phase() {
            Phase::Scatter => "scatter",
            Phase::Chase => "chase",
            Phase::Frightened => "frightened",
        };
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Lives: ", Style::default().fg(Color::Yellow)),
            Span::styled(state.lives.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Phase: ", Style::default().fg(Color::Yellow)),
            Span::styled(phase, Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                stats.high_score.to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(stats.format_time(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over(&self, _area: Rect, state: &GameState) -> Paragraph<'_> {
        let outcome = if state.lives == 0 {
            "GAME OVER"
        } else {
            "BOARD CLEARED"
        };
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                outcome,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, _area: Rect) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to steer | "),
            Span::styled("space", Style::default().fg(Color::Cyan)),
            Span::raw(" to stop | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
