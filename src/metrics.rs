//! Session statistics shown in the TUI header.

use std::time::{Duration, Instant};

pub struct EpisodeStats {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub episodes: u32,
    pub high_score: u32,
    pub last_score: u32,
}

impl EpisodeStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            episodes: 0,
            high_score: 0,
            last_score: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_episode_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_episode_end(&mut self, final_score: u32) {
        self.episodes += 1;
        self.last_score = final_score;
        if final_score > self.high_score {
            self.high_score = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for EpisodeStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut stats = EpisodeStats::new();
        stats.elapsed_time = Duration::from_secs(125);
        assert_eq!(stats.format_time(), "02:05");

        stats.elapsed_time = Duration::ZERO;
        assert_eq!(stats.format_time(), "00:00");
    }

    #[test]
    fn test_high_score_tracking() {
        let mut stats = EpisodeStats::new();

        stats.on_episode_end(300);
        assert_eq!(stats.high_score, 300);
        assert_eq!(stats.episodes, 1);

        stats.on_episode_end(100);
        assert_eq!(stats.high_score, 300);
        assert_eq!(stats.last_score, 100);

        stats.on_episode_end(500);
        assert_eq!(stats.high_score, 500);
        assert_eq!(stats.episodes, 3);
    }
}
