use super::variables::PACMAN_STARTING_POS;
use super::{Direction, Pos};

/// The player entity. The simulation never moves it on its own; position
/// updates come from the environment layer (or a robot, in the original
/// deployment).
#[derive(Debug, Clone)]
pub struct Pacman {
    pub pos: Pos,
    pub direction: Direction,
}

impl Pacman {
    pub fn new() -> Self {
        Self {
            pos: PACMAN_STARTING_POS,
            direction: Direction::Left,
        }
    }

    /// Move to `new_pos`, updating the facing direction from the step taken.
    /// Staying in place keeps the previous facing.
    pub fn update(&mut self, new_pos: Pos) {
        let (old_x, old_y) = self.pos;
        let (new_x, new_y) = new_pos;
        if new_x > old_x {
            self.direction = Direction::Right;
        } else if new_x < old_x {
            self.direction = Direction::Left;
        } else if new_y > old_y {
            self.direction = Direction::Up;
        } else if new_y < old_y {
            self.direction = Direction::Down;
        }
        self.pos = new_pos;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Pacman {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_sets_direction() {
        let mut pacman = Pacman::new();
        let (x, y) = pacman.pos;
        pacman.update((x + 1, y));
        assert_eq!(pacman.direction, Direction::Right);
        pacman.update((x + 1, y + 1));
        assert_eq!(pacman.direction, Direction::Up);
        pacman.update((x, y + 1));
        assert_eq!(pacman.direction, Direction::Left);
    }

    #[test]
    fn test_update_in_place_keeps_direction() {
        let mut pacman = Pacman::new();
        pacman.update(pacman.pos);
        assert_eq!(pacman.direction, Direction::Left);
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut pacman = Pacman::new();
        pacman.update((1, 1));
        pacman.reset();
        assert_eq!(pacman.pos, super::PACMAN_STARTING_POS);
    }
}
