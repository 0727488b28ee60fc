use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::variables::{GRID_HEIGHT, GRID_WIDTH};

/// What a grid cell holds.
///
/// Code 0 is reserved for out-of-bounds readings and never appears in the
/// stored maze.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum CellValue {
    OutOfBounds = 0,
    Wall = 1,
    Pellet = 2,
    Empty = 3,
    PowerPellet = 4,
    /// Ghost house interior and door. Blocks Pacman, not ghosts on a path.
    GhostDoor = 5,
    Cherry = 6,
}

/// The board, indexed `[x][y]`.
pub type Grid = [[CellValue; GRID_HEIGHT]; GRID_WIDTH];

/// True if Pacman may occupy the cell: on the board and neither a wall nor
/// part of the ghost house.
pub fn is_walkable(grid: &Grid, pos: (usize, usize)) -> bool {
    pos.0 < GRID_WIDTH
        && pos.1 < GRID_HEIGHT
        && !matches!(grid[pos.0][pos.1], CellValue::Wall | CellValue::GhostDoor)
}

/// Every cell Pacman may occupy, in row-major order.
pub fn walkable_cells(grid: &Grid) -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    for x in 0..GRID_WIDTH {
        for y in 0..GRID_HEIGHT {
            if is_walkable(grid, (x, y)) {
                cells.push((x, y));
            }
        }
    }
    cells
}

/// Number of cells holding the given value.
pub fn count_cells(grid: &Grid, value: CellValue) -> u32 {
    grid.iter()
        .flatten()
        .filter(|cell| **cell == value)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::super::maze::MAZE;
    use super::*;

    #[test]
    fn test_maze_border_is_walls() {
        for x in 0..GRID_WIDTH {
            assert_eq!(MAZE[x][0], CellValue::Wall);
            assert_eq!(MAZE[x][GRID_HEIGHT - 1], CellValue::Wall);
        }
        for y in 0..GRID_HEIGHT {
            assert_eq!(MAZE[0][y], CellValue::Wall);
            assert_eq!(MAZE[GRID_WIDTH - 1][y], CellValue::Wall);
        }
    }

    #[test]
    fn test_maze_pellet_counts() {
        assert_eq!(count_cells(&MAZE, CellValue::Pellet), 240);
        assert_eq!(count_cells(&MAZE, CellValue::PowerPellet), 4);
    }

    #[test]
    fn test_power_pellet_locations() {
        for pos in [(1, 7), (1, 27), (26, 7), (26, 27)] {
            assert_eq!(MAZE[pos.0][pos.1], CellValue::PowerPellet);
        }
    }

    #[test]
    fn test_walkability() {
        let start = super::super::variables::PACMAN_STARTING_POS;
        assert!(is_walkable(&MAZE, start));
        // Walls and the ghost door are not walkable.
        assert!(!is_walkable(&MAZE, (0, 0)));
        assert!(!is_walkable(&MAZE, (13, 18)));
        // Off-board coordinates are not walkable.
        assert!(!is_walkable(&MAZE, (GRID_WIDTH, 0)));
        assert!(!is_walkable(&MAZE, (0, GRID_HEIGHT)));
    }

    #[test]
    fn test_walkable_cells_are_walkable() {
        let cells = walkable_cells(&MAZE);
        assert!(!cells.is_empty());
        for pos in cells {
            assert!(is_walkable(&MAZE, pos));
        }
    }
}
