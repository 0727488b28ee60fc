//! Fixed game parameters shared by the simulation and the environment layer.

/// Grid width in cells.
pub const GRID_WIDTH: usize = 28;
/// Grid height in cells.
pub const GRID_HEIGHT: usize = 31;

/// Lives at the start of a round.
pub const STARTING_LIVES: u32 = 3;

/// How many ghost moves a power pellet keeps the ghosts frightened.
pub const FRIGHTENED_LENGTH: u32 = 40;

/// Score for eating a normal pellet.
pub const PELLET_SCORE: u32 = 10;
/// Score for eating a power pellet.
pub const POWER_PELLET_SCORE: u32 = 50;
/// Score for eating the cherry.
pub const CHERRY_SCORE: u32 = 100;
/// Score for eating a frightened ghost.
pub const GHOST_SCORE: u32 = 200;

/// Ghosts (and the scatter/chase clock) advance once per this many ticks.
pub const TICKS_PER_UPDATE: u32 = 12;

/// Ghost-move counts at which the scatter/chase phase flips.
pub const PHASE_SWAP_TIMES: [u32; 7] = [35, 135, 170, 270, 295, 395, 420];

/// Where the cherry appears.
pub const CHERRY_POS: (usize, usize) = (13, 13);

/// Pellets remaining when a cherry is spawned.
pub const CHERRY_PELLET_THRESHOLDS: [u32; 2] = [170, 70];

/// Pacman's starting cell.
pub const PACMAN_STARTING_POS: (usize, usize) = (14, 7);
