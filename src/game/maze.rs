//! The fixed Pacman board.

#![cfg_attr(rustfmt, rustfmt_skip)]

use super::grid::{CellValue, Grid};

const W: CellValue = CellValue::Wall;
const P: CellValue = CellValue::Pellet;
const E: CellValue = CellValue::Empty;
const U: CellValue = CellValue::PowerPellet;
const D: CellValue = CellValue::GhostDoor;

/// The starting board, indexed `[x][y]`. 240 pellets, 4 power pellets; the
/// cherry cell starts empty and is filled by the engine mid-round.
pub const MAZE: Grid = [
    [W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W],
    [W, P, P, P, P, W, W, U, P, P, P, W, W, W, W, W, W, W, W, W, W, W, P, P, P, P, P, U, P, P, W],
    [W, P, W, W, P, W, W, P, W, W, P, W, W, W, W, W, W, W, W, W, W, W, P, W, W, P, W, W, W, P, W],
    [W, P, W, W, P, P, P, P, W, W, P, W, W, W, W, W, W, W, W, W, W, W, P, W, W, P, W, E, W, P, W],
    [W, P, W, W, P, W, W, W, W, W, P, W, W, W, W, W, W, W, W, W, W, W, P, W, W, P, W, E, W, P, W],
    [W, P, W, W, P, W, W, W, W, W, P, W, W, W, W, W, W, W, W, W, W, W, P, W, W, P, W, W, W, P, W],
    [W, P, W, W, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, W],
    [W, P, W, W, W, W, W, P, W, W, P, W, W, W, W, W, E, W, W, W, W, W, W, W, W, P, W, W, W, P, W],
    [W, P, W, W, W, W, W, P, W, W, P, W, W, W, W, W, E, W, W, W, W, W, W, W, W, P, W, E, W, P, W],
    [W, P, W, W, P, P, P, P, W, W, P, E, E, E, E, E, E, E, E, E, W, W, P, P, P, P, W, E, W, P, W],
    [W, P, W, W, P, W, W, P, W, W, P, W, W, E, W, W, W, W, W, E, W, W, P, W, W, P, W, E, W, P, W],
    [W, P, W, W, P, W, W, P, W, W, P, W, W, E, W, D, D, D, W, E, W, W, P, W, W, P, W, W, W, P, W],
    [W, P, P, P, P, W, W, P, P, P, P, W, W, E, W, D, D, D, W, E, E, E, P, W, W, P, P, P, P, P, W],
    [W, P, W, W, W, W, W, E, W, W, W, W, W, E, W, D, D, D, D, E, W, W, W, W, W, P, W, W, W, W, W],
    [W, P, W, W, W, W, W, E, W, W, W, W, W, E, W, D, D, D, D, E, W, W, W, W, W, P, W, W, W, W, W],
    [W, P, P, P, P, W, W, P, P, P, P, W, W, E, W, D, D, D, W, E, E, E, P, W, W, P, P, P, P, P, W],
    [W, P, W, W, P, W, W, P, W, W, P, W, W, E, W, D, D, D, W, E, W, W, P, W, W, P, W, W, W, P, W],
    [W, P, W, W, P, W, W, P, W, W, P, W, W, E, W, W, W, W, W, E, W, W, P, W, W, P, W, E, W, P, W],
    [W, P, W, W, P, P, P, P, W, W, P, E, E, E, E, E, E, E, E, E, W, W, P, P, P, P, W, E, W, P, W],
    [W, P, W, W, W, W, W, P, W, W, P, W, W, W, W, W, E, W, W, W, W, W, W, W, W, P, W, E, W, P, W],
    [W, P, W, W, W, W, W, P, W, W, P, W, W, W, W, W, E, W, W, W, W, W, W, W, W, P, W, W, W, P, W],
    [W, P, W, W, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, W],
    [W, P, W, W, P, W, W, W, W, W, P, W, W, W, W, W, W, W, W, W, W, W, P, W, W, P, W, W, W, P, W],
    [W, P, W, W, P, W, W, W, W, W, P, W, W, W, W, W, W, W, W, W, W, W, P, W, W, P, W, E, W, P, W],
    [W, P, W, W, P, P, P, P, W, W, P, W, W, W, W, W, W, W, W, W, W, W, P, W, W, P, W, E, W, P, W],
    [W, P, W, W, P, W, W, P, W, W, P, W, W, W, W, W, W, W, W, W, W, W, P, W, W, P, W, W, W, P, W],
    [W, P, P, P, P, W, W, U, P, P, P, W, W, W, W, W, W, W, W, W, W, W, P, P, P, P, P, U, P, P, W],
    [W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W, W],
];
