use std::fmt;

use crate::grid::Cell;

/// Execution state reported through [`Event::StateChange`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State {
    Paused,
    Executing,
    Quitting,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Paused => write!(f, "Paused"),
            State::Executing => write!(f, "Executing"),
            State::Quitting => write!(f, "Quitting"),
        }
    }
}

/// Everything the simulation reports to the outside world, in emission order.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Event {
    /// Periodic telemetry sample.
    AliveCellsCount { completed_turns: usize, cells_count: usize },
    /// The output collaborator was handed the grid under `filename`.
    ImageOutputComplete { completed_turns: usize, filename: String },
    StateChange { completed_turns: usize, new_state: State },
    /// A single cell changed state while producing `completed_turns`.
    CellFlipped { completed_turns: usize, cell: Cell },
    TurnComplete { completed_turns: usize },
    /// Last event carrying grid contents: every alive cell of the final generation.
    FinalTurnComplete { completed_turns: usize, alive: Vec<Cell> },
}

impl Event {
    pub fn completed_turns(&self) -> usize {
        match self {
            Event::AliveCellsCount { completed_turns, .. }
            | Event::ImageOutputComplete { completed_turns, .. }
            | Event::StateChange { completed_turns, .. }
            | Event::CellFlipped { completed_turns, .. }
            | Event::TurnComplete { completed_turns }
            | Event::FinalTurnComplete { completed_turns, .. } => *completed_turns,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::AliveCellsCount { cells_count, .. } => write!(f, "Alive Cells {cells_count}"),
            Event::ImageOutputComplete { filename, .. } => write!(f, "File {filename} Output Done"),
            Event::StateChange { new_state, .. } => write!(f, "{new_state}"),
            Event::CellFlipped { cell, .. } => write!(f, "Cell {cell} flipped"),
            Event::TurnComplete { completed_turns } => write!(f, "Turn {completed_turns} complete"),
            Event::FinalTurnComplete { alive, .. } => {
                write!(f, "Final turn complete, {} cells alive", alive.len())
            }
        }
    }
}
