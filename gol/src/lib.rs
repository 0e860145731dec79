/**
* A live cell dies if it has fewer than two live neighbors.
* A live cell with two or three live neighbors lives on to the next generation.
* A live cell with more than three live neighbors dies.
* A dead cell will be brought back to live if it has exactly three live neighbors.
*
* The world is a torus: the row above the first row is the last row, and the
* column left of the first column is the last column.
*/
pub mod grid;

pub mod alive;
pub mod command;
pub mod control;
pub mod error;
pub mod event;
pub mod executor;
pub mod io;
pub mod params;
pub mod store;
pub mod worker;

use crossbeam_channel::{Receiver, Sender};

pub use command::Command;
pub use control::ControlLoop;
pub use error::{ConfigError, Error, IoError, Result};
pub use event::{Event, State};
pub use grid::{Cell, CellState, Grid, GridView};
pub use io::{GridIo, MemoryIo, PgmIo, RandomIo};
pub use params::Params;

/// Run a whole simulation.
///
/// Validates `params`, loads the initial grid from `io`, then plays
/// `params.turns` turns (or until a `Quit` command) while reporting on
/// `events`. The final generation is written through `io` and its alive cells
/// are returned. `events` is dropped on return, closing the stream once every
/// other sender is gone.
pub fn run<I: GridIo + ?Sized>(
    params: Params,
    io: &mut I,
    events: Sender<Event>,
    commands: Option<Receiver<Command>>,
) -> Result<Vec<Cell>> {
    params.validate()?;
    let world = io.read_input(&params)?;

    log::info!(
        "running {} turns on {}x{} with {} threads",
        params.turns,
        params.image_width,
        params.image_height,
        params.threads
    );

    Ok(ControlLoop::new(params, io, events, commands)?.run(world)?)
}
