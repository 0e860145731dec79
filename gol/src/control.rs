//! The control loop driving a run.
//!
//! Each iteration either advances one turn or services a telemetry tick or a
//! user command, whichever is ready first. All access to the current
//! generation goes through the [`SnapshotStore`], so ticks and saves always
//! observe a completed generation.

use crossbeam_channel::{select, Receiver, Sender};
use std::time::Instant;

use crate::alive::{alive_cells, alive_count};
use crate::command::Command;
use crate::error::ConfigError;
use crate::event::{Event, State};
use crate::executor::TurnExecutor;
use crate::grid::{Cell, Grid, GridView};
use crate::io::GridIo;
use crate::params::Params;
use crate::store::{Snapshot, SnapshotStore};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LoopState {
    Running,
    Paused,
    Quitting,
}

pub struct ControlLoop<'a, I: GridIo + ?Sized> {
    params: Params,
    io: &'a mut I,
    events: Sender<Event>,
    commands: Receiver<Command>,
    ticker: Receiver<Instant>,
    executor: TurnExecutor,
    state: LoopState,
    turn: usize,
}

impl<'a, I: GridIo + ?Sized> ControlLoop<'a, I> {
    /// Without a command source the loop only advances turns and reports ticks.
    /// Fails if `params` does not describe a valid run.
    pub fn new(
        params: Params,
        io: &'a mut I,
        events: Sender<Event>,
        commands: Option<Receiver<Command>>,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        let mut executor = TurnExecutor::new(params.image_height, params.threads);
        if params.track_flips {
            executor = executor.with_flips(events.clone());
        }
        Ok(ControlLoop {
            ticker: crossbeam_channel::tick(params.tick_interval),
            commands: commands.unwrap_or_else(crossbeam_channel::never),
            params,
            io,
            events,
            executor,
            state: LoopState::Running,
            turn: 0,
        })
    }

    /// Run to completion starting from `world` and return the final alive cells.
    /// A `world` whose dimensions differ from the configured ones is rejected
    /// before any event is sent. The event stream closes when this returns,
    /// unless the caller kept another sender alive.
    pub fn run(mut self, world: Grid) -> Result<Vec<Cell>, ConfigError> {
        if (world.width(), world.height()) != (self.params.image_width, self.params.image_height) {
            return Err(ConfigError::WorldSize {
                width: self.params.image_width,
                height: self.params.image_height,
                actual_width: world.width(),
                actual_height: world.height(),
            });
        }

        let store = SnapshotStore::new(GridView::new(world));

        if self.params.track_flips {
            for cell in alive_cells(&store.take()) {
                self.emit(Event::CellFlipped { completed_turns: 0, cell });
            }
        }

        while self.state != LoopState::Quitting {
            self.step(&store);
        }

        Ok(self.finish(&store))
    }

    fn step(&mut self, store: &SnapshotStore) {
        let commands = self.commands.clone();
        let ticker = self.ticker.clone();

        match self.state {
            LoopState::Running if self.turn >= self.params.turns => self.state = LoopState::Quitting,
            LoopState::Running => select! {
                recv(store.ready()) -> view => match view {
                    Ok(view) => self.advance(store.adopt(view)),
                    Err(_) => unreachable!("snapshot store disconnected"),
                },
                recv(ticker) -> _ => self.report_alive(store),
                recv(commands) -> command => self.on_command(command.ok(), store),
            },
            LoopState::Paused => select! {
                recv(commands) -> command => self.on_command(command.ok(), store),
            },
            LoopState::Quitting => {}
        }
    }

    fn advance(&mut self, snapshot: Snapshot<'_>) {
        let next = self.executor.advance(&snapshot, self.turn + 1);
        snapshot.replace(next);
        self.turn += 1;
        log::debug!("turn {} complete", self.turn);
        self.emit(Event::TurnComplete { completed_turns: self.turn });
    }

    fn report_alive(&mut self, store: &SnapshotStore) {
        let cells_count = alive_count(&store.take());
        log::debug!("{cells_count} cells alive after {} turns", self.turn);
        self.emit(Event::AliveCellsCount { completed_turns: self.turn, cells_count });
    }

    fn save(&mut self, store: &SnapshotStore) {
        let filename = self.params.output_name(self.turn);
        {
            let snapshot = store.take();
            self.io.write_output(&snapshot, &filename);
        }
        log::info!("saved {filename}");
        self.emit(Event::ImageOutputComplete { completed_turns: self.turn, filename });
    }

    fn on_command(&mut self, command: Option<Command>, store: &SnapshotStore) {
        let Some(command) = command else {
            log::warn!("command source disconnected, continuing without it");
            self.commands = crossbeam_channel::never();
            if self.state == LoopState::Paused {
                self.resume();
            }
            return;
        };

        match (command, self.state) {
            (Command::Pause, LoopState::Running) => {
                self.state = LoopState::Paused;
                log::info!("paused at turn {}", self.turn);
                self.emit(Event::StateChange { completed_turns: self.turn, new_state: State::Paused });
            }
            (Command::Pause | Command::Resume, LoopState::Paused) => self.resume(),
            (Command::Resume, _) => log::debug!("resume ignored, not paused"),
            (Command::Save, _) => self.save(store),
            (Command::Quit, _) => {
                log::info!("quit requested at turn {}", self.turn);
                self.state = LoopState::Quitting;
            }
            (_, LoopState::Quitting) => {}
        }
    }

    fn resume(&mut self) {
        self.state = LoopState::Running;
        // A tick that fired during the pause must not be reported straight away.
        self.ticker = crossbeam_channel::tick(self.params.tick_interval);
        log::info!("resumed at turn {}", self.turn);
        self.emit(Event::StateChange { completed_turns: self.turn, new_state: State::Executing });
    }

    fn finish(&mut self, store: &SnapshotStore) -> Vec<Cell> {
        let filename = self.params.output_name(self.turn);
        let alive = {
            let snapshot = store.take();
            let alive = alive_cells(&snapshot);
            self.emit(Event::FinalTurnComplete { completed_turns: self.turn, alive: alive.clone() });
            self.io.write_output(&snapshot, &filename);
            alive
        };
        self.emit(Event::ImageOutputComplete { completed_turns: self.turn, filename });

        self.io.check_idle();

        log::info!("finished after {} turns with {} cells alive", self.turn, alive.len());
        self.emit(Event::StateChange { completed_turns: self.turn, new_state: State::Quitting });
        alive
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            log::trace!("event sink closed");
        }
    }
}
