use anyhow::anyhow;
use clap::Parser;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use eframe::egui;
use eframe::egui::{ScrollArea, Ui};
use eframe::run_native;
use gol::CellState::{Alive, Dead};
use gol::{CellState, Command, Event, GridIo, Params, PgmIo, RandomIo, State};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

const GRID_WIDTH: usize = 200;
const GRID_HEIGHT: usize = GRID_WIDTH * 9 / 16;
const CELL_SIZE: f32 = 8.0;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "gui")]
#[command(about = "Watch Game of Life on a torus", long_about = None)]
struct Args {
    /// Number of worker threads computing each turn
    #[arg(short, long, default_value = "8")]
    threads: usize,

    /// Grid width in cells
    #[arg(short, long, default_value_t = GRID_WIDTH)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = GRID_HEIGHT)]
    height: usize,

    /// Number of turns to play
    #[arg(long, default_value = "10000")]
    turns: usize,

    /// Directory holding <height>x<width>.pgm input images
    #[arg(long, default_value = "images")]
    images: PathBuf,

    /// Directory receiving saved images
    #[arg(long, default_value = "out")]
    out: PathBuf,

    /// Milliseconds between alive cell reports
    #[arg(long, default_value = "2000")]
    tick_ms: u64,

    /// Start from a random grid instead of an input image
    #[arg(long)]
    random: bool,
}

/// Local copy of the world rebuilt from the event stream.
struct Mirror {
    cells: Vec<Vec<CellState>>,
    turn: usize,
    alive: Option<usize>,
    state: State,
    status: String,
    finished: bool,
}

impl Mirror {
    fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![Dead; width]; height],
            turn: 0,
            alive: None,
            state: State::Executing,
            status: String::new(),
            finished: false,
        }
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::CellFlipped { cell, .. } => {
                let state = &mut self.cells[cell.y][cell.x];
                *state = if *state == Alive { Dead } else { Alive };
            }
            Event::TurnComplete { completed_turns } => self.turn = completed_turns,
            Event::AliveCellsCount { cells_count, .. } => self.alive = Some(cells_count),
            Event::StateChange { new_state, .. } => self.state = new_state,
            Event::FinalTurnComplete { completed_turns, alive } => {
                self.turn = completed_turns;
                self.alive = Some(alive.len());
            }
            event @ Event::ImageOutputComplete { .. } => self.status = event.to_string(),
        }
    }

    fn drain(&mut self, events: &Receiver<Event>) {
        loop {
            match events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let params = Params::new(args.width, args.height, args.turns, args.threads)
        .with_tick_interval(Duration::from_millis(args.tick_ms))
        .with_flip_tracking(true);
    params.validate()?;

    let output = PgmIo::new(&args.images, &args.out)?;
    let mut io: Box<dyn GridIo + Send> = if args.random {
        Box::new(RandomIo::new(output))
    } else {
        Box::new(output)
    };

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (command_tx, command_rx) = crossbeam_channel::unbounded();
    let (width, height) = (params.image_width, params.image_height);
    let engine = thread::spawn(move || gol::run(params, io.as_mut(), event_tx, Some(command_rx)));

    let window_commands = command_tx.clone();
    run_native(
        "Game of Life GUI",
        eframe::NativeOptions::default(),
        Box::new(move |_cc| Ok(Box::new(GuiOfLife::new(Mirror::new(width, height), event_rx, window_commands)))),
    )
    .map_err(|err| anyhow!("window failed: {err}"))?;

    // Closing the window ends the run; the final image is still written.
    let _ = command_tx.send(Command::Quit);
    let alive = engine.join().map_err(|_| anyhow!("simulation panicked"))??;
    log::info!("{} cells alive", alive.len());
    Ok(())
}

struct GuiOfLife {
    mirror: Mirror,
    events: Receiver<Event>,
    commands: Sender<Command>,
}

impl GuiOfLife {
    fn new(mirror: Mirror, events: Receiver<Event>, commands: Sender<Command>) -> Self {
        Self { mirror, events, commands }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::debug!("simulation no longer accepts {command:?}");
        }
    }

    fn handle_keys(&self, ctx: &egui::Context) {
        let keys = [(egui::Key::P, 'p'), (egui::Key::S, 's'), (egui::Key::Q, 'q')];
        for (key, name) in keys {
            if ctx.input(|i| i.key_pressed(key)) {
                if let Some(command) = Command::from_key(name) {
                    self.send(command);
                }
            }
        }
    }

    fn create_grid(&self, ui: &mut Ui) {
        let cells = &self.mirror.cells;
        let width = cells.first().map_or(0, |row| row.len());

        // Calculate the grid starting point
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(CELL_SIZE * width as f32, CELL_SIZE * cells.len() as f32),
            egui::Sense::hover(),
        );

        let painter = ui.painter();
        painter.rect_filled(rect, 0.0, egui::Color32::DARK_GRAY);

        // Only alive cells are drawn on top of the background
        for (row_index, row) in cells.iter().enumerate() {
            for (col_index, _) in row.iter().enumerate().filter(|(_, cell)| **cell == Alive) {
                let pos = rect.min + egui::vec2(col_index as f32 * CELL_SIZE, row_index as f32 * CELL_SIZE);
                painter.rect_filled(
                    egui::Rect::from_min_size(pos, egui::vec2(CELL_SIZE, CELL_SIZE)),
                    CELL_SIZE / 4f32,
                    egui::Color32::WHITE,
                );
            }
        }
    }
}

impl eframe::App for GuiOfLife {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.mirror.drain(&self.events);
        self.handle_keys(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::both().show(ui, |ui| {
                ui.heading("Game of Life");
                ui.horizontal(|ui| {
                    let running = !self.mirror.finished;
                    let pause_label = if self.mirror.state == State::Paused { "Resume (p)" } else { "Pause (p)" };
                    if ui.add_enabled(running, egui::Button::new(pause_label)).clicked() {
                        self.send(Command::Pause);
                    }
                    if ui.add_enabled(running, egui::Button::new("Save (s)")).clicked() {
                        self.send(Command::Save);
                    }
                    if ui.add_enabled(running, egui::Button::new("Quit (q)")).clicked() {
                        self.send(Command::Quit);
                    }

                    ui.separator();
                    ui.label(format!("Turn {}", self.mirror.turn));
                    if let Some(alive) = self.mirror.alive {
                        ui.label(format!("Alive {alive}"));
                    }
                    ui.label(self.mirror.state.to_string());
                    ui.label(&self.mirror.status);
                });

                self.create_grid(ui);
            });
        });

        if !self.mirror.finished {
            ctx.request_repaint_after(FRAME_INTERVAL);
        }
    }
}
