use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use crossbeam_channel::{Receiver, Sender};
use gol::{Command, Event, GridIo, Params, PgmIo, RandomIo};

#[derive(Parser, Debug)]
#[command(name = "gol-cli")]
#[command(about = "Run Game of Life on a torus without a window", long_about = None)]
struct Args {
    /// Number of worker threads computing each turn
    #[arg(short, long, default_value = "8")]
    threads: usize,

    /// Grid width in cells
    #[arg(short, long, default_value = "512")]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value = "512")]
    height: usize,

    /// Number of turns to play
    #[arg(long, default_value = "100")]
    turns: usize,

    /// Directory holding <height>x<width>.pgm input images
    #[arg(long, default_value = "images")]
    images: PathBuf,

    /// Directory receiving output images
    #[arg(long, default_value = "out")]
    out: PathBuf,

    /// Milliseconds between alive cell reports
    #[arg(long, default_value = "2000")]
    tick_ms: u64,

    /// Start from a random grid instead of an input image
    #[arg(long)]
    random: bool,

    /// Do not read p/s/q commands from stdin
    #[arg(long)]
    no_input: bool,
}

/// Forward key commands typed on stdin, one or more keys per line.
fn spawn_key_reader(commands: Sender<Command>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for command in line.chars().filter_map(Command::from_key) {
                if commands.send(command).is_err() {
                    return;
                }
            }
        }
    });
}

fn report(events: Receiver<Event>) {
    for event in events {
        match &event {
            Event::CellFlipped { .. } => log::trace!("{event}"),
            Event::TurnComplete { .. } => log::debug!("{event}"),
            Event::AliveCellsCount { completed_turns, cells_count } => {
                log::info!("Completed Turns {completed_turns:<8} Alive Cells {cells_count}")
            }
            _ => log::info!("Completed Turns {:<8} {event}", event.completed_turns()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let params = Params::new(args.width, args.height, args.turns, args.threads)
        .with_tick_interval(Duration::from_millis(args.tick_ms));
    params.validate().context("invalid arguments")?;

    let output = PgmIo::new(&args.images, &args.out)
        .with_context(|| format!("preparing output directory {}", args.out.display()))?;
    let mut io: Box<dyn GridIo> = if args.random {
        Box::new(RandomIo::new(output))
    } else {
        Box::new(output)
    };

    let commands = if args.no_input {
        None
    } else {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        spawn_key_reader(command_tx);
        Some(command_rx)
    };

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let reporter = thread::spawn(move || report(event_rx));

    let alive = gol::run(params, io.as_mut(), event_tx, commands).context("simulation failed")?;
    reporter.join().map_err(|_| anyhow!("event reporter panicked"))?;

    println!("{} cells alive", alive.len());
    Ok(())
}
