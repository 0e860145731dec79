use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use gol::alive::alive_count;
use gol::executor::TurnExecutor;
use gol::{Cell, CellState, Command, ConfigError, Error, Event, Grid, GridView, MemoryIo, Params, State};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
    coords.iter().map(|&(x, y)| Cell::new(x, y)).collect()
}

fn run_to_end(params: Params, world: Grid) -> (Vec<Cell>, Vec<Event>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut io = MemoryIo::new(world);
    let alive = gol::run(params, &mut io, tx, None).unwrap();
    (alive, rx.iter().collect())
}

fn spawn_run(params: Params, world: Grid) -> (Receiver<Event>, Sender<Command>, thread::JoinHandle<Vec<Cell>>) {
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (command_tx, command_rx) = crossbeam_channel::unbounded();
    let handle = thread::spawn(move || {
        let mut io = MemoryIo::new(world);
        gol::run(params, &mut io, event_tx, Some(command_rx)).unwrap()
    });
    (event_rx, command_tx, handle)
}

fn turns_completed(events: &[Event]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TurnComplete { completed_turns } => Some(*completed_turns),
            _ => None,
        })
        .collect()
}

fn final_report(events: &[Event]) -> (usize, Vec<Cell>) {
    events
        .iter()
        .find_map(|event| match event {
            Event::FinalTurnComplete { completed_turns, alive } => Some((*completed_turns, alive.clone())),
            _ => None,
        })
        .expect("no final report")
}

/// Wait for the first event matching `pred`, returning it and everything before it.
fn wait_for(events: &Receiver<Event>, pred: impl Fn(&Event) -> bool) -> (Event, Vec<Event>) {
    let mut before = Vec::new();
    loop {
        let event = events.recv_timeout(Duration::from_secs(10)).expect("timed out waiting for event");
        if pred(&event) {
            return (event, before);
        }
        before.push(event);
    }
}

#[test]
fn final_turn_matches_the_turn_limit() {
    for turns in [0, 1, 2, 7, 25] {
        let (_, events) = run_to_end(Params::new(8, 8, turns, 2), Grid::random(8, 8));
        assert_eq!(final_report(&events).0, turns);
        assert_eq!(turns_completed(&events), (1..=turns).collect::<Vec<_>>());
    }
}

#[test]
fn stream_ends_with_final_report_output_and_quitting() {
    let (_, events) = run_to_end(Params::new(8, 8, 3, 3), Grid::new(8, 8));
    let tail: Vec<&Event> = events.iter().rev().take(3).rev().collect();

    assert!(matches!(tail[0], Event::FinalTurnComplete { completed_turns: 3, .. }));
    assert_eq!(
        tail[1],
        &Event::ImageOutputComplete { completed_turns: 3, filename: "8x8x3".to_string() }
    );
    assert_eq!(tail[2], &Event::StateChange { completed_turns: 3, new_state: State::Quitting });
}

#[test]
fn final_generation_is_written_out() {
    let world = Grid::with_alive(8, 8, &cells(&[(3, 3), (4, 3), (3, 4), (4, 4)]));
    let (tx, _rx) = crossbeam_channel::unbounded();
    let mut io = MemoryIo::new(world.clone());
    gol::run(Params::new(8, 8, 4, 2), &mut io, tx, None).unwrap();

    assert_eq!(io.outputs(), vec![("8x8x4".to_string(), world)]);
}

#[test]
fn dead_world_stays_dead() {
    let (alive, events) = run_to_end(Params::new(12, 9, 10, 4), Grid::new(12, 9));
    assert!(alive.is_empty());
    assert!(final_report(&events).1.is_empty());
}

#[test]
fn block_is_still_life() {
    let block = cells(&[(3, 3), (4, 3), (3, 4), (4, 4)]);
    let (alive, events) = run_to_end(Params::new(8, 8, 5, 3), Grid::with_alive(8, 8, &block));

    let expected: BTreeSet<Cell> = block.into_iter().collect();
    assert_eq!(alive.into_iter().collect::<BTreeSet<_>>(), expected);
    assert_eq!(final_report(&events).0, 5);
}

#[test]
fn block_survives_across_the_wrap() {
    let block = cells(&[(0, 0), (3, 0), (0, 3), (3, 3)]);
    let (alive, _) = run_to_end(Params::new(4, 4, 9, 4), Grid::with_alive(4, 4, &block));
    assert_eq!(alive, cells(&[(0, 0), (3, 0), (0, 3), (3, 3)]));
}

#[test]
fn blinker_transposes_after_one_turn() {
    let blinker = cells(&[(7, 8), (8, 8), (9, 8)]);
    let (alive, _) = run_to_end(Params::new(16, 16, 1, 4), Grid::with_alive(16, 16, &blinker));

    assert_eq!(alive.len(), 3);
    assert_eq!(alive, cells(&[(8, 7), (8, 8), (8, 9)]));
}

#[test]
fn blinker_returns_after_two_turns() {
    let blinker = cells(&[(1, 2), (2, 2), (3, 2)]);
    let (alive, _) = run_to_end(Params::new(5, 5, 2, 5), Grid::with_alive(5, 5, &blinker));
    assert_eq!(alive, blinker);
}

#[test]
fn partition_count_does_not_change_the_result() {
    let world = Grid::random_with(16, 16, &mut StdRng::seed_from_u64(0x5eed));

    let (single, _) = run_to_end(Params::new(16, 16, 30, 1), world.clone());
    for threads in [2, 3, 5, 7, 16] {
        let (split, _) = run_to_end(Params::new(16, 16, 30, threads), world.clone());
        assert_eq!(split, single, "{threads} threads");
    }
}

#[test]
fn invalid_configuration_is_rejected_before_any_event() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut io = MemoryIo::new(Grid::new(4, 4));
    let result = gol::run(Params::new(4, 4, 3, 5), &mut io, tx, None);

    assert!(matches!(result, Err(Error::Config(ConfigError::Threads { threads: 5, height: 4 }))));
    assert!(rx.iter().next().is_none());
    assert!(io.outputs().is_empty());
}

#[test]
fn mismatched_input_is_rejected() {
    let (tx, _rx) = crossbeam_channel::unbounded();
    let mut io = MemoryIo::new(Grid::new(4, 4));
    let result = gol::run(Params::new(8, 8, 3, 2), &mut io, tx, None);
    assert!(matches!(result, Err(Error::Input(_))));
}

#[test]
fn replaying_flips_reconstructs_every_generation() {
    let world = Grid::random_with(10, 10, &mut StdRng::seed_from_u64(7));
    let params = Params::new(10, 10, 12, 3).with_flip_tracking(true);
    let (alive, events) = run_to_end(params, world.clone());

    let mut replay = vec![vec![CellState::Dead; 10]; 10];
    let mut last_turn = 0;
    for event in &events {
        match event {
            Event::CellFlipped { completed_turns, cell } => {
                if *completed_turns != 0 {
                    assert_eq!(*completed_turns, last_turn + 1);
                }
                let state = &mut replay[cell.y][cell.x];
                *state = if *state == CellState::Alive { CellState::Dead } else { CellState::Alive };
            }
            Event::TurnComplete { completed_turns } => last_turn = *completed_turns,
            _ => {}
        }
    }

    let replayed = Grid::from_rows(10, replay);
    assert_eq!(replayed, Grid::with_alive(10, 10, &alive));
}

#[test]
fn initial_flips_describe_the_starting_grid() {
    let start = cells(&[(1, 0), (0, 2), (3, 3)]);
    let params = Params::new(4, 4, 0, 1).with_flip_tracking(true);
    let (_, events) = run_to_end(params, Grid::with_alive(4, 4, &start));

    let flipped: Vec<Cell> = events
        .iter()
        .filter_map(|event| match event {
            Event::CellFlipped { completed_turns: 0, cell } => Some(*cell),
            _ => None,
        })
        .collect();
    assert_eq!(flipped, start);
}

#[test]
fn telemetry_reports_completed_generations() {
    const TURNS: usize = 2_000;
    let world = Grid::random_with(32, 32, &mut StdRng::seed_from_u64(0xa11ce));

    // Alive count of every generation, computed without any concurrency.
    let reference = TurnExecutor::new(32, 1);
    let mut view = GridView::new(world.clone());
    let mut expected = vec![alive_count(&view)];
    for turn in 1..=TURNS {
        view = reference.advance(&view, turn);
        expected.push(alive_count(&view));
    }

    let params = Params::new(32, 32, TURNS, 5).with_tick_interval(Duration::from_millis(1));
    let (_, events) = run_to_end(params, world);

    let mut samples = 0;
    let mut turn = 0;
    for event in &events {
        match event {
            Event::AliveCellsCount { completed_turns, cells_count } => {
                assert_eq!(*completed_turns, turn);
                assert_eq!(*cells_count, expected[turn], "count after {turn} turns");
                samples += 1;
            }
            Event::TurnComplete { completed_turns } => turn = *completed_turns,
            _ => {}
        }
    }
    assert!(samples > 0);
    assert_eq!(turns_completed(&events), (1..=TURNS).collect::<Vec<_>>());
}

#[test]
fn quit_stops_early() {
    let (events, commands, handle) = spawn_run(Params::new(16, 16, usize::MAX, 2), Grid::random(16, 16));
    wait_for(&events, |event| matches!(event, Event::TurnComplete { .. }));
    commands.send(Command::Quit).unwrap();

    handle.join().unwrap();
    let rest: Vec<Event> = events.iter().collect();
    let (turn, _) = final_report(&rest);
    assert!(turn < usize::MAX);
    assert_eq!(rest.last(), Some(&Event::StateChange { completed_turns: turn, new_state: State::Quitting }));
}

#[test]
fn pause_holds_turns_and_telemetry_until_resumed() {
    let params = Params::new(16, 16, usize::MAX, 4).with_tick_interval(Duration::from_millis(2));
    let (events, commands, handle) = spawn_run(params, Grid::random(16, 16));

    commands.send(Command::Pause).unwrap();
    let (paused, _) = wait_for(&events, |event| matches!(event, Event::StateChange { .. }));
    let Event::StateChange { completed_turns: paused_at, new_state: State::Paused } = paused else {
        panic!("expected a pause, got {paused:?}");
    };

    thread::sleep(Duration::from_millis(50));
    commands.send(Command::Save).unwrap();
    let (saved, idle) = wait_for(&events, |event| matches!(event, Event::ImageOutputComplete { .. }));
    assert!(idle.is_empty(), "events while paused: {idle:?}");
    assert_eq!(
        saved,
        Event::ImageOutputComplete { completed_turns: paused_at, filename: format!("16x16x{paused_at}") }
    );

    commands.send(Command::Pause).unwrap();
    let (resumed, _) = wait_for(&events, |event| matches!(event, Event::StateChange { .. }));
    assert_eq!(resumed, Event::StateChange { completed_turns: paused_at, new_state: State::Executing });
    let (next, _) = wait_for(&events, |event| matches!(event, Event::TurnComplete { .. }));
    assert_eq!(next, Event::TurnComplete { completed_turns: paused_at + 1 });

    commands.send(Command::Quit).unwrap();
    handle.join().unwrap();
    let rest: Vec<Event> = events.iter().collect();
    assert!(final_report(&rest).0 > paused_at);
}

#[test]
fn quit_while_paused_reports_the_paused_turn() {
    let (events, commands, handle) = spawn_run(Params::new(8, 8, usize::MAX, 2), Grid::random(8, 8));

    commands.send(Command::Pause).unwrap();
    let (paused, _) = wait_for(&events, |event| matches!(event, Event::StateChange { .. }));
    commands.send(Command::Quit).unwrap();

    let alive = handle.join().unwrap();
    let rest: Vec<Event> = events.iter().collect();
    assert_eq!(turns_completed(&rest), Vec::<usize>::new());
    assert_eq!(final_report(&rest), (paused.completed_turns(), alive));
}

#[test]
fn save_writes_the_current_generation() {
    let block = cells(&[(3, 3), (4, 3), (3, 4), (4, 4)]);
    let world = Grid::with_alive(8, 8, &block);
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (command_tx, command_rx) = crossbeam_channel::unbounded();
    let io = MemoryIo::new(world.clone());
    let outputs = io.clone();

    command_tx.send(Command::Save).unwrap();
    drop(command_tx);
    let handle = thread::spawn(move || {
        let mut io = io;
        gol::run(Params::new(8, 8, 2_000, 2), &mut io, event_tx, Some(command_rx)).unwrap()
    });
    handle.join().unwrap();

    let events: Vec<Event> = event_rx.iter().collect();
    let saves = events
        .iter()
        .filter(|event| matches!(event, Event::ImageOutputComplete { .. }))
        .count();
    assert_eq!(saves, 2);

    let written = outputs.outputs();
    assert_eq!(written.len(), 2);
    assert!(written.iter().all(|(_, grid)| grid == &world));
    assert_eq!(written[1].0, "8x8x2000");
}

#[test]
fn disconnected_command_source_falls_back_to_plain_run() {
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (command_tx, command_rx) = crossbeam_channel::unbounded::<Command>();
    drop(command_tx);

    let mut io = MemoryIo::new(Grid::random(8, 8));
    gol::run(Params::new(8, 8, 40, 2), &mut io, event_tx, Some(command_rx)).unwrap();

    let events: Vec<Event> = event_rx.iter().collect();
    assert_eq!(final_report(&events).0, 40);
    assert_eq!(turns_completed(&events), (1..=40).collect::<Vec<_>>());
}
