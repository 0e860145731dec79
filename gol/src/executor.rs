use std::thread;

use crossbeam_channel::Sender;

use crate::event::Event;
use crate::grid::{Grid, GridView};
use crate::worker::{self, Partition};

/// Computes whole generations by fanning row bands out to worker threads.
#[derive(Debug, Clone)]
pub struct TurnExecutor {
    partitions: Vec<Partition>,
    flips: Option<Sender<Event>>,
}

impl TurnExecutor {
    pub fn new(height: usize, threads: usize) -> Self {
        TurnExecutor { partitions: worker::partitions(height, threads), flips: None }
    }

    /// Report every changed cell on `flips` while computing.
    pub fn with_flips(mut self, flips: Sender<Event>) -> Self {
        self.flips = Some(flips);
        self
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Produce generation `turn` from `old`. Every worker reads the same frozen
    /// view and owns its output band; bands are joined in row order before the
    /// new view is built, so no worker outlives this call.
    pub fn advance(&self, old: &GridView, turn: usize) -> GridView {
        let flips = self.flips.as_ref();

        let rows = thread::scope(|scope| {
            let workers: Vec<_> = self
                .partitions
                .iter()
                .map(|&partition| scope.spawn(move || worker::next_band(old, partition, turn, flips)))
                .collect();

            let mut rows = Vec::with_capacity(old.height());
            for worker in workers {
                match worker.join() {
                    Ok(band) => rows.extend(band),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            rows
        });

        GridView::new(Grid::from_rows(old.width(), rows))
    }
}
