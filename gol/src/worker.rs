use crossbeam_channel::Sender;

use crate::event::Event;
use crate::grid::{Cell, CellState, GridView};

/// Half-open row band `[start_y, end_y)` computed by one worker.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Partition {
    pub start_y: usize,
    pub end_y: usize,
}

impl Partition {
    pub fn rows(&self) -> usize {
        self.end_y - self.start_y
    }
}

/// Split `height` rows into `count` contiguous bands. Every band gets
/// `height / count` rows and the last one also takes the remainder.
pub fn partitions(height: usize, count: usize) -> Vec<Partition> {
    let count = count.clamp(1, height.max(1));
    let band = height / count;
    (0..count)
        .map(|i| Partition {
            start_y: band * i,
            end_y: if i + 1 == count { height } else { band * (i + 1) },
        })
        .collect()
}

/// Compute the next generation of the rows in `partition`, reading only from
/// `old`. When `flips` is given, one `CellFlipped` event tagged with `turn`
/// is sent per changed cell, in row-major order.
pub fn next_band(
    old: &GridView,
    partition: Partition,
    turn: usize,
    flips: Option<&Sender<Event>>,
) -> Vec<Vec<CellState>> {
    let width = old.width();
    let mut band = Vec::with_capacity(partition.rows());

    for y in partition.start_y..partition.end_y {
        let mut row = Vec::with_capacity(width);
        for x in 0..width {
            let current = old.get(y as isize, x as isize);
            let next = current.next(old.alive_neighbors(y, x));
            if next != current {
                if let Some(flips) = flips {
                    // A closed sink only means nobody is watching any more.
                    let _ = flips.send(Event::CellFlipped { completed_turns: turn, cell: Cell::new(x, y) });
                }
            }
            row.push(next);
        }
        band.push(row);
    }

    band
}
