use crate::grid::{Cell, GridView};

/// Every alive cell, rows top to bottom and columns left to right.
pub fn alive_cells(view: &GridView) -> Vec<Cell> {
    (0..view.height())
        .flat_map(|y| (0..view.width()).map(move |x| Cell::new(x, y)))
        .filter(|cell| view.get(cell.y as isize, cell.x as isize).is_alive())
        .collect()
}

pub fn alive_count(view: &GridView) -> usize {
    (0..view.height())
        .map(|y| {
            (0..view.width())
                .filter(|&x| view.get(y as isize, x as isize).is_alive())
                .count()
        })
        .sum()
}
