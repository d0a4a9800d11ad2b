use rand::Rng;

use crate::maze::{Coord, Grid};

/// Randomized depth-first carving, in iterative form.
///
/// Starts from the top left cell and keeps walking into a random unvisited neighbor,
/// knocking down the wall in between. When the walk is stuck it backtracks along the
/// stack until a cell with unvisited neighbors turns up. Stops once every cell is visited.
pub fn recursive_backtrack<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    let total = grid.len();

    let mut current: Coord = (0, 0);
    grid.mark_visited(current);
    let mut visited_count = 1;

    // Cells we can come back to once the walk hits a dead end
    let mut stack: Vec<Coord> = Vec::new();

    while visited_count < total {
        let neighbors = grid.unvisited_neighbors(current);

        if !neighbors.is_empty() {
            let next = neighbors[rng.random_range(0..neighbors.len())];
            grid.mark_visited(next);
            visited_count += 1;
            grid.remove_wall_between(current, next);
            stack.push(current);
            current = next;
        } else if let Some(previous) = stack.pop() {
            current = previous;
        } else {
            // Nothing left to backtrack to. Unreachable on a rectangular grid.
            tracing::warn!(
                "[generator] Backtrack stack exhausted with {}/{} cells visited",
                visited_count,
                total
            );
            break;
        }
    }

    grid.reset_visited();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::get_rng;

    #[test]
    fn test_single_cell_completes_immediately() {
        let mut grid = Grid::new(1, 1);
        recursive_backtrack(&mut grid, &mut get_rng(Some(0)));
        assert_eq!(grid, Grid::new(1, 1));
    }

    #[test]
    fn test_single_row_is_a_corridor() {
        let mut grid = Grid::new(6, 1);
        recursive_backtrack(&mut grid, &mut get_rng(Some(8)));
        for x in 0..5 {
            assert!(grid.is_connected((x, 0), (x + 1, 0)));
        }
    }

    #[test]
    fn test_every_cell_gets_an_opening() {
        let mut grid = Grid::new(9, 7);
        recursive_backtrack(&mut grid, &mut get_rng(Some(13)));
        for cell in grid.cells() {
            assert!(
                grid.open_neighbors(cell.coord()).next().is_some(),
                "{:?} is sealed off",
                cell.coord()
            );
        }
    }
}
