use super::cell::{Cell, Coord, Side};

/// Row-major collection of `cols × rows` cells, addressed by `x + y * cols`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Box<[Cell]>,
    cols: u8,
    rows: u8,
}

impl Grid {
    /// Creates a grid where every cell has all four walls standing.
    ///
    /// Panics if either dimension is 0.
    pub fn new(cols: u8, rows: u8) -> Self {
        if cols < 1 || rows < 1 {
            panic!(
                "Grid dimensions must be positive, got {}x{}",
                cols, rows
            );
        }
        let cells = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| Cell::new(x, y)))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Grid { cells, cols, rows }
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A grid always holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        coord.0 < self.cols && coord.1 < self.rows
    }

    fn ravel_index(&self, coord: Coord) -> usize {
        coord.0 as usize + coord.1 as usize * self.cols as usize
    }

    /// Looks up the cell at `(x, y)`. Coordinates are signed so that callers can probe
    /// one step past the boundary; anything off-grid yields `None`.
    pub fn neighbor_at(&self, x: i16, y: i16) -> Option<&Cell> {
        let x = u8::try_from(x).ok()?;
        let y = u8::try_from(y).ok()?;
        self.cell_at((x, y))
    }

    pub fn cell_at(&self, coord: Coord) -> Option<&Cell> {
        if self.is_in_bounds(coord) {
            Some(&self.cells[self.ravel_index(coord)])
        } else {
            None
        }
    }

    /// Geometric neighbors in top, right, bottom, left order, ignoring walls.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = (Side, Coord)> + '_ {
        let in_bounds = self.is_in_bounds(coord);
        Side::ALL.into_iter().filter_map(move |side| {
            if !in_bounds {
                return None;
            }
            side.step(coord, self.cols, self.rows)
                .map(|neighbor| (side, neighbor))
        })
    }

    /// Geometric neighbors whose generation `visited` flag is still false.
    pub fn unvisited_neighbors(&self, coord: Coord) -> Vec<Coord> {
        self.neighbors(coord)
            .map(|(_, neighbor)| neighbor)
            .filter(|&neighbor| !self[neighbor].visited)
            .collect()
    }

    /// Neighbors reachable from `coord` through an open wall, in top, right, bottom, left
    /// order. These are the edges of the traversal graph.
    pub fn open_neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        self.neighbors(coord)
            .filter(move |&(side, _)| !self[coord].has_wall(side))
            .map(|(_, neighbor)| neighbor)
    }

    /// True iff `a` and `b` are adjacent and the wall between them is open on both sides.
    pub fn is_connected(&self, a: Coord, b: Coord) -> bool {
        if !self.is_in_bounds(a) || !self.is_in_bounds(b) {
            return false;
        }
        match Side::between(a, b) {
            Some(side) => !self[a].has_wall(side) && !self[b].has_wall(side.opposite()),
            None => false,
        }
    }

    /// Opens the wall shared by two adjacent cells, on both of them.
    ///
    /// Panics if either coordinate is out of bounds or the two are not one unit step apart.
    pub fn remove_wall_between(&mut self, a: Coord, b: Coord) {
        if !self.is_in_bounds(a) || !self.is_in_bounds(b) {
            panic!("Cannot remove wall between out of bounds cells {:?} and {:?}", a, b);
        }
        let side = match Side::between(a, b) {
            Some(side) => side,
            None => panic!(
                "Cannot remove wall between non-adjacent cells {:?} and {:?}",
                a, b
            ),
        };
        self[a].open_wall(side);
        self[b].open_wall(side.opposite());
    }

    pub(crate) fn mark_visited(&mut self, coord: Coord) {
        self[coord].visited = true;
    }

    pub(crate) fn reset_visited(&mut self) {
        self.cells.iter_mut().for_each(|cell| cell.visited = false);
    }

    /// Number of distinct open passages between adjacent cells.
    pub fn open_edge_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| {
                // Count each passage once, from its left or top cell
                [Side::Right, Side::Bottom]
                    .into_iter()
                    .filter(|&side| {
                        side.step(cell.coord(), self.cols, self.rows).is_some()
                            && !cell.has_wall(side)
                    })
                    .count()
            })
            .sum()
    }
}

impl std::ops::Index<Coord> for Grid {
    type Output = Cell;

    fn index(&self, coord: Coord) -> &Self::Output {
        &self.cells[self.ravel_index(coord)]
    }
}

impl std::ops::IndexMut<Coord> for Grid {
    fn index_mut(&mut self, coord: Coord) -> &mut Self::Output {
        let idx = self.ravel_index(coord);
        &mut self.cells[idx]
    }
}
