/// Coordinate of a cell in the maze, as `(x, y)`.
pub type Coord = (u8, u8);

/// One of the four sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All sides in the order used for every neighbor query: top, right, bottom, left.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// The side of the neighbor that faces back toward this side.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Unit displacement `(dx, dy)` when crossing this side. `y` grows downwards.
    pub fn offset(self) -> (i16, i16) {
        match self {
            Side::Top => (0, -1),
            Side::Right => (1, 0),
            Side::Bottom => (0, 1),
            Side::Left => (-1, 0),
        }
    }

    /// The side crossed when moving from `from` to `to`.
    /// Returns `None` unless the two coordinates are exactly one unit step apart.
    pub fn between(from: Coord, to: Coord) -> Option<Side> {
        let dx = to.0 as i16 - from.0 as i16;
        let dy = to.1 as i16 - from.1 as i16;
        Side::ALL.into_iter().find(|side| side.offset() == (dx, dy))
    }

    /// The coordinate across this side, if it does not leave `[0, cols) × [0, rows)`.
    pub fn step(self, coord: Coord, cols: u8, rows: u8) -> Option<Coord> {
        let (x, y) = coord;
        let next = match self {
            Side::Top => (x, y.checked_sub(1)?),
            Side::Right => (x.checked_add(1)?, y),
            Side::Bottom => (x, y.checked_add(1)?),
            Side::Left => (x.checked_sub(1)?, y),
        };
        (next.0 < cols && next.1 < rows).then_some(next)
    }
}

/// Wall state of a single cell. `true` means a wall blocks movement across that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Walls {
    /// All four walls standing.
    pub const CLOSED: Walls = Walls {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub fn has(&self, side: Side) -> bool {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    pub(super) fn open(&mut self, side: Side) {
        match side {
            Side::Top => self.top = false,
            Side::Right => self.right = false,
            Side::Bottom => self.bottom = false,
            Side::Left => self.left = false,
        }
    }
}

/// A single grid position with its wall state.
///
/// Walls are only ever opened in matching pairs through
/// [`Grid::remove_wall_between`](super::Grid::remove_wall_between), which keeps
/// a cell and its neighbor in agreement about the wall they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    x: u8,
    y: u8,
    walls: Walls,
    /// Generation bookkeeping only. Always false outside of a running generator.
    pub(super) visited: bool,
}

impl Cell {
    pub fn new(x: u8, y: u8) -> Self {
        Cell {
            x,
            y,
            walls: Walls::CLOSED,
            visited: false,
        }
    }

    pub fn coord(&self) -> Coord {
        (self.x, self.y)
    }

    pub fn walls(&self) -> &Walls {
        &self.walls
    }

    pub fn has_wall(&self, side: Side) -> bool {
        self.walls.has(side)
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// Whether this cell has a wall on the side facing `other`.
    /// Returns `None` if the two cells are not geometrically adjacent.
    pub fn wall_toward(&self, other: &Cell) -> Option<bool> {
        Side::between(self.coord(), other.coord()).map(|side| self.has_wall(side))
    }

    pub(super) fn open_wall(&mut self, side: Side) {
        self.walls.open(side);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_is_closed() {
        let cell = Cell::new(3, 4);
        assert_eq!(cell.coord(), (3, 4));
        assert_eq!(cell.walls(), &Walls::CLOSED);
        assert!(Side::ALL.iter().all(|&side| cell.has_wall(side)));
        assert!(!cell.is_visited());
    }

    #[test]
    fn test_side_between() {
        assert_eq!(Side::between((1, 1), (1, 0)), Some(Side::Top));
        assert_eq!(Side::between((1, 1), (2, 1)), Some(Side::Right));
        assert_eq!(Side::between((1, 1), (1, 2)), Some(Side::Bottom));
        assert_eq!(Side::between((1, 1), (0, 1)), Some(Side::Left));
        // Diagonal, same cell and two steps away are not adjacent
        assert_eq!(Side::between((1, 1), (2, 2)), None);
        assert_eq!(Side::between((1, 1), (1, 1)), None);
        assert_eq!(Side::between((1, 1), (3, 1)), None);
    }

    #[test]
    fn test_side_step_stays_in_bounds() {
        assert_eq!(Side::Top.step((0, 0), 3, 3), None);
        assert_eq!(Side::Left.step((0, 0), 3, 3), None);
        assert_eq!(Side::Right.step((2, 0), 3, 3), None);
        assert_eq!(Side::Bottom.step((0, 2), 3, 3), None);
        assert_eq!(Side::Right.step((u8::MAX, 0), u8::MAX, 1), None);
        assert_eq!(Side::Bottom.step((1, 1), 3, 3), Some((1, 2)));
    }

    #[test]
    fn test_opposite_round_trips() {
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
            let (dx, dy) = side.offset();
            assert_eq!(side.opposite().offset(), (-dx, -dy));
        }
    }
}
