use std::{
    fmt,
    io::{Stdout, Write},
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};
use unicode_truncate::UnicodeTruncateStr;

use crate::{
    maze::{Coord, Side},
    solvers::Frame,
};

/// Orange, for paths that ran into a dead end
const FAILED_COLOR: Color = Color::Rgb {
    r: 255,
    g: 165,
    b: 0,
};

/// What a single slot of the drawn maze shows.
///
/// The maze is drawn on a `(2 * cols + 1) × (2 * rows + 1)` board: cells sit on odd
/// coordinates, the slots between them are walls or open passages, and the slots where
/// wall lines cross are always walls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tile {
    Wall,
    Empty,
    /// Cell or passage the solver has gone through
    Explored,
    Start,
    Goal,
    /// Cell on the final path, with an arrow toward the next cell of the path
    Route { toward: Option<Side>, failed: bool },
    /// Passage between two cells of the final path
    Link { failed: bool },
}

impl Tile {
    /// The width of each tile when rendered, in character widths.
    pub const WIDTH: u16 = 2;
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route_color = |failed: bool| if failed { FAILED_COLOR } else { Color::Green };
        let styled_symbol = match *self {
            Tile::Wall => "⬜".with(Color::White),
            Tile::Empty => "  ".with(Color::Reset),
            Tile::Explored => "  ".on(Color::DarkYellow),
            Tile::Start => "🟩".with(Color::Green),
            Tile::Goal => "🟥".with(Color::Red),
            Tile::Route { toward, failed } => {
                let arrow = match toward {
                    Some(Side::Top) => "↑ ",
                    Some(Side::Right) => "→ ",
                    Some(Side::Bottom) => "↓ ",
                    Some(Side::Left) => "← ",
                    None => "  ",
                };
                arrow.with(Color::Black).on(route_color(failed))
            }
            Tile::Link { failed } => "  ".on(route_color(failed)),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Tile::WIDTH as usize,
                "Each tile must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}

/// Board position of the cell at `coord`.
fn board_position(coord: Coord) -> (usize, usize) {
    (coord.0 as usize * 2 + 1, coord.1 as usize * 2 + 1)
}

/// Board position of the slot between `coord` and its neighbor across `side`.
fn board_slot(coord: Coord, side: Side) -> (usize, usize) {
    let (x, y) = board_position(coord);
    let (dx, dy) = side.offset();
    ((x as isize + dx as isize) as usize, (y as isize + dy as isize) as usize)
}

/// Lays out the tiles of a frame, row by row.
pub fn compose(frame: &Frame<'_>, start: Coord, goal: Coord) -> Vec<Vec<Tile>> {
    let grid = frame.grid;
    let width = grid.cols() as usize * 2 + 1;
    let height = grid.rows() as usize * 2 + 1;
    let mut board = vec![vec![Tile::Wall; width]; height];

    for cell in grid.cells() {
        let coord = cell.coord();
        let explored = frame.explored.contains(&coord);
        let (x, y) = board_position(coord);
        board[y][x] = if coord == start {
            Tile::Start
        } else if coord == goal {
            Tile::Goal
        } else if explored {
            Tile::Explored
        } else {
            Tile::Empty
        };

        // Each passage is drawn once, from its left or top cell
        for side in [Side::Right, Side::Bottom] {
            let Some(neighbor) = side.step(coord, grid.cols(), grid.rows()) else {
                continue;
            };
            if cell.has_wall(side) {
                continue;
            }
            let (sx, sy) = board_slot(coord, side);
            board[sy][sx] = if explored && frame.explored.contains(&neighbor) {
                Tile::Explored
            } else {
                Tile::Empty
            };
        }
    }

    if let Some(path) = frame.path {
        let failed = frame.failed;
        for (i, &coord) in path.iter().enumerate() {
            let toward = path
                .get(i + 1)
                .and_then(|&next| Side::between(coord, next));
            let (x, y) = board_position(coord);
            board[y][x] = Tile::Route { toward, failed };
            if let Some(side) = toward {
                let (sx, sy) = board_slot(coord, side);
                board[sy][sx] = Tile::Link { failed };
            }
        }
    }

    board
}

/// Delay and run statistics shown under the maze. Unknown values are shown as `-`.
pub fn status_line(frame: &Frame<'_>) -> String {
    let stats = frame.stats;
    let path_length = stats
        .path_length
        .map_or_else(|| "-".to_string(), |len| len.to_string());
    let elapsed = stats
        .elapsed()
        .map_or_else(|| "-".to_string(), |elapsed| format!("{:.1?}", elapsed));
    format!(
        "Delay: {}ms | Nodes visited: {} | Dead ends: {} | Path length: {} | Time: {}",
        frame.delay_ms, stats.nodes_visited, stats.dead_ends, path_length, elapsed
    )
}

/// Draws frames of the maze to the terminal.
pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    start: Coord,
    goal: Coord,
}

impl Renderer {
    /// Number of terminal rows used below the maze for the status and key hints
    pub const NUM_STATUS_ROWS: u16 = 2;

    pub fn new(start: Coord, goal: Coord) -> Self {
        Self {
            stdout: std::io::stdout(),
            start,
            goal,
        }
    }

    /// Terminal size needed to draw a maze of `cols × rows` cells with the status rows.
    pub fn required_size(cols: u8, rows: u8) -> (u16, u16) {
        (
            (cols as u16 * 2 + 1) * Tile::WIDTH,
            rows as u16 * 2 + 1 + Renderer::NUM_STATUS_ROWS,
        )
    }

    /// Wipes the whole screen, so that the next frame starts from a blank terminal.
    pub fn clear(&mut self) -> std::io::Result<()> {
        queue!(self.stdout, terminal::Clear(ClearType::All), cursor::Hide)?;
        self.stdout.flush()
    }

    /// Draws a frame followed by the status line and `hint`.
    /// If the terminal is too small, a message asking to resize it is shown instead.
    pub fn draw(&mut self, frame: &Frame<'_>, hint: &str) -> std::io::Result<()> {
        let (term_width, term_height) = terminal::size()?;
        let (needed_width, needed_height) =
            Renderer::required_size(frame.grid.cols(), frame.grid.rows());
        if term_width < needed_width || term_height < needed_height {
            let msg = format!(
                "Terminal size is too small ({}x{}) for the maze to display ({}x{} needed). Please resize the terminal.",
                term_width, term_height, needed_width, needed_height
            );
            queue!(
                self.stdout,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0),
                style::PrintStyledContent(msg.with(Color::Yellow).attribute(Attribute::Bold)),
            )?;
            return self.stdout.flush();
        }

        let board = compose(frame, self.start, self.goal);
        for (y, row) in board.iter().enumerate() {
            self.stdout.queue(cursor::MoveTo(0, y as u16))?;
            for tile in row {
                self.stdout.queue(style::Print(tile))?;
            }
        }

        let status = status_line(frame);
        let (status, _) = status.unicode_truncate(term_width as usize);
        let (hint, _) = hint.unicode_truncate(term_width as usize);

        let status_row = board.len() as u16;
        queue!(
            self.stdout,
            cursor::MoveTo(0, status_row),
            terminal::Clear(ClearType::UntilNewLine),
            style::PrintStyledContent(status.with(Color::Cyan).attribute(Attribute::Bold)),
            cursor::MoveTo(0, status_row + 1),
            terminal::Clear(ClearType::UntilNewLine),
            style::PrintStyledContent(hint.with(Color::Blue)),
        )?;
        self.stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{
        maze::Grid,
        solvers::{SolveStats, tests::grid_with_passages},
    };

    fn frame<'a>(
        grid: &'a Grid,
        explored: &'a HashSet<Coord>,
        path: Option<&'a [Coord]>,
        stats: &'a SolveStats,
    ) -> Frame<'a> {
        Frame {
            grid,
            explored,
            path,
            failed: false,
            stats,
            delay_ms: 50,
        }
    }

    #[test]
    fn test_closed_grid_is_all_walls_but_cells() {
        let grid = Grid::new(2, 2);
        let explored = HashSet::new();
        let stats = SolveStats::default();
        let board = compose(&frame(&grid, &explored, None, &stats), (0, 0), (1, 1));

        assert_eq!(board.len(), 5);
        assert!(board.iter().all(|row| row.len() == 5));
        assert_eq!(board[1][1], Tile::Start);
        assert_eq!(board[3][3], Tile::Goal);
        assert_eq!(board[1][3], Tile::Empty);
        // Wall between (0,0) and (1,0)
        assert_eq!(board[1][2], Tile::Wall);
        // Corners where wall lines cross
        assert_eq!(board[2][2], Tile::Wall);
    }

    #[test]
    fn test_open_passages_and_explored_cells() {
        let grid = grid_with_passages(3, 1, &[((0, 0), (1, 0)), ((1, 0), (2, 0))]);
        let explored = HashSet::from([(0, 0), (1, 0)]);
        let stats = SolveStats::default();
        let board = compose(&frame(&grid, &explored, None, &stats), (0, 0), (2, 0));

        assert_eq!(board[1][2], Tile::Explored);
        assert_eq!(board[1][3], Tile::Explored);
        // (1,0) is explored but (2,0) is not
        assert_eq!(board[1][4], Tile::Empty);
        assert_eq!(board[1][5], Tile::Goal);
    }

    #[test]
    fn test_path_points_to_next_cell() {
        let grid = grid_with_passages(2, 2, &[((0, 0), (0, 1)), ((0, 1), (1, 1))]);
        let explored = HashSet::from([(0, 0), (0, 1), (1, 1)]);
        let path = [(0, 0), (0, 1), (1, 1)];
        let stats = SolveStats::default();
        let board = compose(&frame(&grid, &explored, Some(&path[..]), &stats), (0, 0), (1, 1));

        assert_eq!(
            board[1][1],
            Tile::Route {
                toward: Some(Side::Bottom),
                failed: false
            }
        );
        assert_eq!(board[2][1], Tile::Link { failed: false });
        assert_eq!(
            board[3][1],
            Tile::Route {
                toward: Some(Side::Right),
                failed: false
            }
        );
        assert_eq!(board[3][2], Tile::Link { failed: false });
        assert_eq!(
            board[3][3],
            Tile::Route {
                toward: None,
                failed: false
            }
        );
    }

    #[test]
    fn test_every_tile_renders() {
        // Display checks the two column width itself in debug builds
        let tiles = [
            Tile::Wall,
            Tile::Empty,
            Tile::Explored,
            Tile::Start,
            Tile::Goal,
            Tile::Route {
                toward: Some(Side::Left),
                failed: true,
            },
            Tile::Route {
                toward: None,
                failed: false,
            },
            Tile::Link { failed: true },
        ];
        for tile in tiles {
            assert!(!tile.to_string().is_empty(), "{:?}", tile);
        }
    }

    #[test]
    fn test_status_line_shows_elapsed_once_finished() {
        let grid = Grid::new(1, 1);
        let explored = HashSet::new();
        let mut stats = SolveStats {
            nodes_visited: 12,
            dead_ends: 1,
            ..Default::default()
        };
        let status = status_line(&frame(&grid, &explored, None, &stats));
        assert_eq!(
            status,
            "Delay: 50ms | Nodes visited: 12 | Dead ends: 1 | Path length: - | Time: -"
        );

        let start = std::time::Instant::now();
        stats.start_time = Some(start);
        stats.end_time = Some(start + std::time::Duration::from_millis(1500));
        stats.path_length = Some(7);
        let status = status_line(&frame(&grid, &explored, None, &stats));
        assert!(status.ends_with("Path length: 7 | Time: 1.5s"), "{}", status);
    }

    #[test]
    fn test_required_size_counts_walls_and_status() {
        assert_eq!(Renderer::required_size(1, 1), (6, 5));
        assert_eq!(Renderer::required_size(10, 4), (42, 11));
    }
}
