pub mod cell;
pub mod grid;

use std::collections::HashSet;

pub use cell::{Cell, Coord, Side, Walls};
pub use grid::Grid;

use crate::{
    generators::{generate, get_rng},
    solvers::{Frame, SolveHost, SolveOutcome, SolveStats, Speed, solve_step_driven},
};

/// A generated maze together with the state of its solving session.
pub struct Maze {
    grid: Grid,
    /// Always the top left cell
    start: Coord,
    /// Always the bottom right cell
    goal: Coord,
    /// Cells the solver has explored so far. Only grows until [`Maze::reset`].
    explored: HashSet<Coord>,
    /// Result of the last run, if the maze has been solved since the last reset
    outcome: Option<SolveOutcome>,
    stats: SolveStats,
}

impl Maze {
    /// Generates a new perfect maze of `cols × rows` cells.
    /// `seed` makes the maze reproducible, `None` draws from OS entropy.
    ///
    /// Panics if either dimension is 0.
    pub fn generate(cols: u8, rows: u8, seed: Option<u64>) -> Self {
        let mut rng = get_rng(seed);
        let grid = generate(cols, rows, &mut rng);
        tracing::info!("[maze] Generated {}x{} maze (seed: {:?})", cols, rows, seed);
        Maze::from_grid(grid)
    }

    /// Wraps an already carved grid. Start and goal are the top left and bottom right cells.
    pub fn from_grid(grid: Grid) -> Self {
        let goal = (grid.cols() - 1, grid.rows() - 1);
        Maze {
            grid,
            start: (0, 0),
            goal,
            explored: HashSet::new(),
            outcome: None,
            stats: SolveStats::default(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn goal(&self) -> Coord {
        self.goal
    }

    pub fn explored(&self) -> &HashSet<Coord> {
        &self.explored
    }

    /// Path found by the last run. Empty if not solved yet or the run was aborted.
    pub fn path(&self) -> &[Coord] {
        self.outcome
            .as_ref()
            .map(|outcome| outcome.path.as_slice())
            .unwrap_or_default()
    }

    pub fn outcome(&self) -> Option<&SolveOutcome> {
        self.outcome.as_ref()
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    pub fn is_solved(&self) -> bool {
        self.outcome.is_some()
    }

    /// Snapshot of the session for drawing the maze between runs, at the given speed.
    pub fn frame(&self, speed: Speed) -> Frame<'_> {
        let path = self
            .outcome
            .as_ref()
            .map(|outcome| outcome.path.as_slice())
            .filter(|path| !path.is_empty());
        Frame {
            grid: &self.grid,
            explored: &self.explored,
            path,
            failed: self.outcome.as_ref().is_some_and(|outcome| !outcome.success),
            stats: &self.stats,
            delay_ms: speed.delay_ms(),
        }
    }

    /// Runs the depth-first solver to completion, driving one step at a time.
    ///
    /// A maze is solved at most once: if it has been solved since the last
    /// [`Maze::reset`], the stored outcome is returned without searching again.
    pub fn solve<H: SolveHost + ?Sized>(&mut self, host: &mut H, speed: &mut Speed) -> SolveOutcome {
        if let Some(outcome) = &self.outcome {
            tracing::warn!("[maze] Maze already solved, reset it to solve again");
            return outcome.clone();
        }

        let report = solve_step_driven(&self.grid, self.start, self.goal, host, speed);
        let outcome = SolveOutcome {
            path: report.path,
            success: report.success,
        };
        self.explored = report.explored;
        self.stats = report.stats;
        self.outcome = Some(outcome.clone());
        outcome
    }

    /// Clears the explored set, path and statistics. The maze layout is kept.
    pub fn reset(&mut self) {
        self.explored.clear();
        self.outcome = None;
        self.stats = SolveStats::default();
    }
}
