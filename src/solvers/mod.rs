use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

pub mod dfs;

use crate::maze::{Coord, Grid};
use dfs::DfsSolver;

/// Delay applied after each newly explored cell, adjustable while a run is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speed {
    delay_ms: u16,
}

impl Speed {
    /// Fastest allowed setting, in milliseconds per step
    pub const MIN_DELAY_MS: u16 = 5;
    /// Slowest allowed setting, in milliseconds per step
    pub const MAX_DELAY_MS: u16 = 500;
    /// Change applied by a single speed up / slow down key press
    pub const STEP_MS: u16 = 5;
    pub const DEFAULT_DELAY_MS: u16 = 50;

    /// Creates a speed setting, clamping `delay_ms` into the allowed range.
    pub fn new(delay_ms: u16) -> Self {
        Speed {
            delay_ms: delay_ms.clamp(Speed::MIN_DELAY_MS, Speed::MAX_DELAY_MS),
        }
    }

    pub fn delay_ms(&self) -> u16 {
        self.delay_ms
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms as u64)
    }

    /// Shifts the delay by `delta_ms` (negative is faster), staying within the allowed range.
    pub fn adjust(&mut self, delta_ms: i32) {
        let delay = (self.delay_ms as i32).saturating_add(delta_ms).clamp(
            Speed::MIN_DELAY_MS as i32,
            Speed::MAX_DELAY_MS as i32,
        );
        if delay as u16 != self.delay_ms {
            tracing::debug!("[speed] Delay changed from {}ms to {}ms", self.delay_ms, delay);
        }
        self.delay_ms = delay as u16;
    }

    pub fn speed_up(&mut self) {
        self.adjust(-(Speed::STEP_MS as i32));
    }

    pub fn slow_down(&mut self) {
        self.adjust(Speed::STEP_MS as i32);
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed::new(Speed::DEFAULT_DELAY_MS)
    }
}

/// Statistics collected over one solving run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveStats {
    /// Number of entries popped off the stack, duplicates included
    pub nodes_visited: usize,
    /// Number of dead ends hit
    pub dead_ends: usize,
    /// Length of the returned path. Set once the run ends on the goal or a dead end.
    pub path_length: Option<usize>,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
}

impl SolveStats {
    /// Wall clock time of the run, once it has finished.
    pub fn elapsed(&self) -> Option<Duration> {
        Some(self.end_time?.duration_since(self.start_time?))
    }
}

/// Result of a solving run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    /// From the start cell to the goal, or to the dead end that stopped the search.
    /// Empty when the run was aborted.
    pub path: Vec<Coord>,
    /// Whether the path ends on the goal
    pub success: bool,
}

impl SolveOutcome {
    pub(crate) fn aborted() -> Self {
        SolveOutcome {
            path: Vec::new(),
            success: false,
        }
    }
}

/// Everything a host gets back from [`solve_step_driven`].
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub path: Vec<Coord>,
    pub success: bool,
    /// Cells explored before the run ended
    pub explored: HashSet<Coord>,
    pub stats: SolveStats,
}

/// Control input collected by the host between two solver steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Nothing happened
    Idle,
    /// Stop the run right away
    Abort,
    /// Change the per-step delay by this many milliseconds
    SpeedDelta(i32),
}

/// Snapshot of the solver state handed to the renderer.
pub struct Frame<'a> {
    pub grid: &'a Grid,
    pub explored: &'a HashSet<Coord>,
    /// Final path, only present on the last frame of a run
    pub path: Option<&'a [Coord]>,
    /// Whether `path` ended on a dead end instead of the goal
    pub failed: bool,
    pub stats: &'a SolveStats,
    /// Per-step delay in effect when the frame was taken
    pub delay_ms: u16,
}

/// The environment the solver runs in: where frames are drawn, where control input comes
/// from, and how the per-step delay is spent.
pub trait SolveHost {
    /// Draws the current solver state.
    fn render(&mut self, frame: Frame<'_>);

    /// Returns the pending control input. Called once per step, must not block.
    fn poll(&mut self) -> ControlSignal;

    /// Waits out the per-step delay. Headless hosts can return immediately.
    fn pause(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Host for runs without a display: draws nothing, never sees input and skips the delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl SolveHost for Headless {
    fn render(&mut self, _frame: Frame<'_>) {}

    fn poll(&mut self) -> ControlSignal {
        ControlSignal::Idle
    }

    fn pause(&mut self, _delay: Duration) {}
}

/// Runs a depth-first search from `start` to `goal` over the open passages of `grid`,
/// one step at a time, until it reaches the goal, hits a dead end or is aborted.
pub fn solve_step_driven<H: SolveHost + ?Sized>(
    grid: &Grid,
    start: Coord,
    goal: Coord,
    host: &mut H,
    speed: &mut Speed,
) -> SolveReport {
    let mut solver = DfsSolver::new(start, goal);
    let outcome = solver.run(grid, host, speed);
    let (explored, stats) = solver.into_parts();
    SolveReport {
        path: outcome.path,
        success: outcome.success,
        explored,
        stats,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// What the renderer saw on one call
    #[derive(Debug, Clone)]
    pub struct RecordedFrame {
        pub explored: HashSet<Coord>,
        pub path: Option<Vec<Coord>>,
        pub failed: bool,
        pub delay_ms: u16,
    }

    /// Headless host that replays queued control signals, records every frame and never sleeps.
    #[derive(Default)]
    pub struct ScriptedHost {
        pub signals: VecDeque<ControlSignal>,
        pub frames: Vec<RecordedFrame>,
        pub pauses: Vec<Duration>,
        pub polls: usize,
    }

    impl ScriptedHost {
        pub fn with_signals(signals: impl IntoIterator<Item = ControlSignal>) -> Self {
            ScriptedHost {
                signals: signals.into_iter().collect(),
                ..Default::default()
            }
        }
    }

    impl SolveHost for ScriptedHost {
        fn render(&mut self, frame: Frame<'_>) {
            self.frames.push(RecordedFrame {
                explored: frame.explored.clone(),
                path: frame.path.map(<[Coord]>::to_vec),
                failed: frame.failed,
                delay_ms: frame.delay_ms,
            });
        }

        fn poll(&mut self) -> ControlSignal {
            self.polls += 1;
            self.signals.pop_front().unwrap_or(ControlSignal::Idle)
        }

        fn pause(&mut self, delay: Duration) {
            self.pauses.push(delay);
        }
    }

    /// A single row of `len` cells with every inner wall removed.
    pub fn corridor(len: u8) -> Grid {
        grid_with_passages(len, 1, &(1..len).map(|x| ((x - 1, 0), (x, 0))).collect::<Vec<_>>())
    }

    /// A grid where only the listed passages are open.
    pub fn grid_with_passages(cols: u8, rows: u8, passages: &[(Coord, Coord)]) -> Grid {
        let mut grid = Grid::new(cols, rows);
        for &(a, b) in passages {
            grid.remove_wall_between(a, b);
        }
        grid
    }

    #[test]
    fn test_speed_is_clamped() {
        assert_eq!(Speed::new(0).delay_ms(), Speed::MIN_DELAY_MS);
        assert_eq!(Speed::new(10_000).delay_ms(), Speed::MAX_DELAY_MS);
        assert_eq!(Speed::default().delay(), Duration::from_millis(50));

        let mut speed = Speed::new(7);
        speed.speed_up();
        assert_eq!(speed.delay_ms(), 5);
        speed.adjust(-1_000);
        assert_eq!(speed.delay_ms(), 5);
        speed.slow_down();
        assert_eq!(speed.delay_ms(), 10);
        speed.adjust(i32::MAX);
        assert_eq!(speed.delay_ms(), 500);
    }

    #[test]
    fn test_elapsed_requires_both_timestamps() {
        let mut stats = SolveStats::default();
        assert!(stats.elapsed().is_none());
        stats.start_time = Some(Instant::now());
        assert!(stats.elapsed().is_none());
        stats.end_time = stats.start_time;
        assert_eq!(stats.elapsed(), Some(Duration::ZERO));
    }

    #[test]
    fn test_two_by_one_scenario() {
        let grid = corridor(2);
        let mut host = ScriptedHost::default();
        let report = solve_step_driven(&grid, (0, 0), (1, 0), &mut host, &mut Speed::default());

        assert!(report.success);
        assert_eq!(report.path, vec![(0, 0), (1, 0)]);
        assert_eq!(report.stats.nodes_visited, 2);
        assert_eq!(report.stats.dead_ends, 0);
        assert_eq!(report.stats.path_length, Some(2));
        assert!(report.stats.end_time.is_some());
    }

    #[test]
    fn test_abort_before_first_step() {
        let grid = corridor(5);
        let mut host = ScriptedHost::with_signals([ControlSignal::Abort]);
        let report = solve_step_driven(&grid, (0, 0), (4, 0), &mut host, &mut Speed::default());

        assert!(!report.success);
        assert!(report.path.is_empty());
        assert_eq!(report.stats.nodes_visited, 0);
        assert!(report.stats.end_time.is_none());
        assert!(report.stats.path_length.is_none());
        assert!(host.frames.is_empty());
    }

    #[test]
    fn test_headless_host_gets_current_delay() {
        let grid = corridor(3);
        let mut host = ScriptedHost::with_signals([
            ControlSignal::SpeedDelta(-100),
            ControlSignal::SpeedDelta(1_000),
        ]);
        let mut speed = Speed::default();
        let report = solve_step_driven(&grid, (0, 0), (2, 0), &mut host, &mut speed);

        assert!(report.success);
        assert_eq!(report.explored.len(), 3);
        assert_eq!(speed.delay_ms(), Speed::MAX_DELAY_MS);
        let delays = host.frames.iter().map(|frame| frame.delay_ms).collect::<Vec<_>>();
        assert_eq!(delays, vec![5, 500, 500, 500]);
        assert_eq!(
            host.pauses,
            vec![
                Duration::from_millis(5),
                Duration::from_millis(500),
                Duration::from_millis(500)
            ]
        );
    }
}
