use std::{collections::HashSet, time::Instant};

use super::{ControlSignal, Frame, SolveHost, SolveOutcome, SolveStats, Speed};
use crate::maze::{Coord, Grid};

/// Result of a single solver step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The search goes on, call [`DfsSolver::step`] again
    Continue,
    /// The search is over
    Done(SolveOutcome),
}

/// Stack-based depth-first search that advances one stack entry per call to [`DfsSolver::step`].
///
/// Unlike a textbook DFS it does not backtrack: the first cell it reaches with no unvisited
/// open neighbor ends the whole search, and the path to that dead end is reported as a
/// failure. Neighbors are pushed in top, right, bottom, left order, so for a given maze the
/// run is fully deterministic.
pub struct DfsSolver {
    goal: Coord,
    /// Cells waiting to be explored, each with the path that led to it
    stack: Vec<(Coord, Vec<Coord>)>,
    /// Cells already popped and processed
    visited: HashSet<Coord>,
    /// Cells shown as explored to the renderer
    explored: HashSet<Coord>,
    stats: SolveStats,
    outcome: Option<SolveOutcome>,
}

impl DfsSolver {
    /// Sets up a run from `start` to `goal`. The run's clock starts here.
    pub fn new(start: Coord, goal: Coord) -> Self {
        tracing::debug!("[solver] Starting DFS from {:?} to {:?}", start, goal);
        DfsSolver {
            goal,
            stack: vec![(start, Vec::new())],
            visited: HashSet::new(),
            explored: HashSet::new(),
            stats: SolveStats {
                start_time: Some(Instant::now()),
                ..Default::default()
            },
            outcome: None,
        }
    }

    pub fn explored(&self) -> &HashSet<Coord> {
        &self.explored
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    pub fn outcome(&self) -> Option<&SolveOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    /// Consumes the solver, returning the explored cells and the run statistics.
    pub fn into_parts(self) -> (HashSet<Coord>, SolveStats) {
        (self.explored, self.stats)
    }

    /// Advances the search by one stack entry.
    ///
    /// Control input is polled first: an abort ends the run with an empty path, a speed
    /// change updates `speed` before this step's delay is applied. Once the run is over,
    /// further calls keep returning the same outcome.
    pub fn step<H: SolveHost + ?Sized>(
        &mut self,
        grid: &Grid,
        host: &mut H,
        speed: &mut Speed,
    ) -> Step {
        if let Some(outcome) = &self.outcome {
            return Step::Done(outcome.clone());
        }

        if self.stack.is_empty() {
            return self.exhausted();
        }

        match host.poll() {
            ControlSignal::Idle => {}
            ControlSignal::Abort => {
                tracing::info!(
                    "[solver] Aborted after {} nodes visited",
                    self.stats.nodes_visited
                );
                return self.finish(SolveOutcome::aborted());
            }
            ControlSignal::SpeedDelta(delta) => speed.adjust(delta),
        }

        let Some((current, mut path)) = self.stack.pop() else {
            return self.exhausted();
        };
        self.stats.nodes_visited += 1;

        // The same cell can sit on the stack several times, only the first pop counts
        if !self.visited.insert(current) {
            tracing::trace!("[solver] Skipping already visited cell {:?}", current);
            return Step::Continue;
        }
        self.explored.insert(current);

        host.render(Frame {
            grid,
            explored: &self.explored,
            path: None,
            failed: false,
            stats: &self.stats,
            delay_ms: speed.delay_ms(),
        });
        host.pause(speed.delay());

        path.push(current);

        if current == self.goal {
            self.finalize(&path);
            tracing::info!(
                "[solver] Goal reached with a path of {} cells after {} nodes visited",
                path.len(),
                self.stats.nodes_visited
            );
            host.render(Frame {
                grid,
                explored: &self.explored,
                path: Some(path.as_slice()),
                failed: false,
                stats: &self.stats,
                delay_ms: speed.delay_ms(),
            });
            return self.finish(SolveOutcome {
                path,
                success: true,
            });
        }

        let unvisited = grid
            .open_neighbors(current)
            .filter(|neighbor| !self.visited.contains(neighbor))
            .collect::<Vec<_>>();

        if unvisited.is_empty() {
            // Dead end: the search stops here instead of falling back to the stack
            self.stats.dead_ends += 1;
            self.finalize(&path);
            tracing::info!(
                "[solver] Dead end reached at {:?} after {} nodes visited",
                current,
                self.stats.nodes_visited
            );
            host.render(Frame {
                grid,
                explored: &self.explored,
                path: Some(path.as_slice()),
                failed: true,
                stats: &self.stats,
                delay_ms: speed.delay_ms(),
            });
            return self.finish(SolveOutcome {
                path,
                success: false,
            });
        }

        for neighbor in unvisited {
            self.stack.push((neighbor, path.clone()));
        }
        Step::Continue
    }

    /// Keeps stepping until the run is over.
    pub fn run<H: SolveHost + ?Sized>(
        &mut self,
        grid: &Grid,
        host: &mut H,
        speed: &mut Speed,
    ) -> SolveOutcome {
        loop {
            if let Step::Done(outcome) = self.step(grid, host, speed) {
                return outcome;
            }
        }
    }

    fn finalize(&mut self, path: &[Coord]) {
        self.stats.end_time = Some(Instant::now());
        self.stats.path_length = Some(path.len());
    }

    /// Nothing left on the stack without having hit the goal or a dead end.
    fn exhausted(&mut self) -> Step {
        tracing::warn!("[solver] Stack exhausted without reaching the goal");
        self.stats.end_time = Some(Instant::now());
        self.finish(SolveOutcome::aborted())
    }

    fn finish(&mut self, outcome: SolveOutcome) -> Step {
        self.outcome = Some(outcome.clone());
        Step::Done(outcome)
    }
}
