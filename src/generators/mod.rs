use rand::{Rng, SeedableRng, rngs::StdRng};

mod recur_backtrack;

use recur_backtrack::recursive_backtrack;

use crate::maze::Grid;

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Carves a perfect maze of `cols × rows` cells with the randomized depth-first backtracker.
/// The result is fully determined by the state of `rng`.
///
/// Panics if either dimension is 0.
pub fn generate<R: Rng + ?Sized>(cols: u8, rows: u8, rng: &mut R) -> Grid {
    let mut grid = Grid::new(cols, rows);
    recursive_backtrack(&mut grid, rng);
    grid
}
