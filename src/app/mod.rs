pub mod renderer;

use std::{
    io::{Stdout, Write},
    time::Duration,
};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{self, KeyCode},
    queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    app::renderer::{Renderer, Tile},
    maze::Maze,
    solvers::{ControlSignal, Frame, Headless, SolveHost, SolveStats, Speed},
};

/// Key hints shown under the maze, one per screen
const IDLE_HINT: &str = "Space: solve | ↑/↓: faster/slower | N: new maze | Esc: exit";
const SOLVING_HINT: &str = "↑/↓: faster/slower | Esc: abort";
const SOLVED_HINT: &str = "R: solve again | N: new maze | ↑/↓: faster/slower | Esc: exit";

/// What the user picked on a screen between two runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserAction {
    /// Solve the current maze (after a reset if it was already solved)
    Solve,
    /// Throw the current maze away and generate a new one
    NewMaze,
    Exit,
}

/// Solve host that draws to the terminal and reads the keyboard between steps.
struct TerminalHost<'a> {
    renderer: &'a mut Renderer,
    /// Delay of the last drawn frame, used to turn key presses into a speed change
    speed: Speed,
}

/// Applies speed key presses one at a time, each clamped to the allowed range.
/// Returns the resulting change in milliseconds.
fn apply_speed_keys(speed: &mut Speed, keys: &[KeyCode]) -> i32 {
    let before = speed.delay_ms() as i32;
    for key in keys {
        match key {
            KeyCode::Up => speed.speed_up(),
            KeyCode::Down => speed.slow_down(),
            _ => {}
        }
    }
    speed.delay_ms() as i32 - before
}

impl TerminalHost<'_> {
    /// Drains every pending terminal event without blocking.
    /// Esc wins over anything else, arrow presses are folded into a single speed change.
    fn read_control(&mut self) -> std::io::Result<ControlSignal> {
        let mut speed_keys = Vec::new();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                event::Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => {
                    match key_event.code {
                        KeyCode::Esc => {
                            tracing::debug!("[solve loop] Esc key pressed, aborting");
                            return Ok(ControlSignal::Abort);
                        }
                        code @ (KeyCode::Up | KeyCode::Down) => speed_keys.push(code),
                        _ => {}
                    }
                }
                event::Event::Resize(_, _) => self.renderer.clear()?,
                _ => {}
            }
        }
        match apply_speed_keys(&mut self.speed, &speed_keys) {
            0 => Ok(ControlSignal::Idle),
            delta => Ok(ControlSignal::SpeedDelta(delta)),
        }
    }
}

impl SolveHost for TerminalHost<'_> {
    fn render(&mut self, frame: Frame<'_>) {
        self.speed = Speed::new(frame.delay_ms);
        if let Err(e) = self.renderer.draw(&frame, SOLVING_HINT) {
            tracing::warn!("[solve loop] Failed to draw frame: {}", e);
        }
    }

    fn poll(&mut self) -> ControlSignal {
        self.read_control().unwrap_or_else(|e| {
            tracing::warn!("[solve loop] Failed to read terminal events: {}", e);
            ControlSignal::Idle
        })
    }
}

pub struct App {
    /// Delay between solver steps offered when the app starts, in milliseconds
    default_delay_ms: u16,
    /// How long to wait for a key press before checking for events again on idle screens
    input_poll_timeout: Duration,
}

impl Default for App {
    fn default() -> Self {
        Self {
            default_delay_ms: Speed::DEFAULT_DELAY_MS,
            input_poll_timeout: Duration::from_millis(100),
        }
    }
}

impl App {
    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to its previous state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Main application loop
    pub fn run(&self, stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(
            stdout,
            style::SetAttribute(Attribute::Reverse),
            style::PrintStyledContent("Maze Generator and DFS Solver\r\n".with(Color::Yellow)),
            style::SetAttribute(Attribute::NoReverse),
        )?;
        stdout.flush()?;

        // Ask user for maze dimensions
        let (cols, rows) = match App::ask_maze_dimensions(stdout)? {
            Some(dims) => dims,
            None => {
                return Ok(());
            }
        };

        // Ask user for the solving delay
        let mut speed = match self.ask_solving_delay(stdout)? {
            Some(delay_ms) => Speed::new(delay_ms),
            None => {
                return Ok(());
            }
        };

        tracing::info!(
            "[app] Starting with a {}x{} maze and a {}ms delay",
            cols,
            rows,
            speed.delay_ms()
        );

        let mut maze = Maze::generate(cols, rows, None);
        let mut renderer = Renderer::new(maze.start(), maze.goal());
        renderer.clear()?;

        loop {
            match self.wait_for_action(&mut renderer, &maze, &mut speed)? {
                UserAction::Exit => break,
                UserAction::NewMaze => {
                    maze = Maze::generate(cols, rows, None);
                    renderer.clear()?;
                }
                UserAction::Solve => {
                    if maze.is_solved() {
                        maze.reset();
                    }
                    tracing::info!("[app] Solving with a {}ms delay", speed.delay_ms());
                    let mut host = TerminalHost {
                        renderer: &mut renderer,
                        speed,
                    };
                    maze.solve(&mut host, &mut speed);
                    App::log_outcome(&maze);
                }
            }
        }

        tracing::info!("[app] Exiting");
        Ok(())
    }

    /// Profiling mode: generate and solve mazes without a terminal or any delay,
    /// then print a summary of the runs
    pub fn profile(&self, cols: u8, rows: u8, num_iterations: usize) -> std::io::Result<()> {
        let mut successes = 0;
        let mut total = SolveStats::default();
        let mut total_path_length = 0;
        let mut total_elapsed = Duration::ZERO;

        for _ in 0..num_iterations {
            let mut maze = Maze::generate(cols, rows, None);
            let mut speed = Speed::new(self.default_delay_ms);
            let outcome = maze.solve(&mut Headless, &mut speed);
            if outcome.success {
                successes += 1;
            }
            let stats = maze.stats();
            total.nodes_visited += stats.nodes_visited;
            total.dead_ends += stats.dead_ends;
            total_path_length += stats.path_length.unwrap_or_default();
            total_elapsed += stats.elapsed().unwrap_or_default();
        }

        let runs = num_iterations.max(1);
        let mut stdout = std::io::stdout();
        writeln!(stdout, "Maze size: {}x{}, runs: {}", cols, rows, num_iterations)?;
        writeln!(
            stdout,
            "Goal reached: {}/{} ({:.1}%)",
            successes,
            num_iterations,
            successes as f64 * 100.0 / runs as f64
        )?;
        writeln!(
            stdout,
            "Average nodes visited: {:.1}",
            total.nodes_visited as f64 / runs as f64
        )?;
        writeln!(
            stdout,
            "Average path length: {:.1}",
            total_path_length as f64 / runs as f64
        )?;
        writeln!(stdout, "Dead ends hit: {}", total.dead_ends)?;
        writeln!(stdout, "Average solve time: {:?}", total_elapsed / runs as u32)?;
        Ok(())
    }

    /// Draw the maze in its current state and block until the user picks an action.
    /// Arrow keys adjust the solving speed in place.
    fn wait_for_action(
        &self,
        renderer: &mut Renderer,
        maze: &Maze,
        speed: &mut Speed,
    ) -> std::io::Result<UserAction> {
        let hint = if maze.is_solved() {
            SOLVED_HINT
        } else {
            IDLE_HINT
        };
        renderer.draw(&maze.frame(*speed), hint)?;

        loop {
            if !event::poll(self.input_poll_timeout)? {
                continue;
            }
            match event::read()? {
                event::Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => {
                    match key_event.code {
                        KeyCode::Esc => return Ok(UserAction::Exit),
                        KeyCode::Char(' ') if !maze.is_solved() => return Ok(UserAction::Solve),
                        KeyCode::Char('r' | 'R') if maze.is_solved() => {
                            return Ok(UserAction::Solve);
                        }
                        KeyCode::Char('n' | 'N') => return Ok(UserAction::NewMaze),
                        KeyCode::Up => speed.speed_up(),
                        KeyCode::Down => speed.slow_down(),
                        _ => continue,
                    }
                }
                event::Event::Resize(_, _) => renderer.clear()?,
                _ => continue,
            }
            renderer.draw(&maze.frame(*speed), hint)?;
        }
    }

    /// Write the result of the last run to the log, with the path in chunks of ten cells
    fn log_outcome(maze: &Maze) {
        let stats = maze.stats();
        match maze.outcome() {
            Some(outcome) if outcome.success => tracing::info!(
                "[app] Path found: {} cells, {} nodes visited, took {:?}",
                outcome.path.len(),
                stats.nodes_visited,
                stats.elapsed()
            ),
            Some(outcome) if !outcome.path.is_empty() => tracing::info!(
                "[app] Dead end after {} cells, {} nodes visited",
                outcome.path.len(),
                stats.nodes_visited
            ),
            _ => {
                tracing::info!("[app] No path found");
                return;
            }
        }

        for chunk in maze.path().chunks(10) {
            let line = chunk
                .iter()
                .map(|(x, y)| format!("({}, {})", x, y))
                .collect::<Vec<_>>()
                .join(" -> ");
            tracing::info!("[app] {}", line);
        }
    }

    /// Get user input with real-time validation and feedback
    /// Returns None if user cancels input with Esc
    /// Returns Some(T) if user inputs a valid input and presses Enter, where T is the validated type
    fn prompt_with_validation<F, T>(
        stdout: &mut Stdout,
        prompt: &str,
        validate: F,
    ) -> std::io::Result<Option<T>>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        // Save cursor position so we can restore / redraw
        queue!(stdout, cursor::Hide, cursor::SavePosition)?;
        stdout.flush()?;

        let mut input = String::new();

        let value = loop {
            // Re-render prompt line
            queue!(
                stdout,
                cursor::RestorePosition,
                terminal::Clear(ClearType::FromCursorDown)
            )?;

            stdout.queue(style::PrintStyledContent(
                prompt.with(Color::Cyan).attribute(Attribute::Bold),
            ))?;

            // Decide color based on validity
            let validation_result = validate(input.trim());
            match validation_result {
                Ok(_) => {
                    stdout.queue(style::SetForegroundColor(Color::Green))?;
                }
                Err(_) => {
                    stdout.queue(style::SetForegroundColor(Color::Red))?;
                }
            }

            queue!(stdout, style::Print(&input), style::ResetColor)?;

            stdout.queue(style::Print(" \r\n"))?;

            // Error message line (if any)
            if let Err(msg) = validation_result {
                stdout.queue(style::PrintStyledContent(
                    msg.with(Color::DarkGrey).attribute(Attribute::Dim),
                ))?;
            }

            stdout.flush()?;

            // Wait for key event
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if kind != event::KeyEventKind::Press {
                    continue;
                }
                match code {
                    KeyCode::Enter => match validate(input.trim()) {
                        Ok(value) => break Some(value),
                        Err(_) => continue,
                    },
                    KeyCode::Char(c) => {
                        if !c.is_whitespace() && !c.is_control() {
                            input.push(c);
                        }
                    }
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Esc => {
                        // User cancelled input
                        break None;
                    }
                    _ => {}
                }
            }
        };
        // Cleanup
        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown),
            cursor::Show
        )?;
        stdout.flush()?;

        Ok(value)
    }

    /// Largest number of cells that fits in `term_size` terminal columns or rows,
    /// given that each cell and each wall line takes `tile_size` of them
    fn get_max_maze_size(term_size: u16, tile_size: u16) -> u8 {
        // n cells need 2n + 1 tiles
        let max_tiles = term_size / tile_size;
        (max_tiles.saturating_sub(1) / 2).clamp(1, u8::MAX as u16) as u8
    }

    /// Validate a maze dimension typed by the user. An empty input picks the largest size.
    fn validate_dimension(s: &str, max_size: u8) -> Result<u8, String> {
        if s.trim().is_empty() {
            return Ok(max_size);
        }
        let error_msg = format!("Please enter a valid number between 1 and {}.", max_size);
        s.trim()
            .parse::<u8>()
            .map_err(|_| error_msg.clone())
            .and_then(|n| {
                if (1..=max_size).contains(&n) {
                    Ok(n)
                } else {
                    Err(error_msg)
                }
            })
    }

    /// Validate the solving delay typed by the user. An empty input picks `default`.
    fn validate_delay(s: &str, default: u16) -> Result<u16, String> {
        if s.trim().is_empty() {
            return Ok(default);
        }
        let error_msg = format!(
            "Please enter a delay between {} and {} milliseconds.",
            Speed::MIN_DELAY_MS,
            Speed::MAX_DELAY_MS
        );
        s.trim()
            .parse::<u16>()
            .map_err(|_| error_msg.clone())
            .and_then(|n| {
                if (Speed::MIN_DELAY_MS..=Speed::MAX_DELAY_MS).contains(&n) {
                    Ok(n)
                } else {
                    Err(error_msg)
                }
            })
    }

    /// Ask user for maze dimensions (columns and rows between 1 and 255)
    /// Returns None if user cancels input with Esc
    /// Returns Some((cols, rows)) if user inputs valid dimensions
    fn ask_maze_dimensions(stdout: &mut Stdout) -> std::io::Result<Option<(u8, u8)>> {
        stdout.execute(style::PrintStyledContent(
            "Enter maze dimensions, or press Esc to exit. \
Maximum acceptable values are based on current terminal size, leave empty to use them.\r\n"
                .with(Color::Blue),
        ))?;

        let max_size = |is_cols: bool| match terminal::size() {
            Ok((term_width, term_height)) => {
                if is_cols {
                    App::get_max_maze_size(term_width, Tile::WIDTH)
                } else {
                    // Reserve rows for the status line and key hints
                    App::get_max_maze_size(
                        term_height.saturating_sub(Renderer::NUM_STATUS_ROWS),
                        1,
                    )
                }
            }
            // Fallback to max size if terminal size cannot be determined
            Err(_) => u8::MAX,
        };

        let validate_cols = |s: &str| App::validate_dimension(s, max_size(true));
        let validate_rows = |s: &str| App::validate_dimension(s, max_size(false));

        let cols = match App::prompt_with_validation(stdout, "Columns: ", validate_cols)? {
            Some(c) => c,
            None => return Ok(None),
        };
        stdout.execute(style::PrintStyledContent(
            format!("Columns set to {}\r\n", cols)
                .with(Color::Green)
                .attribute(Attribute::Bold),
        ))?;

        let rows = match App::prompt_with_validation(stdout, "Rows: ", validate_rows)? {
            Some(r) => r,
            None => return Ok(None),
        };
        stdout.execute(style::PrintStyledContent(
            format!("Rows set to {}\r\n", rows)
                .with(Color::Green)
                .attribute(Attribute::Bold),
        ))?;

        Ok(Some((cols, rows)))
    }

    /// Ask user for the delay between solver steps
    /// Returns None if user cancels input with Esc
    fn ask_solving_delay(&self, stdout: &mut Stdout) -> std::io::Result<Option<u16>> {
        stdout.execute(style::PrintStyledContent(
            format!(
                "Enter the solving delay in milliseconds. Lower = faster, higher = slower \
({}-{}, leave empty for {}).\r\n",
                Speed::MIN_DELAY_MS,
                Speed::MAX_DELAY_MS,
                self.default_delay_ms
            )
            .with(Color::Blue),
        ))?;

        let default = self.default_delay_ms;
        let delay = match App::prompt_with_validation(stdout, "Delay (ms): ", |s| {
            App::validate_delay(s, default)
        })? {
            Some(d) => d,
            None => return Ok(None),
        };
        stdout.execute(style::PrintStyledContent(
            format!("Delay set to {}ms\r\n", delay)
                .with(Color::Green)
                .attribute(Attribute::Bold),
        ))?;
        Ok(Some(delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_maze_size_fits_walls() {
        // 2n + 1 tiles for n cells
        assert_eq!(App::get_max_maze_size(80, Tile::WIDTH), 19);
        assert_eq!(App::get_max_maze_size(24, 1), 11);
        assert_eq!(App::get_max_maze_size(0, 1), 1);
        assert_eq!(App::get_max_maze_size(u16::MAX, 1), u8::MAX);
    }

    #[test]
    fn test_validate_dimension() {
        assert_eq!(App::validate_dimension("", 20), Ok(20));
        assert_eq!(App::validate_dimension(" 7 ", 20), Ok(7));
        assert_eq!(App::validate_dimension("20", 20), Ok(20));
        assert!(App::validate_dimension("21", 20).is_err());
        assert!(App::validate_dimension("0", 20).is_err());
        assert!(App::validate_dimension("-3", 20).is_err());
        assert!(App::validate_dimension("abc", 20).is_err());
    }

    #[test]
    fn test_validate_delay() {
        assert_eq!(App::validate_delay("", 50), Ok(50));
        assert_eq!(App::validate_delay("5", 50), Ok(5));
        assert_eq!(App::validate_delay("500", 50), Ok(500));
        assert!(App::validate_delay("4", 50).is_err());
        assert!(App::validate_delay("501", 50).is_err());
        assert!(App::validate_delay("fast", 50).is_err());
    }

    #[test]
    fn test_speed_keys_are_clamped_one_at_a_time() {
        let mut speed = Speed::new(Speed::MIN_DELAY_MS);
        assert_eq!(apply_speed_keys(&mut speed, &[KeyCode::Up, KeyCode::Down]), 5);
        assert_eq!(speed.delay_ms(), 10);

        let mut speed = Speed::new(Speed::MAX_DELAY_MS);
        assert_eq!(apply_speed_keys(&mut speed, &[KeyCode::Down, KeyCode::Up]), -5);
        assert_eq!(speed.delay_ms(), 495);

        let mut speed = Speed::default();
        assert_eq!(apply_speed_keys(&mut speed, &[]), 0);
        assert_eq!(
            apply_speed_keys(&mut speed, &[KeyCode::Up, KeyCode::Up, KeyCode::Char('x')]),
            -10
        );
        assert_eq!(speed.delay_ms(), 40);
    }

    #[test]
    fn test_speed_delta_matches_solver_side_adjustment() {
        // The solver adds the returned delta to its own speed in one go
        let mut host_speed = Speed::new(Speed::MIN_DELAY_MS);
        let mut solver_speed = host_speed;
        let delta = apply_speed_keys(&mut host_speed, &[KeyCode::Up, KeyCode::Down]);
        solver_speed.adjust(delta);
        assert_eq!(solver_speed, host_speed);
    }

    #[test]
    fn test_profile_runs_headless() {
        let app = App::default();
        assert!(app.profile(6, 4, 3).is_ok());
    }
}
