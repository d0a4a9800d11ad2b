use dfs_maze::{app::App, logging};

fn main() -> std::io::Result<()> {
    let _guard = logging::init_file_logging();

    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let result = App::default().run(&mut stdout);
    App::restore_terminal(&mut stdout)?;

    if let Err(e) = &result {
        tracing::error!("[main] App exited with error: {}", e);
    }
    result
}
