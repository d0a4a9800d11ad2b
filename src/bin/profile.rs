use dfs_maze::{app::App, logging};

/// Parses an optional positional argument, falling back to `default` when it is missing.
fn parse_arg<T: std::str::FromStr>(
    arg: Option<String>,
    name: &str,
    default: T,
) -> Result<T, String> {
    match arg {
        None => Ok(default),
        Some(s) => s
            .parse::<T>()
            .map_err(|_| format!("Invalid {}: {:?}", name, s)),
    }
}

/// Maze dimensions must be between 1 and 255.
fn parse_dimension(arg: Option<String>, name: &str) -> Result<u8, String> {
    match parse_arg(arg, name, u8::MAX)? {
        0 => Err(format!("Invalid {}: must be between 1 and {}", name, u8::MAX)),
        n => Ok(n),
    }
}

fn main() -> std::io::Result<()> {
    let _guard = logging::init_file_logging();
    let app = App::default();

    let mut args = std::env::args();
    args.next(); // Skip executable name
    let parsed = parse_dimension(args.next(), "columns").and_then(|cols| {
        let rows = parse_dimension(args.next(), "rows")?;
        let num_iters = parse_arg(args.next(), "iterations", 100usize)?;
        Ok((cols, rows, num_iters))
    });
    let (cols, rows, num_iters) = match parsed {
        Ok(values) => values,
        Err(msg) => {
            eprintln!("{}. Usage: profile [columns 1-255] [rows 1-255] [iterations]", msg);
            return Ok(());
        }
    };
    app.profile(cols, rows, num_iters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension(None, "rows"), Ok(u8::MAX));
        assert_eq!(parse_dimension(Some("12".to_string()), "rows"), Ok(12));
        assert!(parse_dimension(Some("300".to_string()), "rows").is_err());
        assert!(parse_dimension(Some("0".to_string()), "rows").is_err());
        assert!(parse_dimension(Some("wide".to_string()), "columns").is_err());
    }

    #[test]
    fn test_parse_iterations() {
        assert_eq!(parse_arg(None, "iterations", 100usize), Ok(100));
        assert_eq!(parse_arg(Some("7".to_string()), "iterations", 100usize), Ok(7));
        assert!(parse_arg(Some("-1".to_string()), "iterations", 100usize).is_err());
    }
}
