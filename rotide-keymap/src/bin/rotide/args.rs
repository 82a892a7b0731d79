//! Command-line argument parsing.

use std::path::PathBuf;

/// Options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Configuration file given with `--config`, overriding the default lookup.
    pub config: Option<PathBuf>,
    /// Log file given with `--log`, overriding `[logging] log_file`.
    pub log: Option<PathBuf>,
}

/// Parse command-line arguments.
pub fn parse_args() -> Args {
    parse(std::env::args().skip(1))
}

fn parse(args: impl IntoIterator<Item = String>) -> Args {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if let Some(path) = arg.strip_prefix("--config=") {
            parsed.config = Some(PathBuf::from(path));
        } else if let Some(path) = arg.strip_prefix("--log=") {
            parsed.log = Some(PathBuf::from(path));
        } else if arg == "--config" || arg == "-c" || arg == "--log" {
            let Some(path) = args.next() else {
                eprintln!("Warning: {arg} needs a path");
                continue;
            };
            if arg == "--log" {
                parsed.log = Some(PathBuf::from(path));
            } else {
                parsed.config = Some(PathBuf::from(path));
            }
        } else {
            eprintln!("Warning: ignoring unknown argument: {arg}");
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| (*arg).to_string()).collect()
    }

    #[test]
    fn no_arguments_uses_default_config() {
        assert!(parse(Vec::new()).config.is_none());
    }

    #[test]
    fn config_flag_takes_next_argument() {
        let args = parse(strings(&["--config", "/tmp/rotide.toml"]));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/rotide.toml")));
    }

    #[test]
    fn config_flag_accepts_equals_form() {
        let args = parse(strings(&["--config=/tmp/rotide.toml"]));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/rotide.toml")));
    }

    #[test]
    fn dangling_config_flag_is_ignored() {
        assert!(parse(strings(&["-c"])).config.is_none());
    }

    #[test]
    fn log_flag_sets_log_file_alongside_config() {
        let args = parse(strings(&["-c", "rotide.toml", "--log", "/tmp/keys.log"]));
        assert_eq!(args.config, Some(PathBuf::from("rotide.toml")));
        assert_eq!(args.log, Some(PathBuf::from("/tmp/keys.log")));

        let args = parse(strings(&["--log=/tmp/other.log"]));
        assert_eq!(args.log, Some(PathBuf::from("/tmp/other.log")));
        assert!(args.config.is_none());
    }
}
