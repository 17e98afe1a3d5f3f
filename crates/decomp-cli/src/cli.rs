use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "elecdecomp - Per-frame electrostatic energy decomposition of a single residue across a trajectory of snapshots.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Residue name of the residue to decompose (e.g., LIG).
    #[arg(value_name = "RESIDUE_NAME")]
    pub residue_name: String,

    /// Residue number of the residue to decompose (e.g., 301).
    #[arg(value_name = "RESIDUE_NUMBER", allow_negative_numbers = true)]
    pub residue_number: isize,

    /// Path to a configuration file in TOML format.
    /// Defaults to ./elecdecomp.toml when present, otherwise built-in defaults.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory receiving the energy logs, run log, energy table and summary.
    #[arg(short, long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Kill any collaborator running longer than this many seconds.
    /// Applies to every command without its own `timeout-secs`.
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Run the three variant solves of a frame concurrently.
    #[arg(long)]
    pub parallel_variants: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S solver.program=/opt/apbs/bin/apbs
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_positional_residue_and_options() {
        let cli = Cli::try_parse_from([
            "elecdecomp",
            "LIG",
            "301",
            "-o",
            "results",
            "--timeout",
            "120",
            "-S",
            "solver.program=apbs",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.residue_name, "LIG");
        assert_eq!(cli.residue_number, 301);
        assert_eq!(cli.output_dir, Some(PathBuf::from("results")));
        assert_eq!(cli.timeout, Some(120));
        assert_eq!(cli.set_values, vec!["solver.program=apbs"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.parallel_variants);
    }

    #[test]
    fn accepts_negative_residue_number() {
        let cli = Cli::try_parse_from(["elecdecomp", "HOH", "-5"]).unwrap();
        assert_eq!(cli.residue_number, -5);
    }

    #[test]
    fn missing_positional_is_a_usage_error() {
        let err = Cli::try_parse_from(["elecdecomp", "LIG"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn extra_positional_is_a_usage_error() {
        let err = Cli::try_parse_from(["elecdecomp", "LIG", "301", "extra"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn unparsable_residue_number_is_a_usage_error() {
        let err = Cli::try_parse_from(["elecdecomp", "LIG", "three"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn help_is_not_an_error_exit() {
        let err = Cli::try_parse_from(["elecdecomp", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }
}
