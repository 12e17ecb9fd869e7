//! Hand-rolled CLI parsing: one subcommand per study operation.

use std::path::PathBuf;

/// Parsed command line.
#[derive(Debug)]
pub struct CliOptions {
    /// Study operation to run.
    pub command: Command,
    /// Explicit TOML configuration path.
    pub config: Option<PathBuf>,
    /// Built-in preset name.
    pub preset: Option<String>,
}

/// Study operations.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Forward model: theoretical output with curtailment columns.
    Model {
        turbine: Option<String>,
        year: Option<i32>,
        all: bool,
    },
    /// Back-calculate wind speeds from actual generation.
    Backcast {
        turbine: Option<String>,
        year: Option<i32>,
        all: bool,
    },
    /// Per-farm-year loss summaries and charts; `--fleet` adds the
    /// fleet-wide summary.
    Losses { fleet: bool },
    /// Annual RMSE/MAPE of modeled vs. actual energy.
    Metrics,
    /// Mid-summer wind-speed distribution study.
    SpeedDist,
    /// Seasonal box-plot study over two scenario result directories.
    Boxplots {
        full_dir: Option<PathBuf>,
        peak_dir: Option<PathBuf>,
    },
    /// Monthly modeled-vs-actual comparison.
    Monthly,
    /// Scenario comparison over two fleet summaries.
    Scenarios {
        full_summary: Option<PathBuf>,
        peak_summary: Option<PathBuf>,
    },
}

pub fn print_usage() {
    eprintln!("wind-curtail — wind-energy curtailment study toolkit");
    eprintln!();
    eprintln!("Usage: wind-curtail <COMMAND> [OPTIONS]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  model       Model theoretical output with curtailment columns");
    eprintln!("  backcast    Back-calculate wind speeds from actual generation");
    eprintln!("  losses      Build loss summary tables and charts");
    eprintln!("  metrics     Annual RMSE/MAPE of modeled vs. actual energy");
    eprintln!("  speed-dist  Mid-summer wind-speed distribution study");
    eprintln!("  boxplots    Seasonal box-plot study across scenarios");
    eprintln!("  monthly     Monthly modeled-vs-actual comparison");
    eprintln!("  scenarios   Compare full-season and peak-season fleet summaries");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>        Load configuration from a TOML file");
    eprintln!("  --preset <name>        Use a built-in preset (full_season, peak_season)");
    eprintln!("  --turbine <sel>        Farm to process: metadata index or asset name");
    eprintln!("  --year <year>          Year to process (model/backcast)");
    eprintln!("  --all                  Process every farm and study year");
    eprintln!("  --fleet                Also build the fleet-wide summary (losses)");
    eprintln!("  --full-dir <path>      Full-season result directory (boxplots)");
    eprintln!("  --peak-dir <path>      Peak-season result directory (boxplots)");
    eprintln!("  --full-summary <path>  Full-season fleet summary CSV (scenarios)");
    eprintln!("  --peak-summary <path>  Peak-season fleet summary CSV (scenarios)");
    eprintln!("  --help                 Show this help message");
}

/// Parses process arguments (without the program name).
///
/// # Errors
///
/// Returns a human-readable message for unknown commands, unknown or
/// repeated options, and missing option values.
pub fn parse_args() -> Result<CliOptions, String> {
    parse_args_from(std::env::args().skip(1).collect())
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        print_usage();
        std::process::exit(if args.is_empty() { 1 } else { 0 });
    }

    let command_name = args[0].clone();
    let mut config = None;
    let mut preset = None;
    let mut turbine: Option<String> = None;
    let mut year: Option<i32> = None;
    let mut all = false;
    let mut fleet = false;
    let mut full_dir: Option<PathBuf> = None;
    let mut peak_dir: Option<PathBuf> = None;
    let mut full_summary: Option<PathBuf> = None;
    let mut peak_summary: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--config" => {
                i += 1;
                let path = value_at(&args, i, "--config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = value_at(&args, i, "--preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--turbine" => {
                i += 1;
                let sel = value_at(&args, i, "--turbine (expected an index or asset name)")?;
                if turbine.replace(sel.to_string()).is_some() {
                    return Err("--turbine provided more than once".to_string());
                }
            }
            "--year" => {
                i += 1;
                let raw = value_at(&args, i, "--year (expected a calendar year)")?;
                let parsed: i32 = raw
                    .parse()
                    .map_err(|_| format!("--year value \"{raw}\" is not a valid year"))?;
                if year.replace(parsed).is_some() {
                    return Err("--year provided more than once".to_string());
                }
            }
            "--all" => all = true,
            "--fleet" => fleet = true,
            "--full-dir" => {
                i += 1;
                let path = value_at(&args, i, "--full-dir (expected a directory path)")?;
                full_dir = Some(PathBuf::from(path));
            }
            "--peak-dir" => {
                i += 1;
                let path = value_at(&args, i, "--peak-dir (expected a directory path)")?;
                peak_dir = Some(PathBuf::from(path));
            }
            "--full-summary" => {
                i += 1;
                let path = value_at(&args, i, "--full-summary (expected a CSV path)")?;
                full_summary = Some(PathBuf::from(path));
            }
            "--peak-summary" => {
                i += 1;
                let path = value_at(&args, i, "--peak-summary (expected a CSV path)")?;
                peak_summary = Some(PathBuf::from(path));
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    let command = match command_name.as_str() {
        "model" => Command::Model { turbine, year, all },
        "backcast" => Command::Backcast { turbine, year, all },
        "losses" => Command::Losses { fleet },
        "metrics" => Command::Metrics,
        "speed-dist" => Command::SpeedDist,
        "boxplots" => Command::Boxplots { full_dir, peak_dir },
        "monthly" => Command::Monthly,
        "scenarios" => Command::Scenarios {
            full_summary,
            peak_summary,
        },
        other => return Err(format!("unknown command: {other}")),
    };

    match &command {
        Command::Model { turbine, all, .. } | Command::Backcast { turbine, all, .. } => {
            if turbine.is_none() && !all {
                return Err(format!(
                    "`{command_name}` needs --turbine <sel> (optionally --year) or --all"
                ));
            }
            if turbine.is_some() && *all {
                return Err("--turbine and --all are mutually exclusive".to_string());
            }
        }
        _ => {}
    }

    Ok(CliOptions {
        command,
        config,
        preset,
    })
}

fn value_at<'a>(args: &'a [String], index: usize, what: &str) -> Result<&'a str, String> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {what}"))
}

#[cfg(test)]
mod tests {
    use super::{Command, parse_args_from};

    #[test]
    fn model_with_turbine_and_year() {
        let opts = parse_args_from(
            ["model", "--turbine", "Castle River 1", "--year", "2021"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        )
        .expect("parse should succeed");
        assert_eq!(
            opts.command,
            Command::Model {
                turbine: Some("Castle River 1".to_string()),
                year: Some(2021),
                all: false
            }
        );
    }

    #[test]
    fn model_all_sweep() {
        let opts = parse_args_from(
            ["model", "--all"].iter().map(ToString::to_string).collect(),
        )
        .expect("parse should succeed");
        assert_eq!(
            opts.command,
            Command::Model {
                turbine: None,
                year: None,
                all: true
            }
        );
    }

    #[test]
    fn model_without_selection_is_rejected() {
        let err = parse_args_from(vec!["model".to_string()]).expect_err("must fail");
        assert!(err.contains("--turbine"));
    }

    #[test]
    fn turbine_and_all_conflict() {
        let err = parse_args_from(
            ["model", "--turbine", "0", "--all"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        )
        .expect_err("must fail");
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn config_and_preset_conflict() {
        let err = parse_args_from(
            ["losses", "--config", "study.toml", "--preset", "peak_season"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        )
        .expect_err("must fail");
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn losses_fleet_flag() {
        let opts = parse_args_from(
            ["losses", "--fleet"].iter().map(ToString::to_string).collect(),
        )
        .expect("parse should succeed");
        assert_eq!(opts.command, Command::Losses { fleet: true });
    }

    #[test]
    fn bad_year_is_rejected() {
        let err = parse_args_from(
            ["model", "--turbine", "0", "--year", "twenty"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        )
        .expect_err("must fail");
        assert!(err.contains("--year"));
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = parse_args_from(vec!["frobnicate".to_string()]).expect_err("must fail");
        assert!(err.contains("unknown command"));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = parse_args_from(
            ["metrics", "--bogus"].iter().map(ToString::to_string).collect(),
        )
        .expect_err("must fail");
        assert!(err.contains("unknown argument"));
    }
}
