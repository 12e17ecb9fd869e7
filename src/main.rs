//! Study entry point — CLI wiring, tracing setup, and command dispatch.

use std::path::PathBuf;
use std::process;

use tracing::error;
use tracing_subscriber::EnvFilter;

use wind_curtail::cli::{self, CliOptions, Command};
use wind_curtail::config::StudyConfig;
use wind_curtail::error::Result;
use wind_curtail::runner::{RunOutcome, StudyRunner};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

fn load_config(cli: &CliOptions) -> StudyConfig {
    let config = if let Some(ref path) = cli.config {
        match StudyConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match StudyConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        StudyConfig::full_season()
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

fn report_sweep(what: &str, outcome: RunOutcome) {
    println!(
        "{what}: {} farm-years processed, {} skipped",
        outcome.succeeded, outcome.failed
    );
    if outcome.succeeded == 0 {
        process::exit(1);
    }
}

fn run_command(runner: &StudyRunner, command: Command) -> Result<()> {
    match command {
        Command::Model { turbine, year, all } => {
            if all {
                report_sweep("model", runner.model_all());
            } else {
                let selector = turbine.expect("CLI guarantees a turbine selector");
                let record = runner.resolve_turbine(&selector)?;
                for year in selected_years(runner, year) {
                    let path = runner.model_turbine_year(record, year)?;
                    println!("Model output written to {}", path.display());
                }
            }
        }
        Command::Backcast { turbine, year, all } => {
            if all {
                report_sweep("backcast", runner.backcast_all());
            } else {
                let selector = turbine.expect("CLI guarantees a turbine selector");
                let record = runner.resolve_turbine(&selector)?;
                for year in selected_years(runner, year) {
                    let path = runner.backcast_turbine_year(record, year)?;
                    println!("Back-cast written to {}", path.display());
                }
            }
        }
        Command::Losses { fleet } => {
            for table in runner.summarize_losses(fleet)? {
                println!("{table}");
            }
        }
        Command::Metrics => {
            for (year, metrics) in runner.annual_metrics()? {
                println!("{year}: {metrics}");
            }
        }
        Command::SpeedDist => {
            for (asset, distance, rmse) in runner.speed_distribution_study()? {
                println!("{asset}: {distance:.1} km, distribution RMSE {rmse:.4}");
            }
        }
        Command::Boxplots { full_dir, peak_dir } => {
            let full = full_dir.unwrap_or_else(|| scenario_dir(runner, "full_season"));
            let peak = peak_dir.unwrap_or_else(|| scenario_dir(runner, "peak_season"));
            runner.boxplot_study(&full, &peak)?;
            println!(
                "Box-plot study written to {}",
                runner.config().directories.result.display()
            );
        }
        Command::Monthly => {
            for totals in runner.monthly_comparison()? {
                println!("{totals}\n");
            }
        }
        Command::Scenarios {
            full_summary,
            peak_summary,
        } => {
            let full = full_summary
                .unwrap_or_else(|| scenario_dir(runner, "full_season").join("summary_fleet.csv"));
            let peak = peak_summary
                .unwrap_or_else(|| scenario_dir(runner, "peak_season").join("summary_fleet.csv"));
            runner.scenario_comparison(&full, &peak)?;
            println!(
                "Scenario comparison written to {}",
                runner.config().directories.result.display()
            );
        }
    }
    Ok(())
}

fn selected_years(runner: &StudyRunner, year: Option<i32>) -> Vec<i32> {
    match year {
        Some(y) => vec![y],
        None => runner.config().study.years.clone(),
    }
}

fn scenario_dir(runner: &StudyRunner, scenario: &str) -> PathBuf {
    runner.config().directories.result.join(scenario)
}

fn main() {
    init_tracing();

    let cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    let config = load_config(&cli);
    let runner = match StudyRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            error!("cannot load turbine metadata: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(&runner, cli.command) {
        error!("{e}");
        process::exit(1);
    }
}
