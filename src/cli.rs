//! Command-line argument parsing for the `tariff-sim` binary.

use std::path::PathBuf;

/// Default API port.
#[cfg(feature = "api")]
pub const DEFAULT_PORT: u16 = 3000;

/// Parsed CLI arguments.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    /// Price CSV files, merged in the order given.
    pub prices: Vec<PathBuf>,
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub profile_out: Option<PathBuf>,
    pub cashflow_out: Option<PathBuf>,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: Option<u16>,
}

/// What the binary should do.
#[derive(Debug, PartialEq)]
pub enum Command {
    Run(CliArgs),
    Help,
}

pub fn print_help() {
    eprintln!("tariff-sim: fixed vs dynamic electricity contracts and home battery payback");
    eprintln!();
    eprintln!("Usage: tariff-sim --prices <path> [--prices <path> ...] [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --prices <path>          Hourly price CSV (repeatable, later files win)");
    eprintln!("  --scenario <path>        Load run configuration from TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, all_electric, solar_battery)");
    eprintln!("  --seed <u64>             Override Monte Carlo seed");
    eprintln!("  --profile-out <path>     Export the hourly consumption profile to CSV");
    eprintln!("  --cashflow-out <path>    Export battery cash flows to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start the REST API server instead of a run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

/// Parses arguments (without the program name).
///
/// # Errors
///
/// Returns a message for unknown flags, missing or malformed values and
/// conflicting options.
pub fn parse_args_from(args: &[String]) -> Result<Command, String> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |what: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{arg} requires a {what} argument"))
        };
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--prices" => cli.prices.push(PathBuf::from(value("path")?)),
            "--scenario" => {
                if cli.scenario.replace(PathBuf::from(value("path")?)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                if cli.preset.replace(value("name")?).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                let raw = value("u64")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                cli.seed = Some(seed);
            }
            "--profile-out" => cli.profile_out = Some(PathBuf::from(value("path")?)),
            "--cashflow-out" => cli.cashflow_out = Some(PathBuf::from(value("path")?)),
            #[cfg(feature = "api")]
            "--serve" => cli.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                let raw = value("u16")?;
                let port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                cli.port = Some(port);
            }
            other => return Err(format!("unknown argument \"{other}\"")),
        }
    }

    if cli.scenario.is_some() && cli.preset.is_some() {
        return Err("--scenario and --preset are mutually exclusive; choose one".to_string());
    }
    #[cfg(feature = "api")]
    if cli.serve {
        return Ok(Command::Run(cli));
    }
    if cli.prices.is_empty() {
        return Err("at least one --prices <path> is required".to_string());
    }
    Ok(Command::Run(cli))
}
