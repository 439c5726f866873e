//! Tariff simulator entry point: CLI wiring and report output.

use std::fs;
use std::process;

use tracing::{error, info};

use tariff_sim::cli::{self, CliArgs, Command};
use tariff_sim::config::RunConfig;
use tariff_sim::io::export::{export_cash_flow_csv, export_profile_csv};
use tariff_sim::logging::{LoggingConfig, init_logging};
use tariff_sim::runner;

fn load_config(cli: &CliArgs) -> RunConfig {
    // --scenario takes priority, then --preset, then baseline default
    let loaded = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => RunConfig::from_toml_file(path),
        (None, Some(name)) => RunConfig::from_preset(name),
        (None, None) => Ok(RunConfig::baseline()),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed {
        config.monte_carlo.seed = seed;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

#[cfg(feature = "api")]
fn run_server(args: &CliArgs) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use tariff_sim::api::{AppState, serve};
    use tariff_sim::cli::DEFAULT_PORT;

    let port = args.port.unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(serve(Arc::new(AppState::default()), addr)) {
        eprintln!("error: API server failed: {e}");
        process::exit(1);
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match cli::parse_args_from(&args) {
        Ok(Command::Run(cli)) => cli,
        Ok(Command::Help) => {
            cli::print_help();
            return;
        }
        Err(message) => {
            eprintln!("error: {message}");
            cli::print_help();
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&LoggingConfig::from_env()) {
        eprintln!("warning: logging disabled: {e}");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        run_server(&cli);
        return;
    }

    let config = load_config(&cli);

    let mut sources = Vec::with_capacity(cli.prices.len());
    for path in &cli.prices {
        match fs::read_to_string(path) {
            Ok(text) => sources.push(text),
            Err(e) => {
                eprintln!("error: cannot read \"{}\": {e}", path.display());
                process::exit(1);
            }
        }
    }
    let refs: Vec<&str> = sources.iter().map(String::as_str).collect();

    let report = match runner::run(&config, &refs) {
        Ok(report) => report,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "run failed");
            eprintln!("{}", e.user_message());
            eprintln!("{}", e.recovery_hint());
            process::exit(1);
        }
    };

    println!("{report}");

    if let Some(path) = &cli.profile_out {
        if let Err(e) = export_profile_csv(&report.profile, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "consumption profile written");
    }

    if let Some(path) = &cli.cashflow_out {
        let Some(battery) = &report.battery else {
            eprintln!("error: --cashflow-out needs an enabled [battery] section");
            process::exit(1);
        };
        if let Err(e) = export_cash_flow_csv(battery, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "battery cash flows written");
    }
}
