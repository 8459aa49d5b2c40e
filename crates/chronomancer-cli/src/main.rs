use clap::Parser;
use chronomancer_core::CoreError;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod store;
mod views;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("CHRONOMANCER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let config = config::Config::new().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load configuration, using defaults");
        config::Config::default()
    });
    let store = store::SequenceFile::new(&cli.file);

    let result = match cli.command {
        cli::Commands::New(command) => commands::new::new_sequence(&store, command),
        cli::Commands::Preview(command) => {
            commands::preview::preview_sequence(&store, command, &config)
        }
        cli::Commands::Pause(command) => commands::pause::pause_sequence(&store, command),
        cli::Commands::Reconfigure(command) => {
            commands::reconfigure::reconfigure_sequence(&store, command)
        }
        cli::Commands::Check(command) => commands::check::check_date(&store, command, &config),
        cli::Commands::Info => commands::info::sequence_info(&store, &config),
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    match err.chain().find_map(|cause| cause.downcast_ref::<CoreError>()) {
        Some(CoreError::Validation(violations)) => {
            eprintln!("{} Invalid options:", "Error:".style(error_style));
            for violation in violations {
                eprintln!("  - {}", violation.yellow());
            }
        }
        Some(CoreError::InvalidReconfiguration(s)) => {
            eprintln!("{} Cannot reconfigure: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::InvalidDuration(s)) | Some(CoreError::InvalidArgument(s)) => {
            eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::Serialization(e)) => {
            eprintln!("{} {}: {}", "Error:".style(error_style), err, e);
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
