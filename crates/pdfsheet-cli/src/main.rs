mod cli;
mod config;
mod error;
mod error_log;
mod extract;
mod merge_cmd;
mod output;
mod pipeline;
mod tables_cmd;
#[cfg(test)]
mod test_pdf;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Merge(ref args) => merge_cmd::run(args),
        cli::Commands::Tables {
            ref file,
            ref strategy,
            ref format,
            ref config,
        } => tables_cmd::run(file, strategy, format, config.as_deref()),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
