mod cli;
mod command;
mod config;
mod error;

use error::WrapErr;

use clap::CommandFactory;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> error::Result<()> {
    color_eyre::install()?;
    let command_line = cli::Cli::parse();
    init_tracing(command_line.verbose);

    let mut cfg = config::Config::load().context("Load configuration error")?;
    if let Some(dataset) = command_line.dataset {
        cfg.dataset_path = dataset;
    }

    if let Some(command) = command_line.command {
        let cmd: Box<dyn command::Command> = match command {
            cli::Commands::Serve => Box::new(command::ServeCommand::new(cfg)),
            cli::Commands::Query {
                lat,
                lng,
                radius,
                category,
                search,
                limit,
                offset,
            } => {
                let req = rpc::search::NearbyRequest {
                    lat: Some(lat),
                    lng: Some(lng),
                    radius,
                    category,
                    search,
                    limit,
                    offset,
                };
                Box::new(command::QueryCommand::new(cfg, req))
            }
        };
        cmd.execute().await?;
    } else {
        cli::Cli::command().print_help()?;
    }

    Ok(())
}
