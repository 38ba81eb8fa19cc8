mod cli;
mod input;
mod render;

use std::sync::Arc;

use clap::Parser;
use client::config::Config;
use client::{
    LocalBackend, LocationProvider, ManualLocationSource, RpcBackend, SearchBackend, coordinator,
};
use color_eyre::eyre::WrapErr;
use geo_search::{Origin, SearchConfig};
use input::Input;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_backend(cli: &cli::Cli, cfg: &Config) -> color_eyre::Result<Arc<dyn SearchBackend>> {
    if let Some(dataset) = &cli.dataset {
        let service = geo_search::open_snapshot(dataset, SearchConfig::default())
            .wrap_err_with(|| format!("Failed to open {dataset:?}"))?;
        return Ok(Arc::new(LocalBackend::new(Arc::new(service))));
    }

    let backend = RpcBackend::connect(&cfg.socket_path()).await?;
    backend.ping().await?;
    Ok(Arc::new(backend))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let cfg = Config::load().context("Load configuration error")?;

    let start = match (cli.lat, cli.lng) {
        (Some(lat), Some(lng)) => Some(Origin::try_new(lat, lng)?),
        _ => cfg.home,
    };
    if start.is_none() {
        println!("No start position, use :at <lat> <lng>");
    }

    let backend = open_backend(&cli, &cfg).await?;
    let limits = backend.limits().await?;
    let coordinator = coordinator::spawn(backend, cfg.coordinator.clone().fit_to(limits));

    let source = Arc::new(ManualLocationSource::authorized_at(start));
    let provider = LocationProvider::spawn(source.clone(), coordinator.clone());

    let mut snapshots = coordinator.subscribe();
    let printer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            print!("{}", render::render(&snapshot));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match input::parse(line.trim_end()) {
            Ok(Input::Text(text)) => coordinator.free_text_input(text),
            Ok(Input::More) => coordinator.load_more(),
            Ok(Input::Refresh) => {
                if coordinator.snapshot().origin.is_none() {
                    provider.retry().await;
                }
                coordinator.refresh();
            }
            Ok(Input::Category(category)) => coordinator.set_category(category),
            Ok(Input::Radius(radius_m)) => coordinator.set_radius(radius_m),
            Ok(Input::At(origin)) => source.move_to(origin),
            Ok(Input::Quit) => break,
            Err(message) => eprintln!("{message}"),
        }
    }

    printer.abort();
    Ok(())
}
