use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Browse listings near a position")]
pub struct Cli {
    /// Start position, falls back to `home` from the config file
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    pub lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Search a local listing snapshot instead of the server
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
