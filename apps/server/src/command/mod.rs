pub mod query;
pub mod serve;

use crate::config::Config;
use crate::error::{Result, WrapErr};
use geo_search::GeoSearchService;

pub use query::QueryCommand;
pub use serve::ServeCommand;

#[async_trait::async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Load the configured snapshot into a search service.
pub(crate) fn open_service(config: &Config) -> Result<GeoSearchService> {
    geo_search::open_snapshot(&config.dataset_path, config.search.clone())
        .wrap_err_with(|| format!("Failed to open listing snapshot {:?}", config.dataset_path))
}
