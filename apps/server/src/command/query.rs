use super::{Command, open_service};
use crate::config::Config;
use crate::error::Result;
use color_eyre::eyre::eyre;
use geo_search::rpc_compat;
use rpc::search::NearbyRequest;

/// One-shot search against the snapshot, without a running server.
pub struct QueryCommand {
    config: Config,
    request: NearbyRequest,
}

impl QueryCommand {
    pub fn new(config: Config, request: NearbyRequest) -> Self {
        Self { config, request }
    }
}

#[async_trait::async_trait]
impl Command for QueryCommand {
    async fn execute(&self) -> Result<()> {
        let service = open_service(&self.config)?;
        let page = rpc_compat::handle_search(&service, &self.request).map_err(|e| eyre!(e))?;
        println!("{}", serde_json::to_string_pretty(&page)?);
        Ok(())
    }
}
