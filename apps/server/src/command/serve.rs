use super::{Command, open_service};
use crate::config::Config;
use crate::error::Result;
use futures::{future, prelude::*};
use std::fs;
use std::sync::Arc;
use tracing::info;

use geo_search::{GeoSearchService, rpc_compat};
use rpc::{
    Nearby,
    search::{ListingsPage, NearbyRequest, SearchErrorKind, SearchLimits},
};
use tarpc::{
    context::Context,
    server::{self, Channel},
    tokio_serde::formats::Bincode,
};

async fn spawn(fut: impl Future<Output = ()> + Send + 'static) {
    tokio::spawn(fut);
}

#[derive(Clone)]
pub(crate) struct Server {
    service: Arc<GeoSearchService>,
}

impl Nearby for Server {
    async fn ping(self, _c: Context) -> String {
        "Pong".to_string()
    }

    async fn limits(self, _c: Context) -> SearchLimits {
        rpc_compat::to_limits(self.service.config())
    }

    async fn search_nearby(
        self,
        _c: Context,
        req: NearbyRequest,
    ) -> std::result::Result<ListingsPage, SearchErrorKind> {
        info!(
            "search_nearby at ({:?}, {:?}) radius={:?} offset={:?}",
            req.lat, req.lng, req.radius, req.offset
        );
        let service = self.service.clone();
        // Scans can touch many regions for large radii, keep them off the reactor.
        tokio::task::spawn_blocking(move || rpc_compat::handle_search(&service, &req))
            .await
            .unwrap_or_else(|e| Err(SearchErrorKind::Unavailable(e.to_string())))
    }
}

pub struct ServeCommand {
    config: Config,
}

impl ServeCommand {
    pub fn new(cfg: Config) -> Self {
        Self { config: cfg }
    }
}

#[async_trait::async_trait]
impl Command for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let unix_socket_path = config::socket_path(&self.config.runtime_dir);

        if let Some(parent) = unix_socket_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if unix_socket_path.exists() {
            fs::remove_file(&unix_socket_path)?;
        }

        info!("Loading listings from {:?}", self.config.dataset_path);
        let service = Arc::new(open_service(&self.config)?);
        info!("Listening on {:?}", unix_socket_path);

        let mut listener =
            tarpc::serde_transport::unix::listen(&unix_socket_path, Bincode::default).await?;
        listener.config_mut().max_frame_length(usize::MAX);

        let server = Server { service };

        listener
            .filter_map(|r| future::ready(r.ok()))
            .map(server::BaseChannel::with_defaults)
            .map(|channel| {
                let server = server.clone();
                channel.execute(server.serve()).for_each(spawn)
            })
            .buffer_unordered(10)
            .for_each(|_| async {})
            .await;

        Ok(())
    }
}
