//! Where searches are sent: the server over its unix socket, or an
//! in-process [`GeoSearchService`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use geo_search::{GeoSearchService, rpc_compat};
use rpc::NearbyClient;
use rpc::search::{ListingsPage, NearbyRequest, SearchErrorKind, SearchLimits};
use tarpc::{client, context, tokio_serde::formats::Bincode};
use tracing::info;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("connection error: {0}")]
    Transport(String),
    #[error("no answer after {0:?}")]
    Timeout(Duration),
}

impl BackendError {
    /// Everything except a rejected request may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, BackendError::Invalid(_))
    }
}

impl From<SearchErrorKind> for BackendError {
    fn from(kind: SearchErrorKind) -> Self {
        match kind {
            SearchErrorKind::InvalidArgument(msg) => BackendError::Invalid(msg),
            SearchErrorKind::Unavailable(msg) => BackendError::Unavailable(msg),
        }
    }
}

#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, req: NearbyRequest) -> Result<ListingsPage, BackendError>;

    /// Bounds the other side clamps requests to.
    async fn limits(&self) -> Result<SearchLimits, BackendError> {
        Ok(SearchLimits::default())
    }
}

/// Talks to a running server.
pub struct RpcBackend {
    client: NearbyClient,
}

impl RpcBackend {
    pub async fn connect(unix_socket_path: &Path) -> Result<Self, BackendError> {
        let mut transport =
            tarpc::serde_transport::unix::connect(unix_socket_path, Bincode::default);
        transport.config_mut().max_frame_length(usize::MAX);

        let transport = transport.await.map_err(|e| {
            BackendError::Transport(format!("Could not connect to {unix_socket_path:?}: {e}"))
        })?;

        let client = NearbyClient::new(client::Config::default(), transport).spawn();
        info!("Connected to {:?}", unix_socket_path);

        Ok(Self { client })
    }

    pub async fn ping(&self) -> Result<String, BackendError> {
        self.client
            .ping(context::current())
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))
    }
}

#[async_trait::async_trait]
impl SearchBackend for RpcBackend {
    async fn search(&self, req: NearbyRequest) -> Result<ListingsPage, BackendError> {
        self.client
            .search_nearby(context::current(), req)
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?
            .map_err(BackendError::from)
    }

    async fn limits(&self) -> Result<SearchLimits, BackendError> {
        self.client
            .limits(context::current())
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))
    }
}

/// Runs searches against a snapshot loaded into this process.
pub struct LocalBackend {
    service: Arc<GeoSearchService>,
}

impl LocalBackend {
    pub fn new(service: Arc<GeoSearchService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl SearchBackend for LocalBackend {
    async fn search(&self, req: NearbyRequest) -> Result<ListingsPage, BackendError> {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || rpc_compat::handle_search(&service, &req))
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?
            .map_err(BackendError::from)
    }

    async fn limits(&self) -> Result<SearchLimits, BackendError> {
        Ok(rpc_compat::to_limits(self.service.config()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_search::{InMemoryListingStore, SearchConfig};

    #[test]
    fn test_error_mapping() {
        let invalid: BackendError = SearchErrorKind::InvalidArgument("lat".into()).into();
        assert_eq!(invalid, BackendError::Invalid("lat".into()));
        assert!(!invalid.is_retryable());

        let down: BackendError = SearchErrorKind::Unavailable("store".into()).into();
        assert!(down.is_retryable());
        assert!(BackendError::Timeout(Duration::from_secs(15)).is_retryable());
    }

    #[tokio::test]
    async fn test_local_backend_validates() {
        let service = GeoSearchService::new(
            Arc::new(InMemoryListingStore::default()),
            SearchConfig::default(),
        );
        let backend = LocalBackend::new(Arc::new(service));

        let page = backend.search(NearbyRequest::at(51.1, 71.4)).await.unwrap();
        assert_eq!(page, ListingsPage::default());

        let err = backend.search(NearbyRequest::default()).await.unwrap_err();
        assert!(matches!(err, BackendError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_local_backend_reports_limits() {
        let config = SearchConfig {
            max_limit: 10,
            default_limit: 10,
            ..Default::default()
        };
        let service = GeoSearchService::new(Arc::new(InMemoryListingStore::default()), config);
        let backend = LocalBackend::new(Arc::new(service));

        let limits = backend.limits().await.unwrap();
        assert_eq!(limits.max_limit, 10);
        assert_eq!(limits.min_radius_m, 100);
    }

    #[tokio::test]
    async fn test_rpc_backend_connect_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = RpcBackend::connect(&dir.path().join("missing.sock"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
