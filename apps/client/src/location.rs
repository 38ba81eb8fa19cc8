//! Location provider.
//!
//! A [`LocationSource`] is the platform seam: it knows the authorization
//! status, can be asked for permission or for a fix, and reports what
//! happens as [`LocationEvent`]s. The [`LocationProvider`] task turns those
//! events into coordinator commands.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geo_search::Origin;
use strum::Display;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, info, warn};

use crate::coordinator::CoordinatorHandle;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Authorization {
    #[default]
    Undetermined,
    Denied,
    Authorized,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location access denied")]
    Denied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    AuthorizationChanged(Authorization),
    Fix(Origin),
    Failed(LocationError),
}

#[async_trait]
pub trait LocationSource: Send + Sync {
    fn authorization(&self) -> Authorization;

    /// Ask the user for permission; the answer arrives as an event.
    async fn request_authorization(&self);

    /// Ask for one fix; it arrives as an event.
    async fn request_fix(&self);

    fn subscribe(&self) -> broadcast::Receiver<LocationEvent>;
}

/// A fixed position, always authorized.
pub struct StaticLocationSource {
    position: Origin,
    events: broadcast::Sender<LocationEvent>,
}

impl StaticLocationSource {
    pub fn new(position: Origin) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { position, events }
    }
}

#[async_trait]
impl LocationSource for StaticLocationSource {
    fn authorization(&self) -> Authorization {
        Authorization::Authorized
    }

    async fn request_authorization(&self) {
        let _ = self
            .events
            .send(LocationEvent::AuthorizationChanged(Authorization::Authorized));
    }

    async fn request_fix(&self) {
        let _ = self.events.send(LocationEvent::Fix(self.position));
    }

    fn subscribe(&self) -> broadcast::Receiver<LocationEvent> {
        self.events.subscribe()
    }
}

#[derive(Debug, Default)]
struct ManualState {
    authorization: Authorization,
    position: Option<Origin>,
    authorization_requests: usize,
}

/// Driven by hand: the caller decides the authorization and moves the
/// position around.
pub struct ManualLocationSource {
    state: Mutex<ManualState>,
    events: broadcast::Sender<LocationEvent>,
}

impl Default for ManualLocationSource {
    fn default() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(ManualState::default()),
            events,
        }
    }
}

impl ManualLocationSource {
    pub fn authorized_at(position: Option<Origin>) -> Self {
        let source = Self::default();
        {
            let mut state = source.lock();
            state.authorization = Authorization::Authorized;
            state.position = position;
        }
        source
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_authorization(&self, authorization: Authorization) {
        self.lock().authorization = authorization;
        let _ = self
            .events
            .send(LocationEvent::AuthorizationChanged(authorization));
    }

    /// Move to `position`, reporting a fix when authorized.
    pub fn move_to(&self, position: Origin) {
        let authorized = {
            let mut state = self.lock();
            state.position = Some(position);
            state.authorization == Authorization::Authorized
        };
        if authorized {
            let _ = self.events.send(LocationEvent::Fix(position));
        }
    }

    pub fn fail(&self, err: LocationError) {
        let _ = self.events.send(LocationEvent::Failed(err));
    }

    pub fn authorization_requests(&self) -> usize {
        self.lock().authorization_requests
    }
}

#[async_trait]
impl LocationSource for ManualLocationSource {
    fn authorization(&self) -> Authorization {
        self.lock().authorization
    }

    async fn request_authorization(&self) {
        self.lock().authorization_requests += 1;
    }

    async fn request_fix(&self) {
        let (authorization, position) = {
            let state = self.lock();
            (state.authorization, state.position)
        };
        let event = match (authorization, position) {
            (Authorization::Authorized, Some(position)) => LocationEvent::Fix(position),
            (Authorization::Authorized, None) => {
                LocationEvent::Failed(LocationError::Unavailable("no position set".into()))
            }
            _ => LocationEvent::Failed(LocationError::Denied),
        };
        let _ = self.events.send(event);
    }

    fn subscribe(&self) -> broadcast::Receiver<LocationEvent> {
        self.events.subscribe()
    }
}

/// Forwards a source's events to the coordinator.
pub struct LocationProvider {
    source: Arc<dyn LocationSource>,
    status: watch::Receiver<Authorization>,
    task: JoinHandle<()>,
}

impl LocationProvider {
    pub fn spawn(source: Arc<dyn LocationSource>, coordinator: CoordinatorHandle) -> Self {
        let (status_tx, status) = watch::channel(source.authorization());
        // Subscribe before asking for anything so no answer is missed.
        let events = BroadcastStream::new(source.subscribe());
        let task = tokio::spawn(Self::run(source.clone(), coordinator, status_tx, events));

        Self {
            source,
            status,
            task,
        }
    }

    async fn run(
        source: Arc<dyn LocationSource>,
        coordinator: CoordinatorHandle,
        status_tx: watch::Sender<Authorization>,
        mut events: BroadcastStream<LocationEvent>,
    ) {
        match source.authorization() {
            Authorization::Undetermined => source.request_authorization().await,
            Authorization::Authorized => source.request_fix().await,
            Authorization::Denied => coordinator.location_failed(LocationError::Denied),
        }

        while let Some(event) = events.next().await {
            match event {
                Ok(LocationEvent::AuthorizationChanged(authorization)) => {
                    info!("location authorization: {authorization}");
                    status_tx.send_replace(authorization);
                    match authorization {
                        Authorization::Authorized => source.request_fix().await,
                        Authorization::Denied => {
                            coordinator.location_failed(LocationError::Denied)
                        }
                        Authorization::Undetermined => {}
                    }
                }
                Ok(LocationEvent::Fix(origin)) => {
                    debug!("location fix {origin}");
                    coordinator.location_fix(origin);
                }
                Ok(LocationEvent::Failed(err)) => coordinator.location_failed(err),
                Err(BroadcastStreamRecvError::Lagged(n)) => {
                    warn!("missed {n} location events");
                }
            }
        }
    }

    pub fn status(&self) -> watch::Receiver<Authorization> {
        self.status.clone()
    }

    /// Ask again after a denial or a failed fix.
    pub async fn retry(&self) {
        match self.source.authorization() {
            Authorization::Authorized => self.source.request_fix().await,
            Authorization::Undetermined | Authorization::Denied => {
                self.source.request_authorization().await
            }
        }
    }
}

impl Drop for LocationProvider {
    fn drop(&mut self) {
        self.task.abort();
    }
}
