//! Query coordinator.
//!
//! A single task owns the search intent (origin, radius, category, text) and
//! the [`ResultStore`]. Everything that wants to change them sends a
//! [`Command`]; backend calls run in their own tasks and report back on the
//! same channel, tagged with the generation they were issued under. A
//! response whose generation is no longer current is dropped without
//! touching any state.

use std::sync::Arc;
use std::time::Duration;

use geo_search::{Category, Origin};
use rpc::search::{ListingHit, ListingsPage, NearbyRequest, SearchLimits};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, SearchBackend};
use crate::constants::*;
use crate::location::LocationError;
use crate::store::{Failure, ResultStore, SearchState};

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    pub debounce: Duration,
    pub page_size: usize,
    pub radius_m: u32,
    pub request_timeout: Duration,
    pub min_movement_m: f64,
    /// Radius bounds and largest page of the backend
    pub limits: SearchLimits,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            page_size: DEFAULT_PAGE_SIZE,
            radius_m: DEFAULT_RADIUS_M,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            min_movement_m: DEFAULT_MIN_MOVEMENT_M,
            limits: SearchLimits::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Shrink the page size and radius to what the backend will apply.
    ///
    /// A page longer than `max_limit` always comes back short, which would
    /// read as the end of the results.
    pub fn fit_to(mut self, limits: SearchLimits) -> Self {
        if self.page_size > limits.max_limit {
            warn!(
                "page size {} exceeds the server maximum, using {}",
                self.page_size, limits.max_limit
            );
            self.page_size = limits.max_limit;
        }
        self.radius_m = limits.clamp_radius(self.radius_m);
        self.limits = limits;
        self
    }
}

/// What the presentation layer sees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSnapshot {
    pub generation: u64,
    pub state: SearchState,
    pub items: Arc<Vec<ListingHit>>,
    pub has_more: bool,
    pub notice: Option<String>,
    pub origin: Option<Origin>,
    pub category: Option<Category>,
    pub radius_m: u32,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Fresh,
    More,
}

#[derive(Debug)]
enum Command {
    LocationFix(Origin),
    LocationFailed(LocationError),
    SetCategory(Option<Category>),
    SetRadius(u32),
    FreeText(String),
    Refresh,
    LoadMore,
    DebounceFired(u64),
    Response {
        generation: u64,
        kind: RequestKind,
        result: Result<ListingsPage, BackendError>,
    },
}

/// Cloneable front of the coordinator task. The task stops once every
/// handle is gone and no request is in flight.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<ResultSnapshot>,
}

impl CoordinatorHandle {
    fn send(&self, cmd: Command) {
        if self.tx.send(cmd).is_err() {
            warn!("coordinator is gone, command dropped");
        }
    }

    pub fn location_fix(&self, origin: Origin) {
        self.send(Command::LocationFix(origin));
    }

    pub fn location_failed(&self, err: LocationError) {
        self.send(Command::LocationFailed(err));
    }

    pub fn set_category(&self, category: Option<Category>) {
        self.send(Command::SetCategory(category));
    }

    pub fn set_radius(&self, radius_m: u32) {
        self.send(Command::SetRadius(radius_m));
    }

    /// Debounced; a burst of calls searches once, with the last text.
    pub fn free_text_input(&self, text: impl Into<String>) {
        self.send(Command::FreeText(text.into()));
    }

    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    pub fn load_more(&self) {
        self.send(Command::LoadMore);
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> ResultSnapshot {
        self.snapshots.borrow().clone()
    }
}

pub fn spawn(backend: Arc<dyn SearchBackend>, config: CoordinatorConfig) -> CoordinatorHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let radius_m = config.limits.clamp_radius(config.radius_m);
    let initial = ResultSnapshot {
        radius_m,
        ..Default::default()
    };
    let (snapshot_tx, snapshots) = watch::channel(initial);

    let coordinator = Coordinator {
        backend,
        config: config.clone(),
        tx: tx.downgrade(),
        snapshot_tx,
        origin: None,
        category: None,
        radius_m,
        text: None,
        pending_text: None,
        generation: 0,
        debounce_ticket: 0,
        debounce_task: None,
        fresh_in_flight: false,
        is_loading_more: false,
        has_succeeded: false,
        store: ResultStore::default(),
    };
    tokio::spawn(coordinator.run(rx));

    CoordinatorHandle { tx, snapshots }
}

struct Coordinator {
    backend: Arc<dyn SearchBackend>,
    config: CoordinatorConfig,
    tx: mpsc::WeakUnboundedSender<Command>,
    snapshot_tx: watch::Sender<ResultSnapshot>,

    origin: Option<Origin>,
    category: Option<Category>,
    radius_m: u32,
    /// Text the current generation searches for
    text: Option<String>,
    /// Typed but not yet searched
    pending_text: Option<String>,

    generation: u64,
    debounce_ticket: u64,
    debounce_task: Option<JoinHandle<()>>,
    fresh_in_flight: bool,
    is_loading_more: bool,
    /// A fresh search has completed at least once
    has_succeeded: bool,

    store: ResultStore,
}

impl Coordinator {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd);
            self.publish();
        }
        self.cancel_debounce();
        debug!("coordinator stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::LocationFix(origin) => self.on_location_fix(origin),
            Command::LocationFailed(err) => {
                info!("location unavailable: {err}");
                self.store
                    .location_failed(Failure::from(&err), self.origin.is_some());
            }
            Command::SetCategory(category) => {
                if category != self.category {
                    self.category = category;
                    self.trigger_fresh_search("category");
                }
            }
            Command::SetRadius(radius_m) => {
                let radius_m = self.config.limits.clamp_radius(radius_m);
                if radius_m != self.radius_m {
                    self.radius_m = radius_m;
                    self.trigger_fresh_search("radius");
                }
            }
            Command::FreeText(text) => self.on_free_text_input(text),
            Command::Refresh => {
                if self.pending_text.is_some() {
                    self.cancel_debounce();
                    self.commit_text();
                }
                self.trigger_fresh_search("refresh");
            }
            Command::LoadMore => self.trigger_load_more(),
            Command::DebounceFired(ticket) => {
                if ticket != self.debounce_ticket || self.pending_text.is_none() {
                    debug!("ignoring superseded debounce #{ticket}");
                    return;
                }
                self.debounce_task = None;
                self.commit_text();
                self.trigger_fresh_search("text");
            }
            Command::Response {
                generation,
                kind,
                result,
            } => self.on_response(generation, kind, result),
        }
    }

    fn on_location_fix(&mut self, origin: Origin) {
        if let Some(current) = self.origin {
            let moved = current.distance_to(&origin);
            if self.has_succeeded && moved < self.config.min_movement_m {
                debug!("ignoring fix {origin}, moved only {moved:.1} m");
                return;
            }
        }
        self.origin = Some(origin);
        self.trigger_fresh_search("location");
    }

    fn on_free_text_input(&mut self, text: String) {
        self.cancel_debounce();
        self.pending_text = Some(text);
        self.debounce_ticket += 1;

        let ticket = self.debounce_ticket;
        let delay = self.config.debounce;
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        self.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Command::DebounceFired(ticket));
        }));
    }

    fn cancel_debounce(&mut self) {
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
    }

    fn commit_text(&mut self) {
        self.text = self
            .pending_text
            .take()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
    }

    fn trigger_fresh_search(&mut self, reason: &'static str) {
        self.generation += 1;
        self.is_loading_more = false;

        if self.origin.is_none() {
            debug!("fresh search ({reason}) waits for a location fix");
            return;
        }

        info!("fresh search #{} ({reason})", self.generation);
        self.fresh_in_flight = true;
        self.store.begin_fresh();
        self.issue(RequestKind::Fresh, 0);
    }

    fn trigger_load_more(&mut self) {
        if self.is_loading_more
            || self.fresh_in_flight
            || self.origin.is_none()
            || !self.store.has_more()
        {
            debug!("load more skipped");
            return;
        }

        self.is_loading_more = true;
        self.store.begin_load_more();
        self.issue(RequestKind::More, self.store.len());
    }

    fn request(&self, offset: usize) -> Option<NearbyRequest> {
        let origin = self.origin?;
        Some(NearbyRequest {
            lat: Some(origin.lat()),
            lng: Some(origin.lng()),
            radius: Some(i64::from(self.radius_m)),
            category: self.category.map(|c| c.to_string()),
            search: self.text.clone(),
            limit: Some(self.config.page_size as i64),
            offset: Some(offset as i64),
        })
    }

    fn issue(&self, kind: RequestKind, offset: usize) {
        let (Some(req), Some(tx)) = (self.request(offset), self.tx.upgrade()) else {
            return;
        };
        let generation = self.generation;
        let backend = self.backend.clone();
        let timeout = self.config.request_timeout;

        debug!("#{generation} {kind:?} offset={offset}");
        tokio::spawn(async move {
            let result = tokio::time::timeout(timeout, backend.search(req))
                .await
                .unwrap_or(Err(BackendError::Timeout(timeout)));
            let _ = tx.send(Command::Response {
                generation,
                kind,
                result,
            });
        });
    }

    fn on_response(
        &mut self,
        generation: u64,
        kind: RequestKind,
        result: Result<ListingsPage, BackendError>,
    ) {
        if generation != self.generation {
            debug!(
                "discarding stale {kind:?} response #{generation}, current is #{}",
                self.generation
            );
            return;
        }

        let limit = self.config.page_size;
        match (kind, result) {
            (RequestKind::Fresh, Ok(page)) => {
                self.fresh_in_flight = false;
                self.has_succeeded = true;
                let has_more = page.has_more(limit);
                self.store.replace(page.listings, has_more);
            }
            (RequestKind::Fresh, Err(err)) => {
                self.fresh_in_flight = false;
                warn!("search #{generation} failed: {err}");
                self.store.fresh_failed(Failure::from(&err));
            }
            (RequestKind::More, Ok(page)) => {
                self.is_loading_more = false;
                let has_more = page.has_more(limit);
                self.store.append(page.listings, has_more);
            }
            (RequestKind::More, Err(err)) => {
                self.is_loading_more = false;
                warn!("load more #{generation} failed: {err}");
                self.store.load_more_failed();
            }
        }
    }

    fn snapshot(&self) -> ResultSnapshot {
        ResultSnapshot {
            generation: self.generation,
            state: self.store.state().clone(),
            items: self.store.items().clone(),
            has_more: self.store.has_more(),
            notice: self.store.notice().map(str::to_string),
            origin: self.origin,
            category: self.category,
            radius_m: self.radius_m,
            text: self.text.clone(),
        }
    }

    fn publish(&self) {
        let next = self.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
