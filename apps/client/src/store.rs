//! Result Store holds what the user currently sees: the ranked listings
//! collected so far and the state of the search that produced them.
//!
//! A fresh search keeps the previous items on screen until its first page
//! arrives. A failure only takes over the screen when there is nothing to
//! show, otherwise it becomes a transient notice.

use std::sync::Arc;

use rpc::search::ListingHit;

use crate::backend::BackendError;
use crate::location::LocationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The request was rejected; retrying it unchanged cannot help
    Invalid,
    /// Network, timeout or store trouble
    Transient,
    /// No usable position
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn retryable(&self) -> bool {
        self.kind != FailureKind::Invalid
    }
}

impl From<&BackendError> for Failure {
    fn from(err: &BackendError) -> Self {
        let kind = match err {
            BackendError::Invalid(_) => FailureKind::Invalid,
            _ => FailureKind::Transient,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<&LocationError> for Failure {
    fn from(err: &LocationError) -> Self {
        Self {
            kind: FailureKind::Location,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    LoadingMore,
    Success,
    Empty,
    Error(Failure),
}

#[derive(Debug, Default)]
pub struct ResultStore {
    items: Arc<Vec<ListingHit>>,
    state: SearchState,
    has_more: bool,
    notice: Option<String>,
}

impl ResultStore {
    pub fn items(&self) -> &Arc<Vec<ListingHit>> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Fresh search issued. Items stay visible.
    pub fn begin_fresh(&mut self) {
        self.state = SearchState::Loading;
    }

    pub fn begin_load_more(&mut self) {
        self.state = SearchState::LoadingMore;
    }

    /// First page of a fresh search.
    pub fn replace(&mut self, items: Vec<ListingHit>, has_more: bool) {
        self.state = if items.is_empty() {
            SearchState::Empty
        } else {
            SearchState::Success
        };
        self.items = Arc::new(items);
        self.has_more = has_more;
        self.notice = None;
    }

    /// Next page of the current search.
    pub fn append(&mut self, items: Vec<ListingHit>, has_more: bool) {
        Arc::make_mut(&mut self.items).extend(items);
        self.has_more = has_more;
        self.state = if self.is_empty() {
            SearchState::Empty
        } else {
            SearchState::Success
        };
    }

    /// Kept items came from an earlier search, so no page may be
    /// appended to them.
    pub fn fresh_failed(&mut self, failure: Failure) {
        self.has_more = false;
        if self.is_empty() {
            self.state = SearchState::Error(failure);
        } else {
            self.notice = Some(failure.message);
            self.state = SearchState::Success;
        }
    }

    /// List and `has_more` stay as they were.
    pub fn load_more_failed(&mut self) {
        self.state = if self.is_empty() {
            SearchState::Empty
        } else {
            SearchState::Success
        };
    }

    /// Without an origin and with nothing on screen the user has to act,
    /// otherwise the failure is only reported.
    pub fn location_failed(&mut self, failure: Failure, has_origin: bool) {
        if !has_origin && self.is_empty() {
            self.state = SearchState::Error(failure);
        } else {
            self.notice = Some(failure.message);
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::DateTime;
    use rpc::search::ListingHit;
    use uuid::Uuid;

    pub fn hit(n: u128, distance_meters: f64) -> ListingHit {
        ListingHit {
            id: Uuid::from_u128(n),
            user_id: Uuid::from_u128(1_000),
            title: format!("listing {n}"),
            description: None,
            category: "materials".to_string(),
            subcategory: None,
            quantity: None,
            unit: None,
            price: None,
            currency: None,
            is_free: true,
            photo_urls: vec![],
            address_text: None,
            residential_complex: None,
            status: "active".to_string(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            distance_meters,
            latitude: 51.1,
            longitude: 71.4,
        }
    }

    pub fn hits(range: std::ops::Range<u128>) -> Vec<ListingHit> {
        range.map(|n| hit(n, n as f64 * 100.0)).collect()
    }
}
