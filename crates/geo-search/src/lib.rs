// geo-search/src/lib.rs
//! Proximity search over marketplace listings.
//!
//! - validated WGS84 origins and haversine distance
//! - a read-only listing store with a 1°×1° region index
//! - one ranked, filtered, paginated search per call

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod geo;
pub mod listing;
pub mod search;
pub mod store;

// RPC adapter (optional)
#[cfg(any(test, feature = "rpc-compat"))]
pub mod rpc_compat;

pub use config::SearchConfig;
pub use error::{SearchError, StoreError};
pub use geo::{BoundingBox, EARTH_RADIUS_M, Origin, Region, haversine_m};
pub use listing::{Category, Listing, ListingStatus, Unit};
pub use search::{GeoSearchService, Page, RankedListing, SearchQuery};
pub use store::{InMemoryListingStore, ListingStore};

/// Build a service from a JSON listing snapshot.
pub fn open_snapshot(
    path: impl AsRef<std::path::Path>,
    config: SearchConfig,
) -> Result<GeoSearchService, SearchError> {
    config.validate()?;
    let store = InMemoryListingStore::load_json(path)?;
    Ok(GeoSearchService::new(Arc::new(store), config))
}
