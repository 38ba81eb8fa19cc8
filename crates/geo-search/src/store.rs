// geo-search/src/store.rs
//! Listing storage seen from the search side: a read-only source of
//! candidates inside a bounding box.

use std::collections::HashMap;
use std::path::Path;

use crate::error::StoreError;
use crate::geo::{BoundingBox, Region};
use crate::listing::Listing;

/// The spatial lookup the search service needs from a backing store.
///
/// Implementations must return every *active* listing inside `bounds`; they
/// may return extra ones (the service re-checks distance and status).
pub trait ListingStore: Send + Sync {
    fn candidates(&self, bounds: &BoundingBox) -> Result<Vec<Listing>, StoreError>;
}

/// Immutable in-memory store, indexed by 1°×1° region.
#[derive(Debug, Default)]
pub struct InMemoryListingStore {
    listings: Vec<Listing>,
    regions: HashMap<Region, Vec<usize>>,
}

impl InMemoryListingStore {
    /// Builds the index. Listings that are not active are dropped here, they
    /// can never be returned by a search.
    pub fn new(listings: impl IntoIterator<Item = Listing>) -> Self {
        let listings: Vec<Listing> = listings.into_iter().filter(Listing::is_active).collect();

        let mut regions: HashMap<Region, Vec<usize>> = HashMap::new();
        for (idx, listing) in listings.iter().enumerate() {
            regions
                .entry(Region::of(listing.latitude, listing.longitude))
                .or_default()
                .push(idx);
        }

        Self { listings, regions }
    }

    /// Load a JSON array of listings (the exported snapshot of the listing table).
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let listings: Vec<Listing> =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        let total = listings.len();
        let store = Self::new(listings);
        tracing::info!(
            "Loaded {} listings from {:?} ({} active, {} regions)",
            total,
            path,
            store.len(),
            store.regions.len()
        );
        Ok(store)
    }

    /// Number of searchable listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

impl ListingStore for InMemoryListingStore {
    fn candidates(&self, bounds: &BoundingBox) -> Result<Vec<Listing>, StoreError> {
        let mut found = Vec::new();
        for region in bounds.regions() {
            let Some(indices) = self.regions.get(&region) else {
                continue;
            };
            found.extend(
                indices
                    .iter()
                    .map(|&idx| &self.listings[idx])
                    .filter(|l| bounds.contains(l.latitude, l.longitude))
                    .cloned(),
            );
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Origin;
    use crate::listing::fixtures::listing;
    use crate::listing::{Category, ListingStatus};
    use std::io::Write;

    #[test]
    fn test_inactive_listings_are_not_indexed() {
        let mut sold = listing(2, "sold drill", Category::Tools, 51.1, 71.4);
        sold.status = ListingStatus::Sold;
        let store = InMemoryListingStore::new(vec![
            listing(1, "drill", Category::Tools, 51.1, 71.4),
            sold,
        ]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_candidates_only_from_overlapping_regions() {
        let store = InMemoryListingStore::new(vec![
            listing(1, "near", Category::Tools, 51.101, 71.401),
            listing(2, "same region, outside box", Category::Tools, 51.9, 71.9),
            listing(3, "far", Category::Tools, 43.2, 76.9),
        ]);
        let origin = Origin::try_new(51.1, 71.4).unwrap();
        let found = store.candidates(&BoundingBox::around(&origin, 1_000.0)).unwrap();

        let titles: Vec<_> = found.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["near"]);
    }

    #[test]
    fn test_candidates_across_antimeridian() {
        let store = InMemoryListingStore::new(vec![
            listing(1, "east", Category::Materials, -16.5, 179.99),
            listing(2, "west", Category::Materials, -16.5, -179.99),
        ]);
        let origin = Origin::try_new(-16.5, 180.0).unwrap();
        let found = store.candidates(&BoundingBox::around(&origin, 5_000.0)).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_load_json_snapshot() {
        let listings = vec![
            listing(1, "cement", Category::Materials, 51.1, 71.4),
            listing(2, "ladder", Category::Tools, 51.2, 71.5),
        ];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&listings).unwrap().as_bytes()).unwrap();

        let store = InMemoryListingStore::load_json(file.path()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_json_errors() {
        let missing = InMemoryListingStore::load_json("/definitely/not/here.json");
        assert!(matches!(missing, Err(StoreError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let corrupt = InMemoryListingStore::load_json(file.path());
        assert!(matches!(corrupt, Err(StoreError::Corrupt { .. })));
    }
}
