// geo-search/src/search.rs
//! Ranked nearby search
//!
//! One call = one page of active listings within a radius of the origin,
//! nearest first. The ordering is total (distance, then id) so that
//! consecutive `offset`/`limit` pages over an unchanged store never overlap
//! and never skip.

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::geo::{BoundingBox, Origin};
use crate::listing::{Category, Listing};
use crate::store::ListingStore;

/// A nearby search with optional parameters still unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub origin: Origin,
    /// Meters; configured default when `None`, clamped to configured bounds otherwise
    pub radius_m: Option<u32>,
    pub category: Option<Category>,
    pub text: Option<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl SearchQuery {
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            radius_m: None,
            category: None,
            text: None,
            limit: None,
            offset: 0,
        }
    }

    pub fn radius(mut self, meters: u32) -> Self {
        self.radius_m = Some(meters);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }
}

/// A listing together with its distance to the query origin.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedListing {
    pub listing: Listing,
    pub distance_m: f64,
}

/// One slice of the ranked result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<RankedListing>,
    /// Effective radius after clamping
    pub radius_m: u32,
    /// Effective page size after defaulting/capping
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub fn has_more(&self) -> bool {
        self.limit > 0 && self.items.len() == self.limit
    }
}

/// Stateless proximity search over a [`ListingStore`].
#[derive(Clone)]
pub struct GeoSearchService {
    store: Arc<dyn ListingStore>,
    config: SearchConfig,
}

impl GeoSearchService {
    pub fn new(store: Arc<dyn ListingStore>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Page, SearchError> {
        let radius_m = self
            .config
            .clamp_radius(query.radius_m.unwrap_or(self.config.default_radius_m));
        let limit = self
            .config
            .clamp_limit(query.limit.unwrap_or(self.config.default_limit));
        let offset = query.offset;

        let needle = query
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let bounds = BoundingBox::around(&query.origin, f64::from(radius_m));
        let candidates = self.store.candidates(&bounds)?;
        let candidate_count = candidates.len();

        let mut ranked: Vec<RankedListing> = candidates
            .into_iter()
            .filter(Listing::is_active)
            .filter(|l| query.category.is_none_or(|c| l.category == c))
            .filter(|l| needle.as_deref().is_none_or(|n| l.matches_text(n)))
            .filter_map(|listing| {
                let distance_m =
                    crate::geo::haversine_m((query.origin.lat(), query.origin.lng()), listing.position());
                (distance_m <= f64::from(radius_m)).then_some(RankedListing { listing, distance_m })
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.listing.id.cmp(&b.listing.id))
        });
        let matched = ranked.len();

        let items: Vec<RankedListing> = ranked.into_iter().skip(offset).take(limit).collect();

        tracing::debug!(
            "[nearby] origin={} radius={}m category={:?} text={:?}: {} candidates, {} matched, returning {} (offset {}, limit {})",
            query.origin,
            radius_m,
            query.category,
            needle,
            candidate_count,
            matched,
            items.len(),
            offset,
            limit
        );

        Ok(Page {
            items,
            radius_m,
            limit,
            offset,
        })
    }
}
