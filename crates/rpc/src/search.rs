use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw query parameters of a nearby search, as sent by the client.
///
/// `lat`/`lng` stay optional on the wire so that a missing origin can be
/// reported as an invalid argument instead of failing deserialization.
/// Integers are signed for the same reason: negative values are rejected by
/// the server with a readable message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearbyRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Radius in meters, server default when absent
    pub radius: Option<i64>,
    /// `materials` or `tools`
    pub category: Option<String>,
    /// Case-insensitive free text
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl NearbyRequest {
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            ..Default::default()
        }
    }

    pub fn radius(mut self, meters: i64) -> Self {
        self.radius = Some(meters);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// One listing of a search page, annotated with its distance to the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingHit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub is_free: bool,
    /// References into the photo object store
    pub photo_urls: Vec<String>,
    pub address_text: Option<String>,
    pub residential_complex: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,

    pub distance_meters: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingsPage {
    pub listings: Vec<ListingHit>,
    /// Number of listings in this page
    pub total: usize,
}

impl ListingsPage {
    /// A page is followed by another one only when it came back full.
    pub fn has_more(&self, limit: usize) -> bool {
        limit > 0 && self.listings.len() == limit
    }
}

/// Bounds the server applies to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    pub min_radius_m: u32,
    pub max_radius_m: u32,
    /// Largest page the server hands out
    pub max_limit: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            min_radius_m: 100,
            max_radius_m: 50_000,
            max_limit: 100,
        }
    }
}

impl SearchLimits {
    pub fn clamp_radius(&self, radius_m: u32) -> u32 {
        radius_m.clamp(self.min_radius_m, self.max_radius_m)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SearchErrorKind {
    /// Bad or missing input. Retrying the same request cannot succeed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The listing store could not be reached. May be retried with backoff.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl SearchErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchErrorKind::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_parameters() {
        let req = NearbyRequest::at(51.1, 71.399)
            .radius(1000)
            .category("tools")
            .search("drill")
            .page(6, 12);

        assert_eq!(req.lat, Some(51.1));
        assert_eq!(req.lng, Some(71.399));
        assert_eq!(req.radius, Some(1000));
        assert_eq!(req.category.as_deref(), Some("tools"));
        assert_eq!(req.search.as_deref(), Some("drill"));
        assert_eq!(req.limit, Some(6));
        assert_eq!(req.offset, Some(12));
    }

    #[test]
    fn test_has_more_only_for_full_pages() {
        let page = ListingsPage::default();
        assert!(!page.has_more(0));
        assert!(!page.has_more(6));
    }

    #[test]
    fn test_page_json_shape() {
        let json = serde_json::to_value(ListingsPage::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "listings": [], "total": 0 }));
    }

    #[test]
    fn test_limits_clamp_radius() {
        let limits = SearchLimits::default();
        assert_eq!(limits.clamp_radius(5), 100);
        assert_eq!(limits.clamp_radius(2_500), 2_500);
        assert_eq!(limits.clamp_radius(u32::MAX), 50_000);
    }

    #[test]
    fn test_error_retryability() {
        assert!(SearchErrorKind::Unavailable("store down".into()).is_retryable());
        assert!(!SearchErrorKind::InvalidArgument("lat".into()).is_retryable());
    }
}
