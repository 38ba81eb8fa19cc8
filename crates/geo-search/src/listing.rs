// geo-search/src/listing.rs
//! Stored listing record as read from the listing store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Category {
    Materials,
    Tools,
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Active,
    Sold,
    Reserved,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Unit {
    Kg,
    G,
    Pieces,
    Bags,
    Liters,
    Meters,
    SqMeters,
    Boxes,
    Sets,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub address_text: Option<String>,
    #[serde(default)]
    pub residential_complex: Option<String>,
    #[serde(default)]
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Listing {
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        let contains = |s: &str| s.to_lowercase().contains(needle);

        contains(&self.title)
            || self.description.as_deref().is_some_and(contains)
            || self.subcategory.as_deref().is_some_and(contains)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::listing;
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_parsing() {
        assert_eq!(Category::from_str("tools").unwrap(), Category::Tools);
        assert_eq!(Category::from_str("Materials").unwrap(), Category::Materials);
        assert!(Category::from_str("furniture").is_err());
        assert_eq!(Category::Materials.to_string(), "materials");
    }

    #[test]
    fn test_matches_text_is_case_insensitive() {
        let mut l = listing(1, "Bosch Drill", Category::Tools, 0.0, 0.0);
        l.description = Some("Barely used, with CASE".into());
        l.subcategory = Some("Дрели".into());

        assert!(l.matches_text("drill"));
        assert!(l.matches_text("osch d"));
        assert!(l.matches_text("case"));
        assert!(l.matches_text("дрел"));
        assert!(!l.matches_text("saw"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "user_id": "00000000-0000-0000-0000-000000000002",
            "title": "Cement, 3 bags",
            "category": "materials",
            "unit": "bags",
            "created_at": "2025-03-01T10:00:00Z",
            "latitude": 51.1,
            "longitude": 71.4
        }"#;
        let l: Listing = serde_json::from_str(json).unwrap();
        assert!(l.is_active());
        assert_eq!(l.unit, Some(Unit::Bags));
        assert!(l.photo_urls.is_empty());
        assert!(!l.is_free);
    }

    #[test]
    fn test_status_round_trip_names() {
        assert_eq!(ListingStatus::from_str("reserved").unwrap(), ListingStatus::Reserved);
        assert_eq!(Unit::SqMeters.to_string(), "sq_meters");
    }
}
