// geo-search/src/rpc_compat.rs
//! RPC adapter: validates raw wire parameters into a [`SearchQuery`] and turns
//! a [`Page`] back into the wire shape.

use std::str::FromStr;

use rpc::search::{ListingHit, ListingsPage, NearbyRequest, SearchErrorKind, SearchLimits};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::geo::Origin;
use crate::listing::Category;
use crate::search::{GeoSearchService, Page, RankedListing, SearchQuery};

impl From<SearchError> for SearchErrorKind {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidArgument { .. } => SearchErrorKind::InvalidArgument(err.to_string()),
            SearchError::Unavailable(_) | SearchError::Config(_) => {
                SearchErrorKind::Unavailable(err.to_string())
            }
        }
    }
}

/// Validate a wire request.
///
/// Missing `lat`/`lng`, out-of-range coordinates, negative integers and
/// unknown categories are invalid arguments. Blank `category`/`search` mean
/// "no filter".
pub fn to_query(req: &NearbyRequest) -> Result<SearchQuery, SearchError> {
    let lat = req.lat.ok_or_else(|| SearchError::invalid("lat", "lat and lng are required"))?;
    let lng = req.lng.ok_or_else(|| SearchError::invalid("lng", "lat and lng are required"))?;
    let origin = Origin::try_new(lat, lng)?;

    let radius_m = req
        .radius
        .map(|r| non_negative("radius", r))
        .transpose()?
        .map(|r| u32::try_from(r).unwrap_or(u32::MAX));
    let limit = req.limit.map(|l| non_negative("limit", l)).transpose()?;
    let offset = req.offset.map(|o| non_negative("offset", o)).transpose()?.unwrap_or(0);

    let category = match req.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => Some(Category::from_str(name).map_err(|_| {
            SearchError::invalid("category", format!("'{name}' is not one of: materials, tools"))
        })?),
    };

    let text = req
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Ok(SearchQuery {
        origin,
        radius_m,
        category,
        text,
        limit,
        offset,
    })
}

fn non_negative(field: &'static str, value: i64) -> Result<usize, SearchError> {
    usize::try_from(value)
        .map_err(|_| SearchError::invalid(field, format!("{value} must be a non-negative integer")))
}

pub fn to_hit(ranked: RankedListing) -> ListingHit {
    let RankedListing { listing, distance_m } = ranked;
    ListingHit {
        id: listing.id,
        user_id: listing.user_id,
        title: listing.title,
        description: listing.description,
        category: listing.category.to_string(),
        subcategory: listing.subcategory,
        quantity: listing.quantity,
        unit: listing.unit.map(|u| u.to_string()),
        price: listing.price,
        currency: listing.currency,
        is_free: listing.is_free,
        photo_urls: listing.photo_urls,
        address_text: listing.address_text,
        residential_complex: listing.residential_complex,
        status: listing.status.to_string(),
        created_at: listing.created_at,
        distance_meters: distance_m,
        latitude: listing.latitude,
        longitude: listing.longitude,
    }
}

pub fn to_page(page: Page) -> ListingsPage {
    let listings: Vec<ListingHit> = page.items.into_iter().map(to_hit).collect();
    ListingsPage {
        total: listings.len(),
        listings,
    }
}

pub fn to_limits(config: &SearchConfig) -> SearchLimits {
    SearchLimits {
        min_radius_m: config.min_radius_m,
        max_radius_m: config.max_radius_m,
        max_limit: config.max_limit,
    }
}

/// Run a wire request end to end.
pub fn handle_search(
    service: &GeoSearchService,
    req: &NearbyRequest,
) -> Result<ListingsPage, SearchErrorKind> {
    let query = to_query(req).inspect_err(|e| tracing::info!("[nearby] rejected request: {e}"))?;
    let page = service
        .search(&query)
        .inspect_err(|e| tracing::warn!("[nearby] search failed: {e}"))?;
    Ok(to_page(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_data::{service, ORIGIN};
    use rstest::rstest;

    #[rstest]
    #[case::missing_lat(NearbyRequest { lng: Some(71.4), ..Default::default() }, "lat")]
    #[case::missing_lng(NearbyRequest { lat: Some(51.1), ..Default::default() }, "lng")]
    #[case::lat_out_of_range(NearbyRequest::at(95.0, 71.4), "lat")]
    #[case::lng_out_of_range(NearbyRequest::at(51.1, 200.0), "lng")]
    #[case::negative_radius(NearbyRequest::at(51.1, 71.4).radius(-5), "radius")]
    #[case::negative_limit(NearbyRequest::at(51.1, 71.4).page(-1, 0), "limit")]
    #[case::negative_offset(NearbyRequest::at(51.1, 71.4).page(6, -6), "offset")]
    #[case::unknown_category(NearbyRequest::at(51.1, 71.4).category("furniture"), "category")]
    fn test_invalid_requests(#[case] req: NearbyRequest, #[case] field: &str) {
        match to_query(&req) {
            Err(SearchError::InvalidArgument { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected invalid {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = to_query(&NearbyRequest::at(51.1, 71.4).category(" ").search("")).unwrap();
        assert_eq!(query.category, None);
        assert_eq!(query.text, None);
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, None);
    }

    #[test]
    fn test_category_is_case_insensitive() {
        let query = to_query(&NearbyRequest::at(51.1, 71.4).category("Tools")).unwrap();
        assert_eq!(query.category, Some(Category::Tools));
    }

    #[test]
    fn test_handle_search_wire_shape() {
        let req = NearbyRequest::at(ORIGIN.0, ORIGIN.1).radius(10_000).page(6, 0);
        let page = handle_search(&service(), &req).unwrap();

        assert_eq!(page.total, 6);
        assert_eq!(page.listings.len(), 6);
        assert!(page.has_more(6));
        let first = &page.listings[0];
        assert_eq!(first.status, "active");
        assert_eq!(first.category, "materials");
        assert!((first.distance_meters - 120.0).abs() < 0.01);
        assert!((first.longitude - ORIGIN.1).abs() < 1e-9);
    }

    #[test]
    fn test_handle_search_empty() {
        let req = NearbyRequest::at(-33.86, 151.21).radius(1_000);
        let page = handle_search(&service(), &req).unwrap();
        assert_eq!(page, ListingsPage { listings: vec![], total: 0 });
    }

    #[test]
    fn test_limits_follow_config() {
        assert_eq!(to_limits(&SearchConfig::default()), SearchLimits::default());

        let config = SearchConfig {
            min_radius_m: 500,
            max_limit: 10,
            ..Default::default()
        };
        let limits = to_limits(&config);
        assert_eq!(limits.min_radius_m, 500);
        assert_eq!(limits.max_radius_m, 50_000);
        assert_eq!(limits.max_limit, 10);
    }

    #[test]
    fn test_errors_map_to_wire_kinds() {
        let err = handle_search(&service(), &NearbyRequest::default()).unwrap_err();
        assert!(matches!(err, SearchErrorKind::InvalidArgument(_)));
        assert!(!err.is_retryable());

        let unavailable: SearchErrorKind =
            SearchError::Unavailable(crate::error::StoreError::Unavailable("down".into())).into();
        assert!(unavailable.is_retryable());
    }
}
