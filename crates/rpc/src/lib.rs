pub mod search;

use search::{ListingsPage, SearchErrorKind, SearchLimits};

#[tarpc::service]
pub trait Nearby {
    /// Heartbeat
    async fn ping() -> String;

    /// Radius and page-size bounds every search is clamped to.
    async fn limits() -> SearchLimits;

    /// Ranked, filtered, paginated proximity search.
    async fn search_nearby(req: search::NearbyRequest) -> Result<ListingsPage, SearchErrorKind>;
}
