//! Client side of nearby search: keeps the displayed result list in step with
//! the user's position, filters and typing.

pub mod backend;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod location;
pub mod store;

pub use backend::{BackendError, LocalBackend, RpcBackend, SearchBackend};
pub use coordinator::{CoordinatorConfig, CoordinatorHandle, ResultSnapshot};
pub use location::{
    Authorization, LocationError, LocationEvent, LocationProvider, LocationSource,
    ManualLocationSource, StaticLocationSource,
};
pub use store::{Failure, FailureKind, ResultStore, SearchState};
