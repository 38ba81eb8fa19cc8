//! Client defaults

/// Quiet period after the last keystroke before free text is searched
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_RADIUS_M: u32 = 10_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;
/// Fixes closer than this to the current origin do not restart the search
pub const DEFAULT_MIN_MOVEMENT_M: f64 = 50.0;
