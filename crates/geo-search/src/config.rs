// geo-search/src/config.rs
//! Search limits

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Bounds applied to every nearby search.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Radius used when the request carries none (meters)
    pub default_radius_m: u32,
    /// Requested radii are clamped into `[min_radius_m, max_radius_m]`
    pub min_radius_m: u32,
    pub max_radius_m: u32,
    /// Page size used when the request carries none
    pub default_limit: usize,
    /// Upper bound for a requested page size
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_m: 10_000,
            min_radius_m: 100,
            max_radius_m: 50_000,
            default_limit: 50,
            max_limit: 100,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.min_radius_m == 0 || self.min_radius_m > self.max_radius_m {
            return Err(SearchError::Config(format!(
                "radius bounds {}..={} are empty",
                self.min_radius_m, self.max_radius_m
            )));
        }
        if !(self.min_radius_m..=self.max_radius_m).contains(&self.default_radius_m) {
            return Err(SearchError::Config(format!(
                "default radius {} is outside {}..={}",
                self.default_radius_m, self.min_radius_m, self.max_radius_m
            )));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(SearchError::Config(format!(
                "default limit {} must be within 1..={}",
                self.default_limit, self.max_limit
            )));
        }
        Ok(())
    }

    pub fn clamp_radius(&self, radius_m: u32) -> u32 {
        radius_m.clamp(self.min_radius_m, self.max_radius_m)
    }

    pub fn clamp_limit(&self, limit: usize) -> usize {
        limit.min(self.max_limit)
    }
}
