// geo-search/src/geo.rs
//! Geodesic helpers: validated origins, haversine distance, and the bounding
//! box / region cells used to find candidates without a full scan.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Mean Earth radius (IUGG), meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Slack added around a bounding box so that points sitting exactly on the
/// circle are not lost to rounding.
const BOX_MARGIN_DEG: f64 = 1e-6;

/// A WGS84 coordinate that passed range validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOrigin")]
pub struct Origin {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawOrigin {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawOrigin> for Origin {
    type Error = SearchError;

    fn try_from(raw: RawOrigin) -> Result<Self, Self::Error> {
        Origin::try_new(raw.lat, raw.lng)
    }
}

impl Origin {
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, SearchError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(SearchError::invalid("lat", format!("{lat} is outside [-90, 90]")));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(SearchError::invalid("lng", format!("{lng} is outside [-180, 180]")));
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &Origin) -> f64 {
        haversine_m((self.lat, self.lng), (other.lat, other.lng))
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// Haversine distance between two `(lat, lng)` pairs in degrees, in meters.
pub fn haversine_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lng2 - lng1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Longitude extent of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LngSpan {
    /// Every longitude (box touches a pole)
    Full,
    /// `west..=east` with `west <= east`
    Range { west: f64, east: f64 },
    /// Crosses the antimeridian: `west..=180` and `-180..=east`
    Wrapped { west: f64, east: f64 },
}

impl LngSpan {
    fn contains(&self, lng: f64) -> bool {
        match *self {
            LngSpan::Full => true,
            LngSpan::Range { west, east } => lng >= west && lng <= east,
            LngSpan::Wrapped { west, east } => lng >= west || lng <= east,
        }
    }

    fn ranges(&self) -> Vec<(f64, f64)> {
        match *self {
            LngSpan::Full => vec![(-180.0, 180.0)],
            LngSpan::Range { west, east } => vec![(west, east)],
            LngSpan::Wrapped { west, east } => vec![(west, 180.0), (-180.0, east)],
        }
    }
}

/// Smallest lat/lng box that contains the circle of `radius_m` around an origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub north: f64,
    pub lng: LngSpan,
}

impl BoundingBox {
    pub fn around(origin: &Origin, radius_m: f64) -> Self {
        let angular = radius_m.max(0.0) / EARTH_RADIUS_M;
        let angular_deg = angular.to_degrees();

        let south = origin.lat() - angular_deg - BOX_MARGIN_DEG;
        let north = origin.lat() + angular_deg + BOX_MARGIN_DEG;

        if south <= -90.0 || north >= 90.0 {
            return Self {
                south: south.max(-90.0),
                north: north.min(90.0),
                lng: LngSpan::Full,
            };
        }

        let ratio = angular.sin() / origin.lat().to_radians().cos();
        if ratio >= 1.0 {
            return Self { south, north, lng: LngSpan::Full };
        }

        let delta_lng = ratio.asin().to_degrees() + BOX_MARGIN_DEG;
        let west = origin.lng() - delta_lng;
        let east = origin.lng() + delta_lng;

        let lng = if delta_lng >= 180.0 {
            LngSpan::Full
        } else if west < -180.0 {
            LngSpan::Wrapped { west: west + 360.0, east }
        } else if east > 180.0 {
            LngSpan::Wrapped { west, east: east - 360.0 }
        } else {
            LngSpan::Range { west, east }
        };

        Self { south, north, lng }
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && self.lng.contains(lng)
    }

    /// Every region cell the box overlaps.
    pub fn regions(&self) -> Vec<Region> {
        let south = Region::lat_cell(self.south);
        let north = Region::lat_cell(self.north);

        let mut cells = Vec::new();
        for (west, east) in self.lng.ranges() {
            let west = Region::lng_cell(west);
            let east = Region::lng_cell(east);
            for lat in south..=north {
                for lng in west..=east {
                    cells.push(Region { lat, lng });
                }
            }
        }
        cells
    }
}

/// A 1°×1° cell, identified by the floor of its south-west corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region {
    pub lat: i16,
    pub lng: i16,
}

impl Region {
    pub fn of(lat: f64, lng: f64) -> Self {
        Self {
            lat: Self::lat_cell(lat),
            lng: Self::lng_cell(lng),
        }
    }

    // Poles and the antimeridian fold into the last cell so that 90.0 and
    // 180.0 do not open a cell of their own.
    fn lat_cell(lat: f64) -> i16 {
        (lat.floor() as i16).clamp(-90, 89)
    }

    fn lng_cell(lng: f64) -> i16 {
        (lng.floor() as i16).clamp(-180, 179)
    }
}
