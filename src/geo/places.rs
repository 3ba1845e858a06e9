use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ArError, Result};
use crate::geo::{GeoCoordinate, bearing_and_distance};

/// A named geographic location to overlay on the camera feed
///
/// Immutable once constructed; the coordinate is validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    id: Arc<str>,
    label: Arc<str>,
    coordinate: GeoCoordinate,
}

impl PointOfInterest {
    /// Create a point of interest, rejecting NaN or out-of-range coordinates
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        coordinate: GeoCoordinate,
    ) -> Result<Self> {
        let id: String = id.into();
        let label: String = label.into();
        if !coordinate.is_valid() {
            return Err(ArError::InvalidCoordinate {
                id,
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
            });
        }
        Ok(Self {
            id: id.into(),
            label: label.into(),
            coordinate,
        })
    }

    pub fn id(&self) -> &Arc<str> {
        &self.id
    }

    pub fn label(&self) -> &Arc<str> {
        &self.label
    }

    pub fn coordinate(&self) -> &GeoCoordinate {
        &self.coordinate
    }
}

/// On-disk place record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl TryFrom<PlaceRecord> for PointOfInterest {
    type Error = ArError;

    fn try_from(record: PlaceRecord) -> Result<Self> {
        let coordinate = GeoCoordinate {
            latitude: record.latitude,
            longitude: record.longitude,
            altitude: record.altitude,
        };
        PointOfInterest::new(record.id, record.label, coordinate)
    }
}

/// Result of loading a place file
///
/// Entries with invalid coordinates are rejected individually; the rest load.
#[derive(Debug, Default)]
pub struct LoadedPlaces {
    pub places: Vec<PointOfInterest>,
    pub rejected: Vec<ArError>,
}

/// Parse a JSON array of place records
pub fn parse_places(json: &str) -> Result<LoadedPlaces> {
    let records: Vec<PlaceRecord> =
        serde_json::from_str(json).map_err(|e| ArError::Parse(format!("place list: {}", e)))?;

    let mut loaded = LoadedPlaces::default();
    for record in records {
        match PointOfInterest::try_from(record) {
            Ok(place) => loaded.places.push(place),
            Err(e) => {
                log::warn!("Rejecting place: {}", e);
                loaded.rejected.push(e);
            }
        }
    }
    log::info!(
        "Loaded {} places ({} rejected)",
        loaded.places.len(),
        loaded.rejected.len()
    );
    Ok(loaded)
}

/// Load a JSON place file
pub fn load_places<P: AsRef<Path>>(path: P) -> Result<LoadedPlaces> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_places(&text)
}

/// One row of the place list, nearest first
#[derive(Debug, Clone)]
pub struct PlaceSummary {
    pub id: Arc<str>,
    pub label: Arc<str>,
    pub bearing_degrees: f64,
    pub distance_m: f64,
}

impl PlaceSummary {
    /// Caption for a list cell, e.g. "Golden Gate Bridge · 2.4 km NW"
    pub fn caption(&self) -> String {
        format!(
            "{} · {} {}",
            self.label,
            format_distance(self.distance_m),
            compass_point(self.bearing_degrees)
        )
    }
}

/// Places ordered by distance from `location`
///
/// Ties keep the input order.
pub fn rank_by_distance(
    places: &[PointOfInterest],
    location: &GeoCoordinate,
) -> Vec<PlaceSummary> {
    let mut rows: Vec<PlaceSummary> = places
        .iter()
        .map(|place| {
            let (bearing_degrees, distance_m) =
                bearing_and_distance(location, place.coordinate());
            PlaceSummary {
                id: Arc::clone(place.id()),
                label: Arc::clone(place.label()),
                bearing_degrees,
                distance_m,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    rows
}

/// Eight-point compass name for a bearing
pub fn compass_point(bearing_degrees: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let sector = (bearing_degrees.rem_euclid(360.0) / 45.0).round() as usize % 8;
    POINTS[sector]
}

/// Human-readable distance: meters below 1 km, kilometers above
pub fn format_distance(distance_m: f64) -> String {
    if distance_m < 1000.0 {
        format!("{:.0} m", distance_m)
    } else if distance_m < 100_000.0 {
        format!("{:.1} km", distance_m / 1000.0)
    } else {
        format!("{:.0} km", distance_m / 1000.0)
    }
}
