use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DisasterType, Location, RedZone, RedZoneId, Report, ReportId};

pub const DISASTER_TYPES_ROUTE: &str = "/api/disaster-types";
pub const REPORTS_ROUTE: &str = "/api/reports";
pub const RED_ZONES_ROUTE: &str = "/api/red-zones";

/// Multipart field names for `POST /api/reports`.
pub mod report_form {
    pub const DISASTER_TYPE: &str = "disaster_type";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGE: &str = "image";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NearQuery {
    pub lat: f64,
    pub lon: f64,
}

impl From<Location> for NearQuery {
    fn from(location: Location) -> Self {
        Self {
            lat: location.lat,
            lon: location.lon,
        }
    }
}

/// GeoJSON point; coordinates are `[lon, lat]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn from_location(location: Location) -> Self {
        Self {
            kind: Some("Point".into()),
            coordinates: [location.lon, location.lat],
        }
    }

    pub fn to_location(&self) -> Option<Location> {
        let [lon, lat] = self.coordinates;
        Location::new(lat, lon)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub disaster_type: String,
    pub description: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedZoneRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub disaster_type: String,
    #[serde(default)]
    pub description: String,
    pub distance: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("report {id} has out-of-range coordinates {coordinates:?}")]
    InvalidCoordinates { id: String, coordinates: [f64; 2] },
}

impl TryFrom<ReportRecord> for Report {
    type Error = RecordError;

    fn try_from(record: ReportRecord) -> Result<Self, Self::Error> {
        let location =
            record
                .location
                .to_location()
                .ok_or_else(|| RecordError::InvalidCoordinates {
                    id: record.id.clone(),
                    coordinates: record.location.coordinates,
                })?;
        Ok(Self {
            id: ReportId(record.id),
            disaster_type: DisasterType(record.disaster_type),
            description: record.description,
            image_url: record.image_url,
            location,
            distance_m: record.distance,
        })
    }
}

impl From<RedZoneRecord> for RedZone {
    fn from(record: RedZoneRecord) -> Self {
        let distance_km = if record.distance.is_finite() {
            record.distance.max(0.0)
        } else {
            0.0
        };
        Self {
            id: RedZoneId(record.id),
            disaster_type: DisasterType(record.disaster_type),
            description: record.description,
            distance_km,
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
