use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(ReportId);
id_newtype!(RedZoneId);

/// Validated lat/lon pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LocationFields")]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize)]
struct LocationFields {
    lat: f64,
    lon: f64,
}

impl TryFrom<LocationFields> for Location {
    type Error = String;

    fn try_from(fields: LocationFields) -> Result<Self, Self::Error> {
        Self::new(fields.lat, fields.lon)
            .ok_or_else(|| format!("coordinates out of range: ({}, {})", fields.lat, fields.lon))
    }
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self { lat, lon })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Server-enumerated report category, e.g. `"Flood"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisasterType(pub String);

impl DisasterType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: ReportId,
    pub disaster_type: DisasterType,
    pub description: String,
    pub image_url: String,
    pub location: Location,
    /// Distance from the query point in meters, when the server reports it.
    pub distance_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedZone {
    pub id: RedZoneId,
    pub disaster_type: DisasterType,
    pub description: String,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_accepts_bounds_and_rejects_outside() {
        assert!(Location::new(90.0, 180.0).is_some());
        assert!(Location::new(-90.0, -180.0).is_some());
        assert!(Location::new(90.1, 0.0).is_none());
        assert!(Location::new(0.0, -180.5).is_none());
        assert!(Location::new(f64::NAN, 0.0).is_none());
        assert!(Location::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn deserialized_location_is_range_checked() {
        let parsed: Location =
            serde_json::from_str(r#"{"lat":40.0,"lon":-75.0}"#).expect("valid location");
        assert_eq!(Some(parsed), Location::new(40.0, -75.0));

        let err = serde_json::from_str::<Location>(r#"{"lat":95.0,"lon":0.0}"#)
            .expect_err("latitude out of range");
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn disaster_type_serializes_as_plain_string() {
        let json = serde_json::to_string(&DisasterType::new("flood")).expect("serialize");
        assert_eq!(json, "\"flood\"");
    }
}
