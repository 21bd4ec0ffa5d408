//! Pure projections from [`SessionState`] to renderable surfaces.

use std::fmt;

use shared::domain::{DisasterType, Location, RedZoneId, ReportId};

use crate::controller::SessionState;

pub const DEFAULT_MAP_ZOOM: u8 = 13;
pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const CATEGORY_PLACEHOLDER: &str = "Select a disaster type";

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    pub category: String,
    pub description: String,
    pub image_url: String,
}

impl MarkerPopup {
    pub fn summary(&self) -> String {
        format!("{} / {}", self.category, self.description)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: ReportId,
    pub position: Location,
    pub popup: MarkerPopup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: Location,
    pub zoom: u8,
    pub tile_url: &'static str,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    /// `None` until the session has a location to center on.
    pub fn project(state: &SessionState) -> Option<Self> {
        let center = state.location?;
        let markers = state
            .reports
            .iter()
            .map(|report| MapMarker {
                id: report.id.clone(),
                position: report.location,
                popup: MarkerPopup {
                    category: report.disaster_type.to_string(),
                    description: report.description.clone(),
                    image_url: report.image_url.clone(),
                },
            })
            .collect();
        Some(Self {
            center,
            zoom: DEFAULT_MAP_ZOOM,
            tile_url: TILE_URL_TEMPLATE,
            markers,
        })
    }
}

impl fmt::Display for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Map centered at {} (zoom {})", self.center, self.zoom)?;
        for marker in &self.markers {
            writeln!(
                f,
                "  [{}] {} {} <{}>",
                marker.id,
                marker.position,
                marker.popup.summary(),
                marker.popup.image_url
            )?;
        }
        Ok(())
    }
}

/// Formats with exactly two decimals, rounding half up on the value's
/// shortest decimal representation (so `1.005` becomes `"1.01"`).
pub fn format_two_decimals(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let mut frac: Vec<u8> = frac_part.bytes().collect();
    frac.resize(frac.len().max(3), b'0');

    let mut digits: Vec<u8> = int_part.bytes().chain(frac[..2].iter().copied()).collect();
    if frac[2] >= b'5' {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - 2;
    let text: String = digits.iter().map(|&d| char::from(d)).collect();
    let is_zero = digits.iter().all(|&d| d == b'0');
    let sign = if value.is_sign_negative() && !is_zero { "-" } else { "" };
    format!("{sign}{}.{}", &text[..split], &text[split..])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedZoneRow {
    pub id: RedZoneId,
    pub disaster_type: String,
    pub distance_km: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedZoneView {
    pub rows: Vec<RedZoneRow>,
}

impl RedZoneView {
    pub const HEADERS: [&'static str; 3] = ["Disaster Type", "Distance (km)", "Description"];

    pub fn project(state: &SessionState) -> Self {
        let rows = state
            .red_zones
            .iter()
            .map(|zone| RedZoneRow {
                id: zone.id.clone(),
                disaster_type: zone.disaster_type.to_string(),
                distance_km: format_two_decimals(zone.distance_km),
                description: zone.description.clone(),
            })
            .collect();
        Self { rows }
    }
}

impl fmt::Display for RedZoneRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.disaster_type, self.distance_km, self.description
        )
    }
}

impl fmt::Display for RedZoneView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", Self::HEADERS.join(" | "))?;
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    /// `None` for the unselected placeholder.
    pub value: Option<DisasterType>,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFormView {
    pub options: Vec<CategoryOption>,
    pub description: String,
    pub image_name: Option<String>,
    pub can_submit: bool,
}

impl ReportFormView {
    pub fn project(state: &SessionState) -> Self {
        let selected = state.draft.disaster_type.as_ref();
        let placeholder = CategoryOption {
            value: None,
            label: CATEGORY_PLACEHOLDER.to_string(),
            selected: selected.is_none(),
        };
        let options = std::iter::once(placeholder)
            .chain(state.disaster_types.iter().map(|kind| CategoryOption {
                value: Some(kind.clone()),
                label: kind.to_string(),
                selected: selected == Some(kind),
            }))
            .collect();

        Self {
            options,
            description: state.draft.description.clone(),
            image_name: state.draft.image.as_ref().map(|image| image.filename.clone()),
            can_submit: state.can_submit(),
        }
    }
}

impl fmt::Display for ReportFormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self
            .options
            .iter()
            .map(|option| {
                if option.selected {
                    format!("*{}", option.label)
                } else {
                    option.label.clone()
                }
            })
            .collect();
        writeln!(f, "Category: {}", labels.join(", "))?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Image: {}", self.image_name.as_deref().unwrap_or("(none)"))?;
        writeln!(
            f,
            "Submit: {}",
            if self.can_submit { "enabled" } else { "disabled" }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCard {
    pub id: ReportId,
    pub title: String,
    pub description: String,
    pub image_url: String,
}

/// The "recent reports" list shown under the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportListView {
    pub cards: Vec<ReportCard>,
}

impl ReportListView {
    pub fn project(state: &SessionState) -> Self {
        let cards = state
            .reports
            .iter()
            .map(|report| ReportCard {
                id: report.id.clone(),
                title: report.disaster_type.to_string(),
                description: report.description.clone(),
                image_url: report.image_url.clone(),
            })
            .collect();
        Self { cards }
    }
}

impl fmt::Display for ReportListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            writeln!(f, "{}: {} <{}>", card.title, card.description, card.image_url)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
