//! Catalog discovery from the SIRI-Lite `lines-discovery` and
//! `stoppoints-discovery` endpoints
//!
//! Only used offline by `tbm-horaires sync-catalog`; voice turns never call it.

use std::collections::HashSet;

use super::client::SiriClient;
use super::siri::{
    AnnotatedLine, AnnotatedStopPoint, LinesDiscoverySiri, SiriEnvelope, StopPointsDiscoverySiri,
};
use super::TransitError;
use crate::Result;
use crate::catalog::{Catalog, CatalogFile, EntryFile};

/// Geographic bounds used for stop discovery
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

/// Bordeaux Métropole service area
pub const BORDEAUX_BBOX: BoundingBox = BoundingBox {
    west: -0.81,
    north: 45.10,
    east: -0.35,
    south: 44.70,
};

impl SiriClient {
    /// All lines with their destinations
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is invalid
    pub async fn fetch_lines(&self) -> std::result::Result<Vec<AnnotatedLine>, TransitError> {
        let envelope: SiriEnvelope<LinesDiscoverySiri> =
            self.get("lines-discovery.json", &[]).await?;
        Ok(envelope
            .siri
            .lines_delivery
            .map(|d| d.lines)
            .unwrap_or_default())
    }

    /// All stop points inside `bbox`
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is invalid
    pub async fn fetch_stop_points(
        &self,
        bbox: BoundingBox,
    ) -> std::result::Result<Vec<AnnotatedStopPoint>, TransitError> {
        let params = [
            ("BoundingBox.UpperLeft.longitude", bbox.west.to_string()),
            ("BoundingBox.UpperLeft.latitude", bbox.north.to_string()),
            ("BoundingBox.LowerRight.longitude", bbox.east.to_string()),
            ("BoundingBox.LowerRight.latitude", bbox.south.to_string()),
        ];
        let envelope: SiriEnvelope<StopPointsDiscoverySiri> =
            self.get("stoppoints-discovery.json", &params).await?;
        Ok(envelope
            .siri
            .stop_points_delivery
            .map(|d| d.stop_points)
            .unwrap_or_default())
    }

    /// Fetch lines and stops and build a catalog from them
    ///
    /// # Errors
    ///
    /// Returns error if either request fails or the result does not validate
    pub async fn discover_catalog(&self, bbox: BoundingBox) -> Result<Catalog> {
        let lines = self.fetch_lines().await?;
        let stops = self.fetch_stop_points(bbox).await?;
        tracing::info!(lines = lines.len(), stops = stops.len(), "discovered network");
        build_catalog(&lines, &stops)
    }
}

/// Build a catalog from discovery results
///
/// Entries with an empty reference or name are skipped, as are duplicate
/// ids. Stop line lists keep only lines present in `lines`.
///
/// # Errors
///
/// Returns error if the assembled catalog fails validation
pub fn build_catalog(lines: &[AnnotatedLine], stops: &[AnnotatedStopPoint]) -> Result<Catalog> {
    let mut file = CatalogFile::default();
    let mut line_ids = HashSet::new();
    let mut direction_ids = HashSet::new();

    for line in lines {
        let id = line.line_ref.as_str().trim();
        let name = line.line_name.as_str().trim();
        if id.is_empty() || name.is_empty() || !line_ids.insert(id.to_string()) {
            continue;
        }

        let code = line.line_code.as_str().trim();
        let aliases = if code.is_empty() || code.eq_ignore_ascii_case(name) {
            Vec::new()
        } else {
            vec![code.to_string()]
        };
        file.lines.push(EntryFile {
            id: id.to_string(),
            name: name.to_string(),
            spoken_name: spoken_line_name(name),
            aliases,
            lines: Vec::new(),
        });

        for destination in &line.destinations {
            let place = destination.place_name.as_str().trim();
            let Ok(direction_ref) = destination.direction_ref.as_str().trim().parse::<i64>() else {
                continue;
            };
            let direction_id = format!("{id}-{direction_ref}");
            if place.is_empty() || !direction_ids.insert(direction_id.clone()) {
                continue;
            }
            file.directions.push(EntryFile {
                id: direction_id,
                name: place.to_string(),
                spoken_name: None,
                aliases: Vec::new(),
                lines: vec![id.to_string()],
            });
        }
    }

    let mut stop_ids = HashSet::new();
    for stop in stops {
        let id = stop.stop_point_ref.as_str().trim();
        let name = stop.stop_name.as_str().trim();
        if id.is_empty() || name.is_empty() || !stop_ids.insert(id.to_string()) {
            continue;
        }
        file.stops.push(EntryFile {
            id: id.to_string(),
            name: name.to_string(),
            spoken_name: None,
            aliases: Vec::new(),
            lines: stop
                .lines
                .iter()
                .map(|l| l.as_str().trim().to_string())
                .filter(|l| line_ids.contains(l))
                .collect(),
        });
    }

    Catalog::from_file(file)
}

/// "Tram C" -> "le tram C", "Liane 4" -> "la liane 4"
fn spoken_line_name(name: &str) -> Option<String> {
    let (kind, rest) = name.split_once(' ')?;
    let article = match kind.to_lowercase().as_str() {
        "tram" | "bus" | "batcub" => "le",
        "liane" | "ligne" | "navette" => "la",
        _ => return None,
    };
    Some(format!("{article} {} {rest}", kind.to_lowercase()))
}
