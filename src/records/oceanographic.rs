use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::mapping::FieldReader;

/// One water-quality reading at a station.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OceanographicReading {
    pub station_id: String,
    pub location: OceanographicLocation,
    pub timestamp: DateTime<Utc>,
    pub depth: f64,
    pub temperature: f64,
    pub salinity: f64,
    pub ph: f64,
    pub dissolved_oxygen: f64,
    pub chlorophyll: f64,
    pub turbidity: f64,
    pub nutrients: Nutrients,
    pub current: Current,
    pub wave_height: f64,
    /// Free-text instrument or data source tag.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OceanographicLocation {
    pub longitude: f64,
    pub latitude: f64,
    pub region: String,
}

/// Nutrient concentrations (µmol/L).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nutrients {
    pub nitrate: f64,
    pub phosphate: f64,
    pub silicate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Current {
    pub speed: f64,
    /// Degrees from north.
    pub direction: f64,
}

impl OceanographicReading {
    pub(crate) fn from_fields(f: &mut FieldReader<'_>) -> Self {
        Self {
            station_id: f.identifier("stationId"),
            location: OceanographicLocation {
                longitude: f.number("location.longitude"),
                latitude: f.number("location.latitude"),
                region: f.text("location.region"),
            },
            timestamp: f.timestamp("timestamp"),
            depth: f.number("depth"),
            temperature: f.number("temperature"),
            salinity: f.number("salinity"),
            ph: f.number("ph"),
            dissolved_oxygen: f.number("dissolvedOxygen"),
            chlorophyll: f.number("chlorophyll"),
            turbidity: f.number("turbidity"),
            nutrients: Nutrients {
                nitrate: f.number("nutrients.nitrate"),
                phosphate: f.number("nutrients.phosphate"),
                silicate: f.number("nutrients.silicate"),
            },
            current: Current {
                speed: f.number("current.speed"),
                direction: f.number("current.direction"),
            },
            wave_height: f.number("waveHeight"),
            source: f.text("source"),
        }
    }
}
