use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{normalize_code, UnknownCode};
use crate::mapping::FieldReader;

/// Morphometric analysis of one otolith.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtolithAnalysisRecord {
    pub specimen_id: String,
    pub species_name: String,
    pub otolith_type: OtolithType,
    pub measurements: OtolithMeasurements,
    pub shape: OtolithShape,
    /// Estimated age in years.
    pub age_estimate: i64,
    pub growth_rings: i64,
    pub capture: CaptureMetadata,
    pub image: ImageMetadata,
    pub analyst: String,
    pub notes: String,
}

/// Which of the three otolith pairs was analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OtolithType {
    #[default]
    Sagitta,
    Lapillus,
    Asteriscus,
}

impl FromStr for OtolithType {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match normalize_code(s).as_str() {
            "sagitta" | "sagittae" => Self::Sagitta,
            "lapillus" | "lapilli" => Self::Lapillus,
            "asteriscus" | "asterisci" => Self::Asteriscus,
            _ => return Err(UnknownCode(s.to_string())),
        })
    }
}

/// Linear measurements (mm, mg, mm²).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtolithMeasurements {
    pub length: f64,
    pub width: f64,
    pub weight: f64,
    pub area: f64,
    pub perimeter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtolithShape {
    pub circularity: f64,
    pub rectangularity: f64,
    pub aspect_ratio: f64,
    pub form_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    pub location: String,
    pub date: DateTime<Utc>,
    pub depth: f64,
    pub fish_length: f64,
    pub fish_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub file_name: String,
    pub magnification: f64,
}

impl OtolithAnalysisRecord {
    pub(crate) fn from_fields(f: &mut FieldReader<'_>) -> Self {
        Self {
            specimen_id: f.identifier("specimenId"),
            species_name: f.text("speciesName"),
            otolith_type: f.choice("otolithType"),
            measurements: OtolithMeasurements {
                length: f.number("measurements.length"),
                width: f.number("measurements.width"),
                weight: f.number("measurements.weight"),
                area: f.number("measurements.area"),
                perimeter: f.number("measurements.perimeter"),
            },
            shape: OtolithShape {
                circularity: f.number("shape.circularity"),
                rectangularity: f.number("shape.rectangularity"),
                aspect_ratio: f.number("shape.aspectRatio"),
                form_factor: f.number("shape.formFactor"),
            },
            age_estimate: f.integer("ageEstimate"),
            growth_rings: f.integer("growthRings"),
            capture: CaptureMetadata {
                location: f.text("capture.location"),
                date: f.timestamp("capture.date"),
                depth: f.number("capture.depth"),
                fish_length: f.number("capture.fishLength"),
                fish_weight: f.number("capture.fishWeight"),
            },
            image: ImageMetadata {
                file_name: f.text("image.fileName"),
                magnification: f.number("image.magnification"),
            },
            analyst: f.text("analyst"),
            notes: f.text("notes"),
        }
    }
}
