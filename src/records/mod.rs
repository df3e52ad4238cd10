//! Target record shapes.
//!
//! Each [`RecordKind`] names one target collection. Four kinds have a typed record produced by
//! [`crate::mapping`]; genetic sequences are persisted as the raw [`Row`].

mod edna;
mod oceanographic;
mod otolith;
mod species;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::error::IngestionError;
use crate::types::Row;

pub use edna::{
    EdnaAnalysisRecord, EdnaDiversity, EdnaEnvironment, EdnaLocation, EdnaQualityControl, EdnaSequencing,
};
pub use oceanographic::{Current, Nutrients, OceanographicLocation, OceanographicReading};
pub use otolith::{
    CaptureMetadata, ImageMetadata, OtolithAnalysisRecord, OtolithMeasurements, OtolithShape, OtolithType,
};
pub use species::{Characteristics, ConservationStatus, MarineZone, SpeciesLocation, SpeciesRecord, Taxonomy};

/// The closed set of upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Species / biodiversity records.
    Species,
    /// Oceanographic water-quality readings.
    Oceanographic,
    /// Environmental DNA analyses.
    Edna,
    /// Otolith (fish ear-stone) analyses.
    Otolith,
    /// Genetic sequences (raw passthrough).
    Genetic,
}

impl RecordKind {
    /// Every kind, in declaration order.
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Species,
        RecordKind::Oceanographic,
        RecordKind::Edna,
        RecordKind::Otolith,
        RecordKind::Genetic,
    ];

    /// The `dataType` string that selects this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Species => "species",
            RecordKind::Oceanographic => "oceanographic",
            RecordKind::Edna => "edna",
            RecordKind::Otolith => "otolith",
            RecordKind::Genetic => "genetic",
        }
    }

    /// Target collection name.
    pub fn collection(self) -> &'static str {
        match self {
            RecordKind::Species => "species",
            RecordKind::Oceanographic => "oceanographic_data",
            RecordKind::Edna => "edna_analyses",
            RecordKind::Otolith => "otolith_analyses",
            RecordKind::Genetic => "genetic_sequences",
        }
    }

    /// Document field that must be unique within the collection.
    pub fn id_field(self) -> &'static str {
        match self {
            RecordKind::Species => "speciesId",
            RecordKind::Oceanographic => "stationId",
            RecordKind::Edna => "sampleId",
            RecordKind::Otolith => "specimenId",
            RecordKind::Genetic => "sequenceId",
        }
    }

    /// Prefix for synthesized identifiers. Genetic rows are never given one.
    pub fn id_prefix(self) -> Option<&'static str> {
        match self {
            RecordKind::Species => Some("SPC"),
            RecordKind::Oceanographic => Some("STN"),
            RecordKind::Edna => Some("EDNA"),
            RecordKind::Otolith => Some("OTO"),
            RecordKind::Genetic => None,
        }
    }

    /// Top-level document fields a store must find present and non-blank.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            RecordKind::Species => &["speciesId", "scientificName"],
            RecordKind::Oceanographic => &["stationId", "timestamp"],
            RecordKind::Edna => &["sampleId", "collectionDate"],
            RecordKind::Otolith => &["specimenId", "speciesName"],
            RecordKind::Genetic => &["sequenceId", "sequence"],
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = IngestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| IngestionError::UnknownKind { kind: s.to_string() })
    }
}

/// A row transformed into one of the target shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MappedRecord {
    Species(SpeciesRecord),
    Oceanographic(OceanographicReading),
    Edna(EdnaAnalysisRecord),
    Otolith(OtolithAnalysisRecord),
    Genetic(Row),
}

impl MappedRecord {
    /// Kind of the record.
    pub fn kind(&self) -> RecordKind {
        match self {
            MappedRecord::Species(_) => RecordKind::Species,
            MappedRecord::Oceanographic(_) => RecordKind::Oceanographic,
            MappedRecord::Edna(_) => RecordKind::Edna,
            MappedRecord::Otolith(_) => RecordKind::Otolith,
            MappedRecord::Genetic(_) => RecordKind::Genetic,
        }
    }

    /// Identifier value, if the record carries one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            MappedRecord::Species(r) => Some(&r.species_id),
            MappedRecord::Oceanographic(r) => Some(&r.station_id),
            MappedRecord::Edna(r) => Some(&r.sample_id),
            MappedRecord::Otolith(r) => Some(&r.specimen_id),
            MappedRecord::Genetic(row) => match row.get("sequenceId") {
                Some(crate::types::Value::Utf8(s)) => Some(s),
                _ => None,
            },
        }
    }

    /// Serialize into the document handed to a [`crate::persistence::DocumentStore`].
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// A code string that does not name any variant of a code enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised code '{0}'")]
pub struct UnknownCode(pub String);

/// Lowercase a code and treat `_` and spaces as `-`.
pub(crate) fn normalize_code(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}
