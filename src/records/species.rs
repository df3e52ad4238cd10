use std::str::FromStr;

use serde::Serialize;

use super::{normalize_code, UnknownCode};
use crate::mapping::FieldReader;

/// A species / biodiversity record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesRecord {
    pub species_id: String,
    pub scientific_name: String,
    pub common_name: String,
    pub taxonomy: Taxonomy,
    pub habitat: Vec<String>,
    pub location: SpeciesLocation,
    pub conservation_status: ConservationStatus,
    pub marine_zone: MarineZone,
    pub characteristics: Characteristics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Taxonomy {
    pub kingdom: String,
    pub phylum: String,
    pub class: String,
    pub order: String,
    pub family: String,
    pub genus: String,
    pub species: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesLocation {
    pub longitude: f64,
    pub latitude: f64,
    pub name: String,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Characteristics {
    pub length: f64,
    pub weight: f64,
    pub lifespan: f64,
    pub diet: Vec<String>,
}

/// IUCN Red List category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ConservationStatus {
    #[serde(rename = "EX")]
    Extinct,
    #[serde(rename = "EW")]
    ExtinctInTheWild,
    #[serde(rename = "CR")]
    CriticallyEndangered,
    #[serde(rename = "EN")]
    Endangered,
    #[serde(rename = "VU")]
    Vulnerable,
    #[serde(rename = "NT")]
    NearThreatened,
    #[default]
    #[serde(rename = "LC")]
    LeastConcern,
    #[serde(rename = "DD")]
    DataDeficient,
    #[serde(rename = "NE")]
    NotEvaluated,
}

impl FromStr for ConservationStatus {
    type Err = UnknownCode;

    /// Accepts the two-letter code or the full category name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match normalize_code(s).as_str() {
            "ex" | "extinct" => Self::Extinct,
            "ew" | "extinct-in-the-wild" => Self::ExtinctInTheWild,
            "cr" | "critically-endangered" => Self::CriticallyEndangered,
            "en" | "endangered" => Self::Endangered,
            "vu" | "vulnerable" => Self::Vulnerable,
            "nt" | "near-threatened" => Self::NearThreatened,
            "lc" | "least-concern" => Self::LeastConcern,
            "dd" | "data-deficient" => Self::DataDeficient,
            "ne" | "not-evaluated" => Self::NotEvaluated,
            _ => return Err(UnknownCode(s.to_string())),
        })
    }
}

/// Marine zone the species is primarily found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarineZone {
    #[default]
    Pelagic,
    Benthic,
    Coastal,
    Reef,
    DeepSea,
    Estuarine,
    Intertidal,
}

impl FromStr for MarineZone {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match normalize_code(s).as_str() {
            "pelagic" => Self::Pelagic,
            "benthic" => Self::Benthic,
            "coastal" => Self::Coastal,
            "reef" => Self::Reef,
            "deep-sea" | "deepsea" => Self::DeepSea,
            "estuarine" => Self::Estuarine,
            "intertidal" => Self::Intertidal,
            _ => return Err(UnknownCode(s.to_string())),
        })
    }
}

impl SpeciesRecord {
    pub(crate) fn from_fields(f: &mut FieldReader<'_>) -> Self {
        Self {
            species_id: f.identifier("speciesId"),
            scientific_name: f.text("scientificName"),
            common_name: f.text("commonName"),
            taxonomy: Taxonomy {
                kingdom: f.text("taxonomy.kingdom"),
                phylum: f.text("taxonomy.phylum"),
                class: f.text("taxonomy.class"),
                order: f.text("taxonomy.order"),
                family: f.text("taxonomy.family"),
                genus: f.text("taxonomy.genus"),
                species: f.text("taxonomy.species"),
            },
            habitat: f.tags("habitat"),
            location: SpeciesLocation {
                longitude: f.number("location.longitude"),
                latitude: f.number("location.latitude"),
                name: f.text("location.name"),
                depth: f.number("location.depth"),
            },
            conservation_status: f.choice("conservationStatus"),
            marine_zone: f.choice("marineZone"),
            characteristics: Characteristics {
                length: f.number("characteristics.length"),
                weight: f.number("characteristics.weight"),
                lifespan: f.number("characteristics.lifespan"),
                diet: f.tags("characteristics.diet"),
            },
        }
    }
}
