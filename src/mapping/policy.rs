//! Alias and fallback tables.
//!
//! A [`MappingPolicy`] maps `(record kind, document path)` to a [`FieldRule`]: the ordered list
//! of source column names accepted for that field and the value used when none of them is
//! present or usable. The mapper reads the policy it is given and nothing else, so the whole
//! alias/default policy can be inspected (or overridden) as data.

use std::collections::{BTreeMap, HashMap};

use crate::config::ConfigError;
use crate::records::RecordKind;

/// What a field resolves to when no alias yields a usable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    /// Floating point literal.
    Number(f64),
    /// Integer literal.
    Integer(i64),
    /// Text literal (also used for enum codes).
    Text(String),
    /// Boolean literal.
    Flag(bool),
    /// Tag list literal.
    Tags(Vec<String>),
    /// The upload's wall-clock time.
    Now,
    /// A synthesized identifier.
    Generated,
}

impl Fallback {
    pub fn text(s: &str) -> Self {
        Fallback::Text(s.to_string())
    }

    pub fn tags(tags: &[&str]) -> Self {
        Fallback::Tags(tags.iter().map(|t| t.to_string()).collect())
    }

    /// The literal as it appears in a stored document. `None` for [`Fallback::Now`] and
    /// [`Fallback::Generated`], which are computed per upload/row.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Fallback::Number(n) => Some(serde_json::json!(n)),
            Fallback::Integer(i) => Some(serde_json::json!(i)),
            Fallback::Text(s) => Some(serde_json::json!(s)),
            Fallback::Flag(b) => Some(serde_json::json!(b)),
            Fallback::Tags(t) => Some(serde_json::json!(t)),
            Fallback::Now | Fallback::Generated => None,
        }
    }
}

/// Aliases and fallback for one document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    /// Dotted document path, e.g. `location.latitude`.
    pub path: String,
    /// Source column names, tried in order.
    pub aliases: Vec<String>,
    pub fallback: Fallback,
}

impl FieldRule {
    pub fn new(path: &str, aliases: &[&str], fallback: Fallback) -> Self {
        Self {
            path: path.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            fallback,
        }
    }
}

/// Alias/fallback tables for every record kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingPolicy {
    rules: HashMap<RecordKind, BTreeMap<String, FieldRule>>,
}

impl MappingPolicy {
    /// A policy with no rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in tables.
    pub fn standard() -> Self {
        let mut policy = Self::empty();
        for (kind, rules) in [
            (RecordKind::Species, species_rules()),
            (RecordKind::Oceanographic, oceanographic_rules()),
            (RecordKind::Edna, edna_rules()),
            (RecordKind::Otolith, otolith_rules()),
        ] {
            for rule in rules {
                policy.insert(kind, rule);
            }
        }
        policy
    }

    /// Add or replace a rule.
    pub fn insert(&mut self, kind: RecordKind, rule: FieldRule) {
        self.rules.entry(kind).or_default().insert(rule.path.clone(), rule);
    }

    /// Look up the rule for `path`.
    pub fn rule(&self, kind: RecordKind, path: &str) -> Option<&FieldRule> {
        self.rules.get(&kind)?.get(path)
    }

    /// Iterate a kind's rules in path order.
    pub fn rules(&self, kind: RecordKind) -> impl Iterator<Item = &FieldRule> {
        self.rules.get(&kind).into_iter().flat_map(|rules| rules.values())
    }

    /// Append aliases to an existing rule. Returns `false` if there is no rule for `path`.
    pub fn add_aliases<I, S>(&mut self, kind: RecordKind, path: &str, aliases: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(rule) = self.rules.get_mut(&kind).and_then(|rules| rules.get_mut(path)) else {
            return false;
        };
        for alias in aliases {
            let alias = alias.into();
            if !rule.aliases.contains(&alias) {
                rule.aliases.push(alias);
            }
        }
        true
    }

    /// Replace the fallback of an existing rule. Returns `false` if there is no rule for `path`.
    pub fn set_fallback(&mut self, kind: RecordKind, path: &str, fallback: Fallback) -> bool {
        match self.rules.get_mut(&kind).and_then(|rules| rules.get_mut(path)) {
            Some(rule) => {
                rule.fallback = fallback;
                true
            }
            None => false,
        }
    }

    /// Apply configured extra aliases, keyed by kind name then document path.
    pub fn with_overrides(
        mut self,
        extra_aliases: &BTreeMap<String, BTreeMap<String, Vec<String>>>,
    ) -> Result<Self, ConfigError> {
        for (kind_name, fields) in extra_aliases {
            let kind: RecordKind = kind_name.parse().map_err(|_| ConfigError::Invalid {
                message: format!("extra_aliases: unknown data type '{kind_name}'"),
            })?;
            for (path, aliases) in fields {
                if !self.add_aliases(kind, path, aliases.iter().cloned()) {
                    return Err(ConfigError::Invalid {
                        message: format!("extra_aliases: '{kind_name}' has no field '{path}'"),
                    });
                }
            }
        }
        Ok(self)
    }
}

fn species_rules() -> Vec<FieldRule> {
    use Fallback::*;
    vec![
        FieldRule::new("speciesId", &["speciesId", "species_id", "SpeciesId", "Species ID"], Generated),
        FieldRule::new(
            "scientificName",
            &["scientificName", "scientific_name", "ScientificName", "Scientific Name"],
            Fallback::text("Unidentified species"),
        ),
        FieldRule::new(
            "commonName",
            &["commonName", "common_name", "CommonName", "Common Name"],
            Fallback::text("Unknown"),
        ),
        FieldRule::new("taxonomy.kingdom", &["kingdom", "Kingdom"], Fallback::text("Animalia")),
        FieldRule::new("taxonomy.phylum", &["phylum", "Phylum"], Fallback::text("Chordata")),
        FieldRule::new("taxonomy.class", &["class", "Class"], Fallback::text("Actinopterygii")),
        FieldRule::new("taxonomy.order", &["order", "Order"], Fallback::text("Unknown")),
        FieldRule::new("taxonomy.family", &["family", "Family"], Fallback::text("Unknown")),
        FieldRule::new("taxonomy.genus", &["genus", "Genus"], Fallback::text("Unknown")),
        FieldRule::new("taxonomy.species", &["species", "Species"], Fallback::text("Unknown")),
        FieldRule::new("habitat", &["habitat", "Habitat", "habitats", "Habitats"], Fallback::tags(&["marine"])),
        FieldRule::new("location.longitude", &["longitude", "Longitude"], Number(0.0)),
        FieldRule::new("location.latitude", &["latitude", "Latitude"], Number(0.0)),
        FieldRule::new(
            "location.name",
            &["locationName", "location_name", "Location Name", "location", "Location"],
            Fallback::text("Unknown"),
        ),
        FieldRule::new("location.depth", &["depth", "Depth"], Number(10.0)),
        FieldRule::new(
            "conservationStatus",
            &["conservationStatus", "conservation_status", "ConservationStatus", "Conservation Status"],
            Fallback::text("LC"),
        ),
        FieldRule::new(
            "marineZone",
            &["marineZone", "marine_zone", "MarineZone", "Marine Zone"],
            Fallback::text("pelagic"),
        ),
        FieldRule::new("characteristics.length", &["length", "Length", "maxLength"], Number(0.0)),
        FieldRule::new("characteristics.weight", &["weight", "Weight", "maxWeight"], Number(0.0)),
        FieldRule::new("characteristics.lifespan", &["lifespan", "Lifespan"], Number(0.0)),
        FieldRule::new("characteristics.diet", &["diet", "Diet"], Fallback::tags(&["unknown"])),
    ]
}

fn oceanographic_rules() -> Vec<FieldRule> {
    use Fallback::*;
    vec![
        FieldRule::new("stationId", &["stationId", "station_id", "StationId", "Station ID"], Generated),
        FieldRule::new("location.longitude", &["longitude", "Longitude"], Number(0.0)),
        FieldRule::new("location.latitude", &["latitude", "Latitude"], Number(0.0)),
        FieldRule::new("location.region", &["region", "Region"], Fallback::text("Unknown region")),
        FieldRule::new("timestamp", &["timestamp", "Timestamp", "date", "Date"], Now),
        FieldRule::new("depth", &["depth", "Depth"], Number(10.0)),
        FieldRule::new("temperature", &["temperature", "Temperature"], Number(25.0)),
        FieldRule::new("salinity", &["salinity", "Salinity"], Number(35.0)),
        FieldRule::new("ph", &["pH", "ph", "PH"], Number(8.1)),
        FieldRule::new(
            "dissolvedOxygen",
            &["dissolvedOxygen", "dissolved_oxygen", "DissolvedOxygen", "Dissolved Oxygen"],
            Number(6.0),
        ),
        FieldRule::new("chlorophyll", &["chlorophyll", "Chlorophyll"], Number(0.5)),
        FieldRule::new("turbidity", &["turbidity", "Turbidity"], Number(1.0)),
        FieldRule::new("nutrients.nitrate", &["nitrate", "Nitrate"], Number(0.0)),
        FieldRule::new("nutrients.phosphate", &["phosphate", "Phosphate"], Number(0.0)),
        FieldRule::new("nutrients.silicate", &["silicate", "Silicate"], Number(0.0)),
        FieldRule::new(
            "current.speed",
            &["currentSpeed", "current_speed", "CurrentSpeed", "Current Speed"],
            Number(0.0),
        ),
        FieldRule::new(
            "current.direction",
            &["currentDirection", "current_direction", "CurrentDirection", "Current Direction"],
            Number(0.0),
        ),
        FieldRule::new("waveHeight", &["waveHeight", "wave_height", "WaveHeight", "Wave Height"], Number(0.0)),
        FieldRule::new(
            "source",
            &["source", "Source", "instrument", "Instrument"],
            Fallback::text("file-upload"),
        ),
    ]
}

fn edna_rules() -> Vec<FieldRule> {
    use Fallback::*;
    vec![
        FieldRule::new("sampleId", &["sampleId", "sample_id", "SampleId", "Sample ID"], Generated),
        FieldRule::new("location.longitude", &["longitude", "Longitude"], Number(0.0)),
        FieldRule::new("location.latitude", &["latitude", "Latitude"], Number(0.0)),
        FieldRule::new(
            "location.siteName",
            &["siteName", "site_name", "SiteName", "Site Name"],
            Fallback::text("Unknown site"),
        ),
        FieldRule::new(
            "location.waterBody",
            &["waterBody", "water_body", "WaterBody", "Water Body"],
            Fallback::text("Unknown"),
        ),
        FieldRule::new(
            "collectionDate",
            &["collectionDate", "collection_date", "CollectionDate", "Collection Date"],
            Now,
        ),
        FieldRule::new("depth", &["depth", "Depth"], Number(10.0)),
        FieldRule::new(
            "sampleVolume",
            &["sampleVolume", "sample_volume", "SampleVolume", "Sample Volume"],
            Number(1.0),
        ),
        FieldRule::new("methods", &["methods", "Methods", "method", "Method"], Fallback::tags(&["metabarcoding"])),
        FieldRule::new(
            "sequencing.totalReads",
            &["totalReads", "total_reads", "TotalReads", "Total Reads"],
            Integer(0),
        ),
        FieldRule::new(
            "sequencing.filteredReads",
            &["filteredReads", "filtered_reads", "FilteredReads", "Filtered Reads"],
            Integer(0),
        ),
        FieldRule::new(
            "diversity.speciesRichness",
            &["speciesRichness", "species_richness", "SpeciesRichness", "Species Richness"],
            Integer(0),
        ),
        FieldRule::new(
            "diversity.shannonIndex",
            &["shannonIndex", "shannon_index", "ShannonIndex", "Shannon Index"],
            Number(0.0),
        ),
        FieldRule::new(
            "diversity.simpsonIndex",
            &["simpsonIndex", "simpson_index", "SimpsonIndex", "Simpson Index"],
            Number(0.0),
        ),
        FieldRule::new("diversity.evenness", &["evenness", "Evenness"], Number(0.0)),
        FieldRule::new("environment.temperature", &["temperature", "Temperature"], Number(25.0)),
        FieldRule::new("environment.salinity", &["salinity", "Salinity"], Number(35.0)),
        FieldRule::new("environment.ph", &["pH", "ph", "PH"], Number(8.1)),
        FieldRule::new(
            "qualityControl.contaminationChecked",
            &["contaminationChecked", "contamination_checked", "ContaminationChecked"],
            Flag(false),
        ),
        FieldRule::new(
            "qualityControl.negativeControlPassed",
            &["negativeControlPassed", "negative_control_passed", "NegativeControlPassed"],
            Flag(false),
        ),
        FieldRule::new(
            "qualityControl.positiveControlPassed",
            &["positiveControlPassed", "positive_control_passed", "PositiveControlPassed"],
            Flag(false),
        ),
        FieldRule::new(
            "analysisDate",
            &["analysisDate", "analysis_date", "AnalysisDate", "Analysis Date"],
            Now,
        ),
        FieldRule::new("analyst", &["analyst", "Analyst", "analyzedBy"], Fallback::text("Unknown")),
    ]
}

fn otolith_rules() -> Vec<FieldRule> {
    use Fallback::*;
    vec![
        FieldRule::new("specimenId", &["specimenId", "specimen_id", "SpecimenId", "Specimen ID"], Generated),
        FieldRule::new(
            "speciesName",
            &["speciesName", "species_name", "SpeciesName", "Species Name", "species", "Species"],
            Fallback::text("Unknown"),
        ),
        FieldRule::new(
            "otolithType",
            &["otolithType", "otolith_type", "OtolithType", "Otolith Type"],
            Fallback::text("sagitta"),
        ),
        FieldRule::new("measurements.length", &["length", "Length"], Number(0.0)),
        FieldRule::new("measurements.width", &["width", "Width"], Number(0.0)),
        FieldRule::new("measurements.weight", &["weight", "Weight"], Number(0.0)),
        FieldRule::new("measurements.area", &["area", "Area"], Number(0.0)),
        FieldRule::new("measurements.perimeter", &["perimeter", "Perimeter"], Number(0.0)),
        FieldRule::new("shape.circularity", &["circularity", "Circularity"], Number(0.0)),
        FieldRule::new("shape.rectangularity", &["rectangularity", "Rectangularity"], Number(0.0)),
        FieldRule::new("shape.aspectRatio", &["aspectRatio", "aspect_ratio", "AspectRatio"], Number(0.0)),
        FieldRule::new("shape.formFactor", &["formFactor", "form_factor", "FormFactor"], Number(0.0)),
        FieldRule::new(
            "ageEstimate",
            &["ageEstimate", "age_estimate", "AgeEstimate", "age", "Age"],
            Integer(0),
        ),
        FieldRule::new(
            "growthRings",
            &["growthRings", "growth_rings", "GrowthRings", "Growth Rings"],
            Integer(0),
        ),
        FieldRule::new(
            "capture.location",
            &["captureLocation", "capture_location", "CaptureLocation", "location", "Location"],
            Fallback::text("Unknown"),
        ),
        FieldRule::new("capture.date", &["captureDate", "capture_date", "CaptureDate", "date", "Date"], Now),
        FieldRule::new(
            "capture.depth",
            &["captureDepth", "capture_depth", "CaptureDepth", "depth", "Depth"],
            Number(10.0),
        ),
        FieldRule::new(
            "capture.fishLength",
            &["fishLength", "fish_length", "FishLength", "Fish Length"],
            Number(0.0),
        ),
        FieldRule::new(
            "capture.fishWeight",
            &["fishWeight", "fish_weight", "FishWeight", "Fish Weight"],
            Number(0.0),
        ),
        FieldRule::new(
            "image.fileName",
            &["imageFile", "image_file", "ImageFile", "image", "Image"],
            Fallback::text(""),
        ),
        FieldRule::new("image.magnification", &["magnification", "Magnification"], Number(1.0)),
        FieldRule::new("analyst", &["analyst", "Analyst", "analyzedBy"], Fallback::text("Unknown")),
        FieldRule::new("notes", &["notes", "Notes", "comments", "Comments"], Fallback::text("")),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{Fallback, MappingPolicy};
    use crate::records::RecordKind;

    #[test]
    fn standard_policy_covers_every_typed_kind() {
        let policy = MappingPolicy::standard();
        assert_eq!(policy.rules(RecordKind::Species).count(), 21);
        assert_eq!(policy.rules(RecordKind::Oceanographic).count(), 19);
        assert_eq!(policy.rules(RecordKind::Edna).count(), 23);
        assert_eq!(policy.rules(RecordKind::Otolith).count(), 23);
        assert_eq!(policy.rules(RecordKind::Genetic).count(), 0);
    }

    #[test]
    fn every_typed_kind_generates_its_identifier() {
        let policy = MappingPolicy::standard();
        for kind in RecordKind::ALL.into_iter().filter(|k| *k != RecordKind::Genetic) {
            let rule = policy.rule(kind, kind.id_field()).unwrap();
            assert_eq!(rule.fallback, Fallback::Generated);
        }
    }

    #[test]
    fn documented_defaults() {
        let policy = MappingPolicy::standard();
        let fallback = |kind, path| policy.rule(kind, path).map(|r| r.fallback.clone());
        assert_eq!(fallback(RecordKind::Species, "location.depth"), Some(Fallback::Number(10.0)));
        assert_eq!(fallback(RecordKind::Oceanographic, "salinity"), Some(Fallback::Number(35.0)));
        assert_eq!(fallback(RecordKind::Species, "conservationStatus"), Some(Fallback::text("LC")));
    }

    #[test]
    fn add_aliases_appends_without_duplicates() {
        let mut policy = MappingPolicy::standard();
        assert!(policy.add_aliases(RecordKind::Oceanographic, "temperature", ["TEMP", "temperature"]));
        let rule = policy.rule(RecordKind::Oceanographic, "temperature").unwrap();
        assert_eq!(rule.aliases, vec!["temperature", "Temperature", "TEMP"]);
        assert!(!policy.add_aliases(RecordKind::Oceanographic, "nope", ["x"]));
    }

    #[test]
    fn overrides_reject_unknown_kinds_and_paths() {
        let mut extra = BTreeMap::new();
        extra.insert(
            "plankton".to_string(),
            BTreeMap::from([("depth".to_string(), vec!["D".to_string()])]),
        );
        assert!(MappingPolicy::standard().with_overrides(&extra).is_err());

        let mut extra = BTreeMap::new();
        extra.insert(
            "species".to_string(),
            BTreeMap::from([("fins".to_string(), vec!["Fins".to_string()])]),
        );
        let err = MappingPolicy::standard().with_overrides(&extra).unwrap_err();
        assert!(err.to_string().contains("no field 'fins'"));
    }
}
