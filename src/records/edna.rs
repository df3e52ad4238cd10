use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::mapping::FieldReader;

/// An environmental DNA sample and its analysis summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdnaAnalysisRecord {
    pub sample_id: String,
    pub location: EdnaLocation,
    pub collection_date: DateTime<Utc>,
    pub depth: f64,
    /// Filtered water volume in litres.
    pub sample_volume: f64,
    pub methods: Vec<String>,
    pub sequencing: EdnaSequencing,
    pub diversity: EdnaDiversity,
    pub environment: EdnaEnvironment,
    pub quality_control: EdnaQualityControl,
    pub analysis_date: DateTime<Utc>,
    pub analyst: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdnaLocation {
    pub longitude: f64,
    pub latitude: f64,
    pub site_name: String,
    pub water_body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdnaSequencing {
    pub total_reads: i64,
    pub filtered_reads: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdnaDiversity {
    pub species_richness: i64,
    pub shannon_index: f64,
    pub simpson_index: f64,
    pub evenness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdnaEnvironment {
    pub temperature: f64,
    pub salinity: f64,
    pub ph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdnaQualityControl {
    pub contamination_checked: bool,
    pub negative_control_passed: bool,
    pub positive_control_passed: bool,
}

impl EdnaAnalysisRecord {
    pub(crate) fn from_fields(f: &mut FieldReader<'_>) -> Self {
        Self {
            sample_id: f.identifier("sampleId"),
            location: EdnaLocation {
                longitude: f.number("location.longitude"),
                latitude: f.number("location.latitude"),
                site_name: f.text("location.siteName"),
                water_body: f.text("location.waterBody"),
            },
            collection_date: f.timestamp("collectionDate"),
            depth: f.number("depth"),
            sample_volume: f.number("sampleVolume"),
            methods: f.tags("methods"),
            sequencing: EdnaSequencing {
                total_reads: f.integer("sequencing.totalReads"),
                filtered_reads: f.integer("sequencing.filteredReads"),
            },
            diversity: EdnaDiversity {
                species_richness: f.integer("diversity.speciesRichness"),
                shannon_index: f.number("diversity.shannonIndex"),
                simpson_index: f.number("diversity.simpsonIndex"),
                evenness: f.number("diversity.evenness"),
            },
            environment: EdnaEnvironment {
                temperature: f.number("environment.temperature"),
                salinity: f.number("environment.salinity"),
                ph: f.number("environment.ph"),
            },
            quality_control: EdnaQualityControl {
                contamination_checked: f.flag("qualityControl.contaminationChecked"),
                negative_control_passed: f.flag("qualityControl.negativeControlPassed"),
                positive_control_passed: f.flag("qualityControl.positiveControlPassed"),
            },
            analysis_date: f.timestamp("analysisDate"),
            analyst: f.text("analyst"),
        }
    }
}
