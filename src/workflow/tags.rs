// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Controlled vocabulary for tagging workflows in the catalog.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Input image modality. A workflow's modalities are all required (AND).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageModality {
    Pan,
    Sar,
    Msi,
    Hsi,
    Ir,
    Eo,
    Lidar,
    Fmv,
}

impl FromStr for ImageModality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PAN" => Ok(ImageModality::Pan),
            "SAR" => Ok(ImageModality::Sar),
            "MSI" => Ok(ImageModality::Msi),
            "HSI" => Ok(ImageModality::Hsi),
            "IR" => Ok(ImageModality::Ir),
            "EO" => Ok(ImageModality::Eo),
            "LIDAR" => Ok(ImageModality::Lidar),
            "FMV" => Ok(ImageModality::Fmv),
            other => Err(format!("unknown image modality '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionType {
    PhenomenonSignature,
    Characterization,
    Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationType {
    Instance,
    Semantic,
    Panoptic,
}

/// Catalog tags carried by a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowTags {
    pub modalities: Vec<ImageModality>,
    /// Minimum and maximum NIIRS quality the workflow is rated for.
    pub niirs_range: (f64, f64),
    pub day_capable: bool,
    pub night_capable: bool,
    pub detection_types: Vec<DetectionType>,
    pub segmentation_types: Vec<SegmentationType>,
}

impl Default for WorkflowTags {
    fn default() -> Self {
        Self {
            modalities: Vec::new(),
            niirs_range: (0.0, 9.0),
            day_capable: true,
            night_capable: false,
            detection_types: Vec::new(),
            segmentation_types: Vec::new(),
        }
    }
}

impl WorkflowTags {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_uses_catalog_spelling() {
        let tags = WorkflowTags {
            modalities: vec![ImageModality::Sar, ImageModality::Lidar],
            detection_types: vec![DetectionType::PhenomenonSignature],
            ..WorkflowTags::default()
        };
        let yaml = serde_yaml::to_string(&tags).unwrap();
        assert!(yaml.contains("- SAR"));
        assert!(yaml.contains("- LIDAR"));
        assert!(yaml.contains("phenomenon_signature"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let tags: WorkflowTags = serde_yaml::from_str("night_capable: true").unwrap();
        assert!(tags.night_capable);
        assert!(tags.day_capable);
        assert_eq!(tags.niirs_range, (0.0, 9.0));
    }

    #[test]
    fn modality_parse_is_case_insensitive() {
        assert_eq!("sar".parse::<ImageModality>(), Ok(ImageModality::Sar));
        assert!("radio".parse::<ImageModality>().is_err());
    }
}
