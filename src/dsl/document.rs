// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Serde shape of the workflow text form.
//!
//! # Example
//! ```yaml
//! name: sar-quicklook
//! version: 0.1.0
//! description: Gain, bias and clamp
//! state: draft
//! tags:
//!   modalities: [SAR]
//! steps:
//!   - component: builtin.Scale
//!     parameters:
//!       factor: 2.0
//!   - component: builtin.Clip
//!     label: clamp
//!     parameters:
//!       low: 0.0
//!       high: 1.0
//! ```
//!
//! Keys the schema does not name are kept in [`WorkflowDocument::metadata`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::workflow::{Parameters, WorkflowState, WorkflowTags};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<WorkflowState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<WorkflowTags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub steps: Vec<StepDocument>,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub parameters: Parameters,
}
