// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Code-side authoring of workflows.
//!
//! The builder yields the same plain-data [`WorkflowDefinition`] the text
//! form compiles into. The direction is one-way: compiled text never turns
//! back into builder calls.
//!
//! ```rust
//! use grdk_core::workflow::{step, WorkflowBuilder, WorkflowState};
//!
//! let workflow = WorkflowBuilder::new("sar-quicklook")
//!     .description("Gain then clip")
//!     .step(step("builtin.Scale").param("factor", 2.0))
//!     .step(step("builtin.Clip").label("clamp").param("low", 0.0).param("high", 1.0))
//!     .build();
//!
//! assert_eq!(workflow.step_count(), 2);
//! assert_eq!(workflow.state(), WorkflowState::Draft);
//! ```

use std::collections::BTreeMap;

use crate::workflow::definition::{
    WorkflowDefinition, WorkflowState, DEFAULT_VERSION, RESERVED_KEYS,
};
use crate::workflow::params::{ParamValue, Parameters};
use crate::workflow::step::ProcessingStep;
use crate::workflow::tags::{ImageModality, WorkflowTags};

/// Start describing a step that runs `component`.
pub fn step(component: impl Into<String>) -> StepBuilder {
    StepBuilder::new(component)
}

#[derive(Debug, Clone)]
pub struct StepBuilder {
    step: ProcessingStep,
}

impl StepBuilder {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            step: ProcessingStep::new(component),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.step.label = Some(label.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.step.version = Some(version.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.step.parameters.insert(name.into(), value.into());
        self
    }

    pub fn params(mut self, parameters: Parameters) -> Self {
        self.step.parameters.extend(parameters);
        self
    }

    pub fn build(self) -> ProcessingStep {
        self.step
    }
}

impl From<StepBuilder> for ProcessingStep {
    fn from(builder: StepBuilder) -> Self {
        builder.build()
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowBuilder {
    name: String,
    version: String,
    description: String,
    tags: WorkflowTags,
    steps: Vec<ProcessingStep>,
    metadata: BTreeMap<String, serde_yaml::Value>,
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: DEFAULT_VERSION.to_string(),
            description: String::new(),
            tags: WorkflowTags::default(),
            steps: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tags(mut self, tags: WorkflowTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn modality(mut self, modality: ImageModality) -> Self {
        if !self.tags.modalities.contains(&modality) {
            self.tags.modalities.push(modality);
        }
        self
    }

    pub fn step(mut self, step: impl Into<ProcessingStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Attach an opaque top-level key. Keys in [`RESERVED_KEYS`] name real
    /// definition fields and are ignored with a warning.
    pub fn metadata(mut self, key: impl Into<String>, value: serde_yaml::Value) -> Self {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, workflow = %self.name, "Ignoring metadata key reserved for a workflow field");
            return self;
        }
        self.metadata.insert(key, value);
        self
    }

    /// A draft definition stamped with the current time.
    pub fn build(self) -> WorkflowDefinition {
        let now = chrono::Utc::now();
        WorkflowDefinition::from_parts(
            self.name,
            self.version,
            self.description,
            WorkflowState::Draft,
            self.tags,
            self.steps,
            now,
            now,
            self.metadata,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_manual_construction_agree() {
        let built = WorkflowBuilder::new("w")
            .step(step("builtin.Offset").label("bias").param("offset", -0.5))
            .build();

        let mut manual = WorkflowDefinition::new("w");
        let mut offset = ProcessingStep::new("builtin.Offset");
        offset.label = Some("bias".to_string());
        offset.parameters.insert("offset".to_string(), ParamValue::Float(-0.5));
        manual.add_step(offset).unwrap();

        assert_eq!(built.steps(), manual.steps());
        assert_eq!(built.name(), manual.name());
        assert_eq!(built.version(), DEFAULT_VERSION);
    }

    #[test]
    fn modality_is_deduplicated() {
        let built = WorkflowBuilder::new("w")
            .modality(ImageModality::Sar)
            .modality(ImageModality::Sar)
            .build();
        assert_eq!(built.tags().modalities, vec![ImageModality::Sar]);
    }

    #[test]
    fn reserved_metadata_keys_are_ignored() {
        let mut builder = WorkflowBuilder::new("w")
            .metadata("author", serde_yaml::Value::String("ops".to_string()));
        for key in RESERVED_KEYS {
            builder = builder.metadata(key, serde_yaml::Value::String("shadow".to_string()));
        }
        let built = builder.build();

        assert_eq!(built.name(), "w");
        assert_eq!(built.metadata().len(), 1);
        assert!(built.metadata().contains_key("author"));
    }
}
