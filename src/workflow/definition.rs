// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::errors::{ValidationErrors, WorkflowError};
use crate::registry::tags::MODALITY;
use crate::registry::{RegistrySnapshot, Resolution};
use crate::workflow::params::{ParamValue, Parameters};
use crate::workflow::step::ProcessingStep;
use crate::workflow::tags::{ImageModality, WorkflowTags};
use crate::workflow::validation::{resolve_steps, ResolvedStep};

pub const DEFAULT_VERSION: &str = "0.1.0";

/// Top-level document keys owned by the definition's own fields. They are
/// never stored as opaque metadata.
pub const RESERVED_KEYS: [&str; 8] = [
    "name",
    "version",
    "description",
    "state",
    "tags",
    "created",
    "modified",
    "steps",
];

/// Lifecycle of a workflow definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    #[default]
    Draft,
    Validated,
    Published,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Draft => write!(f, "draft"),
            WorkflowState::Validated => write!(f, "validated"),
            WorkflowState::Published => write!(f, "published"),
        }
    }
}

/// An ordered, named sequence of processing steps.
///
/// Step order is execution order. A published definition is immutable; edit
/// a copy from [`WorkflowDefinition::clone_as_draft`] instead. Any successful
/// edit of a validated definition returns it to draft, since validation only
/// holds for the steps it saw.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDefinition {
    name: String,
    version: String,
    description: String,
    state: WorkflowState,
    tags: WorkflowTags,
    steps: Vec<ProcessingStep>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    metadata: BTreeMap<String, serde_yaml::Value>,
}

impl WorkflowDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            version: DEFAULT_VERSION.to_string(),
            description: String::new(),
            state: WorkflowState::Draft,
            tags: WorkflowTags::default(),
            steps: Vec::new(),
            created: now,
            modified: now,
            metadata: BTreeMap::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        name: String,
        version: String,
        description: String,
        state: WorkflowState,
        tags: WorkflowTags,
        steps: Vec<ProcessingStep>,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
        metadata: BTreeMap<String, serde_yaml::Value>,
    ) -> Self {
        Self {
            name,
            version,
            description,
            state,
            tags,
            steps,
            created,
            modified,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn tags(&self) -> &WorkflowTags {
        &self.tags
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&ProcessingStep> {
        self.steps.get(index)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Document keys this crate does not interpret, kept for round trips.
    pub fn metadata(&self) -> &BTreeMap<String, serde_yaml::Value> {
        &self.metadata
    }

    pub fn add_step(&mut self, step: ProcessingStep) -> Result<usize, WorkflowError> {
        self.begin_edit()?;
        self.steps.push(step);
        Ok(self.steps.len() - 1)
    }

    pub fn insert_step(&mut self, index: usize, step: ProcessingStep) -> Result<(), WorkflowError> {
        self.check_editable()?;
        if index > self.steps.len() {
            return Err(self.out_of_range(index));
        }
        self.begin_edit()?;
        self.steps.insert(index, step);
        Ok(())
    }

    pub fn remove_step(&mut self, index: usize) -> Result<ProcessingStep, WorkflowError> {
        self.check_index(index)?;
        self.begin_edit()?;
        Ok(self.steps.remove(index))
    }

    /// Move the step at `from` so that it ends up at index `to`.
    pub fn move_step(&mut self, from: usize, to: usize) -> Result<(), WorkflowError> {
        self.check_index(from)?;
        self.check_index(to)?;
        self.begin_edit()?;
        let step = self.steps.remove(from);
        self.steps.insert(to, step);
        Ok(())
    }

    pub fn update_step(&mut self, index: usize, step: ProcessingStep) -> Result<ProcessingStep, WorkflowError> {
        self.check_index(index)?;
        self.begin_edit()?;
        Ok(std::mem::replace(&mut self.steps[index], step))
    }

    pub fn set_parameter(
        &mut self,
        index: usize,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Result<(), WorkflowError> {
        self.check_index(index)?;
        self.begin_edit()?;
        self.steps[index].parameters.insert(name.into(), value.into());
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), WorkflowError> {
        self.begin_edit()?;
        self.name = name.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), WorkflowError> {
        self.begin_edit()?;
        self.description = description.into();
        Ok(())
    }

    pub fn set_version(&mut self, version: impl Into<String>) -> Result<(), WorkflowError> {
        self.begin_edit()?;
        self.version = version.into();
        Ok(())
    }

    pub fn set_tags(&mut self, tags: WorkflowTags) -> Result<(), WorkflowError> {
        self.begin_edit()?;
        self.tags = tags;
        Ok(())
    }

    /// Check every step against `snapshot` without changing state.
    pub fn check<'a>(&self, snapshot: &'a RegistrySnapshot) -> Result<Vec<ResolvedStep<'a>>, ValidationErrors> {
        resolve_steps(&self.steps, snapshot)
    }

    /// Validate against `snapshot`; a draft that passes becomes validated.
    ///
    /// Reports every failing step, not just the first.
    pub fn validate(&mut self, snapshot: &RegistrySnapshot) -> Result<(), ValidationErrors> {
        self.check(snapshot)?;
        if self.state == WorkflowState::Draft {
            self.state = WorkflowState::Validated;
        }
        Ok(())
    }

    /// Freeze a validated definition.
    ///
    /// Empty modality tags are derived from the modalities the steps'
    /// components declare.
    pub fn publish(&mut self, snapshot: &RegistrySnapshot) -> Result<(), WorkflowError> {
        if self.state != WorkflowState::Validated {
            return Err(WorkflowError::NotValidated {
                name: self.name.clone(),
                state: self.state,
            });
        }

        if self.tags.modalities.is_empty() {
            let derived: BTreeSet<ImageModality> = self
                .steps
                .iter()
                .filter_map(|step| match snapshot.resolve(&step.component) {
                    Resolution::Found(descriptor) => Some(descriptor),
                    _ => None,
                })
                .flat_map(|descriptor| descriptor.tags().values(MODALITY))
                .filter_map(|value| value.parse().ok())
                .collect();
            self.tags.modalities = derived.into_iter().collect();
        }

        self.state = WorkflowState::Published;
        self.modified = Utc::now();
        Ok(())
    }

    /// Editable copy with fresh timestamps.
    pub fn clone_as_draft(&self) -> Self {
        let now = Utc::now();
        Self {
            state: WorkflowState::Draft,
            created: now,
            modified: now,
            ..self.clone()
        }
    }

    /// Parameters of every step, in step order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameters> {
        self.steps.iter().map(|step| &step.parameters)
    }

    fn check_editable(&self) -> Result<(), WorkflowError> {
        if self.state == WorkflowState::Published {
            return Err(WorkflowError::Published {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), WorkflowError> {
        self.check_editable()?;
        if index >= self.steps.len() {
            return Err(self.out_of_range(index));
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> WorkflowError {
        WorkflowError::StepOutOfRange {
            index,
            len: self.steps.len(),
        }
    }

    fn begin_edit(&mut self) -> Result<(), WorkflowError> {
        self.check_editable()?;
        self.state = WorkflowState::Draft;
        self.modified = Utc::now();
        Ok(())
    }
}
