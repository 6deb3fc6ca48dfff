// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::array::{ImageArray, TransformParameters};
use crate::dispatch::Device;
use crate::errors::ExecutionError;
use crate::workflow::WorkflowDefinition;

/// Data a run starts from.
///
/// `reference` is only needed by workflows containing coregistration steps;
/// those estimate the alignment of the running image against it.
#[derive(Debug, Clone)]
pub struct ExecutionInput {
    pub image: Arc<ImageArray>,
    pub reference: Option<Arc<ImageArray>>,
}

impl ExecutionInput {
    pub fn new(image: ImageArray) -> Self {
        Self {
            image: Arc::new(image),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: ImageArray) -> Self {
        self.reference = Some(Arc::new(reference));
        self
    }
}

impl From<ImageArray> for ExecutionInput {
    fn from(image: ImageArray) -> Self {
        Self::new(image)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Cancelled
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Outcome of one completed step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub index: usize,
    pub component: String,
    /// Array handed to the next step. Coregistration steps pass their input
    /// through unchanged.
    pub output: Arc<ImageArray>,
    /// Alignment estimated by a coregistration step.
    pub estimate: Option<TransformParameters>,
    pub elapsed: Duration,
    pub device: Device,
}

/// State of one workflow run.
///
/// Owned by exactly one run; the executor is its only writer. Once the status
/// is terminal the context is handed back to the caller and never changes
/// again.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    workflow: Arc<WorkflowDefinition>,
    input: Arc<ImageArray>,
    status: RunStatus,
    progress: f64,
    current_step: Option<usize>,
    results: Vec<StepResult>,
    failure: Option<ExecutionError>,
}

impl ExecutionContext {
    pub(crate) fn new(workflow: Arc<WorkflowDefinition>, input: Arc<ImageArray>) -> Self {
        Self {
            workflow,
            input,
            status: RunStatus::Pending,
            progress: 0.0,
            current_step: None,
            results: Vec::new(),
            failure: None,
        }
    }

    pub fn workflow(&self) -> &WorkflowDefinition {
        &self.workflow
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Step running now, or the step the run stopped at.
    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn failure(&self) -> Option<&ExecutionError> {
        self.failure.as_ref()
    }

    pub fn failed_step(&self) -> Option<usize> {
        self.failure.as_ref().map(|f| f.step_index)
    }

    /// Output of the last completed step; the input when no step completed.
    pub fn final_output(&self) -> Arc<ImageArray> {
        self.results
            .last()
            .map(|r| r.output.clone())
            .unwrap_or_else(|| self.input.clone())
    }

    pub(crate) fn start(&mut self) {
        self.status = RunStatus::Running;
    }

    pub(crate) fn begin_step(&mut self, index: usize) {
        self.current_step = Some(index);
    }

    pub(crate) fn record(&mut self, result: StepResult, progress: f64) {
        self.results.push(result);
        self.progress = progress;
    }

    pub(crate) fn succeed(&mut self, progress: f64) {
        self.progress = progress;
        self.status = RunStatus::Succeeded;
    }

    pub(crate) fn fail(&mut self, error: ExecutionError) {
        self.current_step = Some(error.step_index);
        self.failure = Some(error);
        self.status = RunStatus::Failed;
    }

    pub(crate) fn cancel(&mut self) {
        self.status = RunStatus::Cancelled;
    }
}
