// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::array::ImageArray;
use crate::config::consts::DEFAULT_MAX_CONCURRENT_RUNS;
use crate::dispatch::Dispatcher;
use crate::engine::context::{ExecutionContext, ExecutionInput, StepResult};
use crate::engine::progress::{EqualWeighting, ProgressPlan, ProgressTracker, StepWeighting};
use crate::errors::{ExecutionError, FailureClass, ValidationError, ValidationErrors};
use crate::observability::messages::engine::{
    ExecutionCancelled, ExecutionCompleted, ExecutionFailed, ExecutionStarted, StepCompleted,
    StepStarted,
};
use crate::observability::messages::StructuredLog;
use crate::registry::RegistrySnapshot;
use crate::traits::{EntryPoint, ProgressCallback, WorkflowRunner};
use crate::workflow::{ProcessingStep, ResolvedStep, WorkflowBuilder, WorkflowDefinition};

/// How a resolved step is invoked.
enum Call {
    Apply,
    Estimate { reference: Arc<ImageArray> },
}

struct PlannedStep<'a> {
    resolved: ResolvedStep<'a>,
    call: Call,
}

/// Runs workflow steps one after another against a fixed registry snapshot.
///
/// Step `i + 1` starts only after step `i` produced its result. Cancellation is
/// checked before each step; an in-flight component call is never interrupted.
/// The first failing step ends the run.
#[derive(Clone)]
pub struct SequentialExecutor {
    dispatcher: Dispatcher,
    registry: Arc<RegistrySnapshot>,
    weighting: Arc<dyn StepWeighting>,
    max_concurrent_runs: usize,
}

impl SequentialExecutor {
    pub fn new(dispatcher: Dispatcher, registry: Arc<RegistrySnapshot>) -> Self {
        Self {
            dispatcher,
            registry,
            weighting: Arc::new(EqualWeighting),
            max_concurrent_runs: DEFAULT_MAX_CONCURRENT_RUNS,
        }
    }

    pub fn with_weighting(mut self, weighting: Arc<dyn StepWeighting>) -> Self {
        self.weighting = weighting;
        self
    }

    /// Upper bound on runs [`execute_batch`](Self::execute_batch) keeps in flight.
    pub fn with_max_concurrent_runs(mut self, max: usize) -> Self {
        self.max_concurrent_runs = max.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<RegistrySnapshot> {
        &self.registry
    }

    /// Run a single step on its own, e.g. to preview a parameter change.
    pub async fn execute_step(
        &self,
        step: ProcessingStep,
        input: ExecutionInput,
        progress: Option<ProgressCallback>,
    ) -> Result<ExecutionContext, ValidationErrors> {
        let preview = WorkflowBuilder::new(format!("preview:{}", step.component))
            .step(step)
            .build();
        self.execute(Arc::new(preview), input, progress, CancellationToken::new())
            .await
    }

    /// Run `workflow` once per input, each with its own context.
    ///
    /// Runs are independent: a failing input does not stop the others. At most
    /// `max_concurrent_runs` are in flight at once. `progress` receives the mean
    /// fraction over all inputs. Contexts come back in input order.
    pub async fn execute_batch(
        &self,
        workflow: Arc<WorkflowDefinition>,
        inputs: Vec<ExecutionInput>,
        progress: Option<ProgressCallback>,
        cancellation: CancellationToken,
    ) -> Result<Vec<ExecutionContext>, ValidationErrors> {
        for input in &inputs {
            self.plan(&workflow, input)?;
        }

        let count = inputs.len();
        let fractions = Arc::new(Mutex::new(vec![0.0_f64; count]));
        let permits = Arc::new(Semaphore::new(self.max_concurrent_runs));
        let mut handles = Vec::with_capacity(count);

        for (slot, input) in inputs.into_iter().enumerate() {
            let executor = self.clone();
            let workflow = workflow.clone();
            let cancellation = cancellation.clone();
            let permits = permits.clone();
            let item_progress = progress.as_ref().map(|callback| {
                batch_progress(callback.clone(), fractions.clone(), slot)
            });
            let image = input.image.clone();

            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                executor
                    .execute(workflow, input, item_progress, cancellation)
                    .await
            });
            handles.push((handle, image));
        }

        let mut contexts = Vec::with_capacity(count);
        for (handle, image) in handles {
            match handle.await {
                Ok(result) => contexts.push(result?),
                Err(join) => {
                    let mut context = ExecutionContext::new(workflow.clone(), image);
                    context.fail(ExecutionError {
                        step_index: 0,
                        component: workflow.name().to_string(),
                        class: FailureClass::Generic,
                        cause: format!("run did not complete: {}", join),
                    });
                    contexts.push(context);
                }
            }
        }
        Ok(contexts)
    }

    /// Resolve every step and pair coregistration steps with the reference.
    fn plan<'a>(
        &'a self,
        workflow: &WorkflowDefinition,
        input: &ExecutionInput,
    ) -> Result<Vec<PlannedStep<'a>>, ValidationErrors> {
        let resolved = workflow.check(&self.registry)?;

        let mut planned = Vec::with_capacity(resolved.len());
        let mut errors = Vec::new();
        for step in resolved {
            let call = match (step.descriptor.entry_point(), &input.reference) {
                (EntryPoint::Transform(_), _) => Call::Apply,
                (EntryPoint::Coregistration(_), Some(reference)) => Call::Estimate {
                    reference: reference.clone(),
                },
                (EntryPoint::Coregistration(_), None) => {
                    errors.push(ValidationError::MissingReference {
                        step_index: step.index,
                        component: step.descriptor.qualified_name().to_string(),
                    });
                    continue;
                }
            };
            planned.push(PlannedStep {
                resolved: step,
                call,
            });
        }

        if errors.is_empty() {
            Ok(planned)
        } else {
            Err(ValidationErrors(errors))
        }
    }

    async fn run(
        &self,
        workflow: Arc<WorkflowDefinition>,
        steps: Vec<PlannedStep<'_>>,
        input: Arc<ImageArray>,
        tracker: ProgressTracker,
        cancellation: CancellationToken,
    ) -> ExecutionContext {
        let run_started = Instant::now();
        let step_count = steps.len();
        let mut context = ExecutionContext::new(workflow.clone(), input.clone());
        context.start();

        let mut current = input;
        for PlannedStep { resolved, call } in steps {
            if cancellation.is_cancelled() {
                ExecutionCancelled {
                    workflow: workflow.name(),
                    completed_steps: context.results().len(),
                    step_count,
                }
                .log();
                context.cancel();
                return context;
            }

            let index = resolved.index;
            let descriptor = resolved.descriptor;
            let component = descriptor.qualified_name();
            context.begin_step(index);
            StepStarted {
                workflow: workflow.name(),
                step_index: index,
                component,
            }
            .log();

            let step_started = Instant::now();
            let outcome = match call {
                Call::Apply => self
                    .dispatcher
                    .dispatch(
                        descriptor,
                        current.clone(),
                        resolved.parameters,
                        Some(tracker.for_step(index)),
                    )
                    .await
                    .map(|done| (Arc::new(done.output), None, done.device)),
                Call::Estimate { reference } => self
                    .dispatcher
                    .dispatch_estimate(descriptor, reference, current.clone(), resolved.parameters)
                    .await
                    .map(|done| (current.clone(), Some(done.output), done.device)),
            };

            match outcome {
                Ok((output, estimate, device)) => {
                    let elapsed = step_started.elapsed();
                    tracker.complete_step(index);
                    StepCompleted {
                        step_index: index,
                        component,
                        device: device.as_str(),
                        duration: elapsed,
                    }
                    .log();
                    current = output.clone();
                    context.record(
                        StepResult {
                            index,
                            component: component.to_string(),
                            output,
                            estimate,
                            elapsed,
                            device,
                        },
                        tracker.current(),
                    );
                }
                Err(failure) => {
                    let error = ExecutionError {
                        step_index: index,
                        component: component.to_string(),
                        class: failure.class,
                        cause: failure.cause(),
                    };
                    ExecutionFailed {
                        workflow: workflow.name(),
                        step_index: index,
                        error: &error,
                    }
                    .log();
                    context.fail(error);
                    return context;
                }
            }
        }

        if step_count == 0 {
            tracker.finish();
        }
        ExecutionCompleted {
            workflow: workflow.name(),
            step_count,
            duration: run_started.elapsed(),
        }
        .log();
        context.succeed(tracker.current());
        context
    }
}

#[async_trait]
impl WorkflowRunner for SequentialExecutor {
    async fn execute(
        &self,
        workflow: Arc<WorkflowDefinition>,
        input: ExecutionInput,
        progress: Option<ProgressCallback>,
        cancellation: CancellationToken,
    ) -> Result<ExecutionContext, ValidationErrors> {
        let steps = self.plan(&workflow, &input)?;

        let weights = self.weighting.weights(workflow.steps());
        let tracker = ProgressTracker::new(ProgressPlan::from_weights(&weights), progress);

        let started = ExecutionStarted {
            workflow: workflow.name(),
            step_count: steps.len(),
        };
        let span = started.span("execute");
        started.log();

        Ok(self
            .run(workflow.clone(), steps, input.image, tracker, cancellation)
            .instrument(span)
            .await)
    }
}

/// Per-input callback that reports the batch-wide mean.
///
/// The mean is delivered under the `fractions` lock. Releasing it first would
/// let two runs deliver their means out of order, and the batch sequence would
/// no longer be non-decreasing. `callback` therefore must not call back into
/// this batch.
fn batch_progress(
    callback: ProgressCallback,
    fractions: Arc<Mutex<Vec<f64>>>,
    slot: usize,
) -> ProgressCallback {
    Arc::new(move |fraction: f64| {
        let mut fractions = fractions.lock().unwrap_or_else(PoisonError::into_inner);
        fractions[slot] = fraction;
        let mean = fractions.iter().sum::<f64>() / fractions.len() as f64;
        callback(mean);
    })
}
