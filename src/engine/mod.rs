// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Workflow execution.
//!
//! [`SequentialExecutor`] is the [`WorkflowRunner`](crate::traits::WorkflowRunner)
//! implementation: it re-validates a definition against its registry
//! snapshot, then runs the steps in order through the
//! [`Dispatcher`](crate::dispatch::Dispatcher), rescaling component progress
//! to overall progress and stopping at the first failure or at a cancellation
//! observed between steps.

pub mod context;
pub mod progress;
pub mod sequential;


pub use context::{ExecutionContext, ExecutionInput, RunStatus, StepResult};
pub use progress::{EqualWeighting, FixedWeighting, ProgressPlan, ProgressTracker, StepWeighting};
pub use sequential::SequentialExecutor;
