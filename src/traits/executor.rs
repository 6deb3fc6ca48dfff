// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::engine::{ExecutionContext, ExecutionInput};
use crate::errors::ValidationErrors;
use crate::traits::ProgressCallback;
use crate::workflow::WorkflowDefinition;

#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    /// Run `workflow` against `input`.
    ///
    /// - `progress`: receives the overall fraction, non-decreasing, ending at
    ///   exactly 1.0 on success
    /// - `cancellation`: checked before each step begins
    ///
    /// Returns `Err` only when the workflow does not validate; nothing has
    /// executed in that case. Every other outcome, including component
    /// failures and cancellation, is a terminal [`ExecutionContext`].
    async fn execute(
        &self,
        workflow: Arc<WorkflowDefinition>,
        input: ExecutionInput,
        progress: Option<ProgressCallback>,
        cancellation: CancellationToken,
    ) -> Result<ExecutionContext, ValidationErrors>;
}
