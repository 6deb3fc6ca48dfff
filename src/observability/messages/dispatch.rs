// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for compute dispatch.
//!
//! These cover the CPU/accelerator decision, accelerator failures that are
//! absorbed by the CPU retry, and component failures on the final path.

use crate::errors::FailureClass;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Accelerated path not attempted.
///
/// # Log Level
/// `debug!`
pub struct AcceleratorSkipped<'a> {
    pub component: &'a str,
    pub reason: &'a str,
}

impl Display for AcceleratorSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running '{}' on cpu: {}",
            self.component, self.reason
        )
    }
}

impl StructuredLog for AcceleratorSkipped<'_> {
    fn log(&self) {
        tracing::debug!(
            component = self.component,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("accelerator_skipped", span_name = name, component = self.component)
    }
}

/// Accelerated attempt failed, retrying on CPU.
///
/// # Log Level
/// `warn!` - degraded performance, result still produced
pub struct AcceleratorFallback<'a> {
    pub component: &'a str,
    pub accelerator: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for AcceleratorFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Accelerated execution of '{}' on {} failed, falling back to cpu: {}",
            self.component, self.accelerator, self.error
        )
    }
}

impl StructuredLog for AcceleratorFallback<'_> {
    fn log(&self) {
        tracing::warn!(
            component = self.component,
            accelerator = self.accelerator,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "accelerator_fallback",
            span_name = name,
            component = self.component,
            accelerator = self.accelerator,
        )
    }
}

/// Component entry point failed on its final path.
///
/// # Log Level
/// `error!`
pub struct ComponentFailed<'a> {
    pub component: &'a str,
    pub class: FailureClass,
    pub cause: &'a str,
}

impl Display for ComponentFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.class {
            FailureClass::Library => write!(
                f,
                "Component '{}' raised a library error: {}",
                self.component, self.cause
            ),
            FailureClass::Generic => {
                write!(f, "Component '{}' failed: {}", self.component, self.cause)
            }
        }
    }
}

impl StructuredLog for ComponentFailed<'_> {
    fn log(&self) {
        tracing::error!(
            component = self.component,
            class = %self.class,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("component_failed", span_name = name, component = self.component)
    }
}
