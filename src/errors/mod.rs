// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy for the workflow core.
//!
//! Absorbed kinds ([`DiscoveryWarning`], [`DispatchError`]) are logged where
//! they happen. Everything else reaches the caller: [`ParseError`] and
//! [`ValidationError`] before any side effect, [`ExecutionError`] inside the
//! terminal execution context together with the partial results.

mod config;
mod discovery;
mod dsl;
mod execution;
mod validation;
mod workflow;

pub use config::ConfigError;
pub use discovery::DiscoveryWarning;
pub use dsl::{CompileError, ParseError};
pub use execution::{DispatchError, ExecutionError, FailureClass};
pub use validation::{ParameterViolation, ValidationError, ValidationErrors};
pub use workflow::WorkflowError;
