// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Usage Pattern
//!
//! ```rust
//! use grdk_core::observability::messages::{registry::ScanCompleted, StructuredLog};
//!
//! let msg = ScanCompleted {
//!     namespace_count: 2,
//!     component_count: 14,
//!     warning_count: 1,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod dispatch;
pub mod dsl;
pub mod engine;
pub mod registry;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its designated level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
