// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output of the workflow core goes through message types in
//! [`messages`]. Each message is a small struct with a `Display`
//! implementation for the human-readable line and a [`messages::StructuredLog`]
//! implementation that emits it through `tracing` with typed fields.
//!
//! Messages are organized by subsystem:
//! * `messages::registry` - component discovery
//! * `messages::dsl` - workflow text compilation
//! * `messages::dispatch` - CPU/accelerator dispatch and fallback
//! * `messages::engine` - workflow run lifecycle
//!
//! # Usage
//!
//! ```rust
//! use grdk_core::observability::messages::{engine::StepStarted, StructuredLog};
//!
//! StepStarted {
//!     workflow: "sar-despeckle",
//!     step_index: 0,
//!     component: "builtin.Scale",
//! }
//! .log();
//! ```

pub mod messages;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is a
/// no-op for the second call.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
