// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod array;          // image arrays
pub mod components;     // built-in components
pub mod config;         // core config file
pub mod dispatch;       // cpu/accelerator dispatch
pub mod dsl;            // workflow text format
pub mod engine;         // workflow execution
pub mod errors;         // error handling
pub mod headless;       // command-line runs
pub mod observability;
pub mod registry;       // component discovery
pub mod traits;         // unified abstractions
pub mod workflow;       // workflow model
