// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! CPU/accelerator dispatch of component entry points.
//!
//! A component runs on the accelerator when it is GPU-compatible and the
//! process has an available accelerator. Every accelerated failure (upload,
//! invocation or download) is retried on the host, and the returned
//! [`Device`] names the path that actually produced the result.

pub mod accelerator;
pub mod classify;
pub mod dispatcher;

pub use accelerator::{detect, HostOnly};
pub use classify::{ErrorClassifier, FnClassifier, GenericClassifier, TypeClassifier};
pub use dispatcher::{ComponentFailure, Device, Dispatched, Dispatcher};
