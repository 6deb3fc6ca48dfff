// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability interface for processing components.
//!
//! Components are authored outside this crate. A component is either a
//! [`Transform`] (array in, array out) or a [`Coregistration`] (two arrays in,
//! transform parameters out). Failures are opaque `anyhow::Error`s; the
//! dispatcher classifies them.

use std::fmt;
use std::sync::Arc;

use crate::array::{ImageArray, TransformParameters};
use crate::workflow::Parameters;

/// Progress sink shared between the executor and a running component.
///
/// Receives a fraction in `[0.0, 1.0]`. Must be cheap and non-blocking; it may
/// be called from a worker thread. The executor delivers values while holding
/// its progress lock so that they arrive in order, so a callback must not
/// block on another run's progress or re-enter the executor.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Image-to-image processing step, the `apply` entry point.
pub trait Transform: Send + Sync {
    /// Run the transform. `array` may be host or accelerator resident; an
    /// implementation that cannot handle accelerator memory should return an
    /// error so the dispatcher retries on the host.
    fn apply(
        &self,
        array: &ImageArray,
        params: &Parameters,
        progress: &dyn Fn(f64),
    ) -> anyhow::Result<ImageArray>;
}

/// Reference/target alignment, the `estimate` entry point.
pub trait Coregistration: Send + Sync {
    fn estimate(
        &self,
        reference: &ImageArray,
        target: &ImageArray,
        params: &Parameters,
    ) -> anyhow::Result<TransformParameters>;
}

/// The callable a component exposes.
#[derive(Clone)]
pub enum EntryPoint {
    Transform(Arc<dyn Transform>),
    Coregistration(Arc<dyn Coregistration>),
}

impl EntryPoint {
    pub fn transform<T: Transform + 'static>(transform: T) -> Self {
        EntryPoint::Transform(Arc::new(transform))
    }

    pub fn coregistration<C: Coregistration + 'static>(coregistration: C) -> Self {
        EntryPoint::Coregistration(Arc::new(coregistration))
    }

    /// Entry-point name as published in component descriptors.
    pub fn name(&self) -> &'static str {
        match self {
            EntryPoint::Transform(_) => "apply",
            EntryPoint::Coregistration(_) => "estimate",
        }
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryPoint({})", self.name())
    }
}
