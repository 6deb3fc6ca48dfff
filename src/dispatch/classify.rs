// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sorting opaque component failures into library and generic buckets.
//!
//! The core never depends on a concrete error hierarchy. Integrations that
//! know their processing library's error type install a [`TypeClassifier`]
//! (or any [`ErrorClassifier`]); without one, every failure is generic.

use std::marker::PhantomData;

use crate::errors::FailureClass;

pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &anyhow::Error) -> FailureClass;
}

/// Everything is generic.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericClassifier;

impl ErrorClassifier for GenericClassifier {
    fn classify(&self, _error: &anyhow::Error) -> FailureClass {
        FailureClass::Generic
    }
}

/// Library failure when any error in the cause chain is an `E`.
pub struct TypeClassifier<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> TypeClassifier<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for TypeClassifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ErrorClassifier for TypeClassifier<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn classify(&self, error: &anyhow::Error) -> FailureClass {
        if error.chain().any(|cause| cause.is::<E>()) {
            FailureClass::Library
        } else {
            FailureClass::Generic
        }
    }
}

/// Adapts a plain function.
pub struct FnClassifier<F>(pub F);

impl<F> ErrorClassifier for FnClassifier<F>
where
    F: Fn(&anyhow::Error) -> FailureClass + Send + Sync,
{
    fn classify(&self, error: &anyhow::Error) -> FailureClass {
        (self.0)(error)
    }
}
