// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Rescaling per-step progress to overall run progress.
//!
//! Step `i` owns the interval `[base_i, base_i + scale_i)` of the overall
//! fraction. A component's own fraction `f` maps to `base_i + f * scale_i`,
//! held just below the interval end until the step has actually finished.
//! Exactly 1.0 is only reported once the last step completes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::ProgressCallback;
use crate::workflow::ProcessingStep;

/// How much of the overall progress each step accounts for.
pub trait StepWeighting: Send + Sync {
    /// Relative weight per step. Only ratios matter.
    fn weights(&self, steps: &[ProcessingStep]) -> Vec<f64>;
}

/// Every step counts the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeighting;

impl StepWeighting for EqualWeighting {
    fn weights(&self, steps: &[ProcessingStep]) -> Vec<f64> {
        vec![1.0; steps.len()]
    }
}

/// Cost-aware weighting by component name.
///
/// Components without an entry weigh `default`.
#[derive(Debug, Clone)]
pub struct FixedWeighting {
    by_component: HashMap<String, f64>,
    default: f64,
}

impl FixedWeighting {
    pub fn new(default: f64) -> Self {
        Self {
            by_component: HashMap::new(),
            default,
        }
    }

    pub fn weight(mut self, component: impl Into<String>, weight: f64) -> Self {
        self.by_component.insert(component.into(), weight);
        self
    }
}

impl Default for FixedWeighting {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl StepWeighting for FixedWeighting {
    fn weights(&self, steps: &[ProcessingStep]) -> Vec<f64> {
        steps
            .iter()
            .map(|step| {
                self.by_component
                    .get(&step.component)
                    .copied()
                    .unwrap_or(self.default)
            })
            .collect()
    }
}

/// Highest fraction reported before the final step completes.
const BEFORE_FINISH: f64 = 1.0 - f64::EPSILON;

/// Interval layout of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPlan {
    bases: Vec<f64>,
    scales: Vec<f64>,
}

impl ProgressPlan {
    /// Normalize `weights`. Unusable weights (negative, non-finite, or all
    /// zero) fall back to equal weighting.
    pub fn from_weights(weights: &[f64]) -> Self {
        let n = weights.len();
        let usable = weights.iter().all(|w| w.is_finite() && *w >= 0.0);
        let total: f64 = weights.iter().sum();

        if !usable || total <= 0.0 {
            if n > 0 {
                tracing::warn!(step_count = n, "Unusable step weights, using equal weighting");
            }
            return Self::equal(n);
        }

        let mut bases = Vec::with_capacity(n);
        let mut cumulative = 0.0;
        for weight in weights {
            bases.push(cumulative / total);
            cumulative += weight;
        }
        let scales = weights.iter().map(|w| w / total).collect();
        Self { bases, scales }
    }

    pub fn equal(step_count: usize) -> Self {
        let n = step_count as f64;
        Self {
            bases: (0..step_count).map(|i| i as f64 / n).collect(),
            scales: vec![1.0 / n; step_count],
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn base(&self, step: usize) -> f64 {
        self.bases.get(step).copied().unwrap_or(1.0)
    }

    /// Overall fraction once `step` has completed. Only the last step ends
    /// at 1.0, even when every step after `step` weighs nothing.
    pub fn end(&self, step: usize) -> f64 {
        match self.bases.get(step + 1) {
            Some(next) => next.min(BEFORE_FINISH),
            None => 1.0,
        }
    }

    /// Overall fraction for a component at `fraction` of `step`.
    pub fn within(&self, step: usize, fraction: f64) -> f64 {
        let scale = self.scales.get(step).copied().unwrap_or(0.0);
        let end = self.end(step);
        let ceiling = end - end * f64::EPSILON;
        (self.base(step) + fraction.clamp(0.0, 1.0) * scale).min(ceiling)
    }
}

struct TrackerState {
    last: f64,
}

/// Sole emitter of overall progress for one run.
///
/// Reports arrive from the blocking pool while the executor awaits; the
/// state lock also serializes delivery, so the callback sees a
/// non-decreasing sequence.
#[derive(Clone)]
pub struct ProgressTracker {
    plan: Arc<ProgressPlan>,
    state: Arc<Mutex<TrackerState>>,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    pub fn new(plan: ProgressPlan, callback: Option<ProgressCallback>) -> Self {
        Self {
            plan: Arc::new(plan),
            state: Arc::new(Mutex::new(TrackerState { last: 0.0 })),
            callback,
        }
    }

    /// Last fraction reported.
    pub fn current(&self) -> f64 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).last
    }

    /// Step-local callback handed to the component running `step`.
    pub fn for_step(&self, step: usize) -> ProgressCallback {
        let tracker = self.clone();
        Arc::new(move |fraction: f64| {
            if fraction.is_nan() {
                return;
            }
            tracker.emit(tracker.plan.within(step, fraction));
        })
    }

    pub fn complete_step(&self, step: usize) {
        self.emit(self.plan.end(step));
    }

    /// Report 1.0; used when a run has no steps.
    pub fn finish(&self) {
        self.emit(1.0);
    }

    fn emit(&self, overall: f64) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if overall < state.last {
            return;
        }
        state.last = overall;
        if let Some(callback) = &self.callback {
            callback(overall);
        }
    }
}
