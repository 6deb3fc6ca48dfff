// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::array::{ImageArray, TransformParameters};
use crate::dispatch::accelerator::HostOnly;
use crate::dispatch::classify::{ErrorClassifier, GenericClassifier};
use crate::errors::{DispatchError, FailureClass};
use crate::observability::messages::dispatch::{
    AcceleratorFallback, AcceleratorSkipped, ComponentFailed,
};
use crate::observability::messages::StructuredLog;
use crate::registry::ComponentDescriptor;
use crate::traits::{Accelerator, Coregistration, EntryPoint, ProgressCallback, Transform};
use crate::workflow::Parameters;

/// Execution path that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Accelerator,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Accelerator => "accelerator",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A result and the path that actually produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched<T> {
    pub output: T,
    pub device: Device,
}

/// Failure of a component on its final (CPU) path.
#[derive(Debug)]
pub struct ComponentFailure {
    pub class: FailureClass,
    pub error: anyhow::Error,
}

impl ComponentFailure {
    /// Human-readable cause chain.
    pub fn cause(&self) -> String {
        format!("{:#}", self.error)
    }
}

impl fmt::Display for ComponentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {:#}", self.class, self.error)
    }
}

/// Runs component entry points on the accelerator when possible and on the
/// host otherwise.
///
/// Entry points run on tokio's blocking pool. An accelerated attempt that
/// fails in any way is logged and retried on the host with the same inputs;
/// only the host failure can reach the caller.
#[derive(Clone)]
pub struct Dispatcher {
    accelerator: Arc<dyn Accelerator>,
    classifier: Arc<dyn ErrorClassifier>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::cpu_only()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("accelerator", &self.accelerator.name())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(accelerator: Arc<dyn Accelerator>, classifier: Arc<dyn ErrorClassifier>) -> Self {
        Self {
            accelerator,
            classifier,
        }
    }

    pub fn cpu_only() -> Self {
        Self::new(Arc::new(HostOnly), Arc::new(GenericClassifier))
    }

    pub fn with_accelerator(mut self, accelerator: Arc<dyn Accelerator>) -> Self {
        self.accelerator = accelerator;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn accelerator(&self) -> &dyn Accelerator {
        self.accelerator.as_ref()
    }

    /// Run a transform component's `apply`.
    pub async fn dispatch(
        &self,
        descriptor: &ComponentDescriptor,
        array: Arc<ImageArray>,
        params: Parameters,
        progress: Option<ProgressCallback>,
    ) -> Result<Dispatched<ImageArray>, ComponentFailure> {
        let component = descriptor.qualified_name();
        let transform = match descriptor.entry_point() {
            EntryPoint::Transform(transform) => transform.clone(),
            EntryPoint::Coregistration(_) => {
                return Err(self.fail(
                    component,
                    anyhow::anyhow!("'{}' exposes 'estimate', not 'apply'", component),
                ))
            }
        };
        let params = Arc::new(params);

        if self.should_accelerate(descriptor) {
            match self
                .apply_accelerated(transform.clone(), array.clone(), params.clone(), progress.clone())
                .await
            {
                Ok(output) => {
                    return Ok(Dispatched {
                        output,
                        device: Device::Accelerator,
                    })
                }
                Err(error) => self.log_fallback(component, &error),
            }
        }

        let output = run_blocking(move || {
            transform.apply(&array, &params, &|fraction: f64| report(&progress, fraction))
        })
        .await
        .map_err(|error| self.fail(component, error))?;

        Ok(Dispatched {
            output,
            device: Device::Cpu,
        })
    }

    /// Run a coregistration component's `estimate`.
    pub async fn dispatch_estimate(
        &self,
        descriptor: &ComponentDescriptor,
        reference: Arc<ImageArray>,
        target: Arc<ImageArray>,
        params: Parameters,
    ) -> Result<Dispatched<TransformParameters>, ComponentFailure> {
        let component = descriptor.qualified_name();
        let coregistration = match descriptor.entry_point() {
            EntryPoint::Coregistration(coregistration) => coregistration.clone(),
            EntryPoint::Transform(_) => {
                return Err(self.fail(
                    component,
                    anyhow::anyhow!("'{}' exposes 'apply', not 'estimate'", component),
                ))
            }
        };
        let params = Arc::new(params);

        if self.should_accelerate(descriptor) {
            match self
                .estimate_accelerated(
                    coregistration.clone(),
                    reference.clone(),
                    target.clone(),
                    params.clone(),
                )
                .await
            {
                Ok(output) => {
                    return Ok(Dispatched {
                        output,
                        device: Device::Accelerator,
                    })
                }
                Err(error) => self.log_fallback(component, &error),
            }
        }

        let output = run_blocking(move || coregistration.estimate(&reference, &target, &params))
            .await
            .map_err(|error| self.fail(component, error))?;

        Ok(Dispatched {
            output,
            device: Device::Cpu,
        })
    }

    fn should_accelerate(&self, descriptor: &ComponentDescriptor) -> bool {
        let reason = if !descriptor.gpu_compatible() {
            "component is not gpu-compatible"
        } else if !self.accelerator.is_available() {
            "no accelerator available"
        } else {
            return true;
        };

        AcceleratorSkipped {
            component: descriptor.qualified_name(),
            reason,
        }
        .log();
        false
    }

    async fn apply_accelerated(
        &self,
        transform: Arc<dyn Transform>,
        array: Arc<ImageArray>,
        params: Arc<Parameters>,
        progress: Option<ProgressCallback>,
    ) -> Result<ImageArray, DispatchError> {
        let accelerator = self.accelerator.clone();
        tokio::task::spawn_blocking(move || {
            let on_device = accelerator.to_device(&array)?;
            let result = transform
                .apply(&on_device, &params, &|fraction: f64| report(&progress, fraction))
                .map_err(DispatchError::Invocation)?;
            accelerator.to_host(result)
        })
        .await
        .map_err(|join| DispatchError::Join(join.to_string()))?
    }

    async fn estimate_accelerated(
        &self,
        coregistration: Arc<dyn Coregistration>,
        reference: Arc<ImageArray>,
        target: Arc<ImageArray>,
        params: Arc<Parameters>,
    ) -> Result<TransformParameters, DispatchError> {
        let accelerator = self.accelerator.clone();
        tokio::task::spawn_blocking(move || {
            let reference = accelerator.to_device(&reference)?;
            let target = accelerator.to_device(&target)?;
            coregistration
                .estimate(&reference, &target, &params)
                .map_err(DispatchError::Invocation)
        })
        .await
        .map_err(|join| DispatchError::Join(join.to_string()))?
    }

    fn log_fallback(&self, component: &str, error: &DispatchError) {
        AcceleratorFallback {
            component,
            accelerator: self.accelerator.name(),
            error,
        }
        .log();
    }

    fn fail(&self, component: &str, error: anyhow::Error) -> ComponentFailure {
        let failure = ComponentFailure {
            class: self.classifier.classify(&error),
            error,
        };
        ComponentFailed {
            component,
            class: failure.class,
            cause: &failure.cause(),
        }
        .log();
        failure
    }
}

fn report(progress: &Option<ProgressCallback>, fraction: f64) {
    if let Some(callback) = progress {
        callback(fraction);
    }
}

async fn run_blocking<T, F>(work: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|join| Err(anyhow::Error::new(join).context("component task did not complete")))
}
