// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::array::ImageArray;
use crate::errors::DispatchError;
use crate::traits::Accelerator;

/// Stand-in for processes without an accelerator runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostOnly;

impl Accelerator for HostOnly {
    fn name(&self) -> &str {
        "host"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn to_device(&self, _array: &ImageArray) -> Result<ImageArray, DispatchError> {
        Err(DispatchError::TransferIn {
            accelerator: self.name().to_string(),
            reason: "no accelerator runtime in this process".to_string(),
        })
    }

    fn to_host(&self, array: ImageArray) -> Result<ImageArray, DispatchError> {
        Ok(array)
    }
}

/// Pick the process accelerator.
///
/// With `prefer` set, the first available candidate wins. Otherwise, or when
/// none is available, dispatch stays on the host.
pub fn detect<I>(prefer: bool, candidates: I) -> Arc<dyn Accelerator>
where
    I: IntoIterator<Item = Arc<dyn Accelerator>>,
{
    if !prefer {
        tracing::debug!("Accelerator disabled by configuration");
        return Arc::new(HostOnly);
    }

    match candidates.into_iter().find(|candidate| candidate.is_available()) {
        Some(accelerator) => {
            tracing::info!(accelerator = accelerator.name(), "Using accelerator");
            accelerator
        }
        None => {
            tracing::debug!("No accelerator available, dispatching on cpu");
            Arc::new(HostOnly)
        }
    }
}
