// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::array::ImageArray;
use crate::errors::DispatchError;

/// Process-wide accelerator runtime.
///
/// The dispatcher does not serialize access. If the underlying runtime needs
/// single-writer discipline, the implementation must enforce it itself;
/// callers running several workflows concurrently on one accelerator rely on
/// that.
pub trait Accelerator: Send + Sync {
    /// Name used in logs, e.g. `"cuda:0"`.
    fn name(&self) -> &str;

    /// Whether an accelerator can be used in this process right now.
    fn is_available(&self) -> bool;

    /// Copy a host array into accelerator memory.
    fn to_device(&self, array: &ImageArray) -> Result<ImageArray, DispatchError>;

    /// Copy an accelerator-resident array back to host memory.
    fn to_host(&self, array: ImageArray) -> Result<ImageArray, DispatchError>;
}
