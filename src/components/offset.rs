// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::array::ImageArray;
use crate::components::{float_param, pointwise};
use crate::traits::Transform;
use crate::workflow::Parameters;

/// Adds `offset` to every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offset;

impl Transform for Offset {
    fn apply(
        &self,
        array: &ImageArray,
        params: &Parameters,
        progress: &dyn Fn(f64),
    ) -> anyhow::Result<ImageArray> {
        let offset = float_param(params, "offset", 0.0)?;
        pointwise(array, progress, |v| v + offset)
    }
}
