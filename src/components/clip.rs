// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::array::ImageArray;
use crate::components::{float_param, pointwise};
use crate::traits::Transform;
use crate::workflow::Parameters;

/// Clamps samples into `[low, high]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clip;

impl Transform for Clip {
    fn apply(
        &self,
        array: &ImageArray,
        params: &Parameters,
        progress: &dyn Fn(f64),
    ) -> anyhow::Result<ImageArray> {
        let low = float_param(params, "low", 0.0)?;
        let high = float_param(params, "high", 1.0)?;
        if low > high {
            anyhow::bail!("clip bounds are inverted: low {} > high {}", low, high);
        }
        pointwise(array, progress, |v| v.clamp(low, high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::ParamValue;

    fn bounds(low: f64, high: f64) -> Parameters {
        Parameters::from([
            ("low".to_string(), ParamValue::Float(low)),
            ("high".to_string(), ParamValue::Float(high)),
        ])
    }

    #[test]
    fn clamps_into_bounds() {
        let array = ImageArray::new(vec![4], vec![-5.0, 0.5, 2.0, 9.0]).unwrap();
        let out = Clip.apply(&array, &bounds(0.0, 2.0), &|_: f64| {}).unwrap();
        assert_eq!(out.data(), &[0.0, 0.5, 2.0, 2.0]);
    }

    #[test]
    fn inverted_bounds_fail() {
        let array = ImageArray::filled(vec![1], 1.0).unwrap();
        let error = Clip.apply(&array, &bounds(3.0, 1.0), &|_: f64| {}).unwrap_err();
        assert!(error.to_string().contains("inverted"));
    }
}
