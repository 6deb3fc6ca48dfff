// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::array::ImageArray;
use crate::components::{float_param, pointwise};
use crate::traits::Transform;
use crate::workflow::Parameters;

/// Multiplies every sample by `factor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scale;

impl Transform for Scale {
    fn apply(
        &self,
        array: &ImageArray,
        params: &Parameters,
        progress: &dyn Fn(f64),
    ) -> anyhow::Result<ImageArray> {
        let factor = float_param(params, "factor", 1.0)?;
        pointwise(array, progress, |v| v * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::ParamValue;

    #[test]
    fn scales_samples() {
        let array = ImageArray::new(vec![2], vec![1.5, -2.0]).unwrap();
        let params = Parameters::from([("factor".to_string(), ParamValue::Float(2.0))]);

        let out = Scale.apply(&array, &params, &|_: f64| {}).unwrap();

        assert_eq!(out.data(), &[3.0, -4.0]);
    }

    #[test]
    fn rejects_non_numeric_factor() {
        let array = ImageArray::filled(vec![1], 1.0).unwrap();
        let params = Parameters::from([("factor".to_string(), ParamValue::Str("big".to_string()))]);

        assert!(Scale.apply(&array, &params, &|_: f64| {}).is_err());
    }
}
