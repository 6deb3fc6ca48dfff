// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in reference components.
//!
//! Point-wise arithmetic and a centroid-based shift estimate. They give the
//! headless runner and the tests real components to dispatch; actual image
//! processing libraries register their own namespaces.

mod centroid_shift;
mod clip;
mod offset;
mod scale;

pub use centroid_shift::CentroidShift;
pub use clip::Clip;
pub use offset::Offset;
pub use scale::Scale;

use serde_json::json;

use crate::array::ImageArray;
use crate::registry::{ComponentClass, ComponentPlugin, Namespace};
use crate::workflow::{ParameterSpec, Parameters};

pub const BUILTIN_NAMESPACE: &str = "builtin";

const COMPONENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Registers the built-in components into a namespace.
pub struct Builtins;

impl ComponentPlugin for Builtins {
    fn register(namespace: &mut Namespace) {
        namespace
            .register(
                ComponentClass::transform("Scale", Scale)
                    .tags(json!({
                        "modalities": ["PAN", "EO", "MSI", "SAR"],
                        "category": "intensity",
                        "description": "Multiply every sample by a gain factor",
                    }))
                    .parameter(
                        ParameterSpec::float("factor", Some(0.0), None)
                            .with_default(1.0)
                            .describe("Gain applied to every sample"),
                    )
                    .version(COMPONENT_VERSION),
            )
            .register(
                ComponentClass::transform("Offset", Offset)
                    .tags(json!({
                        "category": "intensity",
                        "description": "Add a constant to every sample",
                    }))
                    .parameter(
                        ParameterSpec::float("offset", None, None)
                            .with_default(0.0)
                            .describe("Constant added to every sample"),
                    )
                    .version(COMPONENT_VERSION),
            )
            .register(
                ComponentClass::transform("Clip", Clip)
                    .tags(json!({
                        "category": "intensity",
                        "description": "Clamp samples into [low, high]",
                    }))
                    .parameter(ParameterSpec::float("low", None, None).with_default(0.0))
                    .parameter(ParameterSpec::float("high", None, None).with_default(1.0))
                    .version(COMPONENT_VERSION),
            )
            .register(
                ComponentClass::coregistration("CentroidShift", CentroidShift)
                    .tags(json!({
                        "category": "coregistration",
                        "description": "Row/column shift between intensity centroids",
                    }))
                    .gpu_compatible(false)
                    .version(COMPONENT_VERSION),
            );
    }
}

/// The `builtin` namespace with every reference component registered.
pub fn builtin_namespace() -> Namespace {
    let mut namespace = Namespace::new(BUILTIN_NAMESPACE);
    namespace.install::<Builtins>();
    namespace
}

fn float_param(params: &Parameters, name: &str, default: f64) -> anyhow::Result<f64> {
    match params.get(name) {
        None => Ok(default),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("parameter '{}' must be numeric, got {}", name, value)),
    }
}

/// Apply `f` row by row, reporting progress after each row.
fn pointwise<F>(array: &ImageArray, progress: &dyn Fn(f64), f: F) -> anyhow::Result<ImageArray>
where
    F: Fn(f64) -> f64,
{
    let row_len = match array.shape() {
        [rows, ..] if *rows > 0 => array.len() / rows,
        _ => array.len(),
    }
    .max(1);

    let mut data = Vec::with_capacity(array.len());
    let total = array.len().max(1) as f64;
    for row in array.data().chunks(row_len) {
        data.extend(row.iter().copied().map(&f));
        progress(data.len() as f64 / total);
    }
    if array.is_empty() {
        progress(1.0);
    }

    Ok(ImageArray::new(array.shape().to_vec(), data)?.with_location(array.location()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::scan;

    #[test]
    fn builtin_namespace_registers_every_component() {
        let snapshot = scan(&[builtin_namespace()]);
        let names: Vec<&str> = snapshot.descriptors().iter().map(|d| d.short_name()).collect();

        assert_eq!(names, vec!["CentroidShift", "Clip", "Offset", "Scale"]);
        assert!(snapshot.warnings().is_empty());
        assert!(!snapshot.get("builtin.CentroidShift").unwrap().gpu_compatible());
        assert!(snapshot.get("builtin.Scale").unwrap().gpu_compatible());
    }

    #[test]
    fn pointwise_reports_progress_per_row() {
        let array = ImageArray::new(vec![3, 2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let seen = std::cell::RefCell::new(Vec::new());

        let out = pointwise(&array, &|f: f64| seen.borrow_mut().push(f), |v| -v).unwrap();

        assert_eq!(out.data(), &[-1.0, -2.0, -3.0, -4.0, -5.0, -6.0]);
        assert_eq!(seen.into_inner(), vec![2.0 / 6.0, 4.0 / 6.0, 1.0]);
    }
}
