// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Image arrays exchanged between the executor, the dispatcher and components.
//!
//! The core never interprets pixel values. An [`ImageArray`] is a dense,
//! row-major block of `f64` samples plus its shape and the memory it currently
//! lives in. Accelerator implementations flip [`MemoryLocation`] when they move
//! an array across the host boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Where an array's samples currently reside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryLocation {
    #[default]
    Host,
    Accelerator,
}

/// Shape that does not describe the supplied samples.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("shape {shape:?} describes {expected} samples but {actual} were supplied")]
    Mismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("shape {shape:?} describes more samples than fit in memory")]
    Overflow { shape: Vec<usize> },
}

/// Sample count described by `shape`.
fn sample_count(shape: &[usize]) -> Result<usize, ShapeError> {
    shape
        .iter()
        .try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
        .ok_or_else(|| ShapeError::Overflow {
            shape: shape.to_vec(),
        })
}

/// Dense n-dimensional sample block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawImageArray")]
pub struct ImageArray {
    shape: Vec<usize>,
    data: Vec<f64>,
    #[serde(default, skip_serializing)]
    location: MemoryLocation,
}

#[derive(Deserialize)]
struct RawImageArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl TryFrom<RawImageArray> for ImageArray {
    type Error = ShapeError;

    fn try_from(raw: RawImageArray) -> Result<Self, Self::Error> {
        ImageArray::new(raw.shape, raw.data)
    }
}

impl ImageArray {
    /// Build a host-resident array, checking that `shape` covers `data` exactly.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, ShapeError> {
        let expected = sample_count(&shape)?;
        if expected != data.len() {
            return Err(ShapeError::Mismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape,
            data,
            location: MemoryLocation::Host,
        })
    }

    /// Array of the given shape filled with `value`.
    pub fn filled(shape: Vec<usize>, value: f64) -> Result<Self, ShapeError> {
        let len = sample_count(&shape)?;
        Ok(Self {
            shape,
            data: vec![value; len],
            location: MemoryLocation::Host,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn location(&self) -> MemoryLocation {
        self.location
    }

    /// Same samples, relabelled as living in `location`.
    pub fn with_location(mut self, location: MemoryLocation) -> Self {
        self.location = location;
        self
    }

    /// Apply `f` to every sample, keeping shape and location.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            shape: self.shape.clone(),
            data: self.data.iter().copied().map(f).collect(),
            location: self.location,
        }
    }

    /// Row/column dimensions of the leading two axes, if the array has them.
    pub fn rows_cols(&self) -> Option<(usize, usize)> {
        match self.shape.as_slice() {
            [rows, cols, ..] => Some((*rows, *cols)),
            _ => None,
        }
    }
}

/// Named parameters produced by a coregistration `estimate` call.
pub type TransformParameters = BTreeMap<String, f64>;
