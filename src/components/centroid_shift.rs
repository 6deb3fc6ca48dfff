// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::array::{ImageArray, TransformParameters};
use crate::traits::Coregistration;
use crate::workflow::Parameters;

/// Estimates the translation between two images from their intensity
/// centroids. Produces `row_shift` and `col_shift` (target minus reference).
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidShift;

impl Coregistration for CentroidShift {
    fn estimate(
        &self,
        reference: &ImageArray,
        target: &ImageArray,
        _params: &Parameters,
    ) -> anyhow::Result<TransformParameters> {
        let (ref_row, ref_col) = centroid(reference)?;
        let (tgt_row, tgt_col) = centroid(target)?;

        Ok(TransformParameters::from([
            ("row_shift".to_string(), tgt_row - ref_row),
            ("col_shift".to_string(), tgt_col - ref_col),
        ]))
    }
}

fn centroid(array: &ImageArray) -> anyhow::Result<(f64, f64)> {
    let (rows, cols) = array
        .rows_cols()
        .ok_or_else(|| anyhow::anyhow!("expected a 2-D image, got shape {:?}", array.shape()))?;
    let plane = rows * cols;
    if plane == 0 {
        anyhow::bail!("cannot locate the centroid of an empty image");
    }

    let (mut mass, mut row_sum, mut col_sum) = (0.0, 0.0, 0.0);
    for (i, value) in array.data().iter().take(plane).enumerate() {
        let weight = value.abs();
        mass += weight;
        row_sum += weight * (i / cols) as f64;
        col_sum += weight * (i % cols) as f64;
    }
    if mass == 0.0 {
        anyhow::bail!("image has no intensity to locate");
    }
    Ok((row_sum / mass, col_sum / mass))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(rows: usize, cols: usize, at: (usize, usize)) -> ImageArray {
        let mut data = vec![0.0; rows * cols];
        data[at.0 * cols + at.1] = 1.0;
        ImageArray::new(vec![rows, cols], data).unwrap()
    }

    #[test]
    fn measures_translation() {
        let shift = CentroidShift
            .estimate(&spot(4, 4, (1, 1)), &spot(4, 4, (3, 2)), &Parameters::new())
            .unwrap();

        assert_eq!(shift["row_shift"], 2.0);
        assert_eq!(shift["col_shift"], 1.0);
    }

    #[test]
    fn rejects_unusable_images() {
        let flat = ImageArray::filled(vec![4], 1.0).unwrap();
        let dark = ImageArray::filled(vec![2, 2], 0.0).unwrap();
        let ok = spot(2, 2, (0, 0));

        assert!(CentroidShift.estimate(&flat, &ok, &Parameters::new()).is_err());
        assert!(CentroidShift.estimate(&dark, &ok, &Parameters::new()).is_err());
    }
}
