use crate::Tensor;
use crate::traits::LossFunction;
use ndarray::{Array1, Axis};

/// Mean Absolute Error loss function.
pub struct MeanAbsoluteError;

impl MeanAbsoluteError {
    /// Creates a new instance of MeanAbsoluteError
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for MeanAbsoluteError {
    fn default() -> Self {
        Self::new()
    }
}

impl LossFunction for MeanAbsoluteError {
    fn compute_sample_losses(&self, y_true: &Tensor, y_pred: &Tensor) -> Array1<f32> {
        let n = y_true.shape()[0];
        let mut losses = Array1::zeros(n);

        for (i, (t_row, p_row)) in y_true
            .axis_iter(Axis(0))
            .zip(y_pred.axis_iter(Axis(0)))
            .enumerate()
        {
            let width = t_row.len().max(1) as f32;
            losses[i] = t_row
                .iter()
                .zip(p_row.iter())
                .map(|(&t, &p)| (p - t).abs())
                .sum::<f32>()
                / width;
        }

        losses
    }

    fn compute_grad(&self, y_true: &Tensor, y_pred: &Tensor) -> Tensor {
        let diff = y_pred - y_true;

        // Subgradient of |x|, averaged over every element
        let n = diff.len() as f32;

        let mut result = diff;
        result.par_mapv_inplace(|x| if x == 0.0 { 0.0 } else { x.signum() / n });

        result
    }
}
