use crate::Tensor;
use crate::traits::LossFunction;
use ndarray::{Array1, Axis};

/// Mean Squared Error loss function.
///
/// # Example
///
/// ```rust
/// use layerstack::loss::MeanSquaredError;
/// use layerstack::traits::LossFunction;
/// use ndarray::ArrayD;
///
/// let mse = MeanSquaredError::new();
///
/// let y_true = ArrayD::from_shape_vec(vec![3, 1], vec![1.0, 2.0, 3.0]).unwrap();
/// let y_pred = ArrayD::from_shape_vec(vec![3, 1], vec![1.1, 2.2, 2.8]).unwrap();
///
/// let loss = mse.compute_loss(&y_true, &y_pred);
/// let gradients = mse.compute_grad(&y_true, &y_pred);
/// ```
pub struct MeanSquaredError;

impl MeanSquaredError {
    /// Creates a new instance of MeanSquaredError
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for MeanSquaredError {
    fn default() -> Self {
        Self::new()
    }
}

impl LossFunction for MeanSquaredError {
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
                .map(|(&t, &p)| (p - t) * (p - t))
                .sum::<f32>()
                / width;
        }

        losses
    }

    fn compute_grad(&self, y_true: &Tensor, y_pred: &Tensor) -> Tensor {
        let diff = y_pred - y_true;

        // Gradient is 2 times the difference, averaged over every element
        let n = diff.len() as f32;

        let mut result = diff;
        result.par_mapv_inplace(|x| 2.0 * x / n);

        result
    }
}
