use crate::Tensor;
use crate::traits::LossFunction;
use ndarray::{Array1, Axis};

/// Categorical Cross Entropy loss function for multi-class classification.
///
/// Targets must be one-hot encoded along the last axis.
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    /// Creates a new instance of CategoricalCrossEntropy
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for CategoricalCrossEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl LossFunction for CategoricalCrossEntropy {
    fn compute_sample_losses(&self, y_true: &Tensor, y_pred: &Tensor) -> Array1<f32> {
        // Keep predictions in a numerically stable range to avoid log(0)
        let y_pred_clipped = y_pred.mapv(|x| x.max(1e-7).min(1.0 - 1e-7));

        let n = y_true.shape()[0];
        let mut losses = Array1::zeros(n);

        // Multi-class cross entropy per sample: -Σ[y_true * log(y_pred)]
        for (i, (t_row, p_row)) in y_true
            .axis_iter(Axis(0))
            .zip(y_pred_clipped.axis_iter(Axis(0)))
            .enumerate()
        {
            losses[i] = -t_row
                .iter()
                .zip(p_row.iter())
                .map(|(&t, &p)| t * p.ln())
                .sum::<f32>();
        }

        losses
    }

    fn compute_grad(&self, y_true: &Tensor, y_pred: &Tensor) -> Tensor {
        let y_pred_clipped = y_pred.mapv(|x| x.max(1e-7).min(1.0 - 1e-7));

        // Gradient of the mean loss: -y_true / y_pred, divided by sample count
        let grad = -(y_true / &y_pred_clipped);

        let n = y_true.shape()[0] as f32;
        grad / n
    }
}
