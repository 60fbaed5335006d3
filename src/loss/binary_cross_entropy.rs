use crate::Tensor;
use crate::traits::LossFunction;
use ndarray::{Array1, Axis};

/// Binary Cross Entropy loss function for binary classification.
///
/// Predictions are clipped into (0, 1) before the logarithms are taken.
pub struct BinaryCrossEntropy;

impl BinaryCrossEntropy {
    /// Creates a new instance of BinaryCrossEntropy
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for BinaryCrossEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl LossFunction for BinaryCrossEntropy {
    fn compute_sample_losses(&self, y_true: &Tensor, y_pred: &Tensor) -> Array1<f32> {
        let mut y_pred_clipped = y_pred.clone();
        y_pred_clipped.par_mapv_inplace(|x| x.max(1e-7).min(1.0 - 1e-7));

        let n = y_true.shape()[0];
        let mut losses = Array1::zeros(n);

        // Per sample: mean over outputs of -[t*log(p) + (1-t)*log(1-p)]
        for (i, (t_row, p_row)) in y_true
            .axis_iter(Axis(0))
            .zip(y_pred_clipped.axis_iter(Axis(0)))
            .enumerate()
        {
            let width = t_row.len().max(1) as f32;
            losses[i] = -t_row
                .iter()
                .zip(p_row.iter())
                .map(|(&t, &p)| t * p.ln() + (1.0 - t) * (1.0 - p).ln())
                .sum::<f32>()
                / width;
        }

        losses
    }

    fn compute_grad(&self, y_true: &Tensor, y_pred: &Tensor) -> Tensor {
        let mut y_pred_clipped = y_pred.clone();
        y_pred_clipped.par_mapv_inplace(|x| x.max(1e-7).min(1.0 - 1e-7));

        // Gradient: -t/p + (1-t)/(1-p), averaged over every element
        let ones_minus_true = y_true.mapv(|t| 1.0 - t);
        let ones_minus_pred = y_pred_clipped.mapv(|p| 1.0 - p);
        let grad = -(y_true / &y_pred_clipped) + ones_minus_true / ones_minus_pred;

        let n = grad.len() as f32;
        grad / n
    }
}
