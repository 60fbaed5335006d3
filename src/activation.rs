use crate::error::ModelError;
use ndarray::{Array2, Axis, Zip};
use std::str::FromStr;

/// Activation function kinds supported by `Dense` and the standalone
/// `Activation` layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    ReLU,
    Sigmoid,
    Tanh,
    Softmax,
    Linear,
}

impl ActivationKind {
    /// The canonical lowercase name of the activation function.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationKind::ReLU => "relu",
            ActivationKind::Sigmoid => "sigmoid",
            ActivationKind::Tanh => "tanh",
            ActivationKind::Softmax => "softmax",
            ActivationKind::Linear => "linear",
        }
    }

    /// Forward application of the activation function.
    ///
    /// # Parameters
    ///
    /// - `z` - Pre-activation tensor with shape (batch_size, width)
    ///
    /// # Returns
    ///
    /// - `Array2<f32>` - A new tensor with the activation function applied
    pub fn apply(&self, z: &Array2<f32>) -> Array2<f32> {
        use rayon::prelude::*;

        match self {
            ActivationKind::ReLU => {
                let mut result = z.clone();
                result.par_mapv_inplace(|x| if x > 0.0 { x } else { 0.0 });
                result
            }
            ActivationKind::Sigmoid => {
                let mut result = z.clone();
                result.par_mapv_inplace(|x| 1.0 / (1.0 + (-x).exp()));
                result
            }
            ActivationKind::Tanh => {
                let mut result = z.clone();
                result.par_mapv_inplace(|x| x.tanh());
                result
            }
            ActivationKind::Softmax => {
                let mut out = z.clone();

                if out.nrows() > 8 {
                    out.axis_iter_mut(Axis(0))
                        .into_par_iter()
                        .for_each(|mut row| {
                            let max_val = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                            row.mapv_inplace(|x| (x - max_val).exp());
                            let sum = row.sum();
                            row.mapv_inplace(|x| x / sum);
                        });
                } else {
                    for mut row in out.outer_iter_mut() {
                        let max_val = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                        row.map_inplace(|x| *x = (*x - max_val).exp());
                        let sum = row.sum();
                        row.map_inplace(|x| *x /= sum);
                    }
                }
                out
            }
            ActivationKind::Linear => z.clone(),
        }
    }

    /// Derivative of the activation function, expressed in terms of the
    /// activated output.
    ///
    /// For Softmax the full Jacobian is handled separately in
    /// [`ActivationKind::softmax_backward`]; here it degenerates to ones.
    ///
    /// # Parameters
    ///
    /// - `activation_output` - The output after the activation has been applied
    ///
    /// # Returns
    ///
    /// - `Array2<f32>` - A tensor containing the derivative values
    pub fn derivative(&self, activation_output: &Array2<f32>) -> Array2<f32> {
        match self {
            ActivationKind::ReLU => activation_output.mapv(|x| if x > 0.0 { 1.0 } else { 0.0 }),
            ActivationKind::Sigmoid => activation_output.mapv(|a| a * (1.0 - a)),
            ActivationKind::Tanh => activation_output.mapv(|a| 1.0 - a * a),
            ActivationKind::Softmax | ActivationKind::Linear => {
                Array2::ones(activation_output.dim())
            }
        }
    }

    /// Backward propagation through a softmax activation.
    ///
    /// For each row computes
    /// `new_grad[i] = a[i] * (upstream[i] - sum_j(a[j] * upstream[j]))`.
    ///
    /// # Parameters
    ///
    /// - `a` - The output of the softmax activation
    /// - `upstream` - The gradient flowing from the next layer
    ///
    /// # Returns
    ///
    /// - `Array2<f32>` - The gradient with respect to the softmax input
    pub fn softmax_backward(a: &Array2<f32>, upstream: &Array2<f32>) -> Array2<f32> {
        let mut result = Array2::<f32>::zeros(a.raw_dim());

        Zip::from(result.axis_iter_mut(Axis(0)))
            .and(a.axis_iter(Axis(0)))
            .and(upstream.axis_iter(Axis(0)))
            .par_for_each(|mut out_row, a_row, up_row| {
                let dot = a_row
                    .iter()
                    .zip(up_row.iter())
                    .map(|(&ai, &gi)| ai * gi)
                    .sum::<f32>();

                for (j, r) in out_row.iter_mut().enumerate() {
                    *r = a_row[j] * (up_row[j] - dot);
                }
            });

        result
    }
}

impl FromStr for ActivationKind {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "relu" => Ok(ActivationKind::ReLU),
            "sigmoid" => Ok(ActivationKind::Sigmoid),
            "tanh" => Ok(ActivationKind::Tanh),
            "softmax" => Ok(ActivationKind::Softmax),
            "linear" => Ok(ActivationKind::Linear),
            other => Err(ModelError::ConfigError(format!(
                "unknown activation function name: {}",
                other
            ))),
        }
    }
}
