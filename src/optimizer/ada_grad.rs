use crate::error::ModelError;
use crate::optimizer::input_validation_function::{validate_epsilon, validate_learning_rate};
use crate::traits::{Layer, Optimizer};
use ndarray::Array2;

/// AdaGrad optimizer.
///
/// Accumulates squared gradients over the whole run and divides the learning
/// rate by their root, so frequently-updated parameters receive smaller
/// steps.
pub struct AdaGrad {
    learning_rate: f32,
    epsilon: f32,
}

impl AdaGrad {
    /// Creates a new AdaGrad optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `learning_rate` - Step size for parameter updates
    /// - `epsilon` - Small constant for numerical stability
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new AdaGrad optimizer instance or an error
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If any hyperparameter is out of range
    pub fn new(learning_rate: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            learning_rate,
            epsilon,
        })
    }
}

impl Optimizer for AdaGrad {
    fn update(&mut self, layer: &mut dyn Layer) {
        layer.update_parameters_ada_grad(self.learning_rate, self.epsilon);
    }
}

/// AdaGrad accumulators for a dense layer's weight matrix and bias vector.
///
/// # Fields
///
/// - `accum` - Sum of squared gradients for the weights
/// - `accum_bias` - Sum of squared gradients for the bias
#[derive(Debug, Clone, Default)]
pub struct AdaGradCache {
    pub accum: Array2<f32>,
    pub accum_bias: Array2<f32>,
}

impl AdaGradCache {
    /// Creates zeroed accumulators for the given parameter shapes.
    pub fn new(weight_dims: (usize, usize), bias_dims: (usize, usize)) -> Self {
        Self {
            accum: Array2::zeros(weight_dims),
            accum_bias: Array2::zeros(bias_dims),
        }
    }

    fn update_param(
        param: &mut Array2<f32>,
        grad: &Array2<f32>,
        accum: &mut Array2<f32>,
        lr: f32,
        epsilon: f32,
    ) {
        *accum = &*accum + &grad.mapv(|x| x * x);
        *param = &*param - &(lr * grad / &(accum.mapv(f32::sqrt) + epsilon));
    }

    /// Updates the weight and bias parameters using the AdaGrad rule.
    pub fn update_parameters(
        &mut self,
        param: &mut Array2<f32>,
        bias_param: &mut Array2<f32>,
        grad: &Array2<f32>,
        bias_grad: &Array2<f32>,
        lr: f32,
        epsilon: f32,
    ) {
        Self::update_param(param, grad, &mut self.accum, lr, epsilon);
        Self::update_param(bias_param, bias_grad, &mut self.accum_bias, lr, epsilon);
    }
}
