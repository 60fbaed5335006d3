use crate::error::ModelError;
use crate::optimizer::input_validation_function::{
    validate_decay_rate, validate_epsilon, validate_learning_rate,
};
use crate::traits::{Layer, Optimizer};
use ndarray::Array2;

/// RMSprop (Root Mean Square Propagation) optimizer.
///
/// Adapts per-parameter learning rates using a moving average of squared
/// gradients.
pub struct RMSprop {
    learning_rate: f32,
    rho: f32,
    epsilon: f32,
}

impl RMSprop {
    /// Creates a new RMSprop optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `learning_rate` - Step size for parameter updates
    /// - `rho` - Decay rate for the moving average of squared gradients (typically 0.9)
    /// - `epsilon` - Small constant for numerical stability
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new RMSprop optimizer instance or an error
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If any hyperparameter is out of range
    pub fn new(learning_rate: f32, rho: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        validate_decay_rate(rho, "rho")?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            learning_rate,
            rho,
            epsilon,
        })
    }
}

impl Optimizer for RMSprop {
    fn update(&mut self, layer: &mut dyn Layer) {
        layer.update_parameters_rmsprop(self.learning_rate, self.rho, self.epsilon);
    }
}

/// RMSprop moving averages for a dense layer's weight matrix and bias vector.
///
/// # Fields
///
/// - `cache` - Moving average of squared gradients for the weights
/// - `bias` - Moving average of squared gradients for the bias
#[derive(Debug, Clone, Default)]
pub struct RMSpropCache {
    pub cache: Array2<f32>,
    pub bias: Array2<f32>,
}

impl RMSpropCache {
    /// Creates zeroed moving averages for the given parameter shapes.
    pub fn new(weight_dims: (usize, usize), bias_dims: (usize, usize)) -> Self {
        Self {
            cache: Array2::zeros(weight_dims),
            bias: Array2::zeros(bias_dims),
        }
    }

    /// Updates a parameter and its RMSprop cache in place.
    pub fn update_param(
        param: &mut Array2<f32>,
        grad: &Array2<f32>,
        cache: &mut Array2<f32>,
        rho: f32,
        lr: f32,
        epsilon: f32,
    ) {
        *cache = cache.mapv(|x| x * rho) + &(grad.mapv(|x| x * x) * (1.0 - rho));
        *param = &*param - &(lr * grad / &(cache.mapv(f32::sqrt) + epsilon));
    }

    /// Updates the weight and bias parameters using the RMSprop rule.
    pub fn update_parameters(
        &mut self,
        param: &mut Array2<f32>,
        bias_param: &mut Array2<f32>,
        grad: &Array2<f32>,
        bias_grad: &Array2<f32>,
        rho: f32,
        lr: f32,
        epsilon: f32,
    ) {
        Self::update_param(param, grad, &mut self.cache, rho, lr, epsilon);
        Self::update_param(bias_param, bias_grad, &mut self.bias, rho, lr, epsilon);
    }
}
