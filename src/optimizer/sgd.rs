use crate::error::ModelError;
use crate::optimizer::input_validation_function::validate_learning_rate;
use crate::traits::{Layer, Optimizer};

/// Stochastic Gradient Descent (SGD) optimizer.
///
/// Updates parameters in the direction of the negative gradient, scaled by
/// the learning rate.
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    /// Creates a new SGD optimizer with the specified learning rate.
    ///
    /// # Parameters
    ///
    /// - `learning_rate` - Step size for parameter updates
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new SGD optimizer instance or an error
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the learning rate is out of range
    pub fn new(learning_rate: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;

        Ok(Self { learning_rate })
    }
}

impl Optimizer for SGD {
    fn update(&mut self, layer: &mut dyn Layer) {
        layer.update_parameters_sgd(self.learning_rate);
    }
}
