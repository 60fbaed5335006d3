use crate::error::ModelError;
use crate::optimizer::input_validation_function::{
    validate_decay_rate, validate_epsilon, validate_learning_rate,
};
use crate::traits::{Layer, Optimizer};
use ndarray::Array2;

/// Adam optimizer.
///
/// Computes individual adaptive learning rates from estimates of first and
/// second moments of the gradients.
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// Current timestep, incremented with each update
    t: u64,
}

impl Adam {
    /// Creates a new Adam optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `learning_rate` - Step size for parameter updates
    /// - `beta1` - Decay rate for the first moment estimates (typically 0.9)
    /// - `beta2` - Decay rate for the second moment estimates (typically 0.999)
    /// - `epsilon` - Small constant for numerical stability
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new Adam optimizer instance or an error
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If any hyperparameter is out of range
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        validate_decay_rate(beta1, "beta1")?;
        validate_decay_rate(beta2, "beta2")?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
        })
    }
}

impl Optimizer for Adam {
    fn update(&mut self, layer: &mut dyn Layer) {
        self.t += 1;
        layer.update_parameters_adam(self.learning_rate, self.beta1, self.beta2, self.epsilon, self.t);
    }
}

/// Adam moment estimates for a dense layer's weight matrix and bias vector.
///
/// # Fields
///
/// - `m_weights` / `v_weights` - First and second moments for the weights
/// - `m_bias` / `v_bias` - First and second moments for the bias
#[derive(Debug, Clone)]
pub struct AdamStates {
    pub m_weights: Array2<f32>,
    pub v_weights: Array2<f32>,
    pub m_bias: Array2<f32>,
    pub v_bias: Array2<f32>,
}

impl AdamStates {
    /// Creates zeroed moment estimates for the given parameter shapes.
    pub fn new(weight_dims: (usize, usize), bias_dims: (usize, usize)) -> Self {
        Self {
            m_weights: Array2::zeros(weight_dims),
            v_weights: Array2::zeros(weight_dims),
            m_bias: Array2::zeros(bias_dims),
            v_bias: Array2::zeros(bias_dims),
        }
    }

    /// Advances the moment estimates and returns the bias-corrected update
    /// terms for the weights and the bias.
    ///
    /// The caller subtracts the returned terms from its parameters.
    pub fn update(
        &mut self,
        grad_w: &Array2<f32>,
        grad_b: &Array2<f32>,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
        t: u64,
        lr: f32,
    ) -> (Array2<f32>, Array2<f32>) {
        self.m_weights = self.m_weights.mapv(|x| x * beta1) + &(grad_w * (1.0 - beta1));
        self.m_bias = self.m_bias.mapv(|x| x * beta1) + &(grad_b * (1.0 - beta1));

        self.v_weights = self.v_weights.mapv(|x| x * beta2) + &(grad_w.mapv(|x| x * x) * (1.0 - beta2));
        self.v_bias = self.v_bias.mapv(|x| x * beta2) + &(grad_b.mapv(|x| x * x) * (1.0 - beta2));

        let bias_correction1 = 1.0 - beta1.powi(t as i32);
        let bias_correction2 = 1.0 - beta2.powi(t as i32);

        let m_hat_w = self.m_weights.mapv(|x| x / bias_correction1);
        let m_hat_b = self.m_bias.mapv(|x| x / bias_correction1);
        let v_hat_w = self.v_weights.mapv(|x| x / bias_correction2);
        let v_hat_b = self.v_bias.mapv(|x| x / bias_correction2);

        let w_update = lr * &m_hat_w / &(v_hat_w.mapv(f32::sqrt) + epsilon);
        let b_update = lr * &m_hat_b / &(v_hat_b.mapv(f32::sqrt) + epsilon);

        (w_update, b_update)
    }
}
