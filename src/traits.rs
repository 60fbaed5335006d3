use crate::Tensor;
use crate::error::ModelError;
use crate::layer::{LayerWeight, TrainingParameters};
use ndarray::Array1;

/// Defines the interface for neural network layers.
///
/// This trait provides the core functionality that all layers must
/// implement: shape resolution, forward and backward propagation, and
/// parameter updates for the supported optimization algorithms.
pub trait Layer: std::any::Any + Send + Sync {
    /// Resolves the layer against the incoming width and allocates
    /// parameters if the layer has any.
    ///
    /// Called by the model when it is finalized (first compile or first
    /// forward pass). Building an already-built layer is a no-op as long as
    /// the width has not changed.
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Width of the tensors this layer will receive
    ///
    /// # Returns
    ///
    /// - `Ok(())` - The layer is ready for forward passes
    /// - `Err(ModelError)` - The width contradicts the layer configuration
    fn build(&mut self, input_dim: usize) -> Result<(), ModelError>;

    /// Input width the layer declares up front, if any.
    fn declared_input_dim(&self) -> Option<usize> {
        None
    }

    /// Output width of the layer, if determinable.
    ///
    /// Shape-preserving layers return `None` until built.
    fn output_dim(&self) -> Option<usize> {
        None
    }

    /// Whether the layer needs an established input width before it can be
    /// appended to a model.
    fn shape_dependent(&self) -> bool {
        false
    }

    /// Performs forward propagation through the layer.
    ///
    /// # Parameters
    ///
    /// - `input` - The input tensor to the layer
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - The output tensor after forward computation
    /// - `Err(ModelError)` - If the layer encountered an error during processing
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError>;

    /// Performs backward propagation through the layer.
    ///
    /// # Parameters
    ///
    /// - `grad_output` - The gradient tensor from the next layer
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - The gradient tensor to be passed to the previous layer
    /// - `Err(ModelError)` - If the layer encountered an error during processing
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModelError>;

    /// Returns the type name of the layer (e.g. "Dense").
    fn layer_type(&self) -> &str {
        "Unknown"
    }

    /// Returns a description of the output shape of the layer.
    fn output_shape(&self) -> String {
        "Unknown".to_string()
    }

    /// Returns the total number of parameters in the layer.
    fn param_count(&self) -> TrainingParameters;

    /// Updates the layer parameters using Stochastic Gradient Descent.
    fn update_parameters_sgd(&mut self, _lr: f32) {}

    /// Updates the layer parameters using the Adam optimizer.
    fn update_parameters_adam(
        &mut self,
        _lr: f32,
        _beta1: f32,
        _beta2: f32,
        _epsilon: f32,
        _t: u64,
    ) {
    }

    /// Updates the layer parameters using the RMSprop optimizer.
    fn update_parameters_rmsprop(&mut self, _lr: f32, _rho: f32, _epsilon: f32) {}

    /// Updates the layer parameters using the AdaGrad optimizer.
    fn update_parameters_ada_grad(&mut self, _lr: f32, _epsilon: f32) {}

    /// Discards any optimizer accumulators held by the layer.
    ///
    /// Called when the model is recompiled, so that a fresh optimizer starts
    /// from clean state.
    fn reset_optimizer_state(&mut self) {}

    /// Returns a reference to all weights in the layer.
    ///
    /// # Returns
    ///
    /// - `LayerWeight<'_>` - An enum containing references to layer weights:
    ///     - `LayerWeight::Dense` for Dense layers with weight and bias
    ///     - `LayerWeight::Empty` for layers with no trainable parameters
    fn get_weights(&self) -> LayerWeight<'_>;
}

/// Defines the interface for loss functions used during training.
///
/// Implementations provide the per-sample losses and the gradient of the
/// mean loss with respect to the predictions; the scalar batch loss is the
/// mean of the per-sample losses.
pub trait LossFunction: Send + Sync {
    /// Computes the loss of each sample in the batch.
    ///
    /// # Parameters
    ///
    /// - `y_true` - Tensor containing the ground truth values
    /// - `y_pred` - Tensor containing the predicted values
    ///
    /// # Returns
    ///
    /// - `Array1<f32>` - One loss value per sample (first axis)
    fn compute_sample_losses(&self, y_true: &Tensor, y_pred: &Tensor) -> Array1<f32>;

    /// Computes the scalar loss between true and predicted values.
    fn compute_loss(&self, y_true: &Tensor, y_pred: &Tensor) -> f32 {
        let losses = self.compute_sample_losses(y_true, y_pred);
        if losses.is_empty() {
            0.0
        } else {
            losses.sum() / losses.len() as f32
        }
    }

    /// Computes the gradient of the mean loss with respect to the predictions.
    ///
    /// # Parameters
    ///
    /// - `y_true` - Tensor containing the ground truth values
    /// - `y_pred` - Tensor containing the predicted values
    ///
    /// # Returns
    ///
    /// - `Tensor` - Gradient of the loss with respect to `y_pred`
    fn compute_grad(&self, y_true: &Tensor, y_pred: &Tensor) -> Tensor;
}

/// Defines the interface for optimization algorithms.
///
/// This trait provides methods to update layer parameters during the
/// training process.
pub trait Optimizer: Send + Sync {
    /// Updates the parameters of a layer according to the optimization
    /// algorithm.
    ///
    /// # Parameters
    ///
    /// - `layer` - The layer whose parameters should be updated
    fn update(&mut self, layer: &mut dyn Layer);
}
