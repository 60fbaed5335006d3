use crate::Tensor;
use crate::activation::ActivationKind;
use crate::error::ModelError;
use crate::layer::{DenseLayerWeight, LayerWeight, TrainingParameters};
use crate::optimizer::{AdaGradCache, AdamStates, OptimizerCache, RMSpropCache};
use crate::traits::Layer;
use ndarray::{Array, Array2, Axis, Ix2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;

/// Dense (fully connected) layer.
///
/// Performs the linear transformation `output = input * weights + bias`,
/// optionally followed by a fused activation function. Weights are
/// initialized uniformly in ±0.05 and biases to zero when the layer is
/// built.
///
/// The input width may be declared up front with
/// [`input_shape`](Dense::input_shape); when omitted, it is inferred from
/// the preceding layer's output width at build time. The first
/// shape-dependent layer of a model must declare its input width.
///
/// # Dimensions
///
/// - Input shape: (batch_size, input_dim)
/// - Output shape: (batch_size, units)
///
/// # Example
/// ```no_run
/// use layerstack::prelude::*;
/// use ndarray::Array;
///
/// let x = Array::ones((4, 8)).into_dyn();
/// let y = Array::ones((4, 1)).into_dyn();
///
/// let mut model = Sequential::new();
/// model
///     .add(Dense::new(16).input_shape(8).activation(ActivationKind::ReLU))?
///     .add(Dense::new(1))?;
/// model.compile("sgd", "mse", vec![])?;
/// model.fit(&x, &y, FitConfig::default().epochs(3).batch_size(4).verbose(Verbosity::Silent))?;
/// # Ok::<(), layerstack::error::ModelError>(())
/// ```
pub struct Dense {
    /// Output width of the layer
    units: usize,
    /// Input width, declared or inferred at build time
    input_dim: Option<usize>,
    /// Whether `input_dim` was declared by the caller
    declared: bool,
    /// Optional fused activation function
    activation: Option<ActivationKind>,
    /// Weight matrix with shape (input_dim, units), allocated at build time
    weights: Option<Array2<f32>>,
    /// Bias vector with shape (1, units), allocated at build time
    bias: Option<Array2<f32>>,
    /// Cache of the forward-pass input for use in the backward pass
    input_cache: Option<Array2<f32>>,
    /// Cached output after activation for use in the backward pass
    activation_output: Option<Array2<f32>>,
    /// Stored weight gradients
    grad_weights: Option<Array2<f32>>,
    /// Stored bias gradients
    grad_bias: Option<Array2<f32>>,
    /// Per-optimizer accumulator state
    optimizer_cache: OptimizerCache,
}

impl Dense {
    /// Creates a dense layer with the given output width.
    ///
    /// The input width is inferred from the preceding layer unless
    /// [`input_shape`](Dense::input_shape) is called.
    pub fn new(units: usize) -> Self {
        Self {
            units,
            input_dim: None,
            declared: false,
            activation: None,
            weights: None,
            bias: None,
            input_cache: None,
            activation_output: None,
            grad_weights: None,
            grad_bias: None,
            optimizer_cache: OptimizerCache::default(),
        }
    }

    /// Declares the width of the feature vectors this layer receives.
    ///
    /// Required on the first shape-dependent layer of a model.
    pub fn input_shape(mut self, input_dim: usize) -> Self {
        self.input_dim = Some(input_dim);
        self.declared = true;
        self
    }

    /// Attaches a fused activation function applied after the linear
    /// transformation.
    pub fn activation(mut self, kind: ActivationKind) -> Self {
        self.activation = Some(kind);
        self
    }

    /// Output width of the layer.
    pub fn get_units(&self) -> usize {
        self.units
    }

    /// Input width of the layer, once declared or inferred.
    pub fn get_input_dim(&self) -> Option<usize> {
        self.input_dim
    }

    /// The fused activation function, if any.
    pub fn get_activation(&self) -> Option<ActivationKind> {
        self.activation
    }

    /// Reference to the weight matrix, once the layer has been built.
    pub fn weights(&self) -> Option<&Array2<f32>> {
        self.weights.as_ref()
    }

    /// Reference to the bias vector, once the layer has been built.
    pub fn bias(&self) -> Option<&Array2<f32>> {
        self.bias.as_ref()
    }

    /// Replaces the layer's weights and bias.
    ///
    /// The layer must already be built and the shapes must match its
    /// configuration.
    ///
    /// # Parameters
    ///
    /// - `weights` - New weight matrix with shape (input_dim, units)
    /// - `bias` - New bias vector with shape (1, units)
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Weights were replaced
    /// - `Err(ModelError)` - The layer is unbuilt or a shape does not match
    pub fn set_weights(&mut self, weights: Array2<f32>, bias: Array2<f32>) -> Result<(), ModelError> {
        let input_dim = match self.input_dim {
            Some(dim) if self.weights.is_some() => dim,
            _ => {
                return Err(ModelError::ConfigError(
                    "weights can only be set on a built layer".to_string(),
                ));
            }
        };

        if weights.dim() != (input_dim, self.units) {
            return Err(ModelError::InputValidationError(format!(
                "weight shape {:?} does not match layer shape ({}, {})",
                weights.dim(),
                input_dim,
                self.units
            )));
        }
        if bias.dim() != (1, self.units) {
            return Err(ModelError::InputValidationError(format!(
                "bias shape {:?} does not match layer shape (1, {})",
                bias.dim(),
                self.units
            )));
        }

        self.weights = Some(weights);
        self.bias = Some(bias);
        Ok(())
    }

    fn cached_2d(cache: &mut Option<Array2<f32>>) -> Result<Array2<f32>, ModelError> {
        cache.take().ok_or_else(|| {
            ModelError::ProcessingError("forward pass has not been run".to_string())
        })
    }
}

impl Layer for Dense {
    fn build(&mut self, input_dim: usize) -> Result<(), ModelError> {
        if self.units == 0 {
            return Err(ModelError::ConfigError(
                "Dense layer must have at least one unit".to_string(),
            ));
        }
        if input_dim == 0 {
            return Err(ModelError::ConfigError(
                "Dense layer input width must be at least one".to_string(),
            ));
        }
        if let Some(declared) = self.input_dim {
            if declared != input_dim {
                return Err(ModelError::ConfigError(format!(
                    "layer declares input width {} but receives {}",
                    declared, input_dim
                )));
            }
        }

        self.input_dim = Some(input_dim);
        if self.weights.is_none() {
            self.weights = Some(Array::random(
                (input_dim, self.units),
                Uniform::new(-0.05, 0.05),
            ));
            self.bias = Some(Array::zeros((1, self.units)));
        }
        Ok(())
    }

    fn declared_input_dim(&self) -> Option<usize> {
        if self.declared { self.input_dim } else { None }
    }

    fn output_dim(&self) -> Option<usize> {
        Some(self.units)
    }

    fn shape_dependent(&self) -> bool {
        true
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        let (weights, bias) = match (self.weights.as_ref(), self.bias.as_ref()) {
            (Some(w), Some(b)) => (w, b),
            _ => {
                return Err(ModelError::ProcessingError(
                    "layer has not been built".to_string(),
                ));
            }
        };

        let input_2d = input
            .clone()
            .into_dimensionality::<Ix2>()
            .map_err(|e| ModelError::InputValidationError(format!("expected 2D input: {}", e)))?;

        if input_2d.ncols() != weights.nrows() {
            return Err(ModelError::InputValidationError(format!(
                "input width {} does not match layer input width {}",
                input_2d.ncols(),
                weights.nrows()
            )));
        }

        let z = input_2d.dot(weights) + bias;
        self.input_cache = Some(input_2d);

        if let Some(act) = self.activation {
            let a = act.apply(&z);
            self.activation_output = Some(a.clone());
            Ok(a.into_dyn())
        } else {
            Ok(z.into_dyn())
        }
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModelError> {
        let mut grad_upstream = grad_output
            .clone()
            .into_dimensionality::<Ix2>()
            .map_err(|e| ModelError::ProcessingError(format!("expected 2D gradient: {}", e)))?;

        // Chain rule through the fused activation: dL/dz = (da/dz) ⊙ dL/da
        if let Some(act) = self.activation {
            let a = Self::cached_2d(&mut self.activation_output)?;
            grad_upstream = if act == ActivationKind::Softmax {
                ActivationKind::softmax_backward(&a, &grad_upstream)
            } else {
                act.derivative(&a) * &grad_upstream
            };
        }

        let input = Self::cached_2d(&mut self.input_cache)?;
        let grad_w = input.t().dot(&grad_upstream);
        let grad_b = grad_upstream.sum_axis(Axis(0)).insert_axis(Axis(0));

        let weights = self.weights.as_ref().ok_or_else(|| {
            ModelError::ProcessingError("layer has not been built".to_string())
        })?;
        let grad_input = grad_upstream.dot(&weights.t());

        self.grad_weights = Some(grad_w);
        self.grad_bias = Some(grad_b);

        Ok(grad_input.into_dyn())
    }

    fn layer_type(&self) -> &str {
        "Dense"
    }

    fn output_shape(&self) -> String {
        format!("(None, {})", self.units)
    }

    fn param_count(&self) -> TrainingParameters {
        match self.input_dim {
            Some(input_dim) => TrainingParameters::Trainable(input_dim * self.units + self.units),
            None => TrainingParameters::Trainable(0),
        }
    }

    fn update_parameters_sgd(&mut self, lr: f32) {
        let (Some(weights), Some(bias), Some(grad_w), Some(grad_b)) = (
            self.weights.as_mut(),
            self.bias.as_mut(),
            self.grad_weights.as_ref(),
            self.grad_bias.as_ref(),
        ) else {
            return;
        };

        *weights = &*weights - &(grad_w * lr);
        *bias = &*bias - &(grad_b * lr);
    }

    fn update_parameters_adam(&mut self, lr: f32, beta1: f32, beta2: f32, epsilon: f32, t: u64) {
        let (Some(input_dim), Some(grad_w), Some(grad_b)) = (
            self.input_dim,
            self.grad_weights.as_ref(),
            self.grad_bias.as_ref(),
        ) else {
            return;
        };

        let states = self.optimizer_cache.adam_states.get_or_insert_with(|| {
            AdamStates::new((input_dim, self.units), (1, self.units))
        });
        let (w_update, b_update) = states.update(grad_w, grad_b, beta1, beta2, epsilon, t, lr);

        if let (Some(weights), Some(bias)) = (self.weights.as_mut(), self.bias.as_mut()) {
            *weights = &*weights - &w_update;
            *bias = &*bias - &b_update;
        }
    }

    fn update_parameters_rmsprop(&mut self, lr: f32, rho: f32, epsilon: f32) {
        let (Some(input_dim), Some(grad_w), Some(grad_b)) = (
            self.input_dim,
            self.grad_weights.as_ref(),
            self.grad_bias.as_ref(),
        ) else {
            return;
        };

        let cache = self.optimizer_cache.rmsprop_cache.get_or_insert_with(|| {
            RMSpropCache::new((input_dim, self.units), (1, self.units))
        });

        if let (Some(weights), Some(bias)) = (self.weights.as_mut(), self.bias.as_mut()) {
            cache.update_parameters(weights, bias, grad_w, grad_b, rho, lr, epsilon);
        }
    }

    fn update_parameters_ada_grad(&mut self, lr: f32, epsilon: f32) {
        let (Some(input_dim), Some(grad_w), Some(grad_b)) = (
            self.input_dim,
            self.grad_weights.as_ref(),
            self.grad_bias.as_ref(),
        ) else {
            return;
        };

        let cache = self.optimizer_cache.ada_grad_cache.get_or_insert_with(|| {
            AdaGradCache::new((input_dim, self.units), (1, self.units))
        });

        if let (Some(weights), Some(bias)) = (self.weights.as_mut(), self.bias.as_mut()) {
            cache.update_parameters(weights, bias, grad_w, grad_b, lr, epsilon);
        }
    }

    fn reset_optimizer_state(&mut self) {
        self.optimizer_cache = OptimizerCache::default();
    }

    fn get_weights(&self) -> LayerWeight<'_> {
        match (self.weights.as_ref(), self.bias.as_ref()) {
            (Some(weight), Some(bias)) => LayerWeight::Dense(DenseLayerWeight { weight, bias }),
            _ => LayerWeight::Empty,
        }
    }
}
