use crate::Tensor;
use crate::activation::ActivationKind;
use crate::error::ModelError;
use crate::layer::{LayerWeight, TrainingParameters};
use crate::traits::Layer;
use ndarray::Ix2;

/// Standalone activation layer.
///
/// Applies an activation function element-wise (row-wise for softmax) to its
/// input, keeping the shape. Carries no trainable parameters and infers its
/// width from the preceding layer.
///
/// # Example
/// ```no_run
/// use layerstack::prelude::*;
///
/// let mut model = Sequential::new();
/// model
///     .add(Dense::new(32).input_shape(784))?
///     .add(Activation::relu())?
///     .add(Dense::new(10))?
///     .add(Activation::softmax())?;
/// # Ok::<(), layerstack::error::ModelError>(())
/// ```
pub struct Activation {
    kind: ActivationKind,
    /// Width resolved at build time, used for shape reporting
    dim: Option<usize>,
    /// Cached activation output for the backward pass
    output_cache: Option<ndarray::Array2<f32>>,
}

impl Activation {
    /// Creates an activation layer of the given kind.
    pub fn new(kind: ActivationKind) -> Self {
        Self {
            kind,
            dim: None,
            output_cache: None,
        }
    }

    /// Creates an activation layer from a function name such as `"relu"`.
    ///
    /// # Returns
    ///
    /// - `Ok(Activation)` - A layer applying the named function
    /// - `Err(ModelError::ConfigError)` - The name is not recognized
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        Ok(Self::new(name.parse()?))
    }

    /// Rectified linear unit activation layer.
    pub fn relu() -> Self {
        Self::new(ActivationKind::ReLU)
    }

    /// Sigmoid activation layer.
    pub fn sigmoid() -> Self {
        Self::new(ActivationKind::Sigmoid)
    }

    /// Hyperbolic tangent activation layer.
    pub fn tanh() -> Self {
        Self::new(ActivationKind::Tanh)
    }

    /// Softmax activation layer.
    pub fn softmax() -> Self {
        Self::new(ActivationKind::Softmax)
    }

    /// Identity activation layer.
    pub fn linear() -> Self {
        Self::new(ActivationKind::Linear)
    }

    /// The activation function this layer applies.
    pub fn get_kind(&self) -> ActivationKind {
        self.kind
    }
}

impl Layer for Activation {
    fn build(&mut self, input_dim: usize) -> Result<(), ModelError> {
        self.dim = Some(input_dim);
        Ok(())
    }

    fn output_dim(&self) -> Option<usize> {
        self.dim
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        let input_2d = input
            .clone()
            .into_dimensionality::<Ix2>()
            .map_err(|e| ModelError::InputValidationError(format!("expected 2D input: {}", e)))?;

        let a = self.kind.apply(&input_2d);
        self.output_cache = Some(a.clone());
        Ok(a.into_dyn())
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModelError> {
        let grad_upstream = grad_output
            .clone()
            .into_dimensionality::<Ix2>()
            .map_err(|e| ModelError::ProcessingError(format!("expected 2D gradient: {}", e)))?;

        let a = self.output_cache.take().ok_or_else(|| {
            ModelError::ProcessingError("forward pass has not been run".to_string())
        })?;

        let grad_input = if self.kind == ActivationKind::Softmax {
            ActivationKind::softmax_backward(&a, &grad_upstream)
        } else {
            self.kind.derivative(&a) * &grad_upstream
        };

        Ok(grad_input.into_dyn())
    }

    fn layer_type(&self) -> &str {
        match self.kind {
            ActivationKind::ReLU => "ReLU",
            ActivationKind::Sigmoid => "Sigmoid",
            ActivationKind::Tanh => "Tanh",
            ActivationKind::Softmax => "Softmax",
            ActivationKind::Linear => "Linear",
        }
    }

    fn output_shape(&self) -> String {
        match self.dim {
            Some(dim) => format!("(None, {})", dim),
            None => "Unknown".to_string(),
        }
    }

    fn param_count(&self) -> TrainingParameters {
        TrainingParameters::NonTrainable(0)
    }

    fn get_weights(&self) -> LayerWeight<'_> {
        LayerWeight::Empty
    }
}
