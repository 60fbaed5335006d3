/// Standalone, shape-preserving activation layer
pub mod activation;
/// Dense (fully connected) layer
pub mod dense;
/// Weight serialization support for model save/load
pub mod serialize;

pub use activation::*;
pub use dense::*;

/// Parameter count of a layer, split by whether the parameters are updated
/// during training
///
/// # Variants
///
/// - `Trainable` - parameters adjusted by the optimizer
/// - `NonTrainable` - parameters the optimizer never touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingParameters {
    Trainable(usize),
    NonTrainable(usize),
}

impl TrainingParameters {
    /// The raw parameter count regardless of trainability.
    pub fn count(&self) -> usize {
        match self {
            TrainingParameters::Trainable(n) | TrainingParameters::NonTrainable(n) => *n,
        }
    }
}

/// Container for the weights of the supported layer types
///
/// # Variants
///
/// - `Dense` - weight matrix and bias vector of a dense layer
/// - `Empty` - a layer with no trainable parameters, or one that has not
///   been built yet
pub enum LayerWeight<'a> {
    Dense(DenseLayerWeight<'a>),
    Empty,
}

/// Weights of a dense (fully connected) layer
///
/// # Fields
///
/// - `weight` - Weight matrix with shape (input_dim, units)
/// - `bias` - Bias vector with shape (1, units)
pub struct DenseLayerWeight<'a> {
    pub weight: &'a ndarray::Array2<f32>,
    pub bias: &'a ndarray::Array2<f32>,
}
