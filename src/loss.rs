/// Binary Cross Entropy loss function for binary classification
pub mod binary_cross_entropy;
/// Categorical Cross Entropy loss function for multi-class classification
pub mod categorical_cross_entropy;
/// Mean Absolute Error loss function
pub mod mean_absolute_error;
/// Mean Squared Error loss function
pub mod mean_squared_error;

pub use binary_cross_entropy::*;
pub use categorical_cross_entropy::*;
pub use mean_absolute_error::*;
pub use mean_squared_error::*;

use crate::error::ModelError;
use crate::traits::LossFunction;

/// Loss selector accepted by `Sequential::compile`.
///
/// Either a predefined name or a concrete loss instance. Names are resolved
/// when the model is compiled; unknown names are configuration errors.
///
/// # Recognized names
///
/// - `"mse"` / `"mean_squared_error"`
/// - `"mae"` / `"mean_absolute_error"`
/// - `"binary_crossentropy"`
/// - `"categorical_crossentropy"`
///
/// A user-defined objective is supplied as a [`LossFunction`] implementation
/// via [`LossSpec::custom`] or a `From` conversion, so that training has
/// both the loss value and its gradient.
pub enum LossSpec {
    Named(String),
    Instance(Box<dyn LossFunction>),
}

impl LossSpec {
    /// Wraps a user-defined loss function.
    pub fn custom<L: LossFunction + 'static>(loss: L) -> Self {
        LossSpec::Instance(Box::new(loss))
    }

    /// Turns the selector into a concrete loss function.
    pub(crate) fn resolve(self) -> Result<Box<dyn LossFunction>, ModelError> {
        match self {
            LossSpec::Named(name) => match name.as_str() {
                "mse" | "mean_squared_error" => Ok(Box::new(MeanSquaredError::new())),
                "mae" | "mean_absolute_error" => Ok(Box::new(MeanAbsoluteError::new())),
                "binary_crossentropy" => Ok(Box::new(BinaryCrossEntropy::new())),
                "categorical_crossentropy" => Ok(Box::new(CategoricalCrossEntropy::new())),
                other => Err(ModelError::ConfigError(format!(
                    "unknown loss function name: {}",
                    other
                ))),
            },
            LossSpec::Instance(loss) => Ok(loss),
        }
    }
}

impl From<&str> for LossSpec {
    fn from(name: &str) -> Self {
        LossSpec::Named(name.to_string())
    }
}

impl From<String> for LossSpec {
    fn from(name: String) -> Self {
        LossSpec::Named(name)
    }
}

impl From<Box<dyn LossFunction>> for LossSpec {
    fn from(loss: Box<dyn LossFunction>) -> Self {
        LossSpec::Instance(loss)
    }
}

impl From<MeanSquaredError> for LossSpec {
    fn from(loss: MeanSquaredError) -> Self {
        LossSpec::Instance(Box::new(loss))
    }
}

impl From<MeanAbsoluteError> for LossSpec {
    fn from(loss: MeanAbsoluteError) -> Self {
        LossSpec::Instance(Box::new(loss))
    }
}

impl From<BinaryCrossEntropy> for LossSpec {
    fn from(loss: BinaryCrossEntropy) -> Self {
        LossSpec::Instance(Box::new(loss))
    }
}

impl From<CategoricalCrossEntropy> for LossSpec {
    fn from(loss: CategoricalCrossEntropy) -> Self {
        LossSpec::Instance(Box::new(loss))
    }
}
