/// AdaGrad optimizer
pub mod ada_grad;
/// Adam optimizer
pub mod adam;
mod input_validation_function;
/// RMSprop optimizer
pub mod rms_prop;
/// Stochastic gradient descent optimizer
pub mod sgd;

pub use ada_grad::*;
pub use adam::*;
pub use rms_prop::*;
pub use sgd::*;

use crate::error::ModelError;
use crate::traits::Optimizer;

/// Optimizer selector accepted by `Sequential::compile`.
///
/// Either a predefined name with conventional default hyperparameters, or a
/// concrete optimizer instance. Names are resolved when the model is
/// compiled; unknown names are configuration errors.
///
/// # Recognized names
///
/// - `"sgd"` - SGD with learning rate 0.01
/// - `"adam"` - Adam with learning rate 0.001, beta1 0.9, beta2 0.999
/// - `"rmsprop"` - RMSprop with learning rate 0.001 and rho 0.9
/// - `"adagrad"` - AdaGrad with learning rate 0.01
///
/// # Example
/// ```no_run
/// use layerstack::prelude::*;
///
/// let mut model = Sequential::new();
/// model.add(Dense::new(1).input_shape(4))?;
///
/// // By name with defaults, or as a configured instance
/// model.compile("rmsprop", "mse", vec![])?;
/// model.compile(RMSprop::new(0.0005, 0.95, 1e-7)?, "mse", vec![])?;
/// # Ok::<(), layerstack::error::ModelError>(())
/// ```
pub enum OptimizerSpec {
    Named(String),
    Instance(Box<dyn Optimizer>),
}

impl OptimizerSpec {
    /// Turns the selector into a concrete optimizer.
    pub(crate) fn resolve(self) -> Result<Box<dyn Optimizer>, ModelError> {
        match self {
            OptimizerSpec::Named(name) => match name.as_str() {
                "sgd" => Ok(Box::new(SGD::new(0.01)?)),
                "adam" => Ok(Box::new(Adam::new(0.001, 0.9, 0.999, 1e-7)?)),
                "rmsprop" => Ok(Box::new(RMSprop::new(0.001, 0.9, 1e-7)?)),
                "adagrad" => Ok(Box::new(AdaGrad::new(0.01, 1e-7)?)),
                other => Err(ModelError::ConfigError(format!(
                    "unknown optimizer name: {}",
                    other
                ))),
            },
            OptimizerSpec::Instance(optimizer) => Ok(optimizer),
        }
    }
}

impl From<&str> for OptimizerSpec {
    fn from(name: &str) -> Self {
        OptimizerSpec::Named(name.to_string())
    }
}

impl From<String> for OptimizerSpec {
    fn from(name: String) -> Self {
        OptimizerSpec::Named(name)
    }
}

impl From<Box<dyn Optimizer>> for OptimizerSpec {
    fn from(optimizer: Box<dyn Optimizer>) -> Self {
        OptimizerSpec::Instance(optimizer)
    }
}

impl From<SGD> for OptimizerSpec {
    fn from(optimizer: SGD) -> Self {
        OptimizerSpec::Instance(Box::new(optimizer))
    }
}

impl From<Adam> for OptimizerSpec {
    fn from(optimizer: Adam) -> Self {
        OptimizerSpec::Instance(Box::new(optimizer))
    }
}

impl From<RMSprop> for OptimizerSpec {
    fn from(optimizer: RMSprop) -> Self {
        OptimizerSpec::Instance(Box::new(optimizer))
    }
}

impl From<AdaGrad> for OptimizerSpec {
    fn from(optimizer: AdaGrad) -> Self {
        OptimizerSpec::Instance(Box::new(optimizer))
    }
}

/// Per-layer accumulator state for the stateful optimizers.
///
/// Held by trainable layers and discarded when the model is recompiled, so
/// each compile starts optimization from clean accumulators.
#[derive(Debug, Clone, Default)]
pub struct OptimizerCache {
    pub adam_states: Option<AdamStates>,
    pub rmsprop_cache: Option<RMSpropCache>,
    pub ada_grad_cache: Option<AdaGradCache>,
}
