use ndarray::ArrayD;

/// Type alias for n-dimensional arrays used as tensors throughout the crate
pub type Tensor = ArrayD<f32>;

/// Module that contains error types shared across the crate
pub mod error;

/// Module that contains the core traits implemented by layers, loss
/// functions and optimizers
pub mod traits;

/// Module that contains the activation function kinds and their forward and
/// derivative computations
pub mod activation;

/// Module that contains the layer implementations.
///
/// # Layers
///
/// - **Dense**: fully connected layer with an optional fused activation
///   function. The first `Dense` in a model must declare its input width
///   with [`Dense::input_shape`](layer::Dense::input_shape); later layers
///   infer it from the preceding layer's output width.
/// - **Activation**: standalone, shape-preserving activation layer with no
///   trainable parameters.
pub mod layer;

/// Module that contains the loss function implementations.
///
/// # Loss functions
///
/// - **MeanSquaredError** (`"mse"`): for regression tasks
/// - **MeanAbsoluteError** (`"mae"`): for regression tasks
/// - **BinaryCrossEntropy** (`"binary_crossentropy"`): for binary classification
/// - **CategoricalCrossEntropy** (`"categorical_crossentropy"`): for
///   multi-class classification with one-hot targets
///
/// All of them can be selected by name through [`loss::LossSpec`] or passed
/// to [`model::Sequential::compile`] as instances.
pub mod loss;

/// Module that contains optimization algorithms for training.
///
/// # Optimizers
///
/// - **SGD**: plain stochastic gradient descent
/// - **Adam**: adaptive moment estimation
/// - **RMSprop**: moving average of squared gradients
/// - **AdaGrad**: accumulated squared gradients
///
/// All of them can be selected by name through [`optimizer::OptimizerSpec`]
/// (e.g. `"rmsprop"`, `"adagrad"`) with conventional default
/// hyperparameters, or constructed explicitly.
pub mod optimizer;

/// Module that contains evaluation metrics attached to a model at compile
/// time, including user-supplied metric closures
pub mod metric;

/// Module that contains the sequential model, its training configuration,
/// callbacks and training history.
///
/// # Example
/// ```no_run
/// use layerstack::prelude::*;
/// use ndarray::Array;
///
/// let x = Array::ones((128, 784)).into_dyn();
/// let y = Array::ones((128, 10)).into_dyn();
///
/// let mut model = Sequential::new();
/// model
///     .add(Dense::new(32).input_shape(784))?
///     .add(Activation::relu())?
///     .add(Dense::new(10))?
///     .add(Activation::softmax())?;
///
/// model.compile("rmsprop", "categorical_crossentropy", vec![Metric::Accuracy])?;
/// model.summary()?;
///
/// let history = model.fit(&x, &y, FitConfig::default())?;
/// println!("final loss: {:?}", history.final_loss());
/// # Ok::<(), layerstack::error::ModelError>(())
/// ```
pub mod model;

/// A convenience module that re-exports the most commonly used types of
/// this crate
pub mod prelude;
