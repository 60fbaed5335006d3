use crate::Tensor;
use crate::error::ModelError;
use crate::model::callback::Callback;
use ahash::AHashMap;

/// Amount of console output produced during a fit run.
///
/// # Variants
///
/// - `Silent` - level 0, no output
/// - `ProgressBar` - level 1, a live progress bar over all gradient updates
/// - `PerEpoch` - level 2, one summary line per epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Silent,
    #[default]
    ProgressBar,
    PerEpoch,
}

impl Verbosity {
    /// Maps the conventional numeric verbosity levels 0, 1 and 2.
    pub fn from_level(level: u8) -> Result<Self, ModelError> {
        match level {
            0 => Ok(Verbosity::Silent),
            1 => Ok(Verbosity::ProgressBar),
            2 => Ok(Verbosity::PerEpoch),
            other => Err(ModelError::ConfigError(format!(
                "verbosity level must be 0, 1 or 2, got {}",
                other
            ))),
        }
    }

    /// The conventional numeric level of this verbosity.
    pub fn level(&self) -> u8 {
        match self {
            Verbosity::Silent => 0,
            Verbosity::ProgressBar => 1,
            Verbosity::PerEpoch => 2,
        }
    }
}

/// How a supplied sample-weight tensor is interpreted.
///
/// # Variants
///
/// - `PerSample` - one weight per sample (1-D, length = sample count)
/// - `Temporal` - one weight per sample per timestep; requires targets with
///   at least three dimensions and is therefore rejected for dense stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleWeightMode {
    #[default]
    PerSample,
    Temporal,
}

/// Named training parameters for a single fit invocation.
///
/// Mirrors the conventional training-parameter set: batch size, epoch count,
/// verbosity, callbacks, validation strategy, shuffle policy, class and
/// sample weighting, and the initial epoch for resumed runs. Construct with
/// [`FitConfig::default`] and override individual parameters with the
/// builder methods.
///
/// # Defaults
///
/// `batch_size = 32`, `epochs = 10`, `verbose = ProgressBar` (level 1),
/// no callbacks, no validation, `shuffle = true`, no class or sample
/// weights, `initial_epoch = 0`.
///
/// # Example
/// ```rust
/// use layerstack::model::{FitConfig, Verbosity};
///
/// let config = FitConfig::default()
///     .batch_size(64)
///     .epochs(20)
///     .verbose(Verbosity::PerEpoch)
///     .validation_split(0.2);
/// assert_eq!(config.get_batch_size(), 64);
/// ```
pub struct FitConfig {
    pub(crate) batch_size: usize,
    pub(crate) epochs: u32,
    pub(crate) verbose: Verbosity,
    pub(crate) callbacks: Vec<Box<dyn Callback>>,
    pub(crate) validation_split: Option<f32>,
    pub(crate) validation_data: Option<(Tensor, Tensor)>,
    pub(crate) shuffle: bool,
    pub(crate) class_weight: Option<AHashMap<usize, f32>>,
    pub(crate) sample_weight: Option<Tensor>,
    pub(crate) sample_weight_mode: SampleWeightMode,
    pub(crate) initial_epoch: u32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            epochs: 10,
            verbose: Verbosity::default(),
            callbacks: Vec::new(),
            validation_split: None,
            validation_data: None,
            shuffle: true,
            class_weight: None,
            sample_weight: None,
            sample_weight_mode: SampleWeightMode::default(),
            initial_epoch: 0,
        }
    }
}

impl FitConfig {
    /// Creates the default configuration; identical to `FitConfig::default()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples per gradient update.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Index of the final epoch; together with `initial_epoch` this
    /// determines how many passes over the data are made.
    pub fn epochs(mut self, epochs: u32) -> Self {
        self.epochs = epochs;
        self
    }

    /// Console output produced while training.
    pub fn verbose(mut self, verbose: Verbosity) -> Self {
        self.verbose = verbose;
        self
    }

    /// Registers a training hook. May be called repeatedly; hooks run in
    /// registration order.
    pub fn callback(mut self, callback: Box<dyn Callback>) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// Fraction in (0, 1) of the training data held out for validation.
    ///
    /// The held-out samples are taken from the end of the provided arrays,
    /// before any shuffling. Ignored when explicit validation data is set.
    pub fn validation_split(mut self, fraction: f32) -> Self {
        self.validation_split = Some(fraction);
        self
    }

    /// Explicit held-out set evaluated at the end of every epoch; overrides
    /// `validation_split`.
    pub fn validation_data(mut self, x: Tensor, y: Tensor) -> Self {
        self.validation_data = Some((x, y));
        self
    }

    /// Whether training samples are re-permuted each epoch.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Per-class loss scaling, keyed by class index. Classes missing from
    /// the map keep weight 1.
    pub fn class_weight(mut self, weights: AHashMap<usize, f32>) -> Self {
        self.class_weight = Some(weights);
        self
    }

    /// Per-sample loss scaling; must have one weight per training sample.
    pub fn sample_weight(mut self, weights: Tensor) -> Self {
        self.sample_weight = Some(weights);
        self
    }

    /// Interpretation of the sample-weight tensor.
    pub fn sample_weight_mode(mut self, mode: SampleWeightMode) -> Self {
        self.sample_weight_mode = mode;
        self
    }

    /// Epoch index at which training (re)starts; useful to resume a
    /// previous run.
    pub fn initial_epoch(mut self, initial_epoch: u32) -> Self {
        self.initial_epoch = initial_epoch;
        self
    }

    /// Gets the `batch_size` field.
    pub fn get_batch_size(&self) -> usize {
        self.batch_size
    }

    /// Gets the `epochs` field.
    pub fn get_epochs(&self) -> u32 {
        self.epochs
    }

    /// Gets the `verbose` field.
    pub fn get_verbose(&self) -> Verbosity {
        self.verbose
    }

    /// Gets the `validation_split` field.
    pub fn get_validation_split(&self) -> Option<f32> {
        self.validation_split
    }

    /// Gets the `shuffle` field.
    pub fn get_shuffle(&self) -> bool {
        self.shuffle
    }

    /// Gets the `initial_epoch` field.
    pub fn get_initial_epoch(&self) -> u32 {
        self.initial_epoch
    }

    /// Checks the configuration against the training data.
    ///
    /// # Parameters
    ///
    /// - `n_samples` - Number of samples in the supplied feature tensor
    /// - `y_ndim` - Rank of the supplied target tensor
    pub(crate) fn validate_for(&self, n_samples: usize, y_ndim: usize) -> Result<(), ModelError> {
        if self.batch_size == 0 {
            return Err(ModelError::InputValidationError(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if let Some(fraction) = self.validation_split {
            if !(fraction > 0.0 && fraction < 1.0 && fraction.is_finite()) {
                return Err(ModelError::InputValidationError(format!(
                    "validation_split must lie in (0, 1), got {}",
                    fraction
                )));
            }
        }

        if let Some(weights) = &self.sample_weight {
            match self.sample_weight_mode {
                SampleWeightMode::PerSample => {
                    if weights.ndim() != 1 || weights.shape()[0] != n_samples {
                        return Err(ModelError::InputValidationError(format!(
                            "sample_weight must be 1-D with one weight per sample ({}), got shape {:?}",
                            n_samples,
                            weights.shape()
                        )));
                    }
                }
                SampleWeightMode::Temporal => {
                    if y_ndim < 3 {
                        return Err(ModelError::InputValidationError(
                            "timestep-wise sample weighting requires targets with at least 3 dimensions"
                                .to_string(),
                        ));
                    }
                }
            }
        }

        if let Some(class_weight) = &self.class_weight {
            if let Some((class, weight)) = class_weight
                .iter()
                .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
            {
                return Err(ModelError::InputValidationError(format!(
                    "class_weight for class {} must be finite and non-negative, got {}",
                    class, weight
                )));
            }
        }

        Ok(())
    }
}
