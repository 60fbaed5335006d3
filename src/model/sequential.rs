use crate::Tensor;
use crate::error::{IoError, ModelError};
use crate::layer::serialize::{self, SavedModel};
use crate::layer::{LayerWeight, TrainingParameters};
use crate::loss::LossSpec;
use crate::metric::Metric;
use crate::model::callback::{Callback, CallbackAction};
use crate::model::fit_config::{FitConfig, Verbosity};
use crate::model::history::{EpochStats, History};
use crate::optimizer::OptimizerSpec;
use crate::traits::{Layer, LossFunction, Optimizer};
use ahash::AHashMap;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array, Array1, ArrayViewD, Axis, IxDyn, Slice};
use rand::seq::SliceRandom;
use serde_json::{from_reader, to_writer_pretty};
use std::fs::File;
use std::io::{BufWriter, Write};

/// A sequential model: a linear stack of layers, each consuming the
/// previous layer's output.
///
/// The model is assembled with [`add`](Sequential::add), finalized and bound
/// to an optimizer, a loss function and a metrics list with
/// [`compile`](Sequential::compile), and trained with
/// [`fit`](Sequential::fit). Shapes are resolved when the model is
/// finalized: the first shape-dependent layer declares its input width and
/// every later layer infers its input from the preceding layer's output.
///
/// Compiling again fully replaces the training configuration and resets the
/// optimizer state held by the layers; layers can no longer be added once
/// the model has been compiled.
///
/// # Example
/// ```no_run
/// use layerstack::prelude::*;
/// use ndarray::Array;
///
/// let x = Array::ones((64, 784)).into_dyn();
/// let y = Array::ones((64, 10)).into_dyn();
///
/// let mut model = Sequential::new();
/// model
///     .add(Dense::new(32).input_shape(784))?
///     .add(Activation::relu())?
///     .add(Dense::new(10))?
///     .add(Activation::softmax())?;
///
/// // For a multi-class classification problem
/// model.compile("rmsprop", "categorical_crossentropy", vec![Metric::Accuracy])?;
///
/// let history = model.fit(&x, &y, FitConfig::default())?;
/// let predictions = model.predict(&x)?;
/// # Ok::<(), layerstack::error::ModelError>(())
/// ```
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
    optimizer: Option<Box<dyn Optimizer>>,
    loss: Option<Box<dyn LossFunction>>,
    metrics: Vec<Metric>,
    /// Width of the model input, fixed by the first declared input shape
    input_dim: Option<usize>,
    /// Output width after the most recently added layer, when resolvable
    established_dim: Option<usize>,
    built: bool,
    compiled: bool,
}

impl Sequential {
    /// Creates a new empty sequential model.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            optimizer: None,
            loss: None,
            metrics: Vec::new(),
            input_dim: None,
            established_dim: None,
            built: false,
            compiled: false,
        }
    }

    /// Appends a layer to the model.
    ///
    /// Supports method chaining through the returned reference.
    ///
    /// # Parameters
    ///
    /// - `layer` - The layer to append
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Sequential)` - The model, for chaining
    /// - `Err(ModelError::ConfigError)` - The model is already compiled, the
    ///   layer is shape-dependent but no input width has been established,
    ///   or its declared input width contradicts the established width
    pub fn add<L: Layer + 'static>(&mut self, layer: L) -> Result<&mut Self, ModelError> {
        if self.compiled {
            return Err(ModelError::ConfigError(
                "layers can only be added before the model is compiled".to_string(),
            ));
        }

        if let Some(declared) = layer.declared_input_dim() {
            match self.established_dim {
                Some(current) if current != declared => {
                    return Err(ModelError::ConfigError(format!(
                        "layer declares input width {} but the previous layer produces {}",
                        declared, current
                    )));
                }
                Some(_) => {}
                None => self.input_dim = Some(declared),
            }
            self.established_dim = Some(declared);
        } else if layer.shape_dependent() && self.established_dim.is_none() {
            return Err(ModelError::ConfigError(
                "the first shape-dependent layer must declare an input shape".to_string(),
            ));
        }

        if let Some(output) = layer.output_dim() {
            self.established_dim = Some(output);
        }

        self.built = false;
        self.layers.push(Box::new(layer));
        Ok(self)
    }

    /// Configures the optimizer, loss function and metrics for training.
    ///
    /// Finalizes the model on first use (resolving shapes and allocating
    /// weights). Optimizer and loss accept either a predefined name or an
    /// instance; see [`OptimizerSpec`] and [`LossSpec`] for the recognized
    /// names. Compiling again replaces the previous configuration entirely
    /// and resets per-layer optimizer state.
    ///
    /// # Parameters
    ///
    /// - `optimizer` - Optimizer name (e.g. `"rmsprop"`) or instance
    /// - `loss` - Loss name (e.g. `"categorical_crossentropy"`) or instance
    /// - `metrics` - Metrics evaluated during training; pass an empty vector
    ///   for none
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Sequential)` - The model, for chaining
    /// - `Err(ModelError)` - Unknown selector name, or the model cannot be
    ///   finalized
    pub fn compile<O, L>(
        &mut self,
        optimizer: O,
        loss: L,
        metrics: Vec<Metric>,
    ) -> Result<&mut Self, ModelError>
    where
        O: Into<OptimizerSpec>,
        L: Into<LossSpec>,
    {
        self.ensure_built()?;

        let optimizer = optimizer.into().resolve()?;
        let loss = loss.into().resolve()?;

        // A fresh optimizer starts from clean accumulators
        for layer in &mut self.layers {
            layer.reset_optimizer_state();
        }

        self.optimizer = Some(optimizer);
        self.loss = Some(loss);
        self.metrics = metrics;
        self.compiled = true;
        Ok(self)
    }

    /// Width of the feature vectors the model consumes, once declared.
    pub fn input_dim(&self) -> Option<usize> {
        self.input_dim
    }

    /// Width of the model output, once resolvable.
    pub fn output_dim(&self) -> Option<usize> {
        let mut width = self.input_dim;
        for layer in &self.layers {
            width = layer.output_dim().or(width);
        }
        width
    }

    /// Number of layers in the model.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether `compile` has been called on this model.
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    fn ensure_built(&mut self) -> Result<(), ModelError> {
        if self.built {
            return Ok(());
        }
        if self.layers.is_empty() {
            return Err(ModelError::ConfigError(
                "model has no layers".to_string(),
            ));
        }

        let mut width = self.input_dim.ok_or_else(|| {
            ModelError::ConfigError("no layer declares an input shape".to_string())
        })?;

        for layer in &mut self.layers {
            layer.build(width)?;
            width = layer.output_dim().unwrap_or(width);
        }

        self.built = true;
        Ok(())
    }

    fn validate_features(&self, x: &Tensor) -> Result<(), ModelError> {
        if x.is_empty() {
            return Err(ModelError::InputValidationError(
                "input tensor cannot be empty".to_string(),
            ));
        }
        if x.ndim() != 2 {
            return Err(ModelError::InputValidationError(format!(
                "expected a 2D feature tensor, got {} dimensions",
                x.ndim()
            )));
        }
        if let Some(input_dim) = self.input_dim {
            if x.shape()[1] != input_dim {
                return Err(ModelError::InputValidationError(format!(
                    "feature width {} does not match model input width {}",
                    x.shape()[1],
                    input_dim
                )));
            }
        }
        Ok(())
    }

    fn validate_xy(&self, x: &Tensor, y: &Tensor) -> Result<(), ModelError> {
        self.validate_features(x)?;

        if y.is_empty() {
            return Err(ModelError::InputValidationError(
                "target tensor cannot be empty".to_string(),
            ));
        }
        if y.ndim() != 2 {
            return Err(ModelError::InputValidationError(format!(
                "expected a 2D target tensor, got {} dimensions",
                y.ndim()
            )));
        }
        if x.shape()[0] != y.shape()[0] {
            return Err(ModelError::InputValidationError(format!(
                "sample count mismatch: input has {} samples, target has {} samples",
                x.shape()[0],
                y.shape()[0]
            )));
        }
        if let Some(output_dim) = self.output_dim() {
            if y.shape()[1] != output_dim {
                return Err(ModelError::InputValidationError(format!(
                    "target width {} does not match model output width {}",
                    y.shape()[1],
                    output_dim
                )));
            }
        }
        Ok(())
    }

    fn forward_all(&mut self, x: &Tensor) -> Result<Tensor, ModelError> {
        let mut output = x.clone();
        for layer in &mut self.layers {
            output = layer.forward(&output)?;
        }
        Ok(output)
    }

    /// Performs a single weighted gradient update and returns the batch loss
    /// together with the forward-pass predictions.
    fn train_batch(
        &mut self,
        x: &Tensor,
        y: &Tensor,
        sample_weights: Option<&Array1<f32>>,
    ) -> Result<(f32, Tensor), ModelError> {
        let output = self.forward_all(x)?;

        let loss_fn = self.loss.as_ref().ok_or(ModelError::NotCompiled)?;
        let (loss_value, mut grad) = match sample_weights {
            None => (
                loss_fn.compute_loss(y, &output),
                loss_fn.compute_grad(y, &output),
            ),
            Some(weights) => {
                let sample_losses = loss_fn.compute_sample_losses(y, &output);
                let n = sample_losses.len().max(1) as f32;
                let loss_value = sample_losses
                    .iter()
                    .zip(weights.iter())
                    .map(|(&loss, &weight)| loss * weight)
                    .sum::<f32>()
                    / n;

                let mut grad = loss_fn.compute_grad(y, &output);
                for (i, mut row) in grad.axis_iter_mut(Axis(0)).enumerate() {
                    let weight = weights[i];
                    row.map_inplace(|g| *g *= weight);
                }
                (loss_value, grad)
            }
        };

        // Backward pass and parameter updates, layer by layer in reverse
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad)?;
            if let Some(optimizer) = self.optimizer.as_mut() {
                optimizer.update(&mut **layer);
            }
        }

        Ok((loss_value, output))
    }

    fn evaluate_on(&mut self, x: &Tensor, y: &Tensor) -> Result<(f32, Vec<(String, f32)>), ModelError> {
        let output = self.forward_all(x)?;
        let loss_fn = self.loss.as_ref().ok_or(ModelError::NotCompiled)?;
        let loss = loss_fn.compute_loss(y, &output);
        let metrics = self
            .metrics
            .iter()
            .map(|metric| (metric.name().to_string(), metric.compute(y, &output)))
            .collect();
        Ok((loss, metrics))
    }

    /// Trains the model on the provided data.
    ///
    /// Runs `config.epochs - config.initial_epoch` passes over the training
    /// portion of the data. Each pass optionally re-shuffles the samples,
    /// splits them into batches of `config.batch_size`, and performs one
    /// gradient update per batch (forward pass, loss gradient, backward
    /// pass, optimizer update). Per-class and per-sample loss weights scale
    /// each sample's contribution to the loss and its gradient.
    ///
    /// When validation data is configured (explicitly or through
    /// `validation_split`), it is evaluated at the end of every epoch.
    /// Callbacks are invoked at train, epoch and batch boundaries; an
    /// epoch-end callback may stop the run early.
    ///
    /// # Parameters
    ///
    /// - `x` - Feature tensor with shape (samples, input width)
    /// - `y` - Target tensor with shape (samples, output width)
    /// - `config` - Named training parameters; see [`FitConfig`]
    ///
    /// # Returns
    ///
    /// - `Ok(History)` - Per-epoch loss and metric statistics
    /// - `Err(ModelError)` - The model is not compiled, the data is
    ///   malformed, or a configured parameter is invalid
    pub fn fit(&mut self, x: &Tensor, y: &Tensor, mut config: FitConfig) -> Result<History, ModelError> {
        self.ensure_built()?;
        if !self.compiled {
            return Err(ModelError::NotCompiled);
        }
        self.validate_xy(x, y)?;

        let n_samples = x.shape()[0];
        config.validate_for(n_samples, y.ndim())?;

        // Resolve the validation strategy: explicit data overrides the split
        let mut validation = config.validation_data.take();
        let n_train = match (&validation, config.validation_split) {
            (None, Some(fraction)) => {
                // Hold out the tail of the provided arrays, before shuffling
                let n_train = (n_samples as f32 * (1.0 - fraction)) as usize;
                if n_train == 0 {
                    return Err(ModelError::InputValidationError(format!(
                        "validation_split {} leaves no training samples",
                        fraction
                    )));
                }
                if n_train < n_samples {
                    let val_x = x.slice_axis(Axis(0), Slice::from(n_train..)).to_owned();
                    let val_y = y.slice_axis(Axis(0), Slice::from(n_train..)).to_owned();
                    validation = Some((val_x, val_y));
                }
                n_train
            }
            _ => n_samples,
        };

        if let Some((val_x, val_y)) = &validation {
            self.validate_xy(val_x, val_y)?;
        }

        let (x_train, y_train) = if n_train == n_samples {
            (x.clone(), y.clone())
        } else {
            (
                x.slice_axis(Axis(0), Slice::from(..n_train)).to_owned(),
                y.slice_axis(Axis(0), Slice::from(..n_train)).to_owned(),
            )
        };

        if config.batch_size > n_train {
            return Err(ModelError::InputValidationError(format!(
                "batch_size ({}) cannot be larger than the training set ({})",
                config.batch_size, n_train
            )));
        }

        let sample_weights = resolve_sample_weights(&y_train, &config, n_train);
        let mut callbacks = std::mem::take(&mut config.callbacks);

        let batches_per_epoch = n_train.div_ceil(config.batch_size);
        let epochs_to_run = config.epochs.saturating_sub(config.initial_epoch) as u64;

        let progress_bar = if config.verbose == Verbosity::ProgressBar && epochs_to_run > 0 {
            let bar = ProgressBar::new(epochs_to_run * batches_per_epoch as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | Epoch {msg}")
                    .expect("Failed to set progress bar template")
                    .progress_chars("█▓░"),
            );
            Some(bar)
        } else {
            None
        };

        let mut history = History::default();
        for callback in &mut callbacks {
            callback.on_train_begin(config.epochs);
        }

        let mut indices: Vec<usize> = (0..n_train).collect();
        let mut stopped = false;

        for epoch in config.initial_epoch..config.epochs {
            for callback in &mut callbacks {
                callback.on_epoch_begin(epoch);
            }

            if config.shuffle {
                indices.shuffle(&mut rand::rng());
            }

            let mut loss_sum = 0.0f32;
            let mut seen = 0usize;
            let mut metric_sums = vec![0.0f32; self.metrics.len()];

            for (batch_index, batch_indices) in indices.chunks(config.batch_size).enumerate() {
                for callback in &mut callbacks {
                    callback.on_batch_begin(epoch, batch_index);
                }

                let (batch_x, batch_y, batch_w) =
                    gather_batch(&x_train, &y_train, sample_weights.as_ref(), batch_indices)?;
                let (batch_loss, batch_pred) =
                    self.train_batch(&batch_x, &batch_y, batch_w.as_ref())?;

                let batch_len = batch_indices.len();
                seen += batch_len;
                loss_sum += batch_loss * batch_len as f32;
                for (sum, metric) in metric_sums.iter_mut().zip(self.metrics.iter()) {
                    *sum += metric.compute(&batch_y, &batch_pred) * batch_len as f32;
                }

                for callback in &mut callbacks {
                    callback.on_batch_end(epoch, batch_index, batch_loss);
                }

                if let Some(bar) = &progress_bar {
                    bar.set_message(format!(
                        "{}/{} | loss: {:.6}",
                        epoch + 1,
                        config.epochs,
                        loss_sum / seen as f32
                    ));
                    bar.inc(1);
                }
            }

            let train_loss = loss_sum / n_train as f32;
            let metrics: Vec<(String, f32)> = self
                .metrics
                .iter()
                .zip(&metric_sums)
                .map(|(metric, sum)| (metric.name().to_string(), sum / n_train as f32))
                .collect();

            let (val_loss, val_metrics) = match &validation {
                Some((val_x, val_y)) => {
                    let (loss, metrics) = self.evaluate_on(val_x, val_y)?;
                    (Some(loss), metrics)
                }
                None => (None, Vec::new()),
            };

            let stats = EpochStats {
                epoch,
                loss: train_loss,
                metrics,
                val_loss,
                val_metrics,
            };

            if config.verbose == Verbosity::PerEpoch {
                println!("{}", format_epoch_line(&stats, config.epochs));
            }

            for callback in &mut callbacks {
                if callback.on_epoch_end(epoch, &stats) == CallbackAction::Stop {
                    stopped = true;
                }
            }

            history.epochs.push(stats);
            if stopped {
                break;
            }
        }

        if let Some(bar) = &progress_bar {
            if stopped {
                bar.abandon_with_message("Training stopped early");
            } else {
                bar.finish_with_message("Training completed");
            }
        }

        for callback in &mut callbacks {
            callback.on_train_end(&history);
        }

        Ok(history)
    }

    /// Computes the loss and the compiled metrics on held-out data without
    /// updating any weights.
    ///
    /// # Returns
    ///
    /// - `Ok((loss, metrics))` - Scalar loss and (name, value) metric pairs
    /// - `Err(ModelError)` - The model is not compiled or the data is malformed
    pub fn evaluate(&mut self, x: &Tensor, y: &Tensor) -> Result<(f32, Vec<(String, f32)>), ModelError> {
        self.ensure_built()?;
        if !self.compiled {
            return Err(ModelError::NotCompiled);
        }
        self.validate_xy(x, y)?;
        self.evaluate_on(x, y)
    }

    /// Generates predictions for the input data.
    ///
    /// Only performs a forward pass; compilation is not required.
    ///
    /// # Parameters
    ///
    /// - `x` - Feature tensor with shape (samples, input width)
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - The model's predictions
    /// - `Err(ModelError)` - The model cannot be finalized or the input is malformed
    pub fn predict(&mut self, x: &Tensor) -> Result<Tensor, ModelError> {
        self.ensure_built()?;
        self.validate_features(x)?;
        self.forward_all(x)
    }

    /// Prints a summary of the model's structure.
    ///
    /// Displays each layer's name, output shape and parameter count in a
    /// tabular format, followed by parameter totals. The model must be
    /// finalized first.
    pub fn summary(&self) -> Result<(), ModelError> {
        if !self.built {
            return Err(ModelError::ConfigError(
                "model must be finalized before summary(); call compile() or run a forward pass"
                    .to_string(),
            ));
        }

        let col1_width = 33;
        let col2_width = 24;
        let col3_width = 15;
        println!("Model: \"sequential\"");
        println!(
            "┏{}┳{}┳{}┓",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );
        println!(
            "┃ {:<31} ┃ {:<22} ┃ {:>13} ┃",
            "Layer (type)", "Output Shape", "Param #"
        );
        println!(
            "┡{}╇{}╇{}┩",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );

        let mut total_params = 0usize;
        let mut trainable_params = 0usize;
        let mut non_trainable_params = 0usize;
        let mut type_counts: AHashMap<String, usize> = AHashMap::new();

        for layer in &self.layers {
            let type_name = layer.layer_type().to_lowercase();
            let seen = type_counts.entry(type_name.clone()).or_insert(0);
            let layer_name = if *seen == 0 {
                type_name.clone()
            } else {
                format!("{}_{}", type_name, seen)
            };
            *seen += 1;

            let param_count = layer.param_count();
            match param_count {
                TrainingParameters::Trainable(count) => trainable_params += count,
                TrainingParameters::NonTrainable(count) => non_trainable_params += count,
            }
            total_params += param_count.count();

            println!(
                "│ {:<31} │ {:<22} │ {:>13} │",
                format!("{} ({})", layer_name, layer.layer_type()),
                layer.output_shape(),
                param_count.count()
            );
        }
        println!(
            "└{}┴{}┴{}┘",
            "─".repeat(col1_width),
            "─".repeat(col2_width),
            "─".repeat(col3_width)
        );
        // f32 parameters, 4 bytes each
        println!(" Total params: {} ({} B)", total_params, total_params * 4);
        println!(
            " Trainable params: {} ({} B)",
            trainable_params,
            trainable_params * 4
        );
        println!(
            " Non-trainable params: {} ({} B)",
            non_trainable_params,
            non_trainable_params * 4
        );

        Ok(())
    }

    /// Returns the weights of every layer in the model.
    ///
    /// Layers without trainable parameters (and unbuilt layers) contribute
    /// `LayerWeight::Empty`.
    pub fn get_weights(&self) -> Vec<LayerWeight<'_>> {
        self.layers.iter().map(|layer| layer.get_weights()).collect()
    }

    /// Saves the model structure and weights to a JSON file.
    ///
    /// The optimizer, loss and metrics are not saved; reconfigure them with
    /// `compile` after loading.
    ///
    /// # Parameters
    ///
    /// - `path` - Destination file path
    pub fn save_to_path(&self, path: &str) -> Result<(), IoError> {
        let saved = serialize::model_to_saved(&self.layers)?;

        let file = File::create(path).map_err(IoError::StdIoError)?;
        let mut writer = BufWriter::new(file);
        to_writer_pretty(&mut writer, &saved).map_err(IoError::JsonError)?;
        writer.flush().map_err(IoError::StdIoError)?;

        Ok(())
    }

    /// Loads weights from a JSON file into this model.
    ///
    /// The model must already have the same architecture (layer count,
    /// types and shapes) as the saved one and must be finalized; only the
    /// parameters are restored.
    ///
    /// # Parameters
    ///
    /// - `path` - Source file path
    pub fn load_from_path(&mut self, path: &str) -> Result<(), IoError> {
        let reader = IoError::load_in_buf_reader(path)?;
        let saved: SavedModel = from_reader(reader).map_err(IoError::JsonError)?;

        if saved.layers.len() != self.layers.len() {
            return Err(IoError::StructureMismatch(format!(
                "model has {} layers, file has {}",
                self.layers.len(),
                saved.layers.len()
            )));
        }

        for (layer, saved_layer) in self.layers.iter_mut().zip(saved.layers.iter()) {
            serialize::apply_saved_layer(layer.as_mut(), saved_layer)?;
        }

        Ok(())
    }
}

impl Default for Sequential {
    fn default() -> Self {
        Self::new()
    }
}

/// Combines per-sample and per-class weighting into one weight per training
/// sample. Returns `None` when neither is configured.
fn resolve_sample_weights(
    y_train: &Tensor,
    config: &FitConfig,
    n_train: usize,
) -> Option<Array1<f32>> {
    if config.sample_weight.is_none() && config.class_weight.is_none() {
        return None;
    }

    let mut weights = Array1::from_elem(n_train, 1.0f32);

    if let Some(sample_weight) = &config.sample_weight {
        // Validated against the full sample count; the training portion is
        // the leading slice
        for (weight, &factor) in weights.iter_mut().zip(sample_weight.iter()) {
            *weight *= factor;
        }
    }

    if let Some(class_weight) = &config.class_weight {
        for (i, row) in y_train.axis_iter(Axis(0)).enumerate() {
            if let Some(&factor) = class_weight.get(&row_class(&row)) {
                weights[i] *= factor;
            }
        }
    }

    Some(weights)
}

/// Class index of a target row: argmax for one-hot rows, 0.5 threshold for
/// single-column targets.
fn row_class(row: &ArrayViewD<'_, f32>) -> usize {
    if row.len() == 1 {
        (row.iter().next().copied().unwrap_or(0.0) >= 0.5) as usize
    } else {
        let mut best = 0;
        let mut best_val = f32::NEG_INFINITY;
        for (i, &v) in row.iter().enumerate() {
            if v > best_val {
                best_val = v;
                best = i;
            }
        }
        best
    }
}

/// Assembles the tensors (and weight vector) for one batch of samples.
fn gather_batch(
    x: &Tensor,
    y: &Tensor,
    weights: Option<&Array1<f32>>,
    indices: &[usize],
) -> Result<(Tensor, Tensor, Option<Array1<f32>>), ModelError> {
    let batch_size = indices.len();

    let mut x_shape = x.shape().to_vec();
    x_shape[0] = batch_size;
    let mut y_shape = y.shape().to_vec();
    y_shape[0] = batch_size;

    let mut x_data = Vec::with_capacity(x_shape.iter().product());
    let mut y_data = Vec::with_capacity(y_shape.iter().product());

    for &idx in indices {
        x_data.extend(x.index_axis(Axis(0), idx).iter().cloned());
        y_data.extend(y.index_axis(Axis(0), idx).iter().cloned());
    }

    let batch_x = Array::from_shape_vec(IxDyn(&x_shape), x_data).map_err(|e| {
        ModelError::ProcessingError(format!("failed to create batch tensor for x: {}", e))
    })?;
    let batch_y = Array::from_shape_vec(IxDyn(&y_shape), y_data).map_err(|e| {
        ModelError::ProcessingError(format!("failed to create batch tensor for y: {}", e))
    })?;

    let batch_w = weights.map(|w| indices.iter().map(|&i| w[i]).collect::<Array1<f32>>());

    Ok((batch_x, batch_y, batch_w))
}

fn format_epoch_line(stats: &EpochStats, total_epochs: u32) -> String {
    let mut line = format!(
        "Epoch {}/{} - loss: {:.4}",
        stats.epoch + 1,
        total_epochs,
        stats.loss
    );
    for (name, value) in &stats.metrics {
        line.push_str(&format!(" - {}: {:.4}", name, value));
    }
    if let Some(val_loss) = stats.val_loss {
        line.push_str(&format!(" - val_loss: {:.4}", val_loss));
    }
    for (name, value) in &stats.val_metrics {
        line.push_str(&format!(" - val_{}: {:.4}", name, value));
    }
    line
}
