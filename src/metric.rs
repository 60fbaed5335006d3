use crate::Tensor;
use crate::error::ModelError;
use ndarray::Axis;
use std::str::FromStr;
use std::sync::Arc;

/// Signature of a user-supplied metric: `(y_true, y_pred) -> scalar`.
pub type MetricFn = dyn Fn(&Tensor, &Tensor) -> f32 + Send + Sync;

/// An evaluation metric attached to a model at compile time.
///
/// Metrics are computed on predictions during training (running average over
/// batches) and on validation data at the end of each epoch. They never
/// influence the gradients.
///
/// # Variants
///
/// - `Accuracy` - fraction of correctly classified samples; argmax match for
///   multi-column targets, 0.5 threshold for single-column targets
/// - `Custom` - a named user closure of `(y_true, y_pred)`
///
/// # Example
/// ```rust
/// use layerstack::metric::Metric;
///
/// // Predefined, by name or variant
/// let by_name: Metric = "accuracy".parse().unwrap();
/// assert_eq!(by_name, Metric::Accuracy);
///
/// // Custom: mean of the predictions, ignoring the true labels
/// let mean_pred = Metric::custom("mean_pred", |_y_true, y_pred| {
///     y_pred.mean().unwrap_or(0.0)
/// });
/// assert_eq!(mean_pred.name(), "mean_pred");
/// ```
#[derive(Clone)]
pub enum Metric {
    Accuracy,
    Custom {
        name: String,
        func: Arc<MetricFn>,
    },
}

impl Metric {
    /// Wraps a user-supplied metric closure under the given name.
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Tensor, &Tensor) -> f32 + Send + Sync + 'static,
    {
        Metric::Custom {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The name the metric is reported under in epoch statistics.
    pub fn name(&self) -> &str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::Custom { name, .. } => name,
        }
    }

    /// Computes the metric for a batch of predictions.
    pub fn compute(&self, y_true: &Tensor, y_pred: &Tensor) -> f32 {
        match self {
            Metric::Accuracy => accuracy(y_true, y_pred),
            Metric::Custom { func, .. } => func(y_true, y_pred),
        }
    }
}

impl FromStr for Metric {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "accuracy" | "acc" => Ok(Metric::Accuracy),
            other => Err(ModelError::ConfigError(format!(
                "unknown metric name: {}",
                other
            ))),
        }
    }
}

impl PartialEq for Metric {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Metric::Accuracy, Metric::Accuracy) => true,
            (Metric::Custom { name: a, .. }, Metric::Custom { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Metric").field(&self.name()).finish()
    }
}

/// Classification accuracy over a batch.
///
/// For targets with more than one column, a sample counts as correct when
/// the argmax of the prediction row matches the argmax of the target row.
/// For single-column targets, predictions are thresholded at 0.5.
///
/// # Parameters
///
/// - `y_true` - Ground truth tensor with samples along the first axis
/// - `y_pred` - Prediction tensor with the same shape
///
/// # Returns
///
/// - `f32` - Fraction of correctly classified samples in [0, 1]
pub fn accuracy(y_true: &Tensor, y_pred: &Tensor) -> f32 {
    let n_samples = y_true.shape()[0];
    if n_samples == 0 || y_true.shape() != y_pred.shape() {
        return 0.0;
    }

    let mut correct = 0usize;
    for (t_row, p_row) in y_true.axis_iter(Axis(0)).zip(y_pred.axis_iter(Axis(0))) {
        let matched = if t_row.len() == 1 {
            let t = t_row.iter().next().copied().unwrap_or(0.0);
            let p = p_row.iter().next().copied().unwrap_or(0.0);
            (t >= 0.5) == (p >= 0.5)
        } else {
            argmax(t_row.iter().cloned()) == argmax(p_row.iter().cloned())
        };
        if matched {
            correct += 1;
        }
    }

    correct as f32 / n_samples as f32
}

fn argmax(values: impl Iterator<Item = f32>) -> usize {
    let mut best = 0;
    let mut best_val = f32::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best_val {
            best_val = v;
            best = i;
        }
    }
    best
}
