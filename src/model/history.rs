use serde::Serialize;

/// Per-epoch training statistics collected during a fit run.
///
/// # Fields
///
/// - `epoch` - 0-based epoch index (resumed runs start at the configured
///   initial epoch)
/// - `loss` - Mean training loss over the epoch, weighted by batch size
/// - `metrics` - (name, value) pairs for each compiled metric, averaged over
///   the epoch's batches
/// - `val_loss` - Loss on the validation set, when one is configured
/// - `val_metrics` - Metric values on the validation set
#[derive(Debug, Clone, Serialize)]
pub struct EpochStats {
    pub epoch: u32,
    pub loss: f32,
    pub metrics: Vec<(String, f32)>,
    pub val_loss: Option<f32>,
    pub val_metrics: Vec<(String, f32)>,
}

/// Record of a completed fit run, one entry per trained epoch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct History {
    pub epochs: Vec<EpochStats>,
}

impl History {
    /// Training loss of the last completed epoch, if any epoch ran.
    pub fn final_loss(&self) -> Option<f32> {
        self.epochs.last().map(|stats| stats.loss)
    }

    /// Validation loss of the last completed epoch, if validation ran.
    pub fn final_val_loss(&self) -> Option<f32> {
        self.epochs.last().and_then(|stats| stats.val_loss)
    }

    /// The series of training losses, one per epoch.
    pub fn losses(&self) -> Vec<f32> {
        self.epochs.iter().map(|stats| stats.loss).collect()
    }
}
