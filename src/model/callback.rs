use crate::model::history::{EpochStats, History};

/// Decision returned by the epoch-end hook.
///
/// Returning `Stop` ends the fit run after the current epoch; the history
/// still contains the epoch that requested the stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Continue,
    Stop,
}

/// Hooks invoked at training-stage boundaries during a fit run.
///
/// All methods have no-op defaults; implement only the boundaries of
/// interest. Callbacks are supplied per fit invocation through
/// [`FitConfig::callback`](crate::model::FitConfig::callback).
///
/// # Example
/// ```rust
/// use layerstack::model::{Callback, CallbackAction, EpochStats};
///
/// /// Stops training once the epoch loss falls below a threshold.
/// struct StopBelow(f32);
///
/// impl Callback for StopBelow {
///     fn on_epoch_end(&mut self, _epoch: u32, stats: &EpochStats) -> CallbackAction {
///         if stats.loss < self.0 {
///             CallbackAction::Stop
///         } else {
///             CallbackAction::Continue
///         }
///     }
/// }
/// ```
pub trait Callback: Send {
    /// Called once before the first epoch.
    fn on_train_begin(&mut self, _total_epochs: u32) {}

    /// Called at the start of every epoch.
    fn on_epoch_begin(&mut self, _epoch: u32) {}

    /// Called before each gradient update.
    fn on_batch_begin(&mut self, _epoch: u32, _batch: usize) {}

    /// Called after each gradient update with the batch loss.
    fn on_batch_end(&mut self, _epoch: u32, _batch: usize, _loss: f32) {}

    /// Called at the end of every epoch with its statistics.
    fn on_epoch_end(&mut self, _epoch: u32, _stats: &EpochStats) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called once after the last epoch (or after an early stop).
    fn on_train_end(&mut self, _history: &History) {}
}
