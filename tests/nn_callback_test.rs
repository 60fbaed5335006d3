use layerstack::layer::dense::Dense;
use layerstack::model::callback::{Callback, CallbackAction};
use layerstack::model::fit_config::{FitConfig, Verbosity};
use layerstack::model::history::{EpochStats, History};
use layerstack::model::sequential::Sequential;
use ndarray::Array;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Counters {
    train_begin: AtomicUsize,
    epoch_begin: AtomicUsize,
    batch_begin: AtomicUsize,
    batch_end: AtomicUsize,
    epoch_end: AtomicUsize,
    train_end: AtomicUsize,
}

struct Recorder {
    counters: Arc<Counters>,
}

impl Callback for Recorder {
    fn on_train_begin(&mut self, _total_epochs: u32) {
        self.counters.train_begin.fetch_add(1, Ordering::SeqCst);
    }

    fn on_epoch_begin(&mut self, _epoch: u32) {
        self.counters.epoch_begin.fetch_add(1, Ordering::SeqCst);
    }

    fn on_batch_begin(&mut self, _epoch: u32, _batch: usize) {
        self.counters.batch_begin.fetch_add(1, Ordering::SeqCst);
    }

    fn on_batch_end(&mut self, _epoch: u32, _batch: usize, _loss: f32) {
        self.counters.batch_end.fetch_add(1, Ordering::SeqCst);
    }

    fn on_epoch_end(&mut self, _epoch: u32, _stats: &EpochStats) -> CallbackAction {
        self.counters.epoch_end.fetch_add(1, Ordering::SeqCst);
        CallbackAction::Continue
    }

    fn on_train_end(&mut self, _history: &History) {
        self.counters.train_end.fetch_add(1, Ordering::SeqCst);
    }
}

/// Requests a stop as soon as the given number of epochs have finished.
struct StopAfter {
    epochs: usize,
    seen: usize,
}

impl Callback for StopAfter {
    fn on_epoch_end(&mut self, _epoch: u32, _stats: &EpochStats) -> CallbackAction {
        self.seen += 1;
        if self.seen >= self.epochs {
            CallbackAction::Stop
        } else {
            CallbackAction::Continue
        }
    }
}

fn small_model() -> Sequential {
    let mut model = Sequential::new();
    model.add(Dense::new(1).input_shape(2)).unwrap();
    model.compile("sgd", "mse", vec![]).unwrap();
    model
}

#[test]
fn callbacks_fire_at_every_boundary_test() {
    let mut model = small_model();
    let x = Array::ones((8, 2)).into_dyn();
    let y = Array::ones((8, 1)).into_dyn();

    let counters = Arc::new(Counters::default());
    let recorder = Recorder {
        counters: Arc::clone(&counters),
    };

    // 3 epochs x (8 samples / batch of 4) = 6 gradient updates
    model
        .fit(
            &x,
            &y,
            FitConfig::default()
                .verbose(Verbosity::Silent)
                .epochs(3)
                .batch_size(4)
                .callback(Box::new(recorder)),
        )
        .unwrap();

    assert_eq!(counters.train_begin.load(Ordering::SeqCst), 1);
    assert_eq!(counters.epoch_begin.load(Ordering::SeqCst), 3);
    assert_eq!(counters.batch_begin.load(Ordering::SeqCst), 6);
    assert_eq!(counters.batch_end.load(Ordering::SeqCst), 6);
    assert_eq!(counters.epoch_end.load(Ordering::SeqCst), 3);
    assert_eq!(counters.train_end.load(Ordering::SeqCst), 1);
}

#[test]
fn early_stop_ends_training_test() {
    let mut model = small_model();
    let x = Array::ones((4, 2)).into_dyn();
    let y = Array::ones((4, 1)).into_dyn();

    let history = model
        .fit(
            &x,
            &y,
            FitConfig::default()
                .verbose(Verbosity::Silent)
                .epochs(10)
                .batch_size(4)
                .callback(Box::new(StopAfter { epochs: 1, seen: 0 })),
        )
        .unwrap();

    // The epoch that requested the stop is still recorded
    assert_eq!(history.epochs.len(), 1);
}
