//! Walkthrough of the sequential-model workflow: stack layers, compile with
//! an optimizer, a loss and metrics, then train with the default fit
//! parameters.
//!
//! Run with `cargo run --example sequential_model`.

use layerstack::prelude::*;
use ndarray::Array;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A sequential model is assembled layer by layer. The first layer
    // declares the input width; here a flattened 28x28 image, 784 values.
    // Every later layer infers its input from the previous layer's output.
    let mut model = Sequential::new();
    model
        .add(Dense::new(32).input_shape(784))?
        .add(Activation::relu())?
        .add(Dense::new(10))?
        .add(Activation::softmax())?;

    // For a multi-class classification problem
    model.compile("rmsprop", "categorical_crossentropy", vec![Metric::Accuracy])?;

    // For a binary classification problem
    model.compile("rmsprop", "binary_crossentropy", vec![Metric::Accuracy])?;

    // For a mean squared error regression problem
    model.compile("rmsprop", "mse", vec![])?;

    // Metrics can also be user closures of (y_true, y_pred). This one
    // reports the mean of the predictions and ignores the labels.
    let mean_pred = Metric::custom("mean_pred", |_y_true, y_pred| {
        y_pred.mean().unwrap_or(0.0)
    });
    model.compile(
        "rmsprop",
        "binary_crossentropy",
        vec![Metric::Accuracy, mean_pred],
    )?;

    model.summary()?;

    // Synthetic stand-in for a digit dataset: random features with one-hot
    // labels over ten classes.
    let n_samples = 256;
    let x = Array::random((n_samples, 784), Uniform::new(0.0, 1.0)).into_dyn();

    let mut rng = rand::rng();
    let mut y = Array::zeros((n_samples, 10));
    for i in 0..n_samples {
        let class = rng.random_range(0..10usize);
        y[[i, class]] = 1.0f32;
    }
    let y = y.into_dyn();

    // batch_size 32, 10 epochs, progress bar, shuffling on: the defaults.
    let history = model.fit(&x, &y, FitConfig::default())?;
    if let Some(loss) = history.final_loss() {
        println!("final training loss: {:.4}", loss);
    }

    let predictions = model.predict(&x)?;
    println!("prediction shape: {:?}", predictions.shape());

    Ok(())
}
