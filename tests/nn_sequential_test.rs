use layerstack::Tensor;
use layerstack::layer::activation::Activation;
use layerstack::layer::dense::Dense;
use layerstack::layer::{DenseLayerWeight, LayerWeight};
use layerstack::metric::Metric;
use layerstack::model::fit_config::{FitConfig, Verbosity};
use layerstack::model::sequential::Sequential;
use layerstack::optimizer::adam::Adam;
use layerstack::optimizer::sgd::SGD;
use ndarray::{Array, Array2, Axis};

fn silent(epochs: u32) -> FitConfig {
    FitConfig::default().verbose(Verbosity::Silent).epochs(epochs)
}

fn collect_dense_weights(model: &Sequential) -> Vec<(Array2<f32>, Array2<f32>)> {
    model
        .get_weights()
        .into_iter()
        .filter_map(|layer_weight| match layer_weight {
            LayerWeight::Dense(DenseLayerWeight { weight, bias }) => {
                Some((weight.to_owned(), bias.to_owned()))
            }
            _ => None,
        })
        .collect()
}

fn max_abs_diff_2d(a: &Array2<f32>, b: &Array2<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .fold(0.0_f32, |max, (lhs, rhs)| max.max((lhs - rhs).abs()))
}

// Helper function: calculate mean squared error
fn calculate_mse(y_true: &Tensor, y_pred: &Tensor) -> f32 {
    let diff = y_pred - y_true;
    let squared_diff = &diff * &diff;
    squared_diff.sum() / (y_true.len() as f32)
}

#[test]
fn tutorial_stack_shapes_test() {
    // 784 -> 32 (relu) -> 10 (softmax), the classic flattened-image stack
    let mut model = Sequential::new();
    model
        .add(Dense::new(32).input_shape(784))
        .unwrap()
        .add(Activation::relu())
        .unwrap()
        .add(Dense::new(10))
        .unwrap()
        .add(Activation::softmax())
        .unwrap();

    assert_eq!(model.input_dim(), Some(784));
    assert_eq!(model.output_dim(), Some(10));
    assert_eq!(model.layer_count(), 4);

    model
        .compile("rmsprop", "categorical_crossentropy", vec![Metric::Accuracy])
        .unwrap();

    // 784*32 + 32 and 32*10 + 10 parameters for the two dense layers
    let dense_weights = collect_dense_weights(&model);
    assert_eq!(dense_weights.len(), 2);
    assert_eq!(dense_weights[0].0.dim(), (784, 32));
    assert_eq!(dense_weights[0].1.dim(), (1, 32));
    assert_eq!(dense_weights[1].0.dim(), (32, 10));
    assert_eq!(dense_weights[1].1.dim(), (1, 10));

    // Softmax output: each prediction row sums to one
    let x = Array::ones((3, 784)).into_dyn();
    let predictions = model.predict(&x).unwrap();
    assert_eq!(predictions.shape(), &[3, 10]);
    for row in predictions.axis_iter(Axis(0)) {
        assert!((row.sum() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn recompile_replaces_training_configuration_test() {
    let mut model = Sequential::new();
    model
        .add(Dense::new(32).input_shape(784))
        .unwrap()
        .add(Activation::relu())
        .unwrap()
        .add(Dense::new(10))
        .unwrap()
        .add(Activation::softmax())
        .unwrap();

    // The same model can be compiled repeatedly; each call replaces the
    // optimizer, loss and metrics wholesale
    model
        .compile("rmsprop", "categorical_crossentropy", vec![Metric::Accuracy])
        .unwrap();
    model
        .compile("rmsprop", "binary_crossentropy", vec![Metric::Accuracy])
        .unwrap();
    model.compile("rmsprop", "mse", vec![]).unwrap();

    assert!(model.is_compiled());

    // A short fit still works after the final compile
    let x = Array::ones((8, 784)).into_dyn();
    let y = Array::ones((8, 10)).into_dyn();
    let history = model.fit(&x, &y, silent(1).batch_size(8)).unwrap();
    assert_eq!(history.epochs.len(), 1);
}

#[test]
fn test_fit_linear_regression_convergence() {
    // Generate simple linear relationship data: y = 2*x + 1
    let mut x_data = Vec::new();
    let mut y_data = Vec::new();
    for i in 0..100 {
        let x_val = i as f32 / 50.0;
        x_data.push(x_val);
        y_data.push(2.0 * x_val + 1.0);
    }

    let x = Array::from_shape_vec((100, 1), x_data).unwrap().into_dyn();
    let y = Array::from_shape_vec((100, 1), y_data).unwrap().into_dyn();

    let mut model = Sequential::new();
    model.add(Dense::new(1).input_shape(1)).unwrap();
    model.compile(SGD::new(0.01).unwrap(), "mse", vec![]).unwrap();

    let initial_predictions = model.predict(&x).unwrap();
    let initial_loss = calculate_mse(&y, &initial_predictions);

    model
        .fit(&x, &y, silent(100).batch_size(100).shuffle(false))
        .unwrap();

    let final_predictions = model.predict(&x).unwrap();
    let final_loss = calculate_mse(&y, &final_predictions);

    assert!(
        final_loss < initial_loss,
        "Final loss ({:.6}) should be less than initial loss ({:.6})",
        final_loss,
        initial_loss
    );
    assert!(
        final_loss < 0.4,
        "For a simple linear relationship, final loss ({:.6}) should be less than 0.4",
        final_loss
    );

    // Prediction for a known input should be close to 2*1 + 1 = 3
    let test_x = Array::from_shape_vec((1, 1), vec![1.0]).unwrap().into_dyn();
    let prediction = model.predict(&test_x).unwrap();
    assert!(
        (prediction[[0, 0]] - 3.0).abs() <= 0.5,
        "Prediction ({:.3}) for input 1.0 should be close to 3.0",
        prediction[[0, 0]]
    );
}

#[test]
fn test_fit_classification_convergence() {
    // Two linearly separable clusters with a little noise
    let mut x_data = Vec::new();
    let mut y_data = Vec::new();

    for i in 0..50 {
        let x1 = -2.0 + (i as f32 / 25.0) + (rand::random::<f32>() - 0.5) * 0.5;
        let x2 = -2.0 + (i as f32 / 25.0) + (rand::random::<f32>() - 0.5) * 0.5;
        x_data.extend_from_slice(&[x1, x2]);
        y_data.extend_from_slice(&[1.0, 0.0]);
    }
    for i in 0..50 {
        let x1 = 0.5 + (i as f32 / 25.0) + (rand::random::<f32>() - 0.5) * 0.5;
        let x2 = 0.5 + (i as f32 / 25.0) + (rand::random::<f32>() - 0.5) * 0.5;
        x_data.extend_from_slice(&[x1, x2]);
        y_data.extend_from_slice(&[0.0, 1.0]);
    }

    let x = Array::from_shape_vec((100, 2), x_data).unwrap().into_dyn();
    let y = Array::from_shape_vec((100, 2), y_data).unwrap().into_dyn();

    let mut model = Sequential::new();
    model
        .add(Dense::new(4).input_shape(2))
        .unwrap()
        .add(Activation::relu())
        .unwrap()
        .add(Dense::new(2))
        .unwrap()
        .add(Activation::softmax())
        .unwrap();
    model
        .compile(
            Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap(),
            "categorical_crossentropy",
            vec![Metric::Accuracy],
        )
        .unwrap();

    model
        .fit(&x, &y, silent(150).batch_size(100))
        .unwrap();

    let (_, metrics) = model.evaluate(&x, &y).unwrap();
    let accuracy = metrics
        .iter()
        .find(|(name, _)| name == "accuracy")
        .map(|(_, value)| *value)
        .unwrap();
    assert!(
        accuracy > 0.7,
        "For a separable classification task, final accuracy ({:.3}) should exceed 0.7",
        accuracy
    );

    // Points deep inside each cluster should be classified accordingly
    let test_x = Array::from_shape_vec((2, 2), vec![-1.5, -1.5, 1.5, 1.5])
        .unwrap()
        .into_dyn();
    let predictions = model.predict(&test_x).unwrap();
    assert!(
        predictions[[0, 0]] > predictions[[0, 1]],
        "Sample [-1.5, -1.5] should be classified as class 0"
    );
    assert!(
        predictions[[1, 1]] > predictions[[1, 0]],
        "Sample [1.5, 1.5] should be classified as class 1"
    );
}

#[test]
fn test_fit_parameter_updates() {
    let x = Array::from_shape_vec(
        (10, 2),
        vec![
            1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0, 5.0, 5.0, 6.0, 1.5, 2.5, 2.5, 3.5, 3.5, 4.5, 4.5,
            5.5, 5.5, 6.5,
        ],
    )
    .unwrap()
    .into_dyn();
    let y = Array::from_shape_vec(
        (10, 1),
        vec![3.0, 5.0, 7.0, 9.0, 11.0, 4.0, 6.0, 8.0, 10.0, 12.0],
    )
    .unwrap()
    .into_dyn();

    let mut model = Sequential::new();
    model
        .add(Dense::new(3).input_shape(2))
        .unwrap()
        .add(Dense::new(1))
        .unwrap();
    model.compile(SGD::new(0.01).unwrap(), "mse", vec![]).unwrap();

    let initial_params = collect_dense_weights(&model);

    model.fit(&x, &y, silent(20).batch_size(10)).unwrap();

    let final_params = collect_dense_weights(&model);
    assert_eq!(initial_params.len(), final_params.len());
    assert!(!initial_params.is_empty());

    for (i, ((initial_w, initial_b), (final_w, final_b))) in
        initial_params.iter().zip(final_params.iter()).enumerate()
    {
        let weight_delta = max_abs_diff_2d(initial_w, final_w);
        let bias_delta = max_abs_diff_2d(initial_b, final_b);
        assert!(
            weight_delta > 1e-6 || bias_delta > 1e-6,
            "Layer {} parameters should change during training (weight delta {:.6}, bias delta {:.6})",
            i,
            weight_delta,
            bias_delta
        );
    }
}

#[test]
fn test_fit_error_handling() {
    let mut model = Sequential::new();
    model.add(Dense::new(1).input_shape(2)).unwrap();

    let x = Array::ones((5, 2)).into_dyn();
    let y = Array::ones((5, 1)).into_dyn();

    // Uncompiled model cannot be trained
    assert!(model.fit(&x, &y, silent(10)).is_err());

    model.compile(SGD::new(0.01).unwrap(), "mse", vec![]).unwrap();

    // Empty data
    let empty_x = Array::zeros((0, 2)).into_dyn();
    let empty_y = Array::zeros((0, 1)).into_dyn();
    assert!(model.fit(&empty_x, &empty_y, silent(10)).is_err());

    // Sample count mismatch
    let y_mismatch = Array::ones((3, 1)).into_dyn();
    assert!(model.fit(&x, &y_mismatch, silent(10)).is_err());

    // Feature width mismatch
    let x_wide = Array::ones((5, 7)).into_dyn();
    assert!(model.fit(&x_wide, &y, silent(10)).is_err());

    // Target width mismatch
    let y_wide = Array::ones((5, 4)).into_dyn();
    assert!(model.fit(&x, &y_wide, silent(10)).is_err());
}

#[test]
fn add_requires_established_input_shape_test() {
    let mut model = Sequential::new();

    // A shape-dependent layer with no way to infer its input width
    let result = model.add(Dense::new(10));
    assert!(result.is_err());

    // Declaring the width makes the same stack valid
    assert!(model.add(Dense::new(10).input_shape(4)).is_ok());
    assert!(model.add(Dense::new(3)).is_ok());
}

#[test]
fn add_rejects_contradictory_input_shape_test() {
    let mut model = Sequential::new();
    model.add(Dense::new(32).input_shape(784)).unwrap();

    // The previous layer produces 32 values, not 99
    assert!(model.add(Dense::new(5).input_shape(99)).is_err());
    assert!(model.add(Dense::new(5).input_shape(32)).is_ok());
}

#[test]
fn add_after_compile_is_rejected_test() {
    let mut model = Sequential::new();
    model.add(Dense::new(4).input_shape(2)).unwrap();
    model.compile("sgd", "mse", vec![]).unwrap();

    assert!(model.add(Dense::new(1)).is_err());
}

#[test]
fn predict_without_compile_test() {
    // Prediction only needs the model to be finalized, not compiled
    let mut model = Sequential::new();
    model
        .add(Dense::new(4).input_shape(3))
        .unwrap()
        .add(Activation::tanh())
        .unwrap();

    let x = Array::ones((2, 3)).into_dyn();
    let predictions = model.predict(&x).unwrap();
    assert_eq!(predictions.shape(), &[2, 4]);

    // Evaluation, in contrast, needs a loss function
    let y = Array::ones((2, 4)).into_dyn();
    assert!(model.evaluate(&x, &y).is_err());
}

#[test]
fn unknown_selector_names_test() {
    let mut model = Sequential::new();
    model.add(Dense::new(1).input_shape(2)).unwrap();

    assert!(model.compile("rmsprp", "mse", vec![]).is_err());
    assert!(model.compile("rmsprop", "msq", vec![]).is_err());
    assert!("accurracy".parse::<Metric>().is_err());

    // Correct names still work afterwards
    assert!(model.compile("rmsprop", "mse", vec![]).is_ok());
}
