use ahash::AHashMap;
use layerstack::layer::dense::Dense;
use layerstack::model::fit_config::{FitConfig, SampleWeightMode, Verbosity};
use layerstack::model::sequential::Sequential;
use ndarray::{Array, Array1, Array2};

fn compiled_model(input_dim: usize, output_dim: usize) -> Sequential {
    let mut model = Sequential::new();
    model
        .add(Dense::new(output_dim).input_shape(input_dim))
        .unwrap();
    model.compile("sgd", "mse", vec![]).unwrap();
    model
}

fn silent(epochs: u32) -> FitConfig {
    FitConfig::default().verbose(Verbosity::Silent).epochs(epochs)
}

#[test]
fn default_parameters_test() {
    let config = FitConfig::default();

    assert_eq!(config.get_batch_size(), 32);
    assert_eq!(config.get_epochs(), 10);
    assert_eq!(config.get_verbose(), Verbosity::ProgressBar);
    assert_eq!(config.get_verbose().level(), 1);
    assert_eq!(config.get_validation_split(), None);
    assert!(config.get_shuffle());
    assert_eq!(config.get_initial_epoch(), 0);
}

#[test]
fn verbosity_levels_test() {
    assert_eq!(Verbosity::from_level(0).unwrap(), Verbosity::Silent);
    assert_eq!(Verbosity::from_level(1).unwrap(), Verbosity::ProgressBar);
    assert_eq!(Verbosity::from_level(2).unwrap(), Verbosity::PerEpoch);
    assert!(Verbosity::from_level(3).is_err());
}

#[test]
fn validation_split_test() {
    let mut model = compiled_model(2, 1);
    let x = Array::ones((100, 2)).into_dyn();
    let y = Array::ones((100, 1)).into_dyn();

    let history = model
        .fit(&x, &y, silent(3).batch_size(25).validation_split(0.25))
        .unwrap();

    assert_eq!(history.epochs.len(), 3);
    for stats in &history.epochs {
        assert!(stats.val_loss.is_some(), "each epoch should evaluate validation data");
    }
}

#[test]
fn validation_data_overrides_split_test() {
    let mut model = compiled_model(2, 1);
    let x = Array::ones((40, 2)).into_dyn();
    let y = Array::ones((40, 1)).into_dyn();

    // With explicit validation data the split is ignored, so all 40 samples
    // stay in the training set and a batch of 40 is legal
    let val_x = Array::zeros((10, 2)).into_dyn();
    let val_y = Array::zeros((10, 1)).into_dyn();
    let history = model
        .fit(
            &x,
            &y,
            silent(2)
                .batch_size(40)
                .validation_split(0.5)
                .validation_data(val_x, val_y),
        )
        .unwrap();

    assert_eq!(history.epochs.len(), 2);
    assert!(history.final_val_loss().is_some());
}

#[test]
fn invalid_validation_split_test() {
    let mut model = compiled_model(2, 1);
    let x = Array::ones((10, 2)).into_dyn();
    let y = Array::ones((10, 1)).into_dyn();

    assert!(model.fit(&x, &y, silent(1).validation_split(0.0)).is_err());
    assert!(model.fit(&x, &y, silent(1).validation_split(1.0)).is_err());
    assert!(model.fit(&x, &y, silent(1).validation_split(1.5)).is_err());
}

#[test]
fn batch_size_validation_test() {
    let mut model = compiled_model(2, 1);
    let x = Array::ones((10, 2)).into_dyn();
    let y = Array::ones((10, 1)).into_dyn();

    assert!(model.fit(&x, &y, silent(1).batch_size(0)).is_err());
    assert!(model.fit(&x, &y, silent(1).batch_size(11)).is_err());
    assert!(model.fit(&x, &y, silent(1).batch_size(10)).is_ok());
}

#[test]
fn initial_epoch_resumes_test() {
    let mut model = compiled_model(2, 1);
    let x = Array::ones((8, 2)).into_dyn();
    let y = Array::ones((8, 1)).into_dyn();

    // epochs is the index of the final epoch: 10 - 8 = 2 passes remain
    let history = model
        .fit(&x, &y, silent(10).batch_size(8).initial_epoch(8))
        .unwrap();
    assert_eq!(history.epochs.len(), 2);
    assert_eq!(history.epochs[0].epoch, 8);
    assert_eq!(history.epochs[1].epoch, 9);

    // Nothing left to train when the run already reached the final epoch
    let history = model
        .fit(&x, &y, silent(10).batch_size(8).initial_epoch(10))
        .unwrap();
    assert!(history.epochs.is_empty());
}

#[test]
fn zero_class_weight_freezes_training_test() {
    let mut model = compiled_model(2, 2);
    let x = Array::ones((6, 2)).into_dyn();

    // All samples belong to class 0
    let mut y = Array2::<f32>::zeros((6, 2));
    for i in 0..6 {
        y[[i, 0]] = 1.0;
    }
    let y = y.into_dyn();

    let initial = dense_weight(&model);

    let class_weight: AHashMap<usize, f32> = [(0usize, 0.0f32)].into_iter().collect();
    model
        .fit(
            &x,
            &y,
            silent(5).batch_size(6).class_weight(class_weight),
        )
        .unwrap();

    // Every sample's loss contribution was scaled to zero, so no gradient
    // reached the parameters
    let after = dense_weight(&model);
    assert_eq!(initial, after);
}

#[test]
fn sample_weight_validation_test() {
    let mut model = compiled_model(2, 1);
    let x = Array::ones((10, 2)).into_dyn();
    let y = Array::ones((10, 1)).into_dyn();

    // One weight per sample is required
    let short = Array1::<f32>::ones(4).into_dyn();
    assert!(
        model
            .fit(&x, &y, silent(1).batch_size(10).sample_weight(short))
            .is_err()
    );

    let right = Array1::<f32>::ones(10).into_dyn();
    assert!(
        model
            .fit(&x, &y, silent(1).batch_size(10).sample_weight(right))
            .is_ok()
    );
}

#[test]
fn temporal_sample_weights_need_3d_targets_test() {
    let mut model = compiled_model(2, 1);
    let x = Array::ones((10, 2)).into_dyn();
    let y = Array::ones((10, 1)).into_dyn();

    let weights = Array::ones((10, 3)).into_dyn();
    let result = model.fit(
        &x,
        &y,
        silent(1)
            .batch_size(10)
            .sample_weight(weights)
            .sample_weight_mode(SampleWeightMode::Temporal),
    );
    assert!(result.is_err(), "2D targets cannot take timestep-wise weights");
}

#[test]
fn zero_sample_weights_freeze_training_test() {
    let mut model = compiled_model(2, 1);
    let x = Array::ones((4, 2)).into_dyn();
    let y = Array::ones((4, 1)).into_dyn();

    let initial = dense_weight(&model);

    let weights = Array1::<f32>::zeros(4).into_dyn();
    model
        .fit(&x, &y, silent(3).batch_size(4).sample_weight(weights))
        .unwrap();

    let after = dense_weight(&model);
    assert_eq!(initial, after);
}

fn dense_weight(model: &Sequential) -> Array2<f32> {
    use layerstack::layer::{DenseLayerWeight, LayerWeight};

    model
        .get_weights()
        .into_iter()
        .find_map(|layer_weight| match layer_weight {
            LayerWeight::Dense(DenseLayerWeight { weight, .. }) => Some(weight.to_owned()),
            _ => None,
        })
        .expect("model should contain a dense layer")
}
