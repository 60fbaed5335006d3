use approx::assert_relative_eq;
use layerstack::layer::activation::Activation;
use layerstack::layer::dense::Dense;
use layerstack::layer::{LayerWeight, TrainingParameters};
use layerstack::model::sequential::Sequential;
use layerstack::traits::Layer;
use ndarray::{Array, array};
use std::path::PathBuf;

fn temp_model_path(name: &str) -> String {
    let mut path = PathBuf::from(std::env::temp_dir());
    path.push(format!("layerstack_{}_{}.json", name, std::process::id()));
    path.to_string_lossy().into_owned()
}

#[test]
fn dense_forward_with_known_weights_test() {
    let mut layer = Dense::new(2).input_shape(3);
    layer.build(3).unwrap();

    layer
        .set_weights(
            array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            array![[0.5, -0.5]],
        )
        .unwrap();

    let x = Array::from_shape_vec((1, 3), vec![1.0, 2.0, 3.0])
        .unwrap()
        .into_dyn();
    let out = layer.forward(&x).unwrap();

    // [1*1 + 3*1 + 0.5, 2*1 + 3*1 - 0.5]
    assert_relative_eq!(out[[0, 0]], 4.5);
    assert_relative_eq!(out[[0, 1]], 4.5);
}

#[test]
fn dense_set_weights_validation_test() {
    // Unbuilt layer has no allocated parameters to replace
    let mut unbuilt = Dense::new(2);
    assert!(
        unbuilt
            .set_weights(array![[1.0, 0.0]], array![[0.0, 0.0]])
            .is_err()
    );

    let mut layer = Dense::new(2).input_shape(3);
    layer.build(3).unwrap();

    // Wrong weight shape
    assert!(
        layer
            .set_weights(array![[1.0, 0.0], [0.0, 1.0]], array![[0.0, 0.0]])
            .is_err()
    );
    // Wrong bias shape
    assert!(
        layer
            .set_weights(
                array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
                array![[0.0, 0.0, 0.0]]
            )
            .is_err()
    );
}

#[test]
fn layer_param_counts_test() {
    let mut dense = Dense::new(32).input_shape(784);
    dense.build(784).unwrap();
    assert_eq!(
        dense.param_count(),
        TrainingParameters::Trainable(784 * 32 + 32)
    );

    let mut activation = Activation::relu();
    activation.build(32).unwrap();
    assert_eq!(activation.param_count(), TrainingParameters::NonTrainable(0));
    assert!(matches!(activation.get_weights(), LayerWeight::Empty));
}

#[test]
fn save_and_load_roundtrip_test() {
    let path = temp_model_path("roundtrip");

    let x = Array::ones((4, 6)).into_dyn();

    let mut model = Sequential::new();
    model
        .add(Dense::new(5).input_shape(6))
        .unwrap()
        .add(Activation::relu())
        .unwrap()
        .add(Dense::new(2))
        .unwrap()
        .add(Activation::softmax())
        .unwrap();
    model.compile("sgd", "mse", vec![]).unwrap();

    let expected = model.predict(&x).unwrap();
    model.save_to_path(&path).unwrap();

    // A freshly initialized model with the same architecture produces
    // different predictions until the stored weights are restored
    let mut restored = Sequential::new();
    restored
        .add(Dense::new(5).input_shape(6))
        .unwrap()
        .add(Activation::relu())
        .unwrap()
        .add(Dense::new(2))
        .unwrap()
        .add(Activation::softmax())
        .unwrap();
    restored.compile("sgd", "mse", vec![]).unwrap();

    restored.load_from_path(&path).unwrap();
    let actual = restored.predict(&x).unwrap();

    assert_eq!(expected.shape(), actual.shape());
    for (e, a) in expected.iter().zip(actual.iter()) {
        assert_relative_eq!(*e, *a, epsilon = 1e-6);
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn load_rejects_mismatched_structure_test() {
    let path = temp_model_path("mismatch");

    let mut model = Sequential::new();
    model
        .add(Dense::new(5).input_shape(6))
        .unwrap()
        .add(Dense::new(2))
        .unwrap();
    model.compile("sgd", "mse", vec![]).unwrap();
    model.save_to_path(&path).unwrap();

    // Different layer count
    let mut fewer = Sequential::new();
    fewer.add(Dense::new(5).input_shape(6)).unwrap();
    fewer.compile("sgd", "mse", vec![]).unwrap();
    assert!(fewer.load_from_path(&path).is_err());

    // Same count, different widths
    let mut wrong_units = Sequential::new();
    wrong_units
        .add(Dense::new(4).input_shape(6))
        .unwrap()
        .add(Dense::new(2))
        .unwrap();
    wrong_units.compile("sgd", "mse", vec![]).unwrap();
    assert!(wrong_units.load_from_path(&path).is_err());

    std::fs::remove_file(&path).ok();
}

#[test]
fn save_requires_built_model_test() {
    let path = temp_model_path("unbuilt");

    let model = {
        let mut m = Sequential::new();
        m.add(Dense::new(5).input_shape(6)).unwrap();
        m
    };

    // No compile and no forward pass: parameters were never allocated
    assert!(model.save_to_path(&path).is_err());
}
