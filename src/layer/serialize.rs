use crate::error::IoError;
use crate::layer::{Activation, Dense};
use crate::traits::Layer;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Serializable snapshot of a model's layer stack.
#[derive(Debug, Serialize, Deserialize)]
pub struct SavedModel {
    pub layers: Vec<SavedLayer>,
}

/// Serializable snapshot of a single layer: its structural configuration
/// and, for trainable layers, its parameters.
#[derive(Debug, Serialize, Deserialize)]
pub struct SavedLayer {
    pub layer_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_dim: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<SavedDenseWeights>,
}

/// Flattened weight matrix and bias vector of a dense layer.
#[derive(Debug, Serialize, Deserialize)]
pub struct SavedDenseWeights {
    pub rows: usize,
    pub cols: usize,
    pub weight: Vec<f32>,
    pub bias: Vec<f32>,
}

/// Converts a layer stack into its serializable form.
///
/// Fails when a trainable layer has not been built yet, since there are no
/// parameters to store.
pub(crate) fn model_to_saved(layers: &[Box<dyn Layer>]) -> Result<SavedModel, IoError> {
    let mut saved = Vec::with_capacity(layers.len());
    for layer in layers {
        saved.push(layer_to_saved(layer.as_ref())?);
    }
    Ok(SavedModel { layers: saved })
}

fn layer_to_saved(layer: &dyn Layer) -> Result<SavedLayer, IoError> {
    let layer_type = layer.layer_type().to_string();
    let any: &dyn Any = layer;

    if let Some(dense) = any.downcast_ref::<Dense>() {
        let (weights, bias) = match (dense.weights(), dense.bias()) {
            (Some(weights), Some(bias)) => (weights, bias),
            _ => {
                return Err(IoError::StructureMismatch(
                    "layer parameters are not allocated; compile the model or run a forward pass before saving"
                        .to_string(),
                ));
            }
        };

        Ok(SavedLayer {
            layer_type: "Dense".to_string(),
            units: Some(dense.get_units()),
            input_dim: dense.get_input_dim(),
            activation: dense.get_activation().map(|a| a.as_str().to_string()),
            weights: Some(SavedDenseWeights {
                rows: weights.nrows(),
                cols: weights.ncols(),
                weight: weights.iter().cloned().collect(),
                bias: bias.iter().cloned().collect(),
            }),
        })
    } else if let Some(activation) = any.downcast_ref::<Activation>() {
        Ok(SavedLayer {
            layer_type: "Activation".to_string(),
            units: None,
            input_dim: None,
            activation: Some(activation.get_kind().as_str().to_string()),
            weights: None,
        })
    } else {
        Ok(SavedLayer {
            layer_type,
            units: None,
            input_dim: None,
            activation: None,
            weights: None,
        })
    }
}

/// Applies a saved layer entry to the corresponding layer of a model with
/// the same architecture.
pub(crate) fn apply_saved_layer(layer: &mut dyn Layer, saved: &SavedLayer) -> Result<(), IoError> {
    let layer_type = layer.layer_type().to_string();
    let any: &mut dyn Any = layer;

    if let Some(dense) = any.downcast_mut::<Dense>() {
        if saved.layer_type != "Dense" {
            return Err(IoError::StructureMismatch(format!(
                "expected a Dense layer, file has {}",
                saved.layer_type
            )));
        }
        if let Some(units) = saved.units {
            if units != dense.get_units() {
                return Err(IoError::StructureMismatch(format!(
                    "Dense layer has {} units, file has {}",
                    dense.get_units(),
                    units
                )));
            }
        }

        let stored = saved.weights.as_ref().ok_or_else(|| {
            IoError::StructureMismatch("Dense layer entry carries no weights".to_string())
        })?;

        let weight = Array2::from_shape_vec((stored.rows, stored.cols), stored.weight.clone())
            .map_err(|e| IoError::StructureMismatch(format!("invalid weight data: {}", e)))?;
        let bias = Array2::from_shape_vec((1, stored.cols), stored.bias.clone())
            .map_err(|e| IoError::StructureMismatch(format!("invalid bias data: {}", e)))?;

        dense
            .set_weights(weight, bias)
            .map_err(|e| IoError::StructureMismatch(e.to_string()))
    } else if let Some(activation) = any.downcast_mut::<Activation>() {
        if saved.layer_type != "Activation" {
            return Err(IoError::StructureMismatch(format!(
                "expected an Activation layer, file has {}",
                saved.layer_type
            )));
        }
        if let Some(name) = &saved.activation {
            if name != activation.get_kind().as_str() {
                return Err(IoError::StructureMismatch(format!(
                    "activation mismatch: model has {}, file has {}",
                    activation.get_kind().as_str(),
                    name
                )));
            }
        }
        Ok(())
    } else if saved.layer_type != layer_type {
        Err(IoError::StructureMismatch(format!(
            "expected a {} layer, file has {}",
            layer_type, saved.layer_type
        )))
    } else {
        Ok(())
    }
}
