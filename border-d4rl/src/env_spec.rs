//! Dtype and shape specification supplied by an environment.
use crate::column::{Column, Dtype};
use log::warn;
use serde::{Deserialize, Serialize};

/// Element type and per-step shape of one field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TensorSpec {
    pub dtype: Dtype,
    pub shape: Vec<usize>,
}

impl TensorSpec {
    pub fn new(dtype: Dtype, shape: impl Into<Vec<usize>>) -> Self {
        Self {
            dtype,
            shape: shape.into(),
        }
    }

    /// `true` if the per-step shape of `col` agrees with the spec.
    ///
    /// A scalar spec accepts any shape.
    pub fn matches_shape(&self, col: &Column) -> bool {
        let shape = &col.shape()[1.min(col.ndim())..];
        self.shape.is_empty() || shape == self.shape.as_slice()
    }

    /// Casts `col` to the specified element type.
    ///
    /// A per-step shape that disagrees with the spec is reported but left as is.
    pub fn coerce(&self, name: &str, col: Column) -> Column {
        if !self.matches_shape(&col) {
            warn!(
                "Shape of {:?} is {:?}, while the spec says {:?}",
                name,
                &col.shape()[1.min(col.ndim())..],
                self.shape
            );
        }
        if col.dtype() == self.dtype {
            col
        } else {
            col.cast(self.dtype)
        }
    }
}

/// Specs of the observation, action and reward of an environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvSpec {
    pub observation: TensorSpec,
    pub action: TensorSpec,
    pub reward: TensorSpec,
}
