//! Collaborators backed by the Python D4RL stack.
//!
//! [`PyD4rlEnv`] wraps an environment created with `gym.make` after
//! importing `d4rl`, and [`PyH5Decoder`] reads downloaded archives with
//! `h5py`. Both are available with the `python` feature.
use crate::{
    column::{Column, Dtype, Group},
    config::EnvKwargs,
    env_spec::{EnvSpec, TensorSpec},
    source::{ArchiveDecoder, D4rlEnv},
    table::RawTable,
    D4rlError,
};
use anyhow::Result;
use log::{debug, info};
use numpy::PyArrayDyn;
use pyo3::{
    types::{PyDict, PyIterator},
    PyAny, PyObject, Python, ToPyObject,
};
use std::path::Path;

/// Converts a numpy array (or anything `numpy.asarray` accepts) to a column.
///
/// Returns `None` for element types without a [`Column`] counterpart, such as strings.
fn pyany_to_column(py: Python, obj: &PyAny) -> Result<Option<Column>> {
    let arr = py.import("numpy")?.call_method1("asarray", (obj,))?;

    macro_rules! try_extract {
        ($t:ty, $variant:ident) => {
            if let Ok(arr) = arr.extract::<&PyArrayDyn<$t>>() {
                return Ok(Some(Column::$variant(arr.to_owned_array())));
            }
        };
    }
    try_extract!(f32, F32);
    try_extract!(f64, F64);
    try_extract!(i32, I32);
    try_extract!(i64, I64);
    try_extract!(u8, U8);
    try_extract!(bool, Bool);

    debug!("Unsupported dtype {}", arr.getattr("dtype")?);
    Ok(None)
}

/// Collects the columns of a mapping (dict or h5py group) as `/`-separated paths.
fn collect_columns(
    py: Python,
    mapping: &PyAny,
    prefix: &str,
    columns: &mut Vec<(String, Column)>,
) -> Result<()> {
    let items = mapping.call_method0("items")?;
    for item in PyIterator::from_object(py, items)? {
        let (key, value) = item?.extract::<(String, &PyAny)>()?;
        let path = if prefix.is_empty() {
            key
        } else {
            format!("{}/{}", prefix, key)
        };
        if value.hasattr("items")? {
            collect_columns(py, value, &path, columns)?;
        } else {
            match pyany_to_column(py, value)? {
                Some(col) => columns.push((path, col)),
                None => debug!("Skipped {:?}", path),
            }
        }
    }
    Ok(())
}

fn mapping_to_raw(py: Python, mapping: &PyAny) -> Result<RawTable> {
    let mut columns = vec![];
    collect_columns(py, mapping, "", &mut columns)?;
    Group::from_flat(columns)
}

fn dtype_from_name(name: &str) -> Result<Dtype> {
    match name {
        "float32" => Ok(Dtype::F32),
        "float64" => Ok(Dtype::F64),
        "int32" => Ok(Dtype::I32),
        "int64" => Ok(Dtype::I64),
        "uint8" => Ok(Dtype::U8),
        "bool" => Ok(Dtype::Bool),
        _ => Err(D4rlError::SchemaError(format!("Unsupported dtype {:?}", name)).into()),
    }
}

fn space_to_spec(space: &PyAny) -> Result<TensorSpec> {
    let dtype = space.getattr("dtype")?.getattr("name")?.extract::<String>()?;
    let shape = space.getattr("shape")?.extract::<Vec<usize>>()?;
    Ok(TensorSpec::new(dtype_from_name(&dtype)?, shape))
}

fn yaml_to_pyobj(py: Python, value: &serde_yaml::Value) -> Result<PyObject> {
    use serde_yaml::Value;
    let obj = match value {
        Value::Null => py.None(),
        Value::Bool(v) => v.to_object(py),
        Value::String(v) => v.to_object(py),
        Value::Number(v) => match (v.as_i64(), v.as_f64()) {
            (Some(v), _) => v.to_object(py),
            (None, Some(v)) => v.to_object(py),
            _ => v.to_string().to_object(py),
        },
        _ => {
            return Err(D4rlError::ProvenanceConfigError(format!(
                "Unsupported env_kwargs value {:?}",
                value
            ))
            .into())
        }
    };
    Ok(obj)
}

/// D4RL environment created by `gym.make`.
pub struct PyD4rlEnv {
    env: PyObject,
}

impl PyD4rlEnv {
    /// Creates the environment of the dataset `name`, e.g. `hopper-medium-v2`.
    pub fn new(name: &str) -> Result<Self> {
        Python::with_gil(|py| {
            // Registers the D4RL environments to gym
            py.import("d4rl")?;
            let env = py.import("gym")?.call_method1("make", (name,))?;
            info!("Created environment {}", name);
            Ok(Self {
                env: env.to_object(py),
            })
        })
    }
}

impl D4rlEnv for PyD4rlEnv {
    fn get_dataset(&self) -> Result<RawTable> {
        Python::with_gil(|py| {
            let dataset = self.env.call_method0(py, "get_dataset")?;
            mapping_to_raw(py, dataset.as_ref(py))
        })
    }

    fn qlearning_dataset(&self, kwargs: &EnvKwargs) -> Result<RawTable> {
        Python::with_gil(|py| {
            let py_kwargs = PyDict::new(py);
            for (key, value) in kwargs.iter() {
                py_kwargs.set_item(key.as_str(), yaml_to_pyobj(py, value)?)?;
            }
            let dataset = py
                .import("d4rl")?
                .getattr("qlearning_dataset")?
                .call((self.env.as_ref(py),), Some(py_kwargs))?;
            mapping_to_raw(py, dataset)
        })
    }

    fn spec(&self) -> Result<EnvSpec> {
        Python::with_gil(|py| {
            let env = self.env.as_ref(py);
            Ok(EnvSpec {
                observation: space_to_spec(env.getattr("observation_space")?)?,
                action: space_to_spec(env.getattr("action_space")?)?,
                reward: TensorSpec::new(Dtype::F32, vec![]),
            })
        })
    }
}

/// Decoder of HDF5 archives using `h5py`.
#[derive(Clone, Debug, Default)]
pub struct PyH5Decoder;

impl ArchiveDecoder for PyH5Decoder {
    fn decode(&self, path: &Path) -> Result<RawTable> {
        Python::with_gil(|py| {
            let path = path
                .to_str()
                .ok_or_else(|| D4rlError::IoFailure(format!("Non UTF-8 path {:?}", path)))?;
            let file = py.import("h5py")?.call_method1("File", (path, "r"))?;
            let table = mapping_to_raw(py, file);
            file.call_method0("close")?;
            table
        })
    }
}
