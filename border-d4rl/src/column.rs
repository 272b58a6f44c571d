//! Typed columns and nested groups of columns.
//!
//! A [`Column`] is an n-dimensional array whose first axis indexes steps. A
//! [`Group`] is a named tree of columns, which is how raw archives, `info`
//! blocks and dataset metadata are represented. All row operations return
//! fresh arrays; nothing here mutates a buffer that is still read elsewhere.
use crate::D4rlError;
use anyhow::Result;
use ndarray::{ArrayD, Axis, IxDyn, Slice};
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_map, BTreeMap},
    ops::Range,
};

/// Element type of a [`Column`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    F32,
    F64,
    I32,
    I64,
    U8,
    Bool,
}

/// A step-indexed array of one of the supported element types.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    U8(ArrayD<u8>),
    Bool(ArrayD<bool>),
}

/// Applies `$body` to the array inside a column and rewraps the result in the same variant.
macro_rules! map_column {
    ($col:expr, $arr:ident => $body:expr) => {
        match $col {
            Column::F32($arr) => Column::F32($body),
            Column::F64($arr) => Column::F64($body),
            Column::I32($arr) => Column::I32($body),
            Column::I64($arr) => Column::I64($body),
            Column::U8($arr) => Column::U8($body),
            Column::Bool($arr) => Column::Bool($body),
        }
    };
}

/// Evaluates `$body` with the array inside a column.
macro_rules! with_column {
    ($col:expr, $arr:ident => $body:expr) => {
        match $col {
            Column::F32($arr) => $body,
            Column::F64($arr) => $body,
            Column::I32($arr) => $body,
            Column::I64($arr) => $body,
            Column::U8($arr) => $body,
            Column::Bool($arr) => $body,
        }
    };
}

macro_rules! impl_from_array {
    ($ty:ty, $variant:ident) => {
        impl From<ArrayD<$ty>> for Column {
            fn from(arr: ArrayD<$ty>) -> Self {
                Column::$variant(arr)
            }
        }
    };
}

impl_from_array!(f32, F32);
impl_from_array!(f64, F64);
impl_from_array!(i32, I32);
impl_from_array!(i64, I64);
impl_from_array!(u8, U8);
impl_from_array!(bool, Bool);

pub(crate) fn slice_rows<T: Clone>(arr: &ArrayD<T>, rows: Range<usize>) -> ArrayD<T> {
    arr.slice_axis(Axis(0), Slice::from(rows)).to_owned()
}

/// Row `t` of the output is row `t - 1` of the input; row `0` is the default value.
pub(crate) fn shift_down<T: Clone + Default>(arr: &ArrayD<T>) -> ArrayD<T> {
    let mut out = ArrayD::from_elem(arr.raw_dim(), T::default());
    let n = arr.shape()[0];
    if n > 1 {
        out.slice_axis_mut(Axis(0), Slice::from(1..n))
            .assign(&arr.slice_axis(Axis(0), Slice::from(0..n - 1)));
    }
    out
}

pub(crate) fn zero_rows<T: Clone + Default>(arr: &mut ArrayD<T>, mask: &[bool]) {
    for (mut row, &m) in arr.axis_iter_mut(Axis(0)).zip(mask.iter()) {
        if m {
            row.map_inplace(|x| *x = T::default());
        }
    }
}

pub(crate) fn with_trailing_unit<T>(arr: ArrayD<T>) -> Option<ArrayD<T>> {
    match arr.ndim() {
        1 => Some(arr.insert_axis(Axis(1))),
        2 if arr.shape()[1] == 1 => Some(arr),
        _ => None,
    }
}

pub(crate) fn split_pad<T: Clone + Default>(
    arr: &ArrayD<T>,
    episodes: &[Range<usize>],
    max_len: usize,
) -> ArrayD<T> {
    let mut shape = vec![episodes.len(), max_len];
    shape.extend_from_slice(&arr.shape()[1..]);
    let mut out = ArrayD::from_elem(IxDyn(&shape), T::default());
    for (i, ep) in episodes.iter().enumerate() {
        out.index_axis_mut(Axis(0), i)
            .slice_axis_mut(Axis(0), Slice::from(0..ep.len()))
            .assign(&arr.slice_axis(Axis(0), Slice::from(ep.clone())));
    }
    out
}

fn row_is_default<T: Default + PartialEq>(arr: &ArrayD<T>, ix: usize) -> bool {
    let zero = T::default();
    arr.index_axis(Axis(0), ix).iter().all(|x| *x == zero)
}

impl Column {
    /// Element type of the column.
    pub fn dtype(&self) -> Dtype {
        match self {
            Column::F32(_) => Dtype::F32,
            Column::F64(_) => Dtype::F64,
            Column::I32(_) => Dtype::I32,
            Column::I64(_) => Dtype::I64,
            Column::U8(_) => Dtype::U8,
            Column::Bool(_) => Dtype::Bool,
        }
    }

    /// Full shape, leading step axis included.
    pub fn shape(&self) -> &[usize] {
        with_column!(self, arr => arr.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Number of steps, i.e., the length of the first axis (`0` for a scalar).
    pub fn rows(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    /// Copies the given range of rows.
    pub fn slice_rows(&self, rows: Range<usize>) -> Column {
        map_column!(self, arr => slice_rows(arr, rows))
    }

    /// Returns an independent copy shifted down by one row, with the default
    /// value (`0` / `false`) written at row `0`.
    pub fn shifted_down(&self) -> Column {
        map_column!(self, arr => shift_down(arr))
    }

    /// Overwrites every row whose mask entry is `true` with the default value.
    pub fn zero_rows(&mut self, mask: &[bool]) {
        with_column!(self, arr => zero_rows(arr, mask))
    }

    /// Reshapes `[N]` into `[N, 1]`; `[N, 1]` is returned as is.
    ///
    /// Fails for any other layout.
    pub fn with_trailing_unit(self, name: &str) -> Result<Column> {
        let shape = self.shape().to_vec();
        let col = match self {
            Column::F32(arr) => with_trailing_unit(arr).map(Column::F32),
            Column::F64(arr) => with_trailing_unit(arr).map(Column::F64),
            Column::I32(arr) => with_trailing_unit(arr).map(Column::I32),
            Column::I64(arr) => with_trailing_unit(arr).map(Column::I64),
            Column::U8(arr) => with_trailing_unit(arr).map(Column::U8),
            Column::Bool(arr) => with_trailing_unit(arr).map(Column::Bool),
        };
        col.ok_or_else(|| {
            D4rlError::SchemaError(format!(
                "field {:?} should have shape [N] or [N, 1], got {:?}",
                name, shape
            ))
            .into()
        })
    }

    /// Packs the given row ranges into `[episodes.len(), max_len, ...]`,
    /// padding the tail of short episodes with default values.
    pub fn split_pad(&self, episodes: &[Range<usize>], max_len: usize) -> Column {
        map_column!(self, arr => split_pad(arr, episodes, max_len))
    }

    /// `true` if every element of row `ix` equals the default value.
    pub fn row_is_zero(&self, ix: usize) -> bool {
        with_column!(self, arr => row_is_default(arr, ix))
    }

    /// Converts the elements to a numeric type.
    pub fn to_array<U>(&self) -> ArrayD<U>
    where
        U: 'static + Copy,
        f32: AsPrimitive<U>,
        f64: AsPrimitive<U>,
        i32: AsPrimitive<U>,
        i64: AsPrimitive<U>,
        u8: AsPrimitive<U>,
    {
        match self {
            Column::F32(arr) => arr.mapv(|x| x.as_()),
            Column::F64(arr) => arr.mapv(|x| x.as_()),
            Column::I32(arr) => arr.mapv(|x| x.as_()),
            Column::I64(arr) => arr.mapv(|x| x.as_()),
            Column::U8(arr) => arr.mapv(|x| x.as_()),
            Column::Bool(arr) => arr.mapv(|x| u8::from(x).as_()),
        }
    }

    /// Converts the elements to flags; any non-zero value is `true`.
    pub fn to_bool(&self) -> ArrayD<bool> {
        match self {
            Column::F32(arr) => arr.mapv(|x| x != 0.0),
            Column::F64(arr) => arr.mapv(|x| x != 0.0),
            Column::I32(arr) => arr.mapv(|x| x != 0),
            Column::I64(arr) => arr.mapv(|x| x != 0),
            Column::U8(arr) => arr.mapv(|x| x != 0),
            Column::Bool(arr) => arr.clone(),
        }
    }

    /// Converts the column to the given element type.
    pub fn cast(&self, dtype: Dtype) -> Column {
        if self.dtype() == dtype {
            return self.clone();
        }
        match dtype {
            Dtype::F32 => Column::F32(self.to_array()),
            Dtype::F64 => Column::F64(self.to_array()),
            Dtype::I32 => Column::I32(self.to_array()),
            Dtype::I64 => Column::I64(self.to_array()),
            Dtype::U8 => Column::U8(self.to_array()),
            Dtype::Bool => Column::Bool(self.to_bool()),
        }
    }
}

/// Either a column or a nested group.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Array(Column),
    Group(Group),
}

impl From<Column> for Node {
    fn from(col: Column) -> Self {
        Node::Array(col)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

/// A named tree of columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group(BTreeMap<String, Node>);

impl Group {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a group from `/`-separated paths, e.g. `infos/qpos` becomes
    /// the column `qpos` inside the group `infos`.
    pub fn from_flat<K: AsRef<str>>(items: impl IntoIterator<Item = (K, Column)>) -> Result<Self> {
        let mut group = Self::new();
        for (path, col) in items {
            group.insert_path(path.as_ref(), col)?;
        }
        Ok(group)
    }

    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) {
        self.0.insert(key.into(), node.into());
    }

    /// Inserts a column at a `/`-separated path, creating intermediate groups.
    pub fn insert_path(&mut self, path: &str, col: Column) -> Result<()> {
        match path.split_once('/') {
            None => {
                self.insert(path, col);
                Ok(())
            }
            Some((head, rest)) => {
                let node = self
                    .0
                    .entry(head.to_string())
                    .or_insert_with(|| Node::Group(Group::new()));
                match node {
                    Node::Group(group) => group.insert_path(rest, col),
                    Node::Array(_) => Err(D4rlError::SchemaError(format!(
                        "key {:?} is both a column and a group",
                        head
                    ))
                    .into()),
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    /// Looks up a node by `/`-separated path.
    pub fn get_path(&self, path: &str) -> Option<&Node> {
        match path.split_once('/') {
            None => self.get(path),
            Some((head, rest)) => match self.get(head)? {
                Node::Group(group) => group.get_path(rest),
                Node::Array(_) => None,
            },
        }
    }

    /// Returns the column stored directly under `key`, if any.
    pub fn column(&self, key: &str) -> Option<&Column> {
        match self.get(key)? {
            Node::Array(col) => Some(col),
            Node::Group(_) => None,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, Node> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Node> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lists every column with its `/`-separated path.
    pub fn flatten(&self) -> Vec<(String, &Column)> {
        let mut out = vec![];
        for (key, node) in self.0.iter() {
            match node {
                Node::Array(col) => out.push((key.clone(), col)),
                Node::Group(group) => {
                    for (path, col) in group.flatten() {
                        out.push((format!("{}/{}", key, path), col));
                    }
                }
            }
        }
        out
    }

    /// Common number of rows of all columns in the group.
    ///
    /// Returns `None` for a group without columns, and fails if two columns
    /// disagree or a column is a scalar.
    pub fn rows(&self) -> Result<Option<usize>> {
        let mut rows: Option<(String, usize)> = None;
        for (path, col) in self.flatten() {
            if col.ndim() == 0 {
                return Err(
                    D4rlError::SchemaError(format!("field {:?} has no step axis", path)).into(),
                );
            }
            let n = col.rows();
            if let Some((first, m)) = &rows {
                if *m != n {
                    return Err(D4rlError::SchemaError(format!(
                        "inconsistent row counts: {:?} has {} rows, {:?} has {}",
                        first, m, path, n
                    ))
                    .into());
                }
            } else {
                rows = Some((path, n));
            }
        }
        Ok(rows.map(|(_, n)| n))
    }

    /// Applies `f` to every column, keeping the tree structure.
    pub fn map_columns<F: Fn(&Column) -> Column>(&self, f: &F) -> Group {
        Group(
            self.0
                .iter()
                .map(|(key, node)| {
                    let node = match node {
                        Node::Array(col) => Node::Array(f(col)),
                        Node::Group(group) => Node::Group(group.map_columns(f)),
                    };
                    (key.clone(), node)
                })
                .collect(),
        )
    }

    pub fn slice_rows(&self, rows: Range<usize>) -> Group {
        self.map_columns(&|col: &Column| col.slice_rows(rows.clone()))
    }

    pub fn split_pad(&self, episodes: &[Range<usize>], max_len: usize) -> Group {
        self.map_columns(&|col: &Column| col.split_pad(episodes, max_len))
    }
}

impl IntoIterator for Group {
    type Item = (String, Node);
    type IntoIter = btree_map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
