//! Column-oriented in-memory table.
//!
//! A [`Table`] is an ordered list of uniquely named `f64` columns of equal
//! length. Missing values are `NaN`, booleans are `0.0` / `1.0` and integer
//! indices are whole floats, so every transform in this crate works on one
//! element type.
//!
//! String-valued session attributes (mouse name, session id, …) live in the
//! [`Table::metadata`] map rather than in columns.
use anyhow::{bail, Context, Result};
use ndarray::Array1;
use std::collections::BTreeMap;

/// Ordered set of named `f64` columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Array1<f64>>,
    /// Free-form string attributes carried alongside the columns.
    pub metadata: BTreeMap<String, String>,
}

impl Table {
    /// Empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// Fails on duplicate names or on columns of differing length.
    pub fn from_columns<S, I>(columns: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Array1<f64>)>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Number of rows (0 for a table without columns).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Borrow a column by name.
    pub fn column(&self, name: &str) -> Result<&Array1<f64>> {
        self.position(name)
            .map(|i| &self.columns[i])
            .with_context(|| format!("missing column '{name}'"))
    }

    /// Iterate over `(name, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array1<f64>)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    fn check_len(&self, name: &str, len: usize) -> Result<()> {
        if !self.columns.is_empty() && len != self.n_rows() {
            bail!(
                "column '{name}' has {len} rows, table has {}",
                self.n_rows()
            );
        }
        Ok(())
    }

    /// Append a new column at the end.
    pub fn push_column(&mut self, name: impl Into<String>, values: Array1<f64>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            bail!("duplicate column '{name}'");
        }
        self.check_len(&name, values.len())?;
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// Insert `values` at position `index`, replacing any existing column
    /// with the same name.
    pub fn insert_column(
        &mut self,
        index: usize,
        name: impl Into<String>,
        values: Array1<f64>,
    ) -> Result<()> {
        let name = name.into();
        self.drop_column(&name);
        self.check_len(&name, values.len())?;
        let index = index.min(self.names.len());
        self.names.insert(index, name);
        self.columns.insert(index, values);
        Ok(())
    }

    /// Set a column, replacing it in place if it already exists and appending
    /// it otherwise.
    pub fn set_column(&mut self, name: impl Into<String>, values: Array1<f64>) -> Result<()> {
        let name = name.into();
        match self.position(&name) {
            Some(i) => {
                if self.n_cols() > 1 {
                    self.check_len(&name, values.len())?;
                }
                self.columns[i] = values;
                Ok(())
            }
            None => self.push_column(name, values),
        }
    }

    /// Remove a column, returning it if present.
    pub fn drop_column(&mut self, name: &str) -> Option<Array1<f64>> {
        let i = self.position(name)?;
        self.names.remove(i);
        Some(self.columns.remove(i))
    }

    /// Move the named columns to the front, in the given order.
    /// Remaining columns keep their relative order.
    pub fn move_to_front(&mut self, first: &[&str]) -> Result<()> {
        let mut names = Vec::with_capacity(self.names.len());
        let mut columns = Vec::with_capacity(self.columns.len());
        for &name in first {
            let i = self
                .position(name)
                .with_context(|| format!("missing column '{name}'"))?;
            names.push(self.names.remove(i));
            columns.push(self.columns.remove(i));
        }
        names.append(&mut self.names);
        columns.append(&mut self.columns);
        self.names = names;
        self.columns = columns;
        Ok(())
    }

    /// New table with rows picked by `indices` (repeats allowed).
    pub fn take(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| indices.iter().map(|&i| c[i]).collect())
            .collect();
        Table {
            names: self.names.clone(),
            columns,
            metadata: self.metadata.clone(),
        }
    }

    /// New table keeping only rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.n_rows() {
            bail!("mask has {} rows, table has {}", mask.len(), self.n_rows());
        }
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        Ok(self.take(&indices))
    }

    /// Stable ascending sort by `name`. `NaN` values sort last.
    pub fn sort_by(&self, name: &str) -> Result<Table> {
        let values = self.column(name)?.to_vec();
        Ok(self.take(&argsort(&values)))
    }
}

/// Stable ascending argsort with `NaN` placed last.
pub fn argsort(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let (x, y) = (values[a], values[b]);
        match (x.is_nan(), y.is_nan()) {
            (false, false) => x.total_cmp(&y),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        }
    });
    order
}

/// Round `v` to `decimals` decimal places (half away from zero).
pub fn round_to(v: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (v * scale).round() / scale
}

/// Median of the non-`NaN` values, `None` if there are none.
pub fn nan_median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut v: Vec<f64> = values.into_iter().filter(|x| !x.is_nan()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    Some(if v.len() % 2 == 0 {
        0.5 * (v[mid - 1] + v[mid])
    } else {
        v[mid]
    })
}
