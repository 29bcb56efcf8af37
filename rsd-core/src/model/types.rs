//! Run options and results for the run controller.

use crate::errors::RsdError;
use crate::timeseries::Timeseries;
use crate::value::{FloatValue, Time, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// The time bounds and default step supplied by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpec {
    pub initial_time: Time,
    pub final_time: Time,
    pub dt: Time,
}

/// Where a run starts from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InitialCondition {
    /// Restore the model-load snapshot before running.
    #[default]
    Original,
    /// Run forward from whatever state currently exists.
    Current,
    /// Install an explicit (time, stock values) state before running.
    ///
    /// The mapping may be partial; stocks not listed keep their current
    /// value.
    Explicit(Time, HashMap<String, Value>),
}

impl FromStr for InitialCondition {
    type Err = RsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(InitialCondition::Original),
            "current" => Ok(InitialCondition::Current),
            other => Err(RsdError::InvalidInitialCondition(other.to_string())),
        }
    }
}

/// Requested output timestamps for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnTimestamps {
    /// Run until this time and return only the final sample.
    Single(Time),
    /// Sample at each listed time; times must be non-decreasing and must
    /// not precede the run's start time.
    Series(Vec<Time>),
}

impl From<Time> for ReturnTimestamps {
    fn from(time: Time) -> Self {
        ReturnTimestamps::Single(time)
    }
}

impl From<Vec<Time>> for ReturnTimestamps {
    fn from(times: Vec<Time>) -> Self {
        ReturnTimestamps::Series(times)
    }
}

impl From<&[Time]> for ReturnTimestamps {
    fn from(times: &[Time]) -> Self {
        ReturnTimestamps::Series(times.to_vec())
    }
}

/// A parameter override value: a constant or a time-indexed series.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Constant(Value),
    Timeseries(Timeseries),
}

impl From<FloatValue> for Param {
    fn from(value: FloatValue) -> Self {
        Param::Constant(Value::Scalar(value))
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Constant(value)
    }
}

impl From<Timeseries> for Param {
    fn from(series: Timeseries) -> Self {
        Param::Timeseries(series)
    }
}

/// Options for [`Model::run`](crate::model::Model::run).
///
/// The defaults reproduce a plain run: original initial condition, output
/// at every integration step and one column per stock.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub(crate) params: Vec<(String, Param)>,
    pub(crate) return_columns: Option<Vec<String>>,
    pub(crate) return_timestamps: Option<ReturnTimestamps>,
    pub(crate) initial_condition: InitialCondition,
    pub(crate) flatten_subscripts: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a variable for this run and afterwards.
    ///
    /// Parameters are applied in the order given, before the run begins,
    /// and stay installed on the instance once the run completes.
    pub fn with_param(mut self, name: &str, param: impl Into<Param>) -> Self {
        self.params.push((name.to_string(), param.into()));
        self
    }

    /// Select the variables to sample; canonical identifiers and display
    /// names both resolve.
    pub fn with_return_columns(mut self, columns: &[&str]) -> Self {
        self.return_columns = Some(columns.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_return_timestamps(mut self, timestamps: impl Into<ReturnTimestamps>) -> Self {
        self.return_timestamps = Some(timestamps.into());
        self
    }

    pub fn with_initial_condition(mut self, initial_condition: InitialCondition) -> Self {
        self.initial_condition = initial_condition;
        self
    }

    /// Expand subscripted variables into one column per element.
    ///
    /// A no-op on models without subscripted variables.
    pub fn with_flatten_subscripts(mut self, flatten: bool) -> Self {
        self.flatten_subscripts = flatten;
        self
    }
}

/// One output sample: the requested variables at one timestamp.
///
/// Values are parallel to [`RunResult::columns`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub time: Time,
    pub values: Vec<Value>,
}

/// The time-indexed output of a run.
///
/// An ordered sequence of samples, one per requested output timestamp,
/// covering only the requested variables. The presentation layer is
/// responsible for converting this into a tabular structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    columns: Vec<String>,
    samples: Vec<Sample>,
}

impl RunResult {
    pub(crate) fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            samples: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, time: Time, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.samples.push(Sample { time, values });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn timestamps(&self) -> Vec<Time> {
        self.samples.iter().map(|sample| sample.time).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// All values of one column, in sample order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.samples.iter().map(|sample| &sample.values[idx]).collect())
    }

    /// All values of one column as scalars, aggregating arrays to a mean.
    pub fn column_scalar(&self, name: &str) -> Option<Vec<FloatValue>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.samples
                .iter()
                .map(|sample| sample.values[idx].to_scalar())
                .collect(),
        )
    }

    /// The value of one column at one sample row.
    pub fn value_at(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.samples.get(row).map(|sample| &sample.values[idx])
    }
}
