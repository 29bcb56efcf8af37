//! Ordered time/value series evaluated by interpolation.
//!
//! Used both for time-series parameter overrides and for lookup tables.
//! Queries at a series timestamp return that point's value, queries between
//! points interpolate linearly and queries outside the domain hold the
//! nearest boundary value rather than extrapolating.

use crate::errors::{RsdError, RsdResult};
use crate::value::{FloatValue, Time};
use serde::{Deserialize, Serialize};

/// An ordered time -> value series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeseries {
    times: Vec<Time>,
    values: Vec<FloatValue>,
}

impl Timeseries {
    /// Create a new series from parallel time and value vectors.
    ///
    /// The series must be non-empty, both vectors must have the same length
    /// and the times must be strictly increasing.
    pub fn new(times: Vec<Time>, values: Vec<FloatValue>) -> RsdResult<Self> {
        if times.is_empty() {
            return Err(RsdError::InvalidOverride(
                "time series must contain at least one point".to_string(),
            ));
        }
        if times.len() != values.len() {
            return Err(RsdError::InvalidOverride(format!(
                "time series has {} times but {} values",
                times.len(),
                values.len()
            )));
        }
        if times.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(RsdError::InvalidOverride(
                "time series times must be strictly increasing".to_string(),
            ));
        }
        if times.iter().any(|t| t.is_nan()) || values.iter().any(|v| v.is_nan()) {
            return Err(RsdError::InvalidOverride(
                "time series may not contain NaN".to_string(),
            ));
        }
        Ok(Self { times, values })
    }

    /// Create a new series from (time, value) pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Time, FloatValue)>) -> RsdResult<Self> {
        let (times, values) = pairs.into_iter().unzip();
        Self::new(times, values)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn values(&self) -> &[FloatValue] {
        &self.values
    }

    /// Evaluate the series at an arbitrary query time.
    pub fn at(&self, time: Time) -> FloatValue {
        let first = self.times[0];
        let last = self.times[self.times.len() - 1];
        if time <= first {
            return self.values[0];
        }
        if time >= last {
            return self.values[self.values.len() - 1];
        }

        // Index of the first point strictly after the query time.
        // The boundary checks above guarantee 0 < idx < len.
        let idx = self.times.partition_point(|&t| t <= time);
        let (t0, t1) = (self.times[idx - 1], self.times[idx]);
        let (v0, v1) = (self.values[idx - 1], self.values[idx]);
        if time == t0 {
            return v0;
        }
        v0 + (v1 - v0) * (time - t0) / (t1 - t0)
    }
}
