//! Scalar and subscripted component values.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// The float type used for all model values.
pub type FloatValue = f64;

/// Simulation time.
pub type Time = f64;

/// A component value, either a single scalar or a subscripted array.
///
/// Array values carry one element per subscript element of the variable.
/// The element labels live in the component's definition, not in the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Scalar(FloatValue),
    Array(Array1<FloatValue>),
}

impl Value {
    /// Check if this is a scalar value
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Get the scalar value if this is a Scalar variant
    pub fn as_scalar(&self) -> Option<FloatValue> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Array(_) => None,
        }
    }

    /// Get the array values if this is an Array variant
    pub fn as_array(&self) -> Option<&Array1<FloatValue>> {
        match self {
            Value::Scalar(_) => None,
            Value::Array(values) => Some(values),
        }
    }

    /// Convert to a scalar value, aggregating if necessary.
    ///
    /// For Scalar variants, returns the value directly.
    /// For Array variants, computes the mean over all subscript elements.
    pub fn to_scalar(&self) -> FloatValue {
        match self {
            Value::Scalar(v) => *v,
            Value::Array(values) => values.sum() / (values.len() as FloatValue),
        }
    }

    /// One explicit Euler update, treating `self` as a stock value and
    /// `derivative` as its net flow over the step.
    ///
    /// Panics if the stock and derivative shapes differ; the translator is
    /// responsible for producing consistent shapes.
    pub(crate) fn euler_step(&self, derivative: &Value, dt: Time) -> Value {
        match (self, derivative) {
            (Value::Scalar(v), Value::Scalar(d)) => Value::Scalar(v + dt * d),
            (Value::Array(v), Value::Array(d)) => {
                assert_eq!(
                    v.len(),
                    d.len(),
                    "stock and derivative have different shapes"
                );
                Value::Array(v + &(d * dt))
            }
            _ => panic!("stock and derivative have different shapes"),
        }
    }
}

impl From<FloatValue> for Value {
    fn from(value: FloatValue) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<FloatValue>> for Value {
    fn from(values: Vec<FloatValue>) -> Self {
        Value::Array(Array1::from(values))
    }
}
