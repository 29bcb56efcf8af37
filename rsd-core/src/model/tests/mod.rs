//! Integration tests for the model module.
//!
//! These tests verify the complete build-and-run workflow: cache-policy
//! enforcement, parameter overrides, initial conditions, output sampling,
//! subscript flattening and instance isolation.

#[cfg(test)]
mod initial_conditions;
#[cfg(test)]
mod overrides;
