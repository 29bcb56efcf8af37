//! Model assembly and run orchestration.
//!
//! A model instance couples a component registry with a state store and the
//! original load-time snapshot. The run controller applies initial
//! conditions and parameter overrides, drives the fixed-step integrator
//! across the requested span and samples the requested variables at the
//! requested output timestamps, which need not coincide with integration
//! steps.

mod builder;
mod runtime;
mod types;

#[cfg(test)]
mod tests;

// Public re-exports
pub use builder::ModelBuilder;
pub use runtime::Model;
pub use types::{
    InitialCondition, Param, ReturnTimestamps, RunOptions, RunResult, Sample, TimeSpec,
};
