pub mod component;
pub mod errors;
pub mod integrator;
pub mod model;
pub mod registry;
pub mod state;
pub mod timeseries;
pub mod value;

#[cfg(test)]
mod example_models;
