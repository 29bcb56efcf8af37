//! Example compiled system dynamics models.
//!
//! Each model here stands in for translator output: a classic
//! modelling-language sample hand-compiled into `rsd-core` components,
//! with the variable names, units and equation text the translator would
//! carry across.

pub mod models;
