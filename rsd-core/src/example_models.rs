#![allow(dead_code)]
//! Small compiled models used by the unit tests.

use crate::component::{CachePolicy, ComponentDefinition};
use crate::errors::RsdResult;
use crate::model::{Model, ModelBuilder};
use crate::timeseries::Timeseries;
use crate::value::Value;
use std::sync::Arc;

/// Newtonian cooling: a hot cup approaching ambient temperature.
///
/// d(cup)/dt = -(cup - ambient) / cooling_time
pub(crate) fn cooling_model() -> RsdResult<Model> {
    let mut builder = ModelBuilder::new();
    builder
        .with_time_bounds(0.0, 30.0)
        .with_time_step(0.125)
        .with_constant(
            ComponentDefinition::new(
                "Ambient Temperature",
                "ambient_temperature",
                CachePolicy::Run,
            )
            .with_units("degrees F")
            .with_equation_text("70"),
            70.0,
        )
        .with_constant(
            ComponentDefinition::new("Cooling Time", "cooling_time", CachePolicy::Run)
                .with_units("minutes")
                .with_equation_text("10"),
            10.0,
        )
        .with_component(
            ComponentDefinition::new("Heat Loss", "heat_loss", CachePolicy::Step)
                .with_depends_on(&["cup_temperature", "ambient_temperature", "cooling_time"])
                .with_units("degrees F / minute")
                .with_equation_text("(Cup Temperature - Ambient Temperature) / Cooling Time"),
            Arc::new(|ctx| {
                let cup = ctx.get_scalar("cup_temperature")?;
                let ambient = ctx.get_scalar("ambient_temperature")?;
                let cooling_time = ctx.get_scalar("cooling_time")?;
                Ok(Value::Scalar((cup - ambient) / cooling_time))
            }),
        )
        .with_component(
            ComponentDefinition::new("Net Heat Flow", "net_heat_flow", CachePolicy::Uncached)
                .with_depends_on(&["heat_loss"])
                .with_units("degrees F / minute")
                .with_equation_text("-Heat Loss"),
            Arc::new(|ctx| Ok(Value::Scalar(-ctx.get_scalar("heat_loss")?))),
        )
        .with_stock(
            ComponentDefinition::new("Cup Temperature", "cup_temperature", CachePolicy::Uncached)
                .with_units("degrees F")
                .with_equation_text("INTEG(-Heat Loss, 180)"),
            Arc::new(|_| Ok(Value::Scalar(180.0))),
            "net_heat_flow",
        );
    builder.build()
}

/// Two-region population with a constant net growth per region.
///
/// Exercises subscripted (array-valued) stocks and constants.
pub(crate) fn herd_model() -> RsdResult<Model> {
    let mut builder = ModelBuilder::new();
    builder
        .with_time_bounds(0.0, 10.0)
        .with_time_step(1.0)
        .with_constant(
            ComponentDefinition::new("Growth Rate", "growth_rate", CachePolicy::Run)
                .with_units("head / year")
                .with_subscripts(&["north", "south"]),
            vec![1.0, 3.0],
        )
        .with_stock(
            ComponentDefinition::new("Population", "population", CachePolicy::Uncached)
                .with_units("head")
                .with_subscripts(&["north", "south"]),
            Arc::new(|_| Ok(Value::from(vec![100.0, 200.0]))),
            "growth_rate",
        );
    builder.build()
}

/// Inventory filling at a constant rate, priced through a lookup table.
///
/// Exercises lookup components driven by a non-time input.
pub(crate) fn pricing_model() -> RsdResult<Model> {
    let mut builder = ModelBuilder::new();
    builder
        .with_time_bounds(0.0, 20.0)
        .with_time_step(1.0)
        .with_constant(
            ComponentDefinition::new("Restock Rate", "restock_rate", CachePolicy::Run)
                .with_units("units / day"),
            1.0,
        )
        .with_stock(
            ComponentDefinition::new("Inventory", "inventory", CachePolicy::Uncached)
                .with_units("units"),
            Arc::new(|_| Ok(Value::Scalar(0.0))),
            "restock_rate",
        )
        .with_lookup(
            ComponentDefinition::new("Unit Price", "unit_price", CachePolicy::Step)
                .with_depends_on(&["inventory"])
                .with_units("dollars / unit"),
            Timeseries::from_pairs([(0.0, 10.0), (10.0, 20.0)]).unwrap(),
        );
    builder.build()
}
