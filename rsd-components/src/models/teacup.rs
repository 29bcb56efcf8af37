//! The classic teacup cooling model.
//!
//! A cup of tea cools towards room temperature by Newtonian heat loss:
//!
//! Teacup Temperature = INTEG(-Heat Loss to Room, initial temperature)
//! Heat Loss to Room  = (Teacup Temperature - Room Temperature) / Characteristic Time

use log::debug;
use rsd_core::component::{CachePolicy, ComponentDefinition};
use rsd_core::errors::RsdResult;
use rsd_core::model::{Model, ModelBuilder};
use rsd_core::value::Value;
use std::sync::Arc;

/// Parameters for the teacup model.
#[derive(Debug, Clone, Copy)]
pub struct TeacupParameters {
    /// Temperature of the tea at t = 0
    /// unit: degrees F
    pub initial_temperature: f64,
    /// Ambient room temperature
    /// unit: degrees F
    pub room_temperature: f64,
    /// Time constant of the cooling
    /// unit: minutes
    pub characteristic_time: f64,
}

impl Default for TeacupParameters {
    fn default() -> Self {
        Self {
            initial_temperature: 180.0,
            room_temperature: 70.0,
            characteristic_time: 10.0,
        }
    }
}

/// Compile the teacup model into a fresh, independent model instance.
pub fn teacup_model(parameters: TeacupParameters) -> RsdResult<Model> {
    debug!("compiling teacup model with {:?}", parameters);
    let initial_temperature = parameters.initial_temperature;

    let mut builder = ModelBuilder::new();
    builder
        .with_time_bounds(0.0, 30.0)
        .with_time_step(0.125)
        .with_constant(
            ComponentDefinition::new("Room Temperature", "room_temperature", CachePolicy::Run)
                .with_units("degrees F")
                .with_equation_text(&parameters.room_temperature.to_string()),
            parameters.room_temperature,
        )
        .with_constant(
            ComponentDefinition::new("Characteristic Time", "characteristic_time", CachePolicy::Run)
                .with_units("minutes")
                .with_equation_text(&parameters.characteristic_time.to_string()),
            parameters.characteristic_time,
        )
        .with_component(
            ComponentDefinition::new("Heat Loss to Room", "heat_loss_to_room", CachePolicy::Step)
                .with_depends_on(&["teacup_temperature", "room_temperature", "characteristic_time"])
                .with_units("degrees F / minute")
                .with_equation_text(
                    "(Teacup Temperature - Room Temperature) / Characteristic Time",
                ),
            Arc::new(|ctx| {
                let teacup = ctx.get_scalar("teacup_temperature")?;
                let room = ctx.get_scalar("room_temperature")?;
                let characteristic_time = ctx.get_scalar("characteristic_time")?;
                Ok(Value::Scalar((teacup - room) / characteristic_time))
            }),
        )
        .with_component(
            ComponentDefinition::new("Net Heat Flow", "net_heat_flow", CachePolicy::Uncached)
                .with_depends_on(&["heat_loss_to_room"])
                .with_units("degrees F / minute")
                .with_equation_text("-Heat Loss to Room"),
            Arc::new(|ctx| Ok(Value::Scalar(-ctx.get_scalar("heat_loss_to_room")?))),
        )
        .with_stock(
            ComponentDefinition::new("Teacup Temperature", "teacup_temperature", CachePolicy::Uncached)
                .with_units("degrees F")
                .with_equation_text("INTEG(-Heat Loss to Room, initial temperature)"),
            Arc::new(move |_| Ok(Value::Scalar(initial_temperature))),
            "net_heat_flow",
        );
    builder.build()
}
