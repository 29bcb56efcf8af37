//! A susceptible-infectious-recovered epidemic model.
//!
//! Infection Rate = Contact Rate * Infectivity * Susceptible * Infectious / Total Population
//! Recovery Rate  = Infectious / Average Illness Duration
//!
//! The three stocks only move people between each other, so the total
//! population is conserved for the whole run.

use log::debug;
use rsd_core::component::{CachePolicy, ComponentDefinition};
use rsd_core::errors::RsdResult;
use rsd_core::model::{Model, ModelBuilder};
use rsd_core::value::Value;
use std::sync::Arc;

/// Parameters for the epidemic model.
#[derive(Debug, Clone, Copy)]
pub struct EpidemicParameters {
    /// Contacts per person per day
    /// unit: 1 / day
    pub contact_rate: f64,
    /// Probability that a contact between a susceptible and an infectious
    /// person transmits the disease
    /// unit: dimensionless
    pub infectivity: f64,
    /// Mean time a person remains infectious
    /// unit: days
    pub average_illness_duration: f64,
    /// unit: people
    pub total_population: f64,
    /// Infectious people at t = 0
    /// unit: people
    pub initial_infectious: f64,
}

impl Default for EpidemicParameters {
    fn default() -> Self {
        Self {
            contact_rate: 10.0,
            infectivity: 0.05,
            average_illness_duration: 8.0,
            total_population: 1000.0,
            initial_infectious: 10.0,
        }
    }
}

/// Compile the epidemic model into a fresh, independent model instance.
pub fn epidemic_model(parameters: EpidemicParameters) -> RsdResult<Model> {
    debug!("compiling epidemic model with {:?}", parameters);
    let initial_infectious = parameters.initial_infectious;

    let mut builder = ModelBuilder::new();
    builder
        .with_time_bounds(0.0, 100.0)
        .with_time_step(0.25)
        .with_constant(
            ComponentDefinition::new("Contact Rate", "contact_rate", CachePolicy::Run)
                .with_units("1/day")
                .with_equation_text(&parameters.contact_rate.to_string()),
            parameters.contact_rate,
        )
        .with_constant(
            ComponentDefinition::new("Infectivity", "infectivity", CachePolicy::Run)
                .with_units("dimensionless")
                .with_equation_text(&parameters.infectivity.to_string()),
            parameters.infectivity,
        )
        .with_constant(
            ComponentDefinition::new(
                "Average Illness Duration",
                "average_illness_duration",
                CachePolicy::Run,
            )
            .with_units("days")
            .with_equation_text(&parameters.average_illness_duration.to_string()),
            parameters.average_illness_duration,
        )
        .with_constant(
            ComponentDefinition::new("Total Population", "total_population", CachePolicy::Run)
                .with_units("people")
                .with_equation_text(&parameters.total_population.to_string()),
            parameters.total_population,
        )
        .with_component(
            ComponentDefinition::new("Infection Rate", "infection_rate", CachePolicy::Step)
                .with_depends_on(&[
                    "contact_rate",
                    "infectivity",
                    "susceptible",
                    "infectious",
                    "total_population",
                ])
                .with_units("people/day")
                .with_equation_text(
                    "Contact Rate * Infectivity * Susceptible * Infectious / Total Population",
                ),
            Arc::new(|ctx| {
                let contact_rate = ctx.get_scalar("contact_rate")?;
                let infectivity = ctx.get_scalar("infectivity")?;
                let susceptible = ctx.get_scalar("susceptible")?;
                let infectious = ctx.get_scalar("infectious")?;
                let total_population = ctx.get_scalar("total_population")?;
                Ok(Value::Scalar(
                    contact_rate * infectivity * susceptible * infectious / total_population,
                ))
            }),
        )
        .with_component(
            ComponentDefinition::new("Recovery Rate", "recovery_rate", CachePolicy::Step)
                .with_depends_on(&["infectious", "average_illness_duration"])
                .with_units("people/day")
                .with_equation_text("Infectious / Average Illness Duration"),
            Arc::new(|ctx| {
                let infectious = ctx.get_scalar("infectious")?;
                let duration = ctx.get_scalar("average_illness_duration")?;
                Ok(Value::Scalar(infectious / duration))
            }),
        )
        .with_component(
            ComponentDefinition::new(
                "Susceptible Net Flow",
                "susceptible_net_flow",
                CachePolicy::Uncached,
            )
            .with_depends_on(&["infection_rate"])
            .with_units("people/day")
            .with_equation_text("-Infection Rate"),
            Arc::new(|ctx| Ok(Value::Scalar(-ctx.get_scalar("infection_rate")?))),
        )
        .with_component(
            ComponentDefinition::new(
                "Infectious Net Flow",
                "infectious_net_flow",
                CachePolicy::Uncached,
            )
            .with_depends_on(&["infection_rate", "recovery_rate"])
            .with_units("people/day")
            .with_equation_text("Infection Rate - Recovery Rate"),
            Arc::new(|ctx| {
                Ok(Value::Scalar(
                    ctx.get_scalar("infection_rate")? - ctx.get_scalar("recovery_rate")?,
                ))
            }),
        )
        .with_stock(
            ComponentDefinition::new("Susceptible", "susceptible", CachePolicy::Uncached)
                .with_units("people")
                .with_equation_text("INTEG(-Infection Rate, Total Population - initial infectious)"),
            Arc::new(move |ctx| {
                Ok(Value::Scalar(
                    ctx.get_scalar("total_population")? - initial_infectious,
                ))
            }),
            "susceptible_net_flow",
        )
        .with_stock(
            ComponentDefinition::new("Infectious", "infectious", CachePolicy::Uncached)
                .with_units("people")
                .with_equation_text("INTEG(Infection Rate - Recovery Rate, initial infectious)"),
            Arc::new(move |_| Ok(Value::Scalar(initial_infectious))),
            "infectious_net_flow",
        )
        .with_stock(
            ComponentDefinition::new("Recovered", "recovered", CachePolicy::Uncached)
                .with_units("people")
                .with_equation_text("INTEG(Recovery Rate, 0)"),
            Arc::new(|_| Ok(Value::Scalar(0.0))),
            "recovery_rate",
        );
    builder.build()
}
