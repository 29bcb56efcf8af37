//! Builder assembling a model instance from translator output.
//!
//! The translator supplies one component per model variable, each tagged
//! with a cache policy and a canonical identifier, plus the model's default
//! time bounds and step. `build` wires the registry, seeds the state store
//! from the stock initial-value equations and captures the original
//! snapshot before any run or override can execute.

use crate::component::{CachePolicy, Component, ComponentDefinition, Equation, EquationFn};
use crate::errors::RsdResult;
use crate::integrator::Euler;
use crate::registry::{EvalContext, Registry};
use crate::state::StateStore;
use crate::timeseries::Timeseries;
use crate::value::{Time, Value};
use log::debug;

use super::runtime::Model;
use super::types::TimeSpec;

/// Build a new model instance from a set of components.
///
/// Every `build` call produces a fresh, independently owned registry and
/// state store; nothing is shared between instances.
pub struct ModelBuilder {
    components: Vec<Component>,
    initial_time: Time,
    final_time: Time,
    dt: Time,
}

impl ModelBuilder {
    /// Create a new model builder with default settings.
    pub fn new() -> Self {
        Self {
            components: vec![],
            initial_time: 0.0,
            final_time: 100.0,
            dt: 1.0,
        }
    }

    /// Set the simulation start and end times.
    pub fn with_time_bounds(&mut self, initial_time: Time, final_time: Time) -> &mut Self {
        assert!(
            final_time > initial_time,
            "final time must be after the initial time"
        );
        self.initial_time = initial_time;
        self.final_time = final_time;
        self
    }

    /// Set the integration time step.
    pub fn with_time_step(&mut self, dt: Time) -> &mut Self {
        assert!(dt.is_finite() && dt > 0.0, "time step must be positive");
        self.dt = dt;
        self
    }

    /// Register an equation component (flow or auxiliary).
    pub fn with_component(
        &mut self,
        definition: ComponentDefinition,
        equation: EquationFn,
    ) -> &mut Self {
        self.components.push(Component {
            definition,
            equation: Equation::Function(equation),
        });
        self
    }

    /// Register a constant. Constants are run-cached regardless of the
    /// policy on the definition.
    pub fn with_constant(
        &mut self,
        definition: ComponentDefinition,
        value: impl Into<Value>,
    ) -> &mut Self {
        let definition = ComponentDefinition {
            policy: CachePolicy::Run,
            ..definition
        };
        self.components.push(Component {
            definition,
            equation: Equation::Constant(value.into()),
        });
        self
    }

    /// Register a lookup table driven by the definition's first dependency.
    ///
    /// Panics if the definition declares no dependencies.
    pub fn with_lookup(&mut self, definition: ComponentDefinition, table: Timeseries) -> &mut Self {
        assert!(
            !definition.depends_on.is_empty(),
            "lookup {} must declare its input as a dependency",
            definition.ident
        );
        self.components.push(Component {
            definition,
            equation: Equation::Lookup(table),
        });
        self
    }

    /// Register a stock with its initial-value equation and the identifier
    /// of its net-flow (derivative) component.
    ///
    /// Stocks are always uncached: their value must reflect mid-step
    /// mutation by the integrator.
    pub fn with_stock(
        &mut self,
        definition: ComponentDefinition,
        initial: EquationFn,
        derivative: &str,
    ) -> &mut Self {
        let definition = ComponentDefinition {
            policy: CachePolicy::Uncached,
            ..definition
        };
        self.components.push(Component {
            definition,
            equation: Equation::Stock {
                initial,
                derivative: derivative.to_string(),
            },
        });
        self
    }

    /// Build the registry and state store and create a concrete model.
    ///
    /// Stock initial-value equations are evaluated in registration order;
    /// an initial equation may read constants, lookups and stocks that were
    /// registered before it.
    pub fn build(&self) -> RsdResult<Model> {
        let mut registry = Registry::new();
        for component in &self.components {
            registry.register(component.clone());
        }
        registry.connect();

        let mut state = StateStore::new(self.initial_time);
        for component in &self.components {
            if let Equation::Stock { initial, .. } = &component.equation {
                let value = initial(&EvalContext::new(&registry, &state))?;
                state.insert(component.ident().to_string(), value);
            }
        }

        // Initial-value evaluation may have populated the caches; start the
        // instance clean.
        registry.clear_run_cache();
        registry.invalidate_step_cache();

        let spec = TimeSpec {
            initial_time: self.initial_time,
            final_time: self.final_time,
            dt: self.dt,
        };
        debug!(
            "built model with {} components over t = [{}, {}]",
            self.components.len(),
            spec.initial_time,
            spec.final_time
        );

        // The original snapshot is captured exactly once, before any run or
        // override has executed, and is never overwritten.
        let original = state.capture();
        Ok(Model::new(registry, state, original, Euler::new(self.dt), spec))
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
