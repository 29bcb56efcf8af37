//! Model struct and run orchestration.

use crate::errors::{RsdError, RsdResult};
use crate::integrator::Euler;
use crate::registry::Registry;
use crate::state::{Snapshot, StateStore};
use crate::value::{FloatValue, Time, Value};
use log::debug;
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use std::collections::HashMap;
use std::fmt::Write;

use super::types::{InitialCondition, Param, ReturnTimestamps, RunOptions, RunResult, TimeSpec};

/// One loaded model instance.
///
/// A model owns its component registry, its state store and the original
/// snapshot captured at load time. Instances are fully isolated: running or
/// perturbing one model never affects another.
#[derive(Debug)]
pub struct Model {
    registry: Registry,
    state: StateStore,
    /// The state immediately after load, before any run or override.
    original: Snapshot,
    integrator: Euler,
    spec: TimeSpec,
}

/// How one output column is extracted from component values.
struct ColumnPlan {
    label: String,
    ident: String,
    /// Subscript element index when flattening array-valued variables.
    element: Option<usize>,
}

impl Model {
    pub(crate) fn new(
        registry: Registry,
        state: StateStore,
        original: Snapshot,
        integrator: Euler,
        spec: TimeSpec,
    ) -> Self {
        Self {
            registry,
            state,
            original,
            integrator,
            spec,
        }
    }

    /// The current simulation time.
    pub fn time(&self) -> Time {
        self.state.time()
    }

    pub fn time_spec(&self) -> &TimeSpec {
        &self.spec
    }

    /// Read-only access to the component registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Read a component's current value.
    pub fn get(&self, name: &str) -> RsdResult<Value> {
        self.registry.get(name, &self.state)
    }

    /// Read a component's current value as a scalar.
    pub fn get_scalar(&self, name: &str) -> RsdResult<FloatValue> {
        Ok(self.get(name)?.to_scalar())
    }

    /// Canonical identifiers of the model's stocks, in registration order.
    pub fn stocks(&self) -> Vec<String> {
        self.registry
            .stocks()
            .map(|c| c.ident().to_string())
            .collect()
    }

    /// Override one variable with a constant or a time series.
    ///
    /// The override outlives any run; it stays installed until replaced or
    /// cleared.
    pub fn set_component(&mut self, name: &str, param: impl Into<Param>) -> RsdResult<()> {
        match param.into() {
            Param::Constant(value) => self.registry.set_constant(name, value),
            Param::Timeseries(series) => self.registry.set_timeseries(name, series),
        }
    }

    /// Override several variables at once.
    pub fn set_components(
        &mut self,
        params: impl IntoIterator<Item = (String, Param)>,
    ) -> RsdResult<()> {
        for (name, param) in params {
            self.set_component(&name, param)?;
        }
        Ok(())
    }

    /// Remove every installed override, restoring the original equations.
    pub fn clear_overrides(&mut self) {
        self.registry.clear_overrides();
    }

    /// Capture the current (time, stock values) pair.
    pub fn snapshot(&self) -> Snapshot {
        self.state.capture()
    }

    /// Restore a previously captured snapshot.
    ///
    /// Fails with `IncompleteState` and leaves the state untouched when the
    /// snapshot is missing a stock.
    pub fn restore(&mut self, snapshot: &Snapshot) -> RsdResult<()> {
        self.state.restore(snapshot)
    }

    /// Return the instance to the exact state it had immediately after load.
    pub fn reset_state(&mut self) {
        self.state
            .restore(&self.original)
            .expect("original snapshot covers every stock");
    }

    /// Set the simulation time and a subset of stock values.
    ///
    /// Stock names may be canonical identifiers or display names. Stocks
    /// not listed keep their current value.
    pub fn set_state(&mut self, time: Time, values: &HashMap<String, Value>) -> RsdResult<()> {
        let mut resolved = HashMap::with_capacity(values.len());
        for (name, value) in values {
            resolved.insert(self.registry.resolve(name)?, value.clone());
        }
        self.state.set_state(time, &resolved)
    }

    /// Install an initial condition without running.
    pub fn set_initial_condition(&mut self, initial_condition: InitialCondition) -> RsdResult<()> {
        match initial_condition {
            InitialCondition::Original => {
                self.reset_state();
                Ok(())
            }
            InitialCondition::Current => Ok(()),
            InitialCondition::Explicit(time, values) => self.set_state(time, &values),
        }
    }

    /// Run the model and return a time-indexed table of samples.
    ///
    /// Applies the requested initial condition, installs any parameter
    /// overrides (which persist on the instance afterwards), then drives the
    /// integrator across the requested span, sampling the requested columns
    /// at each requested timestamp. Output timestamps need not coincide with
    /// integration steps; each one is landed on exactly by truncating the
    /// step that would overshoot it.
    ///
    /// When `return_columns` is omitted the model's stocks are returned.
    pub fn run(&mut self, options: RunOptions) -> RsdResult<RunResult> {
        self.set_initial_condition(options.initial_condition.clone())?;
        for (name, param) in &options.params {
            self.set_component(name, param.clone())?;
        }

        // Run-cached values live for exactly one run.
        self.registry.clear_run_cache();
        self.registry.invalidate_step_cache();

        let start = self.state.time();
        let timestamps = self.resolve_timestamps(options.return_timestamps.as_ref(), start)?;
        let plan = self.resolve_columns(
            options.return_columns.as_deref(),
            options.flatten_subscripts,
        )?;
        debug!(
            "running from t={} over {} samples and {} columns",
            start,
            timestamps.len(),
            plan.len()
        );

        let mut result = RunResult::new(plan.iter().map(|c| c.label.clone()).collect());
        for &t in &timestamps {
            self.integrator
                .integrate(&self.registry, &mut self.state, t)?;

            let mut row = Vec::with_capacity(plan.len());
            for column in &plan {
                let value = self.registry.get(&column.ident, &self.state)?;
                row.push(match column.element {
                    None => value,
                    Some(idx) => Value::Scalar(extract_element(&column.ident, &value, idx)?),
                });
            }
            result.push(t, row);
        }
        Ok(result)
    }

    fn resolve_timestamps(
        &self,
        requested: Option<&ReturnTimestamps>,
        start: Time,
    ) -> RsdResult<Vec<Time>> {
        match requested {
            None => {
                // Default: one sample per integration step up to the
                // model's final time, including the initial state.
                let dt = self.spec.dt;
                let mut timestamps = Vec::new();
                let mut i = 0u64;
                loop {
                    let t = start + (i as Time) * dt;
                    if t > self.spec.final_time - dt * 1e-9 {
                        break;
                    }
                    timestamps.push(t);
                    i += 1;
                }
                timestamps.push(self.spec.final_time);
                Ok(timestamps)
            }
            Some(ReturnTimestamps::Single(t)) => {
                if !t.is_finite() {
                    return Err(RsdError::InvalidTimestamps(format!(
                        "timestamp {} is not finite",
                        t
                    )));
                }
                if *t < start {
                    return Err(RsdError::InvalidTimestamps(format!(
                        "timestamp {} precedes the current time {}",
                        t, start
                    )));
                }
                Ok(vec![*t])
            }
            Some(ReturnTimestamps::Series(times)) => {
                let mut previous = start;
                for &t in times {
                    if !t.is_finite() {
                        return Err(RsdError::InvalidTimestamps(format!(
                            "timestamp {} is not finite",
                            t
                        )));
                    }
                    if t < previous {
                        return Err(RsdError::InvalidTimestamps(format!(
                            "timestamps must be non-decreasing and start at or after {}: found {} after {}",
                            start, t, previous
                        )));
                    }
                    previous = t;
                }
                Ok(times.clone())
            }
        }
    }

    fn resolve_columns(
        &self,
        requested: Option<&[String]>,
        flatten_subscripts: bool,
    ) -> RsdResult<Vec<ColumnPlan>> {
        let names: Vec<String> = match requested {
            Some(names) => names.to_vec(),
            None => self.stocks(),
        };

        let mut plan = Vec::with_capacity(names.len());
        for name in names {
            let definition = self.registry.definition(&name)?;
            if flatten_subscripts && definition.is_subscripted() {
                for (idx, label) in definition.subscripts.iter().enumerate() {
                    plan.push(ColumnPlan {
                        label: format!("{}[{}]", name, label),
                        ident: definition.ident.clone(),
                        element: Some(idx),
                    });
                }
            } else {
                plan.push(ColumnPlan {
                    label: name,
                    ident: definition.ident.clone(),
                    element: None,
                });
            }
        }
        Ok(plan)
    }

    /// A human-readable listing of every component.
    ///
    /// Lists each component's display name, canonical identifier, units and
    /// equation text, sourced from translator metadata. With `short`, lists
    /// names only.
    pub fn doc(&self, short: bool) -> String {
        let mut out = String::new();
        for component in self.registry.components() {
            let definition = &component.definition;
            if short {
                writeln!(out, "{}", definition.name).unwrap();
                continue;
            }
            writeln!(out, "{} ({})", definition.name, definition.ident).unwrap();
            if !definition.units.is_empty() {
                writeln!(out, "  Units: {}", definition.units).unwrap();
            }
            if !definition.equation_text.is_empty() {
                writeln!(out, "  Equation: {}", definition.equation_text).unwrap();
            }
        }
        out
    }

    /// Create a diagram that represents the component dependency graph.
    ///
    /// Useful for debugging.
    pub fn as_dot(&self) -> Dot<'_, &DiGraph<String, ()>> {
        self.registry.as_dot()
    }
}

fn extract_element(ident: &str, value: &Value, idx: usize) -> RsdResult<FloatValue> {
    value
        .as_array()
        .and_then(|values| values.get(idx).copied())
        .ok_or_else(|| {
            RsdError::ShapeMismatch(format!(
                "'{}' has no value for subscript element {}",
                ident, idx
            ))
        })
}
