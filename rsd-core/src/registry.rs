//! Per-instance component registry with cache-policy enforcement.
//!
//! Evaluation is demand-driven: reading a component triggers recursive
//! evaluation of its dependencies. The registry enforces the cache policy of
//! each component, applies parameter overrides and detects algebraic
//! dependency cycles that are not broken by a stock.
//!
//! Nothing in the registry is shared between model instances; loading two
//! models never lets mutations to one instance become visible to the other.

use crate::component::{CachePolicy, Component, ComponentDefinition, Equation};
use crate::errors::{RsdError, RsdResult};
use crate::state::StateStore;
use crate::timeseries::Timeseries;
use crate::value::{FloatValue, Time, Value};
use log::debug;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::cell::RefCell;
use std::collections::HashMap;

/// A caller-supplied replacement for a component's normal equation.
#[derive(Debug, Clone)]
pub enum Override {
    /// A fixed value, behaving as a run-cached constant.
    Constant(Value),
    /// A time series evaluated by interpolation at the current time.
    Timeseries(Timeseries),
}

/// The full set of named equation functions for one model instance.
#[derive(Debug)]
pub struct Registry {
    components: HashMap<String, Component>,
    /// Display name -> canonical identifier.
    display_names: HashMap<String, String>,
    /// Registration order, used for deterministic iteration.
    order: Vec<String>,
    /// Declared dependency graph, kept for diagnostics.
    graph: DiGraph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
    overrides: HashMap<String, Override>,
    run_cache: RefCell<HashMap<String, Value>>,
    step_cache: RefCell<HashMap<String, Value>>,
    /// Components currently being evaluated, for cycle detection.
    eval_stack: RefCell<Vec<String>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            components: HashMap::new(),
            display_names: HashMap::new(),
            order: Vec::new(),
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            overrides: HashMap::new(),
            run_cache: RefCell::new(HashMap::new()),
            step_cache: RefCell::new(HashMap::new()),
            eval_stack: RefCell::new(Vec::new()),
        }
    }

    /// Add a new component to the registry.
    ///
    /// Panics if a component with the same identifier or display name
    /// already exists.
    pub(crate) fn register(&mut self, component: Component) {
        let ident = component.ident().to_string();
        let name = component.name().to_string();
        if self.components.contains_key(&ident) {
            panic!("component {} already exists", ident);
        }
        if self.display_names.contains_key(&name) {
            panic!("component display name '{}' already exists", name);
        }

        let node = self.graph.add_node(ident.clone());
        self.node_indices.insert(ident.clone(), node);
        self.display_names.insert(name, ident.clone());
        self.order.push(ident.clone());
        self.components.insert(ident, component);
    }

    /// Add dependency edges for every declared dependency.
    ///
    /// Called once by the builder after all components are registered.
    /// Dependencies on unknown names are left out of the graph; they fail
    /// with `UnknownVariable` at first evaluation instead.
    pub(crate) fn connect(&mut self) {
        let mut edges = Vec::new();
        for ident in &self.order {
            let component = &self.components[ident];
            for dep in &component.definition.depends_on {
                if let (Some(&from), Some(&to)) =
                    (self.node_indices.get(dep), self.node_indices.get(ident))
                {
                    edges.push((from, to));
                }
            }
        }
        for (from, to) in edges {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Resolve a canonical identifier or display name to the identifier.
    pub fn resolve(&self, name: &str) -> RsdResult<String> {
        if self.components.contains_key(name) {
            return Ok(name.to_string());
        }
        self.display_names
            .get(name)
            .cloned()
            .ok_or_else(|| RsdError::UnknownVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Look up a component's definition by identifier or display name.
    pub fn definition(&self, name: &str) -> RsdResult<&ComponentDefinition> {
        let ident = self.resolve(name)?;
        Ok(&self.components[&ident].definition)
    }

    /// Components in registration order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.order.iter().map(move |ident| &self.components[ident])
    }

    /// Stock components in registration order.
    pub fn stocks(&self) -> impl Iterator<Item = &Component> {
        self.components().filter(|c| c.is_stock())
    }

    /// (stock identifier, derivative identifier) pairs in registration order.
    pub(crate) fn stock_derivatives(&self) -> Vec<(String, String)> {
        self.components()
            .filter_map(|c| match &c.equation {
                Equation::Stock { derivative, .. } => {
                    Some((c.ident().to_string(), derivative.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Read a component's current value, evaluating dependencies on demand.
    pub fn get(&self, name: &str, state: &StateStore) -> RsdResult<Value> {
        let ident = self.resolve(name)?;
        self.evaluate(&ident, state)
    }

    fn evaluate(&self, ident: &str, state: &StateStore) -> RsdResult<Value> {
        // Overrides take precedence over the component's own equation and
        // its caches.
        if let Some(active) = self.overrides.get(ident) {
            return Ok(match active {
                Override::Constant(value) => value.clone(),
                Override::Timeseries(series) => Value::Scalar(series.at(state.time())),
            });
        }

        let component = self
            .components
            .get(ident)
            .ok_or_else(|| RsdError::UnknownVariable(ident.to_string()))?;

        match component.definition.policy {
            CachePolicy::Run => {
                if let Some(value) = self.run_cache.borrow().get(ident) {
                    return Ok(value.clone());
                }
            }
            CachePolicy::Step => {
                if let Some(value) = self.step_cache.borrow().get(ident) {
                    return Ok(value.clone());
                }
            }
            CachePolicy::Uncached => {}
        }

        // Stocks read their value straight from the state store, which is
        // how a stock breaks an otherwise circular dependency chain.
        if let Equation::Stock { .. } = component.equation {
            return state
                .get(ident)
                .cloned()
                .ok_or_else(|| RsdError::UnknownVariable(ident.to_string()));
        }

        {
            let mut stack = self.eval_stack.borrow_mut();
            if stack.iter().any(|entry| entry == ident) {
                let mut cycle = stack.clone();
                cycle.push(ident.to_string());
                stack.clear();
                return Err(RsdError::UnresolvedCycle(cycle));
            }
            stack.push(ident.to_string());
        }

        let result = match &component.equation {
            Equation::Constant(value) => Ok(value.clone()),
            Equation::Lookup(table) => self.evaluate_lookup(component, table, state),
            Equation::Function(equation) => equation(&EvalContext {
                registry: self,
                state,
            }),
            Equation::Stock { .. } => unreachable!("stocks are handled above"),
        };
        self.eval_stack.borrow_mut().pop();

        let value = result?;
        match component.definition.policy {
            CachePolicy::Run => {
                self.run_cache
                    .borrow_mut()
                    .insert(ident.to_string(), value.clone());
            }
            CachePolicy::Step => {
                self.step_cache
                    .borrow_mut()
                    .insert(ident.to_string(), value.clone());
            }
            CachePolicy::Uncached => {}
        }
        Ok(value)
    }

    fn evaluate_lookup(
        &self,
        component: &Component,
        table: &Timeseries,
        state: &StateStore,
    ) -> RsdResult<Value> {
        // The builder guarantees a lookup declares its input first.
        let input = component
            .definition
            .depends_on
            .first()
            .expect("lookup components declare their input as the first dependency");
        let argument = self.evaluate(input, state)?;
        Ok(match argument {
            Value::Scalar(x) => Value::Scalar(table.at(x)),
            Value::Array(xs) => Value::Array(xs.mapv(|x| table.at(x))),
        })
    }

    /// Drop all step-cached values.
    ///
    /// Called exactly once per integration step so that every reader within
    /// a step observes an identical value.
    pub fn invalidate_step_cache(&self) {
        self.step_cache.borrow_mut().clear();
    }

    /// Drop all run-cached values. Called at the start of each run.
    pub(crate) fn clear_run_cache(&self) {
        self.run_cache.borrow_mut().clear();
    }

    /// Replace a component's equation with a constant value.
    ///
    /// The replacement behaves as run-cached and persists until cleared or
    /// replaced; re-setting the same name has no residual effect from the
    /// previous override. The value's shape must match the component's
    /// subscripts.
    pub fn set_constant(&mut self, name: &str, value: Value) -> RsdResult<()> {
        let ident = self.resolve(name)?;
        self.check_override_shape(&ident, &value)?;
        debug!("overriding {} with constant", ident);
        self.drop_cached(&ident);
        self.overrides.insert(ident, Override::Constant(value));
        Ok(())
    }

    /// Replace a component's equation with an interpolated time series.
    ///
    /// The replacement is uncached since its value depends on the current
    /// simulation time. Series overrides are scalar-valued and cannot be
    /// installed on subscripted components.
    pub fn set_timeseries(&mut self, name: &str, series: Timeseries) -> RsdResult<()> {
        let ident = self.resolve(name)?;
        let definition = &self.components[&ident].definition;
        if definition.is_subscripted() {
            return Err(RsdError::InvalidOverride(format!(
                "'{}' is subscripted; time series overrides are scalar-valued",
                ident
            )));
        }
        debug!("overriding {} with time series", ident);
        self.drop_cached(&ident);
        self.overrides.insert(ident, Override::Timeseries(series));
        Ok(())
    }

    /// Remove every installed override.
    pub fn clear_overrides(&mut self) {
        for ident in self.overrides.keys().cloned().collect::<Vec<_>>() {
            self.drop_cached(&ident);
        }
        self.overrides.clear();
    }

    pub fn has_override(&self, name: &str) -> bool {
        self.resolve(name)
            .map(|ident| self.overrides.contains_key(&ident))
            .unwrap_or(false)
    }

    /// An override must have the shape the component declares: a scalar for
    /// scalar components, one element per subscript label otherwise.
    fn check_override_shape(&self, ident: &str, value: &Value) -> RsdResult<()> {
        let expected = self.components[ident].definition.subscripts.len();
        let found = match value {
            Value::Scalar(_) => 0,
            Value::Array(values) => values.len(),
        };
        if found != expected {
            let message = if expected == 0 {
                format!("'{}' is scalar but the override has {} elements", ident, found)
            } else {
                format!(
                    "'{}' expects {} subscript elements, the override has {}",
                    ident, expected, found
                )
            };
            return Err(RsdError::InvalidOverride(message));
        }
        Ok(())
    }

    /// Stale cached values must not outlive the equation that produced them.
    fn drop_cached(&self, ident: &str) {
        self.run_cache.borrow_mut().remove(ident);
        self.step_cache.borrow_mut().remove(ident);
    }

    /// Create a diagram that represents the dependency graph.
    ///
    /// Useful for debugging.
    pub fn as_dot(&self) -> Dot<'_, &DiGraph<String, ()>> {
        Dot::with_config(&self.graph, &[Config::EdgeNoLabel])
    }
}

/// Evaluation context handed to equation functions.
///
/// Equations read their dependencies through the context rather than
/// capturing the registry, keeping every equation a pure function of
/// (state, time, other components).
pub struct EvalContext<'a> {
    registry: &'a Registry,
    state: &'a StateStore,
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(registry: &'a Registry, state: &'a StateStore) -> Self {
        Self { registry, state }
    }

    /// Read another component by canonical identifier or display name.
    pub fn get(&self, name: &str) -> RsdResult<Value> {
        self.registry.get(name, self.state)
    }

    /// Read another component, aggregating array values to a scalar mean.
    pub fn get_scalar(&self, name: &str) -> RsdResult<FloatValue> {
        Ok(self.get(name)?.to_scalar())
    }

    /// The current simulation time.
    pub fn time(&self) -> Time {
        self.state.time()
    }
}
