//! Component definitions as produced by the translator.
//!
//! A component is a named, pure function of the current state, the current
//! time and other components. The translator tags each component with a
//! cache policy and the set of components its equation reads.

use crate::errors::RsdResult;
use crate::registry::EvalContext;
use crate::timeseries::Timeseries;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Rule governing how long a computed component value remains valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CachePolicy {
    /// Recomputed on every read.
    ///
    /// Used for stocks and anything that must reflect mid-step mutation.
    Uncached,
    /// Computed at most once per integration step; every reader within a
    /// step observes the same value.
    Step,
    /// Computed at most once per run. Used for true constants.
    Run,
}

/// An equation function, evaluated on demand against an [`EvalContext`].
pub type EquationFn = Arc<dyn Fn(&EvalContext) -> RsdResult<Value> + Send + Sync>;

/// The equation backing a component.
#[derive(Clone)]
pub enum Equation {
    /// An arbitrary function of other components, state and time.
    Function(EquationFn),
    /// A fixed value.
    Constant(Value),
    /// An interpolation table driven by the component's first dependency.
    Lookup(Timeseries),
    /// Integrable state. The current value is read from the state store;
    /// `initial` seeds the state store at build time and `derivative` names
    /// the component providing the net flow.
    Stock {
        initial: EquationFn,
        derivative: String,
    },
}

impl fmt::Debug for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equation::Function(_) => f.write_str("Function"),
            Equation::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Equation::Lookup(table) => f.debug_tuple("Lookup").field(table).finish(),
            Equation::Stock { derivative, .. } => f
                .debug_struct("Stock")
                .field("derivative", derivative)
                .finish(),
        }
    }
}

/// Static description of a model variable, supplied by the translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    /// Original display name, e.g. `"Teacup Temperature"`.
    pub name: String,
    /// Canonical identifier, e.g. `"teacup_temperature"`.
    pub ident: String,
    pub policy: CachePolicy,
    /// Canonical identifiers of the components this equation reads.
    pub depends_on: Vec<String>,
    /// Units metadata used for documentation output; not validated.
    pub units: String,
    /// Source equation text used for documentation output.
    pub equation_text: String,
    /// Subscript element labels; empty for scalar variables.
    pub subscripts: Vec<String>,
}

impl ComponentDefinition {
    pub fn new(name: &str, ident: &str, policy: CachePolicy) -> Self {
        Self {
            name: name.to_string(),
            ident: ident.to_string(),
            policy,
            depends_on: vec![],
            units: String::new(),
            equation_text: String::new(),
            subscripts: vec![],
        }
    }

    pub fn with_depends_on(mut self, depends_on: &[&str]) -> Self {
        self.depends_on = depends_on.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    pub fn with_equation_text(mut self, equation_text: &str) -> Self {
        self.equation_text = equation_text.to_string();
        self
    }

    pub fn with_subscripts(mut self, subscripts: &[&str]) -> Self {
        self.subscripts = subscripts.iter().map(|s| s.to_string()).collect();
        self
    }

    /// True for array-valued (subscripted) variables.
    pub fn is_subscripted(&self) -> bool {
        !self.subscripts.is_empty()
    }
}

/// A registered component: its definition plus the equation that computes it.
#[derive(Debug, Clone)]
pub struct Component {
    pub definition: ComponentDefinition,
    pub equation: Equation,
}

impl Component {
    pub fn ident(&self) -> &str {
        &self.definition.ident
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn is_stock(&self) -> bool {
        matches!(self.equation, Equation::Stock { .. })
    }
}

/// Sanitize a display name into a canonical identifier.
///
/// Lowercases the name, maps any non-alphanumeric run to a single
/// underscore and trims leading/trailing underscores.
pub fn canonicalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}
