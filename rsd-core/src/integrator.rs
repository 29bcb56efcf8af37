//! Fixed-step explicit time integration.

use crate::errors::RsdResult;
use crate::registry::Registry;
use crate::state::StateStore;
use crate::value::Time;
use log::trace;
use serde::{Deserialize, Serialize};

/// Fixed-step explicit (first-order) Euler integrator.
///
/// All stock derivatives for a step are evaluated against the same
/// pre-update state, so a later-updated stock is never visible to an
/// earlier derivative evaluation within the same step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Euler {
    dt: Time,
}

impl Euler {
    /// Create an integrator with the given time step.
    ///
    /// Panics if `dt` is not a positive, finite number.
    pub fn new(dt: Time) -> Self {
        assert!(dt.is_finite() && dt > 0.0, "time step must be positive");
        Self { dt }
    }

    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Advance the state to `t_end`, stepping by `dt`.
    ///
    /// The end time is reached exactly: when the span is not an integer
    /// multiple of `dt` the final step is truncated to land on `t_end`
    /// without overshoot. Requests at or before the current time are a
    /// no-op; callers reject running backwards.
    pub fn integrate(
        &self,
        registry: &Registry,
        state: &mut StateStore,
        t_end: Time,
    ) -> RsdResult<()> {
        let t_start = state.time();
        let mut step = 0u64;
        while state.time() < t_end {
            step += 1;
            let mut t_next = t_start + (step as Time) * self.dt;
            // Tolerate float fuzz when the span is an exact multiple of dt.
            if t_next > t_end - self.dt * 1e-9 {
                t_next = t_end;
            }
            self.step(registry, state, t_next)?;
        }
        Ok(())
    }

    /// One explicit Euler step from the current time to `t_next`.
    fn step(&self, registry: &Registry, state: &mut StateStore, t_next: Time) -> RsdResult<()> {
        let dt = t_next - state.time();
        trace!("stepping from {} to {}", state.time(), t_next);

        // Evaluate every derivative before any stock is written
        // (simultaneous update semantics).
        let mut updates = Vec::with_capacity(state.len());
        for (stock, derivative) in registry.stock_derivatives() {
            let net_flow = registry.get(&derivative, state)?;
            let current = state
                .get(&stock)
                .cloned()
                .unwrap_or_else(|| panic!("stock {} missing from state store", stock));
            updates.push((stock, current.euler_step(&net_flow, dt)));
        }

        for (stock, value) in updates {
            state.set(&stock, value)?;
        }
        state.set_time(t_next);
        registry.invalidate_step_cache();
        Ok(())
    }
}
