//! Simulation state and snapshots.
//!
//! The [`StateStore`] holds the current simulation time and the current
//! value of every stock. Exactly one store exists per model instance and it
//! is mutated only by the integrator and the snapshot operations.

use crate::errors::{RsdError, RsdResult};
use crate::value::{Time, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An immutable capture of simulation time and all stock values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: Time,
    pub stocks: HashMap<String, Value>,
}

/// The mutable simulation state: current time plus current stock values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateStore {
    time: Time,
    values: HashMap<String, Value>,
    /// Stock registration order, used for deterministic iteration.
    order: Vec<String>,
}

impl StateStore {
    pub(crate) fn new(time: Time) -> Self {
        Self {
            time,
            values: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a new stock to the store.
    ///
    /// Panics if a stock with the same identifier already exists.
    pub(crate) fn insert(&mut self, ident: String, value: Value) {
        if self.values.contains_key(&ident) {
            panic!("stock {} already exists", ident);
        }
        self.order.push(ident.clone());
        self.values.insert(ident, value);
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub(crate) fn set_time(&mut self, time: Time) {
        self.time = time;
    }

    pub fn get(&self, ident: &str) -> Option<&Value> {
        self.values.get(ident)
    }

    /// Replace the value of an existing stock.
    pub(crate) fn set(&mut self, ident: &str, value: Value) -> RsdResult<()> {
        match self.values.get_mut(ident) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RsdError::UnknownVariable(ident.to_string())),
        }
    }

    /// Stock identifiers in registration order.
    pub fn idents(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Capture the current (time, stock values) pair.
    pub fn capture(&self) -> Snapshot {
        Snapshot {
            time: self.time,
            stocks: self.values.clone(),
        }
    }

    /// Restore a previously captured snapshot.
    ///
    /// The operation is atomic from the caller's perspective: the snapshot
    /// is checked against the full stock set before anything is written, and
    /// a snapshot missing a stock fails with `IncompleteState` leaving the
    /// prior state unchanged.
    pub fn restore(&mut self, snapshot: &Snapshot) -> RsdResult<()> {
        let missing: Vec<String> = self
            .order
            .iter()
            .filter(|ident| !snapshot.stocks.contains_key(*ident))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(RsdError::IncompleteState(missing));
        }

        for ident in &self.order {
            self.values
                .insert(ident.clone(), snapshot.stocks[ident].clone());
        }
        self.time = snapshot.time;
        Ok(())
    }

    /// Set the simulation time and a subset of stock values.
    ///
    /// Unlike [`StateStore::restore`] the mapping may be partial; stocks not
    /// listed keep their current value. Unknown stocks are rejected before
    /// anything is written.
    pub fn set_state(&mut self, time: Time, values: &HashMap<String, Value>) -> RsdResult<()> {
        for ident in values.keys() {
            if !self.values.contains_key(ident) {
                return Err(RsdError::UnknownVariable(ident.clone()));
            }
        }

        for (ident, value) in values {
            self.values.insert(ident.clone(), value.clone());
        }
        self.time = time;
        Ok(())
    }
}
