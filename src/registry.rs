//! Insertion-ordered, name-keyed force registry (spec.md §3 "registered-force
//! mapping", §9 "Registered forces").
//!
//! A plain `HashMap` would not preserve registration order, which the driver
//! depends on ("forces execute in their insertion order, deterministically",
//! spec.md §5). The retrieval pack has no `indexmap`-style dependency in use
//! anywhere, so rather than pull one in for a single small map, this keeps a
//! `Vec<(String, Box<dyn Force>)>` and does linear name lookup — the force
//! count in a typical simulation is single digits, so this is not a
//! meaningful cost next to a tick's quadtree builds.

use crate::force::Force;

pub struct ForceRegistry {
    entries: Vec<(String, Box<dyn Force>)>,
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert or replace the force registered under `name`, preserving its
    /// original position if it already existed (so re-registering a force
    /// does not reorder the tick sequence).
    pub fn set(&mut self, name: &str, force: Box<dyn Force>) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = force;
        } else {
            self.entries.push((name.to_string(), force));
        }
    }

    /// Remove the force registered under `name`, if any.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Force> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, f)| f.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Box<dyn Force>> {
        self.entries.iter_mut().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Iterate in insertion order, mutably, for `initialize`/`apply`.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Force>> {
        self.entries.iter_mut().map(|(_, f)| f)
    }

    /// Surface the first error latched by any registered force's most recent
    /// `initialize` call (spec.md §7: link resolution failures fail loudly).
    pub fn validate(&self) -> crate::error::Result<()> {
        for (_, force) in &self.entries {
            force.validate()?;
        }
        Ok(())
    }
}

impl Default for ForceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
