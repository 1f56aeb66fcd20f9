//! Error types for the simulation driver.

use thiserror::Error;

/// Errors that can occur while configuring or running a [`crate::Simulation`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// An alpha-family scalar (`alpha`, `alphaMin`, `alphaDecay`, `alphaTarget`)
    /// was set outside of `[0, 1]`.
    #[error("{field} must be in [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// A link's `source` or `target` id did not resolve to any node.
    #[error("link {link_index} references unknown node id {id:?}")]
    UnresolvedLink { link_index: usize, id: String },
}

/// Result alias used throughout the crate's fallible public API.
pub type Result<T> = std::result::Result<T, SimulationError>;
