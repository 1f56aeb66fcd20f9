//! The force trait and the six concrete forces.

pub mod center;
pub mod collide;
pub mod link;
pub mod many_body;
pub mod positional;
pub mod radial;

pub use center::ForceCenter;
pub use collide::ForceCollide;
pub use link::{Endpoint, ForceLink, Link, LinkAccessor};
pub use many_body::ForceManyBody;
pub use positional::{ForceX, ForceY};
pub use radial::ForceRadial;

use crate::node::Node;
use crate::rng::Lcg;

/// A force bound into a [`crate::Simulation`] via `Simulation::force`.
///
/// `initialize` runs once whenever the simulation's node array changes (on
/// `set_nodes`, and again whenever the force itself is re-registered) and is
/// where a force resolves its accessors into dense arrays and, for `link`,
/// resolves endpoint ids into node indices. `apply` runs every tick and must
/// not allocate on the happy path.
pub trait Force {
    /// Precompute per-node arrays from the current accessors. The default
    /// no-op is correct for forces with no node-dependent state
    /// ([`ForceCenter`] needs none).
    fn initialize(&mut self, nodes: &[Node], random: &mut Lcg) {
        let _ = (nodes, random);
    }

    /// Apply the force for one tick at temperature `alpha`, mutating node
    /// velocities (and, for `center`, positions directly).
    fn apply(&mut self, nodes: &mut [Node], alpha: f64, random: &mut Lcg);

    /// Surfaces an error latched during the most recent `initialize` call
    /// (e.g. [`link::ForceLink`]'s unresolved endpoint id). The default
    /// no-op is correct for every force that cannot fail at initialization.
    fn validate(&self) -> crate::error::Result<()> {
        Ok(())
    }
}
