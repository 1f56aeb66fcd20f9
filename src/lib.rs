//! A deterministic 2D force-directed layout engine.
//!
//! Computes stable spatial positions for a collection of nodes by
//! iteratively applying a composable set of forces — centering, positional
//! springs, collision resolution, links, and Barnes–Hut many-body
//! attraction/repulsion — under an annealing temperature schedule. This is
//! the computational core behind graph-drawing and clustering-visualization
//! tools; it does no rendering, persistence, or I/O of its own.
//!
//! ```
//! use force_layout::{Node, Simulation, force::ForceManyBody, force::ForceCenter};
//!
//! let mut sim = Simulation::new();
//! sim.stop(); // drive manually instead of via the timer stand-in
//! sim.set_nodes(vec![Node::new(0.0, 0.0), Node::new(10.0, 0.0)]).unwrap();
//! sim.set_force("charge", ForceManyBody::new()).unwrap();
//! sim.set_force("center", ForceCenter::new(0.0, 0.0)).unwrap();
//! sim.tick();
//! ```

pub mod accessor;
pub mod error;
pub mod events;
pub mod force;
pub mod node;
pub mod quadtree;
pub mod registry;
pub mod rng;
pub mod simulation;

pub use accessor::Accessor;
pub use error::{Result, SimulationError};
pub use events::{Dispatcher, EventType, Listener};
pub use node::Node;
pub use quadtree::{Bounds, CellId, Quadtree};
pub use rng::Lcg;
pub use simulation::Simulation;
