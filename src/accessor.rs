//! The "constant or per-element function" parameter protocol shared by every
//! force (spec.md §4.3).
//!
//! Forces never call an [`Accessor`] inside their hot per-tick loop — it is
//! resolved to a dense `Vec<T>`, indexed by node index, once at
//! `initialize()` time. This keeps tick application allocation-free and
//! makes it numerically deterministic: the resolved array cannot change
//! mid-tick even if the caller's closure is impure.

use crate::node::Node;
use std::sync::Arc;

/// A per-element function: given the element, its index, and the full slice
/// it belongs to, produce a value.
pub type AccessorFn<T> = Arc<dyn Fn(&Node, usize, &[Node]) -> T + Send + Sync>;

/// Either a constant, applied to every element, or a function evaluated once
/// per element at initialization time.
#[derive(Clone)]
pub enum Accessor<T> {
    Constant(T),
    PerNode(AccessorFn<T>),
}

impl<T: Copy> Accessor<T> {
    /// Resolve this accessor into a dense array, one entry per node.
    pub fn resolve(&self, nodes: &[Node]) -> Vec<T> {
        match self {
            Accessor::Constant(value) => vec![*value; nodes.len()],
            Accessor::PerNode(f) => nodes.iter().map(|n| f(n, n.index, nodes)).collect(),
        }
    }
}

impl<T> From<T> for Accessor<T>
where
    T: Copy,
{
    fn from(value: T) -> Self {
        Accessor::Constant(value)
    }
}

impl<T> std::fmt::Debug for Accessor<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accessor::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Accessor::PerNode(_) => f.write_str("PerNode(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_at(index: usize, x: f64) -> Node {
        Node {
            index,
            x,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
        }
    }

    #[test]
    fn constant_resolves_to_same_value() {
        let nodes = vec![node_at(0, 1.0), node_at(1, 2.0)];
        let acc: Accessor<f64> = Accessor::Constant(0.5);
        assert_eq!(acc.resolve(&nodes), vec![0.5, 0.5]);
    }

    #[test]
    fn per_node_resolves_once_per_node() {
        let nodes = vec![node_at(0, 10.0), node_at(1, 20.0)];
        let acc: Accessor<f64> = Accessor::PerNode(Arc::new(|n, _, _| n.x * 2.0));
        assert_eq!(acc.resolve(&nodes), vec![20.0, 40.0]);
    }

    #[test]
    fn resolve_sees_full_slice() {
        let nodes = vec![node_at(0, 1.0), node_at(1, 2.0), node_at(2, 3.0)];
        let acc: Accessor<f64> = Accessor::PerNode(Arc::new(|_, i, all| all.len() as f64 - i as f64));
        assert_eq!(acc.resolve(&nodes), vec![3.0, 2.0, 1.0]);
    }
}
