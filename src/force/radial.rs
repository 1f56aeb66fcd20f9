//! Radial positional spring (spec.md §4.6).

use super::Force;
use crate::accessor::Accessor;
use crate::node::Node;
use crate::rng::Lcg;

/// Pulls each node toward a circle of a given (per-node) radius centered at
/// `(x, y)`.
#[derive(Clone)]
pub struct ForceRadial {
    radius: Accessor<f64>,
    strength: Accessor<f64>,
    x: f64,
    y: f64,
    rz: Vec<f64>,
    sz: Vec<f64>,
}

impl ForceRadial {
    pub fn new(radius: impl Into<Accessor<f64>>, x: f64, y: f64) -> Self {
        Self {
            radius: radius.into(),
            strength: Accessor::Constant(0.1),
            x,
            y,
            rz: Vec::new(),
            sz: Vec::new(),
        }
    }

    pub fn with_strength(mut self, strength: impl Into<Accessor<f64>>) -> Self {
        self.strength = strength.into();
        self
    }
}

impl Force for ForceRadial {
    fn initialize(&mut self, nodes: &[Node], _random: &mut Lcg) {
        self.rz = self.radius.resolve(nodes);
        self.sz = self.strength.resolve(nodes);
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64, _random: &mut Lcg) {
        for node in nodes.iter_mut() {
            let i = node.index;
            let dx = node.x - self.x;
            let dy = node.y - self.y;
            let r = (dx * dx + dy * dy).sqrt();
            if r == 0.0 {
                continue;
            }
            let k = (self.rz[i] - r) * self.sz[i] * alpha / r;
            node.vx += dx * k;
            node.vy += dy * k;
        }
    }
}
