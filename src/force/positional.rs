//! 1D positional springs toward a per-node target coordinate (spec.md §4.5).

use super::Force;
use crate::accessor::Accessor;
use crate::node::Node;
use crate::rng::Lcg;

/// Which axis a [`Positional`] force pulls nodes along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Shared implementation behind [`ForceX`] and [`ForceY`]: on each tick,
/// `v += (target - pos) * strength * alpha`.
#[derive(Clone)]
struct Positional {
    axis: Axis,
    target: Accessor<f64>,
    strength: Accessor<f64>,
    tz: Vec<f64>,
    sz: Vec<f64>,
}

impl Positional {
    fn new(axis: Axis, target: Accessor<f64>) -> Self {
        Self {
            axis,
            target,
            strength: Accessor::Constant(0.1),
            tz: Vec::new(),
            sz: Vec::new(),
        }
    }
}

impl Force for Positional {
    fn initialize(&mut self, nodes: &[Node], _random: &mut Lcg) {
        self.tz = self.target.resolve(nodes);
        self.sz = self.strength.resolve(nodes);
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64, _random: &mut Lcg) {
        for node in nodes.iter_mut() {
            let i = node.index;
            match self.axis {
                Axis::X => node.vx += (self.tz[i] - node.x) * self.sz[i] * alpha,
                Axis::Y => node.vy += (self.tz[i] - node.y) * self.sz[i] * alpha,
            }
        }
    }
}

macro_rules! positional_force {
    ($name:ident, $axis:expr) => {
        #[doc = concat!("Pulls each node toward a per-node target along the ", stringify!($axis), " axis.")]
        #[derive(Clone)]
        pub struct $name(Positional);

        impl $name {
            /// `target` is the per-node coordinate to pull toward (default accessor
            /// strength is `0.1` for every node, matching the upstream default).
            pub fn new(target: impl Into<Accessor<f64>>) -> Self {
                Self(Positional::new($axis, target.into()))
            }

            pub fn with_strength(mut self, strength: impl Into<Accessor<f64>>) -> Self {
                self.0.strength = strength.into();
                self
            }
        }

        impl Force for $name {
            fn initialize(&mut self, nodes: &[Node], random: &mut Lcg) {
                self.0.initialize(nodes, random);
            }

            fn apply(&mut self, nodes: &mut [Node], alpha: f64, random: &mut Lcg) {
                self.0.apply(nodes, alpha, random);
            }
        }
    };
}

positional_force!(ForceX, Axis::X);
positional_force!(ForceY, Axis::Y);
