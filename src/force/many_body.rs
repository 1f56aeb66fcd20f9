//! Barnes–Hut n-body attraction/repulsion (spec.md §4.9).

use super::Force;
use crate::accessor::Accessor;
use crate::node::Node;
use crate::quadtree::Quadtree;
use crate::rng::Lcg;

/// Treats every node as a charge that attracts (positive strength) or
/// repels (negative strength, the default) every other node, approximating
/// distant clusters as a single aggregate charge once a quadtree cell is
/// far enough away relative to its width (the `theta` criterion).
#[derive(Clone)]
pub struct ForceManyBody {
    strength: Accessor<f64>,
    theta2: f64,
    distance_min2: f64,
    distance_max2: f64,
    strengths: Vec<f64>,
}

impl ForceManyBody {
    pub fn new() -> Self {
        Self {
            strength: Accessor::Constant(-30.0),
            theta2: 0.81,
            distance_min2: 1.0,
            distance_max2: f64::INFINITY,
            strengths: Vec::new(),
        }
    }

    pub fn with_strength(mut self, strength: impl Into<Accessor<f64>>) -> Self {
        self.strength = strength.into();
        self
    }

    /// User-facing theta (default 0.9); stored internally as `theta^2`.
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta2 = theta * theta;
        self
    }

    pub fn with_distance_min(mut self, distance_min: f64) -> Self {
        self.distance_min2 = distance_min * distance_min;
        self
    }

    pub fn with_distance_max(mut self, distance_max: f64) -> Self {
        self.distance_max2 = distance_max * distance_max;
        self
    }
}

impl Default for ForceManyBody {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for ForceManyBody {
    fn initialize(&mut self, nodes: &[Node], _random: &mut Lcg) {
        self.strengths = self.strength.resolve(nodes);
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64, random: &mut Lcg) {
        let n = nodes.len();
        if n == 0 {
            return;
        }

        let xs: Vec<f64> = nodes.iter().map(|n| n.x).collect();
        let ys: Vec<f64> = nodes.iter().map(|n| n.y).collect();
        let tree = Quadtree::build(&xs, &ys, 0..n);

        // Post-order: each cell's (signed strength sum, |strength|-weighted
        // centroid x, y).
        let mut agg = vec![(0.0_f64, 0.0_f64, 0.0_f64); tree.cell_count()];
        tree.visit_after(|id, points, _bounds, children| {
            let (value, cx, cy) = if let Some(points) = points {
                let mut strength = 0.0;
                for &p in points {
                    strength += self.strengths[p];
                }
                (strength, xs[points[0]], ys[points[0]])
            } else {
                let (mut strength, mut weight, mut x, mut y) = (0.0, 0.0, 0.0, 0.0);
                for c in children {
                    let (s, cx, cy) = agg[c.0];
                    let w = s.abs();
                    if w > 0.0 {
                        strength += s;
                        weight += w;
                        x += w * cx;
                        y += w * cy;
                    }
                }
                if weight > 0.0 {
                    (strength, x / weight, y / weight)
                } else {
                    (strength, 0.0, 0.0)
                }
            };
            agg[id.0] = (value, cx, cy);
        });

        for i in 0..n {
            let xi = nodes[i].x;
            let yi = nodes[i].y;
            let mut vx_delta = 0.0;
            let mut vy_delta = 0.0;

            tree.visit(|id, points, bounds| {
                let (value, cx, cy) = agg[id.0];
                if value == 0.0 {
                    return true;
                }

                let mut dx = cx - xi;
                let mut dy = cy - yi;
                let w = bounds.x1 - bounds.x0;
                let mut l = dx * dx + dy * dy;

                if w * w / self.theta2 < l {
                    if l < self.distance_max2 {
                        if dx == 0.0 {
                            dx = random.jiggle();
                            l += dx * dx;
                        }
                        if dy == 0.0 {
                            dy = random.jiggle();
                            l += dy * dy;
                        }
                        if l < self.distance_min2 {
                            l = (self.distance_min2 * l).sqrt();
                        }
                        vx_delta += dx * value * alpha / l;
                        vy_delta += dy * value * alpha / l;
                    }
                    return true;
                }

                if points.is_none() || l >= self.distance_max2 {
                    // Either the cell is too close to approximate (recurse
                    // into its children) or too far to matter (nothing to
                    // add) — either way, don't prune a leaf and don't skip
                    // an internal cell's descent.
                    return false;
                }

                let points = points.unwrap();
                let is_self_only = points.len() == 1 && points[0] == i;
                if !is_self_only {
                    if dx == 0.0 {
                        dx = random.jiggle();
                        l += dx * dx;
                    }
                    if dy == 0.0 {
                        dy = random.jiggle();
                        l += dy * dy;
                    }
                    if l < self.distance_min2 {
                        l = (self.distance_min2 * l).sqrt();
                    }
                }
                for &p in points {
                    if p == i {
                        continue;
                    }
                    let k = self.strengths[p] * alpha / l;
                    vx_delta += dx * k;
                    vy_delta += dy * k;
                }
                false
            });

            nodes[i].vx += vx_delta;
            nodes[i].vy += vy_delta;
        }
    }
}
