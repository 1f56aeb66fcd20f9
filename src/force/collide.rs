//! Circle-overlap resolution via quadtree (spec.md §4.7).

use super::Force;
use crate::accessor::Accessor;
use crate::node::Node;
use crate::quadtree::{CellId, Quadtree};
use crate::rng::Lcg;

/// Pushes overlapping circles (node position + per-node radius) apart.
#[derive(Clone)]
pub struct ForceCollide {
    radius: Accessor<f64>,
    strength: f64,
    iterations: u32,
    radii: Vec<f64>,
}

impl ForceCollide {
    pub fn new(radius: impl Into<Accessor<f64>>) -> Self {
        Self {
            radius: radius.into(),
            strength: 1.0,
            iterations: 1,
            radii: Vec::new(),
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }
}

impl Default for ForceCollide {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Force for ForceCollide {
    fn initialize(&mut self, nodes: &[Node], _random: &mut Lcg) {
        self.radii = self.radius.resolve(nodes);
    }

    fn apply(&mut self, nodes: &mut [Node], _alpha: f64, random: &mut Lcg) {
        let n = nodes.len();
        if n == 0 {
            return;
        }

        for _ in 0..self.iterations {
            // Build the tree over anticipated next positions. This snapshot
            // only fixes the spatial partition for the sweep — per-pair
            // comparisons below re-read `nodes[j].x + nodes[j].vx` live, so a
            // collision earlier in the sweep is visible to every later pair,
            // matching the upstream algorithm's in-place visit.
            let xi_next: Vec<f64> = nodes.iter().map(|n| n.x + n.vx).collect();
            let yi_next: Vec<f64> = nodes.iter().map(|n| n.y + n.vy).collect();
            let tree = Quadtree::build(&xi_next, &yi_next, 0..n);

            // Post-order pass: max radius present in each cell's subtree.
            let mut max_radius = vec![0.0_f64; tree.cell_count()];
            tree.visit_after(|id, points, _bounds, children| {
                let r = if let Some(points) = points {
                    points.iter().map(|&p| self.radii[p]).fold(0.0, f64::max)
                } else {
                    children.iter().map(|c| max_radius[c.0]).fold(0.0, f64::max)
                };
                max_radius[id.0] = r;
            });

            for i in 0..n {
                let ri = self.radii[i];
                let ri2 = ri * ri;
                let xi = nodes[i].x + nodes[i].vx;
                let yi = nodes[i].y + nodes[i].vy;

                let mut vx_delta = 0.0;
                let mut vy_delta = 0.0;
                // Collected impulses to apply to higher-index nodes, so we
                // don't borrow `nodes` mutably while still walking the tree.
                let mut other_deltas: Vec<(usize, f64, f64)> = Vec::new();

                tree.visit(|id: CellId, points, bounds| {
                    let rj = max_radius[id.0];
                    let r = ri + rj;
                    if let Some(points) = points {
                        for &j in points {
                            if j <= i {
                                continue;
                            }
                            let mut dx = xi - (nodes[j].x + nodes[j].vx);
                            let mut dy = yi - (nodes[j].y + nodes[j].vy);
                            let mut l = dx * dx + dy * dy;
                            let rij = ri + self.radii[j];
                            if l < rij * rij {
                                if dx == 0.0 {
                                    dx = random.jiggle();
                                    l += dx * dx;
                                }
                                if dy == 0.0 {
                                    dy = random.jiggle();
                                    l += dy * dy;
                                }
                                let dist = l.sqrt();
                                let lscaled = (rij - dist) / dist * self.strength;
                                dx *= lscaled;
                                dy *= lscaled;
                                let rj2 = self.radii[j] * self.radii[j];
                                let share_i = rj2 / (ri2 + rj2);
                                vx_delta += dx * share_i;
                                vy_delta += dy * share_i;
                                other_deltas.push((j, -dx * (1.0 - share_i), -dy * (1.0 - share_i)));
                            }
                        }
                        return false;
                    }
                    bounds.x0 > xi + r || bounds.x1 < xi - r || bounds.y0 > yi + r || bounds.y1 < yi - r
                });

                nodes[i].vx += vx_delta;
                nodes[i].vy += vy_delta;
                for (j, dvx, dvy) in other_deltas {
                    nodes[j].vx += dvx;
                    nodes[j].vy += dvy;
                }
            }
        }
    }
}
