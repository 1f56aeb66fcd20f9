//! The simulation driver: alpha annealing, tick integration, fixed-node
//! handling, phyllotaxis seeding, `find()`, and event dispatch (spec.md
//! §4.10).

use crate::error::{Result, SimulationError};
use crate::events::{Dispatcher, EventType, Listener};
use crate::force::Force;
use crate::node::Node;
use crate::registry::ForceRegistry;
use crate::rng::Lcg;
use tracing::debug;

const INITIAL_RADIUS: f64 = 10.0;

fn initial_angle() -> f64 {
    std::f64::consts::PI * (3.0 - 5.0_f64.sqrt())
}

/// Owns the node array and the registered forces, and drives ticks.
///
/// Mirrors the teacher's settings-struct-plus-builder shape: defaults match
/// the upstream algorithm (`alpha = 1`, `alphaMin = 0.001`, `alphaDecay ≈
/// 0.0228`, `alphaTarget = 0`, user-facing `velocityDecay = 0.4` stored
/// internally as `1 - 0.4 = 0.6`).
pub struct Simulation {
    nodes: Vec<Node>,
    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    /// Stored as `1 - user_value`, per spec.md §9.
    velocity_decay: f64,
    random: Lcg,
    forces: ForceRegistry,
    dispatcher: Dispatcher,
    /// Stand-in for the out-of-scope animation-frame timer (spec.md §6): a
    /// fresh simulation starts `running`; `stop()`/`restart()` toggle it.
    /// Nothing polls this on its own — callers drive `step()` themselves,
    /// which is the "manual-drive mode used by tests" the spec describes.
    running: bool,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            alpha: 1.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.6,
            random: Lcg::new(),
            forces: ForceRegistry::new(),
            dispatcher: Dispatcher::new(),
            running: true,
        }
    }

    /// Builder-style convenience: `Simulation::new().with_nodes(nodes)?`.
    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Result<Self> {
        self.set_nodes(nodes)?;
        Ok(self)
    }

    /// Store the node array (no copy kept elsewhere), assign indices,
    /// seed missing positions via phyllotaxis, zero missing velocities,
    /// and re-initialize every registered force against the new array.
    ///
    /// The phyllotaxis branch matches the upstream algorithm's exact
    /// shape, including the asymmetry spec.md §9's Open Question flags: a
    /// node with only `fx` set (not `fy`) still has its `x` overwritten by
    /// phyllotaxis seeding, because the NaN check is `x.is_nan() ||
    /// y.is_nan()` as a single combined condition rather than per-axis. See
    /// `DESIGN.md` for why this crate preserves that behavior rather than
    /// "fixing" it.
    pub fn set_nodes(&mut self, mut nodes: Vec<Node>) -> Result<&mut Self> {
        for (i, node) in nodes.iter_mut().enumerate() {
            node.index = i;
            if let Some(fx) = node.fx {
                node.x = fx;
            }
            if let Some(fy) = node.fy {
                node.y = fy;
            }
            if node.x.is_nan() || node.y.is_nan() {
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * initial_angle();
                node.x = radius * angle.cos();
                node.y = radius * angle.sin();
            }
            if node.vx.is_nan() || node.vy.is_nan() {
                node.vx = 0.0;
                node.vy = 0.0;
            }
        }
        self.nodes = nodes;
        self.initialize_forces()?;
        Ok(self)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    fn initialize_forces(&mut self) -> Result<()> {
        debug!(node_count = self.nodes.len(), "re-initializing forces");
        let nodes = &self.nodes;
        let random = &mut self.random;
        for force in self.forces.iter_mut() {
            force.initialize(nodes, random);
        }
        self.forces.validate()
    }

    /// Register (or replace) a force under `name`, initializing it
    /// immediately against the current node array. Fails loudly (spec.md
    /// §7) if initialization surfaces an error, e.g. `link`'s unresolved
    /// endpoint id — on error the force is not registered, rather than
    /// leaving a half-initialized force silently in the tick loop.
    pub fn set_force<F: Force + 'static>(&mut self, name: &str, mut force: F) -> Result<&mut Self> {
        debug!(name, "registering force");
        force.initialize(&self.nodes, &mut self.random);
        force.validate()?;
        self.forces.set(name, Box::new(force));
        Ok(self)
    }

    /// Builder-style convenience for construction-time chaining.
    pub fn with_force<F: Force + 'static>(mut self, name: &str, force: F) -> Result<Self> {
        self.set_force(name, force)?;
        Ok(self)
    }

    pub fn remove_force(&mut self, name: &str) -> &mut Self {
        self.forces.remove(name);
        self
    }

    pub fn force(&self, name: &str) -> Option<&dyn Force> {
        self.forces.get(name)
    }

    pub fn force_mut(&mut self, name: &str) -> Option<&mut Box<dyn Force>> {
        self.forces.get_mut(name)
    }

    /// Run `iterations` ticks. Each tick: anneal alpha, apply every
    /// registered force in insertion order, then integrate velocity into
    /// position (snapping fixed nodes back and zeroing their velocity).
    /// Does not emit events — `spec.md §4.10` reserves that for `step()`.
    pub fn tick_n(&mut self, iterations: usize) -> &mut Self {
        for _ in 0..iterations {
            self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
            let alpha = self.alpha;
            let nodes = &mut self.nodes;
            let random = &mut self.random;
            for force in self.forces.iter_mut() {
                force.apply(nodes, alpha, random);
            }
            for node in self.nodes.iter_mut() {
                match node.fx {
                    Some(fx) => {
                        node.x = fx;
                        node.vx = 0.0;
                    }
                    None => {
                        node.vx *= self.velocity_decay;
                        node.x += node.vx;
                    }
                }
                match node.fy {
                    Some(fy) => {
                        node.y = fy;
                        node.vy = 0.0;
                    }
                    None => {
                        node.vy *= self.velocity_decay;
                        node.y += node.vy;
                    }
                }
            }
        }
        self
    }

    /// `tick(1)`.
    pub fn tick(&mut self) -> &mut Self {
        self.tick_n(1)
    }

    /// One driven step: a single tick, a `tick` event, and — once alpha has
    /// decayed past `alphaMin` — an `end` event and an implicit `stop()`.
    pub fn step(&mut self) -> &mut Self {
        self.tick_n(1);
        self.dispatcher.call(EventType::Tick);
        if self.alpha < self.alpha_min {
            self.running = false;
            self.dispatcher.call(EventType::End);
        }
        self
    }

    pub fn restart(&mut self) -> &mut Self {
        self.running = true;
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.running = false;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Closest node to `(x, y)` by squared Euclidean distance, optionally
    /// bounded to strictly less than `radius` (matching the upstream
    /// algorithm's exclusive bound). `None` if no node qualifies (spec.md's
    /// `undefined` sentinel).
    pub fn find(&self, x: f64, y: f64, radius: Option<f64>) -> Option<&Node> {
        let max_d2 = radius.map(|r| r * r).unwrap_or(f64::INFINITY);
        let mut best: Option<(usize, f64)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            let dx = node.x - x;
            let dy = node.y - y;
            let d2 = dx * dx + dy * dy;
            if d2 < max_d2 && best.map_or(true, |(_, best_d2)| d2 < best_d2) {
                best = Some((i, d2));
            }
        }
        best.map(|(i, _)| &self.nodes[i])
    }

    pub fn random_source(&self) -> &Lcg {
        &self.random
    }

    pub fn set_random_source(&mut self, random: Lcg) -> &mut Self {
        self.random = random;
        self
    }

    pub fn on(&mut self, typenames: &str, listener: Listener) -> &mut Self {
        self.dispatcher.on(typenames, listener);
        self
    }

    pub fn off(&mut self, typenames: &str) -> &mut Self {
        self.dispatcher.off(typenames);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) -> Result<&mut Self> {
        validate_unit("alpha", alpha)?;
        self.alpha = alpha;
        Ok(self)
    }

    pub fn alpha_min(&self) -> f64 {
        self.alpha_min
    }

    pub fn set_alpha_min(&mut self, alpha_min: f64) -> Result<&mut Self> {
        validate_unit("alphaMin", alpha_min)?;
        self.alpha_min = alpha_min;
        Ok(self)
    }

    pub fn alpha_decay(&self) -> f64 {
        self.alpha_decay
    }

    pub fn set_alpha_decay(&mut self, alpha_decay: f64) -> Result<&mut Self> {
        validate_unit("alphaDecay", alpha_decay)?;
        self.alpha_decay = alpha_decay;
        Ok(self)
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, alpha_target: f64) -> Result<&mut Self> {
        validate_unit("alphaTarget", alpha_target)?;
        self.alpha_target = alpha_target;
        Ok(self)
    }

    /// User-facing velocity decay (default 0.4); stored internally as
    /// `1 - value`.
    pub fn velocity_decay(&self) -> f64 {
        1.0 - self.velocity_decay
    }

    pub fn set_velocity_decay(&mut self, velocity_decay: f64) -> Result<&mut Self> {
        validate_unit("velocityDecay", velocity_decay)?;
        self.velocity_decay = 1.0 - velocity_decay;
        Ok(self)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_unit(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::OutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::ForceCenter;

    #[test]
    fn set_nodes_assigns_indices_and_phyllotaxis_positions() {
        let mut sim = Simulation::new();
        sim.stop();
        sim.set_nodes(vec![Node::default(), Node::default(), Node::default()]).unwrap();
        let nodes = sim.nodes();
        assert_eq!(nodes[0].index, 0);
        assert_eq!(nodes[1].index, 1);
        assert_eq!(nodes[2].index, 2);
        assert!((nodes[0].x - 7.0710678118654755).abs() < 1e-12);
        assert_eq!(nodes[0].y, 0.0);
        assert!((nodes[1].x - (-9.03088751750192)).abs() < 1e-9);
        assert!((nodes[1].y - 8.27303273571596).abs() < 1e-9);
        for n in nodes {
            assert_eq!(n.vx, 0.0);
            assert_eq!(n.vy, 0.0);
        }
    }

    #[test]
    fn fixed_node_stays_put_through_centering() {
        let mut sim = Simulation::new();
        sim.stop();
        sim.set_nodes(vec![Node::fixed(0.0, 0.0), Node::new(100.0, 0.0)]).unwrap();
        sim.set_force("center", ForceCenter::new(50.0, 50.0)).unwrap();
        for _ in 0..10 {
            sim.tick();
        }
        assert_eq!(sim.nodes()[0].x, 0.0);
        assert_eq!(sim.nodes()[0].y, 0.0);
        assert_eq!(sim.nodes()[0].vx, 0.0);
        assert_eq!(sim.nodes()[0].vy, 0.0);
    }

    #[test]
    fn tick_n_equals_tick_applied_n_times() {
        let mut a = Simulation::new();
        a.stop();
        a.set_nodes(vec![Node::new(100.0, 0.0), Node::new(200.0, 0.0)]).unwrap();
        a.set_force("center", ForceCenter::new(0.0, 0.0)).unwrap();

        let mut b = Simulation::new();
        b.stop();
        b.set_nodes(vec![Node::new(100.0, 0.0), Node::new(200.0, 0.0)]).unwrap();
        b.set_force("center", ForceCenter::new(0.0, 0.0)).unwrap();

        a.tick_n(5);
        for _ in 0..5 {
            b.tick();
        }
        for (na, nb) in a.nodes().iter().zip(b.nodes().iter()) {
            assert_eq!(na.x, nb.x);
            assert_eq!(na.y, nb.y);
        }
    }

    #[test]
    fn out_of_range_alpha_is_rejected() {
        let mut sim = Simulation::new();
        assert!(sim.set_alpha(1.5).is_err());
        assert!(sim.set_alpha(0.5).is_ok());
    }

    #[test]
    fn find_returns_nearest_within_radius() {
        let mut sim = Simulation::new();
        sim.stop();
        sim.set_nodes(vec![Node::new(5.0, 0.0), Node::new(10.0, 16.0), Node::new(-10.0, -4.0)]).unwrap();
        assert_eq!(sim.find(0.0, 0.0, None).unwrap().index, 0);
        assert!(sim.find(0.0, 0.0, Some(1.0)).is_none());
        assert_eq!(sim.find(0.0, 20.0, None).unwrap().index, 1);
    }

    #[test]
    fn restart_and_stop_toggle_running_flag() {
        let mut sim = Simulation::new();
        assert!(sim.is_running());
        sim.stop();
        assert!(!sim.is_running());
        sim.restart();
        assert!(sim.is_running());
    }

    #[test]
    fn step_emits_end_once_alpha_decays_below_min() {
        let mut sim = Simulation::new();
        sim.stop();
        sim.set_nodes(vec![Node::new(0.0, 0.0)]).unwrap();
        sim.set_alpha(0.0005).unwrap();
        sim.step();
        assert!(!sim.is_running());
    }
}
