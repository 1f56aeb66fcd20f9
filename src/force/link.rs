//! Spring force between paired nodes (spec.md §4.8).

use super::Force;
use crate::accessor::AccessorFn;
use crate::error::SimulationError;
use crate::node::Node;
use crate::rng::Lcg;
use std::collections::HashMap;
use std::sync::Arc;

/// An endpoint reference before (or after) resolution: either a node's
/// `index`, or an id produced by the link force's `id` accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    Index(usize),
    Id(String),
}

impl From<usize> for Endpoint {
    fn from(i: usize) -> Self {
        Endpoint::Index(i)
    }
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        Endpoint::Id(s.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(s: String) -> Self {
        Endpoint::Id(s)
    }
}

/// One spring, referencing its endpoints before resolution and caching the
/// resolved node indices after `initialize` runs.
#[derive(Debug, Clone)]
pub struct Link {
    pub source: Endpoint,
    pub target: Endpoint,
    pub(crate) index: usize,
    pub(crate) source_index: Option<usize>,
    pub(crate) target_index: Option<usize>,
}

impl Link {
    pub fn new(source: impl Into<Endpoint>, target: impl Into<Endpoint>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            index: 0,
            source_index: None,
            target_index: None,
        }
    }
}

/// A per-link function: given the link, its index, and the full link slice
/// it belongs to, produce a value. The node-shaped [`crate::accessor::Accessor`]
/// can't be reused here — `distance`/`strength` vary per *link*, not per
/// node — so this is link's own instance of the same constant-or-function
/// protocol (spec.md §4.3), resolved once at `initialize` time exactly like
/// every other accessor in this crate.
pub type LinkAccessorFn<T> = Arc<dyn Fn(&Link, usize, &[Link]) -> T + Send + Sync>;

#[derive(Clone)]
pub enum LinkAccessor<T> {
    Constant(T),
    PerLink(LinkAccessorFn<T>),
}

impl<T: Copy> LinkAccessor<T> {
    fn resolve(&self, links: &[Link]) -> Vec<T> {
        match self {
            LinkAccessor::Constant(v) => vec![*v; links.len()],
            LinkAccessor::PerLink(f) => links.iter().enumerate().map(|(i, l)| f(l, i, links)).collect(),
        }
    }
}

impl<T: Copy> From<T> for LinkAccessor<T> {
    fn from(value: T) -> Self {
        LinkAccessor::Constant(value)
    }
}

/// Spring force connecting pairs of nodes along [`Link`]s, with strength
/// weighted by each endpoint's link degree ("bias").
pub struct ForceLink {
    links: Vec<Link>,
    id: Option<AccessorFn<String>>,
    distance: LinkAccessor<f64>,
    strength: Option<LinkAccessor<f64>>,
    iterations: u32,
    distances: Vec<f64>,
    strengths: Vec<f64>,
    bias: Vec<f64>,
    last_error: Option<SimulationError>,
}

impl ForceLink {
    pub fn new(links: Vec<Link>) -> Self {
        Self {
            links,
            id: None,
            distance: LinkAccessor::Constant(30.0),
            strength: None,
            iterations: 1,
            distances: Vec::new(),
            strengths: Vec::new(),
            bias: Vec::new(),
            last_error: None,
        }
    }

    /// Override the default `id` accessor (`node.index`) used to resolve
    /// [`Endpoint::Id`] references.
    pub fn with_id(mut self, id: impl Fn(&Node, usize, &[Node]) -> String + Send + Sync + 'static) -> Self {
        self.id = Some(Arc::new(id));
        self
    }

    pub fn with_distance(mut self, distance: impl Into<LinkAccessor<f64>>) -> Self {
        self.distance = distance.into();
        self
    }

    /// Override the default strength (`1 / min(count(source), count(target))`).
    pub fn with_strength(mut self, strength: impl Into<LinkAccessor<f64>>) -> Self {
        self.strength = Some(strength.into());
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Resolve every link's endpoints against the current node array,
    /// returning an error identifying the first link whose id does not
    /// resolve to any node.
    fn resolve_endpoints(&mut self, nodes: &[Node]) -> Result<(), SimulationError> {
        let by_id: HashMap<String, usize> = if let Some(id_fn) = &self.id {
            nodes
                .iter()
                .map(|n| (id_fn(n, n.index, nodes), n.index))
                .collect()
        } else {
            HashMap::new()
        };

        for (i, link) in self.links.iter_mut().enumerate() {
            link.index = i;
            link.source_index = Some(Self::resolve_one(&link.source, nodes, &by_id, self.id.is_some(), i)?);
            link.target_index = Some(Self::resolve_one(&link.target, nodes, &by_id, self.id.is_some(), i)?);
        }
        Ok(())
    }

    fn resolve_one(
        endpoint: &Endpoint,
        nodes: &[Node],
        by_id: &HashMap<String, usize>,
        has_custom_id: bool,
        link_index: usize,
    ) -> Result<usize, SimulationError> {
        match endpoint {
            Endpoint::Index(i) => {
                if *i < nodes.len() {
                    Ok(*i)
                } else {
                    Err(SimulationError::UnresolvedLink { link_index, id: i.to_string() })
                }
            }
            Endpoint::Id(id) => {
                if has_custom_id {
                    by_id
                        .get(id)
                        .copied()
                        .ok_or_else(|| SimulationError::UnresolvedLink { link_index, id: id.clone() })
                } else {
                    // Default id accessor is `node.index`, as a string.
                    id.parse::<usize>()
                        .ok()
                        .filter(|i| *i < nodes.len())
                        .ok_or_else(|| SimulationError::UnresolvedLink { link_index, id: id.clone() })
                }
            }
        }
    }

    fn compute_bias_and_defaults(&mut self) {
        let n = self.links.len();
        let mut count: HashMap<usize, u32> = HashMap::new();
        for link in &self.links {
            *count.entry(link.source_index.unwrap()).or_insert(0) += 1;
            *count.entry(link.target_index.unwrap()).or_insert(0) += 1;
        }

        self.bias = vec![0.0; n];
        self.distances = self.distance.resolve(&self.links);

        for (i, link) in self.links.iter().enumerate() {
            let cs = *count.get(&link.source_index.unwrap()).unwrap_or(&1) as f64;
            let ct = *count.get(&link.target_index.unwrap()).unwrap_or(&1) as f64;
            self.bias[i] = cs / (cs + ct);
        }

        self.strengths = match &self.strength {
            Some(acc) => acc.resolve(&self.links),
            None => (0..n)
                .map(|i| {
                    let link = &self.links[i];
                    let cs = *count.get(&link.source_index.unwrap()).unwrap_or(&1) as f64;
                    let ct = *count.get(&link.target_index.unwrap()).unwrap_or(&1) as f64;
                    1.0 / cs.min(ct)
                })
                .collect(),
        };
    }
}

impl Force for ForceLink {
    fn initialize(&mut self, nodes: &[Node], _random: &mut Lcg) {
        match self.resolve_endpoints(nodes) {
            Ok(()) => {
                self.last_error = None;
                self.compute_bias_and_defaults();
            }
            Err(e) => {
                // `initialize` can't return `Result` without changing the
                // `Force` trait's signature for every other force, so the
                // error is latched here and surfaced through `validate()`,
                // which `Simulation::set_nodes`/`set_force` check right
                // after initializing every force (spec.md §7: link
                // resolution failures fail loudly, not silently).
                self.last_error = Some(e);
            }
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        match &self.last_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64, random: &mut Lcg) {
        for _ in 0..self.iterations {
            for (i, link) in self.links.iter().enumerate() {
                let (Some(si), Some(ti)) = (link.source_index, link.target_index) else {
                    continue;
                };
                if si == ti {
                    continue;
                }

                let (mut x, mut y) = {
                    let source = &nodes[si];
                    let target = &nodes[ti];
                    (
                        target.x + target.vx - source.x - source.vx,
                        target.y + target.vy - source.y - source.vy,
                    )
                };
                if x == 0.0 {
                    x = random.jiggle();
                }
                if y == 0.0 {
                    y = random.jiggle();
                }

                let l = (x * x + y * y).sqrt();
                let l = (l - self.distances[i]) / l * alpha * self.strengths[i];
                x *= l;
                y *= l;

                let b = self.bias[i];
                nodes[ti].vx -= x * b;
                nodes[ti].vy -= y * b;
                nodes[si].vx += x * (1.0 - b);
                nodes[si].vy += y * (1.0 - b);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(x: f64, y: f64) -> Node {
        Node { index: 0, x, y, vx: 0.0, vy: 0.0, fx: None, fy: None }
    }

    #[test]
    fn pulls_linked_nodes_together() {
        let mut nodes = vec![node(0.0, 0.0), node(100.0, 0.0)];
        for (i, n) in nodes.iter_mut().enumerate() {
            n.index = i;
        }
        let mut force = ForceLink::new(vec![Link::new(0usize, 1usize)]).with_distance(30.0);
        let mut rng = Lcg::new();
        force.initialize(&nodes, &mut rng);
        force.apply(&mut nodes, 1.0, &mut rng);
        assert!(nodes[0].vx > 0.0);
        assert!(nodes[1].vx < 0.0);
    }

    #[test]
    fn unresolved_index_errors() {
        let nodes = vec![node(0.0, 0.0)];
        let mut force = ForceLink::new(vec![Link::new(0usize, 5usize)]);
        let err = force.resolve_endpoints(&nodes);
        assert!(err.is_err());
    }

    #[test]
    fn default_strength_uses_degree() {
        // source has degree 2, target has degree 1: strength = 1/min(2,1) = 1
        let mut nodes = vec![node(0.0, 0.0), node(10.0, 0.0), node(20.0, 0.0)];
        for (i, n) in nodes.iter_mut().enumerate() {
            n.index = i;
        }
        let links = vec![Link::new(0usize, 1usize), Link::new(0usize, 2usize)];
        let mut force = ForceLink::new(links);
        let mut rng = Lcg::new();
        force.initialize(&nodes, &mut rng);
        assert_eq!(force.strengths[0], 1.0 / 1.0_f64.min(2.0));
    }

    #[test]
    fn per_link_distance_accessor_varies_by_link_index() {
        let mut nodes = vec![node(0.0, 0.0), node(10.0, 0.0), node(0.0, 0.0), node(10.0, 0.0)];
        for (i, n) in nodes.iter_mut().enumerate() {
            n.index = i;
        }
        let links = vec![Link::new(0usize, 1usize), Link::new(2usize, 3usize)];
        let mut force = ForceLink::new(links).with_distance(LinkAccessor::PerLink(Arc::new(
            |_link: &Link, index: usize, _links: &[Link]| if index == 0 { 5.0 } else { 50.0 },
        )));
        let mut rng = Lcg::new();
        force.initialize(&nodes, &mut rng);
        assert_eq!(force.distances, vec![5.0, 50.0]);
    }
}
