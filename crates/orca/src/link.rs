use crate::accessor::Accessor;
use crate::error::{Error, Result};
use crate::jiggle::jiggle;
use crate::{Force, Node, RandomSource};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One endpoint of a [`Link`]: a node index, or an id to be looked up
/// through the link force's id accessor. Initialization resolves every end
/// to `Index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEnd {
    Index(usize),
    Id(String),
}

impl LinkEnd {
    /// The resolved node index; `None` until the link force has resolved
    /// this end.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Id(_) => None,
        }
    }
}

impl From<usize> for LinkEnd {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for LinkEnd {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for LinkEnd {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

/// A spring between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: LinkEnd,
    pub target: LinkEnd,
    /// Position in the link array, assigned at initialization.
    #[serde(default)]
    pub index: usize,
}

impl Link {
    pub fn new(source: impl Into<LinkEnd>, target: impl Into<LinkEnd>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            index: 0,
        }
    }
}

/// Spring force between pairs of linked nodes.
///
/// Each application pushes a link's ends together or apart so their
/// distance approaches the per-link rest distance. The impulse is weighted
/// by a bias derived from the ends' degrees so that heavily connected nodes
/// stay put and leaves do most of the moving; the default strength,
/// `1 / min(degree(source), degree(target))`, keeps dense clusters from
/// being overly energetic.
#[derive(Debug)]
pub struct LinkForce {
    links: Vec<Link>,
    id: Accessor<Node, String>,
    distance: Accessor<Link>,
    strength: Option<Accessor<Link>>,
    iterations: usize,
    count: Vec<usize>,
    bias: Vec<f64>,
    strengths: Vec<f64>,
    distances: Vec<f64>,
}

impl LinkForce {
    pub fn new(links: Vec<Link>) -> Self {
        Self {
            links,
            id: Accessor::per_element(|node: &Node, _, _| node.index.to_string()),
            distance: Accessor::Constant(30.0),
            // None selects the degree-based default once counts are known.
            strength: None,
            iterations: 1,
            count: Vec::new(),
            bias: Vec::new(),
            strengths: Vec::new(),
            distances: Vec::new(),
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn set_links(&mut self, links: Vec<Link>) -> &mut Self {
        self.links = links;
        self
    }

    /// Replaces the node id accessor used to resolve `LinkEnd::Id` ends.
    pub fn set_id_fn(
        &mut self,
        f: impl Fn(&Node, usize, &[Node]) -> String + 'static,
    ) -> &mut Self {
        self.id = Accessor::per_element(f);
        self
    }

    pub fn distance(&self) -> &Accessor<Link> {
        &self.distance
    }

    pub fn set_distance(&mut self, distance: f64) -> &mut Self {
        self.distance = Accessor::Constant(distance);
        self
    }

    pub fn set_distance_fn(
        &mut self,
        f: impl Fn(&Link, usize, &[Link]) -> f64 + 'static,
    ) -> &mut Self {
        self.distance = Accessor::per_element(f);
        self
    }

    pub fn set_strength(&mut self, strength: f64) -> &mut Self {
        self.strength = Some(Accessor::Constant(strength));
        self
    }

    pub fn set_strength_fn(
        &mut self,
        f: impl Fn(&Link, usize, &[Link]) -> f64 + 'static,
    ) -> &mut Self {
        self.strength = Some(Accessor::per_element(f));
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Relaxation sweeps per tick; higher values stiffen the whole lattice.
    pub fn set_iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }

    fn resolve(end: &LinkEnd, node_by_id: &FxHashMap<&str, usize>, n: usize) -> Result<usize> {
        match end {
            LinkEnd::Index(i) if *i < n => Ok(*i),
            LinkEnd::Index(i) => Err(Error::MissingNode { id: i.to_string() }),
            LinkEnd::Id(id) => node_by_id
                .get(id.as_str())
                .copied()
                .ok_or_else(|| Error::MissingNode { id: id.clone() }),
        }
    }
}

impl Force for LinkForce {
    fn initialize(&mut self, nodes: &[Node]) -> Result<()> {
        let n = nodes.len();
        let m = self.links.len();

        let ids = self.id.materialize(nodes);
        let mut node_by_id: FxHashMap<&str, usize> = FxHashMap::default();
        for (i, id) in ids.iter().enumerate() {
            node_by_id.insert(id.as_str(), i);
        }

        self.count = vec![0; n];
        let mut ends: Vec<(usize, usize)> = Vec::with_capacity(m);
        for (i, link) in self.links.iter_mut().enumerate() {
            link.index = i;
            let source = Self::resolve(&link.source, &node_by_id, n)?;
            let target = Self::resolve(&link.target, &node_by_id, n)?;
            link.source = LinkEnd::Index(source);
            link.target = LinkEnd::Index(target);
            self.count[source] += 1;
            self.count[target] += 1;
            ends.push((source, target));
        }

        self.bias = ends
            .iter()
            .map(|&(s, t)| self.count[s] as f64 / (self.count[s] + self.count[t]) as f64)
            .collect();
        self.strengths = match &self.strength {
            Some(accessor) => accessor.materialize(&self.links),
            None => ends
                .iter()
                .map(|&(s, t)| 1.0 / self.count[s].min(self.count[t]) as f64)
                .collect(),
        };
        self.distances = self.distance.materialize(&self.links);
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64, random: &mut RandomSource) {
        for _ in 0..self.iterations {
            for i in 0..self.links.len() {
                let (Some(s), Some(t)) =
                    (self.links[i].source.index(), self.links[i].target.index())
                else {
                    continue;
                };
                let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
                if x == 0.0 {
                    x = jiggle(random);
                }
                let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
                if y == 0.0 {
                    y = jiggle(random);
                }
                let mut l = (x * x + y * y).sqrt();
                l = (l - self.distances[i]) / l * alpha * self.strengths[i];
                x *= l;
                y *= l;
                let b = self.bias[i];
                nodes[t].vx -= x * b;
                nodes[t].vy -= y * b;
                let b = 1.0 - b;
                nodes[s].vx += x * b;
                nodes[s].vy += y * b;
            }
        }
    }
}
