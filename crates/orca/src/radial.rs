use crate::accessor::Accessor;
use crate::error::Result;
use crate::{Force, Node, RandomSource};

/// Attracts each node towards a circle of per-node radius around a fixed
/// center.
#[derive(Debug)]
pub struct RadialForce {
    radius: Accessor<Node>,
    x: f64,
    y: f64,
    strength: Accessor<Node>,
    radii: Vec<f64>,
    strengths: Vec<f64>,
}

impl RadialForce {
    pub fn new(radius: f64) -> Self {
        Self {
            radius: Accessor::Constant(radius),
            x: 0.0,
            y: 0.0,
            strength: Accessor::Constant(0.1),
            radii: Vec::new(),
            strengths: Vec::new(),
        }
    }

    pub fn radius(&self) -> &Accessor<Node> {
        &self.radius
    }

    pub fn set_radius(&mut self, radius: f64) -> &mut Self {
        self.radius = Accessor::Constant(radius);
        self
    }

    pub fn set_radius_fn(
        &mut self,
        f: impl Fn(&Node, usize, &[Node]) -> f64 + 'static,
    ) -> &mut Self {
        self.radius = Accessor::per_element(f);
        self
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn set_x(&mut self, x: f64) -> &mut Self {
        self.x = x;
        self
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_y(&mut self, y: f64) -> &mut Self {
        self.y = y;
        self
    }

    pub fn strength(&self) -> &Accessor<Node> {
        &self.strength
    }

    pub fn set_strength(&mut self, strength: f64) -> &mut Self {
        self.strength = Accessor::Constant(strength);
        self
    }

    pub fn set_strength_fn(
        &mut self,
        f: impl Fn(&Node, usize, &[Node]) -> f64 + 'static,
    ) -> &mut Self {
        self.strength = Accessor::per_element(f);
        self
    }
}

impl Force for RadialForce {
    fn initialize(&mut self, nodes: &[Node]) -> Result<()> {
        self.radii = self.radius.materialize(nodes);
        self.strengths = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                if self.radii[i].is_nan() {
                    0.0
                } else {
                    self.strength.get(node, i, nodes)
                }
            })
            .collect();
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64, _random: &mut RandomSource) {
        for (i, node) in nodes.iter_mut().enumerate() {
            let dx = node.x - self.x;
            let dy = node.y - self.y;
            let r = (dx * dx + dy * dy).sqrt();
            // A node exactly at the center has no defined outward direction.
            if r == 0.0 {
                continue;
            }
            let k = (self.radii[i] - r) * self.strengths[i] * alpha / r;
            node.vx += dx * k;
            node.vy += dy * k;
        }
    }
}
