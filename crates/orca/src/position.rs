//! 1D positional springs pulling nodes towards per-node target coordinates.

use crate::accessor::Accessor;
use crate::error::Result;
use crate::{Force, Node, RandomSource};

/// Attracts each node towards a target x-coordinate.
#[derive(Debug)]
pub struct XForce {
    x: Accessor<Node>,
    strength: Accessor<Node>,
    xz: Vec<f64>,
    strengths: Vec<f64>,
}

impl XForce {
    pub fn new() -> Self {
        Self {
            x: Accessor::Constant(0.0),
            strength: Accessor::Constant(0.1),
            xz: Vec::new(),
            strengths: Vec::new(),
        }
    }

    pub fn at(x: f64) -> Self {
        Self {
            x: Accessor::Constant(x),
            ..Self::new()
        }
    }

    pub fn x(&self) -> &Accessor<Node> {
        &self.x
    }

    pub fn set_x(&mut self, x: f64) -> &mut Self {
        self.x = Accessor::Constant(x);
        self
    }

    pub fn set_x_fn(&mut self, f: impl Fn(&Node, usize, &[Node]) -> f64 + 'static) -> &mut Self {
        self.x = Accessor::per_element(f);
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

impl Default for XForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for XForce {
    fn initialize(&mut self, nodes: &[Node]) -> Result<()> {
        self.xz = self.x.materialize(nodes);
        self.strengths = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                // A NaN target disables the pull on that node.
                if self.xz[i].is_nan() {
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
            node.vx += (self.xz[i] - node.x) * self.strengths[i] * alpha;
        }
    }
}

/// Attracts each node towards a target y-coordinate.
#[derive(Debug)]
pub struct YForce {
    y: Accessor<Node>,
    strength: Accessor<Node>,
    yz: Vec<f64>,
    strengths: Vec<f64>,
}

impl YForce {
    pub fn new() -> Self {
        Self {
            y: Accessor::Constant(0.0),
            strength: Accessor::Constant(0.1),
            yz: Vec::new(),
            strengths: Vec::new(),
        }
    }

    pub fn at(y: f64) -> Self {
        Self {
            y: Accessor::Constant(y),
            ..Self::new()
        }
    }

    pub fn y(&self) -> &Accessor<Node> {
        &self.y
    }

    pub fn set_y(&mut self, y: f64) -> &mut Self {
        self.y = Accessor::Constant(y);
        self
    }

    pub fn set_y_fn(&mut self, f: impl Fn(&Node, usize, &[Node]) -> f64 + 'static) -> &mut Self {
        self.y = Accessor::per_element(f);
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

impl Default for YForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for YForce {
    fn initialize(&mut self, nodes: &[Node]) -> Result<()> {
        self.yz = self.y.materialize(nodes);
        self.strengths = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                if self.yz[i].is_nan() {
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
            node.vy += (self.yz[i] - node.y) * self.strengths[i] * alpha;
        }
    }
}
