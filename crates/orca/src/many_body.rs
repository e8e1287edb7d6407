use crate::accessor::Accessor;
use crate::error::Result;
use crate::jiggle::jiggle;
use crate::{Force, Node, RandomSource};
use orca_quadtree::{Quadtree, Visited};

/// Aggregate carried by every quadtree cell: the signed sum of charge
/// strengths below it and their |strength|-weighted centroid.
#[derive(Debug, Clone, Copy, Default)]
struct Charge {
    value: f64,
    x: f64,
    y: f64,
}

/// Mutual n-body force between all nodes: repulsion for negative strengths
/// (the default), attraction for positive ones.
///
/// Uses Barnes-Hut approximation: a quadtree cell of width `w` at squared
/// distance `l` is treated as a single aggregated charge when
/// `w^2 / theta^2 < l`, turning the quadratic pairwise interaction into
/// O(n log n) per tick. Accuracy is tunable via `theta`, and the
/// interaction is clamped between `distance_min` and `distance_max`.
#[derive(Debug)]
pub struct ManyBodyForce {
    strength: Accessor<Node>,
    theta2: f64,
    distance_min2: f64,
    distance_max2: f64,
    strengths: Vec<f64>,
}

impl ManyBodyForce {
    pub fn new() -> Self {
        Self {
            strength: Accessor::Constant(-30.0),
            theta2: 0.81,
            distance_min2: 1.0,
            distance_max2: f64::INFINITY,
            strengths: Vec::new(),
        }
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

    pub fn theta(&self) -> f64 {
        self.theta2.sqrt()
    }

    /// Barnes-Hut accuracy criterion; stored squared. 0 disables the
    /// approximation entirely.
    pub fn set_theta(&mut self, theta: f64) -> &mut Self {
        self.theta2 = theta * theta;
        self
    }

    pub fn distance_min(&self) -> f64 {
        self.distance_min2.sqrt()
    }

    /// Lower clamp on the interaction distance, avoiding unbounded forces
    /// between nearly coincident nodes.
    pub fn set_distance_min(&mut self, distance: f64) -> &mut Self {
        self.distance_min2 = distance * distance;
        self
    }

    pub fn distance_max(&self) -> f64 {
        self.distance_max2.sqrt()
    }

    /// Upper cutoff beyond which nodes do not interact at all.
    pub fn set_distance_max(&mut self, distance: f64) -> &mut Self {
        self.distance_max2 = distance * distance;
        self
    }
}

impl Default for ManyBodyForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for ManyBodyForce {
    fn initialize(&mut self, nodes: &[Node]) -> Result<()> {
        self.strengths = self.strength.materialize(nodes);
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64, random: &mut RandomSource) {
        let n = nodes.len();
        let strengths = &self.strengths;
        let theta2 = self.theta2;
        let distance_min2 = self.distance_min2;
        let distance_max2 = self.distance_max2;

        let mut tree: Quadtree<usize, Charge> = Quadtree::new();
        tree.add_all(0..n, |&i| nodes[i].x, |&i| nodes[i].y);

        tree.visit_after(|cell| match cell {
            Visited::Leaf { x, y, entries } => Charge {
                value: entries.iter().map(|&i| strengths[i]).sum(),
                x,
                y,
            },
            Visited::Internal { children } => {
                let mut value = 0.0;
                let mut weight = 0.0;
                let mut x = 0.0;
                let mut y = 0.0;
                for q in children.into_iter().flatten() {
                    let c = q.value.abs();
                    if c > 0.0 {
                        value += q.value;
                        weight += c;
                        x += c * q.x;
                        y += c * q.y;
                    }
                }
                Charge {
                    value,
                    x: x / weight,
                    y: y / weight,
                }
            }
        });

        for i in 0..n {
            let xi = nodes[i].x;
            let yi = nodes[i].y;
            tree.visit(|quad| {
                let charge = *quad.aggregate();
                // Chargeless subtrees exert nothing.
                if charge.value == 0.0 || charge.value.is_nan() {
                    return true;
                }

                let mut x = charge.x - xi;
                let mut y = charge.y - yi;
                let w = quad.x1 - quad.x0;
                let mut l = x * x + y * y;

                // Far enough relative to the cell width: apply the whole
                // subtree as one charge and prune.
                if w * w / theta2 < l {
                    if l < distance_max2 {
                        if x == 0.0 {
                            x = jiggle(random);
                            l += x * x;
                        }
                        if y == 0.0 {
                            y = jiggle(random);
                            l += y * y;
                        }
                        if l < distance_min2 {
                            l = (distance_min2 * l).sqrt();
                        }
                        nodes[i].vx += x * charge.value * alpha / l;
                        nodes[i].vy += y * charge.value * alpha / l;
                    }
                    return true;
                }

                let Some(entries) = quad.entries() else {
                    // Too close for the approximation: descend.
                    return false;
                };
                if l >= distance_max2 {
                    return false;
                }

                // Leaf within range: apply per chained point with that
                // point's own strength. Skip the jiggle when the leaf holds
                // only the node itself.
                if entries[0] != i || entries.len() > 1 {
                    if x == 0.0 {
                        x = jiggle(random);
                        l += x * x;
                    }
                    if y == 0.0 {
                        y = jiggle(random);
                        l += y * y;
                    }
                    if l < distance_min2 {
                        l = (distance_min2 * l).sqrt();
                    }
                }
                for &j in entries {
                    if j != i {
                        let k = strengths[j] * alpha / l;
                        nodes[i].vx += x * k;
                        nodes[i].vy += y * k;
                    }
                }
                false
            });
        }
    }
}
