use crate::accessor::Accessor;
use crate::error::Result;
use crate::jiggle::jiggle;
use crate::{Force, Node, RandomSource};
use orca_quadtree::{Quadtree, Visited};

/// Resolves overlaps between circles centered on each node.
///
/// Each sweep indexes the nodes' *anticipated* positions (`x + vx`,
/// `y + vy`) in a quadtree whose cells carry the maximum radius of their
/// subtree, so whole regions that cannot touch the current circle are
/// pruned. Overlapping pairs receive velocity impulses split inversely to
/// their squared radii (the smaller circle moves more).
#[derive(Debug)]
pub struct CollideForce {
    radius: Accessor<Node>,
    strength: f64,
    iterations: usize,
    radii: Vec<f64>,
}

impl CollideForce {
    pub fn new() -> Self {
        Self {
            radius: Accessor::Constant(1.0),
            strength: 1.0,
            iterations: 1,
            radii: Vec::new(),
        }
    }

    pub fn with_radius(radius: f64) -> Self {
        Self {
            radius: Accessor::Constant(radius),
            ..Self::new()
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

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Overlap correction factor in [0, 1]. Lower values let overlaps relax
    /// over several ticks instead of resolving at once.
    pub fn set_strength(&mut self, strength: f64) -> &mut Self {
        self.strength = strength;
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Sweeps per tick. More sweeps give a stiffer, more expensive
    /// resolution.
    pub fn set_iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }
}

impl Default for CollideForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for CollideForce {
    fn initialize(&mut self, nodes: &[Node]) -> Result<()> {
        self.radii = self.radius.materialize(nodes);
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [Node], _alpha: f64, random: &mut RandomSource) {
        let n = nodes.len();
        let strength = self.strength;
        let radii = &self.radii;

        for _ in 0..self.iterations {
            let mut tree: Quadtree<usize, f64> = Quadtree::new();
            tree.add_all(
                0..n,
                |&i| nodes[i].x + nodes[i].vx,
                |&i| nodes[i].y + nodes[i].vy,
            );

            // Max radius per subtree; a leaf reports its chain head.
            tree.visit_after(|cell| match cell {
                Visited::Leaf { entries, .. } => radii[entries[0]],
                Visited::Internal { children } => children
                    .into_iter()
                    .flatten()
                    .fold(0.0, |r, &c| if c > r { c } else { r }),
            });

            for i in 0..n {
                let ri = radii[i];
                let ri2 = ri * ri;
                let xi = nodes[i].x + nodes[i].vx;
                let yi = nodes[i].y + nodes[i].vy;
                tree.visit(|quad| {
                    let rj = *quad.aggregate();
                    let r = ri + rj;
                    if let Some(entries) = quad.entries() {
                        // Only the chain head takes part; each pair is
                        // handled once, from the lower-indexed node's
                        // traversal. Velocities of the partner are read
                        // live, so earlier impulses in this sweep are
                        // visible.
                        let j = entries[0];
                        if j > i {
                            let mut x = xi - nodes[j].x - nodes[j].vx;
                            let mut y = yi - nodes[j].y - nodes[j].vy;
                            let mut l = x * x + y * y;
                            if l < r * r {
                                if x == 0.0 {
                                    x = jiggle(random);
                                    l += x * x;
                                }
                                if y == 0.0 {
                                    y = jiggle(random);
                                    l += y * y;
                                }
                                let d = l.sqrt();
                                let k = (r - d) / d * strength;
                                x *= k;
                                y *= k;
                                let rj2 = rj * rj;
                                let share = rj2 / (ri2 + rj2);
                                nodes[i].vx += x * share;
                                nodes[i].vy += y * share;
                                nodes[j].vx -= x * (1.0 - share);
                                nodes[j].vy -= y * (1.0 - share);
                            }
                        }
                        return false;
                    }
                    // Prune interior cells that cannot reach the circle.
                    quad.x0 > xi + r || quad.x1 < xi - r || quad.y0 > yi + r || quad.y1 < yi - r
                });
            }
        }
    }
}
