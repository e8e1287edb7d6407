//! Force-directed graph layout simulation.
//!
//! Baseline: `d3-force` (v3). A [`Simulation`] owns a set of [`Node`]s and a
//! name-keyed registry of [`Force`]s. Each tick anneals the temperature
//! `alpha`, applies every force in insertion order, then integrates
//! velocities into positions while pinning fixed nodes. With the default
//! deterministic random source, whole runs are reproducible bit for bit.
//!
//! The Barnes-Hut many-body force and the collision force index nodes
//! through the sibling `orca-quadtree` crate.

use serde::{Deserialize, Serialize};

mod accessor;
mod center;
mod collide;
mod dispatch;
mod error;
mod jiggle;
mod lcg;
mod link;
mod many_body;
mod position;
mod radial;
mod simulation;

pub use accessor::Accessor;
pub use center::CenterForce;
pub use collide::CollideForce;
pub use dispatch::Dispatch;
pub use error::{Error, Result};
pub use lcg::Lcg;
pub use link::{Link, LinkEnd, LinkForce};
pub use many_body::ManyBodyForce;
pub use position::{XForce, YForce};
pub use radial::RadialForce;
pub use simulation::Simulation;

/// Uniform source in [0, 1) shared by the simulation and its forces. Every
/// tie-break draw goes through the one source owned by the driver, which is
/// what keeps runs reproducible.
pub type RandomSource = dyn FnMut() -> f64;

/// A simulated particle.
///
/// Positions and velocities start as NaN ("unset"): registration seeds
/// unset positions on a phyllotaxis spiral and zeroes unset velocities.
/// `fx`/`fy` pin the node; the driver re-asserts them at the end of every
/// tick, so forces may read and push fixed nodes like any other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    /// Position in the driver's node array, assigned at registration.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            index: 0,
            x: f64::NAN,
            y: f64::NAN,
            vx: f64::NAN,
            vy: f64::NAN,
            fx: None,
            fy: None,
        }
    }
}

impl Node {
    /// A node at a known position with zero velocity.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            ..Self::default()
        }
    }

    /// A node pinned at a fixed position.
    pub fn fixed(x: f64, y: f64) -> Self {
        Self {
            fx: Some(x),
            fy: Some(y),
            ..Self::default()
        }
    }
}

/// A force mutates node velocities (and occasionally positions) once per
/// tick.
///
/// `initialize` is called whenever the simulation's node set changes and is
/// where accessor-backed parameters are materialized into dense arrays;
/// `apply` must not invoke user accessors. Forces added to a [`Simulation`]
/// are initialized by the driver; calling `apply` on a force that was never
/// initialized against the same node set is out of contract.
pub trait Force: std::any::Any {
    fn initialize(&mut self, nodes: &[Node]) -> Result<()> {
        let _ = nodes;
        Ok(())
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64, random: &mut RandomSource);
}
