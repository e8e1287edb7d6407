//! The simulation driver: alpha annealing, the tick loop, fixed-node
//! handling, the force registry and event dispatch.

use crate::dispatch::Dispatch;
use crate::error::{Error, Result};
use crate::lcg::Lcg;
use crate::{Force, Node};
use indexmap::IndexMap;

const INITIAL_RADIUS: f64 = 10.0;

/// Owns the node array and drives registered forces through the annealing
/// schedule.
///
/// Each tick advances the temperature `alpha` towards `alpha_target`,
/// applies every force in insertion order, then integrates velocities into
/// positions (with per-axis velocity decay) while snapping fixed nodes back
/// to their pinned coordinates.
///
/// A fresh simulation starts in the running state; the host's frame loop is
/// expected to call [`Simulation::step`] at animation cadence until it
/// returns `false`. [`Simulation::stop`] switches to the manual-drive mode
/// used for static layouts, where the host calls [`Simulation::tick_n`]
/// directly and no events fire.
pub struct Simulation {
    nodes: Vec<Node>,
    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    /// Stored as `1 - user-facing value`: the per-tick velocity multiplier.
    velocity_decay: f64,
    forces: IndexMap<String, Box<dyn Force>>,
    random: Box<dyn FnMut() -> f64>,
    events: Dispatch<Simulation>,
    running: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("nodes", &self.nodes)
            .field("alpha", &self.alpha)
            .field("alpha_min", &self.alpha_min)
            .field("alpha_decay", &self.alpha_decay)
            .field("alpha_target", &self.alpha_target)
            .field("velocity_decay", &self.velocity_decay)
            .field("forces", &self.forces.keys().collect::<Vec<_>>())
            .field("running", &self.running)
            .finish()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Simulation {
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut lcg = Lcg::new();
        let mut simulation = Self {
            nodes,
            alpha: 1.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.6,
            forces: IndexMap::new(),
            random: Box::new(move || lcg.next()),
            events: Dispatch::new(&["tick", "end"]),
            running: true,
        };
        simulation.initialize_nodes();
        simulation
    }

    /// Replaces the node set, assigns indices, seeds unset positions and
    /// velocities, and re-initializes every registered force.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) -> Result<&mut Self> {
        self.nodes = nodes;
        self.initialize_nodes();
        self.initialize_forces()?;
        Ok(self)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access between ticks, e.g. to pin (`fx`/`fy`) or release a
    /// node while the simulation runs. Structural changes require
    /// [`Simulation::set_nodes`].
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    fn initialize_nodes(&mut self) {
        let initial_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.index = i;
            if let Some(fx) = node.fx {
                node.x = fx;
            }
            if let Some(fy) = node.fy {
                node.y = fy;
            }
            if node.x.is_nan() || node.y.is_nan() {
                // Phyllotaxis spiral: resolution-independent initial spread
                // with no coincident seeds.
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * initial_angle;
                node.x = radius * angle.cos();
                node.y = radius * angle.sin();
            }
            if node.vx.is_nan() || node.vy.is_nan() {
                node.vx = 0.0;
                node.vy = 0.0;
            }
        }
    }

    fn initialize_forces(&mut self) -> Result<()> {
        let Self { nodes, forces, .. } = self;
        for force in forces.values_mut() {
            force.initialize(nodes)?;
        }
        Ok(())
    }

    /// Registers (or replaces) a force under a name and initializes it
    /// against the current nodes. Forces apply in registration order.
    pub fn add_force(&mut self, name: impl Into<String>, force: impl Force) -> Result<&mut Self> {
        let mut force: Box<dyn Force> = Box::new(force);
        force.initialize(&self.nodes)?;
        self.forces.insert(name.into(), force);
        Ok(self)
    }

    /// Removes a force, preserving the order of the remaining ones.
    pub fn remove_force(&mut self, name: &str) -> Option<Box<dyn Force>> {
        self.forces.shift_remove(name)
    }

    pub fn force(&self, name: &str) -> Option<&dyn Force> {
        self.forces.get(name).map(|f| &**f)
    }

    pub fn force_mut<F: Force>(&mut self, name: &str) -> Option<&mut F> {
        let force = self.forces.get_mut(name)?;
        let any: &mut dyn std::any::Any = &mut **force;
        any.downcast_mut::<F>()
    }

    /// Mutates a typed force in place, then re-initializes it against the
    /// current nodes so accessor changes re-materialize. Returns `None`
    /// when no force of that name and type is registered.
    pub fn with_force<F: Force, R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut F) -> R,
    ) -> Result<Option<R>> {
        let Self { nodes, forces, .. } = self;
        let Some(force) = forces.get_mut(name) else {
            return Ok(None);
        };
        let any: &mut dyn std::any::Any = &mut **force;
        let Some(typed) = any.downcast_mut::<F>() else {
            return Ok(None);
        };
        let out = f(typed);
        force.initialize(nodes)?;
        Ok(Some(out))
    }

    /// Advances the simulation one tick without dispatching events.
    pub fn tick(&mut self) -> &mut Self {
        self.tick_n(1)
    }

    /// Advances the simulation `iterations` ticks; exactly equivalent to
    /// calling [`Simulation::tick`] that many times.
    pub fn tick_n(&mut self, iterations: usize) -> &mut Self {
        for _ in 0..iterations {
            self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

            let alpha = self.alpha;
            let velocity_decay = self.velocity_decay;
            let Self {
                nodes,
                forces,
                random,
                ..
            } = self;
            for force in forces.values_mut() {
                force.apply(nodes, alpha, &mut **random);
            }

            for node in nodes.iter_mut() {
                match node.fx {
                    Some(fx) => {
                        node.x = fx;
                        node.vx = 0.0;
                    }
                    None => {
                        node.vx *= velocity_decay;
                        node.x += node.vx;
                    }
                }
                match node.fy {
                    Some(fy) => {
                        node.y = fy;
                        node.vy = 0.0;
                    }
                    None => {
                        node.vy *= velocity_decay;
                        node.y += node.vy;
                    }
                }
            }
        }
        self
    }

    /// One timer step: a tick plus a `tick` event; when `alpha` falls below
    /// `alpha_min`, stops and emits `end`. Returns whether the simulation is
    /// still running afterwards.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.tick();
        self.dispatch("tick");
        if self.alpha < self.alpha_min {
            self.running = false;
            self.dispatch("end");
        }
        self.running
    }

    fn dispatch(&mut self, kind: &str) {
        // Listeners observe the simulation read-only while the dispatcher
        // is moved out.
        let mut events = std::mem::take(&mut self.events);
        events.call(kind, self);
        self.events = events;
    }

    pub fn restart(&mut self) -> &mut Self {
        self.running = true;
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.running = false;
        self
    }

    pub fn running(&self) -> bool {
        self.running
    }

    /// The node closest to `(x, y)`, if any.
    pub fn find(&self, x: f64, y: f64) -> Option<&Node> {
        self.find_in(x, y, f64::INFINITY)
    }

    /// The node closest to `(x, y)` within `radius`, if any.
    pub fn find_within(&self, x: f64, y: f64, radius: f64) -> Option<&Node> {
        self.find_in(x, y, radius * radius)
    }

    fn find_in(&self, x: f64, y: f64, mut radius2: f64) -> Option<&Node> {
        let mut closest = None;
        for node in &self.nodes {
            let dx = x - node.x;
            let dy = y - node.y;
            let d2 = dx * dx + dy * dy;
            if d2 < radius2 {
                closest = Some(node);
                radius2 = d2;
            }
        }
        closest
    }

    /// Replaces the shared random source and re-initializes every force.
    pub fn set_random_source(&mut self, random: impl FnMut() -> f64 + 'static) -> Result<&mut Self> {
        self.random = Box::new(random);
        self.initialize_forces()?;
        Ok(self)
    }

    /// The shared random source; drawing from it advances the simulation's
    /// deterministic sequence.
    pub fn random_source(&mut self) -> &mut (dyn FnMut() -> f64) {
        &mut *self.random
    }

    /// Registers an event listener under `type[.name]` typenames; types are
    /// `tick` and `end`. Listeners receive the simulation itself.
    pub fn on(
        &mut self,
        typenames: &str,
        listener: impl FnMut(&Simulation) + 'static,
    ) -> Result<&mut Self> {
        self.events.on(typenames, listener)?;
        Ok(self)
    }

    /// Removes listeners by typename (`"tick.render"`, or `".render"` for
    /// every type).
    pub fn remove_on(&mut self, typenames: &str) -> Result<&mut Self> {
        self.events.remove(typenames)?;
        Ok(self)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) -> Result<&mut Self> {
        self.alpha = check_unit("alpha", alpha)?;
        Ok(self)
    }

    pub fn alpha_min(&self) -> f64 {
        self.alpha_min
    }

    pub fn set_alpha_min(&mut self, alpha_min: f64) -> Result<&mut Self> {
        self.alpha_min = check_unit("alpha_min", alpha_min)?;
        Ok(self)
    }

    pub fn alpha_decay(&self) -> f64 {
        self.alpha_decay
    }

    pub fn set_alpha_decay(&mut self, alpha_decay: f64) -> Result<&mut Self> {
        self.alpha_decay = check_unit("alpha_decay", alpha_decay)?;
        Ok(self)
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, alpha_target: f64) -> Result<&mut Self> {
        self.alpha_target = check_unit("alpha_target", alpha_target)?;
        Ok(self)
    }

    pub fn velocity_decay(&self) -> f64 {
        1.0 - self.velocity_decay
    }

    pub fn set_velocity_decay(&mut self, velocity_decay: f64) -> Result<&mut Self> {
        self.velocity_decay = 1.0 - check_unit("velocity_decay", velocity_decay)?;
        Ok(self)
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::ParameterOutOfRange { name, value })
    }
}
