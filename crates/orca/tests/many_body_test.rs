use orca::{ManyBodyForce, Node, Simulation};

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {expected}, got {actual}"
    );
}

fn pair(gap: f64) -> Simulation {
    let mut sim = Simulation::default();
    sim.stop();
    sim.add_force("charge", ManyBodyForce::new()).unwrap();
    sim.set_nodes(vec![Node::at(0.0, 0.0), Node::at(gap, 0.0)])
        .unwrap();
    sim
}

#[test]
fn force_many_body_repels_nodes_by_default() {
    let mut sim = pair(10.0);
    sim.tick();
    let nodes = sim.nodes();
    assert!(nodes[0].vx < 0.0);
    assert!(nodes[1].vx > 0.0);
    assert!(nodes[0].x < 0.0);
    assert!(nodes[1].x > 10.0);
}

#[test]
fn force_many_body_pair_interaction_is_symmetric() {
    let mut sim = pair(10.0);
    sim.tick();
    let nodes = sim.nodes();
    // Equal charges, opposite pushes (the coincident-axis jiggle perturbs
    // the magnitudes below 1e-9).
    assert_close(nodes[0].vx, -nodes[1].vx, 1e-9);
}

#[test]
fn force_many_body_first_tick_matches_the_inverse_distance_formula() {
    let mut sim = pair(10.0);
    sim.tick();
    let alpha = sim.alpha();
    let decay = 1.0 - sim.velocity_decay();
    // v = d * strength * alpha / l with d = 10, l = 100, strength = -30.
    let expected = 10.0 * -30.0 * alpha / 100.0 * decay;
    assert_close(sim.nodes()[0].vx, expected, 1e-9);
}

#[test]
fn force_many_body_positive_strength_attracts() {
    let mut sim = Simulation::default();
    sim.stop();
    let mut charge = ManyBodyForce::new();
    charge.set_strength(30.0);
    sim.add_force("charge", charge).unwrap();
    sim.set_nodes(vec![Node::at(0.0, 0.0), Node::at(10.0, 0.0)])
        .unwrap();

    sim.tick();
    let nodes = sim.nodes();
    assert!(nodes[0].vx > 0.0);
    assert!(nodes[1].vx < 0.0);
}

#[test]
fn force_many_body_distance_max_cuts_the_interaction_off() {
    let mut sim = Simulation::default();
    sim.stop();
    let mut charge = ManyBodyForce::new();
    charge.set_distance_max(5.0);
    sim.add_force("charge", charge).unwrap();
    sim.set_nodes(vec![Node::at(0.0, 0.0), Node::at(10.0, 0.0)])
        .unwrap();

    sim.tick_n(5);
    let nodes = sim.nodes();
    assert_eq!(nodes[0].x, 0.0);
    assert_eq!(nodes[0].vx, 0.0);
    assert_eq!(nodes[1].x, 10.0);
    assert_eq!(nodes[1].vx, 0.0);
}

#[test]
fn force_many_body_distance_min_clamps_near_field_blowup() {
    let mut sim = pair(0.5);
    sim.tick();
    let alpha = sim.alpha();
    let decay = 1.0 - sim.velocity_decay();
    // Squared distance 0.25 clamps to sqrt(1 * 0.25) = 0.5, so the push is
    // d * strength * alpha / 0.5 instead of / 0.25.
    let expected = 0.5 * -30.0 * alpha / 0.5 * decay;
    assert_close(sim.nodes()[0].vx, expected, 1e-9);
}

#[test]
fn force_many_body_per_node_strength_weights_the_push() {
    let mut sim = Simulation::default();
    sim.stop();
    let mut charge = ManyBodyForce::new();
    charge.set_strength_fn(|_, i, _| if i == 0 { -60.0 } else { -30.0 });
    sim.add_force("charge", charge).unwrap();
    sim.set_nodes(vec![Node::at(0.0, 0.0), Node::at(10.0, 0.0)])
        .unwrap();

    sim.tick();
    let nodes = sim.nodes();
    // Node 1 feels node 0's doubled charge.
    assert_close(nodes[1].vx, -2.0 * nodes[0].vx, 1e-9);
}

#[test]
fn force_many_body_theta_zero_matches_the_exact_pairwise_sum() {
    // With the approximation disabled every interaction is a leaf visit,
    // so a three-node line adds up term by term.
    let mut sim = Simulation::default();
    sim.stop();
    let mut charge = ManyBodyForce::new();
    charge.set_theta(0.0);
    sim.add_force("charge", charge).unwrap();
    sim.set_nodes(vec![
        Node::at(0.0, 0.0),
        Node::at(10.0, 0.0),
        Node::at(20.0, 0.0),
    ])
    .unwrap();

    sim.tick();
    let alpha = sim.alpha();
    let decay = 1.0 - sim.velocity_decay();
    // Middle node: equal pulls cancel; end nodes feel both neighbours.
    assert_close(sim.nodes()[1].vx, 0.0, 1e-9);
    let expected = (10.0 * -30.0 * alpha / 100.0 + 20.0 * -30.0 * alpha / 400.0) * decay;
    assert_close(sim.nodes()[0].vx, expected, 1e-9);
}

#[test]
fn force_many_body_separates_coincident_nodes_deterministically() {
    let make = || {
        let mut sim = Simulation::default();
        sim.stop();
        sim.add_force("charge", ManyBodyForce::new()).unwrap();
        sim.set_nodes(vec![Node::at(5.0, 5.0), Node::at(5.0, 5.0)])
            .unwrap();
        sim
    };

    let mut a = make();
    let mut b = make();
    a.tick_n(10);
    b.tick_n(10);
    assert_eq!(a.nodes(), b.nodes());

    let nodes = a.nodes();
    let dx = nodes[0].x - nodes[1].x;
    let dy = nodes[0].y - nodes[1].y;
    assert!(dx * dx + dy * dy > 0.0, "coincident nodes failed to separate");
}
