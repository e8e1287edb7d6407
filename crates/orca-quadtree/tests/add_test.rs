use orca_quadtree::Quadtree;

/// Leaf snapshot in visit order: point position plus payloads (chain head
/// first).
fn leaves<T: Clone>(q: &Quadtree<T>) -> Vec<(f64, f64, Vec<T>)> {
    let mut out = Vec::new();
    q.visit(|quad| {
        if let (Some((x, y)), Some(entries)) = (quad.point(), quad.entries()) {
            out.push((x, y, entries.to_vec()));
        }
        false
    });
    out
}

#[test]
fn quadtree_add_creates_a_new_point_and_adds_it_to_the_quadtree() {
    let mut q: Quadtree<usize> = Quadtree::new();
    q.add(0.0, 0.0, 0);
    assert_eq!(leaves(&q), vec![(0.0, 0.0, vec![0])]);
    q.add(0.9, 0.9, 1);
    assert_eq!(leaves(&q), vec![(0.0, 0.0, vec![0]), (0.9, 0.9, vec![1])]);
    q.add(0.9, 0.0, 2);
    assert_eq!(
        leaves(&q),
        vec![(0.0, 0.0, vec![0]), (0.9, 0.0, vec![2]), (0.9, 0.9, vec![1])]
    );
    q.add(0.0, 0.9, 3);
    assert_eq!(
        leaves(&q),
        vec![
            (0.0, 0.0, vec![0]),
            (0.9, 0.0, vec![2]),
            (0.0, 0.9, vec![3]),
            (0.9, 0.9, vec![1]),
        ]
    );
    q.add(0.4, 0.4, 4);
    assert_eq!(
        leaves(&q),
        vec![
            (0.0, 0.0, vec![0]),
            (0.4, 0.4, vec![4]),
            (0.9, 0.0, vec![2]),
            (0.0, 0.9, vec![3]),
            (0.9, 0.9, vec![1]),
        ]
    );
}

#[test]
fn quadtree_add_handles_points_being_on_the_perimeter_of_the_quadtree_bounds() {
    let mut q: Quadtree<usize> = Quadtree::new();
    q.add(0.0, 0.0, 0);
    q.add(1.0, 1.0, 1);
    assert_eq!(q.extent(), Some(((0.0, 0.0), (2.0, 2.0))));
    assert_eq!(leaves(&q), vec![(0.0, 0.0, vec![0]), (1.0, 1.0, vec![1])]);
}

#[test]
fn quadtree_add_chains_coincident_points_with_the_newest_at_the_head() {
    let mut q: Quadtree<&str> = Quadtree::new();
    q.add(1.0, 1.0, "a");
    q.add(2.0, 2.0, "b");
    q.add(1.0, 1.0, "c");
    q.add(1.0, 1.0, "d");
    assert_eq!(
        leaves(&q),
        vec![(1.0, 1.0, vec!["d", "c", "a"]), (2.0, 2.0, vec!["b"])]
    );
    assert_eq!(q.size(), 4);
}

#[test]
fn quadtree_add_ignores_points_with_nan_coordinates() {
    let mut q: Quadtree<&str> = Quadtree::new();
    q.add(f64::NAN, 0.0, "a");
    q.add(0.0, f64::NAN, "b");
    assert!(q.is_empty());
    assert_eq!(q.extent(), None);
    assert_eq!(q.size(), 0);

    q.add(0.0, 0.0, "c");
    q.add(f64::NAN, f64::NAN, "d");
    assert_eq!(q.size(), 1);
}

#[test]
fn quadtree_add_all_covers_the_batch_extent_before_inserting() {
    let mut q: Quadtree<(f64, f64)> = Quadtree::new();
    q.add_all(
        vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
        |p| p.0,
        |p| p.1,
    );
    assert_eq!(q.extent(), Some(((0.0, 0.0), (2.0, 2.0))));
    assert_eq!(q.size(), 4);
    assert_eq!(
        leaves(&q),
        vec![
            (0.0, 0.0, vec![(0.0, 0.0)]),
            (1.0, 0.0, vec![(1.0, 0.0)]),
            (0.0, 1.0, vec![(0.0, 1.0)]),
            (1.0, 1.0, vec![(1.0, 1.0)]),
        ]
    );
}

#[test]
fn quadtree_add_all_skips_invalid_points_and_an_all_invalid_batch_is_a_noop() {
    let mut q: Quadtree<(f64, f64)> = Quadtree::new();
    q.add_all(vec![(f64::NAN, 0.0), (0.0, f64::NAN)], |p| p.0, |p| p.1);
    assert!(q.is_empty());
    assert_eq!(q.extent(), None);

    q.add_all(
        vec![(5.0, 5.0), (f64::NAN, 1.0), (6.0, 6.0)],
        |p| p.0,
        |p| p.1,
    );
    assert_eq!(q.size(), 2);
}

#[test]
fn quadtree_data_returns_payloads_in_visit_order() {
    let mut q: Quadtree<usize> = Quadtree::new();
    q.add_all(0..4, |&i| (i % 2) as f64, |&i| (i / 2) as f64);
    assert_eq!(q.data(), vec![&0, &1, &2, &3]);
}
