//! End-to-end checks of the geometry pipeline: parametric assembly, boolean
//! merge with the real kernel, boundary classification, and the analytical
//! cross-check, all on the default full-spring parameters.

use snapspring::analytic;
use snapspring::beam::spring_assembly;
use snapspring::classifier::classify_nodes;
use snapspring::datatypes::{AnchorSpec, FullSpringSpec, LayerConfig, Point3};
use snapspring::merge::{merge_assembly, GeoKernel};

fn merged_default() -> (snapspring::datatypes::MergedOutline, FullSpringSpec) {
    let spec = FullSpringSpec::default();
    let assembly = spring_assembly(&spec, &AnchorSpec::default(), &LayerConfig::default(), 400)
        .expect("assembly");
    let outline = merge_assembly(&assembly, 0.1, 0.3, &GeoKernel).expect("merge");
    (outline, spec)
}

/// The merged outline spans the whole mechanism and stays inside its
/// bounding box
#[test]
fn merged_outline_covers_the_mechanism() {
    let (outline, spec) = merged_default();

    let min_x = outline.points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = outline
        .points
        .iter()
        .map(|p| p.x)
        .fold(f64::NEG_INFINITY, f64::max);

    assert!(min_x.abs() < 1e-6);
    assert!((max_x - spec.anchor_distance).abs() < 1e-6);
    assert!(outline.area > 0.0);
}

/// Scenario C: classification of an extruded node set is disjoint and
/// leaves interior nodes unlabeled
#[test]
fn boundary_sets_are_disjoint_and_incomplete() {
    let (outline, spec) = merged_default();

    // Stand-in for the extruded mesh: the outline nodes at both z faces
    // plus interior probes
    let mut nodes: Vec<Point3> = Vec::new();
    for z in [0.0, spec.thickness] {
        nodes.extend(outline.points.iter().map(|p| Point3 { x: p.x, y: p.y, z }));
    }
    nodes.push(Point3 {
        x: 20.0,
        y: 6.2,
        z: 0.25,
    });
    nodes.push(Point3 {
        x: 60.0,
        y: -3.8,
        z: 0.25,
    });

    let sets = classify_nodes(&nodes, &spec, 0.05);

    assert!(!sets.left_anchor.is_empty());
    assert!(!sets.right_anchor.is_empty());
    assert!(!sets.shuttle.is_empty());

    let all = [
        &sets.left_anchor,
        &sets.right_anchor,
        &sets.shuttle,
        &sets.junction,
    ];
    let labeled: usize = all.iter().map(|s| s.len()).sum();
    assert!(labeled < nodes.len());

    for (i, set_a) in all.iter().enumerate() {
        for set_b in all.iter().skip(i + 1) {
            for idx in set_a.iter() {
                assert!(
                    !set_b.contains(idx),
                    "node {} classified into two sets",
                    idx
                );
            }
        }
    }
}

/// The default geometry is bistable by the analytical model, and the two
/// stable displacements bracket the unstable equilibrium
#[test]
fn default_spring_is_bistable_by_the_analytical_model() {
    let spec = FullSpringSpec::default();
    let q = analytic::q_parameter(spec.initial_offset, spec.thickness);

    assert!(analytic::is_bistable(q));

    let deltas: Vec<f64> = (0..=400).map(|i| 2.0 * i as f64 / 400.0).collect();
    let curve = analytic::force_displacement(&deltas, q);
    let crossings = curve.interior_zero_crossings();
    assert_eq!(crossings.len(), 2);

    let snap = analytic::switching_forces(q).expect("snap summary");
    assert!(snap.d_top < crossings[0]);
    assert!(snap.d_bot > crossings[0] && snap.d_bot < crossings[1]);
}

/// The geometry engine and the analytical model agree on the parameters
/// they share: the spring's Q comes straight from the spec fields
#[test]
fn q_parameter_matches_the_spec() {
    let spec = FullSpringSpec::default();
    assert!((spec.q() - analytic::q_parameter(spec.initial_offset, spec.thickness)).abs() < 1e-15);
    assert!((spec.q() - 2.4).abs() < 1e-12);
}
