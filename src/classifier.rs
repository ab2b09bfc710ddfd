use crate::datatypes::{BoundarySets, FullSpringSpec, PlanarNode};

/// Extra y-margin beyond the beam half-width when matching junction nodes
const JUNCTION_Y_MARGIN: f64 = 0.1;

/// Labels mesh nodes by the analytic feature they sit on: left/right anchor
/// planes, the shuttle body, or the beam-shuttle junctions. Works on 2D and
/// 3D node sets; only the in-plane coordinates participate.
///
/// The four sets are disjoint: a junction node is never also reported as a
/// shuttle node, and interior nodes appear in none.
///
/// # Arguments
/// * `nodes` - The node coordinates, in mesh index order
/// * `spec` - The full-spring spec the mesh was generated from
/// * `tol` - Position tolerance (um)
///
/// # Returns
/// Named boundary node index sets
pub fn classify_nodes<N: PlanarNode>(nodes: &[N], spec: &FullSpringSpec, tol: f64) -> BoundarySets {
    let sx0 = spec.shuttle_x0();
    let sx1 = spec.shuttle_x1();
    let half_sp = spec.beam_spacing / 2.0;
    let beam_ys = [
        spec.initial_offset + half_sp,
        spec.initial_offset - half_sp,
    ];
    let y_margin = spec.flex_width / 2.0 + JUNCTION_Y_MARGIN;

    let mut sets = BoundarySets::default();

    for (i, node) in nodes.iter().enumerate() {
        let x = node.x();
        let y = node.y();

        if x < tol {
            sets.left_anchor.push(i);
        }
        if x > spec.anchor_distance - tol {
            sets.right_anchor.push(i);
        }

        let at_shuttle_face = (x - sx0).abs() < tol || (x - sx1).abs() < tol;
        let in_beam_band = beam_ys.iter().any(|&yc| (y - yc).abs() < y_margin);
        let junction = at_shuttle_face && in_beam_band;

        if junction {
            sets.junction.push(i);
        } else if x > sx0 - tol && x < sx1 + tol {
            sets.shuttle.push(i);
        }
    }

    sets
}
