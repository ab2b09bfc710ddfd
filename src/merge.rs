use cavalier_contours::polyline::{
    seg_arc_radius_and_center, PlineSource, PlineSourceMut, Polyline,
};
use geo::{BooleanOps, LineString, MultiPolygon, Polygon};

use crate::{
    datatypes::{FullSpringSpec, MemberRole, MergedOutline, SpringAssembly, Vertex},
    error::SpringError,
};

/// Taper run of a junction gusset along the beam axis (um)
pub const GUSSET_RUN: f64 = 2.0;

/// Margin kept between the fillet radius and half the flex width, so the
/// erosion step cannot consume a flex section outright
const FILLET_CLEARANCE: f64 = 0.02;

/// Allowed relative area drift when the fillet splits the outline
const FILLET_AREA_TOLERANCE: f64 = 0.05;

/// Maximum arc sweep per tessellated segment when flattening offset arcs
const ARC_STEP: f64 = 0.2;

/// Capability interface over the external 2D geometry kernel. The merge
/// logic never implements boolean algebra itself.
pub trait PolygonBooleanOps {
    /// Unions the given closed loops; returns the exterior loops of the
    /// result, one per disjoint component
    fn union(&self, loops: &[Vec<Vertex>]) -> Result<Vec<Vec<Vertex>>, SpringError>;

    /// Offsets a closed loop by `delta` (negative erodes, positive
    /// dilates); returns the resulting loops
    fn offset(&self, outline: &[Vertex], delta: f64) -> Result<Vec<Vec<Vertex>>, SpringError>;
}

/// Production kernel: boolean union through `geo`, offsetting through
/// `cavalier_contours`
pub struct GeoKernel;

fn to_geo_polygon(outline: &[Vertex]) -> Polygon<f64> {
    let coords: Vec<(f64, f64)> = outline.iter().map(|v| (v.x, v.y)).collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// Shoelace area of a closed loop, sign following vertex order
pub fn signed_area(outline: &[Vertex]) -> f64 {
    let n = outline.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

fn to_polyline(outline: &[Vertex]) -> Polyline<f64> {
    let mut pline = Polyline::new_closed();
    for v in outline {
        pline.add(v.x, v.y, 0.0);
    }
    // Offsetting assumes counter-clockwise orientation
    if pline.area() < 0.0 {
        pline.invert_direction_mut();
    }
    pline
}

/// Flattens an offset result back into a plain vertex loop, tessellating
/// any arc segments the offset introduced
fn flatten_polyline(pline: &Polyline<f64>) -> Vec<Vertex> {
    let n = pline.vertex_count();
    let mut points: Vec<Vertex> = Vec::with_capacity(n);

    for i in 0..n {
        let v1 = pline.at(i);
        let v2 = pline.at((i + 1) % n);
        points.push(Vertex { x: v1.x, y: v1.y });

        if v1.bulge != 0.0 {
            let sweep = 4.0 * f64::atan(v1.bulge);
            let (_, center) = seg_arc_radius_and_center(v1, v2);
            let radius_x = v1.x - center.x;
            let radius_y = v1.y - center.y;
            let start = f64::atan2(radius_y, radius_x);
            let radius = f64::sqrt(radius_x * radius_x + radius_y * radius_y);

            let segments = usize::max((sweep.abs() / ARC_STEP).ceil() as usize, 1);
            for s in 1..segments {
                let angle = start + sweep * s as f64 / segments as f64;
                points.push(Vertex {
                    x: center.x + radius * angle.cos(),
                    y: center.y + radius * angle.sin(),
                });
            }
        }
    }

    points
}

impl PolygonBooleanOps for GeoKernel {
    fn union(&self, loops: &[Vec<Vertex>]) -> Result<Vec<Vec<Vertex>>, SpringError> {
        if loops.is_empty() {
            return Err(SpringError::NonManifoldPolygon(
                "union called with zero input polygons".to_owned(),
            ));
        }

        let mut merged = MultiPolygon::new(vec![to_geo_polygon(&loops[0])]);
        for outline in loops[1..].iter() {
            merged = merged.union(&MultiPolygon::new(vec![to_geo_polygon(outline)]));
        }

        let mut result: Vec<Vec<Vertex>> = Vec::new();
        for polygon in merged.iter() {
            if !polygon.interiors().is_empty() {
                println!(
                    "warning [merge]: union produced {} interior ring(s); holes are dropped",
                    polygon.interiors().len()
                );
            }

            let mut outline: Vec<Vertex> = polygon
                .exterior()
                .coords()
                .map(|c| Vertex { x: c.x, y: c.y })
                .collect();

            // geo closes exterior rings; store the loop open
            if outline.len() > 1 && outline.first() == outline.last() {
                outline.pop();
            }
            if outline.len() >= 3 {
                result.push(outline);
            }
        }

        Ok(result)
    }

    fn offset(&self, outline: &[Vertex], delta: f64) -> Result<Vec<Vec<Vertex>>, SpringError> {
        if outline.len() < 3 {
            return Err(SpringError::NonManifoldPolygon(format!(
                "offset called on a degenerate loop with {} vertices",
                outline.len()
            )));
        }

        let pline = to_polyline(outline);
        let base_area = pline.area();

        // The offset kernel's sign convention is verified against the
        // requested direction rather than assumed
        let mut results = pline.parallel_offset(delta);
        let moved_area: f64 = results.iter().map(|p| p.area().abs()).sum();
        let direction_ok = if delta > 0.0 {
            moved_area > base_area
        } else {
            moved_area < base_area
        };
        if !direction_ok {
            results = pline.parallel_offset(-delta);
        }

        Ok(results
            .iter()
            .map(flatten_polyline)
            .filter(|l| l.len() >= 3 && signed_area(l).abs() > 1e-12)
            .collect())
    }
}

/// Triangular gussets injected at the four beam-to-shuttle attachment
/// faces: base 2 * junction_widening along the shuttle face, apex on the
/// beam centerline GUSSET_RUN into the beam
fn gusset_polygons(spec: &FullSpringSpec, junction_widening: f64) -> Vec<Vec<Vertex>> {
    let sx0 = spec.shuttle_x0();
    let sx1 = spec.shuttle_x1();
    let half_sp = spec.beam_spacing / 2.0;

    let mut gussets: Vec<Vec<Vertex>> = Vec::with_capacity(4);
    for beam_y in [
        spec.initial_offset + half_sp,
        spec.initial_offset - half_sp,
    ] {
        gussets.push(vec![
            Vertex {
                x: sx0,
                y: beam_y - junction_widening,
            },
            Vertex {
                x: sx0,
                y: beam_y + junction_widening,
            },
            Vertex {
                x: sx0 - GUSSET_RUN,
                y: beam_y,
            },
        ]);
        gussets.push(vec![
            Vertex {
                x: sx1,
                y: beam_y - junction_widening,
            },
            Vertex {
                x: sx1,
                y: beam_y + junction_widening,
            },
            Vertex {
                x: sx1 + GUSSET_RUN,
                y: beam_y,
            },
        ]);
    }

    gussets
}

/// Unions the beams, shuttle, and optional gussets of an assembly into a
/// single manufacturable outline, then optionally rounds concave corners
/// by eroding and re-dilating
///
/// # Arguments
/// * `assembly` - The placed spring members
/// * `fillet_radius` - Concave rounding radius (um); clamped below half the
///   flex width; 0 disables
/// * `junction_widening` - Gusset half-width at the shuttle faces (um);
///   0 disables
/// * `ops` - The boolean/offset kernel
///
/// # Returns
/// The merged outline with pre- and post-fillet areas
pub fn merge_assembly(
    assembly: &SpringAssembly,
    fillet_radius: f64,
    junction_widening: f64,
    ops: &dyn PolygonBooleanOps,
) -> Result<MergedOutline, SpringError> {
    if fillet_radius < 0.0 {
        return Err(SpringError::Geometry(format!(
            "fillet_radius must be non-negative; got {}",
            fillet_radius
        )));
    }
    if junction_widening < 0.0 {
        return Err(SpringError::Geometry(format!(
            "junction_widening must be non-negative; got {}",
            junction_widening
        )));
    }

    let structural: Vec<&crate::datatypes::PlacedPolygon> = assembly
        .members
        .iter()
        .filter(|m| m.role == MemberRole::Beam || m.role == MemberRole::Shuttle)
        .collect();

    if structural.is_empty() {
        return Err(SpringError::NonManifoldPolygon(
            "assembly has no beam or shuttle members to merge".to_owned(),
        ));
    }
    let layer = structural[0].layer;

    let mut loops: Vec<Vec<Vertex>> = structural.iter().map(|m| m.world_points()).collect();
    if junction_widening > 0.0 {
        loops.extend(gusset_polygons(&assembly.spec, junction_widening));
    }

    let unioned = ops.union(&loops)?;

    let total_area: f64 = unioned.iter().map(|l| signed_area(l).abs()).sum();
    if unioned.is_empty() || total_area < 1e-9 {
        return Err(SpringError::NonManifoldPolygon(
            "boolean union produced zero area".to_owned(),
        ));
    }
    if unioned.len() > 1 {
        return Err(SpringError::NonManifoldPolygon(format!(
            "boolean union produced {} disjoint components; beams do not reach the shuttle",
            unioned.len()
        )));
    }

    let mut outline = unioned.into_iter().next().unwrap_or_default();
    let pre_fillet_area = signed_area(&outline).abs();

    if fillet_radius > 0.0 {
        let radius = f64::min(
            fillet_radius,
            assembly.spec.flex_width / 2.0 - FILLET_CLEARANCE,
        );

        if radius <= 0.0 {
            println!(
                "warning [merge]: fillet_radius {} cannot be clamped below flex_width/2; skipping fillet",
                fillet_radius
            );
        } else {
            outline = apply_fillet(&outline, radius, pre_fillet_area, ops)?;
        }
    }

    let area = signed_area(&outline).abs();

    Ok(MergedOutline {
        points: outline,
        area,
        pre_fillet_area,
        layer,
    })
}

/// Erode-then-dilate rounding of concave corners. If the eroded geometry
/// splits, the largest piece is kept only when the combined area stays
/// within tolerance of the pre-fillet area; otherwise the fillet ate
/// structural material and the merge fails.
fn apply_fillet(
    outline: &[Vertex],
    radius: f64,
    pre_fillet_area: f64,
    ops: &dyn PolygonBooleanOps,
) -> Result<Vec<Vertex>, SpringError> {
    let eroded = ops.offset(outline, -radius)?;
    if eroded.is_empty() {
        return Err(SpringError::NonManifoldPolygon(format!(
            "fillet erosion by {:.3} um consumed the outline entirely",
            radius
        )));
    }

    let mut dilated: Vec<Vec<Vertex>> = Vec::new();
    for piece in &eroded {
        dilated.extend(ops.offset(piece, radius)?);
    }
    if dilated.is_empty() {
        return Err(SpringError::NonManifoldPolygon(format!(
            "fillet dilation by {:.3} um produced no geometry",
            radius
        )));
    }

    if dilated.len() > 1 {
        let combined: f64 = dilated.iter().map(|l| signed_area(l).abs()).sum();
        let drift = (combined - pre_fillet_area).abs() / pre_fillet_area;
        if drift > FILLET_AREA_TOLERANCE {
            return Err(SpringError::NonManifoldPolygon(format!(
                "fillet split the outline into {} components with {:.1}% area drift \
                (pre-fillet {:.3} um^2, post-fillet {:.3} um^2)",
                dilated.len(),
                drift * 100.0,
                pre_fillet_area,
                combined
            )));
        }

        println!(
            "warning [merge]: fillet split the outline into {} components; keeping the largest",
            dilated.len()
        );
    }

    let largest = dilated
        .into_iter()
        .max_by(|a, b| {
            signed_area(a)
                .abs()
                .total_cmp(&signed_area(b).abs())
        })
        .unwrap_or_default();

    Ok(largest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::spring_assembly;
    use crate::datatypes::{AnchorSpec, FullSpringSpec, LayerConfig};

    fn default_assembly() -> SpringAssembly {
        spring_assembly(
            &FullSpringSpec::default(),
            &AnchorSpec::default(),
            &LayerConfig::default(),
            400,
        )
        .unwrap()
    }

    fn square(side: f64, cx: f64, cy: f64) -> Vec<Vertex> {
        let h = side / 2.0;
        vec![
            Vertex {
                x: cx - h,
                y: cy - h,
            },
            Vertex {
                x: cx + h,
                y: cy - h,
            },
            Vertex {
                x: cx + h,
                y: cy + h,
            },
            Vertex {
                x: cx - h,
                y: cy + h,
            },
        ]
    }

    #[test]
    fn union_of_overlapping_squares_is_one_loop() {
        let kernel = GeoKernel;
        let loops = kernel
            .union(&[square(2.0, 0.0, 0.0), square(2.0, 1.0, 0.0)])
            .unwrap();
        assert_eq!(loops.len(), 1);
        assert!((signed_area(&loops[0]).abs() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn union_keeps_disjoint_components_separate() {
        let kernel = GeoKernel;
        let loops = kernel
            .union(&[square(1.0, 0.0, 0.0), square(1.0, 10.0, 0.0)])
            .unwrap();
        assert_eq!(loops.len(), 2);
    }

    #[test]
    fn offset_direction_matches_request() {
        let kernel = GeoKernel;
        let sq = square(4.0, 0.0, 0.0);

        let eroded = kernel.offset(&sq, -0.5).unwrap();
        assert_eq!(eroded.len(), 1);
        assert!(signed_area(&eroded[0]).abs() < 16.0);

        let dilated = kernel.offset(&sq, 0.5).unwrap();
        assert_eq!(dilated.len(), 1);
        assert!(signed_area(&dilated[0]).abs() > 16.0);
    }

    #[test]
    fn merge_produces_a_single_connected_outline() {
        let outline = merge_assembly(&default_assembly(), 0.0, 0.0, &GeoKernel).unwrap();

        assert!(outline.points.len() > 3);
        // More area than the bare shuttle, less than the bounding box
        assert!(outline.area > 84.0);
        assert!(outline.area < 80.0 * 20.0);
        assert!((outline.pre_fillet_area - outline.area).abs() < 1e-9);
    }

    #[test]
    fn merge_is_idempotent() {
        let assembly = default_assembly();
        let first = merge_assembly(&assembly, 0.1, 0.2, &GeoKernel).unwrap();
        let second = merge_assembly(&assembly, 0.1, 0.2, &GeoKernel).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn gussets_add_material_at_the_junctions() {
        let assembly = default_assembly();
        let bare = merge_assembly(&assembly, 0.0, 0.0, &GeoKernel).unwrap();
        let gusseted = merge_assembly(&assembly, 0.0, 0.4, &GeoKernel).unwrap();
        assert!(gusseted.area > bare.area);
    }

    #[test]
    fn fillet_preserves_area_within_tolerance() {
        let assembly = default_assembly();
        let outline = merge_assembly(&assembly, 0.1, 0.0, &GeoKernel).unwrap();

        let drift = (outline.area - outline.pre_fillet_area).abs() / outline.pre_fillet_area;
        assert!(drift < FILLET_AREA_TOLERANCE);
    }

    #[test]
    fn disconnected_assembly_is_rejected() {
        // Beams far above/below a small shuttle never touch it
        let spec = FullSpringSpec {
            beam_spacing: 100.0,
            ..FullSpringSpec::default()
        };
        let assembly = spring_assembly(
            &spec,
            &AnchorSpec::default(),
            &LayerConfig::default(),
            400,
        )
        .unwrap();

        match merge_assembly(&assembly, 0.0, 0.0, &GeoKernel) {
            Err(SpringError::NonManifoldPolygon(msg)) => assert!(msg.contains("disjoint")),
            other => panic!("expected NonManifoldPolygon error, got {:?}", other),
        }
    }

    #[test]
    fn negative_fillet_is_a_caller_mistake() {
        assert!(matches!(
            merge_assembly(&default_assembly(), -0.1, 0.0, &GeoKernel),
            Err(SpringError::Geometry(_))
        ));
    }
}
