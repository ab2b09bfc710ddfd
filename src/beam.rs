use nalgebra::{Affine2, Matrix3};

use crate::{
    datatypes::{
        AnchorSpec, BeamPolygon, BeamSpec, FullSpringSpec, LayerConfig, MemberRole, PlacedPolygon,
        SpringAssembly, Vertex,
    },
    error::SpringError,
    profile,
};

/// Axis-aligned placement: optional x mirror followed by a translation
fn place(mirror_x: bool, tx: f64, ty: f64) -> Affine2<f64> {
    let sx = if mirror_x { -1.0 } else { 1.0 };
    Affine2::from_matrix_unchecked(Matrix3::new(sx, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0))
}

/// Rectangle template centered at the origin
fn rectangle(width: f64, height: f64) -> Vec<Vertex> {
    vec![
        Vertex {
            x: -width / 2.0,
            y: -height / 2.0,
        },
        Vertex {
            x: width / 2.0,
            y: -height / 2.0,
        },
        Vertex {
            x: width / 2.0,
            y: height / 2.0,
        },
        Vertex {
            x: -width / 2.0,
            y: height / 2.0,
        },
    ]
}

/// Ensures the sampling resolves the width taper. The coarsest section
/// spacing has to land at least 4 samples inside the taper zone.
fn check_taper_resolution(
    spec: &BeamSpec,
    n_sec: usize,
    n_samples: usize,
) -> Result<(), SpringError> {
    if spec.taper_length == 0.0 {
        return Ok(());
    }

    let dx = f64::max(spec.flex_length(), spec.rigid_length()) / n_sec as f64;

    if spec.taper_length / dx < 4.0 {
        return Err(SpringError::Geometry(format!(
            "n_samples={} resolves the taper with fewer than 4 samples \
            (sample spacing {:.3} um, taper_length {:.3} um)",
            n_samples, dx, spec.taper_length
        )));
    }

    Ok(())
}

/// Builds the closed outline of a single CCS half-beam: upper edge
/// (x, y + w/2) left-to-right, then the lower edge (x, y - w/2) reversed
///
/// # Arguments
/// * `spec` - The beam spec
/// * `n_samples` - Centerline sample count
///
/// # Returns
/// A simple closed BeamPolygon
pub fn beam_polygon(spec: &BeamSpec, n_samples: usize) -> Result<BeamPolygon, SpringError> {
    profile::validate(spec)?;
    check_taper_resolution(spec, usize::max(n_samples / 2, 2), n_samples)?;

    let centerline = profile::half_centerline(spec, n_samples)?;
    let widths = profile::half_width_profile(&centerline.xs(), spec);

    Ok(outline_from(&centerline.points, &widths.widths))
}

/// Closed outline of the symmetric full beam over [0, 2 * half_span]
pub fn full_beam_polygon(spec: &BeamSpec, n_samples: usize) -> Result<BeamPolygon, SpringError> {
    profile::validate(spec)?;
    check_taper_resolution(spec, usize::max(n_samples / 4, 2), n_samples)?;

    let centerline = profile::full_centerline(spec, n_samples)?;
    let widths = profile::full_width_profile(&centerline.xs(), spec);

    Ok(outline_from(&centerline.points, &widths.widths))
}

fn outline_from(centerline: &[Vertex], widths: &[f64]) -> BeamPolygon {
    let mut points: Vec<Vertex> = Vec::with_capacity(2 * centerline.len());

    for (p, w) in centerline.iter().zip(widths) {
        points.push(Vertex {
            x: p.x,
            y: p.y + w / 2.0,
        });
    }
    for (p, w) in centerline.iter().zip(widths).rev() {
        points.push(Vertex {
            x: p.x,
            y: p.y - w / 2.0,
        });
    }

    BeamPolygon { points }
}

/// Assembles the complete spring mechanism: 4 half-beam placements, the
/// shuttle rectangle, and two multi-layer anchor blocks. Each member is a
/// (template, transform) pair evaluated independently; no placement mutates
/// shared geometry.
///
/// Left beams anchor at x=0 unmirrored; right beams are x-mirrored and
/// translated to anchor at x=anchor_distance. Upper/lower beams sit at
/// y = +/- beam_spacing/2.
///
/// # Arguments
/// * `spec` - The full-spring spec
/// * `anchor` - Anchor block dimensions
/// * `layers` - Layer configuration for structural/cap/base polygons
/// * `n_samples` - Centerline sample count per half-beam
pub fn spring_assembly(
    spec: &FullSpringSpec,
    anchor: &AnchorSpec,
    layers: &LayerConfig,
    n_samples: usize,
) -> Result<SpringAssembly, SpringError> {
    let template = beam_polygon(&spec.beam_spec(), n_samples)?;
    let half_sp = spec.beam_spacing / 2.0;

    let mut members: Vec<PlacedPolygon> = Vec::new();

    for (mirror_x, sign_y) in [(false, 1.0), (false, -1.0), (true, 1.0), (true, -1.0)] {
        let tx = if mirror_x { spec.anchor_distance } else { 0.0 };
        members.push(PlacedPolygon {
            polygon: template.points.clone(),
            transform: place(mirror_x, tx, sign_y * half_sp),
            layer: layers.structural,
            role: MemberRole::Beam,
        });
    }

    // Shuttle centered between the shuttle faces, y-centered where the
    // beam ends meet
    members.push(PlacedPolygon {
        polygon: rectangle(spec.shuttle_length, spec.shuttle_height),
        transform: place(false, spec.anchor_distance / 2.0, spec.initial_offset),
        layer: layers.structural,
        role: MemberRole::Shuttle,
    });

    // Multi-layer anchor blocks centered on the outer anchor planes
    for x_center in [-anchor.gap, spec.anchor_distance + anchor.gap] {
        let anchor_transform = place(false, x_center, 0.0);

        members.push(PlacedPolygon {
            polygon: rectangle(anchor.length, anchor.width),
            transform: anchor_transform,
            layer: layers.structural,
            role: MemberRole::Anchor,
        });
        members.push(PlacedPolygon {
            polygon: rectangle(
                anchor.length + 2.0 * anchor.over_top,
                anchor.width + 2.0 * anchor.over_top,
            ),
            transform: anchor_transform,
            layer: layers.top,
            role: MemberRole::Anchor,
        });
        members.push(PlacedPolygon {
            polygon: rectangle(
                anchor.length + 2.0 * anchor.over_bottom,
                anchor.width + 2.0 * anchor.over_bottom,
            ),
            transform: anchor_transform,
            layer: layers.base,
            role: MemberRole::Anchor,
        });
    }

    Ok(SpringAssembly {
        members,
        spec: *spec,
    })
}

/// Spring pair built directly from a half-beam spec: the anchor distance is
/// derived from the beam span and the default shuttle, and `anchor_gap`
/// shifts the anchor blocks outward from the anchor planes
pub fn spring_pair(
    beam: &BeamSpec,
    beam_spacing: f64,
    anchor_gap: f64,
    n_samples: usize,
    layers: &LayerConfig,
) -> Result<SpringAssembly, SpringError> {
    let defaults = FullSpringSpec::default();
    let spec = FullSpringSpec {
        anchor_distance: 2.0 * beam.half_span + defaults.shuttle_length,
        beam_spacing,
        shuttle_length: defaults.shuttle_length,
        shuttle_height: defaults.shuttle_height,
        flex_ratio: beam.flex_ratio,
        flex_width: beam.flex_width,
        rigid_width: beam.rigid_width,
        initial_offset: beam.initial_offset,
        taper_length: beam.taper_length,
        thickness: beam.thickness,
    };
    let anchor = AnchorSpec {
        gap: anchor_gap,
        ..AnchorSpec::default()
    };

    spring_assembly(&spec, &anchor, layers, n_samples)
}
