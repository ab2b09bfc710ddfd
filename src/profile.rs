use std::f64::consts::PI;

use crate::{
    datatypes::{BeamSpec, Centerline, Vertex, WidthProfile},
    error::SpringError,
};

/// Checks a beam spec before any curve is built
///
/// # Arguments
/// * `spec` - The beam spec to validate
///
/// # Returns
/// An error naming the offending field and value, if any
pub fn validate(spec: &BeamSpec) -> Result<(), SpringError> {
    if !(spec.flex_ratio > 0.0 && spec.flex_ratio < 1.0) {
        return Err(SpringError::Geometry(format!(
            "flex_ratio must be in (0, 1); got {}",
            spec.flex_ratio
        )));
    }
    if spec.half_span <= 0.0 {
        return Err(SpringError::Geometry(format!(
            "half_span must be positive; got {}",
            spec.half_span
        )));
    }
    if spec.initial_offset < 0.0 {
        return Err(SpringError::Geometry(format!(
            "initial_offset must be non-negative; got {}",
            spec.initial_offset
        )));
    }
    if spec.flex_width <= 0.0 {
        return Err(SpringError::Geometry(format!(
            "flex_width must be positive; got {}",
            spec.flex_width
        )));
    }
    if spec.rigid_width <= 0.0 {
        return Err(SpringError::Geometry(format!(
            "rigid_width must be positive; got {}",
            spec.rigid_width
        )));
    }
    if spec.taper_length < 0.0 {
        return Err(SpringError::Geometry(format!(
            "taper_length must be non-negative; got {}",
            spec.taper_length
        )));
    }
    if spec.thickness <= 0.0 {
        return Err(SpringError::Geometry(format!(
            "thickness must be positive; got {}",
            spec.thickness
        )));
    }

    Ok(())
}

/// Cosine amplitude of the flex section, solved in closed form from the C1
/// matching condition at the flex-rigid junction:
///
///   A = initial_offset / (1 + pi * Lr / (2 * Lf))
pub fn amplitude(spec: &BeamSpec) -> f64 {
    spec.initial_offset / (1.0 + PI * spec.rigid_length() / (2.0 * spec.flex_length()))
}

/// Slope shared by the flex section end and the rigid straight section
pub fn junction_slope(spec: &BeamSpec) -> f64 {
    amplitude(spec) * PI / (2.0 * spec.flex_length())
}

/// Half-beam centerline height at x; cosine rise over the flex section,
/// straight rigid continuation to (half_span, initial_offset)
pub fn half_y(spec: &BeamSpec, x: f64) -> f64 {
    let l_flex = spec.flex_length();
    let a = amplitude(spec);

    if x <= l_flex {
        a * (1.0 - f64::cos(PI * x / (2.0 * l_flex)))
    } else {
        a + junction_slope(spec) * (x - l_flex)
    }
}

/// Half-beam centerline slope dy/dx at x
pub fn half_slope(spec: &BeamSpec, x: f64) -> f64 {
    let l_flex = spec.flex_length();

    if x <= l_flex {
        amplitude(spec) * PI / (2.0 * l_flex) * f64::sin(PI * x / (2.0 * l_flex))
    } else {
        junction_slope(spec)
    }
}

/// Full-beam centerline height: the half profile mirrored about the span
/// midpoint, spanning [0, 2 * half_span]
pub fn full_y(spec: &BeamSpec, x: f64) -> f64 {
    if x <= spec.half_span {
        half_y(spec, x)
    } else {
        half_y(spec, 2.0 * spec.half_span - x)
    }
}

/// Full-beam centerline slope dy/dx at x
pub fn full_slope(spec: &BeamSpec, x: f64) -> f64 {
    if x <= spec.half_span {
        half_slope(spec, x)
    } else {
        -half_slope(spec, 2.0 * spec.half_span - x)
    }
}

/// Samples the half-beam centerline from the anchor at (0, 0) to the
/// shuttle end at (half_span, initial_offset)
///
/// # Arguments
/// * `spec` - The beam spec
/// * `n_samples` - Total sample count; split evenly across the two sections
///
/// # Returns
/// A Centerline with monotonically increasing x
pub fn half_centerline(spec: &BeamSpec, n_samples: usize) -> Result<Centerline, SpringError> {
    validate(spec)?;

    let l_flex = spec.flex_length();
    let l_rigid = spec.rigid_length();
    let n_sec = usize::max(n_samples / 2, 2);

    let mut points: Vec<Vertex> = Vec::with_capacity(2 * n_sec + 1);

    // Flex section, endpoint excluded
    for i in 0..n_sec {
        let x = l_flex * i as f64 / n_sec as f64;
        points.push(Vertex {
            x,
            y: half_y(spec, x),
        });
    }

    // Rigid section, endpoint included
    for i in 0..=n_sec {
        let x = l_flex + l_rigid * i as f64 / n_sec as f64;
        points.push(Vertex {
            x,
            y: half_y(spec, x),
        });
    }

    Ok(Centerline { points })
}

/// Samples the symmetric full beam (flex-rigid-rigid-flex) over
/// [0, 2 * half_span]. Both outer endpoints sit at y=0 with zero slope.
pub fn full_centerline(spec: &BeamSpec, n_samples: usize) -> Result<Centerline, SpringError> {
    validate(spec)?;

    let span = 2.0 * spec.half_span;
    let l_flex = spec.flex_length();
    let n_sec = usize::max(n_samples / 4, 2);

    let mut points: Vec<Vertex> = Vec::with_capacity(4 * n_sec + 1);

    let sections = [
        (0.0, l_flex),
        (l_flex, spec.half_span),
        (spec.half_span, span - l_flex),
        (span - l_flex, span),
    ];

    for (s, &(x0, x1)) in sections.iter().enumerate() {
        let last_section = s == sections.len() - 1;
        let end = if last_section { n_sec + 1 } else { n_sec };
        for i in 0..end {
            let x = x0 + (x1 - x0) * i as f64 / n_sec as f64;
            points.push(Vertex {
                x,
                y: full_y(spec, x),
            });
        }
    }

    Ok(Centerline { points })
}

fn taper_width(w_from: f64, w_to: f64, t: f64) -> f64 {
    w_from + (w_to - w_from) * 0.5 * (1.0 - f64::cos(PI * t))
}

/// Beam width at each x sample for a half-beam: flex_width over the flex
/// section, rigid_width over the rigid section, cosine-interpolated across
/// taper_length centered on the flex-rigid junction
///
/// # Arguments
/// * `xs` - The x positions to evaluate, typically from a Centerline
/// * `spec` - The beam spec
pub fn half_width_profile(xs: &[f64], spec: &BeamSpec) -> WidthProfile {
    if spec.taper_length == 0.0 {
        println!("warning [profile]: taper_length=0 produces a step width transition");
    }

    let junction = spec.flex_length();
    let widths = xs
        .iter()
        .map(|&x| width_at(x, junction, spec.flex_width, spec.rigid_width, spec.taper_length))
        .collect();

    WidthProfile { widths }
}

/// Width profile for the symmetric full beam: flex at both ends, rigid in
/// the middle, with tapers centered on both junctions
pub fn full_width_profile(xs: &[f64], spec: &BeamSpec) -> WidthProfile {
    if spec.taper_length == 0.0 {
        println!("warning [profile]: taper_length=0 produces a step width transition");
    }

    let span = 2.0 * spec.half_span;
    let junction = spec.flex_length();

    // The right half mirrors the left, junctions at l_flex and span - l_flex
    let widths = xs
        .iter()
        .map(|&x| {
            let x_mirrored = if x <= span / 2.0 { x } else { span - x };
            width_at(x_mirrored, junction, spec.flex_width, spec.rigid_width, spec.taper_length)
        })
        .collect();

    WidthProfile { widths }
}

/// Width of a flex-to-rigid transition at x, junction at `junction`, with
/// the flex side at x below the junction
fn width_at(x: f64, junction: f64, flex_width: f64, rigid_width: f64, taper_length: f64) -> f64 {
    if taper_length == 0.0 {
        return if x <= junction { flex_width } else { rigid_width };
    }

    let t_start = junction - taper_length / 2.0;
    let t_end = junction + taper_length / 2.0;

    if x <= t_start {
        flex_width
    } else if x >= t_end {
        rigid_width
    } else {
        taper_width(flex_width, rigid_width, (x - t_start) / taper_length)
    }
}
