use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::{
    analytic::{self, SwitchingForces},
    beam::spring_assembly,
    datatypes::{AnchorSpec, FullSpringSpec, LayerConfig},
    error::SpringError,
    merge::{merge_assembly, GeoKernel},
};

/// Analytical result for one Q sample of a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QSweepRecord {
    pub q: f64,
    pub bistable: bool,
    pub snap: Option<SwitchingForces>,
}

/// Evaluates the analytical model over a set of Q values. Every sample is
/// an independent task; the sweep runs on the rayon worker pool with no
/// shared mutable state.
///
/// # Arguments
/// * `q_values` - The Q samples to evaluate
///
/// # Returns
/// One record per Q, in input order
pub fn sweep_q(q_values: &[f64]) -> Vec<QSweepRecord> {
    println!("info: sweeping {} Q values...", q_values.len());
    let bar = ProgressBar::new(q_values.len() as u64);

    let records: Vec<QSweepRecord> = q_values
        .par_iter()
        .map(|&q| {
            let record = QSweepRecord {
                q,
                bistable: analytic::is_bistable(q),
                snap: analytic::switching_forces(q),
            };
            bar.inc(1);
            record
        })
        .collect();

    bar.finish();
    records
}

/// Merged-outline result for one fillet radius of a sweep. A failed merge
/// is captured per task and never aborts the batch.
#[derive(Debug)]
pub struct FilletSweepRecord {
    pub fillet_radius: f64,
    pub outcome: Result<f64, SpringError>,
}

/// Merges the same assembly across a set of fillet radii, recording the
/// resulting outline area (or the per-task failure) for each
///
/// # Arguments
/// * `spec` - The full-spring spec
/// * `anchor` - Anchor block dimensions
/// * `layers` - Layer configuration
/// * `radii` - Fillet radii to sweep
/// * `junction_widening` - Gusset half-width applied to every task
/// * `n_samples` - Centerline sample count
pub fn sweep_fillet(
    spec: &FullSpringSpec,
    anchor: &AnchorSpec,
    layers: &LayerConfig,
    radii: &[f64],
    junction_widening: f64,
    n_samples: usize,
) -> Result<Vec<FilletSweepRecord>, SpringError> {
    // The assembly is shared read-only; each task merges independently
    let assembly = spring_assembly(spec, anchor, layers, n_samples)?;

    println!("info: sweeping {} fillet radii...", radii.len());
    let bar = ProgressBar::new(radii.len() as u64);

    let records: Vec<FilletSweepRecord> = radii
        .par_iter()
        .map(|&fillet_radius| {
            let outcome = merge_assembly(&assembly, fillet_radius, junction_widening, &GeoKernel)
                .map(|outline| outline.area);
            bar.inc(1);
            FilletSweepRecord {
                fillet_radius,
                outcome,
            }
        })
        .collect();

    bar.finish();
    Ok(records)
}

/// Evenly spaced sample values, endpoints included
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    if steps < 2 {
        return vec![start];
    }
    (0..steps)
        .map(|i| start + (end - start) * i as f64 / (steps - 1) as f64)
        .collect()
}
