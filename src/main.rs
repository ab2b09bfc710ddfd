use std::time::Duration;

use clap::{Parser, Subcommand};

use snapspring::{
    analytic, classifier,
    datatypes::{AnchorSpec, LayerConfig},
    error::SpringError,
    input, memo,
    merge::GeoKernel,
    mesher::{self, ExtrusionPlan, GmshMesher, VolumeMesher},
    post_processor, sweep,
};

#[derive(Parser)]
#[command(
    name = "snapspring",
    about = "Bistable CCS spring geometry engine and verification pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the merged spring outline and write it as CSV
    Outline {
        /// Input json with the spring parameters
        input: String,
        #[arg(long, default_value = "outline.csv")]
        output: String,
        #[arg(long, default_value_t = 400)]
        n_samples: usize,
    },
    /// Mesh the spring (or an imported outline) and tag boundary nodes
    Mesh {
        /// Input json with the spring and mesh parameters
        input: String,
        /// Optional svg or csv outline to mesh instead of the parametric
        /// spring geometry
        #[arg(long)]
        geometry: Option<String>,
        #[arg(long, default_value = "nodes.csv")]
        nodes: String,
        #[arg(long, default_value = "elements.csv")]
        elements: String,
        #[arg(long, default_value_t = 400)]
        n_samples: usize,
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },
    /// Sample the closed-form force-displacement relation for one Q
    Analytic {
        #[arg(long)]
        q: f64,
        #[arg(long, default_value_t = 0.0)]
        delta_min: f64,
        #[arg(long, default_value_t = 2.0)]
        delta_max: f64,
        #[arg(long, default_value_t = 400)]
        steps: usize,
        #[arg(long, default_value = "force_displacement.csv")]
        output: String,
    },
    /// Sweep the analytical model over a Q range
    Sweep {
        #[arg(long)]
        q_min: f64,
        #[arg(long)]
        q_max: f64,
        #[arg(long, default_value_t = 50)]
        steps: usize,
        #[arg(long, default_value = "q_sweep.csv")]
        output: String,
    },
}

fn run(cli: Cli) -> Result<(), SpringError> {
    match cli.command {
        Command::Outline {
            input,
            output,
            n_samples,
        } => {
            let input_json = input::load_input_file(&input)?;
            let spec = input::parse_spring_spec(&input_json)?;
            let merge_settings = input::parse_merge_settings(&input_json)?;

            let outline = memo::merged_outline(
                &spec,
                &AnchorSpec::default(),
                &LayerConfig::default(),
                merge_settings.fillet_radius,
                merge_settings.junction_widening,
                n_samples,
                &GeoKernel,
            )?;

            println!(
                "info: merged outline area {:.3} um^2 on layer ({}, {})",
                outline.area, outline.layer.0, outline.layer.1
            );
            let q = spec.q();
            println!(
                "info: Q = {:.3} ({})",
                q,
                if analytic::is_bistable(q) {
                    "bistable"
                } else {
                    "not bistable"
                }
            );

            post_processor::outline_csv(&outline, &output)
        }
        Command::Mesh {
            input,
            geometry,
            nodes,
            elements,
            n_samples,
            timeout_secs,
        } => {
            let input_json = input::load_input_file(&input)?;
            let spec = input::parse_spring_spec(&input_json)?;
            let merge_settings = input::parse_merge_settings(&input_json)?;
            let mesh_settings = input::parse_mesh_settings(&input_json)?;

            let gmsh = GmshMesher {
                timeout: Duration::from_secs(timeout_secs),
                ..GmshMesher::default()
            };

            let mesh = match geometry {
                Some(geometry_file) => {
                    // Imported outlines carry no parametric flex zones;
                    // the whole boundary gets the fine element size
                    let loops = if geometry_file.ends_with(".svg") {
                        input::parse_svg(&geometry_file, mesh_settings.lc_flex / 2.0)?
                    } else if geometry_file.ends_with(".csv") {
                        vec![input::parse_csv(&geometry_file)?]
                    } else {
                        return Err(SpringError::Input(format!(
                            "Unrecognized geometry filetype {geometry_file}"
                        )));
                    };

                    let plan = ExtrusionPlan::uniform(
                        &loops[0],
                        &loops[1..],
                        mesh_settings.lc_flex,
                        spec.thickness,
                        mesh_settings.n_layers_z,
                        mesh_settings.order,
                    );
                    gmsh.mesh_extruded(&plan)?
                }
                None => {
                    let outline = memo::merged_outline(
                        &spec,
                        &AnchorSpec::default(),
                        &LayerConfig::default(),
                        merge_settings.fillet_radius,
                        merge_settings.junction_widening,
                        n_samples,
                        &GeoKernel,
                    )?;

                    mesher::extrude_mesh(&outline, &spec, &mesh_settings, &gmsh)?
                }
            };

            let boundary = classifier::classify_nodes(&mesh.nodes, &spec, mesh_settings.bc_tol);
            println!(
                "info: tagged {} left anchor, {} right anchor, {} shuttle, {} junction nodes",
                boundary.left_anchor.len(),
                boundary.right_anchor.len(),
                boundary.shuttle.len(),
                boundary.junction.len()
            );

            post_processor::mesh_csv(&mesh, &boundary, &nodes, &elements)
        }
        Command::Analytic {
            q,
            delta_min,
            delta_max,
            steps,
            output,
        } => {
            let deltas = sweep::linspace(delta_min, delta_max, steps);
            let curve = analytic::force_displacement(&deltas, q);

            if curve.is_out_of_domain() {
                println!(
                    "warning [analytic]: Q={} is below the real-root threshold {:.4}; curve is NaN",
                    q,
                    analytic::q_real_root_threshold()
                );
            } else if let Some(snap) = analytic::switching_forces(q) {
                println!(
                    "info: f_top {:.2} at d {:.3}, f_bot {:.2} at d {:.3}, ratio {:.3}",
                    snap.f_top,
                    snap.d_top,
                    snap.f_bot,
                    snap.d_bot,
                    snap.force_ratio()
                );
            }

            post_processor::curve_csv(&curve, &output)
        }
        Command::Sweep {
            q_min,
            q_max,
            steps,
            output,
        } => {
            let records = sweep::sweep_q(&sweep::linspace(q_min, q_max, steps));
            post_processor::q_sweep_csv(&records, &output)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        println!("error: {err}");
        std::process::exit(1)
    }
}
