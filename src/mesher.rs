use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use nalgebra::Matrix3;

use crate::{
    datatypes::{
        Element, ElementOrder, FullSpringSpec, MergedOutline, Mesh, MeshSettings, Point3, Vertex,
    },
    error::SpringError,
};

/// Margin added to the flex-zone x extent when grading element size (um)
const FLEX_ZONE_MARGIN: f64 = 1.0;

/// Gmsh element type codes for 4-node and 10-node tetrahedra
const GMSH_TET4: usize = 4;
const GMSH_TET10: usize = 11;

/// One planar outline vertex with its target element size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedVertex {
    pub vertex: Vertex,
    pub lc: f64,
}

/// Fully resolved input to the volumetric mesher: sized outline loops plus
/// the extrusion parameters. Building the plan is deterministic; two equal
/// specs produce identical plans.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrusionPlan {
    pub outer: Vec<PlannedVertex>,
    pub holes: Vec<Vec<PlannedVertex>>,
    pub thickness: f64,
    pub n_layers_z: usize,
    pub order: ElementOrder,
}

impl ExtrusionPlan {
    /// Plan with a single characteristic length everywhere, for outlines
    /// that did not come from a parametric spec
    pub fn uniform(
        outer: &[Vertex],
        holes: &[Vec<Vertex>],
        lc: f64,
        thickness: f64,
        n_layers_z: usize,
        order: ElementOrder,
    ) -> ExtrusionPlan {
        let size = |loop_: &[Vertex]| {
            loop_
                .iter()
                .map(|&vertex| PlannedVertex { vertex, lc })
                .collect::<Vec<PlannedVertex>>()
        };

        ExtrusionPlan {
            outer: size(outer),
            holes: holes.iter().map(|h| size(h)).collect(),
            thickness,
            n_layers_z,
            order,
        }
    }
}

/// Capability interface over the external volumetric mesh kernel
pub trait VolumeMesher {
    fn mesh_extruded(&self, plan: &ExtrusionPlan) -> Result<Mesh, SpringError>;
}

/// Builds the extrusion plan for a merged spring outline: lc_flex near the
/// flex/taper zones (identified by x-proximity to the anchor planes and
/// shuttle faces), lc_rigid elsewhere
///
/// # Arguments
/// * `outline` - The merged 2D outline
/// * `spec` - The spec the outline was generated from
/// * `settings` - Mesh settings (characteristic lengths, layers, order)
pub fn extrusion_plan(
    outline: &MergedOutline,
    spec: &FullSpringSpec,
    settings: &MeshSettings,
) -> ExtrusionPlan {
    let l_flex = spec.flex_ratio * spec.half_span();
    let sx0 = spec.shuttle_x0();
    let sx1 = spec.shuttle_x1();
    let reach = l_flex + FLEX_ZONE_MARGIN;

    let outer = outline
        .points
        .iter()
        .map(|&vertex| {
            let x = vertex.x;
            let in_flex = x < reach
                || (x - sx0).abs() < reach
                || (x - sx1).abs() < reach
                || x > spec.anchor_distance - reach;

            PlannedVertex {
                vertex,
                lc: if in_flex {
                    settings.lc_flex
                } else {
                    settings.lc_rigid
                },
            }
        })
        .collect();

    ExtrusionPlan {
        outer,
        holes: Vec::new(),
        thickness: spec.thickness,
        n_layers_z: settings.n_layers_z,
        order: settings.order,
    }
}

/// Extrudes a merged outline through the structural thickness into a
/// validated tetrahedral mesh
///
/// # Arguments
/// * `outline` - The merged 2D outline
/// * `spec` - The spec the outline was generated from
/// * `settings` - Mesh settings
/// * `mesher` - The volumetric mesh kernel
///
/// # Returns
/// A mesh with at least one non-degenerate tetrahedron, its element order
/// reported alongside
pub fn extrude_mesh(
    outline: &MergedOutline,
    spec: &FullSpringSpec,
    settings: &MeshSettings,
    mesher: &dyn VolumeMesher,
) -> Result<Mesh, SpringError> {
    if settings.lc_flex <= 0.0 || settings.lc_rigid <= 0.0 {
        return Err(SpringError::Geometry(format!(
            "characteristic lengths must be positive; got lc_flex={}, lc_rigid={}",
            settings.lc_flex, settings.lc_rigid
        )));
    }
    if settings.n_layers_z == 0 {
        return Err(SpringError::Geometry(
            "n_layers_z must be at least 1; got 0".to_owned(),
        ));
    }

    let plan = extrusion_plan(outline, spec, settings);
    let mesh = mesher.mesh_extruded(&plan)?;
    validate_mesh(&mesh, &plan, settings, spec.flex_width)?;

    println!(
        "info: meshed outline into {} nodes and {} tetrahedra",
        mesh.nodes.len(),
        mesh.elements.len()
    );

    Ok(mesh)
}

/// Signed volume of the tetrahedron spanned by an element's corner nodes
fn tet_volume(element: &Element, nodes: &[Point3]) -> f64 {
    let a = nodes[element.nodes[0]];
    let b = nodes[element.nodes[1]];
    let c = nodes[element.nodes[2]];
    let d = nodes[element.nodes[3]];

    let m = Matrix3::new(
        b.x - a.x,
        c.x - a.x,
        d.x - a.x,
        b.y - a.y,
        c.y - a.y,
        d.y - a.y,
        b.z - a.z,
        c.z - a.z,
        d.z - a.z,
    );

    m.determinant() / 6.0
}

fn validate_mesh(
    mesh: &Mesh,
    plan: &ExtrusionPlan,
    settings: &MeshSettings,
    min_feature_width: f64,
) -> Result<(), SpringError> {
    let diagnosis = format!(
        "lc_flex={:.3}, lc_rigid={:.3}, minimum feature width={:.3}",
        settings.lc_flex, settings.lc_rigid, min_feature_width
    );

    if mesh.elements.is_empty() {
        return Err(SpringError::MeshGeneration(format!(
            "mesher produced zero tetrahedra ({})",
            diagnosis
        )));
    }

    if mesh.order != plan.order {
        return Err(SpringError::MeshGeneration(format!(
            "requested {:?} elements but the mesher produced {:?}",
            plan.order, mesh.order
        )));
    }

    let nodes_per_element = mesh.order.nodes_per_element();
    for (i, element) in mesh.elements.iter().enumerate() {
        if element.nodes.len() != nodes_per_element {
            return Err(SpringError::MeshGeneration(format!(
                "element {} has {} nodes, expected {} for {:?} order",
                i,
                element.nodes.len(),
                nodes_per_element,
                mesh.order
            )));
        }

        if tet_volume(element, &mesh.nodes).abs() < 1e-12 {
            return Err(SpringError::MeshGeneration(format!(
                "element {} is degenerate (zero volume; {})",
                i, diagnosis
            )));
        }
    }

    let z_tol = 1e-6;
    for (i, node) in mesh.nodes.iter().enumerate() {
        if node.z < -z_tol || node.z > plan.thickness + z_tol {
            return Err(SpringError::MeshGeneration(format!(
                "node {} at z={} lies outside the extrusion range [0, {}]",
                i, node.z, plan.thickness
            )));
        }
    }

    Ok(())
}

/// Drives the external Gmsh binary through a generated .geo file, one
/// scoped session per invocation: the temp files are created, meshed,
/// parsed, and removed on every exit path
pub struct GmshMesher {
    pub binary: String,
    pub timeout: Duration,
}

impl Default for GmshMesher {
    fn default() -> GmshMesher {
        GmshMesher {
            binary: "gmsh".to_owned(),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Removes its files when the meshing session ends, success or not
struct ScopedFiles(Vec<PathBuf>);

impl Drop for ScopedFiles {
    fn drop(&mut self) {
        for path in &self.0 {
            let _ = std::fs::remove_file(path);
        }
    }
}

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

impl VolumeMesher for GmshMesher {
    fn mesh_extruded(&self, plan: &ExtrusionPlan) -> Result<Mesh, SpringError> {
        if plan.outer.len() < 3 {
            return Err(SpringError::MeshGeneration(format!(
                "outline has {} vertices; at least 3 required",
                plan.outer.len()
            )));
        }

        let session = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        let stem = format!("snapspring_{}_{}", std::process::id(), session);
        let geo_path = std::env::temp_dir().join(format!("{stem}.geo"));
        let msh_path = std::env::temp_dir().join(format!("{stem}.msh"));
        let _guard = ScopedFiles(vec![geo_path.clone(), msh_path.clone()]);

        build_geo(plan, &geo_path)?;

        println!(
            "info: running gmsh on {} outline points ({} z-layers)...",
            plan.outer.len(),
            plan.n_layers_z
        );
        self.run_gmsh(&geo_path, &msh_path)?;

        parse_msh(&msh_path)
    }
}

impl GmshMesher {
    fn run_gmsh(&self, geo_path: &Path, msh_path: &Path) -> Result<(), SpringError> {
        let mut child = match std::process::Command::new(&self.binary)
            .arg(geo_path)
            .arg("-3")
            .arg("-o")
            .arg(msh_path)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                return Err(SpringError::MeshGeneration(format!(
                    "gmsh failed to start: {err}"
                )));
            }
        };

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        return Err(SpringError::MeshGeneration(format!(
                            "gmsh exited with {status}"
                        )));
                    }
                    return Ok(());
                }
                Ok(None) => {
                    if Instant::now() > deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(SpringError::MeshGeneration(format!(
                            "gmsh timed out after {:?}",
                            self.timeout
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(err) => {
                    return Err(SpringError::MeshGeneration(format!(
                        "failed waiting for gmsh: {err}"
                    )));
                }
            }
        }
    }
}

/// Builds the .geo script: sized points, connected loops, a plane surface,
/// and a layered extrusion through the thickness
fn build_geo(plan: &ExtrusionPlan, output_file: &Path) -> Result<(), SpringError> {
    let mut geo = String::new();
    let mut point_id: usize = 1;
    let mut line_id: usize = 1;

    let loops: Vec<&Vec<PlannedVertex>> =
        std::iter::once(&plan.outer).chain(plan.holes.iter()).collect();

    let mut loop_ids: Vec<usize> = Vec::with_capacity(loops.len());

    for (li, loop_points) in loops.iter().enumerate() {
        geo.push_str(&format!("// Points for loop {}\n", li + 1));
        let first_point = point_id;
        for p in loop_points.iter() {
            geo.push_str(&format!(
                "Point({}) = {{ {}, {}, 0, {} }};\n",
                point_id, p.vertex.x, p.vertex.y, p.lc
            ));
            point_id += 1;
        }

        geo.push_str(&format!("\n// Connections for loop {}\n", li + 1));
        let first_line = line_id;
        for i in 0..loop_points.len() {
            let a = first_point + i;
            let b = first_point + (i + 1) % loop_points.len();
            geo.push_str(&format!("Line({}) = {{ {}, {} }};\n", line_id, a, b));
            line_id += 1;
        }

        let loop_id = li + 1;
        geo.push_str(&format!("Line Loop({}) = {{", loop_id));
        for (i, line) in (first_line..line_id).enumerate() {
            geo.push_str(&format!("{}{}", if i != 0 { ", " } else { " " }, line));
        }
        geo.push_str(" };\n\n");
        loop_ids.push(loop_id);
    }

    geo.push_str("// Define surface\n");
    geo.push_str("Plane Surface(1) = {");
    for (i, loop_id) in loop_ids.iter().enumerate() {
        geo.push_str(&format!("{}{}", if i != 0 { ", " } else { " " }, loop_id));
    }
    geo.push_str(" };\n");

    geo.push_str(&format!(
        "\n// Define mesh settings\n\
        Mesh.ElementOrder = {order};\n\
        Mesh.Algorithm = 1;\n\
        Extrude {{0, 0, {thickness}}} {{ Surface{{1}}; Layers{{{layers}}}; }}\n\
        Mesh 3;\n",
        order = plan.order.as_number(),
        thickness = plan.thickness,
        layers = plan.n_layers_z,
    ));

    match std::fs::write(output_file, geo) {
        Ok(()) => Ok(()),
        Err(err) => Err(SpringError::MeshGeneration(format!(
            "failed to write .geo file: {err}"
        ))),
    }
}

enum MeshParseState {
    Nodes,
    Elements,
    Limbo,
}

fn parse_floats(line: &str) -> Result<Vec<f64>, SpringError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse().map_err(|_| {
                SpringError::MeshGeneration(format!("non-float value '{tok}' in mesh data"))
            })
        })
        .collect()
}

fn parse_ints(line: &str) -> Result<Vec<usize>, SpringError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse().map_err(|_| {
                SpringError::MeshGeneration(format!("non-int value '{tok}' in mesh data"))
            })
        })
        .collect()
}

/// Parses a Gmsh .msh (format 4.1) file into nodes and tetrahedra
fn parse_msh(mesh_file: &Path) -> Result<Mesh, SpringError> {
    let contents = match std::fs::read_to_string(mesh_file) {
        Ok(contents) => contents,
        Err(err) => {
            return Err(SpringError::MeshGeneration(format!(
                "unable to open auto-generated mesh file: {err}"
            )));
        }
    };

    let mut nodes: Vec<Point3> = Vec::new();
    let mut elements: Vec<Element> = Vec::new();
    let mut has_tet4 = false;
    let mut has_tet10 = false;

    let mut parser_state = MeshParseState::Limbo;
    let mut parsed_section_metadata = false;
    let mut lines = contents.lines();

    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }

        if line.starts_with("$End") {
            parser_state = MeshParseState::Limbo;
        }

        match parser_state {
            MeshParseState::Limbo => {
                parsed_section_metadata = false;

                if line.starts_with("$Nodes") {
                    parser_state = MeshParseState::Nodes;
                } else if line.starts_with("$Elements") {
                    parser_state = MeshParseState::Elements;
                }
                continue;
            }
            MeshParseState::Nodes => {
                if !parsed_section_metadata {
                    // numBlocks numNodes minTag maxTag
                    let meta = parse_ints(line)?;
                    if meta.len() < 2 {
                        return Err(SpringError::MeshGeneration(
                            "malformed $Nodes metadata".to_owned(),
                        ));
                    }
                    nodes = vec![
                        Point3 {
                            x: 0.0,
                            y: 0.0,
                            z: 0.0
                        };
                        meta[1]
                    ];
                    parsed_section_metadata = true;
                    continue;
                }

                // entityDim entityTag parametric numNodesInBlock
                let block = parse_ints(line)?;
                let num_local = *block.get(3).ok_or_else(|| {
                    SpringError::MeshGeneration("malformed node block header".to_owned())
                })?;

                let mut tags: Vec<usize> = Vec::with_capacity(num_local);
                for _ in 0..num_local {
                    let tag_line = lines.next().ok_or_else(|| {
                        SpringError::MeshGeneration("truncated node tag block".to_owned())
                    })?;
                    tags.push(parse_ints(tag_line)?[0]);
                }

                for tag in tags {
                    let coord_line = lines.next().ok_or_else(|| {
                        SpringError::MeshGeneration("truncated node coordinate block".to_owned())
                    })?;
                    let coords = parse_floats(coord_line)?;
                    if coords.len() < 3 {
                        return Err(SpringError::MeshGeneration(
                            "node with fewer than 3 coordinates".to_owned(),
                        ));
                    }

                    let index = tag - 1;
                    if index >= nodes.len() {
                        return Err(SpringError::MeshGeneration(format!(
                            "node tag {} exceeds declared node count {}",
                            tag,
                            nodes.len()
                        )));
                    }
                    nodes[index] = Point3 {
                        x: coords[0],
                        y: coords[1],
                        z: coords[2],
                    };
                }
            }
            MeshParseState::Elements => {
                if !parsed_section_metadata {
                    parsed_section_metadata = true;
                    continue;
                }

                // entityDim entityTag elementType numElementsInBlock
                let block = parse_ints(line)?;
                if block.len() < 4 {
                    return Err(SpringError::MeshGeneration(
                        "malformed element block header".to_owned(),
                    ));
                }
                let entity_dim = block[0];
                let element_type = block[2];
                let num_elements = block[3];

                for _ in 0..num_elements {
                    let element_line = lines.next().ok_or_else(|| {
                        SpringError::MeshGeneration("truncated element block".to_owned())
                    })?;

                    if entity_dim != 3 {
                        continue;
                    }

                    let node_count = match element_type {
                        GMSH_TET4 => {
                            has_tet4 = true;
                            4
                        }
                        GMSH_TET10 => {
                            has_tet10 = true;
                            10
                        }
                        _ => continue,
                    };

                    let data = parse_ints(element_line)?;
                    if data.len() < node_count + 1 {
                        return Err(SpringError::MeshGeneration(format!(
                            "element with {} node references, expected {}",
                            data.len().saturating_sub(1),
                            node_count
                        )));
                    }

                    elements.push(Element {
                        nodes: data[1..1 + node_count].iter().map(|n| n - 1).collect(),
                    });
                }
            }
        }
    }

    if has_tet4 && has_tet10 {
        return Err(SpringError::MeshGeneration(
            "mesh mixes first- and second-order tetrahedra".to_owned(),
        ));
    }

    let order = if has_tet10 {
        ElementOrder::Quadratic
    } else {
        ElementOrder::Linear
    };

    println!(
        "info: loaded {} nodes and {} tetrahedra",
        nodes.len(),
        elements.len()
    );

    Ok(Mesh {
        nodes,
        elements,
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::spring_assembly;
    use crate::datatypes::{AnchorSpec, LayerConfig};
    use crate::merge::{merge_assembly, GeoKernel};

    /// Stub kernel: meshes the plan's bounding box as 6 tetrahedra through
    /// the full thickness
    struct BoxMesher;

    impl VolumeMesher for BoxMesher {
        fn mesh_extruded(&self, plan: &ExtrusionPlan) -> Result<Mesh, SpringError> {
            let xs: Vec<f64> = plan.outer.iter().map(|p| p.vertex.x).collect();
            let ys: Vec<f64> = plan.outer.iter().map(|p| p.vertex.y).collect();
            let (x0, x1) = (
                xs.iter().cloned().fold(f64::INFINITY, f64::min),
                xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            );
            let (y0, y1) = (
                ys.iter().cloned().fold(f64::INFINITY, f64::min),
                ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            );

            let corners = [
                (x0, y0, 0.0),
                (x1, y0, 0.0),
                (x1, y1, 0.0),
                (x0, y1, 0.0),
                (x0, y0, plan.thickness),
                (x1, y0, plan.thickness),
                (x1, y1, plan.thickness),
                (x0, y1, plan.thickness),
            ];
            let nodes = corners
                .iter()
                .map(|&(x, y, z)| Point3 { x, y, z })
                .collect();

            let tets = [
                [0, 1, 2, 6],
                [0, 2, 3, 6],
                [0, 3, 7, 6],
                [0, 7, 4, 6],
                [0, 4, 5, 6],
                [0, 5, 1, 6],
            ];

            Ok(Mesh {
                nodes,
                elements: tets
                    .iter()
                    .map(|t| Element {
                        nodes: t.to_vec(),
                    })
                    .collect(),
                order: ElementOrder::Linear,
            })
        }
    }

    struct EmptyMesher;

    impl VolumeMesher for EmptyMesher {
        fn mesh_extruded(&self, _plan: &ExtrusionPlan) -> Result<Mesh, SpringError> {
            Ok(Mesh {
                nodes: Vec::new(),
                elements: Vec::new(),
                order: ElementOrder::Linear,
            })
        }
    }

    struct DegenerateMesher;

    impl VolumeMesher for DegenerateMesher {
        fn mesh_extruded(&self, _plan: &ExtrusionPlan) -> Result<Mesh, SpringError> {
            // All four corners in one plane
            let nodes = vec![
                Point3 {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                },
                Point3 {
                    x: 1.0,
                    y: 0.0,
                    z: 0.0,
                },
                Point3 {
                    x: 0.0,
                    y: 1.0,
                    z: 0.0,
                },
                Point3 {
                    x: 1.0,
                    y: 1.0,
                    z: 0.0,
                },
            ];
            Ok(Mesh {
                nodes,
                elements: vec![Element {
                    nodes: vec![0, 1, 2, 3],
                }],
                order: ElementOrder::Linear,
            })
        }
    }

    fn scenario_b_outline() -> (MergedOutline, FullSpringSpec) {
        let spec = FullSpringSpec::default();
        let assembly =
            spring_assembly(&spec, &AnchorSpec::default(), &LayerConfig::default(), 400).unwrap();
        let outline = merge_assembly(&assembly, 0.0, 0.0, &GeoKernel).unwrap();
        (outline, spec)
    }

    #[test]
    fn scenario_d_extrusion_contract() {
        let (outline, spec) = scenario_b_outline();
        let settings = MeshSettings {
            lc_flex: 0.3,
            lc_rigid: 0.5,
            n_layers_z: 3,
            order: ElementOrder::Linear,
            bc_tol: 0.05,
        };

        let mesh = extrude_mesh(&outline, &spec, &settings, &BoxMesher).unwrap();

        assert!(!mesh.elements.is_empty());
        assert_eq!(mesh.order, ElementOrder::Linear);
        for node in &mesh.nodes {
            assert!(node.z >= 0.0 && node.z <= 0.5);
        }
    }

    #[test]
    fn element_size_grading_follows_the_flex_zones() {
        let (outline, spec) = scenario_b_outline();
        let settings = MeshSettings::default();
        let plan = extrusion_plan(&outline, &spec, &settings);

        for p in &plan.outer {
            let x = p.vertex.x;
            // Mid-rigid section of the left beams
            if x > 15.0 && x < 20.0 {
                assert_eq!(p.lc, settings.lc_rigid);
            }
            // Anchor plane and shuttle faces are flex-graded
            if x < 1.0 || (x - spec.shuttle_x0()).abs() < 1.0 {
                assert_eq!(p.lc, settings.lc_flex);
            }
        }
    }

    #[test]
    fn zero_tetrahedra_is_diagnosed() {
        let (outline, spec) = scenario_b_outline();
        match extrude_mesh(&outline, &spec, &MeshSettings::default(), &EmptyMesher) {
            Err(SpringError::MeshGeneration(msg)) => {
                assert!(msg.contains("zero tetrahedra"));
                assert!(msg.contains("lc_flex"));
                assert!(msg.contains("feature width"));
            }
            other => panic!("expected MeshGeneration error, got {:?}", other),
        }
    }

    #[test]
    fn degenerate_elements_are_diagnosed() {
        let (outline, spec) = scenario_b_outline();
        match extrude_mesh(&outline, &spec, &MeshSettings::default(), &DegenerateMesher) {
            Err(SpringError::MeshGeneration(msg)) => assert!(msg.contains("degenerate")),
            other => panic!("expected MeshGeneration error, got {:?}", other),
        }
    }

    #[test]
    fn order_mismatch_is_diagnosed() {
        let (outline, spec) = scenario_b_outline();
        let settings = MeshSettings {
            order: ElementOrder::Quadratic,
            ..MeshSettings::default()
        };
        assert!(matches!(
            extrude_mesh(&outline, &spec, &settings, &BoxMesher),
            Err(SpringError::MeshGeneration(_))
        ));
    }

    #[test]
    fn invalid_settings_fail_fast() {
        let (outline, spec) = scenario_b_outline();
        let settings = MeshSettings {
            lc_flex: 0.0,
            ..MeshSettings::default()
        };
        assert!(matches!(
            extrude_mesh(&outline, &spec, &settings, &BoxMesher),
            Err(SpringError::Geometry(_))
        ));
    }

    #[test]
    fn geo_script_contains_the_extrusion() {
        let plan = ExtrusionPlan::uniform(
            &[
                Vertex { x: 0.0, y: 0.0 },
                Vertex { x: 1.0, y: 0.0 },
                Vertex { x: 1.0, y: 1.0 },
            ],
            &[],
            0.5,
            0.5,
            3,
            ElementOrder::Quadratic,
        );

        let path = std::env::temp_dir().join(format!(
            "snapspring_test_{}_geo_script.geo",
            std::process::id()
        ));
        build_geo(&plan, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(contents.contains("Extrude {0, 0, 0.5} { Surface{1}; Layers{3}; }"));
        assert!(contents.contains("Mesh.ElementOrder = 2;"));
        assert!(contents.contains("Mesh 3;"));
        assert!(contents.contains("Plane Surface(1) = { 1 };"));
    }
}
