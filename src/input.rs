use json::JsonValue;

use crate::{
    datatypes::{ElementOrder, FullSpringSpec, MergeSettings, MeshSettings, Vertex},
    error::SpringError,
};

/// Parses the input json into a JsonValue object
///
/// # Arguments
/// * `input_file` - The path to the input file
///
/// # Returns
/// A JsonValue object with the spring section verified present
pub fn load_input_file(input_file: &str) -> Result<JsonValue, SpringError> {
    let file_string = match std::fs::read_to_string(input_file) {
        Ok(f) => f,
        Err(_err) => {
            return Err(SpringError::Input(format!(
                "Unable to open input file {}",
                input_file
            )))
        }
    };

    let input_file_json = match json::parse(&file_string) {
        Ok(f) => f,
        Err(err) => {
            return Err(SpringError::Input(format!(
                "Error in input file json: {err}"
            )))
        }
    };

    if !input_file_json.has_key("spring") {
        return Err(SpringError::Input(
            "Input json missing spring section".to_string(),
        ));
    }

    Ok(input_file_json)
}

fn require_f64(section: &JsonValue, section_name: &str, key: &str) -> Result<f64, SpringError> {
    match section[key].as_f64() {
        Some(value) => Ok(value),
        None => Err(SpringError::Input(format!(
            "Input json missing {} field in {} section",
            key, section_name
        ))),
    }
}

fn optional_f64(section: &JsonValue, key: &str, default: f64) -> Result<f64, SpringError> {
    if !section.has_key(key) {
        return Ok(default);
    }
    match section[key].as_f64() {
        Some(value) => Ok(value),
        None => Err(SpringError::Input(format!("Bad value for {} field", key))),
    }
}

/// Parses the full-spring parameters from the input json
pub fn parse_spring_spec(input_json: &JsonValue) -> Result<FullSpringSpec, SpringError> {
    let section = &input_json["spring"];

    Ok(FullSpringSpec {
        anchor_distance: require_f64(section, "spring", "anchor_distance")?,
        beam_spacing: require_f64(section, "spring", "beam_spacing")?,
        shuttle_length: require_f64(section, "spring", "shuttle_length")?,
        shuttle_height: require_f64(section, "spring", "shuttle_height")?,
        flex_ratio: require_f64(section, "spring", "flex_ratio")?,
        flex_width: require_f64(section, "spring", "flex_width")?,
        rigid_width: require_f64(section, "spring", "rigid_width")?,
        initial_offset: require_f64(section, "spring", "initial_offset")?,
        taper_length: require_f64(section, "spring", "taper_length")?,
        thickness: require_f64(section, "spring", "thickness")?,
    })
}

/// Parses the optional merge section; absent fields default to no fillet
/// and no gussets
pub fn parse_merge_settings(input_json: &JsonValue) -> Result<MergeSettings, SpringError> {
    let section = &input_json["merge"];
    let defaults = MergeSettings::default();

    Ok(MergeSettings {
        fillet_radius: optional_f64(section, "fillet_radius", defaults.fillet_radius)?,
        junction_widening: optional_f64(
            section,
            "junction_widening",
            defaults.junction_widening,
        )?,
    })
}

/// Parses the optional mesh section
pub fn parse_mesh_settings(input_json: &JsonValue) -> Result<MeshSettings, SpringError> {
    let section = &input_json["mesh"];
    let defaults = MeshSettings::default();

    let order = match section["order"].as_usize() {
        None if !section.has_key("order") => defaults.order,
        Some(1) => ElementOrder::Linear,
        Some(2) => ElementOrder::Quadratic,
        _ => {
            return Err(SpringError::Input(
                "Bad value for order field in mesh section; expected 1 or 2".to_string(),
            ))
        }
    };

    let n_layers_z = match section["n_layers_z"].as_usize() {
        None if !section.has_key("n_layers_z") => defaults.n_layers_z,
        Some(n) if n >= 1 => n,
        _ => {
            return Err(SpringError::Input(
                "Bad value for n_layers_z field in mesh section".to_string(),
            ))
        }
    };

    Ok(MeshSettings {
        lc_flex: optional_f64(section, "lc_flex", defaults.lc_flex)?,
        lc_rigid: optional_f64(section, "lc_rigid", defaults.lc_rigid)?,
        n_layers_z,
        order,
        bc_tol: optional_f64(section, "bc_tol", defaults.bc_tol)?,
    })
}

/// Stores a parsed loop into the right container by its OUTER/INNER id
fn store_loop(
    containers: &mut Vec<Vec<Vertex>>,
    item_id: Option<&str>,
    points: Vec<Vertex>,
) -> Result<(), SpringError> {
    let id = match item_id {
        Some(id) => id.trim(),
        None => {
            return Err(SpringError::Input(
                "Error in svg file. Missing id field on geometry element".to_owned(),
            ))
        }
    };

    if id.starts_with("INNER") {
        containers.push(points);
    } else if id.starts_with("OUTER") {
        if containers[0].is_empty() {
            containers[0] = points;
        } else {
            return Err(SpringError::Input(
                "Multiple OUTER geometries in SVG".to_owned(),
            ));
        }
    } else {
        println!("warning [input]: skipping geometry with id {id}. Only supports OUTER and INNER");
    }

    Ok(())
}

/// Element id, falling back to the parent's id the way drawing tools nest
/// shapes under named groups
fn resolve_id<'a, 'input>(node: &roxmltree::Node<'a, 'input>) -> Option<&'a str> {
    node.attribute("id")
        .or_else(|| node.parent().and_then(|p| p.attribute("id")))
}

fn parse_point_list(raw: &str, node_id: &str) -> Result<Vec<f64>, SpringError> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse().map_err(|_| {
                SpringError::Input(format!(
                    "Non-float value '{}' in svg points at node {}",
                    tok, node_id
                ))
            })
        })
        .collect()
}

fn rect_attr(
    rect: &roxmltree::Node,
    name: &str,
    default: Option<f64>,
) -> Result<f64, SpringError> {
    match rect.attribute(name) {
        Some(raw) => raw.parse().map_err(|_| {
            SpringError::Input(format!(
                "Non-float value '{}' for rectangle {} attribute",
                raw, name
            ))
        }),
        None => match default {
            Some(value) => {
                println!(
                    "warning [input]: missing {} definition in rectangle. Assuming {}.",
                    name, value
                );
                Ok(value)
            }
            None => Err(SpringError::Input(format!(
                "Error in svg file. No {} definition in rectangle",
                name
            ))),
        },
    }
}

/// Parses a .svg file into outline loops: one OUTER loop (index 0) plus
/// any INNER hole loops. The svg y-axis is inverted into the geometry
/// convention.
///
/// # Arguments
/// * `svg_file` - The path to the input svg file
/// * `min_vertex_spacing` - Vertices closer than this to their predecessor
///   are skipped (um)
///
/// # Returns
/// Loops of vertices, OUTER first
pub fn parse_svg(svg_file: &str, min_vertex_spacing: f64) -> Result<Vec<Vec<Vertex>>, SpringError> {
    let contents = match std::fs::read_to_string(svg_file) {
        Ok(file) => file,
        Err(_err) => {
            return Err(SpringError::Input(format!(
                "Unable to open svg file {}",
                svg_file
            )));
        }
    };

    let doc = match roxmltree::Document::parse(&contents) {
        Ok(doc) => doc,
        Err(err) => {
            return Err(SpringError::Input(format!("Error in svg file: {err}")));
        }
    };

    let mut containers: Vec<Vec<Vertex>> = Vec::new();
    containers.push(Vec::new()); // placeholder for OUTER

    let mut skipped_vertices: usize = 0;

    for node in doc.descendants() {
        match node.tag_name().name() {
            "polyline" | "polygon" => {
                let raw = match node.attribute("points") {
                    Some(raw) => raw,
                    None => {
                        return Err(SpringError::Input(format!(
                            "Error in svg file. No points in polyline element {:?}",
                            node.id()
                        )))
                    }
                };

                let flat = parse_point_list(raw, &format!("{:?}", node.id()))?;
                let mut points: Vec<Vertex> = Vec::with_capacity(flat.len() / 2);
                for pair in flat.chunks_exact(2) {
                    let vertex = Vertex {
                        x: pair[0],
                        y: -pair[1],
                    };

                    if points.contains(&vertex) {
                        println!(
                            "warning [input]: duplicate point at {:?} in element {:?}",
                            vertex,
                            node.id()
                        );
                        continue;
                    }
                    if let Some(last) = points.last() {
                        let distance = f64::hypot(last.x - vertex.x, last.y - vertex.y);
                        if distance < min_vertex_spacing {
                            skipped_vertices += 1;
                            continue;
                        }
                    }

                    points.push(vertex);
                }

                store_loop(&mut containers, resolve_id(&node), points)?;
            }
            "rect" => {
                let x = rect_attr(&node, "x", Some(0.0))?;
                let y = rect_attr(&node, "y", Some(0.0))?;
                let width = rect_attr(&node, "width", None)?;
                let height = rect_attr(&node, "height", None)?;

                let points = vec![
                    Vertex { x, y: -y },
                    Vertex {
                        x: x + width,
                        y: -y,
                    },
                    Vertex {
                        x: x + width,
                        y: -y - height,
                    },
                    Vertex { x, y: -y - height },
                ];

                store_loop(&mut containers, resolve_id(&node), points)?;
            }
            _ => continue,
        }
    }

    if skipped_vertices > 0 {
        println!("warning [input]: skipped {} vertices", skipped_vertices);
    }

    if containers[0].is_empty() {
        return Err(SpringError::Input("No OUTER geometry".to_owned()));
    }

    Ok(containers)
}

/// Parses a CSV file with x and y columns into a list of vertices
///
/// # Arguments
/// * `csv_file` - The path to the input csv file
///
/// # Returns
/// An ordered vector of Vertex objects
pub fn parse_csv(csv_file: &str) -> Result<Vec<Vertex>, SpringError> {
    let contents = match std::fs::read_to_string(csv_file) {
        Ok(c) => c,
        Err(_err) => {
            return Err(SpringError::Input(format!(
                "Unable to open csv file {}",
                csv_file
            )))
        }
    };

    let mut headers: Vec<&str> = Vec::new();
    let mut x_index: usize = 0;
    let mut y_index: usize = 0;
    let mut vertices: Vec<Vertex> = Vec::new();

    for line in contents.lines() {
        if line.is_empty() {
            continue;
        }

        if headers.is_empty() {
            headers = line.split(',').map(|x| x.trim()).collect();

            x_index = match headers.iter().position(|f| f == &"x") {
                Some(i) => i,
                None => {
                    return Err(SpringError::Input(
                        "Error in csv file: Missing x field".to_string(),
                    ))
                }
            };
            y_index = match headers.iter().position(|f| f == &"y") {
                Some(i) => i,
                None => {
                    return Err(SpringError::Input(
                        "Error in csv file: Missing y field".to_string(),
                    ))
                }
            };
        } else {
            let fields: Vec<&str> = line.split(',').map(|x| x.trim()).collect();
            if fields.len() <= usize::max(x_index, y_index) {
                return Err(SpringError::Input(format!(
                    "Error in csv file: short row '{line}'"
                )));
            }

            let parse = |tok: &str| -> Result<f64, SpringError> {
                tok.parse().map_err(|_| {
                    SpringError::Input(format!("Non-float value '{tok}' in csv points"))
                })
            };

            vertices.push(Vertex {
                x: parse(fields[x_index])?,
                y: parse(fields[y_index])?,
            });
        }
    }

    Ok(vertices)
}
