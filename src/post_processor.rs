use std::io::Write;

use crate::{
    datatypes::{BoundarySets, ForceDisplacementCurve, MergedOutline, Mesh},
    error::SpringError,
    sweep::QSweepRecord,
};

fn create(path: &str) -> Result<std::fs::File, SpringError> {
    match std::fs::File::create(path) {
        Ok(f) => Ok(f),
        Err(err) => Err(SpringError::PostProcessor(format!(
            "Failed to create {}: {}",
            path, err
        ))),
    }
}

fn write_str(file: &mut std::fs::File, contents: &str) -> Result<(), SpringError> {
    file.write_all(contents.as_bytes())
        .map_err(|err| SpringError::PostProcessor(format!("Write failed: {err}")))
}

/// Writes a merged outline to a CSV file with x,y columns
///
/// # Arguments
/// * `outline` - The merged outline
/// * `output` - The filename of the output csv
pub fn outline_csv(outline: &MergedOutline, output: &str) -> Result<(), SpringError> {
    let mut file = create(output)?;

    write_str(&mut file, "x,y\n")?;
    for point in &outline.points {
        write_str(&mut file, &format!("{},{}\n", point.x, point.y))?;
    }

    println!(
        "info: wrote {} outline points to {}",
        outline.points.len(),
        output
    );

    Ok(())
}

/// Writes mesh results to two CSV files: nodes with their boundary tags,
/// and element connectivity
///
/// # Arguments
/// * `mesh` - The mesh to write
/// * `boundary` - Boundary node sets used to tag each node
/// * `nodes_output` - The filename of the output nodes csv
/// * `elements_output` - The filename of the output elements csv
pub fn mesh_csv(
    mesh: &Mesh,
    boundary: &BoundarySets,
    nodes_output: &str,
    elements_output: &str,
) -> Result<(), SpringError> {
    let mut nodes_file = create(nodes_output)?;
    let mut elements_file = create(elements_output)?;

    // Write nodes
    write_str(&mut nodes_file, "x,y,z,bc\n")?;
    for (i, node) in mesh.nodes.iter().enumerate() {
        let tag = if boundary.left_anchor.contains(&i) {
            "left_anchor"
        } else if boundary.right_anchor.contains(&i) {
            "right_anchor"
        } else if boundary.junction.contains(&i) {
            "junction"
        } else if boundary.shuttle.contains(&i) {
            "shuttle"
        } else {
            "-"
        };

        write_str(
            &mut nodes_file,
            &format!("{},{},{},{}\n", node.x, node.y, node.z, tag),
        )?;
    }

    // Write elements
    let n = mesh.order.nodes_per_element();
    let header: Vec<String> = (0..n).map(|i| format!("n{}", i)).collect();
    write_str(&mut elements_file, &format!("{}\n", header.join(",")))?;

    for element in &mesh.elements {
        let row: Vec<String> = element.nodes.iter().map(|i| i.to_string()).collect();
        write_str(&mut elements_file, &format!("{}\n", row.join(",")))?;
    }

    println!(
        "info: wrote output to {} and {}",
        nodes_output, elements_output
    );

    Ok(())
}

/// Writes a force-displacement table to a CSV file with delta,force columns
pub fn curve_csv(curve: &ForceDisplacementCurve, output: &str) -> Result<(), SpringError> {
    let mut file = create(output)?;

    write_str(&mut file, "delta,force\n")?;
    for (delta, force) in curve.delta.iter().zip(&curve.force) {
        write_str(&mut file, &format!("{},{}\n", delta, force))?;
    }

    println!(
        "info: wrote {} force-displacement samples (Q={}) to {}",
        curve.delta.len(),
        curve.q,
        output
    );

    Ok(())
}

/// Writes Q-sweep records to a CSV file. Out-of-domain samples carry NaN
/// in the snap columns.
pub fn q_sweep_csv(records: &[QSweepRecord], output: &str) -> Result<(), SpringError> {
    let mut file = create(output)?;

    write_str(&mut file, "q,bistable,d_top,f_top,d_bot,f_bot,force_ratio\n")?;
    for record in records {
        let (d_top, f_top, d_bot, f_bot, ratio) = match record.snap {
            Some(snap) => (
                snap.d_top,
                snap.f_top,
                snap.d_bot,
                snap.f_bot,
                snap.force_ratio(),
            ),
            None => (f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN),
        };

        write_str(
            &mut file,
            &format!(
                "{},{},{},{},{},{},{}\n",
                record.q, record.bistable, d_top, f_top, d_bot, f_bot, ratio
            ),
        )?;
    }

    println!("info: wrote {} sweep records to {}", records.len(), output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{Element, ElementOrder, LayerId, Point3};

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("snapspring_test_{}_{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn outline_csv_round_trip() {
        let outline = MergedOutline {
            points: vec![
                crate::datatypes::Vertex { x: 0.0, y: 0.0 },
                crate::datatypes::Vertex { x: 1.0, y: 0.5 },
            ],
            area: 1.0,
            pre_fillet_area: 1.0,
            layer: LayerId(7, 0),
        };

        let path = temp_path("outline.csv");
        outline_csv(&outline, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(contents, "x,y\n0,0\n1,0.5\n");
    }

    #[test]
    fn mesh_csv_tags_boundary_nodes() {
        let mesh = Mesh {
            nodes: vec![
                Point3 {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                },
                Point3 {
                    x: 40.0,
                    y: 1.2,
                    z: 0.25,
                },
            ],
            elements: vec![Element {
                nodes: vec![0, 1, 0, 1],
            }],
            order: ElementOrder::Linear,
        };
        let boundary = BoundarySets {
            left_anchor: vec![0],
            shuttle: vec![1],
            ..BoundarySets::default()
        };

        let nodes_path = temp_path("nodes.csv");
        let elements_path = temp_path("elements.csv");
        mesh_csv(&mesh, &boundary, &nodes_path, &elements_path).unwrap();

        let nodes = std::fs::read_to_string(&nodes_path).unwrap();
        let elements = std::fs::read_to_string(&elements_path).unwrap();
        let _ = std::fs::remove_file(&nodes_path);
        let _ = std::fs::remove_file(&elements_path);

        assert!(nodes.contains("0,0,0,left_anchor"));
        assert!(nodes.contains("40,1.2,0.25,shuttle"));
        assert!(elements.starts_with("n0,n1,n2,n3\n"));
    }

    #[test]
    fn curve_csv_preserves_nan() {
        let curve = ForceDisplacementCurve {
            q: 1.0,
            delta: vec![0.0, 1.0],
            force: vec![f64::NAN, f64::NAN],
        };

        let path = temp_path("curve.csv");
        curve_csv(&curve, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(contents.contains("NaN"));
    }
}
