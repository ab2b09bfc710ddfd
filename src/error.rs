use std::fmt::Display;

#[derive(Debug)]
pub enum SpringError {
    Geometry(String),
    NonManifoldPolygon(String),
    MeshGeneration(String),
    Input(String),
    PostProcessor(String),
}

impl Display for SpringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (err_name, value) = match self {
            SpringError::Geometry(v) => ("Geometry", v),
            SpringError::NonManifoldPolygon(v) => ("Non-Manifold Polygon", v),
            SpringError::MeshGeneration(v) => ("Mesh Generation", v),
            SpringError::Input(v) => ("Input", v),
            SpringError::PostProcessor(v) => ("Post Processor", v),
        };

        write!(f, "{} error: {}", err_name, value)
    }
}
