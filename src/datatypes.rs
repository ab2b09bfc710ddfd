use nalgebra::{Affine2, Point2};
use serde::{Deserialize, Serialize};

/// A 2D point in micrometers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

/// A 3D mesh node coordinate in micrometers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// In-plane position accessor so the boundary classifier can run over
/// 2D outlines and 3D mesh nodes alike
pub trait PlanarNode {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

impl PlanarNode for Vertex {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
}

impl PlanarNode for Point3 {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
}

/// Parameters of a single CCS half-beam, anchor at (0, 0) and shuttle end
/// at (half_span, initial_offset)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    /// Anchor-to-shuttle span (um)
    pub half_span: f64,
    /// Fraction of half_span occupied by the flexible cosine section
    pub flex_ratio: f64,
    /// Width of the flexible section (um)
    pub flex_width: f64,
    /// Width of the rigid section (um)
    pub rigid_width: f64,
    /// y-offset of the shuttle end (um)
    pub initial_offset: f64,
    /// Flex-to-rigid width taper length (um)
    pub taper_length: f64,
    /// Structural layer thickness (um)
    pub thickness: f64,
}

impl BeamSpec {
    /// Length of the flexible cosine section
    pub fn flex_length(&self) -> f64 {
        self.flex_ratio * self.half_span
    }

    /// Length of the rigid straight section
    pub fn rigid_length(&self) -> f64 {
        self.half_span - self.flex_length()
    }

    /// Bistability parameter Q = initial_offset / thickness
    pub fn q(&self) -> f64 {
        self.initial_offset / self.thickness
    }
}

/// Parameters of the complete doubly-clamped spring mechanism: 4 half-beams,
/// a central shuttle, and anchors at both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FullSpringSpec {
    /// Inner-edge to inner-edge distance between anchors (um)
    pub anchor_distance: f64,
    /// Center-to-center distance between the upper and lower beams (um)
    pub beam_spacing: f64,
    /// Shuttle extent along the beam axis (um)
    pub shuttle_length: f64,
    /// Shuttle extent perpendicular to the beams (um)
    pub shuttle_height: f64,
    pub flex_ratio: f64,
    pub flex_width: f64,
    pub rigid_width: f64,
    pub initial_offset: f64,
    pub taper_length: f64,
    pub thickness: f64,
}

impl FullSpringSpec {
    /// Span of a single half-beam, derived from the anchor distance and the
    /// shuttle length
    pub fn half_span(&self) -> f64 {
        (self.anchor_distance - self.shuttle_length) / 2.0
    }

    /// x-coordinate of the left shuttle face
    pub fn shuttle_x0(&self) -> f64 {
        self.half_span()
    }

    /// x-coordinate of the right shuttle face
    pub fn shuttle_x1(&self) -> f64 {
        self.half_span() + self.shuttle_length
    }

    pub fn q(&self) -> f64 {
        self.initial_offset / self.thickness
    }

    /// The half-beam spec shared by all 4 beam placements
    pub fn beam_spec(&self) -> BeamSpec {
        BeamSpec {
            half_span: self.half_span(),
            flex_ratio: self.flex_ratio,
            flex_width: self.flex_width,
            rigid_width: self.rigid_width,
            initial_offset: self.initial_offset,
            taper_length: self.taper_length,
            thickness: self.thickness,
        }
    }
}

impl Default for FullSpringSpec {
    fn default() -> FullSpringSpec {
        FullSpringSpec {
            anchor_distance: 80.0,
            beam_spacing: 10.0,
            shuttle_length: 7.0,
            shuttle_height: 12.0,
            flex_ratio: 0.3,
            flex_width: 0.5,
            rigid_width: 0.9375,
            initial_offset: 1.2,
            taper_length: 2.0,
            thickness: 0.5,
        }
    }
}

/// Anchor block dimensions. The cap and base rectangles overhang the
/// structural frame by over_top / over_bottom on every side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSpec {
    /// Extent along the beam direction (um)
    pub length: f64,
    /// Extent perpendicular to the beam (um)
    pub width: f64,
    /// Outward shift of the anchor center from the anchor plane (um)
    pub gap: f64,
    /// Cap layer overhang (um)
    pub over_top: f64,
    /// Base layer overhang (um)
    pub over_bottom: f64,
}

impl Default for AnchorSpec {
    fn default() -> AnchorSpec {
        AnchorSpec {
            length: 8.0,
            width: 8.0,
            gap: 0.0,
            over_top: 0.4,
            over_bottom: 0.5,
        }
    }
}

/// GDS-style (layer, datatype) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u16, pub u16);

/// Explicit mapping of logical layers to numeric layer identifiers. Passed
/// into every geometry-building call; there is no ambient layer registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Structural MEMS poly layer (beams, shuttle, anchor frames)
    pub structural: LayerId,
    /// Full-thickness poly cap layer
    pub top: LayerId,
    /// SOI base layer
    pub base: LayerId,
}

impl Default for LayerConfig {
    fn default() -> LayerConfig {
        LayerConfig {
            structural: LayerId(7, 0),
            top: LayerId(8, 0),
            base: LayerId(1, 0),
        }
    }
}

/// Sampled beam centerline, monotonic in x
#[derive(Debug, Clone, PartialEq)]
pub struct Centerline {
    pub points: Vec<Vertex>,
}

impl Centerline {
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }
}

/// Per-sample beam width aligned with a Centerline
#[derive(Debug, Clone, PartialEq)]
pub struct WidthProfile {
    pub widths: Vec<f64>,
}

/// Closed simple outline of one beam: upper edge left-to-right followed by
/// the lower edge reversed. The loop is stored open (the closing segment
/// back to the first vertex is implicit).
#[derive(Debug, Clone, PartialEq)]
pub struct BeamPolygon {
    pub points: Vec<Vertex>,
}

/// Role of a placed member within a spring assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Beam,
    Shuttle,
    Anchor,
    Gusset,
}

/// One polygon template placed by an explicit affine transform. Templates
/// are owned by value; placements never share mutable geometry.
#[derive(Debug, Clone)]
pub struct PlacedPolygon {
    pub polygon: Vec<Vertex>,
    pub transform: Affine2<f64>,
    pub layer: LayerId,
    pub role: MemberRole,
}

impl PlacedPolygon {
    /// Template vertices mapped into assembly coordinates
    pub fn world_points(&self) -> Vec<Vertex> {
        self.polygon
            .iter()
            .map(|v| {
                let p = self.transform * Point2::new(v.x, v.y);
                Vertex { x: p.x, y: p.y }
            })
            .collect()
    }
}

/// Placed members of a complete spring mechanism, prior to boolean merging
#[derive(Debug, Clone)]
pub struct SpringAssembly {
    pub members: Vec<PlacedPolygon>,
    pub spec: FullSpringSpec,
}

/// Single closed outline produced by the boolean merge, with the areas
/// needed to audit the fillet step
#[derive(Debug, Clone, PartialEq)]
pub struct MergedOutline {
    pub points: Vec<Vertex>,
    pub area: f64,
    pub pre_fillet_area: f64,
    pub layer: LayerId,
}

/// Tetrahedral element order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementOrder {
    Linear,
    Quadratic,
}

impl ElementOrder {
    pub fn nodes_per_element(&self) -> usize {
        match self {
            ElementOrder::Linear => 4,
            ElementOrder::Quadratic => 10,
        }
    }

    /// Numeric order as understood by the mesh kernel
    pub fn as_number(&self) -> usize {
        match self {
            ElementOrder::Linear => 1,
            ElementOrder::Quadratic => 2,
        }
    }
}

/// One tetrahedral element; 4 node indices for linear elements, 10 for
/// quadratic (corner nodes first)
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub nodes: Vec<usize>,
}

/// Volumetric mesh of the extruded spring outline
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub nodes: Vec<Point3>,
    pub elements: Vec<Element>,
    pub order: ElementOrder,
}

/// Named disjoint boundary-condition node index sets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundarySets {
    pub left_anchor: Vec<usize>,
    pub right_anchor: Vec<usize>,
    pub shuttle: Vec<usize>,
    pub junction: Vec<usize>,
}

/// Sampled force-displacement relation of the analytical model. Computed
/// once, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceDisplacementCurve {
    pub q: f64,
    pub delta: Vec<f64>,
    pub force: Vec<f64>,
}

/// Mesh generation settings from the input file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    /// Characteristic length near flex/taper regions (um)
    pub lc_flex: f64,
    /// Characteristic length elsewhere (um)
    pub lc_rigid: f64,
    /// Element layers through the extrusion thickness
    pub n_layers_z: usize,
    pub order: ElementOrder,
    /// Position tolerance for boundary node classification (um)
    pub bc_tol: f64,
}

impl Default for MeshSettings {
    fn default() -> MeshSettings {
        MeshSettings {
            lc_flex: 0.3,
            lc_rigid: 0.5,
            n_layers_z: 3,
            order: ElementOrder::Linear,
            bc_tol: 0.05,
        }
    }
}

/// Boolean merge settings from the input file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Concave corner rounding radius (um); 0 disables the fillet
    pub fillet_radius: f64,
    /// Extra half-width of the beam-shuttle gussets (um); 0 disables them
    pub junction_widening: f64,
}

impl Default for MergeSettings {
    fn default() -> MergeSettings {
        MergeSettings {
            fillet_radius: 0.0,
            junction_widening: 0.0,
        }
    }
}
