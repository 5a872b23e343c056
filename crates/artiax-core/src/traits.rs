use crate::error::Result;

/// Validate parameters or derived state before use.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Something that can receive triangle geometry, e.g. a scene-graph drawing.
pub trait Renderable {
    type Vertex;

    fn set_geometry(
        &mut self,
        vertices: &[Self::Vertex],
        normals: &[Self::Vertex],
        triangles: &[[u32; 3]],
    );
}

/// Something with a rigid placement in the scene, e.g. a camera or a marker.
pub trait Transformable {
    type Position;
    type Orientation;

    fn position(&self) -> Self::Position;
    fn orientation(&self) -> Self::Orientation;
    fn set_placement(&mut self, position: Self::Position, orientation: Self::Orientation);
}
