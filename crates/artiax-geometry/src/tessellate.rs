//! Triangle geometry for drawing a sampled curve as a chain of cylinders.

use std::f64::consts::TAU;

use artiax_core::traits::Renderable;
use artiax_math::{orthogonal_to, Point3, Vector3};

/// Minimum number of sides of a cylinder.
const MIN_SEGMENTS: usize = 3;

/// Vertices, per-vertex normals and triangles ready for a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMesh {
    pub vertices: Vec<Point3>,
    pub normals: Vec<Vector3>,
    pub triangles: Vec<[u32; 3]>,
}

impl LineMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Merge another mesh into this one, offsetting indices appropriately.
    pub fn merge(&mut self, other: &LineMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.triangles
            .extend(other.triangles.iter().map(|t| t.map(|i| i + offset)));
    }

    pub fn render_into<R>(&self, target: &mut R)
    where
        R: Renderable<Vertex = Point3> + ?Sized,
    {
        target.set_geometry(&self.vertices, &self.normals, &self.triangles);
    }
}

/// Open cylinder of `radius` from `start` to `end` with `segments` sides.
///
/// Returns an empty mesh when the endpoints coincide.
pub fn cylinder(start: Point3, end: Point3, radius: f64, segments: usize) -> LineMesh {
    let axis = end - start;
    if axis.length() < 1e-12 {
        return LineMesh::default();
    }
    let segments = segments.max(MIN_SEGMENTS);
    let u = orthogonal_to(axis);
    let v = axis.normalize().cross(u);

    let mut mesh = LineMesh::default();
    for k in 0..segments {
        let angle = TAU * k as f64 / segments as f64;
        let dir = angle.cos() * u + angle.sin() * v;
        mesh.vertices.push(start + radius * dir);
        mesh.vertices.push(end + radius * dir);
        mesh.normals.push(dir);
        mesh.normals.push(dir);
    }

    for k in 0..segments {
        let a = (2 * k) as u32;
        let b = a + 1;
        let c = (2 * ((k + 1) % segments)) as u32;
        let d = c + 1;
        mesh.triangles.push([a, c, b]);
        mesh.triangles.push([b, c, d]);
    }
    mesh
}

/// One cylinder per consecutive pair of `points`.
pub fn tube_mesh(points: &[Point3], radius: f64, segments: usize) -> LineMesh {
    let mut mesh = LineMesh::default();
    for pair in points.windows(2) {
        mesh.merge(&cylinder(pair[0], pair[1], radius, segments));
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use artiax_math::DVec3;

    #[test]
    fn test_cylinder_counts() {
        let mesh = cylinder(DVec3::ZERO, DVec3::new(0.0, 0.0, 4.0), 1.0, 8);
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 16);
        assert_eq!(mesh.normals.len(), 16);
    }

    #[test]
    fn test_cylinder_radius_and_outward_winding() {
        let start = DVec3::new(1.0, 2.0, 3.0);
        let end = DVec3::new(4.0, 2.0, 7.0);
        let mesh = cylinder(start, end, 0.5, 12);
        let axis = (end - start).normalize();
        for p in &mesh.vertices {
            let radial = (*p - start) - axis * (*p - start).dot(axis);
            assert!((radial.length() - 0.5).abs() < 1e-12);
        }
        for tri in &mesh.triangles {
            let [a, b, c] = tri.map(|i| mesh.vertices[i as usize]);
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            let radial = (centroid - start) - axis * (centroid - start).dot(axis);
            assert!(face_normal.dot(radial) > 0.0, "inward facing triangle {:?}", tri);
        }
    }

    #[test]
    fn test_degenerate_cylinder_is_empty() {
        assert_eq!(cylinder(DVec3::ONE, DVec3::ONE, 1.0, 8), LineMesh::default());
    }

    #[test]
    fn test_tube_indices_valid() {
        let pts: Vec<Point3> = (0..5).map(|i| DVec3::new(i as f64, (i * i) as f64, 0.0)).collect();
        let mesh = tube_mesh(&pts, 1.0, 6);
        assert_eq!(mesh.vertex_count(), 4 * 12);
        assert_eq!(mesh.triangle_count(), 4 * 12);
        let n = mesh.vertex_count() as u32;
        for tri in &mesh.triangles {
            for &idx in tri {
                assert!(idx < n, "Triangle index {} out of bounds (n={})", idx, n);
            }
        }
    }

    struct Recorder {
        vertices: usize,
        triangles: usize,
    }

    impl Renderable for Recorder {
        type Vertex = Point3;

        fn set_geometry(&mut self, vertices: &[Point3], _normals: &[Point3], triangles: &[[u32; 3]]) {
            self.vertices = vertices.len();
            self.triangles = triangles.len();
        }
    }

    #[test]
    fn test_render_into() {
        let mesh = tube_mesh(&[DVec3::ZERO, DVec3::X, DVec3::ONE], 0.2, 4);
        let mut target = Recorder {
            vertices: 0,
            triangles: 0,
        };
        mesh.render_into(&mut target);
        assert_eq!(target.vertices, 16);
        assert_eq!(target.triangles, 16);
    }
}
