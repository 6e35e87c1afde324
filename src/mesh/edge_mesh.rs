//! Edge-list mesh representation.
//!
//! The mirror algorithms only need vertex positions and an undirected edge
//! graph, so this is all [`EdgeMesh`] stores. Polygon faces are kept around
//! when present so that shape keys can be written back out with their
//! original topology.

use std::collections::HashSet;

use nalgebra::Point3;

use super::MeshAccess;
use crate::error::{MirrorError, Result};

/// A mesh described by vertex positions and unordered edges.
#[derive(Debug, Clone, Default)]
pub struct EdgeMesh {
    /// Base position of every vertex.
    positions: Vec<Point3<f64>>,

    /// Polygon faces, as vertex index loops. May be empty.
    faces: Vec<Vec<usize>>,

    /// De-duplicated edges, normalized so that `e[0] < e[1]`.
    edges: Vec<[usize; 2]>,
}

impl EdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from positions and an explicit edge list.
    ///
    /// Duplicate edges (in either orientation) are merged.
    ///
    /// # Example
    /// ```
    /// use shapemirror::mesh::EdgeMesh;
    /// use nalgebra::Point3;
    ///
    /// let positions = vec![
    ///     Point3::new(-1.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(-1.0, 1.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    /// ];
    /// let mesh = EdgeMesh::from_edges(positions, &[[0, 2], [1, 3], [2, 0]]).unwrap();
    /// assert_eq!(mesh.num_edges(), 2);
    /// ```
    pub fn from_edges(positions: Vec<Point3<f64>>, edges: &[[usize; 2]]) -> Result<Self> {
        let mut mesh = Self {
            positions,
            faces: Vec::new(),
            edges: Vec::with_capacity(edges.len()),
        };
        mesh.add_edges(edges)?;
        Ok(mesh)
    }

    /// Build a mesh from positions and polygon faces.
    ///
    /// Every face contributes the edges around its boundary loop.
    pub fn from_faces(positions: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Result<Self> {
        for (fi, face) in faces.iter().enumerate() {
            for &vi in face {
                if vi >= positions.len() {
                    return Err(MirrorError::InvalidFaceIndex { face: fi, vertex: vi });
                }
            }
            let distinct: HashSet<usize> = face.iter().copied().collect();
            if face.len() < 3 || distinct.len() != face.len() {
                return Err(MirrorError::DegenerateFace { face: fi });
            }
        }

        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for face in &faces {
            for (k, &v0) in face.iter().enumerate() {
                let v1 = face[(k + 1) % face.len()];
                let edge = normalize_edge(v0, v1);
                if seen.insert(edge) {
                    edges.push(edge);
                }
            }
        }

        Ok(Self {
            positions,
            faces,
            edges,
        })
    }

    /// Build a mesh from positions and triangles.
    pub fn from_triangles(positions: Vec<Point3<f64>>, triangles: &[[usize; 3]]) -> Result<Self> {
        let faces = triangles.iter().map(|t| t.to_vec()).collect();
        Self::from_faces(positions, faces)
    }

    /// Add loose edges to the mesh, skipping ones that already exist.
    pub fn add_edges(&mut self, edges: &[[usize; 2]]) -> Result<()> {
        for (ei, &[v0, v1]) in edges.iter().enumerate() {
            for v in [v0, v1] {
                if v >= self.positions.len() {
                    return Err(MirrorError::InvalidEdgeIndex { edge: ei, vertex: v });
                }
            }
            if v0 == v1 {
                return Err(MirrorError::DegenerateEdge { edge: ei, vertex: v0 });
            }
        }

        let mut seen: HashSet<[usize; 2]> = self.edges.iter().copied().collect();
        for &[v0, v1] in edges {
            let edge = normalize_edge(v0, v1);
            if seen.insert(edge) {
                self.edges.push(edge);
            }
        }
        Ok(())
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of unique edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of polygon faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// All base positions, in vertex order.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// All unique edges, normalized so the smaller index comes first.
    #[inline]
    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// All polygon faces.
    #[inline]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Edges that are not part of any face boundary.
    pub fn loose_edges(&self) -> Vec<[usize; 2]> {
        let mut face_edges = HashSet::new();
        for face in &self.faces {
            for (k, &v0) in face.iter().enumerate() {
                face_edges.insert(normalize_edge(v0, face[(k + 1) % face.len()]));
            }
        }
        self.edges
            .iter()
            .copied()
            .filter(|e| !face_edges.contains(e))
            .collect()
    }

    /// Compute the axis-aligned bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.positions.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.positions[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some((min, max))
    }
}

impl MeshAccess for EdgeMesh {
    fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, v: usize) -> Point3<f64> {
        self.positions[v]
    }

    fn edges(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        self.edges.iter().copied()
    }
}

/// Normalize edge direction so v0 < v1.
#[inline]
fn normalize_edge(v0: usize, v1: usize) -> [usize; 2] {
    if v0 < v1 {
        [v0, v1]
    } else {
        [v1, v0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_positions() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_from_faces_shares_edges() {
        let mesh = EdgeMesh::from_triangles(quad_positions(), &[[0, 1, 2], [0, 2, 3]]).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 4 boundary edges + 1 diagonal
        assert_eq!(mesh.num_edges(), 5);
        assert!(mesh.edges().iter().all(|e| e[0] < e[1]));
        assert!(mesh.loose_edges().is_empty());
    }

    #[test]
    fn test_from_edges_merges_duplicates() {
        let mesh = EdgeMesh::from_edges(quad_positions(), &[[0, 1], [1, 0], [3, 2]]).unwrap();
        assert_eq!(mesh.edges(), &[[0, 1], [2, 3]]);
        assert_eq!(mesh.loose_edges().len(), 2);
    }

    #[test]
    fn test_invalid_indices() {
        let err = EdgeMesh::from_edges(quad_positions(), &[[0, 7]]).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidEdgeIndex { edge: 0, vertex: 7 }));

        let err = EdgeMesh::from_triangles(quad_positions(), &[[0, 1, 9]]).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidFaceIndex { face: 0, vertex: 9 }));
    }

    #[test]
    fn test_degenerate_elements() {
        let err = EdgeMesh::from_edges(quad_positions(), &[[2, 2]]).unwrap_err();
        assert!(matches!(err, MirrorError::DegenerateEdge { edge: 0, vertex: 2 }));

        let err = EdgeMesh::from_triangles(quad_positions(), &[[0, 1, 1]]).unwrap_err();
        assert!(matches!(err, MirrorError::DegenerateFace { face: 0 }));
    }

    #[test]
    fn test_add_edges_to_faced_mesh() {
        let mut positions = quad_positions();
        positions.push(Point3::new(2.0, 0.0, 0.0));
        let mut mesh = EdgeMesh::from_triangles(positions, &[[0, 1, 2]]).unwrap();
        mesh.add_edges(&[[1, 4], [2, 1]]).unwrap();
        assert_eq!(mesh.num_edges(), 4);
        assert_eq!(mesh.loose_edges(), vec![[1, 4]]);
    }

    #[test]
    fn test_bounding_box() {
        let mesh = EdgeMesh::from_edges(quad_positions(), &[]).unwrap();
        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
        assert!(EdgeMesh::new().bounding_box().is_none());
    }
}
