//! Mesh and shape key data model.
//!
//! The mirror algorithms never own host data. They read a mesh through
//! [`MeshAccess`] and read/write shape keys through [`ShapeKeyStore`], so any
//! host can plug in its own storage. [`EdgeMesh`] and [`ShapeKeySet`] are the
//! in-memory implementations used by the file loaders and the CLI.
//!
//! # Overview
//!
//! - [`EdgeMesh`] - vertex positions plus an undirected edge list
//! - [`ShapeKeySet`] / [`ShapeKey`] - named position layers, each optionally
//!   relative to another key
//! - [`MeshObject`] - a mesh with its optional shape key collection
//!
//! ```
//! use shapemirror::mesh::{EdgeMesh, MeshAccess};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(-1.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = EdgeMesh::from_triangles(positions, &[[0, 1, 2]]).unwrap();
//! assert_eq!(MeshAccess::num_vertices(&mesh), 3);
//! ```

mod edge_mesh;
mod object;
mod shape_key;

use nalgebra::Point3;

pub use edge_mesh::EdgeMesh;
pub use object::MeshObject;
pub use shape_key::{KeyId, ShapeKey, ShapeKeySet, BASIS_NAME};

/// Read-only access to a mesh's base positions and edge adjacency.
pub trait MeshAccess {
    /// Number of vertices.
    fn num_vertices(&self) -> usize;

    /// Base position of vertex `v`.
    ///
    /// # Panics
    /// May panic if `v >= self.num_vertices()`.
    fn position(&self, v: usize) -> Point3<f64>;

    /// All edges as unordered vertex index pairs.
    fn edges(&self) -> impl Iterator<Item = [usize; 2]> + '_;

    /// Collect every base position in vertex order.
    fn positions_vec(&self) -> Vec<Point3<f64>> {
        (0..self.num_vertices()).map(|v| self.position(v)).collect()
    }
}

/// Access to a named collection of shape keys.
///
/// Key ids passed to these methods must come from the same store (normally
/// via [`ShapeKeyStore::find_key`]); implementations may panic otherwise.
pub trait ShapeKeyStore {
    /// Look up a key by name.
    fn find_key(&self, name: &str) -> Option<KeyId>;

    /// Name of a key.
    fn key_name(&self, key: KeyId) -> &str;

    /// The key `key`'s deltas are measured against.
    fn relative_key(&self, key: KeyId) -> Option<KeyId>;

    /// Absolute positions of a key, aligned with the base mesh vertices.
    fn key_positions(&self, key: KeyId) -> &[Point3<f64>];

    /// Mutable positions of a key.
    fn key_positions_mut(&mut self, key: KeyId) -> &mut [Point3<f64>];
}
