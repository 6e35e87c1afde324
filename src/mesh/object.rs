//! Mesh objects: a base mesh plus its shape keys.

use super::{EdgeMesh, MeshAccess, ShapeKeySet};

/// A mesh together with its (optional) shape key collection.
///
/// This mirrors how a host application attaches shape keys to an object:
/// the collection may be missing entirely, which is distinct from an empty
/// collection.
#[derive(Debug, Clone, Default)]
pub struct MeshObject<M = EdgeMesh, S = ShapeKeySet> {
    /// The base mesh.
    pub mesh: M,

    /// Shape keys attached to the mesh, if any.
    pub shape_keys: Option<S>,
}

impl<M, S> MeshObject<M, S> {
    /// Create an object without shape keys.
    pub fn new(mesh: M) -> Self {
        Self {
            mesh,
            shape_keys: None,
        }
    }

    /// Attach a shape key collection.
    pub fn with_shape_keys(mut self, shape_keys: S) -> Self {
        self.shape_keys = Some(shape_keys);
        self
    }
}

impl<M: MeshAccess> MeshObject<M, ShapeKeySet> {
    /// Get the shape key collection, creating one with a `Basis` key taken
    /// from the base mesh positions if the object has none yet.
    pub fn ensure_shape_keys(&mut self) -> &mut ShapeKeySet {
        let mesh = &self.mesh;
        self.shape_keys
            .get_or_insert_with(|| ShapeKeySet::with_basis(mesh.positions_vec()))
    }
}
