//! # Shapemirror
//!
//! Mirror maps and symmetric shape-key editing for 3D meshes.
//!
//! Shapemirror pairs every vertex on one side of an axis with its mirrored
//! counterpart, then uses that pairing to copy or exchange shape key deltas
//! between the two sides.
//!
//! ## Features
//!
//! - **Component-aware matching**: counterparts are searched within the same
//!   connected component first, so multi-part assemblies pair up correctly
//! - **Symmetry validation**: the reference key is checked before anything is
//!   modified
//! - **Symmetrize and swap**: one-directional mirroring or a two-way exchange
//! - **Host-agnostic**: algorithms work through the [`mesh::MeshAccess`] and
//!   [`mesh::ShapeKeyStore`] traits
//! - **File formats**: PLY and glTF (morph targets become shape keys)
//!
//! ## Quick Start
//!
//! ```
//! use shapemirror::prelude::*;
//! use nalgebra::Point3;
//!
//! let base = vec![
//!     Point3::new(-1.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(-1.0, 1.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//! ];
//! let mesh = EdgeMesh::from_edges(base.clone(), &[[0, 2], [1, 3]]).unwrap();
//!
//! // Inspect the correspondence
//! let map = build_mirror_map(&mesh, &MirrorOptions::default());
//! assert_eq!(map.pairs(), &[(0, 1), (2, 3)]);
//!
//! // Shape key with the left side displaced
//! let mut keys = ShapeKeySet::with_basis(base.clone());
//! let mut raised = base;
//! raised[2].y += 0.2;
//! keys.add_key("Raise", raised, keys.basis()).unwrap();
//!
//! let mut object = MeshObject::new(mesh).with_shape_keys(keys);
//! swap(&mut object, "Raise", &MirrorOptions::default()).unwrap();
//!
//! let keys = object.shape_keys.as_ref().unwrap();
//! let raise = keys.find("Raise").unwrap();
//! assert_eq!(keys.key_positions(raise)[3], Point3::new(1.0, 1.2, 0.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use shapemirror::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::components::{connected_components, Components};
    pub use crate::algo::mirror::{
        build_mirror_map, mirror_map, Axis, Direction, MirrorMap, MirrorOptions,
    };
    pub use crate::algo::symmetry::{find_asymmetry, is_symmetric};
    pub use crate::algo::transfer::{swap, symmetrize, TransferReport};
    pub use crate::error::{MirrorError, Result};
    pub use crate::mesh::{
        EdgeMesh, KeyId, MeshAccess, MeshObject, ShapeKey, ShapeKeySet, ShapeKeyStore,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    /// Two separate, mirrored parts plus a centre strip on the plane.
    fn assembly() -> (EdgeMesh, Vec<Point3<f64>>) {
        let positions = vec![
            // left part
            Point3::new(-2.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.5, 1.0, 0.0),
            // right part
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.5, 1.0, 0.0),
            // centre strip
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = EdgeMesh::from_faces(
            positions.clone(),
            vec![vec![0, 1, 2], vec![3, 4, 5]],
        )
        .unwrap();
        let mut mesh = mesh;
        mesh.add_edges(&[[6, 7]]).unwrap();
        (mesh, positions)
    }

    #[test]
    fn test_assembly_round_trip() {
        let (mesh, base) = assembly();
        assert_eq!(connected_components(&mesh).len(), 3);

        let map = build_mirror_map(&mesh, &MirrorOptions::default());
        assert_eq!(map.get(0), Some(4));
        assert_eq!(map.get(1), Some(3));
        assert_eq!(map.get(2), Some(5));
        assert_eq!(map.get(6), Some(6));
        assert_eq!(map.get(7), Some(7));

        let mut keys = ShapeKeySet::with_basis(base.clone());
        let mut wave = base.clone();
        wave[2].z += 0.4;
        wave[5].y -= 0.1;
        keys.add_key("Wave", wave.clone(), keys.basis()).unwrap();
        let mut object = MeshObject::new(mesh).with_shape_keys(keys);

        let options = MirrorOptions::default();
        swap(&mut object, "Wave", &options).unwrap();
        swap(&mut object, "Wave", &options).unwrap();

        let keys = object.shape_keys.as_ref().unwrap();
        let result = keys.key_positions(keys.find("Wave").unwrap());
        for (a, b) in result.iter().zip(&wave) {
            assert!((a - b).norm() < 1e-12);
        }
    }
}
