//! Mesh file I/O.
//!
//! This module loads base meshes (with any shape keys the format can carry)
//! and saves individual shape keys.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | PLY | `.ply` | ✓ | ✓ | Faces and `edge` elements; no shape keys |
//! | glTF | `.gltf`, `.glb` | ✓ | ✗ | Morph targets become shape keys |
//!
//! Formats that reorder or weld vertices on load (OBJ, STL) are not
//! supported: shape keys are matched to the base mesh by vertex index.
//!
//! # Usage
//!
//! ```no_run
//! use shapemirror::io::{load, save_key};
//!
//! let object = load("face.glb").unwrap();
//! save_key(&object, "Key 1", "key1.ply").unwrap();
//! ```

pub mod gltf;
pub mod ply;

use std::path::Path;

use nalgebra::Point3;

use crate::error::{MirrorError, Result};
use crate::mesh::{MeshObject, ShapeKeyStore};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PLY (Stanford polygon) format.
    Ply,
    /// glTF format.
    Gltf,
    /// glTF binary format.
    Glb,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "ply" => Some(Format::Ply),
            "gltf" => Some(Format::Gltf),
            "glb" => Some(Format::Glb),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MirrorError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh object from a file with automatic format detection.
///
/// PLY files yield an object without shape keys.
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshObject> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Ply => Ok(MeshObject::new(ply::load(path)?)),
        Format::Gltf | Format::Glb => gltf::load(path),
    }
}

/// Load only the base vertex positions of a file.
pub fn load_positions<P: AsRef<Path>>(path: P) -> Result<Vec<Point3<f64>>> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Ply => ply::load_positions(path),
        Format::Gltf | Format::Glb => Ok(gltf::load(path)?.mesh.positions().to_vec()),
    }
}

/// Save one shape key of `object` using the object's topology.
pub fn save_key<P: AsRef<Path>>(object: &MeshObject, key_name: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    let keys = object.shape_keys.as_ref().ok_or(MirrorError::NoShapeKeys)?;
    let key = keys
        .find_key(key_name)
        .ok_or_else(|| MirrorError::ShapeKeyNotFound {
            name: key_name.to_string(),
        })?;

    match detect(path)? {
        Format::Ply => ply::save(&object.mesh, keys.key_positions(key), path),
        Format::Gltf | Format::Glb => Err(MirrorError::SaveError {
            path: path.to_path_buf(),
            message: "glTF saving is not supported".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{EdgeMesh, ShapeKeySet};

    fn object_with_key() -> MeshObject {
        let base = vec![Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let mesh = EdgeMesh::from_edges(base.clone(), &[[0, 1]]).unwrap();
        let mut keys = ShapeKeySet::with_basis(base.clone());
        let mut pout = base;
        pout[0].z = 0.25;
        keys.add_key("Pout", pout, keys.basis()).unwrap();
        MeshObject::new(mesh).with_shape_keys(keys)
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/mesh.PLY"), Some(Format::Ply));
        assert_eq!(Format::from_path("scene.gltf"), Some(Format::Gltf));
        assert_eq!(Format::from_path("scene.glb"), Some(Format::Glb));
        assert_eq!(Format::from_path("model.obj"), None);
        assert_eq!(Format::from_path("noext"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load("model.stl").unwrap_err();
        assert!(matches!(
            err,
            MirrorError::UnsupportedFormat { ref extension } if extension == "stl"
        ));
    }

    #[test]
    fn test_save_key_and_reload_positions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pout.ply");
        let object = object_with_key();

        save_key(&object, "Pout", &path).unwrap();
        let positions = load_positions(&path).unwrap();
        assert_eq!(positions[0], Point3::new(-1.0, 0.0, 0.25));
        assert_eq!(positions[1], Point3::new(1.0, 0.0, 0.0));

        let reloaded = load(&path).unwrap();
        assert!(reloaded.shape_keys.is_none());
        assert_eq!(reloaded.mesh.num_edges(), 1);
    }

    #[test]
    fn test_save_key_errors() {
        let dir = tempfile::tempdir().unwrap();
        let object = object_with_key();

        let err = save_key(&object, "Frown", dir.path().join("x.ply")).unwrap_err();
        assert!(matches!(err, MirrorError::ShapeKeyNotFound { .. }));

        let err = save_key(&object, "Pout", dir.path().join("x.glb")).unwrap_err();
        assert!(matches!(err, MirrorError::SaveError { .. }));

        let bare = MeshObject::new(object.mesh.clone());
        let err = save_key(&bare, "Pout", dir.path().join("x.ply")).unwrap_err();
        assert!(matches!(err, MirrorError::NoShapeKeys));
    }
}
