//! glTF format support.
//!
//! Loads every mesh primitive of a glTF or GLB file into one base mesh.
//! Morph targets become shape keys named `Key 1`, `Key 2`, ... relative to a
//! `Basis` key holding the base positions. Primitives with fewer targets than
//! the file's maximum get zero displacement for the missing ones.
//!
//! Note: Saving to glTF is not supported.

use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MirrorError, Result};
use crate::mesh::{EdgeMesh, MeshObject, ShapeKeySet};

/// Geometry read from a single primitive, with indices local to it.
#[derive(Default)]
struct PrimitiveData {
    positions: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
    lines: Vec<[usize; 2]>,
    targets: Vec<Vec<Vector3<f64>>>,
}

/// Load a glTF or GLB file as a mesh object.
///
/// The object has shape keys only if the file defines morph targets.
///
/// # Example
///
/// ```no_run
/// use shapemirror::io::gltf;
///
/// let object = gltf::load("face.glb").unwrap();
/// if let Some(keys) = &object.shape_keys {
///     println!("{} shape keys", keys.len());
/// }
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshObject> {
    let path = path.as_ref();

    let (document, buffers, _images) = ::gltf::import(path).map_err(|e| MirrorError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut primitives = Vec::new();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let mut data = PrimitiveData {
                positions: positions
                    .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
                    .collect(),
                ..PrimitiveData::default()
            };

            let indices: Vec<usize> = match reader.read_indices() {
                Some(indices) => indices.into_u32().map(|i| i as usize).collect(),
                None => (0..data.positions.len()).collect(),
            };
            collect_elements(primitive.mode(), &indices, &mut data);

            for (displacements, _, _) in reader.read_morph_targets() {
                let mut target = vec![Vector3::zeros(); data.positions.len()];
                if let Some(displacements) = displacements {
                    for (slot, d) in target.iter_mut().zip(displacements) {
                        *slot = Vector3::new(d[0] as f64, d[1] as f64, d[2] as f64);
                    }
                }
                data.targets.push(target);
            }

            primitives.push(data);
        }
    }

    if primitives.is_empty() {
        return Err(MirrorError::LoadError {
            path: path.to_path_buf(),
            message: "glTF file contains no mesh positions".to_string(),
        });
    }

    combine(primitives)
}

/// Convert a primitive's index stream into triangles or line segments.
fn collect_elements(mode: ::gltf::mesh::Mode, indices: &[usize], data: &mut PrimitiveData) {
    use ::gltf::mesh::Mode;

    match mode {
        Mode::Triangles => {
            for chunk in indices.chunks_exact(3) {
                data.triangles.push([chunk[0], chunk[1], chunk[2]]);
            }
        }
        Mode::TriangleStrip => {
            for i in 0..indices.len().saturating_sub(2) {
                if i % 2 == 0 {
                    data.triangles.push([indices[i], indices[i + 1], indices[i + 2]]);
                } else {
                    data.triangles.push([indices[i], indices[i + 2], indices[i + 1]]);
                }
            }
        }
        Mode::TriangleFan => {
            for i in 1..indices.len().saturating_sub(1) {
                data.triangles.push([indices[0], indices[i], indices[i + 1]]);
            }
        }
        Mode::Lines => {
            for chunk in indices.chunks_exact(2) {
                data.lines.push([chunk[0], chunk[1]]);
            }
        }
        Mode::LineStrip => {
            for pair in indices.windows(2) {
                data.lines.push([pair[0], pair[1]]);
            }
        }
        Mode::LineLoop => {
            for pair in indices.windows(2) {
                data.lines.push([pair[0], pair[1]]);
            }
            if let (Some(&first), Some(&last)) = (indices.first(), indices.last()) {
                if indices.len() > 2 {
                    data.lines.push([last, first]);
                }
            }
        }
        // Points carry no connectivity
        _ => {}
    }
}

/// Merge primitives into one object, offsetting indices and aligning targets.
fn combine(primitives: Vec<PrimitiveData>) -> Result<MeshObject> {
    let key_count = primitives.iter().map(|p| p.targets.len()).max().unwrap_or(0);

    let mut positions = Vec::new();
    let mut faces = Vec::new();
    let mut lines = Vec::new();
    let mut keys: Vec<Vec<Point3<f64>>> = vec![Vec::new(); key_count];
    let mut degenerate = 0;

    for data in &primitives {
        let offset = positions.len();
        positions.extend_from_slice(&data.positions);

        for t in &data.triangles {
            if t[0] == t[1] || t[1] == t[2] || t[0] == t[2] {
                degenerate += 1;
                continue;
            }
            faces.push(t.iter().map(|&v| v + offset).collect::<Vec<_>>());
        }
        for &[v0, v1] in &data.lines {
            if v0 != v1 {
                lines.push([v0 + offset, v1 + offset]);
            }
        }

        for (k, key) in keys.iter_mut().enumerate() {
            match data.targets.get(k) {
                Some(target) => {
                    key.extend(data.positions.iter().zip(target).map(|(p, d)| p + d));
                }
                None => key.extend_from_slice(&data.positions),
            }
        }
    }

    if degenerate > 0 {
        log::debug!("skipped {} degenerate glTF triangles", degenerate);
    }

    let mut mesh = EdgeMesh::from_faces(positions, faces)?;
    mesh.add_edges(&lines)?;

    let mut object = MeshObject::new(mesh);
    if key_count > 0 {
        let mut set = ShapeKeySet::with_basis(object.mesh.positions().to_vec());
        let basis = set.basis();
        for (k, key) in keys.into_iter().enumerate() {
            set.add_key(format!("Key {}", k + 1), key, basis)?;
        }
        object.shape_keys = Some(set);
    }

    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ShapeKeyStore;

    fn triangle(x: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(x, 0.0, 0.0),
            Point3::new(x + 1.0, 0.0, 0.0),
            Point3::new(x, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_triangle_strip_winding() {
        let mut data = PrimitiveData::default();
        collect_elements(::gltf::mesh::Mode::TriangleStrip, &[0, 1, 2, 3], &mut data);
        assert_eq!(data.triangles, vec![[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn test_line_loop_closes() {
        let mut data = PrimitiveData::default();
        collect_elements(::gltf::mesh::Mode::LineLoop, &[4, 5, 6], &mut data);
        assert_eq!(data.lines, vec![[4, 5], [5, 6], [6, 4]]);
    }

    #[test]
    fn test_combine_offsets_and_pads_targets() {
        let first = PrimitiveData {
            positions: triangle(-2.0),
            triangles: vec![[0, 1, 2]],
            lines: Vec::new(),
            targets: vec![vec![Vector3::new(0.0, 0.0, 1.0); 3]],
        };
        let second = PrimitiveData {
            positions: triangle(1.0),
            triangles: vec![[0, 1, 2], [0, 0, 1]],
            lines: Vec::new(),
            targets: Vec::new(),
        };

        let object = combine(vec![first, second]).unwrap();
        assert_eq!(object.mesh.num_vertices(), 6);
        assert_eq!(object.mesh.faces(), &[vec![0, 1, 2], vec![3, 4, 5]]);

        let keys = object.shape_keys.unwrap();
        assert_eq!(keys.len(), 2);
        let key = keys.find("Key 1").unwrap();
        let positions = keys.key_positions(key);
        assert_eq!(positions[0], Point3::new(-2.0, 0.0, 1.0));
        assert_eq!(positions[3], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(keys.relative_key(key), keys.basis());
    }

    #[test]
    fn test_combine_without_targets_has_no_keys() {
        let data = PrimitiveData {
            positions: triangle(0.0),
            triangles: vec![[0, 1, 2]],
            ..PrimitiveData::default()
        };
        let object = combine(vec![data]).unwrap();
        assert!(object.shape_keys.is_none());
    }
}
