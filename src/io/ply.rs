//! PLY (Stanford polygon) format support.
//!
//! Vertex order is preserved exactly, since shape keys are matched to the
//! base mesh by index. Both `face` and `edge` elements are read; a file with
//! only vertices and edges is a valid wire mesh.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MirrorError, Result};
use crate::mesh::EdgeMesh;

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use shapemirror::io::ply;
///
/// let mesh = ply::load("body.ply").unwrap();
/// println!("{} vertices", mesh.num_vertices());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<EdgeMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| MirrorError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let load_error = |message: &str| MirrorError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let x = get_float_property(vertex, "x")
            .ok_or_else(|| load_error("vertex missing x coordinate"))?;
        let y = get_float_property(vertex, "y")
            .ok_or_else(|| load_error("vertex missing y coordinate"))?;
        let z = get_float_property(vertex, "z")
            .ok_or_else(|| load_error("vertex missing z coordinate"))?;
        vertices.push(Point3::new(x, y, z));
    }

    let mut faces: Vec<Vec<usize>> = Vec::new();
    if let Some(face_element) = ply.payload.get("face") {
        faces.reserve(face_element.len());
        for face in face_element {
            let indices = get_list_property(face, "vertex_indices")
                .or_else(|| get_list_property(face, "vertex_index"))
                .ok_or_else(|| load_error("face missing vertex_indices property"))?;
            faces.push(indices);
        }
    }

    let mut edges: Vec<[usize; 2]> = Vec::new();
    if let Some(edge_element) = ply.payload.get("edge") {
        edges.reserve(edge_element.len());
        for edge in edge_element {
            let v0 = get_index_property(edge, "vertex1")
                .ok_or_else(|| load_error("edge missing vertex1 property"))?;
            let v1 = get_index_property(edge, "vertex2")
                .ok_or_else(|| load_error("edge missing vertex2 property"))?;
            edges.push([v0, v1]);
        }
    }

    let mut mesh = EdgeMesh::from_faces(vertices, faces)?;
    mesh.add_edges(&edges)?;
    Ok(mesh)
}

/// Load only the vertex positions of a PLY file.
///
/// Used for shape key files that share the topology of a base mesh.
pub fn load_positions<P: AsRef<Path>>(path: P) -> Result<Vec<Point3<f64>>> {
    Ok(load(path)?.positions().to_vec())
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_index_property(element: &DefaultElement, name: &str) -> Option<usize> {
    match element.get(name)? {
        Property::Int(v) => usize::try_from(*v).ok(),
        Property::UInt(v) => Some(*v as usize),
        Property::Short(v) => usize::try_from(*v).ok(),
        Property::UShort(v) => Some(*v as usize),
        Property::Char(v) => usize::try_from(*v).ok(),
        Property::UChar(v) => Some(*v as usize),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => v.iter().map(|&x| usize::try_from(x).ok()).collect(),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => v.iter().map(|&x| usize::try_from(x).ok()).collect(),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => v.iter().map(|&x| usize::try_from(x).ok()).collect(),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save shape key positions to an ASCII PLY file using the topology of `mesh`.
///
/// Coordinates are written as doubles so that a save/load cycle is lossless.
/// Faces are written as a `face` element and edges not covered by any face as
/// an `edge` element.
///
/// # Example
///
/// ```no_run
/// use shapemirror::io::ply;
///
/// let mesh = ply::load("body.ply").unwrap();
/// ply::save(&mesh, mesh.positions(), "copy.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &EdgeMesh, positions: &[Point3<f64>], path: P) -> Result<()> {
    let path = path.as_ref();
    if positions.len() != mesh.num_vertices() {
        return Err(MirrorError::SaveError {
            path: path.to_path_buf(),
            message: format!(
                "{} positions for a mesh with {} vertices",
                positions.len(),
                mesh.num_vertices()
            ),
        });
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let loose_edges = mesh.loose_edges();

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by shapemirror")?;
    writeln!(writer, "element vertex {}", positions.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    if mesh.num_faces() > 0 {
        writeln!(writer, "element face {}", mesh.num_faces())?;
        writeln!(writer, "property list uchar int vertex_indices")?;
    }
    if !loose_edges.is_empty() {
        writeln!(writer, "element edge {}", loose_edges.len())?;
        writeln!(writer, "property int vertex1")?;
        writeln!(writer, "property int vertex2")?;
    }
    writeln!(writer, "end_header")?;

    for p in positions {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    for face in mesh.faces() {
        write!(writer, "{}", face.len())?;
        for v in face {
            write!(writer, " {}", v)?;
        }
        writeln!(writer)?;
    }

    for [v0, v1] in &loose_edges {
        writeln!(writer, "{} {}", v0, v1)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mesh() -> EdgeMesh {
        let positions = vec![
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.1),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let mut mesh = EdgeMesh::from_triangles(positions, &[[0, 1, 2]]).unwrap();
        mesh.add_edges(&[[2, 3]]).unwrap();
        mesh
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.ply");
        let mesh = sample_mesh();

        let mut positions = mesh.positions().to_vec();
        positions[2].z = 0.1234567890123;
        save(&mesh, &positions, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.positions(), positions.as_slice());
        assert_eq!(loaded.num_faces(), 1);
        assert_eq!(loaded.faces()[0], vec![0, 1, 2]);
        assert_eq!(loaded.num_edges(), mesh.num_edges());
        assert_eq!(loaded.loose_edges(), vec![[2, 3]]);
    }

    #[test]
    fn test_load_wire_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wire.ply");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\n\
             property float z\nelement edge 2\nproperty int vertex1\nproperty int vertex2\n\
             end_header\n-1 0 0\n1 0 0\n0 1 0\n0 2\n1 2\n",
        )
        .unwrap();

        let mesh = load(&path).unwrap();
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.edges(), &[[0, 2], [1, 2]]);
    }

    #[test]
    fn test_load_rejects_bad_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ply");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\n\
             property float z\nelement edge 1\nproperty int vertex1\nproperty int vertex2\n\
             end_header\n0 0 0\n1 0 0\n0 5\n",
        )
        .unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidEdgeIndex { edge: 0, vertex: 5 }));
    }

    #[test]
    fn test_save_rejects_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = sample_mesh();
        let err = save(&mesh, &mesh.positions()[..2], dir.path().join("x.ply")).unwrap_err();
        assert!(matches!(err, MirrorError::SaveError { .. }));
    }
}
