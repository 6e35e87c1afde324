//! Connected component analysis.
//!
//! Partitions mesh vertices into sets that are mutually reachable along edges.
//! Traversal uses an explicit stack so arbitrarily large components never hit
//! the call-stack limit. An isolated vertex forms its own component.
//!
//! # Example
//!
//! ```
//! use shapemirror::algo::components::connected_components;
//! use shapemirror::mesh::EdgeMesh;
//! use nalgebra::Point3;
//!
//! let positions = vec![Point3::origin(); 5];
//! let mesh = EdgeMesh::from_edges(positions, &[[0, 1], [1, 2], [3, 4]]).unwrap();
//!
//! let components = connected_components(&mesh);
//! assert_eq!(components.len(), 2);
//! assert_eq!(components.component_of(2), components.component_of(0));
//! ```

use crate::mesh::MeshAccess;

const UNVISITED: usize = usize::MAX;

/// A partition of mesh vertices into connected components.
#[derive(Debug, Clone, Default)]
pub struct Components {
    /// Member vertices of each component, in discovery order.
    members: Vec<Vec<usize>>,

    /// Component label of each vertex.
    labels: Vec<usize>,
}

impl Components {
    /// Number of components.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether there are no components (the mesh has no vertices).
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members of component `c`.
    pub fn get(&self, c: usize) -> Option<&[usize]> {
        self.members.get(c).map(Vec::as_slice)
    }

    /// Iterate over the member lists of all components.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.members.iter().map(Vec::as_slice)
    }

    /// The component containing vertex `v`.
    pub fn component_of(&self, v: usize) -> Option<usize> {
        self.labels.get(v).copied()
    }

    /// Size of the largest component.
    pub fn largest(&self) -> usize {
        self.members.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Build per-vertex neighbor lists from the mesh edges.
///
/// Edges referencing out-of-range vertices and self-loops are ignored.
pub fn vertex_adjacency<M: MeshAccess + ?Sized>(mesh: &M) -> Vec<Vec<usize>> {
    let n = mesh.num_vertices();
    let mut adjacency = vec![Vec::new(); n];
    for [a, b] in mesh.edges() {
        if a >= n || b >= n || a == b {
            continue;
        }
        adjacency[a].push(b);
        adjacency[b].push(a);
    }
    adjacency
}

/// Find the connected components of a mesh.
pub fn connected_components<M: MeshAccess + ?Sized>(mesh: &M) -> Components {
    components_from_adjacency(&vertex_adjacency(mesh))
}

/// Find connected components given per-vertex neighbor lists.
///
/// Seeds are taken in vertex order; within a component, vertices are recorded
/// in depth-first pop order.
pub fn components_from_adjacency(adjacency: &[Vec<usize>]) -> Components {
    let n = adjacency.len();
    let mut labels = vec![UNVISITED; n];
    let mut members = Vec::new();
    let mut stack = Vec::new();

    for seed in 0..n {
        if labels[seed] != UNVISITED {
            continue;
        }

        let label = members.len();
        let mut component = Vec::new();
        stack.push(seed);

        while let Some(v) = stack.pop() {
            if labels[v] != UNVISITED {
                continue;
            }
            labels[v] = label;
            component.push(v);

            for &neighbor in &adjacency[v] {
                if labels[neighbor] == UNVISITED {
                    stack.push(neighbor);
                }
            }
        }

        members.push(component);
    }

    log::debug!(
        "found {} connected components over {} vertices",
        members.len(),
        n
    );

    Components { members, labels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::EdgeMesh;
    use nalgebra::Point3;

    fn mesh_with_edges(n: usize, edges: &[[usize; 2]]) -> EdgeMesh {
        EdgeMesh::from_edges(vec![Point3::origin(); n], edges).unwrap()
    }

    fn sorted(members: &[usize]) -> Vec<usize> {
        let mut v = members.to_vec();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_isolated_vertices_are_singletons() {
        let components = connected_components(&mesh_with_edges(3, &[]));
        assert_eq!(components.len(), 3);
        for (c, members) in components.iter().enumerate() {
            assert_eq!(members, &[c]);
        }
    }

    #[test]
    fn test_partition_covers_every_vertex_once() {
        let mesh = mesh_with_edges(7, &[[0, 3], [3, 5], [1, 2], [6, 2]]);
        let components = connected_components(&mesh);

        assert_eq!(components.len(), 3);
        let mut all: Vec<usize> = components.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..7).collect::<Vec<_>>());

        assert_eq!(sorted(components.get(0).unwrap()), vec![0, 3, 5]);
        assert_eq!(sorted(components.get(1).unwrap()), vec![1, 2, 6]);
        assert_eq!(components.get(2).unwrap(), &[4]);
        assert_eq!(components.largest(), 3);
    }

    #[test]
    fn test_labels_agree_with_members() {
        let mesh = mesh_with_edges(6, &[[0, 1], [1, 2], [2, 0], [4, 5]]);
        let components = connected_components(&mesh);
        for (c, members) in components.iter().enumerate() {
            for &v in members {
                assert_eq!(components.component_of(v), Some(c));
            }
        }
        assert_eq!(components.component_of(6), None);
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let n = 200_000;
        let edges: Vec<[usize; 2]> = (0..n - 1).map(|i| [i, i + 1]).collect();
        let components = connected_components(&mesh_with_edges(n, &edges));
        assert_eq!(components.len(), 1);
        assert_eq!(components.largest(), n);
    }

    #[test]
    fn test_depth_first_order() {
        // 0 - 1, 0 - 2, 1 - 3: stack pops the most recently pushed neighbor first
        let adjacency = vec![vec![1, 2], vec![0, 3], vec![0], vec![1]];
        let components = components_from_adjacency(&adjacency);
        assert_eq!(components.get(0).unwrap(), &[0, 2, 1, 3]);
    }

    #[test]
    fn test_empty_mesh() {
        let components = connected_components(&EdgeMesh::new());
        assert!(components.is_empty());
        assert_eq!(components.largest(), 0);
    }
}
