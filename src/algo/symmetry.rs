//! Symmetry checks for reference shape keys.
//!
//! A reference key is symmetric under a mirror map when every mapped pair
//! `(i, j)` with `i != j` satisfies `|reflect(ref[i]) - ref[j]| <= tolerance`.
//! Self-mapped (on-plane) vertices are not checked.

use nalgebra::Point3;
use rayon::prelude::*;

use super::mirror::{Axis, MirrorMap};

/// The first mapped pair that breaks symmetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asymmetry {
    /// Source vertex of the pair.
    pub source: usize,
    /// Destination vertex of the pair.
    pub destination: usize,
    /// Distance between the reflected source and the destination.
    pub distance: f64,
}

/// Check whether `reference` is symmetric under `map`.
///
/// Pairs are checked in parallel and the check stops at the first violation.
/// Pairs with an index outside `reference` are ignored, and only a distance
/// strictly greater than `tolerance` counts as a violation, so the result
/// always agrees with [`find_asymmetry`].
///
/// # Example
///
/// ```
/// use shapemirror::algo::mirror::{build_mirror_map, Axis, MirrorOptions};
/// use shapemirror::algo::symmetry::is_symmetric;
/// use shapemirror::mesh::EdgeMesh;
/// use nalgebra::Point3;
///
/// let positions = vec![Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
/// let mesh = EdgeMesh::from_edges(positions.clone(), &[[0, 1]]).unwrap();
/// let map = build_mirror_map(&mesh, &MirrorOptions::default());
///
/// assert!(is_symmetric(&positions, &map, Axis::X, 1e-4));
/// ```
pub fn is_symmetric(
    reference: &[Point3<f64>],
    map: &MirrorMap,
    axis: Axis,
    tolerance: f64,
) -> bool {
    map.pairs().par_iter().all(|&(i, j)| {
        pair_distance(reference, i, j, axis).map_or(true, |d| d.is_nan() || d <= tolerance)
    })
}

/// Find the first mapped pair (in map order) that breaks symmetry.
pub fn find_asymmetry(
    reference: &[Point3<f64>],
    map: &MirrorMap,
    axis: Axis,
    tolerance: f64,
) -> Option<Asymmetry> {
    map.iter().find_map(|(i, j)| {
        let distance = pair_distance(reference, i, j, axis)?;
        (distance > tolerance).then_some(Asymmetry {
            source: i,
            destination: j,
            distance,
        })
    })
}

/// Distance between reflected `reference[i]` and `reference[j]`, or `None`
/// for self-maps and out-of-range pairs.
fn pair_distance(reference: &[Point3<f64>], i: usize, j: usize, axis: Axis) -> Option<f64> {
    if i == j {
        return None;
    }
    let pi = reference.get(i)?;
    let pj = reference.get(j)?;
    Some(nalgebra::distance(&axis.reflect_point(pi), pj))
}
