//! Mirror map construction.
//!
//! A mirror map pairs each vertex on the *source* side of an axis with the
//! vertex closest to its reflection. Matches are searched first inside the
//! source vertex's own connected component and only then across the whole
//! mesh, so assemblies made of separate left/right parts pair up part by part
//! while single-piece meshes still work.
//!
//! # Algorithm
//!
//! For every vertex `i` (components in discovery order, members in traversal
//! order) whose axis coordinate lies on the source side:
//!
//! 1. Reflect its position across the axis plane
//! 2. Pick the nearest unused vertex `j != i` in the same component whose
//!    distance to the reflection is below `tolerance`
//! 3. Failing that, repeat the search over all vertices
//! 4. Record `i -> j` and mark `j` used
//!
//! Finally every vertex whose axis coordinate is within `tolerance` of zero is
//! mapped to itself, replacing any earlier entry.
//!
//! Candidates must beat `tolerance` and the threshold only tightens, so ties
//! go to the first candidate visited.
//!
//! # Example
//!
//! ```
//! use shapemirror::algo::mirror::{build_mirror_map, MirrorOptions};
//! use shapemirror::mesh::EdgeMesh;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(-1.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(-1.0, 1.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//! ];
//! let mesh = EdgeMesh::from_edges(positions, &[[0, 2], [1, 3]]).unwrap();
//!
//! let map = build_mirror_map(&mesh, &MirrorOptions::default());
//! assert_eq!(map.get(0), Some(1));
//! assert_eq!(map.get(2), Some(3));
//! assert_eq!(map.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use super::components::{connected_components, Components};
use crate::error::{MirrorError, Result};
use crate::mesh::MeshAccess;

/// Default matching tolerance.
pub const DEFAULT_TOLERANCE: f64 = 0.0001;

/// A coordinate axis; mirroring reflects across the plane orthogonal to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// The X axis (mirror across the YZ plane).
    #[default]
    X,
    /// The Y axis (mirror across the XZ plane).
    Y,
    /// The Z axis (mirror across the XY plane).
    Z,
}

impl Axis {
    /// Coordinate index of this axis.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The coordinate of `p` along this axis.
    #[inline]
    pub fn coordinate(self, p: &Point3<f64>) -> f64 {
        p[self.index()]
    }

    /// Reflect a point across the axis plane.
    #[inline]
    pub fn reflect_point(self, p: &Point3<f64>) -> Point3<f64> {
        let mut r = *p;
        r[self.index()] = -r[self.index()];
        r
    }

    /// Reflect a displacement across the axis plane.
    #[inline]
    pub fn reflect_vector(self, v: &Vector3<f64>) -> Vector3<f64> {
        let mut r = *v;
        r[self.index()] = -r[self.index()];
        r
    }

    /// Whether `p` lies on the mirror plane within `tolerance`.
    #[inline]
    pub fn is_on_plane(self, p: &Point3<f64>, tolerance: f64) -> bool {
        self.coordinate(p).abs() <= tolerance
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

impl FromStr for Axis {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(MirrorError::invalid_param("axis", s, "expected x, y or z")),
        }
    }
}

/// Which side of the axis supplies the source vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Vertices with negative coordinates are matched onto the positive side.
    #[default]
    NegativeToPositive,
    /// Vertices with positive coordinates are matched onto the negative side.
    PositiveToNegative,
}

impl Direction {
    /// Whether a vertex with axis coordinate `c` is a match source.
    #[inline]
    pub fn is_source(self, c: f64, tolerance: f64) -> bool {
        match self {
            Direction::NegativeToPositive => c <= -tolerance,
            Direction::PositiveToNegative => c >= tolerance,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::NegativeToPositive => f.write_str("- → +"),
            Direction::PositiveToNegative => f.write_str("+ → -"),
        }
    }
}

impl FromStr for Direction {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "negative" | "neg" | "-" | "-+" | "- → +" | "->+" => {
                Ok(Direction::NegativeToPositive)
            }
            "positive" | "pos" | "+" | "+-" | "+ → -" | "+>-" => {
                Ok(Direction::PositiveToNegative)
            }
            _ => Err(MirrorError::invalid_param(
                "direction",
                s,
                "expected negative or positive",
            )),
        }
    }
}

/// Options for mirror map construction and delta transfer.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Mirror axis.
    pub axis: Axis,

    /// Which side supplies the source vertices.
    pub direction: Direction,

    /// Distance/coordinate epsilon used for plane detection and matching.
    pub tolerance: f64,

    /// Whether to use parallel execution for the global search (default: true).
    pub parallel: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            axis: Axis::X,
            direction: Direction::NegativeToPositive,
            tolerance: DEFAULT_TOLERANCE,
            parallel: true,
        }
    }
}

impl MirrorOptions {
    /// Set the mirror axis.
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Set the source direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the matching tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MirrorError::invalid_param(
                "tolerance",
                self.tolerance,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// A one-directional vertex correspondence.
///
/// Entries iterate in insertion order. Re-inserting a source keeps its
/// original slot and replaces the destination.
#[derive(Debug, Clone, Default)]
pub struct MirrorMap {
    pairs: Vec<(usize, usize)>,
    slots: HashMap<usize, usize>,
    unmatched: Vec<usize>,
}

impl MirrorMap {
    fn insert(&mut self, source: usize, destination: usize) {
        match self.slots.get(&source) {
            Some(&slot) => self.pairs[slot].1 = destination,
            None => {
                self.slots.insert(source, self.pairs.len());
                self.pairs.push((source, destination));
            }
        }
    }

    /// Destination of `source`, if it is mapped.
    pub fn get(&self, source: usize) -> Option<usize> {
        self.slots.get(&source).map(|&slot| self.pairs[slot].1)
    }

    /// Number of entries (including self-maps).
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All `(source, destination)` entries in insertion order.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Iterate over `(source, destination)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }

    /// Number of on-plane vertices mapped to themselves.
    pub fn self_mapped(&self) -> usize {
        self.pairs.iter().filter(|(s, d)| s == d).count()
    }

    /// Source-side vertices for which no counterpart was found.
    pub fn unmatched(&self) -> &[usize] {
        &self.unmatched
    }
}

impl FromIterator<(usize, usize)> for MirrorMap {
    /// Collect entries in order; a repeated source keeps its first slot and
    /// takes the last destination.
    fn from_iter<T: IntoIterator<Item = (usize, usize)>>(iter: T) -> Self {
        let mut map = MirrorMap::default();
        for (source, destination) in iter {
            map.insert(source, destination);
        }
        map
    }
}

/// Build the mirror map of a mesh.
///
/// Computes connected components from the mesh edges and then calls
/// [`mirror_map`].
pub fn build_mirror_map<M: MeshAccess + ?Sized>(mesh: &M, options: &MirrorOptions) -> MirrorMap {
    let positions = mesh.positions_vec();
    let components = connected_components(mesh);
    mirror_map(&positions, &components, options)
}

/// Build a mirror map from base positions and precomputed components.
///
/// See the [module documentation](self) for the matching rules.
pub fn mirror_map(
    positions: &[Point3<f64>],
    components: &Components,
    options: &MirrorOptions,
) -> MirrorMap {
    let axis = options.axis;
    let tolerance = options.tolerance;

    let mut map = MirrorMap::default();
    let mut used = vec![false; positions.len()];

    for component in components.iter() {
        for &i in component {
            let Some(p) = positions.get(i) else {
                continue;
            };
            if !options.direction.is_source(axis.coordinate(p), tolerance) {
                continue;
            }

            let target = axis.reflect_point(p);
            let local = component.iter().copied();
            let found = nearest_unused(local, positions, &target, i, &used, tolerance)
                .or_else(|| {
                    global_nearest(positions, &target, i, &used, tolerance, options.parallel)
                });

            match found {
                Some(j) => {
                    map.insert(i, j);
                    used[j] = true;
                }
                None => map.unmatched.push(i),
            }
        }
    }

    for (i, p) in positions.iter().enumerate() {
        if axis.is_on_plane(p, tolerance) {
            map.insert(i, i);
        }
    }

    let slots = &map.slots;
    map.unmatched.retain(|i| !slots.contains_key(i));

    log::debug!(
        "mirror map on {} axis ({}): {} pairs, {} self-mapped, {} unmatched",
        axis,
        options.direction,
        map.len(),
        map.self_mapped(),
        map.unmatched.len()
    );

    map
}

/// Sequential nearest-candidate search with a tolerance-initialized threshold.
fn nearest_unused(
    candidates: impl Iterator<Item = usize>,
    positions: &[Point3<f64>],
    target: &Point3<f64>,
    exclude: usize,
    used: &[bool],
    tolerance: f64,
) -> Option<usize> {
    let mut best = None;
    let mut best_distance = tolerance;

    for j in candidates {
        if j == exclude {
            continue;
        }
        let (Some(false), Some(p)) = (used.get(j).copied(), positions.get(j)) else {
            continue;
        };
        let d = nalgebra::distance(p, target);
        if d < best_distance {
            best = Some(j);
            best_distance = d;
        }
    }

    best
}

/// Search over every vertex. The parallel path picks the smallest distance
/// and breaks ties on the lowest index, matching the sequential scan.
fn global_nearest(
    positions: &[Point3<f64>],
    target: &Point3<f64>,
    exclude: usize,
    used: &[bool],
    tolerance: f64,
    parallel: bool,
) -> Option<usize> {
    if !parallel {
        return nearest_unused(0..positions.len(), positions, target, exclude, used, tolerance);
    }

    positions
        .par_iter()
        .enumerate()
        .filter(|&(j, _)| j != exclude && !used[j])
        .map(|(j, p)| (j, nalgebra::distance(p, target)))
        .filter(|&(_, d)| d < tolerance)
        .reduce_with(|a, b| if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) { b } else { a })
        .map(|(j, _)| j)
}
