//! Shape key delta transfer across a mirror map.
//!
//! Two operations are provided:
//!
//! - [`symmetrize`]: overwrite the destination side's deltas with the
//!   reflected deltas of the source side
//! - [`swap`]: exchange reflected deltas between every mapped pair
//!
//! Both validate everything up front (shape keys present, key found, relative
//! key present, reference symmetric, non-empty map) and return an error
//! without touching the target key if any check fails. Once the transfer loop
//! starts, pairs whose indices fall outside the key data are skipped and the
//! rest of the map is still applied.
//!
//! # Example
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
//! let mut keys = ShapeKeySet::with_basis(base.clone());
//! let mut smile = base;
//! smile[0].z += 0.5;
//! keys.add_key("Smile", smile, keys.basis()).unwrap();
//!
//! let mut object = MeshObject::new(mesh).with_shape_keys(keys);
//! symmetrize(&mut object, "Smile", &MirrorOptions::default()).unwrap();
//!
//! let keys = object.shape_keys.as_ref().unwrap();
//! let smile = keys.find("Smile").unwrap();
//! assert_eq!(keys.key_positions(smile)[1], Point3::new(1.0, 0.0, 0.5));
//! ```

use std::collections::HashSet;

use nalgebra::Point3;

use super::components::connected_components;
use super::mirror::{mirror_map, Axis, Direction, MirrorMap, MirrorOptions};
use super::symmetry::find_asymmetry;
use crate::error::{MirrorError, Result};
use crate::mesh::{KeyId, MeshAccess, MeshObject, ShapeKeyStore};

/// Summary of a transfer pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Number of map entries visited.
    pub pairs: usize,
    /// Number of entries whose data was written.
    pub written: usize,
    /// Number of entries skipped because an index was out of range.
    pub skipped: usize,
}

/// Everything a transfer needs once the preconditions have passed.
struct Prepared {
    target: KeyId,
    reference: Vec<Point3<f64>>,
    map: MirrorMap,
}

/// Mirror the source side of a shape key onto the destination side.
///
/// For each map entry `(src, dst)`, the delta of `src` against the relative
/// key is reflected across the axis and applied at `dst`. Destinations lying
/// on the mirror plane keep the reference's axis coordinate exactly.
pub fn symmetrize<M, S>(
    object: &mut MeshObject<M, S>,
    key_name: &str,
    options: &MirrorOptions,
) -> Result<TransferReport>
where
    M: MeshAccess,
    S: ShapeKeyStore,
{
    let prepared = prepare(&object.mesh, object.shape_keys.as_ref(), key_name, options)?;
    let keys = object.shape_keys.as_mut().ok_or(MirrorError::NoShapeKeys)?;

    let report = symmetrize_positions(
        keys.key_positions_mut(prepared.target),
        &prepared.reference,
        &prepared.map,
        options.axis,
        options.tolerance,
    );
    log_report("symmetrize", key_name, &report);
    Ok(report)
}

/// Swap reflected deltas between every mapped vertex pair of a shape key.
///
/// Each unordered pair is exchanged at most once, so applying `swap` twice
/// with the same options restores the original key.
pub fn swap<M, S>(
    object: &mut MeshObject<M, S>,
    key_name: &str,
    options: &MirrorOptions,
) -> Result<TransferReport>
where
    M: MeshAccess,
    S: ShapeKeyStore,
{
    let prepared = prepare(&object.mesh, object.shape_keys.as_ref(), key_name, options)?;
    let keys = object.shape_keys.as_mut().ok_or(MirrorError::NoShapeKeys)?;

    let report = swap_positions(
        keys.key_positions_mut(prepared.target),
        &prepared.reference,
        &prepared.map,
        options.axis,
    );
    log_report("swap", key_name, &report);
    Ok(report)
}

/// Run every precondition check and build the transfer map.
fn prepare<M, S>(
    mesh: &M,
    keys: Option<&S>,
    key_name: &str,
    options: &MirrorOptions,
) -> Result<Prepared>
where
    M: MeshAccess,
    S: ShapeKeyStore,
{
    options.validate()?;

    let keys = keys.ok_or(MirrorError::NoShapeKeys)?;
    let target = keys
        .find_key(key_name)
        .ok_or_else(|| MirrorError::ShapeKeyNotFound {
            name: key_name.to_string(),
        })?;
    let reference_key = keys
        .relative_key(target)
        .ok_or_else(|| MirrorError::NoReferenceKey {
            name: key_name.to_string(),
        })?;
    let reference = keys.key_positions(reference_key).to_vec();

    let positions = mesh.positions_vec();
    let components = connected_components(mesh);

    // The reference is always validated against the negative-to-positive map.
    let check_options = options
        .clone()
        .with_direction(Direction::NegativeToPositive);
    let check_map = mirror_map(&positions, &components, &check_options);

    let asymmetry = find_asymmetry(&reference, &check_map, options.axis, options.tolerance);
    if let Some(asymmetry) = asymmetry {
        log::debug!(
            "reference '{}' breaks symmetry at {} -> {} (distance {:.6})",
            keys.key_name(reference_key),
            asymmetry.source,
            asymmetry.destination,
            asymmetry.distance
        );
        return Err(MirrorError::AsymmetricReference {
            reference: keys.key_name(reference_key).to_string(),
            axis: options.axis,
        });
    }

    let map = if options.direction == Direction::NegativeToPositive {
        check_map
    } else {
        mirror_map(&positions, &components, options)
    };

    if map.is_empty() {
        return Err(MirrorError::EmptyMirrorMap);
    }
    if !map.unmatched().is_empty() {
        log::warn!(
            "{} source vertices have no mirror counterpart within tolerance {}",
            map.unmatched().len(),
            options.tolerance
        );
    }

    Ok(Prepared {
        target,
        reference,
        map,
    })
}

/// Apply the symmetrize transfer to raw position data.
///
/// `target` is updated in place; `reference` holds the relative key's
/// positions. Entries with out-of-range indices are counted as skipped.
pub fn symmetrize_positions(
    target: &mut [Point3<f64>],
    reference: &[Point3<f64>],
    map: &MirrorMap,
    axis: Axis,
    tolerance: f64,
) -> TransferReport {
    let mut report = TransferReport::default();
    let a = axis.index();

    for (src, dst) in map.iter() {
        report.pairs += 1;

        let (Some(&ref_src), Some(&ref_dst), Some(&cur_src)) =
            (reference.get(src), reference.get(dst), target.get(src))
        else {
            report.skipped += 1;
            continue;
        };
        let Some(slot) = target.get_mut(dst) else {
            report.skipped += 1;
            continue;
        };

        let delta = axis.reflect_vector(&(cur_src - ref_src));
        let mut moved = ref_dst + delta;
        if axis.is_on_plane(&ref_dst, tolerance) {
            moved[a] = ref_dst[a];
        }

        *slot = moved;
        report.written += 1;
    }

    report
}

/// Apply the swap transfer to raw position data.
///
/// The reverse of an already swapped pair is skipped.
pub fn swap_positions(
    target: &mut [Point3<f64>],
    reference: &[Point3<f64>],
    map: &MirrorMap,
    axis: Axis,
) -> TransferReport {
    let mut report = TransferReport::default();
    let mut swapped = HashSet::new();

    for (src, dst) in map.iter() {
        report.pairs += 1;
        if swapped.contains(&(dst, src)) {
            continue;
        }

        let (Some(&ref_src), Some(&ref_dst), Some(&cur_src), Some(&cur_dst)) = (
            reference.get(src),
            reference.get(dst),
            target.get(src),
            target.get(dst),
        ) else {
            report.skipped += 1;
            continue;
        };

        let delta_src = axis.reflect_vector(&(cur_src - ref_src));
        let delta_dst = axis.reflect_vector(&(cur_dst - ref_dst));

        target[src] = ref_src + delta_dst;
        target[dst] = ref_dst + delta_src;

        swapped.insert((src, dst));
        report.written += 1;
    }

    report
}

fn log_report(operation: &str, key_name: &str, report: &TransferReport) {
    log::debug!(
        "{} '{}': {} pairs, {} written, {} skipped",
        operation,
        key_name,
        report.pairs,
        report.written,
        report.skipped
    );
}
