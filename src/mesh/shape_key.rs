//! Shape keys (named vertex displacement layers).
//!
//! A shape key stores one absolute position per base-mesh vertex. Its delta is
//! always derived against its *relative key*: `positions[v] - relative[v]`.

use std::fmt;

use nalgebra::{Point3, Vector3};

use super::ShapeKeyStore;
use crate::error::{MirrorError, Result};

/// Name given to the first key of a collection created with
/// [`ShapeKeySet::with_basis`].
pub const BASIS_NAME: &str = "Basis";

/// A type-safe shape key index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct KeyId(usize);

impl KeyId {
    /// Create a new key id from a raw index.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "K{}", self.0)
    }
}

/// A single shape key.
#[derive(Debug, Clone)]
pub struct ShapeKey {
    name: String,
    positions: Vec<Point3<f64>>,
    relative_key: Option<KeyId>,
}

impl ShapeKey {
    /// The key name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key's absolute vertex positions.
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// The key this key's deltas are measured against, if any.
    pub fn relative_key(&self) -> Option<KeyId> {
        self.relative_key
    }
}

/// An ordered, named collection of shape keys.
///
/// # Example
/// ```
/// use shapemirror::mesh::ShapeKeySet;
/// use nalgebra::Point3;
///
/// let base = vec![Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
/// let mut keys = ShapeKeySet::with_basis(base.clone());
/// let basis = keys.basis().unwrap();
/// let smile = keys.add_key("Smile", base, Some(basis)).unwrap();
///
/// assert_eq!(keys.len(), 2);
/// assert_eq!(keys.find("Smile"), Some(smile));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShapeKeySet {
    keys: Vec<ShapeKey>,
}

impl ShapeKeySet {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection holding a single `Basis` key, relative to itself.
    pub fn with_basis(positions: Vec<Point3<f64>>) -> Self {
        Self {
            keys: vec![ShapeKey {
                name: BASIS_NAME.to_string(),
                positions,
                relative_key: Some(KeyId(0)),
            }],
        }
    }

    /// Append a key.
    ///
    /// `relative_to` must name a key already in the collection; pass `None`
    /// for a key without a reference.
    pub fn add_key(
        &mut self,
        name: impl Into<String>,
        positions: Vec<Point3<f64>>,
        relative_to: Option<KeyId>,
    ) -> Result<KeyId> {
        let name = name.into();
        if self.find(&name).is_some() {
            return Err(MirrorError::DuplicateShapeKey { name });
        }
        if let Some(rel) = relative_to {
            if rel.index() >= self.keys.len() {
                return Err(MirrorError::invalid_param(
                    "relative_to",
                    rel.index(),
                    "no such shape key",
                ));
            }
        }

        let id = KeyId(self.keys.len());
        self.keys.push(ShapeKey {
            name,
            positions,
            relative_key: relative_to,
        });
        Ok(id)
    }

    /// Find a key by name.
    pub fn find(&self, name: &str) -> Option<KeyId> {
        self.keys.iter().position(|k| k.name == name).map(KeyId)
    }

    /// The first key of the collection, conventionally the basis.
    pub fn basis(&self) -> Option<KeyId> {
        (!self.keys.is_empty()).then_some(KeyId(0))
    }

    /// Get a key by id.
    pub fn get(&self, id: KeyId) -> Option<&ShapeKey> {
        self.keys.get(id.0)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over all keys with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (KeyId, &ShapeKey)> + '_ {
        self.keys.iter().enumerate().map(|(i, k)| (KeyId(i), k))
    }

    /// Delta of vertex `v` in `key` against its relative key.
    ///
    /// Returns `None` if the key has no relative key or `v` is out of range
    /// for either key.
    pub fn delta(&self, key: KeyId, v: usize) -> Option<Vector3<f64>> {
        let key = self.get(key)?;
        let reference = self.get(key.relative_key?)?;
        Some(key.positions.get(v)? - reference.positions.get(v)?)
    }
}

impl ShapeKeyStore for ShapeKeySet {
    fn find_key(&self, name: &str) -> Option<KeyId> {
        self.find(name)
    }

    fn key_name(&self, key: KeyId) -> &str {
        &self.keys[key.0].name
    }

    fn relative_key(&self, key: KeyId) -> Option<KeyId> {
        self.keys[key.0].relative_key
    }

    fn key_positions(&self, key: KeyId) -> &[Point3<f64>] {
        &self.keys[key.0].positions
    }

    fn key_positions_mut(&mut self, key: KeyId) -> &mut [Point3<f64>] {
        &mut self.keys[key.0].positions
    }
}
