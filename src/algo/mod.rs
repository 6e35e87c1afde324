//! Mirror algorithms.
//!
//! - **Components**: connected component partitioning of the edge graph
//! - **Mirror**: vertex correspondence across an axis plane
//! - **Symmetry**: checking a reference shape key against a mirror map
//! - **Transfer**: symmetrizing or swapping shape key deltas

pub mod components;
pub mod mirror;
pub mod symmetry;
pub mod transfer;
