// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera Index: a generic 2D AABB index.
//!
//! - Insert, update, and remove axis-aligned bounding boxes (AABBs) with user payloads.
//! - Query by point or intersecting rectangle, edges inclusive.
//! - Changes are applied immediately; there is no separate commit step.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//! Higher layers (like the Tessera scene tree) compute world-space AABBs and feed them here.
//!
//! Backends are pluggable via the [`Backend`] trait. The default backend is a flat vector
//! (linear scan); [`backends::RTree`] is a balanced R-tree for larger sets.
//!
//! # Example
//!
//! ```rust
//! use tessera_index::{Aabb2D, Index};
//!
//! let mut idx: Index<i64, u32> = Index::new();
//! let k1 = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
//! let _k2 = idx.insert(Aabb2D::new(5, 5, 15, 15), 2);
//!
//! // Move the first box away.
//! idx.update(k1, Aabb2D::new(20, 0, 30, 10));
//!
//! let hits: Vec<_> = idx.query_point(6, 6).collect();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].1, 2);
//! ```
//!
//! Opting into the R-tree:
//!
//! ```rust
//! use tessera_index::{Aabb2D, Index};
//!
//! let mut idx = Index::<f64, u32>::with_rtree();
//! for i in 0..100 {
//!     let x = f64::from(i) * 10.0;
//!     idx.insert(Aabb2D::new(x, 0.0, x + 5.0, 5.0), i);
//! }
//! let hits: Vec<_> = idx
//!     .query_rect(Aabb2D::new(0.0, 0.0, 25.0, 1.0))
//!     .map(|(_, p)| p)
//!     .collect();
//! assert_eq!(hits.len(), 3);
//! ```
//!
//! ## Choosing a backend
//!
//! - `FlatVec` (default): simplest and smallest, linear scans. Good for very small sets
//!   or when updates vastly outnumber queries.
//! - `RTreeF32`/`RTreeF64`/`RTreeI64`: R-tree with quadratic splits and widened area
//!   metrics; a good general-purpose index when updates are frequent.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

#![no_std]

extern crate alloc;

mod backend;
pub mod backends;
mod index;
mod types;

pub use backend::Backend;
pub use index::{Index, IndexGeneric, Key};
pub use types::{Aabb2D, Scalar, ScalarAcc};
