// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple).
//! - `rtree`: generic R-tree (`T: Scalar`) with Guttman's quadratic split
//!   (aliases: `RTreeF32`, `RTreeF64`, `RTreeI64`).
//!
//! Quadratic split
//! ---------------
//! When a node overflows, the two entries that would waste the most area if
//! grouped together become the seeds of two new groups. The remaining entries
//! are assigned one at a time, always picking the entry with the strongest
//! preference (largest difference in area enlargement) first. A group that
//! needs every remaining entry to reach the minimum fill takes them all.
//! Area comparisons run in the widened accumulator (`f32`→`f64`,
//! `f64`→`f64`, `i64`→`i128`).

pub(crate) mod flatvec;
pub(crate) mod rtree;

pub use flatvec::FlatVec;
pub use rtree::{MAX_ENTRIES, MIN_ENTRIES, RTree, RTreeF32, RTreeF64, RTreeI64};
