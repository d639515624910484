// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by every fallible tree and scene operation.

use crate::types::NodeId;

/// Why a tree or scene operation was rejected.
///
/// Operations validate before touching any state, so an error always leaves
/// the tree exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The id was never issued by this tree or its node has been removed.
    #[error("node {0:?} does not exist")]
    NotFound(NodeId),
    /// The change would break the tree shape, e.g. a cycle or a second root.
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(&'static str),
    /// Geometry that needs a parent was given to the root.
    #[error("precondition violated: {0}")]
    PreconditionViolated(&'static str),
    /// A style value or fraction is out of range.
    #[error("invalid node: {0}")]
    InvalidNode(&'static str),
}

/// Result alias defaulting to [`SceneError`].
pub type Result<T, E = SceneError> = core::result::Result<T, E>;
