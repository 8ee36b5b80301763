// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Errors raised to a caller are split by what went wrong:
//!
//! - [`PropertyError`]: a property name or value was rejected by the node's
//!   kind schema.
//! - [`TreeError`]: a structural request (adopt, remove, destroy) could not
//!   be honored.
//!
//! [`Error`] wraps both and is what [`Canvas`](crate::canvas::Canvas)
//! operations return.
//!
//! [`SyncError`] is different: it is produced by per-property sync functions
//! and is never returned to a caller. The scheduler logs it, leaves the
//! property dirty, and retries it on the next pass.

use alloc::string::String;
use core::fmt;

use crate::schema::KindId;
use crate::tree::NodeId;

/// A property name or value was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyError {
    /// The name is not part of the node kind's schema.
    Unknown {
        /// Name of the node kind.
        kind: &'static str,
        /// The rejected property name.
        property: String,
    },
    /// A type-specific setter rejected the value.
    InvalidValue {
        /// The property being set.
        property: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// The name is a settable pseudo-property with no sync slot, so it cannot
    /// be dirtied or read back as a computed value.
    NotSynced {
        /// The pseudo-property name.
        property: &'static str,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { kind, property } => {
                write!(f, "unknown property `{property}` for kind `{kind}`")
            }
            Self::InvalidValue { property, reason } => {
                write!(f, "invalid value for `{property}`: {reason}")
            }
            Self::NotSynced { property } => {
                write!(f, "`{property}` is a pseudo-property and has no sync slot")
            }
        }
    }
}

impl core::error::Error for PropertyError {}

/// A structural operation on the tree was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The handle refers to a destroyed node.
    StaleNode(NodeId),
    /// The node already has a parent; detach it first.
    AlreadyParented(NodeId),
    /// The node's kind cannot own children.
    NotAContainer(NodeId),
    /// Adopting the node would make it its own ancestor.
    WouldCycle(NodeId),
    /// The node is not a child of the given container.
    NotAChild(NodeId),
    /// The canvas root cannot be adopted, detached, or destroyed.
    RootImmutable,
    /// No schema is registered under this kind.
    UnknownKind(KindId),
    /// Root kinds only describe the canvas itself; no other node may use one.
    RootKind,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "stale node handle {id:?}"),
            Self::AlreadyParented(id) => write!(f, "{id:?} already has a parent"),
            Self::NotAContainer(id) => write!(f, "{id:?} cannot own children"),
            Self::WouldCycle(id) => write!(f, "adopting {id:?} would create a cycle"),
            Self::NotAChild(id) => write!(f, "{id:?} is not a child of this container"),
            Self::RootImmutable => f.write_str("the canvas root cannot be restructured"),
            Self::UnknownKind(kind) => write!(f, "no schema registered for {kind:?}"),
            Self::RootKind => f.write_str("root kinds are reserved for the canvas"),
        }
    }
}

impl core::error::Error for TreeError {}

/// Errors returned by [`Canvas`](crate::canvas::Canvas) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A property operation failed.
    Property(PropertyError),
    /// A structural operation failed.
    Tree(TreeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(e) => fmt::Display::fmt(e, f),
            Self::Tree(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Property(e) => Some(e),
            Self::Tree(e) => Some(e),
        }
    }
}

impl From<PropertyError> for Error {
    fn from(e: PropertyError) -> Self {
        Self::Property(e)
    }
}

impl From<TreeError> for Error {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}

/// A fault raised by a per-property sync function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncError {
    /// The stored raw value does not have the shape the sync function reads.
    Mismatch {
        /// The property whose raw value was read.
        property: &'static str,
        /// The shape the sync function expected.
        expected: &'static str,
    },
    /// A host-defined sync function failed.
    Custom(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch { property, expected } => {
                write!(f, "raw value of `{property}` is not {expected}")
            }
            Self::Custom(msg) => f.write_str(msg),
        }
    }
}

impl core::error::Error for SyncError {}
