//! pixfade DOM - Document Object Model
//!
//! Arena-backed DOM tree that image markup is rendered into and
//! hydrated against, plus the geometry and intersection observation
//! used for lazy loading.

mod document;
mod error;
mod node;
mod serialize;
mod tree;

pub mod geometry;
pub mod observer;

pub use document::Document;
pub use error::DomError;
pub use geometry::DOMRect;
pub use node::{Attribute, ElementData, Node, NodeData};
pub use observer::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverOptions};
pub use tree::{Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node" links
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Build an id from its arena index
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
