//! Container node. Children are positioned relative to the group's frame.

use crate::node::{Placement, SceneNode, Spatial};

/// An ordered list of child nodes sharing one transform.
///
/// Child order is draw order within equal depths, and flattening preserves it.
#[derive(Debug, Clone, Default)]
pub struct Group {
    placement: Placement,
    children: Vec<SceneNode>,
}

impl Group {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new<I, N>(children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<SceneNode>,
    {
        Self {
            placement: Placement::IDENTITY,
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Append one child after the existing ones.
    #[must_use]
    pub fn add_child(mut self, child: impl Into<SceneNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append children, in order, after the existing ones.
    #[must_use]
    pub fn add_children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<SceneNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

impl Spatial for Group {
    fn placement(&self) -> Placement {
        self.placement
    }

    fn with_placement(self, placement: Placement) -> Self {
        Self { placement, ..self }
    }
}
