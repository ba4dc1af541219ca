//! Flattening: nested groups → a flat, ordered list of [`Transformer`]s.
//!
//! Each level contributes its own local matrix and depth:
//!
//! - the matrix handed to a group's children is `parent * group.local_matrix()`
//!   (the group's own transform acts first, the root's last);
//! - a child's depth is its own depth plus the accumulated depth of every
//!   enclosing group.
//!
//! Output order is depth-first, left-to-right over the original tree.

use crate::geometry::Depth;
use crate::group::Group;
use crate::node::{SceneNode, Spatial, Transformer};
use glam::Mat4;
use rayon::prelude::*;

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for [`Group::par_to_transformers`].
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// A group's children are split across worker threads only once it has at
    /// least this many. Smaller groups are walked on the calling thread.
    /// Default: **64**.
    pub parallel_threshold: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 64,
        }
    }
}

// ─── Sequential ───────────────────────────────────────────────────────────

impl Group {
    /// Flatten this group with the identity as the parent frame.
    pub fn to_transformers(&self) -> Vec<Transformer> {
        self.to_transformers_from(Mat4::IDENTITY)
    }

    /// Flatten this group as if it were nested in a frame with matrix `parent`.
    pub fn to_transformers_from(&self, parent: Mat4) -> Vec<Transformer> {
        let mut out = Vec::with_capacity(self.children().len());
        flatten_group(self, self.depth(), parent, &mut out);
        log::trace!("flattened group into {} transformers", out.len());
        out
    }

    /// Same result as [`to_transformers`](Self::to_transformers), with large
    /// groups flattened on the rayon pool.
    pub fn par_to_transformers(&self, config: &FlattenConfig) -> Vec<Transformer> {
        par_flatten_group(self, self.depth(), Mat4::IDENTITY, config)
    }
}

fn flatten_group(group: &Group, depth: Depth, parent: Mat4, out: &mut Vec<Transformer>) {
    let frame = parent * group.local_matrix();
    for child in group.children() {
        flatten_child(child, depth, frame, out);
    }
}

fn flatten_child(child: &SceneNode, depth: Depth, frame: Mat4, out: &mut Vec<Transformer>) {
    match child {
        SceneNode::Group(group) => flatten_group(group, group.depth() + depth, frame, out),
        SceneNode::Transformer(t) => {
            // Already flattened: pre-compose its matrix with ours.
            let node = t.node().clone().add_depth(depth);
            out.push(Transformer::new(node, frame * t.full_matrix()));
        }
        leaf => {
            let node = leaf.clone().add_depth(depth);
            log::trace!("wrap {} at depth {}", node.kind_name(), node.depth().0);
            out.push(Transformer::new(node, frame));
        }
    }
}

// ─── Parallel ─────────────────────────────────────────────────────────────

fn par_flatten_group(
    group: &Group,
    depth: Depth,
    parent: Mat4,
    config: &FlattenConfig,
) -> Vec<Transformer> {
    if group.children().len() < config.parallel_threshold {
        let mut out = Vec::new();
        flatten_group(group, depth, parent, &mut out);
        return out;
    }

    let frame = parent * group.local_matrix();
    log::debug!(
        "flattening {} children in parallel",
        group.children().len()
    );
    // Siblings are independent; concatenating per-child results keeps the
    // sequential order.
    let parts: Vec<Vec<Transformer>> = group
        .children()
        .par_iter()
        .map(|child| match child {
            SceneNode::Group(g) => par_flatten_group(g, g.depth() + depth, frame, config),
            other => {
                let mut out = Vec::with_capacity(1);
                flatten_child(other, depth, frame, &mut out);
                out
            }
        })
        .collect();
    parts.concat()
}

// ─── Tests ────────────────────────────────────────────────────────────────
