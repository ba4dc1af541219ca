//! The per-frame draw list: positioned, depth-ordered, batch-keyed commands.

use crate::instance::InstanceData;
use easel_core::{
    AnimationAction, AnimationKey, BindingKey, CloneId, Depth, FontKey, Rectangle, ShaderBinding,
    TextAlignment,
};
use glam::Mat4;
use std::sync::Arc;

/// What to draw. All matrices map into the root (world) frame.
#[derive(Debug, Clone)]
pub enum DrawKind {
    /// A textured quad the size of `crop`.
    Quad { world: Mat4, crop: Rectangle },

    /// A sprite quad; the current frame is owned by the animation subsystem.
    AnimatedQuad {
        world: Mat4,
        binding_key: BindingKey,
        animation_key: AnimationKey,
        actions: Vec<AnimationAction>,
    },

    /// A text run, with bounds as measured by the host's locator.
    Text {
        world: Mat4,
        text: String,
        alignment: TextAlignment,
        font_key: FontKey,
        bounds: Rectangle,
    },

    /// Instances of a blank. Instance `i` is drawn with
    /// `world * instances[i].model * template`.
    Instances {
        blank: CloneId,
        world: Mat4,
        template: Mat4,
        instances: Arc<[InstanceData]>,
        static_key: Option<BindingKey>,
    },
}

impl DrawKind {
    fn tag(&self) -> &'static str {
        match self {
            Self::Quad { .. } => "quad",
            Self::AnimatedQuad { .. } => "sprite",
            Self::Text { .. } => "text",
            Self::Instances { .. } => "instances",
        }
    }
}

/// One draw instruction.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub depth: Depth,
    /// Commands with equal keys can share a draw call.
    pub batch_key: String,
    pub binding: ShaderBinding,
    pub kind: DrawKind,
}

impl DrawCommand {
    /// Build a command keyed by its kind and its material hash.
    pub fn new(depth: Depth, material_hash: &str, binding: ShaderBinding, kind: DrawKind) -> Self {
        let batch_key = match &kind {
            DrawKind::Instances { blank, .. } => {
                format!("{}:{}:{material_hash}", kind.tag(), blank.as_str())
            }
            _ => format!("{}:{material_hash}", kind.tag()),
        };
        Self {
            depth,
            batch_key,
            binding,
            kind,
        }
    }
}

/// A maximal run of consecutive commands sharing a batch key.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub key: &'a str,
    pub commands: &'a [DrawCommand],
}

/// Draw commands ordered back to front.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Sort `commands` back to front. Higher depth is further away and drawn
    /// first; equal depths keep their given order.
    pub fn from_commands(mut commands: Vec<DrawCommand>) -> Self {
        commands.sort_by_key(|c| std::cmp::Reverse(c.depth));
        Self { commands }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn batches(&self) -> Vec<Batch<'_>> {
        self.commands
            .chunk_by(|a, b| a.batch_key == b.batch_key)
            .map(|run| Batch {
                key: &run[0].batch_key,
                commands: run,
            })
            .collect()
    }
}
