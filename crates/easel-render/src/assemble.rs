//! Frame assembly: scene tree → flattened transformers → sorted draw list.

use crate::draw::{DrawCommand, DrawKind, DrawList};
use crate::error::RenderError;
use crate::instance::{InstanceData, StaticBatchCache, build_instances};
use easel_core::{
    BlankLookup, BoundsLocator, CloneBatch, CloneBlank, CloneId, CloneNode, FlattenConfig, Group,
    Material, Renderable, SceneNode, Spatial, Transformer,
};
use glam::Mat4;
use std::sync::Arc;

// ─── Config ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AssembleConfig {
    pub flatten: FlattenConfig,

    /// Drop commands for clones whose blank is not registered (logging a
    /// warning) instead of failing the frame. Default: **false**.
    pub skip_unresolved_blanks: bool,
}

// ─── Assembler ────────────────────────────────────────────────────────────

/// Builds one [`DrawList`] per frame, keeping static batch buffers alive
/// between frames.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    config: AssembleConfig,
    static_batches: StaticBatchCache,
}

impl FrameAssembler {
    pub fn new(config: AssembleConfig) -> Self {
        Self {
            config,
            static_batches: StaticBatchCache::new(),
        }
    }

    pub fn config(&self) -> &AssembleConfig {
        &self.config
    }

    pub fn static_batches(&self) -> &StaticBatchCache {
        &self.static_batches
    }

    pub fn static_batches_mut(&mut self) -> &mut StaticBatchCache {
        &mut self.static_batches
    }

    /// Flatten `root` and turn every leaf into a draw command.
    ///
    /// # Errors
    /// Returns [`RenderError::UnknownBlank`] when a clone names a blank that
    /// `blanks` cannot resolve, unless `skip_unresolved_blanks` is set.
    pub fn assemble(
        &mut self,
        root: &Group,
        blanks: &dyn BlankLookup,
        locator: &dyn BoundsLocator,
    ) -> Result<DrawList, RenderError> {
        let transformers = root.par_to_transformers(&self.config.flatten);
        let mut commands = Vec::with_capacity(transformers.len());

        for transformer in &transformers {
            match self.command_for(transformer, blanks, locator) {
                Ok(Some(command)) => {
                    log::trace!("{} at depth {}", command.batch_key, command.depth.0);
                    commands.push(command);
                }
                Ok(None) => {}
                Err(RenderError::UnknownBlank(id)) if self.config.skip_unresolved_blanks => {
                    log::warn!("skipping clone of unregistered blank `{id}`");
                }
                Err(e) => return Err(e),
            }
        }

        let list = DrawList::from_commands(commands);
        log::debug!(
            "assembled {} commands in {} batches",
            list.len(),
            list.batches().len()
        );
        Ok(list)
    }

    fn command_for(
        &mut self,
        transformer: &Transformer,
        blanks: &dyn BlankLookup,
        locator: &dyn BoundsLocator,
    ) -> Result<Option<DrawCommand>, RenderError> {
        let frame = transformer.full_matrix();
        let depth = transformer.effective_depth();
        let node = transformer.node();

        let command = match node {
            SceneNode::Graphic(graphic) => leaf_command(
                depth,
                graphic.material(),
                DrawKind::Quad {
                    world: frame * graphic.local_matrix(),
                    crop: graphic.crop(),
                },
            ),
            SceneNode::Sprite(sprite) => leaf_command(
                depth,
                sprite.material(),
                DrawKind::AnimatedQuad {
                    world: frame * sprite.local_matrix(),
                    binding_key: sprite.binding_key(),
                    animation_key: sprite.animation_key(),
                    actions: sprite.actions().to_vec(),
                },
            ),
            SceneNode::Text(text) => leaf_command(
                depth,
                text.material(),
                DrawKind::Text {
                    world: frame * text.local_matrix(),
                    text: text.text().to_owned(),
                    alignment: text.alignment(),
                    font_key: text.font_key(),
                    bounds: locator.find_bounds(node),
                },
            ),
            SceneNode::Clone(clone) => self.clone_command(clone, frame, depth, blanks)?,
            SceneNode::CloneBatch(batch) => self.batch_command(batch, frame, depth, blanks)?,
            // Flattening unwraps groups and nested transformers.
            SceneNode::Group(_) | SceneNode::Transformer(_) => return Ok(None),
        };
        Ok(Some(command))
    }

    fn clone_command(
        &self,
        clone: &CloneNode,
        frame: Mat4,
        depth: easel_core::Depth,
        blanks: &dyn BlankLookup,
    ) -> Result<DrawCommand, RenderError> {
        let blank = resolve(blanks, clone.id())?;
        let instances: Arc<[InstanceData]> = Arc::new([InstanceData::from_delta(&clone.transform())]);
        Ok(instances_command(blank, frame, depth, instances, None))
    }

    fn batch_command(
        &mut self,
        batch: &CloneBatch,
        frame: Mat4,
        depth: easel_core::Depth,
        blanks: &dyn BlankLookup,
    ) -> Result<DrawCommand, RenderError> {
        let blank = resolve(blanks, batch.id())?;
        let instances = match batch.static_batch_key() {
            Some(key) => self.static_batches.get_or_build(key, batch),
            None => build_instances(batch),
        };
        Ok(instances_command(
            blank,
            frame,
            depth,
            instances,
            batch.static_batch_key(),
        ))
    }
}

fn resolve(blanks: &dyn BlankLookup, id: CloneId) -> Result<&CloneBlank, RenderError> {
    blanks.blank(id).ok_or(RenderError::UnknownBlank(id))
}

fn leaf_command(depth: easel_core::Depth, material: &Material, kind: DrawKind) -> DrawCommand {
    DrawCommand::new(depth, &material.hash(), material.to_shader_binding(), kind)
}

fn instances_command(
    blank: &CloneBlank,
    frame: Mat4,
    depth: easel_core::Depth,
    instances: Arc<[InstanceData]>,
    static_key: Option<easel_core::BindingKey>,
) -> DrawCommand {
    let template = blank.template();
    let material = template.material();
    DrawCommand::new(
        depth,
        &material.hash(),
        material.to_shader_binding(),
        DrawKind::Instances {
            blank: blank.id(),
            world: frame,
            template: template.placement().local_matrix(),
            instances,
            static_key,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{CloneTransformData, Depth, Graphic, NoMetrics, Point, Rectangle};
    use std::collections::HashMap;

    #[test]
    fn unknown_blank_fails_by_default() {
        let root = Group::new([CloneNode::new(
            CloneId::intern("ghost"),
            Depth(0),
            CloneTransformData::IDENTITY,
        )]);
        let blanks: HashMap<CloneId, CloneBlank> = HashMap::new();
        let err = FrameAssembler::default()
            .assemble(&root, &blanks, &NoMetrics)
            .unwrap_err();
        assert_eq!(err, RenderError::UnknownBlank(CloneId::intern("ghost")));
        assert_eq!(err.to_string(), "clone blank `ghost` is not registered");
    }

    #[test]
    fn unknown_blank_skipped_when_configured() {
        let root = Group::new::<_, SceneNode>([
            CloneNode::new(CloneId::intern("ghost"), Depth(0), CloneTransformData::IDENTITY).into(),
            Graphic::new(Rectangle::new(0.0, 0.0, 4.0, 4.0), Material::basic("dot"))
                .move_to(Point::new(1.0, 1.0))
                .into(),
        ]);
        let mut assembler = FrameAssembler::new(AssembleConfig {
            skip_unresolved_blanks: true,
            ..Default::default()
        });
        let blanks: HashMap<CloneId, CloneBlank> = HashMap::new();
        let list = assembler.assemble(&root, &blanks, &NoMetrics).unwrap();
        assert_eq!(list.len(), 1);
        assert!(matches!(list.commands()[0].kind, DrawKind::Quad { .. }));
    }
}
