//! Bounds computation.
//!
//! Graphics and groups have purely geometric bounds. Sprites, text, and
//! clones depend on data this crate does not hold (animation frames, font
//! metrics, registered blanks), so their bounds come from a [`BoundsLocator`]
//! supplied by the host.

use crate::geometry::Rectangle;
use crate::group::Group;
use crate::node::{SceneNode, Spatial};

/// Host-provided bounds for nodes whose extent is not known locally.
///
/// Must be total: missing metrics yield [`Rectangle::ZERO`], not an error.
/// Callers that query repeatedly should memoize on their side.
pub trait BoundsLocator {
    fn find_bounds(&self, node: &SceneNode) -> Rectangle;
}

impl<F> BoundsLocator for F
where
    F: Fn(&SceneNode) -> Rectangle,
{
    fn find_bounds(&self, node: &SceneNode) -> Rectangle {
        self(node)
    }
}

/// A locator with no metrics at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetrics;

impl BoundsLocator for NoMetrics {
    fn find_bounds(&self, _node: &SceneNode) -> Rectangle {
        Rectangle::ZERO
    }
}

/// Axis-aligned bounds of `node`, expressed in its parent's frame.
pub fn calculated_bounds(node: &SceneNode, locator: &dyn BoundsLocator) -> Rectangle {
    match node {
        SceneNode::Group(group) => group.calculated_bounds(locator),
        SceneNode::Graphic(graphic) => graphic.bounds(),
        SceneNode::Transformer(t) => {
            calculated_bounds(t.node(), locator).transform(&t.full_matrix())
        }
        SceneNode::Sprite(_) | SceneNode::Text(_) | SceneNode::Clone(_) | SceneNode::CloneBatch(_) => {
            locator.find_bounds(node)
        }
    }
}

impl Group {
    /// Union of the children's bounds carried through this group's matrix.
    /// An empty group has [`Rectangle::ZERO`] bounds.
    pub fn calculated_bounds(&self, locator: &dyn BoundsLocator) -> Rectangle {
        let Some(union) = self
            .children()
            .iter()
            .map(|child| calculated_bounds(child, locator))
            .reduce(|acc, b| acc.expand_to_include(&b))
        else {
            return Rectangle::ZERO;
        };
        union.transform(&self.local_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clone::{CloneNode, CloneTransformData};
    use crate::geometry::{Depth, Point, Vector2};
    use crate::id::{CloneId, FontKey};
    use crate::material::Material;
    use crate::node::{Graphic, Text};

    fn square(x: f32, y: f32) -> Graphic {
        Graphic::new(Rectangle::new(0.0, 0.0, 10.0, 10.0), Material::basic("tiles"))
            .move_to(Point::new(x, y))
    }

    #[test]
    fn empty_group_is_zero_for_any_locator() {
        let wide = |_: &SceneNode| Rectangle::new(-5.0, -5.0, 100.0, 100.0);
        assert_eq!(Group::empty().calculated_bounds(&NoMetrics), Rectangle::ZERO);
        assert_eq!(Group::empty().calculated_bounds(&wide), Rectangle::ZERO);
    }

    #[test]
    fn group_bounds_union_children() {
        let group = Group::new([square(0.0, 0.0), square(30.0, 20.0)]);
        assert_eq!(
            group.calculated_bounds(&NoMetrics),
            Rectangle::new(0.0, 0.0, 40.0, 30.0)
        );
    }

    #[test]
    fn group_bounds_follow_group_transform() {
        let group = Group::new([square(0.0, 0.0)])
            .move_to(Point::new(100.0, 50.0))
            .with_scale(Vector2::splat(2.0));
        assert_eq!(
            group.calculated_bounds(&NoMetrics),
            Rectangle::new(100.0, 50.0, 20.0, 20.0)
        );
    }

    #[test]
    fn delegated_kinds_ask_the_locator() {
        let locator = |node: &SceneNode| match node {
            SceneNode::Text(t) => Rectangle::new(0.0, 0.0, t.text().len() as f32 * 8.0, 16.0),
            _ => Rectangle::ZERO,
        };
        let text = Text::new("hello", FontKey::intern("mono"), Material::basic("font"));
        let clone = CloneNode::new(CloneId::intern("c"), Depth(0), CloneTransformData::IDENTITY);
        let group = Group::new::<_, SceneNode>([text.into(), clone.into()]);
        assert_eq!(
            group.calculated_bounds(&locator),
            Rectangle::new(0.0, 0.0, 40.0, 16.0)
        );
    }

    #[test]
    fn nested_empty_group_contributes_origin() {
        let group = Group::new::<_, SceneNode>([Group::empty().into(), square(10.0, 10.0).into()]);
        assert_eq!(
            group.calculated_bounds(&NoMetrics),
            Rectangle::new(0.0, 0.0, 20.0, 20.0)
        );
    }
}
