//! Lightweight instancing of externally registered templates ("blanks").
//!
//! A [`CloneNode`] or [`CloneBatch`] names its blank by [`CloneId`] and carries
//! only transform deltas. Blanks are owned by an external registry; this crate
//! looks them up through [`BlankLookup`] and never creates or drops them.

use crate::geometry::{Depth, Flip, Point, Radians, Vector2};
use crate::id::{BindingKey, CloneId};
use crate::material::Material;
use crate::node::{Clonable, Graphic, Placement, Renderable, Spatial, Sprite};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::iter::Sum;
use std::ops::Add;

// ─── Transform deltas ────────────────────────────────────────────────────

/// Per-instance transform delta.
///
/// Deltas combine with `⊕` ([`combine`](Self::combine), also `+`): positions
/// and rotations add, scales multiply component-wise, and flips XOR. The
/// operation is associative and commutative with [`IDENTITY`](Self::IDENTITY)
/// as its neutral element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloneTransformData {
    pub position: Point,
    pub rotation: Radians,
    pub scale: Vector2,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl CloneTransformData {
    pub const IDENTITY: Self = Self {
        position: Point::ZERO,
        rotation: Radians::ZERO,
        scale: Vector2::ONE,
        flip_horizontal: false,
        flip_vertical: false,
    };

    pub fn at(position: Point) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn with_position(self, position: Point) -> Self {
        Self { position, ..self }
    }

    #[must_use]
    pub fn with_rotation(self, rotation: Radians) -> Self {
        Self { rotation, ..self }
    }

    #[must_use]
    pub fn with_scale(self, scale: Vector2) -> Self {
        Self { scale, ..self }
    }

    #[must_use]
    pub fn with_flip_horizontal(self, flip_horizontal: bool) -> Self {
        Self {
            flip_horizontal,
            ..self
        }
    }

    #[must_use]
    pub fn with_flip_vertical(self, flip_vertical: bool) -> Self {
        Self {
            flip_vertical,
            ..self
        }
    }

    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self {
            position: self.position + other.position,
            rotation: self.rotation + other.rotation,
            scale: self.scale * other.scale,
            flip_horizontal: self.flip_horizontal ^ other.flip_horizontal,
            flip_vertical: self.flip_vertical ^ other.flip_vertical,
        }
    }

    pub fn flip(&self) -> Flip {
        Flip {
            horizontal: self.flip_horizontal,
            vertical: self.flip_vertical,
        }
    }

    /// The delta as a placement with zero pivot.
    pub fn to_placement(self, depth: Depth) -> Placement {
        Placement {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            depth,
            ref_point: Point::ZERO,
            flip: self.flip(),
        }
    }

    /// Inverse of [`to_placement`](Self::to_placement). The pivot is dropped.
    pub fn from_placement(placement: &Placement) -> Self {
        Self {
            position: placement.position,
            rotation: placement.rotation,
            scale: placement.scale,
            flip_horizontal: placement.flip.horizontal,
            flip_vertical: placement.flip.vertical,
        }
    }
}

impl Default for CloneTransformData {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Add for CloneTransformData {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.combine(rhs)
    }
}

impl Sum for CloneTransformData {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::IDENTITY, Self::combine)
    }
}

// ─── Clone nodes ─────────────────────────────────────────────────────────

/// A single instance of a blank.
///
/// Clones pivot on their own origin. The placement carries no reference point,
/// so [`Spatial::with_ref`] is ignored; every other spatial update maps onto
/// the transform delta.
#[derive(Debug, Clone, PartialEq)]
pub struct CloneNode {
    id: CloneId,
    depth: Depth,
    transform: CloneTransformData,
}

impl CloneNode {
    pub fn new(id: CloneId, depth: Depth, transform: CloneTransformData) -> Self {
        Self {
            id,
            depth,
            transform,
        }
    }

    pub fn id(&self) -> CloneId {
        self.id
    }

    pub fn transform(&self) -> CloneTransformData {
        self.transform
    }

    #[must_use]
    pub fn with_transform(self, transform: CloneTransformData) -> Self {
        Self { transform, ..self }
    }
}

impl Spatial for CloneNode {
    fn placement(&self) -> Placement {
        self.transform.to_placement(self.depth)
    }

    fn with_placement(self, placement: Placement) -> Self {
        Self {
            depth: placement.depth,
            transform: CloneTransformData::from_placement(&placement),
            ..self
        }
    }
}

/// Many instances of one blank drawn in a single instanced call.
///
/// Each entry in `clones` is combined with the batch's baseline `transform`,
/// never with its siblings. Like [`CloneNode`], a batch has no reference
/// point and ignores [`Spatial::with_ref`].
#[derive(Debug, Clone, PartialEq)]
pub struct CloneBatch {
    id: CloneId,
    depth: Depth,
    transform: CloneTransformData,
    clones: Vec<CloneTransformData>,
    static_batch_key: Option<BindingKey>,
}

impl CloneBatch {
    pub fn new(id: CloneId, depth: Depth, transform: CloneTransformData) -> Self {
        Self {
            id,
            depth,
            transform,
            clones: Vec::new(),
            static_batch_key: None,
        }
    }

    pub fn id(&self) -> CloneId {
        self.id
    }

    /// Baseline delta shared by every instance.
    pub fn transform(&self) -> CloneTransformData {
        self.transform
    }

    pub fn clones(&self) -> &[CloneTransformData] {
        &self.clones
    }

    /// When set, the renderer may build this batch's instance buffer once and
    /// reuse it on later frames.
    pub fn static_batch_key(&self) -> Option<BindingKey> {
        self.static_batch_key
    }

    /// Final per-instance deltas, `transform ⊕ clone`, in order.
    pub fn instances(&self) -> impl ExactSizeIterator<Item = CloneTransformData> + '_ {
        self.clones.iter().map(|c| self.transform.combine(*c))
    }

    #[must_use]
    pub fn with_transform(self, transform: CloneTransformData) -> Self {
        Self { transform, ..self }
    }

    /// Append instances after the existing ones.
    #[must_use]
    pub fn add_clones<I: IntoIterator<Item = CloneTransformData>>(mut self, clones: I) -> Self {
        self.clones.extend(clones);
        self
    }

    /// Replace every instance.
    #[must_use]
    pub fn with_clones<I: IntoIterator<Item = CloneTransformData>>(self, clones: I) -> Self {
        Self {
            clones: clones.into_iter().collect(),
            ..self
        }
    }

    #[must_use]
    pub fn with_static_batch_key(self, key: BindingKey) -> Self {
        Self {
            static_batch_key: Some(key),
            ..self
        }
    }

    #[must_use]
    pub fn clear_static_batch_key(self) -> Self {
        Self {
            static_batch_key: None,
            ..self
        }
    }
}

impl Spatial for CloneBatch {
    fn placement(&self) -> Placement {
        self.transform.to_placement(self.depth)
    }

    fn with_placement(self, placement: Placement) -> Self {
        Self {
            depth: placement.depth,
            transform: CloneTransformData::from_placement(&placement),
            ..self
        }
    }
}

// ─── Blanks ──────────────────────────────────────────────────────────────

/// A node that can be cloned.
#[derive(Debug, Clone)]
pub enum BlankTemplate {
    Graphic(Graphic),
    Sprite(Sprite),
}

impl BlankTemplate {
    pub fn material(&self) -> &Material {
        match self {
            Self::Graphic(g) => g.material(),
            Self::Sprite(s) => s.material(),
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Self::Graphic(g) => g.placement(),
            Self::Sprite(s) => s.placement(),
        }
    }
}

impl From<Graphic> for BlankTemplate {
    fn from(g: Graphic) -> Self {
        Self::Graphic(g)
    }
}

impl From<Sprite> for BlankTemplate {
    fn from(s: Sprite) -> Self {
        Self::Sprite(s)
    }
}

/// A registered template that clones refer to by id.
#[derive(Debug, Clone)]
pub struct CloneBlank {
    id: CloneId,
    template: BlankTemplate,
    is_static: bool,
}

impl CloneBlank {
    pub fn new<T>(id: CloneId, template: T) -> Self
    where
        T: Clonable + Into<BlankTemplate>,
    {
        Self {
            id,
            template: template.into(),
            is_static: false,
        }
    }

    pub fn id(&self) -> CloneId {
        self.id
    }

    pub fn template(&self) -> &BlankTemplate {
        &self.template
    }

    /// A static blank does not animate, so the renderer may cache its binding.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[must_use]
    pub fn as_static(self) -> Self {
        Self {
            is_static: true,
            ..self
        }
    }
}

/// Resolves a [`CloneId`] to its blank.
pub trait BlankLookup {
    fn blank(&self, id: CloneId) -> Option<&CloneBlank>;
}

impl BlankLookup for HashMap<CloneId, CloneBlank> {
    fn blank(&self, id: CloneId) -> Option<&CloneBlank> {
        self.get(&id)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;

    fn delta(x: f32, r: f32, s: f32, fh: bool, fv: bool) -> CloneTransformData {
        CloneTransformData {
            position: Point::new(x, -x),
            rotation: Radians(r),
            scale: Vector2::new(s, s * 2.0),
            flip_horizontal: fh,
            flip_vertical: fv,
        }
    }

    #[test]
    fn combine_is_associative() {
        // Powers of two keep the float sums exact.
        let a = delta(1.0, 0.5, 2.0, true, false);
        let b = delta(4.0, 0.25, 0.5, true, true);
        let c = delta(16.0, 2.0, 4.0, false, true);
        assert_eq!(a + (b + c), (a + b) + c);
    }

    #[test]
    fn combine_is_commutative() {
        let a = delta(1.0, 0.5, 2.0, true, false);
        let b = delta(4.0, 0.25, 0.5, false, true);
        assert_eq!(a + b, b + a);
    }

    #[test]
    fn identity_is_neutral() {
        let a = delta(3.0, 1.5, 0.75, true, false);
        assert_eq!(a + CloneTransformData::IDENTITY, a);
        assert_eq!(CloneTransformData::IDENTITY + a, a);
        assert_eq!(CloneTransformData::default(), CloneTransformData::IDENTITY);
    }

    #[test]
    fn flips_xor() {
        let flipped = CloneTransformData::IDENTITY
            .with_flip_horizontal(true)
            .with_flip_vertical(true);
        let twice = flipped + flipped;
        assert!(!twice.flip_horizontal);
        assert!(!twice.flip_vertical);
    }

    #[test]
    fn sum_folds_from_identity() {
        let total: CloneTransformData = [
            CloneTransformData::at(Point::new(1.0, 0.0)),
            CloneTransformData::at(Point::new(2.0, 0.0)),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.position, Point::new(3.0, 0.0));
        let empty: CloneTransformData = std::iter::empty().sum();
        assert_eq!(empty, CloneTransformData::IDENTITY);
    }

    #[test]
    fn batch_instances_combine_with_baseline_only() {
        let batch = CloneBatch::new(
            CloneId::intern("tree"),
            Depth(2),
            CloneTransformData::at(Point::new(100.0, 0.0)),
        )
        .add_clones([
            CloneTransformData::at(Point::new(1.0, 0.0)),
            CloneTransformData::at(Point::new(2.0, 0.0)),
        ]);
        let xs: Vec<f32> = batch.instances().map(|d| d.position.x).collect();
        assert_eq!(xs, vec![101.0, 102.0]);
    }

    #[test]
    fn add_clones_appends_and_with_clones_replaces() {
        let d = |x| CloneTransformData::at(Point::new(x, 0.0));
        let batch = CloneBatch::new(CloneId::intern("tree"), Depth(0), CloneTransformData::IDENTITY)
            .with_clones([d(0.0)]);
        let appended = batch.clone().add_clones([d(1.0), d(2.0)]);
        assert_eq!(appended.clones(), &[d(0.0), d(1.0), d(2.0)]);

        let replaced = appended.with_clones([d(9.0)]);
        assert_eq!(replaced.clones(), &[d(9.0)]);
    }

    #[test]
    fn static_batch_key_toggles() {
        let key = BindingKey::intern("forest");
        let batch = CloneBatch::new(CloneId::intern("tree"), Depth(0), CloneTransformData::IDENTITY)
            .with_static_batch_key(key);
        assert_eq!(batch.static_batch_key(), Some(key));
        assert_eq!(batch.clear_static_batch_key().static_batch_key(), None);
    }

    #[test]
    fn clone_node_spatial_roundtrips_through_delta() {
        let node = CloneNode::new(CloneId::intern("coin"), Depth(1), CloneTransformData::IDENTITY)
            .move_to(Point::new(5.0, 6.0))
            .flip_vertical(true)
            .with_depth(Depth(4));
        assert_eq!(node.transform().position, Point::new(5.0, 6.0));
        assert!(node.transform().flip_vertical);
        assert_eq!(node.depth(), Depth(4));
        assert_eq!(node.ref_point(), Point::ZERO);
    }

    #[test]
    fn clones_ignore_ref_point() {
        let delta = CloneTransformData::at(Point::new(3.0, 0.0)).with_rotation(Radians(0.5));
        let node = CloneNode::new(CloneId::intern("coin"), Depth(0), delta);
        let pivoted = node.clone().with_ref(Point::new(10.0, 10.0));
        assert_eq!(pivoted.ref_point(), Point::ZERO);
        assert_eq!(pivoted.local_matrix(), node.local_matrix());

        let batch = CloneBatch::new(CloneId::intern("coin"), Depth(0), delta)
            .with_ref(Point::new(10.0, 10.0));
        assert_eq!(batch.transform(), delta);
    }

    #[test]
    fn blank_lookup_by_id() {
        let id = CloneId::intern("coin");
        let blank = CloneBlank::new(
            id,
            Graphic::new(Rectangle::new(0.0, 0.0, 8.0, 8.0), Material::basic("coin")),
        )
        .as_static();
        let registry: HashMap<CloneId, CloneBlank> = [(id, blank)].into_iter().collect();
        assert!(registry.blank(id).is_some_and(CloneBlank::is_static));
        assert!(registry.blank(CloneId::intern("missing")).is_none());
    }
}
