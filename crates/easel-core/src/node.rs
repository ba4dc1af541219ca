//! Scene node taxonomy and the capability traits shared across it.
//!
//! Nodes are immutable values. Every `with`-style operation consumes the node
//! and returns the updated copy; nothing is mutated after publication.
//!
//! Capabilities are orthogonal:
//!
//! - [`Spatial`]: every node kind.
//! - [`Renderable`]: `Graphic`, `Sprite`, `Text`.
//! - [`EventHandler`]: `Sprite`, `Text`.
//! - [`Clonable`]: `Graphic`, `Sprite` (the kinds a clone blank may hold).

use crate::animation::AnimationAction;
use crate::clone::{CloneBatch, CloneNode};
use crate::event::{Event, EventHandlerFn};
use crate::geometry::{Depth, Flip, Point, Radians, Rectangle, Vector2};
use crate::group::Group;
use crate::id::{AnimationKey, BindingKey, CycleLabel, FontKey};
use crate::material::Material;
use glam::{Mat4, Vec3};
use smallvec::SmallVec;

// ─── Placement ───────────────────────────────────────────────────────────

/// The spatial fields every node carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    pub rotation: Radians,
    pub scale: Vector2,
    pub depth: Depth,
    /// Pivot for scale and rotation; lands on `position`.
    pub ref_point: Point,
    pub flip: Flip,
}

impl Placement {
    pub const IDENTITY: Self = Self {
        position: Point::ZERO,
        rotation: Radians::ZERO,
        scale: Vector2::ONE,
        depth: Depth::ZERO,
        ref_point: Point::ZERO,
        flip: Flip::NONE,
    };

    /// Matrix from this node's local frame to its parent's frame.
    ///
    /// Applied to a point in this order: flip, translate by `-ref_point`,
    /// scale, rotate, translate by `position`.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.position.x, self.position.y, 0.0))
            * Mat4::from_rotation_z(self.rotation.0)
            * Mat4::from_scale(Vec3::new(self.scale.x, self.scale.y, 1.0))
            * Mat4::from_translation(Vec3::new(-self.ref_point.x, -self.ref_point.y, 0.0))
            * Mat4::from_scale(self.flip.as_scale())
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ─── Capabilities ────────────────────────────────────────────────────────

/// Position, rotation, scale, depth, pivot, and flip, with `with`-style updates.
pub trait Spatial: Sized {
    fn placement(&self) -> Placement;

    #[must_use]
    fn with_placement(self, placement: Placement) -> Self;

    #[must_use]
    fn update_placement<F: FnOnce(&mut Placement)>(self, f: F) -> Self {
        let mut placement = self.placement();
        f(&mut placement);
        self.with_placement(placement)
    }

    fn position(&self) -> Point {
        self.placement().position
    }

    fn rotation(&self) -> Radians {
        self.placement().rotation
    }

    fn scale(&self) -> Vector2 {
        self.placement().scale
    }

    fn depth(&self) -> Depth {
        self.placement().depth
    }

    fn ref_point(&self) -> Point {
        self.placement().ref_point
    }

    fn flip(&self) -> Flip {
        self.placement().flip
    }

    fn local_matrix(&self) -> Mat4 {
        self.placement().local_matrix()
    }

    #[must_use]
    fn move_to(self, position: Point) -> Self {
        self.update_placement(|p| p.position = position)
    }

    #[must_use]
    fn move_by(self, delta: Point) -> Self {
        self.update_placement(|p| p.position = p.position + delta)
    }

    #[must_use]
    fn rotate_to(self, rotation: Radians) -> Self {
        self.update_placement(|p| p.rotation = rotation)
    }

    #[must_use]
    fn rotate_by(self, delta: Radians) -> Self {
        self.update_placement(|p| p.rotation = p.rotation + delta)
    }

    #[must_use]
    fn with_scale(self, scale: Vector2) -> Self {
        self.update_placement(|p| p.scale = scale)
    }

    /// Multiply the current scale component-wise.
    #[must_use]
    fn scale_by(self, factor: Vector2) -> Self {
        self.update_placement(|p| p.scale = p.scale * factor)
    }

    #[must_use]
    fn with_depth(self, depth: Depth) -> Self {
        self.update_placement(|p| p.depth = depth)
    }

    #[must_use]
    fn with_ref(self, ref_point: Point) -> Self {
        self.update_placement(|p| p.ref_point = ref_point)
    }

    #[must_use]
    fn flip_horizontal(self, flipped: bool) -> Self {
        self.update_placement(|p| p.flip.horizontal = flipped)
    }

    #[must_use]
    fn flip_vertical(self, flipped: bool) -> Self {
        self.update_placement(|p| p.flip.vertical = flipped)
    }

    #[must_use]
    fn transform_to(self, position: Point, rotation: Radians, scale: Vector2) -> Self {
        self.update_placement(|p| {
            p.position = position;
            p.rotation = rotation;
            p.scale = scale;
        })
    }

    #[must_use]
    fn transform_by(self, position_delta: Point, rotation_delta: Radians, scale_factor: Vector2) -> Self {
        self.update_placement(|p| {
            p.position = p.position + position_delta;
            p.rotation = p.rotation + rotation_delta;
            p.scale = p.scale * scale_factor;
        })
    }
}

/// Leaves that draw through a material.
pub trait Renderable: Spatial {
    fn material(&self) -> &Material;

    #[must_use]
    fn with_material(self, material: Material) -> Self;

    #[must_use]
    fn modify_material<F: FnOnce(Material) -> Material>(self, f: F) -> Self {
        let material = f(self.material().clone());
        self.with_material(material)
    }
}

/// Leaves that react to events. Their bounds come from a
/// [`BoundsLocator`](crate::bounds::BoundsLocator).
pub trait EventHandler: Sized {
    fn event_handler(&self) -> &EventHandlerFn;

    #[must_use]
    fn with_event_handler(self, handler: EventHandlerFn) -> Self;

    #[must_use]
    fn on_event<F>(self, f: F) -> Self
    where
        F: Fn(Rectangle, &Event) -> Vec<Event> + Send + Sync + 'static,
    {
        self.with_event_handler(EventHandlerFn::new(f))
    }

    fn handle_event(&self, bounds: Rectangle, event: &Event) -> Vec<Event> {
        self.event_handler().call(bounds, event)
    }
}

/// Leaves that may serve as a clone blank's template.
pub trait Clonable: Renderable {}

// ─── Graphic ─────────────────────────────────────────────────────────────

/// A static image: a crop of a source texture drawn with a material.
#[derive(Debug, Clone, PartialEq)]
pub struct Graphic {
    placement: Placement,
    material: Material,
    crop: Rectangle,
}

impl Graphic {
    pub fn new(crop: Rectangle, material: Material) -> Self {
        Self {
            placement: Placement::IDENTITY,
            material,
            crop,
        }
    }

    pub fn crop(&self) -> Rectangle {
        self.crop
    }

    #[must_use]
    pub fn with_crop(self, crop: Rectangle) -> Self {
        Self { crop, ..self }
    }

    /// Geometric bounds in the parent frame: the crop-sized quad carried
    /// through the local matrix.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(0.0, 0.0, self.crop.width, self.crop.height).transform(&self.local_matrix())
    }
}

impl Spatial for Graphic {
    fn placement(&self) -> Placement {
        self.placement
    }

    fn with_placement(self, placement: Placement) -> Self {
        Self { placement, ..self }
    }
}

impl Renderable for Graphic {
    fn material(&self) -> &Material {
        &self.material
    }

    fn with_material(self, material: Material) -> Self {
        Self { material, ..self }
    }
}

impl Clonable for Graphic {}

// ─── Sprite ──────────────────────────────────────────────────────────────

/// An animated image. Frame data lives in the animation subsystem, keyed by
/// `animation_key`; this node only queues commands for it.
#[derive(Debug, Clone)]
pub struct Sprite {
    placement: Placement,
    material: Material,
    binding_key: BindingKey,
    animation_key: AnimationKey,
    actions: SmallVec<[AnimationAction; 2]>,
    handler: EventHandlerFn,
}

impl Sprite {
    pub fn new(binding_key: BindingKey, animation_key: AnimationKey, material: Material) -> Self {
        Self {
            placement: Placement::IDENTITY,
            material,
            binding_key,
            animation_key,
            actions: SmallVec::new(),
            handler: EventHandlerFn::none(),
        }
    }

    /// A sprite with a freshly generated binding key.
    pub fn with_unique_binding(animation_key: AnimationKey, material: Material) -> Self {
        Self::new(BindingKey::unique(), animation_key, material)
    }

    pub fn binding_key(&self) -> BindingKey {
        self.binding_key
    }

    pub fn animation_key(&self) -> AnimationKey {
        self.animation_key
    }

    /// Pending commands, oldest first.
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    #[must_use]
    pub fn with_binding_key(self, binding_key: BindingKey) -> Self {
        Self {
            binding_key,
            ..self
        }
    }

    #[must_use]
    pub fn with_animation_key(self, animation_key: AnimationKey) -> Self {
        Self {
            animation_key,
            ..self
        }
    }

    #[must_use]
    fn push_action(mut self, action: AnimationAction) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn play(self) -> Self {
        self.push_action(AnimationAction::Play)
    }

    #[must_use]
    pub fn change_cycle(self, label: CycleLabel) -> Self {
        self.push_action(AnimationAction::ChangeCycle(label))
    }

    #[must_use]
    pub fn jump_to_first_frame(self) -> Self {
        self.push_action(AnimationAction::JumpToFirstFrame)
    }

    #[must_use]
    pub fn jump_to_last_frame(self) -> Self {
        self.push_action(AnimationAction::JumpToLastFrame)
    }

    #[must_use]
    pub fn jump_to_frame(self, index: u32) -> Self {
        self.push_action(AnimationAction::JumpToFrame(index))
    }

    #[must_use]
    pub fn clear_actions(self) -> Self {
        Self {
            actions: SmallVec::new(),
            ..self
        }
    }
}

impl Spatial for Sprite {
    fn placement(&self) -> Placement {
        self.placement
    }

    fn with_placement(self, placement: Placement) -> Self {
        Self { placement, ..self }
    }
}

impl Renderable for Sprite {
    fn material(&self) -> &Material {
        &self.material
    }

    fn with_material(self, material: Material) -> Self {
        Self { material, ..self }
    }
}

impl EventHandler for Sprite {
    fn event_handler(&self) -> &EventHandlerFn {
        &self.handler
    }

    fn with_event_handler(self, handler: EventHandlerFn) -> Self {
        Self { handler, ..self }
    }
}

impl Clonable for Sprite {}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// A run of text. Shaping and measurement happen outside this crate.
#[derive(Debug, Clone)]
pub struct Text {
    placement: Placement,
    text: String,
    alignment: TextAlignment,
    font_key: FontKey,
    material: Material,
    handler: EventHandlerFn,
}

impl Text {
    pub fn new(text: impl Into<String>, font_key: FontKey, material: Material) -> Self {
        Self {
            placement: Placement::IDENTITY,
            text: text.into(),
            alignment: TextAlignment::default(),
            font_key,
            material,
            handler: EventHandlerFn::none(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn alignment(&self) -> TextAlignment {
        self.alignment
    }

    pub fn font_key(&self) -> FontKey {
        self.font_key
    }

    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_alignment(self, alignment: TextAlignment) -> Self {
        Self { alignment, ..self }
    }

    #[must_use]
    pub fn align_left(self) -> Self {
        self.with_alignment(TextAlignment::Left)
    }

    #[must_use]
    pub fn align_center(self) -> Self {
        self.with_alignment(TextAlignment::Center)
    }

    #[must_use]
    pub fn align_right(self) -> Self {
        self.with_alignment(TextAlignment::Right)
    }

    #[must_use]
    pub fn with_font_key(self, font_key: FontKey) -> Self {
        Self { font_key, ..self }
    }
}

impl Spatial for Text {
    fn placement(&self) -> Placement {
        self.placement
    }

    fn with_placement(self, placement: Placement) -> Self {
        Self { placement, ..self }
    }
}

impl Renderable for Text {
    fn material(&self) -> &Material {
        &self.material
    }

    fn with_material(self, material: Material) -> Self {
        Self { material, ..self }
    }
}

impl EventHandler for Text {
    fn event_handler(&self) -> &EventHandlerFn {
        &self.handler
    }

    fn with_event_handler(self, handler: EventHandlerFn) -> Self {
        Self { handler, ..self }
    }
}

// ─── Transformer ─────────────────────────────────────────────────────────

/// A node paired with the matrix of its parent frame, accumulated from the
/// root. Only the flattening engine creates these.
///
/// The transformer's own placement starts at depth 1 and is otherwise
/// identity. Its position, rotation, scale, pivot and flip act through
/// [`full_matrix`](Self::full_matrix), but its depth does not: draw order
/// always follows [`effective_depth`](Self::effective_depth), the wrapped
/// node's accumulated depth.
#[derive(Debug, Clone)]
pub struct Transformer {
    node: Box<SceneNode>,
    matrix: Mat4,
    placement: Placement,
}

impl Transformer {
    pub(crate) fn new(node: SceneNode, matrix: Mat4) -> Self {
        Self {
            node: Box::new(node),
            matrix,
            placement: Placement {
                depth: Depth(1),
                ..Placement::IDENTITY
            },
        }
    }

    pub fn node(&self) -> &SceneNode {
        &self.node
    }

    pub fn into_node(self) -> SceneNode {
        *self.node
    }

    /// Accumulated matrix from the wrapped node's parent frame to the root frame.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// [`matrix`](Self::matrix) followed by this transformer's own placement.
    pub fn full_matrix(&self) -> Mat4 {
        self.placement.local_matrix() * self.matrix
    }

    /// Depth the renderer sorts by: the wrapped node's accumulated depth.
    /// [`Spatial::with_depth`] on the transformer itself leaves this unchanged.
    pub fn effective_depth(&self) -> Depth {
        self.node.depth()
    }
}

impl Spatial for Transformer {
    fn placement(&self) -> Placement {
        self.placement
    }

    fn with_placement(self, placement: Placement) -> Self {
        Self { placement, ..self }
    }
}

// ─── SceneNode ───────────────────────────────────────────────────────────

/// The closed set of node kinds.
#[derive(Debug, Clone)]
pub enum SceneNode {
    Group(Group),
    Graphic(Graphic),
    Sprite(Sprite),
    Text(Text),
    Transformer(Transformer),
    Clone(CloneNode),
    CloneBatch(CloneBatch),
}

macro_rules! dispatch {
    ($node:expr, $n:ident => $body:expr) => {
        match $node {
            SceneNode::Group($n) => $body,
            SceneNode::Graphic($n) => $body,
            SceneNode::Sprite($n) => $body,
            SceneNode::Text($n) => $body,
            SceneNode::Transformer($n) => $body,
            SceneNode::Clone($n) => $body,
            SceneNode::CloneBatch($n) => $body,
        }
    };
}

macro_rules! rewrap {
    ($node:expr, $n:ident => $body:expr) => {
        match $node {
            SceneNode::Group($n) => SceneNode::Group($body),
            SceneNode::Graphic($n) => SceneNode::Graphic($body),
            SceneNode::Sprite($n) => SceneNode::Sprite($body),
            SceneNode::Text($n) => SceneNode::Text($body),
            SceneNode::Transformer($n) => SceneNode::Transformer($body),
            SceneNode::Clone($n) => SceneNode::Clone($body),
            SceneNode::CloneBatch($n) => SceneNode::CloneBatch($body),
        }
    };
}

impl Spatial for SceneNode {
    fn placement(&self) -> Placement {
        dispatch!(self, n => n.placement())
    }

    fn with_placement(self, placement: Placement) -> Self {
        rewrap!(self, n => n.with_placement(placement))
    }
}

impl SceneNode {
    /// Short kind name, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::Graphic(_) => "graphic",
            Self::Sprite(_) => "sprite",
            Self::Text(_) => "text",
            Self::Transformer(_) => "transformer",
            Self::Clone(_) => "clone",
            Self::CloneBatch(_) => "clone_batch",
        }
    }

    pub fn is_renderable(&self) -> bool {
        matches!(self, Self::Graphic(_) | Self::Sprite(_) | Self::Text(_))
    }

    pub fn handles_events(&self) -> bool {
        matches!(self, Self::Sprite(_) | Self::Text(_))
    }

    pub fn is_clonable(&self) -> bool {
        matches!(self, Self::Graphic(_) | Self::Sprite(_))
    }

    /// The material of a renderable leaf.
    pub fn material(&self) -> Option<&Material> {
        match self {
            Self::Graphic(n) => Some(n.material()),
            Self::Sprite(n) => Some(n.material()),
            Self::Text(n) => Some(n.material()),
            _ => None,
        }
    }

    /// Replace the material of a renderable leaf. Other kinds are returned unchanged.
    #[must_use]
    pub fn with_material(self, material: Material) -> Self {
        match self {
            Self::Graphic(n) => Self::Graphic(n.with_material(material)),
            Self::Sprite(n) => Self::Sprite(n.with_material(material)),
            Self::Text(n) => Self::Text(n.with_material(material)),
            other => other,
        }
    }

    #[must_use]
    pub fn modify_material<F: FnOnce(Material) -> Material>(self, f: F) -> Self {
        match self {
            Self::Graphic(n) => Self::Graphic(n.modify_material(f)),
            Self::Sprite(n) => Self::Sprite(n.modify_material(f)),
            Self::Text(n) => Self::Text(n.modify_material(f)),
            other => other,
        }
    }

    pub fn event_handler(&self) -> Option<&EventHandlerFn> {
        match self {
            Self::Sprite(n) => Some(n.event_handler()),
            Self::Text(n) => Some(n.event_handler()),
            _ => None,
        }
    }

    /// Run the node's handler. Kinds without one emit nothing.
    pub fn handle_event(&self, bounds: Rectangle, event: &Event) -> Vec<Event> {
        self.event_handler()
            .map(|h| h.call(bounds, event))
            .unwrap_or_default()
    }

    /// Add `delta` to the node's depth.
    #[must_use]
    pub fn add_depth(self, delta: Depth) -> Self {
        self.update_placement(|p| p.depth += delta)
    }
}

impl From<Group> for SceneNode {
    fn from(n: Group) -> Self {
        Self::Group(n)
    }
}

impl From<Graphic> for SceneNode {
    fn from(n: Graphic) -> Self {
        Self::Graphic(n)
    }
}

impl From<Sprite> for SceneNode {
    fn from(n: Sprite) -> Self {
        Self::Sprite(n)
    }
}

impl From<Text> for SceneNode {
    fn from(n: Text) -> Self {
        Self::Text(n)
    }
}

impl From<Transformer> for SceneNode {
    fn from(n: Transformer) -> Self {
        Self::Transformer(n)
    }
}

impl From<CloneNode> for SceneNode {
    fn from(n: CloneNode) -> Self {
        Self::Clone(n)
    }
}

impl From<CloneBatch> for SceneNode {
    fn from(n: CloneBatch) -> Self {
        Self::CloneBatch(n)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
