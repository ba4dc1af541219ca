//! Integration tests: scene construction → flattening → bounds and hashes.
//!
//! Exercises the public `easel-core` API the way a game's frame builder
//! would, checking the behaviour a renderer relies on.

use easel_core::*;
use pretty_assertions::assert_eq;
use std::f32::consts::FRAC_PI_2;

fn tile() -> Graphic {
    Graphic::new(Rectangle::new(0.0, 0.0, 16.0, 16.0), Material::basic("tiles"))
}

fn hero() -> Sprite {
    Sprite::new(
        BindingKey::intern("hero"),
        AnimationKey::intern("hero_walk"),
        Material::basic("hero_sheet"),
    )
}

fn near(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
}

// ─── Hashing ─────────────────────────────────────────────────────────────

#[test]
fn material_hash_is_stable_across_calls() {
    let m = Material::from(
        GlslShader::new(ShaderId::intern("ripple"))
            .with_uniforms([("AMP", ShaderPrimitive::Float(0.3))])
            .with_channel0(AssetName::intern("water")),
    );
    let first = m.hash();
    for _ in 0..10 {
        assert_eq!(m.hash(), first);
    }
}

#[test]
fn alpha_changes_the_batch_key() {
    let opaque = Material::basic("crate");
    let faded = Material::Basic(Basic::new(AssetName::intern("crate")).with_alpha(0.5));
    assert_ne!(opaque.hash(), faded.hash());
}

// ─── Flattening ──────────────────────────────────────────────────────────

#[test]
fn mixed_tree_flattens_every_leaf_kind() {
    let label = Text::new("HP", FontKey::intern("pixel"), Material::basic("font_atlas"));
    let coin = CloneNode::new(
        CloneId::intern("coin"),
        Depth(1),
        CloneTransformData::at(Point::new(4.0, 4.0)),
    );
    let forest = CloneBatch::new(CloneId::intern("tree"), Depth(2), CloneTransformData::IDENTITY)
        .add_clones([CloneTransformData::at(Point::new(1.0, 0.0))]);

    let scene = Group::new::<_, SceneNode>([
        tile().into(),
        Group::new::<_, SceneNode>([hero().play().into(), label.into()]).into(),
        coin.into(),
        forest.into(),
    ])
    .with_depth(Depth(10));

    let kinds: Vec<&str> = scene
        .to_transformers()
        .iter()
        .map(|t| t.node().kind_name())
        .collect();
    assert_eq!(kinds, vec!["graphic", "sprite", "text", "clone", "clone_batch"]);

    let depths: Vec<i32> = scene
        .to_transformers()
        .iter()
        .map(|t| t.effective_depth().0)
        .collect();
    assert_eq!(depths, vec![10, 10, 10, 11, 12]);
}

#[test]
fn sprite_actions_survive_flattening() {
    let scene = Group::new([hero().play().jump_to_frame(7)]);
    let flat = scene.to_transformers();
    let SceneNode::Sprite(sprite) = flat[0].node() else {
        panic!("expected a sprite");
    };
    assert_eq!(
        sprite.actions(),
        &[AnimationAction::Play, AnimationAction::JumpToFrame(7)]
    );
}

#[test]
fn pivot_rotation_and_position_compose() {
    // Pivot (10, 10) lands on (200, 100); the leaf origin sits at (-10, -10)
    // from the pivot and rotates a quarter turn to (10, -10).
    let scene = Group::new([tile()])
        .with_ref(Point::new(10.0, 10.0))
        .rotate_to(Radians(FRAC_PI_2))
        .move_to(Point::new(200.0, 100.0));
    let flat = scene.to_transformers();
    let origin = Point::ZERO.transform(&flat[0].matrix());
    assert!(near(origin, Point::new(210.0, 90.0)), "got {origin:?}");
}

#[test]
fn group_flip_mirrors_children() {
    let scene = Group::new([tile().move_to(Point::new(5.0, 0.0))]).flip_horizontal(true);
    let flat = scene.to_transformers();
    let world = Point::ZERO.transform(&(flat[0].matrix() * flat[0].node().local_matrix()));
    assert!(near(world, Point::new(-5.0, 0.0)), "got {world:?}");
}

// ─── Bounds ──────────────────────────────────────────────────────────────

#[test]
fn text_bounds_come_from_the_locator() {
    let locator = |node: &SceneNode| match node {
        SceneNode::Text(t) => Rectangle::new(0.0, 0.0, 6.0 * t.text().len() as f32, 10.0),
        _ => Rectangle::ZERO,
    };
    let scene = Group::new::<_, SceneNode>([
        Text::new("GAME OVER", FontKey::intern("pixel"), Material::basic("font_atlas")).into(),
        tile().move_to(Point::new(0.0, 20.0)).into(),
    ]);
    assert_eq!(
        scene.calculated_bounds(&locator),
        Rectangle::new(0.0, 0.0, 54.0, 36.0)
    );
}

#[test]
fn flattened_bounds_match_group_bounds() {
    let scene = Group::new([tile(), tile().move_to(Point::new(32.0, 8.0))])
        .move_to(Point::new(100.0, 100.0));
    let direct = scene.calculated_bounds(&NoMetrics);
    let via_transformers = scene
        .to_transformers()
        .into_iter()
        .map(|t| calculated_bounds(&SceneNode::Transformer(t), &NoMetrics))
        .reduce(|a, b| a.expand_to_include(&b))
        .unwrap_or(Rectangle::ZERO);
    assert_eq!(direct, via_transformers);
}
