pub mod animation;
pub mod bounds;
pub mod clone;
pub mod event;
pub mod flatten;
pub mod geometry;
pub mod group;
pub mod hash;
pub mod id;
pub mod material;
pub mod node;

pub use animation::AnimationAction;
pub use bounds::{BoundsLocator, NoMetrics, calculated_bounds};
pub use clone::{BlankLookup, BlankTemplate, CloneBatch, CloneBlank, CloneNode, CloneTransformData};
pub use event::{Event, EventHandlerFn};
pub use flatten::FlattenConfig;
pub use geometry::*;
pub use group::Group;
pub use id::{AnimationKey, AssetName, BindingKey, CloneId, CycleLabel, EventName, FontKey, ShaderId};
pub use material::{Basic, GlslShader, Material, ShaderBinding, ShaderPrimitive};
pub use node::*;

// Re-export glam so downstream crates share the same matrix type
pub use glam;
