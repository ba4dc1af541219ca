pub mod assemble;
pub mod draw;
pub mod error;
pub mod instance;
pub mod registry;

pub use assemble::{AssembleConfig, FrameAssembler};
pub use draw::{Batch, DrawCommand, DrawKind, DrawList};
pub use error::RenderError;
pub use instance::{InstanceData, StaticBatchCache, build_instances, instance_bytes};
pub use registry::BlankRegistry;
