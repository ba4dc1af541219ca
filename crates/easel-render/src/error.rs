use easel_core::CloneId;
use thiserror::Error;

/// Failures detected while assembling a frame.
///
/// The scene model itself is total; these only arise when the scene refers to
/// resources owned by the renderer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("clone blank `{0}` is not registered")]
    UnknownBlank(CloneId),
}
