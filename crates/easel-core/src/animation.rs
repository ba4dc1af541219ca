//! Commands queued on sprites for the external animation subsystem.
//!
//! The queue is only recorded here; frame indices and cycle labels are
//! checked by the subsystem that consumes it.

use crate::id::CycleLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationAction {
    Play,
    ChangeCycle(CycleLabel),
    JumpToFirstFrame,
    JumpToLastFrame,
    JumpToFrame(u32),
}
