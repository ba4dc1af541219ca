//! GPU instance data for clones, and the cache for static batches.

use bytemuck::{Pod, Zeroable};
use easel_core::{BindingKey, CloneBatch, CloneId, CloneTransformData, Depth};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// One instance as uploaded to the GPU: a column-major model matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
}

impl InstanceData {
    pub fn from_delta(delta: &CloneTransformData) -> Self {
        Self {
            model: delta.to_placement(Depth::ZERO).local_matrix().to_cols_array_2d(),
        }
    }
}

/// Instance records for every clone in `batch`, baseline already applied.
pub fn build_instances(batch: &CloneBatch) -> Arc<[InstanceData]> {
    batch.instances().map(|d| InstanceData::from_delta(&d)).collect()
}

/// Raw bytes for a vertex-buffer upload.
pub fn instance_bytes(instances: &[InstanceData]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

/// Instance buffers for batches flagged with a static batch key.
///
/// Entries are keyed by the static key together with the batch's blank, so
/// batches of different blanks never share a buffer. Only the per-clone list
/// is assumed immutable: a keyed batch is rebuilt whenever its baseline delta
/// differs from the one the cached buffer was built with. Call
/// [`invalidate`](Self::invalidate) when the clone list itself changes.
#[derive(Debug, Default)]
pub struct StaticBatchCache {
    entries: HashMap<(BindingKey, CloneId), StaticEntry>,
}

#[derive(Debug)]
struct StaticEntry {
    baseline: CloneTransformData,
    instances: Arc<[InstanceData]>,
}

impl StaticBatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, key: BindingKey, batch: &CloneBatch) -> Arc<[InstanceData]> {
        let baseline = batch.transform();
        match self.entries.entry((key, batch.id())) {
            Entry::Occupied(mut slot) => {
                if slot.get().baseline != baseline {
                    log::debug!("rebuilding static batch `{key}`: baseline moved");
                    slot.insert(StaticEntry {
                        baseline,
                        instances: build_instances(batch),
                    });
                }
                Arc::clone(&slot.get().instances)
            }
            Entry::Vacant(slot) => {
                log::debug!(
                    "building static batch `{key}` for `{}` ({} instances)",
                    batch.id(),
                    batch.clones().len()
                );
                let entry = slot.insert(StaticEntry {
                    baseline,
                    instances: build_instances(batch),
                });
                Arc::clone(&entry.instances)
            }
        }
    }

    pub fn get(&self, key: BindingKey, blank: CloneId) -> Option<&Arc<[InstanceData]>> {
        self.entries.get(&(key, blank)).map(|e| &e.instances)
    }

    /// Drop every buffer cached under `key`. Returns whether any was present.
    pub fn invalidate(&mut self, key: BindingKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _), _| *k != key);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
