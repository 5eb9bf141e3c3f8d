//! Sampler/resource table.
//!
//! Built once per shader compilation by the declaration phase, read-only
//! during instruction translation. A lookup miss means the shader samples a
//! resource that was never declared; the instruction referencing it is
//! dropped (see `TranslateError::UnresolvedResource`).

use std::collections::HashMap;

use tracing::warn;

use crate::shader_limits::MAX_SAMPLER_REGISTER_INDEX;
use crate::spv::Id;
use crate::usse::types::DataType;

/// A declared texture + sampler pair and its static metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerBinding {
    /// IR variable holding the combined image/sampler.
    pub id: Id,
    pub component_type: DataType,
    pub component_count: u8,
}

#[derive(Debug, Default)]
pub struct SamplerTable {
    map: HashMap<u8, SamplerBinding>,
}

impl SamplerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, index: u8, binding: SamplerBinding) {
        if index > MAX_SAMPLER_REGISTER_INDEX {
            warn!(index, "sampler register index out of range; binding ignored");
            return;
        }
        debug_assert!((1..=4).contains(&binding.component_count));
        self.map.insert(index, binding);
    }

    pub fn lookup(&self, index: u8) -> Option<&SamplerBinding> {
        self.map.get(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spv::Builder;

    #[test]
    fn bind_and_lookup() {
        let mut b = Builder::new();
        let ty = b.type_sampled_image_2d();
        let var = b.create_variable(ty);

        let mut table = SamplerTable::new();
        table.bind(
            3,
            SamplerBinding {
                id: var,
                component_type: DataType::F32,
                component_count: 4,
            },
        );
        assert!(table.lookup(3).is_some());
        assert!(table.lookup(4).is_none());

        // Out-of-range indices are ignored, not inserted.
        table.bind(
            200,
            SamplerBinding {
                id: var,
                component_type: DataType::F32,
                component_count: 4,
            },
        );
        assert!(table.lookup(200).is_none());
    }
}
