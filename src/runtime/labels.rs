//! Label index - jump targets resolved once per run

use std::collections::HashMap;

use crate::types::{Instruction, Script};

/// Maps a label id to the offset immediately after its `label` instruction.
///
/// Duplicate ids resolve to the last definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelIndex {
    targets: HashMap<String, usize>,
}

impl LabelIndex {
    pub fn build(script: &Script) -> Self {
        let mut targets = HashMap::new();
        for (offset, instruction) in script.iter().enumerate() {
            if let Instruction::Label { id } = instruction
                && let Some(previous) = targets.insert(id.clone(), offset + 1)
            {
                log::warn!(
                    target: "flow",
                    "label '{id}' redefined at offset {offset}; replaces target {previous}"
                );
            }
        }
        Self { targets }
    }

    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.targets.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.targets.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
