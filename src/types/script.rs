//! Script - the ordered instruction tape a run executes

use serde::{Deserialize, Serialize};

use super::instruction::Instruction;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("invalid script JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed '{kind}' instruction at offset {offset}: {source}")]
    Malformed {
        offset: usize,
        kind: String,
        source: serde_json::Error,
    },
    #[error("script must be an array of instructions or an object with a `script` array")]
    NotASequence,
}

/// Immutable sequence of instructions. Offsets are positional and stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Script {
    instructions: Vec<Instruction>,
}

impl Script {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Parse a script from JSON.
    ///
    /// Accepts either a bare array of instruction records or an object with a
    /// `script` array. Records with an unrecognized `kind` are kept as
    /// [`Instruction::Unknown`] so offsets stay aligned with the source file.
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let records = match value {
            serde_json::Value::Array(records) => records,
            serde_json::Value::Object(mut object) => match object.remove("script") {
                Some(serde_json::Value::Array(records)) => records,
                _ => return Err(ScriptError::NotASequence),
            },
            _ => return Err(ScriptError::NotASequence),
        };

        let mut instructions = Vec::with_capacity(records.len());
        for (offset, record) in records.into_iter().enumerate() {
            let Some(kind) = record.get("kind").and_then(|k| k.as_str()).map(str::to_string)
            else {
                log::warn!(
                    target: "engine",
                    "instruction at offset {offset} has no string 'kind'; it will be skipped"
                );
                instructions.push(Instruction::Unknown);
                continue;
            };
            let instruction: Instruction =
                serde_json::from_value(record).map_err(|source| ScriptError::Malformed {
                    offset,
                    kind: kind.clone(),
                    source,
                })?;
            if instruction == Instruction::Unknown {
                log::warn!(
                    target: "engine",
                    "unrecognized instruction kind '{kind}' at offset {offset}; it will be skipped"
                );
            }
            instructions.push(instruction);
        }

        Ok(Self { instructions })
    }

    pub fn get(&self, offset: usize) -> Option<&Instruction> {
        self.instructions.get(offset)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// md5 fingerprint of the canonical JSON form, used to match save data
    /// against the script it was taken from
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(&self.instructions)?;
        Ok(format!("{:x}", md5::compute(bytes)))
    }
}

impl From<Vec<Instruction>> for Script {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}

impl FromIterator<Instruction> for Script {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
