//! Resource table - mapping symbolic ids to asset references.
//!
//! Lookups never fail hard: a miss returns `None` and the interpreter falls
//! back to using the id itself as the asset reference.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub trait ResourceTable {
    /// Display name for a speaker id
    fn character_name(&self, _id: &str) -> Option<String> {
        None
    }

    /// The first state a character defines, used when `show` names none
    fn first_state(&self, _id: &str) -> Option<String> {
        None
    }

    fn resolve_character_state(&self, _id: &str, _state: &str) -> Option<String> {
        None
    }

    fn resolve_background(&self, _id: &str) -> Option<String> {
        None
    }

    fn resolve_audio(&self, _id: &str) -> Option<String> {
        None
    }

    fn has_character(&self, id: &str) -> bool {
        self.character_name(id).is_some()
    }
}

/// A character's display name and its sprite states in definition order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDef {
    pub name: String,
    #[serde(default)]
    pub states: Vec<StateDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDef {
    pub id: String,
    pub src: String,
}

/// In-memory resource table, usually loaded from `resources.json`:
///
/// ```json
/// {
///   "characters": {
///     "hana": { "name": "Hana", "states": [{ "id": "normal", "src": "hana/normal.png" }] }
///   },
///   "backgrounds": { "classroom": "bg/classroom.jpg" },
///   "audio": { "theme": "bgm/theme.ogg" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetCatalog {
    #[serde(default)]
    pub characters: BTreeMap<String, CharacterDef>,
    #[serde(default)]
    pub backgrounds: HashMap<String, String>,
    #[serde(default)]
    pub audio: HashMap<String, String>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_character(mut self, id: &str, name: &str, states: &[(&str, &str)]) -> Self {
        let states = states
            .iter()
            .map(|(state, src)| StateDef {
                id: state.to_string(),
                src: src.to_string(),
            })
            .collect();
        self.characters.insert(
            id.to_string(),
            CharacterDef {
                name: name.to_string(),
                states,
            },
        );
        self
    }

    pub fn with_background(mut self, id: &str, src: &str) -> Self {
        self.backgrounds.insert(id.to_string(), src.to_string());
        self
    }

    pub fn with_audio(mut self, id: &str, src: &str) -> Self {
        self.audio.insert(id.to_string(), src.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.backgrounds.is_empty() && self.audio.is_empty()
    }
}

impl ResourceTable for AssetCatalog {
    fn character_name(&self, id: &str) -> Option<String> {
        self.characters.get(id).map(|c| c.name.clone())
    }

    fn first_state(&self, id: &str) -> Option<String> {
        self.characters
            .get(id)
            .and_then(|c| c.states.first())
            .map(|s| s.id.clone())
    }

    fn resolve_character_state(&self, id: &str, state: &str) -> Option<String> {
        self.characters
            .get(id)?
            .states
            .iter()
            .find(|s| s.id == state)
            .map(|s| s.src.clone())
    }

    fn resolve_background(&self, id: &str) -> Option<String> {
        self.backgrounds.get(id).cloned()
    }

    fn resolve_audio(&self, id: &str) -> Option<String> {
        self.audio.get(id).cloned()
    }

    fn has_character(&self, id: &str) -> bool {
        self.characters.contains_key(id)
    }
}
