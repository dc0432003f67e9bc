//! Runtime state representation

use serde::{Deserialize, Serialize};

/// Where the interpreter is in its lifecycle.
///
/// `Running`, `AwaitingAdvance` and `AwaitingChoice` together make up the
/// "running" run state; at most one waiting condition can hold at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Not started
    #[default]
    Idle,
    /// Consuming instructions, or waiting on a timer the interpreter requested
    Running,
    /// Suspended until the host signals an advance
    AwaitingAdvance,
    /// Suspended until exactly one choice is selected
    AwaitingChoice,
    /// pc reached the end or an `end` instruction executed
    Ended,
    /// Halted by `stop()`
    Stopped,
}

impl Phase {
    pub fn is_running(self) -> bool {
        matches!(
            self,
            Phase::Running | Phase::AwaitingAdvance | Phase::AwaitingChoice
        )
    }

    pub fn is_suspended(self) -> bool {
        matches!(self, Phase::AwaitingAdvance | Phase::AwaitingChoice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    #[default]
    Center,
    Right,
}

/// Logical state of one character sprite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterState {
    pub visible: bool,
    pub state: Option<String>,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundState {
    pub visible: bool,
    /// Resolved asset reference of the current image
    pub image: Option<String>,
}

impl Default for BackgroundState {
    fn default() -> Self {
        Self {
            visible: true,
            image: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AudioStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The single music channel, mutated only by `bgm` instructions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AudioState {
    pub track: Option<String>,
    pub looping: bool,
    pub status: AudioStatus,
}

/// The most recent dialogue line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub speaker: Option<String>,
    pub text: String,
}
