//! Script instructions
//!
//! Instructions are plain records tagged by `kind`, so a script can be written
//! by hand as JSON:
//!
//! ```json
//! [
//!   { "kind": "bg", "src": "classroom" },
//!   { "kind": "char", "id": "hana", "action": "show", "side": "left" },
//!   { "kind": "say", "who": "hana", "text": "Good morning!" },
//!   { "kind": "end" }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use super::state::Side;

/// A single unit of execution in a script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Instruction {
    /// Jump target marker (no-op during execution)
    Label { id: String },
    /// Spoken or narrated line, revealed glyph by glyph
    Say {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        who: Option<String>,
        text: String,
    },
    /// Background visibility and/or image change
    Bg {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        show: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
        /// Settle delay override in milliseconds
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wait: Option<u64>,
    },
    /// Character sprite operation
    Char {
        id: String,
        action: CharAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        side: Option<Side>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wait: Option<u64>,
    },
    /// Present choices and suspend until one is selected
    Choice { choices: Vec<ChoiceOption> },
    /// Timed pause
    Wait {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ms: Option<u64>,
    },
    /// Unconditional jump to label
    Jump { to: String },
    /// Background music control
    Bgm {
        action: BgmAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
        looping: Option<bool>,
    },
    /// Terminate the run
    End,
    /// Any unrecognized `kind`; skipped at runtime
    #[serde(other)]
    Unknown,
}

impl Instruction {
    /// Tag name as it appears in script files
    pub fn kind(&self) -> &'static str {
        match self {
            Instruction::Label { .. } => "label",
            Instruction::Say { .. } => "say",
            Instruction::Bg { .. } => "bg",
            Instruction::Char { .. } => "char",
            Instruction::Choice { .. } => "choice",
            Instruction::Wait { .. } => "wait",
            Instruction::Jump { .. } => "jump",
            Instruction::Bgm { .. } => "bgm",
            Instruction::End => "end",
            Instruction::Unknown => "unknown",
        }
    }

    pub fn label(id: impl Into<String>) -> Self {
        Instruction::Label { id: id.into() }
    }

    pub fn say(who: impl Into<String>, text: impl Into<String>) -> Self {
        Instruction::Say {
            who: Some(who.into()),
            text: text.into(),
        }
    }

    pub fn narrate(text: impl Into<String>) -> Self {
        Instruction::Say {
            who: None,
            text: text.into(),
        }
    }

    pub fn jump(to: impl Into<String>) -> Self {
        Instruction::Jump { to: to.into() }
    }

    pub fn wait(ms: u64) -> Self {
        Instruction::Wait { ms: Some(ms) }
    }

    pub fn choice(choices: Vec<ChoiceOption>) -> Self {
        Instruction::Choice { choices }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CharAction {
    Show,
    Hide,
    SetState,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BgmAction {
    Play,
    Stop,
    Pause,
}

/// One entry of a `choice` instruction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_select: Option<ChoiceSignal>,
}

impl ChoiceOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            goto: None,
            on_select: None,
        }
    }

    pub fn goto(mut self, label: impl Into<String>) -> Self {
        self.goto = Some(label.into());
        self
    }

    pub fn on_select(mut self, signal: ChoiceSignal) -> Self {
        self.on_select = Some(signal);
        self
    }
}

/// Side-effect descriptor emitted to the host when a choice is selected.
///
/// The interpreter never interprets `event` or `payload`; it hands them to the
/// presenter as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceSignal {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl ChoiceSignal {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_parses_tagged_records() {
        let json = r#"[
            {"kind": "label", "id": "start"},
            {"kind": "say", "who": "hana", "text": "Hi"},
            {"kind": "char", "id": "hana", "action": "setState", "state": "smile"},
            {"kind": "bgm", "action": "play", "id": "theme", "loop": false},
            {"kind": "choice", "choices": [
                {"text": "Yes", "goto": "yes", "onSelect": {"event": "agree"}}
            ]},
            {"kind": "end"}
        ]"#;

        let parsed: Vec<Instruction> = serde_json::from_str(json).unwrap();

        assert_eq!(parsed[0], Instruction::label("start"));
        assert_eq!(parsed[1], Instruction::say("hana", "Hi"));
        match &parsed[2] {
            Instruction::Char { action, state, .. } => {
                assert_eq!(*action, CharAction::SetState);
                assert_eq!(state.as_deref(), Some("smile"));
            }
            other => panic!("Expected Char instruction, got {other:?}"),
        }
        match &parsed[3] {
            Instruction::Bgm { looping, .. } => assert_eq!(*looping, Some(false)),
            other => panic!("Expected Bgm instruction, got {other:?}"),
        }
        match &parsed[4] {
            Instruction::Choice { choices } => {
                assert_eq!(choices[0].goto.as_deref(), Some("yes"));
                assert_eq!(choices[0].on_select, Some(ChoiceSignal::new("agree")));
            }
            other => panic!("Expected Choice instruction, got {other:?}"),
        }
        assert_eq!(parsed[5], Instruction::End);
    }

    #[test]
    fn unrecognized_kind_becomes_unknown() {
        let parsed: Instruction =
            serde_json::from_str(r#"{"kind": "shake", "strength": 3}"#).unwrap();
        assert_eq!(parsed, Instruction::Unknown);
    }

    #[test]
    fn say_without_speaker_is_narration() {
        let parsed: Instruction = serde_json::from_str(r#"{"kind": "say", "text": "..."}"#).unwrap();
        assert_eq!(parsed, Instruction::narrate("..."));
    }
}
