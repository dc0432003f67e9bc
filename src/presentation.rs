//! Presentation port - the effects the interpreter requests from a front end
//!
//! Implementors own every visual and audio detail. The interpreter only says
//! what should change; it never waits on the presenter, and the only failure it
//! listens for is rejected audio playback.

use serde::{Deserialize, Serialize};

use crate::types::{ChoiceSignal, Side};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PresentationError {
    #[error("playback of '{asset}' rejected: {reason}")]
    PlaybackRejected { asset: String, reason: String },
    #[error("presentation unavailable: {0}")]
    Unavailable(String),
}

pub trait Presenter {
    fn set_background_visible(&mut self, visible: bool);
    fn set_background_image(&mut self, asset: &str);

    fn show_character(&mut self, id: &str, asset: Option<&str>, side: Side);
    fn hide_character(&mut self, id: &str);
    fn set_character_state(&mut self, id: &str, asset: &str);

    /// Open a dialogue box for a new line; text follows via `render_dialogue_text`
    fn show_dialogue(&mut self, speaker: Option<&str>);
    /// Replace the visible dialogue text with the revealed prefix
    fn render_dialogue_text(&mut self, shown: &str);
    fn clear_dialogue(&mut self);

    fn render_choices(&mut self, choices: &[String]);
    fn clear_choices(&mut self);

    fn play_audio(&mut self, asset: &str, looping: bool) -> Result<(), PresentationError>;
    fn stop_audio(&mut self);
    fn pause_audio(&mut self);

    /// Deliver a choice's side-effect descriptor to the host
    fn emit_signal(&mut self, signal: &ChoiceSignal);

    fn show_end(&mut self, text: &str);
}

/// One recorded presenter call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresenterCall {
    BackgroundVisible(bool),
    BackgroundImage(String),
    ShowCharacter {
        id: String,
        asset: Option<String>,
        side: Side,
    },
    HideCharacter(String),
    CharacterState {
        id: String,
        asset: String,
    },
    ShowDialogue(Option<String>),
    DialogueText(String),
    ClearDialogue,
    RenderChoices(Vec<String>),
    ClearChoices,
    PlayAudio {
        asset: String,
        looping: bool,
    },
    StopAudio,
    PauseAudio,
    Signal(ChoiceSignal),
    ShowEnd(String),
}

/// Presenter that records every call, for tests and dry runs
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    calls: Vec<PresenterCall>,
    reject_audio: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose `play_audio` always fails
    pub fn rejecting_audio() -> Self {
        Self {
            calls: Vec::new(),
            reject_audio: true,
        }
    }

    pub fn calls(&self) -> &[PresenterCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<PresenterCall> {
        std::mem::take(&mut self.calls)
    }

    /// Every fully or partially revealed dialogue text, in order
    pub fn dialogue_texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                PresenterCall::DialogueText(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for Recorder {
    fn set_background_visible(&mut self, visible: bool) {
        self.calls.push(PresenterCall::BackgroundVisible(visible));
    }

    fn set_background_image(&mut self, asset: &str) {
        self.calls
            .push(PresenterCall::BackgroundImage(asset.to_string()));
    }

    fn show_character(&mut self, id: &str, asset: Option<&str>, side: Side) {
        self.calls.push(PresenterCall::ShowCharacter {
            id: id.to_string(),
            asset: asset.map(str::to_string),
            side,
        });
    }

    fn hide_character(&mut self, id: &str) {
        self.calls.push(PresenterCall::HideCharacter(id.to_string()));
    }

    fn set_character_state(&mut self, id: &str, asset: &str) {
        self.calls.push(PresenterCall::CharacterState {
            id: id.to_string(),
            asset: asset.to_string(),
        });
    }

    fn show_dialogue(&mut self, speaker: Option<&str>) {
        self.calls
            .push(PresenterCall::ShowDialogue(speaker.map(str::to_string)));
    }

    fn render_dialogue_text(&mut self, shown: &str) {
        self.calls.push(PresenterCall::DialogueText(shown.to_string()));
    }

    fn clear_dialogue(&mut self) {
        self.calls.push(PresenterCall::ClearDialogue);
    }

    fn render_choices(&mut self, choices: &[String]) {
        self.calls.push(PresenterCall::RenderChoices(choices.to_vec()));
    }

    fn clear_choices(&mut self) {
        self.calls.push(PresenterCall::ClearChoices);
    }

    fn play_audio(&mut self, asset: &str, looping: bool) -> Result<(), PresentationError> {
        self.calls.push(PresenterCall::PlayAudio {
            asset: asset.to_string(),
            looping,
        });
        if self.reject_audio {
            return Err(PresentationError::PlaybackRejected {
                asset: asset.to_string(),
                reason: "autoplay blocked".to_string(),
            });
        }
        Ok(())
    }

    fn stop_audio(&mut self) {
        self.calls.push(PresenterCall::StopAudio);
    }

    fn pause_audio(&mut self) {
        self.calls.push(PresenterCall::PauseAudio);
    }

    fn emit_signal(&mut self, signal: &ChoiceSignal) {
        self.calls.push(PresenterCall::Signal(signal.clone()));
    }

    fn show_end(&mut self, text: &str) {
        self.calls.push(PresenterCall::ShowEnd(text.to_string()));
    }
}
