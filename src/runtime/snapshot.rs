//! Suspend/resume snapshots of a run
//!
//! A snapshot can only be taken while the interpreter waits on the reader,
//! so no timer or reveal is ever in flight inside one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{EngineError, Interpreter};
use crate::presentation::Presenter;
use crate::resources::ResourceTable;
use crate::types::{
    AudioState, AudioStatus, BackgroundState, CharacterState, Dialogue, Instruction, Phase,
    Script, Step,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// md5 of the script the snapshot belongs to
    pub script_digest: String,
    pub pc: usize,
    pub phase: Phase,
    pub characters: BTreeMap<String, CharacterState>,
    pub background: BackgroundState,
    pub audio: AudioState,
    pub dialogue: Option<Dialogue>,
    /// Offset of the choice on screen when `phase` is `AwaitingChoice`
    pub choice_at: Option<usize>,
}

impl<P: Presenter, R: ResourceTable> Interpreter<P, R> {
    pub fn snapshot(&self) -> Result<Snapshot, EngineError> {
        if !self.phase.is_suspended() {
            return Err(EngineError::NotSuspended { phase: self.phase });
        }
        Ok(Snapshot {
            script_digest: self.script.digest()?,
            pc: self.pc,
            phase: self.phase,
            characters: self.characters.clone(),
            background: self.background.clone(),
            audio: self.audio.clone(),
            dialogue: self.dialogue.clone(),
            choice_at: self.choice_at,
        })
    }

    /// Resume `script` from `snapshot`, replaying the visible scene through
    /// the presenter.
    pub fn restore(&mut self, script: Script, snapshot: Snapshot) -> Result<Step, EngineError> {
        if script.digest()? != snapshot.script_digest {
            return Err(EngineError::SnapshotMismatch);
        }
        if snapshot.pc > script.len() {
            return Err(EngineError::InvalidSnapshot(format!(
                "pc {} is past the end of the script ({} instructions)",
                snapshot.pc,
                script.len()
            )));
        }
        let step = match snapshot.phase {
            Phase::AwaitingAdvance => Step::AwaitAdvance,
            Phase::AwaitingChoice => {
                let Some(at) = snapshot.choice_at else {
                    return Err(EngineError::InvalidSnapshot(
                        "awaiting a choice but no choice is pending".to_string(),
                    ));
                };
                if !matches!(script.get(at), Some(Instruction::Choice { .. })) {
                    return Err(EngineError::InvalidSnapshot(
                        "pending choice does not point at a choice instruction".to_string(),
                    ));
                }
                // A choice suspends with pc just past it
                if snapshot.pc != at + 1 {
                    return Err(EngineError::InvalidSnapshot(format!(
                        "pc {} does not follow the pending choice at {at}",
                        snapshot.pc
                    )));
                }
                Step::AwaitChoice
            }
            other => {
                return Err(EngineError::InvalidSnapshot(format!(
                    "cannot resume from {other:?}"
                )));
            }
        };

        self.reset(script);
        self.pc = snapshot.pc;
        self.phase = snapshot.phase;
        self.characters = snapshot.characters;
        self.background = snapshot.background;
        self.audio = snapshot.audio;
        self.dialogue = snapshot.dialogue;
        self.choice_at = snapshot.choice_at;
        log::info!(target: "engine", "restored run {} at pc={}", self.run, self.pc);

        self.replay_scene();
        Ok(step)
    }

    fn replay_scene(&mut self) {
        self.presenter
            .set_background_visible(self.background.visible);
        if let Some(image) = &self.background.image {
            self.presenter.set_background_image(image);
        }

        for (id, character) in &self.characters {
            if !character.visible {
                continue;
            }
            let asset = character.state.as_ref().map(|state| {
                self.resources
                    .resolve_character_state(id, state)
                    .unwrap_or_else(|| state.clone())
            });
            self.presenter
                .show_character(id, asset.as_deref(), character.side);
        }

        if let Some(track) = self.audio.track.clone()
            && self.audio.status != AudioStatus::Stopped
        {
            if let Err(err) = self.presenter.play_audio(&track, self.audio.looping) {
                self.report(super::Diagnostic::PlaybackFailed {
                    asset: track,
                    reason: err.to_string(),
                });
            }
            if self.audio.status == AudioStatus::Paused {
                self.presenter.pause_audio();
            }
        }

        if let Some(dialogue) = &self.dialogue {
            self.presenter.show_dialogue(dialogue.speaker.as_deref());
            self.presenter.render_dialogue_text(&dialogue.text);
        }

        let choices: Option<Vec<String>> = self
            .pending_choices()
            .map(|options| options.iter().map(|o| o.text.clone()).collect());
        if let Some(texts) = choices {
            self.presenter.render_choices(&texts);
        }
    }
}
