//! Scene interpreter
//!
//! Executes a [`Script`] one instruction at a time. Effects are requested from
//! a [`Presenter`]; time is never waited on directly. Instead every call
//! returns a [`Step`] telling the host whether to feed back a timer wake, wait
//! for an advance or choice, or stop.

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::presentation::Presenter;
use crate::resources::ResourceTable;
use crate::types::step::WakeKind;
use crate::types::{
    AudioState, AudioStatus, BackgroundState, BgmAction, CharAction, CharacterState,
    ChoiceOption, Dialogue, Instruction, Phase, Script, Side, Step, Wake,
};

pub mod error;
pub mod labels;
pub mod snapshot;
pub mod typewriter;

pub use error::{Diagnostic, EngineError};
pub use labels::LabelIndex;
pub use snapshot::Snapshot;
pub use typewriter::{Tick, Ticket, Typewriter};

#[cfg(test)]
mod tests;

/// Whether dispatch continues inline or hands control back to the host
enum Flow {
    Continue,
    Yield(Step),
}

pub struct Interpreter<P, R> {
    presenter: P,
    resources: R,
    config: EngineConfig,
    script: Script,
    labels: LabelIndex,
    pc: usize,
    phase: Phase,
    /// Bumped on every start/restore so timers from earlier runs go stale
    run: u64,
    timer_seq: u64,
    pending_settle: Option<u64>,
    /// Completion payload is the offset of the `say` being revealed
    typewriter: Typewriter<usize>,
    characters: BTreeMap<String, CharacterState>,
    background: BackgroundState,
    audio: AudioState,
    dialogue: Option<Dialogue>,
    choice_at: Option<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl<P: Presenter, R: ResourceTable> Interpreter<P, R> {
    pub fn new(presenter: P, resources: R) -> Self {
        Self::with_config(presenter, resources, EngineConfig::default())
    }

    pub fn with_config(presenter: P, resources: R, config: EngineConfig) -> Self {
        Self {
            presenter,
            resources,
            config,
            script: Script::default(),
            labels: LabelIndex::default(),
            pc: 0,
            phase: Phase::Idle,
            run: 0,
            timer_seq: 0,
            pending_settle: None,
            typewriter: Typewriter::new(),
            characters: BTreeMap::new(),
            background: BackgroundState::default(),
            audio: AudioState::default(),
            dialogue: None,
            choice_at: None,
            diagnostics: Vec::new(),
        }
    }

    /// Load `script` and run from offset 0 until the first suspension point
    pub fn start(&mut self, script: Script) -> Step {
        self.reset(script);
        log::info!(
            target: "engine",
            "starting run {} ({} instructions, {} labels)",
            self.run,
            self.script.len(),
            self.labels.len()
        );
        self.phase = Phase::Running;
        self.run_until_suspended()
    }

    /// Host advance signal (click, Enter). Only honoured in `AwaitingAdvance`.
    pub fn advance(&mut self) -> Step {
        if self.phase != Phase::AwaitingAdvance {
            log::trace!(target: "flow", "advance ignored in {:?}", self.phase);
            return Step::Ignored;
        }
        self.phase = Phase::Running;
        self.run_until_suspended()
    }

    /// Resolve the pending choice with the option at `index`.
    ///
    /// Ignored outside `AwaitingChoice`. An out-of-range index is an error and
    /// leaves the interpreter untouched.
    pub fn select_choice(&mut self, index: usize) -> Result<Step, EngineError> {
        if self.phase != Phase::AwaitingChoice {
            log::trace!(target: "flow", "choice {index} ignored in {:?}", self.phase);
            return Ok(Step::Ignored);
        }
        let Some(choice_at) = self.choice_at else {
            return Ok(Step::Ignored);
        };
        let (option, len) = match self.script.get(choice_at) {
            Some(Instruction::Choice { choices }) => (choices.get(index).cloned(), choices.len()),
            _ => return Ok(Step::Ignored),
        };
        let Some(option) = option else {
            log::error!(
                target: "flow",
                "choice index {index} out of range at pc={choice_at} ({len} choices)"
            );
            return Err(EngineError::ChoiceOutOfRange { index, len });
        };

        log::debug!(target: "flow", "choice {index} '{}' selected", option.text);
        if let Some(signal) = &option.on_select {
            self.presenter.emit_signal(signal);
        }
        if let Some(label) = &option.goto {
            self.jump(choice_at, label);
        }
        self.presenter.clear_choices();
        self.choice_at = None;
        self.phase = Phase::Running;
        Ok(self.run_until_suspended())
    }

    /// Feed back a timer previously requested through [`Step::Resume`].
    ///
    /// Wakes from an earlier run, a replaced reveal, or arriving after
    /// `stop()` are ignored.
    pub fn wake(&mut self, wake: Wake) -> Step {
        if wake.run != self.run || self.phase != Phase::Running {
            log::trace!(target: "engine", "stale wake {wake:?} ignored in {:?}", self.phase);
            return Step::Ignored;
        }
        match wake.kind {
            WakeKind::Settle(timer) => {
                if self.pending_settle != Some(timer) {
                    return Step::Ignored;
                }
                self.pending_settle = None;
                self.run_until_suspended()
            }
            WakeKind::Reveal(ticket) => match self.typewriter.tick(ticket) {
                Tick::Partial { shown, next } => {
                    self.presenter.render_dialogue_text(&shown);
                    Step::Resume {
                        after: self.config.text_interval(),
                        wake: Wake {
                            run: self.run,
                            kind: WakeKind::Reveal(next),
                        },
                    }
                }
                Tick::Complete { shown, on_complete } => {
                    self.presenter.render_dialogue_text(&shown);
                    self.after_reveal(on_complete)
                }
                Tick::Stale => Step::Ignored,
            },
        }
    }

    /// Halt the run. Pending timers become no-ops.
    pub fn stop(&mut self) {
        if !self.phase.is_running() {
            return;
        }
        log::info!(target: "engine", "stopped at pc={}", self.pc);
        self.phase = Phase::Stopped;
        self.typewriter.cancel();
        self.pending_settle = None;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    pub fn is_revealing(&self) -> bool {
        self.typewriter.is_revealing()
    }

    pub fn character(&self, id: &str) -> Option<&CharacterState> {
        self.characters.get(id)
    }

    pub fn characters(&self) -> &BTreeMap<String, CharacterState> {
        &self.characters
    }

    pub fn background(&self) -> &BackgroundState {
        &self.background
    }

    pub fn audio(&self) -> &AudioState {
        &self.audio
    }

    pub fn dialogue(&self) -> Option<&Dialogue> {
        self.dialogue.as_ref()
    }

    /// Options of the choice currently on screen
    pub fn pending_choices(&self) -> Option<&[ChoiceOption]> {
        match self.choice_at.and_then(|at| self.script.get(at)) {
            Some(Instruction::Choice { choices }) if self.phase == Phase::AwaitingChoice => {
                Some(choices.as_slice())
            }
            _ => None,
        }
    }

    /// Non-fatal problems reported during the current run
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn reset(&mut self, script: Script) {
        self.run += 1;
        self.labels = LabelIndex::build(&script);
        self.script = script;
        self.pc = 0;
        self.pending_settle = None;
        self.typewriter.cancel();
        self.characters.clear();
        self.background = BackgroundState::default();
        self.audio = AudioState::default();
        self.dialogue = None;
        self.choice_at = None;
        self.diagnostics.clear();
    }

    fn run_until_suspended(&mut self) -> Step {
        let mut inline = 0usize;
        loop {
            let offset = self.pc;
            let Some(instruction) = self.script.get(offset).cloned() else {
                log::info!(target: "engine", "reached end of script at pc={offset}");
                self.phase = Phase::Ended;
                return Step::Ended;
            };
            self.pc += 1;
            log::trace!(target: "engine", "executing pc={offset} {}", instruction.kind());

            match self.execute(offset, instruction) {
                Flow::Yield(step) => return step,
                Flow::Continue => {
                    // Only label/jump/unknown continue inline; more of them
                    // than the script holds means a jump cycle.
                    inline += 1;
                    if inline > self.script.len() {
                        self.report(Diagnostic::Stalled { offset });
                        self.phase = Phase::Stopped;
                        return Step::Stopped;
                    }
                }
            }
        }
    }

    fn execute(&mut self, offset: usize, instruction: Instruction) -> Flow {
        match instruction {
            Instruction::Label { id } => {
                log::debug!(target: "flow", "passing label '{id}' at pc={offset}");
                Flow::Continue
            }
            Instruction::Say { who, text } => self.say(offset, who, text),
            Instruction::Bg { show, src, wait } => self.set_background(show, src, wait),
            Instruction::Char {
                id,
                action,
                state,
                side,
                wait,
            } => self.character_action(offset, id, action, state, side, wait),
            Instruction::Choice { choices } => self.present_choices(offset, &choices),
            Instruction::Wait { ms } => self.settle(self.config.wait_duration(ms)),
            Instruction::Jump { to } => {
                self.jump(offset, &to);
                Flow::Continue
            }
            Instruction::Bgm { action, id, looping } => self.music(offset, action, id, looping),
            Instruction::End => self.finish(),
            Instruction::Unknown => {
                self.report(Diagnostic::UnknownInstruction { offset });
                Flow::Continue
            }
        }
    }

    fn say(&mut self, offset: usize, who: Option<String>, text: String) -> Flow {
        let speaker = who.map(|who| self.resources.character_name(&who).unwrap_or(who));
        self.presenter.show_dialogue(speaker.as_deref());
        self.dialogue = Some(Dialogue {
            speaker,
            text: text.clone(),
        });
        let ticket = self.typewriter.start(text, offset);
        Flow::Yield(Step::Resume {
            after: self.config.text_interval(),
            wake: Wake {
                run: self.run,
                kind: WakeKind::Reveal(ticket),
            },
        })
    }

    /// A fully revealed line flows straight into a following choice;
    /// anything else waits for the reader.
    fn after_reveal(&mut self, say_at: usize) -> Step {
        match self.script.get(self.pc) {
            Some(Instruction::Choice { .. }) => {
                log::debug!(target: "flow", "line at pc={say_at} leads into a choice");
                self.run_until_suspended()
            }
            next => {
                if matches!(next, Some(Instruction::End)) {
                    log::debug!(target: "flow", "line at pc={say_at} is the last before end");
                }
                self.phase = Phase::AwaitingAdvance;
                Step::AwaitAdvance
            }
        }
    }

    fn set_background(&mut self, show: Option<bool>, src: Option<String>, wait: Option<u64>) -> Flow {
        if let Some(visible) = show {
            self.background.visible = visible;
            self.presenter.set_background_visible(visible);
        }
        if let Some(src) = src {
            let resolved = self.resources.resolve_background(&src);
            let asset = self.asset_or_literal("background", &src, resolved);
            self.presenter.set_background_image(&asset);
            self.background.image = Some(asset);
        }
        self.settle(self.config.transition_delay(wait))
    }

    fn character_action(
        &mut self,
        offset: usize,
        id: String,
        action: CharAction,
        state: Option<String>,
        side: Option<Side>,
        wait: Option<u64>,
    ) -> Flow {
        match action {
            CharAction::Show => {
                if !self.resources.has_character(&id) {
                    self.report(Diagnostic::UnknownCharacter {
                        id: id.clone(),
                        offset,
                    });
                }
                let state = state.or_else(|| self.resources.first_state(&id));
                let asset = state.as_deref().map(|s| self.character_asset(&id, s));
                let side = side.unwrap_or_default();
                self.presenter.show_character(&id, asset.as_deref(), side);
                self.characters.insert(
                    id,
                    CharacterState {
                        visible: true,
                        state,
                        side,
                    },
                );
            }
            CharAction::Hide => match self.characters.get_mut(&id) {
                Some(character) => {
                    character.visible = false;
                    self.presenter.hide_character(&id);
                }
                None => self.report(Diagnostic::UnknownCharacter { id, offset }),
            },
            CharAction::SetState => match state {
                None => self.report(Diagnostic::MissingField {
                    kind: "char".to_string(),
                    field: "state".to_string(),
                    offset,
                }),
                Some(_) if !self.characters.contains_key(&id) => {
                    self.report(Diagnostic::UnknownCharacter { id, offset })
                }
                Some(state) => {
                    let asset = self.character_asset(&id, &state);
                    self.presenter.set_character_state(&id, &asset);
                    if let Some(character) = self.characters.get_mut(&id) {
                        character.state = Some(state);
                    }
                }
            },
        }
        self.settle(self.config.transition_delay(wait))
    }

    fn present_choices(&mut self, offset: usize, choices: &[ChoiceOption]) -> Flow {
        if choices.is_empty() {
            self.report(Diagnostic::MissingField {
                kind: "choice".to_string(),
                field: "choices".to_string(),
                offset,
            });
            return Flow::Continue;
        }
        let texts: Vec<String> = choices.iter().map(|c| c.text.clone()).collect();
        log::debug!(target: "flow", "presenting {} choices at pc={offset}", texts.len());
        self.presenter.render_choices(&texts);
        self.choice_at = Some(offset);
        self.phase = Phase::AwaitingChoice;
        Flow::Yield(Step::AwaitChoice)
    }

    /// Move pc to `label`; an unknown label leaves pc where it is
    fn jump(&mut self, offset: usize, label: &str) {
        match self.labels.resolve(label) {
            Some(target) => {
                log::debug!(
                    target: "flow",
                    "jumping from pc={offset} to pc={target} (label={label})"
                );
                self.pc = target;
            }
            None => self.report(Diagnostic::UnknownLabel {
                label: label.to_string(),
                offset,
            }),
        }
    }

    fn music(
        &mut self,
        offset: usize,
        action: BgmAction,
        id: Option<String>,
        looping: Option<bool>,
    ) -> Flow {
        match action {
            BgmAction::Play => match id {
                Some(id) => {
                    let resolved = self.resources.resolve_audio(&id);
                    let asset = self.asset_or_literal("audio", &id, resolved);
                    let looping = looping.unwrap_or(self.config.loop_bgm_by_default);
                    log::debug!(target: "audio", "play '{asset}' (loop={looping})");
                    if let Err(err) = self.presenter.play_audio(&asset, looping) {
                        self.report(Diagnostic::PlaybackFailed {
                            asset: asset.clone(),
                            reason: err.to_string(),
                        });
                    }
                    self.audio = AudioState {
                        track: Some(asset),
                        looping,
                        status: AudioStatus::Playing,
                    };
                }
                None => self.report(Diagnostic::MissingField {
                    kind: "bgm".to_string(),
                    field: "id".to_string(),
                    offset,
                }),
            },
            BgmAction::Stop => {
                self.presenter.stop_audio();
                self.audio.status = AudioStatus::Stopped;
            }
            BgmAction::Pause => {
                self.presenter.pause_audio();
                if self.audio.status == AudioStatus::Playing {
                    self.audio.status = AudioStatus::Paused;
                }
            }
        }
        self.settle(self.config.audio_settle())
    }

    fn finish(&mut self) -> Flow {
        log::info!(target: "engine", "end reached at pc={}", self.pc - 1);
        self.phase = Phase::Ended;
        self.typewriter.cancel();
        self.pending_settle = None;
        self.choice_at = None;
        self.dialogue = None;
        self.presenter.clear_choices();
        self.presenter.clear_dialogue();
        self.presenter.show_end(&self.config.end_text);
        Flow::Yield(Step::Ended)
    }

    fn settle(&mut self, after: std::time::Duration) -> Flow {
        self.timer_seq += 1;
        self.pending_settle = Some(self.timer_seq);
        Flow::Yield(Step::Resume {
            after,
            wake: Wake {
                run: self.run,
                kind: WakeKind::Settle(self.timer_seq),
            },
        })
    }

    fn character_asset(&mut self, id: &str, state: &str) -> String {
        match self.resources.resolve_character_state(id, state) {
            Some(asset) => asset,
            None => {
                self.report(Diagnostic::UnresolvedAsset {
                    kind: format!("state of '{id}'"),
                    id: state.to_string(),
                });
                state.to_string()
            }
        }
    }

    fn asset_or_literal(&mut self, kind: &str, id: &str, resolved: Option<String>) -> String {
        match resolved {
            Some(asset) => asset,
            None => {
                self.report(Diagnostic::UnresolvedAsset {
                    kind: kind.to_string(),
                    id: id.to_string(),
                });
                id.to_string()
            }
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        let target = match &diagnostic {
            Diagnostic::UnknownLabel { .. } | Diagnostic::Stalled { .. } => "flow",
            Diagnostic::UnresolvedAsset { .. } | Diagnostic::UnknownCharacter { .. } => "resources",
            Diagnostic::PlaybackFailed { .. } => "audio",
            Diagnostic::MissingField { .. } | Diagnostic::UnknownInstruction { .. } => "engine",
        };
        log::warn!(target: target, "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}
