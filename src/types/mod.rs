//! Core types for the tsuzuri library
//!
//! This module contains the fundamental types that form the public API:
//! - Instruction / Script: the declarative instruction tape
//! - State: phase, character, background and audio runtime state
//! - Step: what the host should do next

pub mod instruction;
pub mod script;
pub mod state;
pub mod step;

pub use instruction::{BgmAction, CharAction, ChoiceOption, ChoiceSignal, Instruction};
pub use script::{Script, ScriptError};
pub use state::{
    AudioState, AudioStatus, BackgroundState, CharacterState, Dialogue, Phase, Side,
};
pub use step::{Step, Wake};
