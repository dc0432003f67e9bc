//! Interpreter errors and non-fatal diagnostics

use serde::{Deserialize, Serialize};

use crate::types::Phase;

/// Errors returned to the caller of an interpreter operation
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("choice index {index} out of range ({len} choices)")]
    ChoiceOutOfRange { index: usize, len: usize },
    #[error("cannot snapshot while {phase:?}; wait for an advance or choice")]
    NotSuspended { phase: Phase },
    #[error("snapshot was taken from a different script")]
    SnapshotMismatch,
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("failed to fingerprint script: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Something went wrong during a run, but the run carried on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Diagnostic {
    #[error("unknown label '{label}' referenced at offset {offset}")]
    UnknownLabel { label: String, offset: usize },
    #[error("unknown character '{id}' at offset {offset}")]
    UnknownCharacter { id: String, offset: usize },
    #[error("no {kind} named '{id}'; using it as a literal asset reference")]
    UnresolvedAsset { kind: String, id: String },
    #[error("'{kind}' instruction at offset {offset} is missing '{field}'")]
    MissingField {
        kind: String,
        field: String,
        offset: usize,
    },
    #[error("unrecognized instruction at offset {offset} skipped")]
    UnknownInstruction { offset: usize },
    #[error("playback of '{asset}' failed: {reason}")]
    PlaybackFailed { asset: String, reason: String },
    #[error("no suspension point reachable from offset {offset}; run stopped")]
    Stalled { offset: usize },
}
