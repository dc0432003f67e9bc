//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and presentation defaults for the interpreter.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Typewriter cadence (milliseconds per glyph)
    pub text_interval_ms: u64,
    /// Settle delay after background and character effects
    pub transition_delay_ms: u64,
    /// Settle delay after music control
    pub audio_settle_ms: u64,
    /// Duration of a `wait` without `ms`
    pub default_wait_ms: u64,
    /// Text shown by the `end` instruction
    pub end_text: String,
    /// Loop flag for `bgm play` without `loop`
    pub loop_bgm_by_default: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            text_interval_ms: 30,
            transition_delay_ms: 450,
            audio_settle_ms: 50,
            default_wait_ms: 500,
            end_text: "— FIN —".to_string(),
            loop_bgm_by_default: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn text_interval(&self) -> Duration {
        Duration::from_millis(self.text_interval_ms)
    }

    /// Settle delay for a visual effect, honouring a per-instruction override
    pub fn transition_delay(&self, wait: Option<u64>) -> Duration {
        Duration::from_millis(wait.unwrap_or(self.transition_delay_ms))
    }

    pub fn audio_settle(&self) -> Duration {
        Duration::from_millis(self.audio_settle_ms)
    }

    pub fn wait_duration(&self, ms: Option<u64>) -> Duration {
        Duration::from_millis(ms.unwrap_or(self.default_wait_ms))
    }
}
