//! What the interpreter asks of its host after each call

use std::time::Duration;

use crate::runtime::typewriter::Ticket;

/// Result of driving the interpreter.
///
/// The interpreter never sleeps. When it needs time to pass it returns
/// [`Step::Resume`], and the host feeds the enclosed [`Wake`] back through
/// `Interpreter::wake` once `after` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Call `wake(wake)` after the given duration
    Resume { after: Duration, wake: Wake },
    /// Waiting for an advance signal (click, Enter)
    AwaitAdvance,
    /// Waiting for `select_choice`
    AwaitChoice,
    /// The run is over
    Ended,
    /// Halted by `stop()` or because no suspension point could be reached
    Stopped,
    /// The signal was not valid in the current phase and had no effect
    Ignored,
}

impl Step {
    pub fn is_resume(&self) -> bool {
        matches!(self, Step::Resume { .. })
    }
}

/// Timer continuation handed to the host.
///
/// Carries the run it belongs to, so timers outliving a restart or `stop()`
/// are recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    pub(crate) run: u64,
    pub(crate) kind: WakeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WakeKind {
    /// Settle delay after an effect or a `wait`
    Settle(u64),
    /// Next typewriter glyph
    Reveal(Ticket),
}

impl Wake {
    /// Whether this wake drives the typewriter rather than a settle delay
    pub fn is_reveal(&self) -> bool {
        matches!(self.kind, WakeKind::Reveal(_))
    }
}
