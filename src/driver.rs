//! Virtual-time host for the interpreter
//!
//! [`Driver`] fulfils the timer requests an [`Interpreter`] yields against a
//! [`VirtualClock`], so whole scripts can be played back deterministically and
//! instantly in tests and dry runs.

use std::time::Duration;

use crate::presentation::Presenter;
use crate::resources::ResourceTable;
use crate::runtime::{EngineError, Interpreter};
use crate::types::{Phase, Script, Step, Wake};

/// Monotonic clock that only moves when told to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualClock {
    now: Duration,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    fn advance_to(&mut self, at: Duration) {
        if at > self.now {
            self.now = at;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due: Duration,
    wake: Wake,
}

pub struct Driver<P, R> {
    interpreter: Interpreter<P, R>,
    clock: VirtualClock,
    pending: Option<Timer>,
    last: Step,
}

impl<P: Presenter, R: ResourceTable> Driver<P, R> {
    pub fn new(interpreter: Interpreter<P, R>) -> Self {
        Self {
            interpreter,
            clock: VirtualClock::new(),
            pending: None,
            last: Step::Ignored,
        }
    }

    pub fn start(&mut self, script: Script) -> Step {
        let step = self.interpreter.start(script);
        self.accept(step)
    }

    pub fn advance(&mut self) -> Step {
        let step = self.interpreter.advance();
        self.accept(step)
    }

    pub fn select_choice(&mut self, index: usize) -> Result<Step, EngineError> {
        let step = self.interpreter.select_choice(index)?;
        Ok(self.accept(step))
    }

    /// Fire the pending timer, if any, moving the clock to its due time
    pub fn fire_next(&mut self) -> Option<Step> {
        let timer = self.pending.take()?;
        self.clock.advance_to(timer.due);
        let step = self.interpreter.wake(timer.wake);
        Some(self.accept(step))
    }

    /// Fire timers until the interpreter waits on the reader or stops
    pub fn run_until_blocked(&mut self) -> Step {
        while self.fire_next().is_some() {}
        self.last
    }

    /// Let `elapsed` of virtual time pass, firing every timer due within it
    pub fn advance_time(&mut self, elapsed: Duration) {
        let deadline = self.clock.now() + elapsed;
        while let Some(timer) = self.pending {
            if timer.due > deadline {
                break;
            }
            self.fire_next();
        }
        self.clock.advance_to(deadline);
    }

    /// `start`, then play to the first point that needs the reader
    pub fn play(&mut self, script: Script) -> Step {
        self.start(script);
        self.run_until_blocked()
    }

    /// `advance`, then play to the next point that needs the reader
    pub fn advance_and_run(&mut self) -> Step {
        match self.advance() {
            Step::Ignored => Step::Ignored,
            _ => self.run_until_blocked(),
        }
    }

    /// `select_choice`, then play to the next point that needs the reader
    pub fn choose_and_run(&mut self, index: usize) -> Result<Step, EngineError> {
        match self.select_choice(index)? {
            Step::Ignored => Ok(Step::Ignored),
            _ => Ok(self.run_until_blocked()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now()
    }

    /// Most recent step other than `Ignored`, or the terminal state a refused
    /// wake ran into
    pub fn last_step(&self) -> Step {
        self.last
    }

    pub fn has_pending_timer(&self) -> bool {
        self.pending.is_some()
    }

    pub fn interpreter(&self) -> &Interpreter<P, R> {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter<P, R> {
        &mut self.interpreter
    }

    pub fn into_interpreter(self) -> Interpreter<P, R> {
        self.interpreter
    }

    fn accept(&mut self, step: Step) -> Step {
        match step {
            Step::Resume { after, wake } => {
                self.pending = Some(Timer {
                    due: self.clock.now() + after,
                    wake,
                });
            }
            Step::Ignored => {
                // A wake refused after stop() or end still settles `last`
                match self.interpreter.phase() {
                    Phase::Stopped => self.last = Step::Stopped,
                    Phase::Ended => self.last = Step::Ended,
                    _ => {}
                }
                return step;
            }
            _ => self.pending = None,
        }
        self.last = step;
        step
    }
}
