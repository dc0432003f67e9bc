//! # tsuzuri
//!
//! A scene interpreter for visual-novel style scripts. A script is an ordered
//! list of declarative instructions (dialogue, background and character
//! changes, music, branching choices, jumps). The [`Interpreter`] walks it one
//! instruction at a time, asks a [`Presenter`] to show things and tells the
//! host what to do next through a [`Step`]: feed back a timer, wait for the
//! reader, or stop.
//!
//! ## Quick Start
//!
//! ```rust
//! use tsuzuri::{AssetCatalog, Driver, Interpreter, Recorder, Script, Step};
//!
//! let script = Script::from_json(r#"[
//!     { "kind": "say", "who": "hana", "text": "Good morning." },
//!     { "kind": "end" }
//! ]"#).unwrap();
//! let resources = AssetCatalog::new().with_character("hana", "Hana", &[]);
//!
//! // The driver fulfils timer requests against a virtual clock
//! let mut driver = Driver::new(Interpreter::new(Recorder::new(), resources));
//! assert_eq!(driver.play(script), Step::AwaitAdvance);
//! assert_eq!(driver.advance_and_run(), Step::Ended);
//! ```
//!
//! ## Driving with real timers
//!
//! ```rust,no_run
//! use tsuzuri::{AssetCatalog, Interpreter, Recorder, Script, Step};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut interpreter = Interpreter::new(Recorder::new(), AssetCatalog::new());
//! let mut step = interpreter.start(Script::default());
//! while let Step::Resume { after, wake } = step {
//!     tokio::time::sleep(after).await;
//!     step = interpreter.wake(wake);
//! }
//! # }
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod driver;
pub mod logging;
pub mod presentation;
pub mod repository;
pub mod resources;
pub mod runtime;
pub mod storage;
pub mod types;

pub use check::{CheckReport, Issue, Severity, check};
pub use config::EngineConfig;
pub use driver::{Driver, VirtualClock};
pub use presentation::{PresentationError, Presenter, PresenterCall, Recorder};
pub use repository::{FileSystemRepository, InMemoryRepository, RepositoryError, ScriptRepository};
pub use resources::{AssetCatalog, CharacterDef, ResourceTable, StateDef};
pub use runtime::{Diagnostic, EngineError, Interpreter, Snapshot};
pub use storage::{load, save};
pub use types::{
    AudioState, AudioStatus, BackgroundState, BgmAction, CharAction, CharacterState,
    ChoiceOption, ChoiceSignal, Dialogue, Instruction, Phase, Script, ScriptError, Side, Step,
    Wake,
};
