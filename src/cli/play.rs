//! CUI player mode for running scripts
//!
//! Drives an [`Interpreter`] with real timers and stdin: timer requests are
//! slept on with `tokio::time`, advances and choices are read line by line.

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::cli::terminal::TerminalPresenter;
use crate::config::EngineConfig;
use crate::presentation::Presenter;
use crate::resources::{AssetCatalog, ResourceTable};
use crate::runtime::Interpreter;
use crate::types::{Phase, Script, Step};

type Input = Lines<BufReader<Stdin>>;

/// Run the player mode
pub async fn run_play(
    script: Script,
    catalog: AssetCatalog,
    config: EngineConfig,
    debug: bool,
) -> anyhow::Result<()> {
    let mut interpreter = Interpreter::with_config(TerminalPresenter::stdout(), catalog, config);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("=== tsuzuri Script Player ===");
    println!();
    println!("Controls:");
    println!("  Enter: next");
    println!("  1-9:   select choice");
    println!("  q:     quit");

    let mut step = interpreter.start(script);
    loop {
        step = match step {
            Step::Resume { after, wake } => {
                tokio::time::sleep(after).await;
                interpreter.wake(wake)
            }
            Step::AwaitAdvance => {
                if debug {
                    display_debug_info(&interpreter);
                }
                match read_command(&mut input).await? {
                    Command::Quit => break,
                    Command::Next => interpreter.advance(),
                    Command::Other(_) => {
                        println!("Press Enter to continue, or 'q' to quit.");
                        Step::AwaitAdvance
                    }
                }
            }
            Step::AwaitChoice => {
                if debug {
                    display_debug_info(&interpreter);
                }
                print!("Select (1-9): ");
                std::io::Write::flush(&mut std::io::stdout())?;
                match read_command(&mut input).await? {
                    Command::Quit => break,
                    Command::Next => Step::AwaitChoice,
                    Command::Other(text) => choose(&mut interpreter, &text),
                }
            }
            Step::Ended | Step::Stopped => break,
            Step::Ignored => match interpreter.phase() {
                Phase::AwaitingAdvance => Step::AwaitAdvance,
                Phase::AwaitingChoice => Step::AwaitChoice,
                _ => break,
            },
        };
    }

    interpreter.stop();
    report_diagnostics(&interpreter);
    println!();
    println!("Goodbye!");
    Ok(())
}

enum Command {
    Next,
    Quit,
    Other(String),
}

async fn read_command(input: &mut Input) -> anyhow::Result<Command> {
    let Some(line) = input.next_line().await? else {
        return Ok(Command::Quit);
    };
    let line = line.trim();
    Ok(match line {
        "" => Command::Next,
        "q" => Command::Quit,
        other => Command::Other(other.to_string()),
    })
}

/// Apply a 1-based choice typed by the reader
fn choose<P: Presenter, R: ResourceTable>(
    interpreter: &mut Interpreter<P, R>,
    text: &str,
) -> Step {
    let index = match text.parse::<usize>() {
        Ok(n) if n > 0 => n - 1,
        _ => {
            println!("Invalid input. Enter a number or 'q'.");
            return Step::AwaitChoice;
        }
    };
    match interpreter.select_choice(index) {
        Ok(step) => step,
        Err(err) => {
            println!("Invalid choice: {err}");
            Step::AwaitChoice
        }
    }
}

/// Display debug information (only when --debug is set)
fn display_debug_info<P: Presenter, R: ResourceTable>(interpreter: &Interpreter<P, R>) {
    println!();
    println!("[debug] pc={} phase={:?}", interpreter.pc(), interpreter.phase());
    let visible: Vec<&str> = interpreter
        .characters()
        .iter()
        .filter(|(_, c)| c.visible)
        .map(|(id, _)| id.as_str())
        .collect();
    println!(
        "[debug] characters={visible:?} audio={:?}",
        interpreter.audio().status
    );
}

fn report_diagnostics<P: Presenter, R: ResourceTable>(interpreter: &Interpreter<P, R>) {
    let diagnostics = interpreter.diagnostics();
    if diagnostics.is_empty() {
        return;
    }
    println!();
    println!("{} problem(s) during this run:", diagnostics.len());
    for diagnostic in diagnostics {
        println!("  - {diagnostic}");
    }
}
