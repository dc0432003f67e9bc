//! Terminal presenter for the CLI player
//!
//! Prints a plain-text rendition of every effect. Dialogue text is written
//! incrementally: each reveal tick prints only the glyphs that are new since
//! the previous tick.

use std::io::{self, Write};

use crate::presentation::{PresentationError, Presenter};
use crate::types::{ChoiceSignal, Side};

pub struct TerminalPresenter<W: Write> {
    out: W,
    /// Bytes of the current dialogue line already written
    printed: usize,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out, printed: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// End a dialogue line in progress so the next output starts on its own line
    fn break_line(&mut self) {
        if self.printed > 0 {
            self.write("\n");
            self.printed = 0;
        }
    }

    fn line(&mut self, text: &str) {
        self.break_line();
        self.write(text);
        self.write("\n");
    }

    fn write(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            log::warn!(target: "engine", "terminal write failed: {err}");
        }
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Left => "left",
        Side::Center => "center",
        Side::Right => "right",
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn set_background_visible(&mut self, visible: bool) {
        let text = if visible { "[bg] shown" } else { "[bg] hidden" };
        self.line(text);
    }

    fn set_background_image(&mut self, asset: &str) {
        self.line(&format!("[bg] {asset}"));
    }

    fn show_character(&mut self, id: &str, asset: Option<&str>, side: Side) {
        let text = match asset {
            Some(asset) => format!("[show] {id} ({}) {asset}", side_name(side)),
            None => format!("[show] {id} ({})", side_name(side)),
        };
        self.line(&text);
    }

    fn hide_character(&mut self, id: &str) {
        self.line(&format!("[hide] {id}"));
    }

    fn set_character_state(&mut self, id: &str, asset: &str) {
        self.line(&format!("[state] {id} {asset}"));
    }

    fn show_dialogue(&mut self, speaker: Option<&str>) {
        self.break_line();
        self.write("\n");
        if let Some(speaker) = speaker {
            self.write(&format!("{speaker}:\n"));
        }
    }

    fn render_dialogue_text(&mut self, shown: &str) {
        match shown.get(self.printed..) {
            Some(suffix) => self.write(suffix),
            _ => {
                self.write("\n");
                self.write(shown);
            }
        }
        self.printed = shown.len();
    }

    fn clear_dialogue(&mut self) {
        self.break_line();
    }

    fn render_choices(&mut self, choices: &[String]) {
        self.break_line();
        self.write("\n--- Choice ---\n");
        for (i, choice) in choices.iter().enumerate() {
            self.write(&format!("{}. {}\n", i + 1, choice));
        }
    }

    fn clear_choices(&mut self) {}

    fn play_audio(&mut self, asset: &str, looping: bool) -> Result<(), PresentationError> {
        let suffix = if looping { " (loop)" } else { "" };
        self.line(&format!("[music] {asset}{suffix}"));
        Ok(())
    }

    fn stop_audio(&mut self) {
        self.line("[music] stop");
    }

    fn pause_audio(&mut self) {
        self.line("[music] pause");
    }

    fn emit_signal(&mut self, signal: &ChoiceSignal) {
        let text = match &signal.payload {
            Some(payload) => format!("[signal] {} {}", signal.event, payload),
            None => format!("[signal] {}", signal.event),
        };
        self.line(&text);
    }

    fn show_end(&mut self, text: &str) {
        self.break_line();
        self.write(&format!("\n{text}\n"));
    }
}
