//! Glyph-by-glyph text reveal
//!
//! The typewriter does not own a timer. Each call to [`Typewriter::tick`]
//! reveals one more character; the caller decides the cadence. Starting a new
//! reveal invalidates the previous one: its ticket goes stale and its
//! completion payload is dropped without ever being returned.

/// Identifies one reveal run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Outcome of a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick<T> {
    /// Some but not all of the text is visible
    Partial { shown: String, next: Ticket },
    /// The whole text is visible; `on_complete` is handed out exactly once
    Complete { shown: String, on_complete: T },
    /// The ticket belongs to a replaced or cancelled reveal
    Stale,
}

#[derive(Debug)]
struct Reveal<T> {
    text: String,
    /// Byte offset of the end of the visible prefix
    cursor: usize,
    on_complete: T,
}

#[derive(Debug)]
pub struct Typewriter<T> {
    generation: u64,
    active: Option<Reveal<T>>,
}

impl<T> Default for Typewriter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Typewriter<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            active: None,
        }
    }

    /// Begin revealing `text`, replacing any reveal in flight
    pub fn start(&mut self, text: impl Into<String>, on_complete: T) -> Ticket {
        self.generation += 1;
        self.active = Some(Reveal {
            text: text.into(),
            cursor: 0,
            on_complete,
        });
        Ticket(self.generation)
    }

    pub fn tick(&mut self, ticket: Ticket) -> Tick<T> {
        if ticket.0 != self.generation {
            return Tick::Stale;
        }
        let Some(reveal) = self.active.as_mut() else {
            return Tick::Stale;
        };

        if let Some(glyph) = reveal.text[reveal.cursor..].chars().next() {
            reveal.cursor += glyph.len_utf8();
        }

        if reveal.cursor < reveal.text.len() {
            return Tick::Partial {
                shown: reveal.text[..reveal.cursor].to_string(),
                next: ticket,
            };
        }

        match self.active.take() {
            Some(done) => Tick::Complete {
                shown: done.text,
                on_complete: done.on_complete,
            },
            None => Tick::Stale,
        }
    }

    /// Drop the reveal in flight, if any
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.active = None;
    }

    pub fn is_revealing(&self) -> bool {
        self.active.is_some()
    }

    /// Currently visible prefix
    pub fn shown(&self) -> Option<&str> {
        self.active.as_ref().map(|r| &r.text[..r.cursor])
    }
}
