//! Terminal front end used by the `tsuzuri` binary

pub mod check;
pub mod play;
pub mod terminal;
