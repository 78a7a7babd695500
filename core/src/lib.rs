#![no_std]

extern crate alloc;

pub use board::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use generator::*;
pub use random::*;
pub use replay::*;
pub use reveal::*;
pub use scoring::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod board;
mod clock;
mod config;
mod error;
mod generator;
mod random;
mod replay;
mod reveal;
mod scoring;
mod session;
mod tile;
mod types;

/// What a click did to the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    NoChange,
    Revealed,
    Marked(MarkState),
    Finished(GameResult),
}

impl ClickOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished(_))
    }
}
