//! Game-state engine for a grid-clearing mine puzzle.
//!
//! A [`Game`] owns the board and exposes commands ([`Game::reveal`], [`Game::toggle_flag`],
//! [`Game::chord_reveal`], [`Game::chord_flag`]) and the [`Game::status`] query. Mines are placed
//! lazily by a [`MinefieldGenerator`] on the first reveal. Timing comes from a [`Clock`] and won
//! games produce a [`Completion`] for a [`ScoreBoard`].

pub use cell::*;
pub use clock::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use layout::*;
pub use scores::*;
pub use snapshot::*;
pub use types::*;

mod cell;
mod clock;
mod config;
mod engine;
mod error;
mod generator;
mod layout;
mod scores;
mod snapshot;
mod types;
