use core::fmt::Debug;
use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

/// Places the mines of a game once the first cell to open is known.
pub trait MinefieldGenerator: Debug {
    /// Produces a layout matching `config`. `start` is the first revealed cell.
    fn generate(&mut self, config: GameConfig, start: Coord2) -> MineLayout;
}

/// How much room is kept free around the first revealed cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartTile {
    /// Only the start cell itself is mine-free.
    #[default]
    SimpleSafe,
    /// The start cell and its neighbours are mine-free, so the first reveal always cascades.
    AlwaysZero,
}

/// A known layout replays itself regardless of where the game starts.
impl MinefieldGenerator for MineLayout {
    fn generate(&mut self, config: GameConfig, start: Coord2) -> MineLayout {
        if self.game_config() != config {
            log::warn!(
                "Fixed layout {:?} does not match requested config {:?}",
                self.game_config(),
                config
            );
        }
        if self.contains_mine(start) {
            log::debug!("Fixed layout has a mine on the start cell {:?}", start);
        }
        self.clone()
    }
}
