use serde::{Deserialize, Serialize};

/// Canonical player-visible state stored by the engine for each cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCell {
    #[default]
    Hidden,
    Flagged,
    Revealed(u8),
}

impl EngineCell {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

/// What a renderer should draw for a cell, including the end-of-game sweep.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    #[default]
    Hidden,
    Flagged,
    Revealed(u8),
    /// A mine uncovered by the end-of-game sweep.
    Mine,
    /// The mine that lost the game.
    Exploded,
    /// A flag that turned out to be on a safe cell.
    IncorrectFlag,
}

impl CellView {
    /// Whether the cell is still drawn closed.
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged | Self::IncorrectFlag)
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine | Self::Exploded)
    }
}

impl From<EngineCell> for CellView {
    fn from(cell: EngineCell) -> Self {
        match cell {
            EngineCell::Hidden => CellView::Hidden,
            EngineCell::Flagged => CellView::Flagged,
            EngineCell::Revealed(count) => CellView::Revealed(count),
        }
    }
}
