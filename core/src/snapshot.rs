use core::time::Duration;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Read-only picture of a game, everything a renderer needs to redraw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub state: GameState,
    pub size: Coord2,
    pub total_mines: CellCount,
    pub mines_left: CellCount,
    pub safe_cells_left: CellCount,
    pub elapsed: Option<Duration>,
    pub cells: Array2<CellView>,
}

impl StatusSnapshot {
    pub fn cell(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, CellView)> + '_ {
        iter_coords(self.size).filter_map(|coords| Some((coords, self.cell(coords)?)))
    }

    pub fn count(&self, view: CellView) -> usize {
        self.cells.iter().filter(|&&cell| cell == view).count()
    }

    pub fn revealed_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, CellView::Revealed(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_game_is_all_hidden() {
        let config = GameConfig::square(4, 3).unwrap();
        let status = Game::with_seed(config, 1, StartTile::SimpleSafe)
            .unwrap()
            .status();

        assert_eq!(status.state, GameState::NotStarted);
        assert_eq!(status.count(CellView::Hidden), 16);
        assert_eq!(status.mines_left, 3);
        assert_eq!(status.safe_cells_left, 13);
        assert_eq!(status.elapsed, None);
        assert_eq!(status.cell((4, 0)), None);
    }

    #[test]
    fn iter_cells_visits_every_position() {
        let layout = MineLayout::from_mine_coords((4, 1), &[(3, 0)]).unwrap();
        let mut game = Game::from_layout(layout).unwrap();
        game.reveal((0, 0)).unwrap();
        let status = game.status();

        assert_eq!(status.iter_cells().count(), 4);
        assert_eq!(status.revealed_cells(), 3);
        assert_eq!(status.state, GameState::Won);
        assert_eq!(status.cell((3, 0)), Some(CellView::Mine));
    }
}
