use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// The immutable set of mine positions for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
    size: Coord2,
}

impl MineLayout {
    /// A layout of `size` without any mine, used before mines are placed.
    pub fn empty(size: Coord2) -> Self {
        Self {
            mine_mask: Array2::default(size.to_nd_index()),
            mine_count: 0,
            size,
        }
    }

    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (width, height) = mine_mask.dim();
        let width = Coord::try_from(width).map_err(|_| GameError::InvalidSize)?;
        let height = Coord::try_from(height).map_err(|_| GameError::InvalidSize)?;
        if width == 0 || height == 0 {
            return Err(GameError::InvalidSize);
        }

        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count();
        Ok(Self {
            mine_mask,
            // a 255x255 board fits in CellCount
            mine_count: mine_count as CellCount,
            size: (width, height),
        })
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidSize);
        }

        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(mine_mask)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size, self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    /// Out-of-bounds positions never hold a mine.
    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.mine_mask
            .get(coords.to_nd_index())
            .copied()
            .unwrap_or(false)
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        neighbors(coords, self.size)
            .filter(|&pos| self.contains_mine(pos))
            .count() as u8
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        iter_coords(self.size).filter(|&coords| self.contains_mine(coords))
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_counts_match_neighborhood() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(layout.adjacent_mine_count((1, 1)), 2);
        assert_eq!(layout.adjacent_mine_count((1, 0)), 1);
        assert_eq!(layout.adjacent_mine_count((2, 0)), 0);
        assert_eq!(layout.adjacent_mine_count((0, 0)), 0);
    }

    #[test]
    fn duplicate_coords_count_once() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(1, 1), (1, 1)]).unwrap();
        assert_eq!(layout.mine_count(), 1);
        assert_eq!(layout.safe_cell_count(), 3);
    }

    #[test]
    fn rejects_out_of_bounds_mine() {
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn out_of_bounds_is_not_a_mine() {
        let layout = MineLayout::from_mine_coords((1, 1), &[(0, 0)]).unwrap();
        assert!(layout.contains_mine((0, 0)));
        assert!(!layout.contains_mine((1, 0)));
    }

    #[test]
    fn iter_mines_lists_every_mine() {
        let mines = [(0, 1), (3, 0)];
        let layout = MineLayout::from_mine_coords((4, 2), &mines).unwrap();
        let found: Vec<_> = layout.iter_mines().collect();
        assert_eq!(found, vec![(0, 1), (3, 0)]);
        assert_eq!(layout.game_config(), GameConfig::new_unchecked((4, 2), 2));
    }
}
