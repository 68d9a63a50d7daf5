use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{SeedableRng, seq::index};

use super::*;

/// Uniform placement without replacement over every cell outside the start area.
#[derive(Clone, Debug)]
pub struct RandomMinefieldGenerator {
    rng: SmallRng,
    start_tile: StartTile,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start_tile: StartTile) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            start_tile,
        }
    }

    pub fn from_entropy(start_tile: StartTile) -> Self {
        Self::new(rand::random(), start_tile)
    }

    /// Cells that must stay mine-free, falling back to a plain safe start when the board is too
    /// crowded to clear the whole neighbourhood.
    fn reserved_cells(&self, config: GameConfig, start: Coord2) -> Vec<Coord2> {
        let mut reserved = vec![start];
        if self.start_tile == StartTile::AlwaysZero {
            let zone: Vec<_> = neighbors(start, config.size).collect();
            let needed = usize::from(config.mines) + 1 + zone.len();
            if needed > usize::from(config.total_cells()) {
                log::warn!("Cannot make start tile zero, fallback to simple safe");
            } else {
                reserved.extend(zone);
            }
        }
        reserved
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(&mut self, config: GameConfig, start: Coord2) -> MineLayout {
        let reserved = self.reserved_cells(config, start);
        let candidates: Vec<Coord2> = iter_coords(config.size)
            .filter(|coords| !reserved.contains(coords))
            .collect();

        let requested = usize::from(config.mines);
        if requested > candidates.len() {
            log::warn!(
                "Minefield too small, requested {} mines but only {} cells are free",
                requested,
                candidates.len()
            );
        }
        let amount = requested.min(candidates.len());

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        for pick in index::sample(&mut self.rng, candidates.len(), amount) {
            mine_mask[candidates[pick].to_nd_index()] = true;
        }
        log::debug!(
            "Placed {} mines on a {}x{} board, start at {:?}",
            amount,
            config.size.0,
            config.size.1,
            start
        );

        MineLayout::from_mine_mask(mine_mask).unwrap_or_else(|_| MineLayout::empty(config.size))
    }
}
