use alloc::vec::Vec;
use hashbrown::HashSet;
use ndarray::Array2;

use super::*;

/// Places the bombs first in a flat list of cells, then shuffles the list by sorting it on
/// unique random keys.
#[derive(Clone, Debug, PartialEq)]
pub struct ShuffleGenerator {
    rng: SeededRandom,
}

impl ShuffleGenerator {
    pub fn new(rng: SeededRandom) -> Self {
        Self { rng }
    }

    pub fn from_seed(seed: SeedChoice) -> Self {
        Self::new(SeededRandom::from_choice(seed))
    }
}

impl BoardGenerator for ShuffleGenerator {
    fn generate_sized(mut self, size: Coord2, bomb_ratio: f64) -> Board {
        let size = (size.0.max(1), size.1.max(1));
        let total_cells = usize::from(mult(size.0, size.1));
        let bomb_total = usize::from(bomb_total_for(size, bomb_ratio));

        let mut used_keys = HashSet::with_capacity(total_cells);
        let mut collisions = 0usize;
        let mut keyed: Vec<(u32, bool)> = (0..total_cells)
            .map(|index| {
                let key = loop {
                    let key = self.rng.next_u32();
                    if used_keys.insert(key) {
                        break key;
                    }
                    collisions += 1;
                };
                (key, index < bomb_total)
            })
            .collect();
        if collisions > 0 {
            log::debug!("Redrew {collisions} colliding shuffle keys");
        }

        keyed.sort_unstable_by_key(|&(key, _)| key);

        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        for (index, &(_, is_bomb)) in keyed.iter().enumerate() {
            mine_mask[row_major_coords(index, size).to_nd_index()] = is_bomb;
        }

        let seed = self.rng.seed();
        log::debug!(
            "Shuffled {} bombs into {}x{} cells with seed {}",
            bomb_total,
            size.0,
            size.1,
            seed
        );
        Board::from_mine_mask(mine_mask, bomb_ratio, Some(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(config: GameConfig, seed: i32) -> Board {
        ShuffleGenerator::new(SeededRandom::new(seed)).generate(&config)
    }

    #[test]
    fn bomb_total_matches_config() {
        for difficulty in Difficulty::ALL {
            let config = GameConfig::preset(difficulty);
            let board = generate(config, 1234);
            assert_eq!(board.bomb_total(), config.bomb_total());
            assert_eq!(board.bomb_coords().len(), usize::from(config.bomb_total()));
            assert!(board.bomb_total() >= 1);
            assert!(board.bomb_total() <= board.total_cells());
        }
    }

    #[test]
    fn same_seed_same_board() {
        let config = GameConfig::preset(Difficulty::Hard);
        assert_eq!(generate(config, 99), generate(config, 99));
    }

    #[test]
    fn different_seeds_move_bombs() {
        let config = GameConfig::preset(Difficulty::Expert);
        assert_ne!(
            generate(config, 99).bomb_coords(),
            generate(config, 100).bomb_coords()
        );
    }

    #[test]
    fn bombs_are_spread_out() {
        // unshuffled, all 99 bombs would sit in the first rows
        let board = generate(GameConfig::preset(Difficulty::Hard), 5);
        let lower_half = board
            .bomb_coords()
            .into_iter()
            .filter(|&(_, y)| y >= 8)
            .count();
        assert!(lower_half > 0);
    }

    #[test]
    fn records_seed() {
        let board = generate(GameConfig::preset(Difficulty::Easy), -77);
        assert_eq!(board.seed(), Some(-77));
    }

    #[test]
    fn full_board_is_all_bombs() {
        let board = generate(GameConfig::custom(3, 2, 100.0), 8);
        assert_eq!(board.bomb_total(), 6);
        assert_eq!(board.safe_cell_count(), 0);
        assert_eq!(board.three_bv_total(), 0);
    }

    #[test]
    fn zero_ratio_still_places_one_bomb() {
        let board = ShuffleGenerator::new(SeededRandom::new(42)).generate_sized((9, 9), 0.0);
        assert_eq!(board.bomb_total(), 1);
        assert_eq!(board.bomb_coords().len(), 1);
    }

    #[test]
    fn single_cell_board() {
        let board = generate(GameConfig::custom(1, 1, 24.0), 3);
        assert_eq!(board.bomb_total(), 1);
        assert!(board[(0, 0)].is_bomb());
        assert!(board[(0, 0)].neighbors().is_empty());
    }
}
