use crate::*;
pub use shuffle::*;

mod shuffle;

pub trait BoardGenerator {
    /// Builds a board of `size` with `round(cells * bomb_ratio / 100)` bombs, at least one.
    fn generate_sized(self, size: Coord2, bomb_ratio: f64) -> Board
    where
        Self: Sized;

    fn generate(self, config: &GameConfig) -> Board
    where
        Self: Sized,
    {
        self.generate_sized(config.size(), config.bomb_ratio())
    }
}

/// Bomb count for a board: the ratio applied to the cell count, rounded half up and clamped
/// to `1..=cells`. Unusable ratios end up as a single bomb.
pub fn bomb_total_for(size: Coord2, bomb_ratio: f64) -> CellCount {
    let total_cells = mult(size.0, size.1);
    let exact = f64::from(total_cells) * bomb_ratio / 100.0;
    // float to int casts saturate, negative and NaN land on zero
    let rounded = (exact + 0.5) as u64;
    rounded.clamp(1, u64::from(total_cells.max(1))) as CellCount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bomb_total_is_never_zero() {
        assert_eq!(bomb_total_for((9, 9), 0.0), 1);
        assert_eq!(bomb_total_for((9, 9), -5.0), 1);
        assert_eq!(bomb_total_for((9, 9), f64::NAN), 1);
    }

    #[test]
    fn bomb_total_never_exceeds_cells() {
        assert_eq!(bomb_total_for((3, 3), 150.0), 9);
        assert_eq!(bomb_total_for((3, 3), f64::INFINITY), 9);
    }

    #[test]
    fn bomb_total_rounds_half_up() {
        // 4 * 37.5% = 1.5, 10 * 25% = 2.5
        assert_eq!(bomb_total_for((2, 2), 37.5), 2);
        assert_eq!(bomb_total_for((10, 1), 25.0), 3);
        assert_eq!(bomb_total_for((9, 9), 12.345), 10);
    }
}
