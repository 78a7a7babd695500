use serde::{Deserialize, Serialize};

use crate::*;

/// What a single left click on an unrevealed cell counts towards.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DigCredit {
    pub three_bv: bool,
    pub opening: bool,
}

/// Credit for digging `cell`, evaluated before the dig happens.
///
/// A click scores 3BV when it hits a cell outside every opening, or when it hits a zero cell
/// and so triggers a whole opening. Numbered cells on an opening's border are swept in by
/// that opening and never score on their own.
pub fn classify_dig(cell: &Cell) -> DigCredit {
    if cell.is_bomb() || cell.is_revealed() {
        return DigCredit::default();
    }
    DigCredit {
        three_bv: !cell.is_in_opening() || cell.adjacent_bombs() == 0,
        opening: cell.adjacent_bombs() == 0,
    }
}

/// Minimum clicks to clear: one per opening plus one per safe cell no opening reaches.
pub(crate) fn three_bv_total<'a>(
    cells: impl Iterator<Item = &'a Cell>,
    openings_total: CellCount,
) -> CellCount {
    let isolated = cells
        .filter(|cell| !cell.is_bomb() && !cell.is_in_opening())
        .count() as CellCount;
    openings_total + isolated
}

/// Running 3BV and opening progress, shared by live play and log replay.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub three_bv_solved: CellCount,
    pub openings_triggered: CellCount,
}

impl Tally {
    pub fn record(&mut self, credit: DigCredit) {
        if credit.three_bv {
            self.three_bv_solved += 1;
        }
        if credit.opening {
            self.openings_triggered += 1;
        }
    }

    /// Classifies and records a dig of `cell`, returning the credit given.
    pub fn record_dig(&mut self, cell: &Cell) -> DigCredit {
        let credit = classify_dig(cell);
        self.record(credit);
        credit
    }
}

/// Solved 3BV per second; the solved count is taken as at least one.
pub fn three_bv_per_second(three_bv_solved: CellCount, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds > 0.0 {
        f64::from(three_bv_solved.max(1)) / elapsed_seconds
    } else {
        0.0
    }
}

/// Time to clear the whole board at the current 3BV/s.
pub fn estimated_time(three_bv_total: CellCount, three_bv_per_second: f64) -> f64 {
    if three_bv_per_second > 0.0 {
        f64::from(three_bv_total) / three_bv_per_second
    } else {
        0.0
    }
}
