use alloc::collections::VecDeque;
use ndarray::Array2;

use crate::*;

/// Result of digging a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DigOutcome {
    NoChange,
    Revealed { opened: CellCount },
    HitMine,
}

impl DigOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Numbers every connected region of zero cells and marks the cells bordering them.
///
/// Regions are discovered row by row and numbered from 1. Returns how many were found.
pub(crate) fn assign_opening_groups(cells: &mut Array2<Cell>, size: Coord2) -> CellCount {
    let mut openings: OpeningId = 0;
    let mut to_visit = VecDeque::new();

    for start in iter_row_major(size) {
        let cell = &mut cells[start.to_nd_index()];
        if !cell.is_zero() || cell.opening_group.is_some() {
            continue;
        }

        openings += 1;
        cell.opening_group = Some(openings);
        to_visit.push_back(start);

        while let Some(visit_coords) = to_visit.pop_front() {
            let neighbors = cells[visit_coords.to_nd_index()].neighbors.clone();
            for pos in neighbors {
                let neighbor = &mut cells[pos.to_nd_index()];
                if neighbor.is_zero() && neighbor.opening_group.is_none() {
                    neighbor.opening_group = Some(openings);
                    to_visit.push_back(pos);
                }
            }
        }
    }

    for coords in iter_row_major(size) {
        let cell = &cells[coords.to_nd_index()];
        if cell.opening_group.is_some() {
            continue;
        }
        let borders_opening = cell
            .neighbors()
            .iter()
            .any(|&pos| cells[pos.to_nd_index()].opening_group.is_some());
        cells[coords.to_nd_index()].is_opening_boundary = borders_opening;
    }

    openings
}

/// Opens `coords`, cascading through zero cells with an explicit work queue.
///
/// Already revealed cells are left untouched, so every cell is opened at most once.
pub(crate) fn dig(board: &mut Board, coords: Coord2) -> DigOutcome {
    let cell = board.cell_mut(coords);
    if cell.revealed {
        return DigOutcome::NoChange;
    }
    cell.revealed = true;

    if cell.is_bomb() {
        log::debug!("Dug bomb at {:?}", coords);
        return DigOutcome::HitMine;
    }

    let mut opened: CellCount = 1;
    if cell.adjacent_bombs() == 0 {
        let mut to_visit: VecDeque<Coord2> = cell.neighbors().iter().copied().collect();
        log::trace!("Starting flood-fill from {:?}", coords);

        while let Some(visit_coords) = to_visit.pop_front() {
            let visit = board.cell_mut(visit_coords);
            if visit.revealed {
                continue;
            }
            visit.revealed = true;
            opened += 1;
            log::trace!(
                "Flood opened cell at {:?}, bomb count: {}",
                visit_coords,
                visit.adjacent_bombs()
            );

            if visit.adjacent_bombs() == 0 {
                to_visit.extend(visit.neighbors().iter().copied());
            }
        }
    }

    DigOutcome::Revealed { opened }
}

/// Shows every bomb after an explosion.
pub(crate) fn reveal_bombs(board: &mut Board) {
    for coords in board.bomb_coords() {
        board.cell_mut(coords).revealed = true;
    }
}
