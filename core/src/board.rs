use core::ops::Index;

use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::reveal::assign_opening_groups;
use crate::scoring::three_bv_total;
use crate::*;

/// One square of the board. Everything except `revealed` and `mark` is fixed at generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    coords: Coord2,
    is_bomb: bool,
    adjacent_bombs: u8,
    pub(crate) opening_group: Option<OpeningId>,
    pub(crate) is_opening_boundary: bool,
    pub(crate) revealed: bool,
    pub(crate) mark: MarkState,
    pub(crate) neighbors: SmallVec<[Coord2; 8]>,
}

impl Cell {
    pub fn coords(&self) -> Coord2 {
        self.coords
    }

    pub fn is_bomb(&self) -> bool {
        self.is_bomb
    }

    pub fn adjacent_bombs(&self) -> u8 {
        self.adjacent_bombs
    }

    pub fn opening_group(&self) -> Option<OpeningId> {
        self.opening_group
    }

    pub fn is_opening_boundary(&self) -> bool {
        self.is_opening_boundary
    }

    /// Whether the cell opens together with some opening group, either as a member or its border.
    pub fn is_in_opening(&self) -> bool {
        self.opening_group.is_some() || self.is_opening_boundary
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn mark(&self) -> MarkState {
        self.mark
    }

    pub fn neighbors(&self) -> &[Coord2] {
        &self.neighbors
    }

    /// Safe cell with no adjacent bombs, the kind that cascades when dug.
    pub fn is_zero(&self) -> bool {
        !self.is_bomb && self.adjacent_bombs == 0
    }
}

/// Generated board: bomb placement, adjacency, opening groups and the 3BV it takes to clear.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    bomb_ratio: f64,
    bomb_total: CellCount,
    seed: Option<i32>,
    openings_total: CellCount,
    three_bv_total: CellCount,
}

impl Board {
    /// Builds a board from a bomb mask indexed `(x, y)`.
    pub(crate) fn from_mine_mask(mine_mask: Array2<bool>, bomb_ratio: f64, seed: Option<i32>) -> Self {
        let (width, height) = mine_mask.dim();
        // callers build masks from Coord2 sizes
        let size = (width as Coord, height as Coord);

        let mut cells = Array2::from_shape_fn((width, height), |(x, y)| {
            let coords = (x as Coord, y as Coord);
            let neighbors: SmallVec<[Coord2; 8]> = NeighborIter::new(coords, size).collect();
            let adjacent_bombs = neighbors
                .iter()
                .filter(|&&pos| mine_mask[pos.to_nd_index()])
                .count() as u8;
            Cell {
                coords,
                is_bomb: mine_mask[coords.to_nd_index()],
                adjacent_bombs,
                opening_group: None,
                is_opening_boundary: false,
                revealed: false,
                mark: MarkState::None,
                neighbors,
            }
        });

        let bomb_total = cells.iter().filter(|cell| cell.is_bomb).count() as CellCount;
        let openings_total = assign_opening_groups(&mut cells, size);
        let three_bv_total = three_bv_total(cells.iter(), openings_total);

        log::debug!(
            "Built {}x{} board with {} bombs, {} openings, 3BV {}",
            width,
            height,
            bomb_total,
            openings_total,
            three_bv_total
        );

        Self {
            cells,
            bomb_ratio,
            bomb_total,
            seed,
            openings_total,
            three_bv_total,
        }
    }

    /// Builds a board with bombs at exactly the given coordinates, any count including none.
    pub fn from_bomb_coords(size: Coord2, bomb_coords: &[Coord2]) -> Result<Self> {
        let size = (size.0.max(1), size.1.max(1));
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in bomb_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        let bombs = mine_mask.iter().filter(|&&is_bomb| is_bomb).count();
        let bomb_ratio = bombs as f64 * 100.0 / f64::from(mult(size.0, size.1));
        Ok(Self::from_mine_mask(mine_mask, bomb_ratio, None))
    }

    /// Copy of this board with every cell hidden and unmarked again.
    pub fn pristine(&self) -> Self {
        let mut board = self.clone();
        for cell in board.cells.iter_mut() {
            cell.revealed = false;
            cell.mark = MarkState::None;
        }
        board
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        let (width, height) = self.size();
        mult(width, height)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.bomb_total
    }

    pub fn bomb_total(&self) -> CellCount {
        self.bomb_total
    }

    pub fn bomb_ratio(&self) -> f64 {
        self.bomb_ratio
    }

    /// Seed the board was generated from, `None` for hand-placed layouts.
    pub fn seed(&self) -> Option<i32> {
        self.seed
    }

    pub fn openings_total(&self) -> CellCount {
        self.openings_total
    }

    pub fn three_bv_total(&self) -> CellCount {
        self.three_bv_total
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Converts wide coordinates, as found in play logs, when they land on the board.
    pub fn checked_coords(&self, x: u32, y: u32) -> Option<Coord2> {
        let coords = (Coord::try_from(x).ok()?, Coord::try_from(y).ok()?);
        self.validate_coords(coords).ok()
    }

    pub fn cell(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }

    /// All cells, row by row.
    pub fn iter_cells(&self) -> impl Iterator<Item = &Cell> {
        iter_row_major(self.size()).map(|coords| &self[coords])
    }

    pub fn bomb_coords(&self) -> Vec<Coord2> {
        self.iter_cells()
            .filter(|cell| cell.is_bomb)
            .map(Cell::coords)
            .collect()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.revealed).count() as CellCount
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}
