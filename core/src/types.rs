/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for bomb counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Identifier of an opening group, numbered from 1 in row-major discovery order.
pub type OpeningId = u16;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Coordinates of the `index`-th cell when a board of `size` is laid out row by row.
pub(crate) fn row_major_coords(index: usize, size: Coord2) -> Coord2 {
    let width = usize::from(size.0);
    // both quotients are bounded by the axis sizes, which fit in a Coord
    ((index % width) as Coord, (index / width) as Coord)
}

/// Iterates all coordinates of a board of `size`, row by row.
pub fn iter_row_major(size: Coord2) -> impl Iterator<Item = Coord2> {
    let (width, height) = size;
    (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
}

/// Neighbour offsets in scan order, top-left to bottom-right.
static DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn offset(coords: Coord2, (dx, dy): (i8, i8), size: Coord2) -> Option<Coord2> {
    let x = coords.0.checked_add_signed(dx).filter(|&x| x < size.0)?;
    let y = coords.1.checked_add_signed(dy).filter(|&y| y < size.1)?;
    Some((x, y))
}

/// Boundary-clipped neighbours of a cell, top-left to bottom-right.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    size: Coord2,
    displacements: core::slice::Iter<'static, (i8, i8)>,
}

impl NeighborIter {
    pub fn new(center: Coord2, size: Coord2) -> Self {
        Self {
            center,
            size,
            displacements: DISPLACEMENTS.iter(),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        let (center, size) = (self.center, self.size);
        self.displacements
            .find_map(|&delta| offset(center, delta, size))
    }
}
