use smallvec::SmallVec;

/// Single coordinate axis used for board rows, columns and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Neighbourhood of a single cell, never more than 8 entries.
pub type Neighbors = SmallVec<[Coord2; 8]>;

/// `ndarray` index of a board position.
pub(crate) const fn nd_index((row, col): Coord2) -> [usize; 2] {
    [row as usize, col as usize]
}

/// Number of cells on a `rows x cols` board.
pub const fn cell_count((rows, cols): Coord2) -> CellCount {
    (rows as CellCount).saturating_mul(cols as CellCount)
}

/// Row-major offsets of the eight surrounding cells.
const OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Surrounding cells of `center` on a board of `size`, in row-major order.
#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Coord2,
    size: Coord2,
    offsets: core::slice::Iter<'static, (i8, i8)>,
}

impl NeighborIter {
    pub fn new(center: Coord2, size: Coord2) -> Self {
        Self {
            center,
            size,
            offsets: OFFSETS.iter(),
        }
    }

    fn shifted(&self, (d_row, d_col): (i8, i8)) -> Option<Coord2> {
        let row = self.center.0.checked_add_signed(d_row).filter(|&row| row < self.size.0)?;
        let col = self.center.1.checked_add_signed(d_col).filter(|&col| col < self.size.1)?;
        Some((row, col))
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&offset) = self.offsets.next() {
            if let Some(pos) = self.shifted(offset) {
                return Some(pos);
            }
        }
        None
    }
}
