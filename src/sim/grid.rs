//! Dense byte-per-cell world storage

use super::tile::TileType;

/// The world: `width * height` tile bytes in row-major order.
///
/// Reads outside the grid see Stone so the world edge behaves like an
/// unbreakable wall; writes outside the grid are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl TileGrid {
    /// All-Air grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![TileType::Air.id(); width * height],
        }
    }

    /// Wrap raw bytes. Returns `None` unless `bytes.len() == width * height`.
    ///
    /// Unknown ids are rewritten to Air so every stored byte stays a valid tile.
    pub fn from_bytes(width: usize, height: usize, mut bytes: Vec<u8>) -> Option<Self> {
        if bytes.len() != width * height {
            return None;
        }
        for b in bytes.iter_mut() {
            if TileType::from_id(*b).is_none() {
                *b = TileType::Air.id();
            }
        }
        Some(Self {
            width,
            height,
            cells: bytes,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    /// Tile at (x, y); Stone outside the world
    pub fn get(&self, x: i32, y: i32) -> TileType {
        match self.index(x, y) {
            Some(i) => TileType::from_id(self.cells[i]).unwrap_or(TileType::Air),
            None => TileType::Stone,
        }
    }

    /// Write a tile; ignored outside the world
    pub fn set(&mut self, x: i32, y: i32, tile: TileType) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = tile.id();
        }
    }

    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_solid()
    }

    /// Count of cells holding `tile`
    pub fn count(&self, tile: TileType) -> usize {
        self.cells.iter().filter(|&&b| b == tile.id()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_out_of_bounds_is_stone() {
        let grid = TileGrid::new(8, 4);
        assert_eq!(grid.get(-1, 0), TileType::Stone);
        assert_eq!(grid.get(0, -1), TileType::Stone);
        assert_eq!(grid.get(8, 0), TileType::Stone);
        assert_eq!(grid.get(0, 4), TileType::Stone);
        assert_eq!(grid.get(0, 0), TileType::Air);
    }

    #[test]
    fn test_out_of_bounds_write_ignored() {
        let mut grid = TileGrid::new(8, 4);
        let before = grid.clone();
        grid.set(-1, 2, TileType::Brick);
        grid.set(8, 2, TileType::Brick);
        grid.set(3, 4, TileType::Brick);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_from_bytes_checks_length() {
        assert!(TileGrid::from_bytes(4, 4, vec![0; 15]).is_none());
        assert!(TileGrid::from_bytes(4, 4, vec![0; 16]).is_some());
    }

    #[test]
    fn test_from_bytes_scrubs_unknown_ids() {
        let grid = TileGrid::from_bytes(2, 1, vec![3, 200]).unwrap();
        assert_eq!(grid.get(0, 0), TileType::Stone);
        assert_eq!(grid.get(1, 0), TileType::Air);
        assert_eq!(grid.as_bytes(), &[3, 0]);
    }

    proptest! {
        #[test]
        fn prop_set_then_get(x in 0i32..32, y in 0i32..16, id in 0u8..10) {
            let tile = TileType::from_id(id).unwrap();
            let mut grid = TileGrid::new(32, 16);
            grid.set(x, y, tile);
            prop_assert_eq!(grid.get(x, y), tile);
        }

        #[test]
        fn prop_outside_reads_stone(x in -100i32..100, y in -100i32..100) {
            prop_assume!(!(0..32).contains(&x) || !(0..16).contains(&y));
            let grid = TileGrid::new(32, 16);
            prop_assert_eq!(grid.get(x, y), TileType::Stone);
        }
    }
}
