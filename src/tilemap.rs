//! Dense row-major 2D grids.
//!
//! Backs both the biome region snapshots and the map pixel buffer. Nothing
//! wraps: the map and the region are bounded squares.

use rayon::prelude::*;

/// A 2D grid stored row by row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone + Default + Send> Tilemap<T> {
    /// Build a grid by evaluating `f(x, y)` for every cell, one rayon task per row.
    pub fn from_fn_par<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> T + Sync,
    {
        let mut map = Self::new(width, height);
        if width == 0 {
            return map;
        }
        map.data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = f(x, y);
                }
            });
        map
    }
}

impl<T> Tilemap<T> {
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y * self.width + x
    }

    /// Whether `(x, y)` lies inside the grid.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Cell at `(x, y)`. Panics when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let mut map: Tilemap<u8> = Tilemap::new(4, 3);
        map.set(1, 2, 9);

        assert_eq!(*map.get(1, 2), 9);
        assert_eq!(map.data[2 * 4 + 1], 9);
        assert!(map.contains(3, 2));
        assert!(!map.contains(4, 0));
    }

    #[test]
    fn test_from_fn_par_matches_sequential() {
        let map = Tilemap::from_fn_par(17, 9, |x, y| x * 100 + y);

        for y in 0..9 {
            for x in 0..17 {
                assert_eq!(*map.get(x, y), x * 100 + y);
            }
        }
    }
}
