// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Uniform grid over point positions for tolerant lookups

use ahash::AHashMap;
use nalgebra::Point3;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct CellKey {
    x: i64,
    y: i64,
    z: i64,
}

impl CellKey {
    fn from_point(p: &Point3<f64>, cell: f64) -> Self {
        Self {
            x: (p.x / cell).floor() as i64,
            y: (p.y / cell).floor() as i64,
            z: (p.z / cell).floor() as i64,
        }
    }
}

/// Buckets indices by the grid cell of their point.
///
/// Two points closer than `cell` on every axis always land in the same or
/// neighbouring cells, so a tolerant query only visits 27 buckets.
#[derive(Debug, Clone)]
pub(crate) struct PointGrid {
    cell: f64,
    cells: AHashMap<CellKey, Vec<usize>>,
}

impl PointGrid {
    /// `None` when `cell` cannot size a grid
    pub(crate) fn new(cell: f64) -> Option<Self> {
        (cell.is_finite() && cell > 0.0).then(|| Self {
            cell,
            cells: AHashMap::new(),
        })
    }

    pub(crate) fn cell(&self) -> f64 {
        self.cell
    }

    pub(crate) fn insert(&mut self, point: &Point3<f64>, index: usize) {
        self.cells
            .entry(CellKey::from_point(point, self.cell))
            .or_default()
            .push(index);
    }

    /// Indices stored in the cell of `point` and its neighbours
    pub(crate) fn near<'a>(&'a self, point: &Point3<f64>) -> impl Iterator<Item = usize> + 'a {
        let center = CellKey::from_point(point, self.cell);
        (-1i64..=1)
            .flat_map(move |dx| (-1i64..=1).flat_map(move |dy| (-1i64..=1).map(move |dz| (dx, dy, dz))))
            .filter_map(move |(dx, dy, dz)| {
                self.cells.get(&CellKey {
                    x: center.x.saturating_add(dx),
                    y: center.y.saturating_add(dy),
                    z: center.z.saturating_add(dz),
                })
            })
            .flatten()
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_crosses_cell_borders() {
        let mut grid = PointGrid::new(0.1).expect("positive cell");
        grid.insert(&Point3::new(0.099, 0.0, 0.0), 0);
        grid.insert(&Point3::new(0.5, 0.0, 0.0), 1);

        let found: Vec<_> = grid.near(&Point3::new(0.101, 0.0, 0.0)).collect();
        assert_eq!(found, vec![0]);

        let found: Vec<_> = grid.near(&Point3::new(-0.05, -0.05, 0.05)).collect();
        assert_eq!(found, vec![0]);
    }

    #[test]
    fn test_rejects_unusable_cells() {
        assert!(PointGrid::new(0.0).is_none());
        assert!(PointGrid::new(-1.0).is_none());
        assert!(PointGrid::new(f64::NAN).is_none());
    }
}
