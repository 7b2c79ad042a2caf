// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operator over two solids

use super::face::FaceStatus;
use super::solid::{MeshAssembler, Solid};
use crate::config::{CsgConfig, Tolerances};
use crate::error::CsgResult;
use crate::geometry::{BooleanOp, Mesh};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, instrument};

/// Two solids split against and classified relative to each other.
///
/// Construction does all the heavy work; each operation only selects faces.
#[derive(Debug, Clone)]
pub struct BooleanModeller {
    first: Solid,
    second: Solid,
    tolerances: Tolerances,
}

impl BooleanModeller {
    #[instrument(skip_all, fields(first = first.triangle_count(), second = second.triangle_count()))]
    pub fn new(first: &Mesh, second: &Mesh, config: &CsgConfig) -> CsgResult<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut first = Solid::from_mesh(first, config.tolerances)?;
        let mut second = Solid::from_mesh(second, config.tolerances)?;

        let first_splits = first.split_faces(&second, config);
        let second_splits = second.split_faces(&first, config);
        debug!(first_splits, second_splits, "split solids");

        first.classify_faces(&second, config, &mut rng);
        second.classify_faces(&first, config, &mut rng);

        Ok(Self {
            first,
            second,
            tolerances: config.tolerances,
        })
    }

    pub fn first(&self) -> &Solid {
        &self.first
    }

    pub fn second(&self) -> &Solid {
        &self.second
    }

    /// Whether splitting hit the growth limit or some face kept its default
    /// classification after exhausting its ray retries
    pub fn is_partial(&self) -> bool {
        [&self.first, &self.second]
            .iter()
            .any(|solid| solid.split_truncated() || solid.unresolved_faces() > 0)
    }

    pub fn union(&self) -> Mesh {
        self.compose(
            &self.first,
            &[FaceStatus::Outside, FaceStatus::Same],
            &self.second,
            &[FaceStatus::Outside],
        )
    }

    pub fn intersection(&self) -> Mesh {
        self.compose(
            &self.first,
            &[FaceStatus::Inside, FaceStatus::Same],
            &self.second,
            &[FaceStatus::Inside],
        )
    }

    /// First minus second; kept faces of the second solid are turned inside out
    pub fn difference(&self) -> Mesh {
        let mut second = self.second.clone();
        second.invert_inside_faces();
        self.compose(
            &self.first,
            &[FaceStatus::Outside, FaceStatus::Opposite],
            &second,
            &[FaceStatus::Inside],
        )
    }

    pub fn apply(&self, op: BooleanOp) -> Mesh {
        match op {
            BooleanOp::Union => self.union(),
            BooleanOp::Intersection => self.intersection(),
            BooleanOp::Difference => self.difference(),
        }
    }

    fn compose(&self, first: &Solid, first_keep: &[FaceStatus], second: &Solid, second_keep: &[FaceStatus]) -> Mesh {
        let mut assembler = MeshAssembler::new(self.tolerances.vertex);
        assembler.add_faces(first, |status| first_keep.contains(&status));
        assembler.add_faces(second, |status| second_keep.contains(&status));
        let mesh = assembler.finish();
        debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "composed result"
        );
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{analyze, Color, Primitive};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn cube(offset: Vector3<f64>, color: Color) -> Mesh {
        let mut mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh_with_color(color);
        mesh.translate(offset);
        mesh
    }

    #[test]
    fn test_half_overlapping_cubes() {
        let a = cube(Vector3::zeros(), Color::SKY);
        let b = cube(Vector3::new(0.5, 0.0, 0.0), Color::WHITE);
        let modeller = BooleanModeller::new(&a, &b, &CsgConfig::seeded(11)).expect("valid meshes");

        assert_relative_eq!(analyze(&modeller.union()).volume, 1.5, epsilon = 1e-6);
        assert_relative_eq!(analyze(&modeller.intersection()).volume, 0.5, epsilon = 1e-6);
        assert_relative_eq!(analyze(&modeller.difference()).volume, 0.5, epsilon = 1e-6);
        assert!(!modeller.is_partial());
    }

    #[test]
    fn test_growth_limit_reports_partial_result() {
        let a = cube(Vector3::zeros(), Color::SKY);
        let b = cube(Vector3::new(0.5, 0.5, 0.5), Color::WHITE);
        let config = CsgConfig {
            split_growth_limit: 1,
            ..CsgConfig::seeded(4)
        };
        let modeller = BooleanModeller::new(&a, &b, &config).expect("valid meshes");

        assert!(modeller.is_partial());
        assert!(modeller.first().split_truncated());
        assert!(!modeller.union().is_empty());
    }

    #[test]
    fn test_colors_are_carried_through() {
        let a = cube(Vector3::zeros(), Color::SKY);
        let b = cube(Vector3::new(0.5, 0.5, 0.5), Color::WHITE);
        let modeller = BooleanModeller::new(&a, &b, &CsgConfig::seeded(5)).expect("valid meshes");

        let union = modeller.union();
        assert!(union.vertices.iter().any(|v| v.color == Color::SKY));
        assert!(union.vertices.iter().any(|v| v.color == Color::WHITE));
        assert!(union
            .vertices
            .iter()
            .all(|v| v.color == Color::SKY || v.color == Color::WHITE));
    }

    #[test]
    fn test_difference_with_disjoint_cube_keeps_first() {
        let a = cube(Vector3::zeros(), Color::SKY);
        let b = cube(Vector3::new(5.0, 0.0, 0.0), Color::SKY);
        let modeller = BooleanModeller::new(&a, &b, &CsgConfig::seeded(1)).expect("valid meshes");

        let difference = modeller.difference();
        assert_eq!(difference.triangle_count(), 12);
        assert_relative_eq!(analyze(&difference).volume, 1.0, epsilon = 1e-12);
        assert!(modeller.intersection().is_empty());
    }

    #[test]
    fn test_apply_dispatches() {
        let a = cube(Vector3::zeros(), Color::SKY);
        let b = cube(Vector3::new(0.5, 0.5, 0.0), Color::SKY);
        let modeller = BooleanModeller::new(&a, &b, &CsgConfig::seeded(2)).expect("valid meshes");

        for op in [BooleanOp::Union, BooleanOp::Intersection, BooleanOp::Difference] {
            let direct = match op {
                BooleanOp::Union => modeller.union(),
                BooleanOp::Intersection => modeller.intersection(),
                BooleanOp::Difference => modeller.difference(),
            };
            assert_eq!(modeller.apply(op).triangles, direct.triangles);
        }
    }
}
