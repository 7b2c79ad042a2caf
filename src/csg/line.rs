// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 3D line / ray used for plane-plane intersection and ray casting

use super::face::{Face, Plane};
use super::vertex::VertexArena;
use crate::config::PerturbMode;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use std::fmt;

/// A line represented by a point and a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub point: Point3<f64>,
    pub direction: Vector3<f64>,
}

/// Coordinate pairs tried by [`Line::line_intersection`], in priority order
const AXIS_PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

impl Line {
    /// Intersection line of two planes.
    ///
    /// Returns `None` when the planes are parallel or coincident.
    pub fn from_planes(first: &Plane, second: &Plane, tolerance: f64) -> Option<Self> {
        let n1 = first.normal;
        let n2 = second.normal;
        let direction = n1.cross(&n2);

        if direction.norm() < tolerance {
            return None;
        }

        let d1 = first.offset();
        let d2 = second.offset();

        // Zero the coordinate whose direction component is largest, then solve
        // the remaining 2x2 system
        let abs = direction.abs();
        let point = if abs.x >= abs.y && abs.x >= abs.z {
            Point3::new(
                0.0,
                (d2 * n1.z - d1 * n2.z) / direction.x,
                (d1 * n2.y - d2 * n1.y) / direction.x,
            )
        } else if abs.y >= abs.z {
            Point3::new(
                (d1 * n2.z - d2 * n1.z) / direction.y,
                0.0,
                (d2 * n1.x - d1 * n2.x) / direction.y,
            )
        } else {
            Point3::new(
                (d2 * n1.y - d1 * n2.y) / direction.z,
                (d1 * n2.x - d2 * n1.x) / direction.z,
                0.0,
            )
        };

        Some(Self {
            point,
            direction: direction.normalize(),
        })
    }

    /// Intersection line of the planes of two faces, each resolved in its own arena
    pub fn from_faces(
        face: &Face,
        arena: &VertexArena,
        other: &Face,
        other_arena: &VertexArena,
        tolerance: f64,
    ) -> Option<Self> {
        Self::from_planes(&face.plane(arena), &other.plane(other_arena), tolerance)
    }

    /// Ray starting at `point` heading along `direction`
    pub fn ray(direction: Vector3<f64>, point: Point3<f64>) -> Self {
        Self {
            point,
            direction: direction.try_normalize(f64::EPSILON).unwrap_or(direction),
        }
    }

    /// Distance from the line point to `other`, negative when `other` lies
    /// behind the direction. `other` is assumed to be on the line.
    pub fn point_to_point_distance(&self, other: &Point3<f64>) -> f64 {
        let offset = other - self.point;
        let distance = offset.norm();
        if offset.dot(&self.direction) < 0.0 {
            -distance
        } else {
            distance
        }
    }

    /// Intersection point with another line assumed to cross this one.
    ///
    /// Solves `p + t·d = q + s·e` on the first coordinate pair (xy, xz, yz)
    /// with a non-degenerate determinant.
    pub fn line_intersection(&self, other: &Line, tolerance: f64) -> Option<Point3<f64>> {
        let d = &self.direction;
        let e = &other.direction;
        let delta = other.point - self.point;

        let t = AXIS_PAIRS.iter().find_map(|&(a, b)| {
            let det = d[a] * e[b] - d[b] * e[a];
            (det.abs() > tolerance).then(|| (delta[a] * e[b] - delta[b] * e[a]) / det)
        })?;

        Some(self.point + self.direction * t)
    }

    /// Intersection point with the plane through `plane_point` with `normal`.
    ///
    /// A line lying in the plane yields its own point; a parallel line off
    /// the plane yields `None`.
    pub fn plane_intersection(
        &self,
        normal: &Vector3<f64>,
        plane_point: &Point3<f64>,
        tolerance: f64,
    ) -> Option<Point3<f64>> {
        // Ax + By + Cz + D = 0
        let d = -normal.dot(&plane_point.coords);
        let numerator = normal.dot(&self.point.coords) + d;
        let denominator = normal.dot(&self.direction);

        if denominator.abs() < tolerance {
            return (numerator.abs() < tolerance).then_some(self.point);
        }

        let t = -numerator / denominator;
        Some(self.point + self.direction * t)
    }

    /// Nudge the direction by a random offset in `[0, scale)` per component
    pub fn perturb_direction<R: Rng + ?Sized>(&mut self, rng: &mut R, scale: f64, mode: PerturbMode) {
        self.direction.x += scale * rng.gen::<f64>();
        self.direction.y += scale * rng.gen::<f64>();
        self.direction.z += scale * rng.gen::<f64>();

        if mode == PerturbMode::Renormalize {
            self.direction = self
                .direction
                .try_normalize(f64::EPSILON)
                .unwrap_or(self.direction);
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}) + t({}, {}, {})",
            self.point.x, self.point.y, self.point.z, self.direction.x, self.direction.y, self.direction.z
        )
    }
}
