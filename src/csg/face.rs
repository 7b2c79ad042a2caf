// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangular faces of a solid and their classification against another solid

use super::line::Line;
use super::solid::Solid;
use super::vertex::{VertexArena, VertexId, VertexStatus};
use crate::config::CsgConfig;
use crate::geometry::BoundingBox;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub point: Point3<f64>,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, point: Point3<f64>) -> Self {
        Self { normal, point }
    }

    /// `D` in `Ax + By + Cz + D = 0`
    pub fn offset(&self) -> f64 {
        -self.normal.dot(&self.point.coords)
    }

    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset()
    }
}

/// Position of a face relative to the other solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FaceStatus {
    #[default]
    Unknown,
    Inside,
    Outside,
    /// Coplanar with a face of the other solid, same orientation
    Same,
    /// Coplanar with a face of the other solid, opposite orientation
    Opposite,
    Boundary,
}

impl FaceStatus {
    /// Status propagated to the unknown vertices of a ray-traced face
    pub fn vertex_status(self) -> VertexStatus {
        match self {
            FaceStatus::Unknown => VertexStatus::Unknown,
            FaceStatus::Inside => VertexStatus::Inside,
            FaceStatus::Outside => VertexStatus::Outside,
            FaceStatus::Same | FaceStatus::Opposite | FaceStatus::Boundary => VertexStatus::Boundary,
        }
    }
}

/// Triangle referencing three vertices of the owning solid's arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub v1: VertexId,
    pub v2: VertexId,
    pub v3: VertexId,
    status: FaceStatus,
}

impl Face {
    pub fn new(v1: VertexId, v2: VertexId, v3: VertexId) -> Self {
        Self {
            v1,
            v2,
            v3,
            status: FaceStatus::Unknown,
        }
    }

    pub fn vertices(&self) -> [VertexId; 3] {
        [self.v1, self.v2, self.v3]
    }

    pub fn status(&self) -> FaceStatus {
        self.status
    }

    pub fn set_status(&mut self, status: FaceStatus) {
        self.status = status;
    }

    pub fn positions(&self, arena: &VertexArena) -> [Point3<f64>; 3] {
        self.vertices().map(|id| arena[id].position)
    }

    /// Unit normal from the winding order, zero for a degenerate face
    pub fn normal(&self, arena: &VertexArena) -> Vector3<f64> {
        let [p1, p2, p3] = self.positions(arena);
        (p2 - p1)
            .cross(&(p3 - p1))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn area(&self, arena: &VertexArena) -> f64 {
        let [p1, p2, p3] = self.positions(arena);
        (p2 - p1).cross(&(p3 - p1)).norm() / 2.0
    }

    pub fn center(&self, arena: &VertexArena) -> Point3<f64> {
        let [p1, p2, p3] = self.positions(arena);
        Point3::from((p1.coords + p2.coords + p3.coords) / 3.0)
    }

    pub fn plane(&self, arena: &VertexArena) -> Plane {
        Plane::new(self.normal(arena), arena[self.v1].position)
    }

    pub fn bound(&self, arena: &VertexArena) -> BoundingBox {
        BoundingBox::from_points(self.positions(arena).iter())
    }

    /// Reverse the winding order
    pub fn invert(&mut self) {
        std::mem::swap(&mut self.v1, &mut self.v2);
    }

    /// Same vertices in the same cyclic order
    pub fn is_rotation_of(&self, other: &Face) -> bool {
        let a = self.vertices();
        let b = other.vertices();
        (0..3).any(|k| a[0] == b[k] && a[1] == b[(k + 1) % 3] && a[2] == b[(k + 2) % 3])
    }

    /// Classify from an already known inside/outside vertex.
    ///
    /// Returns `false` when every vertex is unknown or on the boundary.
    pub fn simple_classify(&mut self, arena: &VertexArena) -> bool {
        for id in self.vertices() {
            match arena[id].status() {
                VertexStatus::Inside => {
                    self.status = FaceStatus::Inside;
                    return true;
                }
                VertexStatus::Outside => {
                    self.status = FaceStatus::Outside;
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    /// Whether `point`, assumed on the face plane, lies inside the triangle or
    /// on its border.
    ///
    /// Projects onto the coordinate plane most perpendicular to the normal and
    /// checks the side of each edge.
    pub fn has_point(&self, arena: &VertexArena, point: &Point3<f64>, tolerance: f64) -> bool {
        let normal = self.normal(arena).abs();
        let (u, v) = if normal.x >= normal.y && normal.x >= normal.z {
            (1, 2)
        } else if normal.y >= normal.z {
            (0, 2)
        } else {
            (0, 1)
        };

        let corners = self.positions(arena);
        let mut above = false;
        let mut below = false;

        for i in 0..3 {
            let a = corners[i];
            let b = corners[(i + 1) % 3];
            let (eu, ev) = (b[u] - a[u], b[v] - a[v]);
            let length = eu.hypot(ev);
            if length < tolerance {
                continue;
            }
            let side = (eu * (point[v] - a[v]) - ev * (point[u] - a[u])) / length;
            if side > tolerance {
                above = true;
            } else if side < -tolerance {
                below = true;
            }
        }

        !(above && below)
    }

    /// Classify by casting a ray from the face center along its normal and
    /// looking at the closest face of `other` it crosses.
    ///
    /// A ray grazing a face edge-on is perturbed and cast again, at most
    /// `config.max_ray_retries` times. Returns `false` when the retries ran
    /// out and the face was classified `Outside` by default.
    pub fn ray_trace_classify<R: Rng + ?Sized>(
        &mut self,
        arena: &VertexArena,
        other: &Solid,
        config: &CsgConfig,
        rng: &mut R,
    ) -> bool {
        let tol = config.tolerances.geometric;
        let mut ray = Line::ray(self.normal(arena), self.center(arena));
        let mut retries = 0;
        let mut settled = true;

        let closest = loop {
            let mut closest: Option<(usize, f64)> = None;
            let mut grazing = false;

            for (index, face) in other.faces().iter().enumerate() {
                let normal = face.normal(other.vertices());
                let dot = normal.dot(&ray.direction);
                let origin = other.vertices()[face.v1].position;
                let Some(hit) = ray.plane_intersection(&normal, &origin, tol) else {
                    continue;
                };
                let distance = ray.point_to_point_distance(&hit);

                if distance.abs() < tol && dot.abs() < tol {
                    grazing = true;
                    break;
                }

                if distance.abs() < tol {
                    if face.has_point(other.vertices(), &hit, tol) {
                        closest = Some((index, 0.0));
                        break;
                    }
                } else if dot.abs() > tol
                    && distance > tol
                    && closest.map_or(true, |(_, best)| distance < best)
                    && face.has_point(other.vertices(), &hit, tol)
                {
                    closest = Some((index, distance));
                }
            }

            if !grazing {
                break closest;
            }

            retries += 1;
            if retries > config.max_ray_retries {
                warn!(retries, "ray kept grazing faces, classifying face as outside");
                settled = false;
                break None;
            }
            trace!(%ray, retries, "ray grazes a face, perturbing");
            ray.perturb_direction(rng, config.perturbation_scale, config.perturbation);
        };

        self.status = match closest {
            None => FaceStatus::Outside,
            Some((index, distance)) => {
                let face = &other.faces()[index];
                let dot = face.normal(other.vertices()).dot(&ray.direction);
                if distance.abs() < tol {
                    if dot > tol {
                        FaceStatus::Same
                    } else if dot < -tol {
                        FaceStatus::Opposite
                    } else {
                        self.status
                    }
                } else if dot > tol {
                    FaceStatus::Inside
                } else if dot < -tol {
                    FaceStatus::Outside
                } else {
                    self.status
                }
            }
        };
        settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Tolerances, GEOMETRIC_TOLERANCE as TOL};
    use crate::csg::vertex::Vertex;
    use crate::geometry::{Color, Primitive};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn triangle(points: [[f64; 3]; 3]) -> (VertexArena, Face) {
        let mut arena = VertexArena::new();
        let [a, b, c] = points.map(|p| arena.push(Vertex::new(Point3::from(p), Color::WHITE)));
        (arena, Face::new(a, b, c))
    }

    fn unit_cube() -> Solid {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        Solid::from_mesh(&mesh, Tolerances::default()).expect("valid cube")
    }

    #[test]
    fn test_geometry() {
        let (arena, face) = triangle([[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);
        assert_eq!(face.normal(&arena), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(face.area(&arena), 2.0);
        assert_eq!(face.center(&arena), Point3::new(2.0 / 3.0, 2.0 / 3.0, 0.0));

        let plane = face.plane(&arena);
        assert_eq!(plane.signed_distance(&Point3::new(5.0, 5.0, 3.0)), 3.0);

        let bound = face.bound(&arena);
        assert_eq!(bound.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bound.max, Point3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_invert_flips_normal() {
        let (arena, mut face) = triangle([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let before = face;
        face.invert();
        assert_eq!(face.normal(&arena), -before.normal(&arena));
        assert!(!face.is_rotation_of(&before));

        let rotated = Face::new(before.v2, before.v3, before.v1);
        assert!(rotated.is_rotation_of(&before));
    }

    #[test]
    fn test_has_point() {
        let (arena, face) = triangle([[0.0, 0.0, 1.0], [0.0, 4.0, 1.0], [0.0, 0.0, 5.0]]);

        assert!(face.has_point(&arena, &Point3::new(0.0, 1.0, 2.0), TOL));
        // Corner and edge points count as inside
        assert!(face.has_point(&arena, &Point3::new(0.0, 0.0, 1.0), TOL));
        assert!(face.has_point(&arena, &Point3::new(0.0, 2.0, 3.0), TOL));
        assert!(!face.has_point(&arena, &Point3::new(0.0, 3.0, 4.0), TOL));
        assert!(!face.has_point(&arena, &Point3::new(0.0, -1.0, 2.0), TOL));
    }

    #[test]
    fn test_simple_classify_uses_definite_vertices() {
        let (mut arena, mut face) = triangle([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!(!face.simple_classify(&arena));

        arena[face.v1].set_status(VertexStatus::Boundary);
        assert!(!face.simple_classify(&arena));

        arena[face.v3].set_status(VertexStatus::Outside);
        assert!(face.simple_classify(&arena));
        assert_eq!(face.status(), FaceStatus::Outside);
    }

    #[test]
    fn test_ray_trace_inside_and_outside() {
        let cube = unit_cube();
        let config = CsgConfig::seeded(1);
        let mut rng = StdRng::seed_from_u64(1);

        let (arena, mut inside) =
            triangle([[0.2, 0.2, 0.5], [0.8, 0.2, 0.5], [0.2, 0.8, 0.5]]);
        inside.ray_trace_classify(&arena, &cube, &config, &mut rng);
        assert_eq!(inside.status(), FaceStatus::Inside);

        let (arena, mut outside) =
            triangle([[0.2, 0.2, 1.5], [0.8, 0.2, 1.5], [0.2, 0.8, 1.5]]);
        outside.ray_trace_classify(&arena, &cube, &config, &mut rng);
        assert_eq!(outside.status(), FaceStatus::Outside);

        // Facing away from the cube while sitting beside it
        let (arena, mut away) =
            triangle([[0.2, 0.8, 1.5], [0.8, 0.2, 1.5], [0.2, 0.2, 1.5]]);
        away.ray_trace_classify(&arena, &cube, &config, &mut rng);
        assert_eq!(away.status(), FaceStatus::Outside);
    }

    #[test]
    fn test_ray_trace_coplanar_faces() {
        let cube = unit_cube();
        let config = CsgConfig::seeded(1);
        let mut rng = StdRng::seed_from_u64(1);

        // On the top face, pointing up like it
        let (arena, mut same) = triangle([[0.2, 0.2, 1.0], [0.6, 0.2, 1.0], [0.2, 0.6, 1.0]]);
        same.ray_trace_classify(&arena, &cube, &config, &mut rng);
        assert_eq!(same.status(), FaceStatus::Same);

        let (arena, mut opposite) =
            triangle([[0.2, 0.6, 1.0], [0.6, 0.2, 1.0], [0.2, 0.2, 1.0]]);
        opposite.ray_trace_classify(&arena, &cube, &config, &mut rng);
        assert_eq!(opposite.status(), FaceStatus::Opposite);
    }

    #[test]
    fn test_ray_retries_exhausted_classify_outside() {
        let cube = unit_cube();
        let mut rng = StdRng::seed_from_u64(1);

        // Horizontal face centred on the x = 1 wall: its upward ray runs
        // inside the wall plane, and without grazing it would hit the top
        // face from below
        let corners = [[0.8, 0.2, 0.5], [1.4, 0.5, 0.5], [0.8, 0.8, 0.5]];
        let (arena, mut grazing) = triangle(corners);
        assert!((grazing.center(&arena) - Point3::new(1.0, 0.5, 0.5)).norm() < 1e-12);

        let no_retries = CsgConfig {
            max_ray_retries: 0,
            ..CsgConfig::seeded(1)
        };
        assert!(!grazing.ray_trace_classify(&arena, &cube, &no_retries, &mut rng));
        assert_eq!(grazing.status(), FaceStatus::Outside);

        let (arena, mut retried) = triangle(corners);
        let settled = retried.ray_trace_classify(&arena, &cube, &CsgConfig::seeded(1), &mut rng);
        assert!(settled);
        assert_ne!(retried.status(), FaceStatus::Unknown);
    }

    #[test]
    fn test_face_status_to_vertex_status() {
        assert_eq!(FaceStatus::Inside.vertex_status(), VertexStatus::Inside);
        assert_eq!(FaceStatus::Outside.vertex_status(), VertexStatus::Outside);
        assert_eq!(FaceStatus::Same.vertex_status(), VertexStatus::Boundary);
        assert_eq!(FaceStatus::Opposite.vertex_status(), VertexStatus::Boundary);
    }
}
