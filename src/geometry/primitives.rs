// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! Every primitive is a closed, outward-wound mesh with shared vertices.

use super::{Color, Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;
use std::str::FromStr;

/// Geometric primitives
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Sphere { r: f64, segments: u32 },
    Cylinder { h: f64, r: f64, segments: u32 },
    Cone { h: f64, r1: f64, r2: f64, segments: u32 },
}

const DEFAULT_SEGMENTS: u32 = 32;

fn segments_or_default(segments: u32, minimum: u32) -> u32 {
    if segments == 0 {
        DEFAULT_SEGMENTS
    } else {
        segments.max(minimum)
    }
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn sphere(r: f64, segments: u32) -> Self {
        Self::Sphere {
            r,
            segments: segments_or_default(segments, 3),
        }
    }

    pub fn cylinder(h: f64, r: f64, segments: u32) -> Self {
        Self::Cylinder {
            h,
            r,
            segments: segments_or_default(segments, 3),
        }
    }

    pub fn cone(h: f64, r1: f64, r2: f64, segments: u32) -> Self {
        Self::Cone {
            h,
            r1,
            r2,
            segments: segments_or_default(segments, 3),
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        self.to_mesh_with_color(Color::default())
    }

    pub fn to_mesh_with_color(&self, color: Color) -> Mesh {
        let mut mesh = match self {
            Self::Cube { size, center } => generate_cube_mesh(*size, *center),
            Self::Sphere { r, segments } => generate_sphere_mesh(*r, *segments),
            Self::Cylinder { h, r, segments } => generate_cone_mesh(*h, *r, *r, *segments),
            Self::Cone { h, r1, r2, segments } => generate_cone_mesh(*h, *r1, *r2, *segments),
        };
        mesh.set_color(color);
        mesh.recompute_normals();
        mesh
    }
}

/// Parse `kind:arg:arg...` shape descriptions:
/// `cube:S`, `cube:X:Y:Z`, `sphere:R[:SEG]`, `cylinder:H:R[:SEG]`, `cone:H:R1:R2[:SEG]`.
/// Cubes start at the origin; `SEG` defaults to 32.
impl FromStr for Primitive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let kind = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let args = parts
            .map(|p| p.trim().parse::<f64>().map_err(|e| format!("invalid number '{p}' in '{s}': {e}")))
            .collect::<Result<Vec<_>, _>>()?;
        let segments = |index: usize| args.get(index).map_or(0, |&n| n.max(0.0) as u32);

        let primitive = match (kind.as_str(), args.len()) {
            ("cube", 1) => Primitive::cube(Vector3::repeat(args[0]), false),
            ("cube", 3) => Primitive::cube(Vector3::new(args[0], args[1], args[2]), false),
            ("sphere", 1 | 2) => Primitive::sphere(args[0], segments(1)),
            ("cylinder", 2 | 3) => Primitive::cylinder(args[0], args[1], segments(2)),
            ("cone", 3 | 4) => Primitive::cone(args[0], args[1], args[2], segments(3)),
            _ => return Err(format!("unrecognized shape '{s}'")),
        };
        Ok(primitive)
    }
}

fn push_point(mesh: &mut Mesh, x: f64, y: f64, z: f64) -> usize {
    mesh.add_vertex(Vertex::new(Point3::new(x, y, z), Vector3::zeros()))
}

fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 12);

    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    // Corner i has bit 0 = x, bit 1 = y, bit 2 = z
    for i in 0..8 {
        let pick = |bit: usize, lo: f64, hi: f64| if i & bit == 0 { lo } else { hi };
        push_point(
            &mut mesh,
            pick(1, min.x, max.x),
            pick(2, min.y, max.y),
            pick(4, min.z, max.z),
        );
    }

    // Two counter-clockwise triangles per face, viewed from outside
    let faces = [
        [0, 2, 3, 1], // z-
        [4, 5, 7, 6], // z+
        [0, 1, 5, 4], // y-
        [2, 6, 7, 3], // y+
        [0, 4, 6, 2], // x-
        [1, 3, 7, 5], // x+
    ];

    for [a, b, c, d] in faces {
        mesh.add_triangle(Triangle::new([a, b, c]));
        mesh.add_triangle(Triangle::new([a, c, d]));
    }

    mesh
}

fn generate_sphere_mesh(radius: f64, segments: u32) -> Mesh {
    let slices = segments as usize;
    let stacks = (segments as usize / 2).max(2);
    let mut mesh = Mesh::with_capacity(2 + (stacks - 1) * slices, 2 * stacks * slices);

    let north = push_point(&mut mesh, 0.0, radius, 0.0);

    // Rings between the poles, ring k starts at 1 + k * slices
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        let y = radius * phi.cos();
        let r = radius * phi.sin();

        for j in 0..slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            push_point(&mut mesh, r * theta.cos(), y, r * theta.sin());
        }
    }

    let south = push_point(&mut mesh, 0.0, -radius, 0.0);
    let ring = |k: usize, j: usize| 1 + k * slices + j % slices;

    for j in 0..slices {
        mesh.add_triangle(Triangle::new([north, ring(0, j + 1), ring(0, j)]));
    }

    for k in 0..stacks - 2 {
        for j in 0..slices {
            let first = ring(k, j);
            let second = ring(k + 1, j);
            mesh.add_triangle(Triangle::new([first, ring(k, j + 1), second]));
            mesh.add_triangle(Triangle::new([second, ring(k, j + 1), ring(k + 1, j + 1)]));
        }
    }

    let last = stacks - 2;
    for j in 0..slices {
        mesh.add_triangle(Triangle::new([south, ring(last, j), ring(last, j + 1)]));
    }

    mesh
}

fn generate_cone_mesh(height: f64, r1: f64, r2: f64, segments: u32) -> Mesh {
    let segments = segments as usize;
    let mut mesh = Mesh::with_capacity(2 + 2 * segments, 4 * segments);

    // Cylinders go from z=0 to z=height
    let bottom_center = push_point(&mut mesh, 0.0, 0.0, 0.0);
    let top_center = push_point(&mut mesh, 0.0, 0.0, height);

    let mut bottom = Vec::with_capacity(segments);
    let mut top = Vec::with_capacity(segments);

    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        bottom.push(push_point(&mut mesh, r1 * cos, r1 * sin, 0.0));
        top.push(push_point(&mut mesh, r2 * cos, r2 * sin, height));
    }

    for i in 0..segments {
        let next = (i + 1) % segments;
        mesh.add_triangle(Triangle::new([bottom_center, bottom[next], bottom[i]]));
        mesh.add_triangle(Triangle::new([top_center, top[i], top[next]]));
        mesh.add_triangle(Triangle::new([bottom[i], bottom[next], top[i]]));
        mesh.add_triangle(Triangle::new([top[i], bottom[next], top[next]]));
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analyze;

    fn assert_outward(mesh: &Mesh) {
        let center = mesh.bounding_box().center();
        for triangle in &mesh.triangles {
            let [a, b, c] = mesh.triangle_positions(triangle);
            let normal = (b - a).cross(&(c - a));
            let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            assert!(
                normal.dot(&(centroid - center)) > 0.0,
                "triangle {:?} is wound inward",
                triangle.indices
            );
        }
    }

    #[test]
    fn test_parse_shapes() {
        assert_eq!("cube:2".parse(), Ok(Primitive::cube(Vector3::new(2.0, 2.0, 2.0), false)));
        assert_eq!("Cube:1:2:3".parse(), Ok(Primitive::cube(Vector3::new(1.0, 2.0, 3.0), false)));
        assert_eq!("sphere:1.5".parse(), Ok(Primitive::sphere(1.5, 32)));
        assert_eq!("cylinder:2:0.5:12".parse(), Ok(Primitive::cylinder(2.0, 0.5, 12)));
        assert_eq!("cone:2:1:0:8".parse(), Ok(Primitive::cone(2.0, 1.0, 0.0, 8)));

        assert!("cube".parse::<Primitive>().is_err());
        assert!("sphere:abc".parse::<Primitive>().is_err());
        assert!("torus:1:2".parse::<Primitive>().is_err());
    }

    #[test]
    fn test_cube_generation() {
        let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), false).to_mesh();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(analyze(&mesh).is_watertight);
        assert_outward(&mesh);
    }

    #[test]
    fn test_centered_cube_bounds() {
        let mesh = Primitive::cube(Vector3::new(2.0, 4.0, 6.0), true).to_mesh();
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let mesh = Primitive::sphere(5.0, 16).to_mesh();
        assert_eq!(mesh.vertex_count(), 2 + 7 * 16);
        assert!(analyze(&mesh).is_watertight);
        assert_outward(&mesh);
    }

    #[test]
    fn test_cylinder_is_closed_and_outward() {
        let mesh = Primitive::cylinder(10.0, 5.0, 32).to_mesh();
        assert_eq!(mesh.vertex_count(), 2 + 32 * 2);
        assert!(analyze(&mesh).is_watertight);
        assert_outward(&mesh);
    }

    #[test]
    fn test_cone_volume_sign() {
        let mesh = Primitive::cone(10.0, 5.0, 3.0, 32).to_mesh();
        let stats = analyze(&mesh);
        assert!(stats.signed_volume > 0.0);
        assert!(stats.is_watertight);
    }
}
