// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::Mesh;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Geometry statistics and analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Enclosed volume in cubic units
    pub volume: f64,
    /// Volume with orientation sign (positive for outward-wound solids)
    pub signed_volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Number of vertices
    pub vertex_count: usize,
    /// Number of triangles
    pub triangle_count: usize,
    /// Is every edge shared by exactly two triangles?
    pub is_watertight: bool,
}

impl GeometryStats {
    /// Create empty stats
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            signed_volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            vertex_count: 0,
            triangle_count: 0,
            is_watertight: false,
        }
    }

    /// Pretty print statistics
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║              GEOMETRY ANALYTICS                          ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║ Volume:          {:>12.6}                            ║", self.volume);
        println!("║ Surface Area:    {:>12.6}                            ║", self.surface_area);
        println!("║                                                          ║");
        println!(
            "║   Min: ({:>8.3}, {:>8.3}, {:>8.3})                     ║",
            self.bbox[0], self.bbox[1], self.bbox[2]
        );
        println!(
            "║   Max: ({:>8.3}, {:>8.3}, {:>8.3})                     ║",
            self.bbox[3], self.bbox[4], self.bbox[5]
        );
        println!("║                                                          ║");
        println!("║ Vertices:        {:>10}                              ║", self.vertex_count);
        println!("║ Triangles:       {:>10}                              ║", self.triangle_count);
        println!(
            "║ Watertight:      {:>10}                              ║",
            if self.is_watertight { "Yes" } else { "No" }
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    if mesh.vertices.is_empty() || mesh.triangles.is_empty() {
        return GeometryStats::empty();
    }

    let bbox = mesh.bounding_box();
    let signed_volume = signed_volume(mesh);

    GeometryStats {
        volume: signed_volume.abs(),
        signed_volume,
        surface_area: surface_area(mesh),
        bbox: [
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z,
        ],
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        is_watertight: check_watertight(mesh),
    }
}

/// Signed enclosed volume (divergence theorem over the triangles)
///
/// Only depends on the surface being geometrically closed, so T-junctions
/// left by face splitting do not affect it.
pub fn signed_volume(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|triangle| {
            let [v0, v1, v2] = mesh.triangle_positions(triangle);
            v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
        })
        .sum()
}

/// Total surface area
pub fn surface_area(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|triangle| {
            let [v0, v1, v2] = mesh.triangle_positions(triangle);
            (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
        })
        .sum()
}

/// A mesh is watertight if every edge is shared by exactly 2 triangles
fn check_watertight(mesh: &Mesh) -> bool {
    let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();

    for triangle in &mesh.triangles {
        let indices = &triangle.indices;
        for i in 0..3 {
            let v1 = indices[i];
            let v2 = indices[(i + 1) % 3];
            let edge = if v1 < v2 { (v1, v2) } else { (v2, v1) };
            *edge_count.entry(edge).or_insert(0) += 1;
        }
    }

    edge_count.values().all(|&count| count == 2)
}
