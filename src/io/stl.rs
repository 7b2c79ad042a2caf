// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL export

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use nalgebra::Vector3;
use std::io::Cursor;
use std::path::Path;
use stl_io::{Normal, Triangle, Vertex};

/// Encode a mesh as binary STL. Facet normals come from the winding order.
pub fn to_stl_bytes(mesh: &Mesh) -> std::io::Result<Vec<u8>> {
    let triangles: Vec<Triangle> = mesh
        .triangles
        .iter()
        .map(|triangle| {
            let [p0, p1, p2] = mesh.triangle_positions(triangle);
            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);
            Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [p0, p1, p2].map(|p| Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
            }
        })
        .collect();

    let mut cursor = Cursor::new(Vec::new());
    stl_io::write_stl(&mut cursor, triangles.iter())?;
    Ok(cursor.into_inner())
}

/// Write a mesh to `path` as binary STL
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_stl_bytes(mesh).context("Failed to encode STL")?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write STL file: {:?}", path))?;
    Ok(())
}
