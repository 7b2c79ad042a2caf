// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Analytics of primitives and boolean results

use anyhow::Result;
use csgvr::geometry::{analyze, GeometryStats, Primitive};
use csgvr::{csg_difference, csg_intersection, io};
use nalgebra::Vector3;
use tempfile::NamedTempFile;

#[test]
fn test_primitive_volumes() -> Result<()> {
    let cube = analyze(&Primitive::cube(Vector3::new(10.0, 20.0, 30.0), true).to_mesh());
    println!("Cube 10x20x30: volume {:.3}, area {:.3}", cube.volume, cube.surface_area);
    assert!((cube.volume - 6000.0).abs() < 1e-9);
    assert!((cube.surface_area - 2200.0).abs() < 1e-9);
    assert_eq!(cube.bbox, [-5.0, -10.0, -15.0, 5.0, 10.0, 15.0]);
    assert!(cube.is_watertight);

    let radius: f64 = 5.0;
    let height: f64 = 20.0;
    let cylinder = analyze(&Primitive::cylinder(height, radius, 64).to_mesh());
    let expected = std::f64::consts::PI * radius.powi(2) * height;
    println!("Cylinder r={radius} h={height}: volume {:.3} (expected {:.3})", cylinder.volume, expected);

    // Inscribed polygon loses a little volume
    assert!(cylinder.volume < expected);
    assert!((cylinder.volume - expected).abs() / expected < 0.01);
    assert!(cylinder.signed_volume > 0.0);
    assert!(cylinder.is_watertight);

    Ok(())
}

#[test]
fn test_drilled_cube_analytics() -> Result<()> {
    let block = Primitive::cube(Vector3::new(4.0, 4.0, 2.0), true).to_mesh();
    let mut drill = Primitive::cylinder(4.0, 1.0, 16).to_mesh();
    drill.translate(Vector3::new(0.0, 0.0, -2.0));
    let drill_volume = analyze(&drill).volume;
    let expected = 32.0 - drill_volume / 2.0;

    let drilled = csg_difference(&block, &drill)?;
    let stats = analyze(&drilled);
    println!("Drilled block: volume {:.6} (expected {:.6})", stats.volume, expected);

    assert!((stats.volume - expected).abs() < 1e-6);
    assert!(stats.signed_volume > 0.0);
    for (actual, expected) in stats.bbox.iter().zip([-2.0, -2.0, -1.0, 2.0, 2.0, 1.0]) {
        assert!((actual - expected).abs() < 1e-9, "bbox {actual} != {expected}");
    }

    let core = analyze(&csg_intersection(&block, &drill)?);
    assert!((core.volume - drill_volume / 2.0).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_stats_json_serialization() -> Result<()> {
    let stats = analyze(&Primitive::sphere(2.0, 24).to_mesh());

    let json = serde_json::to_string_pretty(&stats)?;
    let deserialized: GeometryStats = serde_json::from_str(&json)?;

    assert_eq!(deserialized.vertex_count, stats.vertex_count);
    assert_eq!(deserialized.triangle_count, stats.triangle_count);
    assert_eq!(deserialized.volume, stats.volume);
    assert_eq!(deserialized.is_watertight, stats.is_watertight);
    Ok(())
}

#[test]
fn test_boolean_result_exports_to_stl() -> Result<()> {
    let a = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
    let mut b = a.clone();
    b.translate(Vector3::new(0.5, 0.5, 0.5));
    let result = csg_difference(&a, &b)?;

    let file = NamedTempFile::new()?;
    io::export_stl(&result, file.path())?;

    let written = std::fs::metadata(file.path())?.len() as usize;
    assert_eq!(written, 84 + 50 * result.triangle_count());
    Ok(())
}
