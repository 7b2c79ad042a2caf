// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operations on meshes, backed by the polyhedral CSG engine

use super::Mesh;
use crate::config::CsgConfig;
use crate::csg::BooleanModeller;
use crate::error::CsgResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BooleanOp::Union => "union",
            BooleanOp::Difference => "difference",
            BooleanOp::Intersection => "intersection",
        };
        f.write_str(name)
    }
}

impl FromStr for BooleanOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "union" => Ok(BooleanOp::Union),
            "difference" | "subtract" => Ok(BooleanOp::Difference),
            "intersection" | "intersect" => Ok(BooleanOp::Intersection),
            other => Err(format!("unknown boolean operation: {other}")),
        }
    }
}

/// Perform boolean operation between two meshes
pub fn perform_boolean_operation(mesh_a: &Mesh, mesh_b: &Mesh, op: BooleanOp) -> CsgResult<Mesh> {
    perform_boolean_operation_with_config(mesh_a, mesh_b, op, &CsgConfig::default())
}

/// Perform boolean operation with an explicit engine configuration
pub fn perform_boolean_operation_with_config(
    mesh_a: &Mesh,
    mesh_b: &Mesh,
    op: BooleanOp,
    config: &CsgConfig,
) -> CsgResult<Mesh> {
    let modeller = BooleanModeller::new(mesh_a, mesh_b, config)?;
    Ok(modeller.apply(op))
}

/// Union of two meshes
pub fn csg_union(mesh_a: &Mesh, mesh_b: &Mesh) -> CsgResult<Mesh> {
    perform_boolean_operation(mesh_a, mesh_b, BooleanOp::Union)
}

/// Volume of `mesh_a` not covered by `mesh_b`
pub fn csg_difference(mesh_a: &Mesh, mesh_b: &Mesh) -> CsgResult<Mesh> {
    perform_boolean_operation(mesh_a, mesh_b, BooleanOp::Difference)
}

/// Volume shared by both meshes
pub fn csg_intersection(mesh_a: &Mesh, mesh_b: &Mesh) -> CsgResult<Mesh> {
    perform_boolean_operation(mesh_a, mesh_b, BooleanOp::Intersection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{analyze, Primitive};
    use nalgebra::Vector3;

    #[test]
    fn test_union_of_disjoint_cubes_keeps_everything() {
        let mesh_a = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let mut mesh_b = mesh_a.clone();
        mesh_b.translate(Vector3::new(3.0, 0.0, 0.0));

        let result = csg_union(&mesh_a, &mesh_b).unwrap();
        assert_eq!(result.triangle_count(), 24);
        assert!((analyze(&result).volume - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_op_parsing() {
        assert_eq!("Union".parse::<BooleanOp>(), Ok(BooleanOp::Union));
        assert_eq!("subtract".parse::<BooleanOp>(), Ok(BooleanOp::Difference));
        assert_eq!("intersect".parse::<BooleanOp>(), Ok(BooleanOp::Intersection));
        assert!("xor".parse::<BooleanOp>().is_err());
        assert_eq!(BooleanOp::Difference.to_string(), "difference");
    }
}
