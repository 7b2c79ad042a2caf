// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, primitives and analytics

mod analytics;
mod bbox;
mod boolean;
mod mesh;
mod primitives;

pub use analytics::{analyze, signed_volume, surface_area, GeometryStats};
pub use bbox::BoundingBox;
pub use boolean::{
    csg_difference, csg_intersection, csg_union, perform_boolean_operation,
    perform_boolean_operation_with_config, BooleanOp,
};
pub use mesh::{Color, Mesh, Triangle, Vertex};
pub use primitives::Primitive;
