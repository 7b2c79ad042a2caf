// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! csgvr - polyhedral CSG boolean engine
//!
//! Union, intersection and difference of closed triangle meshes, carrying
//! per-vertex colors through to the result.
//!
//! ```no_run
//! use csgvr::geometry::{analyze, Primitive};
//! use csgvr::{csg_union, CsgResult};
//! use nalgebra::Vector3;
//!
//! # fn main() -> CsgResult<()> {
//! let a = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
//! let mut b = a.clone();
//! b.translate(Vector3::new(0.5, 0.0, 0.0));
//!
//! let union = csg_union(&a, &b)?;
//! println!("volume: {}", analyze(&union).volume);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod csg;
pub mod error;
pub mod geometry;
pub mod io;

pub use config::{CsgConfig, PerturbMode, Tolerances, GEOMETRIC_TOLERANCE, VERTEX_TOLERANCE};
pub use csg::{BooleanModeller, Solid};
pub use error::{CsgError, CsgResult};
pub use geometry::{
    csg_difference, csg_intersection, csg_union, perform_boolean_operation,
    perform_boolean_operation_with_config, BooleanOp, Color, Mesh, Primitive,
};
