// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyhedral boolean engine
//!
//! Faces of each solid are split along their intersections with the other
//! solid, classified by ray casting and adjacency flood fill, then selected
//! per operation.

mod face;
mod grid;
mod line;
mod modeller;
mod segment;
mod solid;
mod vertex;

pub use face::{Face, FaceStatus, Plane};
pub use line::Line;
pub use modeller::BooleanModeller;
pub use segment::{EndType, Segment, SegmentEnd};
pub use solid::Solid;
pub use vertex::{Vertex, VertexArena, VertexId, VertexStatus};
