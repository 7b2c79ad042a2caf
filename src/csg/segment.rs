// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Portion of a plane-plane intersection line covered by one face

use super::face::Face;
use super::line::Line;
use super::vertex::{VertexArena, VertexId};
use crate::config::Tolerances;
use nalgebra::Point3;

/// What a segment end (or its interior) touches on the face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndType {
    Vertex,
    Edge,
    Face,
}

/// One end of a [`Segment`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentEnd {
    pub kind: EndType,
    /// The vertex itself for `Vertex` ends, the first vertex of the crossed
    /// edge for `Edge` ends
    pub vertex: VertexId,
    pub position: Point3<f64>,
    /// Signed distance from the line point
    pub distance: f64,
}

/// Intersection of a face with the line where its plane meets another plane.
///
/// `start.distance <= end.distance` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub line: Line,
    pub start: SegmentEnd,
    pub middle: EndType,
    pub end: SegmentEnd,
}

impl Segment {
    /// Build the segment of `face` on `line`.
    ///
    /// `signs` holds the side (-1, 0, 1) of each face vertex relative to the
    /// other plane. Returns `None` unless exactly two ends can be located.
    pub fn new(
        line: Line,
        face: &Face,
        arena: &VertexArena,
        signs: [i8; 3],
        tolerances: &Tolerances,
    ) -> Option<Self> {
        let ids = face.vertices();
        let mut ends: Vec<SegmentEnd> = Vec::with_capacity(2);

        let vertex_end = |id: VertexId| {
            let position = arena[id].position;
            SegmentEnd {
                kind: EndType::Vertex,
                vertex: id,
                position,
                distance: line.point_to_point_distance(&position),
            }
        };

        // A vertex on the line whose two neighbours sit on the same side
        // touches the line alone, so it is both ends
        for i in 0..3 {
            if signs[i] == 0 {
                ends.push(vertex_end(ids[i]));
                if signs[(i + 1) % 3] == signs[(i + 2) % 3] {
                    ends.push(vertex_end(ids[i]));
                }
            }
        }

        if ends.len() != 2 {
            for i in 0..3 {
                let j = (i + 1) % 3;
                if signs[i] * signs[j] == -1 {
                    let a = arena[ids[i]].position;
                    let b = arena[ids[j]].position;
                    let edge = Line::ray(b - a, a);
                    let position = line.line_intersection(&edge, tolerances.geometric)?;
                    ends.push(SegmentEnd {
                        kind: EndType::Edge,
                        vertex: ids[i],
                        position,
                        distance: line.point_to_point_distance(&position),
                    });
                }
            }
        }

        if ends.len() != 2 {
            return None;
        }

        let (mut start, mut end) = (ends[0], ends[1]);
        let middle = match (start.kind, end.kind) {
            (EndType::Vertex, EndType::Vertex) => {
                let same = start.vertex == end.vertex
                    || arena[start.vertex].approx_eq(&arena[end.vertex], tolerances.vertex);
                if same {
                    EndType::Vertex
                } else {
                    EndType::Edge
                }
            }
            _ => EndType::Face,
        };

        if start.distance > end.distance {
            std::mem::swap(&mut start, &mut end);
        }

        Some(Self {
            line,
            start,
            middle,
            end,
        })
    }

    /// Whether the two segments overlap by more than `tolerance`
    pub fn intersects(&self, other: &Segment, tolerance: f64) -> bool {
        !(self.end.distance < other.start.distance + tolerance
            || other.end.distance < self.start.distance + tolerance)
    }

    /// Both ends at the same distance along the line
    pub fn is_point(&self, tolerance: f64) -> bool {
        (self.end.distance - self.start.distance).abs() < tolerance
    }
}
