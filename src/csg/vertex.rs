// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Classification vertices and the arena that owns them

use super::grid::PointGrid;
use crate::config::VERTEX_TOLERANCE;
use crate::geometry::Color;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Position of a vertex relative to the other solid of a boolean operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VertexStatus {
    #[default]
    Unknown = 1,
    Inside = 2,
    Outside = 3,
    Boundary = 4,
}

impl VertexStatus {
    /// Status from its integer code, `None` outside `1..=4`
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Unknown),
            2 => Some(Self::Inside),
            3 => Some(Self::Outside),
            4 => Some(Self::Boundary),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

/// Index of a vertex inside a [`VertexArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// A mesh vertex taking part in classification.
///
/// Adjacent vertices are stored as ids into the owning arena.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub color: Color,
    status: VertexStatus,
    adjacent: Vec<VertexId>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, color: Color) -> Self {
        Self::with_status(position, color, VertexStatus::Unknown)
    }

    pub fn with_status(position: Point3<f64>, color: Color, status: VertexStatus) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            color,
            status,
            adjacent: Vec::new(),
        }
    }

    pub fn status(&self) -> VertexStatus {
        self.status
    }

    /// Set the status; a known status never goes back to `Unknown`
    pub fn set_status(&mut self, status: VertexStatus) {
        if status.is_known() || !self.status.is_known() {
            self.status = status;
        }
    }

    /// Set the status from its integer code. Invalid codes are ignored.
    pub fn set_status_code(&mut self, code: u8) {
        if let Some(status) = VertexStatus::from_code(code) {
            self.set_status(status);
        }
    }

    pub fn adjacent(&self) -> &[VertexId] {
        &self.adjacent
    }

    /// Record an edge to `id`; duplicates are ignored
    pub fn add_adjacent(&mut self, id: VertexId) {
        if !self.adjacent.contains(&id) {
            self.adjacent.push(id);
        }
    }

    /// Same position within `tolerance` on every axis and the same color
    pub fn approx_eq(&self, other: &Vertex, tolerance: f64) -> bool {
        (self.position.x - other.position.x).abs() < tolerance
            && (self.position.y - other.position.y).abs() < tolerance
            && (self.position.z - other.position.z).abs() < tolerance
            && self.color == other.color
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, VERTEX_TOLERANCE)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.position.x, self.position.y, self.position.z)
    }
}

/// Owns the vertices of one solid; faces and adjacency refer to them by id.
///
/// Positions are indexed in a grid at push time and must not be moved
/// afterwards.
#[derive(Debug, Clone)]
pub struct VertexArena {
    vertices: Vec<Vertex>,
    grid: Option<PointGrid>,
}

impl Default for VertexArena {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexArena {
    pub fn new() -> Self {
        Self::with_tolerance(VERTEX_TOLERANCE)
    }

    /// Arena whose lookups are fast for any tolerance up to `tolerance`
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            vertices: Vec::new(),
            grid: PointGrid::new(tolerance),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn push(&mut self, vertex: Vertex) -> VertexId {
        let id = VertexId(self.vertices.len());
        if let Some(grid) = &mut self.grid {
            grid.insert(&vertex.position, id.0);
        }
        self.vertices.push(vertex);
        id
    }

    pub fn get(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    /// First vertex equal to `vertex` under `tolerance`
    pub fn find(&self, vertex: &Vertex, tolerance: f64) -> Option<VertexId> {
        match &self.grid {
            Some(grid) if tolerance <= grid.cell() => grid
                .near(&vertex.position)
                .filter(|&i| self.vertices[i].approx_eq(vertex, tolerance))
                .min()
                .map(VertexId),
            _ => self
                .vertices
                .iter()
                .position(|candidate| candidate.approx_eq(vertex, tolerance))
                .map(VertexId),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter().enumerate().map(|(i, v)| (VertexId(i), v))
    }

    /// Make `a` and `b` adjacent to each other
    pub fn connect(&mut self, a: VertexId, b: VertexId) {
        if a == b {
            return;
        }
        self.vertices[a.0].add_adjacent(b);
        self.vertices[b.0].add_adjacent(a);
    }

    /// Set `id` to `status` and flood it through every connected vertex that
    /// is still unknown. Returns the number of vertices marked.
    ///
    /// Uses an explicit worklist, so depth is bounded by the arena size rather
    /// than the call stack. Marking with `Unknown` is a no-op.
    pub fn mark(&mut self, id: VertexId, status: VertexStatus) -> usize {
        if !status.is_known() {
            return 0;
        }

        self.vertices[id.0].status = status;
        let mut marked = 1;
        let mut worklist = vec![id];

        while let Some(current) = worklist.pop() {
            for i in 0..self.vertices[current.0].adjacent.len() {
                let next = self.vertices[current.0].adjacent[i];
                let neighbour = &mut self.vertices[next.0];
                if neighbour.status == VertexStatus::Unknown {
                    neighbour.status = status;
                    marked += 1;
                    worklist.push(next);
                }
            }
        }

        marked
    }
}

impl Index<VertexId> for VertexArena {
    type Output = Vertex;

    fn index(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }
}

impl IndexMut<VertexId> for VertexArena {
    fn index_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.0]
    }
}
