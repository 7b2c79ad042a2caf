// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid representation used by the boolean engine
//!
//! A solid owns a vertex arena and a list of triangular faces referencing it.
//! Splitting cuts faces along the intersection with another solid until every
//! face is entirely inside, outside or on the surface of that solid.

use super::face::{Face, FaceStatus};
use super::grid::PointGrid;
use super::line::Line;
use super::segment::{EndType, Segment};
use super::vertex::{Vertex, VertexArena, VertexId, VertexStatus};
use crate::config::{CsgConfig, Tolerances};
use crate::error::{CsgError, CsgResult};
use crate::geometry::{self, BoundingBox, Color, Mesh, Triangle};
use nalgebra::{Point3, Vector3};
use rand::Rng;
use tracing::{debug, instrument, trace, warn};

#[derive(Debug, Clone)]
pub struct Solid {
    vertices: VertexArena,
    faces: Vec<Face>,
    bound: BoundingBox,
    tolerances: Tolerances,
    split_truncated: bool,
    unresolved_faces: usize,
}

impl Solid {
    /// Build a solid from a triangle mesh.
    ///
    /// Coincident vertices are merged and degenerate triangles dropped.
    pub fn from_mesh(mesh: &Mesh, tolerances: Tolerances) -> CsgResult<Self> {
        let mut solid = Self {
            vertices: VertexArena::with_tolerance(tolerances.vertex),
            faces: Vec::with_capacity(mesh.triangle_count()),
            bound: BoundingBox::empty(),
            tolerances,
            split_truncated: false,
            unresolved_faces: 0,
        };

        let mut ids = Vec::with_capacity(mesh.vertex_count());
        for (index, vertex) in mesh.vertices.iter().enumerate() {
            if !vertex.position.coords.iter().all(|c| c.is_finite()) {
                return Err(CsgError::NonFiniteVertex { index });
            }
            let id = solid.add_vertex(vertex.position, vertex.color, VertexStatus::Unknown);
            solid.vertices[id].normal = vertex.normal;
            ids.push(id);
        }

        for (triangle_index, triangle) in mesh.triangles.iter().enumerate() {
            let mut corners = [VertexId(0); 3];
            for (corner, &index) in corners.iter_mut().zip(triangle.indices.iter()) {
                *corner = *ids.get(index).ok_or(CsgError::IndexOutOfRange {
                    triangle: triangle_index,
                    index,
                    vertex_count: mesh.vertex_count(),
                })?;
            }
            solid.add_face(corners[0], corners[1], corners[2]);
        }

        solid.bound = BoundingBox::from_points(solid.vertices.iter().map(|(_, v)| &v.position));
        debug!(
            vertices = solid.vertices.len(),
            faces = solid.faces.len(),
            "built solid from mesh"
        );
        Ok(solid)
    }

    pub fn vertices(&self) -> &VertexArena {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn bound(&self) -> &BoundingBox {
        &self.bound
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Whether the last split stopped at the face growth limit
    pub fn split_truncated(&self) -> bool {
        self.split_truncated
    }

    /// Faces the last classification left `Outside` after running out of ray retries
    pub fn unresolved_faces(&self) -> usize {
        self.unresolved_faces
    }

    /// Reuse an equal vertex (updating its status) or add a new one
    pub fn add_vertex(&mut self, position: Point3<f64>, color: Color, status: VertexStatus) -> VertexId {
        let vertex = Vertex::with_status(position, color, status);
        match self.vertices.find(&vertex, self.tolerances.vertex) {
            Some(id) => {
                self.vertices[id].set_status(status);
                id
            }
            None => self.vertices.push(vertex),
        }
    }

    /// Append a face unless two of its vertices coincide or its area is
    /// below the geometric tolerance. Returns the index of the new face.
    pub fn add_face(&mut self, v1: VertexId, v2: VertexId, v3: VertexId) -> Option<usize> {
        let tol = self.tolerances.vertex;
        let same = |a: VertexId, b: VertexId| a == b || self.vertices[a].approx_eq(&self.vertices[b], tol);
        if same(v1, v2) || same(v1, v3) || same(v2, v3) {
            return None;
        }

        let face = Face::new(v1, v2, v3);
        if face.area(&self.vertices) <= self.tolerances.geometric {
            return None;
        }
        self.faces.push(face);
        Some(self.faces.len() - 1)
    }

    /// Side (-1, 0, 1) of each vertex of `face` relative to a plane
    fn signs(&self, face: &Face, plane: &super::face::Plane) -> [i8; 3] {
        let tol = self.tolerances.geometric;
        face.positions(&self.vertices).map(|p| {
            let distance = plane.signed_distance(&p);
            if distance > tol {
                1
            } else if distance < -tol {
                -1
            } else {
                0
            }
        })
    }

    /// Split faces of this solid along their intersections with `other`.
    ///
    /// Returns the number of faces that were split.
    #[instrument(skip(self, other, config), fields(faces = self.faces.len(), other_faces = other.faces.len()))]
    pub fn split_faces(&mut self, other: &Solid, config: &CsgConfig) -> usize {
        let tol = self.tolerances.geometric;
        self.split_truncated = false;
        if !self.bound.overlaps(&other.bound, tol) {
            return 0;
        }

        let other_planes: Vec<_> = other.faces.iter().map(|f| f.plane(&other.vertices)).collect();
        let other_bounds: Vec<_> = other.faces.iter().map(|f| f.bound(&other.vertices)).collect();
        let face_limit = self.faces.len().saturating_mul(config.split_growth_limit);
        let mut splits = 0;
        let mut i = 0;

        'faces: while i < self.faces.len() {
            let face = self.faces[i];
            let bound = face.bound(&self.vertices);

            if bound.overlaps(&other.bound, tol) {
                let plane = face.plane(&self.vertices);

                for (j, other_face) in other.faces.iter().enumerate() {
                    if !bound.overlaps(&other_bounds[j], tol) {
                        continue;
                    }

                    let signs = self.signs(&face, &other_planes[j]);
                    if signs[0] == signs[1] && signs[1] == signs[2] {
                        continue;
                    }
                    let other_signs = other.signs(other_face, &plane);
                    if other_signs[0] == other_signs[1] && other_signs[1] == other_signs[2] {
                        continue;
                    }

                    let Some(line) = Line::from_planes(&plane, &other_planes[j], tol) else {
                        continue;
                    };
                    trace!(%line, face = i, other_face = j, "faces cross");
                    let Some(segment) = Segment::new(line, &face, &self.vertices, signs, &self.tolerances)
                    else {
                        continue;
                    };
                    let Some(other_segment) =
                        Segment::new(line, other_face, &other.vertices, other_signs, &other.tolerances)
                    else {
                        continue;
                    };
                    if !segment.intersects(&other_segment, tol) {
                        continue;
                    }

                    if !self.split_face(i, &segment, &other_segment) {
                        continue;
                    }
                    splits += 1;

                    if self.faces.len() > face_limit {
                        warn!(
                            faces = self.faces.len(),
                            limit = face_limit,
                            "face count exceeded growth limit, stopping split"
                        );
                        self.split_truncated = true;
                        return splits;
                    }

                    // The split can hand back the unsplit face when the cut
                    // only touched its border: put it back and keep going
                    let Some(last) = self.faces.len().checked_sub(1) else {
                        break 'faces;
                    };
                    if self.faces[last].is_rotation_of(&face) {
                        if i != last {
                            if let Some(restored) = self.faces.pop() {
                                self.faces.insert(i, restored);
                            }
                        }
                        continue;
                    }

                    continue 'faces;
                }
            }

            i += 1;
        }

        debug!(splits, faces = self.faces.len(), "split faces");
        splits
    }

    /// Split the face at `index` along `segment`, clipped to `other_segment`.
    ///
    /// Returns `true` when the face was replaced by smaller faces.
    fn split_face(&mut self, index: usize, segment: &Segment, other_segment: &Segment) -> bool {
        let tol = self.tolerances.geometric;
        let face = self.faces[index];
        let start_vertex = segment.start.vertex;
        let end_vertex = segment.end.vertex;

        // Deepest start and end of the two segments
        let (start_distance, start_type, start_pos) =
            if other_segment.start.distance > segment.start.distance + tol {
                (other_segment.start.distance, segment.middle, other_segment.start.position)
            } else {
                (segment.start.distance, segment.start.kind, segment.start.position)
            };
        let (end_distance, end_type, end_pos) = if other_segment.end.distance < segment.end.distance - tol {
            (other_segment.end.distance, segment.middle, other_segment.end.position)
        } else {
            (segment.end.distance, segment.end.kind, segment.end.position)
        };

        if start_type == EndType::Vertex {
            self.vertices[start_vertex].set_status(VertexStatus::Boundary);
        }
        if end_type == EndType::Vertex {
            self.vertices[end_vertex].set_status(VertexStatus::Boundary);
        }

        trace!(?start_type, middle = ?segment.middle, ?end_type, index, "splitting face");

        use EndType::{Edge, Face as F, Vertex as V};
        match (start_type, segment.middle, end_type) {
            (V, _, V) => return false,
            (_, Edge, _) => {
                let edge = edge_between(&face, start_vertex, end_vertex);
                if start_type == V {
                    self.break_in_two(index, end_pos, edge);
                } else if end_type == V {
                    self.break_in_two(index, start_pos, edge);
                } else if start_distance == end_distance {
                    self.break_in_two(index, end_pos, edge);
                } else if is_forward(&face, start_vertex, end_vertex) {
                    self.break_in_three_on_edge(index, start_pos, end_pos, edge);
                } else {
                    self.break_in_three_on_edge(index, end_pos, start_pos, edge);
                }
            }
            (V, _, Edge) => self.break_in_two(index, end_pos, corner(&face, end_vertex)),
            (Edge, _, V) => self.break_in_two(index, start_pos, corner(&face, start_vertex)),
            (V, _, F) => self.break_in_three_around(index, end_pos, corner(&face, start_vertex)),
            (F, _, V) => self.break_in_three_around(index, start_pos, corner(&face, end_vertex)),
            (Edge, _, Edge) => self.break_in_three_across(
                index,
                start_pos,
                end_pos,
                corner(&face, start_vertex),
                corner(&face, end_vertex),
            ),
            (Edge, _, F) => self.break_in_four(index, start_pos, end_pos, corner(&face, start_vertex)),
            (F, _, Edge) => self.break_in_four(index, end_pos, start_pos, corner(&face, end_vertex)),
            (F, _, F) => {
                let segment_vector = start_pos - end_pos;
                if segment_vector.amax() < tol {
                    self.break_in_three_around(index, start_pos, 0);
                    return true;
                }

                // Vertex most aligned with the segment, split towards it
                let positions = face.positions(&self.vertices);
                let alignment = |p: &Point3<f64>| {
                    let direction = (end_pos - p).try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
                    segment_vector.dot(&direction).abs()
                };
                let dots = positions.map(|p| alignment(&p));
                let lined = if dots[0] > dots[1] && dots[0] > dots[2] {
                    0
                } else if dots[1] > dots[2] && dots[1] > dots[0] {
                    1
                } else {
                    2
                };

                let lined_pos = positions[lined];
                if (lined_pos - start_pos).norm() > (lined_pos - end_pos).norm() {
                    self.break_in_five(index, start_pos, end_pos, lined);
                } else {
                    self.break_in_five(index, end_pos, start_pos, lined);
                }
            }
        }
        true
    }

    /// Remove the face at `index` and create the boundary vertices for its pieces
    fn take_face(&mut self, index: usize, points: &[Point3<f64>]) -> (Face, Vec<VertexId>) {
        let face = self.faces.remove(index);
        let color = self.vertices[face.v1].color;
        let created = points
            .iter()
            .map(|p| self.add_vertex(*p, color, VertexStatus::Boundary))
            .collect();
        (face, created)
    }

    fn add_faces(&mut self, faces: &[[VertexId; 3]]) {
        for &[a, b, c] in faces {
            self.add_face(a, b, c);
        }
    }

    /// Split edge `edge` at `point`
    fn break_in_two(&mut self, index: usize, point: Point3<f64>, edge: usize) {
        let (face, created) = self.take_face(index, &[point]);
        let [a, b, c] = rotated(&face, edge);
        let n = created[0];
        self.add_faces(&[[a, n, c], [n, b, c]]);
    }

    /// Split edge `edge` at two points, `first` being nearer its start
    fn break_in_three_on_edge(&mut self, index: usize, first: Point3<f64>, second: Point3<f64>, edge: usize) {
        let (face, created) = self.take_face(index, &[first, second]);
        let [a, b, c] = rotated(&face, edge);
        let (n1, n2) = (created[0], created[1]);
        self.add_faces(&[[a, n1, c], [n1, n2, c], [n2, b, c]]);
    }

    /// Fan around an interior point
    fn break_in_three_around(&mut self, index: usize, point: Point3<f64>, vertex: usize) {
        let (face, created) = self.take_face(index, &[point]);
        let [a, b, c] = rotated(&face, vertex);
        let n = created[0];
        self.add_faces(&[[a, b, n], [b, c, n], [c, a, n]]);
    }

    /// Cut across the face from edge `start_edge` to edge `end_edge`
    fn break_in_three_across(
        &mut self,
        index: usize,
        start: Point3<f64>,
        end: Point3<f64>,
        start_edge: usize,
        end_edge: usize,
    ) {
        let (face, created) = self.take_face(index, &[start, end]);
        let (n1, n2) = (created[0], created[1]);
        if end_edge == (start_edge + 1) % 3 {
            let [a, b, c] = rotated(&face, start_edge);
            self.add_faces(&[[a, n1, n2], [a, n2, c], [n1, b, n2]]);
        } else {
            let [a, b, c] = rotated(&face, end_edge);
            self.add_faces(&[[a, n2, n1], [a, n1, c], [n2, b, n1]]);
        }
    }

    /// Cut from a point on edge `edge` to a point inside the face
    fn break_in_four(&mut self, index: usize, on_edge: Point3<f64>, inner: Point3<f64>, edge: usize) {
        let (face, created) = self.take_face(index, &[on_edge, inner]);
        let [a, b, c] = rotated(&face, edge);
        let (n1, n2) = (created[0], created[1]);
        self.add_faces(&[[a, n1, n2], [n1, b, n2], [b, c, n2], [c, a, n2]]);
    }

    /// Cut along an inner segment; `near` is the end closer to corner `lined`
    fn break_in_five(&mut self, index: usize, far: Point3<f64>, near: Point3<f64>, lined: usize) {
        let (face, created) = self.take_face(index, &[far, near]);
        let [a, b, c] = rotated(&face, lined);
        let (n1, n2) = (created[0], created[1]);
        self.add_faces(&[[b, c, n1], [b, n1, n2], [c, n2, n1], [b, n2, a], [c, a, n2]]);
    }

    /// Classify every face of this solid against `other`
    #[instrument(skip(self, other, config, rng), fields(faces = self.faces.len()))]
    pub fn classify_faces<R: Rng + ?Sized>(&mut self, other: &Solid, config: &CsgConfig, rng: &mut R) {
        for face in &self.faces {
            self.vertices.connect(face.v1, face.v2);
            self.vertices.connect(face.v2, face.v3);
            self.vertices.connect(face.v3, face.v1);
        }

        let mut ray_traced = 0;
        self.unresolved_faces = 0;
        for i in 0..self.faces.len() {
            if self.faces[i].simple_classify(&self.vertices) {
                continue;
            }

            if !self.faces[i].ray_trace_classify(&self.vertices, other, config, rng) {
                self.unresolved_faces += 1;
            }
            ray_traced += 1;

            let face = self.faces[i];
            let status = face.status().vertex_status();
            for id in face.vertices() {
                if self.vertices[id].status() == VertexStatus::Unknown {
                    self.vertices.mark(id, status);
                }
            }
        }

        debug!(ray_traced, unresolved = self.unresolved_faces, "classified faces");
    }

    /// Reverse the winding of every face classified inside the other solid
    pub fn invert_inside_faces(&mut self) {
        for face in &mut self.faces {
            if face.status() == FaceStatus::Inside {
                face.invert();
            }
        }
    }

    /// Every face as a triangle mesh
    pub fn to_mesh(&self) -> Mesh {
        let mut assembler = MeshAssembler::new(self.tolerances.vertex);
        assembler.add_faces(self, |_| true);
        assembler.finish()
    }
}

/// Index (0..3) of `id` among the face corners, falling back to the last one
fn corner(face: &Face, id: VertexId) -> usize {
    face.vertices().iter().position(|&v| v == id).unwrap_or(2)
}

/// Edge (0: v1-v2, 1: v2-v3, 2: v3-v1) joining two corners in either order
fn edge_between(face: &Face, a: VertexId, b: VertexId) -> usize {
    let [v1, v2, v3] = face.vertices();
    if (a == v1 && b == v2) || (a == v2 && b == v1) {
        0
    } else if (a == v2 && b == v3) || (a == v3 && b == v2) {
        1
    } else {
        2
    }
}

/// Whether `a` -> `b` follows the face winding
fn is_forward(face: &Face, a: VertexId, b: VertexId) -> bool {
    let [v1, v2, v3] = face.vertices();
    (a == v1 && b == v2) || (a == v2 && b == v3) || (a == v3 && b == v1)
}

/// Corners starting from corner `k`, keeping the winding
fn rotated(face: &Face, k: usize) -> [VertexId; 3] {
    let v = face.vertices();
    [v[k % 3], v[(k + 1) % 3], v[(k + 2) % 3]]
}

/// Collects faces into a mesh, merging equal vertices
pub(crate) struct MeshAssembler {
    mesh: Mesh,
    tolerance: f64,
    grid: Option<PointGrid>,
}

impl MeshAssembler {
    pub(crate) fn new(tolerance: f64) -> Self {
        Self {
            mesh: Mesh::new(),
            tolerance,
            grid: PointGrid::new(tolerance),
        }
    }

    /// Add the faces of `solid` whose status passes `keep`
    pub(crate) fn add_faces(&mut self, solid: &Solid, keep: impl Fn(FaceStatus) -> bool) {
        for face in solid.faces.iter().filter(|f| keep(f.status())) {
            let indices = face.vertices().map(|id| self.index_of(&solid.vertices[id]));
            self.mesh.add_triangle(Triangle::new(indices));
        }
    }

    fn index_of(&mut self, vertex: &Vertex) -> usize {
        let tol = self.tolerance;
        let matches = |v: &geometry::Vertex| (v.position - vertex.position).amax() < tol && v.color == vertex.color;
        let existing = match &self.grid {
            Some(grid) => grid
                .near(&vertex.position)
                .filter(|&i| matches(&self.mesh.vertices[i]))
                .min(),
            None => self.mesh.vertices.iter().position(matches),
        };
        if let Some(index) = existing {
            return index;
        }

        let index = self.mesh.add_vertex(geometry::Vertex::with_color(
            vertex.position,
            vertex.normal,
            vertex.color,
        ));
        if let Some(grid) = &mut self.grid {
            grid.insert(&vertex.position, index);
        }
        index
    }

    pub(crate) fn finish(mut self) -> Mesh {
        self.mesh.recompute_normals();
        self.mesh
    }
}
