// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the boolean engine

use thiserror::Error;

/// Structural failures when building a solid from a mesh.
///
/// Degenerate geometry is never an error: intersection routines return `None`
/// and the splitter skips the face pair instead.
#[derive(Debug, Error, PartialEq)]
pub enum CsgError {
    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("Vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },
}

pub type CsgResult<T> = std::result::Result<T, CsgError>;
