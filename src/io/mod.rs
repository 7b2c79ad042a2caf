// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh export

mod stl;

pub use stl::{export_stl, to_stl_bytes};
