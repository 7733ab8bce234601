//! Decoded CAD entities
//!
//! The upstream CAD-decode collaborator turns a native drawing file into a
//! stream of [`DecodedCadEntity`] values. The bridge never sees the file
//! format itself; this module is the boundary type it consumes.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::{Point3, StableHandle};

/// Shape kind of a decoded CAD entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Point,
    Line,
    Polyline,
    Arc,
    Circle,
    BlockInsert,
    Text,
}

/// The decoded geometric payload of one CAD entity
///
/// Every coordinate carries an explicit Z, including exact 0.0. A shape
/// whose source drawing stored elevations — even constant zero — must
/// never be flattened to 2D downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeShape {
    /// A single point
    Point { location: Point3 },
    /// A straight segment
    Line { start: Point3, end: Point3 },
    /// An ordered vertex chain, optionally closed
    Polyline { vertices: Vec<Point3>, is_closed: bool },
    /// A circular arc (angles in radians, counterclockwise)
    Arc {
        center: Point3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    /// A full circle
    Circle { center: Point3, radius: f64 },
    /// A block reference (symbol insertion)
    BlockInsert { insertion: Point3 },
    /// Annotation text anchored at an insertion point
    Text { insertion: Point3, content: String },
}

impl NativeShape {
    /// The shape's kind tag
    pub fn kind(&self) -> EntityKind {
        match self {
            NativeShape::Point { .. } => EntityKind::Point,
            NativeShape::Line { .. } => EntityKind::Line,
            NativeShape::Polyline { .. } => EntityKind::Polyline,
            NativeShape::Arc { .. } => EntityKind::Arc,
            NativeShape::Circle { .. } => EntityKind::Circle,
            NativeShape::BlockInsert { .. } => EntityKind::BlockInsert,
            NativeShape::Text { .. } => EntityKind::Text,
        }
    }
}

bitflags! {
    /// Display flags carried through from the source drawing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DisplayFlags: u32 {
        /// Entity is invisible in the drawing.
        const INVISIBLE = 1;
        /// Entity sits on a frozen layer.
        const FROZEN_LAYER = 2;
        /// Entity is marked non-plotting.
        const NON_PLOTTING = 4;
    }
}

/// Display attributes passed through unmodified from the decoder
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayAttributes {
    /// ACI color index (0 = by block, 256 = by layer)
    pub color_index: u16,
    pub flags: DisplayFlags,
}

/// Model space vs. paper space tag, passed through unmodified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpaceTag {
    #[default]
    Model,
    Paper,
}

/// One CAD entity as produced by a single decode of a drawing
///
/// Immutable: produced once per import, consumed once. The stable handle is
/// unique within one decode and stable across decodes of the same drawing
/// revision.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCadEntity {
    /// Per-drawing stable identifier
    pub handle: StableHandle,
    /// Free-text source layer name
    pub layer_name: String,
    /// Decoded geometry
    pub shape: NativeShape,
    /// Block name when the entity is a block reference
    pub block_name: Option<String>,
    /// Pass-through display attributes
    pub display: DisplayAttributes,
    /// Model/paper space tag
    pub space: SpaceTag,
}

impl DecodedCadEntity {
    /// Create an entity with default display attributes in model space
    pub fn new(handle: StableHandle, layer_name: impl Into<String>, shape: NativeShape) -> Self {
        DecodedCadEntity {
            handle,
            layer_name: layer_name.into(),
            shape,
            block_name: None,
            display: DisplayAttributes::default(),
            space: SpaceTag::Model,
        }
    }

    /// Attach a block name (for block-reference entities)
    pub fn with_block(mut self, block_name: impl Into<String>) -> Self {
        self.block_name = Some(block_name.into());
        self
    }

    /// Tag the entity as paper space
    pub fn in_paper_space(mut self) -> Self {
        self.space = SpaceTag::Paper;
        self
    }

    /// The shape's kind tag
    pub fn kind(&self) -> EntityKind {
        self.shape.kind()
    }
}
