//! graph::display
//!
//! Typed output records for the layout engine.
//!
//! A rendered page is a [`DisplayList`]: one [`Node`] per commit, one
//! [`Edge`] per drawn lane segment, one [`Label`] per row. Everything here
//! serializes directly for the HTTP layer; columns and rows are grid
//! coordinates, scaling to pixels is the renderer's business.

use serde::{Deserialize, Serialize};

use crate::core::types::Oid;

/// Number of distinct lane colors before the palette repeats.
pub const PALETTE_SIZE: usize = 8;

/// A lane slot: the commit expected next in this column, or vacant.
pub type Lane = Option<Oid>;

/// One drawing instruction of an edge path.
///
/// Mirrors the SVG path commands the renderer emits: absolute move/line,
/// a relative diagonal step, a one-row vertical continuation, and an
/// open-ended vertical terminal for edges truncated by the page boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Segment {
    /// Start the path at a grid position (`M`).
    #[serde(rename = "M")]
    Move { x: usize, y: usize },
    /// Close the path into a commit at a grid position (`L`).
    #[serde(rename = "L")]
    Line { x: usize, y: usize },
    /// Diagonal connector: relative step of `dx` columns and half a row (`l`).
    #[serde(rename = "l")]
    Slant { dx: i64, dy: f64 },
    /// Continue straight down by `dy` rows (`v`).
    #[serde(rename = "v")]
    Down { dy: usize },
    /// Open-ended terminal at absolute row `y`; the edge continues beyond
    /// this page (`V`).
    #[serde(rename = "V")]
    End { y: usize },
}

impl Segment {
    /// Half-row diagonal from one column toward another.
    pub fn slant(from: usize, to: usize) -> Self {
        Segment::Slant {
            dx: to as i64 - from as i64,
            dy: 0.5,
        }
    }
}

/// A finished edge: a routed path between commits (or to the page edge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Row at which the edge began; the final display order key
    pub order: usize,
    /// Palette bucket (column index mod [`PALETTE_SIZE`])
    pub color: usize,
    /// Drawing instructions, one [`Segment::Down`] per row spanned
    pub path: Vec<Segment>,
}

impl Edge {
    /// CSS class for the renderer, e.g. `col_3`.
    pub fn css_class(&self) -> String {
        format!("col_{}", self.color)
    }
}

/// A commit dot on the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Lane column
    pub x: usize,
    /// Row
    pub y: usize,
    /// The commit this node represents
    pub id: Oid,
    /// Parent ids, for client-side navigation
    pub parents: Vec<Oid>,
    /// Palette bucket (column index mod [`PALETTE_SIZE`])
    pub color: usize,
}

/// Per-row text: shortened message plus author and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Column the message text starts at (clear of occupied lanes)
    pub x: usize,
    /// Row
    pub y: usize,
    /// The commit this label belongs to
    pub id: Oid,
    /// Shortened first line of the commit message
    pub message: String,
    /// Author name
    pub author: String,
    /// Formatted commit time
    pub date: String,
}

/// Output aggregate of one layout invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub labels: Vec<Label>,
}

/// Palette bucket for a column.
pub fn color_for(column: usize) -> usize {
    column % PALETTE_SIZE
}
