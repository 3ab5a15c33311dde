//! graph
//!
//! Commit graph layout engine.
//!
//! Turns a time-ordered commit sequence into an incremental 2D layout:
//! node positions, routed edge paths, and row labels, with a lane table
//! that threads through pagination so a graph can be drawn one page at a
//! time without visual breaks.
//!
//! # Modules
//!
//! - [`display`] - Typed output records (Node, Edge, Label, DisplayList)
//! - [`layout`] - The lane assignment and edge routing algorithm

pub mod display;
pub mod layout;

pub use display::{color_for, DisplayList, Edge, Label, Lane, Node, Segment, PALETTE_SIZE};
pub use layout::{draw, locate, paged};
