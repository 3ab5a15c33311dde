//! gitgraph - Commit graph layout and diff engine for Git repository viewers
//!
//! This crate is the computational core of a web-based Git history viewer:
//! it lays out an arbitrary, possibly-merging commit DAG into lanes and
//! routed edges, and computes structural tree diffs with line-level content
//! diffs for individual commits. HTTP routing, templates, and syntax
//! highlighting are consumers of this crate's output, not part of it.
//!
//! # Architecture
//!
//! - [`core`] - Strong domain types (object ids, formatting helpers)
//! - [`git`] - Git access layer: the single doorway to the object store
//! - [`graph`] - Commit graph layout engine (lanes, edges, labels)
//! - [`diff`] - Tree diff and text diff engines
//!
//! # Invariants
//!
//! 1. All layout and diff state is per-invocation; nothing is shared
//!    between concurrent requests
//! 2. History is pulled lazily, bounded by the requested page size
//! 3. Malformed-but-plausible topology (disconnected history, orphan
//!    commits, multiple roots) is valid input, never an error

pub mod core;
pub mod diff;
pub mod git;
pub mod graph;
