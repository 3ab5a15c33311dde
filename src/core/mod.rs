//! core
//!
//! Core domain types shared by the git, graph, and diff layers.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, plus commit message/time formatting
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Object identifiers are opaque; only the wire format is hex

pub mod types;
