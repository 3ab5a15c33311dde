//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the only doorway to the object store. All repository
//! reads flow through [`Repo`]; no other module imports `git2` (save the
//! `Oid` conversion in `core::types`). The layout and diff engines consume
//! the plain data types defined here ([`Commit`], [`Tree`], [`TreeEntry`])
//! and never touch git2 handles or lifetimes.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening (bare repositories included)
//! - Ref resolution (symbolic refs resolved, annotated tags peeled)
//! - Object reads (commit, tree, blob) with kind checking
//! - Lazy time-ordered history walking for pagination
//!
//! Everything here is read-only; concurrent requests each open their own
//! [`Repo`] against the same repository path.

mod interface;

pub use interface::{
    Commit, EntryKind, GitError, ObjectKind, Repo, Signature, Tree, TreeEntry, Walk,
};
