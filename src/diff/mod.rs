//! diff
//!
//! Tree and content diff engines.
//!
//! # Modules
//!
//! - [`tree`] - Structural comparison of tree snapshots ([`TreeDiffer`])
//! - [`text`] - Line and character sequence diffing ([`LineDiffer`])
//! - [`content`] - Binary sniffing, image detection, text decoding
//!
//! The usual entry point is [`commit_tree_diff`], which compares a commit
//! against its first parent, followed by [`TreeDiffer::commit_diff`] to
//! render per-file content for the changed entries.

pub mod content;
pub mod text;
pub mod tree;

pub use content::{decode_text, is_binary, is_image_name};
pub use text::{all_deleted, all_inserted, split_lines, DiffLine, LineDiffer, LineKind};
pub use tree::{commit_tree_diff, ChangeKind, DiffEntry, FileDiff, FilePayload, NodeState, TreeDiffer};
