//! diff::tree
//!
//! Recursive structural comparison of two tree snapshots.
//!
//! The output is a nested [`DiffEntry`] tree tagged created / deleted /
//! modified / unmodified, with per-file line diffs attached to changed
//! blobs on request. Entries are immutable once constructed; a diff is
//! recomputed per request, never cached across requests.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::types::Oid;
use crate::git::{Commit, EntryKind, GitError, Repo, Tree, TreeEntry};

use super::content::{decode_text, is_binary, is_image_name};
use super::text::{all_deleted, all_inserted, split_lines, DiffLine, LineDiffer};

/// Change kind of a diff entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Unmodified,
    Created,
    Deleted,
    Modified,
}

/// Rendering hint for directory entries: whether the subtree should start
/// expanded. Derived, not stored independently: a modified directory has
/// changed descendants and opens; everything else starts closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Open,
    Closed,
}

/// A node in the tree-comparison output.
///
/// Kind and fields are one tagged type rather than a class hierarchy:
/// `old_id`/`old_name` are populated exactly when `kind` is `Modified`;
/// created, deleted, and unmodified entries carry the single id of the side
/// they exist on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub kind: ChangeKind,
    /// Full path from the diff root, `/`-joined
    pub name: String,
    /// Final path component
    pub basename: String,
    /// Content id (new side for modified entries)
    pub id: Oid,
    /// Old content id; present iff `kind` is `Modified`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_id: Option<Oid>,
    /// Old full path; present iff `kind` is `Modified`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    /// What the entry points at (tree, blob, or unresolvable reference)
    pub object: EntryKind,
    pub state: NodeState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DiffEntry>,
    /// Line diff for changed blobs, computed only when content comparison
    /// was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<DiffLine>>,
}

impl DiffEntry {
    fn leaf(kind: ChangeKind, entry: &TreeEntry, parent: Option<&str>) -> Self {
        Self {
            kind,
            name: join_path(parent, &entry.name),
            basename: entry.name.clone(),
            id: entry.id.clone(),
            old_id: None,
            old_name: None,
            object: entry.kind,
            state: NodeState::Closed,
            children: Vec::new(),
            content: None,
        }
    }

    fn modified(
        old: &TreeEntry,
        new: &TreeEntry,
        parent: Option<&str>,
        object: EntryKind,
        children: Vec<DiffEntry>,
    ) -> Self {
        let state = if object == EntryKind::Tree {
            NodeState::Open
        } else {
            NodeState::Closed
        };
        Self {
            kind: ChangeKind::Modified,
            name: join_path(parent, &new.name),
            basename: new.name.clone(),
            id: new.id.clone(),
            old_id: Some(old.id.clone()),
            old_name: Some(join_path(parent, &old.name)),
            object,
            state,
            children,
            content: None,
        }
    }

    /// Whether anything under this entry changed.
    pub fn is_changed(&self) -> bool {
        self.kind != ChangeKind::Unmodified
    }
}

fn join_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}/{}", parent, name),
        None => name.to_string(),
    }
}

/// A changed file flattened out of a diff tree, with rendered content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDiff {
    /// Full path from the diff root
    pub name: String,
    pub kind: ChangeKind,
    /// Content id (new side for modified files)
    pub id: Oid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_id: Option<Oid>,
    pub payload: FilePayload,
}

/// What a changed file renders as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilePayload {
    /// Line records for a text file
    Text { lines: Vec<DiffLine> },
    /// Binary file; `placeholder` is the display text
    Binary { placeholder: String },
    /// Raster image; the UI compares old/new by id
    Image,
}

/// Structural comparison of tree snapshots.
///
/// Holds the repository handle for object reads plus the line-diff
/// configuration. `compare_content` controls whether blob diffs carry
/// line records in the entry tree itself; [`TreeDiffer::commit_diff`]
/// always renders content for changed files.
pub struct TreeDiffer<'a> {
    repo: &'a Repo,
    compare_content: bool,
    lines: LineDiffer,
}

impl<'a> TreeDiffer<'a> {
    /// Structure-only differ: entries carry no line content.
    pub fn new(repo: &'a Repo) -> Self {
        Self {
            repo,
            compare_content: false,
            lines: LineDiffer::default(),
        }
    }

    /// Differ that attaches full line diffs to modified blob entries.
    pub fn with_content(repo: &'a Repo) -> Self {
        Self {
            repo,
            compare_content: true,
            lines: LineDiffer::default(),
        }
    }

    /// Compare two tree snapshots.
    ///
    /// Output order is a fixed convention: entries derived from the new
    /// tree first (in new-tree order), then deletions of old-only entries
    /// appended. Not alphabetical.
    pub fn tree_diff(
        &self,
        old: &Tree,
        new: &Tree,
        parent: Option<&str>,
    ) -> Result<Vec<DiffEntry>, GitError> {
        let mut entries = Vec::with_capacity(new.entries.len());
        for new_entry in &new.entries {
            match old.get(&new_entry.name) {
                Some(old_entry) if old_entry.id == new_entry.id => {
                    entries.push(DiffEntry::leaf(ChangeKind::Unmodified, new_entry, parent));
                }
                Some(old_entry) => {
                    entries.push(self.diff(old_entry, new_entry, parent)?);
                }
                None => {
                    entries.push(self.mark_all(ChangeKind::Created, new_entry, parent)?);
                }
            }
        }
        for old_entry in &old.entries {
            if new.get(&old_entry.name).is_none() {
                entries.push(self.mark_all(ChangeKind::Deleted, old_entry, parent)?);
            }
        }
        Ok(entries)
    }

    /// Compare one pair of same-named entries with differing ids.
    ///
    /// Dispatch: unresolvable references are a representable state, never
    /// an error; a kind change (tree vs blob) becomes a delete+create pair
    /// wrapped in a modified node; tree pairs recurse; blob pairs carry a
    /// content diff when requested.
    pub fn diff(
        &self,
        old: &TreeEntry,
        new: &TreeEntry,
        parent: Option<&str>,
    ) -> Result<DiffEntry, GitError> {
        let old_is_ref = old.kind == EntryKind::Reference;
        let new_is_ref = new.kind == EntryKind::Reference;

        if old_is_ref && new_is_ref {
            return Ok(DiffEntry::modified(
                old,
                new,
                parent,
                EntryKind::Reference,
                vec![DiffEntry::leaf(ChangeKind::Unmodified, new, parent)],
            ));
        }
        if old_is_ref || new_is_ref || old.kind != new.kind {
            let replaced = vec![
                self.mark_all(ChangeKind::Deleted, old, parent)?,
                self.mark_all(ChangeKind::Created, new, parent)?,
            ];
            return Ok(DiffEntry::modified(old, new, parent, new.kind, replaced));
        }

        match new.kind {
            EntryKind::Tree => {
                let joined = join_path(parent, &new.name);
                let old_tree = self.repo.find_tree(&old.id)?;
                let new_tree = self.repo.find_tree(&new.id)?;
                let children = self.tree_diff(&old_tree, &new_tree, Some(&joined))?;
                Ok(DiffEntry::modified(
                    old,
                    new,
                    parent,
                    EntryKind::Tree,
                    children,
                ))
            }
            _ => self.blob_diff(old, new, parent),
        }
    }

    /// Modified blob pair. Content is attached only when this differ was
    /// built with content comparison; binary blobs never get line records.
    fn blob_diff(
        &self,
        old: &TreeEntry,
        new: &TreeEntry,
        parent: Option<&str>,
    ) -> Result<DiffEntry, GitError> {
        let mut entry = DiffEntry::modified(old, new, parent, EntryKind::Blob, Vec::new());
        if !self.compare_content {
            return Ok(entry);
        }
        let old_bytes = self.repo.blob_bytes(&old.id)?;
        let new_bytes = self.repo.blob_bytes(&new.id)?;
        if is_binary(&old_bytes) || is_binary(&new_bytes) {
            return Ok(entry);
        }
        let old_lines = split_lines(&decode_text(&old_bytes));
        let new_lines = split_lines(&decode_text(&new_bytes));
        entry.content = Some(self.lines.full_diff(&old_lines, &new_lines));
        Ok(entry)
    }

    /// Tag an entry and its whole subtree with one kind (no comparison
    /// point exists for created/deleted subtrees).
    fn mark_all(
        &self,
        kind: ChangeKind,
        entry: &TreeEntry,
        parent: Option<&str>,
    ) -> Result<DiffEntry, GitError> {
        let mut result = DiffEntry::leaf(kind, entry, parent);
        if entry.kind == EntryKind::Tree {
            let tree = self.repo.find_tree(&entry.id)?;
            let joined = join_path(parent, &entry.name);
            for child in &tree.entries {
                result.children.push(self.mark_all(kind, child, Some(&joined))?);
            }
        }
        Ok(result)
    }

    /// Flatten a diff tree into per-file content diffs.
    ///
    /// Walks changed blobs depth-first. Created files render as all-created
    /// records, deleted files as all-deleted, modified files as a context
    /// diff. Binary blobs render a placeholder, image blobs an image hint.
    pub fn commit_diff(&self, entry: &DiffEntry) -> Result<Vec<FileDiff>, GitError> {
        let mut files = Vec::new();
        self.collect_files(entry, &mut files)?;
        Ok(files)
    }

    fn collect_files(&self, entry: &DiffEntry, out: &mut Vec<FileDiff>) -> Result<(), GitError> {
        if !entry.children.is_empty() {
            for child in &entry.children {
                self.collect_files(child, out)?;
            }
            return Ok(());
        }
        if entry.object != EntryKind::Blob || entry.kind == ChangeKind::Unmodified {
            return Ok(());
        }
        debug!("rendering {} file {}", kind_word(entry.kind), entry.name);
        let payload = match entry.kind {
            ChangeKind::Created | ChangeKind::Deleted => {
                let bytes = self.repo.blob_bytes(&entry.id)?;
                self.whole_file_payload(entry, &bytes)
            }
            ChangeKind::Modified => self.modified_payload(entry)?,
            ChangeKind::Unmodified => unreachable!("filtered above"),
        };
        out.push(FileDiff {
            name: entry.name.clone(),
            kind: entry.kind,
            id: entry.id.clone(),
            old_id: entry.old_id.clone(),
            payload,
        });
        Ok(())
    }

    fn whole_file_payload(&self, entry: &DiffEntry, bytes: &[u8]) -> FilePayload {
        if is_binary(bytes) {
            return self.binary_payload(entry);
        }
        let lines = split_lines(&decode_text(bytes));
        let records = match entry.kind {
            ChangeKind::Created => all_inserted(&lines),
            _ => all_deleted(&lines),
        };
        FilePayload::Text { lines: records }
    }

    fn modified_payload(&self, entry: &DiffEntry) -> Result<FilePayload, GitError> {
        let old_id = entry
            .old_id
            .as_ref()
            .unwrap_or(&entry.id);
        let new_bytes = self.repo.blob_bytes(&entry.id)?;
        let old_bytes = self.repo.blob_bytes(old_id)?;
        if is_binary(&new_bytes) || is_binary(&old_bytes) {
            return Ok(self.binary_payload(entry));
        }
        let old_lines = split_lines(&decode_text(&old_bytes));
        let new_lines = split_lines(&decode_text(&new_bytes));
        Ok(FilePayload::Text {
            lines: self.lines.context_diff(&old_lines, &new_lines),
        })
    }

    fn binary_payload(&self, entry: &DiffEntry) -> FilePayload {
        if is_image_name(&entry.name) {
            FilePayload::Image
        } else {
            FilePayload::Binary {
                placeholder: format!("(Binary file, {})", kind_word(entry.kind)),
            }
        }
    }
}

fn kind_word(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Unmodified => "unmodified",
        ChangeKind::Created => "created",
        ChangeKind::Deleted => "deleted",
        ChangeKind::Modified => "modified",
    }
}

/// Tree diff for a single commit: its tree against the first parent's.
///
/// Octopus merges are approximated against parent[0] only (a preserved
/// simplification, not a bug). Root commits compare against the empty
/// tree, so an initial commit reads as all-created.
pub fn commit_tree_diff(repo: &Repo, commit: &Commit) -> Result<Vec<DiffEntry>, GitError> {
    let new_tree = repo.find_tree(&commit.tree)?;
    let old_tree = match commit.parents.first() {
        Some(parent_id) => {
            let parent = repo.find_commit(parent_id)?;
            repo.find_tree(&parent.tree)?
        }
        None => Tree::empty(),
    };
    TreeDiffer::new(repo).tree_diff(&old_tree, &new_tree, None)
}
