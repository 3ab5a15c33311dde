//! git::interface
//!
//! Git access layer implementation using git2.
//!
//! This module is the single doorway to the object store: commit walking,
//! ref resolution, and tree/blob reads all flow through [`Repo`], which
//! normalizes git2 errors into the typed categories the boundary layer maps
//! to responses (404 for missing objects, 400 for kind mismatches).
//!
//! All operations here are read-only, so a [`Repo`] per request against the
//! same repository path is safe; nothing in this crate shares mutable state
//! across invocations.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use thiserror::Error;

use crate::core::types::{Oid, TypeError};

/// Errors from Git operations.
///
/// The categories matter to the boundary layer: [`GitError::NotFound`] and
/// [`GitError::RefNotFound`] become client-facing "not found", while
/// [`GitError::TypeMismatch`] is a client error (asked to treat an object as
/// a kind it is not). None of these are fatal to the engines.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Requested object id does not resolve in the object store.
    #[error("object not found: {id}")]
    NotFound {
        /// The id that was not found
        id: String,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// An object resolved, but to the wrong kind for the requested
    /// operation (e.g. a tree where a blob was expected).
    #[error("object kind mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        /// The kind the caller required
        expected: &'static str,
        /// The kind actually found
        actual: &'static str,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::NotFound {
                id: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::NotFound {
                id: err.message().to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
        }
    }
}

/// Kind of a resolved object, for boundary dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectKind {
    pub fn description(&self) -> &'static str {
        match self {
            ObjectKind::Commit => "commit",
            ObjectKind::Tree => "tree",
            ObjectKind::Blob => "blob",
            ObjectKind::Tag => "tag",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Author or committer identity on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
}

/// An immutable commit read from the object store.
#[derive(Debug, Clone)]
pub struct Commit {
    /// The commit id
    pub id: Oid,
    /// Parent ids, in parent-list order (0 = root, 1 = normal, 2+ = merge)
    pub parents: Vec<Oid>,
    /// The tree snapshot this commit points at
    pub tree: Oid,
    /// First line of the commit message
    pub summary: String,
    /// Full commit message
    pub message: String,
    /// Author identity
    pub author: Signature,
    /// Committer identity
    pub committer: Signature,
    /// Commit (committer) timestamp
    pub time: DateTime<Utc>,
}

impl Commit {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() >= 2
    }
}

/// Kind of a tree entry.
///
/// `Reference` covers entries that do not resolve to a local object,
/// typically submodule (gitlink) entries pointing into another repository.
/// That is a representable state, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Tree,
    Blob,
    Reference,
}

/// A named entry in a tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Entry name (unique within its tree)
    pub name: String,
    /// Content id of the entry
    pub id: Oid,
    /// What the entry points at
    pub kind: EntryKind,
}

/// An immutable, ordered tree snapshot.
#[derive(Debug, Clone)]
pub struct Tree {
    /// The tree's own id
    pub id: Oid,
    /// Entries in the order git2 yields them
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// An empty tree (used to diff root commits).
    pub fn empty() -> Self {
        Self {
            id: Oid::zero(),
            entries: Vec::new(),
        }
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// The Git access layer.
///
/// Wraps a `git2::Repository` and exposes only the read operations the
/// layout and diff engines need. Bare repositories are accepted; graph
/// servers commonly point at bare mirrors.
pub struct Repo {
    repo: git2::Repository,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Repo {
    // =========================================================================
    // Opening and Refs
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository (or the repository directory itself for bare
    /// repos).
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        debug!("opened repository at {:?}", repo.path());
        Ok(Self { repo })
    }

    /// Resolve a ref name (`HEAD`, `refs/heads/...`, `refs/tags/...`,
    /// `refs/remotes/...`) to the commit it ultimately points at.
    ///
    /// Symbolic refs are resolved and annotated tags are peeled until a
    /// commit is reached.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the ref does not exist
    /// - [`GitError::TypeMismatch`] if the ref peels to a non-commit
    pub fn resolve_ref(&self, name: &str) -> Result<Oid, GitError> {
        let reference = self
            .repo
            .find_reference(name)
            .map_err(|_| GitError::RefNotFound {
                refname: name.to_string(),
            })?;
        let resolved = reference.resolve().map_err(|_| GitError::RefNotFound {
            refname: name.to_string(),
        })?;
        let commit = resolved
            .peel_to_commit()
            .map_err(|_| GitError::TypeMismatch {
                expected: "commit",
                actual: "other",
            })?;
        Ok(commit.id().into())
    }

    /// Resolve `HEAD`.
    pub fn head(&self) -> Result<Oid, GitError> {
        self.resolve_ref("HEAD")
    }

    /// Resolve a unique hex prefix to a commit id, if it names one.
    ///
    /// Ambiguous or unknown prefixes, and prefixes naming non-commits,
    /// resolve to `None` rather than an error (autocompletion support).
    pub fn find_commit_by_prefix(&self, prefix: &str) -> Option<Oid> {
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let obj = self.repo.revparse_single(prefix).ok()?;
        obj.as_commit().map(|c| c.id().into())
    }

    // =========================================================================
    // Object Reads
    // =========================================================================

    /// Determine the kind of an object without materializing it.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotFound`] if the id does not resolve
    pub fn object_kind(&self, id: &Oid) -> Result<ObjectKind, GitError> {
        let obj = self.find_object(id)?;
        match obj.kind() {
            Some(git2::ObjectType::Commit) => Ok(ObjectKind::Commit),
            Some(git2::ObjectType::Tree) => Ok(ObjectKind::Tree),
            Some(git2::ObjectType::Blob) => Ok(ObjectKind::Blob),
            Some(git2::ObjectType::Tag) => Ok(ObjectKind::Tag),
            _ => Err(GitError::NotFound {
                id: id.to_string(),
            }),
        }
    }

    /// Read a commit by id.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotFound`] if the id does not resolve
    /// - [`GitError::TypeMismatch`] if it resolves to a non-commit
    pub fn find_commit(&self, id: &Oid) -> Result<Commit, GitError> {
        let obj = self.find_object(id)?;
        match obj.as_commit() {
            Some(commit) => Ok(convert_commit(commit)),
            None => Err(self.mismatch("commit", &obj)),
        }
    }

    /// Read a tree snapshot by id.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotFound`] if the id does not resolve
    /// - [`GitError::TypeMismatch`] if it resolves to a non-tree
    pub fn find_tree(&self, id: &Oid) -> Result<Tree, GitError> {
        let obj = self.find_object(id)?;
        match obj.as_tree() {
            Some(tree) => Ok(convert_tree(tree)),
            None => Err(self.mismatch("tree", &obj)),
        }
    }

    /// Read a blob's raw bytes by id.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotFound`] if the id does not resolve
    /// - [`GitError::TypeMismatch`] if it resolves to a non-blob
    pub fn blob_bytes(&self, id: &Oid) -> Result<Vec<u8>, GitError> {
        let obj = self.find_object(id)?;
        match obj.as_blob() {
            Some(blob) => Ok(blob.content().to_vec()),
            None => Err(self.mismatch("blob", &obj)),
        }
    }

    fn find_object(&self, id: &Oid) -> Result<git2::Object<'_>, GitError> {
        let raw = git2::Oid::from_str(id.as_str()).map_err(|_| GitError::InvalidOid {
            oid: id.to_string(),
        })?;
        self.repo
            .find_object(raw, None)
            .map_err(|e| GitError::from_git2(e, id.as_str()))
    }

    fn mismatch(&self, expected: &'static str, obj: &git2::Object<'_>) -> GitError {
        GitError::TypeMismatch {
            expected,
            actual: match obj.kind() {
                Some(git2::ObjectType::Commit) => "commit",
                Some(git2::ObjectType::Tree) => "tree",
                Some(git2::ObjectType::Blob) => "blob",
                Some(git2::ObjectType::Tag) => "tag",
                _ => "unknown",
            },
        }
    }

    // =========================================================================
    // History Walking
    // =========================================================================

    /// Start a lazy, time-ordered walk of history from `head`.
    ///
    /// Commits come out newest-first (`GIT_SORT_TIME`), the ordering the
    /// layout engine expects: each commit's parents appear later in the
    /// sequence, clock skew tolerated. The walk materializes nothing;
    /// callers bound it with `skip`/`take` for pagination and simply stop
    /// pulling to cancel.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotFound`] if `head` does not resolve to a commit
    pub fn walk(&self, head: &Oid) -> Result<Walk<'_>, GitError> {
        // Fail fast on a bad head rather than on the first pull
        let commit = self.find_commit(head)?;
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TIME)?;
        revwalk
            .push(git2::Oid::from_str(commit.id.as_str()).map_err(|_| {
                GitError::InvalidOid {
                    oid: commit.id.to_string(),
                }
            })?)
            .map_err(|e| GitError::from_git2(e, commit.id.as_str()))?;
        debug!("starting walk from {}", commit.id.short(7));
        Ok(Walk {
            repo: &self.repo,
            inner: revwalk,
        })
    }
}

/// A lazy iterator over commits in time order.
///
/// Forward-only; restart by calling [`Repo::walk`] again.
pub struct Walk<'repo> {
    repo: &'repo git2::Repository,
    inner: git2::Revwalk<'repo>,
}

impl<'repo> Iterator for Walk<'repo> {
    type Item = Result<Commit, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = match self.inner.next()? {
            Ok(oid) => oid,
            Err(e) => return Some(Err(GitError::from_git2(e, "revwalk"))),
        };
        Some(
            self.repo
                .find_commit(oid)
                .map(|c| convert_commit(&c))
                .map_err(|e| GitError::from_git2(e, &oid.to_string())),
        )
    }
}

fn convert_signature(sig: &git2::Signature<'_>) -> Signature {
    Signature {
        name: String::from_utf8_lossy(sig.name_bytes()).into_owned(),
        email: String::from_utf8_lossy(sig.email_bytes()).into_owned(),
    }
}

fn convert_commit(commit: &git2::Commit<'_>) -> Commit {
    // Commit messages carry no declared encoding; decode lossily
    let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();
    let summary = message.lines().next().unwrap_or("").to_string();
    let time = DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0).unwrap_or_default();
    Commit {
        id: commit.id().into(),
        parents: commit.parent_ids().map(Oid::from).collect(),
        tree: commit.tree_id().into(),
        summary,
        message,
        author: convert_signature(&commit.author()),
        committer: convert_signature(&commit.committer()),
        time,
    }
}

fn convert_tree(tree: &git2::Tree<'_>) -> Tree {
    let entries = tree
        .iter()
        .map(|entry| TreeEntry {
            name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
            id: entry.id().into(),
            kind: match entry.kind() {
                Some(git2::ObjectType::Tree) => EntryKind::Tree,
                Some(git2::ObjectType::Blob) => EntryKind::Blob,
                // Gitlink (submodule) entries point outside this store
                _ => EntryKind::Reference,
            },
        })
        .collect();
    Tree {
        id: tree.id().into(),
        entries,
    }
}
