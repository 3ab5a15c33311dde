//! diff::text
//!
//! Line-level and character-level sequence comparison.
//!
//! Alignment runs over whitespace-stripped line keys (so reindentation
//! lines up), but the original content, whitespace included, is what gets
//! rendered. Replace blocks with matching line counts additionally get a
//! nested character diff so the renderer can emphasize the changed spans
//! within each aligned pair.

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, group_diff_ops, Algorithm, DiffOp};

/// Kind of one line record in a rendered diff.
///
/// `Elided` is the explicit marker separating change clusters whose
/// surrounding context windows do not touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Unmodified,
    Created,
    Deleted,
    Elided,
}

/// One record of a line diff.
///
/// Line numbers are 1-based; a `Deleted` record has no new number, a
/// `Created` record no old number, and an `Elided` marker has neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: LineKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line: Option<usize>,
    pub content: String,
    /// Byte ranges of `content` that changed within an aligned replace
    /// pair; empty unless the nested character diff ran
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emphasis: Vec<(usize, usize)>,
}

impl DiffLine {
    pub fn unmodified(old_line: usize, new_line: usize, content: &str) -> Self {
        Self {
            kind: LineKind::Unmodified,
            old_line: Some(old_line),
            new_line: Some(new_line),
            content: content.to_string(),
            emphasis: Vec::new(),
        }
    }

    pub fn created(new_line: usize, content: &str) -> Self {
        Self {
            kind: LineKind::Created,
            old_line: None,
            new_line: Some(new_line),
            content: content.to_string(),
            emphasis: Vec::new(),
        }
    }

    pub fn deleted(old_line: usize, content: &str) -> Self {
        Self {
            kind: LineKind::Deleted,
            old_line: Some(old_line),
            new_line: None,
            content: content.to_string(),
            emphasis: Vec::new(),
        }
    }

    pub fn elided() -> Self {
        Self {
            kind: LineKind::Elided,
            old_line: None,
            new_line: None,
            content: String::new(),
            emphasis: Vec::new(),
        }
    }
}

/// Line diff configuration.
///
/// `context` is the number of unchanged lines kept around each change in a
/// context diff; `ignore_whitespace` makes alignment (not display)
/// insensitive to interior whitespace.
#[derive(Debug, Clone)]
pub struct LineDiffer {
    pub context: usize,
    pub ignore_whitespace: bool,
}

impl Default for LineDiffer {
    fn default() -> Self {
        Self {
            context: 3,
            ignore_whitespace: true,
        }
    }
}

impl LineDiffer {
    /// Full diff: every line of both files appears in the output.
    pub fn full_diff<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> Vec<DiffLine> {
        let ops = self.align(old, new);
        let mut out = Vec::new();
        render_ops(&ops, old, new, &mut out);
        out
    }

    /// Context diff: only `context` unchanged lines are kept around each
    /// change; clusters further apart than twice that are separated by an
    /// [`LineKind::Elided`] marker.
    pub fn context_diff<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> Vec<DiffLine> {
        let ops = self.align(old, new);
        let mut out = Vec::new();
        for (index, group) in group_diff_ops(ops, self.context).into_iter().enumerate() {
            if index > 0 {
                out.push(DiffLine::elided());
            }
            render_ops(&group, old, new, &mut out);
        }
        out
    }

    /// LCS alignment over comparison keys.
    fn align<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> Vec<DiffOp> {
        let old_keys: Vec<String> = old.iter().map(|l| self.key(l.as_ref())).collect();
        let new_keys: Vec<String> = new.iter().map(|l| self.key(l.as_ref())).collect();
        capture_diff_slices(Algorithm::Myers, &old_keys, &new_keys)
    }

    fn key(&self, line: &str) -> String {
        if self.ignore_whitespace {
            line.split_whitespace().collect()
        } else {
            line.to_string()
        }
    }
}

/// Render aligned blocks into line records.
///
/// Equal blocks yield one unmodified record per pair; replace blocks yield
/// all old lines as deleted, then all new lines as created, with nested
/// character emphasis when the block's line counts match.
fn render_ops<S: AsRef<str>>(ops: &[DiffOp], old: &[S], new: &[S], out: &mut Vec<DiffLine>) {
    for op in ops {
        match *op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => {
                for i in 0..len {
                    out.push(DiffLine::unmodified(
                        old_index + i + 1,
                        new_index + i + 1,
                        old[old_index + i].as_ref(),
                    ));
                }
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                for i in 0..old_len {
                    out.push(DiffLine::deleted(
                        old_index + i + 1,
                        old[old_index + i].as_ref(),
                    ));
                }
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                for j in 0..new_len {
                    out.push(DiffLine::created(
                        new_index + j + 1,
                        new[new_index + j].as_ref(),
                    ));
                }
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                let paired = old_len == new_len;
                let mut deleted = Vec::with_capacity(old_len);
                let mut created = Vec::with_capacity(new_len);
                for i in 0..old_len {
                    deleted.push(DiffLine::deleted(
                        old_index + i + 1,
                        old[old_index + i].as_ref(),
                    ));
                }
                for j in 0..new_len {
                    created.push(DiffLine::created(
                        new_index + j + 1,
                        new[new_index + j].as_ref(),
                    ));
                }
                if paired {
                    for i in 0..old_len {
                        let (old_spans, new_spans) = char_emphasis(
                            old[old_index + i].as_ref(),
                            new[new_index + i].as_ref(),
                        );
                        deleted[i].emphasis = old_spans;
                        created[i].emphasis = new_spans;
                    }
                }
                out.extend(deleted);
                out.extend(created);
            }
        }
    }
}

/// Nested character diff of one aligned pair: byte spans that changed on
/// each side.
fn char_emphasis(old: &str, new: &str) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let mut old_spans = Vec::new();
    let mut new_spans = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old_chars, &new_chars) {
        match op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index, old_len, ..
            } => old_spans.push(char_span_to_bytes(old, old_index, old_len)),
            DiffOp::Insert {
                new_index, new_len, ..
            } => new_spans.push(char_span_to_bytes(new, new_index, new_len)),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                old_spans.push(char_span_to_bytes(old, old_index, old_len));
                new_spans.push(char_span_to_bytes(new, new_index, new_len));
            }
        }
    }
    (old_spans, new_spans)
}

fn char_span_to_bytes(s: &str, char_start: usize, char_len: usize) -> (usize, usize) {
    let mut start = s.len();
    let mut end = s.len();
    for (count, (byte_index, _)) in s.char_indices().enumerate() {
        if count == char_start {
            start = byte_index;
        }
        if count == char_start + char_len {
            end = byte_index;
            break;
        }
    }
    if char_len == 0 {
        end = start;
    }
    (start, end)
}

/// A whole-file creation: every line as a `Created` record, numbered from 1.
/// Skips the matcher entirely.
pub fn all_inserted<S: AsRef<str>>(lines: &[S]) -> Vec<DiffLine> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| DiffLine::created(index + 1, line.as_ref()))
        .collect()
}

/// A whole-file deletion: every line as a `Deleted` record, numbered from 1.
pub fn all_deleted<S: AsRef<str>>(lines: &[S]) -> Vec<DiffLine> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| DiffLine::deleted(index + 1, line.as_ref()))
        .collect()
}

/// Split decoded text into lines for diffing. Line terminators are not
/// part of the records.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(|line| line.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identical_files_are_all_unmodified() {
        let differ = LineDiffer::default();
        let text = lines(&["a", "b", "c"]);
        let records = differ.full_diff(&text, &text);
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.kind, LineKind::Unmodified);
            assert_eq!(record.old_line, Some(i + 1));
            assert_eq!(record.new_line, Some(i + 1));
        }
    }

    #[test]
    fn insert_in_middle() {
        let differ = LineDiffer::default();
        let old = lines(&["a", "c"]);
        let new = lines(&["a", "b", "c"]);
        let records = differ.full_diff(&old, &new);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].kind, LineKind::Created);
        assert_eq!(records[1].new_line, Some(2));
        assert_eq!(records[1].old_line, None);
        assert_eq!(records[2].kind, LineKind::Unmodified);
        assert_eq!(records[2].old_line, Some(2));
        assert_eq!(records[2].new_line, Some(3));
    }

    #[test]
    fn delete_reports_old_numbers_only() {
        let differ = LineDiffer::default();
        let old = lines(&["a", "b", "c"]);
        let new = lines(&["a", "c"]);
        let records = differ.full_diff(&old, &new);
        let deleted: Vec<_> = records
            .iter()
            .filter(|r| r.kind == LineKind::Deleted)
            .collect();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].old_line, Some(2));
        assert_eq!(deleted[0].new_line, None);
        assert_eq!(deleted[0].content, "b");
    }

    #[test]
    fn replace_emits_deletes_then_creates() {
        let differ = LineDiffer::default();
        let old = lines(&["shared", "old line"]);
        let new = lines(&["shared", "new line"]);
        let records = differ.full_diff(&old, &new);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].kind, LineKind::Deleted);
        assert_eq!(records[2].kind, LineKind::Created);
    }

    #[test]
    fn matched_replace_gets_char_emphasis() {
        let differ = LineDiffer::default();
        let old = lines(&["let x = 1;"]);
        let new = lines(&["let x = 2;"]);
        let records = differ.full_diff(&old, &new);
        assert_eq!(records.len(), 2);
        assert!(!records[0].emphasis.is_empty());
        assert!(!records[1].emphasis.is_empty());
        let (start, end) = records[0].emphasis[0];
        assert_eq!(&records[0].content[start..end], "1");
        let (start, end) = records[1].emphasis[0];
        assert_eq!(&records[1].content[start..end], "2");
    }

    #[test]
    fn whitespace_insensitive_alignment_displays_original() {
        let differ = LineDiffer::default();
        let old = lines(&["fn main() {}"]);
        let new = lines(&["fn  main( ) { }"]);
        let records = differ.full_diff(&old, &new);
        // Same key once whitespace is stripped, so one unmodified pair;
        // the displayed content is the original old line
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, LineKind::Unmodified);
        assert_eq!(records[0].content, "fn main() {}");
    }

    #[test]
    fn context_diff_elides_far_apart_clusters() {
        let differ = LineDiffer::default();
        let mut old_vec: Vec<String> = (1..=30).map(|i| format!("line {}", i)).collect();
        let mut new_vec = old_vec.clone();
        new_vec[0] = "changed first".to_string();
        new_vec[29] = "changed last".to_string();
        old_vec[0] = "original first".to_string();
        old_vec[29] = "original last".to_string();
        let records = differ.context_diff(&old_vec, &new_vec);
        let elided: Vec<_> = records
            .iter()
            .filter(|r| r.kind == LineKind::Elided)
            .collect();
        assert_eq!(elided.len(), 1);
        let unmodified = records
            .iter()
            .filter(|r| r.kind == LineKind::Unmodified)
            .count();
        // Only the context windows survive, 3 lines after the first change
        // and 3 before the last
        assert_eq!(unmodified, 6);
    }

    #[test]
    fn context_diff_of_identical_files_is_empty() {
        let differ = LineDiffer::default();
        let text = lines(&["a", "b", "c"]);
        assert!(differ.context_diff(&text, &text).is_empty());
    }

    #[test]
    fn all_inserted_numbers_from_one() {
        let records = all_inserted(&lines(&["x", "y", "z"]));
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].new_line, Some(1));
        assert_eq!(records[2].new_line, Some(3));
        assert!(records.iter().all(|r| r.kind == LineKind::Created));
        assert!(records.iter().all(|r| r.old_line.is_none()));
    }

    #[test]
    fn all_deleted_numbers_from_one() {
        let records = all_deleted(&lines(&["x", "y"]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].old_line, Some(1));
        assert_eq!(records[1].old_line, Some(2));
        assert!(records.iter().all(|r| r.kind == LineKind::Deleted));
    }

    #[test]
    fn split_lines_handles_crlf_and_trailing_newline() {
        assert_eq!(split_lines("a\r\nb\nc\n"), lines(&["a", "b", "c"]));
        assert_eq!(split_lines(""), Vec::<String>::new());
    }
}
