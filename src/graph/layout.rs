//! graph::layout
//!
//! Branch-lane assignment and edge routing for the commit graph.
//!
//! The algorithm consumes a time-ordered commit sequence (newest first, so
//! parents follow children) and assigns each commit a lane column, routing
//! edges toward parents as it goes. All state lives in a per-invocation
//! [`GraphLayout`]; nothing is shared between requests, and a page boundary
//! is crossed by threading the returned lane table into the next call.
//!
//! Lane table semantics: a `Some(oid)` slot means that commit is expected
//! next in that column; a `None` slot is vacant and gets reused,
//! lowest-index first, when a merge fans out. UI column stability depends
//! on that reuse policy.

use log::debug;

use crate::core::types::{format_commit_time, short_message, Oid};
use crate::git::{Commit, GitError, Repo};

use super::display::{color_for, DisplayList, Edge, Label, Lane, Node, Segment};

/// An in-progress edge, keyed by the parent commit it is waiting to reach.
struct OpenEdge {
    /// The awaited parent; the edge closes when this commit is processed
    parent: Oid,
    /// Row at which the edge began (final display ordering key)
    order: usize,
    /// Palette bucket
    color: usize,
    /// Accumulated drawing instructions
    path: Vec<Segment>,
}

impl OpenEdge {
    /// Open an edge at `column`/`row`, colored by `color_column`.
    ///
    /// Diagonal connectors take the destination column's bucket rather
    /// than the origin's, so a merge line visually matches the branch it
    /// joins; for straight edges the two coincide.
    fn new(column: usize, row: usize, parent: Oid, color_column: usize) -> Self {
        Self {
            parent,
            order: row,
            color: color_for(color_column),
            path: vec![Segment::Move { x: column, y: row }],
        }
    }

    fn finish(self) -> Edge {
        Edge {
            order: self.order,
            color: self.color,
            path: self.path,
        }
    }
}

/// State threaded through a single layout invocation.
struct GraphLayout {
    lanes: Vec<Lane>,
    open: Vec<OpenEdge>,
    display: DisplayList,
}

impl GraphLayout {
    /// Seed a layout from the lane table a previous page returned.
    ///
    /// Each occupied slot re-opens an edge at its column so lines continue
    /// across the page boundary without a visual break.
    fn seeded(existing_lanes: &[Lane], start_row: usize) -> Self {
        let mut layout = Self {
            lanes: Vec::with_capacity(existing_lanes.len()),
            open: Vec::new(),
            display: DisplayList::default(),
        };
        for (column, lane) in existing_lanes.iter().enumerate() {
            if let Some(parent) = lane {
                layout
                    .open
                    .push(OpenEdge::new(column, start_row, parent.clone(), column));
            }
            layout.lanes.push(lane.clone());
        }
        layout
    }

    /// Process one commit at `row`.
    fn step(&mut self, commit: &Commit, row: usize) {
        let pos = self.resolve_lane(commit);

        self.close_or_extend_edges(&commit.id, pos, row);

        // A root commit terminates its branch: the slot is deleted outright
        // and future lane count shrinks. Otherwise fan out to parents and
        // note whether this lane should be cleared.
        let clear = if commit.parents.is_empty() {
            self.lanes.remove(pos);
            false
        } else {
            self.fan_out(commit, pos, row)
        };

        // Label column comes from the pre-clear lane table; clearing must
        // not pull the label left on its own row.
        let label_column = self.label_column();
        if clear {
            self.lanes[pos] = None;
        }

        self.display.nodes.push(Node {
            x: pos,
            y: row,
            id: commit.id.clone(),
            parents: commit.parents.clone(),
            color: color_for(pos),
        });
        self.display.labels.push(Label {
            x: label_column,
            y: row,
            id: commit.id.clone(),
            message: short_message(&commit.message),
            author: commit.author.name.clone(),
            date: format_commit_time(&commit.time),
        });
    }

    /// Step 1: find the commit's lane, or start a brand-new one.
    ///
    /// A commit already predicted as somebody's parent sits in a lane.
    /// Anything else (first commit seen, or orphaned relative to the
    /// window) appends a fresh slot. The edge toward its first parent is
    /// opened by the fan-out step, exactly once per boundary.
    fn resolve_lane(&mut self, commit: &Commit) -> usize {
        if let Some(pos) = self.lane_of(&commit.id) {
            return pos;
        }
        let pos = self.lanes.len();
        debug!("commit {} starts new lane {}", commit.id.short(7), pos);
        self.lanes.push(Some(commit.id.clone()));
        pos
    }

    /// Step 2: close every open edge awaiting this commit; extend the rest
    /// by one row.
    fn close_or_extend_edges(&mut self, id: &Oid, column: usize, row: usize) {
        let mut still_open = Vec::with_capacity(self.open.len());
        for mut edge in self.open.drain(..) {
            if edge.parent == *id {
                edge.path.push(Segment::Line { x: column, y: row });
                self.display.edges.push(edge.finish());
            } else {
                edge.path.push(Segment::Down { dy: 1 });
                still_open.push(edge);
            }
        }
        self.open = still_open;
    }

    /// Step 3: route edges to each parent, in parent-list order.
    ///
    /// The first parent not yet in a lane inherits this commit's lane,
    /// keeping the main line of a branch straight. Later unplaced parents
    /// (merge sources) take the lowest vacant slot, or a new one, with a
    /// diagonal connector. A parent already in a lane gets an immediate
    /// finished connector into that lane; its own chain of edges continues
    /// independently.
    ///
    /// Returns true when no parent was newly placed, which marks this lane
    /// for clearing (its real parent already lives elsewhere).
    fn fan_out(&mut self, commit: &Commit, x: usize, row: usize) -> bool {
        let mut placed_first = false;
        let mut any_new = false;
        for parent in &commit.parents {
            match self.lane_of(parent) {
                Some(other) => {
                    let mut edge = OpenEdge::new(x, row, parent.clone(), other);
                    edge.path.push(Segment::slant(x, other));
                    self.display.edges.push(edge.finish());
                }
                None => {
                    any_new = true;
                    if !placed_first {
                        self.lanes[x] = Some(parent.clone());
                        self.open.push(OpenEdge::new(x, row, parent.clone(), x));
                        placed_first = true;
                    } else {
                        let column = self.claim_lane(parent);
                        let mut edge = OpenEdge::new(x, row, parent.clone(), column);
                        edge.path.push(Segment::slant(x, column));
                        self.open.push(edge);
                    }
                }
            }
        }
        !any_new
    }

    /// Place a merge-source parent into the lowest vacant slot, appending a
    /// new one only when none is vacant.
    fn claim_lane(&mut self, parent: &Oid) -> usize {
        match self.lanes.iter().position(|lane| lane.is_none()) {
            Some(column) => {
                self.lanes[column] = Some(parent.clone());
                column
            }
            None => {
                self.lanes.push(Some(parent.clone()));
                self.lanes.len() - 1
            }
        }
    }

    /// Step 4: column for the row's text, just right of the used lanes.
    ///
    /// Trailing vacant slots are compacted away; floored at 1 so the text
    /// never overlaps column 0.
    fn label_column(&self) -> usize {
        let mut column = self.lanes.len();
        for lane in self.lanes.iter().rev() {
            if lane.is_none() {
                column -= 1;
            } else {
                break;
            }
        }
        column.max(1)
    }

    fn lane_of(&self, id: &Oid) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.as_ref() == Some(id))
    }

    /// Step 6: terminate still-open edges at the page boundary and order
    /// the finished output.
    fn finish(mut self, final_row: usize) -> (DisplayList, Vec<Lane>) {
        for mut edge in self.open.drain(..) {
            edge.path.push(Segment::End { y: final_row });
            self.display.edges.push(edge.finish());
        }
        // Stable: edges opened on the same row keep insertion order
        self.display.edges.sort_by_key(|edge| edge.order);
        (self.display, self.lanes)
    }
}

/// Lay out a sequence of commits.
///
/// `commits` must be time-ordered, newest first; parents appear later in
/// the sequence or not at all if outside the window. `existing_lanes`
/// continues a previous page (vacant slots stay vacant), and `start_row`
/// offsets all row coordinates so pages align.
///
/// Returns the display list and the lane table to resume from.
pub fn draw(
    commits: impl IntoIterator<Item = Commit>,
    existing_lanes: &[Lane],
    start_row: usize,
) -> (DisplayList, Vec<Lane>) {
    let mut layout = GraphLayout::seeded(existing_lanes, start_row);
    let mut row = start_row;
    for commit in commits {
        layout.step(&commit, row);
        row += 1;
    }
    layout.finish(row)
}

/// Lay out one page of history: commits `offset..offset + limit` of a lazy
/// walk from `head`, resuming from `resume` lanes.
///
/// Pulls exactly as many commits as the page needs; history is never
/// materialized beyond that.
pub fn paged(
    repo: &Repo,
    head: &Oid,
    offset: usize,
    limit: usize,
    resume: &[Lane],
) -> Result<(DisplayList, Vec<Lane>), GitError> {
    let mut commits = Vec::with_capacity(limit);
    for item in repo.walk(head)?.skip(offset).take(limit) {
        commits.push(item?);
    }
    debug!(
        "laying out {} commits starting at row {}",
        commits.len(),
        offset
    );
    Ok(draw(commits, resume, offset))
}

/// Find the walk index of `target` in the history of `head`, scanning from
/// `offset` onward. `None` when the commit is not reachable.
///
/// Used by the boundary to grow a page until a searched-for commit is
/// visible.
pub fn locate(
    repo: &Repo,
    head: &Oid,
    target: &Oid,
    offset: usize,
) -> Result<Option<usize>, GitError> {
    for (index, item) in repo.walk(head)?.enumerate().skip(offset) {
        if item?.id == *target {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(tag: char) -> Oid {
        Oid::new(tag.to_string().repeat(40)).unwrap()
    }

    fn lane(tag: char) -> Lane {
        Some(oid(tag))
    }

    #[test]
    fn label_column_compacts_trailing_vacant_slots() {
        let layout = GraphLayout::seeded(&[lane('a'), None, lane('b'), None, None], 0);
        assert_eq!(layout.label_column(), 3);
    }

    #[test]
    fn label_column_floors_at_one() {
        let layout = GraphLayout::seeded(&[], 0);
        assert_eq!(layout.label_column(), 1);
        let layout = GraphLayout::seeded(&[None, None], 0);
        assert_eq!(layout.label_column(), 1);
    }

    #[test]
    fn claim_lane_prefers_lowest_vacant_slot() {
        let mut layout = GraphLayout::seeded(&[lane('a'), None, lane('b'), None], 0);
        assert_eq!(layout.claim_lane(&oid('c')), 1);
        assert_eq!(layout.claim_lane(&oid('d')), 3);
        // All full now, so the next claim appends
        assert_eq!(layout.claim_lane(&oid('e')), 4);
        assert_eq!(layout.lanes.len(), 5);
    }

    #[test]
    fn seeding_opens_one_edge_per_occupied_lane() {
        let layout = GraphLayout::seeded(&[lane('a'), None, lane('b')], 5);
        assert_eq!(layout.open.len(), 2);
        assert_eq!(layout.lanes.len(), 3);
        assert_eq!(layout.open[0].path, vec![Segment::Move { x: 0, y: 5 }]);
        assert_eq!(layout.open[1].path, vec![Segment::Move { x: 2, y: 5 }]);
    }
}
