//! Per-track position history and its segmentation into drawable runs.

use crate::tracker::shape::Point;

/// Number of consecutive absent frames bridged inside one segment.
pub const DEFAULT_GAP_THRESHOLD: usize = 10;

/// One frame of a track's history. `point` is `None` when the track was
/// not matched in that frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub frame_index: u64,
    pub point: Option<Point>,
}

impl HistoryEntry {
    #[inline]
    pub fn present(frame_index: u64, point: Point) -> Self {
        Self {
            frame_index,
            point: Some(point),
        }
    }

    #[inline]
    pub fn absent(frame_index: u64) -> Self {
        Self {
            frame_index,
            point: None,
        }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        self.point.is_none()
    }
}

/// Contiguous run of a track's history between two long absence gaps.
///
/// The run always starts and ends on a valid point. Absences shorter than
/// the gap threshold stay inside the run and are bridged when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySegment<'a> {
    entries: &'a [HistoryEntry],
}

impl<'a> HistorySegment<'a> {
    /// Raw entries of the run, absences included.
    pub fn entries(&self) -> &'a [HistoryEntry] {
        self.entries
    }

    /// Valid points of the run, in frame order.
    pub fn points(&self) -> impl Iterator<Item = Point> + 'a {
        self.entries.iter().filter_map(|e| e.point)
    }

    pub fn point_count(&self) -> usize {
        self.points().count()
    }

    pub fn first_point(&self) -> Option<Point> {
        self.points().next()
    }

    pub fn first_frame(&self) -> u64 {
        self.entries.first().map_or(0, |e| e.frame_index)
    }

    pub fn last_frame(&self) -> u64 {
        self.entries.last().map_or(0, |e| e.frame_index)
    }

    /// Segments with fewer than two points carry no line.
    pub fn is_drawable(&self) -> bool {
        self.points().nth(1).is_some()
    }

    /// Line pieces connecting consecutive entries of the run.
    ///
    /// An absent endpoint is replaced by the nearest valid point before
    /// (for the start) or after (for the end) it, so short misses do not
    /// break the line. Repeated pieces produced by the substitution are
    /// emitted once.
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let mut edges: Vec<(Point, Point)> = Vec::new();
        for i in 1..self.entries.len() {
            let start = self.entries[i - 1]
                .point
                .or_else(|| previous_valid_point(self.entries, i - 1));
            let end = self.entries[i]
                .point
                .or_else(|| next_valid_point(self.entries, i));

            if let (Some(start), Some(end)) = (start, end) {
                if edges.last() != Some(&(start, end)) {
                    edges.push((start, end));
                }
            }
        }
        edges
    }
}

/// Nearest valid point at or before `index`.
pub fn previous_valid_point(entries: &[HistoryEntry], index: usize) -> Option<Point> {
    entries
        .get(..=index)?
        .iter()
        .rev()
        .find_map(|e| e.point)
}

/// Nearest valid point strictly after `index`.
pub fn next_valid_point(entries: &[HistoryEntry], index: usize) -> Option<Point> {
    entries.get(index + 1..)?.iter().find_map(|e| e.point)
}

/// Split a history into segments using [`DEFAULT_GAP_THRESHOLD`].
pub fn split_history(history: &[HistoryEntry]) -> Vec<HistorySegment<'_>> {
    split_history_with(history, DEFAULT_GAP_THRESHOLD)
}

/// Split a history into segments.
///
/// A run of more than `gap_threshold` consecutive absences closes the
/// current segment; the next valid point opens a new one. Leading and
/// trailing absences never belong to a segment.
pub fn split_history_with(
    history: &[HistoryEntry],
    gap_threshold: usize,
) -> Vec<HistorySegment<'_>> {
    let mut segments = Vec::new();
    let mut start: Option<usize> = None;
    let mut last_valid = 0;
    let mut absent_run = 0;

    for (i, entry) in history.iter().enumerate() {
        if entry.is_absent() {
            absent_run += 1;
            continue;
        }

        if absent_run > gap_threshold {
            if let Some(s) = start.take() {
                segments.push(HistorySegment {
                    entries: &history[s..=last_valid],
                });
            }
        }
        if start.is_none() {
            start = Some(i);
        }
        last_valid = i;
        absent_run = 0;
    }

    if let Some(s) = start {
        segments.push(HistorySegment {
            entries: &history[s..=last_valid],
        });
    }

    segments
}
