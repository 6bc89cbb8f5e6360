//! Persisted identity of one physical shape.

use crate::tracker::candidate::DetectionCandidate;
use crate::tracker::history::HistoryEntry;
use crate::tracker::shape::{Bounding, Color, Point, ShapeType};

/// Single shape track.
///
/// `bounding`, `center` and `color` always mirror the most recent matched
/// candidate. `history` holds exactly one entry per frame since creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    id: u64,
    shape_type: ShapeType,
    bounding: Bounding,
    center: Point,
    color: Color,
    history: Vec<HistoryEntry>,
}

impl Track {
    /// Create a track from the candidate that first revealed it.
    pub fn new(id: u64, candidate: &DetectionCandidate, frame_index: u64) -> Self {
        Self {
            id,
            shape_type: candidate.shape_type(),
            bounding: candidate.bounding,
            center: candidate.center,
            color: candidate.color,
            history: vec![HistoryEntry::present(frame_index, candidate.center)],
        }
    }

    /// Unique track identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn bounding(&self) -> Bounding {
        self.bounding
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Frame in which the track was created.
    pub fn first_frame(&self) -> u64 {
        self.history[0].frame_index
    }

    /// Latest frame recorded in the history.
    pub fn last_frame(&self) -> u64 {
        self.history[self.history.len() - 1].frame_index
    }

    /// Center of the most recent frame in which the track was matched.
    pub fn last_valid_center(&self) -> Option<Point> {
        self.history.iter().rev().find_map(|e| e.point)
    }

    /// Number of trailing absent frames.
    pub fn absent_streak(&self) -> usize {
        self.history.iter().rev().take_while(|e| e.is_absent()).count()
    }

    /// Whether the track was matched in `frame_index`.
    pub fn is_seen_at(&self, frame_index: u64) -> bool {
        self.entry_at(frame_index).is_some_and(|e| !e.is_absent())
    }

    pub fn entry_at(&self, frame_index: u64) -> Option<&HistoryEntry> {
        let offset = frame_index.checked_sub(self.first_frame())?;
        self.history.get(usize::try_from(offset).ok()?)
    }

    /// Absorb a matched candidate as the observation for `frame_index`.
    pub(crate) fn update(&mut self, candidate: &DetectionCandidate, frame_index: u64) {
        self.pad_to(frame_index);
        self.take_geometry(candidate);
        self.history
            .push(HistoryEntry::present(frame_index, candidate.center));
    }

    /// Overwrite the observation already recorded for the latest frame.
    pub(crate) fn replace_latest(&mut self, candidate: &DetectionCandidate) {
        self.take_geometry(candidate);
        if let Some(last) = self.history.last_mut() {
            last.point = Some(candidate.center);
        }
    }

    pub(crate) fn mark_absent(&mut self, frame_index: u64) {
        self.pad_to(frame_index);
        self.history.push(HistoryEntry::absent(frame_index));
    }

    fn take_geometry(&mut self, candidate: &DetectionCandidate) {
        self.bounding = candidate.bounding;
        self.center = candidate.center;
        self.color = candidate.color;
    }

    /// Fill skipped frame indices with absences so the history has no gaps.
    fn pad_to(&mut self, frame_index: u64) {
        let mut next = self.last_frame() + 1;
        while next < frame_index {
            self.history.push(HistoryEntry::absent(next));
            next += 1;
        }
    }
}
