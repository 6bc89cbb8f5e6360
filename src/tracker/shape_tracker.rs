//! Main shape tracker: frame-by-frame association of candidates to tracks.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::tracker::candidate::DetectionCandidate;
use crate::tracker::store::TrackStore;
use crate::tracker::track::Track;

/// How a second candidate claiming an already matched track in the same
/// frame is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The first claim stands; the later candidate is dropped.
    #[default]
    KeepFirst,
    /// The later candidate skips claimed tracks and keeps scanning; it
    /// becomes a new track if nothing else qualifies.
    NextUnclaimed,
    /// The later candidate overwrites the track's observation for the frame.
    LastWins,
}

/// Configuration for the ShapeTracker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Centroid distance (pixels) below which a candidate may continue a track
    pub max_distance: f64,
    /// Normalized color distance below which a candidate may continue a track
    pub max_color_distance: f64,
    pub conflict_policy: ConflictPolicy,
    /// Archive tracks absent for more than this many consecutive frames.
    /// `None` keeps every track active for the whole session.
    pub archive_after: Option<usize>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            max_color_distance: 0.15,
            conflict_policy: ConflictPolicy::KeepFirst,
            archive_after: None,
        }
    }
}

/// What happened to the tracks during the last processed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Ids matched or created this frame, in candidate order
    pub seen: Vec<u64>,
    /// Pre-existing tracks that absorbed a candidate
    pub matched: Vec<u64>,
    /// Tracks created this frame
    pub created: Vec<u64>,
    /// Candidates dropped because their track was already claimed
    pub rejected: usize,
    /// Tracks moved to the archive at the end of the frame
    pub archived: Vec<u64>,
}

pub struct ShapeTracker {
    store: TrackStore,
    next_id: u64,
    last_frame: Option<u64>,
    report: FrameReport,
    config: TrackerConfig,
}

impl Default for ShapeTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl ShapeTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            store: TrackStore::new(),
            next_id: 1,
            last_frame: None,
            report: FrameReport::default(),
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Active tracks in creation order.
    pub fn tracks(&self) -> &[Track] {
        self.store.active()
    }

    pub fn archived(&self) -> &[Track] {
        self.store.archived()
    }

    pub fn track(&self, id: u64) -> Option<&Track> {
        self.store.get(id)
    }

    pub fn last_report(&self) -> &FrameReport {
        &self.report
    }

    /// Index of the last processed frame.
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    /// Start a new session: drops every track and restarts ids at 1.
    pub fn reset(&mut self) {
        self.store.clear();
        self.next_id = 1;
        self.last_frame = None;
        self.report = FrameReport::default();
    }

    /// Associate one frame of candidates with the tracks and return the
    /// full list of active tracks.
    ///
    /// Each candidate, in order, continues the first-created track it
    /// matches or becomes a new track. Every track not matched in this frame
    /// records an absence. Frame indices must increase; a frame at or
    /// before the last processed one is ignored and leaves an empty report.
    pub fn new_frame(&mut self, frame_index: u64, candidates: &[DetectionCandidate]) -> &[Track] {
        if let Some(last) = self.last_frame {
            if frame_index <= last {
                warn!(frame_index, last, "ignoring out-of-order frame");
                self.report = FrameReport {
                    frame_index,
                    ..FrameReport::default()
                };
                return self.store.active();
            }
        }

        let mut report = FrameReport {
            frame_index,
            ..FrameReport::default()
        };
        let mut claimed: HashSet<u64> = HashSet::new();

        for candidate in candidates {
            let skip = match self.config.conflict_policy {
                ConflictPolicy::NextUnclaimed => Some(&claimed),
                _ => None,
            };

            match self.find_match(candidate, skip) {
                Some(id) if claimed.contains(&id) => {
                    if self.config.conflict_policy == ConflictPolicy::LastWins {
                        if let Some(track) = self.store.get_mut(id) {
                            track.replace_latest(candidate);
                        }
                        trace!(id, frame_index, "track overwritten by later candidate");
                    } else {
                        report.rejected += 1;
                        debug!(id, frame_index, "dropping candidate for already claimed track");
                    }
                }
                Some(id) => {
                    if let Some(track) = self.store.get_mut(id) {
                        let streak = track.absent_streak();
                        track.update(candidate, frame_index);
                        if streak > 0 {
                            debug!(id, frame_index, absent_frames = streak, "track re-associated");
                        } else {
                            trace!(id, frame_index, "track matched");
                        }
                    }
                    claimed.insert(id);
                    report.seen.push(id);
                    report.matched.push(id);
                }
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.store.push(Track::new(id, candidate, frame_index));
                    debug!(id, frame_index, shape = ?candidate.shape_type(), "new track");
                    claimed.insert(id);
                    report.seen.push(id);
                    report.created.push(id);
                }
            }
        }

        for track in self.store.active_mut() {
            if !claimed.contains(&track.id()) {
                track.mark_absent(frame_index);
            }
        }

        if let Some(limit) = self.config.archive_after {
            report.archived = self.store.archive_where(|t| t.absent_streak() > limit);
            if !report.archived.is_empty() {
                debug!(ids = ?report.archived, frame_index, "archived stale tracks");
            }
        }

        self.last_frame = Some(frame_index);
        self.report = report;
        self.store.active()
    }

    /// First track, in creation order, that `candidate` may continue.
    fn find_match(
        &self,
        candidate: &DetectionCandidate,
        skip: Option<&HashSet<u64>>,
    ) -> Option<u64> {
        self.store
            .active()
            .iter()
            .filter(|t| skip.is_none_or(|s| !s.contains(&t.id())))
            .find(|t| {
                candidate.matches(t, self.config.max_distance, self.config.max_color_distance)
            })
            .map(Track::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::shape::Point;
    use image::Rgb;

    fn circle(x: i32, y: i32) -> DetectionCandidate {
        DetectionCandidate::circle(x, y, 30, Rgb([200, 40, 40]))
    }

    fn ids(tracks: &[Track]) -> Vec<u64> {
        tracks.iter().map(Track::id).collect()
    }

    #[test]
    fn test_empty_frames() {
        let mut tracker = ShapeTracker::default();
        assert!(tracker.new_frame(0, &[]).is_empty());
        assert_eq!(tracker.last_report().frame_index, 0);
    }

    #[test]
    fn test_first_match_wins_by_creation_order() {
        let mut tracker = ShapeTracker::default();
        tracker.new_frame(0, &[circle(100, 100), circle(250, 100)]);
        assert_eq!(tracker.last_report().created, vec![1, 2]);

        // Both tracks qualify; the first created one takes the candidate.
        tracker.new_frame(1, &[circle(175, 100)]);
        let report = tracker.last_report();
        assert_eq!(report.matched, vec![1]);
        assert!(tracker.track(2).is_some_and(|t| !t.is_seen_at(1)));
    }

    #[test]
    fn test_keep_first_rejects_second_claim() {
        let mut tracker = ShapeTracker::default();
        tracker.new_frame(0, &[circle(100, 100)]);
        let tracks = tracker.new_frame(1, &[circle(105, 100), circle(95, 100)]);

        assert_eq!(ids(tracks), vec![1]);
        assert_eq!(tracks[0].center(), Point::new(105, 100));
        assert_eq!(tracker.last_report().rejected, 1);
    }

    #[test]
    fn test_last_wins_overwrites_without_extra_entry() {
        let mut tracker = ShapeTracker::new(TrackerConfig {
            conflict_policy: ConflictPolicy::LastWins,
            ..TrackerConfig::default()
        });
        tracker.new_frame(0, &[circle(100, 100)]);
        let tracks = tracker.new_frame(1, &[circle(105, 100), circle(95, 100)]);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].center(), Point::new(95, 100));
        assert_eq!(tracks[0].history().len(), 2);
    }

    #[test]
    fn test_next_unclaimed_continues_scanning() {
        let mut tracker = ShapeTracker::new(TrackerConfig {
            conflict_policy: ConflictPolicy::NextUnclaimed,
            ..TrackerConfig::default()
        });
        tracker.new_frame(0, &[circle(100, 100), circle(160, 100)]);
        tracker.new_frame(1, &[circle(130, 100), circle(100, 100)]);

        let report = tracker.last_report();
        assert_eq!(report.matched, vec![1, 2]);
        assert!(report.created.is_empty());
    }

    #[test]
    fn test_track_created_this_frame_can_conflict() {
        let mut tracker = ShapeTracker::default();
        let tracks = tracker.new_frame(0, &[circle(100, 100), circle(110, 100)]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracker.last_report().rejected, 1);
    }

    #[test]
    fn test_out_of_order_frame_is_ignored() {
        let mut tracker = ShapeTracker::default();
        tracker.new_frame(5, &[circle(100, 100)]);
        let tracks = tracker.new_frame(5, &[circle(400, 400)]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].history().len(), 1);
        assert_eq!(tracker.last_frame(), Some(5));

        let report = tracker.last_report();
        assert_eq!(report.frame_index, 5);
        assert!(report.seen.is_empty() && report.matched.is_empty());
    }

    #[test]
    fn test_archive_after_absence() {
        let mut tracker = ShapeTracker::new(TrackerConfig {
            archive_after: Some(2),
            ..TrackerConfig::default()
        });
        tracker.new_frame(0, &[circle(100, 100)]);
        tracker.new_frame(1, &[]);
        tracker.new_frame(2, &[]);
        assert_eq!(tracker.tracks().len(), 1);

        tracker.new_frame(3, &[]);
        assert!(tracker.tracks().is_empty());
        assert_eq!(tracker.last_report().archived, vec![1]);
        assert_eq!(tracker.archived()[0].history().len(), 4);

        // Archived ids are never handed out again.
        let tracks = tracker.new_frame(4, &[circle(100, 100)]);
        assert_eq!(ids(tracks), vec![2]);
    }

    #[test]
    fn test_reset_restarts_ids() {
        let mut tracker = ShapeTracker::default();
        tracker.new_frame(0, &[circle(100, 100)]);
        tracker.reset();
        let tracks = tracker.new_frame(0, &[circle(500, 500)]);
        assert_eq!(ids(tracks), vec![1]);
    }

    #[test]
    fn test_config_from_json() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"max_distance": 50.0, "conflict_policy": "last_wins"}"#)
                .unwrap();
        assert_eq!(config.max_distance, 50.0);
        assert_eq!(config.max_color_distance, 0.15);
        assert_eq!(config.conflict_policy, ConflictPolicy::LastWins);
        assert_eq!(config.archive_after, None);
    }
}
