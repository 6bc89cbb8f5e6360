//! Arena of tracks in creation order, indexed by id, with a cold archive.

use std::collections::HashMap;

use crate::tracker::track::Track;

#[derive(Debug, Clone, Default)]
pub struct TrackStore {
    active: Vec<Track>,
    index: HashMap<u64, usize>,
    archived: Vec<Track>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active tracks, first-created first.
    pub fn active(&self) -> &[Track] {
        &self.active
    }

    pub(crate) fn active_mut(&mut self) -> &mut [Track] {
        &mut self.active
    }

    /// Tracks moved out of the active set, in archival order.
    pub fn archived(&self) -> &[Track] {
        &self.archived
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Look up an active track by id.
    pub fn get(&self, id: u64) -> Option<&Track> {
        self.index.get(&id).map(|&slot| &self.active[slot])
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Option<&mut Track> {
        let slot = *self.index.get(&id)?;
        self.active.get_mut(slot)
    }

    pub(crate) fn push(&mut self, track: Track) {
        self.index.insert(track.id(), self.active.len());
        self.active.push(track);
    }

    /// Move every active track selected by `evict` into the archive and
    /// return their ids. Creation order of the remaining tracks is kept.
    pub(crate) fn archive_where<F>(&mut self, mut evict: F) -> Vec<u64>
    where
        F: FnMut(&Track) -> bool,
    {
        if !self.active.iter().any(&mut evict) {
            return Vec::new();
        }

        let mut evicted = Vec::new();
        let (cold, hot): (Vec<Track>, Vec<Track>) = self.active.drain(..).partition(|t| evict(t));
        for track in cold {
            evicted.push(track.id());
            self.archived.push(track);
        }
        self.active = hot;
        self.reindex();
        evicted
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
        self.index.clear();
        self.archived.clear();
    }

    fn reindex(&mut self) {
        self.index = self
            .active
            .iter()
            .enumerate()
            .map(|(slot, t)| (t.id(), slot))
            .collect();
    }
}
