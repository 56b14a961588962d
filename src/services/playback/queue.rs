use super::types::{Track, TrackKey};

/// Ordered play queue with a current-index pointer.
///
/// The queue is only ever replaced wholesale (library or playlist switch);
/// individual tracks are never inserted or removed. Next/previous wrap
/// circularly.
#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    current: usize,
}

impl PlayQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire queue and resets the index to the start.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.current = 0;
    }

    /// Number of queued tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The current index; meaningful only when the queue is non-empty.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The track at the current index.
    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    /// All queued tracks in order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Moves the index to `index` if it is in bounds.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Finds the index of a track by identity.
    pub fn index_of(&self, key: &TrackKey) -> Option<usize> {
        self.tracks.iter().position(|t| t.key() == *key)
    }

    /// Advances circularly and returns the new current track.
    ///
    /// No-op returning None when the queue is empty.
    pub fn advance(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.tracks.len();
        self.tracks.get(self.current)
    }

    /// Retreats circularly and returns the new current track.
    ///
    /// No-op returning None when the queue is empty.
    pub fn retreat(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }
        self.current = (self.current + self.tracks.len() - 1) % self.tracks.len();
        self.tracks.get(self.current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn track(id: u64) -> Track {
        Track {
            id,
            title: format!("Track {id}"),
            artist: "Artist".into(),
            album: "Album".into(),
            album_art: String::new(),
            duration: Duration::from_secs(180),
            audio_url: None,
            catalog_uri: Some(format!("spotify:track:{id}")),
        }
    }

    fn queue_of(n: u64) -> PlayQueue {
        let mut queue = PlayQueue::new();
        queue.replace((0..n).map(track).collect());
        queue
    }

    #[test]
    fn advance_then_retreat_restores_index() {
        for len in 1usize..=5 {
            for start in 0..len {
                let mut queue = queue_of(len as u64);
                queue.set_current(start);
                queue.advance();
                queue.retreat();
                assert_eq!(queue.current_index(), start, "len={len} start={start}");
            }
        }
    }

    #[test]
    fn advancing_len_times_wraps_to_start() {
        for len in 1usize..=6 {
            for start in 0..len {
                let mut queue = queue_of(len as u64);
                queue.set_current(start);
                for _ in 0..len {
                    queue.advance();
                }
                assert_eq!(queue.current_index(), start);
            }
        }
    }

    #[test]
    fn empty_queue_operations_are_noops() {
        let mut queue = PlayQueue::new();
        assert!(queue.advance().is_none());
        assert!(queue.retreat().is_none());
        assert!(queue.current_track().is_none());
        assert!(!queue.set_current(0));
    }

    #[test]
    fn replace_resets_index() {
        let mut queue = queue_of(4);
        queue.set_current(3);
        queue.replace(vec![track(10), track(11)]);
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn index_of_matches_identity() {
        let queue = queue_of(3);
        assert_eq!(
            queue.index_of(&TrackKey::Catalog("spotify:track:2".into())),
            Some(2)
        );
        assert_eq!(
            queue.index_of(&TrackKey::Catalog("spotify:track:9".into())),
            None
        );
    }
}
