//! Episode journal: the ordered log of recorded seizures and events.
//!
//! Newest episode first. Every mutation writes the full list back to the
//! key-value sink under `epifriend_episodes`.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::EPISODES_KEY;
use crate::db::{self, KeyValueStore};
use crate::models::{Episode, EpisodePatch, NewEpisode};

pub struct EpisodeStore {
    sink: Arc<dyn KeyValueStore>,
    episodes: Vec<Episode>,
}

impl EpisodeStore {
    /// Loads the stored journal. Unreadable data starts an empty journal.
    pub fn load(sink: Arc<dyn KeyValueStore>) -> Self {
        let episodes: Vec<Episode> = db::load_json_list(sink.as_ref(), EPISODES_KEY);
        tracing::debug!(count = episodes.len(), "Loaded episodes");
        Self { sink, episodes }
    }

    /// Records a new episode at the front of the journal. Returns its id.
    pub fn add(&mut self, episode: NewEpisode) -> Uuid {
        let id = Uuid::new_v4();
        self.episodes.insert(0, episode.into_episode(id, Utc::now()));
        self.persist();
        tracing::info!(%id, "Episode recorded");
        id
    }

    /// Merges `patch` into the episode with `id`.
    /// Returns false, without writing, if no such episode exists.
    pub fn update(&mut self, id: Uuid, patch: EpisodePatch) -> bool {
        let Some(episode) = self.episodes.iter_mut().find(|e| e.id == id) else {
            tracing::debug!(%id, "Episode update for unknown id ignored");
            return false;
        };
        patch.apply(episode);
        self.persist();
        true
    }

    /// The `limit` most recent episodes.
    pub fn recent(&self, limit: usize) -> &[Episode] {
        &self.episodes[..limit.min(self.episodes.len())]
    }

    pub fn all(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn get(&self, id: Uuid) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    fn persist(&self) {
        db::save_json(self.sink.as_ref(), EPISODES_KEY, &self.episodes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use chrono::{DateTime, TimeZone};

    use crate::config::DEFAULT_RECENT_LIMIT;
    use crate::db::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, EpisodeStore) {
        let sink = Arc::new(MemoryStore::new());
        let store = EpisodeStore::load(sink.clone());
        (sink, store)
    }

    #[test]
    fn add_then_recent_returns_new_episode() {
        let (_, mut store) = setup();
        store.add(NewEpisode::of_type("general"));

        let recent = store.recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].episode_type, "general");
        let rendered = recent[0].timestamp.to_rfc3339();
        assert!(DateTime::parse_from_rfc3339(&rendered).is_ok());
    }

    #[test]
    fn add_keeps_newest_first_with_unique_ids() {
        let (_, mut store) = setup();
        let ids: Vec<Uuid> = (0..10)
            .map(|i| store.add(NewEpisode::of_type(format!("type_{i}"))))
            .collect();

        let stored: Vec<Uuid> = store.all().iter().map(|e| e.id).collect();
        let mut expected = ids.clone();
        expected.reverse();
        assert_eq!(stored, expected);

        let unique: HashSet<Uuid> = ids.into_iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn add_honours_supplied_timestamp() {
        let (_, mut store) = setup();
        let when = Utc.with_ymd_and_hms(2024, 2, 10, 14, 0, 0).unwrap();
        let id = store.add(NewEpisode {
            timestamp: Some(when),
            ..NewEpisode::default()
        });
        let ep = store.get(id).unwrap();
        assert_eq!(ep.timestamp, when);
        assert_eq!(ep.episode_type, "general");
    }

    #[test]
    fn recent_defaults_and_clamps() {
        let (_, mut store) = setup();
        for _ in 0..7 {
            store.add(NewEpisode::default());
        }
        assert_eq!(store.recent(DEFAULT_RECENT_LIMIT).len(), 5);
        assert_eq!(store.recent(100).len(), 7);
        assert!(store.recent(0).is_empty());
    }

    #[test]
    fn update_changes_only_patched_fields() {
        let (_, mut store) = setup();
        let id = store.add(NewEpisode {
            severity: Some("severe".into()),
            triggers: vec!["sleep_deprivation".into()],
            ..NewEpisode::of_type("tonic_clonic")
        });
        let before = store.get(id).unwrap().clone();

        let changed = store.update(
            id,
            EpisodePatch {
                notes: Some("Bit tongue".into()),
                ..EpisodePatch::default()
            },
        );
        assert!(changed);

        let after = store.get(id).unwrap();
        assert_eq!(after.notes.as_deref(), Some("Bit tongue"));
        assert_eq!(after.severity, before.severity);
        assert_eq!(after.triggers, before.triggers);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.episode_type, before.episode_type);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let (sink, mut store) = setup();
        store.add(NewEpisode::default());
        let snapshot = store.all().to_vec();
        let stored_before = sink.get(EPISODES_KEY).unwrap();

        let changed = store.update(
            Uuid::new_v4(),
            EpisodePatch {
                notes: Some("x".into()),
                ..EpisodePatch::default()
            },
        );

        assert!(!changed);
        assert_eq!(store.all(), snapshot.as_slice());
        assert_eq!(sink.get(EPISODES_KEY).unwrap(), stored_before);
    }

    #[test]
    fn journal_survives_reload() {
        let (sink, mut store) = setup();
        let first = store.add(NewEpisode::of_type("absence"));
        let second = store.add(NewEpisode::of_type("focal"));

        let reloaded = EpisodeStore::load(sink);
        let ids: Vec<Uuid> = reloaded.all().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn malformed_storage_starts_empty() {
        let sink = Arc::new(MemoryStore::new());
        sink.set(EPISODES_KEY, "[{broken").unwrap();
        let store = EpisodeStore::load(sink);
        assert!(store.is_empty());
    }

    #[test]
    fn one_bad_entry_does_not_erase_the_journal() {
        let sink = Arc::new(MemoryStore::new());
        let stored = r#"[
            {"id":"7f1c8f1e-35a5-4a4e-9b8e-0d6f2b1f6a11","timestamp":"2024-03-01T08:30:00Z","type":"absence"},
            {"id":"1b6c7c2a-9a61-4f0e-8d7f-3f1f0e2f3a22","timestamp":"2024-03-02T09:00:00Z","severity":3},
            {"id":"2c7d8d3b-0b72-4a1f-9e80-4a2a1f3a4b33","timestamp":"yesterday"}
        ]"#;
        sink.set(EPISODES_KEY, stored).unwrap();

        let mut store = EpisodeStore::load(sink.clone());
        assert_eq!(store.len(), 2);
        let severe = store
            .get(Uuid::parse_str("1b6c7c2a-9a61-4f0e-8d7f-3f1f0e2f3a22").unwrap())
            .unwrap();
        assert_eq!(severe.severity.as_deref(), Some("3"));

        store.add(NewEpisode::of_type("focal"));
        let reloaded = EpisodeStore::load(sink);
        assert_eq!(reloaded.len(), 3);
    }
}
