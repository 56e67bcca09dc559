//! Application state shared by the command handlers.
//!
//! Owns the three persistent stores (all backed by one key-value sink),
//! the toast queue and the medicine catalogue.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config;
use crate::db::{KeyValueStore, MemoryStore, SqliteStore, StorageError};
use crate::i18n::Catalog;
use crate::journal::EpisodeStore;
use crate::medications::MedicationStore;
use crate::medicines::MedicineDatabase;
use crate::report::ReportGenerator;
use crate::settings::SettingsStore;
use crate::toast::ToastQueue;

pub struct AppState {
    data_dir: PathBuf,
    pub episodes: EpisodeStore,
    pub medications: MedicationStore,
    pub settings: SettingsStore,
    pub toasts: ToastQueue,
    pub medicines: MedicineDatabase,
}

impl AppState {
    /// Opens (creating if needed) the data directory and its database.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir)?;
        let sink = SqliteStore::open(&config::database_path(data_dir))?;
        tracing::info!(dir = %data_dir.display(), "Opened data directory");
        Ok(Self::with_sink(data_dir.to_path_buf(), Arc::new(sink)))
    }

    /// State backed by an in-memory sink; exports still go under `data_dir`.
    pub fn in_memory(data_dir: &Path) -> Self {
        Self::with_sink(data_dir.to_path_buf(), Arc::new(MemoryStore::new()))
    }

    pub fn with_sink(data_dir: PathBuf, sink: Arc<dyn KeyValueStore>) -> Self {
        Self {
            data_dir,
            episodes: EpisodeStore::load(sink.clone()),
            medications: MedicationStore::load(sink.clone()),
            settings: SettingsStore::load(sink),
            toasts: ToastQueue::new(),
            medicines: MedicineDatabase::bundled(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn exports_dir(&self) -> PathBuf {
        config::exports_dir(&self.data_dir)
    }

    /// Message catalogue for the user's chosen language.
    pub fn catalog(&self) -> Catalog {
        Catalog::new(&self.settings.get().preferences.language)
    }

    pub fn report_generator<'a>(&'a self, catalog: &'a Catalog) -> ReportGenerator<'a> {
        ReportGenerator::new(&self.episodes, &self.medications, &self.settings, catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewEpisode, PreferencesPatch};
    use crate::i18n::Translator;

    #[test]
    fn open_creates_directory_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("EpiFriend");

        let id = {
            let mut state = AppState::open(&dir).unwrap();
            state.episodes.add(NewEpisode::of_type("focal"))
        };
        assert!(config::database_path(&dir).exists());

        let state = AppState::open(&dir).unwrap();
        assert_eq!(state.episodes.recent(1)[0].id, id);
    }

    #[test]
    fn catalog_follows_language_preference() {
        let tmp = tempfile::tempdir().unwrap();
        let mut state = AppState::in_memory(tmp.path());
        assert_eq!(state.catalog().locale(), "nl");

        state.settings.update_preferences(PreferencesPatch {
            language: Some("en".into()),
        });
        assert_eq!(state.catalog().t("pdf.report.title", &[]), "Medical Report");
    }

    #[test]
    fn exports_dir_is_under_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::in_memory(tmp.path());
        assert!(state.exports_dir().starts_with(state.data_dir()));
    }
}
