//! Settings store: profile, emergency contacts, medical info and preferences.

use std::sync::Arc;

use crate::config::SETTINGS_KEY;
use crate::db::{self, KeyValueStore};
use crate::models::{
    EmergencyPatch, MedicalPatch, PreferencesPatch, ProfilePatch, Settings,
};

pub struct SettingsStore {
    sink: Arc<dyn KeyValueStore>,
    settings: Settings,
}

impl SettingsStore {
    /// Loads stored settings merged over the defaults.
    pub fn load(sink: Arc<dyn KeyValueStore>) -> Self {
        let settings: Settings = db::load_json(sink.as_ref(), SETTINGS_KEY);
        Self { sink, settings }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn update_profile(&mut self, patch: ProfilePatch) {
        patch.apply(&mut self.settings.profile);
        self.persist();
    }

    pub fn update_emergency(&mut self, patch: EmergencyPatch) {
        patch.apply(&mut self.settings.emergency);
        self.persist();
    }

    pub fn update_medical(&mut self, patch: MedicalPatch) {
        patch.apply(&mut self.settings.medical);
        self.persist();
    }

    pub fn update_preferences(&mut self, patch: PreferencesPatch) {
        patch.apply(&mut self.settings.preferences);
        self.persist();
    }

    /// Appends an allergy unless it is blank or already listed.
    /// Returns whether it was added.
    pub fn add_allergy(&mut self, allergy: &str) -> bool {
        let allergy = allergy.trim();
        let allergies = &mut self.settings.medical.allergies;
        if allergy.is_empty() || allergies.iter().any(|a| a == allergy) {
            return false;
        }
        allergies.push(allergy.to_string());
        self.persist();
        true
    }

    /// Removes the allergy at `index`. Out of range is a no-op.
    pub fn remove_allergy(&mut self, index: usize) -> Option<String> {
        let allergies = &mut self.settings.medical.allergies;
        if index >= allergies.len() {
            tracing::debug!(index, len = allergies.len(), "Allergy index out of range");
            return None;
        }
        let removed = allergies.remove(index);
        self.persist();
        Some(removed)
    }

    fn persist(&self) {
        db::save_json(self.sink.as_ref(), SETTINGS_KEY, &self.settings);
    }
}
