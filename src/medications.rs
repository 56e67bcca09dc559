//! Medication schedule: versioned medication records and the missed-dose log.
//!
//! Medications and logs are persisted separately (`epifriend_medications`,
//! `epifriend_medication_logs`). Editing a medication archives its prior
//! state into `history` first, so the record carries its own audit trail.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::config::{MEDICATIONS_KEY, MEDICATION_LOGS_KEY};
use crate::db::{self, KeyValueStore};
use crate::models::{
    DoseStatus, Medication, MedicationLog, MedicationPatch, NewMedication,
};

/// Today's local calendar day, the default date for dose logging.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct MedicationStore {
    sink: Arc<dyn KeyValueStore>,
    medications: Vec<Medication>,
    logs: Vec<MedicationLog>,
}

impl MedicationStore {
    pub fn load(sink: Arc<dyn KeyValueStore>) -> Self {
        let medications: Vec<Medication> = db::load_json_list(sink.as_ref(), MEDICATIONS_KEY);
        let logs: Vec<MedicationLog> = db::load_json_list(sink.as_ref(), MEDICATION_LOGS_KEY);
        tracing::debug!(
            medications = medications.len(),
            logs = logs.len(),
            "Loaded medication schedule"
        );
        Self { sink, medications, logs }
    }

    // ═══════════════════════════════════════════
    // Medications
    // ═══════════════════════════════════════════

    /// Adds an active medication starting now. Returns its id.
    pub fn add(&mut self, med: NewMedication) -> Uuid {
        let id = Uuid::new_v4();
        self.medications.push(Medication {
            id,
            name: med.name,
            dosage: med.dosage,
            frequency: med.frequency,
            times: med.times,
            start_date: Utc::now(),
            end_date: None,
            history: Vec::new(),
        });
        self.persist_medications();
        tracing::info!(%id, "Medication added");
        id
    }

    /// Archives the current state into `history`, then applies `patch`.
    ///
    /// Each call adds exactly one history entry, even for an empty patch.
    /// Returns false if no medication has `id`.
    pub fn update(&mut self, id: Uuid, patch: MedicationPatch) -> bool {
        let Some(med) = self.medications.iter_mut().find(|m| m.id == id) else {
            tracing::debug!(%id, "Medication update for unknown id ignored");
            return false;
        };
        let snapshot = med.snapshot(Utc::now());
        patch.apply(med);
        med.history.push(snapshot);
        self.persist_medications();
        true
    }

    /// Marks the medication as stopped now. Returns false if unknown.
    pub fn stop(&mut self, id: Uuid) -> bool {
        let Some(med) = self.medications.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        med.end_date = Some(Utc::now());
        self.persist_medications();
        tracing::info!(%id, "Medication stopped");
        true
    }

    /// Medications without an end date.
    pub fn active(&self) -> Vec<&Medication> {
        self.medications.iter().filter(|m| m.is_active()).collect()
    }

    pub fn all(&self) -> &[Medication] {
        &self.medications
    }

    pub fn get(&self, id: Uuid) -> Option<&Medication> {
        self.medications.iter().find(|m| m.id == id)
    }

    // ═══════════════════════════════════════════
    // Missed-dose log
    // ═══════════════════════════════════════════

    /// Logs dose `dose_index` of `med_id` as missed on `date` (default today).
    pub fn log_missed(&mut self, med_id: Uuid, dose_index: u32, date: Option<NaiveDate>) {
        let date = date.unwrap_or_else(today);
        self.logs.push(MedicationLog {
            id: Uuid::new_v4(),
            med_id,
            dose_index,
            date,
            status: DoseStatus::Missed,
            timestamp: Utc::now(),
        });
        self.persist_logs();
        tracing::info!(%med_id, dose_index, %date, "Missed dose logged");
    }

    pub fn is_missed(&self, med_id: Uuid, dose_index: u32, date: Option<NaiveDate>) -> bool {
        let date = date.unwrap_or_else(today);
        self.logs.iter().any(|log| log.matches(med_id, dose_index, date))
    }

    /// Removes the first matching missed row (the dose counts as taken again).
    /// Returns false if there was none.
    pub fn remove_missed(
        &mut self,
        med_id: Uuid,
        dose_index: u32,
        date: Option<NaiveDate>,
    ) -> bool {
        let date = date.unwrap_or_else(today);
        let Some(index) = self
            .logs
            .iter()
            .position(|log| log.matches(med_id, dose_index, date))
        else {
            return false;
        };
        self.logs.remove(index);
        self.persist_logs();
        true
    }

    /// Whether any dose of `med_id` was missed on `date` (calendar indicator).
    pub fn has_any_missed(&self, med_id: Uuid, date: Option<NaiveDate>) -> bool {
        let date = date.unwrap_or_else(today);
        self.logs.iter().any(|log| {
            log.med_id == med_id && log.date == date && log.status == DoseStatus::Missed
        })
    }

    pub fn logs(&self) -> &[MedicationLog] {
        &self.logs
    }

    pub fn missed_logs(&self) -> impl Iterator<Item = &MedicationLog> {
        self.logs.iter().filter(|log| log.status == DoseStatus::Missed)
    }

    fn persist_medications(&self) {
        db::save_json(self.sink.as_ref(), MEDICATIONS_KEY, &self.medications);
    }

    fn persist_logs(&self) {
        db::save_json(self.sink.as_ref(), MEDICATION_LOGS_KEY, &self.logs);
    }
}
