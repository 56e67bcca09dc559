//! Medication schedule commands.
//!
//! - `add_medication` / `update_medication` / `stop_medication`
//! - `list_medications`: all or active only
//! - `mark_missed` / `mark_taken`: toggle a dose's missed flag
//! - `day_overview`: per-dose missed flags for one medication on one day
//! - `search_medicines`: name suggestions from the bundled catalogue

use chrono::NaiveTime;
use serde::Serialize;

use crate::core_state::AppState;
use crate::medicines::Medicine;
use crate::models::{Medication, MedicationPatch, NewMedication};

use super::{fail, parse_id, parse_optional_date};

const MAX_NAME_LEN: usize = 200;
const MAX_DAILY_DOSES: u32 = 12;

/// One dose slot on a given day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseSlot {
    pub dose_index: u32,
    pub time: Option<String>,
    pub missed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOverview {
    pub medication_id: String,
    pub date: String,
    pub any_missed: bool,
    pub doses: Vec<DoseSlot>,
}

fn validate_fields(
    state: &AppState,
    name: Option<&str>,
    frequency: Option<u32>,
    times: Option<&[String]>,
) -> Result<(), String> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return fail(state, "Medication name is required");
        }
        if name.chars().count() > MAX_NAME_LEN {
            return fail(state, "Medication name too long");
        }
    }
    if let Some(frequency) = frequency {
        if frequency == 0 || frequency > MAX_DAILY_DOSES {
            return fail(
                state,
                format!("Frequency must be between 1 and {MAX_DAILY_DOSES} doses per day"),
            );
        }
    }
    for time in times.unwrap_or_default() {
        if NaiveTime::parse_from_str(time, "%H:%M").is_err() {
            return fail(state, format!("Invalid dose time: {time} (expected HH:MM)"));
        }
    }
    Ok(())
}

/// Adds a medication and returns its ID.
pub fn add_medication(state: &mut AppState, med: NewMedication) -> Result<String, String> {
    validate_fields(
        state,
        Some(&med.name),
        Some(med.frequency),
        Some(med.times.as_slice()),
    )?;
    let name = med.name.clone();
    let id = state.medications.add(NewMedication {
        name: med.name.trim().to_string(),
        ..med
    });
    state.toasts.success(format!("{} added", name.trim()));
    Ok(id.to_string())
}

/// Edits a medication, archiving its previous state.
/// Returns false when no medication has that ID.
pub fn update_medication(
    state: &mut AppState,
    medication_id: &str,
    patch: MedicationPatch,
) -> Result<bool, String> {
    let id = parse_id(state, medication_id, "medication")?;
    validate_fields(
        state,
        patch.name.as_deref(),
        patch.frequency,
        patch.times.as_deref(),
    )?;

    let updated = state.medications.update(id, patch);
    if updated {
        state.toasts.success("Medication updated");
    } else {
        state.toasts.info("No medication with that ID; nothing changed");
    }
    Ok(updated)
}

pub fn stop_medication(state: &mut AppState, medication_id: &str) -> Result<bool, String> {
    let id = parse_id(state, medication_id, "medication")?;
    let stopped = state.medications.stop(id);
    if stopped {
        state.toasts.success("Medication stopped");
    } else {
        state.toasts.info("No medication with that ID; nothing changed");
    }
    Ok(stopped)
}

pub fn list_medications(state: &AppState, active_only: bool) -> Vec<Medication> {
    if active_only {
        state.medications.active().into_iter().cloned().collect()
    } else {
        state.medications.all().to_vec()
    }
}

/// Flags a dose as missed. Already-missed doses are left as they are.
pub fn mark_missed(
    state: &mut AppState,
    medication_id: &str,
    dose_index: u32,
    date: Option<&str>,
) -> Result<(), String> {
    let id = parse_id(state, medication_id, "medication")?;
    let date = parse_optional_date(state, date)?;

    let Some(med) = state.medications.get(id) else {
        return fail(state, "Medication not found");
    };
    if dose_index >= med.frequency {
        let message = format!(
            "Dose {} does not exist; {} is taken {} time(s) a day",
            dose_index + 1,
            med.name,
            med.frequency
        );
        return fail(state, message);
    }

    if state.medications.is_missed(id, dose_index, date) {
        state.toasts.info("Dose already marked as missed");
        return Ok(());
    }
    state.medications.log_missed(id, dose_index, date);
    state.toasts.success("Dose marked as missed");
    Ok(())
}

/// Clears a missed flag. Returns false when the dose was not flagged.
pub fn mark_taken(
    state: &mut AppState,
    medication_id: &str,
    dose_index: u32,
    date: Option<&str>,
) -> Result<bool, String> {
    let id = parse_id(state, medication_id, "medication")?;
    let date = parse_optional_date(state, date)?;

    let removed = state.medications.remove_missed(id, dose_index, date);
    if removed {
        state.toasts.success("Dose marked as taken");
    }
    Ok(removed)
}

pub fn day_overview(
    state: &AppState,
    medication_id: &str,
    date: Option<&str>,
) -> Result<DayOverview, String> {
    let id = parse_id(state, medication_id, "medication")?;
    let date = parse_optional_date(state, date)?
        .unwrap_or_else(crate::medications::today);

    let Some(med) = state.medications.get(id) else {
        return fail(state, "Medication not found");
    };
    let doses = (0..med.frequency)
        .map(|i| DoseSlot {
            dose_index: i,
            time: med.times.get(i as usize).cloned(),
            missed: state.medications.is_missed(id, i, Some(date)),
        })
        .collect();

    Ok(DayOverview {
        medication_id: id.to_string(),
        date: date.to_string(),
        any_missed: state.medications.has_any_missed(id, Some(date)),
        doses,
    })
}

pub fn search_medicines(state: &AppState, query: &str) -> Vec<Medicine> {
    state
        .medicines
        .search(query.trim())
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (tempfile::TempDir, AppState) {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::in_memory(tmp.path());
        (tmp, state)
    }

    fn med(name: &str, frequency: u32) -> NewMedication {
        NewMedication {
            name: name.into(),
            dosage: "250mg".into(),
            frequency,
            times: vec!["08:00".into(), "20:00".into()],
        }
    }

    #[test]
    fn add_validates_input() {
        let (_tmp, mut state) = state();
        assert!(add_medication(&mut state, med("", 2)).is_err());
        assert!(add_medication(&mut state, med("Keppra", 0)).is_err());
        assert!(add_medication(&mut state, med("Keppra", 13)).is_err());

        let mut bad_time = med("Keppra", 2);
        bad_time.times = vec!["8 o'clock".into()];
        assert!(add_medication(&mut state, bad_time).is_err());

        assert!(state.medications.all().is_empty());
    }

    #[test]
    fn add_trims_name() {
        let (_tmp, mut state) = state();
        let id = add_medication(&mut state, med("  Keppra ", 2)).unwrap();
        let list = list_medications(&state, true);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.to_string(), id);
        assert_eq!(list[0].name, "Keppra");
    }

    #[test]
    fn stop_moves_medication_out_of_active_list() {
        let (_tmp, mut state) = state();
        let id = add_medication(&mut state, med("Keppra", 2)).unwrap();
        assert!(stop_medication(&mut state, &id).unwrap());
        assert!(list_medications(&state, true).is_empty());
        assert_eq!(list_medications(&state, false).len(), 1);
    }

    #[test]
    fn update_archives_history() {
        let (_tmp, mut state) = state();
        let id = add_medication(&mut state, med("Keppra", 2)).unwrap();
        let patch = MedicationPatch {
            dosage: Some("500mg".into()),
            ..MedicationPatch::default()
        };
        assert!(update_medication(&mut state, &id, patch).unwrap());
        let list = list_medications(&state, false);
        assert_eq!(list[0].history.len(), 1);
        assert_eq!(list[0].history[0].dosage, "250mg");
    }

    #[test]
    fn mark_missed_checks_dose_index() {
        let (_tmp, mut state) = state();
        let id = add_medication(&mut state, med("Keppra", 2)).unwrap();
        assert!(mark_missed(&mut state, &id, 2, Some("2024-01-01")).is_err());
        assert!(mark_missed(&mut state, &id, 1, Some("2024-01-01")).is_ok());
    }

    #[test]
    fn mark_missed_does_not_duplicate() {
        let (_tmp, mut state) = state();
        let id = add_medication(&mut state, med("Keppra", 2)).unwrap();
        mark_missed(&mut state, &id, 0, Some("2024-01-01")).unwrap();
        mark_missed(&mut state, &id, 0, Some("2024-01-01")).unwrap();
        assert_eq!(state.medications.logs().len(), 1);
    }

    #[test]
    fn mark_missed_unknown_medication_fails() {
        let (_tmp, mut state) = state();
        let id = uuid::Uuid::new_v4().to_string();
        assert!(mark_missed(&mut state, &id, 0, None).is_err());
    }

    #[test]
    fn overview_reflects_toggles() {
        let (_tmp, mut state) = state();
        let id = add_medication(&mut state, med("Keppra", 2)).unwrap();
        mark_missed(&mut state, &id, 1, Some("2024-01-01")).unwrap();

        let overview = day_overview(&state, &id, Some("2024-01-01")).unwrap();
        assert!(overview.any_missed);
        assert_eq!(overview.date, "2024-01-01");
        assert!(!overview.doses[0].missed);
        assert!(overview.doses[1].missed);
        assert_eq!(overview.doses[1].time.as_deref(), Some("20:00"));

        assert!(mark_taken(&mut state, &id, 1, Some("2024-01-01")).unwrap());
        assert!(!mark_taken(&mut state, &id, 1, Some("2024-01-01")).unwrap());
        let overview = day_overview(&state, &id, Some("2024-01-01")).unwrap();
        assert!(!overview.any_missed);
    }

    #[test]
    fn search_trims_query() {
        let (_tmp, state) = state();
        let hits = search_medicines(&state, "  levetir ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Levetiracetam");
    }
}
