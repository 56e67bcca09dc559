//! Settings commands.
//!
//! - `get_settings`
//! - `update_profile` / `update_emergency` / `update_medical` / `set_language`
//! - `add_allergy` / `remove_allergy`

use chrono::NaiveDate;

use crate::core_state::AppState;
use crate::i18n::SUPPORTED_LOCALES;
use crate::models::{
    EmergencyPatch, MedicalPatch, PreferencesPatch, ProfilePatch, Settings,
};

use super::fail;

const MAX_FIELD_LEN: usize = 200;
const MAX_NOTES_LEN: usize = 2000;

pub fn get_settings(state: &AppState) -> Settings {
    state.settings.get().clone()
}

fn check_len(
    state: &AppState,
    label: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > max => {
            fail(state, format!("{label} too long (max {max} characters)"))
        }
        _ => Ok(()),
    }
}

pub fn update_profile(state: &mut AppState, patch: ProfilePatch) -> Result<(), String> {
    check_len(state, "Name", patch.name.as_deref(), MAX_FIELD_LEN)?;
    if let Some(dob) = patch.date_of_birth.as_deref() {
        let dob = dob.trim();
        if !dob.is_empty() && NaiveDate::parse_from_str(dob, "%Y-%m-%d").is_err() {
            return fail(state, format!("Invalid date of birth: {dob} (expected YYYY-MM-DD)"));
        }
    }
    state.settings.update_profile(patch);
    state.toasts.success("Profile saved");
    Ok(())
}

pub fn update_emergency(state: &mut AppState, patch: EmergencyPatch) -> Result<(), String> {
    let fields = [
        ("Contact name", patch.contact_name.as_deref()),
        ("Contact phone", patch.contact_phone.as_deref()),
        ("Contact relation", patch.contact_relation.as_deref()),
        ("Doctor name", patch.doctor_name.as_deref()),
        ("Doctor phone", patch.doctor_phone.as_deref()),
        ("Neurologist name", patch.neurologist_name.as_deref()),
        ("Neurologist phone", patch.neurologist_phone.as_deref()),
    ];
    for (label, value) in fields {
        check_len(state, label, value, MAX_FIELD_LEN)?;
    }
    state.settings.update_emergency(patch);
    state.toasts.success("Emergency contacts saved");
    Ok(())
}

pub fn update_medical(state: &mut AppState, patch: MedicalPatch) -> Result<(), String> {
    check_len(state, "Medical notes", patch.notes.as_deref(), MAX_NOTES_LEN)?;
    state.settings.update_medical(patch);
    state.toasts.success("Medical information saved");
    Ok(())
}

/// Switches the interface and report language.
pub fn set_language(state: &mut AppState, language: &str) -> Result<(), String> {
    let language = language.trim().to_lowercase();
    if !SUPPORTED_LOCALES.contains(&language.as_str()) {
        return fail(
            state,
            format!(
                "Unsupported language: {language} (supported: {})",
                SUPPORTED_LOCALES.join(", ")
            ),
        );
    }
    state.settings.update_preferences(PreferencesPatch {
        language: Some(language),
    });
    state.toasts.success("Language updated");
    Ok(())
}

/// Returns false when the allergy was blank or already listed.
pub fn add_allergy(state: &mut AppState, allergy: &str) -> Result<bool, String> {
    check_len(state, "Allergy", Some(allergy.trim()), MAX_FIELD_LEN)?;
    let added = state.settings.add_allergy(allergy);
    if added {
        state.toasts.success(format!("{} added", allergy.trim()));
    } else {
        state.toasts.info("Allergy is empty or already listed");
    }
    Ok(added)
}

/// Removes by position. An out-of-range index changes nothing.
pub fn remove_allergy(state: &mut AppState, index: usize) -> Option<String> {
    let removed = state.settings.remove_allergy(index);
    if let Some(ref allergy) = removed {
        state.toasts.success(format!("{allergy} removed"));
    }
    removed
}
