//! Localisation: the `t(key, params)` lookup plus locale-aware formatting.
//!
//! Keys follow the dotted layout of the app's message files
//! (`pdf.report.title`, `common.episode_types.absence`, ...). Parameters
//! are interpolated from `{name}` placeholders. A key missing from the
//! active locale falls back to English, then to the key itself.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::models::DEFAULT_LANGUAGE;

pub trait Translator {
    fn t(&self, key: &str, params: &[(&str, &str)]) -> String;
    fn locale(&self) -> &str;
}

const EN: &[(&str, &str)] = &[
    ("pdf.report.title", "Medical Report"),
    ("pdf.report.generated", "Generated on {date}"),
    ("pdf.patient_info", "Patient Information"),
    ("pdf.report.not_provided", "Not provided"),
    ("pdf.report.patient_name", "Name: {name}"),
    ("pdf.report.date_of_birth", "Date of birth: {dob}"),
    ("pdf.report.allergies", "Allergies: {allergies}"),
    ("pdf.report.doctor", "General practitioner: {doctorName}"),
    ("pdf.report.neurologist", "Neurologist: {neurologistName}"),
    ("pdf.report.medical_notes", "Medical notes:"),
    ("pdf.report.episodes", "Episodes"),
    ("pdf.report.no_episodes_recorded", "No episodes recorded in this period."),
    ("pdf.report.date", "Date"),
    ("pdf.report.time", "Time"),
    ("pdf.report.type", "Type"),
    ("pdf.report.severity", "Severity"),
    ("pdf.report.duration", "Duration"),
    ("pdf.report.triggers", "Triggers"),
    ("pdf.report.symptoms", "Symptoms"),
    ("pdf.report.emergency", "Emergency response"),
    ("pdf.report.notes", "Notes"),
    ("pdf.report.someone_witnessed", "Witnessed"),
    ("pdf.report.emergency_called", "Emergency services called"),
    ("pdf.report.went_to_hospital", "Went to hospital"),
    ("pdf.report.missed_medications", "Missed Medications"),
    ("pdf.report.no_missed_medications_recorded", "No missed medications recorded in this period."),
    ("pdf.report.medication", "Medication"),
    ("pdf.report.medication_dosage", "Dosage"),
    ("pdf.report.medication_frequency", "Dose"),
    ("pdf.report.dose_label", "Dose {current} of {total}"),
    ("pdf.report.single_dose", "Single dose"),
    ("common.episode_types.general", "General"),
    ("common.episode_types.tonic_clonic", "Tonic-clonic"),
    ("common.episode_types.absence", "Absence"),
    ("common.episode_types.focal", "Focal"),
    ("common.episode_types.myoclonic", "Myoclonic"),
    ("common.episode_types.atonic", "Atonic"),
    ("common.aura", "Aura"),
    ("common.deja_vu", "Déjà vu"),
    ("common.nausea", "Nausea"),
    ("common.headache", "Headache"),
    ("common.confusion", "Confusion"),
    ("common.jerking", "Jerking"),
    ("common.stiffness", "Stiffness"),
    ("common.staring", "Staring"),
    ("common.loss_of_consciousness", "Loss of consciousness"),
    ("common.tongue_bite", "Tongue bite"),
    ("common.incontinence", "Incontinence"),
    ("common.fatigue", "Fatigue"),
    ("common.muscle_pain", "Muscle pain"),
    ("common.memory_loss", "Memory loss"),
    ("common.stress", "Stress"),
    ("common.sleep_deprivation", "Sleep deprivation"),
    ("common.missed_medication", "Missed medication"),
    ("common.alcohol", "Alcohol"),
    ("common.flashing_lights", "Flashing lights"),
    ("common.illness", "Illness"),
    ("common.menstruation", "Menstruation"),
];

const NL: &[(&str, &str)] = &[
    ("pdf.report.title", "Medisch Rapport"),
    ("pdf.report.generated", "Gegenereerd op {date}"),
    ("pdf.patient_info", "Patiëntgegevens"),
    ("pdf.report.not_provided", "Niet opgegeven"),
    ("pdf.report.patient_name", "Naam: {name}"),
    ("pdf.report.date_of_birth", "Geboortedatum: {dob}"),
    ("pdf.report.allergies", "Allergieën: {allergies}"),
    ("pdf.report.doctor", "Huisarts: {doctorName}"),
    ("pdf.report.neurologist", "Neuroloog: {neurologistName}"),
    ("pdf.report.medical_notes", "Medische notities:"),
    ("pdf.report.episodes", "Aanvallen"),
    ("pdf.report.no_episodes_recorded", "Geen aanvallen geregistreerd in deze periode."),
    ("pdf.report.date", "Datum"),
    ("pdf.report.time", "Tijd"),
    ("pdf.report.type", "Type"),
    ("pdf.report.severity", "Ernst"),
    ("pdf.report.duration", "Duur"),
    ("pdf.report.triggers", "Triggers"),
    ("pdf.report.symptoms", "Symptomen"),
    ("pdf.report.emergency", "Noodhulp"),
    ("pdf.report.notes", "Notities"),
    ("pdf.report.someone_witnessed", "Getuige aanwezig"),
    ("pdf.report.emergency_called", "112 gebeld"),
    ("pdf.report.went_to_hospital", "Naar ziekenhuis"),
    ("pdf.report.missed_medications", "Gemiste Medicatie"),
    ("pdf.report.no_missed_medications_recorded", "Geen gemiste medicatie geregistreerd in deze periode."),
    ("pdf.report.medication", "Medicijn"),
    ("pdf.report.medication_dosage", "Dosering"),
    ("pdf.report.medication_frequency", "Dosis"),
    ("pdf.report.dose_label", "Dosis {current} van {total}"),
    ("pdf.report.single_dose", "Enkele dosis"),
    ("common.episode_types.general", "Algemeen"),
    ("common.episode_types.tonic_clonic", "Tonisch-clonisch"),
    ("common.episode_types.absence", "Absence"),
    ("common.episode_types.focal", "Focaal"),
    ("common.episode_types.myoclonic", "Myoclonisch"),
    ("common.episode_types.atonic", "Atonisch"),
    ("common.aura", "Aura"),
    ("common.confusion", "Verwardheid"),
    ("common.jerking", "Schokken"),
    ("common.fatigue", "Vermoeidheid"),
    ("common.stress", "Stress"),
    ("common.sleep_deprivation", "Slaaptekort"),
    ("common.missed_medication", "Medicatie vergeten"),
    ("common.flashing_lights", "Flitsende lichten"),
];

/// Locales with a built-in message table.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "nl"];

/// Built-in message catalogue for English and Dutch.
pub struct Catalog {
    locale: String,
    messages: HashMap<&'static str, &'static str>,
    fallback: HashMap<&'static str, &'static str>,
}

impl Catalog {
    /// Catalogue for `locale`. Unknown locales use the English messages.
    pub fn new(locale: &str) -> Self {
        let table = match locale {
            "nl" => NL,
            _ => EN,
        };
        Self {
            locale: locale.to_string(),
            messages: table.iter().copied().collect(),
            fallback: EN.iter().copied().collect(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl Translator for Catalog {
    fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = self
            .messages
            .get(key)
            .or_else(|| self.fallback.get(key))
            .copied()
            .unwrap_or(key);
        interpolate(template, params)
    }

    fn locale(&self) -> &str {
        &self.locale
    }
}

fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}

/// Translates a stored code (`"sleep_deprivation"`) via `common.<prefix><code>`.
/// Codes with no message are made readable instead (`"Sleep deprivation"`).
pub fn humanize(t: &dyn Translator, prefix: &str, code: &str) -> String {
    let key = format!("common.{prefix}{code}");
    let text = t.t(&key, &[]);
    if text == key {
        readable(code)
    } else {
        text
    }
}

fn readable(code: &str) -> String {
    let spaced = code.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Calendar date in the locale's customary order.
pub fn format_date(locale: &str, date: NaiveDate) -> String {
    match locale {
        "nl" | "de" | "fr" => date.format("%d-%m-%Y").to_string(),
        "en" => date.format("%m/%d/%Y").to_string(),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

/// Hours and minutes of `instant` in the local time zone.
pub fn format_time(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%H:%M").to_string()
}

/// Calendar day of `instant` in the local time zone.
pub fn local_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Local calendar date of `instant`, formatted for `locale`.
pub fn format_local_date(locale: &str, instant: DateTime<Utc>) -> String {
    format_date(locale, local_day(instant))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_params() {
        let t = Catalog::new("en");
        assert_eq!(
            t.t("pdf.report.dose_label", &[("current", "1"), ("total", "3")]),
            "Dose 1 of 3"
        );
    }

    #[test]
    fn dutch_falls_back_to_english() {
        let t = Catalog::new("nl");
        assert_eq!(t.t("pdf.report.title", &[]), "Medisch Rapport");
        assert_eq!(t.t("common.tongue_bite", &[]), "Tongue bite");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let t = Catalog::new("en");
        assert_eq!(t.t("no.such.key", &[]), "no.such.key");
    }

    #[test]
    fn unknown_locale_uses_english() {
        let t = Catalog::new("xx");
        assert_eq!(t.locale(), "xx");
        assert_eq!(t.t("pdf.report.episodes", &[]), "Episodes");
    }

    #[test]
    fn humanize_uses_catalogue_then_readable_code() {
        let t = Catalog::new("en");
        assert_eq!(humanize(&t, "", "sleep_deprivation"), "Sleep deprivation");
        assert_eq!(humanize(&t, "episode_types.", "tonic_clonic"), "Tonic-clonic");
        assert_eq!(humanize(&t, "", "video_games"), "Video games");
        assert_eq!(humanize(&t, "", ""), "");
    }

    #[test]
    fn dates_follow_locale() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(format_date("nl", date), "31-01-2024");
        assert_eq!(format_date("en", date), "01/31/2024");
        assert_eq!(format_date("ja", date), "2024-01-31");
    }
}
