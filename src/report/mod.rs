//! Medical report export.
//!
//! Read-only aggregation over the episode journal, the medication schedule
//! and the settings record, rendered as a paginated PDF:
//! 1. Patient information (name and date of birth always; allergies,
//!    doctors and notes when requested)
//! 2. Episodes table, basic or full detail
//! 3. Missed medications table
//!
//! Sections can be switched off and both tables can be narrowed to a
//! calendar-day range.

pub mod layout;
pub mod pdf;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::REPORT_FILE_PREFIX;
use crate::i18n::{self, Translator};
use crate::journal::EpisodeStore;
use crate::medications::MedicationStore;
use crate::models::{DetailLevel, Episode, Medication, MedicationLog};
use crate::settings::SettingsStore;

use layout::{PatientSection, ReportDocument, Section, SectionContent, Table, TableStyle};

/// Cursor positions (mm from the top) past which a section starts on a
/// fresh page.
const EPISODES_BREAK_AT: f32 = 250.0;
const MISSED_BREAK_AT: f32 = 220.0;
const MISSED_EMPTY_BREAK_AT: f32 = 270.0;

/// Fixed width of the notes column in the full episodes table.
const NOTES_COLUMN_WIDTH: f32 = 30.0;
const NOTES_COLUMN: usize = 8;

const PLACEHOLDER: &str = "-";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),

    #[error("Cannot write report: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Options ──────────────────────────────────────────────────────────────────

/// Inclusive calendar-day range. A missing bound is open on that side.
///
/// Bounds decode leniently: an empty string is no bound, and a full
/// timestamp contributes its date part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

impl From<Value> for DateRange {
    fn from(value: Value) -> Self {
        Self {
            from: value.get("from").and_then(parse_bound),
            to: value.get("to").and_then(parse_bound),
        }
    }
}

fn parse_bound(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(bound = raw, error = %e, "Ignoring unparseable report date bound");
            None
        }
    }
}

/// Report options. Each field decodes on its own: a missing or malformed
/// field takes its default without disturbing the others. Any detail level
/// other than `basic` means full detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct ReportOptions {
    pub include_episodes: bool,
    pub include_missed_meds: bool,
    pub episode_detail_level: DetailLevel,
    pub include_patient_info: bool,
    pub date_range: Option<DateRange>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_episodes: true,
            include_missed_meds: true,
            episode_detail_level: DetailLevel::Full,
            include_patient_info: true,
            date_range: None,
        }
    }
}

impl From<Value> for ReportOptions {
    fn from(value: Value) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            value.get(key).and_then(Value::as_bool).unwrap_or(default)
        };

        let episode_detail_level = match value.get("episodeDetailLevel").and_then(Value::as_str) {
            Some(level) if level == DetailLevel::Basic.as_str() => DetailLevel::Basic,
            _ => DetailLevel::Full,
        };
        let date_range = value
            .get("dateRange")
            .filter(|range| range.is_object())
            .map(|range| DateRange::from(range.clone()))
            .filter(|range| !range.is_unbounded());

        Self {
            include_episodes: flag("includeEpisodes", defaults.include_episodes),
            include_missed_meds: flag("includeMissedMeds", defaults.include_missed_meds),
            episode_detail_level,
            include_patient_info: flag("includePatientInfo", defaults.include_patient_info),
            date_range,
        }
    }
}

impl ReportOptions {
    /// Parses options from JSON. Text that is not JSON at all yields the
    /// defaults; otherwise fields fall back one by one.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from(value),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed report options, using defaults");
                Self::default()
            }
        }
    }

    fn in_range(&self, date: NaiveDate) -> bool {
        self.date_range.map_or(true, |range| range.contains(date))
    }
}

// ─── Results ──────────────────────────────────────────────────────────────────

/// A rendered report, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub success: bool,
    pub file_name: String,
    pub path: PathBuf,
}

/// `EpiFriend_Report_<YYYY-MM-DD>.pdf`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("{REPORT_FILE_PREFIX}{}.pdf", date.format("%Y-%m-%d"))
}

// ─── Generator ────────────────────────────────────────────────────────────────

pub struct ReportGenerator<'a> {
    episodes: &'a EpisodeStore,
    medications: &'a MedicationStore,
    settings: &'a SettingsStore,
    t: &'a dyn Translator,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(
        episodes: &'a EpisodeStore,
        medications: &'a MedicationStore,
        settings: &'a SettingsStore,
        t: &'a dyn Translator,
    ) -> Self {
        Self {
            episodes,
            medications,
            settings,
            t,
        }
    }

    /// Assembles the report layout without rendering it.
    pub fn build(&self, options: &ReportOptions) -> ReportDocument {
        let locale = self.t.locale();
        let now = Local::now();
        let generated = format!(
            "{} {}",
            i18n::format_date(locale, now.date_naive()),
            now.format("%H:%M")
        );

        ReportDocument {
            title: self.t.t("pdf.report.title", &[]),
            generated: self.t.t("pdf.report.generated", &[("date", &generated)]),
            patient: self.patient_section(options),
            episodes: options
                .include_episodes
                .then(|| self.episodes_section(options)),
            missed_medications: options
                .include_missed_meds
                .then(|| self.missed_section(options)),
        }
    }

    /// Builds and renders the report.
    pub fn generate(&self, options: &ReportOptions) -> Result<ReportArtifact, ReportError> {
        let document = self.build(options);
        let (bytes, pages) = pdf::render(&document)?;
        Ok(ReportArtifact {
            file_name: report_file_name(Utc::now().date_naive()),
            bytes,
            pages,
        })
    }

    /// Generates the report and writes it into `dir`.
    pub fn export(&self, options: &ReportOptions, dir: &Path) -> Result<ExportOutcome, ReportError> {
        let artifact = self.generate(options)?;
        let path = export_pdf_to_dir(&artifact, dir)?;
        tracing::info!(file = %artifact.file_name, pages = artifact.pages, "Report exported");
        Ok(ExportOutcome {
            success: true,
            file_name: artifact.file_name,
            path,
        })
    }

    fn patient_section(&self, options: &ReportOptions) -> PatientSection {
        let t = self.t;
        let settings = self.settings.get();
        let mut lines = Vec::new();

        let name = if settings.profile.name.is_empty() {
            t.t("pdf.report.not_provided", &[])
        } else {
            settings.profile.name.clone()
        };
        lines.push(t.t("pdf.report.patient_name", &[("name", &name)]));

        let dob = &settings.profile.date_of_birth;
        if !dob.is_empty() {
            let dob = NaiveDate::parse_from_str(dob, "%Y-%m-%d")
                .map(|d| i18n::format_date(t.locale(), d))
                .unwrap_or_else(|_| dob.clone());
            lines.push(t.t("pdf.report.date_of_birth", &[("dob", &dob)]));
        }

        let mut notes = None;
        if options.include_patient_info {
            let medical = &settings.medical;
            let emergency = &settings.emergency;
            if !medical.allergies.is_empty() {
                let allergies = medical.allergies.join(", ");
                lines.push(t.t("pdf.report.allergies", &[("allergies", &allergies)]));
            }
            if !emergency.doctor_name.is_empty() {
                lines.push(t.t("pdf.report.doctor", &[("doctorName", &emergency.doctor_name)]));
            }
            if !emergency.neurologist_name.is_empty() {
                lines.push(t.t(
                    "pdf.report.neurologist",
                    &[("neurologistName", &emergency.neurologist_name)],
                ));
            }
            if !medical.notes.is_empty() {
                notes = Some((t.t("pdf.report.medical_notes", &[]), medical.notes.clone()));
            }
        }

        PatientSection {
            heading: t.t("pdf.patient_info", &[]),
            lines,
            notes,
        }
    }

    fn episodes_section(&self, options: &ReportOptions) -> Section {
        let heading = self.t.t("pdf.report.episodes", &[]);
        let episodes: Vec<&Episode> = self
            .episodes
            .all()
            .iter()
            .filter(|e| options.in_range(i18n::local_day(e.timestamp)))
            .collect();

        if episodes.is_empty() {
            return Section {
                heading,
                break_after_mm: None,
                content: SectionContent::Empty(self.t.t("pdf.report.no_episodes_recorded", &[])),
            };
        }

        let level = options.episode_detail_level;
        let head = self.episode_headers(level);
        let body = episodes.iter().map(|e| self.episode_row(e, level)).collect();
        let style = match level {
            DetailLevel::Basic => TableStyle::new(8.0, 2.0),
            DetailLevel::Full => {
                TableStyle::new(8.0, 2.0).with_column_width(NOTES_COLUMN, NOTES_COLUMN_WIDTH)
            }
        };

        Section {
            heading,
            break_after_mm: Some(EPISODES_BREAK_AT),
            content: SectionContent::Table(Table { head, body, style }),
        }
    }

    fn episode_headers(&self, level: DetailLevel) -> Vec<String> {
        let keys: &[&str] = match level {
            DetailLevel::Basic => &["date", "time", "type"],
            DetailLevel::Full => &[
                "date", "time", "type", "severity", "duration", "triggers", "symptoms",
                "emergency", "notes",
            ],
        };
        keys.iter()
            .map(|k| self.t.t(&format!("pdf.report.{k}"), &[]))
            .collect()
    }

    fn episode_row(&self, episode: &Episode, level: DetailLevel) -> Vec<String> {
        let t = self.t;
        let date = i18n::format_local_date(t.locale(), episode.timestamp);
        let time = i18n::format_time(episode.timestamp);
        let episode_type = i18n::humanize(t, "episode_types.", &episode.episode_type);

        if level == DetailLevel::Basic {
            return vec![date, time, episode_type];
        }

        let symptoms = self.humanize_all(episode.all_symptoms());
        let triggers = self.humanize_all(episode.triggers.iter());

        let mut emergency = Vec::new();
        if episode.someone_witnessed {
            emergency.push(t.t("pdf.report.someone_witnessed", &[]));
        }
        if episode.emergency_called {
            emergency.push(t.t("pdf.report.emergency_called", &[]));
        }
        if episode.went_to_hospital {
            emergency.push(t.t("pdf.report.went_to_hospital", &[]));
        }

        vec![
            date,
            time,
            episode_type,
            or_placeholder(episode.severity.as_deref()),
            or_placeholder(episode.duration.as_deref()),
            triggers,
            symptoms,
            join_or_placeholder(&emergency),
            or_placeholder(episode.notes.as_deref()),
        ]
    }

    fn humanize_all<'b>(&self, codes: impl Iterator<Item = &'b String>) -> String {
        let labels: Vec<String> = codes.map(|c| i18n::humanize(self.t, "", c)).collect();
        join_or_placeholder(&labels)
    }

    /// Rows for deleted medications are dropped; if none remain, the section
    /// shows the empty notice rather than a bare heading.
    fn missed_section(&self, options: &ReportOptions) -> Section {
        let heading = self.t.t("pdf.report.missed_medications", &[]);
        let body: Vec<Vec<String>> = self
            .medications
            .missed_logs()
            .filter(|log| options.in_range(log.date))
            .filter_map(|log| {
                // Logs for medications that no longer exist are dropped
                let med = self.medications.get(log.med_id)?;
                Some(self.missed_row(log, med))
            })
            .collect();

        if body.is_empty() {
            return Section {
                heading,
                break_after_mm: Some(MISSED_EMPTY_BREAK_AT),
                content: SectionContent::Empty(
                    self.t.t("pdf.report.no_missed_medications_recorded", &[]),
                ),
            };
        }

        let head = ["date", "medication", "medication_dosage", "medication_frequency"]
            .iter()
            .map(|k| self.t.t(&format!("pdf.report.{k}"), &[]))
            .collect();

        Section {
            heading,
            break_after_mm: Some(MISSED_BREAK_AT),
            content: SectionContent::Table(Table {
                head,
                body,
                style: TableStyle::new(9.0, 3.0),
            }),
        }
    }

    fn missed_row(&self, log: &MedicationLog, med: &Medication) -> Vec<String> {
        let dose_label = if med.frequency > 1 {
            let current = (log.dose_index + 1).to_string();
            let total = med.frequency.to_string();
            self.t.t(
                "pdf.report.dose_label",
                &[("current", &current), ("total", &total)],
            )
        } else {
            self.t.t("pdf.report.single_dose", &[])
        };

        vec![
            i18n::format_date(self.t.locale(), log.date),
            med.name.clone(),
            med.dosage.clone(),
            dose_label,
        ]
    }
}

fn or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn join_or_placeholder(values: &[String]) -> String {
    if values.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        values.join(", ")
    }
}

/// Saves PDF bytes into `dir`, creating it if needed.
pub fn export_pdf_to_dir(artifact: &ReportArtifact, dir: &Path) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&artifact.file_name);
    std::fs::write(&path, &artifact.bytes)?;
    Ok(path)
}
