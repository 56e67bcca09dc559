use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DoseStatus;

fn default_frequency() -> u32 {
    1
}

/// A medication on the schedule. `end_date == None` means active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    /// Doses per day.
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    #[serde(default)]
    pub times: Vec<String>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub history: Vec<MedicationSnapshot>,
}

impl Medication {
    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }

    /// Copy of the current state without its history.
    pub fn snapshot(&self, archived_at: DateTime<Utc>) -> MedicationSnapshot {
        MedicationSnapshot {
            id: self.id,
            name: self.name.clone(),
            dosage: self.dosage.clone(),
            frequency: self.frequency,
            times: self.times.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            archived_at,
        }
    }
}

/// Prior state of a medication, kept when the record is edited.
///
/// Has no `history` of its own, so history never nests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationSnapshot {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    #[serde(default)]
    pub times: Vec<String>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub archived_at: DateTime<Utc>,
}

/// Input for adding a medication to the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedication {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    #[serde(default)]
    pub times: Vec<String>,
}

/// Partial medication update. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationPatch {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<u32>,
    pub times: Option<Vec<String>>,
}

impl MedicationPatch {
    pub fn apply(self, med: &mut Medication) {
        if let Some(v) = self.name {
            med.name = v;
        }
        if let Some(v) = self.dosage {
            med.dosage = v;
        }
        if let Some(v) = self.frequency {
            med.frequency = v;
        }
        if let Some(v) = self.times {
            med.times = v;
        }
    }
}

/// A dose-adherence event. Only missed doses are logged; a dose without
/// a matching row counts as taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLog {
    pub id: Uuid,
    pub med_id: Uuid,
    /// 0-based position within the day's doses.
    pub dose_index: u32,
    pub date: NaiveDate,
    pub status: DoseStatus,
    pub timestamp: DateTime<Utc>,
}

impl MedicationLog {
    pub fn matches(&self, med_id: Uuid, dose_index: u32, date: NaiveDate) -> bool {
        self.med_id == med_id
            && self.dose_index == dose_index
            && self.date == date
            && self.status == DoseStatus::Missed
    }
}
