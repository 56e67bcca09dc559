use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Episode type code used when none was recorded.
pub const DEFAULT_EPISODE_TYPE: &str = "general";

fn default_episode_type() -> String {
    DEFAULT_EPISODE_TYPE.to_string()
}

/// Free-text field that older entries may hold as a number or boolean.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!("expected text, found {other}"))),
    }
}

/// RFC 3339, or a zoneless `datetime-local` value read as local time.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, format) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return Ok(local.with_timezone(&Utc));
            }
        }
    }
    Err(D::Error::custom(format!("invalid timestamp: {raw}")))
}

/// A recorded seizure or health event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: Uuid,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type", default = "default_episode_type")]
    pub episode_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub duration: Option<String>,
    #[serde(default)]
    pub warning_symptoms: Vec<String>,
    #[serde(default)]
    pub during_symptoms: Vec<String>,
    #[serde(default)]
    pub after_symptoms: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub someone_witnessed: bool,
    #[serde(default)]
    pub emergency_called: bool,
    #[serde(default)]
    pub went_to_hospital: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Episode {
    /// Warning, during and after symptoms in that order.
    pub fn all_symptoms(&self) -> impl Iterator<Item = &String> {
        self.warning_symptoms
            .iter()
            .chain(self.during_symptoms.iter())
            .chain(self.after_symptoms.iter())
    }
}

/// Input for recording a new episode.
///
/// `timestamp` defaults to the moment of recording; pass one to log an
/// episode after the fact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEpisode {
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub episode_type: Option<String>,
    pub severity: Option<String>,
    pub duration: Option<String>,
    pub warning_symptoms: Vec<String>,
    pub during_symptoms: Vec<String>,
    pub after_symptoms: Vec<String>,
    pub triggers: Vec<String>,
    pub someone_witnessed: bool,
    pub emergency_called: bool,
    pub went_to_hospital: bool,
    pub notes: Option<String>,
}

impl NewEpisode {
    pub fn of_type(episode_type: impl Into<String>) -> Self {
        Self {
            episode_type: Some(episode_type.into()),
            ..Self::default()
        }
    }

    pub(crate) fn into_episode(self, id: Uuid, now: DateTime<Utc>) -> Episode {
        Episode {
            id,
            timestamp: self.timestamp.unwrap_or(now),
            episode_type: self.episode_type.unwrap_or_else(default_episode_type),
            severity: self.severity,
            duration: self.duration,
            warning_symptoms: self.warning_symptoms,
            during_symptoms: self.during_symptoms,
            after_symptoms: self.after_symptoms,
            triggers: self.triggers,
            someone_witnessed: self.someone_witnessed,
            emergency_called: self.emergency_called,
            went_to_hospital: self.went_to_hospital,
            notes: self.notes,
        }
    }
}

/// Partial episode update. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EpisodePatch {
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub episode_type: Option<String>,
    pub severity: Option<String>,
    pub duration: Option<String>,
    pub warning_symptoms: Option<Vec<String>>,
    pub during_symptoms: Option<Vec<String>>,
    pub after_symptoms: Option<Vec<String>>,
    pub triggers: Option<Vec<String>>,
    pub someone_witnessed: Option<bool>,
    pub emergency_called: Option<bool>,
    pub went_to_hospital: Option<bool>,
    pub notes: Option<String>,
}

impl EpisodePatch {
    pub fn apply(self, episode: &mut Episode) {
        if let Some(v) = self.timestamp {
            episode.timestamp = v;
        }
        if let Some(v) = self.episode_type {
            episode.episode_type = v;
        }
        if let Some(v) = self.severity {
            episode.severity = Some(v);
        }
        if let Some(v) = self.duration {
            episode.duration = Some(v);
        }
        if let Some(v) = self.warning_symptoms {
            episode.warning_symptoms = v;
        }
        if let Some(v) = self.during_symptoms {
            episode.during_symptoms = v;
        }
        if let Some(v) = self.after_symptoms {
            episode.after_symptoms = v;
        }
        if let Some(v) = self.triggers {
            episode.triggers = v;
        }
        if let Some(v) = self.someone_witnessed {
            episode.someone_witnessed = v;
        }
        if let Some(v) = self.emergency_called {
            episode.emergency_called = v;
        }
        if let Some(v) = self.went_to_hospital {
            episode.went_to_hospital = v;
        }
        if let Some(v) = self.notes {
            episode.notes = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_json_uses_browser_field_names() {
        let json = r#"{
            "id": "7f1c8f1e-35a5-4a4e-9b8e-0d6f2b1f6a11",
            "timestamp": "2024-03-01T08:30:00.000Z",
            "type": "tonic_clonic",
            "warningSymptoms": ["aura"],
            "someoneWitnessed": true
        }"#;
        let ep: Episode = serde_json::from_str(json).unwrap();
        assert_eq!(ep.episode_type, "tonic_clonic");
        assert_eq!(ep.warning_symptoms, vec!["aura"]);
        assert!(ep.someone_witnessed);
        assert!(!ep.went_to_hospital);
        assert!(ep.notes.is_none());

        let back = serde_json::to_value(&ep).unwrap();
        assert_eq!(back["type"], "tonic_clonic");
        assert_eq!(back["someoneWitnessed"], true);
    }

    #[test]
    fn missing_type_defaults_to_general() {
        let json = r#"{"id":"7f1c8f1e-35a5-4a4e-9b8e-0d6f2b1f6a11","timestamp":"2024-03-01T08:30:00Z"}"#;
        let ep: Episode = serde_json::from_str(json).unwrap();
        assert_eq!(ep.episode_type, DEFAULT_EPISODE_TYPE);
    }

    #[test]
    fn numeric_severity_and_zoneless_timestamp_decode() {
        let json = r#"{
            "id": "7f1c8f1e-35a5-4a4e-9b8e-0d6f2b1f6a11",
            "timestamp": "2024-03-01T08:30",
            "severity": 3,
            "duration": null
        }"#;
        let ep: Episode = serde_json::from_str(json).unwrap();
        assert_eq!(ep.severity.as_deref(), Some("3"));
        assert!(ep.duration.is_none());

        let naive = NaiveDateTime::parse_from_str("2024-03-01T08:30", "%Y-%m-%dT%H:%M").unwrap();
        assert_eq!(ep.timestamp.with_timezone(&Local).naive_local(), naive);
    }

    #[test]
    fn unreadable_timestamp_is_rejected() {
        let json = r#"{"id":"7f1c8f1e-35a5-4a4e-9b8e-0d6f2b1f6a11","timestamp":"yesterday"}"#;
        assert!(serde_json::from_str::<Episode>(json).is_err());
    }

    #[test]
    fn symptoms_are_chained_in_phase_order() {
        let mut ep = NewEpisode::default().into_episode(Uuid::new_v4(), Utc::now());
        ep.warning_symptoms = vec!["aura".into()];
        ep.during_symptoms = vec!["jerking".into()];
        ep.after_symptoms = vec!["fatigue".into()];
        let all: Vec<&String> = ep.all_symptoms().collect();
        assert_eq!(all, vec!["aura", "jerking", "fatigue"]);
    }

    #[test]
    fn patch_leaves_unset_fields_alone() {
        let mut ep = NewEpisode {
            severity: Some("mild".into()),
            notes: Some("before".into()),
            ..NewEpisode::of_type("absence")
        }
        .into_episode(Uuid::new_v4(), Utc::now());

        EpisodePatch {
            notes: Some("after".into()),
            ..EpisodePatch::default()
        }
        .apply(&mut ep);

        assert_eq!(ep.notes.as_deref(), Some("after"));
        assert_eq!(ep.severity.as_deref(), Some("mild"));
        assert_eq!(ep.episode_type, "absence");
    }
}
