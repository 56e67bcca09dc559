use serde::{Deserialize, Serialize};

/// Language used when none has been chosen.
pub const DEFAULT_LANGUAGE: &str = "nl";

/// The user's settings record.
///
/// Every level is `#[serde(default)]`, so a stored document missing any
/// key (including whole sub-objects) is backfilled from the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub profile: Profile,
    pub emergency: EmergencyContacts,
    pub medical: MedicalInfo,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    /// YYYY-MM-DD, or empty when not provided.
    pub date_of_birth: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContacts {
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_relation: String,
    pub doctor_name: String,
    pub doctor_phone: String,
    pub neurologist_name: String,
    pub neurologist_phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalInfo {
    pub allergies: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

// ─── Partial updates ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
}

impl ProfilePatch {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(v) = self.name {
            profile.name = v;
        }
        if let Some(v) = self.date_of_birth {
            profile.date_of_birth = v;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyPatch {
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_relation: Option<String>,
    pub doctor_name: Option<String>,
    pub doctor_phone: Option<String>,
    pub neurologist_name: Option<String>,
    pub neurologist_phone: Option<String>,
}

impl EmergencyPatch {
    pub fn apply(self, emergency: &mut EmergencyContacts) {
        let fields = [
            (self.contact_name, &mut emergency.contact_name),
            (self.contact_phone, &mut emergency.contact_phone),
            (self.contact_relation, &mut emergency.contact_relation),
            (self.doctor_name, &mut emergency.doctor_name),
            (self.doctor_phone, &mut emergency.doctor_phone),
            (self.neurologist_name, &mut emergency.neurologist_name),
            (self.neurologist_phone, &mut emergency.neurologist_phone),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalPatch {
    pub allergies: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl MedicalPatch {
    pub fn apply(self, medical: &mut MedicalInfo) {
        if let Some(v) = self.allergies {
            medical.allergies = v;
        }
        if let Some(v) = self.notes {
            medical.notes = v;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesPatch {
    pub language: Option<String>,
}

impl PreferencesPatch {
    pub fn apply(self, preferences: &mut Preferences) {
        if let Some(v) = self.language {
            preferences.language = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_is_backfilled() {
        let json = r#"{"profile":{"name":"Sam"},"medical":{"allergies":["penicillin"]}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.profile.name, "Sam");
        assert_eq!(settings.profile.date_of_birth, "");
        assert_eq!(settings.medical.allergies, vec!["penicillin"]);
        assert_eq!(settings.emergency, EmergencyContacts::default());
        assert_eq!(settings.preferences.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn empty_object_yields_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let json = r#"{"preferences":{"language":"en","theme":"dark"},"legacy":1}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.preferences.language, "en");
    }

    #[test]
    fn emergency_patch_is_shallow() {
        let mut emergency = EmergencyContacts {
            doctor_name: "Dr. Visser".into(),
            doctor_phone: "010-1234567".into(),
            ..EmergencyContacts::default()
        };
        EmergencyPatch {
            doctor_phone: Some("010-7654321".into()),
            ..EmergencyPatch::default()
        }
        .apply(&mut emergency);
        assert_eq!(emergency.doctor_name, "Dr. Visser");
        assert_eq!(emergency.doctor_phone, "010-7654321");
    }
}
