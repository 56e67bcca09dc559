//! Medicine reference list, bundled with the binary.
//!
//! Feeds name suggestions when the user adds a medication.

use serde::{Deserialize, Serialize};

const CATALOG: &str = include_str!("../resources/medicines.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub name: String,
    #[serde(default)]
    pub common_dosages: Vec<String>,
}

pub struct MedicineDatabase {
    medicines: Vec<Medicine>,
}

impl MedicineDatabase {
    /// Parses the bundled catalogue. A catalogue that fails to parse is
    /// logged and yields an empty database.
    pub fn bundled() -> Self {
        match serde_json::from_str::<Vec<Medicine>>(CATALOG) {
            Ok(medicines) => Self::from_medicines(medicines),
            Err(e) => {
                tracing::error!(error = %e, "Bundled medicine catalogue is malformed");
                Self::from_medicines(Vec::new())
            }
        }
    }

    pub fn from_medicines(medicines: Vec<Medicine>) -> Self {
        Self { medicines }
    }

    pub fn all(&self) -> &[Medicine] {
        &self.medicines
    }

    /// Case-insensitive substring match on name. An empty query matches all.
    pub fn search(&self, query: &str) -> Vec<&Medicine> {
        if query.is_empty() {
            return self.medicines.iter().collect();
        }
        let needle = query.to_lowercase();
        self.medicines
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalogue_parses() {
        let db = MedicineDatabase::bundled();
        assert!(db.all().len() > 20);
        assert!(db.all().iter().all(|m| !m.name.is_empty()));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let db = MedicineDatabase::bundled();
        let hits: Vec<&str> = db.search("TRIGINE").iter().map(|m| m.name.as_str()).collect();
        assert_eq!(hits, vec!["Lamotrigine"]);

        let azepines = db.search("azepam");
        assert!(azepines.iter().any(|m| m.name == "Clonazepam"));
        assert!(azepines.iter().any(|m| m.name == "Diazepam"));
    }

    #[test]
    fn empty_query_returns_everything() {
        let db = MedicineDatabase::bundled();
        assert_eq!(db.search("").len(), db.all().len());
    }

    #[test]
    fn no_match_is_empty() {
        let db = MedicineDatabase::from_medicines(vec![Medicine {
            name: "Levetiracetam".into(),
            common_dosages: vec![],
        }]);
        assert!(db.search("aspirin").is_empty());
    }
}
