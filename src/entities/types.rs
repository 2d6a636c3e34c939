use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scoring::{Category, EntityScoreSet};

/// A ranked public figure and its externally sourced category scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub net_worth: Option<f64>, // billions, display only
    pub scores: EntityScoreSet,
}

/// On-disk shape of an entity data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityFile {
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

/// One entity as it appears in the data file.
///
/// Score keys are free-form so newer data sets can carry extra dimensions;
/// only the known categories are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub net_worth: Option<f64>,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

impl EntityRecord {
    /// Map score keys onto categories. Unknown keys are ignored; a
    /// non-finite value for a known category is an error.
    pub fn into_entity(self) -> Result<Entity, String> {
        let mut scores = EntityScoreSet::new();
        for (key, value) in &self.scores {
            match key.parse::<Category>() {
                Ok(category) => {
                    if !value.is_finite() {
                        return Err(format!(
                            "entity '{}': score for {} is not a finite number",
                            self.id, category
                        ));
                    }
                    scores.insert(category, *value);
                }
                Err(_) => {
                    tracing::debug!(entity = %self.id, key = %key, "ignoring unknown score key");
                }
            }
        }

        Ok(Entity {
            id: self.id,
            name: self.name,
            net_worth: self.net_worth,
            scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(scores: &[(&str, f64)]) -> EntityRecord {
        EntityRecord {
            id: "1".to_string(),
            name: "Test Person".to_string(),
            net_worth: Some(120.5),
            scores: scores.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_into_entity_maps_categories() {
        let entity = record(&[("social", 20.0), ("Cultural", 5.0)])
            .into_entity()
            .unwrap();
        assert_eq!(entity.scores.get(Category::Social), Some(20.0));
        assert_eq!(entity.scores.get(Category::Cultural), Some(5.0));
        assert_eq!(entity.scores.get(Category::Political), None);
        assert_eq!(entity.net_worth, Some(120.5));
    }

    #[test]
    fn test_into_entity_ignores_unknown_keys() {
        let entity = record(&[("social", 20.0), ("economic", 99.0)])
            .into_entity()
            .unwrap();
        assert_eq!(entity.scores.len(), 1);
    }

    #[test]
    fn test_into_entity_rejects_nan() {
        let result = record(&[("social", f64::NAN)]).into_entity();
        assert!(result.unwrap_err().contains("social"));
    }
}
