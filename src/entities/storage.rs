use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::types::{Entity, EntityFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityFormat {
    Yaml,
    Json,
}

impl EntityFormat {
    /// `.json` files are JSON, everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => EntityFormat::Json,
            _ => EntityFormat::Yaml,
        }
    }
}

/// Load entity score sets from a data file.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The content cannot be parsed
/// - A known category carries a non-finite score
pub fn load_entities(path: &Path) -> Result<Vec<Entity>> {
    if !path.exists() {
        anyhow::bail!("Entity data file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entity data at {}", path.display()))?;

    parse_entities(&content, EntityFormat::from_path(path))
        .with_context(|| format!("Invalid entity data in {}", path.display()))
}

/// Parse entity data and drop duplicate ids after their first occurrence.
pub fn parse_entities(content: &str, format: EntityFormat) -> Result<Vec<Entity>> {
    let file: EntityFile = match format {
        EntityFormat::Yaml => serde_saphyr::from_str(content).context("Failed to parse YAML")?,
        EntityFormat::Json => serde_json::from_str(content).context("Failed to parse JSON")?,
    };

    let mut seen_ids = HashSet::new();
    let mut entities = Vec::with_capacity(file.entities.len());
    for record in file.entities {
        if !seen_ids.insert(record.id.clone()) {
            tracing::warn!(entity = %record.id, "duplicate entity id, keeping first occurrence");
            continue;
        }
        entities.push(record.into_entity().map_err(anyhow::Error::msg)?);
    }

    tracing::debug!(count = entities.len(), "loaded entities");
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Category;
    use std::io::Write;

    const SAMPLE_YAML: &str = r#"
entities:
  - id: "1"
    name: Alice Example
    net_worth: 245.3
    scores:
      social: 20
      environmental: 15
      political: 10
      philanthropy: 18
      cultural: 5
  - id: "2"
    name: Bob Example
    scores:
      social: 12
      environmental: 8
      political: 14
      philanthropy: 3
      cultural: 9
      transparency: 4
"#;

    #[test]
    fn test_parse_yaml() {
        let entities = parse_entities(SAMPLE_YAML, EntityFormat::Yaml).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name, "Alice Example");
        assert_eq!(entities[0].net_worth, Some(245.3));
        assert_eq!(entities[0].scores.get(Category::Philanthropy), Some(18.0));
        assert_eq!(entities[1].net_worth, None);
        assert_eq!(entities[1].scores.len(), Category::COUNT);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"entities":[{"id":"x","name":"X","scores":{"social":1.5}}]}"#;
        let entities = parse_entities(json, EntityFormat::Json).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].scores.get(Category::Social), Some(1.5));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let json = r#"{"entities":[
            {"id":"a","name":"First","scores":{}},
            {"id":"a","name":"Second","scores":{}}
        ]}"#;
        let entities = parse_entities(json, EntityFormat::Json).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "First");
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(parse_entities("entities: [", EntityFormat::Yaml).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(EntityFormat::from_path(Path::new("data.json")), EntityFormat::Json);
        assert_eq!(EntityFormat::from_path(Path::new("data.JSON")), EntityFormat::Json);
        assert_eq!(EntityFormat::from_path(Path::new("data.yaml")), EntityFormat::Yaml);
        assert_eq!(EntityFormat::from_path(Path::new("data")), EntityFormat::Yaml);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(SAMPLE_YAML.as_bytes()).unwrap();

        let entities = load_entities(file.path()).unwrap();
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_entities(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
