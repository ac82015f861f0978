use std::collections::HashSet;

use super::config::{ScoringConfig, WeightTable};

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    validate_table("scoring.decision", &config.decision, &mut errors);
    validate_table("scoring.comparison", &config.comparison, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_table(path: &str, table: &WeightTable, errors: &mut Vec<String>) {
    if table.scale < 1 {
        errors.push(format!("{}.scale: must be at least 1, got {}", path, table.scale));
    }

    if table.attributes.is_empty() {
        errors.push(format!("{}.attributes: at least one attribute is required", path));
    }

    let mut seen = HashSet::new();
    for (i, attr) in table.attributes.iter().enumerate() {
        let key = attr.key.trim();
        if key.is_empty() {
            errors.push(format!("{}.attributes[{}].key: must not be empty", path, i));
        } else if !seen.insert(key) {
            errors.push(format!(
                "{}.attributes[{}].key: duplicate key '{}'",
                path, i, key
            ));
        }

        if attr.label.trim().is_empty() {
            errors.push(format!("{}.attributes[{}].label: must not be empty", path, i));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::AttributeWeight;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_table_rejected() {
        let mut config = ScoringConfig::default();
        config.comparison.attributes.clear();

        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("scoring.comparison.attributes"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ScoringConfig::default();
        config.decision.scale = 0;
        config.decision.attributes.push(AttributeWeight {
            key: "impact".to_string(),
            label: " ".to_string(),
            weight: 1,
            question: None,
        });

        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("scale"));
        assert!(errors[1].contains("duplicate key 'impact'"));
        assert!(errors[2].contains("label"));
    }
}
