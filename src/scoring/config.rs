use serde::{Deserialize, Serialize};

/// Weight tables for both scoring modes.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   decision:
///     scale: 1
///     attributes:
///       - { key: impact, label: Impact, weight: 20 }
///       - { key: cost, label: Cost, weight: -15 }
///   comparison:
///     attributes:
///       - { key: urgency, label: Urgency, weight: 4 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Table used when scoring a single decision
    #[serde(default = "WeightTable::decision")]
    pub decision: WeightTable,

    /// Table used when comparing two tasks against each other
    #[serde(default = "WeightTable::comparison")]
    pub comparison: WeightTable,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            decision: WeightTable::decision(),
            comparison: WeightTable::comparison(),
        }
    }
}

/// Ordered set of weighted attributes.
///
/// Declaration order matters: it is the tie-break order for the breakdown and
/// the order questions are asked in.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightTable {
    /// Rescale constant applied to every contribution (default: 1)
    #[serde(default = "default_scale")]
    pub scale: i64,

    pub attributes: Vec<AttributeWeight>,
}

/// One rated dimension and its signed weight.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AttributeWeight {
    /// Stable key used in rating vectors and external scorer replies
    pub key: String,

    /// Human-readable label written to the journal
    pub label: String,

    /// Points per rating step; negative weights penalize
    pub weight: i64,

    /// Question shown when rating manually
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

fn default_scale() -> i64 {
    1
}

impl AttributeWeight {
    pub fn new(key: &str, label: &str, weight: i64, question: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            weight,
            question: Some(question.to_string()),
        }
    }

    /// Question to ask for this attribute, falling back to its label.
    pub fn question(&self) -> String {
        self.question
            .clone()
            .unwrap_or_else(|| format!("Rate {}", self.label.to_lowercase()))
    }
}

impl WeightTable {
    /// Single-decision table: what you gain against what it costs you.
    pub fn decision() -> Self {
        Self {
            scale: 1,
            attributes: vec![
                AttributeWeight::new("impact", "Impact", 20, "How much positive impact will this have?"),
                AttributeWeight::new("cost", "Cost", -15, "How costly is it (money, time, energy)?"),
                AttributeWeight::new("risk", "Risk", -15, "How risky is it?"),
                AttributeWeight::new("reversible", "Reversibility", 10, "How easy is it to undo?"),
            ],
        }
    }

    /// Two-task comparison table.
    pub fn comparison() -> Self {
        Self {
            scale: 1,
            attributes: vec![
                AttributeWeight::new("urgency", "Urgency", 4, "How urgent is it?"),
                AttributeWeight::new("importance", "Importance", 6, "How important is it?"),
                AttributeWeight::new(
                    "long_term_value",
                    "Long-term value",
                    5,
                    "How much long-term value does it create?",
                ),
                AttributeWeight::new("effort", "Effort", -3, "How much effort does it take?"),
            ],
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&AttributeWeight> {
        self.attributes.iter().find(|a| a.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();

        assert_eq!(config.decision.scale, 1);
        let keys: Vec<&str> = config.decision.keys().collect();
        assert_eq!(keys, vec!["impact", "cost", "risk", "reversible"]);

        let keys: Vec<&str> = config.comparison.keys().collect();
        assert_eq!(keys, vec!["urgency", "importance", "long_term_value", "effort"]);
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
decision:
  scale: 2
  attributes:
    - key: joy
      label: Joy
      weight: 10
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.decision.scale, 2);
        assert_eq!(config.decision.attributes.len(), 1);
        assert_eq!(config.decision.attributes[0].question(), "Rate joy");
        // Missing table falls back to the built-in one
        assert_eq!(config.comparison, WeightTable::comparison());
    }

    #[test]
    fn test_scale_defaults_to_one() {
        let yaml = r#"
attributes:
  - { key: a, label: A, weight: -5 }
"#;
        let table: WeightTable = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(table.scale, 1);
        assert_eq!(table.get("a").map(|a| a.weight), Some(-5));
        assert!(table.get("b").is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
attributes: []
bonus: 3
"#;
        let result: Result<WeightTable, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }
}
