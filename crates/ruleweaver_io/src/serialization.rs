//! JSON helpers with uniform error mapping.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};

/// Serializes data to compact JSON.
pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Serializes data to indented JSON for human readers.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from a JSON string. Blank input is a validation error.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleweaver_core::rules::RuleSet;

    #[test]
    fn test_rule_set_through_json() {
        let rules = RuleSet {
            gravity: 0.4,
            enable_weather: true,
            ..Default::default()
        };
        let json = to_json(&rules).expect("serialize rules");
        let restored: RuleSet = from_json(&json).expect("deserialize rules");
        assert_eq!(rules, restored);
    }

    #[test]
    fn test_empty_json_rejected() {
        let result: Result<RuleSet> = from_json("   ");
        assert!(matches!(result, Err(IoError::Validation(_))));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result: Result<RuleSet> = from_json("{\"gravity\": ");
        assert!(matches!(result, Err(IoError::Serialization(_))));
    }

    #[test]
    fn test_pretty_json_reads_back() {
        let rules = RuleSet {
            resource_abundance: 2.5,
            ..Default::default()
        };
        let json = to_json_pretty(&rules).expect("serialize rules");
        assert!(json.lines().count() > 1);
        let restored: RuleSet = from_json(&json).expect("deserialize rules");
        assert_eq!(restored, rules);
    }
}
