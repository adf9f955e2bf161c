//! Inbound plan request.

use serde::{Deserialize, Deserializer, Serialize, de};

/// Body of a plan request.
///
/// `requirements` is the planning goal. The patient fields are accepted so
/// clients can send a complete intake form, but the pipeline does not read
/// them; they are reserved until their use in the prompt is decided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_age",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
}

/// Accepts an integer, an integral float (`54.0`) or a numeric string
/// (`"54"`). The value is not range-checked; it is never interpreted.
fn lenient_age<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAge {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Option::<RawAge>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawAge::Int(n)) => Ok(Some(n)),
        Some(RawAge::Float(f)) if f.fract() == 0.0 && f.is_finite() => Ok(Some(f as i64)),
        Some(RawAge::Float(f)) => Err(de::Error::custom(format!(
            "age must be a whole number, got {f}"
        ))),
        Some(RawAge::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("age must be a whole number, got {text:?}"))),
    }
}

impl PlanRequest {
    /// A request carrying only a goal.
    pub fn from_goal(goal: impl Into<String>) -> Self {
        Self {
            requirements: Some(goal.into()),
            ..Self::default()
        }
    }

    /// `true` when the goal is present and not blank.
    pub fn has_goal(&self) -> bool {
        self.requirements
            .as_deref()
            .is_some_and(|goal| !goal.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_form() {
        let json = r#"{
            "patient_name": "Jo",
            "age": 61,
            "condition": "COPD",
            "priority": "High",
            "requirements": "COPD exacerbation plan"
        }"#;
        let req: PlanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.age, Some(61));
        assert_eq!(req.priority.as_deref(), Some("High"));
        assert!(req.has_goal());
    }

    #[test]
    fn deserializes_goal_only() {
        let req: PlanRequest = serde_json::from_str(r#"{"requirements": "asthma"}"#).unwrap();
        assert_eq!(req, PlanRequest::from_goal("asthma"));
    }

    #[test]
    fn age_accepts_loose_numeric_forms() {
        for (body, expected) in [
            (r#"{"age": -1}"#, Some(-1)),
            (r#"{"age": "54"}"#, Some(54)),
            (r#"{"age": 54.0}"#, Some(54)),
            (r#"{"age": null}"#, None),
        ] {
            let req: PlanRequest = serde_json::from_str(body).unwrap();
            assert_eq!(req.age, expected, "body: {body}");
        }
    }

    #[test]
    fn age_rejects_non_numbers() {
        assert!(serde_json::from_str::<PlanRequest>(r#"{"age": "old"}"#).is_err());
        assert!(serde_json::from_str::<PlanRequest>(r#"{"age": 54.5}"#).is_err());
    }

    #[test]
    fn missing_or_blank_goal() {
        let req: PlanRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.has_goal());
        assert!(!PlanRequest::from_goal("  ").has_goal());
    }

    #[test]
    fn serializes_without_absent_metadata() {
        let json = serde_json::to_value(PlanRequest::from_goal("gout")).unwrap();
        assert_eq!(json, serde_json::json!({"requirements": "gout"}));
    }
}
