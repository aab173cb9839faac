//! Core types for api-cli

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Error, Result};

/// Opaque checkpoint identifier.
///
/// Virtuoso ids are integers, but users also write them as `cp_<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckpointId(String);

impl CheckpointId {
    /// Parse a user supplied id, rejecting blank input
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("checkpoint ID cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer form, with an optional `cp_` prefix stripped
    pub fn numeric(&self) -> Option<u64> {
        let digits = self.0.strip_prefix("cp_").unwrap_or(&self.0);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Value sent to the API: a number when possible, the raw string otherwise
    pub fn to_wire(&self) -> Value {
        match self.numeric() {
            Some(n) => Value::from(n),
            None => Value::from(self.0.clone()),
        }
    }

    /// Path segment for `/testcases/{id}` style URLs
    pub fn path_segment(&self) -> String {
        self.numeric()
            .map(|n| n.to_string())
            .unwrap_or_else(|| self.0.clone())
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CheckpointId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CheckpointId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Ok(Self(n.to_string())),
            Raw::Str(s) => CheckpointId::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Result of a step creation, rendered by every output format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    pub status: String,
    pub step_type: String,
    pub checkpoint_id: CheckpointId,
    pub step_id: u64,
    pub position: u32,
    pub parsed_step: String,
    pub using_context: bool,
    pub auto_position: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Standard Virtuoso response wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub item: Option<T>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Error payloads come either as a bare string or as `{code, message}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorBody {
    Message(String),
    Detailed {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<String> {
        match self {
            ApiErrorBody::Message(m) if !m.is_empty() => Some(m.clone()),
            ApiErrorBody::Detailed { code, message } => message
                .clone()
                .filter(|m| !m.is_empty())
                .or_else(|| code.clone()),
            _ => None,
        }
    }
}

/// A checkpoint (test case)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub goal_id: u64,
    #[serde(default)]
    pub snapshot_id: u64,
    #[serde(default)]
    pub title: String,
}

/// A reusable library checkpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCheckpoint {
    #[serde(default)]
    pub id: u64,
    #[serde(default, alias = "title")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<LibraryStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A step inside a library checkpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryStep {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub value: Value,
}

/// A journey (test suite) and the checkpoints it runs, in order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub goal_id: u64,
    #[serde(default)]
    pub snapshot_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub cases: Vec<JourneyCheckpoint>,
}

impl Journey {
    /// Display name, falling back to the title
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.title
        } else {
            &self.name
        }
    }

    /// Number the checkpoints 1..n in journey order
    pub fn number_checkpoints(&mut self) {
        for (i, case) in self.cases.iter_mut().enumerate() {
            case.position = u32::try_from(i + 1).unwrap_or(u32::MAX);
        }
    }
}

/// A checkpoint as listed inside a journey
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyCheckpoint {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub steps: Vec<Value>,
}

/// A test step as stored by Virtuoso
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub canonical_id: String,
    #[serde(default)]
    pub checkpoint_id: u64,
    #[serde(default)]
    pub step_index: u32,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub ignore_outcome: bool,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(default)]
    pub target: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_id_forms() {
        let plain = CheckpointId::parse(" 1678318 ").unwrap();
        assert_eq!(plain.as_str(), "1678318");
        assert_eq!(plain.to_wire(), Value::from(1678318u64));

        let prefixed = CheckpointId::parse("cp_9").unwrap();
        assert_eq!(prefixed.numeric(), Some(9));
        assert_eq!(prefixed.path_segment(), "9");
        assert_eq!(prefixed.to_string(), "cp_9");

        let opaque = CheckpointId::parse("cp_abc").unwrap();
        assert_eq!(opaque.numeric(), None);
        assert_eq!(opaque.to_wire(), Value::from("cp_abc"));

        assert!(CheckpointId::parse("   ").is_err());
    }

    #[test]
    fn test_checkpoint_id_accepts_integers() {
        let id: CheckpointId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");
        let id: CheckpointId = serde_json::from_str("\"cp_42\"").unwrap();
        assert_eq!(id.as_str(), "cp_42");
        assert!(serde_json::from_str::<CheckpointId>("\"\"").is_err());
    }

    #[test]
    fn test_error_body_message() {
        let plain: ApiErrorBody = serde_json::from_str("\"boom\"").unwrap();
        assert_eq!(plain.message().as_deref(), Some("boom"));

        let detailed: ApiErrorBody =
            serde_json::from_str(r#"{"code":"E1","message":"bad step"}"#).unwrap();
        assert_eq!(detailed.message().as_deref(), Some("bad step"));

        let code_only: ApiErrorBody = serde_json::from_str(r#"{"code":"E2"}"#).unwrap();
        assert_eq!(code_only.message().as_deref(), Some("E2"));
    }

    #[test]
    fn test_step_output_omits_empty_extra() {
        let output = StepOutput {
            status: "success".into(),
            step_type: "COMMENT".into(),
            checkpoint_id: CheckpointId::parse("1").unwrap(),
            step_id: 5,
            position: 2,
            parsed_step: "comment \"hi\"".into(),
            using_context: true,
            auto_position: false,
            extra: Map::new(),
        };
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("extra").is_none());
        assert_eq!(json["checkpoint_id"], "1");
    }

    #[test]
    fn test_journey_numbers_checkpoints() {
        let mut journey: Journey = serde_json::from_str(
            r#"{"id": 608048, "title": "Checkout", "cases": [{"id": 1, "title": "Navigate", "steps": [{}]}, {"id": 2, "title": "Pay"}]}"#,
        )
        .unwrap();
        journey.number_checkpoints();
        assert_eq!(journey.display_name(), "Checkout");
        assert_eq!(journey.cases[0].position, 1);
        assert_eq!(journey.cases[1].position, 2);
        assert_eq!(journey.cases[0].steps.len(), 1);
    }
}
