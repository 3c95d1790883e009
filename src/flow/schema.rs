//! Wire schemas for the agent and tool-server endpoints
//!
//! Every optional field is an `Option`; absence is decided here rather than
//! by ad-hoc lookups in the flow.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /agent/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

/// Reply of `POST /agent/initialize`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeResponse {
    pub message: Option<String>,
}

/// Reply of `POST /agent/chat`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    pub response: Option<String>,
    /// String entries only; anything else in the list is dropped
    #[serde(default, deserialize_with = "string_entries")]
    pub follow_up_suggestions: Option<Vec<String>>,
    pub metadata: Option<ChatMetadata>,
}

impl ChatResponse {
    /// `metadata.voice_compatible`, when the agent reported it
    pub fn voice_compatible(&self) -> Option<bool> {
        self.metadata.as_ref().and_then(|m| m.voice_compatible)
    }
}

fn string_entries<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => entries,
        _ => return Ok(None),
    };
    Ok(Some(
        entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect(),
    ))
}

/// Metadata block attached to a chat reply
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMetadata {
    pub voice_compatible: Option<bool>,
    /// Fields the harness does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMetadata {
    /// Flattens the block back into a plain map
    pub fn into_map(self) -> Map<String, Value> {
        let mut map = self.extra;
        if let Some(flag) = self.voice_compatible {
            map.insert("voice_compatible".to_string(), Value::Bool(flag));
        }
        map
    }
}

/// Reply of `GET /mcp/tools/descriptions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolDescriptions {
    pub tools: Option<Vec<ToolDescription>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolDescription {
    pub name: Option<String>,
}

/// Reply of `GET /metadata/stats`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataStats {
    pub total_embeddings: Option<u64>,
}
