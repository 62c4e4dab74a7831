use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// Limits are measured in characters, not bytes: requirements are usually
// CJK text where the two differ.
pub const MIN_REQUIREMENT_CHARS: usize = 2;
pub const MAX_REQUIREMENT_CHARS: usize = 100;

// API request body
#[derive(Deserialize, Serialize, Clone)]
pub struct GenerateRequest {
    #[serde(default)]
    pub requirement: String,
}

impl GenerateRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.requirement.is_empty() {
            return Err(ApiError::MissingRequirement);
        }
        let chars = self.requirement.chars().count();
        if chars < MIN_REQUIREMENT_CHARS {
            return Err(ApiError::RequirementTooShort);
        }
        if chars > MAX_REQUIREMENT_CHARS {
            return Err(ApiError::RequirementTooLong);
        }
        Ok(())
    }
}

// Chat completion request format
#[derive(Serialize, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// One streamed chat completion chunk; only the first choice's delta is used
#[derive(Deserialize, Debug)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChatChoice {
    #[serde(default)]
    pub delta: ChatDelta,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChatDelta {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(requirement: &str) -> GenerateRequest {
        GenerateRequest {
            requirement: requirement.to_string(),
        }
    }

    #[test]
    fn empty_requirement_is_missing() {
        assert!(matches!(
            request("").validate(),
            Err(ApiError::MissingRequirement)
        ));
    }

    #[test]
    fn single_character_is_too_short() {
        assert!(matches!(
            request("诗").validate(),
            Err(ApiError::RequirementTooShort)
        ));
        assert!(matches!(
            request("a").validate(),
            Err(ApiError::RequirementTooShort)
        ));
    }

    #[test]
    fn two_characters_pass() {
        assert!(request("作诗").validate().is_ok());
        assert!(request("ok").validate().is_ok());
    }

    #[test]
    fn hundred_characters_pass() {
        assert!(request(&"字".repeat(100)).validate().is_ok());
    }

    #[test]
    fn hundred_and_one_characters_are_too_long() {
        assert!(matches!(
            request(&"字".repeat(101)).validate(),
            Err(ApiError::RequirementTooLong)
        ));
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        // 100 CJK characters are 300 UTF-8 bytes but still within the limit
        let requirement = "写".repeat(100);
        assert!(requirement.len() > MAX_REQUIREMENT_CHARS);
        assert!(request(&requirement).validate().is_ok());
    }

    #[test]
    fn missing_field_deserializes_to_empty() {
        let parsed: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert!(parsed.requirement.is_empty());
    }

    #[test]
    fn chunk_with_role_only_delta_has_no_content() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert!(chunk.choices[0].delta.content.is_none());
    }
}
