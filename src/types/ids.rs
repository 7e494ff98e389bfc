use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the generation service assigns to a submitted job.
///
/// The value is opaque: it is never parsed, only trimmed and checked for
/// emptiness. It is percent-encoded when spliced into a request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(String);

impl GenerationId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(ValidationError::InvalidId(
                "generation ID cannot be empty".to_string(),
            ));
        }
        if value.chars().any(char::is_control) {
            return Err(ValidationError::InvalidId(format!(
                "generation ID contains control characters: {:?}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_rejects_empty_ids() {
        assert_eq!(GenerationId::new(" gen_123 ").unwrap().as_str(), "gen_123");
        assert!(GenerationId::new("").is_err());
        assert!(GenerationId::new("   ").is_err());
        assert!(GenerationId::new("bad\nid").is_err());
    }
}
