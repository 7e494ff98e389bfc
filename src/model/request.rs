//! What a lesson asks the generation service to build.

use crate::types::{ThemeName, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of artifact the service should generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckFormat {
    #[default]
    Presentation,
    Webpage,
}

impl DeckFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Presentation => "presentation",
            Self::Webpage => "webpage",
        }
    }
}

impl FromStr for DeckFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "presentation" => Ok(Self::Presentation),
            "webpage" => Ok(Self::Webpage),
            other => Err(ValidationError::UnknownVariant {
                kind: "deck format",
                value: other.to_string(),
                expected: "presentation, webpage",
            }),
        }
    }
}

impl fmt::Display for DeckFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File format the service should export alongside the hosted deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Pptx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Pptx => "pptx",
        }
    }

    /// File extension used when the export is downloaded.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "pptx" => Ok(Self::Pptx),
            other => Err(ValidationError::UnknownVariant {
                kind: "export format",
                value: other.to_string(),
                expected: "pdf, pptx",
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access level granted on a generated deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessLevel {
    NoAccess,
    View,
    Comment,
    Edit,
    FullAccess,
}

/// Who can see the generated deck, inside and outside the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingPolicy {
    pub workspace_access: AccessLevel,
    pub external_access: AccessLevel,
}

impl Default for SharingPolicy {
    fn default() -> Self {
        Self {
            workspace_access: AccessLevel::Edit,
            external_access: AccessLevel::View,
        }
    }
}

/// Per-run generation settings; lessons may override format, theme and export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationOptions {
    pub format: DeckFormat,
    pub theme: ThemeName,
    pub export_as: Option<ExportFormat>,
    pub sharing: SharingPolicy,
    pub additional_instructions: Option<String>,
    pub text_language: Option<String>,
}

/// A single lesson's generation request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    source_text: String,
    title: String,
    format: DeckFormat,
    theme: ThemeName,
    export_as: Option<ExportFormat>,
    sharing: SharingPolicy,
    additional_instructions: Option<String>,
    text_language: Option<String>,
}

impl GenerationRequest {
    /// Builds a request, rejecting empty lesson text or an empty title.
    pub fn new(
        source_text: impl Into<String>,
        title: impl Into<String>,
        options: &GenerationOptions,
    ) -> Result<Self, ValidationError> {
        let source_text = source_text.into();
        if source_text.trim().is_empty() {
            return Err(ValidationError::EmptyField("source text"));
        }
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }

        Ok(Self {
            source_text,
            title,
            format: options.format,
            theme: options.theme.clone(),
            export_as: options.export_as,
            sharing: options.sharing,
            additional_instructions: non_blank(options.additional_instructions.as_deref()),
            text_language: non_blank(options.text_language.as_deref()),
        })
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn format(&self) -> DeckFormat {
        self.format
    }

    pub fn theme(&self) -> &ThemeName {
        &self.theme
    }

    pub fn export_as(&self) -> Option<ExportFormat> {
        self.export_as
    }

    pub fn sharing(&self) -> SharingPolicy {
        self.sharing
    }

    pub fn additional_instructions(&self) -> Option<&str> {
        self.additional_instructions.as_deref()
    }

    pub fn text_language(&self) -> Option<&str> {
        self.text_language.as_deref()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
