//! Wire types for the generation API.

use crate::constants::{CARD_SPLIT, IMAGE_SOURCE, TEXT_MODE};
use crate::model::{DeckFormat, ExportFormat, GenerationRequest, SharingPolicy};
use serde::Serialize;

/// JSON body of `POST /generations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationBody {
    pub input_text: String,
    pub text_mode: &'static str,
    pub format: DeckFormat,
    pub theme_name: String,
    pub card_split: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_as: Option<ExportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_options: Option<TextOptions>,
    pub image_options: ImageOptions,
    pub sharing_options: SharingPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOptions {
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOptions {
    pub source: &'static str,
}

impl From<&GenerationRequest> for GenerationBody {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            input_text: request.source_text().to_string(),
            text_mode: TEXT_MODE,
            format: request.format(),
            theme_name: request.theme().to_string(),
            card_split: CARD_SPLIT,
            export_as: request.export_as(),
            text_options: request.text_language().map(|language| TextOptions {
                language: language.to_string(),
            }),
            image_options: ImageOptions {
                source: IMAGE_SOURCE,
            },
            sharing_options: request.sharing(),
            additional_instructions: request.additional_instructions().map(str::to_string),
        }
    }
}
