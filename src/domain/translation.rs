//! Translation payloads matching the DeepL v2 `/translate` schema.

use serde::{Deserialize, Serialize};

/// DeepL target language code for Japanese.
pub const TARGET_LANG_JA: &str = "JA";

/// One translated text block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslatedSegment {
    pub text: String,
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

/// Successful translation result.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranslationResponse {
    #[serde(default)]
    pub translations: Vec<TranslatedSegment>,
}

impl TranslationResponse {
    /// Text of the first segment, the only one a single-text request yields.
    pub fn first_text(&self) -> Option<&str> {
        self.translations.first().map(|segment| segment.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_ignores_later_segments() {
        let response: TranslationResponse = serde_json::from_str(
            r#"{"translations":[
                {"detected_source_language":"EN","text":"最初"},
                {"text":"二番目"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(response.first_text(), Some("最初"));
        assert_eq!(
            response.translations[0].detected_source_language.as_deref(),
            Some("EN")
        );
        assert_eq!(response.translations[1].detected_source_language, None);
    }

    #[test]
    fn test_first_text_empty() {
        assert_eq!(TranslationResponse::default().first_text(), None);
    }
}
