use serde::Deserialize;
use utoipa::ToSchema;

use super::prompt::{ContentType, RewriteStyle};

pub const GENERATE_PROMPT_LEN: (usize, usize) = (2, 4000);
pub const REWRITE_TEXT_LEN: (usize, usize) = (2, 8000);
pub const TRANSLATE_TEXT_LEN: (usize, usize) = (1, 8000);
const TONE_MAX_LEN: usize = 50;
const LANGUAGE_MAX_LEN: usize = 10;
const STYLE_MAX_LEN: usize = 50;
const LANG_CODE_MAX_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// One of `blog`, `product`, `email`, `social`.
    #[serde(rename = "type")]
    pub content_type: String,
    pub prompt: String,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RewriteRequest {
    pub text: String,
    /// `improved`, `formal`, `casual`, `concise` or `expanded`.
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
}

/// Generate request after field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidGenerate {
    pub content_type: ContentType,
    pub prompt: String,
    pub tone: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRewrite {
    pub text: String,
    pub style: RewriteStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTranslate {
    pub text: String,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
}

impl GenerateRequest {
    pub fn validate(self) -> Result<ValidGenerate, String> {
        let content_type = ContentType::parse(&self.content_type).ok_or_else(|| {
            format!(
                "type must be one of blog, product, email, social (got '{}')",
                self.content_type
            )
        })?;
        check_len("prompt", &self.prompt, GENERATE_PROMPT_LEN)?;
        let tone = optional_field("tone", self.tone, TONE_MAX_LEN)?;
        let language = optional_field("language", self.language, LANGUAGE_MAX_LEN)?;
        Ok(ValidGenerate {
            content_type,
            prompt: self.prompt,
            tone,
            language,
        })
    }
}

impl RewriteRequest {
    pub fn validate(self) -> Result<ValidRewrite, String> {
        check_len("text", &self.text, REWRITE_TEXT_LEN)?;
        let style = optional_field("style", self.style, STYLE_MAX_LEN)?;
        Ok(ValidRewrite {
            text: self.text,
            style: style
                .as_deref()
                .map(RewriteStyle::parse_or_default)
                .unwrap_or_default(),
        })
    }
}

impl TranslateRequest {
    pub fn validate(self) -> Result<ValidTranslate, String> {
        check_len("text", &self.text, TRANSLATE_TEXT_LEN)?;
        let source_lang = optional_field("source_lang", self.source_lang, LANG_CODE_MAX_LEN)?
            .filter(|lang| !lang.eq_ignore_ascii_case("auto"));
        let target_lang = optional_field("target_lang", self.target_lang, LANG_CODE_MAX_LEN)?;
        Ok(ValidTranslate {
            text: self.text,
            source_lang,
            target_lang,
        })
    }
}

fn check_len(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len < min || value.chars().count() > max {
        return Err(format!(
            "{} must be between {} and {} characters",
            field, min, max
        ));
    }
    Ok(())
}

/// Blank values count as absent.
fn optional_field(
    field: &str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, String> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > max => Err(format!(
            "{} must be at most {} characters",
            field, max
        )),
        other => Ok(other),
    }
}
