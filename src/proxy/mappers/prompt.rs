//! Prompt templates for the three content operations.

use super::models::{ValidGenerate, ValidRewrite, ValidTranslate};
use crate::proxy::upstream::CompletionRequest;

const DEFAULT_TONE: &str = "professional";
const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Blog,
    Product,
    Email,
    Social,
}

impl ContentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blog" => Some(ContentType::Blog),
            "product" => Some(ContentType::Product),
            "email" => Some(ContentType::Email),
            "social" => Some(ContentType::Social),
            _ => None,
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            ContentType::Blog => {
                "You are an expert blog writer and SEO specialist. \
                 Write engaging, well-structured blog content with proper headings (using Markdown), \
                 subheadings, bullet points, and a compelling introduction and conclusion. \
                 Optimize for readability and SEO. Include a meta description suggestion at the end."
            }
            ContentType::Product => {
                "You are a world-class copywriter specializing in product descriptions. \
                 Write compelling, benefit-driven product descriptions that convert. \
                 Use power words, highlight key features and benefits, include a call-to-action. \
                 Format with Markdown for readability."
            }
            ContentType::Email => {
                "You are an email marketing expert with high conversion rates. \
                 Write professional, engaging emails with a clear subject line suggestion, \
                 compelling body, and strong call-to-action. \
                 Format with Markdown. Include subject line at the top."
            }
            ContentType::Social => {
                "You are a social media content strategist. \
                 Create engaging social media posts optimized for engagement. \
                 Include relevant hashtag suggestions, emoji usage where appropriate, \
                 and format for maximum impact. Provide variations for different platforms \
                 (Twitter/X, LinkedIn, Instagram) in Markdown format."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriteStyle {
    #[default]
    Improved,
    Formal,
    Casual,
    Concise,
    Expanded,
}

impl RewriteStyle {
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "formal" => RewriteStyle::Formal,
            "casual" => RewriteStyle::Casual,
            "concise" => RewriteStyle::Concise,
            "expanded" => RewriteStyle::Expanded,
            _ => RewriteStyle::Improved,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            RewriteStyle::Improved => {
                "Improve the clarity, flow, and impact while keeping the original meaning."
            }
            RewriteStyle::Formal => "Rewrite in a formal, professional tone.",
            RewriteStyle::Casual => "Rewrite in a casual, conversational tone.",
            RewriteStyle::Concise => "Make it significantly more concise while keeping key points.",
            RewriteStyle::Expanded => "Expand with more detail, examples, and depth.",
        }
    }
}

const TRANSLATOR_SYSTEM_PROMPT: &str = "You are a professional translator fluent in all major languages. \
    Provide accurate, natural-sounding translations that preserve the original tone and meaning. \
    If the source language is Chinese, translate to English. \
    If the source language is English, translate to Chinese. \
    For other language pairs, follow the user's instructions. \
    Format the output in Markdown. After the translation, add a brief note about any \
    cultural or contextual adaptations you made.";

pub fn build_generate_prompt(req: &ValidGenerate) -> CompletionRequest {
    let mut system = req.content_type.system_prompt().to_string();
    if let Some(tone) = req.tone.as_deref().filter(|t| *t != DEFAULT_TONE) {
        system.push_str(&format!("\n\nUse a {} tone throughout.", tone));
    }
    if let Some(language) = req.language.as_deref().filter(|l| *l != DEFAULT_LANGUAGE) {
        system.push_str(&format!("\n\nWrite the content in {}.", language));
    }
    CompletionRequest {
        system,
        user: req.prompt.clone(),
    }
}

pub fn build_rewrite_prompt(req: &ValidRewrite) -> CompletionRequest {
    let system = format!(
        "You are an expert editor and writing coach. {} \
         Return the rewritten text in Markdown format. \
         After the rewrite, add a brief '---\\n**Changes made:**' section listing key improvements.",
        req.style.instruction()
    );
    CompletionRequest {
        system,
        user: format!("Please rewrite the following text:\n\n{}", req.text),
    }
}

/// Without an explicit language pair the text goes through as-is and the
/// system prompt's Chinese/English auto-detection applies.
pub fn build_translate_prompt(req: &ValidTranslate) -> CompletionRequest {
    let user = match (req.source_lang.as_deref(), req.target_lang.as_deref()) {
        (Some(source), Some(target)) => {
            format!("Translate from {} to {}:\n\n{}", source, target, req.text)
        }
        (Some(source), None) => format!(
            "Translate from {} to {}:\n\n{}",
            source, DEFAULT_LANGUAGE, req.text
        ),
        (None, Some(target)) => format!("Translate to {}:\n\n{}", target, req.text),
        (None, None) => req.text.clone(),
    };
    CompletionRequest {
        system: TRANSLATOR_SYSTEM_PROMPT.to_string(),
        user,
    }
}
