pub mod models;
pub mod prompt;

pub use models::{GenerateRequest, RewriteRequest, TranslateRequest};
pub use prompt::{build_generate_prompt, build_rewrite_prompt, build_translate_prompt};
