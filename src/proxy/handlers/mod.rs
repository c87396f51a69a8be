pub mod admin_tokens;
pub mod content;
pub mod errors;
pub mod usage;
