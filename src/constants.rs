use std::sync::LazyLock;

pub const APP_NAME: &str = "writeflow";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub static USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}/{} {}/{}",
        APP_NAME,
        VERSION,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
});
