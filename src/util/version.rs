pub const APP_NAME: &str = "Fiber Cost Console";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

/// Release tag when built from a tagged checkout, package version otherwise.
pub const VERSION_TEXT: &str = match GIT_TAG {
    Some(tag) => tag,
    None => APP_VERSION,
};

pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.to_string()
    } else {
        format!("v{}", APP_VERSION)
    }
}

pub fn user_agent() -> String {
    format!("fiber-cost-console/{}", version_label().trim_start_matches('v'))
}
