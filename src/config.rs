/// Application-level constants
pub const APP_NAME: &str = "Sutra";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> &'static str {
    "sutra_core=info"
}

/// Base origin embedded in referral redemption URLs.
/// Overridable via SUTRA_BASE_URL; trailing slashes are stripped.
pub fn base_url() -> String {
    std::env::var("SUTRA_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Voice-processing service endpoint.
/// Overridable via SUTRA_AI_URL.
pub fn voice_service_url() -> String {
    std::env::var("SUTRA_AI_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_sutra() {
        assert_eq!(APP_NAME, "Sutra");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn base_url_default_has_no_trailing_slash() {
        // Assumes SUTRA_BASE_URL is unset in the test environment
        assert!(!base_url().ends_with('/'));
    }

    #[test]
    fn voice_service_url_default() {
        assert!(!voice_service_url().is_empty());
        assert!(!voice_service_url().ends_with('/'));
    }
}
