//! SDK configuration
//!
//! Built by the front end (CLI flags / environment) and handed to the
//! session resolver and data dispatcher. Remote mode is available only when
//! both the backend URL and anon key are present.

use std::path::PathBuf;

/// Hosted backend connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Backend base URL
    pub url: String,
    /// Public anon key
    pub anon_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BackendSettings {
    /// Settings from optional URL and key; `None` unless both are non-blank
    pub fn from_parts(url: Option<&str>, anon_key: Option<&str>, timeout_secs: u64) -> Option<Self> {
        let url = url.map(str::trim).filter(|u| !u.is_empty())?;
        let anon_key = anon_key.map(str::trim).filter(|k| !k.is_empty())?;
        Some(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            timeout_secs,
        })
    }
}

/// Configuration for the member core
#[derive(Debug, Clone)]
pub struct MemberConfig {
    /// Hosted backend, if configured
    pub backend: Option<BackendSettings>,
    /// Whether local demo sign-in is allowed
    pub demo_auth_enabled: bool,
    /// Profile directory for the local mirror store
    pub data_dir: PathBuf,
}

impl MemberConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: None,
            demo_auth_enabled: true,
            data_dir: data_dir.into(),
        }
    }

    pub fn with_backend(mut self, backend: BackendSettings) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_demo_auth(mut self, enabled: bool) -> Self {
        self.demo_auth_enabled = enabled;
        self
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Neither remote nor demo sign-in is possible; the front end should
    /// show a persistent notice.
    pub fn auth_unavailable(&self) -> bool {
        !self.has_backend() && !self.demo_auth_enabled
    }
}

/// Parse the demo-auth flag: anything other than the literal `false`
/// leaves demo sign-in enabled.
pub fn parse_demo_flag(raw: Option<&str>) -> bool {
    raw.map(|v| v.trim() != "false").unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_needs_both_parts() {
        assert!(BackendSettings::from_parts(Some("https://x.test"), None, 30).is_none());
        assert!(BackendSettings::from_parts(Some("  "), Some("key"), 30).is_none());

        let settings = BackendSettings::from_parts(Some("https://x.test/"), Some("key"), 30).unwrap();
        assert_eq!(settings.url, "https://x.test");
    }

    #[test]
    fn test_demo_flag_defaults_on() {
        assert!(parse_demo_flag(None));
        assert!(parse_demo_flag(Some("true")));
        assert!(parse_demo_flag(Some("0")));
        assert!(!parse_demo_flag(Some("false")));
    }

    #[test]
    fn test_auth_unavailable() {
        let config = MemberConfig::new("/tmp/air").with_demo_auth(false);
        assert!(config.auth_unavailable());

        let config = config.with_backend(BackendSettings {
            url: "https://x.test".into(),
            anon_key: "k".into(),
            timeout_secs: 30,
        });
        assert!(!config.auth_unavailable());
    }
}
