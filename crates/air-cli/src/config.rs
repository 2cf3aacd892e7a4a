//! Configuration for the `air` command
//!
//! CLI arguments with environment fallbacks using clap. A `.env` file is
//! loaded before parsing.

use air_sdk::{parse_demo_flag, BackendSettings, MemberConfig};
use clap::Parser;
use std::path::PathBuf;

use crate::commands::Command;

/// Directory name under the platform data dir
pub const DATA_DIR_NAME: &str = "air-members";

/// AIR Members - opportunities, pipeline and rates for independent media workers
#[derive(Parser, Debug, Clone)]
#[command(name = "air")]
#[command(about = "AIR Members dashboard from the command line")]
pub struct Args {
    /// Hosted backend base URL
    #[arg(long, env = "AIR_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Hosted backend public anon key
    #[arg(long, env = "AIR_BACKEND_ANON_KEY", hide_env_values = true)]
    pub backend_anon_key: Option<String>,

    /// Allow local demo sign-in; only the literal "false" disables it
    #[arg(long, env = "AIR_ENABLE_DEMO_AUTH")]
    pub enable_demo_auth: Option<String>,

    /// Profile directory for local data (default: platform data dir)
    #[arg(long, env = "AIR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Backend request timeout in seconds
    #[arg(long, env = "AIR_REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Effective profile directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DATA_DIR_NAME)
        })
    }

    pub fn demo_auth_enabled(&self) -> bool {
        parse_demo_flag(self.enable_demo_auth.as_deref())
    }

    /// Backend settings, present only when both URL and key are set
    pub fn backend(&self) -> Option<BackendSettings> {
        BackendSettings::from_parts(
            self.backend_url.as_deref(),
            self.backend_anon_key.as_deref(),
            self.request_timeout_secs,
        )
    }

    pub fn member_config(&self) -> MemberConfig {
        let config = MemberConfig::new(self.data_dir()).with_demo_auth(self.demo_auth_enabled());
        match self.backend() {
            Some(backend) => config.with_backend(backend),
            None => config,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("AIR_REQUEST_TIMEOUT_SECS must be at least 1".into());
        }
        if let Some(url) = self.backend_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("AIR_BACKEND_URL must be an http(s) URL, got {}", url));
            }
        }
        Ok(())
    }
}
