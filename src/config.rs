//! Runtime configuration
//!
//! Every option is a CLI flag that falls back to an environment variable
//! (`.env` files are loaded before parsing).

use crate::store::{
    gist::{DEFAULT_GIST_FILE, GIST_API_BASE},
    jsonbin::JSONBIN_API_BASE,
    GistTarget, JsonBinTarget, LocalFileTarget, StorageTarget,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const DEV_SITE_PASSWORD: &str = "change-me";
const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

#[derive(Debug, Clone, Parser)]
#[command(name = "clubhouse", about = "Club ledger backend")]
pub struct AppConfig {
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    #[arg(long, env = "SITE_PASSWORD", default_value = DEV_SITE_PASSWORD, hide_env_values = true)]
    pub site_password: String,

    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Session lifetime; at least one hour.
    #[arg(
        long,
        env = "TOKEN_TTL_HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub token_ttl_hours: i64,

    /// Directory holding `db.json` and its backups.
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, env = "BACKUP_RETENTION", default_value_t = 5)]
    pub backup_retention: usize,

    #[arg(long, env = "AUTOSAVE_SECS", default_value_t = 300)]
    pub autosave_secs: u64,

    #[arg(long, env = "JSONBIN_API_KEY", hide_env_values = true)]
    pub jsonbin_api_key: Option<String>,

    #[arg(long, env = "JSONBIN_BIN_ID")]
    pub jsonbin_bin_id: Option<String>,

    #[arg(long, env = "JSONBIN_BASE_URL", default_value = JSONBIN_API_BASE)]
    pub jsonbin_base_url: String,

    #[arg(long, env = "GIST_TOKEN", hide_env_values = true)]
    pub gist_token: Option<String>,

    #[arg(long, env = "GIST_ID")]
    pub gist_id: Option<String>,

    #[arg(long, env = "GIST_BASE_URL", default_value = GIST_API_BASE)]
    pub gist_base_url: String,

    #[arg(long, env = "GIST_FILE", default_value = DEFAULT_GIST_FILE)]
    pub gist_file: String,

    /// Transport timeout for remote storage calls.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 15)]
    pub http_timeout_secs: u64,

    #[arg(long, env = "RATE_LIMIT_MAX", default_value_t = 100)]
    pub rate_limit_max: u32,

    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value_t = 900)]
    pub rate_limit_window_secs: u64,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl AppConfig {
    pub fn autosave_period(&self) -> Duration {
        Duration::from_secs(self.autosave_secs.max(1))
    }

    pub fn jsonbin_credentials(&self) -> Option<(&str, &str)> {
        Some((non_blank(&self.jsonbin_api_key)?, non_blank(&self.jsonbin_bin_id)?))
    }

    pub fn gist_credentials(&self) -> Option<(&str, &str)> {
        Some((non_blank(&self.gist_token)?, non_blank(&self.gist_id)?))
    }

    pub fn warn_on_insecure_defaults(&self) {
        if self.site_password == DEV_SITE_PASSWORD {
            warn!("⚠️  SITE_PASSWORD not set, using development default");
        }
        if self.jwt_secret == DEV_JWT_SECRET {
            warn!("⚠️  JWT_SECRET not set, using development default");
        }
    }

    /// Storage targets in priority order: local file, blob store, gist.
    /// Remote targets are skipped unless both of their credentials are set.
    pub fn storage_targets(&self, http: &reqwest::Client) -> Vec<Box<dyn StorageTarget>> {
        let mut targets: Vec<Box<dyn StorageTarget>> = vec![Box::new(LocalFileTarget::new(
            &self.data_dir,
            self.backup_retention,
        ))];
        info!(dir = %self.data_dir.display(), "📁 Local storage enabled");

        match self.jsonbin_credentials() {
            Some((key, bin)) => {
                targets.push(Box::new(JsonBinTarget::new(
                    http.clone(),
                    &self.jsonbin_base_url,
                    key.to_string(),
                    bin.to_string(),
                )));
                info!(bin_id = bin, "☁️ Blob-store backup enabled");
            }
            None => info!("Blob-store backup not configured"),
        }

        match self.gist_credentials() {
            Some((token, gist)) => {
                targets.push(Box::new(GistTarget::new(
                    http.clone(),
                    &self.gist_base_url,
                    token.to_string(),
                    gist.to_string(),
                    self.gist_file.clone(),
                )));
                info!(gist_id = gist, "☁️ Gist backup enabled");
            }
            None => info!("Gist backup not configured"),
        }

        targets
    }
}

/// Standard dotenv search plus the crate directory's `.env`.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::try_parse_from(["clubhouse"]).unwrap();
        assert_eq!(cfg.backup_retention, 5);
        assert_eq!(cfg.autosave_period(), Duration::from_secs(300));
        assert_eq!(cfg.token_ttl_hours, 24);
        assert_eq!(cfg.gist_file, "db.json");
    }

    #[test]
    fn test_token_ttl_must_be_positive() {
        assert!(AppConfig::try_parse_from(["clubhouse", "--token-ttl-hours", "0"]).is_err());
        assert!(AppConfig::try_parse_from(["clubhouse", "--token-ttl-hours=-3"]).is_err());

        let cfg = AppConfig::try_parse_from(["clubhouse", "--token-ttl-hours", "2"]).unwrap();
        assert_eq!(cfg.token_ttl_hours, 2);
    }

    #[test]
    fn test_remote_targets_need_both_credentials() {
        let cfg = AppConfig::try_parse_from([
            "clubhouse",
            "--jsonbin-api-key",
            "key",
            "--gist-token",
            "tok",
            "--gist-id",
            "  ",
        ])
        .unwrap();

        assert!(cfg.jsonbin_credentials().is_none());
        assert!(cfg.gist_credentials().is_none());
        let targets = cfg.storage_targets(&reqwest::Client::new());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name(), "local");
    }

    #[test]
    fn test_all_targets_in_priority_order() {
        let cfg = AppConfig::try_parse_from([
            "clubhouse",
            "--jsonbin-api-key",
            "key",
            "--jsonbin-bin-id",
            "bin",
            "--gist-token",
            "tok",
            "--gist-id",
            "gist",
        ])
        .unwrap();

        let names: Vec<&str> = cfg
            .storage_targets(&reqwest::Client::new())
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(names, vec!["local", "jsonbin", "gist"]);
    }
}
