use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const DEFAULT_HTTP_PORT: u16 = 8000;
const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Daemon configuration loaded from file and/or environment.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Active environment profile (`prod` or `dev`).
    pub env: String,
    pub bot_token: String,
    /// Chat ids allowed to run administrator commands.
    pub admin_ids: Vec<i64>,
    pub db_path: PathBuf,
    pub api_url: String,
    pub http_port: u16,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Default, Clone)]
struct ProfileConfig {
    bot_token: Option<String>,
    admin_ids: Option<Vec<i64>>,
    db_path: Option<PathBuf>,
    api_url: Option<String>,
    http_port: Option<u16>,
    poll_timeout_secs: Option<u64>,
}

/// Raw TOML file structure for `~/.config/parcel/config.toml`.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    // Flat fields, used when no profile sets a value.
    bot_token: Option<String>,
    admin_ids: Option<Vec<i64>>,
    db_path: Option<PathBuf>,
    api_url: Option<String>,
    http_port: Option<u16>,
    poll_timeout_secs: Option<u64>,

    active_env: Option<String>,
    prod: Option<ProfileConfig>,
    dev: Option<ProfileConfig>,
}

/// Default config file location.
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parcel")
        .join("config.toml")
}

impl DaemonConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Priority: environment variables override profile values, which override
    /// flat file values. File path can be overridden by `config_path`.
    /// Environment profile can be overridden by `env_override`.
    pub fn load(config_path: Option<&PathBuf>, env_override: Option<&str>) -> Result<Self> {
        let path = config_path.cloned().unwrap_or_else(default_config_path);

        let file_config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ConfigFile>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        } else {
            ConfigFile::default()
        };

        Self::from_file_and_env(file_config, env_override)
    }

    /// Build config from parsed file values and current environment.
    fn from_file_and_env(file_config: ConfigFile, env_override: Option<&str>) -> Result<Self> {
        let ConfigFile {
            bot_token,
            admin_ids,
            db_path,
            api_url,
            http_port,
            poll_timeout_secs,
            active_env,
            prod,
            dev,
        } = file_config;

        let env = resolve_env(env_override, active_env.as_deref())?;
        let profile = match env.as_str() {
            "dev" => dev.as_ref(),
            "prod" => prod.as_ref(),
            _ => None,
        };

        let resolved_bot_token = std::env::var("PARCEL_BOT_TOKEN")
            .ok()
            .or_else(|| std::env::var("BOT_TOKEN").ok())
            .or_else(|| profile.and_then(|p| p.bot_token.clone()))
            .or(bot_token);
        let resolved_admin_ids = match std::env::var("PARCEL_ADMIN_IDS") {
            Ok(raw) => Some(parse_admin_ids(&raw)?),
            Err(_) => profile.and_then(|p| p.admin_ids.clone()).or(admin_ids),
        };
        let resolved_db_path = std::env::var("PARCEL_DB_PATH")
            .ok()
            .map(PathBuf::from)
            .or_else(|| profile.and_then(|p| p.db_path.clone()))
            .or(db_path);
        let resolved_api_url = std::env::var("PARCEL_API_URL")
            .ok()
            .or_else(|| profile.and_then(|p| p.api_url.clone()))
            .or(api_url);
        let resolved_http_port = std::env::var("PARCEL_HTTP_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .or_else(|| profile.and_then(|p| p.http_port))
            .or(http_port)
            .unwrap_or(DEFAULT_HTTP_PORT);
        let resolved_poll_timeout = profile
            .and_then(|p| p.poll_timeout_secs)
            .or(poll_timeout_secs)
            .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);

        Self::build(
            env,
            resolved_bot_token,
            resolved_admin_ids,
            resolved_db_path,
            resolved_api_url,
            resolved_http_port,
            resolved_poll_timeout,
        )
    }

    /// Build config from resolved option values (after file + env merging).
    fn build(
        env: String,
        bot_token: Option<String>,
        admin_ids: Option<Vec<i64>>,
        db_path: Option<PathBuf>,
        api_url: Option<String>,
        http_port: u16,
        poll_timeout_secs: u64,
    ) -> Result<Self> {
        let bot_token = match bot_token {
            Some(token) if !token.trim().is_empty() => token.trim().to_string(),
            _ => bail!("bot_token is required (set in config file or PARCEL_BOT_TOKEN env var)"),
        };
        let admin_ids = match admin_ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => bail!("admin_ids is required (set in config file or PARCEL_ADMIN_IDS env var)"),
        };
        let db_path = db_path
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(parcel_session::db::default_db_path);
        let api_url = api_url
            .filter(|u| !u.is_empty())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            env,
            bot_token,
            admin_ids,
            db_path,
            api_url,
            http_port,
            poll_timeout_secs,
        })
    }
}

/// Parse a comma separated list of chat ids, e.g. `"123, 456"`.
fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("invalid admin id '{}'", s))
        })
        .collect()
}

fn resolve_env(env_override: Option<&str>, active_env: Option<&str>) -> Result<String> {
    let raw = env_override
        .map(str::to_string)
        .or_else(|| std::env::var("PARCEL_ENV").ok())
        .or_else(|| active_env.map(str::to_string))
        .unwrap_or_else(|| "prod".to_string());

    match raw.trim().to_ascii_lowercase().as_str() {
        "prod" | "production" => Ok("prod".to_string()),
        "dev" | "development" => Ok("dev".to_string()),
        other => bail!(
            "Invalid parcel environment '{}'. Expected 'prod' or 'dev'.",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test the build() function directly to avoid env var mutation.

    fn build_with(bot_token: Option<&str>, admin_ids: Option<Vec<i64>>) -> Result<DaemonConfig> {
        DaemonConfig::build(
            "prod".to_string(),
            bot_token.map(str::to_string),
            admin_ids,
            None,
            None,
            DEFAULT_HTTP_PORT,
            DEFAULT_POLL_TIMEOUT_SECS,
        )
    }

    #[test]
    fn test_build_with_all_fields() {
        let config = DaemonConfig::build(
            "prod".to_string(),
            Some("123:abc".to_string()),
            Some(vec![42, 7]),
            Some(PathBuf::from("/tmp/orders.db")),
            Some("http://localhost:8081/".to_string()),
            9000,
            10,
        )
        .unwrap();

        assert_eq!(config.env, "prod");
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.admin_ids, vec![42, 7]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/orders.db"));
        assert_eq!(config.api_url, "http://localhost:8081");
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.poll_timeout_secs, 10);
    }

    #[test]
    fn test_build_defaults() {
        let config = build_with(Some("123:abc"), Some(vec![1])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.http_port, 8000);
        assert!(config.db_path.ends_with("parcel/orders.db"));
    }

    #[test]
    fn test_build_missing_bot_token_errors() {
        let err = build_with(None, Some(vec![1])).unwrap_err();
        assert!(err.to_string().contains("bot_token"));
    }

    #[test]
    fn test_build_blank_bot_token_errors() {
        let err = build_with(Some("  "), Some(vec![1])).unwrap_err();
        assert!(err.to_string().contains("bot_token"));
    }

    #[test]
    fn test_build_missing_admin_ids_errors() {
        let err = build_with(Some("123:abc"), None).unwrap_err();
        assert!(err.to_string().contains("admin_ids"));
    }

    #[test]
    fn test_build_empty_admin_ids_errors() {
        let err = build_with(Some("123:abc"), Some(vec![])).unwrap_err();
        assert!(err.to_string().contains("admin_ids"));
    }

    #[test]
    fn test_parse_admin_ids() {
        assert_eq!(parse_admin_ids("123, 456,789").unwrap(), vec![123, 456, 789]);
        assert_eq!(parse_admin_ids("42,").unwrap(), vec![42]);
        assert!(parse_admin_ids("").unwrap().is_empty());
        let err = parse_admin_ids("12,abc").unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_config_file_parsing_flat() {
        let toml_str = r#"
bot_token = "123:abc"
admin_ids = [42, 7]
db_path = "/var/lib/parcel/orders.db"
"#;
        let file_config: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(file_config.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(file_config.admin_ids, Some(vec![42, 7]));
        assert_eq!(
            file_config.db_path,
            Some(PathBuf::from("/var/lib/parcel/orders.db"))
        );
        assert!(file_config.prod.is_none());
        assert!(file_config.dev.is_none());
    }

    #[test]
    fn test_config_file_parsing_profiles() {
        let toml_str = r#"
active_env = "dev"

[prod]
bot_token = "prod-token"
admin_ids = [1]

[dev]
bot_token = "dev-token"
admin_ids = [2, 3]
api_url = "http://localhost:8081"
"#;
        let file_config: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(file_config.active_env.as_deref(), Some("dev"));
        assert_eq!(
            file_config
                .prod
                .as_ref()
                .and_then(|p| p.bot_token.as_deref()),
            Some("prod-token")
        );
        assert_eq!(
            file_config.dev.as_ref().and_then(|p| p.admin_ids.clone()),
            Some(vec![2, 3])
        );
    }

    #[test]
    fn test_from_file_and_env_uses_profile() {
        let file = ConfigFile {
            bot_token: Some("flat-token".to_string()),
            admin_ids: Some(vec![9]),
            http_port: Some(8100),
            active_env: Some("dev".to_string()),
            prod: Some(ProfileConfig {
                bot_token: Some("prod-token".to_string()),
                admin_ids: Some(vec![1]),
                ..ProfileConfig::default()
            }),
            dev: Some(ProfileConfig {
                bot_token: Some("dev-token".to_string()),
                admin_ids: Some(vec![2, 3]),
                poll_timeout_secs: Some(5),
                ..ProfileConfig::default()
            }),
            ..ConfigFile::default()
        };

        let config = DaemonConfig::from_file_and_env(file, Some("dev")).unwrap();
        assert_eq!(config.env, "dev");
        assert_eq!(config.admin_ids, vec![2, 3]);
        assert_eq!(config.poll_timeout_secs, 5);
    }

    #[test]
    fn test_resolve_env_defaults_prod() {
        let env = resolve_env(Some("prod"), None).unwrap();
        assert_eq!(env, "prod");
    }

    #[test]
    fn test_resolve_env_normalizes_aliases() {
        assert_eq!(resolve_env(Some("production"), None).unwrap(), "prod");
        assert_eq!(resolve_env(Some("development"), None).unwrap(), "dev");
    }

    #[test]
    fn test_resolve_env_rejects_invalid_value() {
        let err = resolve_env(Some("staging"), None).unwrap_err();
        assert!(err.to_string().contains("Invalid parcel environment"));
    }

    #[test]
    fn test_load_from_file() {
        use std::fs;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        let db_path = dir.path().join("orders.db");
        fs::write(
            &config_path,
            format!(
                r#"
active_env = "prod"
db_path = "{}"

[prod]
bot_token = "prod-token"
admin_ids = [42]
"#,
                db_path.display()
            ),
        )
        .unwrap();

        let config = DaemonConfig::load(Some(&config_path), Some("prod")).unwrap();
        assert_eq!(config.env, "prod");
        assert_eq!(config.db_path, db_path);
    }
}
