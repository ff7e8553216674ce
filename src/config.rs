/*!
 * Configuration
 * Environment-driven settings resolved once at startup
 */
use chrono::Duration;
use std::net::SocketAddr;

pub const DEFAULT_LOCAL_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_SESSION_TTL_HOURS: i64 = 8;

/// Where content and accounts live.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    /// Hosted store and auth service
    Remote { url: String, anon_key: String },
    /// In-process store and bcrypt accounts
    Local {
        admin_email: String,
        admin_password_hash: Option<String>,
    },
    /// No credentials: public pages render defaults, writes fail
    Disabled,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub seed_fixtures: bool,
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Level for this crate's targets when RUST_LOG is unset
    pub log_level: String,
    pub session_ttl: Duration,
}

fn truthy(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("1") | Some("true") | Some("TRUE") | Some("yes")
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = non_empty(lookup("SUPABASE_URL"));
        let anon_key = non_empty(lookup("SUPABASE_ANON_KEY"));

        let backend = match (url, anon_key) {
            (Some(url), Some(anon_key)) => BackendConfig::Remote { url, anon_key },
            _ if truthy(lookup("LOCAL_BACKEND")) => BackendConfig::Local {
                admin_email: non_empty(lookup("LOCAL_ADMIN_EMAIL"))
                    .unwrap_or_else(|| DEFAULT_LOCAL_ADMIN_EMAIL.to_string()),
                admin_password_hash: non_empty(lookup("LOCAL_ADMIN_HASH_PASSWORD")),
            },
            _ => BackendConfig::Disabled,
        };

        let session_hours = lookup("SESSION_TTL_HOURS")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS);

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let default_level = if environment == "production" { "info" } else { "debug" };
        let log_level =
            non_empty(lookup("LOG_LEVEL")).unwrap_or_else(|| default_level.to_string());

        Self {
            backend,
            seed_fixtures: truthy(lookup("SEED_FIXTURES")),
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3001),
            environment,
            log_level,
            session_ttl: Duration::hours(session_hours),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self.backend, BackendConfig::Disabled)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_credentials_disable_backend() {
        let cfg = config(&[("SUPABASE_URL", "https://x.supabase.co")]);
        assert_eq!(cfg.backend, BackendConfig::Disabled);
        assert!(!cfg.is_configured());
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let cfg = config(&[("SUPABASE_URL", "https://x.supabase.co"), ("SUPABASE_ANON_KEY", "  ")]);
        assert_eq!(cfg.backend, BackendConfig::Disabled);
    }

    #[test]
    fn test_remote_wins_over_local_flag() {
        let cfg = config(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("LOCAL_BACKEND", "true"),
        ]);
        assert!(matches!(cfg.backend, BackendConfig::Remote { .. }));
    }

    #[test]
    fn test_local_backend_defaults_admin_email() {
        let cfg = config(&[("LOCAL_BACKEND", "1")]);
        assert_eq!(
            cfg.backend,
            BackendConfig::Local {
                admin_email: DEFAULT_LOCAL_ADMIN_EMAIL.to_string(),
                admin_password_hash: None,
            }
        );
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.bind_addr().unwrap().to_string(), "127.0.0.1:3001");
        assert_eq!(cfg.session_ttl, Duration::hours(8));
        assert!(!cfg.is_production());
        assert!(!cfg.seed_fixtures);
    }

    #[test]
    fn test_log_level_follows_environment() {
        assert_eq!(Config::default().log_level, "debug");
        assert_eq!(config(&[("ENVIRONMENT", "production")]).log_level, "info");
        let cfg = config(&[("ENVIRONMENT", "production"), ("LOG_LEVEL", "warn")]);
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn test_invalid_ttl_falls_back() {
        let cfg = config(&[("SESSION_TTL_HOURS", "-3")]);
        assert_eq!(cfg.session_ttl, Duration::hours(8));
    }
}
