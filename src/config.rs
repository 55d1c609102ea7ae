// Application configuration loaded from the environment

use chrono::Duration;
use std::str::FromStr;
use thiserror::Error;

const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime, ten years
const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Configuration errors surfaced at startup
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },

    #[error("JWT_SECRET must be at least 32 bytes")]
    WeakSecret,

    #[error("ACCESS_TOKEN_TTL_SECS must be shorter than REFRESH_TOKEN_TTL_SECS")]
    TokenLifetimes,
}

/// Password composition settings
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordPolicyConfig {
    pub min_length: usize,
    /// Reject passwords containing the user's email local part or names
    pub check_user_attributes: bool,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            check_user_attributes: true,
        }
    }
}

/// Settings for token issuance and the session lifecycle
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Replace the refresh token on every renewal
    pub rotate_refresh_tokens: bool,
    /// Log the new account in as part of signup
    pub signup_issues_session: bool,
    pub password: PasswordPolicyConfig,
}

impl AuthConfig {
    /// Defaults for everything except the signing secret
    ///
    /// Access tokens live 15 minutes, refresh tokens 30 days.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(30),
            rotate_refresh_tokens: true,
            signup_issues_session: true,
            password: PasswordPolicyConfig::default(),
        }
    }

    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        let defaults = Self::with_secret(jwt_secret);
        let access_token_ttl = ttl_or(lookup, "ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl)?;
        let refresh_token_ttl =
            ttl_or(lookup, "REFRESH_TOKEN_TTL_SECS", defaults.refresh_token_ttl)?;
        if access_token_ttl >= refresh_token_ttl {
            return Err(ConfigError::TokenLifetimes);
        }

        Ok(Self {
            access_token_ttl,
            refresh_token_ttl,
            rotate_refresh_tokens: parse_or(
                lookup,
                "ROTATE_REFRESH_TOKENS",
                defaults.rotate_refresh_tokens,
            )?,
            signup_issues_session: parse_or(
                lookup,
                "SIGNUP_ISSUES_SESSION",
                defaults.signup_issues_session,
            )?,
            password: PasswordPolicyConfig {
                min_length: parse_or(lookup, "PASSWORD_MIN_LENGTH", defaults.password.min_length)?,
                check_user_attributes: parse_or(
                    lookup,
                    "PASSWORD_CHECK_USER_ATTRIBUTES",
                    defaults.password.check_user_attributes,
                )?,
            },
            jwt_secret: defaults.jwt_secret,
        })
    }
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let auth = AuthConfig::from_lookup(&lookup)?;

        Ok(Self {
            database_url,
            host,
            port,
            auth,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A lifetime in whole seconds, between one second and `MAX_TOKEN_TTL_SECS`
fn ttl_or<F>(lookup: &F, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: i64 = parse_or(lookup, var, default.num_seconds())?;
    if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
        return Err(ConfigError::Invalid {
            var,
            value: secs.to_string(),
        });
    }
    Ok(Duration::seconds(secs))
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            var,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/spellblade"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.auth.access_token_ttl, Duration::minutes(15));
        assert_eq!(config.auth.refresh_token_ttl, Duration::days(30));
        assert!(config.auth.rotate_refresh_tokens);
        assert!(config.auth.signup_issues_session);
        assert_eq!(config.auth.password, PasswordPolicyConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/spellblade"),
            ("JWT_SECRET", SECRET),
            ("PORT", "9000"),
            ("ACCESS_TOKEN_TTL_SECS", "300"),
            ("REFRESH_TOKEN_TTL_SECS", "604800"),
            ("ROTATE_REFRESH_TOKENS", "false"),
            ("PASSWORD_MIN_LENGTH", "10"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.auth.access_token_ttl, Duration::minutes(5));
        assert_eq!(config.auth.refresh_token_ttl, Duration::days(7));
        assert!(!config.auth.rotate_refresh_tokens);
        assert_eq!(config.auth.password.min_length, 10);
    }

    #[test]
    fn test_missing_required() {
        let result = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("DATABASE_URL"));

        let result = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "short"),
        ]));
        assert_eq!(result.unwrap_err(), ConfigError::WeakSecret);
    }

    #[test]
    fn test_rejects_unparseable_value() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", SECRET),
            ("ROTATE_REFRESH_TOKENS", "sometimes"),
        ]));
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::Invalid { var: "ROTATE_REFRESH_TOKENS", .. }
        ));
    }

    #[test]
    fn test_rejects_out_of_range_lifetimes() {
        for (var, value) in [
            ("REFRESH_TOKEN_TTL_SECS", "9223372036854775807"),
            ("REFRESH_TOKEN_TTL_SECS", "315360001"),
            ("ACCESS_TOKEN_TTL_SECS", "0"),
            ("ACCESS_TOKEN_TTL_SECS", "-60"),
        ] {
            let result = AppConfig::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://x"),
                ("JWT_SECRET", SECRET),
                (var, value),
            ]));
            assert_eq!(
                result.unwrap_err(),
                ConfigError::Invalid {
                    var,
                    value: value.to_string()
                }
            );
        }
    }

    #[test]
    fn test_access_must_be_shorter_than_refresh() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", SECRET),
            ("ACCESS_TOKEN_TTL_SECS", "3600"),
            ("REFRESH_TOKEN_TTL_SECS", "3600"),
        ]));
        assert_eq!(result.unwrap_err(), ConfigError::TokenLifetimes);
    }
}
