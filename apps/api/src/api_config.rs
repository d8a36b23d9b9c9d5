use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rentops_application::DEFAULT_PERMISSION_CACHE_TTL_SECONDS;
use rentops_core::AppError;
use tracing_subscriber::EnvFilter;

/// One-shot command selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    SeedRoles,
}

impl ApiCommand {
    fn parse(argument: Option<&str>) -> Result<Self, AppError> {
        match argument {
            None | Some("serve") => Ok(Self::Serve),
            Some("migrate") => Ok(Self::Migrate),
            Some("seed-roles") => Ok(Self::SeedRoles),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'serve', 'migrate' or 'seed-roles'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionCacheBackend {
    InMemory,
    Redis,
    Disabled,
}

impl FromStr for PermissionCacheBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(AppError::Validation(format!(
                "PERMISSION_CACHE_BACKEND must be 'in_memory', 'redis' or 'disabled', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub permission_cache_backend: PermissionCacheBackend,
    pub permission_cache_ttl_seconds: u32,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = ApiCommand::parse(env::args().nth(1).as_deref())?;

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let redis_url = env::var("REDIS_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let permission_cache_backend = env::var("PERMISSION_CACHE_BACKEND")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| PermissionCacheBackend::from_str(&value))
            .transpose()?
            .unwrap_or(PermissionCacheBackend::InMemory);
        let permission_cache_ttl_seconds = env::var("PERMISSION_CACHE_TTL_SECONDS")
            .ok()
            .map(|value| {
                value.trim().parse::<u32>().map_err(|error| {
                    AppError::Validation(format!("invalid PERMISSION_CACHE_TTL_SECONDS: {error}"))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_PERMISSION_CACHE_TTL_SECONDS);

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let bootstrap_token = required_non_empty_env("AUTH_BOOTSTRAP_TOKEN")?;
        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        Ok(Self {
            command,
            database_url,
            redis_url,
            permission_cache_backend,
            permission_cache_ttl_seconds,
            frontend_url,
            bootstrap_token,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{ApiCommand, PermissionCacheBackend};
    use std::str::FromStr;

    #[test]
    fn commands_parse_from_first_argument() {
        assert!(matches!(ApiCommand::parse(None), Ok(ApiCommand::Serve)));
        assert!(matches!(
            ApiCommand::parse(Some("migrate")),
            Ok(ApiCommand::Migrate)
        ));
        assert!(matches!(
            ApiCommand::parse(Some("seed-roles")),
            Ok(ApiCommand::SeedRoles)
        ));
        assert!(ApiCommand::parse(Some("drop-tables")).is_err());
    }

    #[test]
    fn cache_backend_names_are_case_insensitive() {
        assert!(matches!(
            PermissionCacheBackend::from_str("Redis"),
            Ok(PermissionCacheBackend::Redis)
        ));
        assert!(matches!(
            PermissionCacheBackend::from_str("in_memory"),
            Ok(PermissionCacheBackend::InMemory)
        ));
        assert!(matches!(
            PermissionCacheBackend::from_str("disabled"),
            Ok(PermissionCacheBackend::Disabled)
        ));
        assert!(PermissionCacheBackend::from_str("memcached").is_err());
    }
}
