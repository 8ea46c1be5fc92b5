use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use weighbridge_application::DEFAULT_LOCK_TTL_MINUTES;
use weighbridge_core::{AppError, UserIdentity};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub lock_ttl_minutes: i64,
    pub token_identities: HashMap<String, UserIdentity>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8123);

        let lock_ttl_minutes = match env::var("LOCK_TTL_MIN") {
            Ok(value) if !value.trim().is_empty() => value
                .trim()
                .parse::<i64>()
                .map_err(|error| AppError::Validation(format!("invalid LOCK_TTL_MIN: {error}")))?,
            _ => DEFAULT_LOCK_TTL_MINUTES,
        };

        let admins = env::var("LOCK_API_ADMINS").unwrap_or_default();
        let token_identities =
            parse_token_identities(&required_non_empty_env("LOCK_API_TOKENS")?, &admins)?;

        Ok(Self {
            api_host,
            api_port,
            lock_ttl_minutes,
            token_identities,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// Parses `token=operator` pairs separated by commas.
///
/// The operator is the lock owner subject; it doubles as email when it
/// contains `@`. Operators listed in `admins` may release any lock.
pub fn parse_token_identities(
    raw: &str,
    admins: &str,
) -> Result<HashMap<String, UserIdentity>, AppError> {
    let admins: Vec<&str> = admins
        .split(',')
        .map(str::trim)
        .filter(|admin| !admin.is_empty())
        .collect();

    let mut identities = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let Some((token, operator)) = entry.split_once('=') else {
            return Err(AppError::Validation(format!(
                "LOCK_API_TOKENS entry '{entry}' must look like token=operator"
            )));
        };
        let (token, operator) = (token.trim(), operator.trim());
        if token.is_empty() || operator.is_empty() {
            return Err(AppError::Validation(format!(
                "LOCK_API_TOKENS entry '{entry}' has an empty token or operator"
            )));
        }

        let display_name = operator.split('@').next().unwrap_or(operator);
        let email = operator.contains('@').then(|| operator.to_owned());
        let identity = UserIdentity::new(operator, display_name, email)
            .with_admin(admins.contains(&operator));

        if identities.insert(token.to_owned(), identity).is_some() {
            return Err(AppError::Validation(format!(
                "LOCK_API_TOKENS lists token for '{operator}' more than once"
            )));
        }
    }

    if identities.is_empty() {
        return Err(AppError::Validation(
            "LOCK_API_TOKENS must define at least one token".to_owned(),
        ));
    }

    Ok(identities)
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::parse_token_identities;

    #[test]
    fn tokens_map_to_operators_and_admins() {
        let identities = parse_token_identities(
            "tok-ana=ana@example.com, tok-luis=luis",
            "luis",
        );

        let Ok(identities) = identities else {
            panic!("token list should parse");
        };
        let ana = identities.get("tok-ana");
        assert_eq!(ana.and_then(|identity| identity.email()), Some("ana@example.com"));
        assert!(ana.is_some_and(|identity| !identity.is_admin()));

        let luis = identities.get("tok-luis");
        assert!(luis.is_some_and(|identity| identity.is_admin()));
        assert_eq!(luis.map(|identity| identity.holder_label()), Some("luis"));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert!(parse_token_identities("just-a-token", "").is_err());
        assert!(parse_token_identities("=ana", "").is_err());
        assert!(parse_token_identities("tok=ana,tok=luis", "").is_err());
        assert!(parse_token_identities(" , ", "").is_err());
    }
}
