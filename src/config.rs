use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub renderer_url: String,
    pub environment: Environment,
    pub domain: String,
    pub dev_port: u16,
    pub host: IpAddr,
    pub port: u16,
    pub session_cookie: String,
    pub api_timeout: Duration,
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let env_required = |key: &str| {
            lookup(key).ok_or_else(|| format!("Missing required environment variable: {key}"))
        };
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let env_first = |keys: &[&str]| keys.iter().find_map(|key| lookup(key));

        let api_url = env_first(&["INTERNAL_API_URL", "NEXT_PUBLIC_API_URL"]).ok_or_else(|| {
            "Missing required environment variable: INTERNAL_API_URL or NEXT_PUBLIC_API_URL"
                .to_string()
        })?;
        let renderer_url = env_required("COMPLEXUS_RENDERER_URL")?;

        let environment = match env_or("COMPLEXUS_ENV", "production").as_str() {
            "development" => Environment::Development,
            "production" => Environment::Production,
            other => return Err(format!("Invalid COMPLEXUS_ENV: {other}")),
        };

        let domain = env_first(&["NEXT_PUBLIC_DOMAIN", "DOMAIN"]);
        let domain = match (environment, domain) {
            (_, Some(domain)) => domain,
            (Environment::Development, None) => "localhost".to_string(),
            (Environment::Production, None) => {
                return Err(
                    "Missing required environment variable: NEXT_PUBLIC_DOMAIN".to_string(),
                );
            }
        };

        let dev_port: u16 = env_or("COMPLEXUS_DEV_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid COMPLEXUS_DEV_PORT: {e}"))?;

        let host: IpAddr = env_or("COMPLEXUS_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid COMPLEXUS_HOST: {e}"))?;

        let port: u16 = env_or("COMPLEXUS_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid COMPLEXUS_PORT: {e}"))?;

        let session_cookie = env_or("COMPLEXUS_SESSION_COOKIE", "complexus_session");

        let api_timeout: u64 = env_or("COMPLEXUS_API_TIMEOUT_SECS", "10")
            .parse()
            .map_err(|e| format!("Invalid COMPLEXUS_API_TIMEOUT_SECS: {e}"))?;

        let log_level = env_or("COMPLEXUS_LOG_LEVEL", "info");

        Ok(Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            renderer_url: renderer_url.trim_end_matches('/').to_string(),
            environment,
            domain,
            dev_port,
            host,
            port,
            session_cookie,
            api_timeout: Duration::from_secs(api_timeout),
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const RENDERER: (&str, &str) = ("COMPLEXUS_RENDERER_URL", "http://renderer:3000/");

    #[test]
    fn internal_api_url_wins_over_public_one() {
        let config = parse(&[
            RENDERER,
            ("INTERNAL_API_URL", "http://api.internal:8000/"),
            ("NEXT_PUBLIC_API_URL", "https://api.fortyone.app"),
            ("NEXT_PUBLIC_DOMAIN", "fortyone.app"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "http://api.internal:8000");
        assert_eq!(config.renderer_url, "http://renderer:3000");
    }

    #[test]
    fn public_api_url_is_used_when_internal_is_unset() {
        let config = parse(&[
            RENDERER,
            ("NEXT_PUBLIC_API_URL", "https://api.fortyone.app"),
            ("NEXT_PUBLIC_DOMAIN", "fortyone.app"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://api.fortyone.app");
    }

    #[test]
    fn missing_api_url_names_both_variables() {
        let err = parse(&[RENDERER, ("NEXT_PUBLIC_DOMAIN", "fortyone.app")]).unwrap_err();
        assert!(err.contains("INTERNAL_API_URL"));
        assert!(err.contains("NEXT_PUBLIC_API_URL"));
    }

    #[test]
    fn public_domain_wins_over_alias() {
        let config = parse(&[
            RENDERER,
            ("NEXT_PUBLIC_API_URL", "https://api.fortyone.app"),
            ("NEXT_PUBLIC_DOMAIN", "fortyone.app"),
            ("DOMAIN", "other.app"),
        ])
        .unwrap();
        assert_eq!(config.domain, "fortyone.app");
        assert_eq!(config.environment, Environment::Production);

        let config = parse(&[
            RENDERER,
            ("NEXT_PUBLIC_API_URL", "https://api.fortyone.app"),
            ("DOMAIN", "other.app"),
        ])
        .unwrap();
        assert_eq!(config.domain, "other.app");
    }

    #[test]
    fn production_requires_a_domain() {
        let err = parse(&[RENDERER, ("NEXT_PUBLIC_API_URL", "https://api.fortyone.app")])
            .unwrap_err();
        assert!(err.contains("NEXT_PUBLIC_DOMAIN"));
    }

    #[test]
    fn development_defaults() {
        let config = parse(&[
            RENDERER,
            ("INTERNAL_API_URL", "http://localhost:8000"),
            ("COMPLEXUS_ENV", "development"),
        ])
        .unwrap();
        assert_eq!(config.domain, "localhost");
        assert_eq!(config.dev_port, 3000);
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_cookie, "complexus_session");
        assert_eq!(config.api_timeout, Duration::from_secs(10));
    }

    #[test]
    fn rejects_unknown_environment() {
        let err = parse(&[
            RENDERER,
            ("INTERNAL_API_URL", "http://localhost:8000"),
            ("COMPLEXUS_ENV", "staging"),
        ])
        .unwrap_err();
        assert_eq!(err, "Invalid COMPLEXUS_ENV: staging");
    }
}
