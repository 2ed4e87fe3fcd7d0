use std::sync::LazyLock;

use axum::http::HeaderMap;
use axum_extra::headers::{HeaderMapExt, Host};
use regex::Regex;

use crate::config::{Config, Environment};

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9](?:-?[a-z0-9])*$").unwrap());

/// Which site a request was addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostTarget {
    Apex,
    Workspace(String),
}

impl HostTarget {
    pub fn slug(&self) -> Option<&str> {
        match self {
            HostTarget::Apex => None,
            HostTarget::Workspace(slug) => Some(slug),
        }
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= 63 && SLUG_RE.is_match(slug)
}

/// Maps between `Host` headers and workspace slugs for one deployment.
#[derive(Debug, Clone)]
pub struct HostResolver {
    environment: Environment,
    domain: String,
    dev_port: u16,
}

impl HostResolver {
    pub fn new(environment: Environment, domain: &str, dev_port: u16) -> Self {
        Self {
            environment,
            domain: domain.to_ascii_lowercase(),
            dev_port,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.environment, &config.domain, config.dev_port)
    }

    /// The domain workspace subdomains hang off.
    fn base_domain(&self) -> &str {
        match self.environment {
            Environment::Development => "localhost",
            Environment::Production => &self.domain,
        }
    }

    /// Parse a hostname (port already stripped) into a target.
    pub fn parse(&self, hostname: &str) -> HostTarget {
        let hostname = hostname.trim_end_matches('.').to_ascii_lowercase();
        let base = self.base_domain();

        let Some(prefix) = hostname
            .strip_suffix(base)
            .and_then(|rest| rest.strip_suffix('.'))
        else {
            return HostTarget::Apex;
        };

        if prefix == "www" || prefix.contains('.') || !is_valid_slug(prefix) {
            return HostTarget::Apex;
        }

        HostTarget::Workspace(prefix.to_string())
    }

    /// Target named by a request's `Host` header; missing headers mean apex.
    pub fn from_headers(&self, headers: &HeaderMap) -> HostTarget {
        match headers.typed_get::<Host>() {
            Some(host) => self.parse(host.hostname()),
            None => HostTarget::Apex,
        }
    }

    /// Absolute URL of `path` on a workspace's host.
    pub fn workspace_url(&self, slug: &str, path: &str) -> String {
        match self.environment {
            Environment::Development => {
                format!("http://{slug}.localhost:{}{path}", self.dev_port)
            }
            Environment::Production => format!("https://{slug}.{}{path}", self.domain),
        }
    }

    /// Domain attribute for cookies shared across workspace hosts.
    pub fn cookie_domain(&self) -> Option<String> {
        match self.environment {
            Environment::Development => None,
            Environment::Production => Some(format!(".{}", self.domain)),
        }
    }
}
