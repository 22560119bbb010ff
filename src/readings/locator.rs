//! Device locators
//!
//! A device's `scriptUrl` is either a bare Apps Script deployment id or a full
//! http(s) URL to a readings feed. Only the configured script base and the
//! allowed hosts are ever fetched.

use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;

use crate::config::ReadingsConfig;
use crate::readings::source::ReadingsError;

fn deployment_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/macros/s/([A-Za-z0-9_-]+)").expect("deployment id pattern is valid")
    })
}

fn bare_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("bare id pattern is valid"))
}

/// Which feed URLs the server may fetch
#[derive(Debug, Clone)]
pub struct SourcePolicy {
    script_base: String,
    allowed_hosts: Vec<String>,
}

impl SourcePolicy {
    /// The host of `script_base` is always allowed.
    pub fn new(script_base: &str, allowed_hosts: &[String]) -> Self {
        let script_base = script_base.trim().trim_end_matches('/').to_string();

        let mut hosts: Vec<String> = allowed_hosts
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        if let Some(host) = Url::parse(&script_base)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        {
            if !hosts.contains(&host) {
                hosts.push(host);
            }
        }

        Self {
            script_base,
            allowed_hosts: hosts,
        }
    }

    pub fn from_config(config: &ReadingsConfig) -> Self {
        Self::new(&config.script_base, &config.allowed_hosts)
    }

    /// Turn a locator into the URL that is fetched.
    ///
    /// Bare ids must be plain deployment ids; full URLs must name an allowed host.
    pub fn resolve(&self, locator: &str) -> Result<String, ReadingsError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(ReadingsError::InvalidLocator);
        }

        if locator.starts_with("http://") || locator.starts_with("https://") {
            let url = Url::parse(locator).map_err(|_| ReadingsError::InvalidLocator)?;
            if !self.permits(&url) {
                return Err(ReadingsError::DisallowedSource(
                    url.host_str().unwrap_or_default().to_string(),
                ));
            }
            return Ok(locator.to_string());
        }

        if !bare_id_pattern().is_match(locator) {
            return Err(ReadingsError::InvalidLocator);
        }

        Ok(format!("{}/{}/exec", self.script_base, locator))
    }

    /// Whether `url` may be fetched, either directly or as a redirect target
    pub fn permits(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        match url.host_str() {
            Some(host) => {
                let host = host.to_ascii_lowercase();
                self.allowed_hosts.iter().any(|allowed| *allowed == host)
            }
            None => false,
        }
    }
}

/// Reduce a pasted Apps Script URL to its deployment id.
///
/// Anything that doesn't look like an Apps Script URL is returned trimmed.
pub fn normalize_locator(input: &str) -> String {
    match deployment_id_pattern().captures(input) {
        Some(caps) => caps[1].to_string(),
        None => input.trim().to_string(),
    }
}
