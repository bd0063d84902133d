use apigw_sign_core::{Error, Result};
use log::warn;

/// What to do when a base url is not in the mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostFallback {
    /// Fail with a config error naming the base url.
    #[default]
    Reject,
    /// Sign against the first mapped host and log a warning.
    First,
}

/// HostResolver maps the base url a request is sent to onto the host the
/// request must be signed for.
///
/// Requests routed through a custom domain still have to be signed as if
/// addressed to the API Gateway host, e.g.
/// `https://dev.example.com` -> `dev-api-id.execute-api.ap-northeast-1.amazonaws.com`.
#[derive(Debug, Clone, Default)]
pub struct HostResolver {
    mapping: Vec<(String, String)>,
    fallback: HostFallback,
}

impl HostResolver {
    /// Create an empty resolver that rejects unmapped base urls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a base url onto a signing host.
    ///
    /// Entries keep their insertion order, which decides the host used by
    /// [`HostFallback::First`]. Mapping the same base url twice replaces the
    /// earlier host in place.
    pub fn with_mapping(mut self, base_url: &str, host: &str) -> Self {
        let base_url = normalize(base_url).to_string();
        match self.mapping.iter_mut().find(|(k, _)| *k == base_url) {
            Some(entry) => entry.1 = host.to_string(),
            None => self.mapping.push((base_url, host.to_string())),
        }
        self
    }

    /// Set the fallback policy for unmapped base urls.
    pub fn with_fallback(mut self, fallback: HostFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Check if no mapping is configured.
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Resolve the signing host for the given base url.
    pub fn resolve(&self, base_url: &str) -> Result<&str> {
        let key = normalize(base_url);
        if let Some((_, host)) = self.mapping.iter().find(|(k, _)| k == key) {
            return Ok(host.as_str());
        }

        let Some((_, first)) = self.mapping.first() else {
            return Err(Error::config_invalid(format!(
                "no signing host mapped for base url {base_url}: host mapping is empty"
            )));
        };

        match self.fallback {
            HostFallback::Reject => Err(Error::config_invalid(format!(
                "no signing host mapped for base url {base_url}"
            ))),
            HostFallback::First => {
                warn!("base url {base_url} is not mapped, signing against first host {first}");
                Ok(first.as_str())
            }
        }
    }
}

fn normalize(base_url: &str) -> &str {
    base_url.trim().trim_end_matches('/')
}
