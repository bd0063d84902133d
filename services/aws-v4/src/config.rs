use std::fmt::{Debug, Formatter};

use apigw_sign_core::utils::Redact;
use apigw_sign_core::{Context, Result};

use crate::constants::*;
use crate::HostResolver;

/// Config for signing API Gateway requests.
///
/// Every field is optional: [`Config::from_env`] fills the unset ones from
/// the environment and region/service fall back to `ap-northeast-1` and
/// `execute-api`.
#[derive(Clone, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_ACCESS_KEY_ID`
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SECRET_ACCESS_KEY`
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SESSION_TOKEN`
    pub session_token: Option<String>,
    /// `region` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_REGION`, then `AWS_DEFAULT_REGION`
    /// - default: `ap-northeast-1`
    pub region: Option<String>,
    /// Service name, default: `execute-api`.
    pub service: Option<String>,
    /// Host to sign against. Takes precedence over `base_url`.
    pub host: Option<String>,
    /// `base_url` the requests are sent to, will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `APIGW_SIGN_BASE_URL`
    pub base_url: Option<String>,
    /// Maps `base_url` onto the host to sign against.
    pub host_resolver: HostResolver,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("region", &self.region)
            .field("service", &self.service)
            .field("host", &self.host)
            .field("base_url", &self.base_url)
            .field("host_resolver", &self.host_resolver)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Fields that are already set are kept. Empty env values count as unset.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.access_key_id.is_none() {
            self.access_key_id = ctx.env_var_non_empty(AWS_ACCESS_KEY_ID);
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = ctx.env_var_non_empty(AWS_SECRET_ACCESS_KEY);
        }
        if self.session_token.is_none() {
            self.session_token = ctx.env_var_non_empty(AWS_SESSION_TOKEN);
        }
        if self.region.is_none() {
            self.region = ctx
                .env_var_non_empty(AWS_REGION)
                .or_else(|| ctx.env_var_non_empty(AWS_DEFAULT_REGION));
        }
        if self.base_url.is_none() {
            self.base_url = ctx.env_var_non_empty(APIGW_SIGN_BASE_URL);
        }

        self
    }

    /// Set the host resolver.
    pub fn with_host_resolver(mut self, resolver: HostResolver) -> Self {
        self.host_resolver = resolver;
        self
    }

    /// Region to sign for.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Service to sign for.
    pub fn service(&self) -> &str {
        self.service.as_deref().unwrap_or(EXECUTE_API)
    }

    /// Host to sign against.
    ///
    /// - `host` if set.
    /// - `base_url` resolved through `host_resolver`, failing for unmapped
    ///   base urls unless the resolver falls back.
    /// - `None` otherwise, the request's own `host` header or authority is
    ///   signed.
    pub fn signing_host(&self) -> Result<Option<&str>> {
        if let Some(host) = &self.host {
            return Ok(Some(host.as_str()));
        }

        match &self.base_url {
            Some(base_url) => self.host_resolver.resolve(base_url).map(Some),
            None => Ok(None),
        }
    }
}
