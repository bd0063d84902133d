use crate::{Config, Credential};
use apigw_sign_core::{Context, ProvideCredential, Result};
use async_trait::async_trait;

/// ConfigCredentialProvider provides the credential held by a [`Config`].
///
/// Combine it with [`Config::from_env`] to load keys from the environment
/// once instead of on every request.
#[derive(Debug, Clone)]
pub struct ConfigCredentialProvider {
    config: Config,
}

impl ConfigCredentialProvider {
    /// Create a new ConfigCredentialProvider.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        let (Some(ak), Some(sk)) = (&self.config.access_key_id, &self.config.secret_access_key)
        else {
            return Ok(None);
        };

        Ok(Some(Credential {
            access_key_id: ak.clone(),
            secret_access_key: sk.clone(),
            session_token: self
                .config
                .session_token
                .clone()
                .filter(|v| !v.is_empty()),
            expires_in: None,
        }))
    }
}
