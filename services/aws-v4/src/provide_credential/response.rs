use crate::Credential;
use apigw_sign_core::{Context, ProvideCredential, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use log::{debug, error, warn};
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_POINTER: &str = "/credential";

/// ResponseCredentialProvider captures AWS credentials from the JSON body of
/// an authentication response.
///
/// The credential object is looked up at a JSON pointer, `/credential` by
/// default:
///
/// ```json
/// {
///   "credential": {
///     "AccessKeyId": "AKIDEXAMPLE",
///     "SecretKey": "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
///     "SessionToken": "optional"
///   }
/// }
/// ```
///
/// Non-200 responses, unparsable bodies and incomplete credentials are logged
/// and yield no credential instead of an error.
#[derive(Debug, Clone)]
pub struct ResponseCredentialProvider {
    status: StatusCode,
    body: Bytes,
    pointer: String,
}

impl ResponseCredentialProvider {
    /// Create a provider from a successful response body.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
            pointer: DEFAULT_POINTER.to_string(),
        }
    }

    /// Create a provider from a full response.
    pub fn from_response(resp: &http::Response<Bytes>) -> Self {
        Self {
            status: resp.status(),
            ..Self::new(resp.body().clone())
        }
    }

    /// Set the JSON pointer of the credential object, e.g. `/data`.
    ///
    /// An empty pointer selects the whole document.
    pub fn with_pointer(mut self, pointer: &str) -> Self {
        self.pointer = pointer.to_string();
        self
    }
}

#[async_trait]
impl ProvideCredential for ResponseCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        if self.status != StatusCode::OK {
            debug!(
                "response status is {}, skip capturing credential",
                self.status
            );
            return Ok(None);
        }

        let doc: Value = match serde_json::from_slice(&self.body) {
            Ok(v) => v,
            Err(err) => {
                error!("failed to parse response as json: {err}");
                return Ok(None);
            }
        };

        let Some(value) = doc.pointer(&self.pointer) else {
            warn!(
                "credential not found in response at {}, check the json pointer",
                self.pointer
            );
            return Ok(None);
        };

        let resp = match ResponseCredential::deserialize(value) {
            Ok(v) => v,
            Err(err) => {
                warn!(
                    "credential at {} is malformed: {err}, check the json pointer",
                    self.pointer
                );
                return Ok(None);
            }
        };

        let (Some(ak), Some(sk)) = (
            resp.access_key_id.filter(|v| !v.is_empty()),
            resp.secret_key.filter(|v| !v.is_empty()),
        ) else {
            warn!(
                "credential at {} lacks AccessKeyId or SecretKey, check the json pointer",
                self.pointer
            );
            return Ok(None);
        };

        debug!("captured credential from response");
        Ok(Some(Credential {
            access_key_id: ak,
            secret_access_key: sk,
            session_token: resp.session_token.filter(|v| !v.is_empty()),
            expires_in: None,
        }))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ResponseCredential {
    access_key_id: Option<String>,
    secret_key: Option<String>,
    session_token: Option<String>,
}
