use std::fmt::Write;
use std::sync::Arc;

use apigw_sign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use apigw_sign_core::time::{format_iso8601, now, DateTime};
use apigw_sign_core::{Context, Error, RequestDescriptor, Result, SignRequest};
use log::{debug, warn};

use crate::canonical::CanonicalRequest;
use crate::constants::{
    AUTHORIZATION, AWS4_HMAC_SHA256, AWS4_REQUEST, HOST, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN,
};
use crate::{Config, Credential, Diagnostics, NoopDiagnostics};

/// Everything derived while signing one request.
///
/// Returned for diagnostics; the headers it describes are already injected
/// into the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningMaterial {
    /// Signing time: `20220313T072004Z`.
    pub amz_date: String,
    /// Signing date, the first 8 characters of `amz_date`: `20220313`.
    pub date_stamp: String,
    /// Credential scope: `20220313/<region>/<service>/aws4_request`.
    pub credential_scope: String,
    /// Canonical form the request was signed in.
    pub canonical: CanonicalRequest,
    /// Rendered canonical request.
    pub canonical_request: String,
    /// String to sign.
    pub string_to_sign: String,
    /// Lowercase hex signature.
    pub signature: String,
    /// Value of the `Authorization` header.
    pub authorization: String,
}

/// RequestSigner that implement AWS SigV4 for API Gateway.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_sigv-create-signed-request.html)
///
/// Only `host`, `x-amz-date` and `x-amz-security-token` are signed, and the
/// body is always hashed.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,
    host: Option<String>,

    time: Option<DateTime>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
            host: None,

            time: None,
            diagnostics: Arc::new(NoopDiagnostics),
        }
    }

    /// Create a signer from config, resolving the signing host.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut signer = Self::new(config.service(), config.region());
        if let Some(host) = config.signing_host()? {
            signer = signer.with_host(host);
        }
        Ok(signer)
    }

    /// Sign against this host instead of the request's authority.
    ///
    /// The request can still be sent to another destination, e.g. a custom
    /// domain in front of the API Gateway host.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Report the material of every signed request to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics) -> Self {
        self.diagnostics = Arc::new(diagnostics);
        self
    }

    /// Sign the request and inject `host`, `x-amz-date`,
    /// `x-amz-security-token` and `Authorization`.
    ///
    /// Empty credentials are not rejected here: the request gets signed and
    /// the remote verifier will refuse it.
    pub fn sign(&self, req: &mut RequestDescriptor, cred: &Credential) -> Result<SigningMaterial> {
        // Captured once so date stamp and timestamp always agree.
        let amz_date = format_iso8601(self.time.unwrap_or_else(now));
        let date_stamp = amz_date[..8].to_string();

        let host = self.signing_host(req)?;
        let token = cred.security_token();

        let canonical = CanonicalRequest::build(req, &host, &amz_date, token)?;
        let canonical_request = canonical.to_string();
        debug!("calculated canonical request: {canonical_request}");

        // Scope: "20220313/<region>/<service>/aws4_request"
        let credential_scope = format!(
            "{}/{}/{}/{}",
            date_stamp, self.region, self.service, AWS4_REQUEST
        );
        debug!("calculated scope: {credential_scope}");

        let string_to_sign = string_to_sign(&amz_date, &credential_scope, &canonical_request)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = generate_signing_key(
            &cred.secret_access_key,
            &date_stamp,
            &self.region,
            &self.service,
        );
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            AWS4_HMAC_SHA256,
            cred.access_key_id,
            credential_scope,
            canonical.signed_headers,
            signature
        );

        req.headers.upsert(X_AMZ_DATE, &amz_date);
        req.headers.upsert(HOST, &host);
        match token {
            Some(token) => req.headers.upsert(X_AMZ_SECURITY_TOKEN, token),
            // A stale token header would be sent unsigned.
            None => req.headers.remove(X_AMZ_SECURITY_TOKEN),
        }
        req.headers.upsert(AUTHORIZATION, &authorization);

        let material = SigningMaterial {
            amz_date,
            date_stamp,
            credential_scope,
            canonical,
            canonical_request,
            string_to_sign,
            signature,
            authorization,
        };
        self.diagnostics.record(&material);

        Ok(material)
    }

    /// Host to sign against: the configured host, else the request's `host`
    /// header, else its authority.
    fn signing_host(&self, req: &RequestDescriptor) -> Result<String> {
        if let Some(host) = &self.host {
            return Ok(host.clone());
        }
        if let Some(host) = req.headers.get(HOST).filter(|v| !v.is_empty()) {
            return Ok(host.to_string());
        }

        req.authority
            .as_ref()
            .map(|v| v.as_str().to_string())
            .ok_or_else(|| {
                Error::request_invalid(
                    "request without host header or authority is invalid for signing unless a host is configured",
                )
            })
    }
}

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        _: &Context,
        req: &mut RequestDescriptor,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let empty = Credential::default();
        let cred = credential.unwrap_or_else(|| {
            warn!("no credential loaded, signing with empty access key");
            &empty
        });

        self.sign(req, cred).map(|_| ())
    }
}

/// Build the string to sign from the canonical request.
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> Result<String> {
    let mut f = String::with_capacity(128);
    writeln!(f, "{AWS4_HMAC_SHA256}")?;
    writeln!(f, "{amz_date}")?;
    writeln!(f, "{scope}")?;
    write!(f, "{}", hex_sha256(canonical_request.as_bytes()))?;
    Ok(f)
}

/// Derive the signing key: `AWS4<secret>` chained through date, region,
/// service and `aws4_request`.
pub fn generate_signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}
